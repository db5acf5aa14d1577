//! Live subscription sessions.

pub mod live;

//! Request and response DTOs specific to the HTTP surface.

pub mod request;
pub mod response;

//! Link domain entities.

pub mod model;
pub mod public;
pub mod status;

pub use model::{DEFAULT_PASSCODE_FAILURES, Link, LinkConfig, PASSCODE_FLAG};
pub use public::{LinkFull, LinkFullFlat, LinkPublic, ShlinkPayload};
pub use status::LinkStatus;

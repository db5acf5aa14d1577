//! Managed API endpoint entities.

pub mod model;

pub use model::{AccessTokenResponse, Endpoint, NewEndpoint, OAuthConfig};

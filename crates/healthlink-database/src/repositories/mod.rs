//! Repository implementations for all HealthLink entities.

pub mod access_log;
pub mod content;
pub mod endpoint;
pub mod file;
pub mod link;
pub mod user;

pub use access_log::AccessLogRepository;
pub use content::{BlobRead, ContentStore};
pub use endpoint::EndpointRepository;
pub use file::FileRepository;
pub use link::LinkRepository;
pub use user::UserRepository;

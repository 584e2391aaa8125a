pub mod client;
pub mod types;

pub use client::{PlatformClient, UpstreamError};
pub use types::{CreateDatabaseRequest, CreateUserRequest};

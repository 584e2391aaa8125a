pub mod role_service;

pub use role_service::{ReassignOutcome, RoleService, RoleServiceError};

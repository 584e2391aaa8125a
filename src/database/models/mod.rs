pub mod assignment;
pub mod role;

pub use assignment::{RoleAssignment, RoleBackup};
pub use role::Role;

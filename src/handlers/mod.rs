pub mod provision;
pub mod roles;

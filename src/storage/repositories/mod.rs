//! Repository layer over the user/role store.

pub mod role;
pub mod user;
pub mod user_role;

pub use role::{RoleRepository, SqlxRoleRepository};
pub use user::{SqlxUserRepository, UserRepository};
pub use user_role::{SqlxUserRoleRepository, UserRoleRepository};

//! User domain entities.

pub mod model;
pub mod role;

pub use model::{Student, User};
pub use role::UserRole;

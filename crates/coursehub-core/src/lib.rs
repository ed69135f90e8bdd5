//! # coursehub-core
//!
//! Core crate for the CourseHub commerce engine. Contains configuration
//! schemas, typed identifiers, money helpers, commerce domain events,
//! collaborator traits, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CourseHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

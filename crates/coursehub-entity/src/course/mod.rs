//! Course pricing view.

pub mod model;

pub use model::Course;

//! # coursehub-entity
//!
//! Domain entity models for the CourseHub commerce engine. Every struct in
//! this crate represents a database table row or a domain value object.
//! Database entities derive `sqlx::FromRow`; enums map to PostgreSQL enum
//! types. Pure group-purchase transitions live in [`group::transition`] so
//! every store applies the same rules.

pub mod course;
pub mod enrollment;
pub mod group;
pub mod ledger;
pub mod outbox;
pub mod promo;
pub mod user;

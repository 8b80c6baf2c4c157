//! Catalog domain model.
//!
//! # Responsibility
//! - Define the category/item records shared by repositories and services.
//! - Own field-level validation for caller-supplied drafts.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned surrogate id.
//! - Drafts never carry `id` or `updated_at`; the store assigns both.
//! - Every item belongs to exactly one category.

pub mod category;
pub mod item;
pub mod validation;

/// Unix epoch milliseconds.
pub type EpochMillis = i64;

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Wrap repository slices into page envelopes.
//! - Keep CLI and transport layers decoupled from storage details.

pub mod catalog;
pub mod category_service;
pub mod item_service;

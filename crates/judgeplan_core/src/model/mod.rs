//! Judging domain model.
//!
//! # Responsibility
//! - Define the roster records read by the planning engine.
//! - Define the derived records (judge groups, assignments) it produces.
//!
//! # Invariants
//! - Category `id = 1` is the single General category.
//! - A judge belongs to exactly one category and at most one group.
//! - Judge groups and assignments are derived, never authored.

pub mod category;
pub mod judge;
pub mod project;
pub mod validation;

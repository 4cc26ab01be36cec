//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for roster and judging data.
//! - Isolate SQLite query details from services and the planning engine.
//!
//! # Invariants
//! - Replace operations run delete-all and insert-all in one transaction.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod judging_repo;
pub mod roster_repo;

//! Judge group formation and submission assignment engine.
//!
//! # Responsibility
//! - Compute replacement judge groups from the judge roster.
//! - Compute replacement assignments from groups and submissions.
//!
//! # Invariants
//! - Engine functions are pure; persistence happens in `repo`.
//! - Every failure is a typed `PlanningError`, raised before any write.

pub mod assignment_planner;
pub mod error;
pub mod group_formation;
pub mod rotating_queue;

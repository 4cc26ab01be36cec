//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and engine runs into admin commands.
//! - Keep CLI callers decoupled from storage details.

pub mod judging_service;
pub mod roster_service;

//! Goal hierarchy domain model.
//!
//! # Responsibility
//! - Define the Goal → SubGoal → Action → Task records used by core logic.
//! - Provide the bounded `Progress` value type shared by every level.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Ownership is a strict tree; each non-root record has exactly one parent.

pub mod action;
pub mod chain;
pub mod goal;
pub mod progress;
pub mod snapshot;
pub mod status;
pub mod task;

//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data-access ports the cascade engine depends on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `VersionConflict`)
//!   in addition to DB transport errors.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod error;
pub mod goal_tree_repo;
pub mod progress_repo;
mod rows;

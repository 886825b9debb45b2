//! Pure progress computation.
//!
//! # Responsibility
//! - Aggregate child state into one level's completion percentage.
//! - Derive achievement state from the computed percentage.
//!
//! # Invariants
//! - Nothing in this module performs I/O or holds state.

pub mod achievement;
pub mod calculator;

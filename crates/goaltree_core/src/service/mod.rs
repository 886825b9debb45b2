//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and cache ports into use-case level APIs.
//! - Keep outer layers decoupled from storage details.

pub mod cascade_service;
pub mod task_progress_service;

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into owner and item use-cases.
//! - Map repository outcomes onto the domain error taxonomy.

pub mod item_store;
pub mod owner_directory;

//! Services layer for the Kairos renewal intelligence core
//!
//! Provides the external classification/chat collaborator integration.

pub mod collaborator;

pub use collaborator::{Collaborator, CollaboratorConfig, CustomAnalysis};

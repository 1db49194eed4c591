//! Built-in tools for docent.
//!
//! Tools give the assistant access to hospital data it cannot invent.

pub mod patient;

use docent_core::tool::ToolRegistry;

pub use patient::{GeneratePatientTool, PatientRecord};

/// Create the registry the tool-calling assistant starts with.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(GeneratePatientTool));
    registry
}

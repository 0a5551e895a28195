//! # Registry Infrastructure
//!
//! Process-wide registries consulted by the dispatch layer.
//!
//! ## Available Registries
//!
//! - **ValidationHookRegistry**: ordered, append-only chain of payload
//!   validation hooks run before every validated workflow action
//!
//! ## Usage
//!
//! ```rust
//! use workflow_manager::models::{DataMap, Element, ElementKind, ProcessDefinition};
//! use workflow_manager::registry::ValidationHookRegistry;
//! use workflow_manager::validation::Rule;
//!
//! let registry = ValidationHookRegistry::new();
//! registry.register_fn(|validator, _definition, _element| {
//!     validator.rule("amount", Rule::Required);
//!     Ok(())
//! });
//!
//! let definition = ProcessDefinition::new("invoice");
//! let element = Element::new("approve", ElementKind::UserTask);
//! assert!(registry.validate(&DataMap::new(), &definition, &element).is_err());
//! ```

pub mod validation_hook_registry;

pub use validation_hook_registry::{ValidationHook, ValidationHookRegistry};

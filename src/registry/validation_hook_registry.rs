//! # Validation Hook Registry
//!
//! Ordered chain of externally registered validation hooks.
//!
//! Hooks are appended with [`ValidationHookRegistry::register`] and never
//! removed. Each [`ValidationHookRegistry::validate`] call binds a fresh
//! [`DataValidator`] to the payload, lets every hook contribute rules in
//! registration order, then runs the structural checks and the rules.
//! Registering the same hook twice runs it twice.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ValidationConfig;
use crate::models::{DataMap, Element, ProcessDefinition};
use crate::validation::{DataValidator, StructuralLimits, ValidationError};

/// Capability interface for payload validation hooks
///
/// Hooks add rules to the validator or reject directly by returning an
/// error; they never transform the payload.
pub trait ValidationHook: Send + Sync {
    fn validate(
        &self,
        validator: &mut DataValidator<'_>,
        definition: &ProcessDefinition,
        element: &Element,
    ) -> Result<(), ValidationError>;

    /// Hook name for identification in logs
    fn hook_name(&self) -> &str {
        "unnamed_hook"
    }
}

impl<F> ValidationHook for F
where
    F: Fn(&mut DataValidator<'_>, &ProcessDefinition, &Element) -> Result<(), ValidationError>
        + Send
        + Sync,
{
    fn validate(
        &self,
        validator: &mut DataValidator<'_>,
        definition: &ProcessDefinition,
        element: &Element,
    ) -> Result<(), ValidationError> {
        self(validator, definition, element)
    }
}

/// Append-only registry of validation hooks
pub struct ValidationHookRegistry {
    hooks: RwLock<Vec<Arc<dyn ValidationHook>>>,
    limits: StructuralLimits,
}

impl ValidationHookRegistry {
    /// Create an empty registry with default structural limits
    pub fn new() -> Self {
        Self::with_limits(StructuralLimits::default())
    }

    pub fn with_limits(limits: StructuralLimits) -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
            limits,
        }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::with_limits(StructuralLimits::from(config))
    }

    /// Append a hook to the end of the chain
    pub fn register<H>(&self, hook: H)
    where
        H: ValidationHook + 'static,
    {
        self.register_arc(Arc::new(hook));
    }

    /// Append a closure hook to the end of the chain
    pub fn register_fn<F>(&self, hook: F)
    where
        F: Fn(&mut DataValidator<'_>, &ProcessDefinition, &Element) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        self.register_arc(Arc::new(hook));
    }

    /// Append a shared hook to the end of the chain
    pub fn register_arc(&self, hook: Arc<dyn ValidationHook>) {
        let mut hooks = self.hooks.write();
        debug!(
            hook = hook.hook_name(),
            position = hooks.len(),
            "Registered validation hook"
        );
        hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }

    /// Run every hook in registration order, then structural validation
    ///
    /// A hook returning an error stops the chain and that error is
    /// returned as-is. Otherwise all violations found by the structural
    /// checks and hook-contributed rules are reported together.
    pub fn validate(
        &self,
        data: &DataMap,
        definition: &ProcessDefinition,
        element: &Element,
    ) -> Result<(), ValidationError> {
        // Snapshot so hooks may register further hooks without deadlocking
        let hooks: Vec<Arc<dyn ValidationHook>> = self.hooks.read().clone();
        let mut validator = DataValidator::new(data, &self.limits);

        for hook in &hooks {
            if let Err(err) = hook.validate(&mut validator, definition, element) {
                warn!(
                    hook = hook.hook_name(),
                    element_id = %element.id,
                    violations = err.violations.len(),
                    "Validation hook rejected payload"
                );
                return Err(err);
            }
        }

        debug!(
            hooks = hooks.len(),
            rules = validator.rule_count(),
            element_id = %element.id,
            definition_id = %definition.id,
            "Running structural validation"
        );
        validator.validate()
    }
}

impl Default for ValidationHookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidationHookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationHookRegistry")
            .field("hooks", &self.len())
            .field("limits", &self.limits)
            .finish()
    }
}

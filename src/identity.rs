// src/identity.rs
//! Fully-qualified-name construction for structural walks.
//!
//! The suppression scanner descends source scopes and pushes/pops segments
//! here as it goes; the aggregation engine only ever consumes the FQNs this
//! builder hands out.

use crate::normalize::{normalize_signature, normalize_type_name};

/// Tracks the namespace and type nesting of a structural walk.
#[derive(Debug, Clone, Default)]
pub struct SymbolScope {
    namespaces: Vec<String>,
    types: Vec<String>,
}

impl SymbolScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_namespace(&mut self, segment: &str) {
        self.namespaces.push(segment.to_string());
    }

    pub fn pop_namespace(&mut self) {
        let _ = self.namespaces.pop();
    }

    pub fn push_type(&mut self, name: &str) {
        self.types.push(normalize_type_name(name));
    }

    pub fn pop_type(&mut self) {
        let _ = self.types.pop();
    }

    /// The joined namespace prefix, empty at file scope.
    #[must_use]
    pub fn namespace(&self) -> String {
        self.namespaces.join(".")
    }

    /// FQN of the innermost type, outer types first. `None` outside any type
    /// (e.g. file-scoped declarations).
    #[must_use]
    pub fn type_fqn(&self) -> Option<String> {
        if self.types.is_empty() {
            return None;
        }
        let joined = self.types.join(".");
        let ns = self.namespace();
        if ns.is_empty() {
            Some(joined)
        } else {
            Some(format!("{ns}.{joined}"))
        }
    }

    /// FQN for a method member; the raw signature is canonicalized so members
    /// always carry the `(...)` form.
    #[must_use]
    pub fn member_fqn(&self, raw_signature: &str) -> Option<String> {
        let type_fqn = self.type_fqn()?;
        Some(format!("{type_fqn}.{}", normalize_signature(raw_signature)))
    }

    /// FQN for a property/field/event member (no parameter list).
    #[must_use]
    pub fn property_fqn(&self, name: &str) -> Option<String> {
        let type_fqn = self.type_fqn()?;
        Some(format!("{type_fqn}.{name}"))
    }
}

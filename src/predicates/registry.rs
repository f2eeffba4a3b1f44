//! # Predicate Registry

use std::collections::HashMap;
use std::sync::RwLock;

use crate::observability::{log_event_with_fields, Event};

use super::errors::{PredicateError, PredicateResult};
use super::predicate::{Callback, Predicate, PredicateDescriptor, Row};

#[derive(Default)]
struct Entries {
    /// Identifiers in first-registration order
    order: Vec<String>,

    /// Predicates by identifier
    by_id: HashMap<String, Predicate>,
}

/// Registry of known predicates
///
/// Last registration for an identifier wins; the entry keeps its original
/// listing position.
#[derive(Default)]
pub struct PredicateRegistry {
    entries: RwLock<Entries>,
}

impl PredicateRegistry {
    /// Create a new registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate, replacing any previous one with the same identifier
    pub fn register(&self, predicate: Predicate) -> PredicateResult<()> {
        let identifier = predicate.identifier().to_string();
        if identifier.trim().is_empty() {
            log_event_with_fields(
                Event::PredicateRegistrationRejected,
                &[("reason", "empty identifier")],
            );
            return Err(PredicateError::InvalidRegistration(
                "predicate identifier must not be empty".into(),
            ));
        }

        let replaced = {
            let mut entries = self.entries.write()
                .map_err(|_| PredicateError::Internal("Lock poisoned".into()))?;
            let replaced = entries.by_id.insert(identifier.clone(), predicate).is_some();
            if !replaced {
                entries.order.push(identifier.clone());
            }
            replaced
        };

        let event = if replaced {
            Event::PredicateReplaced
        } else {
            Event::PredicateRegistered
        };
        log_event_with_fields(event, &[("predicate", &identifier)]);

        Ok(())
    }

    /// Register a compute predicate from its parts
    pub fn register_compute<F>(
        &self,
        identifier: &str,
        query: &str,
        query_subject_variable: &str,
        callback: F,
    ) -> PredicateResult<()>
    where
        F: Fn(&Row) -> PredicateResult<Row> + Send + Sync + 'static,
    {
        self.register(Predicate::compute(identifier, query, query_subject_variable, callback))
    }

    /// Look up the callback for an identifier
    pub fn resolve(&self, identifier: &str) -> PredicateResult<Callback> {
        let entries = self.entries.read()
            .map_err(|_| PredicateError::Internal("Lock poisoned".into()))?;
        entries.by_id.get(identifier)
            .map(|p| p.callback.clone())
            .ok_or_else(|| PredicateError::NotFound(identifier.to_string()))
    }

    /// List all descriptors in registration order
    pub fn list(&self) -> Vec<PredicateDescriptor> {
        self.entries.read()
            .map(|entries| {
                entries.order.iter()
                    .filter_map(|id| entries.by_id.get(id))
                    .map(|p| p.descriptor.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get predicate count
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.by_id.len()).unwrap_or(0)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! # Predicate Definition

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::PredicateResult;

/// One input or output row: field name to value
pub type Row = Map<String, Value>;

/// Row-to-row computation owned by the registry
///
/// Returning an error drops the row from the batch result.
pub type Callback = Arc<dyn Fn(&Row) -> PredicateResult<Row> + Send + Sync>;

/// Predicate category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateKind {
    /// Values are computed per query row by a registered callback
    #[default]
    Compute,
}

/// Public metadata of a predicate, as served by `GET /predicates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateDescriptor {
    /// Predicate IRI (unique)
    #[serde(rename = "predicateIRI", alias = "identifier")]
    pub identifier: String,

    /// Query fetching the data the computation needs
    #[serde(rename = "predicateQuery", alias = "query")]
    pub query: String,

    /// Variable in the query result matched with the predicate's subject
    #[serde(rename = "predicateQuerySubject", alias = "querySubjectVariable")]
    pub query_subject_variable: String,

    #[serde(rename = "predicateKind", alias = "kind", default)]
    pub kind: PredicateKind,

    /// Free-form metadata, carried on the wire as a JSON-encoded string
    #[serde(
        rename = "predicateMeta",
        alias = "meta",
        default,
        skip_serializing_if = "Option::is_none",
        with = "meta_as_string"
    )]
    pub meta: Option<Value>,
}

mod meta_as_string {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(meta: &Option<Value>, serializer: S) -> Result<S::Ok, S::Error> {
        match meta {
            Some(value) => serializer.serialize_str(&value.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            // Unparseable text is kept as a plain string
            Some(Value::String(text)) => {
                Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
            }
            other => other,
        })
    }
}

/// A registered predicate: descriptor plus callback
#[derive(Clone)]
pub struct Predicate {
    pub descriptor: PredicateDescriptor,
    pub callback: Callback,
}

impl Predicate {
    /// Create a compute predicate
    pub fn compute<F>(
        identifier: impl Into<String>,
        query: impl Into<String>,
        query_subject_variable: impl Into<String>,
        callback: F,
    ) -> Self
    where
        F: Fn(&Row) -> PredicateResult<Row> + Send + Sync + 'static,
    {
        Self {
            descriptor: PredicateDescriptor {
                identifier: identifier.into(),
                query: query.into(),
                query_subject_variable: query_subject_variable.into(),
                kind: PredicateKind::Compute,
                meta: None,
            },
            callback: Arc::new(callback),
        }
    }

    /// Attach free-form metadata
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.descriptor.meta = Some(meta);
        self
    }

    pub fn identifier(&self) -> &str {
        &self.descriptor.identifier
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

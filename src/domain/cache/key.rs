//! Cache key generation strategies

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Trait for generating cache keys from input data
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// Generates a cache key from the given components
    fn generate(&self, params: &CacheKeyParams) -> String;

    /// Generates a key with a namespace prefix
    fn generate_with_namespace(&self, namespace: &str, params: &CacheKeyParams) -> String {
        format!("{}:{}", namespace, self.generate(params))
    }
}

/// Parameters for cache key generation
///
/// Components live in a `BTreeMap`, so the order in which a caller adds them
/// never changes the canonical form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheKeyParams {
    /// Primary identifier (e.g. the operation being cached)
    pub primary: String,
    /// Secondary components, kept sorted by name
    pub components: BTreeMap<String, String>,
}

impl CacheKeyParams {
    /// Creates new cache key parameters with a primary identifier
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            components: BTreeMap::new(),
        }
    }

    /// Adds a component to the key parameters
    pub fn with_component(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.insert(key.into(), value.into());
        self
    }

    /// Parameters identifying one similarity search
    pub fn for_search(query: &str, limit: u32, model: &str) -> Self {
        Self::new("vector_search")
            .with_component("query", query)
            .with_component("limit", limit.to_string())
            .with_component("model", model)
    }

    /// Canonical JSON form: primary first, components sorted by name.
    ///
    /// JSON string escaping keeps separators inside values from colliding
    /// with the structure.
    pub fn canonical(&self) -> String {
        // String maps always serialize; the fallback is still deterministic.
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!("{}{:?}", self.primary, self.components))
    }
}

/// SHA-256 fingerprint generator over the canonical parameter form
///
/// Produces the full 64-character hex digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintKeyGenerator;

impl FingerprintKeyGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CacheKeyGenerator for FingerprintKeyGenerator {
    fn generate(&self, params: &CacheKeyParams) -> String {
        hex::encode(Sha256::digest(params.canonical().as_bytes()))
    }
}

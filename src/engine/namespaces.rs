//! Namespace-to-prefix registry.
//!
//! Maps namespace URIs to the short prefixes used when synthesizing converted
//! tag names (`tei-div`) and behavior lookup keys (`tei:div`). Registration is
//! first-wins per URI: once a prefix has been assigned to a namespace it never
//! changes for the lifetime of the engine, so trees converted earlier stay
//! consistent with behaviors registered later.

pub const TEI_NS: &str = "http://www.tei-c.org/ns/1.0";
pub const TEI_EXAMPLES_NS: &str = "http://www.tei-c.org/ns/Examples";
pub const RELAXNG_NS: &str = "http://relaxng.org/ns/structure/1.0";

/// Ordered URI -> prefix mapping.
#[derive(Debug, Default, Clone)]
pub struct NamespaceMap {
    entries: Vec<(String, String)>,
}

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map seeded with the built-in TEI namespaces.
    pub fn builtin() -> Self {
        let mut map = Self::new();
        map.register(TEI_NS, "tei");
        map.register(TEI_EXAMPLES_NS, "teieg");
        map.register(RELAXNG_NS, "rng");
        map
    }

    /// Register a prefix for a namespace URI.
    ///
    /// A no-op returning `false` if the URI is already registered (the first
    /// registration wins) or the prefix is already claimed by another URI.
    /// Duplicate registration is not an error: behavior sets for the same
    /// namespaces are merged cumulatively over the engine's lifetime.
    pub fn register(&mut self, uri: &str, prefix: &str) -> bool {
        if self.prefix_for(uri).is_some() || self.uri_for(prefix).is_some() {
            return false;
        }
        self.entries.push((uri.to_string(), prefix.to_string()));
        true
    }

    /// The prefix registered for a namespace URI, if any.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(u, _)| u == uri)
            .map(|(_, p)| p.as_str())
    }

    /// The namespace URI a prefix is registered for, if any.
    pub fn uri_for(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, p)| p == prefix)
            .map(|(u, _)| u.as_str())
    }

    /// Registered prefixes, in registration order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, p)| p.as_str())
    }
}

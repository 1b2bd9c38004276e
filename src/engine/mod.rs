//! The document transformation engine.
//!
//! Converts a parsed TEI-like source tree into a converted element tree whose
//! tags follow the `prefix-localName` scheme, then decorates it by dispatching
//! registered per-element behaviors. One engine instance owns one namespace
//! map and one behavior registry; don't share an instance across concurrent
//! conversions.

pub mod behavior;
pub mod convert;
pub mod dispatch;
pub mod namespaces;
pub mod serialize;
pub mod tree;

use std::collections::HashMap;

use regex_lite::Regex;

pub use behavior::{Behavior, BehaviorFn, BehaviorRegistry, BehaviorSet, Rule, Selector, Template};
pub use namespaces::NamespaceMap;
pub use serialize::{serialize, to_html};
pub use tree::{WebElement, WebNodeData, WebNodeId, WebTree};

/// Named attribute-value transform, invocable from template placeholders
/// (`$rw@target`).
pub type TransformFn = fn(&Engine, &str) -> String;

/// A `prefixDef` pattern pair, captured during conversion and consumed by
/// [`Engine::normalize_reference`].
#[derive(Debug, Clone)]
pub struct PrefixDef {
    pub match_pattern: String,
    pub replacement_pattern: String,
}

/// Transformation engine: namespace map, behavior registry, and the
/// document-level state gathered while converting (prefix definitions,
/// embedded styles).
pub struct Engine {
    pub(crate) namespaces: NamespaceMap,
    pub(crate) behaviors: BehaviorRegistry,
    transforms: HashMap<String, TransformFn>,
    prefix_defs: HashMap<String, PrefixDef>,
    base_url: String,
    has_style: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with the built-in TEI namespaces and no behaviors.
    pub fn new() -> Self {
        let mut transforms: HashMap<String, TransformFn> = HashMap::new();
        transforms.insert("rw".to_string(), transform_rw);
        transforms.insert("first".to_string(), transform_first);
        transforms.insert("normalizeURI".to_string(), transform_normalize_uri);

        Self {
            namespaces: NamespaceMap::builtin(),
            behaviors: BehaviorRegistry::new(),
            transforms,
            prefix_defs: HashMap::new(),
            base_url: String::new(),
            has_style: false,
        }
    }

    /// Engine configured with an initial behavior set.
    pub fn with_behaviors(set: BehaviorSet) -> Self {
        let mut engine = Self::new();
        engine.add_behaviors(set);
        engine
    }

    /// Merge a behavior set into the engine.
    ///
    /// Namespaces register first-wins; element behaviors register last-write-
    /// wins; legacy handlers never clobber individually-registered entries.
    pub fn add_behaviors(&mut self, set: BehaviorSet) {
        for (prefix, uri) in &set.namespaces {
            self.namespaces.register(uri, prefix);
        }
        for (prefix, local, behavior) in set.elements {
            self.behaviors.insert(format!("{prefix}:{local}"), behavior);
        }
        for (local, behavior) in set.handlers {
            let key = if local == "egXML" {
                "teieg:egXML".to_string()
            } else {
                format!("tei:{local}")
            };
            self.behaviors.insert_handler(key, behavior);
        }
    }

    /// Add or replace an individual behavior for `prefix:local`.
    pub fn add_behavior(&mut self, prefix: &str, local: &str, behavior: Behavior) {
        self.behaviors.insert(format!("{prefix}:{local}"), behavior);
    }

    /// Add an individual behavior for an element in a namespace not yet
    /// declared. The namespace registers first-wins; the behavior keys on the
    /// prefix already assigned to the URI if one exists.
    pub fn add_behavior_in(&mut self, prefix: &str, uri: &str, local: &str, behavior: Behavior) {
        self.namespaces.register(uri, prefix);
        let prefix = self.namespaces.prefix_for(uri).unwrap_or(prefix).to_string();
        self.add_behavior(&prefix, local, behavior);
    }

    /// Register a named transform usable from template placeholders.
    pub fn register_transform(&mut self, name: &str, transform: TransformFn) {
        self.transforms.insert(name.to_string(), transform);
    }

    pub(crate) fn transform_fn(&self, name: &str) -> Option<TransformFn> {
        self.transforms.get(name).copied()
    }

    /// Base URL used by the `rw` transform to resolve relative references.
    pub fn set_base_url(&mut self, base: &str) {
        self.base_url = base.to_string();
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True once a converted document carried an embedded stylesheet.
    pub fn has_style(&self) -> bool {
        self.has_style
    }

    pub(crate) fn set_has_style(&mut self) {
        self.has_style = true;
    }

    pub fn namespaces(&self) -> &NamespaceMap {
        &self.namespaces
    }

    /// The `prefixDef` captured for an identifier scheme, if the converted
    /// document declared one.
    pub fn prefix_def(&self, ident: &str) -> Option<&PrefixDef> {
        self.prefix_defs.get(ident)
    }

    pub(crate) fn add_prefix_def(&mut self, ident: String, def: PrefixDef) {
        self.prefix_defs.insert(ident, def);
    }

    /// Expand a `prefix:rest` reference through the document's `prefixDef`
    /// patterns. References without a matching definition pass through
    /// unchanged.
    pub fn normalize_reference(&self, reference: &str) -> String {
        if let Some((ident, rest)) = reference.split_once(':')
            && let Some(def) = self.prefix_defs.get(ident)
            && let Ok(re) = Regex::new(&def.match_pattern)
            && re.is_match(rest)
        {
            return re
                .replace(rest, def.replacement_pattern.as_str())
                .into_owned();
        }
        reference.to_string()
    }

    /// Rewrite a relative URL against the engine's base URL.
    pub fn rewrite_url(&self, url: &str) -> String {
        let absolute = Regex::new(r"^(?:http|mailto|file|/|#)").unwrap();
        if absolute.is_match(url) {
            url.to_string()
        } else {
            format!("{}{}", self.base_url, url)
        }
    }
}

fn transform_rw(engine: &Engine, value: &str) -> String {
    engine.rewrite_url(value)
}

/// First of a space-separated list of targets.
fn transform_first(_engine: &Engine, value: &str) -> String {
    value.split_whitespace().next().unwrap_or("").to_string()
}

fn transform_normalize_uri(engine: &Engine, value: &str) -> String {
    engine.rewrite_url(&transform_first(engine, value))
}

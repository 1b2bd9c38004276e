//! Per-element behaviors and the registry that resolves them.
//!
//! A behavior is bound to a qualified name (`tei:ref`) and decides what
//! generated content, if any, decorates a converted element. The three forms
//! mirror the customization surface of the original engine: a plain function,
//! an insert-before/insert-after template pair, or an ordered rule list
//! evaluated against the element with first-match-wins semantics.

use std::collections::{HashMap, HashSet};

use super::Engine;
use super::tree::{WebNodeId, WebTree};

/// Function behavior: builds generated content in the tree and returns its
/// root node, or `None` to leave the element untouched.
pub type BehaviorFn = fn(&Engine, &mut WebTree, WebNodeId) -> Option<WebNodeId>;

/// A pluggable per-element transformation.
pub enum Behavior {
    /// Arbitrary content-producing function.
    Func(BehaviorFn),
    /// Template wrappers around the element's existing rendered content.
    Template(Template),
    /// Ordered (selector, behavior) rules; first structural match wins.
    Rules(Vec<Rule>),
}

impl Behavior {
    /// Template that inserts markup before the element's content.
    pub fn prepend(before: impl Into<String>) -> Self {
        Behavior::Template(Template {
            before: before.into(),
            after: None,
        })
    }

    /// Template that wraps the element's content.
    pub fn wrap(before: impl Into<String>, after: impl Into<String>) -> Self {
        Behavior::Template(Template {
            before: before.into(),
            after: Some(after.into()),
        })
    }
}

/// 1–2 element template pair with `$name@attr` placeholders.
pub struct Template {
    pub before: String,
    pub after: Option<String>,
}

/// One entry of a rule-list behavior.
pub struct Rule {
    pub selector: Selector,
    pub behavior: Behavior,
}

impl Rule {
    pub fn new(selector: &str, behavior: Behavior) -> Self {
        Self {
            selector: Selector::parse(selector),
            behavior,
        }
    }
}

/// Minimal structural selector: element name, single class, single id, or
/// the unconditional fallback `_`. Full selector grammar is out of scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Universal,
    Tag(String),
    Class(String),
    Id(String),
}

impl Selector {
    pub fn parse(selector: &str) -> Self {
        let s = selector.trim();
        if s == "_" {
            Selector::Universal
        } else if let Some(class) = s.strip_prefix('.') {
            Selector::Class(class.to_string())
        } else if let Some(id) = s.strip_prefix('#') {
            Selector::Id(id.to_string())
        } else {
            Selector::Tag(s.to_string())
        }
    }

    /// Structural match against a converted element. Tag selectors match
    /// either the converted tag (`tei-ref`) or the original name (`ref`).
    pub fn matches(&self, tree: &WebTree, node: WebNodeId) -> bool {
        let el = match tree.element(node) {
            Some(el) => el,
            None => return false,
        };
        match self {
            Selector::Universal => true,
            Selector::Tag(tag) => el.tag == *tag || el.orig_name == *tag,
            Selector::Class(class) => el.classes().contains(&class.as_str()),
            Selector::Id(id) => el.attr("id") == Some(id.as_str()),
        }
    }
}

/// Behavior configuration accepted at engine construction and via
/// `Engine::add_behaviors`: a namespace map plus per-namespace element
/// behaviors, with the legacy aggregate `handlers` form still supported.
#[derive(Default)]
pub struct BehaviorSet {
    pub(crate) namespaces: Vec<(String, String)>,
    pub(crate) elements: Vec<(String, String, Behavior)>,
    pub(crate) handlers: Vec<(String, Behavior)>,
}

impl BehaviorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a namespace prefix. First registration for a URI wins.
    pub fn namespace(mut self, prefix: &str, uri: &str) -> Self {
        self.namespaces.push((prefix.to_string(), uri.to_string()));
        self
    }

    /// Bind a behavior to `prefix:local`.
    pub fn behavior(mut self, prefix: &str, local: &str, behavior: Behavior) -> Self {
        self.elements
            .push((prefix.to_string(), local.to_string(), behavior));
        self
    }

    /// Legacy TEI-specific registration: names land in the `tei` namespace,
    /// except `egXML`, which belongs to the TEI Examples namespace.
    pub fn handler(mut self, local: &str, behavior: Behavior) -> Self {
        self.handlers.push((local.to_string(), behavior));
        self
    }
}

/// Qualified-name -> behavior registry.
#[derive(Default)]
pub struct BehaviorRegistry {
    entries: HashMap<String, Behavior>,
    /// Keys registered through the individual (non-legacy) path. Legacy
    /// aggregate registration never clobbers these.
    individual: HashSet<String>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Individual registration: last write wins.
    pub fn insert(&mut self, key: String, behavior: Behavior) {
        self.individual.insert(key.clone());
        self.entries.insert(key, behavior);
    }

    /// Legacy aggregate registration: yields to individually-registered
    /// entries for the same qualified name.
    pub fn insert_handler(&mut self, key: String, behavior: Behavior) {
        if self.individual.contains(&key) {
            return;
        }
        self.entries.insert(key, behavior);
    }

    pub fn resolve(&self, qualified_name: &str) -> Option<&Behavior> {
        self.entries.get(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Attribute;
    use crate::engine::tree::WebElement;

    fn element_with(tree: &mut WebTree, tag: &str, orig: &str, attrs: &[(&str, &str)]) -> WebNodeId {
        let mut el = WebElement::new(tag, orig);
        for (name, value) in attrs {
            el.attrs.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        tree.create_element(el)
    }

    #[test]
    fn selector_parsing() {
        assert_eq!(Selector::parse("_"), Selector::Universal);
        assert_eq!(Selector::parse(".hi"), Selector::Class("hi".to_string()));
        assert_eq!(Selector::parse("#n1"), Selector::Id("n1".to_string()));
        assert_eq!(Selector::parse("tei-ref"), Selector::Tag("tei-ref".to_string()));
    }

    #[test]
    fn selector_matching() {
        let mut tree = WebTree::new();
        let node = element_with(
            &mut tree,
            "tei-hi",
            "hi",
            &[("class", "highlight bold"), ("id", "h1")],
        );

        assert!(Selector::parse("_").matches(&tree, node));
        assert!(Selector::parse("tei-hi").matches(&tree, node));
        assert!(Selector::parse("hi").matches(&tree, node));
        assert!(Selector::parse(".highlight").matches(&tree, node));
        assert!(Selector::parse(".bold").matches(&tree, node));
        assert!(Selector::parse("#h1").matches(&tree, node));
        assert!(!Selector::parse(".other").matches(&tree, node));
        assert!(!Selector::parse("tei-p").matches(&tree, node));
    }

    #[test]
    fn handler_does_not_clobber_individual() {
        let mut registry = BehaviorRegistry::new();
        registry.insert("tei:note".to_string(), Behavior::prepend("["));
        registry.insert_handler("tei:note".to_string(), Behavior::prepend("("));

        match registry.resolve("tei:note") {
            Some(Behavior::Template(t)) => assert_eq!(t.before, "["),
            _ => panic!("expected template behavior"),
        }
    }

    #[test]
    fn individual_overrides_earlier_individual() {
        let mut registry = BehaviorRegistry::new();
        registry.insert("tei:note".to_string(), Behavior::prepend("["));
        registry.insert("tei:note".to_string(), Behavior::prepend("{"));

        match registry.resolve("tei:note") {
            Some(Behavior::Template(t)) => assert_eq!(t.before, "{"),
            _ => panic!("expected template behavior"),
        }
    }

    #[test]
    fn handler_fills_unregistered_names() {
        let mut registry = BehaviorRegistry::new();
        registry.insert_handler("tei:add".to_string(), Behavior::wrap("`", "`"));
        assert!(registry.resolve("tei:add").is_some());
    }
}

//! Behavior dispatch over a converted tree.
//!
//! A single top-down walk. Each element resolves at most one behavior, keyed
//! by its original namespace prefix and local name; the `processed` flag makes
//! the walk idempotent, so dispatching twice never duplicates content.

use regex_lite::Regex;

use super::behavior::{Behavior, Template};
use super::tree::{WebElement, WebNodeId, WebTree};
use super::Engine;

impl Engine {
    /// Dispatch behaviors over the whole tree.
    pub fn apply_behaviors(&self, tree: &mut WebTree) {
        let root = tree.root();
        if root.is_some() {
            self.process_element(tree, root);
        }
    }

    pub(crate) fn process_element(&self, tree: &mut WebTree, node: WebNodeId) {
        let pending = tree.element(node).is_some_and(|el| !el.processed);
        if pending
            && let Some(qname) = tree.element(node).and_then(behavior_name)
            && let Some(behavior) = self.behaviors.resolve(&qname)
        {
            if let Some(content) = self.apply_behavior(tree, node, behavior) {
                let content_tag = tree.element(content).map(|el| el.tag.clone());
                // Guard against inserting the same generated element twice
                let duplicate = content_tag
                    .as_deref()
                    .is_some_and(|tag| child_tag_exists(tree, node, tag));
                if !duplicate {
                    tree.hide_children(node);
                    tree.append(node, content);
                }
            }
            if let Some(el) = tree.element_mut(node) {
                el.processed = true;
            }
        }

        for child in tree.child_ids(node) {
            self.process_element(tree, child);
        }
    }

    fn apply_behavior(
        &self,
        tree: &mut WebTree,
        node: WebNodeId,
        behavior: &Behavior,
    ) -> Option<WebNodeId> {
        match behavior {
            Behavior::Func(f) => f(self, tree, node),
            Behavior::Template(template) => Some(self.insert_template(tree, node, template)),
            Behavior::Rules(rules) => {
                for rule in rules {
                    if rule.selector.matches(tree, node) {
                        return self.apply_behavior(tree, node, &rule.behavior);
                    }
                }
                None
            }
        }
    }

    /// Expand a template into a generated wrapper: raw before-markup, a copy
    /// of the element's rendered content, raw after-markup.
    fn insert_template(
        &self,
        tree: &mut WebTree,
        node: WebNodeId,
        template: &Template,
    ) -> WebNodeId {
        // Nested elements must render before their content is captured
        for child in tree.child_ids(node) {
            if tree.element(child).is_some_and(|el| !el.processed) {
                self.process_element(tree, child);
            }
        }

        let before = self.expand_template(tree, node, &template.before);
        let after = template
            .after
            .as_ref()
            .map(|s| self.expand_template(tree, node, s));

        let mut span = WebElement::new("span", "span");
        span.generated = true;
        span.set_attr("data-before", &markup_free_len(&before).to_string());
        if let Some(ref a) = after {
            span.set_attr("data-after", &markup_free_len(a).to_string());
        }
        let span_id = tree.create_element(span);

        let raw_before = tree.create_raw(before);
        tree.append(span_id, raw_before);
        for child in tree.child_ids(node) {
            let copy = tree.deep_clone(child);
            tree.append(span_id, copy);
        }
        if let Some(a) = after {
            let raw_after = tree.create_raw(a);
            tree.append(span_id, raw_after);
        }
        span_id
    }

    /// Resolve `$fn@attr` placeholders against the element's attributes.
    /// Absent attributes collapse the placeholder to the empty string.
    pub(crate) fn expand_template(&self, tree: &WebTree, node: WebNodeId, template: &str) -> String {
        let re = Regex::new(r"\$(\w*)@([A-Za-z][\w:.-]*)").unwrap();
        let mut out = String::new();
        let mut last = 0;
        for caps in re.captures_iter(template) {
            let whole = caps.get(0).expect("capture 0 always present");
            out.push_str(&template[last..whole.start()]);
            last = whole.end();

            let transform = caps.get(1).map(|g| g.as_str()).unwrap_or("");
            let attr = &caps[2];
            if let Some(value) = tree.element(node).and_then(|el| el.attr(attr)) {
                match self.transform_fn(transform) {
                    Some(f) if !transform.is_empty() => out.push_str(&f(self, value)),
                    _ => out.push_str(value),
                }
            }
        }
        out.push_str(&template[last..]);
        out
    }
}

/// Behavior lookup key: original namespace prefix plus original local name.
/// Elements whose namespace had no registered prefix never resolve a behavior.
fn behavior_name(el: &WebElement) -> Option<String> {
    let idx = el.tag.find('-')?;
    let prefix = &el.tag[..idx];
    let local = &el.tag[idx + 1..];
    if local != el.orig_name {
        return None;
    }
    Some(format!("{prefix}:{}", el.orig_name))
}

fn child_tag_exists(tree: &WebTree, node: WebNodeId, tag: &str) -> bool {
    tree.child_ids(node)
        .iter()
        .any(|&c| tree.element(c).is_some_and(|el| el.tag == tag))
}

/// Visible text length of a markup string, for the data-before/data-after
/// offsets consumed by the viewer.
fn markup_free_len(markup: &str) -> usize {
    let tags = Regex::new(r"<[^>]+>").unwrap();
    tags.replace_all(markup, "").chars().count()
}

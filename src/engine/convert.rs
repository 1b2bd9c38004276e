//! Source tree to converted tree walk.
//!
//! Reads the source DOM only; all output lands in a fresh [`WebTree`].
//! Elements in registered namespaces get `prefix-localName` tags, everything
//! else is copied through verbatim. `tagsDecl` and `prefixDef` carry
//! document-level side effects and are special-cased here.

use regex_lite::Regex;

use crate::dom::{Dom, NodeData, NodeId};

use super::tree::{WebElement, WebNodeId, WebTree};
use super::{Engine, PrefixDef};

impl Engine {
    /// Convert a source subtree into a converted element tree.
    pub fn convert(&mut self, dom: &Dom, root: NodeId) -> WebTree {
        self.convert_with(dom, root, &mut |_, _, _, _| {})
    }

    /// Convert, invoking `per_element` on each newly converted element and
    /// its source counterpart (children already converted).
    pub fn convert_with<F>(&mut self, dom: &Dom, root: NodeId, per_element: &mut F) -> WebTree
    where
        F: FnMut(&mut WebTree, WebNodeId, &Dom, NodeId),
    {
        let mut tree = WebTree::new();
        let converted = self.convert_node(dom, root, &mut tree, per_element);
        tree.set_root(converted);
        tree
    }

    /// Convert and dispatch behaviors in one pass over the document.
    pub fn transform(&mut self, dom: &Dom, root: NodeId) -> WebTree {
        let mut tree = self.convert(dom, root);
        self.apply_behaviors(&mut tree);
        tree
    }

    fn convert_node<F>(
        &mut self,
        dom: &Dom,
        src: NodeId,
        tree: &mut WebTree,
        per_element: &mut F,
    ) -> WebNodeId
    where
        F: FnMut(&mut WebTree, WebNodeId, &Dom, NodeId),
    {
        let node = match dom.get(src) {
            Some(n) => n,
            None => return WebNodeId::NONE,
        };
        match &node.data {
            NodeData::Element(el) => {
                let prefix = el
                    .namespace
                    .as_deref()
                    .and_then(|ns| self.namespaces.prefix_for(ns))
                    .map(str::to_string);

                // Mapped namespaces get the prefix folded into the tag; all
                // others keep their source name.
                let tag = match &prefix {
                    Some(p) => format!("{p}-{}", el.local),
                    None => el.name.clone(),
                };

                let mut element = WebElement::new(tag, el.local.clone());
                for attr in &el.attrs {
                    if attr.name == "xmlns" {
                        // Strip default namespace declarations, but hang on
                        // to the values for round-trip.
                        element.set_attr("data-xmlns", &attr.value);
                    } else {
                        element.set_attr(&attr.name, &attr.value);
                    }
                    match attr.name.as_str() {
                        "xml:id" => element.set_attr("id", &attr.value),
                        "xml:lang" => element.set_attr("lang", &attr.value),
                        "rendition" => {
                            element.set_attr("class", &attr.value.replace('#', ""));
                        }
                        _ => {}
                    }
                }
                element.empty = node.first_child.is_none();

                let converted = tree.create_element(element);

                if el.local == "tagsDecl" {
                    self.convert_tags_decl(dom, src, tree, converted, prefix.as_deref());
                }
                if el.local == "prefixDef" {
                    self.capture_prefix_def(el.attr("ident"), el.attr("matchPattern"), el.attr("replacementPattern"));
                }

                for child in dom.children(src) {
                    let converted_child = self.convert_node(dom, child, tree, per_element);
                    if converted_child.is_some() {
                        tree.append(converted, converted_child);
                    }
                }

                per_element(tree, converted, dom, src);
                converted
            }
            NodeData::Text(t) => tree.create_text(t.clone()),
            NodeData::Comment(c) => tree.create_comment(c.clone()),
            NodeData::Pi(p) => tree.create_pi(p.clone()),
            NodeData::Document => WebNodeId::NONE,
        }
    }

    /// Turn `rendition[@scheme="css"]` children of a `tagsDecl` into an
    /// embedded stylesheet, rewriting element-name selectors to the converted
    /// tag scheme. Malformed rules (no selector, no xml:id) are skipped.
    fn convert_tags_decl(
        &mut self,
        dom: &Dom,
        src: NodeId,
        tree: &mut WebTree,
        converted: WebNodeId,
        prefix: Option<&str>,
    ) {
        let prefix = prefix.unwrap_or("tei");
        let mut css = String::new();

        for child in dom.children(src) {
            let el = match dom.element(child) {
                Some(el) => el,
                None => continue,
            };
            if el.local != "rendition" || el.attr("scheme") != Some("css") {
                continue;
            }
            let body = dom.text_content(child);
            if let Some(selector) = el.attr("selector") {
                css.push_str(&rewrite_selector(selector, prefix));
                css.push_str("{\n");
                css.push_str(&body);
            } else if let Some(id) = el.attr("xml:id") {
                css.push('.');
                css.push_str(id);
                css.push_str("{\n");
                css.push_str(&body);
            } else {
                log::warn!("skipping rendition rule with no selector or xml:id");
                continue;
            }
            css.push_str("\n}\n");
        }

        if !css.is_empty() {
            let mut style = WebElement::new("style", "style");
            style.generated = true;
            let style_id = tree.create_element(style);
            let text = tree.create_text(css);
            tree.append(style_id, text);
            tree.append(converted, style_id);
            self.set_has_style();
        }
    }

    fn capture_prefix_def(
        &mut self,
        ident: Option<&str>,
        match_pattern: Option<&str>,
        replacement_pattern: Option<&str>,
    ) {
        match (ident, match_pattern, replacement_pattern) {
            (Some(ident), Some(m), Some(r)) => {
                self.add_prefix_def(
                    ident.to_string(),
                    PrefixDef {
                        match_pattern: m.to_string(),
                        replacement_pattern: r.to_string(),
                    },
                );
            }
            _ => log::warn!("skipping incomplete prefixDef"),
        }
    }
}

/// Rewrite element names in a CSS-scheme selector to the converted tag scheme
/// and restore id selectors the rewrite touched (`#tei-x` -> `#x`).
fn rewrite_selector(selector: &str, prefix: &str) -> String {
    let name = Regex::new(r"([^#, >]+)").unwrap();
    let rewritten = name.replace_all(selector, format!("{prefix}-$1").as_str());
    rewritten.replace(&format!("#{prefix}-"), "#")
}

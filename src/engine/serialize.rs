//! Rendering a converted tree back to text.
//!
//! Two surfaces: [`serialize`] reconstructs the original XML (used for
//! round-trip verification and for regenerating canonical per-resource XML),
//! and [`to_html`] writes the web form with `prefix-localName` tags and the
//! `data-*` decoration attributes.

use crate::dom::writer::{escape_attr, escape_text};

use super::tree::{WebNodeData, WebNodeId, WebTree};

/// Attributes that exist only as rewrites on the converted node.
const REWRITTEN_ATTRS: [&str; 3] = ["id", "lang", "class"];

/// Serialize a converted element back to XML text. With `strip_outer` set,
/// only the element's content is serialized.
///
/// Recurses into hidden-original children where a behavior has replaced the
/// visible content, so the output reproduces the pristine source.
pub fn serialize(tree: &WebTree, node: WebNodeId, strip_outer: bool) -> String {
    let mut out = String::new();
    serialize_node(tree, node, strip_outer, &mut out);
    out
}

fn serialize_node(tree: &WebTree, id: WebNodeId, strip_outer: bool, out: &mut String) {
    let node = match tree.get(id) {
        Some(n) => n,
        None => return,
    };
    match &node.data {
        WebNodeData::Element(el) => {
            if el.generated {
                return;
            }
            if !strip_outer {
                out.push('<');
                out.push_str(&el.orig_name);
                for attr in &el.attrs {
                    if attr.name == "data-xmlns" {
                        out.push_str(" xmlns=\"");
                        out.push_str(&escape_attr(&attr.value));
                        out.push('"');
                    } else if attr.name.starts_with("data-")
                        || REWRITTEN_ATTRS.contains(&attr.name.as_str())
                    {
                        // Rewrites and decoration, not source attributes
                    } else {
                        out.push(' ');
                        out.push_str(&attr.name);
                        out.push_str("=\"");
                        out.push_str(&escape_attr(&attr.value));
                        out.push('"');
                    }
                }
                if el.empty {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
            }

            // Original content lives in the hidden slot once a behavior fired
            if el.hidden_original.is_empty() {
                for child in tree.child_ids(id) {
                    serialize_node(tree, child, false, out);
                }
            } else {
                for &child in &el.hidden_original {
                    serialize_node(tree, child, false, out);
                }
            }

            if !strip_outer {
                out.push_str("</");
                out.push_str(&el.orig_name);
                out.push('>');
            }
        }
        WebNodeData::Text(t) => out.push_str(&escape_text(t)),
        WebNodeData::Comment(c) => {
            out.push_str("<!--");
            out.push_str(c);
            out.push_str("-->");
        }
        WebNodeData::Pi(p) => {
            out.push_str("<?");
            out.push_str(p);
            out.push_str("?>");
        }
        // Behavior-generated markup has no source counterpart
        WebNodeData::Raw(_) => {}
    }
}

/// Write a converted subtree as HTML-like text.
pub fn to_html(tree: &WebTree, node: WebNodeId) -> String {
    let mut out = String::new();
    html_node(tree, node, &mut out);
    out
}

fn html_node(tree: &WebTree, id: WebNodeId, out: &mut String) {
    let node = match tree.get(id) {
        Some(n) => n,
        None => return,
    };
    match &node.data {
        WebNodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for attr in &el.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&escape_attr(&attr.value));
                out.push('"');
            }
            if !el.generated {
                out.push_str(" data-origname=\"");
                out.push_str(&escape_attr(&el.orig_name));
                out.push('"');
                if el.empty {
                    out.push_str(" data-empty=\"\"");
                }
                if el.processed {
                    out.push_str(" data-processed=\"\"");
                }
            }
            out.push('>');

            if !el.hidden_original.is_empty() {
                out.push_str("<span hidden=\"\" data-original=\"\">");
                for &child in &el.hidden_original {
                    html_node(tree, child, out);
                }
                out.push_str("</span>");
            }
            for child in tree.child_ids(id) {
                html_node(tree, child, out);
            }

            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
        WebNodeData::Text(t) => out.push_str(&escape_text(t)),
        WebNodeData::Comment(c) => {
            out.push_str("<!--");
            out.push_str(c);
            out.push_str("-->");
        }
        WebNodeData::Pi(p) => {
            out.push_str("<?");
            out.push_str(p);
            out.push_str("?>");
        }
        WebNodeData::Raw(markup) => out.push_str(markup),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_xml;
    use crate::engine::behavior::BehaviorSet;
    use crate::engine::{Behavior, Engine};

    const TEI: &str = "http://www.tei-c.org/ns/1.0";

    fn roundtrip(xml: &str) -> String {
        let dom = parse_xml(xml).unwrap();
        let root = dom.root_element().unwrap();
        let mut engine = Engine::new();
        let tree = engine.convert(&dom, root);
        serialize(&tree, tree.root(), false)
    }

    #[test]
    fn roundtrip_without_behaviors() {
        let xml = format!(
            "<TEI xmlns=\"{TEI}\"><teiHeader><fileDesc/></teiHeader>\
             <text xml:id=\"t1\"><pb facs=\"#p1\"/>A<pb facs=\"#p2\"/>B</text></TEI>"
        );
        assert_eq!(roundtrip(&xml), xml);
    }

    #[test]
    fn roundtrip_with_rewritten_attributes() {
        let xml = format!(
            "<TEI xmlns=\"{TEI}\"><p xml:id=\"p1\" xml:lang=\"la\" rendition=\"#hi\">x &amp; y</p></TEI>"
        );
        assert_eq!(roundtrip(&xml), xml);
    }

    #[test]
    fn roundtrip_after_behavior_uses_hidden_original() {
        let xml = format!("<text xmlns=\"{TEI}\"><add>up</add></text>");
        let dom = parse_xml(&xml).unwrap();
        let root = dom.root_element().unwrap();
        let mut engine = Engine::with_behaviors(
            BehaviorSet::new().behavior("tei", "add", Behavior::wrap("`", "`")),
        );
        let tree = engine.transform(&dom, root);
        assert_eq!(serialize(&tree, tree.root(), false), xml);
    }

    #[test]
    fn roundtrip_skips_generated_stylesheet() {
        let xml = format!(
            "<TEI xmlns=\"{TEI}\"><tagsDecl>\
             <rendition selector=\"persName\" scheme=\"css\">color: red;</rendition>\
             </tagsDecl></TEI>"
        );
        assert_eq!(roundtrip(&xml), xml);
    }

    #[test]
    fn strip_outer_serializes_content_only() {
        let xml = format!("<text xmlns=\"{TEI}\"><p>hi</p></text>");
        let dom = parse_xml(&xml).unwrap();
        let root = dom.root_element().unwrap();
        let mut engine = Engine::new();
        let tree = engine.convert(&dom, root);
        assert_eq!(serialize(&tree, tree.root(), true), "<p>hi</p>");
    }

    #[test]
    fn html_carries_decoration_attributes() {
        let xml = format!("<text xmlns=\"{TEI}\"><pb facs=\"#p1\"/></text>");
        let dom = parse_xml(&xml).unwrap();
        let root = dom.root_element().unwrap();
        let mut engine = Engine::new();
        let tree = engine.convert(&dom, root);
        let html = to_html(&tree, tree.root());
        assert!(html.starts_with("<tei-text"), "{html}");
        assert!(html.contains("data-xmlns=\"http://www.tei-c.org/ns/1.0\""), "{html}");
        assert!(html.contains("<tei-pb facs=\"#p1\" data-origname=\"pb\" data-empty=\"\"></tei-pb>"), "{html}");
    }
}

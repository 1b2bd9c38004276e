//! XML source parsing built on quick-xml's namespace-aware reader.
//!
//! Malformed input fails here, before any transformation runs; downstream
//! components assume a well-formed tree.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::error::Result;

use super::arena::{Attribute, Dom, Element, NodeId};

/// Parse an XML string into a source DOM.
pub fn parse_xml(xml: &str) -> Result<Dom> {
    let mut reader = NsReader::from_str(xml);
    let mut dom = Dom::new();
    let mut stack: Vec<NodeId> = vec![dom.document()];

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(e)) => {
                let element = make_element(&e, ns, false)?;
                let id = dom.create_element(element);
                let parent = *stack.last().unwrap_or(&dom.document());
                dom.append(parent, id);
                stack.push(id);
            }
            (ns, Event::Empty(e)) => {
                let element = make_element(&e, ns, true)?;
                let id = dom.create_element(element);
                let parent = *stack.last().unwrap_or(&dom.document());
                dom.append(parent, id);
            }
            (_, Event::End(_)) => {
                stack.pop();
            }
            (_, Event::Text(e)) => {
                // Whitespace between the prolog and the root element is not content
                if stack.len() > 1 {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    let parent = *stack.last().unwrap_or(&dom.document());
                    let id = dom.create_text(text);
                    dom.append(parent, id);
                }
            }
            (_, Event::GeneralRef(e)) => {
                if stack.len() > 1 {
                    let entity = String::from_utf8_lossy(e.as_ref()).into_owned();
                    let parent = *stack.last().unwrap_or(&dom.document());
                    if let Some(resolved) = resolve_entity(&entity) {
                        let id = dom.create_text(resolved);
                        dom.append(parent, id);
                    } else {
                        log::warn!("skipping unknown entity reference &{entity};");
                    }
                }
            }
            (_, Event::CData(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                let parent = *stack.last().unwrap_or(&dom.document());
                let id = dom.create_text(text);
                dom.append(parent, id);
            }
            (_, Event::Comment(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                let parent = *stack.last().unwrap_or(&dom.document());
                let id = dom.create_comment(text);
                dom.append(parent, id);
            }
            (_, Event::PI(e)) => {
                let content = String::from_utf8_lossy(e.as_ref()).into_owned();
                let parent = *stack.last().unwrap_or(&dom.document());
                let id = dom.create_pi(content);
                dom.append(parent, id);
            }
            (_, Event::Decl(_)) | (_, Event::DocType(_)) => {}
            (_, Event::Eof) => break,
        }
    }

    Ok(dom)
}

fn make_element(e: &BytesStart, ns: ResolveResult, self_closing: bool) -> Result<Element> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let namespace = match ns {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    };

    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        attrs.push(Attribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: attr.unescape_value()?.into_owned(),
        });
    }

    Ok(Element {
        name,
        local,
        namespace,
        attrs,
        self_closing,
    })
}

/// Resolve a predefined or numeric character reference.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "amp" => return Some("&".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "quot" => return Some("\"".to_string()),
        "apos" => return Some("'".to_string()),
        _ => {}
    }
    let code = entity.strip_prefix('#')?;
    let value = if let Some(hex) = code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        code.parse::<u32>().ok()?
    };
    char::from_u32(value).map(|c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::arena::NodeData;

    #[test]
    fn parses_elements_and_text() {
        let dom = parse_xml("<root><child key=\"value\">hello</child></root>").unwrap();
        let root = dom.root_element().unwrap();
        assert_eq!(dom.element(root).unwrap().local, "root");

        let child = dom.children(root).next().unwrap();
        let el = dom.element(child).unwrap();
        assert_eq!(el.local, "child");
        assert_eq!(el.attr("key"), Some("value"));
        assert_eq!(dom.text_content(child), "hello");
    }

    #[test]
    fn resolves_namespaces() {
        let dom =
            parse_xml("<TEI xmlns=\"http://www.tei-c.org/ns/1.0\"><text/></TEI>").unwrap();
        let root = dom.root_element().unwrap();
        let el = dom.element(root).unwrap();
        assert_eq!(el.namespace.as_deref(), Some("http://www.tei-c.org/ns/1.0"));

        let text = dom.children(root).next().unwrap();
        let text_el = dom.element(text).unwrap();
        assert_eq!(text_el.namespace.as_deref(), Some("http://www.tei-c.org/ns/1.0"));
        assert!(text_el.self_closing);
    }

    #[test]
    fn prefixed_names_keep_their_source_form() {
        let dom = parse_xml(
            "<r xmlns:svg=\"http://www.w3.org/2000/svg\"><svg:rect/></r>",
        )
        .unwrap();
        let root = dom.root_element().unwrap();
        let rect = dom.children(root).next().unwrap();
        let el = dom.element(rect).unwrap();
        assert_eq!(el.name, "svg:rect");
        assert_eq!(el.local, "rect");
        assert_eq!(el.namespace.as_deref(), Some("http://www.w3.org/2000/svg"));
    }

    #[test]
    fn resolves_entities_in_text() {
        let dom = parse_xml("<r>a &amp; b &#x41;</r>").unwrap();
        let root = dom.root_element().unwrap();
        assert_eq!(dom.text_content(root), "a & b A");
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(parse_xml("<root><unclosed></root>").is_err());
    }

    #[test]
    fn keeps_comments_and_pis() {
        let dom = parse_xml("<r><!--note--><?pi data?></r>").unwrap();
        let root = dom.root_element().unwrap();
        let kinds: Vec<_> = dom
            .children(root)
            .map(|c| match dom.get(c).map(|n| &n.data) {
                Some(NodeData::Comment(_)) => "comment",
                Some(NodeData::Pi(_)) => "pi",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["comment", "pi"]);
    }
}

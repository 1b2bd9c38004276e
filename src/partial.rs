//! Milestone-based partitioning of a transcription into page partials.
//!
//! A partial is the pruned subtree of one resource bounded by a `pb`
//! milestone (inclusive) and the next one (exclusive). The pruning removes
//! sibling chains while ascending toward the resource root, which is
//! equivalent to cutting everything outside the milestone range without ever
//! computing a common ancestor. The source tree is never mutated; all surgery
//! happens on a deep clone.

use crate::dom::{Dom, NodeId};

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    Before,
    After,
}

/// Extract the partial of `resource` belonging to `surface_id`.
///
/// Milestone `facs` references resolve as `#id`, `docid#id` (the scope must
/// match `doc_id`), or a bare `id`. Returns `None` when no milestone in the
/// resource references the surface.
pub fn partition(dom: &Dom, resource: NodeId, surface_id: &str, doc_id: &str) -> Option<Dom> {
    let mut clone = dom.clone_subtree(resource);
    let root = clone.root_element()?;

    let milestones = clone.elements_by_local_name(root, "pb");
    let index = milestones.iter().position(|&pb| {
        clone
            .element(pb)
            .and_then(|el| el.attr("facs"))
            .is_some_and(|facs| facs_matches(facs, surface_id, doc_id))
    });
    let index = match index {
        Some(i) => i,
        None => {
            log::info!("no milestone for surface {surface_id} in this resource");
            return None;
        }
    };

    scrub_tree(&mut clone, milestones[index], root, Direction::Before);
    if let Some(&next) = milestones.get(index + 1) {
        scrub_tree(&mut clone, next, root, Direction::After);
        // Exclusive boundary
        clone.remove(next);
    }

    Some(clone)
}

/// Does a `facs` reference resolve to this surface?
fn facs_matches(facs: &str, surface_id: &str, doc_id: &str) -> bool {
    match facs.split_once('#') {
        Some((scope, id)) => id == surface_id && (scope.is_empty() || scope == doc_id),
        None => facs == surface_id,
    }
}

/// Remove every sibling on one side of `node`, then repeat for each ancestor
/// up to (but not including) `root`.
fn scrub_tree(dom: &mut Dom, node: NodeId, root: NodeId, direction: Direction) {
    let mut current = node;
    while current.is_some() && current != root {
        loop {
            let sibling = match direction {
                Direction::Before => dom.prev_sibling(current),
                Direction::After => dom.next_sibling(current),
            };
            if sibling.is_none() {
                break;
            }
            dom.remove(sibling);
        }
        current = dom.parent(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_xml, write_xml};

    fn partial_xml(xml: &str, surface_id: &str, doc_id: &str) -> Option<String> {
        let dom = parse_xml(xml).unwrap();
        let resource = dom.root_element().unwrap();
        let partial = partition(&dom, resource, surface_id, doc_id)?;
        Some(write_xml(&partial, partial.root_element().unwrap()))
    }

    #[test]
    fn flat_resource_partitions_at_milestones() {
        let xml = "<text><pb facs=\"#p1\"/>A<pb facs=\"#p2\"/>B</text>";
        assert_eq!(
            partial_xml(xml, "p1", "doc").unwrap(),
            "<text><pb facs=\"#p1\"/>A</text>"
        );
        assert_eq!(
            partial_xml(xml, "p2", "doc").unwrap(),
            "<text><pb facs=\"#p2\"/>B</text>"
        );
    }

    #[test]
    fn last_milestone_extends_to_natural_end() {
        let xml = "<text><pb facs=\"#p1\"/>A<div><p>tail</p></div></text>";
        assert_eq!(
            partial_xml(xml, "p1", "doc").unwrap(),
            "<text><pb facs=\"#p1\"/>A<div><p>tail</p></div></text>"
        );
    }

    #[test]
    fn unknown_surface_yields_no_partial() {
        let xml = "<text><pb facs=\"#p1\"/>A</text>";
        assert!(partial_xml(xml, "p9", "doc").is_none());
    }

    #[test]
    fn milestones_nested_in_containers() {
        let xml = "<text><div><pb facs=\"#p1\"/><p>one</p></div>\
                   <div><pb facs=\"#p2\"/><p>two</p></div></text>";
        // The next milestone's emptied container survives the tail trim
        assert_eq!(
            partial_xml(xml, "p1", "doc").unwrap(),
            "<text><div><pb facs=\"#p1\"/><p>one</p></div><div></div></text>"
        );
        assert_eq!(
            partial_xml(xml, "p2", "doc").unwrap(),
            "<text><div><pb facs=\"#p2\"/><p>two</p></div></text>"
        );
    }

    #[test]
    fn boundary_inside_a_paragraph() {
        let xml = "<text><p>start<pb facs=\"#p1\"/>middle<pb facs=\"#p2\"/>end</p></text>";
        assert_eq!(
            partial_xml(xml, "p1", "doc").unwrap(),
            "<text><p><pb facs=\"#p1\"/>middle</p></text>"
        );
        assert_eq!(
            partial_xml(xml, "p2", "doc").unwrap(),
            "<text><p><pb facs=\"#p2\"/>end</p></text>"
        );
    }

    #[test]
    fn coverage_reconstructs_resource_content() {
        // Each text fragment must land in exactly one partial
        let xml = "<text><pb facs=\"#p1\"/>A<pb facs=\"#p2\"/>B<pb facs=\"#p3\"/>C</text>";
        let partials: Vec<String> = ["p1", "p2", "p3"]
            .iter()
            .map(|s| partial_xml(xml, s, "doc").unwrap())
            .collect();
        let merged: String = partials
            .iter()
            .map(|p| {
                p.trim_start_matches("<text>")
                    .trim_end_matches("</text>")
                    .to_string()
            })
            .collect();
        assert_eq!(merged, "<pb facs=\"#p1\"/>A<pb facs=\"#p2\"/>B<pb facs=\"#p3\"/>C");
    }

    #[test]
    fn scoped_references_check_the_document_id() {
        let xml = "<text><pb facs=\"mydoc#p1\"/>A</text>";
        assert!(partial_xml(xml, "p1", "mydoc").is_some());
        assert!(partial_xml(xml, "p1", "otherdoc").is_none());
    }

    #[test]
    fn bare_references_match_directly() {
        let xml = "<text><pb facs=\"p1\"/>A</text>";
        assert_eq!(
            partial_xml(xml, "p1", "doc").unwrap(),
            "<text><pb facs=\"p1\"/>A</text>"
        );
    }

    #[test]
    fn milestones_missing_facs_are_skipped() {
        let xml = "<text><pb/>intro<pb facs=\"#p1\"/>A</text>";
        assert_eq!(
            partial_xml(xml, "p1", "doc").unwrap(),
            "<text><pb facs=\"#p1\"/>A</text>"
        );
    }

    #[test]
    fn source_tree_is_untouched() {
        let xml = "<text><pb facs=\"#p1\"/>A<pb facs=\"#p2\"/>B</text>";
        let dom = parse_xml(xml).unwrap();
        let resource = dom.root_element().unwrap();
        let _ = partition(&dom, resource, "p1", "doc");
        assert_eq!(write_xml(&dom, resource), xml);
    }
}

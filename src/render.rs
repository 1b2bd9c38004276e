//! Whole-document rendering: full HTML, per-resource XML/HTML, per-surface
//! page partials, and the IIIF manifest.
//!
//! Each document renders independently; a failure here is a per-document
//! error value and must never take down a batch run.

use std::collections::BTreeMap;

use crate::dom::{Dom, NodeId, parse_xml, write_xml};
use crate::engine::{Engine, WebNodeId, WebTree, to_html};
use crate::error::{Error, Result};
use crate::facsimile::{Surface, parse_surfaces};
use crate::iiif;
use crate::partial::partition;

/// Element names that act as transcription resources.
const RESOURCE_NAMES: [&str; 2] = ["text", "sourceDoc"];

/// Rendering parameters for one document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Base URL the published site will live under.
    pub base_url: String,
    /// Stable identifier for the TEI document.
    pub document_id: String,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    /// Optional glossary dataset advertised from the manifest.
    pub glossary_url: Option<String>,
}

/// XML and HTML forms of one transcription resource.
#[derive(Debug, Clone)]
pub struct RenderedResource {
    pub xml: String,
    pub html: String,
}

/// A surface together with its page partials, keyed by resource id.
#[derive(Debug, Clone)]
pub struct SurfacePartials {
    pub surface: Surface,
    /// Pre-conversion XML partials per resource.
    pub xmls: BTreeMap<String, String>,
    /// Post-conversion HTML partials per resource.
    pub htmls: BTreeMap<String, String>,
}

/// Everything produced for one TEI document.
pub struct RenderedDocument {
    pub id: String,
    /// The source XML, as received.
    pub xml: String,
    /// The full converted document.
    pub html: String,
    /// IIIF manifest JSON.
    pub manifest: String,
    /// Per-resource renderings, keyed by the resource's xml:id.
    pub resources: BTreeMap<String, RenderedResource>,
    pub surfaces: Vec<SurfacePartials>,
}

/// Render a TEI document with a default engine.
pub fn render_document(xml: &str, options: &RenderOptions) -> Result<RenderedDocument> {
    let mut engine = Engine::new();
    render_document_with(xml, options, &mut engine)
}

/// Render a TEI document through a caller-configured engine (custom
/// behaviors, namespaces, transforms).
pub fn render_document_with(
    xml: &str,
    options: &RenderOptions,
    engine: &mut Engine,
) -> Result<RenderedDocument> {
    let dom = parse_xml(xml)?;
    let root = dom
        .root_element()
        .ok_or_else(|| Error::InvalidDocument("document has no root element".to_string()))?;

    let surfaces = parse_surfaces(&dom)?;

    engine.set_base_url(&format!("{}/{}/", options.base_url, options.document_id));
    let tree = engine.transform(&dom, root);
    let html = to_html(&tree, tree.root());

    let resource_nodes = collect_resources(&dom, root);
    let resources = render_resources(&dom, &tree, &resource_nodes);
    let surfaces = render_surface_partials(&dom, engine, &resource_nodes, surfaces, options);

    let document_url = format!("{}/{}", options.base_url, options.document_id);
    let manifest = iiif::render_manifest(
        &options.document_id,
        &document_url,
        &surfaces,
        options.thumbnail_width,
        options.thumbnail_height,
        options.glossary_url.as_deref(),
    );
    let manifest = serde_json::to_string_pretty(&manifest)?;

    Ok(RenderedDocument {
        id: options.document_id.clone(),
        xml: xml.to_string(),
        html,
        manifest,
        resources,
        surfaces,
    })
}

/// Transcription resource elements carrying an xml:id, in document order.
fn collect_resources(dom: &Dom, root: NodeId) -> Vec<(String, NodeId)> {
    let mut out = Vec::new();
    for name in RESOURCE_NAMES {
        for node in dom.elements_by_local_name(root, name) {
            if let Some(id) = dom.element(node).and_then(|el| el.attr("xml:id")) {
                out.push((id.to_string(), node));
            }
        }
    }
    out
}

fn render_resources(
    dom: &Dom,
    tree: &WebTree,
    resource_nodes: &[(String, NodeId)],
) -> BTreeMap<String, RenderedResource> {
    let mut resources = BTreeMap::new();
    for (id, node) in resource_nodes {
        let xml = write_xml(dom, *node);
        let html = find_converted_resource(tree, id)
            .map(|n| to_html(tree, n))
            .unwrap_or_default();
        resources.insert(id.clone(), RenderedResource { xml, html });
    }
    resources
}

fn find_converted_resource(tree: &WebTree, id: &str) -> Option<WebNodeId> {
    tree.find_element(tree.root(), &|el| {
        RESOURCE_NAMES.contains(&el.orig_name.as_str()) && el.attr("xml:id") == Some(id)
    })
}

fn render_surface_partials(
    dom: &Dom,
    engine: &mut Engine,
    resource_nodes: &[(String, NodeId)],
    surfaces: Vec<Surface>,
    options: &RenderOptions,
) -> Vec<SurfacePartials> {
    surfaces
        .into_iter()
        .map(|surface| {
            let mut xmls = BTreeMap::new();
            let mut htmls = BTreeMap::new();
            for (resource_id, resource) in resource_nodes {
                let partial =
                    match partition(dom, *resource, &surface.id, &options.document_id) {
                        Some(p) => p,
                        None => continue,
                    };
                let partial_root = match partial.root_element() {
                    Some(r) => r,
                    None => continue,
                };
                xmls.insert(resource_id.clone(), write_xml(&partial, partial_root));
                let tree = engine.transform(&partial, partial_root);
                htmls.insert(resource_id.clone(), to_html(&tree, tree.root()));
            }
            SurfacePartials {
                surface,
                xmls,
                htmls,
            }
        })
        .collect()
}

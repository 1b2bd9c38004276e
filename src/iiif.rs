//! IIIF Presentation 3 manifest assembly.
//!
//! One canvas per surface, painted with the facsimile image; the page
//! partials hang off each canvas as supplementing annotations in both XML and
//! HTML form, tagged with the text-partial profile so viewers can recognize
//! them.

use serde_json::{Value, json};

use crate::render::SurfacePartials;

/// Profile identifier for text-partial annotation bodies.
pub const TEXT_PARTIAL_PROFILE: &str =
    "https://github.com/cu-mkp/editioncrafter-project/text-partial-resource.md";

const IMAGE_SERVICE_PROFILE: &str = "http://iiif.io/api/image/2/level2.json";

/// Assemble the manifest for one document.
pub fn render_manifest(
    label: &str,
    base_uri: &str,
    surfaces: &[SurfacePartials],
    thumbnail_width: u32,
    thumbnail_height: u32,
    glossary_url: Option<&str>,
) -> Value {
    let mut manifest = json!({
        "@context": "http://iiif.io/api/presentation/3/context.json",
        "id": format!("{base_uri}/iiif/manifest.json"),
        "type": "Manifest",
        "label": { "en": [label] },
        "items": surfaces
            .iter()
            .map(|s| render_canvas(base_uri, s, thumbnail_width, thumbnail_height))
            .collect::<Vec<_>>(),
    });

    if let Some(glossary_url) = glossary_url {
        manifest["seeAlso"] = json!([{
            "id": glossary_url,
            "type": "Dataset",
            "label": "Glossary",
            "format": "text/json",
        }]);
    }

    manifest
}

fn render_canvas(
    base_uri: &str,
    partials: &SurfacePartials,
    thumbnail_width: u32,
    thumbnail_height: u32,
) -> Value {
    let surface = &partials.surface;
    let canvas_id = format!("{base_uri}/iiif/canvas/{}", surface.id);
    let page_id = format!("{canvas_id}/annotationpage/0");

    let painting = json!({
        "id": format!("{page_id}/annotation/0"),
        "type": "Annotation",
        "motivation": "painting",
        "target": canvas_id,
        "body": {
            "id": surface.image_url,
            "type": "Image",
            "format": "image/jpeg",
            "height": surface.height,
            "width": surface.width,
            "service": [{
                "id": surface.image_url,
                "type": "ImageService2",
                "profile": IMAGE_SERVICE_PROFILE,
            }],
            "thumbnail": [{
                "id": format!(
                    "{}/full/{thumbnail_width},{thumbnail_height}/0/default.jpg",
                    surface.image_url
                ),
                "format": "image/jpeg",
                "type": "ImageService2",
                "profile": IMAGE_SERVICE_PROFILE,
            }],
        },
    });

    let mut canvas = json!({
        "id": canvas_id,
        "type": "Canvas",
        "height": surface.height,
        "width": surface.width,
        "label": { "none": [surface.label] },
        "items": [{
            "id": page_id,
            "type": "AnnotationPage",
            "items": [painting],
        }],
    });

    if let Some(annotations) = render_text_annotation_page(base_uri, &canvas_id, partials, 1) {
        canvas["annotations"] = json!([annotations]);
    }

    canvas
}

/// Annotation page listing the surface's text partials. `None` when no
/// resource produced a partial for this surface.
fn render_text_annotation_page(
    base_uri: &str,
    canvas_id: &str,
    partials: &SurfacePartials,
    index: usize,
) -> Option<Value> {
    if partials.xmls.is_empty() && partials.htmls.is_empty() {
        return None;
    }
    let surface_id = &partials.surface.id;
    let page_id = format!("{canvas_id}/annotationPage/{index}");

    let mut items = Vec::new();
    for resource_id in partials.xmls.keys() {
        let url = format!("{base_uri}/tei/{resource_id}/{surface_id}.xml");
        items.push(render_text_annotation(
            &page_id,
            canvas_id,
            &url,
            items.len(),
            "text/xml",
        ));
    }
    for resource_id in partials.htmls.keys() {
        let url = format!("{base_uri}/html/{resource_id}/{surface_id}.html");
        items.push(render_text_annotation(
            &page_id,
            canvas_id,
            &url,
            items.len(),
            "text/html",
        ));
    }

    Some(json!({
        "id": page_id,
        "type": "AnnotationPage",
        "items": items,
    }))
}

fn render_text_annotation(
    page_id: &str,
    canvas_id: &str,
    text_url: &str,
    index: usize,
    format: &str,
) -> Value {
    json!({
        "id": format!("{page_id}/annotation/{index}"),
        "type": "Annotation",
        "motivation": "supplementing",
        "target": canvas_id,
        "body": {
            "id": text_url,
            "type": "TextPartial",
            "profile": TEXT_PARTIAL_PROFILE,
            "format": format,
        },
    })
}

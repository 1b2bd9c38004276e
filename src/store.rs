//! Writing rendered documents to the published site layout.
//!
//! Each document gets its own directory under the output root:
//!
//! ```text
//! <out>/<id>/tei/index.xml              full source document
//! <out>/<id>/tei/<resource>/index.xml   per-resource XML
//! <out>/<id>/tei/<resource>/<surface>.xml
//! <out>/<id>/html/index.html            full converted document
//! <out>/<id>/html/<resource>/index.html
//! <out>/<id>/html/<resource>/<surface>.html
//! <out>/<id>/iiif/manifest.json
//! ```
//!
//! The paths mirror the annotation URLs in the manifest, so a static file
//! server rooted at the base URL resolves every body `id` directly.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::render::RenderedDocument;

/// Write one rendered document under `out_dir`.
pub fn write_document(document: &RenderedDocument, out_dir: impl AsRef<Path>) -> Result<()> {
    let doc_dir = out_dir.as_ref().join(&document.id);
    let tei_dir = doc_dir.join("tei");
    let html_dir = doc_dir.join("html");
    let iiif_dir = doc_dir.join("iiif");

    fs::create_dir_all(&tei_dir)?;
    fs::create_dir_all(&html_dir)?;
    fs::create_dir_all(&iiif_dir)?;

    fs::write(tei_dir.join("index.xml"), &document.xml)?;
    fs::write(html_dir.join("index.html"), &document.html)?;
    fs::write(iiif_dir.join("manifest.json"), &document.manifest)?;

    for (resource_id, resource) in &document.resources {
        let resource_tei = tei_dir.join(resource_id);
        let resource_html = html_dir.join(resource_id);
        fs::create_dir_all(&resource_tei)?;
        fs::create_dir_all(&resource_html)?;
        fs::write(resource_tei.join("index.xml"), &resource.xml)?;
        fs::write(resource_html.join("index.html"), &resource.html)?;
    }

    for partials in &document.surfaces {
        let surface_id = &partials.surface.id;
        for (resource_id, xml) in &partials.xmls {
            let file = tei_dir.join(resource_id).join(format!("{surface_id}.xml"));
            fs::write(file, xml)?;
        }
        for (resource_id, html) in &partials.htmls {
            let file = html_dir.join(resource_id).join(format!("{surface_id}.html"));
            fs::write(file, html)?;
        }
    }

    log::info!("wrote document {} to {}", document.id, doc_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderOptions, render_document};

    const DOC: &str = r##"<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <facsimile>
    <surface xml:id="p1" lrx="100" lry="200">
      <label>1r</label>
      <graphic url="https://img.example.com/p1"/>
    </surface>
  </facsimile>
  <text xml:id="main"><pb facs="#p1"/>A</text>
</TEI>"##;

    fn rendered() -> crate::render::RenderedDocument {
        render_document(
            DOC,
            &RenderOptions {
                base_url: "https://example.com".to_string(),
                document_id: "mydoc".to_string(),
                thumbnail_width: 124,
                thumbnail_height: 192,
                glossary_url: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn writes_site_layout() {
        let dir = tempfile::tempdir().unwrap();
        write_document(&rendered(), dir.path()).unwrap();

        let doc = dir.path().join("mydoc");
        assert!(doc.join("tei/index.xml").is_file());
        assert!(doc.join("html/index.html").is_file());
        assert!(doc.join("iiif/manifest.json").is_file());
        assert!(doc.join("tei/main/index.xml").is_file());
        assert!(doc.join("html/main/index.html").is_file());
        assert!(doc.join("tei/main/p1.xml").is_file());
        assert!(doc.join("html/main/p1.html").is_file());
    }

    #[test]
    fn written_files_match_rendered_content() {
        let dir = tempfile::tempdir().unwrap();
        let document = rendered();
        write_document(&document, dir.path()).unwrap();

        let doc = dir.path().join("mydoc");
        assert_eq!(fs::read_to_string(doc.join("tei/index.xml")).unwrap(), DOC);
        assert_eq!(
            fs::read_to_string(doc.join("iiif/manifest.json")).unwrap(),
            document.manifest
        );
        assert_eq!(
            fs::read_to_string(doc.join("tei/main/p1.xml")).unwrap(),
            *document.surfaces[0].xmls.get("main").unwrap()
        );
    }
}

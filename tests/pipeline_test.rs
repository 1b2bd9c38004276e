//! End-to-end pipeline tests.
//!
//! Render a small but complete TEI edition (header with CSS renditions,
//! facsimile, paged transcription) and verify the full HTML, the per-surface
//! partials, the IIIF manifest, and the on-disk site layout.

use folio::{
    Behavior, BehaviorSet, Engine, RenderOptions, render_document, render_document_with,
    write_document,
};

const EDITION: &str = "<TEI xmlns=\"http://www.tei-c.org/ns/1.0\">\
<teiHeader><encodingDesc><tagsDecl>\
<rendition selector=\"persName\" scheme=\"css\">color: red;</rendition>\
</tagsDecl></encodingDesc></teiHeader>\
<facsimile>\
<surface xml:id=\"f001r\" ulx=\"0\" uly=\"0\" lrx=\"2536\" lry=\"3893\">\
<label>1r</label><graphic url=\"https://images.example.com/iiif/f001r\"/></surface>\
<surface xml:id=\"f001v\" ulx=\"0\" uly=\"0\" lrx=\"2536\" lry=\"3893\">\
<label>1v</label><graphic url=\"https://images.example.com/iiif/f001v\"/></surface>\
</facsimile>\
<text xml:id=\"transcription\"><body>\
<div><pb facs=\"#f001r\"/><p>One <persName>Anne</persName></p></div>\
<div><pb facs=\"#f001v\"/><p>Two</p></div>\
</body></text></TEI>";

fn options() -> RenderOptions {
    RenderOptions {
        base_url: "https://example.com/editions".to_string(),
        document_id: "ms-1".to_string(),
        thumbnail_width: 124,
        thumbnail_height: 192,
        glossary_url: None,
    }
}

#[test]
fn full_document_html() {
    let doc = render_document(EDITION, &options()).unwrap();

    assert!(doc.html.starts_with("<tei-TEI"));
    assert!(doc.html.contains("<tei-persName"));
    // tagsDecl renditions became an embedded stylesheet with rewritten selectors
    assert!(doc.html.contains("<style>"));
    assert!(doc.html.contains("tei-persName{"));
    assert!(doc.html.contains("color: red;"));
}

#[test]
fn source_document_is_preserved() {
    let doc = render_document(EDITION, &options()).unwrap();
    assert_eq!(doc.xml, EDITION);

    let resource = doc.resources.get("transcription").unwrap();
    assert!(resource.xml.starts_with("<text xml:id=\"transcription\">"));
    assert!(resource.xml.contains("<persName>Anne</persName>"));
}

#[test]
fn surfaces_partition_the_transcription() {
    let doc = render_document(EDITION, &options()).unwrap();
    assert_eq!(doc.surfaces.len(), 2);

    let recto = &doc.surfaces[0];
    assert_eq!(recto.surface.id, "f001r");
    assert_eq!(
        recto.xmls.get("transcription").unwrap(),
        "<text xml:id=\"transcription\"><body>\
         <div><pb facs=\"#f001r\"/><p>One <persName>Anne</persName></p></div>\
         <div></div></body></text>"
    );

    let verso = &doc.surfaces[1];
    assert_eq!(
        verso.xmls.get("transcription").unwrap(),
        "<text xml:id=\"transcription\"><body>\
         <div><pb facs=\"#f001v\"/><p>Two</p></div></body></text>"
    );
    assert!(verso.htmls.get("transcription").unwrap().contains("Two"));
}

#[test]
fn manifest_links_canvases_to_partials() {
    let doc = render_document(EDITION, &options()).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&doc.manifest).unwrap();

    assert_eq!(
        manifest["id"],
        "https://example.com/editions/ms-1/iiif/manifest.json"
    );
    assert_eq!(manifest["label"]["en"][0], "ms-1");

    let canvases = manifest["items"].as_array().unwrap();
    assert_eq!(canvases.len(), 2);
    assert_eq!(
        canvases[0]["id"],
        "https://example.com/editions/ms-1/iiif/canvas/f001r"
    );
    assert_eq!(canvases[0]["label"]["none"][0], "1r");

    let painting = &canvases[0]["items"][0]["items"][0];
    assert_eq!(painting["body"]["id"], "https://images.example.com/iiif/f001r");
    assert_eq!(painting["body"]["width"], 2536);

    let texts = canvases[0]["annotations"][0]["items"].as_array().unwrap();
    let ids: Vec<&str> = texts.iter().map(|a| a["body"]["id"].as_str().unwrap()).collect();
    assert!(ids.contains(&"https://example.com/editions/ms-1/tei/transcription/f001r.xml"));
    assert!(ids.contains(&"https://example.com/editions/ms-1/html/transcription/f001r.html"));
}

#[test]
fn behaviors_rewrite_html_but_not_xml() {
    let mut engine = Engine::with_behaviors(
        BehaviorSet::new().behavior("tei", "persName", Behavior::wrap("[", "]")),
    );
    let doc = render_document_with(EDITION, &options(), &mut engine).unwrap();

    assert!(doc.html.contains("[Anne]"));
    // Original content survives, hidden, for client-side recovery
    assert!(doc.html.contains("data-original"));

    // XML outputs stay pristine
    let resource = doc.resources.get("transcription").unwrap();
    assert!(resource.xml.contains("<persName>Anne</persName>"));
    assert!(!resource.xml.contains('['));

    // Partials are converted through the same behaviors
    let recto_html = doc.surfaces[0].htmls.get("transcription").unwrap();
    assert!(recto_html.contains("[Anne]"));
}

#[test]
fn written_site_serves_manifest_urls() {
    let doc = render_document(EDITION, &options()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_document(&doc, dir.path()).unwrap();

    // Every annotation body URL resolves to a file under the document root
    let manifest: serde_json::Value = serde_json::from_str(&doc.manifest).unwrap();
    let base = "https://example.com/editions/ms-1/";
    for canvas in manifest["items"].as_array().unwrap() {
        for annotation in canvas["annotations"][0]["items"].as_array().unwrap() {
            let url = annotation["body"]["id"].as_str().unwrap();
            let relative = url.strip_prefix(base).unwrap();
            assert!(
                dir.path().join("ms-1").join(relative).is_file(),
                "missing {relative}"
            );
        }
    }

    assert!(dir.path().join("ms-1/tei/index.xml").is_file());
    assert!(dir.path().join("ms-1/html/index.html").is_file());
    assert!(dir.path().join("ms-1/iiif/manifest.json").is_file());
}

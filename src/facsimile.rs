//! Facsimile surface parsing.
//!
//! Surfaces model single manuscript leaves: a stable id, a human label, the
//! facsimile image URL, and pixel extents. They are parsed independently of
//! the transcription resources; milestones reference them by id only.

use crate::dom::{Dom, NodeId};
use crate::error::{Error, Result};

/// One manuscript page/leaf bound to a facsimile image.
#[derive(Debug, Clone)]
pub struct Surface {
    pub id: String,
    pub label: String,
    pub image_url: String,
    pub width: u32,
    pub height: u32,
}

/// Parse all surfaces from the document's `facsimile` container.
///
/// Exactly one `facsimile` element is required. Surfaces missing an id,
/// a `graphic` URL, or pixel extents are skipped with a warning.
pub fn parse_surfaces(dom: &Dom) -> Result<Vec<Surface>> {
    let root = dom
        .root_element()
        .ok_or_else(|| Error::InvalidDocument("document has no root element".to_string()))?;

    let facsimiles = dom.elements_by_local_name(root, "facsimile");
    let facsimile = match facsimiles.as_slice() {
        [one] => *one,
        [] => return Err(Error::MissingElement("facsimile".to_string())),
        _ => {
            return Err(Error::InvalidDocument(
                "document must contain exactly one facsimile".to_string(),
            ));
        }
    };

    let mut surfaces = Vec::new();
    for surface in dom.elements_by_local_name(facsimile, "surface") {
        match parse_surface(dom, surface) {
            Some(s) => surfaces.push(s),
            None => log::warn!("skipping incomplete surface element"),
        }
    }
    Ok(surfaces)
}

fn parse_surface(dom: &Dom, surface: NodeId) -> Option<Surface> {
    let el = dom.element(surface)?;
    let id = el.attr("xml:id")?.to_string();
    let width = el.attr("lrx")?.parse().ok()?;
    let height = el.attr("lry")?.parse().ok()?;

    let label = dom
        .elements_by_local_name(surface, "label")
        .first()
        .map(|&l| dom.text_content(l))
        .unwrap_or_default();

    let image_url = dom
        .elements_by_local_name(surface, "graphic")
        .iter()
        .find_map(|&g| dom.element(g)?.attr("url"))?
        .to_string();

    Some(Surface {
        id,
        label,
        image_url,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_xml;

    const DOC: &str = r##"<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <facsimile>
    <surface xml:id="p1" ulx="0" uly="0" lrx="2536" lry="3893">
      <label>folio 1 recto</label>
      <graphic url="https://images.example.com/iiif/p1"/>
    </surface>
    <surface xml:id="p2" ulx="0" uly="0" lrx="2536" lry="3893">
      <label>folio 1 verso</label>
      <graphic url="https://images.example.com/iiif/p2"/>
    </surface>
    <surface xml:id="broken">
      <label>no extents</label>
    </surface>
  </facsimile>
  <text><pb facs="#p1"/>A</text>
</TEI>"##;

    #[test]
    fn parses_complete_surfaces() {
        let dom = parse_xml(DOC).unwrap();
        let surfaces = parse_surfaces(&dom).unwrap();
        assert_eq!(surfaces.len(), 2);

        let first = &surfaces[0];
        assert_eq!(first.id, "p1");
        assert_eq!(first.label, "folio 1 recto");
        assert_eq!(first.image_url, "https://images.example.com/iiif/p1");
        assert_eq!(first.width, 2536);
        assert_eq!(first.height, 3893);
    }

    #[test]
    fn missing_facsimile_is_an_error() {
        let dom = parse_xml("<TEI><text/></TEI>").unwrap();
        assert!(matches!(
            parse_surfaces(&dom),
            Err(Error::MissingElement(_))
        ));
    }

    #[test]
    fn multiple_facsimiles_are_rejected() {
        let dom = parse_xml("<TEI><facsimile/><facsimile/></TEI>").unwrap();
        assert!(matches!(
            parse_surfaces(&dom),
            Err(Error::InvalidDocument(_))
        ));
    }
}

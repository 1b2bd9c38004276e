//! # folio
//!
//! A library for turning TEI XML editions into browsable web documents:
//! custom-element HTML, page-level text partials, and IIIF Presentation 3
//! manifests.
//!
//! ## Features
//!
//! - Convert TEI (and other namespaced XML) into `prefix-localName` custom
//!   elements, with attribute rewriting and CSS extraction from `tagsDecl`
//! - Customize rendering through registered behaviors: templates, CSS-like
//!   rules, or plain functions
//! - Partition transcriptions into per-page partials at `pb` milestones
//! - Emit IIIF manifests that tie each facsimile surface to its text partials
//! - Round-trip: converted trees serialize back to the original XML
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::{render_document, write_document, RenderOptions};
//!
//! let xml = std::fs::read_to_string("edition.xml").unwrap();
//! let options = RenderOptions {
//!     base_url: "https://example.com/editions".to_string(),
//!     document_id: "ms-1234".to_string(),
//!     thumbnail_width: 124,
//!     thumbnail_height: 192,
//!     glossary_url: None,
//! };
//! let document = render_document(&xml, &options).unwrap();
//! write_document(&document, "build/").unwrap();
//! ```
//!
//! ## Customizing Conversion
//!
//! The [`Engine`] owns namespace registrations and behaviors. Behaviors match
//! elements by namespace prefix and local name and rewrite how they render,
//! while keeping the original content recoverable:
//!
//! ```
//! use folio::{parse_xml, Behavior, BehaviorSet, Engine, to_html};
//!
//! let mut engine = Engine::with_behaviors(
//!     BehaviorSet::new().behavior("tei", "del", Behavior::wrap("<s>", "</s>")),
//! );
//! let dom = parse_xml("<text xmlns=\"http://www.tei-c.org/ns/1.0\"><del>no</del></text>").unwrap();
//! let root = dom.root_element().unwrap();
//! let tree = engine.transform(&dom, root);
//! let html = to_html(&tree, tree.root());
//! assert!(html.contains("<s>no</s>"));
//! ```

pub mod dom;
pub mod engine;
pub mod error;
pub mod facsimile;
pub mod iiif;
pub mod partial;
pub mod render;
pub mod store;

pub use dom::{Dom, NodeId, parse_xml, write_xml};
pub use engine::{Behavior, BehaviorSet, Engine, Rule, Selector, Template, serialize, to_html};
pub use error::{Error, Result};
pub use facsimile::{Surface, parse_surfaces};
pub use partial::partition;
pub use render::{RenderOptions, RenderedDocument, RenderedResource, SurfacePartials, render_document, render_document_with};
pub use store::write_document;

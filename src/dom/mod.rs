//! Source-side XML document model: arena tree, parser, and writer.

pub mod arena;
pub mod parser;
pub mod writer;

pub use arena::{Attribute, Children, Dom, Element, Node, NodeData, NodeId};
pub use parser::parse_xml;
pub use writer::write_xml;

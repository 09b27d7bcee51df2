//! # saxtree
//!
//! A reference-counted XML node tree built from SAX events.
//!
//! An event source (the bundled [`sax::XmlSource`] over `quick-xml`, or any
//! [`sax::EventSource`]) pushes events into a [`TreeBuilder`], which grows a
//! tree of shared [`Node`] handles. A [`Document`] runs that process and
//! keeps the resulting root, replacing it atomically on each parse.
//!
//! ## Quick Start
//!
//! ```
//! use saxtree::{Document, NodeKind};
//!
//! let doc = Document::from_xml("<root><child id=\"c1\">Hello</child></root>").unwrap();
//! let root = doc.root().unwrap();
//! assert_eq!(root.tag_name().as_deref(), Some("ROOT"));
//!
//! let child = root.first_child().unwrap();
//! assert_eq!(child.kind(), NodeKind::Element);
//! assert_eq!(child.attribute("ID").as_deref(), Some("c1"));
//! assert_eq!(root.text(), "Hello");
//! ```

pub mod builder;
pub mod document;
pub mod error;
pub mod sax;
pub mod tree;

// Re-export primary types at the crate root for convenience.
pub use builder::{BuildOptions, TreeBuilder};
pub use document::Document;
pub use error::{DomError, ParseError};
pub use tree::{Attribute, Node, NodeKind};

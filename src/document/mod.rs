//! The document container.
//!
//! A [`Document`] owns the root element of the most recent successful
//! parse together with its doctype name. Parsing is all-or-nothing: a
//! failed parse leaves the previous tree in place.

use crate::builder::{BuildOptions, TreeBuilder};
use crate::error::{DomError, ParseDiagnostic, ParseError};
use crate::sax::{EventSource, XmlSource};
use crate::tree::{Node, NodeKind};

const DEFAULT_VERSION: &str = "1.0";
const DEFAULT_CHARSET: &str = "UTF-8";

/// Holds the root of a parsed tree.
///
/// # Examples
///
/// ```
/// use saxtree::Document;
///
/// let mut doc = Document::new();
/// assert!(doc.root().is_none());
///
/// doc.parse_str("<!DOCTYPE note><note><to>Tove</to></note>").unwrap();
/// assert_eq!(doc.doctype(), Some("NOTE"));
/// assert_eq!(doc.root().unwrap().text(), "Tove");
///
/// // a failed parse keeps the old tree
/// assert!(doc.parse_str("<a><b></a>").is_err());
/// assert_eq!(doc.root().unwrap().name(), "note");
/// ```
#[derive(Debug, Default)]
pub struct Document {
    options: BuildOptions,
    root: Option<Node>,
    doctype: Option<String>,
    version: Option<String>,
    encoding: Option<String>,
    diagnostics: Vec<ParseDiagnostic>,
}

impl Document {
    /// Creates an empty document with default build options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document whose parses use `options`.
    #[must_use]
    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Parses an XML string into a new document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the XML is malformed or a tree cannot be
    /// built from it.
    pub fn from_xml(xml: &str) -> Result<Self, ParseError> {
        let mut doc = Self::new();
        doc.parse_str(xml)?;
        Ok(doc)
    }

    /// Builds a tree from `source` and installs it as this document's
    /// content.
    ///
    /// The new root is installed before the old one is released. On
    /// failure nothing changes and any partially built tree is dropped.
    ///
    /// # Errors
    ///
    /// Returns whatever error the source or the builder reported.
    pub fn parse(&mut self, source: &mut dyn EventSource) -> Result<(), ParseError> {
        let mut builder = TreeBuilder::with_options(self.options.clone());
        if let Err(err) = source.drive(&mut builder) {
            log::debug!(target: "saxtree.document", "parse failed, keeping previous tree: {err}");
            return Err(err);
        }
        let output = builder.finish();

        let previous = std::mem::replace(&mut self.root, output.root);
        self.doctype = output.doctype;
        self.version = output.version;
        self.encoding = output.encoding;
        self.diagnostics = output.diagnostics;
        log::debug!(
            target: "saxtree.document",
            "installed new root {:?} with {} diagnostic(s)",
            self.root.as_ref().map(Node::name),
            self.diagnostics.len()
        );
        drop(previous);
        Ok(())
    }

    /// Parses an XML string with the built-in event source.
    ///
    /// # Errors
    ///
    /// See [`parse`](Document::parse).
    pub fn parse_str(&mut self, xml: &str) -> Result<(), ParseError> {
        self.parse(&mut XmlSource::new(xml))
    }

    /// Returns a new handle to the root element.
    #[must_use]
    pub fn root(&self) -> Option<Node> {
        self.root.clone()
    }

    /// Replaces the root element and returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidArgument`] if `root` is not a detached
    /// element.
    pub fn set_root(&mut self, root: Option<Node>) -> Result<Option<Node>, DomError> {
        if let Some(node) = &root {
            if node.kind() != NodeKind::Element {
                return Err(DomError::InvalidArgument("document root must be an element"));
            }
            if node.parent().is_some() {
                return Err(DomError::InvalidArgument("document root must be detached"));
            }
        }
        Ok(std::mem::replace(&mut self.root, root))
    }

    /// The doctype name of the last parse.
    #[must_use]
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// The XML version, `"1.0"` unless the input declared another.
    #[must_use]
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// The declared character set, `"UTF-8"` if none was declared.
    #[must_use]
    pub fn charset(&self) -> &str {
        self.encoding.as_deref().unwrap_or(DEFAULT_CHARSET)
    }

    /// Non-fatal diagnostics from the last successful parse.
    #[must_use]
    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    /// The options used for parsing.
    #[must_use]
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Creates a detached node for use in this document.
    #[must_use]
    pub fn create_element(&self, kind: NodeKind, name: &str) -> Node {
        Node::create(name, kind)
    }
}

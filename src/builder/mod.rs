//! Tree construction from SAX events.
//!
//! [`TreeBuilder`] is a [`ContentHandler`] that keeps a cursor (the
//! currently open element) and grows a [`Node`] tree under it as events
//! arrive. Character data goes through a [`TextAccumulator`] so that text
//! split over several `characters` events ends up in one node.
//!
//! ```
//! use saxtree::builder::TreeBuilder;
//! use saxtree::sax::{EventSource, XmlSource};
//!
//! let mut builder = TreeBuilder::new();
//! XmlSource::new("<a><b>x</b>y</a>").drive(&mut builder).unwrap();
//! let output = builder.finish();
//! let root = output.root.unwrap();
//! assert_eq!(root.tag_name().as_deref(), Some("A"));
//! assert_eq!(root.text(), "xy");
//! ```

pub mod text;

use crate::error::{DomError, ParseDiagnostic, Severity};
use crate::sax::ContentHandler;
use crate::tree::{Attribute, Node};

pub use text::{Pending, TextAccumulator};

/// Options that control how events become a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum element nesting depth (default: unlimited).
    pub max_depth: u32,
    /// If true, whitespace-only text runs become text nodes.
    pub preserve_whitespace: bool,
    /// If true, the recorded doctype name is uppercased.
    pub uppercase_doctype: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: u32::MAX,
            preserve_whitespace: false,
            uppercase_doctype: true,
        }
    }
}

impl BuildOptions {
    /// Sets the maximum element nesting depth. Deeper input fails with
    /// [`DomError::DepthLimitExceeded`].
    #[must_use]
    pub fn max_depth(mut self, max: u32) -> Self {
        self.max_depth = max;
        self
    }

    /// Keeps or discards whitespace-only text runs.
    #[must_use]
    pub fn preserve_whitespace(mut self, yes: bool) -> Self {
        self.preserve_whitespace = yes;
        self
    }

    /// Enables or disables uppercasing of the doctype name.
    #[must_use]
    pub fn uppercase_doctype(mut self, yes: bool) -> Self {
        self.uppercase_doctype = yes;
        self
    }
}

/// What a finished builder produced.
#[derive(Debug, Default)]
pub struct BuildOutput {
    /// The document element, if any element was seen.
    pub root: Option<Node>,
    /// The doctype name, if a doctype was declared.
    pub doctype: Option<String>,
    /// Version from the XML declaration, if present.
    pub version: Option<String>,
    /// Encoding from the XML declaration, if present.
    pub encoding: Option<String>,
    /// Non-fatal findings, in event order.
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Builds a node tree from the events pushed into it.
#[derive(Debug)]
pub struct TreeBuilder {
    options: BuildOptions,
    current: Option<Node>,
    root: Option<Node>,
    doctype: Option<String>,
    version: Option<String>,
    encoding: Option<String>,
    text: TextAccumulator,
    depth: u32,
    event: usize,
    diagnostics: Vec<ParseDiagnostic>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Creates a builder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(BuildOptions::default())
    }

    /// Creates a builder with the given options.
    #[must_use]
    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            text: TextAccumulator::with_blank_runs(options.preserve_whitespace),
            options,
            current: None,
            root: None,
            doctype: None,
            version: None,
            encoding: None,
            depth: 0,
            event: 0,
            diagnostics: Vec::new(),
        }
    }

    /// The options this builder was created with.
    #[must_use]
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// The element new content is appended to, if one is open.
    #[must_use]
    pub fn current(&self) -> Option<&Node> {
        self.current.as_ref()
    }

    /// The document element, once its start tag has been seen.
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// The recorded doctype name.
    #[must_use]
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Current element nesting depth.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Diagnostics collected so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    /// Consumes the builder and returns what it built.
    ///
    /// Elements still open at this point are kept as they are; an error
    /// diagnostic records how many there were.
    #[must_use]
    pub fn finish(mut self) -> BuildOutput {
        if self.depth > 0 {
            let message = format!("{} element(s) still open at end of input", self.depth);
            self.diagnose(Severity::Error, message);
        }
        BuildOutput {
            root: self.root,
            doctype: self.doctype,
            version: self.version,
            encoding: self.encoding,
            diagnostics: self.diagnostics,
        }
    }

    /// Counts the event being handled.
    fn next_event(&mut self) {
        self.event += 1;
    }

    fn diagnose(&mut self, severity: Severity, message: String) {
        log::warn!(target: "saxtree.builder", "{message}");
        self.diagnostics.push(ParseDiagnostic {
            severity,
            message,
            // the event that triggered this was already counted
            event: self.event.saturating_sub(1),
        });
    }

    /// The open element, or an `UnexpectedState` error naming `event`.
    fn insertion_point(&self, event: &'static str) -> Result<Node, DomError> {
        self.current
            .clone()
            .ok_or(DomError::UnexpectedState { event })
    }

    /// Flushes pending text into the open element and appends `node` after it.
    fn append_leaf(&mut self, event: &'static str, node: &Node) -> Result<(), DomError> {
        let parent = self.insertion_point(event)?;
        self.text.flush(&parent)?;
        parent.append_detached(node)?;
        log::trace!(target: "saxtree.builder", "appended {} under <{}>", node.kind(), parent.name());
        Ok(())
    }
}

impl ContentHandler for TreeBuilder {
    fn start_document(&mut self) -> Result<(), DomError> {
        self.next_event();
        Ok(())
    }

    fn xml_declaration(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        _standalone: Option<bool>,
    ) -> Result<(), DomError> {
        self.next_event();
        self.version = Some(version.to_string());
        self.encoding = encoding.map(str::to_string);
        Ok(())
    }

    fn start_dtd(
        &mut self,
        name: &str,
        _public_id: Option<&str>,
        _system_id: Option<&str>,
    ) -> Result<(), DomError> {
        self.next_event();
        let name = if self.options.uppercase_doctype {
            name.to_ascii_uppercase()
        } else {
            name.to_string()
        };
        self.doctype = Some(name);
        Ok(())
    }

    fn end_dtd(&mut self) -> Result<(), DomError> {
        self.next_event();
        Ok(())
    }

    fn start_element(
        &mut self,
        _uri: &str,
        _local_name: &str,
        qname: &str,
        attributes: &[Attribute],
    ) -> Result<(), DomError> {
        self.next_event();
        if qname.is_empty() {
            return Err(DomError::InvalidArgument("element name must not be empty"));
        }
        if self.current.is_none() && self.root.is_some() {
            return Err(DomError::UnexpectedState {
                event: "start_element",
            });
        }
        if self.depth >= self.options.max_depth {
            return Err(DomError::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }

        let element = Node::new_element(qname);
        for attr in attributes {
            element.set_attribute(&attr.name, &attr.value)?;
        }
        match &self.current {
            Some(parent) => {
                self.text.flush(parent)?;
                parent.append_detached(&element)?;
            }
            None => self.root = Some(element.clone()),
        }
        log::trace!(target: "saxtree.builder", "opened <{qname}> at depth {}", self.depth);
        self.current = Some(element);
        self.depth += 1;
        Ok(())
    }

    fn end_element(&mut self, _uri: &str, _local_name: &str, qname: &str) -> Result<(), DomError> {
        self.next_event();
        let current = self.insertion_point("end_element")?;
        self.text.flush(&current)?;

        let open = current.name();
        if open != qname {
            self.diagnose(
                Severity::Warning,
                format!("end tag </{qname}> does not match <{open}>"),
            );
        }
        self.current = current.parent();
        self.depth = self.depth.saturating_sub(1);
        log::trace!(target: "saxtree.builder", "closed <{open}>");
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), DomError> {
        self.next_event();
        self.insertion_point("characters")?;
        self.text.append(text)
    }

    fn start_cdata(&mut self) -> Result<(), DomError> {
        self.next_event();
        let parent = self.insertion_point("start_cdata")?;
        self.text.begin_cdata(&parent)
    }

    fn end_cdata(&mut self) -> Result<(), DomError> {
        self.next_event();
        let parent = self.insertion_point("end_cdata")?;
        self.text.end_cdata(&parent)?;
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), DomError> {
        self.next_event();
        let node = Node::new_comment(text);
        self.append_leaf("comment", &node)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), DomError> {
        self.next_event();
        if target.is_empty() {
            return Err(DomError::InvalidArgument(
                "processing instruction target must not be empty",
            ));
        }
        let node = Node::new_processing_instruction(target, data);
        self.append_leaf("processing_instruction", &node)
    }

    fn end_document(&mut self) -> Result<(), DomError> {
        self.next_event();
        Ok(())
    }
}

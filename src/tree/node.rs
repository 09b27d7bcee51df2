//! Node type definitions.
//!
//! The `NodeKind` enum names the node types an element tree can hold. The
//! payload (name, data, attributes, children) lives in the node itself, so
//! the kind is a plain tag.

use std::fmt;

/// The kind of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An element node, e.g. `<item id="x">`. Carries a tag name,
    /// attributes and children.
    Element,

    /// Character data. Produced from text runs and CDATA sections alike.
    Text,

    /// A comment, without the `<!--` and `-->` delimiters.
    Comment,

    /// A processing instruction, e.g. `<?xml-stylesheet href="a.xsl"?>`.
    /// The target is the node's name; the data is held by a single Text
    /// child.
    ProcessingInstruction,

    /// Anything else a caller creates by hand (entity references, etc.).
    Other,
}

impl NodeKind {
    /// Returns `true` for kinds that carry a tag name.
    #[must_use]
    pub fn is_named(self) -> bool {
        matches!(self, Self::Element | Self::ProcessingInstruction)
    }

    /// Returns `true` for kinds that carry literal data.
    #[must_use]
    pub fn has_data(self) -> bool {
        matches!(self, Self::Text | Self::Comment)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Element => "element",
            Self::Text => "text",
            Self::Comment => "comment",
            Self::ProcessingInstruction => "processing-instruction",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

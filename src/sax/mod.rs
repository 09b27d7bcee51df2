//! SAX2 event contract between event sources and the tree builder.
//!
//! An event source (a tokenizer, a recorded event log, ...) pushes one call
//! per event into a [`ContentHandler`]. Handlers report failure by returning
//! an error, which makes the source stop and wrap it in a
//! [`ParseError::Build`] carrying the zero-based index of the event.
//!
//! # Examples
//!
//! ```
//! use saxtree::error::DomError;
//! use saxtree::sax::{ContentHandler, EventSource, XmlSource};
//! use saxtree::tree::Attribute;
//!
//! struct ElementCounter {
//!     count: usize,
//! }
//!
//! impl ContentHandler for ElementCounter {
//!     fn start_element(
//!         &mut self,
//!         _uri: &str,
//!         _local_name: &str,
//!         _qname: &str,
//!         _attributes: &[Attribute],
//!     ) -> Result<(), DomError> {
//!         self.count += 1;
//!         Ok(())
//!     }
//! }
//!
//! let mut counter = ElementCounter { count: 0 };
//! XmlSource::new("<root><a/><b/><c/></root>").drive(&mut counter).unwrap();
//! assert_eq!(counter.count, 4);
//! ```

mod reader;

pub use reader::XmlSource;

use crate::error::{DomError, ParseError};
use crate::tree::Attribute;

/// Receiver of SAX events.
///
/// Every method has a default no-op implementation, so a handler only
/// overrides what it cares about.
#[allow(unused_variables)]
pub trait ContentHandler {
    /// Called once before any other event.
    fn start_document(&mut self) -> Result<(), DomError> {
        Ok(())
    }

    /// Called for the XML declaration, if the input has one.
    fn xml_declaration(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), DomError> {
        Ok(())
    }

    /// Called at the start of a document type declaration.
    fn start_dtd(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<(), DomError> {
        Ok(())
    }

    /// Called at the end of a document type declaration.
    fn end_dtd(&mut self) -> Result<(), DomError> {
        Ok(())
    }

    /// Called for an element start tag (and for the start of an empty
    /// element tag).
    fn start_element(
        &mut self,
        uri: &str,
        local_name: &str,
        qname: &str,
        attributes: &[Attribute],
    ) -> Result<(), DomError> {
        Ok(())
    }

    /// Called for an element end tag (and right after the start of an empty
    /// element tag).
    fn end_element(&mut self, uri: &str, local_name: &str, qname: &str) -> Result<(), DomError> {
        Ok(())
    }

    /// Called for character data. One run of text may arrive in pieces.
    fn characters(&mut self, text: &str) -> Result<(), DomError> {
        Ok(())
    }

    /// Called where a CDATA section begins; its content follows as
    /// `characters` events.
    fn start_cdata(&mut self) -> Result<(), DomError> {
        Ok(())
    }

    /// Called where a CDATA section ends.
    fn end_cdata(&mut self) -> Result<(), DomError> {
        Ok(())
    }

    /// Called for a comment.
    fn comment(&mut self, text: &str) -> Result<(), DomError> {
        Ok(())
    }

    /// Called for a processing instruction.
    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), DomError> {
        Ok(())
    }

    /// Called once after all other events.
    fn end_document(&mut self) -> Result<(), DomError> {
        Ok(())
    }
}

/// A handler that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHandler;

impl ContentHandler for DefaultHandler {}

/// Something that can push a complete event stream into a handler.
pub trait EventSource {
    /// Pushes every event into `handler`, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Source`] if the source cannot produce an
    /// event, or [`ParseError::Build`] if the handler rejects one.
    fn drive(&mut self, handler: &mut dyn ContentHandler) -> Result<(), ParseError>;
}

/// Numbers dispatched events and attaches that number to handler errors.
#[derive(Debug, Default)]
pub(crate) struct EventCounter {
    next: usize,
}

impl EventCounter {
    pub(crate) fn record(&mut self, result: Result<(), DomError>) -> Result<(), ParseError> {
        let event = self.next;
        self.next += 1;
        result.map_err(|source| ParseError::Build { event, source })
    }
}

/// One owned SAX event.
///
/// Each variant mirrors one [`ContentHandler`] method and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    /// [`ContentHandler::start_document`].
    StartDocument,
    /// [`ContentHandler::xml_declaration`].
    XmlDeclaration {
        version: String,
        encoding: Option<String>,
        standalone: Option<bool>,
    },
    /// [`ContentHandler::start_dtd`].
    StartDtd {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    },
    /// [`ContentHandler::end_dtd`].
    EndDtd,
    /// [`ContentHandler::start_element`].
    StartElement {
        uri: String,
        local_name: String,
        qname: String,
        attributes: Vec<Attribute>,
    },
    /// [`ContentHandler::end_element`].
    EndElement {
        uri: String,
        local_name: String,
        qname: String,
    },
    /// [`ContentHandler::characters`]; one piece of a text run.
    Characters(String),
    /// [`ContentHandler::start_cdata`].
    StartCdata,
    /// [`ContentHandler::end_cdata`].
    EndCdata,
    /// [`ContentHandler::comment`].
    Comment(String),
    /// [`ContentHandler::processing_instruction`].
    ProcessingInstruction {
        target: String,
        data: String,
    },
    /// [`ContentHandler::end_document`].
    EndDocument,
}

fn local_part(qname: &str) -> &str {
    qname.split_once(':').map_or(qname, |(_, local)| local)
}

impl SaxEvent {
    /// A start tag without namespace or attributes.
    #[must_use]
    pub fn start(qname: &str) -> Self {
        Self::start_with(qname, &[])
    }

    /// A start tag with `(name, value)` attributes in the given order.
    #[must_use]
    pub fn start_with(qname: &str, attributes: &[(&str, &str)]) -> Self {
        Self::StartElement {
            uri: String::new(),
            local_name: local_part(qname).to_string(),
            qname: qname.to_string(),
            attributes: attributes
                .iter()
                .map(|(name, value)| Attribute::new(*name, *value))
                .collect(),
        }
    }

    /// An end tag without namespace.
    #[must_use]
    pub fn end(qname: &str) -> Self {
        Self::EndElement {
            uri: String::new(),
            local_name: local_part(qname).to_string(),
            qname: qname.to_string(),
        }
    }

    /// Character data.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self::Characters(text.to_string())
    }

    /// Delivers this event to `handler`.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler returns.
    pub fn dispatch(&self, handler: &mut dyn ContentHandler) -> Result<(), DomError> {
        match self {
            Self::StartDocument => handler.start_document(),
            Self::XmlDeclaration {
                version,
                encoding,
                standalone,
            } => handler.xml_declaration(version, encoding.as_deref(), *standalone),
            Self::StartDtd {
                name,
                public_id,
                system_id,
            } => handler.start_dtd(name, public_id.as_deref(), system_id.as_deref()),
            Self::EndDtd => handler.end_dtd(),
            Self::StartElement {
                uri,
                local_name,
                qname,
                attributes,
            } => handler.start_element(uri, local_name, qname, attributes),
            Self::EndElement {
                uri,
                local_name,
                qname,
            } => handler.end_element(uri, local_name, qname),
            Self::Characters(text) => handler.characters(text),
            Self::StartCdata => handler.start_cdata(),
            Self::EndCdata => handler.end_cdata(),
            Self::Comment(text) => handler.comment(text),
            Self::ProcessingInstruction { target, data } => {
                handler.processing_instruction(target, data)
            }
            Self::EndDocument => handler.end_document(),
        }
    }
}

/// A recorded event stream.
///
/// As an [`EventSource`] it replays its events, as many times as asked.
/// As a [`ContentHandler`] it records the events it receives, so another
/// source can be captured once and replayed into several builders.
///
/// `drive` replays the log exactly as stored; it does not add
/// `start_document`/`end_document` around it.
///
/// ```
/// use saxtree::sax::{EventLog, EventSource, SaxEvent, XmlSource};
///
/// let mut log = EventLog::new();
/// XmlSource::new("<a>hi</a>").drive(&mut log).unwrap();
/// assert_eq!(log.events()[1], SaxEvent::start("a"));
/// assert_eq!(log.events()[2], SaxEvent::text("hi"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<SaxEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, event: SaxEvent) {
        self.events.push(event);
    }

    /// The recorded events in order.
    #[must_use]
    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Wraps `body` in `start_document`/`end_document`.
    #[must_use]
    pub fn document(body: impl IntoIterator<Item = SaxEvent>) -> Self {
        std::iter::once(SaxEvent::StartDocument)
            .chain(body)
            .chain(std::iter::once(SaxEvent::EndDocument))
            .collect()
    }
}

impl From<Vec<SaxEvent>> for EventLog {
    fn from(events: Vec<SaxEvent>) -> Self {
        Self { events }
    }
}

impl FromIterator<SaxEvent> for EventLog {
    fn from_iter<I: IntoIterator<Item = SaxEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl EventSource for EventLog {
    fn drive(&mut self, handler: &mut dyn ContentHandler) -> Result<(), ParseError> {
        let mut counter = EventCounter::default();
        for event in &self.events {
            counter.record(event.dispatch(handler))?;
        }
        Ok(())
    }
}

impl ContentHandler for EventLog {
    fn start_document(&mut self) -> Result<(), DomError> {
        self.push(SaxEvent::StartDocument);
        Ok(())
    }

    fn xml_declaration(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), DomError> {
        self.push(SaxEvent::XmlDeclaration {
            version: version.to_string(),
            encoding: encoding.map(str::to_string),
            standalone,
        });
        Ok(())
    }

    fn start_dtd(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<(), DomError> {
        self.push(SaxEvent::StartDtd {
            name: name.to_string(),
            public_id: public_id.map(str::to_string),
            system_id: system_id.map(str::to_string),
        });
        Ok(())
    }

    fn end_dtd(&mut self) -> Result<(), DomError> {
        self.push(SaxEvent::EndDtd);
        Ok(())
    }

    fn start_element(
        &mut self,
        uri: &str,
        local_name: &str,
        qname: &str,
        attributes: &[Attribute],
    ) -> Result<(), DomError> {
        self.push(SaxEvent::StartElement {
            uri: uri.to_string(),
            local_name: local_name.to_string(),
            qname: qname.to_string(),
            attributes: attributes.to_vec(),
        });
        Ok(())
    }

    fn end_element(&mut self, uri: &str, local_name: &str, qname: &str) -> Result<(), DomError> {
        self.push(SaxEvent::EndElement {
            uri: uri.to_string(),
            local_name: local_name.to_string(),
            qname: qname.to_string(),
        });
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), DomError> {
        self.push(SaxEvent::text(text));
        Ok(())
    }

    fn start_cdata(&mut self) -> Result<(), DomError> {
        self.push(SaxEvent::StartCdata);
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<(), DomError> {
        self.push(SaxEvent::EndCdata);
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), DomError> {
        self.push(SaxEvent::Comment(text.to_string()));
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), DomError> {
        self.push(SaxEvent::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        });
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), DomError> {
        self.push(SaxEvent::EndDocument);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Fails on the n-th `characters` event.
    struct FailingHandler {
        fail_on: usize,
        seen: usize,
    }

    impl ContentHandler for FailingHandler {
        fn characters(&mut self, _text: &str) -> Result<(), DomError> {
            self.seen += 1;
            if self.seen == self.fail_on {
                return Err(DomError::OutOfMemory);
            }
            Ok(())
        }
    }

    #[test]
    fn test_default_handler_accepts_everything() {
        let mut log = EventLog::document([
            SaxEvent::start("a"),
            SaxEvent::text("x"),
            SaxEvent::Comment("c".to_string()),
            SaxEvent::end("a"),
        ]);
        assert!(log.drive(&mut DefaultHandler).is_ok());
    }

    #[test]
    fn test_constructors() {
        assert_eq!(
            SaxEvent::start_with("svg:rect", &[("x", "1")]),
            SaxEvent::StartElement {
                uri: String::new(),
                local_name: "rect".to_string(),
                qname: "svg:rect".to_string(),
                attributes: vec![Attribute::new("x", "1")],
            }
        );
        assert_eq!(
            SaxEvent::end("a"),
            SaxEvent::EndElement {
                uri: String::new(),
                local_name: "a".to_string(),
                qname: "a".to_string(),
            }
        );
    }

    #[test]
    fn test_replay_into_recorder_is_identity() {
        let mut original = EventLog::document([
            SaxEvent::StartDtd {
                name: "note".to_string(),
                public_id: None,
                system_id: Some("note.dtd".to_string()),
            },
            SaxEvent::EndDtd,
            SaxEvent::start_with("note", &[("id", "1")]),
            SaxEvent::StartCdata,
            SaxEvent::text("<raw>"),
            SaxEvent::EndCdata,
            SaxEvent::ProcessingInstruction {
                target: "pi".to_string(),
                data: "d".to_string(),
            },
            SaxEvent::end("note"),
        ]);
        let mut copy = EventLog::new();
        original.drive(&mut copy).unwrap();
        assert_eq!(copy, original);
    }

    #[test]
    fn test_handler_error_reports_event_index() {
        let mut log = EventLog::document([
            SaxEvent::start("a"),
            SaxEvent::text("1"),
            SaxEvent::text("2"),
            SaxEvent::end("a"),
        ]);
        let mut handler = FailingHandler { fail_on: 2, seen: 0 };
        let err = log.drive(&mut handler).unwrap_err();
        assert_eq!(
            err,
            ParseError::Build {
                event: 3,
                source: DomError::OutOfMemory
            }
        );
    }

    #[test]
    fn test_log_collection_helpers() {
        let log: EventLog = vec![SaxEvent::StartDocument].into();
        assert_eq!(log.len(), 1);
        assert!(!log.is_empty());
        assert!(EventLog::new().is_empty());
    }
}

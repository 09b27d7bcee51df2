//! Event source over XML text, backed by `quick-xml`.
//!
//! The tokenizer does the lexing; this module only translates its events
//! into [`ContentHandler`] calls. Prolog and epilogue "Misc" content
//! (whitespace, comments and processing instructions outside the document
//! element) is skipped here, since the tree has nowhere to put it.
//!
//! quick-xml hands out raw content, so line ends (`\r\n`, lone `\r`) are
//! normalized to `\n` here, before references are expanded. Attribute
//! values additionally have tab and newline mapped to a space.

use std::borrow::Cow;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{local_part, ContentHandler, EventCounter, EventSource};
use crate::error::ParseError;
use crate::tree::Attribute;

/// Pushes the events of an XML string into a handler.
///
/// Entity and character references in text and attribute values are
/// expanded. Namespaces are not resolved: `uri` is always empty and
/// `qname` carries any prefix.
///
/// ```
/// use saxtree::sax::{EventLog, EventSource, SaxEvent, XmlSource};
///
/// let mut log = EventLog::new();
/// XmlSource::new("<?xml version=\"1.0\"?>\n<!-- prolog -->\n<a>x &amp; y</a>\n")
///     .drive(&mut log)
///     .unwrap();
/// assert!(log.events().contains(&SaxEvent::text("x & y")));
/// assert!(!log.events().iter().any(|e| matches!(e, SaxEvent::Comment(_))));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct XmlSource<'a> {
    input: &'a str,
}

impl<'a> XmlSource<'a> {
    /// Creates a source over `input`.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }
}

impl EventSource for XmlSource<'_> {
    fn drive(&mut self, handler: &mut dyn ContentHandler) -> Result<(), ParseError> {
        let mut reader = Reader::from_str(self.input);
        let mut events = EventCounter::default();
        let mut depth = 0usize;

        events.record(handler.start_document())?;
        loop {
            let event = reader
                .read_event()
                .map_err(|e| source_error(&reader, e))?;
            match event {
                Event::Decl(decl) => {
                    let version = decl
                        .version()
                        .map_err(|e| source_error(&reader, e))?;
                    let version = utf8(&reader, &version)?.to_string();
                    let encoding = match decl.encoding() {
                        Some(enc) => {
                            let enc = enc.map_err(|e| source_error(&reader, e))?;
                            Some(utf8(&reader, &enc)?.to_string())
                        }
                        None => None,
                    };
                    let standalone = match decl.standalone() {
                        Some(value) => {
                            let value = value.map_err(|e| source_error(&reader, e))?;
                            Some(utf8(&reader, &value)? == "yes")
                        }
                        None => None,
                    };
                    events.record(handler.xml_declaration(
                        &version,
                        encoding.as_deref(),
                        standalone,
                    ))?;
                }
                Event::DocType(doctype) => {
                    let decl = parse_doctype(utf8(&reader, &doctype)?);
                    events.record(handler.start_dtd(
                        decl.name,
                        decl.public_id,
                        decl.system_id,
                    ))?;
                    events.record(handler.end_dtd())?;
                }
                Event::Start(start) => {
                    let (qname, attributes) = element_parts(&reader, &start)?;
                    events.record(handler.start_element(
                        "",
                        local_part(&qname),
                        &qname,
                        &attributes,
                    ))?;
                    depth += 1;
                }
                Event::Empty(start) => {
                    let (qname, attributes) = element_parts(&reader, &start)?;
                    let local_name = local_part(&qname);
                    events.record(handler.start_element("", local_name, &qname, &attributes))?;
                    events.record(handler.end_element("", local_name, &qname))?;
                }
                Event::End(end) => {
                    let name = end.name();
                    let qname = utf8(&reader, name.as_ref())?;
                    events.record(handler.end_element("", local_part(qname), qname))?;
                    depth = depth.saturating_sub(1);
                }
                Event::Text(text) => {
                    let raw: &[u8] = &text;
                    if depth == 0 && raw.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    let raw = normalize_newlines(utf8(&reader, raw)?);
                    let text = unescape(&raw).map_err(|e| source_error(&reader, e))?;
                    events.record(handler.characters(&text))?;
                }
                Event::CData(cdata) => {
                    let text = normalize_newlines(utf8(&reader, &cdata)?);
                    events.record(handler.start_cdata())?;
                    if !text.is_empty() {
                        events.record(handler.characters(&text))?;
                    }
                    events.record(handler.end_cdata())?;
                }
                Event::Comment(comment) => {
                    if depth > 0 {
                        let text = normalize_newlines(utf8(&reader, &comment)?);
                        events.record(handler.comment(&text))?;
                    }
                }
                Event::PI(pi) => {
                    if depth > 0 {
                        let target = utf8(&reader, pi.target())?;
                        let data = normalize_newlines(utf8(&reader, pi.content())?);
                        events.record(handler.processing_instruction(target, data.trim_start()))?;
                    }
                }
                Event::Eof => break,
            }
        }
        events.record(handler.end_document())?;
        log::debug!(target: "saxtree.reader", "read {} bytes of XML", self.input.len());
        Ok(())
    }
}

fn source_error<R>(reader: &Reader<R>, err: impl ToString) -> ParseError {
    ParseError::Source {
        message: err.to_string(),
        position: reader.buffer_position() as u64,
    }
}

fn utf8<'b, R>(reader: &Reader<R>, bytes: &'b [u8]) -> Result<&'b str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| source_error(reader, e))
}

/// Replaces `\r\n` and lone `\r` with `\n`.
fn normalize_newlines(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\r') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            chars.next_if_eq(&'\n');
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Normalizes a raw attribute value: line ends first, then every tab and
/// newline becomes a space. Character references are expanded afterwards,
/// so `&#10;` and friends survive.
fn normalize_attribute(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\t', '\r', '\n']) {
        return Cow::Borrowed(raw);
    }
    normalize_newlines(raw)
        .chars()
        .map(|c| if matches!(c, '\t' | '\n') { ' ' } else { c })
        .collect::<String>()
        .into()
}

/// Returns the qualified name and unescaped attributes of a start tag.
fn element_parts<R>(
    reader: &Reader<R>,
    start: &BytesStart<'_>,
) -> Result<(String, Vec<Attribute>), ParseError> {
    let name = start.name();
    let qname = utf8(reader, name.as_ref())?.to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| source_error(reader, e))?;
        let key = utf8(reader, attr.key.as_ref())?;
        let raw = normalize_attribute(utf8(reader, &attr.value)?);
        let value = unescape(&raw).map_err(|e| source_error(reader, e))?;
        attributes.push(Attribute::new(key, value.into_owned()));
    }
    Ok((qname, attributes))
}

/// Name and external identifiers of a `<!DOCTYPE ...>` declaration.
#[derive(Debug, PartialEq, Eq)]
struct DoctypeDecl<'a> {
    name: &'a str,
    public_id: Option<&'a str>,
    system_id: Option<&'a str>,
}

/// Splits the body of a doctype declaration (everything after
/// `<!DOCTYPE`). The internal subset, if any, is ignored.
fn parse_doctype(body: &str) -> DoctypeDecl<'_> {
    let body = body.trim_start();
    let name_end = body
        .find(|c: char| c.is_ascii_whitespace() || c == '[')
        .unwrap_or(body.len());
    let (name, rest) = body.split_at(name_end);
    let rest = rest.trim_start();

    let mut decl = DoctypeDecl {
        name,
        public_id: None,
        system_id: None,
    };
    if let Some(rest) = rest.strip_prefix("PUBLIC") {
        let (public_id, rest) = quoted(rest);
        decl.public_id = public_id;
        decl.system_id = quoted(rest).0;
    } else if let Some(rest) = rest.strip_prefix("SYSTEM") {
        decl.system_id = quoted(rest).0;
    }
    decl
}

/// Reads one quoted literal, returning it and the remaining input.
fn quoted(input: &str) -> (Option<&str>, &str) {
    let input = input.trim_start();
    let Some(quote) = input.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return (None, input);
    };
    let body = &input[1..];
    match body.find(quote) {
        Some(end) => (Some(&body[..end]), &body[end + 1..]),
        None => (None, input),
    }
}

//! Coalescing of character data into text nodes.
//!
//! A parser may split one run of text across any number of `characters`
//! events. The accumulator collects them until a structural event forces a
//! flush, at which point the whole run becomes a single text node.
//!
//! Runs made only of XML whitespace (space, tab, CR, LF) are dropped unless
//! they came from a CDATA section or the builder was told to keep them.

use crate::error::DomError;
use crate::tree::Node;

/// Smallest capacity the buffer grows to on first use.
const MIN_CAPACITY: usize = 4;

/// What the buffered characters will become on the next flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pending {
    /// Nothing buffered.
    #[default]
    None,
    /// Ordinary character data; subject to the whitespace rule.
    Text,
    /// The inside of a CDATA section; always materialized.
    CData,
}

/// Buffer for character data awaiting a flush.
#[derive(Debug, Default)]
pub struct TextAccumulator {
    buf: String,
    pending: Pending,
    keep_blank_runs: bool,
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

impl TextAccumulator {
    /// Creates an empty accumulator that discards whitespace-only text runs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an accumulator; with `keep_blank_runs` whitespace-only text
    /// runs become text nodes like any other.
    #[must_use]
    pub fn with_blank_runs(keep_blank_runs: bool) -> Self {
        Self {
            keep_blank_runs,
            ..Self::default()
        }
    }

    /// What is currently buffered.
    #[must_use]
    pub fn pending(&self) -> Pending {
        self.pending
    }

    /// The buffered characters.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Current buffer capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Adds character data to the current run. Empty input is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::OutOfMemory`] if the buffer cannot grow.
    pub fn append(&mut self, chars: &str) -> Result<(), DomError> {
        if chars.is_empty() {
            return Ok(());
        }
        self.grow_for(chars.len())?;
        if self.pending == Pending::None {
            self.pending = Pending::Text;
        }
        self.buf.push_str(chars);
        Ok(())
    }

    /// Doubles the capacity until `extra` more bytes fit.
    fn grow_for(&mut self, extra: usize) -> Result<(), DomError> {
        let needed = self
            .buf
            .len()
            .checked_add(extra)
            .ok_or(DomError::OutOfMemory)?;
        if needed <= self.buf.capacity() {
            return Ok(());
        }
        let mut target = self.buf.capacity().max(MIN_CAPACITY);
        while target < needed {
            target = target.checked_mul(2).unwrap_or(needed);
        }
        self.buf.try_reserve_exact(target - self.buf.len())?;
        Ok(())
    }

    /// Flushes any pending text run into `parent`, then starts a CDATA run.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`flush`](TextAccumulator::flush).
    pub fn begin_cdata(&mut self, parent: &Node) -> Result<(), DomError> {
        self.flush(parent)?;
        self.pending = Pending::CData;
        Ok(())
    }

    /// Ends a CDATA run, materializing it verbatim even when it is empty or
    /// whitespace only.
    ///
    /// Without a preceding [`begin_cdata`](TextAccumulator::begin_cdata)
    /// this is an ordinary flush.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`flush`](TextAccumulator::flush).
    pub fn end_cdata(&mut self, parent: &Node) -> Result<Option<Node>, DomError> {
        self.flush(parent)
    }

    /// Turns the buffered run into a text node appended to `parent`.
    ///
    /// Returns the new node, or `None` when nothing was pending or the run
    /// was whitespace-only text and got discarded. The buffer is empty
    /// afterwards in every case except an allocation failure.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::OutOfMemory`] if the node data cannot be
    /// allocated or `parent`'s children list cannot grow.
    pub fn flush(&mut self, parent: &Node) -> Result<Option<Node>, DomError> {
        let materialize = match self.pending {
            Pending::None => false,
            Pending::CData => true,
            Pending::Text => self.keep_blank_runs || !self.buf.chars().all(is_xml_whitespace),
        };
        if !materialize {
            if self.pending == Pending::Text {
                log::trace!(target: "saxtree.builder", "discarding blank text run of {} bytes", self.buf.len());
            }
            self.clear();
            return Ok(None);
        }

        let mut data = String::new();
        data.try_reserve_exact(self.buf.len())?;
        data.push_str(&self.buf);
        let node = Node::new_text(data);
        parent.append_detached(&node)?;
        log::trace!(target: "saxtree.builder", "flushed {:?} run of {} bytes", self.pending, self.buf.len());
        self.clear();
        Ok(Some(node))
    }

    /// Drops whatever is buffered without producing a node.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.pending = Pending::None;
    }
}

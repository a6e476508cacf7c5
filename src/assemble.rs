//! Reassembly of a node's source text from provider chunks.
//!
//! The assembler walks a node's byte range front to back, asking the
//! provider for whatever it has at the current offset. It stops at the
//! node's end or at the first empty chunk, whichever comes first. A short
//! result is a normal outcome, not an error: it just means the provider ran
//! dry before the node ended.

use crate::provider::TextProvider;
use std::ops::Range;
use tracing::{debug, trace};
use tree_sitter::Point;

/// A syntax node as seen by the assembler: a half-open byte range plus the
/// row/column where it starts.
pub trait SyntaxNode {
    fn start_byte(&self) -> usize;
    fn end_byte(&self) -> usize;
    fn start_position(&self) -> Point;

    fn byte_range(&self) -> Range<usize> {
        self.start_byte()..self.end_byte()
    }
}

/// The (possibly truncated) bytes backing one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledText {
    bytes: Vec<u8>,
    expected_len: usize,
}

impl AssembledText {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length of the node's byte range.
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// True when the provider stopped before the node's end.
    pub fn is_truncated(&self) -> bool {
        self.bytes.len() < self.expected_len
    }

    /// Lossy UTF-8 view, for diagnostics.
    pub fn to_string_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl AsRef<[u8]> for AssembledText {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq<[u8]> for AssembledText {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl PartialEq<&[u8]> for AssembledText {
    fn eq(&self, other: &&[u8]) -> bool {
        self.bytes == *other
    }
}

impl PartialEq<&str> for AssembledText {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

/// Reassembles node text with a reusable buffer.
///
/// Every call starts over at the node's `start_byte`; nothing carries over
/// between assemblies, even when they share a provider.
#[derive(Debug, Default)]
pub struct ChunkAssembler {
    buffer: Vec<u8>,
}

impl ChunkAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the internal buffer with the text of `node` and return it.
    ///
    /// The result is never longer than the node's range and only contains
    /// bytes the provider returned.
    pub fn assemble<N, P>(&mut self, node: &N, provider: &mut P) -> &[u8]
    where
        N: SyntaxNode + ?Sized,
        P: TextProvider + ?Sized,
    {
        self.buffer.clear();

        let start = node.start_byte();
        let end = node.end_byte();
        if start >= end {
            return &self.buffer;
        }

        let mut offset = start;
        let mut position = node.start_position();
        while offset < end {
            let chunk = provider.chunk(offset, position);
            let bytes = chunk.as_ref();
            if bytes.is_empty() {
                debug!(
                    start,
                    end,
                    received = self.buffer.len(),
                    "provider exhausted before node end"
                );
                break;
            }
            trace!(offset, len = bytes.len(), "received chunk");

            // The declared range may be far larger than what the provider
            // has; grow only by what actually arrived.
            let wanted = end - offset;
            self.buffer.extend_from_slice(&bytes[..bytes.len().min(wanted)]);

            // Advance past the whole chunk, not just the part we kept, so the
            // next request lines up with the provider's own cursor.
            advance_point(&mut position, bytes);
            offset = offset.saturating_add(bytes.len());
        }

        &self.buffer
    }

    /// Assemble into an owned [`AssembledText`].
    pub fn assemble_owned<N, P>(&mut self, node: &N, provider: &mut P) -> AssembledText
    where
        N: SyntaxNode + ?Sized,
        P: TextProvider + ?Sized,
    {
        let bytes = self.assemble(node, provider).to_vec();
        AssembledText {
            bytes,
            expected_len: node.end_byte().saturating_sub(node.start_byte()),
        }
    }
}

/// Reassemble the text of a single node.
pub fn assemble<N, P>(node: &N, provider: &mut P) -> AssembledText
where
    N: SyntaxNode + ?Sized,
    P: TextProvider + ?Sized,
{
    ChunkAssembler::new().assemble_owned(node, provider)
}

fn advance_point(position: &mut Point, bytes: &[u8]) {
    match bytes.iter().rposition(|&b| b == b'\n') {
        Some(last) => {
            position.row += bytes.iter().filter(|&&b| b == b'\n').count();
            position.column = bytes.len() - last - 1;
        }
        None => position.column += bytes.len(),
    }
}

//! Chunked text providers.
//!
//! A [`TextProvider`] hands out source bytes on demand, one chunk per call,
//! keyed by byte offset and the matching row/column [`Point`]. An empty chunk
//! is the only terminal signal: it means "nothing more from this offset on",
//! whether the source really ended or the backing store failed.
//!
//! Chunk length is unconstrained. A chunk may be a single byte, or run past
//! the range the caller is currently interested in.

use std::cell::RefCell;
use std::io::{self, Read, Seek, SeekFrom};
use std::rc::Rc;
use tracing::{trace, warn};
use tree_sitter::Point;

/// Supplies source text in chunks for a requested offset.
pub trait TextProvider {
    /// Bytes returned by one call.
    type Chunk: AsRef<[u8]>;

    /// Return the bytes starting at `offset`, or an empty chunk once no more
    /// data is available from that point onward.
    fn chunk(&mut self, offset: usize, position: Point) -> Self::Chunk;
}

impl<P: TextProvider + ?Sized> TextProvider for &mut P {
    type Chunk = P::Chunk;

    fn chunk(&mut self, offset: usize, position: Point) -> Self::Chunk {
        (**self).chunk(offset, position)
    }
}

/// Build a provider from a closure.
///
/// ```
/// use chunked_captures::provider::{from_fn, TextProvider};
/// use tree_sitter::Point;
///
/// let source = b"package main";
/// let mut provider = from_fn(|offset, _position| source.get(offset..).unwrap_or_default());
/// assert_eq!(provider.chunk(8, Point::new(0, 8)), b"main");
/// ```
pub fn from_fn<F, C>(f: F) -> FromFn<F>
where
    F: FnMut(usize, Point) -> C,
    C: AsRef<[u8]>,
{
    FromFn(f)
}

/// Provider backed by a closure. See [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F>(F);

impl<F, C> TextProvider for FromFn<F>
where
    F: FnMut(usize, Point) -> C,
    C: AsRef<[u8]>,
{
    type Chunk = C;

    fn chunk(&mut self, offset: usize, position: Point) -> C {
        (self.0)(offset, position)
    }
}

/// Serves an in-memory buffer, optionally capped to a maximum chunk size.
#[derive(Debug, Clone, Copy)]
pub struct SliceProvider<'a> {
    source: &'a [u8],
    max_chunk: Option<usize>,
}

impl<'a> SliceProvider<'a> {
    /// Serve everything from the requested offset to the end in one chunk.
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            max_chunk: None,
        }
    }

    /// Serve at most `max_chunk` bytes per call. Zero is treated as one.
    pub fn with_max_chunk(source: &'a [u8], max_chunk: usize) -> Self {
        Self {
            source,
            max_chunk: Some(max_chunk.max(1)),
        }
    }

    pub fn source(&self) -> &'a [u8] {
        self.source
    }
}

impl<'a> TextProvider for SliceProvider<'a> {
    type Chunk = &'a [u8];

    fn chunk(&mut self, offset: usize, _position: Point) -> &'a [u8] {
        let rest = self.source.get(offset..).unwrap_or_default();
        match self.max_chunk {
            Some(max) => &rest[..rest.len().min(max)],
            None => rest,
        }
    }
}

/// Serves a seekable stream (typically a file) in fixed-size chunks.
///
/// Read failures end the stream for the current request: the provider logs
/// the error, keeps it for [`last_error`](Self::last_error), and returns an
/// empty chunk.
#[derive(Debug)]
pub struct ReaderProvider<R> {
    reader: R,
    chunk_size: usize,
    // Stream position after the last successful read, if known.
    cursor: Option<u64>,
    error: Option<io::Error>,
}

impl<R: Read + Seek> ReaderProvider<R> {
    pub const DEFAULT_CHUNK_SIZE: usize = 4096;

    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, Self::DEFAULT_CHUNK_SIZE)
    }

    /// Zero is treated as one.
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            cursor: None,
            error: None,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The most recent read failure, if any.
    pub fn last_error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_at(&mut self, offset: u64) -> io::Result<Vec<u8>> {
        if self.cursor != Some(offset) {
            self.cursor = None;
            self.reader.seek(SeekFrom::Start(offset))?;
        }

        let mut buffer = vec![0; self.chunk_size];
        let read = loop {
            match self.reader.read(&mut buffer) {
                Ok(read) => break read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        buffer.truncate(read);
        self.cursor = Some(offset + read as u64);
        Ok(buffer)
    }
}

impl<R: Read + Seek> TextProvider for ReaderProvider<R> {
    type Chunk = Vec<u8>;

    fn chunk(&mut self, offset: usize, _position: Point) -> Vec<u8> {
        match self.read_at(offset as u64) {
            Ok(bytes) => {
                trace!(offset, len = bytes.len(), "read chunk from stream");
                bytes
            }
            Err(e) => {
                warn!(offset, error = %e, "text provider read failed");
                self.cursor = None;
                self.error = Some(e);
                Vec::new()
            }
        }
    }
}

/// One provider behind several handles.
///
/// Tree-sitter's own text predicates and the
/// [`CaptureIterator`](crate::cursor::CaptureIterator) both pull text while
/// a query runs, so they each hold a clone of this handle. The inner
/// provider is only borrowed for the length of one call, which is why chunks
/// come out as owned copies.
#[derive(Debug)]
pub struct SharedProvider<P> {
    inner: Rc<RefCell<P>>,
}

impl<P> Clone for SharedProvider<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P> SharedProvider<P> {
    pub fn new(provider: P) -> Self {
        Self {
            inner: Rc::new(RefCell::new(provider)),
        }
    }

    /// Inspect the inner provider.
    ///
    /// # Panics
    ///
    /// If called from inside the inner provider's own `chunk`.
    pub fn with<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Run `f` on the inner provider, or return `None` if it is already
    /// borrowed further up the stack.
    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut P) -> R) -> Option<R> {
        let mut provider = self.inner.try_borrow_mut().ok()?;
        Some(f(&mut provider))
    }

    /// Take the provider back. `None` while other handles are alive.
    pub fn into_inner(self) -> Option<P> {
        Rc::into_inner(self.inner).map(RefCell::into_inner)
    }
}

impl<P: TextProvider> TextProvider for SharedProvider<P> {
    type Chunk = Vec<u8>;

    fn chunk(&mut self, offset: usize, position: Point) -> Vec<u8> {
        self.with_mut(|provider| provider.chunk(offset, position).as_ref().to_vec())
            .unwrap_or_else(|| {
                warn!(offset, "text provider re-entered while busy");
                Vec::new()
            })
    }
}

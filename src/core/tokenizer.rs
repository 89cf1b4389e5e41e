//! Zero-copy tokenizer over a [`ByteBuffer`].
//!
//! A [`Tokenizer`] holds a shared borrow of its source buffer and hands out
//! [`Span`]s pointing into the buffer's memory. Because the borrow is shared,
//! the buffer cannot be appended to, reset or released while a tokenizer or
//! any span taken from it is alive.
//!
//! The end of input is a zero-length span positioned at the buffer's
//! terminator, see [`Span::is_end`].
//!
//! Spans that must outlive the borrow can be [detached](Span::detach) into a
//! [`TokenRange`]. A range remembers which buffer it came from and the
//! generation it was taken at. It refuses to resolve against any other buffer
//! or once its own buffer has been mutated.

use std::fmt;

use crate::core::buffer::{BufferError, ByteBuffer};

/// Borrowed view of a token inside a [`ByteBuffer`].
#[derive(Clone, Copy)]
pub struct Span<'a> {
    source: &'a ByteBuffer,
    offset: usize,
    len: usize,
}

impl<'a> Span<'a> {
    /// Byte offset of the token in the source buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The "no more tokens" marker: empty and sitting on the terminator.
    pub fn is_end(&self) -> bool {
        self.len == 0 && self.offset == self.source.len()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        &self.source.as_bytes()[self.offset..self.offset + self.len]
    }

    pub fn as_str(&self) -> Result<&'a str, std::str::Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }

    /// Detach the span coordinates from the borrow.
    pub fn detach(&self) -> TokenRange {
        TokenRange {
            offset: self.offset,
            len: self.len,
            buffer: self.source.id(),
            generation: self.source.generation(),
        }
    }
}

impl fmt::Debug for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Span")
            .field("text", &String::from_utf8_lossy(self.as_bytes()))
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

impl PartialEq<&str> for Span<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

/// Span coordinates tagged with the id and generation of their source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRange {
    pub offset: usize,
    pub len: usize,
    /// [`ByteBuffer::id`] of the source
    pub buffer: u64,
    pub generation: u64,
}

impl ByteBuffer {
    /// Resolve a detached range against this buffer.
    ///
    /// Fails if the range was taken from another buffer, or if this buffer
    /// has been mutated since the range was taken.
    pub fn resolve(&self, range: TokenRange) -> Result<&[u8], BufferError> {
        if range.buffer != self.id() {
            return Err(BufferError::ForeignSpan {
                span: range.buffer,
                buffer: self.id(),
            });
        }
        if range.generation != self.generation() {
            return Err(BufferError::StaleSpan {
                span: range.generation,
                current: self.generation(),
            });
        }

        let end = range
            .offset
            .checked_add(range.len)
            .ok_or(BufferError::SpanOutOfBounds {
                offset: range.offset,
                end: usize::MAX,
                len: self.len(),
            })?;
        if end > self.len() {
            return Err(BufferError::SpanOutOfBounds {
                offset: range.offset,
                end,
                len: self.len(),
            });
        }

        Ok(&self.as_bytes()[range.offset..end])
    }
}

/// Reentrant cursor over a buffer.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    source: &'a ByteBuffer,
    /// `(offset, len)` of the previous token, `None` before the first call.
    cursor: Option<(usize, usize)>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a ByteBuffer) -> Self {
        Tokenizer {
            source,
            cursor: None,
        }
    }

    /// Advance to the next token.
    ///
    /// Any byte in `delimiters` separates tokens; runs of delimiters are
    /// skipped. The delimiter set may change between calls.
    pub fn next_token(&mut self, delimiters: &[u8]) -> Span<'a> {
        let bytes = self.source.as_bytes();
        let end = bytes.len();

        let mut pos = match self.cursor {
            None => 0,
            Some((offset, len)) => (offset + len + 1).min(end),
        };

        while pos < end && delimiters.contains(&bytes[pos]) {
            pos += 1;
        }

        let start = pos;
        while pos < end && !delimiters.contains(&bytes[pos]) {
            pos += 1;
        }

        self.cursor = Some((start, pos - start));
        Span {
            source: self.source,
            offset: start,
            len: pos - start,
        }
    }

    /// Iterate over the remaining tokens with a fixed delimiter set.
    pub fn tokens<'d>(self, delimiters: &'d [u8]) -> Tokens<'a, 'd> {
        Tokens {
            tokenizer: self,
            delimiters,
            done: false,
        }
    }
}

/// Iterator adapter returned by [`Tokenizer::tokens`].
#[derive(Debug, Clone)]
pub struct Tokens<'a, 'd> {
    tokenizer: Tokenizer<'a>,
    delimiters: &'d [u8],
    done: bool,
}

impl<'a> Iterator for Tokens<'a, '_> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let span = self.tokenizer.next_token(self.delimiters);
        if span.is_end() {
            self.done = true;
            return None;
        }
        Some(span)
    }
}

/// Tokenize `source` with a fixed delimiter set.
pub fn tokenize<'a, 'd>(source: &'a ByteBuffer, delimiters: &'d [u8]) -> Tokens<'a, 'd> {
    Tokenizer::new(source).tokens(delimiters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(src: &str, delims: &[u8]) -> Vec<String> {
        let buf = ByteBuffer::new(src).unwrap();
        tokenize(&buf, delims)
            .map(|s| s.to_string_lossy())
            .collect()
    }

    #[test]
    fn test_colon_separated() {
        let buf = ByteBuffer::new("a:b:c").unwrap();
        let mut tok = Tokenizer::new(&buf);

        assert_eq!(tok.next_token(b":"), "a");
        assert_eq!(tok.next_token(b":"), "b");
        assert_eq!(tok.next_token(b":"), "c");

        let end = tok.next_token(b":");
        assert!(end.is_end());
        assert_eq!(end.offset(), buf.len());
        assert!(end.is_empty());
    }

    #[test]
    fn test_end_is_sticky() {
        let buf = ByteBuffer::new("a").unwrap();
        let mut tok = Tokenizer::new(&buf);
        assert_eq!(tok.next_token(b":"), "a");
        assert!(tok.next_token(b":").is_end());
        assert!(tok.next_token(b":").is_end());
    }

    #[test]
    fn test_empty_buffer_ends_immediately() {
        let buf = ByteBuffer::empty().unwrap();
        let mut tok = Tokenizer::new(&buf);
        let span = tok.next_token(b":");
        assert!(span.is_end());
        assert_eq!(span.offset(), 0);
    }

    #[test]
    fn test_only_delimiters() {
        assert!(collect(":::", b":").is_empty());
    }

    #[test]
    fn test_runs_of_delimiters_are_skipped() {
        assert_eq!(collect("::a:::b:", b":"), vec!["a", "b"]);
    }

    #[test]
    fn test_trailing_delimiter_from_listing() {
        assert_eq!(collect("core:net:util:", b":"), vec!["core", "net", "util"]);
    }

    #[test]
    fn test_multiple_delimiter_bytes() {
        assert_eq!(collect("a b\tc,d", b" \t,"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_delimiters_can_change_between_calls() {
        let buf = ByteBuffer::new("key=value;next=1").unwrap();
        let mut tok = Tokenizer::new(&buf);
        assert_eq!(tok.next_token(b"="), "key");
        assert_eq!(tok.next_token(b";"), "value");
        assert_eq!(tok.next_token(b"="), "next");
        assert_eq!(tok.next_token(b"="), "1");
        assert!(tok.next_token(b"=").is_end());
    }

    #[test]
    fn test_spans_point_into_source() {
        let buf = ByteBuffer::new("ab:cd").unwrap();
        let spans: Vec<_> = tokenize(&buf, b":").collect();
        assert_eq!(spans[1].offset(), 3);
        assert_eq!(spans[1].len(), 2);
        assert_eq!(
            spans[1].as_bytes().as_ptr(),
            buf.as_bytes()[3..].as_ptr()
        );
    }

    #[test]
    fn test_detached_range_resolves() {
        let buf = ByteBuffer::new("x:main").unwrap();
        let range = tokenize(&buf, b":").nth(1).unwrap().detach();
        assert_eq!(buf.resolve(range).unwrap(), b"main");
    }

    #[test]
    fn test_detached_range_goes_stale() {
        let mut buf = ByteBuffer::new("x:main").unwrap();
        let range = tokenize(&buf, b":").next().unwrap().detach();

        buf.append_str(":more").unwrap();

        assert_eq!(
            buf.resolve(range),
            Err(BufferError::StaleSpan {
                span: 0,
                current: 1
            })
        );
    }

    #[test]
    fn test_range_out_of_bounds() {
        let buf = ByteBuffer::new("ab").unwrap();
        let range = TokenRange {
            offset: 1,
            len: 5,
            buffer: buf.id(),
            generation: 0,
        };
        assert!(matches!(
            buf.resolve(range),
            Err(BufferError::SpanOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_range_end_overflow_is_an_error() {
        let buf = ByteBuffer::new("ab").unwrap();
        let range = TokenRange {
            offset: usize::MAX,
            len: 2,
            buffer: buf.id(),
            generation: 0,
        };
        assert_eq!(
            buf.resolve(range),
            Err(BufferError::SpanOutOfBounds {
                offset: usize::MAX,
                end: usize::MAX,
                len: 2
            })
        );
    }

    #[test]
    fn test_range_does_not_resolve_against_other_buffer() {
        let source = ByteBuffer::new("secret:x").unwrap();
        let other = ByteBuffer::new("other-buffer").unwrap();
        let range = tokenize(&source, b":").next().unwrap().detach();

        assert_eq!(
            other.resolve(range),
            Err(BufferError::ForeignSpan {
                span: source.id(),
                buffer: other.id()
            })
        );
        assert_eq!(source.resolve(range).unwrap(), b"secret");
    }

    #[test]
    fn test_range_does_not_resolve_against_copy() {
        let source = ByteBuffer::new("a:b").unwrap();
        let copy = source.try_clone().unwrap();
        let range = tokenize(&source, b":").next().unwrap().detach();
        assert!(matches!(
            copy.resolve(range),
            Err(BufferError::ForeignSpan { .. })
        ));
    }
}

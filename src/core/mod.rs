//! Core primitives: the growable byte buffer, the tokenizer that scans it,
//! filename masks and the bounded list.

pub mod bounded;
pub mod buffer;
pub mod mask;
pub mod tokenizer;

pub use bounded::{BoundedError, BoundedList};
pub use buffer::{BufferError, ByteBuffer};
pub use mask::Mask;
pub use tokenizer::{Span, TokenRange, Tokenizer};

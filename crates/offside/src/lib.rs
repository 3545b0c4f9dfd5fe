//! Indentation-aware scanner bridge for incremental parsers.
//!
//! `offside` sits between a batch tokenizer for a whitespace-significant
//! language and a pull-based parsing engine. The tokenizer runs once over the
//! whole document and encodes layout as discrete indent / dedent / newline
//! markers; the engine asks for those markers one at a time, at positions it
//! chooses, with a per-call set of kinds it will currently accept. The bridge
//! reconciles the two protocols: it caches the batch output behind a trait
//! seam ([`Tokenizer`]), walks the cache in lockstep with the engine's lexing
//! cursor ([`LexCursor`]), and persists just enough state — a cursor index
//! and a loaded flag — to resume after an incremental re-parse.
//!
//! The bridge never produces errors at the scan boundary: every failure mode
//! (tokenizer returned nothing, stream exhausted, next token not structural,
//! kind not currently accepted) degrades to "no token produced", and the
//! engine falls back to its own lexer for that position.

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

// Logging shim: call sites compile away unless the `tracing` feature is on.
macro_rules! emit_trace {
    ($level:ident, $($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::$level!($($arg)*);
    }};
}

mod adapter;
mod options;
mod scanner;
mod token;

pub use adapter::{RawToken, RawTokenList, TokenStream, TokenizeError, Tokenizer};
pub use options::{ScannerOptions, TypeCodes};
pub use scanner::{LexCursor, SERIALIZED_STATE_LEN, Scanner};
pub use token::{KindSet, Structural, Token, TokenKind};

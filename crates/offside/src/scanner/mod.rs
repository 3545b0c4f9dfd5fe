//! Positional scanner: a resumable index over a batch-computed token list.
//!
//! Why this exists
//! - The parsing engine pulls one lexical decision at a time, at positions it
//!   chooses, and may discard the scanner and restore it from a small byte
//!   record between edits. The tokenizer, by contrast, produces the whole
//!   document's tokens in one pass. This module reconciles the two: an
//!   arena+index walk where the arena is the cached [`TokenStream`] and the
//!   index is `cursor`.
//!
//! What it does
//! - On the first [`scan`](Scanner::scan) of a session, drains the engine's
//!   character cursor to end of input and materializes the stream via the
//!   adapter (the scanner never computes indentation itself; the markers are
//!   already in the list).
//! - On every call, offers the token under `cursor` if and only if it is
//!   structural and its kind is in the engine's acceptance set; everything
//!   else is a no-match that leaves `cursor` untouched.
//! - Persists `cursor` and `loaded` into a bounded byte record and restores
//!   them onto a freshly constructed scanner. The stream itself is never
//!   persisted: a restored scanner re-materializes from the current document
//!   on its next call, so stale tokens are never trusted across edits.
//!
//! Invariants
//! - `cursor` ranges over `[0, stream.len()]` and only ever moves forward
//!   within a session; `cursor == len` means exhausted, permanently.
//! - A kind is never emitted unless it is in the acceptance set for that
//!   call.
//! - Structural tokens are zero-width: the consumed span's end is delegated
//!   to the engine's cursor via [`LexCursor::mark_end`], never derived from
//!   the token's own text.

use alloc::string::String;
use core::cmp;

use crate::{
    adapter::{TokenStream, Tokenizer},
    options::ScannerOptions,
    token::{KindSet, Structural},
};

/// Length in bytes of a complete serialized state record.
pub const SERIALIZED_STATE_LEN: usize = size_of::<usize>() + 1;

/// The parsing engine's character cursor, as seen by the scanner.
///
/// A single forward pass: the scanner reads `lookahead` / `advance` until end
/// of input when materializing, and calls `mark_end` exactly once per emitted
/// structural token.
pub trait LexCursor {
    /// The character under the cursor, or `None` at end of input.
    fn lookahead(&self) -> Option<char>;

    /// Steps past the current character.
    fn advance(&mut self);

    /// Marks the end of the token being recognized at the current offset.
    fn mark_end(&mut self);
}

/// The stateful bridge driven by the parsing engine.
///
/// One scanner covers one scanning session: from construction (or
/// restoration via [`deserialize`](Scanner::deserialize)) to destruction,
/// over one parse or incremental re-parse attempt. Single-threaded,
/// call-and-return; the engine is the sole caller.
#[derive(Debug)]
pub struct Scanner<T: Tokenizer> {
    tokenizer: T,
    options: ScannerOptions,
    /// Index of the next token to consider, in `[0, stream.len()]`.
    cursor: usize,
    /// True once a stream has been materialized for the current document.
    /// Meaningful without `stream`: a restored scanner is loaded but holds
    /// no tokens until it re-materializes.
    loaded: bool,
    stream: Option<TokenStream>,
}

impl<T: Tokenizer> Scanner<T> {
    pub fn new(tokenizer: T) -> Self {
        Scanner::with_options(tokenizer, ScannerOptions::default())
    }

    pub fn with_options(tokenizer: T, options: ScannerOptions) -> Self {
        Scanner {
            tokenizer,
            options,
            cursor: 0,
            loaded: false,
            stream: None,
        }
    }

    /// Produces the next structural token, if the engine currently accepts
    /// it.
    ///
    /// Returns `None` — leaving `cursor` unchanged — when the stream is
    /// exhausted, the token under `cursor` is not structural, or its kind is
    /// not in `accepted`. The engine then falls back to its own lexer for
    /// this position. On a match the consumed span's end is marked at the
    /// engine cursor's current offset.
    pub fn scan<C: LexCursor>(&mut self, lexer: &mut C, accepted: KindSet) -> Option<Structural> {
        if self.stream.is_none() {
            self.load(lexer);
        }
        let token = self.stream.as_ref()?.get(self.cursor)?;
        let kind = token.kind.structural()?;
        if !accepted.contains(kind) {
            return None;
        }
        self.cursor += 1;
        lexer.mark_end();
        emit_trace!(trace, kind = ?kind, cursor = self.cursor, "emitted structural token");
        Some(kind)
    }

    /// Reads the full remaining input and materializes the token stream.
    fn load<C: LexCursor>(&mut self, lexer: &mut C) {
        let mut source = String::new();
        while let Some(ch) = lexer.lookahead() {
            source.push(ch);
            lexer.advance();
        }
        let stream =
            TokenStream::materialize(&mut self.tokenizer, source.as_bytes(), self.options.codes);
        if self.loaded {
            // Restored session: keep the persisted position, clamped because
            // the edited document may tokenize to a shorter stream.
            self.cursor = cmp::min(self.cursor, stream.len());
        } else {
            self.cursor = 0;
        }
        self.loaded = true;
        self.stream = Some(stream);
    }

    /// Writes the resumption state into `buffer`, returning the number of
    /// bytes written.
    ///
    /// Fixed-width record: `cursor` as a little-endian machine word, then
    /// `loaded` as one byte. Each field is written only if it fits entirely
    /// in the remaining space; a field that does not fit is silently omitted
    /// and restores to its default.
    pub fn serialize(&self, buffer: &mut [u8]) -> usize {
        let mut written = 0;
        let word = self.cursor.to_le_bytes();
        if written + word.len() <= buffer.len() {
            buffer[written..written + word.len()].copy_from_slice(&word);
            written += word.len();
        }
        if written + 1 <= buffer.len() {
            buffer[written] = u8::from(self.loaded);
            written += 1;
        }
        written
    }

    /// Restores resumption state from `buffer`.
    ///
    /// Fields whose bytes are absent keep their construction-time defaults.
    /// Any cached stream is discarded: the next [`scan`](Scanner::scan)
    /// re-materializes from the current document, keeping the restored
    /// cursor if `loaded` was set.
    pub fn deserialize(&mut self, buffer: &[u8]) {
        self.cursor = 0;
        self.loaded = false;
        self.stream = None;

        // Field-by-field, mirroring `serialize`: a field is read only if its
        // bytes are fully present, and the offset advances only on a read.
        const WORD: usize = size_of::<usize>();
        let mut read = 0;
        if read + WORD <= buffer.len() {
            let mut word = [0u8; WORD];
            word.copy_from_slice(&buffer[read..read + WORD]);
            self.cursor = usize::from_le_bytes(word);
            read += WORD;
        }
        if read + 1 <= buffer.len() {
            self.loaded = buffer[read] != 0;
        }
        emit_trace!(
            trace,
            cursor = self.cursor,
            loaded = self.loaded,
            "restored scanner state"
        );
    }

    #[cfg(any(test, feature = "fuzzing"))]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(any(test, feature = "fuzzing"))]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

//! Token stream adapter: one batch tokenizer pass, locally owned forever.
//!
//! The upstream tokenizer is invoked exactly once per scanning session, over
//! the whole document. Its result may live in a foreign allocator, so
//! [`TokenStream::materialize`] copies every entry into owned storage and
//! drops the [`RawTokenList`] before returning — for foreign-backed
//! implementations that drop is the scoped release of the external
//! allocation. No raw pointer or borrowed view survives the call.
//!
//! Failure never propagates: a tokenizer error or an empty result yields an
//! empty stream, which downstream simply never matches.

use alloc::vec::Vec;

use thiserror::Error;

use crate::{
    options::TypeCodes,
    token::{Token, TokenKind},
};

/// A borrowed view of one entry in an externally owned token list.
#[derive(Debug, Clone, Copy)]
pub struct RawToken<'a> {
    /// Tokenizer type code, classified via [`TypeCodes`].
    pub type_code: i32,
    /// Raw lexeme bytes; copied, never retained.
    pub text: &'a [u8],
    /// 1-based source line.
    pub line: u32,
}

/// An ordered token list as handed over by the tokenizer.
///
/// Implementations own the underlying allocation; foreign-backed ones release
/// it in `Drop`. The adapter only ever reads through this trait and drops the
/// value within [`TokenStream::materialize`].
pub trait RawTokenList {
    fn len(&self) -> usize;

    /// The entry at `index`.
    ///
    /// # Panics
    ///
    /// May panic if `index >= self.len()`.
    fn raw(&self, index: usize) -> RawToken<'_>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The external tokenizer boundary, modeled as a pure function of the
/// document text.
pub trait Tokenizer {
    type List: RawTokenList;

    /// Tokenizes one complete document.
    fn tokenize(&mut self, source: &[u8]) -> Result<Self::List, TokenizeError>;
}

/// Failure at the tokenizer boundary.
///
/// Swallowed by [`TokenStream::materialize`]; surfaced here so foreign
/// implementations can report what happened before the adapter degrades to
/// an empty stream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("tokenizer returned no result")]
    NoResult,
    #[error("source text not representable at the tokenizer boundary")]
    UnrepresentableSource,
}

/// The session-scoped cache of one document's tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Runs the tokenizer once over `source` and copies the result into
    /// owned storage.
    ///
    /// The raw list is dropped before this function returns; a foreign
    /// allocation is therefore released within the same scoped operation
    /// that acquired it. Tokenizer failure degrades to an empty stream.
    pub fn materialize<T: Tokenizer>(tokenizer: &mut T, source: &[u8], codes: TypeCodes) -> Self {
        let list = match tokenizer.tokenize(source) {
            Ok(list) => list,
            Err(_err) => {
                emit_trace!(warn, error = %_err, "tokenizer failed; degrading to empty stream");
                return TokenStream::default();
            }
        };

        let mut tokens = Vec::with_capacity(list.len());
        for index in 0..list.len() {
            let raw = list.raw(index);
            tokens.push(Token {
                kind: codes.classify(raw.type_code),
                text: raw.text.into(),
                line: raw.line,
            });
        }
        emit_trace!(trace, count = tokens.len(), "materialized token stream");

        // `list` drops here, releasing any foreign allocation.
        TokenStream { tokens }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        TokenStream { tokens }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, vec};
    use core::cell::Cell;

    use super::*;

    /// Token list double that records when its allocation is "freed".
    struct CountedList {
        entries: Vec<(i32, &'static [u8], u32)>,
        frees: Rc<Cell<usize>>,
    }

    impl RawTokenList for CountedList {
        fn len(&self) -> usize {
            self.entries.len()
        }

        fn raw(&self, index: usize) -> RawToken<'_> {
            let (type_code, text, line) = self.entries[index];
            RawToken {
                type_code,
                text,
                line,
            }
        }
    }

    impl Drop for CountedList {
        fn drop(&mut self) {
            self.frees.set(self.frees.get() + 1);
        }
    }

    struct CountedTokenizer {
        entries: Vec<(i32, &'static [u8], u32)>,
        frees: Rc<Cell<usize>>,
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl Tokenizer for CountedTokenizer {
        type List = CountedList;

        fn tokenize(&mut self, _source: &[u8]) -> Result<CountedList, TokenizeError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(TokenizeError::NoResult);
            }
            Ok(CountedList {
                entries: self.entries.clone(),
                frees: Rc::clone(&self.frees),
            })
        }
    }

    fn counted(entries: Vec<(i32, &'static [u8], u32)>, fail: bool) -> CountedTokenizer {
        CountedTokenizer {
            entries,
            frees: Rc::new(Cell::new(0)),
            calls: Rc::new(Cell::new(0)),
            fail,
        }
    }

    #[test]
    fn materialize_copies_and_releases_exactly_once() {
        let mut tokenizer = counted(
            vec![
                (71, &b""[..], 1),
                (5, &b"foo"[..], 1),
                (3, &b"\n"[..], 1),
            ],
            false,
        );
        let frees = Rc::clone(&tokenizer.frees);

        let stream = TokenStream::materialize(&mut tokenizer, b"foo\n", TypeCodes::default());

        assert_eq!(frees.get(), 1);
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.get(0).unwrap().kind, TokenKind::Indent);
        assert_eq!(stream.get(1).unwrap().kind, TokenKind::Other);
        assert_eq!(stream.get(1).unwrap().text, "foo");
        assert_eq!(stream.get(2).unwrap().kind, TokenKind::Newline);
        assert_eq!(stream.get(2).unwrap().line, 1);
    }

    #[test]
    fn tokenizer_failure_degrades_to_empty_stream() {
        let mut tokenizer = counted(vec![(71, &b""[..], 1)], true);
        let stream = TokenStream::materialize(&mut tokenizer, b"x", TypeCodes::default());
        assert!(stream.is_empty());
        assert_eq!(stream.get(0), None);
    }

    #[test]
    fn empty_result_is_an_empty_stream() {
        let mut tokenizer = counted(vec![], false);
        let stream = TokenStream::materialize(&mut tokenizer, b"", TypeCodes::default());
        assert!(stream.is_empty());
        assert_eq!(tokenizer.calls.get(), 1);
    }
}

use crate::token::TokenKind;

/// Integer type codes assigned by the external tokenizer.
///
/// The codes are a fixed external contract: one designated value per
/// structural kind, every other value classified as [`TokenKind::Other`].
/// The defaults match the reference tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeCodes {
    /// Code emitted for block-open markers.
    ///
    /// # Default
    ///
    /// `71`
    pub indent: i32,

    /// Code emitted for block-close markers.
    ///
    /// # Default
    ///
    /// `72`
    pub dedent: i32,

    /// Code emitted for statement terminators.
    ///
    /// # Default
    ///
    /// `3`
    pub newline: i32,
}

impl Default for TypeCodes {
    fn default() -> Self {
        TypeCodes {
            indent: 71,
            dedent: 72,
            newline: 3,
        }
    }
}

impl TypeCodes {
    /// Classifies one raw type code.
    #[must_use]
    pub fn classify(self, code: i32) -> TokenKind {
        if code == self.indent {
            TokenKind::Indent
        } else if code == self.dedent {
            TokenKind::Dedent
        } else if code == self.newline {
            TokenKind::Newline
        } else {
            TokenKind::Other
        }
    }
}

/// Configuration for a [`Scanner`](crate::Scanner).
#[derive(Debug, Clone, Copy, Default)]
pub struct ScannerOptions {
    /// Type-code mapping for the external tokenizer.
    pub codes: TypeCodes,
}

use bstr::BString;

/// The three zero-width structural kinds the bridge may emit.
///
/// Structural tokens are inferred from layout by the upstream tokenizer, not
/// from explicit punctuation; they mark boundaries between real characters
/// and carry no span of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Structural {
    /// Block open.
    Indent = 0,
    /// Block close.
    Dedent = 1,
    /// Statement terminator.
    Newline = 2,
}

impl Structural {
    pub const ALL: [Structural; 3] = [Structural::Indent, Structural::Dedent, Structural::Newline];
}

/// Classification of one cached token.
///
/// Only the three structural kinds are ever surfaced by the scanner; `Other`
/// tokens belong to the grammar's own lexer path and are matched by no call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    Indent,
    Dedent,
    Newline,
    Other,
}

impl TokenKind {
    /// The structural kind, or `None` for `Other`.
    #[must_use]
    pub const fn structural(self) -> Option<Structural> {
        match self {
            TokenKind::Indent => Some(Structural::Indent),
            TokenKind::Dedent => Some(Structural::Dedent),
            TokenKind::Newline => Some(Structural::Newline),
            TokenKind::Other => None,
        }
    }
}

impl From<Structural> for TokenKind {
    fn from(kind: Structural) -> Self {
        match kind {
            Structural::Indent => TokenKind::Indent,
            Structural::Dedent => TokenKind::Dedent,
            Structural::Newline => TokenKind::Newline,
        }
    }
}

/// One already-classified lexical unit from the upstream tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    /// Raw lexeme, retained only for fidelity; the bridge never interprets
    /// it. Stored as bytes because the tokenizer gives no UTF-8 guarantee.
    pub text: BString,
    /// 1-based source line the token starts on.
    pub line: u32,
}

/// The per-call acceptance set supplied by the parsing engine.
///
/// The engine decides at every lexing position which structural kinds would
/// be syntactically valid there; the scanner is purely reactive and never
/// emits a kind outside the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KindSet(u8);

impl KindSet {
    pub const EMPTY: KindSet = KindSet(0);
    pub const ALL: KindSet = KindSet::of(&Structural::ALL);

    /// Builds a set from a slice of kinds.
    #[must_use]
    pub const fn of(kinds: &[Structural]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1 << kinds[i] as u8;
            i += 1;
        }
        KindSet(bits)
    }

    /// Returns the set with `kind` added.
    #[must_use]
    pub const fn with(self, kind: Structural) -> Self {
        KindSet(self.0 | 1 << kind as u8)
    }

    #[must_use]
    pub const fn contains(self, kind: Structural) -> bool {
        self.0 & (1 << kind as u8) != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<Structural> for KindSet {
    fn from(kind: Structural) -> Self {
        KindSet::EMPTY.with(kind)
    }
}

//! Session-level behavior of the scanner bridge against mock collaborators.

use offside::{
    KindSet, LexCursor, RawToken, RawTokenList, SERIALIZED_STATE_LEN, Scanner, Structural,
    TokenizeError, Tokenizer,
};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use rstest::rstest;

const T_INDENT: i32 = 71;
const T_DEDENT: i32 = 72;
const T_NEWLINE: i32 = 3;

struct VecList(Vec<(i32, u32)>);

impl RawTokenList for VecList {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn raw(&self, index: usize) -> RawToken<'_> {
        let (type_code, line) = self.0[index];
        RawToken {
            type_code,
            text: b"",
            line,
        }
    }
}

#[derive(Clone)]
struct VecTokenizer(Vec<(i32, u32)>);

impl Tokenizer for VecTokenizer {
    type List = VecList;

    fn tokenize(&mut self, _source: &[u8]) -> Result<VecList, TokenizeError> {
        Ok(VecList(self.0.clone()))
    }
}

struct NullCursor;

impl LexCursor for NullCursor {
    fn lookahead(&self) -> Option<char> {
        None
    }

    fn advance(&mut self) {}

    fn mark_end(&mut self) {}
}

fn code_for(kind: Structural) -> i32 {
    match kind {
        Structural::Indent => T_INDENT,
        Structural::Dedent => T_DEDENT,
        Structural::Newline => T_NEWLINE,
    }
}

/// One raw tokenizer entry: a structural marker or an opaque grammar token.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Entry {
    Structural(Structural),
    Other,
}

impl Arbitrary for Entry {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 4 {
            0 => Entry::Structural(Structural::Indent),
            1 => Entry::Structural(Structural::Dedent),
            2 => Entry::Structural(Structural::Newline),
            _ => Entry::Other,
        }
    }
}

fn entries_to_codes(entries: &[Entry]) -> Vec<(i32, u32)> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let code = match entry {
                Entry::Structural(kind) => code_for(*kind),
                Entry::Other => 9,
            };
            (code, i as u32 + 1)
        })
        .collect()
}

/// Scans until two consecutive no-matches: either the stream is exhausted or
/// the cursor is parked on a non-structural token (the grammar lexer's seam).
fn drain(scanner: &mut Scanner<VecTokenizer>) -> Vec<Structural> {
    let mut emitted = Vec::new();
    let mut misses = 0;
    while misses < 2 {
        match scanner.scan(&mut NullCursor, KindSet::ALL) {
            Some(kind) => {
                emitted.push(kind);
                misses = 0;
            }
            None => misses += 1,
        }
    }
    emitted
}

#[rstest]
#[case::only_indent(KindSet::of(&[Structural::Indent]), Some(Structural::Indent))]
#[case::all(KindSet::ALL, Some(Structural::Indent))]
#[case::wrong_kinds(KindSet::of(&[Structural::Dedent, Structural::Newline]), None)]
#[case::empty(KindSet::EMPTY, None)]
fn acceptance_set_gates_the_first_token(
    #[case] accepted: KindSet,
    #[case] expected: Option<Structural>,
) {
    let mut scanner = Scanner::new(VecTokenizer(vec![(T_INDENT, 1)]));
    assert_eq!(scanner.scan(&mut NullCursor, accepted), expected);
}

#[rstest]
#[case::empty_buffer(0)]
#[case::loaded_byte_only(1)]
#[case::word_only(size_of::<usize>())]
#[case::full_record(SERIALIZED_STATE_LEN)]
fn serialization_respects_the_buffer_bound(#[case] capacity: usize) {
    let mut scanner = Scanner::new(VecTokenizer(vec![(T_INDENT, 1), (T_DEDENT, 1)]));
    assert_eq!(
        scanner.scan(&mut NullCursor, KindSet::ALL),
        Some(Structural::Indent)
    );

    let mut buffer = vec![0u8; capacity];
    let written = scanner.serialize(&mut buffer);
    assert!(written <= capacity);

    // Restore never panics and never fabricates state beyond the record.
    let mut restored = Scanner::new(VecTokenizer(vec![(T_INDENT, 1), (T_DEDENT, 1)]));
    restored.deserialize(&buffer[..written]);
    let _ = restored.scan(&mut NullCursor, KindSet::ALL);
}

#[quickcheck]
fn emissions_preserve_raw_output_order(entries: Vec<Entry>) -> bool {
    let mut scanner = Scanner::new(VecTokenizer(entries_to_codes(&entries)));
    let emitted = drain(&mut scanner);

    // With every kind accepted, the scanner emits exactly the structural
    // prefix of the raw output, stopping at the first opaque token.
    let expected: Vec<Structural> = entries
        .iter()
        .take_while(|entry| matches!(entry, Entry::Structural(_)))
        .map(|entry| match entry {
            Entry::Structural(kind) => *kind,
            Entry::Other => unreachable!(),
        })
        .collect();

    let total_structural = entries
        .iter()
        .filter(|e| matches!(e, Entry::Structural(_)))
        .count();

    emitted == expected && emitted.len() <= total_structural
}

#[quickcheck]
fn round_trip_reproduces_remaining_outputs(kinds: Vec<AnyStructural>, split: usize) -> bool {
    let entries: Vec<Entry> = kinds.iter().map(|k| Entry::Structural(k.0)).collect();
    let codes = entries_to_codes(&entries);
    let split = if entries.is_empty() {
        0
    } else {
        split % (entries.len() + 1)
    };

    // Reference session, no interruption.
    let mut reference = Scanner::new(VecTokenizer(codes.clone()));
    let expected = drain(&mut reference);

    // Interrupted session: scan `split` tokens, persist, restore onto a
    // freshly constructed scanner over the same document.
    let mut first = Scanner::new(VecTokenizer(codes.clone()));
    let mut prefix = Vec::new();
    for _ in 0..split {
        match first.scan(&mut NullCursor, KindSet::ALL) {
            Some(kind) => prefix.push(kind),
            None => break,
        }
    }
    let mut buffer = [0u8; SERIALIZED_STATE_LEN];
    let written = first.serialize(&mut buffer);

    let mut second = Scanner::new(VecTokenizer(codes));
    second.deserialize(&buffer[..written]);
    prefix.extend(drain(&mut second));

    prefix == expected
}

#[quickcheck]
fn excluded_kind_leaves_cursor_in_place(kinds: Vec<AnyStructural>) -> bool {
    let entries: Vec<Entry> = kinds.iter().map(|k| Entry::Structural(k.0)).collect();
    let mut scanner = Scanner::new(VecTokenizer(entries_to_codes(&entries)));

    for entry in &entries {
        let Entry::Structural(kind) = entry else {
            unreachable!()
        };
        // Excluding the actual next kind must be a no-match...
        let excluded = KindSet::of(
            &Structural::ALL
                .into_iter()
                .filter(|k| k != kind)
                .collect::<Vec<_>>(),
        );
        if scanner.scan(&mut NullCursor, excluded).is_some() {
            return false;
        }
        // ...and the same token must still be there afterwards.
        if scanner.scan(&mut NullCursor, KindSet::ALL) != Some(*kind) {
            return false;
        }
    }
    scanner.scan(&mut NullCursor, KindSet::ALL).is_none()
}

/// Newtype so `Arbitrary` can be implemented for [`Structural`] here.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AnyStructural(Structural);

impl Arbitrary for AnyStructural {
    fn arbitrary(g: &mut Gen) -> Self {
        let kinds = [
            Structural::Indent,
            Structural::Dedent,
            Structural::Newline,
        ];
        AnyStructural(*g.choose(&kinds).unwrap())
    }
}

#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use offside::{
    KindSet, LexCursor, RawToken, RawTokenList, SERIALIZED_STATE_LEN, Scanner, Structural,
    TokenizeError, Tokenizer,
};

/// A whole scanning session: a raw tokenizer output plus a call script.
#[derive(Debug, Arbitrary)]
struct Plan {
    /// (kind selector, line advance) per raw token.
    entries: Vec<(u8, u8)>,
    /// Low three bits of each byte form that call's acceptance set.
    calls: Vec<u8>,
    /// If set, persist and restore onto a fresh scanner before this call.
    restore_at: Option<u8>,
}

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

fn accepted_from(bits: u8) -> KindSet {
    let mut accepted = KindSet::EMPTY;
    if bits & 1 != 0 {
        accepted = accepted.with(Structural::Indent);
    }
    if bits & 2 != 0 {
        accepted = accepted.with(Structural::Dedent);
    }
    if bits & 4 != 0 {
        accepted = accepted.with(Structural::Newline);
    }
    accepted
}

fn codes_from(entries: &[(u8, u8)]) -> Vec<(i32, u32)> {
    let mut line = 1u32;
    entries
        .iter()
        .map(|&(selector, advance)| {
            line = line.saturating_add(u32::from(advance % 2));
            let code = match selector % 5 {
                0 => 71, // indent
                1 => 72, // dedent
                2 => 3,  // newline
                _ => 9,  // opaque grammar token
            };
            (code, line)
        })
        .collect()
}

fn run(plan: &Plan) {
    let codes = codes_from(&plan.entries);
    let raw_indents = codes.iter().filter(|&&(code, _)| code == 71).count();

    let mut straight = Scanner::new(VecTokenizer(codes.clone()));
    let mut resumed = Scanner::new(VecTokenizer(codes.clone()));
    let restore_at = plan.restore_at.map(usize::from);

    let mut indents = 0usize;
    for (index, &bits) in plan.calls.iter().enumerate() {
        let accepted = accepted_from(bits);

        if restore_at == Some(index) {
            let mut buffer = [0u8; SERIALIZED_STATE_LEN];
            let written = resumed.serialize(&mut buffer);
            let mut fresh = Scanner::new(VecTokenizer(codes.clone()));
            fresh.deserialize(&buffer[..written]);
            resumed = fresh;
        }

        let before = straight.cursor();
        let outcome = straight.scan(&mut NullCursor, accepted);

        // A restored session over the unedited document must behave exactly
        // like the uninterrupted one.
        assert_eq!(outcome, resumed.scan(&mut NullCursor, accepted));
        assert_eq!(straight.cursor(), resumed.cursor());

        match outcome {
            Some(kind) => {
                assert!(accepted.contains(kind), "kind emitted outside accepted set");
                assert_eq!(straight.cursor(), before + 1);
                if kind == Structural::Indent {
                    indents += 1;
                }
            }
            None => assert_eq!(straight.cursor(), before, "no-match moved the cursor"),
        }
        assert!(straight.cursor() <= codes.len());
    }

    assert!(indents <= raw_indents, "emitted more indents than raw output");
}

fuzz_target!(|plan: Plan| run(&plan));

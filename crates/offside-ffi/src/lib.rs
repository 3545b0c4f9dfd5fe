//! C ABI for embedding the scanner bridge in a generated parser.
//!
//! Two boundaries meet here. Consumed: the external tokenizer
//! (`offside_tokenize` / `offside_free_token_list`), whose result lives in a
//! foreign allocator and is owned by [`ForeignTokenList`] for exactly one
//! copy. Exposed: the five scanner entry points the parsing engine drives
//! (`create` / `destroy` / `serialize` / `deserialize` / `scan`), operating
//! on a boxed [`Scanner`] payload and the engine's [`OffsideLexer`] vtable.

use std::{
    ffi::{c_char, c_int, c_void, CStr, CString},
    ptr::NonNull,
    slice,
};

use offside::{
    KindSet, LexCursor, RawToken, RawTokenList, Scanner, Structural, TokenizeError, Tokenizer,
};

/// Size of the state buffer the engine hands to `serialize`.
pub const SERIALIZATION_BUFFER_SIZE: usize = 1024;

// External symbol indices, fixed by the grammar's declaration order.
const SYM_INDENT: usize = 0;
const SYM_DEDENT: usize = 1;
const SYM_NEWLINE: usize = 2;
const SYM_COUNT: usize = 3;

/// One entry of the tokenizer's result list.
#[repr(C)]
pub struct OffsideToken {
    pub type_code: c_int,
    /// Null-terminated lexeme, owned by the list's allocator.
    pub text: *const c_char,
    pub line: c_int,
}

/// The tokenizer's result structure.
#[repr(C)]
pub struct OffsideTokenList {
    pub tokens: *const OffsideToken,
    pub count: usize,
}

unsafe extern "C" {
    fn offside_tokenize(source: *const c_char) -> *mut OffsideTokenList;
    fn offside_free_token_list(list: *mut OffsideTokenList);
}

/// Owns one foreign token list for the duration of the adapter's copy.
///
/// `Drop` hands the allocation back to the tokenizer's allocator, so the
/// release happens in the same scoped operation that acquired the handle and
/// exactly once.
pub struct ForeignTokenList {
    ptr: NonNull<OffsideTokenList>,
}

impl ForeignTokenList {
    fn list(&self) -> &OffsideTokenList {
        unsafe { self.ptr.as_ref() }
    }
}

impl RawTokenList for ForeignTokenList {
    fn len(&self) -> usize {
        let list = self.list();
        if list.tokens.is_null() {
            0
        } else {
            list.count
        }
    }

    fn raw(&self, index: usize) -> RawToken<'_> {
        let list = self.list();
        assert!(index < self.len());
        let token = unsafe { &*list.tokens.add(index) };
        let text = if token.text.is_null() {
            &[]
        } else {
            unsafe { CStr::from_ptr(token.text) }.to_bytes()
        };
        RawToken {
            type_code: token.type_code,
            text,
            line: token.line.max(0) as u32,
        }
    }
}

impl Drop for ForeignTokenList {
    fn drop(&mut self) {
        unsafe { offside_free_token_list(self.ptr.as_ptr()) };
    }
}

/// Tokenizer backed by the host-linked `offside_tokenize` entry point.
#[derive(Debug, Default)]
pub struct ExternalTokenizer;

impl Tokenizer for ExternalTokenizer {
    type List = ForeignTokenList;

    fn tokenize(&mut self, source: &[u8]) -> Result<ForeignTokenList, TokenizeError> {
        let source =
            CString::new(source).map_err(|_| TokenizeError::UnrepresentableSource)?;
        let ptr = unsafe { offside_tokenize(source.as_ptr()) };
        NonNull::new(ptr)
            .map(|ptr| ForeignTokenList { ptr })
            .ok_or(TokenizeError::NoResult)
    }
}

/// The parsing engine's lexer vtable, shared by reference across the scan
/// call.
#[repr(C)]
pub struct OffsideLexer {
    /// Code point under the cursor; `0` at end of input.
    pub lookahead: i32,
    /// Set by `scan` to the matched external symbol on success.
    pub result_symbol: u16,
    pub advance: unsafe extern "C" fn(*mut OffsideLexer, bool),
    pub mark_end: unsafe extern "C" fn(*mut OffsideLexer),
    pub get_column: unsafe extern "C" fn(*mut OffsideLexer) -> u32,
    pub eof: unsafe extern "C" fn(*const OffsideLexer) -> bool,
}

struct LexerCursor {
    raw: *mut OffsideLexer,
}

impl LexCursor for LexerCursor {
    fn lookahead(&self) -> Option<char> {
        let code = unsafe { (*self.raw).lookahead };
        if code == 0 {
            None
        } else {
            Some(char::from_u32(code as u32).unwrap_or('\u{FFFD}'))
        }
    }

    fn advance(&mut self) {
        unsafe { ((*self.raw).advance)(self.raw, false) };
    }

    fn mark_end(&mut self) {
        unsafe { ((*self.raw).mark_end)(self.raw) };
    }
}

type ExternalScanner = Scanner<ExternalTokenizer>;

fn symbol_for(kind: Structural) -> u16 {
    match kind {
        Structural::Indent => SYM_INDENT as u16,
        Structural::Dedent => SYM_DEDENT as u16,
        Structural::Newline => SYM_NEWLINE as u16,
    }
}

unsafe fn accepted_from(valid_symbols: *const bool) -> KindSet {
    let valid = unsafe { slice::from_raw_parts(valid_symbols, SYM_COUNT) };
    let mut accepted = KindSet::EMPTY;
    if valid[SYM_INDENT] {
        accepted = accepted.with(Structural::Indent);
    }
    if valid[SYM_DEDENT] {
        accepted = accepted.with(Structural::Dedent);
    }
    if valid[SYM_NEWLINE] {
        accepted = accepted.with(Structural::Newline);
    }
    accepted
}

/// Allocates a scanner payload.
#[no_mangle]
pub extern "C" fn offside_scanner_create() -> *mut c_void {
    Box::into_raw(Box::new(ExternalScanner::new(ExternalTokenizer))).cast()
}

/// Frees a payload previously returned by [`offside_scanner_create`].
///
/// # Safety
///
/// `payload` must be null or a pointer obtained from
/// [`offside_scanner_create`] that has not been destroyed yet.
#[no_mangle]
pub unsafe extern "C" fn offside_scanner_destroy(payload: *mut c_void) {
    if !payload.is_null() {
        drop(unsafe { Box::from_raw(payload.cast::<ExternalScanner>()) });
    }
}

/// Writes resumption state into `buffer`, returning the bytes written.
///
/// # Safety
///
/// `payload` must be a live scanner payload and `buffer` must point to at
/// least [`SERIALIZATION_BUFFER_SIZE`] writable bytes.
#[no_mangle]
pub unsafe extern "C" fn offside_scanner_serialize(
    payload: *mut c_void,
    buffer: *mut c_char,
) -> u32 {
    let scanner = unsafe { &*payload.cast::<ExternalScanner>() };
    let buffer =
        unsafe { slice::from_raw_parts_mut(buffer.cast::<u8>(), SERIALIZATION_BUFFER_SIZE) };
    scanner.serialize(buffer) as u32
}

/// Restores resumption state from `buffer`.
///
/// # Safety
///
/// `payload` must be a live scanner payload; `buffer` must point to `length`
/// readable bytes, or may be null when `length` is zero.
#[no_mangle]
pub unsafe extern "C" fn offside_scanner_deserialize(
    payload: *mut c_void,
    buffer: *const c_char,
    length: u32,
) {
    let scanner = unsafe { &mut *payload.cast::<ExternalScanner>() };
    let buffer = if buffer.is_null() || length == 0 {
        &[]
    } else {
        unsafe { slice::from_raw_parts(buffer.cast::<u8>(), length as usize) }
    };
    scanner.deserialize(buffer);
}

/// Produces the next structural token, writing the matched symbol into the
/// lexer's `result_symbol` slot and returning `true` on a match.
///
/// # Safety
///
/// `payload` must be a live scanner payload, `lexer` a valid engine lexer,
/// and `valid_symbols` an array of at least three booleans in external
/// symbol order.
#[no_mangle]
pub unsafe extern "C" fn offside_scanner_scan(
    payload: *mut c_void,
    lexer: *mut OffsideLexer,
    valid_symbols: *const bool,
) -> bool {
    let scanner = unsafe { &mut *payload.cast::<ExternalScanner>() };
    let accepted = unsafe { accepted_from(valid_symbols) };
    let mut cursor = LexerCursor { raw: lexer };
    match scanner.scan(&mut cursor, accepted) {
        Some(kind) => {
            unsafe { (*lexer).result_symbol = symbol_for(kind) };
            true
        }
        None => false,
    }
}

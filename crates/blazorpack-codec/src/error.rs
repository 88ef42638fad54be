/// Errors that can occur while decoding BlazorPack bytes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended before the current field was complete.
    #[error("truncated input at offset {offset}: expected {expected}, found end of buffer")]
    TruncatedInput { offset: usize, expected: &'static str },

    /// The leading tag byte is not part of the grammar.
    #[error("malformed tag 0x{tag:02x} at offset {offset}")]
    MalformedTag { offset: usize, tag: u8 },

    /// Container nesting exceeded the decoder's depth cap.
    #[error("recursion limit of {limit} exceeded at offset {offset}")]
    RecursionLimitExceeded { offset: usize, limit: usize },
}

/// Errors that can occur while encoding a value tree.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A value or length does not fit the wire format selected for it.
    #[error("numeric overflow: {value} does not fit {format}")]
    NumericOverflow { value: String, format: &'static str },
}

//! BlazorPack value tree, decoder, and encoder.
//!
//! BlazorPack is the MessagePack-derived encoding Blazor Server uses for
//! hub invocation payloads. Decoding produces a [`Value`] tree that keeps
//! the wire width class of every scalar and container, so an untouched
//! tree re-encodes to byte-identical output. Freshly constructed values
//! carry no width class and encode to the most compact legal form.

pub mod decode;
pub mod encode;
pub mod error;
pub mod value;

pub use decode::{decode, decode_body, MAX_DEPTH};
pub use encode::{encode, encode_body, encode_frame};
pub use error::{DecodeError, EncodeError};
pub use value::{
    ArrayValue, BinFormat, BinValue, ExtFormat, ExtValue, FloatFormat, FloatValue, IntFormat,
    IntValue, MapValue, SeqFormat, StrFormat, StrValue, Value,
};

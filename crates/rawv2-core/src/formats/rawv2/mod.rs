//! Ruuvi RAWv2 (data format 5) and cut RAWv2 (data format C5) decoding.
//!
//! Both layouts share field semantics; the cut layout drops the three
//! acceleration words and is six bytes shorter. Every multi-byte field is
//! big-endian, and the leading byte alone selects the layout.
//!
//! Offsets live in `layout`, bounds-checked access in `reader`, per-field
//! scale/offset/sentinel handling in `fields`, and assembly in `parser`.

pub mod error;
pub mod fields;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::DecodeError;
pub use layout::Format;
pub use parser::{Reading, decode, decode_now, strip_manufacturer_id};

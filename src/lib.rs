//! # LZW decoder
//!
//! This crate decodes LZW streams with 8-bit literals, MSB-first code packing and code sizes
//! that grow from 9 to 12 bits. Streams start with a clear code and usually end with an end code,
//! defined as follows:
//!
//!  * `CLEAR_CODE == 256`
//!  * `END_CODE   == 257`
//!
//! The code size grows one entry early: the decoder switches to 10 bits once its next table entry
//! is 511, to 11 bits at 1023 and to 12 bits at 2047.
//!
//! Examplary use of the decoder:
//!
//! ```
//! use lzwdec::decode::Decoder;
//! // Clear code, 'A', 'B', end code, packed as 9-bit codes.
//! let data = [0x80u8, 0x10, 0x48, 0x50, 0x10];
//!
//! let decoded = Decoder::new().decode(&data[..]).unwrap();
//! assert_eq!(decoded, b"AB");
//! ```
//!
//! The [`bits`] module holds the bit reader the decoder is built upon. It works over any
//! [`bits::ByteSource`], which also lets signed byte buffers be decoded in place.
#![forbid(unsafe_code)]

extern crate alloc;

use crate::bits::ByteSource;
use crate::decode::{Decoder, LzwError};

/// The clear code, resetting the table and the code size.
pub const CLEAR_CODE: Code = 256;
/// The end code, terminating the stream.
pub const END_CODE: Code = 257;

pub const MIN_CODESIZE: u8 = 9;
pub const MAX_CODESIZE: u8 = 12;
pub const MAX_ENTRIES: usize = 1 << MAX_CODESIZE as usize;

/// The single byte [`decode_lzw`] returns for empty input.
///
/// Hosts with signed bytes see this as `-1`.
pub const NO_DATA_SENTINEL: u8 = 0xff;

/// Alias for a LZW code point
pub type Code = u16;

pub mod bits;
pub mod decode;

/// Decode a buffer the way the original tooling for this format does.
///
/// Empty input yields `vec![NO_DATA_SENTINEL]` instead of an error, and decoding stops once the
/// output is as long as the input (see [`decode::OutputBound::InputLength`]). Prefer a
/// [`Decoder`] for anything that does not need this exact behaviour.
pub fn decode_lzw<S: ByteSource + ?Sized>(inp: &S) -> Result<Vec<u8>, LzwError> {
    match Decoder::with_legacy_bound().decode(inp) {
        Err(LzwError::NoData) => Ok(vec![NO_DATA_SENTINEL]),
        other => other,
    }
}

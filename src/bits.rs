//! Reading codes of arbitrary width from a byte buffer.
//!
//! The [`BitReader`] knows nothing about LZW. It hands out the next `n` bits of its source,
//! most significant bit first, and tells its caller when the source has run dry.
use crate::alloc::vec::Vec;

/// Largest number of bits a single [`BitReader::read_bits`] call can return.
pub const MAX_READ: u8 = 32;

/// A sequential byte source with a known length and indexed access.
///
/// This is what the [`BitReader`] and the decoder are written against, so that any buffer
/// representation can be decoded without first copying it into a `Vec<u8>`.
pub trait ByteSource {
    /// The number of bytes in the source.
    fn len(&self) -> usize;

    /// The unsigned value of the byte at `index`.
    ///
    /// Callers only ask for indices below `len()`.
    fn byte_at(&self, index: usize) -> u8;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The buffer ended on a byte boundary while a read still needed bits.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("byte buffer ended {missing} bits short of a {requested} bit read")]
pub struct UnexpectedEndOfStream {
    /// The width of the read that failed.
    pub requested: u8,
    /// How many of those bits were not available.
    pub missing: u8,
}

/// A cursor reading MSB-first bit fields out of a [`ByteSource`].
pub struct BitReader<'a, S: ByteSource + ?Sized> {
    source: &'a S,
    /// Index of the byte holding the next unread bit.
    byte: usize,
    /// Offset of the next unread bit within `byte`, counted from the MSB.
    bit: u8,
    exhausted: bool,
}

impl<'a, S: ByteSource + ?Sized> BitReader<'a, S> {
    pub fn new(source: &'a S) -> Self {
        BitReader {
            source,
            byte: 0,
            bit: 0,
            exhausted: source.is_empty(),
        }
    }

    /// Read the next `count` bits, most significant bit first.
    ///
    /// Returns `Ok(Some(0))` for a zero-width read, whatever the state of the reader. Once the
    /// reader is exhausted every other read returns `Ok(None)`.
    ///
    /// The end of the source is only noticed when a read consumes the last bits of a byte. A
    /// read that ends exactly on the final byte boundary still returns its full value, and
    /// marks the reader as exhausted for the calls after it. A read that reaches the end of the
    /// buffer with bits still owed fails with [`UnexpectedEndOfStream`], and exhausts the reader
    /// as well.
    ///
    /// # Panics
    ///
    /// When `count` is larger than [`MAX_READ`].
    pub fn read_bits(&mut self, count: u8) -> Result<Option<u32>, UnexpectedEndOfStream> {
        assert!(count <= MAX_READ, "can not read {} bits at once", count);

        if count == 0 {
            return Ok(Some(0));
        }

        if self.exhausted {
            return Ok(None);
        }

        let mut wanted = count;
        let mut value = 0u32;

        while wanted > 0 {
            let byte = u32::from(self.source.byte_at(self.byte));
            let remain = 8 - self.bit;

            if wanted < remain {
                // The read ends inside the current byte.
                let shift = remain - wanted;
                value = (value << wanted) | ((byte >> shift) & low_mask(wanted));
                self.bit += wanted;
                break;
            }

            value = (value << remain) | (byte & low_mask(remain));
            wanted -= remain;
            self.bit = 0;
            self.byte += 1;

            if self.byte == self.source.len() {
                self.exhausted = true;
                if wanted > 0 {
                    return Err(UnexpectedEndOfStream {
                        requested: count,
                        missing: wanted,
                    });
                }
            }
        }

        Ok(Some(value))
    }

    /// Whether the final byte of the source has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// The current `(byte index, bit offset)` of the cursor.
    pub fn position(&self) -> (usize, u8) {
        (self.byte, self.bit)
    }
}

fn low_mask(bits: u8) -> u32 {
    (1u32 << bits) - 1
}

impl ByteSource for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn byte_at(&self, index: usize) -> u8 {
        self[index]
    }
}

impl ByteSource for [i8] {
    fn len(&self) -> usize {
        <[i8]>::len(self)
    }

    fn byte_at(&self, index: usize) -> u8 {
        self[index] as u8
    }
}

impl<const N: usize> ByteSource for [u8; N] {
    fn len(&self) -> usize {
        N
    }

    fn byte_at(&self, index: usize) -> u8 {
        self[index]
    }
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn byte_at(&self, index: usize) -> u8 {
        self[index]
    }
}

impl ByteSource for Vec<i8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn byte_at(&self, index: usize) -> u8 {
        self[index] as u8
    }
}

//! A module for all decoding needs.
use crate::alloc::vec::Vec;
use crate::bits::{BitReader, ByteSource, UnexpectedEndOfStream};
use crate::{Code, CLEAR_CODE, END_CODE, MAX_CODESIZE, MAX_ENTRIES, MIN_CODESIZE};

#[cfg(feature = "std")]
use std::io::{self, Read, Write};

/// The configurable LZW decoder.
///
/// The decoder itself only holds configuration. Each call to [`decode`] builds a fresh table
/// and bit reader, so one decoder may be used for any number of independent streams, also from
/// several threads at once.
///
/// [`decode`]: #method.decode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoder {
    bound: OutputBound,
}

/// When decoding stops even though no end code has been read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputBound {
    /// Only the end code or the end of the input stop the decoder.
    EndCode,
    /// Stop as soon as the output is at least as long as the input.
    ///
    /// This reproduces the behaviour of the tool this stream format originates from. It cuts off
    /// any stream that decompresses to more bytes than it occupies compressed.
    InputLength,
    /// Stop as soon as the output holds at least this many bytes.
    Limit(usize),
}

/// A decoding stream sink.
///
/// See [`Decoder::into_stream`] on how to create this type and more information.
///
/// [`Decoder::into_stream`]: struct.Decoder.html#method.into_stream
#[cfg(feature = "std")]
pub struct IntoStream<'d, W> {
    decoder: &'d Decoder,
    writer: W,
}

/// An async decoding sink.
///
/// See [`Decoder::into_async`] on how to create this type and more information.
///
/// [`Decoder::into_async`]: struct.Decoder.html#method.into_async
#[cfg(feature = "async")]
pub struct IntoAsync<'d, W> {
    decoder: &'d Decoder,
    writer: W,
}

/// The result of a decoding run over a reader and writer pair.
#[cfg(feature = "std")]
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// Possible error that occurred.
    pub status: io::Result<()>,
}

/// The error kind of a failed decode.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwError {
    /// The input held no bytes at all.
    ///
    /// This is distinct from a stream that validly decodes to zero bytes.
    #[error("no input data")]
    NoData,
    /// The stream can not be decoded any further.
    #[error("corrupt LZW stream: {0}")]
    CorruptStream(Corruption),
}

/// The ways in which a code stream can be broken.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corruption {
    /// A code referenced a table entry that does not exist yet.
    #[error("code {code} is beyond the next table entry {next_code}")]
    InvalidCode { code: Code, next_code: Code },
    /// A data code arrived before the first clear code.
    #[error("code {code} before the first clear code")]
    CodeBeforeClear { code: Code },
    /// The stream would grow the table past its last entry.
    #[error("code table overflow")]
    TableOverflow,
    /// The input ended in the middle of a code.
    #[error(transparent)]
    Truncated(UnexpectedEndOfStream),
}

impl From<Corruption> for LzwError {
    fn from(corruption: Corruption) -> Self {
        LzwError::CorruptStream(corruption)
    }
}

impl From<UnexpectedEndOfStream> for LzwError {
    fn from(err: UnexpectedEndOfStream) -> Self {
        LzwError::CorruptStream(Corruption::Truncated(err))
    }
}

struct DecodeState {
    /// The table of decoded codes.
    table: Table,

    /// The current code size.
    code_size: u8,

    /// The code that the next derived entry will get.
    next_code: Code,

    /// The most recent data code, `None` until the first code after a clear.
    last: Option<Code>,
}

/// All strings of the table, back to back in one arena.
struct Table {
    bytes: Vec<u8>,
    entries: Vec<Entry>,
}

#[derive(Clone, Copy)]
struct Entry {
    start: u32,
    len: u16,
}

impl Decoder {
    /// Create a decoder that runs until the end code or the end of the input.
    pub fn new() -> Self {
        Decoder {
            bound: OutputBound::EndCode,
        }
    }

    /// Create a decoder that also stops once the output is as long as the input.
    ///
    /// See [`OutputBound::InputLength`] for the consequences.
    pub fn with_legacy_bound() -> Self {
        Decoder {
            bound: OutputBound::InputLength,
        }
    }

    pub fn with_output_bound(bound: OutputBound) -> Self {
        Decoder { bound }
    }

    pub fn output_bound(&self) -> OutputBound {
        self.bound
    }

    /// Decode a complete buffer.
    ///
    /// An empty buffer yields [`LzwError::NoData`].
    pub fn decode<S: ByteSource + ?Sized>(&self, inp: &S) -> Result<Vec<u8>, LzwError> {
        let mut out = Vec::with_capacity(inp.len());
        self.decode_into(inp, &mut out)?;
        Ok(out)
    }

    /// Decode a complete buffer, appending to `out`.
    ///
    /// Returns the number of bytes appended. The output bound applies to the bytes appended by
    /// this call, not to what `out` held before. On error `out` keeps whatever was decoded up to
    /// the broken code.
    pub fn decode_into<S: ByteSource + ?Sized>(
        &self,
        inp: &S,
        out: &mut Vec<u8>,
    ) -> Result<usize, LzwError> {
        if inp.is_empty() {
            return Err(LzwError::NoData);
        }

        let limit = match self.bound {
            OutputBound::EndCode => None,
            OutputBound::InputLength => Some(inp.len()),
            OutputBound::Limit(limit) => Some(limit),
        };

        let start = out.len();
        let mut reader = BitReader::new(inp);
        let mut state = DecodeState::new();
        let result = state.advance(&mut reader, out, start, limit);
        let written = out.len() - start;
        result.map(|()| written)
    }

    /// Construct a decoder into a writer.
    #[cfg(feature = "std")]
    pub fn into_stream<W: Write>(&self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            decoder: self,
            writer,
        }
    }

    /// Construct a decoder into an async writer.
    #[cfg(feature = "async")]
    pub fn into_async<W: futures::io::AsyncWrite>(&self, writer: W) -> IntoAsync<'_, W> {
        IntoAsync {
            decoder: self,
            writer,
        }
    }
}

impl Default for OutputBound {
    fn default() -> Self {
        OutputBound::EndCode
    }
}

#[cfg(feature = "std")]
fn io_error(err: LzwError) -> io::Error {
    match err {
        LzwError::NoData => io::Error::new(io::ErrorKind::UnexpectedEof, "No data to decode"),
        err => io::Error::new(io::ErrorKind::InvalidData, err),
    }
}

#[cfg(feature = "std")]
impl<W: Write> IntoStream<'_, W> {
    /// Decode all data from a reader.
    ///
    /// The reader is drained completely before the first byte is decoded.
    pub fn decode_all(self, mut read: impl Read) -> AllResult {
        let IntoStream { decoder, mut writer } = self;

        let mut data = Vec::new();
        let written = read
            .read_to_end(&mut data)
            .and_then(|_| decoder.decode(&data[..]).map_err(io_error))
            .and_then(|decoded| {
                writer.write_all(&decoded)?;
                writer.flush()?;
                Ok(decoded.len())
            });

        let (bytes_written, status) = match written {
            Ok(len) => (len, Ok(())),
            Err(err) => (0, Err(err)),
        };

        AllResult {
            bytes_read: data.len(),
            bytes_written,
            status,
        }
    }
}

#[cfg(feature = "async")]
impl<W: futures::io::AsyncWrite + core::marker::Unpin> IntoAsync<'_, W> {
    /// Decode all data from an async reader.
    ///
    /// The reader is drained completely before the first byte is decoded.
    pub async fn decode_all(
        self,
        mut read: impl futures::io::AsyncRead + core::marker::Unpin,
    ) -> AllResult {
        use futures::io::AsyncReadExt;
        let IntoAsync { decoder, mut writer } = self;

        let mut data = Vec::new();
        let written = match read.read_to_end(&mut data).await {
            Ok(_) => write_async(decoder, &data, &mut writer).await,
            Err(err) => Err(err),
        };

        let (bytes_written, status) = match written {
            Ok(len) => (len, Ok(())),
            Err(err) => (0, Err(err)),
        };

        AllResult {
            bytes_read: data.len(),
            bytes_written,
            status,
        }
    }
}

#[cfg(feature = "async")]
async fn write_async<W>(decoder: &Decoder, data: &[u8], writer: &mut W) -> io::Result<usize>
where
    W: futures::io::AsyncWrite + core::marker::Unpin,
{
    use futures::io::AsyncWriteExt;
    let decoded = decoder.decode(data).map_err(io_error)?;
    writer.write_all(&decoded).await?;
    writer.flush().await?;
    Ok(decoded.len())
}

impl DecodeState {
    fn new() -> Self {
        DecodeState {
            table: Table::new(),
            code_size: MIN_CODESIZE,
            next_code: END_CODE + 1,
            last: None,
        }
    }

    fn reset_tables(&mut self) {
        log::trace!("clear code, resetting table of {} codes", self.next_code);
        self.code_size = MIN_CODESIZE;
        self.next_code = END_CODE + 1;
        self.last = None;
        self.table.clear();
    }

    fn advance<S: ByteSource + ?Sized>(
        &mut self,
        reader: &mut BitReader<'_, S>,
        out: &mut Vec<u8>,
        start: usize,
        limit: Option<usize>,
    ) -> Result<(), LzwError> {
        loop {
            if let Some(limit) = limit {
                if out.len() - start >= limit {
                    log::debug!("output bound of {} bytes reached", limit);
                    return Ok(());
                }
            }

            let code = match self.next_symbol(reader)? {
                Some(code) => code,
                None => return Ok(()),
            };

            if code == CLEAR_CODE {
                self.reset_tables();

                // The code after a clear has nothing to extend and only emits its literal.
                let init_code = loop {
                    match self.next_symbol(reader)? {
                        Some(code) if code == CLEAR_CODE => self.reset_tables(),
                        Some(code) => break code,
                        None => return Ok(()),
                    }
                };

                if init_code >= CLEAR_CODE {
                    return Err(Corruption::InvalidCode {
                        code: init_code,
                        next_code: self.next_code,
                    }
                    .into());
                }

                out.extend_from_slice(self.table.at(init_code));
                self.last = Some(init_code);
                continue;
            }

            // Only the stream before the first clear code has no previous code.
            let last = self.last.ok_or(Corruption::CodeBeforeClear { code })?;

            if code > self.next_code {
                return Err(Corruption::InvalidCode {
                    code,
                    next_code: self.next_code,
                }
                .into());
            }

            if code < self.next_code {
                out.extend_from_slice(self.table.at(code));
                let first = self.table.at(code)[0];
                self.table.derive(last, first)?;
            } else {
                // The encoder used the entry it created one step ahead of us. That entry can
                // only be the previous string extended by its own first byte.
                let first = self.table.at(last)[0];
                let new_code = self.table.derive(last, first)?;
                out.extend_from_slice(self.table.at(new_code));
            }

            self.last = Some(code);
            self.next_code += 1;
            debug_assert_eq!(usize::from(self.next_code), self.table.len());

            if self.next_code == (1u16 << self.code_size) - 1 && self.code_size < MAX_CODESIZE {
                self.code_size += 1;
                log::debug!(
                    "code size increased to {} at code {}",
                    self.code_size,
                    self.next_code
                );
            }
        }
    }

    /// Read the next code, folding the end code into the end of the input.
    fn next_symbol<S: ByteSource + ?Sized>(
        &mut self,
        reader: &mut BitReader<'_, S>,
    ) -> Result<Option<Code>, LzwError> {
        match reader.read_bits(self.code_size)? {
            None => {
                log::debug!("input exhausted without end code");
                Ok(None)
            }
            Some(code) if code == u32::from(END_CODE) => {
                log::debug!("end code after {} table entries", self.next_code);
                Ok(None)
            }
            // At most `MAX_CODESIZE` bits were read.
            Some(code) => Ok(Some(code as Code)),
        }
    }
}

impl Table {
    fn new() -> Self {
        let mut table = Table {
            bytes: Vec::with_capacity(1 << 16),
            entries: Vec::with_capacity(MAX_ENTRIES),
        };
        table.clear();
        table
    }

    /// Drop all derived entries and restore the literals and the two control codes.
    fn clear(&mut self) {
        self.bytes.clear();
        self.entries.clear();
        for byte in 0..=u8::max_value() {
            self.push(&[byte]);
        }
        // Clear code.
        self.push(&[]);
        // End code.
        self.push(&[]);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn at(&self, code: Code) -> &[u8] {
        let Entry { start, len } = self.entries[usize::from(code)];
        let start = start as usize;
        &self.bytes[start..start + usize::from(len)]
    }

    /// Append a new entry made of the string of `prev` and one more byte.
    fn derive(&mut self, prev: Code, byte: u8) -> Result<Code, Corruption> {
        if self.entries.len() >= MAX_ENTRIES {
            return Err(Corruption::TableOverflow);
        }

        let Entry { start, len } = self.entries[usize::from(prev)];
        let new_start = self.bytes.len();
        let start = start as usize;
        self.bytes.extend_from_within(start..start + usize::from(len));
        self.bytes.push(byte);
        self.entries.push(Entry {
            start: new_start as u32,
            len: len + 1,
        });
        Ok((self.entries.len() - 1) as Code)
    }

    fn push(&mut self, string: &[u8]) {
        self.entries.push(Entry {
            start: self.bytes.len() as u32,
            len: string.len() as u16,
        });
        self.bytes.extend_from_slice(string);
    }
}

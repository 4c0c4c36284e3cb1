//! A reference encoder producing the streams the decoder expects.
//!
//! No encoder ships with the crate. This one exists so the tests and benchmarks can produce
//! realistic streams, and it mirrors the decoder's table to know the width of every code.
#![allow(dead_code)]
use std::collections::HashMap;

use lzwdec::{Code, CLEAR_CODE, END_CODE, MAX_CODESIZE, MIN_CODESIZE};

/// The encoder table size at which it starts over with a clear code.
const RESET_AT: Code = 4094;

/// Encode `data` into a complete stream, from the first clear code to the padded end code.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut state = EncodeState::new();
    for &byte in data {
        state.push(byte);
    }
    state.finish()
}

/// Pack `(code, width)` pairs MSB first, padding the last byte with zero bits.
pub fn pack(codes: &[(Code, u8)]) -> Vec<u8> {
    let mut buffer = MsbBuffer::default();
    for &(code, width) in codes {
        buffer.buffer_code(code, width);
    }
    buffer.finish()
}

/// Some input that compresses well but not trivially.
pub fn text(len: usize) -> Vec<u8> {
    const WORDS: &[&str] = &[
        "to", "be", "or", "not", "the", "question", "whether", "nobler", "in", "mind", "suffer",
        "slings", "arrows", "outrageous", "fortune",
    ];

    let mut rng = XorShift(0x2545_f491);
    let mut out = Vec::with_capacity(len + 16);
    while out.len() < len {
        let word = WORDS[(rng.next() % WORDS.len() as u32) as usize];
        out.extend_from_slice(word.as_bytes());
        out.push(if rng.next() % 9 == 0 { b'\n' } else { b' ' });
    }
    out.truncate(len);
    out
}

/// Input that does not compress at all.
pub fn noise(len: usize) -> Vec<u8> {
    let mut rng = XorShift(0x9e37_79b9);
    (0..len).map(|_| rng.next() as u8).collect()
}

struct XorShift(u32);

impl XorShift {
    fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }
}

struct EncodeState {
    /// Continuations of known strings, keyed by their code and the next byte.
    tree: HashMap<(Code, u8), Code>,
    /// The code for the next table entry of the encoder.
    next_code: Code,
    /// The code corresponding to the currently read characters.
    current: Option<Code>,
    /// The table size of the decoder when it reads the next code.
    decoder_next: Code,
    /// If the next code is the first one after a clear code.
    fresh: bool,
    code_size: u8,
    buffer: MsbBuffer,
}

#[derive(Default)]
struct MsbBuffer {
    /// The buffer bits.
    buffer: u64,
    /// The number of valid buffer bits.
    bits_in_buffer: u8,
    out: Vec<u8>,
}

impl EncodeState {
    fn new() -> Self {
        let mut state = EncodeState {
            tree: HashMap::new(),
            next_code: END_CODE + 1,
            current: None,
            decoder_next: END_CODE + 1,
            fresh: true,
            code_size: MIN_CODESIZE,
            buffer: MsbBuffer::default(),
        };
        state.clear();
        state
    }

    fn push(&mut self, byte: u8) {
        let current = match self.current {
            Some(current) => current,
            None => {
                self.current = Some(byte.into());
                return;
            }
        };

        if let Some(&code) = self.tree.get(&(current, byte)) {
            self.current = Some(code);
            return;
        }

        self.emit(current);
        if self.next_code == RESET_AT {
            self.clear();
        } else {
            self.tree.insert((current, byte), self.next_code);
            self.next_code += 1;
        }
        self.current = Some(byte.into());
    }

    fn finish(mut self) -> Vec<u8> {
        if let Some(current) = self.current.take() {
            self.emit(current);
        }
        self.buffer.buffer_code(END_CODE, self.code_size);
        self.buffer.finish()
    }

    /// Write a data code and follow the decoder through the entry it derives from it.
    fn emit(&mut self, code: Code) {
        self.buffer.buffer_code(code, self.code_size);
        if self.fresh {
            self.fresh = false;
            return;
        }

        self.decoder_next += 1;
        if self.decoder_next == (1 << self.code_size) - 1 && self.code_size < MAX_CODESIZE {
            self.code_size += 1;
        }
    }

    fn clear(&mut self) {
        self.buffer.buffer_code(CLEAR_CODE, self.code_size);
        self.tree.clear();
        self.next_code = END_CODE + 1;
        self.decoder_next = END_CODE + 1;
        self.code_size = MIN_CODESIZE;
        self.fresh = true;
    }
}

impl MsbBuffer {
    fn buffer_code(&mut self, code: Code, code_size: u8) {
        let shift = 64 - self.bits_in_buffer - code_size;
        self.buffer |= u64::from(code) << shift;
        self.bits_in_buffer += code_size;

        while self.bits_in_buffer >= 8 {
            self.out.push((self.buffer >> 56) as u8);
            self.buffer <<= 8;
            self.bits_in_buffer -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bits_in_buffer > 0 {
            self.out.push((self.buffer >> 56) as u8);
        }
        self.out
    }
}

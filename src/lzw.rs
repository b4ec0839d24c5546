// lzw.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Lempel-Ziv-Welch decompression for GIF
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::ops::AddAssign;

/// Code Bits
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bits(u8);

impl From<u8> for Bits {
    fn from(bits: u8) -> Self {
        Bits(bits.min(Self::MAX.0))
    }
}

impl From<Bits> for u8 {
    fn from(bits: Bits) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for Bits {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl Bits {
    /// Maximum code bits allowed for GIF
    const MAX: Self = Bits(12);

    /// Get the number of entries
    fn entries(self) -> u16 {
        1 << (self.0 as u16)
    }

    /// Get the bit mask
    fn mask(self) -> u32 {
        (1 << (self.0 as u32)) - 1
    }
}

/// Code type
type Code = u16;

/// Entry in the code table.
///
/// Each entry is the sequence of its prefix entry followed by one index.
#[derive(Clone, Copy, Debug)]
struct Node {
    /// Prefix code
    prefix: Option<Code>,
    /// Last index of the sequence
    index: u8,
    /// First index of the sequence
    first: u8,
}

/// Code table, stored as an arena of prefix-linked entries
#[derive(Debug)]
struct Table {
    /// Entries by code
    nodes: Vec<Node>,
    /// Minimum code bits
    min_code_bits: u8,
}

impl Table {
    /// Create a new code table
    fn new(min_code_bits: u8) -> Self {
        let mut table = Table {
            nodes: Vec::with_capacity(Bits::MAX.entries().into()),
            min_code_bits,
        };
        table.reset();
        table
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Get the next available code
    fn next_code(&self) -> Code {
        self.nodes.len() as Code
    }

    /// Check whether all 12-bit codes are assigned
    fn is_full(&self) -> bool {
        self.nodes.len() >= Bits::MAX.entries().into()
    }

    /// Reset the table to single-index entries plus clear and end codes
    fn reset(&mut self) {
        let initial = usize::from(self.end_code()) + 1;
        if self.nodes.len() >= initial {
            self.nodes.truncate(initial);
            return;
        }
        self.nodes.clear();
        for code in 0..self.clear_code() {
            let index = code as u8;
            self.nodes.push(Node {
                prefix: None,
                index,
                first: index,
            });
        }
        let placeholder = Node {
            prefix: None,
            index: 0,
            first: 0,
        };
        self.nodes.push(placeholder); // clear code
        self.nodes.push(placeholder); // end code
    }

    /// Push a new entry: sequence of `prefix` followed by `index`
    fn push(&mut self, prefix: Code, index: u8) {
        if !self.is_full() {
            let first = self.first(prefix);
            self.nodes.push(Node {
                prefix: Some(prefix),
                index,
                first,
            });
        }
    }

    /// Get the first index of a code's sequence
    fn first(&self, code: Code) -> u8 {
        debug_assert!(code < self.next_code());
        self.nodes[code as usize].first
    }

    /// Append the sequence of a code to a buffer
    fn extend(&self, code: Code, buffer: &mut Vec<u8>) {
        debug_assert!(code < self.next_code());
        let start = buffer.len();
        let mut node = self.nodes[code as usize];
        while let Some(prefix) = node.prefix {
            buffer.push(node.index);
            node = self.nodes[prefix as usize];
        }
        buffer.push(node.index);
        buffer[start..].reverse();
    }
}

/// LZW Data Decompressor
///
/// Codes are packed least-significant bit first.  Input may be supplied in
/// pieces (one sub-block at a time); decoding stops at the end code.
#[derive(Debug)]
pub struct Decompressor {
    /// Code table
    table: Table,
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
    /// Previous code
    last: Option<Code>,
    /// Current code
    code: u32,
    /// Number of bits in current code
    n_bits: u8,
    /// End code was reached
    done: bool,
}

impl Decompressor {
    /// Create a new decompressor.
    ///
    /// `min_code_bits` must be between 2 and 12.
    pub fn new(min_code_bits: u8) -> Result<Self> {
        if !(2..=Bits::MAX.0).contains(&min_code_bits) {
            return Err(Error::InvalidCodeSize(min_code_bits));
        }
        Ok(Decompressor {
            min_code_bits,
            table: Table::new(min_code_bits),
            code_bits: Bits::from(min_code_bits + 1),
            last: None,
            code: 0,
            n_bits: 0,
            done: false,
        })
    }

    /// Check whether the end code has been reached
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Get the most recent code
    fn code(&mut self) -> Option<Code> {
        let b = u8::from(self.code_bits);
        if self.n_bits >= b {
            let code = (self.code & self.code_bits.mask()) as Code;
            self.code >>= b;
            self.n_bits -= b;
            Some(code)
        } else {
            None
        }
    }

    /// Unpack one code from a buffer
    fn unpack(&mut self, buffer: &[u8]) -> (usize, Option<Code>) {
        let mut n_consumed = 0;
        for byte in buffer {
            if self.n_bits >= self.code_bits.into() {
                break;
            }
            self.code |= (*byte as u32) << self.n_bits;
            self.n_bits += 8;
            n_consumed += 1;
        }
        (n_consumed, self.code())
    }

    /// Decompress a byte buffer, appending indices to `buffer`.
    ///
    /// Bytes after the end code are ignored.
    pub fn decompress(&mut self, bytes: &[u8], buffer: &mut Vec<u8>) -> Result<()> {
        let mut bytes = bytes;
        while !self.done {
            let (consumed, code) = self.unpack(bytes);
            match code {
                Some(code) => self.decompress_code(code, buffer)?,
                None => break,
            }
            bytes = &bytes[consumed..];
        }
        Ok(())
    }

    /// Decompress one code
    fn decompress_code(&mut self, code: Code, buffer: &mut Vec<u8>) -> Result<()> {
        if code == self.table.clear_code() {
            self.table.reset();
            self.code_bits = Bits::from(self.min_code_bits + 1);
            self.last = None;
        } else if code == self.table.end_code() {
            self.done = true;
        } else {
            self.decompress_sequence(code, buffer)?;
            self.last = Some(code);
        }
        Ok(())
    }

    /// Decompress the sequence for one code and grow the table
    fn decompress_sequence(&mut self, code: Code, buffer: &mut Vec<u8>) -> Result<()> {
        let next_code = self.table.next_code();
        if code < self.table.clear_code() && code > u8::MAX.into() {
            return Err(Error::InvalidColorIndex(code));
        }
        match (self.last, code.cmp(&next_code)) {
            (None, _) => {
                if code >= self.table.clear_code() {
                    return Err(Error::InvalidLzwCode {
                        code,
                        next: next_code,
                    });
                }
                self.table.extend(code, buffer);
                return Ok(());
            }
            (Some(_), Ordering::Greater) => {
                return Err(Error::InvalidLzwCode {
                    code,
                    next: next_code,
                });
            }
            (Some(last), Ordering::Equal) => {
                // code not yet assigned: previous sequence + its first index
                self.table.push(last, self.table.first(last));
                self.table.extend(code, buffer);
            }
            (Some(last), Ordering::Less) => {
                self.table.extend(code, buffer);
                self.table.push(last, self.table.first(code));
            }
        }
        if next_code + 1 == self.code_bits.entries() {
            self.code_bits += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Pack (code, width) pairs least-significant bit first
    fn pack(codes: &[(u16, u8)]) -> Vec<u8> {
        let mut buf = vec![];
        let mut acc = 0u32;
        let mut n = 0;
        for (code, width) in codes {
            acc |= u32::from(*code) << n;
            n += width;
            while n >= 8 {
                buf.push(acc as u8);
                acc >>= 8;
                n -= 8;
            }
        }
        if n > 0 {
            buf.push(acc as u8);
        }
        buf
    }

    /// Get the sequence of a code in the table
    fn sequence(dec: &Decompressor, code: Code) -> Vec<u8> {
        let mut buf = vec![];
        dec.table.extend(code, &mut buf);
        buf
    }

    #[test]
    fn min_code_size() {
        assert!(matches!(Decompressor::new(1), Err(Error::InvalidCodeSize(1))));
        assert!(matches!(Decompressor::new(13), Err(Error::InvalidCodeSize(13))));
        for bits in 2..=12 {
            assert!(Decompressor::new(bits).is_ok());
        }
    }

    #[test]
    fn single_index() -> Result<()> {
        let bytes = pack(&[(4, 3), (0, 3), (5, 3)]);
        let mut dec = Decompressor::new(2)?;
        let mut buf = vec![];
        dec.decompress(&bytes, &mut buf)?;
        assert_eq!(buf, [0]);
        assert!(dec.is_done());
        Ok(())
    }

    #[test]
    fn alternating() -> Result<()> {
        let mut dec = Decompressor::new(2)?;
        let mut buf = vec![];
        dec.decompress(&[0x44, 0x5C], &mut buf)?;
        assert_eq!(buf, [0, 1, 0, 1]);
        assert!(dec.is_done());
        assert_eq!(sequence(&dec, 6), [0, 1]);
        assert_eq!(sequence(&dec, 7), [1, 0]);
        Ok(())
    }

    #[test]
    fn split_input() -> Result<()> {
        let mut dec = Decompressor::new(2)?;
        let mut buf = vec![];
        dec.decompress(&[0x0C], &mut buf)?;
        dec.decompress(&[0x62], &mut buf)?;
        dec.decompress(&[0x51], &mut buf)?;
        assert_eq!(buf, [1, 0, 1, 1, 0, 1]);
        assert!(dec.is_done());
        Ok(())
    }

    #[test]
    fn kwk() -> Result<()> {
        // clear, 1, then the next unassigned code (6)
        let bytes = pack(&[(4, 3), (1, 3), (6, 3), (5, 3)]);
        let mut dec = Decompressor::new(2)?;
        let mut buf = vec![];
        dec.decompress(&bytes, &mut buf)?;
        assert_eq!(buf, [1, 1, 1]);
        assert_eq!(dec.table.next_code(), 7);
        assert_eq!(sequence(&dec, 6), [1, 1]);
        Ok(())
    }

    #[test]
    fn kwk_repeated() -> Result<()> {
        let mut dec = Decompressor::new(2)?;
        let mut buf = vec![];
        dec.decompress(&[0x84, 0x51], &mut buf)?;
        assert_eq!(buf, [0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn clear_resets_table() -> Result<()> {
        let mut dec = Decompressor::new(2)?;
        let mut buf = vec![];
        for code in [4, 0, 1, 6, 7] {
            dec.decompress_code(code, &mut buf)?;
        }
        assert!(dec.table.next_code() > 6);
        assert_eq!(u8::from(dec.code_bits), 4);
        dec.decompress_code(4, &mut buf)?;
        assert_eq!(dec.table.next_code(), 6);
        assert_eq!(u8::from(dec.code_bits), 3);
        assert_eq!(dec.last, None);
        // first code after clear must be a single index
        let len = buf.len();
        dec.decompress_code(3, &mut buf)?;
        assert_eq!(&buf[len..], [3]);
        assert_eq!(dec.table.next_code(), 6);
        Ok(())
    }

    #[test]
    fn invalid_first_code() -> Result<()> {
        let mut dec = Decompressor::new(2)?;
        let mut buf = vec![];
        dec.decompress_code(4, &mut buf)?;
        match dec.decompress_code(6, &mut buf) {
            Err(Error::InvalidLzwCode { code: 6, next: 6 }) => Ok(()),
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn invalid_code() -> Result<()> {
        let bytes = pack(&[(4, 3), (0, 3), (7, 3)]);
        let mut dec = Decompressor::new(2)?;
        let mut buf = vec![];
        match dec.decompress(&bytes, &mut buf) {
            Err(Error::InvalidLzwCode { code: 7, next: 6 }) => Ok(()),
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn literal_too_wide() -> Result<()> {
        let mut dec = Decompressor::new(9)?;
        let mut buf = vec![];
        dec.decompress_code(255, &mut buf)?;
        assert_eq!(buf, [255]);
        dec.decompress_code(512, &mut buf)?;
        match dec.decompress_code(256, &mut buf) {
            Err(Error::InvalidColorIndex(256)) => Ok(()),
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn code_width_growth() -> Result<()> {
        let mut dec = Decompressor::new(2)?;
        let mut buf = vec![];
        dec.decompress_code(4, &mut buf)?;
        dec.decompress_code(0, &mut buf)?;
        let mut bits = 3;
        while !dec.table.is_full() {
            let next = dec.table.next_code();
            dec.decompress_code(0, &mut buf)?;
            assert_eq!(dec.table.next_code(), next + 1);
            if next == (1 << bits) - 1 && bits < 12 {
                bits += 1;
            }
            assert_eq!(u8::from(dec.code_bits), bits);
        }
        assert_eq!(u8::from(dec.code_bits), 12);
        // full table: no more entries, width stays at 12
        dec.decompress_code(0, &mut buf)?;
        assert_eq!(dec.table.next_code(), 4096);
        assert_eq!(u8::from(dec.code_bits), 12);
        Ok(())
    }

    #[test]
    fn stops_at_end_code() -> Result<()> {
        let bytes = pack(&[(4, 3), (2, 3), (5, 3), (1, 3), (1, 3)]);
        let mut dec = Decompressor::new(2)?;
        let mut buf = vec![];
        dec.decompress(&bytes, &mut buf)?;
        dec.decompress(&[0xFF, 0xFF], &mut buf)?;
        assert_eq!(buf, [2]);
        Ok(())
    }

    #[test]
    fn missing_end_code() -> Result<()> {
        let bytes = pack(&[(8, 4), (3, 4), (3, 4), (3, 4)]);
        let mut dec = Decompressor::new(3)?;
        let mut buf = vec![];
        dec.decompress(&bytes, &mut buf)?;
        assert_eq!(buf, [3, 3, 3]);
        assert!(!dec.is_done());
        Ok(())
    }

    /// Pseudo-random indices below `max`
    fn indices(len: usize, max: u8, mut seed: u32) -> Vec<u8> {
        (0..len)
            .map(|_| {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                ((seed >> 16) % u32::from(max)) as u8
            })
            .collect()
    }

    /// Compress with the `lzw` crate's GIF encoder
    fn compress(data: &[u8], min_code_size: u8) -> Vec<u8> {
        let mut compressed = vec![];
        {
            let mut enc =
                lzw::Encoder::new(lzw::LsbWriter::new(&mut compressed), min_code_size)
                    .unwrap();
            enc.encode_bytes(data).unwrap();
        }
        compressed
    }

    #[test]
    fn reference_stream() -> Result<()> {
        for (min_code_size, max) in [(2, 4), (4, 16), (8, 255)] {
            let data = indices(1000, max, u32::from(max));
            let compressed = compress(&data, min_code_size);
            let mut dec = Decompressor::new(min_code_size)?;
            let mut buf = vec![];
            for chunk in compressed.chunks(255) {
                dec.decompress(chunk, &mut buf)?;
            }
            assert_eq!(buf, data);
        }
        Ok(())
    }

    #[test]
    fn reference_stream_full_table() -> Result<()> {
        // long enough to reach 12-bit codes and fill the table repeatedly
        for (min_code_size, max) in [(8, 255), (8, 3), (2, 4)] {
            let data = indices(200_000, max, 0x5EED);
            let compressed = compress(&data, min_code_size);
            let mut dec = Decompressor::new(min_code_size)?;
            let mut buf = vec![];
            let mut widest = 0;
            for chunk in compressed.chunks(255) {
                dec.decompress(chunk, &mut buf)?;
                widest = widest.max(u8::from(dec.code_bits));
            }
            assert_eq!(widest, 12);
            assert!(dec.is_done());
            assert_eq!(buf.len(), data.len());
            assert!(buf == data);
        }
        Ok(())
    }
}

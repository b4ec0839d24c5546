// error.rs
//
// Copyright (c) 2026  Douglas Lau
//
use std::fmt;
use std::io;
use std::num::TryFromIntError;

/// Errors encountered while converting a GIF to BMP
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error (including short writes).
    Io(io::Error),
    /// Integer out of bounds (BMP size field overflow).
    TryFromInt(TryFromIntError),
    /// Input ended inside a field; holds the offset of that field.
    UnexpectedEndOfFile(u64),
    /// Signature is not `GIF`.
    MalformedHeader([u8; 3]),
    /// GIF version not supported (89a only).
    UnsupportedVersion([u8; 3]),
    /// A sentinel, label or terminator byte did not match.
    UnexpectedByte {
        /// Offset of the byte in the input
        offset: u64,
        /// Byte required by the format
        expected: u8,
        /// Byte actually found
        found: u8,
    },
    /// [GraphicControl](block/struct.GraphicControl.html) block size is not 4.
    MalformedGraphicControlExtension(u8),
    /// A second graphic control extension precedes the image; holds its
    /// offset.
    InvalidBlockSequence(u64),
    /// LZW minimum code size outside of 2..=12.
    InvalidCodeSize(u8),
    /// LZW code which is neither in the code table nor the next free slot.
    InvalidLzwCode {
        /// Code read from the stream
        code: u16,
        /// Next free slot in the code table
        next: u16,
    },
    /// Literal code which does not fit in an 8-bit color index.
    InvalidColorIndex(u16),
    /// No local or global color table for the image.
    MissingColorTable,
    /// Image larger than specified by
    /// [max_image_sz](struct.Decoder.html#method.max_image_sz).
    TooLargeImage,
}

/// Conversion result type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::TryFromInt(err) => err.fmt(fmt),
            Error::UnexpectedByte {
                offset,
                expected,
                found,
            } => write!(
                fmt,
                "UnexpectedByte at {}: expected {:#04X}, found {:#04X}",
                offset, expected, found
            ),
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::TryFromInt(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<TryFromIntError> for Error {
    fn from(err: TryFromIntError) -> Self {
        Error::TryFromInt(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        let e = Error::UnexpectedByte {
            offset: 13,
            expected: 0x2C,
            found: 0x3B,
        };
        assert_eq!(e.to_string(), "UnexpectedByte at 13: expected 0x2C, found 0x3B");
        let e = Error::InvalidCodeSize(13);
        assert_eq!(e.to_string(), "InvalidCodeSize(13)");
        let e = Error::MalformedHeader(*b"GIX");
        assert_eq!(e.to_string(), "MalformedHeader([71, 73, 88])");
    }

    #[test]
    fn source() {
        use std::error::Error as _;
        let e = Error::from(io::Error::new(io::ErrorKind::WriteZero, "full"));
        assert!(e.source().is_some());
        assert!(Error::MissingColorTable.source().is_none());
    }
}

// bmp.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Uncompressed 8-bit indexed BMP encoding
use crate::block::ColorTable;
use crate::error::{Error, Result};
use pix::gray::Gray8;
use pix::Raster;
use std::io::{self, BufWriter, Write};

/// Size of BMP file header
const FILE_HEADER_SZ: u32 = 14;

/// Size of BITMAPINFOHEADER
const INFO_HEADER_SZ: u32 = 40;

/// Bytes per color table entry (B, G, R, 0)
const COLOR_SZ: u32 = 4;

/// Bits per pixel of indexed output
const BITS_PER_PIXEL: u16 = 8;

/// BMP file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Total file size
    file_sz: u32,
    /// Offset of pixel array
    pixel_offset: u32,
}

/// DIB header (BITMAPINFOHEADER)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    width: i32,
    /// Negative height: rows are stored top-down
    height: i32,
    /// Number of color table entries
    colors_used: u32,
}

/// Byte layout of an indexed BMP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    width: u32,
    height: u32,
    colors: u32,
}

impl Layout {
    /// Create a layout for an image and color table
    pub fn new(width: u32, height: u32, colors: usize) -> Result<Self> {
        let colors = u32::try_from(colors)?;
        Ok(Layout {
            width,
            height,
            colors,
        })
    }

    /// Get the row length, padded to a multiple of 4 bytes
    pub fn row_stride(&self) -> usize {
        (self.width as usize + 3) & !3
    }

    /// Get the number of padding bytes at the end of each row
    fn row_padding(&self) -> usize {
        self.row_stride() - self.width as usize
    }

    /// Get the offset of the pixel array
    pub fn pixel_offset(&self) -> Result<u32> {
        let table_sz = self
            .colors
            .checked_mul(COLOR_SZ)
            .ok_or(Error::TooLargeImage)?;
        Ok(FILE_HEADER_SZ + INFO_HEADER_SZ + table_sz)
    }

    /// Get the size of the pixel array
    pub fn pixel_array_sz(&self) -> Result<u32> {
        let sz = u32::try_from(self.row_stride())?;
        sz.checked_mul(self.height)
            .ok_or(Error::TooLargeImage)
    }

    /// Get the total file size
    pub fn file_sz(&self) -> Result<u32> {
        self.pixel_offset()?
            .checked_add(self.pixel_array_sz()?)
            .ok_or(Error::TooLargeImage)
    }

    /// Make the file header
    fn file_header(&self) -> Result<FileHeader> {
        Ok(FileHeader {
            file_sz: self.file_sz()?,
            pixel_offset: self.pixel_offset()?,
        })
    }

    /// Make the info header
    fn info_header(&self) -> Result<InfoHeader> {
        let width = i32::try_from(self.width)?;
        let height = -i32::try_from(self.height)?;
        Ok(InfoHeader {
            width,
            height,
            colors_used: self.colors,
        })
    }
}

impl FileHeader {
    fn format<W: Write>(&self, w: &mut BufWriter<W>) -> io::Result<()> {
        let mut buf = Vec::with_capacity(FILE_HEADER_SZ as usize);
        buf.extend_from_slice(b"BM");
        buf.extend_from_slice(&self.file_sz.to_le_bytes());
        buf.extend_from_slice(&[0; 4]); // reserved
        buf.extend_from_slice(&self.pixel_offset.to_le_bytes());
        w.write_all(&buf)
    }
}

impl InfoHeader {
    fn format<W: Write>(&self, w: &mut BufWriter<W>) -> io::Result<()> {
        let mut buf = Vec::with_capacity(INFO_HEADER_SZ as usize);
        buf.extend_from_slice(&INFO_HEADER_SZ.to_le_bytes());
        buf.extend_from_slice(&self.width.to_le_bytes());
        buf.extend_from_slice(&self.height.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // planes
        buf.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes()); // no compression
        buf.extend_from_slice(&0u32.to_le_bytes()); // raw size (unspecified)
        buf.extend_from_slice(&0i32.to_le_bytes()); // horizontal resolution
        buf.extend_from_slice(&0i32.to_le_bytes()); // vertical resolution
        buf.extend_from_slice(&self.colors_used.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes()); // important colors
        w.write_all(&buf)
    }
}

impl ColorTable {
    fn format<W: Write>(&self, w: &mut BufWriter<W>) -> io::Result<()> {
        let mut buf = Vec::with_capacity(self.len() * COLOR_SZ as usize);
        for i in 0..self.len() {
            if let Some((red, green, blue)) = self.rgb(i) {
                buf.extend_from_slice(&[blue, green, red, 0]);
            }
        }
        w.write_all(&buf)
    }
}

/// Writer which counts bytes accepted by the inner writer
struct Counter<W: Write> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for Counter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// BMP encoder for indexed rasters
pub struct BmpEncoder<W: Write> {
    writer: BufWriter<Counter<W>>,
}

impl<W: Write> BmpEncoder<W> {
    /// Create a new BMP encoder
    pub fn new(w: W) -> Self {
        BmpEncoder {
            writer: BufWriter::new(Counter { inner: w, count: 0 }),
        }
    }

    /// Encode a raster of color indices with its color table.
    ///
    /// Returns the number of bytes written.
    pub fn encode(&mut self, raster: &Raster<Gray8>, table: &ColorTable) -> Result<u64> {
        self.encode_indices(raster.width(), raster.height(), raster.as_u8_slice(), table)
    }

    /// Encode row-major color indices with their color table.
    ///
    /// Returns the number of bytes written.  Index values are not checked
    /// against the color table length; a zero width or height produces
    /// headers and color table only.
    pub fn encode_indices(
        &mut self,
        width: u32,
        height: u32,
        indices: &[u8],
        table: &ColorTable,
    ) -> Result<u64> {
        let layout = Layout::new(width, height, table.len())?;
        let pixels = usize::try_from(u64::from(width) * u64::from(height))?;
        if indices.len() != pixels {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "index count does not match image size",
            )));
        }
        let file_header = layout.file_header()?;
        let info_header = layout.info_header()?;
        let start = self.writer.get_ref().count;
        let w = &mut self.writer;
        file_header.format(w)?;
        info_header.format(w)?;
        table.format(w)?;
        if pixels > 0 {
            let padding = [0; 3];
            let padding = &padding[..layout.row_padding()];
            for row in indices.chunks_exact(width as usize) {
                w.write_all(row)?;
                w.write_all(padding)?;
            }
        }
        w.flush()?;
        let written = self.writer.get_ref().count - start;
        debug!("BMP: {:?}, {} bytes", layout, written);
        Ok(written)
    }
}

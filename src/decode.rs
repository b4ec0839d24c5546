// decode.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! GIF container reader
use crate::block::*;
use crate::error::{Error, Result};
use crate::lzw::Decompressor;
use std::io::{ErrorKind, Read};

/// Size of the graphic control extension body
const GRAPHIC_CONTROL_SZ: u8 = 4;

/// GIF decoder for the first image of a file.
///
/// Reads the header, logical screen descriptor, color tables, an optional
/// graphic control extension and the first image, decompressing its data.
/// Nothing after the first image is read.
///
/// The decoder does no buffering of its own: each read is exactly one field,
/// so the reader is left just after the image data.  Wrap unbuffered readers
/// (such as a `File`) in a `BufReader`.
///
/// ## Example
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// let mut dec = gif2bmp::Decoder::new(gif);
/// let (preamble, frame) = dec.decode()?;
/// assert_eq!(preamble.screen_width(), 2);
/// assert_eq!(frame.image_data.data(), &[1, 0, 0, 1]);
/// # Ok(())
/// # }
/// ```
pub struct Decoder<R: Read> {
    /// Reader for input data
    reader: R,
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
    /// Number of bytes consumed
    offset: u64,
}

impl<R: Read> Decoder<R> {
    /// Create a new GIF decoder.
    pub fn new(reader: R) -> Self {
        Decoder {
            reader,
            max_image_sz: Some(1 << 25),
            offset: 0,
        }
    }

    /// Set the maximum image size (in pixels) to allow for decoding.
    ///
    /// Applies to both the logical screen and the image.
    pub fn max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.max_image_sz = max_image_sz;
        self
    }

    /// Get the number of bytes consumed from the reader
    pub fn consumed(&self) -> u64 {
        self.offset
    }

    /// Decode the preamble and first frame
    pub fn decode(&mut self) -> Result<(Preamble, Frame)> {
        let preamble = self.preamble()?;
        let frame = self.frame()?;
        Ok((preamble, frame))
    }

    /// Read exactly enough bytes to fill a buffer
    fn read_buf(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.reader.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                Err(Error::UnexpectedEndOfFile(self.offset))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read one byte
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0; 1];
        self.read_buf(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a little-endian u16
    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0; 2];
        self.read_buf(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Read one byte, which must match an expected value
    fn expect_u8(&mut self, expected: u8) -> Result<()> {
        let offset = self.offset;
        let found = self.read_u8()?;
        if found == expected {
            Ok(())
        } else {
            Err(Error::UnexpectedByte {
                offset,
                expected,
                found,
            })
        }
    }

    /// Check an image size against the maximum
    fn check_image_sz(&self, image_sz: usize) -> Result<()> {
        match self.max_image_sz {
            Some(sz) if image_sz > sz => Err(Error::TooLargeImage),
            _ => Ok(()),
        }
    }

    /// Read preamble blocks: header, logical screen and global color table
    fn preamble(&mut self) -> Result<Preamble> {
        let header = self.header()?;
        let logical_screen_desc = self.logical_screen_desc()?;
        self.check_image_sz(logical_screen_desc.screen_sz())?;
        let global_color_table =
            self.color_table(logical_screen_desc.color_table_config())?;
        Ok(Preamble {
            header,
            logical_screen_desc,
            global_color_table,
        })
    }

    /// Read a Header block
    fn header(&mut self) -> Result<Header> {
        let mut signature = [0; 3];
        self.read_buf(&mut signature)?;
        if &signature != b"GIF" {
            return Err(Error::MalformedHeader(signature));
        }
        let mut version = [0; 3];
        self.read_buf(&mut version)?;
        if &version != b"89a" {
            return Err(Error::UnsupportedVersion(version));
        }
        debug!("  block  : Header {:?}", version);
        Ok(Header::with_version(version))
    }

    /// Read a Logical Screen Descriptor block
    fn logical_screen_desc(&mut self) -> Result<LogicalScreenDesc> {
        let width = self.read_u16()?;
        let height = self.read_u16()?;
        let flags = self.read_u8()?;
        let bg_color = self.read_u8()?;
        let aspect = self.read_u8()?;
        let desc = LogicalScreenDesc::default()
            .with_screen_width(width)
            .with_screen_height(height)
            .with_flags(flags)
            .with_background_color_idx(bg_color)
            .with_pixel_aspect_ratio(aspect);
        debug!("  block  : {:?}", desc);
        Ok(desc)
    }

    /// Read a color table, if present
    fn color_table(&mut self, config: ColorTableConfig) -> Result<Option<ColorTable>> {
        if config.is_empty() {
            return Ok(None);
        }
        let mut buf = vec![0; config.size_bytes()];
        self.read_buf(&mut buf)?;
        debug!("  block  : ColorTable {:?}", config.len());
        Ok(Some(ColorTable::with_rgb(&buf)))
    }

    /// Read frame blocks: extensions, image descriptor and image data
    fn frame(&mut self) -> Result<Frame> {
        let mut graphic_control_ext = None;
        loop {
            let offset = self.offset;
            let t = self.read_u8()?;
            match BlockCode::from_u8(t) {
                Some(BlockCode::ImageDesc_) => break,
                Some(BlockCode::Extension_) => {
                    if let Some(b) = self.extension()? {
                        if graphic_control_ext.is_some() {
                            return Err(Error::InvalidBlockSequence(offset));
                        }
                        graphic_control_ext = Some(b);
                    }
                }
                _ => {
                    return Err(Error::UnexpectedByte {
                        offset,
                        expected: BlockCode::ImageDesc_.signature(),
                        found: t,
                    })
                }
            }
        }
        let image_desc = self.image_desc()?;
        self.check_image_sz(image_desc.image_sz())?;
        let local_color_table = self.color_table(image_desc.color_table_config())?;
        let image_data = self.image_data(image_desc.image_sz())?;
        Ok(Frame {
            graphic_control_ext,
            image_desc,
            local_color_table,
            image_data,
        })
    }

    /// Read an extension block (after the introducer).
    ///
    /// Only a Graphic Control extension is returned; others are skipped.
    fn extension(&mut self) -> Result<Option<GraphicControl>> {
        let label = ExtensionCode::from(self.read_u8()?);
        match label {
            ExtensionCode::GraphicControl_ => Ok(Some(self.graphic_control()?)),
            _ => {
                let n_bytes = self.skip_sub_blocks()?;
                debug!("  block  : {:?} skipped {:?}", label, n_bytes);
                Ok(None)
            }
        }
    }

    /// Read a Graphic Control extension block (after the label)
    fn graphic_control(&mut self) -> Result<GraphicControl> {
        let block_sz = self.read_u8()?;
        if block_sz != GRAPHIC_CONTROL_SZ {
            return Err(Error::MalformedGraphicControlExtension(block_sz));
        }
        let mut b = GraphicControl::default();
        b.set_flags(self.read_u8()?);
        b.set_delay_time_cs(self.read_u16()?);
        b.set_transparent_color_idx(self.read_u8()?);
        self.expect_u8(0)?;
        debug!("  block  : {:?}", b);
        Ok(b)
    }

    /// Skip sub-blocks up to the block terminator
    fn skip_sub_blocks(&mut self) -> Result<usize> {
        let mut buf = [0; 255];
        let mut n_bytes = 0;
        loop {
            let sz = usize::from(self.read_u8()?);
            if sz == 0 {
                return Ok(n_bytes);
            }
            self.read_buf(&mut buf[..sz])?;
            n_bytes += sz;
        }
    }

    /// Read an Image Descriptor block (after the separator)
    fn image_desc(&mut self) -> Result<ImageDesc> {
        let left = self.read_u16()?;
        let top = self.read_u16()?;
        let width = self.read_u16()?;
        let height = self.read_u16()?;
        let flags = self.read_u8()?;
        let desc = ImageDesc::default()
            .with_left(left)
            .with_top(top)
            .with_width(width)
            .with_height(height)
            .with_flags(flags);
        debug!("  block  : {:?}", desc);
        Ok(desc)
    }

    /// Read and decompress image data sub-blocks.
    ///
    /// The index stream is limited to `image_sz`; any sub-blocks after that
    /// are read but not decoded.
    fn image_data(&mut self, image_sz: usize) -> Result<ImageData> {
        let min_code_size = self.read_u8()?;
        let mut dec = Decompressor::new(min_code_size)?;
        let mut data = Vec::with_capacity(image_sz);
        let mut buf = [0; 255];
        let mut full = false;
        loop {
            let sz = usize::from(self.read_u8()?);
            if sz == 0 {
                break;
            }
            self.read_buf(&mut buf[..sz])?;
            if dec.is_done() || full {
                debug!("sub-block: ImageData {:?} skipped", sz);
                continue;
            }
            debug!("sub-block: ImageData {:?}", sz);
            dec.decompress(&buf[..sz], &mut data)?;
            if data.len() > image_sz {
                warn!("Image data exceeds {} pixels; truncated", image_sz);
                data.truncate(image_sz);
                full = true;
            }
        }
        if !dec.is_done() && !full {
            warn!("Image data has no end code");
        }
        Ok(ImageData::new(min_code_size, data))
    }
}

// convert.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! GIF to BMP conversion
use crate::block::{Frame, Preamble};
use crate::bmp::BmpEncoder;
use crate::decode::Decoder;
use crate::error::{Error, Result};
use std::io::{Read, Write};

/// Byte counts of one conversion
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Bytes consumed from the GIF input
    pub gif_sz: u64,
    /// Bytes written to the BMP output
    pub bmp_sz: u64,
}

/// GIF to BMP converter
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
/// let mut bmp = Vec::new();
/// let stats = gif2bmp::Converter::new().convert(gif, &mut bmp)?;
/// assert_eq!(stats.bmp_sz, 70);
/// assert_eq!(bmp.len(), 70);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
}

impl Default for Converter {
    fn default() -> Self {
        Converter {
            max_image_sz: Some(1 << 25),
        }
    }
}

impl Converter {
    /// Create a new converter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum image size (in pixels) to allow for decoding.
    pub fn max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.max_image_sz = max_image_sz;
        self
    }

    /// Convert the first image of a GIF into a BMP
    pub fn convert<R: Read, W: Write>(&self, reader: R, writer: W) -> Result<Stats> {
        let mut dec = Decoder::new(reader).max_image_sz(self.max_image_sz);
        let (preamble, frame) = dec.decode()?;
        let gif_sz = dec.consumed();
        let table = frame
            .color_table(&preamble)
            .ok_or(Error::MissingColorTable)?;
        let canvas = compose(&preamble, &frame);
        let bmp_sz = BmpEncoder::new(writer).encode_indices(
            preamble.screen_width().into(),
            preamble.screen_height().into(),
            &canvas,
            table,
        )?;
        info!("converted: {} GIF bytes, {} BMP bytes", gif_sz, bmp_sz);
        Ok(Stats { gif_sz, bmp_sz })
    }
}

/// Convert the first image of a GIF into a BMP with default settings
pub fn convert<R: Read, W: Write>(reader: R, writer: W) -> Result<Stats> {
    Converter::new().convert(reader, writer)
}

/// Get the order in which rows of an interlaced image are stored
fn interlaced_rows(height: usize) -> impl Iterator<Item = usize> {
    (0..height)
        .step_by(8)
        .chain((4..height).step_by(8))
        .chain((2..height).step_by(4))
        .chain((1..height).step_by(2))
}

/// Compose the frame onto a canvas filled with the background color
fn compose(preamble: &Preamble, frame: &Frame) -> Vec<u8> {
    let desc = &preamble.logical_screen_desc;
    let screen_width = usize::from(desc.screen_width());
    let screen_height = usize::from(desc.screen_height());
    let mut canvas = vec![desc.background_color_idx(); screen_width * screen_height];
    let image = &frame.image_desc;
    let width = usize::from(image.width());
    let height = usize::from(image.height());
    let left = usize::from(image.left());
    let top = usize::from(image.top());
    let data = frame.image_data.data();
    if left + width > screen_width || top + height > screen_height {
        warn!("Image clipped to screen: {:?}", image);
    }
    let cols = width.min(screen_width.saturating_sub(left));
    if width > 0 && cols > 0 {
        let rows: Vec<usize> = if image.interlaced() {
            interlaced_rows(height).collect()
        } else {
            (0..height).collect()
        };
        for (src, y) in data.chunks(width).zip(rows) {
            let y = top + y;
            if y < screen_height {
                let n = cols.min(src.len());
                let start = y * screen_width + left;
                canvas[start..start + n].copy_from_slice(&src[..n]);
            }
        }
    }
    canvas
}

// lib.rs      gif2bmp crate.
//
// Copyright (c) 2026  Douglas Lau
//
//! Convert the first image of a GIF89a file into an uncompressed 8-bit
//! indexed BMP.
//!
//! ## Example
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::fs::File;
//!
//! let gif = File::open("example.gif")?;
//! let bmp = File::create("example.bmp")?;
//! let stats = gif2bmp::convert(gif, bmp)?;
//! println!("{} -> {} bytes", stats.gif_sz, stats.bmp_sz);
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod block;
mod bmp;
mod convert;
mod decode;
mod error;
mod lzw;

pub use crate::bmp::{BmpEncoder, Layout};
pub use crate::convert::{convert, Converter, Stats};
pub use crate::decode::Decoder;
pub use crate::error::{Error, Result};
pub use crate::lzw::Decompressor;

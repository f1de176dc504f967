//! Interleaved Run-Length Encoding (RLE) Bitmap Codec
//!
//! The compressed stream is a flat sequence of variable-length compression
//! orders: a header byte selecting the order kind, an optional run-length
//! extension, and an optional payload. Background-flavored orders reference
//! the previously decoded scanline, so decoding is strictly order-sensitive
//! even though the codec itself keeps no state between tiles.
//!
//! ### References
//!
//! - Microsoft Learn:
//!   - [RLE_BITMAP_STREAM](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-rdpbcgr/b3b60873-16a8-4cbc-8aaa-5f0a93083280)
//!   - [Pseudo-code](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-rdpbcgr/b6a3f5c2-0804-4c10-9d25-a321720fd23e)

mod decoder;
mod depth;
mod encoder;
mod order;

use thiserror::Error;

use self::depth::{Depth, Depth15, Depth16, Depth24, Depth8};

/// Longest tile side the compressor accepts.
pub const TILE_SIZE_MAX: usize = 64;

/// Storage layout of a decompressed bitmap.
///
/// 15- and 16-bpp streams share the same two-byte little-endian storage; the
/// tag tells the downstream converter how to split the channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitmapFormat {
    Indexed8,
    Rgb15,
    Rgb16,
    Bgr24,
}

impl BitmapFormat {
    pub const fn from_bits_per_pixel(bpp: usize) -> Option<Self> {
        match bpp {
            8 => Some(Self::Indexed8),
            15 => Some(Self::Rgb15),
            16 => Some(Self::Rgb16),
            24 => Some(Self::Bgr24),
            _ => None,
        }
    }

    pub const fn bits_per_pixel(self) -> usize {
        match self {
            Self::Indexed8 => 8,
            Self::Rgb15 => 15,
            Self::Rgb16 => 16,
            Self::Bgr24 => 24,
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Indexed8 => 1,
            Self::Rgb15 | Self::Rgb16 => 2,
            Self::Bgr24 => 3,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid bits per pixel: {bpp}")]
    InvalidBitsPerPixel { bpp: usize },
    #[error("bitmap width or height is zero")]
    EmptyBitmap,
    #[error("bitmap dimensions {width}x{height} overflow the address space")]
    BitmapTooLarge { width: usize, height: usize },
    #[error("unrecognized compression order header 0x{header:02X}")]
    UnknownOrder { header: u8 },
    #[error("compressed stream ends early: {needed} bytes needed, {available} available")]
    TruncatedStream { needed: usize, available: usize },
    #[error("compression order writes past the bitmap: {needed} bytes needed, {available} available")]
    BitmapOverflow { needed: usize, available: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("invalid bits per pixel: {bpp}")]
    InvalidBitsPerPixel { bpp: usize },
    #[error("bitmap width or height is zero")]
    EmptyBitmap,
    #[error("tile {width}x{height} exceeds the {TILE_SIZE_MAX}x{TILE_SIZE_MAX} limit")]
    TileTooLarge { width: usize, height: usize },
    #[error("tile width {width} is not a multiple of 4")]
    UnalignedWidth { width: usize },
    #[error("bitmap size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

macro_rules! ensure_src {
    ($src:ident, $count:expr) => {{
        let needed = $count;
        let available = $src.remaining();
        if needed > available {
            return Err(crate::interleaved::DecodeError::TruncatedStream { needed, available });
        }
    }};
}

macro_rules! ensure_dst {
    ($dst:ident, $count:expr) => {{
        let needed = $count;
        let available = $dst.remaining();
        if needed > available {
            return Err(crate::interleaved::DecodeError::BitmapOverflow { needed, available });
        }
    }};
}

pub(crate) use {ensure_dst, ensure_src};

/// Decompress an interleaved RLE bitmap stream.
///
/// `src`: compressed stream
/// `dst`: receives the decompressed bitmap, in wire scanline order
/// `width`, `height`: bitmap dimensions in pixels
/// `bpp`: bits per pixel, one of 8, 15, 16, 24
pub fn decompress(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: impl Into<usize>,
    height: impl Into<usize>,
    bpp: impl Into<usize>,
) -> Result<BitmapFormat, DecodeError> {
    match bpp.into() {
        8 => decompress_8_bpp(src, dst, width, height),
        15 => decompress_15_bpp(src, dst, width, height),
        16 => decompress_16_bpp(src, dst, width, height),
        24 => decompress_24_bpp(src, dst, width, height),
        bpp => Err(DecodeError::InvalidBitsPerPixel { bpp }),
    }
}

/// Decompress an 8-bpp (palettized) interleaved RLE bitmap stream.
pub fn decompress_8_bpp(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: impl Into<usize>,
    height: impl Into<usize>,
) -> Result<BitmapFormat, DecodeError> {
    decompress_helper::<Depth8>(src, dst, width.into(), height.into())
}

/// Decompress a 15-bpp interleaved RLE bitmap stream.
pub fn decompress_15_bpp(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: impl Into<usize>,
    height: impl Into<usize>,
) -> Result<BitmapFormat, DecodeError> {
    decompress_helper::<Depth15>(src, dst, width.into(), height.into())
}

/// Decompress a 16-bpp interleaved RLE bitmap stream.
pub fn decompress_16_bpp(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: impl Into<usize>,
    height: impl Into<usize>,
) -> Result<BitmapFormat, DecodeError> {
    decompress_helper::<Depth16>(src, dst, width.into(), height.into())
}

/// Decompress a 24-bpp interleaved RLE bitmap stream.
pub fn decompress_24_bpp(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: impl Into<usize>,
    height: impl Into<usize>,
) -> Result<BitmapFormat, DecodeError> {
    decompress_helper::<Depth24>(src, dst, width.into(), height.into())
}

fn decompress_helper<D: Depth>(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: usize,
    height: usize,
) -> Result<BitmapFormat, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyBitmap);
    }

    let row_delta = width
        .checked_mul(D::BYTES_PER_PIXEL)
        .ok_or(DecodeError::BitmapTooLarge { width, height })?;
    let size = row_delta
        .checked_mul(height)
        .ok_or(DecodeError::BitmapTooLarge { width, height })?;

    dst.resize(size, 0);
    decoder::decode::<D>(src, dst, row_delta)?;

    Ok(D::FORMAT)
}

/// Compress a bitmap into an interleaved RLE stream.
///
/// `src`: bitmap in wire scanline order, exactly `width * height` pixels
/// `dst`: receives the compressed stream
/// `width`, `height`: tile dimensions in pixels; at most 64x64, and `width`
/// must be a multiple of 4
/// `bpp`: bits per pixel, one of 8, 15, 16, 24
pub fn compress(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: impl Into<usize>,
    height: impl Into<usize>,
    bpp: impl Into<usize>,
) -> Result<(), EncodeError> {
    match bpp.into() {
        8 => compress_8_bpp(src, dst, width, height),
        15 => compress_15_bpp(src, dst, width, height),
        16 => compress_16_bpp(src, dst, width, height),
        24 => compress_24_bpp(src, dst, width, height),
        bpp => Err(EncodeError::InvalidBitsPerPixel { bpp }),
    }
}

/// Compress an 8-bpp (palettized) bitmap into an interleaved RLE stream.
pub fn compress_8_bpp(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: impl Into<usize>,
    height: impl Into<usize>,
) -> Result<(), EncodeError> {
    compress_helper::<Depth8>(src, dst, width.into(), height.into())
}

/// Compress a 15-bpp bitmap into an interleaved RLE stream.
pub fn compress_15_bpp(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: impl Into<usize>,
    height: impl Into<usize>,
) -> Result<(), EncodeError> {
    compress_helper::<Depth15>(src, dst, width.into(), height.into())
}

/// Compress a 16-bpp bitmap into an interleaved RLE stream.
pub fn compress_16_bpp(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: impl Into<usize>,
    height: impl Into<usize>,
) -> Result<(), EncodeError> {
    compress_helper::<Depth16>(src, dst, width.into(), height.into())
}

/// Compress a 24-bpp bitmap into an interleaved RLE stream.
pub fn compress_24_bpp(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: impl Into<usize>,
    height: impl Into<usize>,
) -> Result<(), EncodeError> {
    compress_helper::<Depth24>(src, dst, width.into(), height.into())
}

fn compress_helper<D: Depth>(
    src: &[u8],
    dst: &mut Vec<u8>,
    width: usize,
    height: usize,
) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::EmptyBitmap);
    }

    if width > TILE_SIZE_MAX || height > TILE_SIZE_MAX {
        return Err(EncodeError::TileTooLarge { width, height });
    }

    if width % 4 != 0 {
        return Err(EncodeError::UnalignedWidth { width });
    }

    let row_delta = width * D::BYTES_PER_PIXEL;
    let expected = row_delta * height;
    if src.len() != expected {
        return Err(EncodeError::SizeMismatch {
            expected,
            actual: src.len(),
        });
    }

    encoder::encode::<D>(src, dst, row_delta);

    Ok(())
}

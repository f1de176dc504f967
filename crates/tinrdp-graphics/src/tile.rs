//! Tile-level entry points over the interleaved RLE codec.
//!
//! The codec works on a scratch bitmap kept in wire layout (source pixel
//! format, bottom-up rows). The types here adapt that scratch buffer to a
//! caller-owned 32-bpp framebuffer: format conversion, palette expansion for
//! indexed tiles, and the vertical flip between wire order and framebuffer
//! order.

use core::fmt;
use std::io;

use thiserror::Error;
use tracing::trace;

use crate::color_conversion::{
    rdp_15bit_to_rgb, rdp_16bit_to_rgb, rgb_to_rdp_15bit, rgb_to_rdp_16bit, Palette, Rgb,
};
use crate::image_processing::{PixelFormat, Rgba};
use crate::interleaved::{self, BitmapFormat, DecodeError, EncodeError};

/// Placement of a tile inside a framebuffer, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Mutable view over a caller-owned framebuffer.
///
/// A `step` of zero means tightly packed rows.
pub struct FramebufferMut<'a> {
    pub data: &'a mut [u8],
    pub format: PixelFormat,
    pub step: usize,
    pub width: u16,
    pub height: u16,
}

impl fmt::Debug for FramebufferMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramebufferMut")
            .field("format", &self.format)
            .field("step", &self.step)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Read-only view over a caller-owned framebuffer.
pub struct Framebuffer<'a> {
    pub data: &'a [u8],
    pub format: PixelFormat,
    pub step: usize,
    pub width: u16,
    pub height: u16,
}

impl fmt::Debug for Framebuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framebuffer")
            .field("format", &self.format)
            .field("step", &self.step)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_len", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum TileDecodeError {
    #[error("failed to decompress the tile stream")]
    Rle(#[from] DecodeError),
    #[error("an 8-bpp tile requires a palette")]
    MissingPalette,
    #[error("tile placement {rect:?} does not fit the framebuffer")]
    PlacementOutOfBounds { rect: TileRect },
    #[error("framebuffer is smaller than its declared geometry")]
    FramebufferTooSmall,
    #[error("failed to write converted pixels")]
    PixelWrite(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum TileEncodeError {
    #[error("failed to compress the tile stream")]
    Rle(#[from] EncodeError),
    #[error("invalid bits per pixel: {bpp}")]
    InvalidBitsPerPixel { bpp: usize },
    #[error("an 8-bpp tile requires a palette")]
    MissingPalette,
    #[error("tile placement {rect:?} does not fit the framebuffer")]
    PlacementOutOfBounds { rect: TileRect },
    #[error("framebuffer is smaller than its declared geometry")]
    FramebufferTooSmall,
    #[error("failed to read source pixels")]
    PixelRead(#[source] io::Error),
}

/// Decodes interleaved RLE tiles into a framebuffer.
///
/// The scratch buffer is reused across tiles to avoid reallocations; one
/// decoder must not be shared between threads, distinct decoders are
/// independent.
#[derive(Debug, Default)]
pub struct TileDecoder {
    scratch: Vec<u8>,
}

impl TileDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decompress `src` and place the tile at `rect` in `dst`, converting to
    /// the framebuffer format and flipping the bottom-up wire rows.
    ///
    /// `palette` is required for 8-bpp tiles and ignored otherwise.
    pub fn decode_tile(
        &mut self,
        src: &[u8],
        bpp: usize,
        palette: Option<&Palette>,
        rect: TileRect,
        dst: &mut FramebufferMut<'_>,
    ) -> Result<(), TileDecodeError> {
        if !placement_fits(rect, dst.width, dst.height) {
            return Err(TileDecodeError::PlacementOutOfBounds { rect });
        }

        let format = interleaved::decompress(src, &mut self.scratch, rect.width, rect.height, bpp)?;

        let reader = match format {
            BitmapFormat::Indexed8 => WirePixels::Indexed(palette.ok_or(TileDecodeError::MissingPalette)?),
            BitmapFormat::Rgb15 => WirePixels::HighColor15,
            BitmapFormat::Rgb16 => WirePixels::HighColor16,
            BitmapFormat::Bgr24 => WirePixels::TrueColor24,
        };

        trace!(
            ?format,
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "Decoded interleaved tile"
        );

        let tile_width = usize::from(rect.width);
        let wire_depth = format.bytes_per_pixel();
        let dst_depth = usize::from(dst.format.bytes_per_pixel());
        let step = effective_step(dst.step, dst.width, dst_depth);

        if dst.data.len() < region_end(rect, step, dst_depth) {
            return Err(TileDecodeError::FramebufferTooSmall);
        }

        // Wire rows are bottom-up; flip while converting.
        for (row, line) in self.scratch.chunks_exact(tile_width * wire_depth).rev().enumerate() {
            let row_start = (usize::from(rect.y) + row) * step + usize::from(rect.x) * dst_depth;
            let row_bytes = &mut dst.data[row_start..row_start + tile_width * dst_depth];

            for (pixel, out) in line.chunks_exact(wire_depth).zip(row_bytes.chunks_exact_mut(dst_depth)) {
                let color = reader.read(pixel);
                dst.format
                    .write_color(Rgba::from(color), out)
                    .map_err(TileDecodeError::PixelWrite)?;
            }
        }

        Ok(())
    }
}

/// Encodes framebuffer regions into interleaved RLE tiles.
#[derive(Debug, Default)]
pub struct TileEncoder {
    scratch: Vec<u8>,
}

impl TileEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the tile at `rect` from `src`, convert it to the wire depth
    /// `bpp`, and append the compressed stream to `dst`.
    ///
    /// `palette` is required for 8-bpp tiles and ignored otherwise.
    pub fn encode_tile(
        &mut self,
        src: &Framebuffer<'_>,
        rect: TileRect,
        bpp: usize,
        palette: Option<&Palette>,
        dst: &mut Vec<u8>,
    ) -> Result<(), TileEncodeError> {
        if rect.width == 0 || rect.height == 0 {
            return Err(EncodeError::EmptyBitmap.into());
        }

        if !placement_fits(rect, src.width, src.height) {
            return Err(TileEncodeError::PlacementOutOfBounds { rect });
        }

        let format = BitmapFormat::from_bits_per_pixel(bpp).ok_or(TileEncodeError::InvalidBitsPerPixel { bpp })?;

        let writer = match format {
            BitmapFormat::Indexed8 => WirePixels::Indexed(palette.ok_or(TileEncodeError::MissingPalette)?),
            BitmapFormat::Rgb15 => WirePixels::HighColor15,
            BitmapFormat::Rgb16 => WirePixels::HighColor16,
            BitmapFormat::Bgr24 => WirePixels::TrueColor24,
        };

        let tile_width = usize::from(rect.width);
        let tile_height = usize::from(rect.height);
        let src_depth = usize::from(src.format.bytes_per_pixel());
        let step = effective_step(src.step, src.width, src_depth);

        if src.data.len() < region_end(rect, step, src_depth) {
            return Err(TileEncodeError::FramebufferTooSmall);
        }

        self.scratch.clear();
        self.scratch.reserve(tile_width * tile_height * format.bytes_per_pixel());

        // Wire rows are bottom-up.
        for row in (0..tile_height).rev() {
            let row_start = (usize::from(rect.y) + row) * step + usize::from(rect.x) * src_depth;
            let row_bytes = &src.data[row_start..row_start + tile_width * src_depth];

            for pixel in row_bytes.chunks_exact(src_depth) {
                let color = src.format.read_color(pixel).map_err(TileEncodeError::PixelRead)?;
                writer.write(Rgb::from(color), &mut self.scratch);
            }
        }

        interleaved::compress(&self.scratch, dst, rect.width, rect.height, bpp)?;

        Ok(())
    }
}

/// Wire-layout pixel access for each supported source depth.
enum WirePixels<'a> {
    Indexed(&'a Palette),
    HighColor15,
    HighColor16,
    TrueColor24,
}

impl WirePixels<'_> {
    fn read(&self, pixel: &[u8]) -> Rgb {
        match self {
            Self::Indexed(palette) => palette.get(pixel[0]),
            Self::HighColor15 => {
                let [r, g, b] = rdp_15bit_to_rgb(u16::from_le_bytes([pixel[0], pixel[1]]));
                Rgb { r, g, b }
            }
            Self::HighColor16 => {
                let [r, g, b] = rdp_16bit_to_rgb(u16::from_le_bytes([pixel[0], pixel[1]]));
                Rgb { r, g, b }
            }
            Self::TrueColor24 => Rgb {
                b: pixel[0],
                g: pixel[1],
                r: pixel[2],
            },
        }
    }

    fn write(&self, color: Rgb, out: &mut Vec<u8>) {
        match self {
            Self::Indexed(palette) => out.push(palette.index_of(color)),
            Self::HighColor15 => out.extend_from_slice(&rgb_to_rdp_15bit(color).to_le_bytes()),
            Self::HighColor16 => out.extend_from_slice(&rgb_to_rdp_16bit(color).to_le_bytes()),
            Self::TrueColor24 => out.extend_from_slice(&[color.b, color.g, color.r]),
        }
    }
}

fn placement_fits(rect: TileRect, width: u16, height: u16) -> bool {
    u32::from(rect.x) + u32::from(rect.width) <= u32::from(width)
        && u32::from(rect.y) + u32::from(rect.height) <= u32::from(height)
}

fn effective_step(step: usize, width: u16, depth: usize) -> usize {
    if step == 0 {
        usize::from(width) * depth
    } else {
        step
    }
}

/// One past the last framebuffer byte the tile region touches. Callers
/// validate the placement first, so `rect.height` is at least one.
fn region_end(rect: TileRect, step: usize, depth: usize) -> usize {
    let last_row = usize::from(rect.y) + usize::from(rect.height) - 1;
    last_row * step + (usize::from(rect.x) + usize::from(rect.width)) * depth
}

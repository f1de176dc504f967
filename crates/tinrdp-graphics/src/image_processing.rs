use std::io;

use byteorder::WriteBytesExt;

use crate::color_conversion::Rgb;

const MIN_ALPHA: u8 = 0x00;
const MAX_ALPHA: u8 = 0xff;

/// 32-bpp framebuffer layouts a decoded tile can be written to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelFormat {
    ARgb32,
    XRgb32,
    ABgr32,
    XBgr32,
    BgrA32,
    BgrX32,
    RgbA32,
    RgbX32,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> u8 {
        match self {
            Self::ARgb32
            | Self::XRgb32
            | Self::ABgr32
            | Self::XBgr32
            | Self::BgrA32
            | Self::BgrX32
            | Self::RgbA32
            | Self::RgbX32 => 4,
        }
    }

    pub fn read_color(self, buffer: &[u8]) -> io::Result<Rgba> {
        if buffer.len() < 4 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "input buffer is not large enough (this is a bug)",
            ));
        }

        let color = match self {
            Self::ARgb32 => Rgba {
                a: buffer[0],
                r: buffer[1],
                g: buffer[2],
                b: buffer[3],
            },
            Self::XRgb32 => Rgba {
                a: MAX_ALPHA,
                r: buffer[1],
                g: buffer[2],
                b: buffer[3],
            },
            Self::ABgr32 => Rgba {
                a: buffer[0],
                b: buffer[1],
                g: buffer[2],
                r: buffer[3],
            },
            Self::XBgr32 => Rgba {
                a: MAX_ALPHA,
                b: buffer[1],
                g: buffer[2],
                r: buffer[3],
            },
            Self::BgrA32 => Rgba {
                b: buffer[0],
                g: buffer[1],
                r: buffer[2],
                a: buffer[3],
            },
            Self::BgrX32 => Rgba {
                b: buffer[0],
                g: buffer[1],
                r: buffer[2],
                a: MAX_ALPHA,
            },
            Self::RgbA32 => Rgba {
                r: buffer[0],
                g: buffer[1],
                b: buffer[2],
                a: buffer[3],
            },
            Self::RgbX32 => Rgba {
                r: buffer[0],
                g: buffer[1],
                b: buffer[2],
                a: MAX_ALPHA,
            },
        };

        Ok(color)
    }

    pub fn write_color(self, color: Rgba, mut buffer: &mut [u8]) -> io::Result<()> {
        match self {
            Self::ARgb32 => {
                buffer.write_u8(color.a)?;
                buffer.write_u8(color.r)?;
                buffer.write_u8(color.g)?;
                buffer.write_u8(color.b)?;
            }
            Self::XRgb32 => {
                buffer.write_u8(MIN_ALPHA)?;
                buffer.write_u8(color.r)?;
                buffer.write_u8(color.g)?;
                buffer.write_u8(color.b)?;
            }
            Self::ABgr32 => {
                buffer.write_u8(color.a)?;
                buffer.write_u8(color.b)?;
                buffer.write_u8(color.g)?;
                buffer.write_u8(color.r)?;
            }
            Self::XBgr32 => {
                buffer.write_u8(MIN_ALPHA)?;
                buffer.write_u8(color.b)?;
                buffer.write_u8(color.g)?;
                buffer.write_u8(color.r)?;
            }
            Self::BgrA32 => {
                buffer.write_u8(color.b)?;
                buffer.write_u8(color.g)?;
                buffer.write_u8(color.r)?;
                buffer.write_u8(color.a)?;
            }
            Self::BgrX32 => {
                buffer.write_u8(color.b)?;
                buffer.write_u8(color.g)?;
                buffer.write_u8(color.r)?;
                buffer.write_u8(MIN_ALPHA)?;
            }
            Self::RgbA32 => {
                buffer.write_u8(color.r)?;
                buffer.write_u8(color.g)?;
                buffer.write_u8(color.b)?;
                buffer.write_u8(color.a)?;
            }
            Self::RgbX32 => {
                buffer.write_u8(color.r)?;
                buffer.write_u8(color.g)?;
                buffer.write_u8(color.b)?;
                buffer.write_u8(MIN_ALPHA)?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgb> for Rgba {
    fn from(Rgb { r, g, b }: Rgb) -> Self {
        Self { r, g, b, a: MAX_ALPHA }
    }
}

impl From<Rgba> for Rgb {
    fn from(Rgba { r, g, b, .. }: Rgba) -> Self {
        Self { r, g, b }
    }
}

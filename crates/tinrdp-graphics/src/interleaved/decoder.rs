use bit_field::BitField as _;

use super::depth::{Depth, Sink, Source};
use super::order::Order;
use super::{ensure_dst, ensure_src, DecodeError};

const MASK_SPECIAL_FGBG_1: u8 = 0x03;
const MASK_SPECIAL_FGBG_2: u8 = 0x05;

/// Decode one compressed tile stream into `dst`.
///
/// `dst` holds exactly `row_delta * height` bytes. Decoding stops once the
/// bitmap is full; input left over at that point is ignored, while running
/// out of input earlier is an error.
pub(super) fn decode<D: Depth>(src: &[u8], dst: &mut [u8], row_delta: usize) -> Result<(), DecodeError> {
    let mut src = Source::new(src);
    let mut dst = Sink::new(dst);

    let mut fg = D::WHITE;
    // Set after foreground-run orders only. A first-scanline background run
    // emits the foreground color instead of black while this is set.
    let mut inherit_fg = false;

    while !dst.is_full() {
        ensure_src!(src, 1);
        let header = src.read_u8();
        let order = Order::classify(header).ok_or(DecodeError::UnknownOrder { header })?;
        let run = order.run_length(header, &mut src)?;

        match order {
            Order::RegularBgRun | Order::MegaMegaBgRun => {
                bg_run::<D>(&mut dst, row_delta, run, fg, inherit_fg)?;
            }

            Order::RegularFgRun | Order::MegaMegaFgRun => {
                fg_run::<D>(&mut dst, row_delta, run, fg)?;
            }

            Order::LiteSetFgFgRun | Order::MegaMegaSetFgRun => {
                ensure_src!(src, D::BYTES_PER_PIXEL);
                fg = D::take_pixel(&mut src);
                fg_run::<D>(&mut dst, row_delta, run, fg)?;
            }

            Order::LiteDitheredRun | Order::MegaMegaDitheredRun => {
                dithered_run::<D>(&mut src, &mut dst, run)?;
            }

            Order::RegularColorRun | Order::MegaMegaColorRun => {
                color_run::<D>(&mut src, &mut dst, run)?;
            }

            Order::RegularColorImage | Order::MegaMegaColorImage => {
                color_image::<D>(&mut src, &mut dst, run)?;
            }

            Order::RegularFgbgImage | Order::MegaMegaFgbgImage => {
                fgbg_image::<D>(&mut src, &mut dst, row_delta, run, fg)?;
            }

            Order::LiteSetFgFgbgImage | Order::MegaMegaSetFgbgImage => {
                ensure_src!(src, D::BYTES_PER_PIXEL);
                fg = D::take_pixel(&mut src);
                fgbg_image::<D>(&mut src, &mut dst, row_delta, run, fg)?;
            }

            Order::SpecialFgbg1 => {
                ensure_dst!(dst, run * D::BYTES_PER_PIXEL);
                fgbg_bits::<D>(&mut dst, row_delta, MASK_SPECIAL_FGBG_1, fg, run);
            }

            Order::SpecialFgbg2 => {
                ensure_dst!(dst, run * D::BYTES_PER_PIXEL);
                fgbg_bits::<D>(&mut dst, row_delta, MASK_SPECIAL_FGBG_2, fg, run);
            }

            Order::SpecialWhite => {
                ensure_dst!(dst, D::BYTES_PER_PIXEL);
                D::put_pixel(&mut dst, D::WHITE);
            }

            Order::SpecialBlack => {
                ensure_dst!(dst, D::BYTES_PER_PIXEL);
                D::put_pixel(&mut dst, D::BLACK);
            }
        }

        inherit_fg = matches!(
            order,
            Order::RegularFgRun | Order::MegaMegaFgRun | Order::LiteSetFgFgRun | Order::MegaMegaSetFgRun
        );
    }

    Ok(())
}

/// Background run: first-scanline pixels are black (or the foreground color
/// right after a foreground run), later pixels copy the previous scanline.
///
/// Runs flow freely across scanline boundaries; whether a pixel counts as
/// first-scanline is decided per pixel, not per order.
fn bg_run<D: Depth>(
    dst: &mut Sink<'_>,
    row_delta: usize,
    run: usize,
    fg: D::Pixel,
    inherit_fg: bool,
) -> Result<(), DecodeError> {
    ensure_dst!(dst, run * D::BYTES_PER_PIXEL);

    for _ in 0..run {
        let pixel = if dst.pos() < row_delta {
            if inherit_fg {
                fg
            } else {
                D::BLACK
            }
        } else {
            dst.pixel_above::<D>(row_delta)
        };
        D::put_pixel(dst, pixel);
    }

    Ok(())
}

/// Foreground run: the foreground color on the first scanline, the previous
/// scanline XOR the foreground color afterwards.
fn fg_run<D: Depth>(dst: &mut Sink<'_>, row_delta: usize, run: usize, fg: D::Pixel) -> Result<(), DecodeError> {
    ensure_dst!(dst, run * D::BYTES_PER_PIXEL);

    for _ in 0..run {
        let pixel = if dst.pos() < row_delta {
            fg
        } else {
            dst.pixel_above::<D>(row_delta) ^ fg
        };
        D::put_pixel(dst, pixel);
    }

    Ok(())
}

/// Dithered run: `run` repetitions of a two-pixel pattern.
fn dithered_run<D: Depth>(src: &mut Source<'_>, dst: &mut Sink<'_>, run: usize) -> Result<(), DecodeError> {
    ensure_src!(src, 2 * D::BYTES_PER_PIXEL);
    let first = D::take_pixel(src);
    let second = D::take_pixel(src);

    ensure_dst!(dst, 2 * run * D::BYTES_PER_PIXEL);
    for _ in 0..run {
        D::put_pixel(dst, first);
        D::put_pixel(dst, second);
    }

    Ok(())
}

/// Color run: `run` copies of one payload pixel. Does not touch the
/// foreground color.
fn color_run<D: Depth>(src: &mut Source<'_>, dst: &mut Sink<'_>, run: usize) -> Result<(), DecodeError> {
    ensure_src!(src, D::BYTES_PER_PIXEL);
    let pixel = D::take_pixel(src);

    ensure_dst!(dst, run * D::BYTES_PER_PIXEL);
    for _ in 0..run {
        D::put_pixel(dst, pixel);
    }

    Ok(())
}

/// Color image: `run` payload pixels copied verbatim.
fn color_image<D: Depth>(src: &mut Source<'_>, dst: &mut Sink<'_>, run: usize) -> Result<(), DecodeError> {
    let byte_count = run * D::BYTES_PER_PIXEL;

    ensure_src!(src, byte_count);
    ensure_dst!(dst, byte_count);
    dst.put_slice(src.take(byte_count));

    Ok(())
}

/// Foreground/background image: one bitmap byte per group of eight pixels.
/// A final partial group still consumes a whole bitmap byte.
fn fgbg_image<D: Depth>(
    src: &mut Source<'_>,
    dst: &mut Sink<'_>,
    row_delta: usize,
    run: usize,
    fg: D::Pixel,
) -> Result<(), DecodeError> {
    ensure_dst!(dst, run * D::BYTES_PER_PIXEL);

    let mut remaining = run;
    while remaining > 0 {
        let bits = remaining.min(8);

        ensure_src!(src, 1);
        let mask = src.read_u8();

        fgbg_bits::<D>(dst, row_delta, mask, fg, bits);
        remaining -= bits;
    }

    Ok(())
}

/// Write up to eight pixels selected by `mask`, LSB first: a set bit takes
/// the foreground behavior, a clear bit the background behavior.
fn fgbg_bits<D: Depth>(dst: &mut Sink<'_>, row_delta: usize, mask: u8, fg: D::Pixel, bits: usize) {
    for bit in 0..bits {
        let pixel = if dst.pos() < row_delta {
            if mask.get_bit(bit) {
                fg
            } else {
                D::BLACK
            }
        } else {
            let above = dst.pixel_above::<D>(row_delta);
            if mask.get_bit(bit) {
                above ^ fg
            } else {
                above
            }
        };
        D::put_pixel(dst, pixel);
    }
}

use super::depth::{Depth, Source};

// Header bytes of the orders the encoder emits.
const REGULAR_BG_RUN: u8 = 0x00;
const REGULAR_COLOR_RUN: u8 = 0x60;
const REGULAR_COLOR_IMAGE: u8 = 0x80;
const MEGA_MEGA_BG_RUN: u8 = 0xF0;
const MEGA_MEGA_COLOR_RUN: u8 = 0xF3;
const MEGA_MEGA_COLOR_IMAGE: u8 = 0xF4;

const INLINE_LENGTH_MAX: usize = 31;
const EXTENDED_LENGTH_MAX: usize = 255 + 32;
const MEGA_MEGA_LENGTH_MAX: usize = 0xFFFF;

/// Shortest stretch worth a dedicated run order.
const RUN_MIN: usize = 3;

/// Compress a bitmap, given in wire scanline order, into a stream of
/// background-run, color-run and color-image orders.
///
/// Background runs never rely on the foreground-inherit rule: the encoder
/// emits no foreground orders, so a first-scanline background run always
/// stands for black pixels.
pub(super) fn encode<D: Depth>(src: &[u8], dst: &mut Vec<u8>, row_delta: usize) {
    let width = row_delta / D::BYTES_PER_PIXEL;
    let total = src.len() / D::BYTES_PER_PIXEL;

    let mut pos = 0;
    while pos < total {
        let bg = bg_run_len::<D>(src, width, total, pos);
        let same = color_run_len::<D>(src, total, pos);

        if bg >= RUN_MIN && bg >= same {
            put_run_header(dst, REGULAR_BG_RUN, MEGA_MEGA_BG_RUN, bg);
            pos += bg;
        } else if same >= RUN_MIN {
            put_run_header(dst, REGULAR_COLOR_RUN, MEGA_MEGA_COLOR_RUN, same);
            dst.extend_from_slice(pixel_bytes::<D>(src, pos));
            pos += same;
        } else {
            // Literal stretch up to the next run candidate.
            let start = pos;
            pos += 1;
            while pos < total
                && pos - start < MEGA_MEGA_LENGTH_MAX
                && bg_run_len::<D>(src, width, total, pos) < RUN_MIN
                && color_run_len::<D>(src, total, pos) < RUN_MIN
            {
                pos += 1;
            }

            put_run_header(dst, REGULAR_COLOR_IMAGE, MEGA_MEGA_COLOR_IMAGE, pos - start);
            dst.extend_from_slice(&src[start * D::BYTES_PER_PIXEL..pos * D::BYTES_PER_PIXEL]);
        }
    }
}

/// Length of the background run starting at pixel `start`: black on the
/// first scanline, equal to the pixel one scanline above afterwards.
fn bg_run_len<D: Depth>(src: &[u8], width: usize, total: usize, start: usize) -> usize {
    let mut len = 0;

    while start + len < total && len < MEGA_MEGA_LENGTH_MAX {
        let index = start + len;
        let matches = if index < width {
            pixel_at::<D>(src, index) == D::BLACK
        } else {
            pixel_at::<D>(src, index) == pixel_at::<D>(src, index - width)
        };

        if !matches {
            break;
        }
        len += 1;
    }

    len
}

/// Length of the solid-color run starting at pixel `start`.
fn color_run_len<D: Depth>(src: &[u8], total: usize, start: usize) -> usize {
    let value = pixel_at::<D>(src, start);
    let mut len = 1;

    while start + len < total && len < MEGA_MEGA_LENGTH_MAX && pixel_at::<D>(src, start + len) == value {
        len += 1;
    }

    len
}

fn pixel_at<D: Depth>(src: &[u8], index: usize) -> D::Pixel {
    let mut source = Source::new(pixel_bytes::<D>(src, index));
    D::take_pixel(&mut source)
}

fn pixel_bytes<D: Depth>(src: &[u8], index: usize) -> &[u8] {
    &src[index * D::BYTES_PER_PIXEL..(index + 1) * D::BYTES_PER_PIXEL]
}

/// Emit the header (and any length extension) of a run-length order,
/// choosing between the in-header, one-byte-extension and mega-mega forms.
fn put_run_header(dst: &mut Vec<u8>, regular_header: u8, mega_mega_header: u8, length: usize) {
    if length <= INLINE_LENGTH_MAX {
        dst.push(regular_header | length as u8);
    } else if length <= EXTENDED_LENGTH_MAX {
        dst.push(regular_header);
        dst.push((length - 32) as u8);
    } else {
        dst.push(mega_mega_header);
        dst.extend_from_slice(&(length as u16).to_le_bytes());
    }
}

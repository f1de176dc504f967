//! Oracles.
//!
//! Oracles take a test case and determine whether we have a bug. The
//! simplest one feeds arbitrary bytes to the decompressor at every depth and
//! (implicitly) checks that no assertion fails and no out-of-bounds access
//! happens. The round-trip oracle compresses a bitmap built from the input
//! and checks that decompression restores it exactly.
//!
//! When an oracle finds a bug, it reports it to the fuzzing engine by
//! panicking.

use crate::generators::BitmapInput;

pub fn interleaved_decompress(input: BitmapInput<'_>) {
    let mut out = Vec::new();

    let _ = tinrdp_graphics::interleaved::decompress_24_bpp(input.src, &mut out, input.width, input.height);
    let _ = tinrdp_graphics::interleaved::decompress_16_bpp(input.src, &mut out, input.width, input.height);
    let _ = tinrdp_graphics::interleaved::decompress_15_bpp(input.src, &mut out, input.width, input.height);
    let _ = tinrdp_graphics::interleaved::decompress_8_bpp(input.src, &mut out, input.width, input.height);
}

pub fn interleaved_round_trip(input: BitmapInput<'_>) {
    // Clamp the declared dimensions to a valid tile shape.
    let width = usize::from(input.width % 16 + 1) * 4;
    let height = usize::from(input.height % 64) + 1;

    for bpp in [8usize, 15, 16, 24] {
        let bytes_per_pixel = match bpp {
            24 => 3,
            15 | 16 => 2,
            _ => 1,
        };
        let size = width * height * bytes_per_pixel;

        let Some(bitmap) = input.src.get(..size) else {
            continue;
        };

        let mut compressed = Vec::new();
        tinrdp_graphics::interleaved::compress(bitmap, &mut compressed, width, height, bpp)
            .expect("compress a valid tile");

        let mut restored = Vec::new();
        tinrdp_graphics::interleaved::decompress(&compressed, &mut restored, width, height, bpp)
            .expect("decompress a compressed tile");

        assert_eq!(bitmap, restored);
    }
}

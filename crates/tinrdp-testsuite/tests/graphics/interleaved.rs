use proptest::prelude::*;
use rstest::rstest;
use tinrdp_graphics::interleaved::{
    compress, compress_8_bpp, decompress, decompress_15_bpp, decompress_16_bpp, decompress_24_bpp, decompress_8_bpp,
    BitmapFormat, DecodeError, EncodeError,
};

fn decode_8(src: &[u8], width: usize, height: usize) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    decompress_8_bpp(src, &mut out, width, height).map(|_| out)
}

fn decode_16(src: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut out = Vec::new();
    decompress_16_bpp(src, &mut out, width, height).expect("decompress 16 bpp");
    out
}

#[rstest]
#[case::special_white(&[0xFD], 1, 1, &[0xFF])]
#[case::special_black(&[0xFE], 1, 1, &[0x00])]
#[case::color_run(&[0x63, 0xAA], 3, 1, &[0xAA, 0xAA, 0xAA])]
#[case::fg_run_default_foreground(&[0x23], 3, 1, &[0xFF, 0xFF, 0xFF])]
#[case::set_fg_fg_run(&[0xC3, 0x77], 3, 1, &[0x77, 0x77, 0x77])]
#[case::special_fgbg_1(&[0xF9], 8, 1, &[0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])]
#[case::special_fgbg_2(&[0xFA], 8, 1, &[0xFF, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00])]
#[case::bg_run_extended(&[0x00, 0x05], 37, 1, &[0x00; 37])]
#[case::lite_run_extended(&[0xC0, 0x04, 0x77], 20, 1, &[0x77; 20])]
#[case::fgbg_two_mask_bytes(&[0x42, 0xFF, 0x0F], 16, 1, &[
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00,
])]
#[case::fgbg_single_pixel_uses_bit_zero_only(&[0x40, 0x00, 0x01], 1, 1, &[0xFF])]
#[case::fgbg_single_pixel_ignores_high_bits(&[0x40, 0x00, 0xFE], 1, 1, &[0x00])]
#[case::dithered_run(&[0xE2, 0xAA, 0xBB], 4, 1, &[0xAA, 0xBB, 0xAA, 0xBB])]
#[case::fg_color_persists_across_orders(&[0xC2, 0x55, 0x22], 4, 1, &[0x55, 0x55, 0x55, 0x55])]
#[case::color_run_leaves_fg_untouched(&[0x62, 0xAA, 0x22], 4, 1, &[0xAA, 0xAA, 0xFF, 0xFF])]
#[case::first_line_bg_run_after_fg_run_inherits(&[0x22, 0x02], 4, 1, &[0xFF, 0xFF, 0xFF, 0xFF])]
#[case::first_line_bg_run_after_color_run_is_black(&[0x62, 0xAA, 0x02], 4, 1, &[0xAA, 0xAA, 0x00, 0x00])]
#[case::white_run_is_idempotent(&[0xFD, 0xFD, 0xFD, 0xFD, 0xFD], 5, 1, &[0xFF; 5])]
fn decode_8_bpp_cases(#[case] src: &[u8], #[case] width: usize, #[case] height: usize, #[case] expected: &[u8]) {
    assert_eq!(decode_8(src, width, height).expect("decompress 8 bpp"), expected);
}

#[test]
fn mega_mega_run_length_is_little_endian() {
    assert_eq!(decode_8(&[0xF3, 0x00, 0x01, 0xAB], 16, 16).expect("decompress"), vec![0xAB; 256]);
}

#[test]
fn fgbg_image_on_second_scanline_xors_the_line_above() {
    let src = [0x88, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xF9];
    let expected = [
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, //
        0xFE, 0xFD, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
    ];
    assert_eq!(decode_8(&src, 8, 2).expect("decompress"), expected);
}

#[test]
fn bg_run_on_later_scanlines_copies_the_line_above() {
    let src = [0x84, 0x01, 0x02, 0x03, 0x04, 0x04];
    assert_eq!(
        decode_8(&src, 4, 2).expect("decompress"),
        [0x01, 0x02, 0x03, 0x04, 0x01, 0x02, 0x03, 0x04]
    );
}

#[test]
fn run_straddling_the_first_scanline_switches_rules_per_pixel() {
    // A foreground run of two, then a background run of six: the two
    // first-scanline pixels inherit the foreground color, the rest copy the
    // line above.
    assert_eq!(decode_8(&[0x22, 0x06], 4, 2).expect("decompress"), [0xFF; 8]);
}

#[test]
fn zero_length_mega_mega_run_is_accepted() {
    assert_eq!(decode_8(&[0xF0, 0x00, 0x00, 0xFD], 1, 1).expect("decompress"), [0xFF]);
}

#[test]
fn trailing_bytes_after_a_full_bitmap_are_ignored() {
    assert_eq!(decode_8(&[0xFD, 0xDE, 0xAD, 0xBE], 1, 1).expect("decompress"), [0xFF]);
}

#[rstest]
#[case::empty_input(&[], 1, 1)]
#[case::missing_length_extension(&[0x00], 1, 1)]
#[case::missing_mega_mega_extension_byte(&[0xF0, 0x01], 1, 1)]
#[case::missing_color_run_payload(&[0x63], 3, 1)]
#[case::input_ends_before_bitmap_is_full(&[0xFD], 2, 1)]
fn decode_truncated_stream_cases(#[case] src: &[u8], #[case] width: usize, #[case] height: usize) {
    assert!(matches!(
        decode_8(src, width, height),
        Err(DecodeError::TruncatedStream { .. })
    ));
}

#[test]
fn decode_rejects_unknown_orders() {
    assert_eq!(decode_8(&[0xF5], 1, 1), Err(DecodeError::UnknownOrder { header: 0xF5 }));
    assert_eq!(decode_8(&[0xB0], 1, 1), Err(DecodeError::UnknownOrder { header: 0xB0 }));
}

#[test]
fn decode_rejects_overlong_runs() {
    assert_eq!(
        decode_8(&[0x64, 0xAA], 3, 1),
        Err(DecodeError::BitmapOverflow {
            needed: 4,
            available: 3
        })
    );
}

#[test]
fn decode_validates_parameters() {
    let mut out = Vec::new();
    assert_eq!(
        decompress(&[0xFD], &mut out, 1usize, 1usize, 32usize),
        Err(DecodeError::InvalidBitsPerPixel { bpp: 32 })
    );
    assert_eq!(
        decompress_8_bpp(&[0xFD], &mut out, 0usize, 1usize),
        Err(DecodeError::EmptyBitmap)
    );
    assert_eq!(
        decompress_8_bpp(&[0xFD], &mut out, usize::MAX, 2usize),
        Err(DecodeError::BitmapTooLarge {
            width: usize::MAX,
            height: 2
        })
    );
}

#[test]
fn decode_16_bpp_pixels_are_little_endian() {
    assert_eq!(decode_16(&[0xFD], 1, 1), [0xFF, 0xFF]);
    assert_eq!(decode_16(&[0x63, 0x34, 0x12], 3, 1), [0x34, 0x12, 0x34, 0x12, 0x34, 0x12]);
    assert_eq!(
        decode_16(&[0xF6, 0x03, 0x00, 0x7C, 0x00], 3, 1),
        [0x7C, 0x00, 0x7C, 0x00, 0x7C, 0x00]
    );
}

#[test]
fn bpp_15_and_16_share_their_storage_layout() {
    let src = [0x21, 0xFE];

    let mut fifteen = Vec::new();
    let format = decompress_15_bpp(&src, &mut fifteen, 2usize, 1usize).expect("decompress 15 bpp");
    assert_eq!(format, BitmapFormat::Rgb15);

    let mut sixteen = Vec::new();
    let format = decompress_16_bpp(&src, &mut sixteen, 2usize, 1usize).expect("decompress 16 bpp");
    assert_eq!(format, BitmapFormat::Rgb16);

    assert_eq!(fifteen, sixteen);
    // The default foreground is all-ones in the two-byte storage at both
    // depths.
    assert_eq!(fifteen, [0xFF, 0xFF, 0x00, 0x00]);
}

#[test]
fn decode_24_bpp_pixels_are_three_bytes() {
    let mut out = Vec::new();
    decompress_24_bpp(&[0xFD], &mut out, 1usize, 1usize).expect("decompress 24 bpp");
    assert_eq!(out, [0xFF, 0xFF, 0xFF]);

    decompress_24_bpp(&[0x82, 0x01, 0x02, 0x03, 0x0A, 0x0B, 0x0C], &mut out, 2usize, 1usize)
        .expect("decompress 24 bpp");
    assert_eq!(out, [0x01, 0x02, 0x03, 0x0A, 0x0B, 0x0C]);
}

#[test]
fn compress_validates_parameters() {
    let mut dst = Vec::new();
    assert_eq!(
        compress_8_bpp(&[], &mut dst, 0usize, 1usize),
        Err(EncodeError::EmptyBitmap)
    );
    assert_eq!(
        compress_8_bpp(&[0; 68], &mut dst, 68usize, 1usize),
        Err(EncodeError::TileTooLarge { width: 68, height: 1 })
    );
    assert_eq!(
        compress_8_bpp(&[0; 6], &mut dst, 3usize, 2usize),
        Err(EncodeError::UnalignedWidth { width: 3 })
    );
    assert_eq!(
        compress_8_bpp(&[0; 10], &mut dst, 4usize, 2usize),
        Err(EncodeError::SizeMismatch {
            expected: 8,
            actual: 10
        })
    );
}

fn round_trip(bitmap: &[u8], width: usize, height: usize, bpp: usize) -> Vec<u8> {
    let mut compressed = Vec::new();
    compress(bitmap, &mut compressed, width, height, bpp).expect("compress");

    let mut restored = Vec::new();
    decompress(&compressed, &mut restored, width, height, bpp).expect("decompress");

    restored
}

fn tile_dims() -> impl Strategy<Value = (usize, usize)> {
    (1usize..=16, 1usize..=64).prop_map(|(quads, height)| (quads * 4, height))
}

fn tile(bytes_per_pixel: usize) -> impl Strategy<Value = (usize, usize, Vec<u8>)> {
    tile_dims().prop_flat_map(move |(width, height)| {
        prop::collection::vec(any::<u8>(), width * height * bytes_per_pixel)
            .prop_map(move |bitmap| (width, height, bitmap))
    })
}

/// Tiles drawn from a tiny alphabet, so that solid runs and repeated rows
/// actually occur.
fn run_structured_tile(bytes_per_pixel: usize) -> impl Strategy<Value = (usize, usize, Vec<u8>)> {
    tile_dims().prop_flat_map(move |(width, height)| {
        prop::collection::vec(0u8..4, width * height * bytes_per_pixel)
            .prop_map(move |bitmap| (width, height, bitmap))
    })
}

proptest! {
    #[test]
    fn round_trip_8_bpp((width, height, bitmap) in tile(1)) {
        prop_assert_eq!(round_trip(&bitmap, width, height, 8), bitmap);
    }

    #[test]
    fn round_trip_15_bpp((width, height, bitmap) in tile(2)) {
        prop_assert_eq!(round_trip(&bitmap, width, height, 15), bitmap);
    }

    #[test]
    fn round_trip_16_bpp((width, height, bitmap) in tile(2)) {
        prop_assert_eq!(round_trip(&bitmap, width, height, 16), bitmap);
    }

    #[test]
    fn round_trip_24_bpp((width, height, bitmap) in tile(3)) {
        prop_assert_eq!(round_trip(&bitmap, width, height, 24), bitmap);
    }

    #[test]
    fn round_trip_run_structured_8_bpp((width, height, bitmap) in run_structured_tile(1)) {
        prop_assert_eq!(round_trip(&bitmap, width, height, 8), bitmap);
    }

    #[test]
    fn round_trip_run_structured_15_bpp((width, height, bitmap) in run_structured_tile(2)) {
        prop_assert_eq!(round_trip(&bitmap, width, height, 15), bitmap);
    }

    #[test]
    fn round_trip_run_structured_16_bpp((width, height, bitmap) in run_structured_tile(2)) {
        prop_assert_eq!(round_trip(&bitmap, width, height, 16), bitmap);
    }

    #[test]
    fn round_trip_run_structured_24_bpp((width, height, bitmap) in run_structured_tile(3)) {
        prop_assert_eq!(round_trip(&bitmap, width, height, 24), bitmap);
    }

    #[test]
    fn arbitrary_streams_never_write_out_of_bounds(
        src in prop::collection::vec(any::<u8>(), 0..256),
        width in 0usize..80,
        height in 0usize..80,
        bpp in prop::sample::select(vec![8usize, 15, 16, 24, 32]),
    ) {
        let mut out = Vec::new();
        match decompress(&src, &mut out, width, height, bpp) {
            Ok(format) => prop_assert_eq!(out.len(), width * height * format.bytes_per_pixel()),
            Err(_) => {}
        }
    }
}

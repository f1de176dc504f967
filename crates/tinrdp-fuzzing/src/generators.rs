//! Test case generators.
//!
//! Test case generators take raw, unstructured input from a fuzzer
//! (e.g. libFuzzer) and translate that into a structured test case (e.g. a
//! compressed tile stream paired with declared dimensions).

use arbitrary::Arbitrary;

#[derive(Arbitrary, Debug)]
pub struct BitmapInput<'a> {
    pub src: &'a [u8],
    pub width: u8,
    pub height: u8,
}

use super::depth::Source;
use super::{ensure_src, DecodeError};

const MASK_REGULAR_RUN_LENGTH: u8 = 0x1F;
const MASK_LITE_RUN_LENGTH: u8 = 0x0F;

/// A compression order recognized from its header byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Order {
    RegularBgRun,
    RegularFgRun,
    RegularFgbgImage,
    RegularColorRun,
    RegularColorImage,
    LiteSetFgFgRun,
    LiteSetFgFgbgImage,
    LiteDitheredRun,
    MegaMegaBgRun,
    MegaMegaFgRun,
    MegaMegaFgbgImage,
    MegaMegaColorRun,
    MegaMegaColorImage,
    MegaMegaSetFgRun,
    MegaMegaSetFgbgImage,
    MegaMegaDitheredRun,
    SpecialFgbg1,
    SpecialFgbg2,
    SpecialWhite,
    SpecialBlack,
}

impl Order {
    /// Extract the compression order from a header byte.
    pub(super) fn classify(header: u8) -> Option<Self> {
        if header & 0xC0 != 0xC0 {
            // Regular orders: the code lives in the top three bits.
            // (000x xxxx, 001x xxxx, 010x xxxx, 011x xxxx, 100x xxxx)
            match header >> 5 {
                0x00 => Some(Self::RegularBgRun),
                0x01 => Some(Self::RegularFgRun),
                0x02 => Some(Self::RegularFgbgImage),
                0x03 => Some(Self::RegularColorRun),
                0x04 => Some(Self::RegularColorImage),
                _ => None,
            }
        } else if header & 0xF0 == 0xF0 {
            // Mega-mega and special orders: the code is the whole byte.
            match header {
                0xF0 => Some(Self::MegaMegaBgRun),
                0xF1 => Some(Self::MegaMegaFgRun),
                0xF2 => Some(Self::MegaMegaFgbgImage),
                0xF3 => Some(Self::MegaMegaColorRun),
                0xF4 => Some(Self::MegaMegaColorImage),
                0xF6 => Some(Self::MegaMegaSetFgRun),
                0xF7 => Some(Self::MegaMegaSetFgbgImage),
                0xF8 => Some(Self::MegaMegaDitheredRun),
                0xF9 => Some(Self::SpecialFgbg1),
                0xFA => Some(Self::SpecialFgbg2),
                0xFD => Some(Self::SpecialWhite),
                0xFE => Some(Self::SpecialBlack),
                _ => None,
            }
        } else {
            // Lite orders: the code lives in the top four bits.
            // (1100 xxxx, 1101 xxxx, 1110 xxxx)
            match header >> 4 {
                0x0C => Some(Self::LiteSetFgFgRun),
                0x0D => Some(Self::LiteSetFgFgbgImage),
                0x0E => Some(Self::LiteDitheredRun),
                _ => None,
            }
        }
    }

    /// Number of pixels this order produces, reading any run-length
    /// extension bytes from `src`.
    pub(super) fn run_length(self, header: u8, src: &mut Source<'_>) -> Result<usize, DecodeError> {
        match self {
            Self::RegularBgRun | Self::RegularFgRun | Self::RegularColorRun | Self::RegularColorImage => {
                extended_length(usize::from(header & MASK_REGULAR_RUN_LENGTH), 32, src)
            }

            Self::LiteSetFgFgRun | Self::LiteDitheredRun => {
                extended_length(usize::from(header & MASK_LITE_RUN_LENGTH), 16, src)
            }

            Self::RegularFgbgImage => fgbg_length(usize::from(header & MASK_REGULAR_RUN_LENGTH), src),

            Self::LiteSetFgFgbgImage => fgbg_length(usize::from(header & MASK_LITE_RUN_LENGTH), src),

            Self::MegaMegaBgRun
            | Self::MegaMegaFgRun
            | Self::MegaMegaFgbgImage
            | Self::MegaMegaColorRun
            | Self::MegaMegaColorImage
            | Self::MegaMegaSetFgRun
            | Self::MegaMegaSetFgbgImage
            | Self::MegaMegaDitheredRun => {
                ensure_src!(src, 2);
                Ok(usize::from(src.read_u16()))
            }

            Self::SpecialFgbg1 | Self::SpecialFgbg2 => Ok(8),

            Self::SpecialWhite | Self::SpecialBlack => Ok(1),
        }
    }
}

/// In-header length, or a one-byte extension biased by `base` when the
/// in-header bits are zero.
fn extended_length(bits: usize, base: usize, src: &mut Source<'_>) -> Result<usize, DecodeError> {
    if bits == 0 {
        ensure_src!(src, 1);
        Ok(usize::from(src.read_u8()) + base)
    } else {
        Ok(bits)
    }
}

/// Foreground/background image lengths count pixels, eight per in-header
/// unit; the one-byte extension is biased by one instead.
fn fgbg_length(bits: usize, src: &mut Source<'_>) -> Result<usize, DecodeError> {
    if bits == 0 {
        ensure_src!(src, 1);
        Ok(usize::from(src.read_u8()) + 1)
    } else {
        Ok(bits * 8)
    }
}

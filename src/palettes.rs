//! Named display palettes indexed by cluster label.
//!
//! The fixed tables come from ColorBrewer (https://colorbrewer2.org); each
//! diverging/qualitative scheme carries 11 colours, which caps `k` for those
//! palettes. `BW` is reserved for cloud-coverage runs and `Random` is generated
//! per run with exactly `k` colours.

use std::fmt;

use log::warn;
use palette::Srgb;
use rand::Rng;

use crate::error::{Result, SegmentationError};

const BW: [[u8; 3]; 2] = [[0, 0, 0], [255, 255, 255]];

const RDYLBU: [[u8; 3]; 11] = [
    [165, 0, 38],
    [215, 48, 39],
    [244, 109, 67],
    [253, 174, 97],
    [254, 224, 144],
    [255, 255, 191],
    [224, 243, 248],
    [171, 217, 233],
    [116, 173, 209],
    [69, 117, 180],
    [49, 54, 149],
];

const PIYG: [[u8; 3]; 11] = [
    [142, 1, 82],
    [197, 27, 125],
    [222, 119, 174],
    [241, 182, 218],
    [253, 224, 239],
    [247, 247, 247],
    [230, 245, 208],
    [184, 225, 134],
    [127, 188, 65],
    [77, 146, 33],
    [39, 100, 25],
];

const PAIRED: [[u8; 3]; 11] = [
    [166, 206, 227],
    [31, 120, 180],
    [178, 223, 138],
    [51, 160, 44],
    [251, 154, 153],
    [227, 26, 28],
    [253, 191, 111],
    [255, 127, 0],
    [202, 178, 214],
    [106, 61, 154],
    [255, 255, 153],
];

const SET3: [[u8; 3]; 11] = [
    [141, 211, 199],
    [255, 255, 179],
    [190, 186, 218],
    [251, 128, 114],
    [128, 177, 211],
    [253, 180, 98],
    [179, 222, 105],
    [252, 205, 229],
    [217, 217, 217],
    [188, 128, 189],
    [204, 235, 197],
];

/// Pure black, the colour the binary palette reserves for non-cloud pixels.
pub const BLACK: Srgb<u8> = Srgb::new(0, 0, 0);
/// Pure white, the "positive" colour counted towards cloud coverage.
pub const WHITE: Srgb<u8> = Srgb::new(255, 255, 255);

/// The palettes the registry knows by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaletteKind {
    Random,
    RdYlBu,
    PiYG,
    Paired,
    Set3,
    /// Black & white, used for cloud coverage.
    BlackWhite,
}

impl PaletteKind {
    pub const ALL: [PaletteKind; 6] = [
        PaletteKind::Random,
        PaletteKind::RdYlBu,
        PaletteKind::PiYG,
        PaletteKind::Paired,
        PaletteKind::Set3,
        PaletteKind::BlackWhite,
    ];

    /// Palette used for names the registry does not recognise.
    pub const FALLBACK: PaletteKind = PaletteKind::Set3;

    pub fn name(self) -> &'static str {
        match self {
            PaletteKind::Random => "Random",
            PaletteKind::RdYlBu => "RdYlBu",
            PaletteKind::PiYG => "PiYG",
            PaletteKind::Paired => "Paired",
            PaletteKind::Set3 => "Set3",
            PaletteKind::BlackWhite => "BW",
        }
    }

    /// Exact-name lookup.
    pub fn parse(name: &str) -> Option<PaletteKind> {
        match name {
            "Random" => Some(PaletteKind::Random),
            "RdYlBu" => Some(PaletteKind::RdYlBu),
            "PiYG" => Some(PaletteKind::PiYG),
            "Paired" => Some(PaletteKind::Paired),
            "Set3" => Some(PaletteKind::Set3),
            "BW" => Some(PaletteKind::BlackWhite),
            _ => None,
        }
    }

    /// Like [`PaletteKind::parse`], but unknown names resolve to [`PaletteKind::FALLBACK`].
    pub fn from_name(name: &str) -> PaletteKind {
        Self::parse(name).unwrap_or_else(|| {
            warn!(
                "unknown palette {name:?}, falling back to {}",
                Self::FALLBACK.name()
            );
            Self::FALLBACK
        })
    }

    /// Pick one of the non-binary palettes at random. Used when the caller
    /// does not name a palette.
    pub fn choose_random<R: Rng + ?Sized>(rng: &mut R) -> PaletteKind {
        // everything except BlackWhite, which is last
        Self::ALL[rng.gen_range(0..Self::ALL.len() - 1)]
    }

    pub fn is_binary(self) -> bool {
        self == PaletteKind::BlackWhite
    }

    /// The static colour table, or `None` for the generated palette.
    pub fn fixed_colors(self) -> Option<&'static [[u8; 3]]> {
        match self {
            PaletteKind::Random => None,
            PaletteKind::RdYlBu => Some(&RDYLBU),
            PaletteKind::PiYG => Some(&PIYG),
            PaletteKind::Paired => Some(&PAIRED),
            PaletteKind::Set3 => Some(&SET3),
            PaletteKind::BlackWhite => Some(&BW),
        }
    }

    /// Check that this palette can colour `k` labels.
    ///
    /// The binary palette accepts any `k`: one label becomes black and every
    /// other label white.
    pub fn check_k(self, k: usize) -> Result<()> {
        match self.fixed_colors() {
            Some(colors) if !self.is_binary() && colors.len() < k => {
                Err(SegmentationError::PaletteTooSmall {
                    name: self.name(),
                    len: colors.len(),
                    k,
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for PaletteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved palette ready for label lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    kind: PaletteKind,
    colors: Vec<Srgb<u8>>,
}

impl Palette {
    /// Build the palette for `kind`. `Random` draws exactly `k` colours from `rng`.
    pub fn resolve<R: Rng + ?Sized>(kind: PaletteKind, k: usize, rng: &mut R) -> Palette {
        let colors = match kind.fixed_colors() {
            Some(table) => table.iter().map(|c| Srgb::new(c[0], c[1], c[2])).collect(),
            None => generate_random_colors(k, rng),
        };
        Palette { kind, colors }
    }

    pub fn kind(&self) -> PaletteKind {
        self.kind
    }

    pub fn colors(&self) -> &[Srgb<u8>] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour for `label`. Panics if the label is out of range.
    pub fn color(&self, label: usize) -> Srgb<u8> {
        self.colors[label]
    }

    pub fn to_hex(&self) -> Vec<String> {
        self.colors
            .iter()
            .map(|c| format!("{:02X}{:02X}{:02X}", c.red, c.green, c.blue))
            .collect()
    }
}

/// `k` independent colours, each channel uniform in `0..255`.
pub fn generate_random_colors<R: Rng + ?Sized>(k: usize, rng: &mut R) -> Vec<Srgb<u8>> {
    (0..k)
        .map(|_| Srgb::new(rng.gen_range(0..255), rng.gen_range(0..255), rng.gen_range(0..255)))
        .collect()
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Scale Table
===========

Each scale is a list of allowed semitone offsets from the key, in ascending
order and always starting at 0 (the root). The list length is stored
explicitly, so no padding value is ever matched by accident and the root
is always reachable.

    id  name               degrees
    0   chromatic          0 1 2 3 4 5 6 7 8 9 10 11
    1   ionian (major)     0 2 4 5 7 9 11
    2   pentatonic major   0 2 4 7 9
    3   aeolian (minor)    0 2 3 5 7 8 10
    4   harmonic minor     0 2 3 5 7 8 11
    5   melodic minor      0 2 3 5 7 9 11
    6   pentatonic minor   0 3 5 7 10
    7   dorian             0 2 3 5 7 9 10
    8   phrygian           0 1 3 5 7 8 10
    9   lydian             0 2 4 6 7 9 11
    10  mixolydian         0 2 4 5 7 9 10
    11  locrian            0 1 3 5 6 8 10
*/

pub const SCALE_COUNT: usize = 12;

/// Ordered semitone degrees of one scale.
#[derive(Debug, Clone, Copy)]
pub struct ScaleDegrees {
    pub name: &'static str,
    degrees: [u8; 12],
    len: u8,
}

impl ScaleDegrees {
    const fn new(name: &'static str, degrees: [u8; 12], len: u8) -> Self {
        Self { name, degrees, len }
    }

    pub fn degrees(&self) -> &[u8] {
        &self.degrees[..self.len as usize]
    }

    /// True if `semitone` (0..12, relative to the key) belongs to the scale.
    pub fn contains(&self, semitone: u8) -> bool {
        self.degrees().contains(&semitone)
    }
}

static SCALES: [ScaleDegrees; SCALE_COUNT] = [
    ScaleDegrees::new("chromatic", [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], 12),
    ScaleDegrees::new("ionian", [0, 2, 4, 5, 7, 9, 11, 0, 0, 0, 0, 0], 7),
    ScaleDegrees::new("pent maj", [0, 2, 4, 7, 9, 0, 0, 0, 0, 0, 0, 0], 5),
    ScaleDegrees::new("aeolian", [0, 2, 3, 5, 7, 8, 10, 0, 0, 0, 0, 0], 7),
    ScaleDegrees::new("harm min", [0, 2, 3, 5, 7, 8, 11, 0, 0, 0, 0, 0], 7),
    ScaleDegrees::new("mel min", [0, 2, 3, 5, 7, 9, 11, 0, 0, 0, 0, 0], 7),
    ScaleDegrees::new("pent min", [0, 3, 5, 7, 10, 0, 0, 0, 0, 0, 0, 0], 5),
    ScaleDegrees::new("dorian", [0, 2, 3, 5, 7, 9, 10, 0, 0, 0, 0, 0], 7),
    ScaleDegrees::new("phrygian", [0, 1, 3, 5, 7, 8, 10, 0, 0, 0, 0, 0], 7),
    ScaleDegrees::new("lydian", [0, 2, 4, 6, 7, 9, 11, 0, 0, 0, 0, 0], 7),
    ScaleDegrees::new("mixolyd", [0, 2, 4, 5, 7, 9, 10, 0, 0, 0, 0, 0], 7),
    ScaleDegrees::new("locrian", [0, 1, 3, 5, 6, 8, 10, 0, 0, 0, 0, 0], 7),
];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    Chromatic,
    Ionian,
    PentatonicMajor,
    #[default]
    Aeolian,
    HarmonicMinor,
    MelodicMinor,
    PentatonicMinor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
}

impl Scale {
    pub const ALL: [Scale; SCALE_COUNT] = [
        Scale::Chromatic,
        Scale::Ionian,
        Scale::PentatonicMajor,
        Scale::Aeolian,
        Scale::HarmonicMinor,
        Scale::MelodicMinor,
        Scale::PentatonicMinor,
        Scale::Dorian,
        Scale::Phrygian,
        Scale::Lydian,
        Scale::Mixolydian,
        Scale::Locrian,
    ];

    /// Scale for a table id, clamping ids past the end to the last scale.
    pub fn from_index(index: u8) -> Self {
        Self::ALL[(index as usize).min(SCALE_COUNT - 1)]
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn degrees(self) -> &'static ScaleDegrees {
        &SCALES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.degrees().name
    }
}

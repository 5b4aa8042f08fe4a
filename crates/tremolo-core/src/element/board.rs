//! Guitar fretboard widget element.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ElementId;
use crate::transform::Transform;

/// Strings of a six-string guitar in standard tuning, low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuitarString {
    #[serde(rename = "e")]
    LowE,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "E")]
    HighE,
}

impl GuitarString {
    /// Semitone offset of the open string from A.
    fn base_semitone(self) -> usize {
        match self {
            GuitarString::LowE | GuitarString::HighE => 7,
            GuitarString::A => 0,
            GuitarString::D => 5,
            GuitarString::G => 10,
            GuitarString::B => 2,
        }
    }

    /// Zero-based string index, low E first (used for vertical layout).
    pub fn index(self) -> usize {
        match self {
            GuitarString::LowE => 0,
            GuitarString::A => 1,
            GuitarString::D => 2,
            GuitarString::G => 3,
            GuitarString::B => 4,
            GuitarString::HighE => 5,
        }
    }
}

const NOTE_NAMES: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

/// The note sounded at a fret on a string, in standard tuning.
pub fn note_name(string: GuitarString, fret: u32) -> &'static str {
    NOTE_NAMES[(string.base_semitone() + fret as usize) % 12]
}

/// A fretted note placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FretNote {
    pub string: GuitarString,
    pub fret: u32,
}

/// A fretboard diagram showing a set of fretted notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: ElementId,
    pub transform: Transform,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_fret_count")]
    pub fret_count: u32,
    /// Visible fret window, inclusive.
    #[serde(default = "default_fret_range")]
    pub fret_range: [u32; 2],
    #[serde(default)]
    pub notes: Vec<FretNote>,
}

fn default_fret_count() -> u32 {
    12
}

fn default_fret_range() -> [u32; 2] {
    [1, 12]
}

impl Board {
    pub fn new(transform: Transform) -> Self {
        Self {
            id: Uuid::new_v4(),
            transform,
            width: 500.0,
            height: 200.0,
            fret_count: default_fret_count(),
            fret_range: default_fret_range(),
            notes: Vec::new(),
        }
    }
}

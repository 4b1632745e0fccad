//! # Score Snapshot Types
//!
//! This module defines the musical vocabulary of a bagpipe score and the
//! serializable snapshot the importer produces.
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   ├── settings: Settings
//!   ├── textBoxes: Vec<TextBoxPage>
//!   ├── secondTimings: Vec<Timing> (single | second timing)
//!   └── tunes: Vec<Tune>
//!         ├── name / tuneType / composer: StaticTextBox
//!         └── staves: Vec<Stave>
//!               └── bars: Vec<Measure>
//!                     ├── timeSignature, isAnacrusis
//!                     ├── frontBarline / backBarline
//!                     └── bars: Vec<Bar> (always one when imported)
//!                           └── notes: Vec<NoteOrTriplet>
//!                                 ├── Single(Note)
//!                                 └── Triplet(Triplet) with exactly 3 notes
//! ```
//!
//! ## Key Concepts
//!
//! ### Pitch
//! The chanter has nine notes, low G to high A. BWW spells them two ways:
//! the full form (`LG`, `LA`, `B` .. `F`, `HG`, `HA`) used by melody notes
//! and most embellishments, and the short form (`a`, `b` .. `f`, `g`, `t`)
//! used by single gracenotes, where `g` is high G and `t` is high A.
//!
//! ### Note Length
//! Six base durations, each of which may be dotted. Dotting multiplies the
//! length in beats by 1.5 and toggling it twice gives back the same length.
//!
//! ### Ties
//! `tied = true` means the note continues the pitch of the note before it.
//!
//! ## Related Modules
//! - `parser` - builds these types from BWW text
//! - `config` - supplies the `Settings` block and placeholder texts

use crate::error::ImportError;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// One of the nine notes of the chanter scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Pitch {
    /// Low G
    G,
    /// Low A
    A,
    B,
    C,
    D,
    E,
    F,
    HG,
    HA,
}

impl Pitch {
    /// Parse the full pitch vocabulary (`lg`, `la`, `b`..`f`, `hg`, `ha`).
    /// Case is ignored, so melody note spellings such as `LA` work too.
    pub fn from_code(code: &str) -> Result<Self, ImportError> {
        match code.to_ascii_lowercase().as_str() {
            "lg" => Ok(Pitch::G),
            "la" => Ok(Pitch::A),
            "b" => Ok(Pitch::B),
            "c" => Ok(Pitch::C),
            "d" => Ok(Pitch::D),
            "e" => Ok(Pitch::E),
            "f" => Ok(Pitch::F),
            "hg" => Ok(Pitch::HG),
            "ha" => Ok(Pitch::HA),
            _ => Err(ImportError::unrecognised("pitch", code)),
        }
    }

    /// Parse the single-letter gracenote vocabulary, where `g` means high G
    /// and `t` means high A.
    pub fn from_gracenote_code(code: &str) -> Result<Self, ImportError> {
        match code.to_ascii_lowercase().as_str() {
            "a" => Ok(Pitch::A),
            "b" => Ok(Pitch::B),
            "c" => Ok(Pitch::C),
            "d" => Ok(Pitch::D),
            "e" => Ok(Pitch::E),
            "f" => Ok(Pitch::F),
            "g" => Ok(Pitch::HG),
            "t" => Ok(Pitch::HA),
            _ => Err(ImportError::unrecognised("gracenote pitch", code)),
        }
    }
}

/// Base note duration, whole note down to 1/32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    Semibreve,
    Minim,
    Crotchet,
    Quaver,
    SemiQuaver,
    DemiSemiQuaver,
}

impl Duration {
    pub const ALL: [Duration; 6] = [
        Duration::Semibreve,
        Duration::Minim,
        Duration::Crotchet,
        Duration::Quaver,
        Duration::SemiQuaver,
        Duration::DemiSemiQuaver,
    ];

    /// Parse the BWW length suffix of a note (`LA_4` has code `4`).
    pub fn from_code(code: &str) -> Result<Self, ImportError> {
        match code {
            "1" => Ok(Duration::Semibreve),
            "2" => Ok(Duration::Minim),
            "4" => Ok(Duration::Crotchet),
            "8" => Ok(Duration::Quaver),
            "16" => Ok(Duration::SemiQuaver),
            "32" => Ok(Duration::DemiSemiQuaver),
            _ => Err(ImportError::unrecognised("note length", code)),
        }
    }

    /// Length in crotchet beats.
    pub fn beats(self) -> f64 {
        match self {
            Duration::Semibreve => 4.0,
            Duration::Minim => 2.0,
            Duration::Crotchet => 1.0,
            Duration::Quaver => 0.5,
            Duration::SemiQuaver => 0.25,
            Duration::DemiSemiQuaver => 0.125,
        }
    }
}

/// A duration together with its dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLength {
    pub duration: Duration,
    pub dotted: bool,
}

impl NoteLength {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            dotted: false,
        }
    }

    /// Toggle the dot, keeping the base duration.
    pub fn dot(self) -> Self {
        Self {
            duration: self.duration,
            dotted: !self.dotted,
        }
    }

    pub fn beats(self) -> f64 {
        if self.dotted {
            self.duration.beats() * 1.5
        } else {
            self.duration.beats()
        }
    }

    /// Code used by the saved score format.
    pub fn code(self) -> &'static str {
        match (self.duration, self.dotted) {
            (Duration::Semibreve, false) => "sb",
            (Duration::Semibreve, true) => "dsb",
            (Duration::Minim, false) => "m",
            (Duration::Minim, true) => "dm",
            (Duration::Crotchet, false) => "c",
            (Duration::Crotchet, true) => "dc",
            (Duration::Quaver, false) => "q",
            (Duration::Quaver, true) => "dq",
            (Duration::SemiQuaver, false) => "sq",
            (Duration::SemiQuaver, true) => "dsq",
            (Duration::DemiSemiQuaver, false) => "ssq",
            (Duration::DemiSemiQuaver, true) => "dssq",
        }
    }
}

impl From<Duration> for NoteLength {
    fn from(duration: Duration) -> Self {
        NoteLength::new(duration)
    }
}

impl Serialize for NoteLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Time signature of a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSignature {
    /// `top` beats of `1/bottom` notes; `bottom` is 2, 4 or 8.
    Fraction { top: u32, bottom: u32 },
    CutTime,
    CommonTime,
}

impl TimeSignature {
    pub fn new(top: u32, bottom: u32) -> Result<Self, ImportError> {
        if top == 0 || !matches!(bottom, 2 | 4 | 8) {
            return Err(ImportError::unrecognised(
                "time signature",
                &format!("{}_{}", top, bottom),
            ));
        }
        Ok(TimeSignature::Fraction { top, bottom })
    }

    /// Full bar length in crotchet beats.
    pub fn bar_beats(self) -> f64 {
        match self {
            TimeSignature::CutTime | TimeSignature::CommonTime => 4.0,
            TimeSignature::Fraction { top, bottom } => (top * 4) as f64 / bottom as f64,
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::Fraction { top: 2, bottom: 4 }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum SavedTs {
    Fraction([u32; 2]),
    Named(&'static str),
}

impl Serialize for TimeSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ts = match *self {
            TimeSignature::Fraction { top, bottom } => SavedTs::Fraction([top, bottom]),
            TimeSignature::CutTime => SavedTs::Named("cut time"),
            TimeSignature::CommonTime => SavedTs::Named("common time"),
        };
        let mut state = serializer.serialize_struct("TimeSignature", 2)?;
        state.serialize_field("ts", &ts)?;
        state.serialize_field("breaks", &[] as &[u32])?;
        state.end()
    }
}

/// Identifier of a note, triplet or bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(pub u64);

/// Hands out IDs in increasing order, starting at 1.
#[derive(Debug, Default)]
pub struct IdGen {
    last: u64,
}

impl IdGen {
    pub fn next_id(&mut self) -> Id {
        self.last += 1;
        Id(self.last)
    }
}

/// Gracenote attached to a note.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Gracenote {
    /// Named embellishment whose pitches depend on the neighbouring notes.
    Reactive { grace: String },
    Single { note: Pitch },
    Custom { pitches: Vec<Pitch> },
    #[default]
    None,
}

impl Gracenote {
    pub fn reactive(name: &str) -> Self {
        Gracenote::Reactive {
            grace: name.to_string(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Gracenote::None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Id,
    pub pitch: Pitch,
    pub length: NoteLength,
    pub tied: bool,
    pub has_natural: bool,
    pub gracenote: Gracenote,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triplet {
    pub id: Id,
    pub length: NoteLength,
    pub notes: [Note; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "notetype", content = "value", rename_all = "lowercase")]
pub enum NoteOrTriplet {
    Single(Note),
    Triplet(Triplet),
}

impl NoteOrTriplet {
    pub fn length(&self) -> NoteLength {
        match self {
            NoteOrTriplet::Single(note) => note.length,
            NoteOrTriplet::Triplet(triplet) => triplet.length,
        }
    }

    /// The note that was placed last within this entry.
    pub fn last_note_mut(&mut self) -> &mut Note {
        match self {
            NoteOrTriplet::Single(note) => note,
            NoteOrTriplet::Triplet(triplet) => &mut triplet.notes[2],
        }
    }
}

/// A single line of notes within a measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub id: Id,
    pub notes: Vec<NoteOrTriplet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Barline {
    #[default]
    Normal,
    Repeat,
    /// Part barline; called `end` in the saved format.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Width {
    #[default]
    #[serde(rename = "auto")]
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub is_anacrusis: bool,
    pub time_signature: TimeSignature,
    pub bars: Vec<Bar>,
    pub width: Width,
    pub front_barline: Barline,
    pub back_barline: Barline,
}

impl Measure {
    /// A measure holding one empty bar.
    pub fn new(bar_id: Id, time_signature: TimeSignature) -> Self {
        Self {
            is_anacrusis: false,
            time_signature,
            bars: vec![Bar {
                id: bar_id,
                notes: Vec::new(),
            }],
            width: Width::Auto,
            front_barline: Barline::Normal,
            back_barline: Barline::Normal,
        }
    }

    pub fn notes(&self) -> &[NoteOrTriplet] {
        self.bars.first().map(|b| b.notes.as_slice()).unwrap_or(&[])
    }

    /// Total length of all entries in beats. A triplet counts its own
    /// `length` once.
    pub fn total_beats(&self) -> f64 {
        self.notes().iter().map(|n| n.length().beats()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stave {
    /// Measures; the saved format calls them bars.
    pub bars: Vec<Measure>,
    pub number_of_parts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Font {
    #[default]
    #[serde(rename = "sans-serif")]
    SansSerif,
    #[serde(rename = "serif")]
    Serif,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticTextBox {
    pub size: f64,
    pub text: String,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovableTextBox {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    #[serde(rename = "_text")]
    pub text: String,
    pub centred: bool,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TextBoxPage {
    pub texts: Vec<MovableTextBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tune {
    pub name: StaticTextBox,
    pub tune_type: StaticTextBox,
    pub composer: StaticTextBox,
    pub staves: Vec<Stave>,
    pub tune_gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleTiming {
    pub start: Id,
    pub end: Id,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondTiming {
    pub start: Id,
    pub middle: Id,
    pub end: Id,
    pub first_text: String,
    pub second_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Timing {
    #[serde(rename = "single timing")]
    Single(SingleTiming),
    #[serde(rename = "second timing")]
    Second(SecondTiming),
}

/// Document settings copied into every imported score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub bpm: u32,
    pub stave_gap: f64,
    pub line_gap: f64,
    pub harmony_gap: f64,
    pub margin: f64,
    pub gap_after_gracenote: f64,
    pub harmony_volume: f64,
    pub instrument: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: 80,
            stave_gap: 100.0,
            line_gap: 7.0,
            harmony_gap: 65.0,
            margin: 80.0,
            gap_after_gracenote: 7.0,
            harmony_volume: 0.75,
            instrument: "ghb".to_string(),
        }
    }
}

/// The imported document, ready to load into the score editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub landscape: bool,
    pub tunes: Vec<Tune>,
    pub text_boxes: Vec<TextBoxPage>,
    pub second_timings: Vec<Timing>,
    pub show_number_of_pages: bool,
    pub settings: Settings,
}

impl Score {
    /// All staves of all tunes, in order.
    pub fn staves(&self) -> impl Iterator<Item = &Stave> {
        self.tunes.iter().flat_map(|t| t.staves.iter())
    }

    /// All measures of the score, in order.
    pub fn measures(&self) -> impl Iterator<Item = &Measure> {
        self.staves().flat_map(|s| s.bars.iter())
    }
}

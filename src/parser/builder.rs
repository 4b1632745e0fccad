//! # Score Builder
//!
//! The state machine behind the parser. Each token handler in `parser`
//! calls one builder operation, and the builder carries everything that
//! spans more than one token:
//!
//! ```text
//! ScoreBuilder
//! ├── ties           tri-state (none / old format / new format) + pitch
//! ├── pending slots  gracenote and natural for the next note
//! ├── time signature carried into every new measure
//! ├── timing         the one open time line and the finished timings
//! └── staves         flushed staves + measures of the current line
//! ```
//!
//! Measures are opened lazily by the first note (or part beginning) after
//! a barline, so a time signature that arrives before any note always
//! lands in the measure it precedes.
//!
//! ## Related Modules
//! - `parser` - dispatches tokens to these operations
//! - `model` - the snapshot types being built

use crate::diagnostics::{Warnings, INCOMPLETE_PARSE};
use crate::error::ImportError;
use crate::model::{
    Barline, Gracenote, Id, IdGen, Measure, Note, NoteLength, NoteOrTriplet, Pitch,
    SecondTiming, SingleTiming, Stave, TimeSignature, Timing, Triplet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TieState {
    #[default]
    NotTieing,
    /// Ties exactly the next note.
    OldTieFormat,
    /// Ties every note until the closing sigil.
    NewTieFormat,
}

/// A time line that has been opened but not closed.
#[derive(Debug, Clone)]
struct OpenTiming {
    /// `None` until a note or bar is placed after the opening sigil.
    start: Option<Id>,
    text: String,
}

/// What the builder produced once the input is exhausted.
#[derive(Debug, Default)]
pub struct BuiltScore {
    pub staves: Vec<Stave>,
    pub timings: Vec<Timing>,
}

#[derive(Debug, Default)]
pub struct ScoreBuilder {
    ids: IdGen,

    tieing: TieState,
    tied_first_note: bool,
    tieing_pitch: Option<Pitch>,

    gracenote: Gracenote,
    accidental: Option<Pitch>,

    time_signature: TimeSignature,

    timing: Option<OpenTiming>,
    timings: Vec<Timing>,
    previous_id: Option<Id>,

    staves: Vec<Stave>,
    current_stave: Vec<Measure>,
    measure_open: bool,
    group_open: bool,
}

impl ScoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_line_is_empty(&self) -> bool {
        self.current_stave.is_empty()
    }

    /// 1-based number of the measure being built, across all staves.
    fn measure_number(&self) -> usize {
        let flushed: usize = self.staves.iter().map(|s| s.bars.len()).sum();
        let current = self.current_stave.len();
        if self.measure_open {
            flushed + current
        } else {
            flushed + current + 1
        }
    }

    fn semantic_error(&self, message: impl Into<String>) -> ImportError {
        ImportError::SemanticError {
            measure: self.measure_number(),
            message: message.into(),
        }
    }

    /// A clef starts a new line unless the current one is still empty.
    pub fn clef(&mut self) {
        if !self.current_line_is_empty() {
            self.flush_stave();
        }
    }

    /// Takes effect in the current measure if it has no notes yet,
    /// otherwise from the next measure.
    pub fn time_signature(&mut self, time_signature: TimeSignature) {
        self.time_signature = time_signature;
        if let Some(measure) = self.open_measure_mut() {
            if measure.notes().is_empty() {
                measure.time_signature = time_signature;
            }
        }
    }

    pub fn part_beginning(&mut self, repeat: bool) {
        if self.measure_open {
            let empty = self
                .current_stave
                .last()
                .map_or(true, |m| m.notes().is_empty());
            if !empty {
                self.finish_measure();
            }
        }
        self.ensure_measure();
        if let Some(measure) = self.open_measure_mut() {
            measure.front_barline = if repeat { Barline::Repeat } else { Barline::End };
        }
    }

    pub fn part_end(&mut self, repeat: bool, warnings: &mut Warnings) {
        let barline = if repeat { Barline::Repeat } else { Barline::End };
        match self.current_stave.last_mut() {
            Some(measure) => measure.back_barline = barline,
            None => {
                warnings.push("Ignoring part end with no bar before it");
                return;
            }
        }
        if self.measure_open {
            self.finish_measure();
        }
    }

    /// A plain barline closes the current measure. Barlines at the very
    /// start of a line are redundant and ignored.
    pub fn barline(&mut self) {
        if self.current_line_is_empty() {
            tracing::debug!("ignoring barline at start of line");
            return;
        }
        if self.measure_open {
            self.finish_measure();
        }
    }

    pub fn terminating_barline(&mut self) {
        self.flush_stave();
    }

    /// Attach `gracenote` to the next note.
    pub fn gracenote(&mut self, gracenote: Gracenote, warnings: &mut Warnings) {
        if !self.gracenote.is_none() {
            warnings.push("Gracenote without a note: replacing it with the next one");
        }
        self.gracenote = gracenote;
    }

    /// Record a natural for the next note.
    pub fn natural(&mut self, pitch: Pitch, warnings: &mut Warnings) {
        match pitch {
            Pitch::C | Pitch::F => {
                if self.accidental.replace(pitch).is_some() {
                    warnings.push("Ignoring natural with no note after it");
                }
            }
            other => warnings.push(format!("Ignoring natural on {:?}", other)),
        }
    }

    pub fn place_note(
        &mut self,
        pitch: Pitch,
        length: NoteLength,
        warnings: &mut Warnings,
    ) -> Result<(), ImportError> {
        self.ensure_measure();
        let tied = self.tie_note(pitch, warnings);

        let has_natural = match self.accidental.take() {
            Some(natural) if natural == pitch => true,
            Some(natural) => {
                warnings.push(format!(
                    "Ignoring natural on {:?}: the next note is {:?}",
                    natural, pitch
                ));
                false
            }
            None => false,
        };

        let note = Note {
            id: self.ids.next_id(),
            pitch,
            length,
            tied,
            has_natural,
            gracenote: std::mem::take(&mut self.gracenote),
        };
        let id = note.id;

        match self.open_measure_mut() {
            Some(measure) => measure.bars[0].notes.push(NoteOrTriplet::Single(note)),
            None => return Err(self.semantic_error("No measure to place a note in")),
        }

        self.placed(id);
        Ok(())
    }

    /// Work out whether a note of `pitch` continues the running tie.
    fn tie_note(&mut self, pitch: Pitch, warnings: &mut Warnings) -> bool {
        let tied = match self.tieing {
            TieState::NotTieing => false,
            TieState::NewTieFormat if !self.tied_first_note => {
                self.tied_first_note = true;
                self.tieing_pitch = Some(pitch);
                false
            }
            TieState::OldTieFormat | TieState::NewTieFormat => {
                if self.tieing_pitch == Some(pitch) {
                    true
                } else {
                    warnings.push(format!(
                        "Ignoring tie between different pitches ({:?} and {:?})",
                        self.tieing_pitch, pitch
                    ));
                    false
                }
            }
        };
        if self.tieing == TieState::OldTieFormat {
            self.tieing = TieState::NotTieing;
        }
        tied
    }

    /// Toggle the dot on the most recently placed note. This can reach back
    /// into a stave that has already been flushed.
    pub fn dot(&mut self, warnings: &mut Warnings) {
        let in_current = self
            .current_stave
            .iter_mut()
            .rev()
            .find_map(|m| m.bars[0].notes.last_mut());
        let target = match in_current {
            Some(entry) => Some(entry),
            None => self
                .staves
                .iter_mut()
                .rev()
                .flat_map(|s| s.bars.iter_mut().rev())
                .find_map(|m| m.bars[0].notes.last_mut()),
        };
        match target {
            Some(entry) => {
                let note = entry.last_note_mut();
                note.length = note.length.dot();
            }
            None => warnings.push("Ignoring dot with no note before it"),
        }
    }

    pub fn tie_start(&mut self) {
        self.tieing = TieState::NewTieFormat;
        self.tied_first_note = false;
    }

    /// `^t<pitch>`: closes a new-format tie when it is `^te`, otherwise ties
    /// the next note to `pitch`.
    pub fn tie_end_or_old(&mut self, code: &str) -> Result<(), ImportError> {
        if self.tieing == TieState::NewTieFormat && code == "e" {
            self.tieing = TieState::NotTieing;
            self.tied_first_note = false;
        } else {
            self.tieing = TieState::OldTieFormat;
            self.tieing_pitch = Some(Pitch::from_code(code)?);
        }
        Ok(())
    }

    pub fn group_start(&mut self, code: &str) -> Result<(), ImportError> {
        let size = group_size(code)?;
        if size != 3 {
            return Err(self.semantic_error("Can't deal with non-triplet irregular groups"));
        }
        if self.group_open {
            return Err(self.semantic_error("Can't nest triplets"));
        }
        self.group_open = true;
        Ok(())
    }

    pub fn group_end(&mut self, code: &str) -> Result<(), ImportError> {
        let size = group_size(code)?;
        if size != 3 {
            return Err(self.semantic_error("Can't deal with non-triplet irregular groups"));
        }
        self.make_triplet()
    }

    /// Replace the last three entries of the current measure with a triplet.
    pub fn make_triplet(&mut self) -> Result<(), ImportError> {
        self.group_open = false;
        let measure_number = self.measure_number();
        let error = |message: &str| ImportError::SemanticError {
            measure: measure_number,
            message: message.to_string(),
        };

        let id = self.ids.next_id();
        let notes = match self.current_stave.last_mut() {
            Some(measure) => &mut measure.bars[0].notes,
            None => return Err(error("Triplet without 3 notes in it.")),
        };
        if notes.len() < 3 {
            return Err(error("Triplet without 3 notes in it."));
        }

        let mut group = Vec::with_capacity(3);
        for entry in notes.drain(notes.len() - 3..) {
            match entry {
                NoteOrTriplet::Single(note) => group.push(note),
                NoteOrTriplet::Triplet(_) => return Err(error("Can't nest triplets")),
            }
        }
        let notes_in_group: [Note; 3] = match group.try_into() {
            Ok(array) => array,
            Err(_) => return Err(error("Triplet without 3 notes in it.")),
        };
        notes.push(NoteOrTriplet::Triplet(Triplet {
            id,
            length: notes_in_group[0].length,
            notes: notes_in_group,
        }));
        Ok(())
    }

    pub fn timeline_start(&mut self, text: String, warnings: &mut Warnings) {
        if self.timing.is_some() {
            warnings.push("Started a timeline before the previous one ended: replacing it");
        }
        self.timing = Some(OpenTiming { start: None, text });
    }

    pub fn timeline_end(&mut self, warnings: &mut Warnings) {
        let timing = match self.timing.take() {
            Some(timing) => timing,
            None => {
                warnings.push("Ended a timeline without starting it");
                return;
            }
        };
        match (timing.start, self.previous_id) {
            (Some(start), Some(end)) => self.add_timing(start, end, timing.text),
            _ => warnings.push(format!("Ignoring empty timeline {}", timing.text)),
        }
    }

    /// A `2.` timing straight after a single timing becomes a second timing.
    fn add_timing(&mut self, start: Id, end: Id, text: String) {
        if text == "2." {
            if let Some(Timing::Single(first)) = self.timings.last().cloned() {
                self.timings.pop();
                self.timings.push(Timing::Second(SecondTiming {
                    start: first.start,
                    middle: start,
                    end,
                    first_text: first.text,
                    second_text: text,
                }));
                return;
            }
        }
        self.timings
            .push(Timing::Single(SingleTiming { start, end, text }));
    }

    fn open_measure_mut(&mut self) -> Option<&mut Measure> {
        if self.measure_open {
            self.current_stave.last_mut()
        } else {
            None
        }
    }

    fn ensure_measure(&mut self) {
        if self.measure_open {
            return;
        }
        let bar_id = self.ids.next_id();
        self.current_stave
            .push(Measure::new(bar_id, self.time_signature));
        self.measure_open = true;
        self.placed(bar_id);
    }

    /// Record `id` as the latest placed item, starting a pending time line.
    fn placed(&mut self, id: Id) {
        if let Some(timing) = &mut self.timing {
            if timing.start.is_none() {
                timing.start = Some(id);
            }
        }
        self.previous_id = Some(id);
    }

    fn finish_measure(&mut self) {
        self.measure_open = false;
        if let Some(measure) = self.current_stave.last_mut() {
            // A crude stand-in for lead-ins, which BWW has no notation for.
            let bar_length = measure.time_signature.bar_beats();
            measure.is_anacrusis = measure.total_beats() < bar_length / 2.0;
            tracing::debug!(
                beats = measure.total_beats(),
                anacrusis = measure.is_anacrusis,
                "closed measure"
            );
        }
    }

    fn flush_stave(&mut self) {
        if self.measure_open {
            self.finish_measure();
        }
        if self.current_stave.is_empty() {
            return;
        }
        let bars = std::mem::take(&mut self.current_stave);
        tracing::debug!(measures = bars.len(), "flushed stave");
        self.staves.push(Stave {
            bars,
            number_of_parts: 1,
        });
    }

    /// Close everything that is still open and hand over the result.
    pub fn finish(mut self, warnings: &mut Warnings) -> BuiltScore {
        self.flush_stave();
        if !self.gracenote.is_none() {
            warnings.push("Ignoring gracenote at the end of the score with no note after it");
        }
        if self.accidental.is_some() {
            warnings.push("Ignoring natural at the end of the score with no note after it");
        }
        if let Some(timing) = &self.timing {
            warnings.push(format!("Timeline {} was never ended", timing.text));
        }
        if self.group_open {
            warnings.push(format!("{}: an irregular group was never closed", INCOMPLETE_PARSE));
        }
        BuiltScore {
            staves: self.staves,
            timings: self.timings,
        }
    }
}

/// Number of notes in an irregular group from its BWW code.
pub fn group_size(code: &str) -> Result<u32, ImportError> {
    match code {
        "2" => Ok(2),
        "3" => Ok(3),
        "43" | "46" => Ok(4),
        "53" | "54" => Ok(5),
        "64" => Ok(6),
        "74" | "76" => Ok(7),
        other => Err(ImportError::unrecognised("irregular group", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Duration;

    fn crotchet() -> NoteLength {
        NoteLength::new(Duration::Crotchet)
    }

    fn quaver() -> NoteLength {
        NoteLength::new(Duration::Quaver)
    }

    fn notes(built: &BuiltScore, stave: usize, measure: usize) -> &[NoteOrTriplet] {
        built.staves[stave].bars[measure].notes()
    }

    fn single(entry: &NoteOrTriplet) -> &Note {
        match entry {
            NoteOrTriplet::Single(note) => note,
            other => panic!("Expected single note, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_builder_has_no_staves() {
        let mut warnings = Warnings::new();
        let built = ScoreBuilder::new().finish(&mut warnings);
        assert!(built.staves.is_empty());
        assert!(built.timings.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_barline_at_line_start_is_ignored() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.barline();
        b.place_note(Pitch::A, crotchet(), &mut w).unwrap();
        let built = b.finish(&mut w);
        assert_eq!(built.staves[0].bars.len(), 1);
    }

    #[test]
    fn test_anacrusis_threshold() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.time_signature(TimeSignature::new(4, 4).unwrap());
        b.place_note(Pitch::A, crotchet(), &mut w).unwrap();
        b.barline();
        b.place_note(Pitch::A, crotchet(), &mut w).unwrap();
        b.place_note(Pitch::B, crotchet(), &mut w).unwrap();
        b.barline();
        let built = b.finish(&mut w);
        assert!(built.staves[0].bars[0].is_anacrusis);
        assert!(!built.staves[0].bars[1].is_anacrusis);
    }

    #[test]
    fn test_time_signature_mid_measure_applies_to_next() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.place_note(Pitch::A, crotchet(), &mut w).unwrap();
        b.time_signature(TimeSignature::new(3, 4).unwrap());
        b.place_note(Pitch::B, crotchet(), &mut w).unwrap();
        b.barline();
        b.place_note(Pitch::C, crotchet(), &mut w).unwrap();
        let built = b.finish(&mut w);
        assert_eq!(built.staves[0].bars[0].time_signature, TimeSignature::default());
        assert_eq!(
            built.staves[0].bars[1].time_signature,
            TimeSignature::new(3, 4).unwrap()
        );
    }

    #[test]
    fn test_old_tie_lasts_one_note() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.place_note(Pitch::A, crotchet(), &mut w).unwrap();
        b.tie_end_or_old("la").unwrap();
        b.place_note(Pitch::A, crotchet(), &mut w).unwrap();
        b.place_note(Pitch::A, crotchet(), &mut w).unwrap();
        let built = b.finish(&mut w);
        let tied: Vec<bool> = notes(&built, 0, 0).iter().map(|n| single(n).tied).collect();
        assert_eq!(tied, vec![false, true, false]);
        assert!(w.is_empty());
    }

    #[test]
    fn test_new_tie_spans_run() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.tie_start();
        b.place_note(Pitch::D, quaver(), &mut w).unwrap();
        b.place_note(Pitch::D, quaver(), &mut w).unwrap();
        b.place_note(Pitch::D, quaver(), &mut w).unwrap();
        b.tie_end_or_old("e").unwrap();
        b.place_note(Pitch::E, quaver(), &mut w).unwrap();
        let built = b.finish(&mut w);
        let tied: Vec<bool> = notes(&built, 0, 0).iter().map(|n| single(n).tied).collect();
        assert_eq!(tied, vec![false, true, true, false]);
    }

    #[test]
    fn test_tie_between_different_pitches_warns() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.tie_end_or_old("b").unwrap();
        b.place_note(Pitch::C, crotchet(), &mut w).unwrap();
        let built = b.finish(&mut w);
        assert!(!single(&notes(&built, 0, 0)[0]).tied);
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn test_pending_gracenote_is_consumed_once() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.gracenote(Gracenote::reactive("doubling"), &mut w);
        b.barline();
        b.place_note(Pitch::A, crotchet(), &mut w).unwrap();
        b.place_note(Pitch::B, crotchet(), &mut w).unwrap();
        let built = b.finish(&mut w);
        let n = notes(&built, 0, 0);
        assert_eq!(single(&n[0]).gracenote, Gracenote::reactive("doubling"));
        assert_eq!(single(&n[1]).gracenote, Gracenote::None);
        assert!(w.is_empty());
    }

    #[test]
    fn test_natural_only_applies_to_matching_pitch() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.natural(Pitch::C, &mut w);
        b.place_note(Pitch::C, crotchet(), &mut w).unwrap();
        b.natural(Pitch::F, &mut w);
        b.place_note(Pitch::E, crotchet(), &mut w).unwrap();
        b.natural(Pitch::D, &mut w);
        let built = b.finish(&mut w);
        let n = notes(&built, 0, 0);
        assert!(single(&n[0]).has_natural);
        assert!(!single(&n[1]).has_natural);
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn test_triplet_replaces_last_three_entries() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.place_note(Pitch::A, crotchet(), &mut w).unwrap();
        b.group_start("3").unwrap();
        for pitch in [Pitch::C, Pitch::E, Pitch::A] {
            b.place_note(pitch, quaver(), &mut w).unwrap();
        }
        b.make_triplet().unwrap();
        let built = b.finish(&mut w);
        let n = notes(&built, 0, 0);
        assert_eq!(n.len(), 2);
        match &n[1] {
            NoteOrTriplet::Triplet(t) => {
                assert_eq!(t.length, quaver());
                let pitches: Vec<Pitch> = t.notes.iter().map(|n| n.pitch).collect();
                assert_eq!(pitches, vec![Pitch::C, Pitch::E, Pitch::A]);
            }
            other => panic!("Expected triplet, got {:?}", other),
        }
        assert!(!w.has_incomplete_parse());
    }

    #[test]
    fn test_triplet_id_follows_its_notes() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        for pitch in [Pitch::C, Pitch::E, Pitch::A] {
            b.place_note(pitch, quaver(), &mut w).unwrap();
        }
        b.make_triplet().unwrap();
        b.place_note(Pitch::B, quaver(), &mut w).unwrap();
        let built = b.finish(&mut w);
        let n = notes(&built, 0, 0);
        let (triplet_id, note_ids) = match &n[0] {
            NoteOrTriplet::Triplet(t) => (t.id, t.notes.iter().map(|n| n.id).collect::<Vec<_>>()),
            other => panic!("Expected triplet, got {:?}", other),
        };
        assert!(note_ids.iter().all(|id| *id < triplet_id));
        match &n[1] {
            NoteOrTriplet::Single(note) => assert!(note.id > triplet_id),
            other => panic!("Expected note, got {:?}", other),
        }
    }

    #[test]
    fn test_triplet_needs_three_notes() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.place_note(Pitch::A, quaver(), &mut w).unwrap();
        b.place_note(Pitch::B, quaver(), &mut w).unwrap();
        let err = b.make_triplet().unwrap_err();
        assert!(matches!(err, ImportError::SemanticError { measure: 1, .. }));
        assert!(err.to_string().contains("Triplet without 3 notes"));
    }

    #[test]
    fn test_triplets_cannot_nest() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        for pitch in [Pitch::C, Pitch::E, Pitch::A] {
            b.place_note(pitch, quaver(), &mut w).unwrap();
        }
        b.make_triplet().unwrap();
        b.place_note(Pitch::B, quaver(), &mut w).unwrap();
        b.place_note(Pitch::C, quaver(), &mut w).unwrap();
        let err = b.make_triplet().unwrap_err();
        assert!(err.to_string().contains("Can't nest triplets"));
    }

    #[test]
    fn test_non_triplet_groups_are_rejected() {
        let mut b = ScoreBuilder::new();
        let err = b.group_start("2").unwrap_err();
        assert!(err.to_string().contains("non-triplet"));
        assert!(b.group_end("43").is_err());
        assert!(group_size("9").is_err());
    }

    #[test]
    fn test_unclosed_group_is_incomplete() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.group_start("3").unwrap();
        b.place_note(Pitch::A, quaver(), &mut w).unwrap();
        b.finish(&mut w);
        assert!(w.has_incomplete_parse());
    }

    #[test]
    fn test_dot_reaches_into_flushed_stave() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.place_note(Pitch::A, quaver(), &mut w).unwrap();
        b.terminating_barline();
        b.clef();
        b.dot(&mut w);
        let built = b.finish(&mut w);
        assert_eq!(single(&notes(&built, 0, 0)[0]).length, quaver().dot());
        assert!(w.is_empty());
    }

    #[test]
    fn test_dot_on_triplet_hits_last_note() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        for pitch in [Pitch::C, Pitch::E, Pitch::A] {
            b.place_note(pitch, quaver(), &mut w).unwrap();
        }
        b.make_triplet().unwrap();
        b.dot(&mut w);
        let built = b.finish(&mut w);
        match &notes(&built, 0, 0)[0] {
            NoteOrTriplet::Triplet(t) => {
                assert_eq!(t.notes[2].length, quaver().dot());
                assert_eq!(t.notes[0].length, quaver());
            }
            other => panic!("Expected triplet, got {:?}", other),
        }
    }

    #[test]
    fn test_timeline_without_start_warns() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.timeline_end(&mut w);
        b.finish(&mut w);
        assert_eq!(w.len(), 1);
        assert!(w.iter().next().unwrap().contains("without starting"));
    }

    #[test]
    fn test_first_and_second_timings_merge() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.place_note(Pitch::A, crotchet(), &mut w).unwrap();
        b.barline();
        b.timeline_start("1.".to_string(), &mut w);
        b.place_note(Pitch::B, crotchet(), &mut w).unwrap();
        b.timeline_end(&mut w);
        b.barline();
        b.timeline_start("2.".to_string(), &mut w);
        b.place_note(Pitch::C, crotchet(), &mut w).unwrap();
        b.timeline_end(&mut w);
        let built = b.finish(&mut w);
        assert!(w.is_empty());
        assert_eq!(built.timings.len(), 1);
        match &built.timings[0] {
            Timing::Second(t) => {
                assert_eq!(t.start, built.staves[0].bars[1].bars[0].id);
                assert_eq!(t.middle, built.staves[0].bars[2].bars[0].id);
                assert_eq!(t.first_text, "1.");
                assert_eq!(t.second_text, "2.");
            }
            other => panic!("Expected second timing, got {:?}", other),
        }
    }

    #[test]
    fn test_part_markers_set_barlines() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.part_beginning(true);
        b.place_note(Pitch::A, crotchet(), &mut w).unwrap();
        b.barline();
        b.place_note(Pitch::B, crotchet(), &mut w).unwrap();
        b.barline();
        b.part_end(true, &mut w);
        let built = b.finish(&mut w);
        let bars = &built.staves[0].bars;
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].front_barline, Barline::Repeat);
        assert_eq!(bars[1].back_barline, Barline::Repeat);
        assert!(w.is_empty());
    }

    #[test]
    fn test_part_end_on_empty_line_warns() {
        let mut b = ScoreBuilder::new();
        let mut w = Warnings::new();
        b.part_end(false, &mut w);
        assert_eq!(w.len(), 1);
    }
}

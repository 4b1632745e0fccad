//! # Parser Module
//!
//! This module turns BWW text into a score snapshot.
//!
//! ## Purpose
//! The parser drives the tokenizer one token at a time and hands each token
//! to the score builder. It never looks more than one token ahead; state
//! that spans several tokens (ties, pending gracenotes and naturals, open
//! time lines) lives in the builder.
//!
//! ## Phases
//!
//! ### Header
//! Software signature, mapping tables, tune format, tempo and text tags.
//! Text tag values are kept; the tempo sets the score's bpm.
//!
//! ### Body
//! Every remaining token is dispatched on its kind:
//! - clef, part markers and barlines shape measures and staves
//! - accidentals straight after a clef form the key signature
//! - embellishments become the pending gracenote of the next note
//! - melody notes, dots, tie and triplet sigils, time lines
//!
//! ### Assembly
//! At end of input the builder closes anything still open and the parser
//! wraps the staves into a single tune with headings and settings.
//!
//! ## Entry Point
//! `parse(source: &str) -> Result<ParsedScore, ImportError>`
//!
//! ## Example
//! ```rust
//! use bww::parse;
//!
//! let parsed = parse("& sharpf sharpc 4_4 I! LA_4 B_4 C_4 D_4 !I").unwrap();
//! assert!(parsed.warnings.is_empty());
//! assert_eq!(parsed.score.tunes[0].staves[0].bars.len(), 1);
//! ```
//!
//! ## Related Modules
//! - `lexer` - provides the token stream
//! - `model` - the snapshot types
//! - `config` - headings, sizes and settings used during assembly

pub mod builder;
pub mod embellishment;
pub mod header;

use crate::config::ImportConfig;
use crate::diagnostics::INCOMPLETE_PARSE;
use crate::error::ImportError;
use crate::lexer::{Token, TokenKind, TokenStream};
use crate::model::{
    Duration, Font, MovableTextBox, NoteLength, Pitch, Score, StaticTextBox, TextBoxPage,
    TimeSignature, Tune,
};
use builder::{BuiltScore, ScoreBuilder};
use header::{TextTag, TextTagKind};
use serde::Serialize;

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedScore {
    pub score: Score,
    pub warnings: Vec<String>,
    /// Text tag values in file order; conventionally name, tune type, composer.
    pub textboxes: Vec<String>,
}

impl ParsedScore {
    /// False when a warning says part of the input was not understood.
    pub fn is_complete(&self) -> bool {
        !self.warnings.iter().any(|w| w.starts_with(INCOMPLETE_PARSE))
    }
}

/// Parse BWW text with the default configuration.
pub fn parse(source: &str) -> Result<ParsedScore, ImportError> {
    parse_with_config(source, &ImportConfig::default())
}

pub fn parse_with_config(source: &str, config: &ImportConfig) -> Result<ParsedScore, ImportError> {
    Parser::new(source, config)?.parse()
}

struct Parser<'a> {
    ts: TokenStream,
    builder: ScoreBuilder,
    config: &'a ImportConfig,
    text_tags: Vec<TextTag>,
    tempo: Option<u32>,
    /// True between a clef and the first token that is not an accidental.
    in_key_signature: bool,
}

impl<'a> Parser<'a> {
    fn new(source: &str, config: &'a ImportConfig) -> Result<Self, ImportError> {
        Ok(Self {
            ts: TokenStream::new(source)?,
            builder: ScoreBuilder::new(),
            config,
            text_tags: Vec::new(),
            tempo: None,
            in_key_signature: false,
        })
    }

    fn parse(mut self) -> Result<ParsedScore, ImportError> {
        let header = header::headers(&mut self.ts)?;
        tracing::debug!(
            text_tags = header.text_tags.len(),
            tempo = ?header.tempo,
            "read header"
        );
        self.text_tags = header.text_tags;
        self.tempo = header.tempo;

        while let Some(token) = self.ts.eat_any()? {
            self.dispatch(token)?;
        }

        let built = self.builder.finish(self.ts.warnings_mut());
        let score = assemble(built, &self.text_tags, self.tempo, self.config);
        Ok(ParsedScore {
            score,
            warnings: self.ts.into_warnings().into_vec(),
            textboxes: self.text_tags.into_iter().map(|t| t.text).collect(),
        })
    }

    fn dispatch(&mut self, token: Token) -> Result<(), ImportError> {
        if token.kind != TokenKind::Accidental {
            self.in_key_signature = false;
        }

        let warnings = self.ts.warnings_mut();
        match token.kind {
            TokenKind::TextTag => self.text_tags.push(TextTag::from_token(&token)),
            TokenKind::TuneTempo => {
                warnings.push("Ignoring tune tempo in the middle of the tune");
            }
            TokenKind::SoftwareHeader
            | TokenKind::MidiNoteMappings
            | TokenKind::FrequencyMappings
            | TokenKind::InstrumentMappings
            | TokenKind::GracenoteDurations
            | TokenKind::FontSizes
            | TokenKind::TuneFormat => {
                warnings.push(format!("Ignoring {} in the middle of the tune", token.kind));
            }

            TokenKind::Clef => {
                self.builder.clef();
                self.in_key_signature = true;
            }
            TokenKind::PartBeginning => self.builder.part_beginning(token.group(1).is_some()),
            TokenKind::PartEnd => self.builder.part_end(token.group(1).is_some(), warnings),
            TokenKind::TerminatingBarLine => self.builder.terminating_barline(),
            TokenKind::BarLine => self.builder.barline(),
            TokenKind::TimeSignature => self.builder.time_signature(time_signature(&token)?),

            TokenKind::Accidental => self.accidental(&token)?,
            TokenKind::Fermata => warnings.push("Ignoring fermata"),
            TokenKind::Rest => warnings.push("Skipping rest"),
            TokenKind::MelodyNote => {
                let pitch = Pitch::from_code(group(&token, 1)?)?;
                let length = NoteLength::new(Duration::from_code(group(&token, 3)?)?);
                self.builder.place_note(pitch, length, warnings)?;
            }
            TokenKind::DottedNote => {
                if group(&token, 1)?.len() == 2 {
                    warnings.push("Ignoring doubled dot: replacing with a single dot");
                }
                self.builder.dot(warnings);
            }

            TokenKind::Doubling
            | TokenKind::Strike
            | TokenKind::Taorluath
            | TokenKind::Bubbly
            | TokenKind::RegularGrip
            | TokenKind::ComplexGrip
            | TokenKind::Edre
            | TokenKind::Birl
            | TokenKind::Throw
            | TokenKind::Pele
            | TokenKind::DoubleStrike
            | TokenKind::TripleStrike
            | TokenKind::DoubleGracenote
            | TokenKind::Gracenote => {
                let gracenote = embellishment::gracenote(&token, warnings)?;
                self.builder.gracenote(gracenote, warnings);
            }

            TokenKind::TieStart => self.builder.tie_start(),
            TokenKind::TieEndOrTieOldFormat => self.builder.tie_end_or_old(group(&token, 1)?)?,
            TokenKind::TripletOldFormat => self.builder.make_triplet()?,
            TokenKind::TripletNewFormat | TokenKind::IrregularGroupStart => {
                self.builder.group_start(group(&token, 1)?)?
            }
            TokenKind::IrregularGroupEnd => self.builder.group_end(group(&token, 1)?)?,

            TokenKind::TimeLineStart => self.builder.timeline_start(timing_text(&token), warnings),
            TokenKind::TimeLineEnd => self.builder.timeline_end(warnings),

            TokenKind::Space => {}
        }
        Ok(())
    }

    fn accidental(&mut self, token: &Token) -> Result<(), ImportError> {
        let kind = group(token, 1)?;
        let code = group(token, 2)?;
        let warnings = self.ts.warnings_mut();

        if self.in_key_signature {
            if !matches!(token.text(), "sharpf" | "sharpc") {
                warnings.push("Ignoring custom key signature");
            }
            return Ok(());
        }

        match kind {
            "natural" => {
                let pitch = Pitch::from_code(code).or_else(|_| Pitch::from_gracenote_code(code))?;
                self.builder.natural(pitch, warnings);
            }
            other => warnings.push(format!("Ignoring {}", other)),
        }
        Ok(())
    }
}

fn group(token: &Token, index: usize) -> Result<&str, ImportError> {
    token
        .group(index)
        .ok_or_else(|| ImportError::unrecognised("token", token.text()))
}

fn time_signature(token: &Token) -> Result<TimeSignature, ImportError> {
    if let (Some(top), Some(bottom)) = (token.group(1), token.group(2)) {
        let parse = |n: &str| {
            n.parse::<u32>()
                .map_err(|_| ImportError::unrecognised("time signature", token.text()))
        };
        TimeSignature::new(parse(top)?, parse(bottom)?)
    } else if token.group(3).is_some() {
        Ok(TimeSignature::CutTime)
    } else {
        Ok(TimeSignature::CommonTime)
    }
}

/// Bracket text for a time line: `'1` is `1.`, `'23` is `23.`, and the
/// word forms keep their word.
fn timing_text(token: &Token) -> String {
    match (token.group(1), token.group(3)) {
        (Some(first), _) => format!("{}{}.", first, token.group(2).unwrap_or_default()),
        (None, Some(word)) => word.to_string(),
        (None, None) => token.text().trim_start_matches('\'').to_string(),
    }
}

fn assemble(
    built: BuiltScore,
    text_tags: &[TextTag],
    tempo: Option<u32>,
    config: &ImportConfig,
) -> Score {
    let heading = |kind: TextTagKind, placeholder: &str, size: f64| {
        let text = text_tags
            .iter()
            .find(|t| config.use_text_tags && t.kind == kind)
            .map_or(placeholder, |t| t.text.as_str());
        StaticTextBox {
            size,
            text: text.to_string(),
            font: Font::SansSerif,
        }
    };

    let tune = Tune {
        name: heading(TextTagKind::Title, &config.placeholders.name, config.title_size),
        tune_type: heading(
            TextTagKind::TuneType,
            &config.placeholders.tune_type,
            config.text_size,
        ),
        composer: heading(
            TextTagKind::Composer,
            &config.placeholders.composer,
            config.text_size,
        ),
        staves: built.staves,
        tune_gap: config.settings.stave_gap,
    };

    let texts = text_tags
        .iter()
        .enumerate()
        .map(|(i, tag)| MovableTextBox {
            x: 0.0,
            y: i as f64 * (config.text_size + 5.0),
            size: config.text_size,
            text: tag.text.clone(),
            centred: true,
            font: Font::SansSerif,
        })
        .collect();

    let mut settings = config.settings.clone();
    if let Some(bpm) = tempo {
        settings.bpm = bpm;
    }

    Score {
        landscape: config.landscape,
        tunes: vec![tune],
        text_boxes: vec![TextBoxPage { texts }],
        second_timings: built.timings,
        show_number_of_pages: true,
        settings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gracenote, NoteOrTriplet, Timing};

    fn parse_ok(source: &str) -> ParsedScore {
        let parsed = parse(source).unwrap();
        assert!(parsed.is_complete(), "incomplete parse: {:?}", parsed.warnings);
        parsed
    }

    fn singles(parsed: &ParsedScore) -> Vec<crate::model::Note> {
        parsed
            .score
            .measures()
            .flat_map(|m| m.notes().iter())
            .filter_map(|n| match n {
                NoteOrTriplet::Single(note) => Some(note.clone()),
                NoteOrTriplet::Triplet(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse_ok("");
        assert_eq!(parsed.score.tunes.len(), 1);
        assert!(parsed.score.tunes[0].staves.is_empty());
        assert!(parsed.warnings.is_empty());
        assert!(parsed.textboxes.is_empty());
    }

    #[test]
    fn test_key_signature_is_silent_for_pipe_key() {
        let parsed = parse_ok("& sharpf sharpc 4_4 I! LA_4 B_4 C_4 D_4 !I");
        assert!(parsed.warnings.is_empty());
        let parsed = parse_ok("& sharpf sharpc flatb 4_4 I! LA_4 !I");
        assert_eq!(parsed.warnings, vec!["Ignoring custom key signature"]);
    }

    #[test]
    fn test_time_signatures() {
        let common = parse_ok("& sharpf sharpc C LA_4");
        assert_eq!(
            common.score.measures().next().unwrap().time_signature,
            TimeSignature::CommonTime
        );
        let cut = parse_ok("& sharpf sharpc C_ LA_4");
        assert_eq!(
            cut.score.measures().next().unwrap().time_signature,
            TimeSignature::CutTime
        );
        assert!(parse("& 3_16 LA_4").is_err());
    }

    #[test]
    fn test_accidentals_before_notes() {
        let parsed = parse_ok("& sharpf sharpc 4_4 I! LA_4 sharpb B_4 flatc C_4 naturalc C_4 !I");
        assert_eq!(parsed.warnings, vec!["Ignoring sharp", "Ignoring flat"]);
        let notes = singles(&parsed);
        assert!(notes[3].has_natural);
        assert!(!notes[2].has_natural);
    }

    #[test]
    fn test_embellishment_attaches_to_next_note() {
        let parsed = parse_ok("& sharpf sharpc 4_4 I! dbla LA_4 B_4 !I");
        let notes = singles(&parsed);
        assert_eq!(notes[0].gracenote, Gracenote::reactive("doubling"));
        assert_eq!(notes[1].gracenote, Gracenote::None);
    }

    #[test]
    fn test_rest_and_fermata_warn() {
        let parsed = parse_ok("& sharpf sharpc 4_4 I! LA_4 REST_4 D_4 fermatd !I");
        assert_eq!(parsed.warnings, vec!["Skipping rest", "Ignoring fermata"]);
        assert_eq!(singles(&parsed).len(), 2);
    }

    #[test]
    fn test_timing_texts() {
        let parsed = parse_ok("& 2_4 LA_4 ! '1 C_4 _' ! 'intro HA_4 _' ! '22 D_4 _'");
        let texts: Vec<String> = parsed
            .score
            .second_timings
            .iter()
            .map(|t| match t {
                Timing::Single(s) => s.text.clone(),
                Timing::Second(s) => s.second_text.clone(),
            })
            .collect();
        assert_eq!(texts, vec!["1.", "intro", "22."]);
    }

    #[test]
    fn test_mid_tune_text_tag_is_collected() {
        let parsed = parse_ok("& LA_4 \"Second part\" B_4");
        assert_eq!(parsed.textboxes, vec!["Second part"]);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_incomplete_parse_on_open_group() {
        let parsed = parse("& 2_4 ^3s C_8 E_8").unwrap();
        assert!(!parsed.is_complete());
    }
}

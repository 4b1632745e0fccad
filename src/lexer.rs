use crate::diagnostics::Warnings;
use crate::error::ImportError;
use crate::rules;
use std::fmt;

/// Token kinds of the BWW format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Headers
    SoftwareHeader,     // Bagpipe Music Writer Gold:1.0
    MidiNoteMappings,   // MIDINoteMappings,(...)
    FrequencyMappings,  // FrequencyMappings,(...)
    InstrumentMappings, // InstrumentMappings,(...)
    GracenoteDurations, // GracenoteDurations,(...)
    FontSizes,          // FontSizes,(...)
    TuneFormat,         // TuneFormat,(...)
    TuneTempo,          // TuneTempo,90
    TextTag,            // "Scotland the Brave",(T,...)

    // Structure
    Clef,               // &
    PartBeginning,      // I! or I!''
    PartEnd,            // !I or ''!I
    TerminatingBarLine, // !t
    BarLine,            // !

    // Modifiers
    Accidental, // sharpf, naturalc
    Fermata,    // fermatla

    // Notes
    MelodyNote,    // LA_4, HGr_8
    TimeSignature, // 4_4, C, C_
    Rest,          // REST_4
    DottedNote,    // 'la, ''d

    // Embellishments
    Doubling,        // dbla, hdbe, tdbc
    Strike,          // strlg, gstb, lhstd
    Taorluath,       // tar, tarb, htar
    Bubbly,          // bubly, hbubly
    RegularGrip,     // grp, hgrp, grpb
    ComplexGrip,     // ggrpdb, tgrpd
    Edre,            // edre, dare, chechere, dale
    Birl,            // brl, abr, gbr, tbr
    Throw,           // thrd, hvthrd
    Pele,            // pella, tpeld, lpeld
    DoubleStrike,    // st2la, lgst2d
    TripleStrike,    // st3la, lgst3d
    DoubleGracenote, // dlg, gla, tb
    Gracenote,       // ag, gg, tg

    // Ties and groups
    TieEndOrTieOldFormat, // ^te, ^tla
    TieStart,             // ^ts
    TripletOldFormat,     // ^3e, ^3la
    TripletNewFormat,     // ^3s
    IrregularGroupStart,  // ^2s, ^43s
    IrregularGroupEnd,    // ^2e, ^43e

    // Time lines
    TimeLineStart, // '1, '2, 'intro
    TimeLineEnd,   // _'

    Space, // space
}

impl TokenKind {
    /// Human readable name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::SoftwareHeader => "software header",
            TokenKind::MidiNoteMappings => "MIDI note mappings",
            TokenKind::FrequencyMappings => "frequency mappings",
            TokenKind::InstrumentMappings => "instrument mappings",
            TokenKind::GracenoteDurations => "gracenote durations",
            TokenKind::FontSizes => "font sizes",
            TokenKind::TuneFormat => "tune format",
            TokenKind::TuneTempo => "tune tempo",
            TokenKind::TextTag => "text tag",
            TokenKind::Clef => "clef",
            TokenKind::PartBeginning => "part beginning",
            TokenKind::PartEnd => "part end",
            TokenKind::TerminatingBarLine => "terminating bar line",
            TokenKind::BarLine => "bar line",
            TokenKind::Accidental => "accidental",
            TokenKind::Fermata => "fermata",
            TokenKind::MelodyNote => "melody note",
            TokenKind::TimeSignature => "time signature",
            TokenKind::Rest => "rest",
            TokenKind::DottedNote => "dotted note",
            TokenKind::Doubling => "doubling",
            TokenKind::Strike => "strike",
            TokenKind::Taorluath => "taorluath",
            TokenKind::Bubbly => "bubbly",
            TokenKind::RegularGrip => "grip",
            TokenKind::ComplexGrip => "complex grip",
            TokenKind::Edre => "edre",
            TokenKind::Birl => "birl",
            TokenKind::Throw => "throw",
            TokenKind::Pele => "pele",
            TokenKind::DoubleStrike => "double strike",
            TokenKind::TripleStrike => "triple strike",
            TokenKind::DoubleGracenote => "double gracenote",
            TokenKind::Gracenote => "gracenote",
            TokenKind::TieEndOrTieOldFormat => "tie",
            TokenKind::TieStart => "tie start",
            TokenKind::TripletOldFormat => "triplet",
            TokenKind::TripletNewFormat => "triplet start",
            TokenKind::IrregularGroupStart => "irregular group start",
            TokenKind::IrregularGroupEnd => "irregular group end",
            TokenKind::TimeLineStart => "time line start",
            TokenKind::TimeLineEnd => "time line end",
            TokenKind::Space => "space",
        }
    }

    /// Kinds that only appear in the header block of a file.
    pub fn is_header(self) -> bool {
        matches!(
            self,
            TokenKind::SoftwareHeader
                | TokenKind::MidiNoteMappings
                | TokenKind::FrequencyMappings
                | TokenKind::InstrumentMappings
                | TokenKind::GracenoteDurations
                | TokenKind::FontSizes
                | TokenKind::TuneFormat
                | TokenKind::TuneTempo
                | TokenKind::TextTag
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified token with its regex capture groups
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Group 0 is the full text of the token. Groups that did not take part
    /// in the match are `None`.
    pub captures: Vec<Option<String>>,
}

impl Token {
    /// Capture group `index`, if it took part in the match.
    pub fn group(&self, index: usize) -> Option<&str> {
        self.captures.get(index).and_then(|c| c.as_deref())
    }

    /// The full text of the token.
    pub fn text(&self) -> &str {
        self.group(0).unwrap_or("")
    }
}

/// Pull-based tokenizer with one token of lookahead.
///
/// The next token is always scanned ahead of time so that `is`, `peek_any`
/// and `match_kind` can look at it before deciding whether to consume it.
pub struct TokenStream {
    source: String,
    cursor: usize,
    current: Option<Token>,
    warnings: Warnings,
}

impl TokenStream {
    pub fn new(source: &str) -> Result<Self, ImportError> {
        // Trailing whitespace lets every word-bounded rule match at the end.
        let mut stream = Self {
            source: format!("{} ", source),
            cursor: 0,
            current: None,
            warnings: Warnings::new(),
        };
        stream.current = stream.next_token()?;
        Ok(stream)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    pub fn warnings_mut(&mut self) -> &mut Warnings {
        &mut self.warnings
    }

    pub fn into_warnings(self) -> Warnings {
        self.warnings
    }

    pub fn current_kind(&self) -> Option<TokenKind> {
        self.current.as_ref().map(|t| t.kind)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    pub fn is_at_end(&self) -> bool {
        self.current.is_none()
    }

    /// True if the current token is any of `kinds`. Does not consume.
    pub fn peek_any(&self, kinds: &[TokenKind]) -> bool {
        self.current_kind().map_or(false, |k| kinds.contains(&k))
    }

    /// Consume and return the current token, or `None` at end of input.
    pub fn eat_any(&mut self) -> Result<Option<Token>, ImportError> {
        let next = self.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Consume a token of `kind`, failing if the current token is anything else.
    pub fn eat(&mut self, kind: TokenKind) -> Result<Token, ImportError> {
        match self.current_kind() {
            Some(found) if found == kind => {}
            found => {
                return Err(ImportError::SyntaxError {
                    expected: kind,
                    found,
                })
            }
        }
        self.eat_any()?.ok_or(ImportError::SyntaxError {
            expected: kind,
            found: None,
        })
    }

    /// Consume the current token if it is of `kind`.
    pub fn match_token(&mut self, kind: TokenKind) -> Result<Option<Token>, ImportError> {
        if self.is(kind) {
            self.eat_any()
        } else {
            Ok(None)
        }
    }

    pub fn match_kind(&mut self, kind: TokenKind) -> Result<bool, ImportError> {
        Ok(self.match_token(kind)?.is_some())
    }

    /// Consume the current token if it is any of `kinds`.
    pub fn match_any(&mut self, kinds: &[TokenKind]) -> Result<bool, ImportError> {
        if self.peek_any(kinds) {
            self.eat_any()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Skip whitespace, byte-order marks and `space` words.
    fn skip_whitespace(&mut self) {
        loop {
            let rest = &self.source[self.cursor..];
            let trimmed =
                rest.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
            self.cursor += rest.len() - trimmed.len();
            if trimmed.starts_with("space") {
                self.cursor += "space".len();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, ImportError> {
        self.skip_whitespace();

        if self.cursor >= self.source.len() {
            return Ok(None);
        }

        let slice = &self.source[self.cursor..];
        match rules::first_match(slice) {
            Some((kind, m)) => {
                tracing::trace!(kind = %kind, text = ?m.captures[0], "token");
                self.cursor += m.len;
                Ok(Some(Token {
                    kind,
                    captures: m.captures,
                }))
            }
            None => {
                let word = slice.split_whitespace().next().unwrap_or("[nothing]");
                let (line, column) = self.position();
                Err(ImportError::LexError {
                    line,
                    column,
                    word: word.to_string(),
                })
            }
        }
    }

    /// 1-based line and column of the cursor.
    fn position(&self) -> (usize, usize) {
        let before = &self.source[..self.cursor];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}

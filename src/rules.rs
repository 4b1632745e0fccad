//! Token Rule Table
//!
//! The BWW token grammar as ordered data. Rules are tried in declaration
//! order and the first pattern that matches the start of the remaining input
//! wins, so the order is part of the grammar:
//!
//! 1. headers (software, mapping tables, tune format, tempo, text tags)
//! 2. structure (clef, part begin/end, barlines)
//! 3. accidentals and fermatas
//! 4. melody notes and time signatures
//! 5. rests and dots
//! 6. embellishments, longer prefixes before shorter ones
//! 7. `^` sigils for ties, triplets and irregular groups
//! 8. time lines
//! 9. the `space` literal
//!
//! Most rules must end at a whitespace boundary so that a short code is
//! never taken from the front of a longer word. The regex engine has no
//! lookahead, so a bounded rule is compiled with a trailing `\s` that is
//! matched but not consumed.

use crate::lexer::TokenKind;
use once_cell::sync::Lazy;
use regex::Regex;

/// Whether a rule must be followed by whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Must be followed by whitespace.
    Word,
    /// May be followed by anything.
    Open,
}

use Boundary::{Open, Word};

/// Ordered (pattern, kind, boundary) rules. Patterns are implicitly anchored.
pub const TOKEN_RULES: &[(&str, TokenKind, Boundary)] = &[
    (
        r"(Bagpipe Reader|Bagpipe Music Writer Gold|Bagpipe Musicworks Gold):(\d\.\d)",
        TokenKind::SoftwareHeader,
        Open,
    ),
    (r"MIDINoteMappings,\((\d{0,2},?){27}\)", TokenKind::MidiNoteMappings, Open),
    (r"FrequencyMappings,\((\d{3},?){27}\)", TokenKind::FrequencyMappings, Open),
    (r"InstrumentMappings,\((\d{1,4},?){7}\)", TokenKind::InstrumentMappings, Open),
    (r"GracenoteDurations,\((\d{1,3},?){14}\)", TokenKind::GracenoteDurations, Open),
    (r"FontSizes,\((\d{1,3},?){5}\)", TokenKind::FontSizes, Open),
    (
        r"TuneFormat,\(\d,\d,([a-zA-Z]*),([a-zA-Z]*),\d{2,4},\d{3,4},\d{3,4},\d{3,4},([a-zA-Z]*),\d,\d\)",
        TokenKind::TuneFormat,
        Open,
    ),
    (r"TuneTempo,(\d*)", TokenKind::TuneTempo, Open),
    (
        r#""([^"]*)",\((\w),(\w),\d{1,2},\d{1,2},[^,]*,\d{1,2},\d{1,3},\d{1,3},\d,\d{1,2},\d,\d,\d\)"#,
        TokenKind::TextTag,
        Open,
    ),
    (r#""(.*?)""#, TokenKind::TextTag, Open),
    (r"&", TokenKind::Clef, Word),
    (r"I!('')?", TokenKind::PartBeginning, Word),
    (r"('')?!I", TokenKind::PartEnd, Word),
    (r"!t", TokenKind::TerminatingBarLine, Word),
    (r"!", TokenKind::BarLine, Word),
    (r"(sharp|natural|flat)(lg|la|b|c|d|e|f|g|a)", TokenKind::Accidental, Word),
    (r"fermat(lg|la|b|c|d|e|f|hg|ha)", TokenKind::Fermata, Word),
    (r"(LG|LA|[BCDEF]|HG|HA)([lr])?_(\d{1,2})", TokenKind::MelodyNote, Word),
    (r"(?:(\d{1,2})_(\d{1,2}))|(C_)|(C)", TokenKind::TimeSignature, Word),
    (r"REST_(\d{1,2})", TokenKind::Rest, Word),
    (r"('{1,2})(lg|la|[bcdef]|hg|ha)", TokenKind::DottedNote, Word),
    (r"([th]?db)((?:[lh][ga])|([bcdef]))", TokenKind::Doubling, Word),
    (r"((?:lh|lt|lg|[gth]?)str?)(lg|la|hg|ha|[bcdef])", TokenKind::Strike, Word),
    (r"(htar|tarb?)", TokenKind::Taorluath, Word),
    (r"(h?bubly)", TokenKind::Bubbly, Word),
    (r"(hgrp|grpb|grp)", TokenKind::RegularGrip, Word),
    (r"((?:[hgt])?grp?(?:db)*)(la|hg|ha|[bcdef])*", TokenKind::ComplexGrip, Word),
    (r"[gtp]?(edre|dare|chechere|dale)(?:lg|la|[bcdef])?", TokenKind::Edre, Open),
    (r"(brl|[agt]br)", TokenKind::Birl, Word),
    (r"(thrd|hvthrd|hthrd|hhvthrd)", TokenKind::Throw, Word),
    (r"(pel)(la|[bcdef])", TokenKind::Pele, Word),
    (r"([th]pel)(la|hg|[bcdef])", TokenKind::Pele, Word),
    (r"(l[th]*pel)(d)", TokenKind::Pele, Word),
    (r"(st2)(ha|hg|la|[bcdef])", TokenKind::DoubleStrike, Word),
    (r"(gst2)(la|[bcdef])", TokenKind::DoubleStrike, Word),
    (r"(tst2)(la|hg|[bcdef])", TokenKind::DoubleStrike, Word),
    (r"(hst2)(la|hg|ha|[bcdef])", TokenKind::DoubleStrike, Word),
    (r"(l[hgt]*st2)(d)", TokenKind::DoubleStrike, Word),
    (r"(st3)(ha|hg|la|[bcdef])", TokenKind::TripleStrike, Word),
    (r"(gst3)(la|[bcdef])", TokenKind::TripleStrike, Word),
    (r"(tst3)(la|hg|[bcdef])", TokenKind::TripleStrike, Word),
    (r"(hst3)(la|hg|ha|[bcdef])", TokenKind::TripleStrike, Word),
    (r"(l[hgt]*st3)(d)", TokenKind::TripleStrike, Word),
    (r"([defgt])(la|lg|hg|[bcdef])", TokenKind::DoubleGracenote, Word),
    (r"([abcdefgt])g", TokenKind::Gracenote, Word),
    // `^te` is both the end of a new-format tie and an old-format tie on E,
    // so both share one kind and the parser decides.
    (r"\^t(lg|la|hg|ha|[bcdef])", TokenKind::TieEndOrTieOldFormat, Word),
    (r"\^ts", TokenKind::TieStart, Word),
    (r"\^3(lg|la|hg|ha|[bcdef])", TokenKind::TripletOldFormat, Word),
    (r"\^(3)s", TokenKind::TripletNewFormat, Word),
    (r"\^(2|43|46|53|54|64|74|76)s", TokenKind::IrregularGroupStart, Word),
    (r"\^(2|43|46|53|54|64|74|76)e", TokenKind::IrregularGroupEnd, Word),
    (r"'(?:([12])(\d*)|(intro|si|do|bis))", TokenKind::TimeLineStart, Word),
    (r"_'", TokenKind::TimeLineEnd, Word),
    (r"space", TokenKind::Space, Open),
];

/// A compiled rule from `TOKEN_RULES`.
#[derive(Debug)]
pub struct Rule {
    pub kind: TokenKind,
    regex: Regex,
    boundary: Boundary,
}

/// A successful rule match against the start of a slice.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    /// Bytes consumed, not counting the boundary whitespace.
    pub len: usize,
    /// Capture groups; group 0 is the consumed text.
    pub captures: Vec<Option<String>>,
}

impl Rule {
    fn compile(pattern: &str, kind: TokenKind, boundary: Boundary) -> Self {
        let anchored = match boundary {
            Word => format!(r"^(?:{})\s", pattern),
            Open => format!("^(?:{})", pattern),
        };
        let regex = Regex::new(&anchored).expect("token rule patterns are valid");
        Self {
            kind,
            regex,
            boundary,
        }
    }

    /// Match this rule against the start of `slice`.
    pub fn apply(&self, slice: &str) -> Option<RuleMatch> {
        let caps = self.regex.captures(slice)?;
        let whole = caps.get(0)?.as_str();
        let len = match self.boundary {
            Word => {
                let trailing = whole.chars().next_back().map_or(0, char::len_utf8);
                whole.len() - trailing
            }
            Open => whole.len(),
        };
        // Groups never reach into the boundary whitespace, only group 0 does.
        let mut captures: Vec<Option<String>> = caps
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();
        captures[0] = Some(whole[..len].to_string());
        Some(RuleMatch { len, captures })
    }
}

/// All rules, compiled once, in table order.
pub static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    TOKEN_RULES
        .iter()
        .map(|&(pattern, kind, boundary)| Rule::compile(pattern, kind, boundary))
        .collect()
});

/// The first rule matching the start of `slice`.
pub fn first_match(slice: &str) -> Option<(TokenKind, RuleMatch)> {
    RULES
        .iter()
        .find_map(|rule| rule.apply(slice).map(|m| (rule.kind, m)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(input: &str) -> Option<TokenKind> {
        first_match(input).map(|(kind, _)| kind)
    }

    fn position(kind: TokenKind) -> usize {
        TOKEN_RULES
            .iter()
            .position(|&(_, k, _)| k == kind)
            .unwrap()
    }

    #[test]
    fn test_all_rules_compile() {
        assert_eq!(RULES.len(), TOKEN_RULES.len());
    }

    #[test]
    fn test_melody_note_is_not_shadowed() {
        assert_eq!(kind_of("LA_4 "), Some(TokenKind::MelodyNote));
        assert_eq!(kind_of("strla LA_4 "), Some(TokenKind::Strike));
    }

    #[test]
    fn test_ambiguous_pairs_keep_their_order() {
        assert!(position(TokenKind::TerminatingBarLine) < position(TokenKind::BarLine));
        assert!(position(TokenKind::PartEnd) < position(TokenKind::BarLine));
        assert!(position(TokenKind::MelodyNote) < position(TokenKind::TimeSignature));
        assert!(position(TokenKind::Strike) < position(TokenKind::DoubleGracenote));
        assert!(position(TokenKind::RegularGrip) < position(TokenKind::ComplexGrip));
        assert!(position(TokenKind::DoubleStrike) < position(TokenKind::DoubleGracenote));
        assert!(position(TokenKind::DoubleGracenote) < position(TokenKind::Gracenote));
        assert!(position(TokenKind::TieEndOrTieOldFormat) < position(TokenKind::TieStart));
        assert!(position(TokenKind::TripletOldFormat) < position(TokenKind::TripletNewFormat));
    }

    #[test]
    fn test_boundary_is_not_consumed() {
        let (kind, m) = first_match("!t\n& ").unwrap();
        assert_eq!(kind, TokenKind::TerminatingBarLine);
        assert_eq!(m.len, 2);
        assert_eq!(m.captures[0].as_deref(), Some("!t"));
    }

    #[test]
    fn test_short_code_needs_word_boundary() {
        // `!` alone must not be taken from the front of `!x`.
        assert_eq!(kind_of("!x "), None);
        assert_eq!(kind_of("! "), Some(TokenKind::BarLine));
    }

    #[test]
    fn test_grips_and_strikes() {
        assert_eq!(kind_of("grp "), Some(TokenKind::RegularGrip));
        assert_eq!(kind_of("ggrpdb "), Some(TokenKind::ComplexGrip));
        assert_eq!(kind_of("gstb "), Some(TokenKind::Strike));
        assert_eq!(kind_of("lhstd "), Some(TokenKind::Strike));
        assert_eq!(kind_of("st2la "), Some(TokenKind::DoubleStrike));
        assert_eq!(kind_of("lgst3d "), Some(TokenKind::TripleStrike));
    }

    #[test]
    fn test_sigils() {
        assert_eq!(kind_of("^te "), Some(TokenKind::TieEndOrTieOldFormat));
        assert_eq!(kind_of("^ts "), Some(TokenKind::TieStart));
        assert_eq!(kind_of("^3e "), Some(TokenKind::TripletOldFormat));
        assert_eq!(kind_of("^3s "), Some(TokenKind::TripletNewFormat));
        assert_eq!(kind_of("^43s "), Some(TokenKind::IrregularGroupStart));
        assert_eq!(kind_of("^2e "), Some(TokenKind::IrregularGroupEnd));
        assert_eq!(kind_of("'intro "), Some(TokenKind::TimeLineStart));
        assert_eq!(kind_of("_' "), Some(TokenKind::TimeLineEnd));
    }

    #[test]
    fn test_time_signatures() {
        let (kind, m) = first_match("6_8 ").unwrap();
        assert_eq!(kind, TokenKind::TimeSignature);
        assert_eq!(m.captures[1].as_deref(), Some("6"));
        assert_eq!(m.captures[2].as_deref(), Some("8"));
        let (_, cut) = first_match("C_ ").unwrap();
        assert_eq!(cut.captures[3].as_deref(), Some("C_"));
        let (_, common) = first_match("C ").unwrap();
        assert_eq!(common.captures[4].as_deref(), Some("C"));
    }

    #[test]
    fn test_full_text_tag_captures_type() {
        let (kind, m) = first_match(
            "\"March\",(Y,L,0,0,Times New Roman,12,700,255,0,18,0,0,0) ",
        )
        .unwrap();
        assert_eq!(kind, TokenKind::TextTag);
        assert_eq!(m.captures[1].as_deref(), Some("March"));
        assert_eq!(m.captures[2].as_deref(), Some("Y"));
    }
}

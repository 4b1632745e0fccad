//! Header block at the top of a BWW file.

use crate::error::ImportError;
use crate::lexer::{Token, TokenKind, TokenStream};

/// What a text tag describes, from its type letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTagKind {
    Title,
    TuneType,
    Composer,
    /// Footer text (`F`) or an untyped tag.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextTag {
    pub text: String,
    pub kind: TextTagKind,
}

impl TextTag {
    pub fn from_token(token: &Token) -> Self {
        let kind = match token.group(2) {
            Some("T") => TextTagKind::Title,
            Some("Y") => TextTagKind::TuneType,
            Some("M") => TextTagKind::Composer,
            _ => TextTagKind::Other,
        };
        Self {
            text: token.group(1).unwrap_or_default().to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub text_tags: Vec<TextTag>,
    pub tempo: Option<u32>,
}

/// Consume header tokens until the first token of the tune body.
pub fn headers(ts: &mut TokenStream) -> Result<Header, ImportError> {
    let mut header = Header::default();

    while let Some(kind) = ts.current_kind() {
        match kind {
            TokenKind::TextTag => {
                let token = ts.eat(TokenKind::TextTag)?;
                header.text_tags.push(TextTag::from_token(&token));
            }
            TokenKind::TuneTempo => {
                let token = ts.eat(TokenKind::TuneTempo)?;
                header.tempo = tempo(&token);
            }
            k if k.is_header() => {
                let token = ts.eat(k)?;
                tracing::debug!(kind = %k, text = token.text(), "skipping header");
            }
            _ => break,
        }
    }

    Ok(header)
}

/// `TuneTempo,N`, ignored unless N is a positive number.
pub fn tempo(token: &Token) -> Option<u32> {
    token
        .group(1)
        .and_then(|n| n.parse::<u32>().ok())
        .filter(|&bpm| bpm > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCOTLAND_THE_BRAVE: &str = r#"Bagpipe Reader:1.0
MIDINoteMappings,(54,56,58,59,61,63,64,66,68,56,58,60,61,63,65,66,68,70,55,57,59,60,62,64,65,67,69)
FrequencyMappings,(370,415,466,494,554,622,659,740,831,415,466,523,554,622,699,740,831,932,392,440,494,523,587,659,699,784,880)
InstrumentMappings,(71,71,45,33,1000,60,70)
GracenoteDurations,(20,40,30,50,100,200,800,1200,250,250,250,500,200)
FontSizes,(90,100,88,80,250)
TuneFormat,(1,0,F,L,500,500,500,500,P,0,0)
TuneTempo,90

"Scotland the Brave",(T,L,0,0,Times New Roman,16,700,0,0,18,0,0,0)
"March",(Y,C,0,0,Times New Roman,14,400,0,0,18,0,0,0)
"Trad.",(M,R,0,0,Times New Roman,14,400,0,0,18,0,0,0)
"Footer",(F,R,0,0,Times New Roman,10,400,0,0,18,0,0,0)

& sharpf sharpc 4_4"#;

    #[test]
    fn test_full_header_block() {
        let mut ts = TokenStream::new(SCOTLAND_THE_BRAVE).unwrap();
        let header = headers(&mut ts).unwrap();
        assert_eq!(header.tempo, Some(90));
        let texts: Vec<&str> = header.text_tags.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Scotland the Brave", "March", "Trad.", "Footer"]);
        let kinds: Vec<TextTagKind> = header.text_tags.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TextTagKind::Title,
                TextTagKind::TuneType,
                TextTagKind::Composer,
                TextTagKind::Other
            ]
        );
        assert!(ts.is(TokenKind::Clef));
    }

    #[test]
    fn test_short_text_tag_has_no_type() {
        let mut ts = TokenStream::new("\"Just a title\" &").unwrap();
        let header = headers(&mut ts).unwrap();
        assert_eq!(
            header.text_tags,
            vec![TextTag {
                text: "Just a title".to_string(),
                kind: TextTagKind::Other
            }]
        );
    }

    #[test]
    fn test_no_header() {
        let mut ts = TokenStream::new("& sharpf sharpc").unwrap();
        assert_eq!(headers(&mut ts).unwrap(), Header::default());
        assert!(ts.is(TokenKind::Clef));
    }

    #[test]
    fn test_zero_tempo_is_ignored() {
        let mut ts = TokenStream::new("TuneTempo,0 &").unwrap();
        assert_eq!(headers(&mut ts).unwrap().tempo, None);
    }
}

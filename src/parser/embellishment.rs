//! Embellishment tokens to gracenotes.
//!
//! Most BWW embellishments map onto a named reactive gracenote whose pitches
//! are worked out later from the surrounding melody. A few are stored as
//! explicit pitches, and the ones with no equivalent fall back to the
//! closest supported embellishment with a warning.

use crate::diagnostics::Warnings;
use crate::error::ImportError;
use crate::lexer::{Token, TokenKind};
use crate::model::{Gracenote, Pitch};

/// Convert an embellishment token into the gracenote for the next note.
pub fn gracenote(token: &Token, warnings: &mut Warnings) -> Result<Gracenote, ImportError> {
    let gracenote = match token.kind {
        TokenKind::Doubling => {
            if token.text() == "dbhg" {
                Gracenote::reactive("half-doubling")
            } else {
                Gracenote::reactive("doubling")
            }
        }
        TokenKind::Strike => strike(token, "str")?,
        TokenKind::Taorluath => Gracenote::reactive("toarluath"),
        TokenKind::Bubbly => Gracenote::reactive("bubbly"),
        TokenKind::RegularGrip => Gracenote::reactive("grip"),
        TokenKind::ComplexGrip => {
            warnings.push(
                "Can't deal with grips with gracenotes on them. Replacing with standard grip.",
            );
            Gracenote::reactive("grip")
        }
        TokenKind::Edre => Gracenote::reactive("edre"),
        TokenKind::Throw => Gracenote::reactive("throw-d"),
        TokenKind::Pele => pele(token, warnings),
        TokenKind::Birl => birl(token),
        TokenKind::DoubleStrike => {
            warnings.push(format!(
                "Can't deal with double strike {}: replacing with a single strike",
                token.text()
            ));
            strike(token, "st2")?
        }
        TokenKind::TripleStrike => {
            warnings.push(format!(
                "Can't deal with triple strike {}: replacing with a single strike",
                token.text()
            ));
            strike(token, "st3")?
        }
        TokenKind::Gracenote => Gracenote::Single {
            note: Pitch::from_gracenote_code(group(token, 1)?)?,
        },
        TokenKind::DoubleGracenote => Gracenote::Custom {
            pitches: vec![
                Pitch::from_gracenote_code(group(token, 1)?)?,
                Pitch::from_code(group(token, 2)?)?,
            ],
        },
        _ => return Err(ImportError::unrecognised("embellishment", token.text())),
    };
    Ok(gracenote)
}

fn group(token: &Token, index: usize) -> Result<&str, ImportError> {
    token
        .group(index)
        .ok_or_else(|| ImportError::unrecognised("embellishment", token.text()))
}

/// A strike with a prefix before `marker` is a g-strike; a bare strike is a
/// single gracenote on the struck pitch.
fn strike(token: &Token, marker: &str) -> Result<Gracenote, ImportError> {
    let head = group(token, 1)?;
    let prefix = head
        .strip_suffix(marker)
        .or_else(|| head.strip_suffix("st"))
        .unwrap_or(head);
    if prefix.is_empty() {
        Ok(Gracenote::Single {
            note: Pitch::from_code(group(token, 2)?)?,
        })
    } else {
        Ok(Gracenote::reactive("g-strike"))
    }
}

fn birl(token: &Token) -> Gracenote {
    match token.text() {
        "gbr" | "tbr" => Gracenote::reactive("g-gracenote-birl"),
        _ => Gracenote::reactive("birl"),
    }
}

fn pele(token: &Token, warnings: &mut Warnings) -> Gracenote {
    match token.group(1) {
        Some("pel" | "tpel" | "hpel" | "lpel" | "ltpel" | "lhpel") => Gracenote::reactive("shake"),
        _ => {
            warnings.push(format!(
                "Unrecognised pele {}: replacing with a shake",
                token.text()
            ));
            Gracenote::reactive("shake")
        }
    }
}

//! # Error Types
//!
//! This module defines all fatal error types for the BWW importer.
//!
//! Fatal errors abort the whole import. Recoverable problems never end up
//! here: they are collected as warnings (see `diagnostics`) and returned
//! alongside a still-valid score.
//!
//! ## Error Types
//! - `LexError` - no token rule matches the remaining input
//! - `SyntaxError` - a specific token kind was required but absent
//! - `SemanticError` - a structurally invalid request (e.g. nested triplets)
//! - `UnrecognisedCode` - an unknown pitch, note length or group code
//! - `ConfigError` - invalid YAML import configuration
//! - `Io` - reading an input or configuration file failed
//! - `Json` - writing the score as JSON failed
//!
//! ## Usage
//! ```rust
//! use bww::{import, ImportError};
//!
//! match import("& sharpf sharpc 4_4 LA_4 !t") {
//!     Ok(parsed) => println!("{} warnings", parsed.warnings.len()),
//!     Err(ImportError::LexError { line, column, word }) => {
//!         eprintln!("Unknown word {} at {}:{}", word, line, column);
//!     }
//!     Err(e) => eprintln!("Import failed: {}", e),
//! }
//! ```

use crate::lexer::TokenKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    /// No token rule matches the input at this position.
    ///
    /// # Example
    /// ```
    /// # use bww::ImportError;
    /// let err = ImportError::LexError {
    ///     line: 2,
    ///     column: 5,
    ///     word: "xyz".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Unexpected token at line 2, column 5: \"xyz\"");
    /// ```
    #[error("Unexpected token at line {line}, column {column}: \"{word}\"")]
    LexError {
        line: usize,
        column: usize,
        word: String,
    },

    /// A token of kind `expected` was required. `found` is `None` at end of input.
    #[error("Unexpected {}, expected: \"{expected}\"", describe_found(.found))]
    SyntaxError {
        expected: TokenKind,
        found: Option<TokenKind>,
    },

    /// Structurally invalid request, with the 1-based number of the measure
    /// being built when it happened.
    ///
    /// # Example
    /// ```
    /// # use bww::ImportError;
    /// let err = ImportError::SemanticError {
    ///     measure: 3,
    ///     message: "Can't nest triplets".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Semantic error at measure 3: Can't nest triplets");
    /// ```
    #[error("Semantic error at measure {measure}: {message}")]
    SemanticError { measure: usize, message: String },

    #[error("Unrecognised {what}: got \"{code}\"")]
    UnrecognisedCode { what: &'static str, code: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not write score as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn describe_found(found: &Option<TokenKind>) -> String {
    match found {
        Some(kind) => format!("token: \"{}\"", kind),
        None => "end of input".to_string(),
    }
}

impl ImportError {
    pub(crate) fn unrecognised(what: &'static str, code: &str) -> Self {
        ImportError::UnrecognisedCode {
            what,
            code: code.to_string(),
        }
    }
}

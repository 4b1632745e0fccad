pub mod api;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod rules;

pub use api::{import, import_to_json, import_with_config, to_json};
pub use config::{ImportConfig, Placeholders};
pub use diagnostics::{Warnings, INCOMPLETE_PARSE};
pub use error::*;
pub use lexer::{Token, TokenKind, TokenStream};
pub use model::*;
pub use parser::{parse, parse_with_config, ParsedScore};

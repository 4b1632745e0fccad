//! # Public API
//!
//! This module contains the main entry points for the BWW importer.
//!
//! ## Import Functions
//!
//! - [`import()`] - Import with the default configuration
//! - [`import_with_config()`] - Custom headings, sizes and settings
//! - [`import_to_json()`] - Import straight to the saved JSON format
//!
//! ## Typical Usage
//!
//! ```rust
//! use bww::import;
//!
//! let source = r#"Bagpipe Reader:1.0
//! "Scotland the Brave",(T,L,0,0,Times New Roman,16,700,0,0,18,0,0,0)
//!
//! & sharpf sharpc 4_4 I! gg LA_4 tar LAr_8 'la Bl_16 dbc Cr_8 eg LAl_8 dbc Cr_8 El_8 !I
//! "#;
//!
//! let parsed = import(source)?;
//! assert_eq!(parsed.score.tunes[0].name.text, "Scotland the Brave");
//! for warning in &parsed.warnings {
//!     eprintln!("{}", warning);
//! }
//! # Ok::<(), bww::ImportError>(())
//! ```

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::parser::{parse_with_config, ParsedScore};

/// Import a BWW tune with the default configuration.
///
/// # Pipeline
/// 1. Tokenize with the ordered rule table
/// 2. Read the header block
/// 3. Dispatch body tokens to the score builder
/// 4. Assemble the score snapshot
///
/// # Errors
/// Returns [`ImportError`] for text no rule recognises, unknown pitch or
/// length codes, and structurally invalid input such as nested triplets.
/// Everything else is reported as a warning on the result.
pub fn import(source: &str) -> Result<ParsedScore, ImportError> {
    import_with_config(source, &ImportConfig::default())
}

/// Import with custom headings, sizes and settings.
///
/// # Example
/// ```rust
/// use bww::{import_with_config, ImportConfig};
///
/// let config = ImportConfig::from_yaml("settings:\n  bpm: 100\n")?;
/// let parsed = import_with_config("& sharpf sharpc 2_4 LA_4 B_4 !t", &config)?;
/// assert_eq!(parsed.score.settings.bpm, 100);
/// # Ok::<(), bww::ImportError>(())
/// ```
pub fn import_with_config(
    source: &str,
    config: &ImportConfig,
) -> Result<ParsedScore, ImportError> {
    let parsed = parse_with_config(source, config)?;
    tracing::debug!(
        staves = parsed.score.staves().count(),
        warnings = parsed.warnings.len(),
        "import finished"
    );
    Ok(parsed)
}

/// Import and serialise `{score, warnings, textboxes}` as JSON.
pub fn import_to_json(source: &str, pretty: bool) -> Result<String, ImportError> {
    let parsed = import(source)?;
    to_json(&parsed, pretty)
}

/// Serialise any part of an import as JSON.
pub fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, ImportError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

//! # Error Types
//!
//! This module defines the public error type for the cantus analyzer.
//!
//! The determination engines themselves never fail: they always produce a
//! best-effort structure and report anomalies through the `diagnostics`
//! module. `CantusError` covers the outer surfaces around the engines,
//! where refusing the input is the right answer (malformed metadata, a
//! syllable batch that does not line up).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CantusError {
    /// Invalid metadata error.
    ///
    /// Occurs when the YAML metadata header is invalid or contains
    /// unsupported values (e.g. a mode outside 1-8).
    #[error("Invalid metadata: {0}")]
    MetadataError(String),

    /// A syllable input whose voice count differs from the score's.
    ///
    /// Every syllable must carry one note stream per voice; the voice count
    /// is fixed by the first syllable.
    #[error("Syllable {syllable} has {found} voices, expected {expected}")]
    VoiceCountMismatch {
        syllable: usize,
        expected: usize,
        found: usize,
    },
}

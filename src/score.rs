//! # Score Assembly
//!
//! This module threads determined elements and normalized text into
//! syllables, and syllables into a score.
//!
//! ## Purpose
//! The determination engines work on one voice's note stream or one
//! syllable's text at a time. Assembly is the thin layer on top: it parses
//! the YAML metadata header, runs glyph and element determination for every
//! voice of every syllable, normalizes each syllable's text and
//! translation, and collects the result into a read-only [`Score`].
//!
//! ## Metadata
//! The header is YAML, deserialized into [`RawMetadata`] and validated into
//! [`Metadata`]. The mode must be 1-8 when present.
//!
//! ## Entry Points
//! - `parse_metadata(yaml) -> Result<Metadata, CantusError>`
//! - `build_score(metadata, syllables, scheme, diagnostics) -> Result<Score, CantusError>`
//!
//! ## Related Modules
//! - `glyphs`, `elements` - Run per voice
//! - `characters` - Runs per syllable text
//! - `error` - Metadata and voice-count errors

use crate::ast::*;
use crate::characters::normalize;
use crate::diagnostics::Diagnostics;
use crate::elements::determine_elements;
use crate::error::CantusError;
use crate::glyphs::determine_glyphs;

/// Determine the full structure for one voice: notes to glyphs to elements.
pub fn process_voice(events: Vec<NoteEvent>, diags: &mut Diagnostics) -> Vec<Element> {
    let glyphs = determine_glyphs(events, diags);
    determine_elements(glyphs, diags)
}

/// Parse and validate a YAML metadata header.
pub fn parse_metadata(yaml: &str) -> Result<Metadata, CantusError> {
    let raw: RawMetadata = serde_yaml::from_str(yaml)
        .map_err(|e| CantusError::MetadataError(e.to_string()))?;

    let mode = match raw.mode.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => match s.parse::<u8>() {
            Ok(n) if (1..=8).contains(&n) => Some(Mode(n)),
            _ => {
                return Err(CantusError::MetadataError(format!(
                    "mode must be a number from 1 to 8, got '{}'",
                    s
                )))
            }
        },
    };

    Ok(Metadata {
        name: raw.name,
        office_part: raw.office_part,
        mode,
        mode_modifier: raw.mode_modifier,
        annotation: raw.annotation,
        author: raw.author,
        language: raw.language,
        transcriber: raw.transcriber,
    })
}

/// Unprocessed input for one syllable: raw text, optional translation, one
/// note stream per voice.
#[derive(Debug, Clone, Default)]
pub struct SyllableInput {
    pub text: Vec<Character>,
    pub translation: Option<Vec<Character>>,
    pub voices: Vec<Vec<NoteEvent>>,
}

/// Assemble a score: run determination for every voice of every syllable
/// and normalize every syllable's text.
///
/// The voice count is fixed by the first syllable; a syllable with a
/// different count is refused.
pub fn build_score(
    metadata: Metadata,
    syllables: Vec<SyllableInput>,
    scheme: CenteringScheme,
    diags: &mut Diagnostics,
) -> Result<Score, CantusError> {
    let expected_voices = syllables.first().map(|s| s.voices.len()).unwrap_or(0);
    let mut out = Vec::with_capacity(syllables.len());

    for (i, input) in syllables.into_iter().enumerate() {
        if input.voices.len() != expected_voices {
            return Err(CantusError::VoiceCountMismatch {
                syllable: i + 1,
                expected: expected_voices,
                found: input.voices.len(),
            });
        }

        let text = normalize(input.text, false, scheme, diags);
        // Translations sit under the staff uncentered; only the repair and
        // initial passes apply.
        let translation = input
            .translation
            .map(|t| normalize(t, true, scheme, diags));
        let voices = input
            .voices
            .into_iter()
            .map(|events| process_voice(events, diags))
            .collect();

        out.push(Syllable {
            text,
            translation,
            voices,
        });
    }

    Ok(Score {
        metadata,
        syllables: out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(letter: char) -> Pitch {
        Pitch::from_letter(letter).unwrap()
    }

    fn punctum(letter: char) -> NoteEvent {
        NoteEvent::Note(Note::new(p(letter), Shape::Punctum))
    }

    fn lits(s: &str) -> Vec<Character> {
        s.chars().map(Character::Literal).collect()
    }

    #[test]
    fn test_parse_metadata() {
        let yaml = r#"
name: Populus Sion
office-part: Introitus
mode: "7"
annotation: "VII"
"#;
        let meta = parse_metadata(yaml).unwrap();
        assert_eq!(meta.name.as_deref(), Some("Populus Sion"));
        assert_eq!(meta.office_part.as_deref(), Some("Introitus"));
        assert_eq!(meta.mode, Some(Mode(7)));
        assert_eq!(meta.author, None);
    }

    #[test]
    fn test_parse_metadata_rejects_bad_mode() {
        let err = parse_metadata("mode: \"9\"").unwrap_err();
        assert!(err.to_string().contains("mode"));
        assert!(parse_metadata("mode: \"viii\"").is_err());
    }

    #[test]
    fn test_parse_metadata_empty() {
        let meta = parse_metadata("{}").unwrap();
        assert_eq!(meta, Metadata::default());
    }

    #[test]
    fn test_build_score_single_syllable() {
        let mut diags = Diagnostics::new();
        let input = SyllableInput {
            text: lits("pot"),
            translation: None,
            voices: vec![vec![punctum('g'), punctum('i')]],
        };
        let score = build_score(
            Metadata::default(),
            vec![input],
            CenteringScheme::Latin,
            &mut diags,
        )
        .unwrap();
        assert_eq!(score.syllables.len(), 1);
        let syllable = &score.syllables[0];
        assert_eq!(syllable.voices.len(), 1);
        assert_eq!(syllable.voices[0].len(), 1);
        assert!(syllable.voices[0][0].is_neumes());
        assert!(syllable
            .text
            .contains(&Character::Begin(Style::Center)));
    }

    #[test]
    fn test_build_score_rejects_voice_mismatch() {
        let mut diags = Diagnostics::new();
        let one = SyllableInput {
            text: lits("a"),
            translation: None,
            voices: vec![vec![punctum('g')]],
        };
        let two = SyllableInput {
            text: lits("b"),
            translation: None,
            voices: vec![vec![punctum('g')], vec![punctum('h')]],
        };
        let err = build_score(
            Metadata::default(),
            vec![one, two],
            CenteringScheme::Latin,
            &mut diags,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CantusError::VoiceCountMismatch {
                syllable: 2,
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn test_translation_is_not_centered() {
        let mut diags = Diagnostics::new();
        let input = SyllableInput {
            text: lits("pot"),
            translation: Some(lits("pan")),
            voices: vec![vec![punctum('g')]],
        };
        let score = build_score(
            Metadata::default(),
            vec![input],
            CenteringScheme::Latin,
            &mut diags,
        )
        .unwrap();
        let translation = score.syllables[0].translation.as_ref().unwrap();
        assert!(!translation.contains(&Character::Begin(Style::Center)));
    }
}

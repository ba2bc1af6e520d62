//! # Character/Style Normalizer
//!
//! This module turns arbitrarily malformed nested lyric markup into a
//! well-formed, fully-closed structure, and computes the centered and
//! initial-letter regions of a syllable's text.
//!
//! ## Purpose
//! Lyric text arrives as a flat list of literal characters and style
//! begin/end markers, in whatever nesting the source happened to use.
//! Downstream writers require XML-style well-formedness: no style may close
//! before a style opened later, every marker must be paired. The normalizer
//! is tolerant of any input and always succeeds.
//!
//! ## Passes
//!
//! ### Style repair
//! A single walk with an explicit stack of open styles. Duplicate opens and
//! orphan closes are dropped. Closing a style buried under others closes
//! everything above it first and reopens it immediately after, preserving
//! well-nestedness. Verbatim and special-character blocks are opaque: their
//! contents are copied untouched and never split. Anything still open at
//! the end of the text is closed there.
//!
//! ### Centering
//! Skipped when center markers are already present or a forced center was
//! already determined. Under the Latin scheme the centered region starts at
//! the first vowel (deferred past a leading `i`/`u` that is itself followed
//! by another vowel) and runs through the following vowels, stopping at the
//! first non-vowel or at a verbatim/special-character boundary. Under the
//! English scheme the whole syllable is centered. The markers are spliced
//! in and the repair pass is run again, which yields exactly the
//! close-and-reopen discipline a region boundary inside open styles needs.
//!
//! ### Initial letter
//! Brackets the first letter with initial markers - or, when a forced
//! center or a verbatim/special-character block starts the text, that
//! entire block. Never touches centering markers, and is skipped when
//! initial markers are already present, so normalization is idempotent.
//!
//! ## Entry Point
//! `normalize(chars, center_already_forced, scheme, diagnostics) -> Vec<Character>`
//!
//! ## Related Modules
//! - `ast` - Character, Style and CenteringScheme definitions
//! - `score` - Normalizes each syllable's text and translation

use crate::ast::{CenteringScheme, Character, Style};
use crate::diagnostics::Diagnostics;

const ORIGIN: &str = "characters";

/// Vowels recognized by the Latin centering scheme.
const VOWELS: &str = "aeiouyæœàáâãäèéêëìíîïòóôõöùúûüỳý";

fn is_vowel(c: char) -> bool {
    c.to_lowercase().all(|l| VOWELS.contains(l))
}

/// Normalize a syllable's character list.
///
/// Always succeeds, however malformed the nesting of the input; anomalies
/// are reported as warnings and repaired in place. The output is
/// well-nested, fully closed, and carries one centered region and one
/// initial-letter region. Normalizing an already-normalized list is a
/// no-op.
pub fn normalize(
    chars: Vec<Character>,
    center_already_forced: bool,
    scheme: CenteringScheme,
    diags: &mut Diagnostics,
) -> Vec<Character> {
    let mut chars = repair_styles(chars, diags);

    if !center_already_forced && !has_center_markers(&chars) && !chars.is_empty() {
        if let Some((start, end)) = center_bounds(&chars, scheme, diags) {
            chars.insert(end, Character::End(Style::Center));
            chars.insert(start, Character::Begin(Style::Center));
            // Splicing may bury opens of crossed styles; one more repair
            // walk restores the close-and-reopen discipline.
            chars = repair_styles(chars, diags);
        }
    }

    determine_initial(&mut chars);
    chars
}

fn has_center_markers(chars: &[Character]) -> bool {
    chars.iter().any(|c| {
        matches!(
            c,
            Character::Begin(Style::Center) | Character::Begin(Style::ForcedCenter)
        )
    })
}

fn has_initial_markers(chars: &[Character]) -> bool {
    chars
        .iter()
        .any(|c| matches!(c, Character::Begin(Style::Initial)))
}

/// Single-walk style repair with an explicit stack of open styles.
fn repair_styles(input: Vec<Character>, diags: &mut Diagnostics) -> Vec<Character> {
    let mut out = Vec::with_capacity(input.len());
    let mut stack: Vec<Style> = Vec::new();
    let mut i = 0;

    while i < input.len() {
        match input[i] {
            Character::Literal(_) => {
                out.push(input[i]);
                i += 1;
            }
            Character::Begin(style) if style.is_atomic() => {
                // Opaque block: copy everything through the matching close.
                out.push(input[i]);
                i += 1;
                let mut closed = false;
                while i < input.len() {
                    let c = input[i];
                    out.push(c);
                    i += 1;
                    if c == Character::End(style) {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    diags.warning(ORIGIN, "unterminated opaque block, closing at end of text");
                    out.push(Character::End(style));
                }
            }
            Character::Begin(style) => {
                if stack.contains(&style) {
                    diags.warning(ORIGIN, "style opened twice, dropping the second open");
                } else {
                    stack.push(style);
                    out.push(input[i]);
                }
                i += 1;
            }
            Character::End(style) => {
                match stack.iter().rposition(|&open| open == style) {
                    Some(pos) => {
                        // Close everything above the target first, then the
                        // target, then reopen what was closed.
                        let above: Vec<Style> = stack.split_off(pos + 1);
                        for &buried in above.iter().rev() {
                            out.push(Character::End(buried));
                        }
                        out.push(Character::End(style));
                        for &buried in &above {
                            out.push(Character::Begin(buried));
                        }
                        stack.extend(above);
                        stack.remove(pos);
                    }
                    None => {
                        diags.warning(ORIGIN, "style end without a matching open, dropping");
                    }
                }
                i += 1;
            }
        }
    }

    if !stack.is_empty() {
        diags.warning(
            ORIGIN,
            format!("{} style(s) left open, closing at end of text", stack.len()),
        );
        for &style in stack.iter().rev() {
            out.push(Character::End(style));
        }
    }
    out
}

/// Index just past the matching close of the atomic block opening at `i`.
/// Only called on repaired sequences, where the close is guaranteed.
fn skip_atomic(chars: &[Character], i: usize) -> usize {
    let style = match chars[i] {
        Character::Begin(s) => s,
        _ => return i + 1,
    };
    let mut j = i + 1;
    while j < chars.len() {
        if chars[j] == Character::End(style) {
            return j + 1;
        }
        j += 1;
    }
    j
}

/// The centered region as a pair of insertion indices (begin marker goes
/// before `start`, end marker before `end`).
fn center_bounds(
    chars: &[Character],
    scheme: CenteringScheme,
    diags: &mut Diagnostics,
) -> Option<(usize, usize)> {
    match scheme {
        CenteringScheme::English => Some((0, chars.len())),
        CenteringScheme::Latin => match vowel_bounds(chars) {
            Some(bounds) => Some(bounds),
            None => {
                diags.verbose(ORIGIN, "no vowel found, centering the whole syllable");
                Some((0, chars.len()))
            }
        },
    }
}

/// Vowel-driven bounds for the Latin scheme. Atomic blocks are skipped
/// wholesale; the region never crosses into one.
fn vowel_bounds(chars: &[Character]) -> Option<(usize, usize)> {
    let mut start = None;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            Character::Begin(s) if s.is_atomic() => i = skip_atomic(chars, i),
            Character::Literal(c) if is_vowel(c) => {
                // A leading i/u followed by another vowel centers on that
                // vowel instead (qui-, iu- digraphs).
                if matches!(c.to_ascii_lowercase(), 'i' | 'u') {
                    if let Some((j, next)) = next_literal(chars, i + 1) {
                        if is_vowel(next) {
                            start = Some(j);
                            break;
                        }
                    }
                }
                start = Some(i);
                break;
            }
            _ => i += 1,
        }
    }
    let start = start?;

    let mut end = chars.len();
    let mut j = start;
    while j < chars.len() {
        match chars[j] {
            Character::Literal(c) if is_vowel(c) => j += 1,
            Character::Literal(_) => {
                end = j;
                break;
            }
            Character::Begin(s) if s.is_atomic() => {
                end = j;
                break;
            }
            _ => j += 1,
        }
    }
    Some((start, end))
}

/// The next literal at or after `i`, without entering an atomic block.
fn next_literal(chars: &[Character], i: usize) -> Option<(usize, char)> {
    let mut j = i;
    while j < chars.len() {
        match chars[j] {
            Character::Literal(c) => return Some((j, c)),
            Character::Begin(s) if s.is_atomic() => return None,
            _ => j += 1,
        }
    }
    None
}

/// Bracket the first letter (or leading forced-center/opaque block) with
/// initial markers. Never mutates centering markers already present.
fn determine_initial(chars: &mut Vec<Character>) {
    if chars.is_empty() || has_initial_markers(chars) {
        return;
    }
    match chars[0] {
        Character::Begin(style) if style.is_atomic() || style == Style::ForcedCenter => {
            let end = block_end(chars, 0, style);
            chars.insert(end, Character::End(Style::Initial));
            chars.insert(0, Character::Begin(Style::Initial));
        }
        _ => {
            let first = chars
                .iter()
                .position(|c| matches!(c, Character::Literal(_)));
            if let Some(pos) = first {
                chars.insert(pos + 1, Character::End(Style::Initial));
                chars.insert(pos, Character::Begin(Style::Initial));
            }
        }
    }
}

/// Index just past the close matching the marker at `i`.
fn block_end(chars: &[Character], i: usize, style: Style) -> usize {
    let mut j = i + 1;
    while j < chars.len() {
        if chars[j] == Character::End(style) {
            return j + 1;
        }
        j += 1;
    }
    j
}

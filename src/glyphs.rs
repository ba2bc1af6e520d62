//! # Glyph Determination Engine
//!
//! This module groups a lexed note stream into glyphs (neume shapes).
//!
//! ## Purpose
//! Glyph determination is the first stage of the analysis pipeline. Chant
//! sources never name neume shapes: the shape of a glyph follows from the
//! melodic contour of its notes. This engine walks the note stream once,
//! classifying the glyph being built after every note and deciding where
//! glyphs end.
//!
//! ## Classification Algorithm
//!
//! The engine carries three pieces of state across notes: the provisional
//! type of the glyph being built, the pitch of the most recently added note,
//! and the liquescentia accumulated so far. Each pitched note runs through
//! `classify`, a per-shape dispatch that returns the next glyph type plus an
//! end marker:
//!
//! - `NoEnd` - keep accumulating into the same glyph
//! - `EndOfCurrent` - close the glyph including this note
//! - `EndOfPrevious` - close the previous glyph, start a new one with this note
//! - `EndOfBoth` - close the previous glyph and this note's glyph
//!
//! On top of the base dispatch:
//! - the **interval guard** splits any two notes more than [`MAX_INTERVAL`]
//!   steps apart into separate glyphs,
//! - **initio debilis** closes any open glyph before its note,
//! - **deminutus/auctus** notes are glyph-final, except that a liquescent
//!   punctum inclinatum is deferred one note when the next note repeats the
//!   same shape and pitch.
//!
//! Non-pitched markers (clef changes, bars, custodes, spaces, line ends) are
//! not glyph material: they close any open glyph and come out as single
//! marker glyphs. Clef state is tracked so a custos with nothing after it
//! can still be given a pitch.
//!
//! ## Entry Point
//! `determine_glyphs(events, diagnostics) -> Vec<Glyph>`
//!
//! Never fails: anomalies are reported through the diagnostics collector and
//! handled by a documented fallback.
//!
//! ## Related Modules
//! - `ast` - Note, Glyph and GlyphType definitions
//! - `elements` - Consumes the glyph list produced here

use crate::ast::*;
use crate::diagnostics::Diagnostics;

const ORIGIN: &str = "glyphs";

/// Where the glyph being built ends relative to the classified note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndMarker {
    NoEnd,
    EndOfCurrent,
    EndOfPrevious,
    EndOfBoth,
}

/// Determine glyphs from a note event stream.
///
/// Consumes the stream; notes are handed over to the glyphs that own them.
/// The concatenation of notes across the output equals the input note
/// sequence, except for the documented compound-shape expansion (a single
/// bivirga/trivirga/distropha/tristropha note becomes 2-3 notes of the base
/// shape).
pub fn determine_glyphs(events: Vec<NoteEvent>, diags: &mut Diagnostics) -> Vec<Glyph> {
    let mut engine = GlyphEngine::new();
    for i in 0..events.len() {
        // Bounded lookahead of one note, used by the liquescentia deferral
        // and by custos pitch inference.
        match events[i].clone() {
            NoteEvent::Note(note) => {
                if note.shape.is_alteration() {
                    engine.take_alteration(note, diags);
                } else {
                    let next_note = next_pitched(&events[i + 1..]);
                    engine.take_note(note, next_note, diags);
                }
            }
            NoteEvent::Clef(clef) => engine.take_clef(clef, diags),
            NoteEvent::Bar(kind) => engine.take_marker(Glyph::Bar(kind), diags),
            NoteEvent::Custos => engine.take_custos(next_pitched(&events[i + 1..]), diags),
            NoteEvent::Space(kind) => engine.take_marker(Glyph::Space(kind), diags),
            NoteEvent::EndOfLine => engine.take_marker(Glyph::EndOfLine, diags),
        }
    }
    engine.finish(diags)
}

/// The next pitched, non-alteration note in the remaining stream.
fn next_pitched(rest: &[NoteEvent]) -> Option<&Note> {
    rest.iter().find_map(|ev| match ev {
        NoteEvent::Note(n) if !n.shape.is_alteration() => Some(n),
        _ => None,
    })
}

struct GlyphEngine {
    output: Vec<Glyph>,
    /// Classification of the glyph being built; `Undetermined` when no
    /// glyph is open.
    glyph_type: GlyphType,
    notes: Vec<Note>,
    liquescentia: Liquescentia,
    last_pitch: Option<Pitch>,
    clef: Clef,
}

impl GlyphEngine {
    fn new() -> Self {
        Self {
            output: Vec::new(),
            glyph_type: GlyphType::Undetermined,
            notes: Vec::new(),
            liquescentia: Liquescentia::none(),
            last_pitch: None,
            clef: Clef::default(),
        }
    }

    fn glyph_open(&self) -> bool {
        !self.notes.is_empty()
    }

    fn take_note(&mut self, note: Note, next_note: Option<&Note>, diags: &mut Diagnostics) {
        let (mut next_type, mut end) = if !self.glyph_open() {
            classify(GlyphType::Undetermined, note.pitch, note.pitch, note.shape)
        } else {
            let last = self.notes.last().map(|n| n.pitch).or(self.last_pitch);
            let last = last.unwrap_or(note.pitch);
            if note.pitch.interval_from(last).abs() > MAX_INTERVAL {
                diags.warning(
                    ORIGIN,
                    format!(
                        "interval from {} to {} exceeds {} steps, breaking glyph",
                        last, note.pitch, MAX_INTERVAL
                    ),
                );
                let (t, e) = classify(GlyphType::Undetermined, note.pitch, last, note.shape);
                // The break must always produce two separate glyphs.
                let e = match e {
                    EndMarker::NoEnd | EndMarker::EndOfPrevious => EndMarker::EndOfPrevious,
                    EndMarker::EndOfCurrent | EndMarker::EndOfBoth => EndMarker::EndOfBoth,
                };
                (t, e)
            } else {
                classify(self.glyph_type, note.pitch, last, note.shape)
            }
        };

        // Initio debilis closes any open glyph before its note; the note
        // then opens a fresh glyph, classified from scratch, that starts
        // debilis. It never folds into the glyph being closed.
        if note.liquescentia.initio_debilis && self.glyph_open() {
            self.close_glyph(diags);
            let (opened, opened_end) =
                classify(GlyphType::Undetermined, note.pitch, note.pitch, note.shape);
            next_type = opened;
            end = opened_end;
        }

        // Deminutus/auctus notes are glyph-final when they would otherwise
        // keep accumulating. A liquescent punctum inclinatum is deferred one
        // note when the next note repeats the same shape and pitch; a
        // classification that already ended the previous glyph is kept
        // as-is.
        if note.liquescentia.is_liquescent() && end == EndMarker::NoEnd {
            let deferred = note.shape == Shape::PunctumInclinatum
                && next_note
                    .map(|n| n.shape == Shape::PunctumInclinatum && n.pitch == note.pitch)
                    .unwrap_or(false);
            if !deferred {
                end = EndMarker::EndOfCurrent;
            }
        }

        self.last_pitch = Some(note.pitch);

        match end {
            EndMarker::NoEnd => {
                self.push_note(note, next_type);
            }
            EndMarker::EndOfCurrent => {
                self.push_note(note, next_type);
                self.close_glyph(diags);
            }
            EndMarker::EndOfPrevious => {
                self.close_glyph(diags);
                self.push_note(note, next_type);
            }
            EndMarker::EndOfBoth => {
                if note.shape.expansion().is_some() {
                    // A compound note never joins an open glyph.
                    self.close_glyph(diags);
                    self.push_note(note, next_type);
                    self.close_glyph(diags);
                } else {
                    self.push_note(note, next_type);
                    self.close_glyph(diags);
                }
            }
        }
    }

    fn push_note(&mut self, note: Note, next_type: GlyphType) {
        if self.notes.is_empty() {
            self.liquescentia.initio_debilis = note.liquescentia.initio_debilis;
        }
        // A plain note must not erase a deferred liquescentia (the
        // inclinatum-repeat case); liquescent notes are otherwise always
        // glyph-final, so last-wins and first-wins coincide.
        if note.liquescentia.is_liquescent() {
            self.liquescentia.kind = note.liquescentia.kind;
        }
        self.notes.push(note);
        self.glyph_type = next_type;
    }

    /// Detach the accumulated note run as a finished glyph.
    fn close_glyph(&mut self, diags: &mut Diagnostics) {
        if self.notes.is_empty() {
            return;
        }
        let mut notes = std::mem::take(&mut self.notes);
        let mut glyph_type = std::mem::replace(&mut self.glyph_type, GlyphType::Undetermined);
        let liquescentia = std::mem::take(&mut self.liquescentia);

        if glyph_type == GlyphType::Undetermined {
            if notes.len() > 1 {
                diags.warning(
                    ORIGIN,
                    format!("closing an unclassified run of {} notes", notes.len()),
                );
            }
            glyph_type = GlyphType::Punctum;
        }

        // A single compound note (bivirga, tristropha, ...) is rewritten as
        // 2-3 separate notes of the base shape so the final structure is
        // shape-uniform for renderers. Signs and liquescentia stay on the
        // last note only.
        if let [only] = notes.as_slice() {
            if let Some((base, count)) = only.shape.expansion() {
                let original = notes.remove(0);
                for _ in 1..count {
                    notes.push(Note::new(original.pitch, base));
                }
                notes.push(Note {
                    shape: base,
                    ..original
                });
            }
        }

        self.output.push(Glyph::Neume {
            glyph_type,
            liquescentia,
            notes,
        });
    }

    fn take_alteration(&mut self, note: Note, diags: &mut Diagnostics) {
        // Alterations never join a neume.
        self.close_glyph(diags);
        let alteration = match note.shape {
            Shape::Natural => AlterationKind::Natural,
            _ => AlterationKind::Flat,
        };
        self.output.push(Glyph::Alteration {
            alteration,
            pitch: note.pitch,
        });
    }

    fn take_clef(&mut self, clef: Clef, diags: &mut Diagnostics) {
        self.close_glyph(diags);
        self.clef = clef;
        self.last_pitch = None;
        self.output.push(Glyph::Clef(clef));
    }

    fn take_marker(&mut self, glyph: Glyph, diags: &mut Diagnostics) {
        self.close_glyph(diags);
        self.output.push(glyph);
    }

    fn take_custos(&mut self, next_note: Option<&Note>, diags: &mut Diagnostics) {
        self.close_glyph(diags);
        let pitch = match next_note {
            Some(note) => note.pitch,
            None => {
                diags.error(
                    ORIGIN,
                    "custos with no following note, using the clef position",
                );
                self.clef.pitch()
            }
        };
        self.output.push(Glyph::Custos(pitch));
    }

    fn finish(mut self, diags: &mut Diagnostics) -> Vec<Glyph> {
        self.close_glyph(diags);
        self.output
    }
}

/// The core classification step.
///
/// `current` is the provisional type of the open glyph, or `Undetermined`
/// when no glyph is open; `last` is the pitch of the most recently added
/// note (ignored when nothing is open).
fn classify(current: GlyphType, pitch: Pitch, last: Pitch, shape: Shape) -> (GlyphType, EndMarker) {
    use EndMarker::*;
    use GlyphType::*;

    if current == Undetermined {
        return open_glyph(shape);
    }
    let step = pitch.interval_from(last);

    match shape {
        s if s.is_punctum_like() => match current {
            Punctum => {
                if step > 0 {
                    (Podatus, NoEnd)
                } else if step < 0 {
                    (Flexa, NoEnd)
                } else {
                    // A repeated note never shares a punctum glyph.
                    (Punctum, EndOfPrevious)
                }
            }
            Podatus => {
                if step > 0 {
                    // A scandicus never grows past three notes.
                    (Scandicus, EndOfCurrent)
                } else if step < 0 {
                    (Torculus, NoEnd)
                } else {
                    (Punctum, EndOfPrevious)
                }
            }
            Flexa => {
                if step > 0 {
                    (Porrectus, NoEnd)
                } else if step < 0 {
                    (Ancus, EndOfCurrent)
                } else {
                    (Punctum, EndOfPrevious)
                }
            }
            Torculus => {
                if step > 0 {
                    (TorculusResupinus, NoEnd)
                } else {
                    (Punctum, EndOfPrevious)
                }
            }
            TorculusResupinus => {
                if step < 0 {
                    (TorculusResupinusFlexus, EndOfCurrent)
                } else {
                    (Punctum, EndOfPrevious)
                }
            }
            Porrectus => {
                if step < 0 {
                    (PorrectusFlexus, EndOfCurrent)
                } else {
                    (Punctum, EndOfPrevious)
                }
            }
            Salicus => {
                if step > 0 {
                    (Salicus, EndOfCurrent)
                } else if step < 0 {
                    (SalicusFlexus, EndOfCurrent)
                } else {
                    (Punctum, EndOfPrevious)
                }
            }
            _ => (Punctum, EndOfPrevious),
        },
        Shape::PunctumInclinatum => match current {
            PunctumInclinatum => {
                if step > 0 {
                    (TwoPunctaInclinataAscendens, NoEnd)
                } else {
                    (TwoPunctaInclinataDescendens, NoEnd)
                }
            }
            TwoPunctaInclinataDescendens if step <= 0 => (ThreePunctaInclinataDescendens, NoEnd),
            ThreePunctaInclinataDescendens if step <= 0 => (FourPunctaInclinataDescendens, NoEnd),
            FourPunctaInclinataDescendens if step <= 0 => (FivePunctaInclinataDescendens, NoEnd),
            // Past five notes in one direction the run falls back to the
            // generic classification.
            FivePunctaInclinataDescendens if step <= 0 => (PunctaInclinata, NoEnd),
            TwoPunctaInclinataAscendens if step >= 0 => (ThreePunctaInclinataAscendens, NoEnd),
            ThreePunctaInclinataAscendens if step >= 0 => (FourPunctaInclinataAscendens, NoEnd),
            FourPunctaInclinataAscendens if step >= 0 => (FivePunctaInclinataAscendens, NoEnd),
            FivePunctaInclinataAscendens if step >= 0 => (PunctaInclinata, NoEnd),
            PunctaInclinata => (PunctaInclinata, NoEnd),
            _ => (PunctumInclinatum, EndOfPrevious),
        },
        Shape::Virga => match current {
            Virga if step == 0 => (Bivirga, NoEnd),
            Bivirga if step == 0 => (Trivirga, EndOfBoth),
            _ => (Virga, EndOfPrevious),
        },
        Shape::Stropha => match current {
            Stropha if step == 0 => (Distropha, NoEnd),
            Distropha if step == 0 => (Tristropha, EndOfBoth),
            _ => (Stropha, EndOfPrevious),
        },
        Shape::Oriscus => match current {
            Punctum if step > 0 => (Salicus, NoEnd),
            _ => (Punctum, EndOfPrevious),
        },
        Shape::Bivirga => (Bivirga, EndOfBoth),
        Shape::Trivirga => (Trivirga, EndOfBoth),
        Shape::Distropha => (Distropha, EndOfBoth),
        Shape::Tristropha => (Tristropha, EndOfBoth),
        // Alterations are lifted out before classification.
        Shape::Flat | Shape::Natural => (Punctum, EndOfBoth),
        _ => (Punctum, EndOfPrevious),
    }
}

/// Classification for a note opening a fresh glyph.
fn open_glyph(shape: Shape) -> (GlyphType, EndMarker) {
    use EndMarker::*;
    use GlyphType::*;
    match shape {
        Shape::PunctumInclinatum => (PunctumInclinatum, NoEnd),
        Shape::Virga => (Virga, NoEnd),
        Shape::Stropha => (Stropha, NoEnd),
        Shape::Bivirga => (Bivirga, EndOfBoth),
        Shape::Trivirga => (Trivirga, EndOfBoth),
        Shape::Distropha => (Distropha, EndOfBoth),
        Shape::Tristropha => (Tristropha, EndOfBoth),
        _ => (Punctum, NoEnd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::LiquescentiaKind::{AuctusDescendens, Deminutus};

    fn p(letter: char) -> Pitch {
        Pitch::from_letter(letter).unwrap()
    }

    fn note(letter: char, shape: Shape) -> NoteEvent {
        NoteEvent::Note(Note::new(p(letter), shape))
    }

    fn punctum(letter: char) -> NoteEvent {
        note(letter, Shape::Punctum)
    }

    fn liquescent(letter: char, shape: Shape, kind: LiquescentiaKind) -> NoteEvent {
        NoteEvent::Note(Note::new(p(letter), shape).with_liquescentia(Liquescentia::new(kind)))
    }

    fn run(events: Vec<NoteEvent>) -> (Vec<Glyph>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let glyphs = determine_glyphs(events, &mut diags);
        (glyphs, diags)
    }

    fn neume_types(glyphs: &[Glyph]) -> Vec<GlyphType> {
        glyphs
            .iter()
            .filter_map(|g| match g {
                Glyph::Neume { glyph_type, .. } => Some(*glyph_type),
                _ => None,
            })
            .collect()
    }

    fn note_count(glyphs: &[Glyph]) -> usize {
        glyphs
            .iter()
            .map(|g| match g {
                Glyph::Neume { notes, .. } => notes.len(),
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_single_punctum() {
        let (glyphs, diags) = run(vec![punctum('g')]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::Punctum]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_ascending_pair_is_podatus() {
        let (glyphs, _) = run(vec![punctum('g'), punctum('i')]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::Podatus]);
        assert_eq!(note_count(&glyphs), 2);
    }

    #[test]
    fn test_descending_pair_is_flexa() {
        let (glyphs, _) = run(vec![punctum('i'), punctum('g')]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::Flexa]);
    }

    #[test]
    fn test_repeated_punctum_splits() {
        let (glyphs, _) = run(vec![punctum('g'), punctum('g')]);
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::Punctum, GlyphType::Punctum]
        );
    }

    #[test]
    fn test_interval_guard_splits_wide_podatus() {
        // g to m is 6 steps, one more than the maximum.
        let (glyphs, diags) = run(vec![punctum('g'), punctum('m')]);
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::Punctum, GlyphType::Punctum]
        );
        assert!(diags.has_warnings());
    }

    #[test]
    fn test_widest_allowed_podatus() {
        // g to l is exactly 5 steps.
        let (glyphs, diags) = run(vec![punctum('g'), punctum('l')]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::Podatus]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_torculus() {
        let (glyphs, _) = run(vec![punctum('g'), punctum('i'), punctum('g')]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::Torculus]);
        assert_eq!(note_count(&glyphs), 3);
    }

    #[test]
    fn test_scandicus_closes_at_three() {
        let (glyphs, _) = run(vec![punctum('g'), punctum('h'), punctum('i'), punctum('j')]);
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::Scandicus, GlyphType::Punctum]
        );
    }

    #[test]
    fn test_porrectus_and_flexus() {
        let (glyphs, _) = run(vec![punctum('i'), punctum('g'), punctum('i')]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::Porrectus]);

        let (glyphs, _) = run(vec![punctum('i'), punctum('g'), punctum('i'), punctum('g')]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::PorrectusFlexus]);
        assert_eq!(note_count(&glyphs), 4);
    }

    #[test]
    fn test_torculus_resupinus_ladder() {
        let (glyphs, _) = run(vec![punctum('g'), punctum('i'), punctum('g'), punctum('i')]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::TorculusResupinus]);

        let (glyphs, _) = run(vec![
            punctum('g'),
            punctum('i'),
            punctum('g'),
            punctum('i'),
            punctum('g'),
        ]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::TorculusResupinusFlexus]);
    }

    #[test]
    fn test_ancus_closes_immediately() {
        let (glyphs, _) = run(vec![punctum('i'), punctum('g'), punctum('e'), punctum('g')]);
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::Ancus, GlyphType::Punctum]
        );
    }

    #[test]
    fn test_salicus_from_oriscus() {
        let (glyphs, _) = run(vec![
            punctum('g'),
            note('h', Shape::Oriscus),
            punctum('j'),
        ]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::Salicus]);
        assert_eq!(note_count(&glyphs), 3);

        let (glyphs, _) = run(vec![
            punctum('g'),
            note('h', Shape::Oriscus),
            punctum('f'),
        ]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::SalicusFlexus]);
    }

    #[test]
    fn test_lone_oriscus_opens_and_grows_by_contour() {
        let (glyphs, _) = run(vec![note('g', Shape::Oriscus)]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::Punctum]);

        // Oriscus then a higher note is a pes quassus: a podatus whose
        // first note keeps the oriscus shape.
        let (glyphs, _) = run(vec![note('g', Shape::Oriscus), punctum('i')]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::Podatus]);
        match &glyphs[0] {
            Glyph::Neume { notes, .. } => {
                assert_eq!(notes[0].shape, Shape::Oriscus);
                assert_eq!(notes[1].shape, Shape::Punctum);
            }
            other => panic!("expected a neume glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_trivirga_accumulation() {
        let (glyphs, _) = run(vec![
            note('g', Shape::Virga),
            note('g', Shape::Virga),
            note('g', Shape::Virga),
        ]);
        assert_eq!(glyphs.len(), 1);
        match &glyphs[0] {
            Glyph::Neume {
                glyph_type, notes, ..
            } => {
                assert_eq!(*glyph_type, GlyphType::Trivirga);
                assert_eq!(notes.len(), 3);
                assert!(notes.iter().all(|n| n.shape == Shape::Virga));
            }
            other => panic!("expected a neume glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_note_after_trivirga_starts_fresh() {
        let (glyphs, _) = run(vec![
            note('g', Shape::Virga),
            note('g', Shape::Virga),
            note('g', Shape::Virga),
            note('g', Shape::Virga),
        ]);
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::Trivirga, GlyphType::Virga]
        );
    }

    #[test]
    fn test_distropha_accumulation() {
        let (glyphs, _) = run(vec![note('g', Shape::Stropha), note('g', Shape::Stropha)]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::Distropha]);
    }

    #[test]
    fn test_compound_bivirga_expands() {
        let signs = Signs {
            mora: true,
            ..Signs::none()
        };
        let ev = NoteEvent::Note(Note::new(p('g'), Shape::Bivirga).with_signs(signs));
        let (glyphs, _) = run(vec![ev]);
        assert_eq!(glyphs.len(), 1);
        match &glyphs[0] {
            Glyph::Neume {
                glyph_type, notes, ..
            } => {
                assert_eq!(*glyph_type, GlyphType::Bivirga);
                assert_eq!(notes.len(), 2);
                assert!(notes.iter().all(|n| n.shape == Shape::Virga));
                assert!(notes.iter().all(|n| n.pitch == p('g')));
                // Signs survive only on the last note.
                assert!(!notes[0].signs.mora);
                assert!(notes[1].signs.mora);
            }
            other => panic!("expected a neume glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_compound_never_joins_open_glyph() {
        let (glyphs, _) = run(vec![
            punctum('g'),
            punctum('i'),
            NoteEvent::Note(Note::new(p('i'), Shape::Tristropha)),
            punctum('g'),
        ]);
        assert_eq!(
            neume_types(&glyphs),
            vec![
                GlyphType::Podatus,
                GlyphType::Tristropha,
                GlyphType::Punctum
            ]
        );
        // 2 podatus notes + 3 expanded strophae + 1 punctum.
        assert_eq!(note_count(&glyphs), 6);
    }

    #[test]
    fn test_inclinata_descending_ladder() {
        let (glyphs, _) = run(vec![
            note('j', Shape::PunctumInclinatum),
            note('i', Shape::PunctumInclinatum),
            note('g', Shape::PunctumInclinatum),
        ]);
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::ThreePunctaInclinataDescendens]
        );
    }

    #[test]
    fn test_inclinata_run_past_five_goes_generic() {
        let letters = ['m', 'l', 'k', 'j', 'i', 'h', 'g'];
        let events: Vec<_> = letters
            .iter()
            .map(|&l| note(l, Shape::PunctumInclinatum))
            .collect();
        let (glyphs, _) = run(events);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::PunctaInclinata]);
        assert_eq!(note_count(&glyphs), 7);
    }

    #[test]
    fn test_inclinata_direction_change_splits() {
        let (glyphs, _) = run(vec![
            note('j', Shape::PunctumInclinatum),
            note('h', Shape::PunctumInclinatum),
            note('j', Shape::PunctumInclinatum),
        ]);
        assert_eq!(
            neume_types(&glyphs),
            vec![
                GlyphType::TwoPunctaInclinataDescendens,
                GlyphType::PunctumInclinatum
            ]
        );
    }

    #[test]
    fn test_liquescent_note_is_glyph_final() {
        let (glyphs, _) = run(vec![
            punctum('g'),
            liquescent('i', Shape::Punctum, AuctusDescendens),
            punctum('i'),
        ]);
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::Podatus, GlyphType::Punctum]
        );
        match &glyphs[0] {
            Glyph::Neume { liquescentia, .. } => {
                assert_eq!(liquescentia.kind, AuctusDescendens);
            }
            other => panic!("expected a neume glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_initio_debilis_breaks_before() {
        let deb = Note::new(p('h'), Shape::Punctum)
            .with_liquescentia(Liquescentia::initio_debilis());
        let (glyphs, _) = run(vec![punctum('g'), NoteEvent::Note(deb), punctum('i')]);
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::Punctum, GlyphType::Podatus]
        );
        match &glyphs[1] {
            Glyph::Neume { liquescentia, .. } => assert!(liquescentia.initio_debilis),
            other => panic!("expected a neume glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_initio_debilis_never_joins_open_glyph() {
        // An ascending debilis note would otherwise read as a scandicus
        // continuation; the break before it must win.
        let deb = Note::new(p('i'), Shape::Punctum)
            .with_liquescentia(Liquescentia::initio_debilis());
        let (glyphs, _) = run(vec![punctum('g'), punctum('h'), NoteEvent::Note(deb)]);
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::Podatus, GlyphType::Punctum]
        );
        match &glyphs[1] {
            Glyph::Neume {
                liquescentia,
                notes,
                ..
            } => {
                assert!(liquescentia.initio_debilis);
                assert_eq!(notes.len(), 1);
            }
            other => panic!("expected a neume glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_inclinatum_deminutus_deferred_by_repeat() {
        // The liquescent inclinatum stays open because the next note
        // repeats its shape and pitch.
        let (glyphs, _) = run(vec![
            liquescent('g', Shape::PunctumInclinatum, Deminutus),
            note('g', Shape::PunctumInclinatum),
        ]);
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::TwoPunctaInclinataDescendens]
        );
        assert_eq!(note_count(&glyphs), 2);
        match &glyphs[0] {
            Glyph::Neume { liquescentia, .. } => assert_eq!(liquescentia.kind, Deminutus),
            other => panic!("expected a neume glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_inclinatum_deminutus_not_deferred_without_repeat() {
        let (glyphs, _) = run(vec![
            liquescent('g', Shape::PunctumInclinatum, Deminutus),
            note('e', Shape::PunctumInclinatum),
        ]);
        assert_eq!(
            neume_types(&glyphs),
            vec![
                GlyphType::PunctumInclinatum,
                GlyphType::PunctumInclinatum
            ]
        );
    }

    #[test]
    fn test_inclinatum_deminutus_not_deferred_after_direction_break() {
        // The third note already ends the previous glyph; the liquescentia
        // escalation applies only to notes that would keep accumulating, so
        // the new glyph stays open and takes the fourth note.
        let (glyphs, _) = run(vec![
            note('i', Shape::PunctumInclinatum),
            note('g', Shape::PunctumInclinatum),
            liquescent('i', Shape::PunctumInclinatum, Deminutus),
            note('i', Shape::PunctumInclinatum),
        ]);
        assert_eq!(
            neume_types(&glyphs),
            vec![
                GlyphType::TwoPunctaInclinataDescendens,
                GlyphType::TwoPunctaInclinataDescendens
            ]
        );
    }

    #[test]
    fn test_clef_change_lifts_marker() {
        let clef = Clef {
            kind: ClefKind::F,
            line: 3,
            flat: None,
        };
        let (glyphs, _) = run(vec![punctum('g'), NoteEvent::Clef(clef), punctum('g')]);
        assert_eq!(glyphs.len(), 3);
        assert_eq!(glyphs[1], Glyph::Clef(clef));
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::Punctum, GlyphType::Punctum]
        );
    }

    #[test]
    fn test_bar_closes_open_glyph() {
        let (glyphs, _) = run(vec![
            punctum('g'),
            punctum('i'),
            NoteEvent::Bar(BarKind::DivisioMinima),
        ]);
        assert_eq!(neume_types(&glyphs), vec![GlyphType::Podatus]);
        assert_eq!(glyphs[1], Glyph::Bar(BarKind::DivisioMinima));
    }

    #[test]
    fn test_space_closes_open_glyph() {
        let (glyphs, _) = run(vec![
            punctum('g'),
            NoteEvent::Space(SpaceKind::NeumaticCut),
            punctum('i'),
        ]);
        assert_eq!(
            neume_types(&glyphs),
            vec![GlyphType::Punctum, GlyphType::Punctum]
        );
        assert_eq!(glyphs[1], Glyph::Space(SpaceKind::NeumaticCut));
    }

    #[test]
    fn test_custos_takes_next_note_pitch() {
        let (glyphs, diags) = run(vec![
            punctum('g'),
            NoteEvent::Custos,
            NoteEvent::EndOfLine,
            punctum('j'),
        ]);
        assert_eq!(glyphs[1], Glyph::Custos(p('j')));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_custos_without_following_note_falls_back_to_clef() {
        let (glyphs, diags) = run(vec![punctum('g'), NoteEvent::Custos]);
        // Default clef is c3, which sits at h.
        assert_eq!(glyphs[1], Glyph::Custos(p('h')));
        assert_eq!(
            diags.max_severity(),
            Some(crate::diagnostics::Severity::Error)
        );
    }

    #[test]
    fn test_alteration_lifts_out() {
        let (glyphs, _) = run(vec![
            punctum('g'),
            note('i', Shape::Flat),
            punctum('i'),
        ]);
        assert_eq!(glyphs.len(), 3);
        assert_eq!(
            glyphs[1],
            Glyph::Alteration {
                alteration: AlterationKind::Flat,
                pitch: p('i')
            }
        );
    }

    #[test]
    fn test_note_conservation() {
        let events = vec![
            punctum('g'),
            punctum('i'),
            punctum('g'),
            NoteEvent::Bar(BarKind::Virgula),
            note('h', Shape::Virga),
            punctum('f'),
            punctum('e'),
            NoteEvent::Space(SpaceKind::NeumaticCut),
            punctum('g'),
        ];
        let pitched = 7;
        let (glyphs, _) = run(events);
        assert_eq!(note_count(&glyphs), pitched);
    }
}

//! # Element Determination Engine
//!
//! This module groups a determined glyph list into elements.
//!
//! ## Purpose
//! An element is a run of glyphs between structural breaks: clef changes,
//! bars, line ends and explicit spaces. The engine walks the glyph list
//! once, deciding before each glyph whether to cut (close the element being
//! built and start a new one).
//!
//! ## Cut Rules
//! - Every non-neume glyph except a zero-width space cuts. Marker glyphs
//!   (clef, bar, custos, line end, non-neumatic spaces) then become single
//!   marker elements.
//! - A neumatic-cut space is the implicit inter-element separator: it cuts
//!   but is consumed rather than emitted.
//! - A zero-width space is an invisible join: it suppresses the immediately
//!   following cut decision.
//! - Flats and naturals merge into the surrounding element; they make no
//!   cut decision, so latch and join state pass through them.
//! - Ascending/descending runs of puncta inclinata use a `do_not_cut`
//!   latch: the first ascending-oblique glyph of a run cuts before itself
//!   and sets the latch, oblique glyphs inside the run never cut, and any
//!   other glyph clears the latch.
//! - A one-note virga/stropha glyph repeating the prior glyph's final pitch
//!   folds into the element being built, leaving the latch untouched.
//!
//! The last element is closed at end of input regardless of latch state.
//!
//! ## Entry Point
//! `determine_elements(glyphs, diagnostics) -> Vec<Element>`
//!
//! ## Related Modules
//! - `glyphs` - Produces the glyph list consumed here
//! - `score` - Threads the element lists into syllables

use crate::ast::*;
use crate::diagnostics::Diagnostics;

/// Determine elements from a glyph list.
///
/// Consumes the list; glyphs are handed over to the elements that own them.
pub fn determine_elements(glyphs: Vec<Glyph>, _diags: &mut Diagnostics) -> Vec<Element> {
    let mut engine = ElementEngine::new();
    for glyph in glyphs {
        engine.take_glyph(glyph);
    }
    engine.finish()
}

struct ElementEngine {
    output: Vec<Element>,
    current: Vec<Glyph>,
    /// Latch set by the first ascending-oblique glyph of a run.
    do_not_cut: bool,
    /// Set by a zero-width space; eats the next cut decision.
    suppress_cut: bool,
    /// Final pitch of the last neume glyph taken, for the stropha/virga
    /// folding rule.
    last_pitch: Option<Pitch>,
}

impl ElementEngine {
    fn new() -> Self {
        Self {
            output: Vec::new(),
            current: Vec::new(),
            do_not_cut: false,
            suppress_cut: false,
            last_pitch: None,
        }
    }

    fn take_glyph(&mut self, glyph: Glyph) {
        match glyph {
            Glyph::Neume { .. } => self.take_neume(glyph),
            Glyph::Alteration { .. } => {
                // Merged into the surrounding element; no cut decision is
                // made, so both the oblique latch and a pending zero-width
                // suppression pass through untouched.
                self.current.push(glyph);
            }
            Glyph::Space(SpaceKind::NeumaticCut) => {
                if self.suppress_cut {
                    self.suppress_cut = false;
                } else {
                    self.close_element();
                }
                self.do_not_cut = false;
            }
            Glyph::Space(SpaceKind::ZeroWidth) => {
                self.suppress_cut = true;
            }
            Glyph::Space(kind) => self.take_marker(Element::Space(kind)),
            Glyph::Clef(clef) => self.take_marker(Element::Clef(clef)),
            Glyph::Bar(kind) => self.take_marker(Element::Bar(kind)),
            Glyph::Custos(pitch) => self.take_marker(Element::Custos(pitch)),
            Glyph::EndOfLine => self.take_marker(Element::EndOfLine),
        }
    }

    fn take_neume(&mut self, glyph: Glyph) {
        let glyph_type = match &glyph {
            Glyph::Neume { glyph_type, .. } => *glyph_type,
            _ => unreachable!(),
        };

        let mut cut = false;
        if self.is_repeat_fold(&glyph) {
            // Folded without cutting, latch untouched.
        } else if glyph_type.is_inclinata_ascendens() {
            if !self.do_not_cut {
                cut = true;
                self.do_not_cut = true;
            }
        } else if glyph_type.is_inclinata() {
            // Oblique glyphs inside a run never cut; the latch survives.
        } else {
            self.do_not_cut = false;
        }

        if self.suppress_cut {
            cut = false;
        }
        self.suppress_cut = false;

        if cut {
            self.close_element();
        }
        self.last_pitch = glyph.final_pitch();
        self.current.push(glyph);
    }

    /// One-note virga/stropha glyphs repeating the prior final pitch fold
    /// into the element being built.
    fn is_repeat_fold(&self, glyph: &Glyph) -> bool {
        let notes = match glyph {
            Glyph::Neume { notes, .. } => notes,
            _ => return false,
        };
        notes.len() == 1
            && matches!(notes[0].shape, Shape::Virga | Shape::Stropha)
            && self.last_pitch == Some(notes[0].pitch)
    }

    fn take_marker(&mut self, element: Element) {
        self.close_element();
        self.output.push(element);
        self.suppress_cut = false;
        self.do_not_cut = false;
        self.last_pitch = None;
    }

    fn close_element(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let glyphs = std::mem::take(&mut self.current);
        self.output.push(Element::Neumes(glyphs));
    }

    fn finish(mut self) -> Vec<Element> {
        self.close_element();
        self.output
    }
}

//! # Data Model Types
//!
//! This module defines all type structures for the cantus chant analyzer.
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   ├── Metadata (name, office part, mode, annotation, ...)
//!   └── Vec<Syllable>
//!         ├── text: Vec<Character> (normalized)
//!         ├── translation: Option<Vec<Character>>
//!         └── voices: Vec<Vec<Element>>
//!
//! Element (enum)
//!   ├── Neumes(Vec<Glyph>)
//!   └── Clef | Bar | Custos | Space | EndOfLine  (marker elements)
//!
//! Glyph (enum)
//!   ├── Neume { glyph_type, liquescentia, notes: Vec<Note> }
//!   └── Clef | Bar | Custos | Space | EndOfLine | Alteration  (marker glyphs)
//!
//! Note
//!   ├── pitch: Pitch (staff letter a..m)
//!   ├── shape: Shape (punctum, virga, quilisma, ...)
//!   ├── liquescentia: Liquescentia (deminutus/auctus + initio debilis)
//!   └── signs: Signs (mora, episema, ictus, rare signs)
//! ```
//!
//! ## Key Concepts
//!
//! ### Pitch
//! A staff position written as a letter `a` through `m`, thirteen positions
//! covering the four-line staff plus ledger space on both sides. Intervals
//! are diatonic step counts between letters; glyph determination never joins
//! notes more than [`MAX_INTERVAL`] steps apart.
//!
//! ### Glyph
//! A neume: one visual shape owning a contiguous run of notes. The glyph
//! type (podatus, torculus, porrectus, ...) is determined from the melodic
//! contour of the run, never given in the input.
//!
//! ### Element
//! A run of glyphs between structural breaks (clef changes, bars, line ends,
//! explicit spaces). Marker events from the note stream are lifted first
//! into single marker glyphs and then into marker elements.
//!
//! ### Liquescentia
//! Ornamental note modifiers. Deminutus and the two auctus forms always end
//! the glyph they appear in; initio debilis ("weak beginning") forces a
//! glyph break *before* its note and marks the new glyph. The two concerns
//! combine freely, so they are kept as separate fields.
//!
//! ## Related Modules
//! - `glyphs` - Builds `Glyph` runs from `NoteEvent` streams
//! - `elements` - Builds `Element` runs from glyph lists
//! - `characters` - Normalizes `Character` lists (styles, centering)
//! - `score` - Threads everything into `Syllable` and `Score`

use serde::Deserialize;
use std::fmt;

/// Maximum interval, in diatonic steps, that two notes of one glyph may span.
pub const MAX_INTERVAL: i8 = 5;

/// A staff position, stored as an index into the letters `a` through `m`.
///
/// Letter `a` is the lowest writable position; the four staff lines sit at
/// `d`, `f`, `h` and `j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pitch(u8);

impl Pitch {
    pub const LOWEST_LETTER: char = 'a';
    pub const HIGHEST_LETTER: char = 'm';

    /// Build a pitch from its staff letter. Returns `None` for anything
    /// outside `a..=m`.
    pub fn from_letter(letter: char) -> Option<Self> {
        let letter = letter.to_ascii_lowercase();
        if (Self::LOWEST_LETTER..=Self::HIGHEST_LETTER).contains(&letter) {
            Some(Pitch(letter as u8 - Self::LOWEST_LETTER as u8))
        } else {
            None
        }
    }

    /// The staff letter for this pitch.
    pub fn letter(&self) -> char {
        (Self::LOWEST_LETTER as u8 + self.0) as char
    }

    /// Signed diatonic distance from `other` to `self` (positive = higher).
    pub fn interval_from(&self, other: Pitch) -> i8 {
        self.0 as i8 - other.0 as i8
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Clef kind: the C ("do") or F ("fa") clef.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClefKind {
    #[default]
    C,
    F,
}

/// A clef: kind, staff line (1 = bottom), and an optional flat carried with
/// the clef change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clef {
    pub kind: ClefKind,
    pub line: u8,
    pub flat: Option<Pitch>,
}

impl Default for Clef {
    fn default() -> Self {
        Self {
            kind: ClefKind::C,
            line: 3,
            flat: None,
        }
    }
}

impl Clef {
    pub fn new(kind: ClefKind, line: u8) -> Self {
        Self {
            kind,
            line,
            flat: None,
        }
    }

    /// The staff position the clef itself sits on. Lines 1 through 4 sit at
    /// letters `d`, `f`, `h`, `j`.
    pub fn pitch(&self) -> Pitch {
        let line = self.line.clamp(1, 4);
        Pitch(1 + 2 * line)
    }
}

/// Note head shapes as delivered by the lexer.
///
/// The compound shapes (`Bivirga` through `Tristropha`) arrive as a single
/// note and are expanded into 2-3 separate base-shape notes when their glyph
/// is closed. `Flat` and `Natural` are alteration marks written at a pitch;
/// they never join a neume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Punctum,
    PunctumInclinatum,
    PunctumCavum,
    LineaPunctum,
    Virga,
    Quilisma,
    Oriscus,
    Stropha,
    Bivirga,
    Trivirga,
    Distropha,
    Tristropha,
    Flat,
    Natural,
}

impl Shape {
    /// Shapes that classify along the punctum contour ladder.
    pub fn is_punctum_like(&self) -> bool {
        matches!(
            self,
            Shape::Punctum | Shape::PunctumCavum | Shape::LineaPunctum | Shape::Quilisma
        )
    }

    /// True for the flat/natural alteration marks.
    pub fn is_alteration(&self) -> bool {
        matches!(self, Shape::Flat | Shape::Natural)
    }

    /// For a compound shape, the base shape and the number of notes it
    /// expands into.
    pub fn expansion(&self) -> Option<(Shape, usize)> {
        match self {
            Shape::Bivirga => Some((Shape::Virga, 2)),
            Shape::Trivirga => Some((Shape::Virga, 3)),
            Shape::Distropha => Some((Shape::Stropha, 2)),
            Shape::Tristropha => Some((Shape::Stropha, 3)),
            _ => None,
        }
    }
}

/// Liquescentia kind proper (the shape-altering part).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiquescentiaKind {
    #[default]
    None,
    Deminutus,
    AuctusAscendens,
    AuctusDescendens,
}

/// Liquescentia of a note or glyph: a kind plus the independent
/// initio-debilis flag ("weak beginning").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Liquescentia {
    pub kind: LiquescentiaKind,
    pub initio_debilis: bool,
}

impl Liquescentia {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(kind: LiquescentiaKind) -> Self {
        Self {
            kind,
            initio_debilis: false,
        }
    }

    pub fn initio_debilis() -> Self {
        Self {
            kind: LiquescentiaKind::None,
            initio_debilis: true,
        }
    }

    /// True when the kind is deminutus or one of the auctus forms.
    pub fn is_liquescent(&self) -> bool {
        self.kind != LiquescentiaKind::None
    }
}

/// Rare auxiliary signs written above a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RareSign {
    Accentus,
    AccentusReversus,
    Circulus,
    Semicirculus,
    SemicirculusReversus,
}

/// Rhythmic and auxiliary signs attached to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signs {
    /// Punctum mora (dot after the note).
    pub mora: bool,
    /// Horizontal episema.
    pub episema: bool,
    /// Ictus (vertical episema).
    pub ictus: bool,
    pub rare: Option<RareSign>,
}

impl Signs {
    pub fn none() -> Self {
        Self::default()
    }
}

/// A single pitched note.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub pitch: Pitch,
    pub shape: Shape,
    pub liquescentia: Liquescentia,
    pub signs: Signs,
    /// Verbatim text attached to the note (passed through untouched).
    pub text: Option<String>,
}

impl Note {
    pub fn new(pitch: Pitch, shape: Shape) -> Self {
        Self {
            pitch,
            shape,
            liquescentia: Liquescentia::none(),
            signs: Signs::none(),
            text: None,
        }
    }

    pub fn with_liquescentia(mut self, liquescentia: Liquescentia) -> Self {
        self.liquescentia = liquescentia;
        self
    }

    pub fn with_signs(mut self, signs: Signs) -> Self {
        self.signs = signs;
        self
    }
}

/// Bar (divisio) sub-types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    Virgula,
    DivisioMinima,
    DivisioMinor,
    DivisioMaior,
    DivisioFinalis,
}

/// Space sub-types appearing in the note stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    /// The default, implicit inter-element separator. Consumed during
    /// element determination rather than emitted.
    NeumaticCut,
    /// Invisible join: suppresses the cut that would otherwise follow.
    ZeroWidth,
    /// A larger explicit space; becomes a space element.
    Larger,
    /// An explicit glyph-sized space; becomes a space element.
    Glyph,
}

/// One item of the lexed input stream: a pitched note, or a non-pitched
/// marker that glyph determination lifts out into its own glyph.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteEvent {
    Note(Note),
    Clef(Clef),
    Bar(BarKind),
    /// Guide mark at line end; its pitch is inferred from the next note.
    Custos,
    Space(SpaceKind),
    EndOfLine,
}

/// Neume classification of a glyph, determined from melodic contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphType {
    /// No classification yet (only ever seen while a glyph is being built).
    #[default]
    Undetermined,
    Punctum,
    Virga,
    Bivirga,
    Trivirga,
    Stropha,
    Distropha,
    Tristropha,
    Podatus,
    Flexa,
    Torculus,
    TorculusResupinus,
    TorculusResupinusFlexus,
    Porrectus,
    PorrectusFlexus,
    Scandicus,
    Ancus,
    Salicus,
    SalicusFlexus,
    PunctumInclinatum,
    TwoPunctaInclinataDescendens,
    ThreePunctaInclinataDescendens,
    FourPunctaInclinataDescendens,
    FivePunctaInclinataDescendens,
    TwoPunctaInclinataAscendens,
    ThreePunctaInclinataAscendens,
    FourPunctaInclinataAscendens,
    FivePunctaInclinataAscendens,
    /// Generic fallback for inclinata runs longer than five notes.
    PunctaInclinata,
}

impl GlyphType {
    /// True for the ascending puncta-inclinata classifications.
    pub fn is_inclinata_ascendens(&self) -> bool {
        matches!(
            self,
            GlyphType::TwoPunctaInclinataAscendens
                | GlyphType::ThreePunctaInclinataAscendens
                | GlyphType::FourPunctaInclinataAscendens
                | GlyphType::FivePunctaInclinataAscendens
        )
    }

    /// True for the descending puncta-inclinata classifications.
    pub fn is_inclinata_descendens(&self) -> bool {
        matches!(
            self,
            GlyphType::TwoPunctaInclinataDescendens
                | GlyphType::ThreePunctaInclinataDescendens
                | GlyphType::FourPunctaInclinataDescendens
                | GlyphType::FivePunctaInclinataDescendens
        )
    }

    /// True for any puncta-inclinata classification, single notes and the
    /// generic fallback included.
    pub fn is_inclinata(&self) -> bool {
        matches!(
            self,
            GlyphType::PunctumInclinatum | GlyphType::PunctaInclinata
        ) || self.is_inclinata_ascendens()
            || self.is_inclinata_descendens()
    }
}

/// Alteration marks lifted out of the note stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterationKind {
    Flat,
    Natural,
}

/// A determined glyph: a classified neume owning its notes, or a single
/// lifted marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    Neume {
        glyph_type: GlyphType,
        liquescentia: Liquescentia,
        notes: Vec<Note>,
    },
    Clef(Clef),
    Bar(BarKind),
    Custos(Pitch),
    Space(SpaceKind),
    EndOfLine,
    Alteration {
        alteration: AlterationKind,
        pitch: Pitch,
    },
}

impl Glyph {
    pub fn is_neume(&self) -> bool {
        matches!(self, Glyph::Neume { .. })
    }

    /// The pitch of the last note for neume glyphs, the written pitch for
    /// alterations and custodes.
    pub fn final_pitch(&self) -> Option<Pitch> {
        match self {
            Glyph::Neume { notes, .. } => notes.last().map(|n| n.pitch),
            Glyph::Alteration { pitch, .. } | Glyph::Custos(pitch) => Some(*pitch),
            _ => None,
        }
    }
}

/// A determined element: a run of glyphs between structural breaks, or a
/// single marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Neumes(Vec<Glyph>),
    Clef(Clef),
    Bar(BarKind),
    Custos(Pitch),
    Space(SpaceKind),
    EndOfLine,
}

impl Element {
    pub fn is_neumes(&self) -> bool {
        matches!(self, Element::Neumes(_))
    }
}

/// Text styles for lyric markup.
///
/// `Verbatim` and `SpecialChar` delimit opaque blocks that style and
/// centering logic never splits. `Center`, `ForcedCenter` and `Initial`
/// bracket the regions the normalizer computes or preserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Italic,
    Bold,
    SmallCapitals,
    Underlined,
    Colored,
    Teletype,
    Verbatim,
    SpecialChar,
    Center,
    ForcedCenter,
    Initial,
}

impl Style {
    /// Verbatim and special-character blocks are atomic: their contents are
    /// skipped over as one opaque unit.
    pub fn is_atomic(&self) -> bool {
        matches!(self, Style::Verbatim | Style::SpecialChar)
    }

    /// The two centering markers.
    pub fn is_center(&self) -> bool {
        matches!(self, Style::Center | Style::ForcedCenter)
    }
}

/// One item of a syllable's text: a literal character or a style boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Character {
    Literal(char),
    Begin(Style),
    End(Style),
}

/// Which portion of a syllable's text is centered under its neumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CenteringScheme {
    /// Vowel-driven centering (the default).
    #[default]
    Latin,
    /// The whole syllable is centered unless a forced center is present.
    English,
}

/// A syllable: normalized text, optional translation, one element list per
/// voice.
#[derive(Debug, Clone, PartialEq)]
pub struct Syllable {
    pub text: Vec<Character>,
    pub translation: Option<Vec<Character>>,
    pub voices: Vec<Vec<Element>>,
}

/// Chant mode, 1 through 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode(pub u8);

/// Validated score metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub name: Option<String>,
    pub office_part: Option<String>,
    pub mode: Option<Mode>,
    pub mode_modifier: Option<String>,
    pub annotation: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub transcriber: Option<String>,
}

/// Raw metadata for YAML deserialization.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RawMetadata {
    pub name: Option<String>,
    pub office_part: Option<String>,
    pub mode: Option<String>,
    pub mode_modifier: Option<String>,
    pub annotation: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub transcriber: Option<String>,
}

/// A complete analyzed score.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub metadata: Metadata,
    pub syllables: Vec<Syllable>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_letters() {
        let g = Pitch::from_letter('g').unwrap();
        assert_eq!(g.letter(), 'g');
        assert_eq!(Pitch::from_letter('G').unwrap(), g);
        assert!(Pitch::from_letter('n').is_none());
        assert!(Pitch::from_letter('0').is_none());
    }

    #[test]
    fn test_pitch_intervals() {
        let g = Pitch::from_letter('g').unwrap();
        let i = Pitch::from_letter('i').unwrap();
        let m = Pitch::from_letter('m').unwrap();
        assert_eq!(i.interval_from(g), 2);
        assert_eq!(g.interval_from(i), -2);
        assert_eq!(m.interval_from(g), 6);
        assert!(m.interval_from(g) > MAX_INTERVAL);
    }

    #[test]
    fn test_clef_pitch() {
        // Lines 1..4 sit at d, f, h, j.
        let clef = Clef {
            kind: ClefKind::C,
            line: 4,
            flat: None,
        };
        assert_eq!(clef.pitch().letter(), 'j');
        assert_eq!(Clef::default().pitch().letter(), 'h');
    }

    #[test]
    fn test_compound_shape_expansion() {
        assert_eq!(Shape::Bivirga.expansion(), Some((Shape::Virga, 2)));
        assert_eq!(Shape::Tristropha.expansion(), Some((Shape::Stropha, 3)));
        assert_eq!(Shape::Punctum.expansion(), None);
    }

    #[test]
    fn test_liquescentia_flags() {
        let deb = Liquescentia::initio_debilis();
        assert!(!deb.is_liquescent());
        assert!(deb.initio_debilis);
        let dem = Liquescentia::new(LiquescentiaKind::Deminutus);
        assert!(dem.is_liquescent());
        assert!(!dem.initio_debilis);
    }
}

//! Pitch and duration arithmetic — note names to frequencies, denominators
//! to seconds.
//!
//! Everything here is pure. Octave resolution for pitches written without
//! an octave digit happens at the call site, against whatever octave the
//! performance is in at that moment.

use std::fmt;

/// Reference tuning: A4 in hertz.
pub const A4_HZ: f64 = 440.0;

/// Semitone index of A4 (octave 4, letter A) on the `octave * 12 + class`
/// scale used by [`Pitch::semitone`].
const A4_SEMITONE: i32 = 57;

/// Denominator of the fixed pause inserted after every note.
pub const PAUSE_DENOM: u32 = 128;

/// Denominator of the staccato gap. Exposed for the player; the notation
/// cannot select it yet.
pub const STACCATO_DENOM: u32 = 64;

/// A note letter, C through B.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    /// Chromatic index within the octave.
    pub fn semitone(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

/// Sharp, flat, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(Accidental::Sharp),
            'b' => Some(Accidental::Flat),
            _ => None,
        }
    }

    /// Semitone adjustment.
    pub fn offset(self) -> i32 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// A parsed pitch token: either the rest symbol or a note name.
///
/// Format: `<letter><optional # or b><optional octave digit 0-8>`, or
/// exactly `R` for a rest. A note without an octave digit picks up the
/// performance octave when it is played, not when it is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pitch {
    /// The rest symbol `R` — no tone, frequency zero.
    Rest,
    Note {
        letter: Letter,
        accidental: Accidental,
        octave: Option<u8>,
    },
}

impl Pitch {
    /// Parse a pitch token. Letters are uppercase only; the rest symbol
    /// takes no accidental or octave.
    pub fn parse(token: &str) -> Option<Pitch> {
        if token == "R" {
            return Some(Pitch::Rest);
        }

        let chars: Vec<char> = token.chars().collect();
        if chars.is_empty() || chars.len() > 3 {
            return None;
        }

        let letter = Letter::from_char(chars[0])?;
        match chars.len() {
            1 => Some(Pitch::Note {
                letter,
                accidental: Accidental::Natural,
                octave: None,
            }),
            2 => {
                if let Some(accidental) = Accidental::from_char(chars[1]) {
                    Some(Pitch::Note {
                        letter,
                        accidental,
                        octave: None,
                    })
                } else {
                    octave_digit(chars[1]).map(|octave| Pitch::Note {
                        letter,
                        accidental: Accidental::Natural,
                        octave: Some(octave),
                    })
                }
            }
            3 => {
                let accidental = Accidental::from_char(chars[1])?;
                let octave = octave_digit(chars[2])?;
                Some(Pitch::Note {
                    letter,
                    accidental,
                    octave: Some(octave),
                })
            }
            _ => None,
        }
    }

    /// Absolute semitone index (`octave * 12 + class + accidental`), or
    /// `None` for a rest. C0 is 0, A4 is 57, B8 is 107.
    pub fn semitone(&self, default_octave: u8) -> Option<i32> {
        match *self {
            Pitch::Rest => None,
            Pitch::Note {
                letter,
                accidental,
                octave,
            } => {
                let octave = octave.unwrap_or(default_octave);
                Some(octave as i32 * 12 + letter.semitone() + accidental.offset())
            }
        }
    }

    /// Equal-temperament frequency in hertz, 0.0 for a rest.
    pub fn frequency(&self, default_octave: u8) -> f64 {
        match self.semitone(default_octave) {
            Some(n) => 2f64.powf((n - A4_SEMITONE) as f64 / 12.0) * A4_HZ,
            None => 0.0,
        }
    }
}

fn octave_digit(c: char) -> Option<u8> {
    c.to_digit(10).and_then(|d| (d <= 8).then_some(d as u8))
}

/// Seconds taken by one note of `1/denominator` length at `tempo`
/// quarter-note beats per minute.
pub fn beat_seconds(denominator: u32, tempo: f64) -> f64 {
    (4.0 / denominator as f64) / tempo * 60.0
}

/// A compound note length: one or more denominators summed, written
/// `8+16` in the notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationExpr {
    terms: Vec<u32>,
}

impl DurationExpr {
    /// Parse a duration token: decimal denominators joined by `+`, no
    /// interior whitespace, every denominator at least 1.
    pub fn parse(token: &str) -> Option<Self> {
        let mut terms = Vec::new();
        for part in token.split('+') {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let denominator: u32 = part.parse().ok()?;
            if denominator == 0 {
                return None;
            }
            terms.push(denominator);
        }
        Some(Self { terms })
    }

    /// Total length in seconds at the given tempo.
    pub fn seconds(&self, tempo: f64) -> f64 {
        self.terms.iter().map(|&d| beat_seconds(d, tempo)).sum()
    }
}

impl fmt::Display for DurationExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for term in &self.terms {
            if !first {
                write!(f, "+")?;
            }
            write!(f, "{term}")?;
            first = false;
        }
        Ok(())
    }
}

/// Length of one note in seconds: its own duration expression when it has
/// one, the performance default denominator otherwise.
pub fn note_seconds(expr: Option<&DurationExpr>, default_denominator: u32, tempo: f64) -> f64 {
    match expr {
        Some(e) => e.seconds(tempo),
        None => beat_seconds(default_denominator, tempo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn note(letter: Letter, accidental: Accidental, octave: Option<u8>) -> Pitch {
        Pitch::Note {
            letter,
            accidental,
            octave,
        }
    }

    #[test]
    fn parse_bare_letter() {
        assert_eq!(
            Pitch::parse("C"),
            Some(note(Letter::C, Accidental::Natural, None))
        );
    }

    #[test]
    fn parse_rest() {
        assert_eq!(Pitch::parse("R"), Some(Pitch::Rest));
    }

    #[test]
    fn parse_accidentals() {
        assert_eq!(
            Pitch::parse("F#"),
            Some(note(Letter::F, Accidental::Sharp, None))
        );
        assert_eq!(
            Pitch::parse("Bb"),
            Some(note(Letter::B, Accidental::Flat, None))
        );
    }

    #[test]
    fn parse_explicit_octave() {
        assert_eq!(
            Pitch::parse("C5"),
            Some(note(Letter::C, Accidental::Natural, Some(5)))
        );
        assert_eq!(
            Pitch::parse("G#2"),
            Some(note(Letter::G, Accidental::Sharp, Some(2)))
        );
        assert_eq!(
            Pitch::parse("Eb0"),
            Some(note(Letter::E, Accidental::Flat, Some(0)))
        );
    }

    #[test]
    fn parse_rejects_empty_and_long() {
        assert_eq!(Pitch::parse(""), None);
        assert_eq!(Pitch::parse("C#44"), None);
    }

    #[test]
    fn parse_rejects_lowercase() {
        assert_eq!(Pitch::parse("c"), None);
        assert_eq!(Pitch::parse("r"), None);
    }

    #[test]
    fn parse_rejects_unknown_letter() {
        assert_eq!(Pitch::parse("H"), None);
        assert_eq!(Pitch::parse("X4"), None);
    }

    #[test]
    fn parse_rejects_decorated_rest() {
        // The rest symbol is exactly "R"; it takes no suffix.
        assert_eq!(Pitch::parse("R#"), None);
        assert_eq!(Pitch::parse("R8"), None);
        assert_eq!(Pitch::parse("R#4"), None);
    }

    #[test]
    fn parse_rejects_octave_nine() {
        assert_eq!(Pitch::parse("C9"), None);
        assert_eq!(Pitch::parse("C#9"), None);
    }

    #[test]
    fn parse_rejects_bad_third_char() {
        assert_eq!(Pitch::parse("C##"), None);
        assert_eq!(Pitch::parse("C4#"), None);
    }

    #[test]
    fn semitone_scale() {
        let c4 = Pitch::parse("C4").unwrap();
        assert_eq!(c4.semitone(0), Some(48));

        let a4 = Pitch::parse("A4").unwrap();
        assert_eq!(a4.semitone(0), Some(57));

        let b8 = Pitch::parse("B8").unwrap();
        assert_eq!(b8.semitone(0), Some(107));
    }

    #[test]
    fn semitone_accidentals() {
        let cs4 = Pitch::parse("C#4").unwrap();
        let db4 = Pitch::parse("Db4").unwrap();
        assert_eq!(cs4.semitone(0), Some(49));
        assert_eq!(cs4.semitone(0), db4.semitone(0));
    }

    #[test]
    fn semitone_uses_default_octave_when_implicit() {
        let a = Pitch::parse("A").unwrap();
        assert_eq!(a.semitone(4), Some(57));
        assert_eq!(a.semitone(5), Some(69));
    }

    #[test]
    fn rest_has_no_semitone() {
        assert_eq!(Pitch::Rest.semitone(4), None);
    }

    #[test]
    fn concert_a_is_440() {
        let a4 = Pitch::parse("A4").unwrap();
        assert_approx_eq!(a4.frequency(0), 440.0, 1e-9);
    }

    #[test]
    fn octave_doubles_frequency() {
        let a3 = Pitch::parse("A3").unwrap();
        let a5 = Pitch::parse("A5").unwrap();
        assert_approx_eq!(a3.frequency(0), 220.0, 1e-9);
        assert_approx_eq!(a5.frequency(0), 880.0, 1e-9);
    }

    #[test]
    fn middle_c_frequency() {
        let c4 = Pitch::parse("C4").unwrap();
        assert_approx_eq!(c4.frequency(0), 261.6255653005986, 1e-9);
    }

    #[test]
    fn rest_frequency_is_zero() {
        assert_approx_eq!(Pitch::Rest.frequency(4), 0.0, 1e-12);
    }

    #[test]
    fn quarter_note_at_120() {
        assert_approx_eq!(beat_seconds(4, 120.0), 0.5, 1e-12);
    }

    #[test]
    fn whole_note_at_120() {
        assert_approx_eq!(beat_seconds(1, 120.0), 2.0, 1e-12);
    }

    #[test]
    fn tempo_scales_inversely() {
        assert_approx_eq!(beat_seconds(4, 60.0), 1.0, 1e-12);
        assert_approx_eq!(beat_seconds(4, 240.0), 0.25, 1e-12);
    }

    #[test]
    fn pause_length_at_120() {
        assert_approx_eq!(beat_seconds(PAUSE_DENOM, 120.0), 0.015625, 1e-12);
    }

    #[test]
    fn duration_expr_single_term() {
        let e = DurationExpr::parse("8").unwrap();
        assert_approx_eq!(e.seconds(120.0), 0.25, 1e-12);
        assert_eq!(e.to_string(), "8");
    }

    #[test]
    fn duration_expr_compound_sums() {
        let e = DurationExpr::parse("8+16").unwrap();
        assert_approx_eq!(e.seconds(120.0), 0.375, 1e-12);
        assert_eq!(e.to_string(), "8+16");
    }

    #[test]
    fn duration_expr_rejects_malformed() {
        assert_eq!(DurationExpr::parse(""), None);
        assert_eq!(DurationExpr::parse("8+"), None);
        assert_eq!(DurationExpr::parse("+8"), None);
        assert_eq!(DurationExpr::parse("8x"), None);
        assert_eq!(DurationExpr::parse("8 +16"), None);
    }

    #[test]
    fn duration_expr_rejects_zero() {
        assert_eq!(DurationExpr::parse("0"), None);
        assert_eq!(DurationExpr::parse("8+0"), None);
    }

    #[test]
    fn note_seconds_prefers_expression() {
        let e = DurationExpr::parse("16").unwrap();
        assert_approx_eq!(note_seconds(Some(&e), 4, 120.0), 0.125, 1e-12);
    }

    #[test]
    fn note_seconds_falls_back_to_default() {
        assert_approx_eq!(note_seconds(None, 4, 120.0), 0.5, 1e-12);
        assert_approx_eq!(note_seconds(None, 2, 120.0), 1.0, 1e-12);
    }
}

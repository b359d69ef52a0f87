//! The interpreter — walks a compiled program and performs it.

pub mod notice;
pub mod state;

pub use notice::{Console, MemoryConsole, MemoryLog, Notice, StdoutConsole};
pub use state::PerformanceState;

use std::fmt;
use std::time::Duration;

use crate::audio::{AudioDriver, AudioError};
use crate::interrupt::StopFlag;
use crate::notation::{Action, Program, ROOT_SECTION};
use crate::theory::{beat_seconds, note_seconds, DurationExpr, Pitch, PAUSE_DENOM};

/// A condition that ends a performance early.
#[derive(Debug)]
pub enum PlayError {
    /// The song moved the octave outside the playable range.
    OctaveRange(i32),
    /// The audio backend failed.
    Driver(AudioError),
    /// The listener cancelled playback.
    Stopped,
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::OctaveRange(octave) => write!(f, "Octave {octave} is out of range"),
            PlayError::Driver(e) => write!(f, "{e}"),
            PlayError::Stopped => write!(f, "stopped"),
        }
    }
}

impl std::error::Error for PlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlayError::Driver(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AudioError> for PlayError {
    fn from(e: AudioError) -> Self {
        PlayError::Driver(e)
    }
}

/// Performs a compiled program against an audio driver, narrating every
/// step through a console.
///
/// State changes take effect where they sit in the action stream, so a
/// tempo change inside a repeated section applies on every pass.
pub struct Player<'a> {
    program: &'a Program,
    state: PerformanceState,
    driver: Box<dyn AudioDriver>,
    console: Box<dyn Console>,
    stop: StopFlag,
}

impl<'a> Player<'a> {
    pub fn new(
        program: &'a Program,
        driver: Box<dyn AudioDriver>,
        console: Box<dyn Console>,
        stop: StopFlag,
    ) -> Self {
        Self {
            program,
            state: PerformanceState::new(),
            driver,
            console,
            stop,
        }
    }

    /// Perform the whole song from the root section.
    pub fn run(&mut self) -> Result<(), PlayError> {
        self.play_section(ROOT_SECTION)
    }

    /// Announce a section and execute its actions. A name that resolves
    /// to nothing still gets its announcement, then plays as silence.
    /// A section that plays itself recurses without a guard.
    fn play_section(&mut self, name: &str) -> Result<(), PlayError> {
        let Some(section) = self.program.get(name) else {
            self.console.emit(Notice::Section(name.to_string()));
            return Ok(());
        };
        self.console.emit(Notice::Section(section.name.clone()));
        for action in &section.actions {
            self.execute(action)?;
        }
        Ok(())
    }

    fn execute(&mut self, action: &Action) -> Result<(), PlayError> {
        match action {
            Action::PrintLine(text) => {
                self.console.emit(Notice::Comment(text.clone()));
                Ok(())
            }
            Action::PlayNote { pitch, duration } => self.play_note(pitch, duration.as_ref()),
            Action::PlaySection(name) => self.play_section(name),
            Action::LoopSection(name) => loop {
                if self.stop.is_set() {
                    return Err(self.stopped());
                }
                self.play_section(name)?;
            },
            Action::RepeatSection(times, name) => {
                for _ in 0..*times {
                    self.play_section(name)?;
                }
                Ok(())
            }
            Action::SetTempo(bpm) => {
                self.state.set_tempo(*bpm);
                self.announce_tempo();
                Ok(())
            }
            Action::MultiplyTempo(factor) => {
                self.state.multiply_tempo(*factor);
                self.announce_tempo();
                Ok(())
            }
            Action::DivideTempo(divisor) => {
                self.state.divide_tempo(*divisor);
                self.announce_tempo();
                Ok(())
            }
            Action::SetDuration(denominator) => {
                self.state.set_duration(*denominator);
                Ok(())
            }
            Action::SetOctave(octave) => self.state.set_octave(*octave),
            Action::OctaveUp => self.shift_octave(1),
            Action::OctaveDown => self.shift_octave(-1),
            Action::OctaveShift(delta) => self.shift_octave(*delta),
        }
    }

    /// Announce the note, sound it, then hold the short gap that keeps
    /// successive notes distinct. The gap runs whether or not the tone
    /// succeeded; cancellation is picked up between the tone and the gap,
    /// and during the gap itself.
    fn play_note(
        &mut self,
        pitch: &Pitch,
        duration: Option<&DurationExpr>,
    ) -> Result<(), PlayError> {
        let rendered = self.render_note(pitch, duration);
        self.console.emit(Notice::Note(rendered));

        let freq = pitch.frequency(self.state.octave());
        let len = note_seconds(duration, self.state.duration(), self.state.tempo());
        let tone = self.driver.emit(freq, wall_time(len));

        // A Ctrl-C lands on the tone command too, failing it; the stop
        // flag outranks the tone result.
        if self.stop.is_set() {
            return Err(self.stopped());
        }
        let pause = beat_seconds(PAUSE_DENOM, self.state.tempo());
        if !self.stop.sleep(wall_time(pause)) {
            return Err(self.stopped());
        }
        tone?;
        Ok(())
    }

    /// How a note prints: pitch class, octave column, duration. Implicit
    /// octaves and durations show the current state values; rests leave
    /// the octave column blank.
    fn render_note(&self, pitch: &Pitch, duration: Option<&DurationExpr>) -> String {
        let (class, octave) = match *pitch {
            Pitch::Rest => ("R".to_string(), String::new()),
            Pitch::Note {
                letter,
                accidental,
                octave,
            } => (
                format!("{}{}", letter.as_char(), accidental.as_str()),
                match octave {
                    Some(digit) => digit.to_string(),
                    None => self.state.octave().to_string(),
                },
            ),
        };
        let duration = match duration {
            Some(expr) => expr.to_string(),
            None => self.state.duration().to_string(),
        };
        format!("{class:<2} {octave:1} {duration}")
    }

    fn shift_octave(&mut self, delta: i32) -> Result<(), PlayError> {
        self.state.set_octave(self.state.octave() as i32 + delta)
    }

    fn announce_tempo(&mut self) {
        self.console
            .emit(Notice::Tempo(self.state.tempo().trunc() as i64));
    }

    /// Announce cancellation and produce the error that unwinds the run.
    fn stopped(&mut self) -> PlayError {
        self.console
            .emit(Notice::Important("Song stopped".to_string()));
        PlayError::Stopped
    }
}

/// Seconds to a wall-clock wait. An extreme tempo can ask for more time
/// than a `Duration` holds; such a wait saturates to the longest
/// representable one.
fn wall_time(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

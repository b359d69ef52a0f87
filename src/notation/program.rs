//! The compiled program — named sections of playback actions.

use std::collections::HashMap;

use crate::theory::{DurationExpr, Pitch};

/// The section playback starts from.
pub const ROOT_SECTION: &str = "Song";

/// One playback instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Echo a comment line.
    PrintLine(String),
    /// Sound one note or rest.
    PlayNote {
        pitch: Pitch,
        duration: Option<DurationExpr>,
    },
    /// Perform another section once.
    PlaySection(String),
    /// Perform another section until stopped.
    LoopSection(String),
    /// Perform another section a fixed number of times.
    RepeatSection(u32, String),
    SetTempo(f64),
    MultiplyTempo(f64),
    DivideTempo(f64),
    SetDuration(u32),
    SetOctave(i32),
    OctaveUp,
    OctaveDown,
    OctaveShift(i32),
}

/// A named run of actions.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// The name as first written in the source.
    pub name: String,
    pub actions: Vec<Action>,
}

/// A compiled song: sections addressed by case-insensitive name.
///
/// A section keeps the casing it had when its first action was queued;
/// reopening it under any other casing appends. Playback only reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    sections: HashMap<String, Section>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one action to `section`, creating the section on first use.
    pub fn push(&mut self, section: &str, action: Action) {
        self.sections
            .entry(section.to_ascii_lowercase())
            .or_insert_with(|| Section {
                name: section.to_string(),
                actions: Vec::new(),
            })
            .actions
            .push(action);
    }

    /// Look up a section, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

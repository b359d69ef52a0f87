//! Console notices — the narration a performance prints as it runs.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// One line of narration, tagged by display category.
///
/// Each category owns a two-glyph prefix so the stream stays scannable
/// while notes fly past.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// `## ` a comment echoed from the source
    Comment(String),
    /// `:: ` the tempo after a change, truncated to a whole number
    Tempo(i64),
    /// `>> ` a note as it starts to sound
    Note(String),
    /// `@@ ` entering a section
    Section(String),
    /// `!! ` something the listener must see
    Important(String),
    /// `XX ` a compile error report
    Error(String),
}

impl Notice {
    fn prefix(&self) -> &'static str {
        match self {
            Notice::Comment(_) => "## ",
            Notice::Tempo(_) => ":: ",
            Notice::Note(_) => ">> ",
            Notice::Section(_) => "@@ ",
            Notice::Important(_) => "!! ",
            Notice::Error(_) => "XX ",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Tempo(bpm) => write!(f, "{}Tempo {}", self.prefix(), bpm),
            Notice::Comment(text)
            | Notice::Note(text)
            | Notice::Section(text)
            | Notice::Important(text)
            | Notice::Error(text) => write!(f, "{}{}", self.prefix(), text),
        }
    }
}

/// Where notices go. The player narrates through this seam.
pub trait Console {
    fn emit(&mut self, notice: Notice);
}

/// Prints notices to stdout.
///
/// Important notices get a leading carriage return so they overwrite a
/// `^C` echo instead of trailing it.
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn emit(&mut self, notice: Notice) {
        if matches!(notice, Notice::Important(_)) {
            print!("\r");
        }
        println!("{notice}");
    }
}

/// Records notices instead of printing them.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    notices: Rc<RefCell<Vec<Notice>>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that reads everything this console has seen, usable
    /// after the console itself moves into a player.
    pub fn log(&self) -> MemoryLog {
        MemoryLog(Rc::clone(&self.notices))
    }
}

impl Console for MemoryConsole {
    fn emit(&mut self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

/// Read side of a [`MemoryConsole`].
#[derive(Debug, Clone)]
pub struct MemoryLog(Rc<RefCell<Vec<Notice>>>);

impl MemoryLog {
    pub fn notices(&self) -> Vec<Notice> {
        self.0.borrow().clone()
    }

    /// The notices as display lines, prefix included.
    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().iter().map(|n| n.to_string()).collect()
    }
}

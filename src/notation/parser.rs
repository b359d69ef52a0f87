//! Line compiler for notation source.
//!
//! Source is read one line at a time. A line starting with `#` in column
//! zero echoes as a comment, `[Name]` opens a section, and anything else
//! splits on `;` into commands. Commands are matched against a fixed
//! grammar, first rule wins:
//!
//! ```text
//! play <section>                 perform a section once
//! loop <section>                 perform a section until stopped
//! repeat <n> <section>           perform a section n times
//! tempo <n> | =<n> | *<n> | /<n> set or scale the tempo
//! duration <n> | =<n>            set the default note length
//! octave up | down | <n> | =<n>  move or set the octave
//! C  Eb2  F#,8  R 16             notes and rests, optional durations
//! ++ --                          shift the octave by the signed count
//! ```
//!
//! Keywords are ASCII case-insensitive. Pitch letters are not.

use super::error::CompileError;
use super::program::{Action, Program, ROOT_SECTION};
use crate::theory::{DurationExpr, Pitch};

/// Compile a complete source text into a program.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    let mut parser = Parser::new();
    for (index, line) in source.lines().enumerate() {
        parser.line(index + 1, line)?;
    }
    Ok(parser.program)
}

struct Parser {
    program: Program,
    section: String,
}

impl Parser {
    fn new() -> Self {
        Self {
            program: Program::new(),
            section: ROOT_SECTION.to_string(),
        }
    }

    fn line(&mut self, number: usize, raw: &str) -> Result<(), CompileError> {
        // The comment marker binds to column zero; an indented `#` is
        // not a comment.
        if let Some(text) = raw.strip_prefix('#') {
            let text = text.strip_prefix(' ').unwrap_or(text);
            self.push(Action::PrintLine(text.to_string()));
            return Ok(());
        }

        let line = raw.trim();
        if line.is_empty() {
            return Ok(());
        }

        if let Some(header) = section_header(line) {
            let name = header.trim();
            if name.is_empty() {
                return Err(CompileError::syntax(number, line));
            }
            self.section = name.to_string();
            return Ok(());
        }

        for command in line.split(';') {
            let command = command.trim();
            if !command.is_empty() {
                self.command(number, command)?;
            }
        }
        Ok(())
    }

    fn command(&mut self, number: usize, text: &str) -> Result<(), CompileError> {
        if let Some(action) = control_command(text) {
            self.push(action);
            return Ok(());
        }
        if looks_like_notes(text) {
            return match notes_command(text) {
                Some(actions) => {
                    for action in actions {
                        self.push(action);
                    }
                    Ok(())
                }
                None => Err(CompileError::pitch(number, text)),
            };
        }
        if let Some(action) = octave_shift(text) {
            self.push(action);
            return Ok(());
        }
        Err(CompileError::syntax(number, text))
    }

    fn push(&mut self, action: Action) {
        self.program.push(&self.section, action);
    }
}

/// The name inside a `[Name]` header, if the whole line is one.
fn section_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    if inner.contains('[') || inner.contains(']') || inner.contains(';') {
        return None;
    }
    Some(inner)
}

fn control_command(text: &str) -> Option<Action> {
    if let Some(arg) = keyword_arg(text, "play") {
        return section_name(arg).map(Action::PlaySection);
    }
    if let Some(arg) = keyword_arg(text, "loop") {
        return section_name(arg).map(Action::LoopSection);
    }
    if let Some(arg) = keyword_arg(text, "repeat") {
        let (count, name) = arg.split_once(char::is_whitespace)?;
        let count = number(count)?;
        return section_name(name).map(|name| Action::RepeatSection(count, name));
    }
    if let Some(action) = tempo_command(text) {
        return Some(action);
    }
    if let Some(arg) = assigned_arg(text, "duration") {
        return positive(arg).map(Action::SetDuration);
    }
    if let Some(arg) = assigned_arg(text, "octave") {
        if arg.eq_ignore_ascii_case("up") {
            return Some(Action::OctaveUp);
        }
        if arg.eq_ignore_ascii_case("down") {
            return Some(Action::OctaveDown);
        }
        return number(arg).map(|n| Action::SetOctave(n as i32));
    }
    None
}

/// The tempo keyword also accepts `*` and `/` to scale the current value.
fn tempo_command(text: &str) -> Option<Action> {
    let rest = strip_keyword(text, "tempo")?;
    let trimmed = rest.trim_start();
    if let Some(value) = trimmed.strip_prefix('*') {
        return positive(value.trim()).map(|n| Action::MultiplyTempo(n as f64));
    }
    if let Some(value) = trimmed.strip_prefix('/') {
        return positive(value.trim()).map(|n| Action::DivideTempo(n as f64));
    }
    if let Some(value) = trimmed.strip_prefix('=') {
        return positive(value.trim()).map(|n| Action::SetTempo(n as f64));
    }
    if rest.starts_with(|c: char| c.is_whitespace()) {
        return positive(trimmed).map(|n| Action::SetTempo(n as f64));
    }
    None
}

fn looks_like_notes(text: &str) -> bool {
    matches!(text.chars().next(), Some('R' | 'A'..='G'))
}

/// Parse a run of notes: each a pitch token, optionally followed by a
/// duration expression separated by whitespace or a comma.
fn notes_command(text: &str) -> Option<Vec<Action>> {
    let spaced = text.replace(',', " , ");
    let mut tokens = spaced.split_whitespace().peekable();
    let mut actions = Vec::new();
    while let Some(token) = tokens.next() {
        let pitch = Pitch::parse(token)?;
        let duration = match tokens.peek().copied() {
            Some(",") => {
                tokens.next();
                Some(DurationExpr::parse(tokens.next()?)?)
            }
            Some(next) => {
                let parsed = DurationExpr::parse(next);
                if parsed.is_some() {
                    tokens.next();
                }
                parsed
            }
            None => None,
        };
        actions.push(Action::PlayNote { pitch, duration });
    }
    (!actions.is_empty()).then_some(actions)
}

/// A run of `+` and `-`, optionally spaced, summed into one shift.
fn octave_shift(text: &str) -> Option<Action> {
    let mut delta = 0i32;
    let mut signs = 0u32;
    for c in text.chars() {
        match c {
            '+' => {
                delta += 1;
                signs += 1;
            }
            '-' => {
                delta -= 1;
                signs += 1;
            }
            c if c.is_whitespace() => {}
            _ => return None,
        }
    }
    (signs > 0).then_some(Action::OctaveShift(delta))
}

/// Strip a leading keyword, ASCII case-insensitively.
fn strip_keyword<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    if !text.is_char_boundary(word.len()) {
        return None;
    }
    let (head, rest) = text.split_at(word.len());
    head.eq_ignore_ascii_case(word).then_some(rest)
}

/// Argument of `<keyword> <arg>`. The space boundary keeps words that
/// merely start with the keyword out of its rule.
fn keyword_arg<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = strip_keyword(text, word)?;
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let arg = rest.trim();
    (!arg.is_empty()).then_some(arg)
}

/// Argument of `<keyword> <arg>` or `<keyword>=<arg>`.
fn assigned_arg<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = strip_keyword(text, word)?;
    if let Some(value) = rest.trim_start().strip_prefix('=') {
        let arg = value.trim();
        return (!arg.is_empty()).then_some(arg);
    }
    if rest.starts_with(|c: char| c.is_whitespace()) {
        let arg = rest.trim();
        return (!arg.is_empty()).then_some(arg);
    }
    None
}

fn section_name(text: &str) -> Option<String> {
    let name = text.trim();
    (!name.is_empty() && !name.contains('[') && !name.contains(']')).then(|| name.to_string())
}

fn number(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn positive(text: &str) -> Option<u32> {
    number(text).filter(|&n| n > 0)
}

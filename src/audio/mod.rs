//! Tone output — external-command backends behind one driver trait.
//!
//! Nothing here synthesizes audio. The backends delegate to whatever the
//! host provides: the `beep` command for the PC speaker, or the terminal
//! bell with its parameters retuned per note. A frequency below
//! [`REST_THRESHOLD_HZ`] is a rest and produces timed silence instead of
//! a tone.

use std::env;
use std::io::{self, Write};
use std::process::{Command, ExitStatus};
use std::time::Duration;

use crate::interrupt::StopFlag;

/// Frequencies below this are rests. A rest compiles to 0.0 Hz; the margin
/// absorbs float noise without admitting any audible pitch.
pub const REST_THRESHOLD_HZ: f64 = 5.0;

/// Terminal bells ring long for their nominal length; the configured bell
/// duration is scaled down while the wall-clock wait stays full.
const BELL_LENGTH_SCALE: f64 = 0.45;

/// BEL, the control byte that rings the terminal bell.
const BEL: &[u8] = b"\x07";

/// Audio backend errors.
#[derive(Debug)]
pub enum AudioError {
    /// A backend command could not be started.
    Spawn(&'static str, io::Error),
    /// The tone command ran but reported failure.
    ToneFailed(ExitStatus),
    /// Writing the bell character to stdout failed.
    Bell(io::Error),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::Spawn(program, e) => write!(f, "cannot run {program}: {e}"),
            AudioError::ToneFailed(status) => write!(f, "beep failed: {status}"),
            AudioError::Bell(e) => write!(f, "terminal bell write failed: {e}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// One tone sink. `emit` blocks for the note's whole duration.
pub trait AudioDriver {
    /// Sound `freq_hz` for `len`, or stay silent for `len` when the
    /// frequency is below the rest threshold.
    fn emit(&mut self, freq_hz: f64, len: Duration) -> Result<(), AudioError>;
}

/// Drives the PC speaker through the external `beep` command.
pub struct BeepCommand {
    sudo: bool,
    stop: StopFlag,
}

impl BeepCommand {
    pub fn new(sudo: bool, stop: StopFlag) -> Self {
        Self { sudo, stop }
    }
}

impl AudioDriver for BeepCommand {
    fn emit(&mut self, freq_hz: f64, len: Duration) -> Result<(), AudioError> {
        if freq_hz < REST_THRESHOLD_HZ {
            self.stop.sleep(len);
            return Ok(());
        }

        let millis = (len.as_secs_f64() * 1000.0).round() as u64;
        let (program, mut command) = if self.sudo {
            let mut c = Command::new("sudo");
            c.arg("beep");
            ("sudo", c)
        } else {
            ("beep", Command::new("beep"))
        };

        let status = command
            .args(["-f", &freq_hz.to_string(), "-l", &millis.to_string()])
            .status()
            .map_err(|e| AudioError::Spawn(program, e))?;
        if !status.success() {
            return Err(AudioError::ToneFailed(status));
        }
        Ok(())
    }
}

/// Which bell the terminal exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BellKind {
    /// Linux console: parameters via `setterm`.
    Console,
    /// Anything else: parameters via `xset`.
    X11,
}

fn bell_kind_for(term: Option<&str>) -> BellKind {
    match term {
        Some("linux") => BellKind::Console,
        _ => BellKind::X11,
    }
}

fn bell_kind_from_env() -> BellKind {
    bell_kind_for(env::var("TERM").ok().as_deref())
}

/// Rings the terminal bell once per note, retuning its frequency and
/// length first. The default backend — works on consoles and under X
/// without any extra binaries beyond `setterm`/`xset`.
pub struct TerminalBell {
    kind: BellKind,
    stop: StopFlag,
}

impl TerminalBell {
    /// Picks the console bell when `TERM=linux`, the X server bell
    /// otherwise.
    pub fn new(stop: StopFlag) -> Self {
        Self {
            kind: bell_kind_from_env(),
            stop,
        }
    }
}

impl AudioDriver for TerminalBell {
    fn emit(&mut self, freq_hz: f64, len: Duration) -> Result<(), AudioError> {
        if freq_hz < REST_THRESHOLD_HZ {
            self.stop.sleep(len);
            return Ok(());
        }

        let freq = (freq_hz as u64).to_string();
        let millis = ((len.as_secs_f64() * 1000.0 * BELL_LENGTH_SCALE).round() as u64).to_string();
        match self.kind {
            BellKind::Console => {
                run_bell_setup("setterm", &["-blength", &millis])?;
                run_bell_setup("setterm", &["-bfreq", &freq])?;
            }
            BellKind::X11 => {
                run_bell_setup("xset", &["b", "100", &freq, &millis])?;
            }
        }

        ring(&mut io::stdout()).map_err(AudioError::Bell)?;
        self.stop.sleep(len);
        Ok(())
    }
}

/// Write BEL and flush, so the bell sounds before the wait starts.
fn ring(out: &mut impl Write) -> io::Result<()> {
    out.write_all(BEL)?;
    out.flush()
}

/// Run a bell-parameter command. A non-zero exit is tolerated — the bell
/// still rings, just with default parameters — but a command that cannot
/// be started at all is an error.
fn run_bell_setup(program: &'static str, args: &[&str]) -> Result<(), AudioError> {
    Command::new(program)
        .args(args)
        .status()
        .map_err(|e| AudioError::Spawn(program, e))?;
    Ok(())
}

/// Put the bell parameters back to their defaults. Failures are ignored;
/// this runs on the way out of the process.
pub fn restore_bell() {
    match bell_kind_from_env() {
        BellKind::Console => {
            let _ = Command::new("setterm").args(["-blength", "0"]).status();
        }
        BellKind::X11 => {
            let _ = Command::new("xset").args(["b", "0"]).status();
        }
    }
}

/// No sound and no waiting. Lets a song be proofread at full speed.
#[derive(Debug, Default)]
pub struct Silent;

impl AudioDriver for Silent {
    fn emit(&mut self, _freq_hz: f64, _len: Duration) -> Result<(), AudioError> {
        Ok(())
    }
}

//! Eightbeat — play beep music written in a small line-oriented notation.
//!
//! Reads a song from a file (or stdin), compiles it, and performs it
//! through the terminal bell or the `beep` command. Ctrl-C stops the
//! song cleanly; the bell settings are restored on every exit path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use eightbeat::audio::{self, AudioDriver, BeepCommand, Silent, TerminalBell};
use eightbeat::interrupt::StopFlag;
use eightbeat::notation;
use eightbeat::player::{Notice, PlayError, Player, StdoutConsole};

/// Play beep music written in eightbeat notation.
#[derive(Parser, Debug)]
#[command(name = "eightbeat", version, about)]
struct Cli {
    /// Notation file to play; stdin when omitted
    file: Option<PathBuf>,

    /// Use the beep command instead of the terminal bell
    #[arg(long)]
    beep: bool,

    /// Run the beep command through sudo (implies --beep)
    #[arg(long)]
    sudo: bool,

    /// Compile and narrate the song without making sound
    #[arg(long)]
    silent: bool,
}

fn main() {
    let code = run();
    audio::restore_bell();
    process::exit(code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    let stop = StopFlag::new();
    let handler_flag = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.set()) {
        eprintln!("!! cannot install the stop handler: {e}");
        return 1;
    }

    let source = match read_source(cli.file.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            let what = cli
                .file
                .as_deref()
                .map_or("stdin".to_string(), |p| p.display().to_string());
            eprintln!("!! cannot read {what}: {e}");
            return 1;
        }
    };

    let program = match notation::compile(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", Notice::Error(e.to_string()));
            return 1;
        }
    };

    let driver: Box<dyn AudioDriver> = if cli.silent {
        Box::new(Silent)
    } else if cli.beep || cli.sudo {
        Box::new(BeepCommand::new(cli.sudo, stop.clone()))
    } else {
        Box::new(TerminalBell::new(stop.clone()))
    };

    let mut player = Player::new(&program, driver, Box::new(StdoutConsole), stop);
    match player.run() {
        Ok(()) | Err(PlayError::Stopped) => 0,
        Err(e) => {
            eprintln!("!! {e}");
            1
        }
    }
}

fn read_source(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => io::read_to_string(io::stdin()),
    }
}

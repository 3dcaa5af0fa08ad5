use std::{
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use log::{info, LevelFilter};

use segvm::{
    cpu::Processor,
    device::{SerialDevice, StreamDevice},
    memory::{read_program, SegmentMemory},
};

const EXIT_HALT: i32 = 0;
const EXIT_LOAD_FAILURE: i32 = 1;
const EXIT_FAULT: i32 = 3;

/// Runs a segment machine program image
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Big-endian program image to execute
    #[clap(value_parser)]
    program: PathBuf,

    /// Increase log verbosity on stderr
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn setup_logger(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("Unable to install logger")
}

fn load(path: &Path) -> anyhow::Result<SegmentMemory> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Unable to open program {}", path.display()))?;
    let words = read_program(file)
        .with_context(|| format!("Unable to load program {}", path.display()))?;
    info!("loaded {} words from {}", words.len(), path.display());
    Ok(SegmentMemory::new(words))
}

/// Loads and runs the program, providing the process exit code
fn run_program<D: SerialDevice>(path: &Path, device: D) -> i32 {
    let memory = match load(path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e:#}");
            return EXIT_LOAD_FAILURE;
        }
    };

    let mut cpu = Processor::new(memory, device);

    match cpu.run() {
        Ok(steps) => {
            info!("halted after {steps} steps");
            EXIT_HALT
        }
        Err(e) => {
            eprintln!(
                "Processor fault ({}) after {} steps - {e}",
                e.kind(),
                cpu.steps()
            );
            EXIT_FAULT
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = setup_logger(args.verbose) {
        eprintln!("{e:#}");
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let device = StreamDevice::new(stdin.lock(), BufWriter::new(stdout.lock()));

    std::process::exit(run_program(&args.program, device));
}

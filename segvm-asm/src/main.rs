use std::{io::Write, path::PathBuf};

use anyhow::Context;
use clap::Parser;

use segvm_asm::{assemble_text, disassemble, to_program_bytes};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputType {
    Binary,
    Listing,
}

/// Assembles segment machine source into a program image
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Filename of the input
    #[clap(short, long, value_parser)]
    input: PathBuf,

    /// Determine output format
    #[clap(short, long, value_enum, default_value_t = OutputType::Binary)]
    format: OutputType,

    /// Filename of the output, if desired
    #[clap(short, long, value_parser)]
    output: Option<PathBuf>,
}

fn build(args: &Args) -> anyhow::Result<Vec<u8>> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Unable to read input file {}", args.input.display()))?;

    let words = assemble_text(&text)
        .with_context(|| format!("Unable to assemble {}", args.input.display()))?;

    Ok(match args.format {
        OutputType::Binary => to_program_bytes(&words),
        OutputType::Listing => {
            let mut listing = disassemble(&words).join("\n");
            listing.push('\n');
            listing.into_bytes()
        }
    })
}

fn write_output(args: &Args, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(output_file) = &args.output {
        std::fs::write(output_file, bytes)
            .with_context(|| format!("Unable to write to {}", output_file.display()))
    } else {
        std::io::stdout()
            .write_all(bytes)
            .context("Unable to write to stdout")
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = build(&args).and_then(|bytes| write_output(&args, &bytes)) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

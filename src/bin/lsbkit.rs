// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use lsbkit::carrier;
use lsbkit::stego::{self, payload_capacity, PayloadBits};
use lsbkit::{EngineConfig, HuffmanCoder};

/// Hide bit strings in WAV audio and lossless images.
#[derive(Parser, Debug)]
#[command(name = "lsbkit", version, about, long_about = None)]
struct Cli {
    /// TOML settings file; flags given on the command line take precedence.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Seed for pseudo-random slot selection.
    #[arg(long)]
    seed: Option<u32>,

    /// Position file (one slot index per line), extended if too short.
    #[arg(long)]
    positions: Option<PathBuf>,

    /// Draw a random seed and store it in the carrier.
    #[arg(long)]
    embed_seed: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hide a payload file (lines of 0/1) in a carrier.
    Hide {
        #[arg(long)]
        carrier: PathBuf,
        #[arg(long)]
        payload: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Bit-plane to write payload bits to.
        #[arg(long)]
        shift: Option<u8>,
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Recover the payload of a carrier.
    Retrieve {
        #[arg(long)]
        carrier: PathBuf,
        /// Write recovered bits here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        line_width: Option<usize>,
        /// Decode the recovered bits with a codebook built from this file.
        #[arg(long)]
        dictionary: Option<PathBuf>,
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the codebook derived from a dictionary file.
    Codebook {
        #[arg(long)]
        dictionary: PathBuf,
    },

    /// Encode text into a payload file.
    Encode {
        #[arg(long)]
        dictionary: PathBuf,
        /// Text to encode; defaults to the dictionary's own content.
        #[arg(long)]
        text: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode a payload file back into text.
    Decode {
        #[arg(long)]
        dictionary: PathBuf,
        #[arg(long)]
        bits: PathBuf,
    },

    /// Report how many payload bits a carrier can hold.
    Capacity {
        #[arg(long)]
        carrier: PathBuf,
        #[arg(long)]
        embed_seed: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Hide { carrier, payload, output, shift, source } => {
            apply_source(&mut config, source);
            if let Some(shift) = shift {
                config.shift = shift;
            }
            let addressing = config.addressing()?;
            let (header, seed) =
                stego::hide_file(&carrier, &payload, &output, &addressing, config.shift)?;
            println!(
                "hid {} bits ({} bytes, plane {}) in {}",
                header.payload_bits(),
                header.byte_count,
                header.shift,
                output.display()
            );
            if let Some(seed) = seed {
                println!("embedded seed {seed}");
            }
        }
        Commands::Retrieve { carrier, output, line_width, dictionary, source } => {
            apply_source(&mut config, source);
            if let Some(width) = line_width {
                config.recovered_line_width = width;
            }
            let addressing = config.addressing()?;
            let bits = stego::retrieve_file(
                &carrier,
                &addressing,
                output.as_deref(),
                config.recovered_line_width,
            )?;
            if let Some(dict) = dictionary {
                println!("{}", coder_for(&dict)?.decode(&bits)?);
            } else if output.is_none() {
                print!("{}", bits.to_lines(config.recovered_line_width));
            }
        }
        Commands::Codebook { dictionary } => {
            let coder = coder_for(&dictionary)?;
            if let Some(book) = coder.codebook() {
                for (symbol, code) in book.iter() {
                    println!("{symbol:?}\t{code}");
                }
            }
        }
        Commands::Encode { dictionary, text, output } => {
            let coder = coder_for(&dictionary)?;
            let text = match text {
                Some(t) => t,
                None => std::fs::read_to_string(&dictionary)?,
            };
            let bits = coder.encode(&text)?;
            match output {
                Some(path) => bits.write_lines(&path, config.recovered_line_width)?,
                None => println!("{bits}"),
            }
        }
        Commands::Decode { dictionary, bits } => {
            let coder = coder_for(&dictionary)?;
            let bits = PayloadBits::from_file(&bits)?;
            println!("{}", coder.decode(&bits)?);
        }
        Commands::Capacity { carrier, embed_seed } => {
            let carrier = carrier::open(&carrier)?;
            println!("{}", payload_capacity(&carrier, embed_seed || config.embed_seed));
        }
    }
    Ok(())
}

/// Command-line position flags replace the config file's choice entirely.
fn apply_source(config: &mut EngineConfig, source: SourceArgs) {
    if source.seed.is_none() && source.positions.is_none() && !source.embed_seed {
        return;
    }
    config.seed = source.seed;
    config.positions = source.positions;
    config.embed_seed = source.embed_seed;
}

fn coder_for(dictionary: &Path) -> Result<HuffmanCoder, Box<dyn Error>> {
    let mut coder = HuffmanCoder::new();
    coder.load_dictionary(dictionary)?;
    Ok(coder)
}


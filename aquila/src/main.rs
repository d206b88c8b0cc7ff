// SPDX-FileCopyrightText: 2026 aquila contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use clap::Parser;
use log::info;

use aquila_common::Settings;
use aquila_cpu::{Emulator, Flag};

/// aquila - pedagogical ARM64 user-level emulator
#[derive(Parser, Debug)]
#[command(name = "aquila", version, about = "Pedagogical ARM64 user-level emulator")]
struct Args {
    /// Raw program image: a sequence of little-endian 32-bit words,
    /// terminated by the architectural NOP.
    image: PathBuf,

    /// Load address and entry point.
    #[arg(short, long, default_value = "0x1000", value_parser = parse_address)]
    base: u64,

    /// Guest memory size in bytes.
    #[arg(long, default_value_t = aquila_common::settings::DEFAULT_MEMORY_SIZE)]
    memory_size: usize,

    /// Instruction ceiling per run.
    #[arg(long, default_value_t = aquila_common::settings::DEFAULT_MAX_INSTRUCTIONS)]
    max_instructions: u64,

    /// Enable verbose logging (pass twice for per-instruction traces).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_address(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {s:?}: {e}"))
}

/// Read a raw image of little-endian instruction words.
fn read_image(path: &PathBuf) -> Result<Vec<u32>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut words = Vec::new();
    loop {
        match reader.read_u32::<LittleEndian>() {
            Ok(word) => words.push(word),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }
    anyhow::ensure!(!words.is_empty(), "image {} is empty", path.display());
    Ok(words)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    let words = read_image(&args.image)?;
    info!(
        "loaded {} words from {} at 0x{:X}",
        words.len(),
        args.image.display(),
        args.base
    );

    let settings = Settings {
        memory_size: args.memory_size,
        max_instructions: args.max_instructions,
        trace_execution: args.verbose >= 2,
    };
    let mut emu = Emulator::new(&settings);
    emu.load_program(args.base, &words)
        .context("loading program")?;

    let outcome = emu.run().context("program faulted")?;
    info!("completed after {} instructions", outcome.instructions_retired);

    for i in (0..31).step_by(2) {
        if i + 1 < 31 {
            println!(
                "X{:<2} = 0x{:016X}    X{:<2} = 0x{:016X}",
                i,
                emu.get_register(i),
                i + 1,
                emu.get_register(i + 1)
            );
        } else {
            println!("X{:<2} = 0x{:016X}", i, emu.get_register(i));
        }
    }
    let regs = emu.registers();
    let flag_char = |f: Flag, ch: char| if regs.flag(f) { ch } else { '-' };
    println!(
        "PC  = 0x{:016X}    NZCV = {}{}{}{}",
        emu.pc(),
        flag_char(Flag::N, 'N'),
        flag_char(Flag::Z, 'Z'),
        flag_char(Flag::C, 'C'),
        flag_char(Flag::V, 'V'),
    );

    Ok(())
}

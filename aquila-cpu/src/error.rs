// SPDX-FileCopyrightText: 2026 aquila contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error taxonomy shared by the whole core.
//!
//! Every fallible decode/execute operation returns one of these values;
//! the engine loop surfaces them to the caller verbatim. Architectural
//! conditions (integer division by zero, NaN comparison) are results,
//! not errors, and never appear here.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmuError {
    /// Data access or instruction fetch beyond the guest memory.
    #[error("memory access out of bounds at 0x{address:016X}")]
    MemoryOutOfBounds { address: u64 },

    /// Write into an address whose first matching region is read-only.
    #[error("write to read-only region at 0x{address:016X}")]
    MemoryProtectionViolation { address: u64 },

    /// PC unaligned or outside valid memory when fetching.
    #[error("program counter out of bounds at 0x{address:016X}")]
    ProgramCounterOutOfBounds { address: u64 },

    /// No encoding family matched the instruction word.
    #[error("unsupported instruction: top byte 0x{top_byte:02X}")]
    UnsupportedInstruction { top_byte: u8 },

    /// A family matched but the sub-field combination is not implemented.
    #[error("unsupported instruction format 0x{word:08X}: {detail}")]
    UnsupportedInstructionFormat {
        word: u32,
        top_byte: u8,
        detail: String,
    },

    /// Missing memory backing, runaway-execution trip, or a failure
    /// signalled by a memory-mapped peripheral.
    #[error("device error: {message}")]
    DeviceError { message: String },
}

impl EmuError {
    /// Shorthand for a format error on a recognized family.
    pub fn bad_format(word: u32, detail: impl Into<String>) -> Self {
        Self::UnsupportedInstructionFormat {
            word,
            top_byte: (word >> 24) as u8,
            detail: detail.into(),
        }
    }
}

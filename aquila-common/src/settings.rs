// SPDX-FileCopyrightText: 2026 aquila contributors
// SPDX-License-Identifier: GPL-3.0-or-later

/// Default guest memory size: 1 MiB.
pub const DEFAULT_MEMORY_SIZE: usize = 1024 * 1024;

/// Default per-run instruction ceiling.
pub const DEFAULT_MAX_INSTRUCTIONS: u64 = 1000;

/// Emulator construction-time configuration.
///
/// Passed by value when building an emulator instance; there is no
/// process-global state.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Size of the flat guest memory in bytes.
    pub memory_size: usize,
    /// Instruction ceiling per `run` call, guarding against runaway programs.
    pub max_instructions: u64,
    /// Emit a trace log line per executed instruction.
    pub trace_execution: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            max_instructions: DEFAULT_MAX_INSTRUCTIONS,
            trace_execution: false,
        }
    }
}

// SPDX-FileCopyrightText: 2026 aquila contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Emulator facade tying register file, bus and engine together.

use aquila_common::{Settings, VAddr};

use crate::bus::Bus;
use crate::device::Device;
use crate::error::EmuError;
use crate::interpreter::{Interpreter, RunOutcome, TelemetrySink};
use crate::memory::Memory;
use crate::state::RegisterFile;

/// One virtual machine instance: register file, memory behind a bus,
/// and the interpreter engine. Instances share nothing; a host may run
/// any number of them independently.
pub struct Emulator {
    regs: RegisterFile,
    bus: Bus,
    engine: Interpreter,
    telemetry: Option<Box<dyn TelemetrySink>>,
}

impl Emulator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            regs: RegisterFile::new(),
            bus: Bus::new(Memory::new(settings.memory_size)),
            engine: Interpreter::new(settings.max_instructions, settings.trace_execution),
            telemetry: None,
        }
    }

    /// Convenience constructor with default settings at a given memory size.
    pub fn with_memory_size(bytes: usize) -> Self {
        Self::new(&Settings {
            memory_size: bytes,
            ..Settings::default()
        })
    }

    /// Write a program as little-endian instruction words and point PC
    /// at its first word.
    pub fn load_program(&mut self, base: VAddr, words: &[u32]) -> Result<(), EmuError> {
        self.bus.write_block(base, words)?;
        self.regs.pc = base;
        Ok(())
    }

    /// Execute until the NOP sentinel, an error, or the instruction
    /// ceiling. Partial state from before a fault remains observable.
    pub fn run(&mut self) -> Result<RunOutcome, EmuError> {
        self.engine.run(
            &mut self.regs,
            &mut self.bus,
            self.telemetry.as_deref_mut(),
        )
    }

    /// Execute a single instruction (stepping).
    pub fn execute_one(&mut self) -> Result<(), EmuError> {
        self.engine.step(&mut self.regs, &mut self.bus)
    }

    // -- Register access ----------------------------------------------------

    pub fn get_register(&self, index: u32) -> u64 {
        self.regs.get(index)
    }

    pub fn set_register(&mut self, index: u32, value: u64) {
        self.regs.set(index, value);
    }

    /// Single-precision view of a V register (lane 0).
    pub fn get_float_register(&self, index: u32) -> f32 {
        self.regs.get_float(index)
    }

    pub fn set_float_register(&mut self, index: u32, value: f32) {
        self.regs.set_float(index, value);
    }

    /// Double-precision view of a V register (lane 0).
    pub fn get_double_register(&self, index: u32) -> f64 {
        self.regs.get_double(index)
    }

    pub fn set_double_register(&mut self, index: u32, value: f64) {
        self.regs.set_double(index, value);
    }

    pub fn pc(&self) -> VAddr {
        self.regs.pc
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    // -- Memory and devices -------------------------------------------------

    /// Raw bus-routed memory read.
    pub fn read_memory(&mut self, addr: VAddr, size: u32) -> Result<u64, EmuError> {
        self.bus.read(addr, size)
    }

    /// Raw bus-routed memory write.
    pub fn write_memory(&mut self, addr: VAddr, value: u64, size: u32) -> Result<(), EmuError> {
        self.bus.write(addr, value, size)
    }

    pub fn memory(&self) -> Result<&Memory, EmuError> {
        self.bus.memory()
    }

    pub fn memory_mut(&mut self) -> Result<&mut Memory, EmuError> {
        self.bus.memory_mut()
    }

    pub fn register_device(&mut self, base: VAddr, device: Box<dyn Device>) {
        self.bus.register_device(base, device);
    }

    pub fn set_telemetry_sink(&mut self, sink: Box<dyn TelemetrySink>) {
        self.telemetry = Some(sink);
    }
}

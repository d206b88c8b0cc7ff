// SPDX-FileCopyrightText: 2026 aquila contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Fetch-decode-execute engine.
//!
//! One instruction at a time, synchronously, in a single thread of
//! control. The loop terminates on the NOP sentinel, on the first error,
//! or when the instruction ceiling trips.

pub mod alu;
pub mod branch;
pub mod fp;
pub mod simd;

use aquila_common::{VAddr, NOP_WORD};
use log::trace;

use crate::bus::Bus;
use crate::decoder::{self, Instruction};
use crate::error::EmuError;
use crate::state::RegisterFile;

/// Result of executing a single decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Fall through; the engine advances PC by 4.
    Continue,
    /// A branch wrote PC; the engine leaves it alone.
    Branch,
}

/// Outcome of a completed `run` (NOP termination).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Instructions retired before the NOP sentinel.
    pub instructions_retired: u64,
}

/// Observer hooks for opcode statistics and the like. The engine calls
/// these; what is done with them is the host's business.
pub trait TelemetrySink {
    /// Called before each instruction is executed.
    fn instruction_retired(&mut self, pc: VAddr, raw: u32);

    /// Called after a taken branch.
    fn branch_taken(&mut self, _from: VAddr, _to: VAddr) {}
}

/// The interpreter engine.
pub struct Interpreter {
    /// Per-run instruction ceiling guarding against runaway programs.
    max_instructions: u64,
    /// Emit a trace line per executed instruction.
    trace: bool,
}

impl Interpreter {
    pub fn new(max_instructions: u64, trace: bool) -> Self {
        Self {
            max_instructions,
            trace,
        }
    }

    /// Execute a single decoded instruction.
    fn execute(
        &self,
        regs: &mut RegisterFile,
        bus: &mut Bus,
        inst: Instruction,
    ) -> Result<Step, EmuError> {
        use Instruction::*;

        match inst {
            // -- Scalar -----------------------------------------------------
            MovZ { rd, imm16 } => Ok(alu::exec_movz(regs, rd, imm16)),
            AddImm { rd, rn, imm12 } => Ok(alu::exec_add_imm(regs, rd, rn, imm12)),
            SubImm { rd, rn, imm12 } => Ok(alu::exec_sub_imm(regs, rd, rn, imm12)),
            AddReg { rd, rn, rm } => Ok(alu::exec_add_reg(regs, rd, rn, rm)),
            SubReg { rd, rn, rm } => Ok(alu::exec_sub_reg(regs, rd, rn, rm)),
            SubsReg { rd, rn, rm } => Ok(alu::exec_subs_reg(regs, rd, rn, rm)),
            Mul { rd, rn, rm } => Ok(alu::exec_mul(regs, rd, rn, rm)),
            AndReg { rd, rn, rm } => Ok(alu::exec_and_reg(regs, rd, rn, rm)),
            OrrReg { rd, rn, rm } => Ok(alu::exec_orr_reg(regs, rd, rn, rm)),
            OrrImm { rd, rn, imm } => Ok(alu::exec_orr_imm(regs, rd, rn, imm)),
            EorReg { rd, rn, rm } => Ok(alu::exec_eor_reg(regs, rd, rn, rm)),
            ShiftReg { rd, rn, rm, op } => Ok(alu::exec_shift_reg(regs, rd, rn, rm, op)),
            ShiftImm { rd, rn, amount, op } => {
                Ok(alu::exec_shift_imm(regs, rd, rn, amount, op))
            }
            Udiv { rd, rn, rm } => Ok(alu::exec_udiv(regs, rd, rn, rm)),
            Sdiv { rd, rn, rm } => Ok(alu::exec_sdiv(regs, rd, rn, rm)),

            // -- Branches ---------------------------------------------------
            BCond { cond, offset } => Ok(branch::exec_bcond(regs, cond, offset)),
            B { offset } => Ok(branch::exec_b(regs, offset)),
            Bl { offset } => Ok(branch::exec_bl(regs, offset)),
            Br { rn } => Ok(branch::exec_br(regs, rn)),

            // -- System -----------------------------------------------------
            Nop => Ok(Step::Continue),

            // -- Scalar floating-point --------------------------------------
            FArith { op, rd, rn, rm, double } => {
                Ok(fp::exec_farith(regs, op, rd, rn, rm, double))
            }
            FMovReg { rd, rn, double } => Ok(fp::exec_fmov_reg(regs, rd, rn, double)),
            FMovToFp { rd, rn, double } => Ok(fp::exec_fmov_to_fp(regs, rd, rn, double)),
            FMovToGp { rd, rn, double } => Ok(fp::exec_fmov_to_gp(regs, rd, rn, double)),
            Scvtf { rd, rn, double } => Ok(fp::exec_scvtf(regs, rd, rn, double)),
            Ucvtf { rd, rn, double } => Ok(fp::exec_ucvtf(regs, rd, rn, double)),
            Fcvtzs { rd, rn, double } => Ok(fp::exec_fcvtzs(regs, rd, rn, double)),
            Fcvtzu { rd, rn, double } => Ok(fp::exec_fcvtzu(regs, rd, rn, double)),
            Fcvt { rd, rn, src_double, dst_double } => {
                Ok(fp::exec_fcvt(regs, rd, rn, src_double, dst_double))
            }
            Fcmp { rn, rm, double } => Ok(fp::exec_fcmp(regs, rn, rm, double)),
            LdrFp { rt, rn, offset, double } => {
                fp::exec_ldr_fp(regs, bus, rt, rn, offset, double)
            }
            StrFp { rt, rn, offset, double } => {
                fp::exec_str_fp(regs, bus, rt, rn, offset, double)
            }

            // -- SIMD -------------------------------------------------------
            VecArith { op, rd, rn, rm, elem_bytes } => {
                Ok(simd::exec_vec_arith(regs, op, rd, rn, rm, elem_bytes))
            }
            VecLogical { op, rd, rn, rm } => {
                Ok(simd::exec_vec_logical(regs, op, rd, rn, rm))
            }
            VecDup { rd, rn, lane, elem_bytes } => {
                Ok(simd::exec_vec_dup(regs, rd, rn, lane, elem_bytes))
            }
            VecLoad { vt, rn, post_increment } => {
                simd::exec_vec_load(regs, bus, vt, rn, post_increment)
            }
            VecStore { vt, rn, post_increment } => {
                simd::exec_vec_store(regs, bus, vt, rn, post_increment)
            }
            VecExtractByte { rd, vn, index } => {
                Ok(simd::exec_vec_extract_byte(regs, rd, vn, index))
            }
        }
    }

    /// Fetch the word at PC, mapping fetch failures to
    /// [`EmuError::ProgramCounterOutOfBounds`]. A zero word means the
    /// program jumped into zeroed memory.
    fn fetch(&self, regs: &RegisterFile, bus: &Bus) -> Result<u32, EmuError> {
        let pc = regs.pc;
        let raw = match bus.read_instruction(pc) {
            Ok(raw) => raw,
            Err(EmuError::MemoryOutOfBounds { .. }) => {
                return Err(EmuError::ProgramCounterOutOfBounds { address: pc })
            }
            Err(e) => return Err(e),
        };
        if raw == 0 {
            return Err(EmuError::bad_format(0, "instruction word is zero"));
        }
        Ok(raw)
    }

    /// Run until the NOP sentinel, an error, or the instruction ceiling.
    pub fn run(
        &self,
        regs: &mut RegisterFile,
        bus: &mut Bus,
        mut telemetry: Option<&mut (dyn TelemetrySink + '_)>,
    ) -> Result<RunOutcome, EmuError> {
        let mut retired = 0u64;

        loop {
            let pc = regs.pc;
            let raw = self.fetch(regs, bus)?;

            if raw == NOP_WORD {
                return Ok(RunOutcome {
                    instructions_retired: retired,
                });
            }

            if self.trace {
                trace!("0x{:08X}: 0x{:08X}", pc, raw);
            }
            if let Some(sink) = telemetry.as_mut() {
                sink.instruction_retired(pc, raw);
            }

            let inst = decoder::decode(raw)?;
            match self.execute(regs, bus, inst)? {
                Step::Continue => regs.pc = pc.wrapping_add(4),
                Step::Branch => {
                    if let Some(sink) = telemetry.as_mut() {
                        sink.branch_taken(pc, regs.pc);
                    }
                }
            }

            retired += 1;
            if retired >= self.max_instructions {
                return Err(EmuError::DeviceError {
                    message: format!(
                        "instruction ceiling of {} reached, runaway program aborted",
                        self.max_instructions
                    ),
                });
            }
        }
    }

    /// Execute exactly one instruction (stepping). NOP executes as an
    /// ordinary no-op here; the sentinel meaning belongs to `run`.
    pub fn step(&self, regs: &mut RegisterFile, bus: &mut Bus) -> Result<(), EmuError> {
        let pc = regs.pc;
        let raw = self.fetch(regs, bus)?;
        let inst = decoder::decode(raw)?;
        match self.execute(regs, bus, inst)? {
            Step::Continue => regs.pc = pc.wrapping_add(4),
            Step::Branch => {}
        }
        Ok(())
    }
}

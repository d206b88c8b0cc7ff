// SPDX-FileCopyrightText: 2026 aquila contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! End-to-end programs run through the full fetch-decode-execute path.

mod common;

use aquila_common::Settings;
use aquila_cpu::error::EmuError;
use aquila_cpu::Emulator;
use common::*;

const BASE: u64 = 0x1000;

fn run_program(words: &[u32]) -> Emulator {
    let mut emu = Emulator::with_memory_size(0x10000);
    emu.load_program(BASE, words).unwrap();
    emu.run().unwrap();
    emu
}

#[test]
fn basic_arithmetic() {
    // X0 = ((10 + 3) - 3) * 3
    let emu = run_program(&[
        movz(0, 10),
        movz(1, 3),
        add_reg(0, 0, 1),
        sub_reg(0, 0, 1),
        mul(0, 0, 1),
        NOP,
    ]);
    assert_eq!(emu.get_register(0), 30);
}

#[test]
fn logical_and() {
    let emu = run_program(&[movz(0, 10), movz(1, 3), and_reg(0, 0, 1), NOP]);
    assert_eq!(emu.get_register(0), 2);
}

#[test]
fn logical_or_xor_with_immediate() {
    let emu = run_program(&[
        movz(0, 0b1010),
        movz(1, 0b0011),
        orr_reg(2, 0, 1),
        eor_reg(3, 0, 1),
        orr_imm(4, 0, 5, 1), // 0b1010 | (5 << 16)
        NOP,
    ]);
    assert_eq!(emu.get_register(2), 0b1011);
    assert_eq!(emu.get_register(3), 0b1001);
    assert_eq!(emu.get_register(4), 0b1010 | (5 << 16));
}

#[test]
fn conditional_branch_selects_else_arm() {
    // SUBS makes 1 - 2 nonzero, so B.NE skips to the MOV X0, #5 arm.
    let emu = run_program(&[
        movz(0, 1),
        movz(1, 2),
        subs_reg(0, 0, 1),
        b_cond(NE, 12),
        movz(0, 4),
        b(8),
        movz(0, 5),
        NOP,
    ]);
    assert_eq!(emu.get_register(0), 5);
}

#[test]
fn loop_summation() {
    // X0 = 1 + 2 + 3 + 4, loop controlled by SUBS XZR / B.LE.
    let emu = run_program(&[
        movz(0, 0),
        movz(1, 1),
        movz(2, 4),
        add_reg(0, 0, 1), // loop head
        add_imm(1, 1, 1),
        subs_reg(31, 1, 2),
        b_cond(LE, -12),
        NOP,
    ]);
    assert_eq!(emu.get_register(0), 10);
    assert_eq!(emu.get_register(1), 5);
}

#[test]
fn shift_chain() {
    let emu = run_program(&[movz(0, 5), lsl_imm(0, 0, 4), lsr_imm(0, 0, 2), NOP]);
    assert_eq!(emu.get_register(0), 20);
}

#[test]
fn shift_by_register() {
    let emu = run_program(&[movz(0, 3), movz(1, 2), lsl_reg(2, 0, 1), NOP]);
    assert_eq!(emu.get_register(2), 12);
}

#[test]
fn unsigned_division() {
    let emu = run_program(&[movz(0, 100), movz(3, 3), udiv(0, 0, 3), NOP]);
    assert_eq!(emu.get_register(0), 33);
}

#[test]
fn signed_division_of_negative() {
    // X0 = 0 - 10 = -10; X2 = X0 / 2 = -5.
    let emu = run_program(&[
        movz(0, 10),
        sub_reg(0, 31, 0),
        movz(1, 2),
        sdiv(2, 0, 1),
        NOP,
    ]);
    assert_eq!(emu.get_register(2) as i64, -5);
}

#[test]
fn call_and_return_through_link_register() {
    let emu = run_program(&[
        b(12),          // over the callee to the call site
        movz(9, 7),     // callee: X9 = 7
        br(30),         // return
        bl(-8),         // call the callee; links BASE + 16
        add_reg(0, 9, 31),
        NOP,
    ]);
    assert_eq!(emu.get_register(0), 7);
    assert_eq!(emu.get_register(30), BASE + 16);
}

#[test]
fn simd_byte_add() {
    let mut emu = Emulator::with_memory_size(0x10000);
    for i in 0..16u64 {
        emu.write_memory(0x2000 + i, i + 1, 1).unwrap(); // 1..=16
        emu.write_memory(0x2010 + i, 16 - i, 1).unwrap(); // 16..=1
    }
    emu.load_program(
        BASE,
        &[
            movz(1, 0x2000),
            ld1(0, 1, true), // V0 = [1..=16], X1 += 16
            ld1(1, 1, false), // V1 = [16..=1]
            vadd(2, 0, 1, SZ_B),
            extract_byte(0, 2, 0),
            NOP,
        ],
    )
    .unwrap();
    emu.run().unwrap();

    assert_eq!(emu.get_register(0), 17);
    // Every lane sums to 17.
    for i in 0..16 {
        assert_eq!(emu.registers().get_vreg_lane(2, i, 1), 17);
    }
}

#[test]
fn simd_store_writes_memory() {
    let mut emu = Emulator::with_memory_size(0x10000);
    for i in 0..16u64 {
        emu.write_memory(0x2000 + i, i, 1).unwrap();
    }
    emu.load_program(
        BASE,
        &[
            movz(1, 0x2000),
            movz(2, 0x3000),
            ld1(0, 1, false),
            vmov(3, 0),
            st1(3, 2, false),
            NOP,
        ],
    )
    .unwrap();
    emu.run().unwrap();

    for i in 0..16u64 {
        assert_eq!(emu.read_memory(0x3000 + i, 1).unwrap(), i);
    }
}

#[test]
fn simd_dup_and_halfword_mul() {
    let mut emu = Emulator::with_memory_size(0x10000);
    emu.registers_mut().set_vreg_lane(0, 3, 2, 7); // V0.H[3] = 7
    emu.registers_mut().set_vreg_lane(1, 0, 2, 3);
    emu.registers_mut().set_vreg_lane(1, 7, 2, 5);
    emu.load_program(
        BASE,
        &[
            vdup(2, 0, 3, SZ_H), // V2.8H = 7 everywhere
            vmul(3, 2, 1, SZ_H),
            NOP,
        ],
    )
    .unwrap();
    emu.run().unwrap();

    assert_eq!(emu.registers().get_vreg_lane(3, 0, 2), 21);
    assert_eq!(emu.registers().get_vreg_lane(3, 7, 2), 35);
    assert_eq!(emu.registers().get_vreg_lane(3, 4, 2), 0);
}

#[test]
fn floating_point_pipeline() {
    // S0 = 3.5, S1 = 2.5; X0 = trunc(S0+S1) + trunc(S0*S1) = 6 + 8.
    let emu = run_program(&[
        movz(0, 0x4060), // 3.5f32 bit pattern, high half
        lsl_imm(0, 0, 16),
        fmov_to_fp(0, 0, false),
        movz(1, 0x4020), // 2.5f32
        lsl_imm(1, 1, 16),
        fmov_to_fp(1, 1, false),
        fadd(2, 0, 1, false),
        fmul(4, 0, 1, false),
        fcvtzs(2, 2, false),
        fcvtzs(3, 4, false),
        add_reg(0, 2, 3),
        NOP,
    ]);
    assert_eq!(emu.get_register(0), 14);
}

#[test]
fn float_load_store_roundtrip() {
    let mut emu = Emulator::with_memory_size(0x10000);
    emu.write_memory(0x2000, 0x40600000, 4).unwrap(); // 3.5f32
    emu.load_program(
        BASE,
        &[
            movz(1, 0x2000),
            ldr_fp(0, 1, 0, false),
            fcvt(2, 0, false, true), // widen to double
            str_fp(2, 1, 8, true),
            NOP,
        ],
    )
    .unwrap();
    emu.run().unwrap();

    assert_eq!(emu.get_float_register(0), 3.5);
    assert_eq!(emu.read_memory(0x2008, 8).unwrap(), 3.5f64.to_bits());
}

#[test]
fn fdiv_by_zero_is_not_an_error() {
    let mut emu = Emulator::with_memory_size(0x10000);
    emu.set_double_register(0, 1.5);
    emu.set_double_register(1, 0.0);
    emu.load_program(BASE, &[fdiv(2, 0, 1, true), NOP]).unwrap();
    emu.run().unwrap();

    assert_eq!(emu.get_double_register(2), f64::INFINITY);
    assert_eq!(emu.registers().fpsr() & 1, 1);
}

#[test]
fn fcmp_drives_conditional_branch() {
    let mut emu = Emulator::with_memory_size(0x10000);
    emu.set_double_register(0, 1.0);
    emu.set_double_register(1, 2.0);
    emu.load_program(
        BASE,
        &[
            fcmp(0, 1, true), // 1.0 < 2.0 sets N
            b_cond(MI, 12),
            movz(0, 1),
            b(8),
            movz(0, 2),
            NOP,
        ],
    )
    .unwrap();
    emu.run().unwrap();
    assert_eq!(emu.get_register(0), 2);
}

#[test]
fn xzr_reads_zero_and_discards_writes() {
    let emu = run_program(&[
        movz(1, 5),
        add_reg(31, 1, 1), // discarded
        add_reg(0, 31, 1), // X0 = 0 + 5
        NOP,
    ]);
    assert_eq!(emu.get_register(31), 0);
    assert_eq!(emu.get_register(0), 5);
}

#[test]
fn unaligned_pc_is_a_pc_error() {
    let mut emu = Emulator::with_memory_size(0x1000);
    emu.load_program(0x100, &[NOP]).unwrap();
    emu.registers_mut().pc = 0x102;
    assert!(matches!(
        emu.run(),
        Err(EmuError::ProgramCounterOutOfBounds { address: 0x102 })
    ));
}

#[test]
fn runaway_program_trips_the_ceiling() {
    let mut emu = Emulator::new(&Settings {
        memory_size: 0x1000,
        max_instructions: 100,
        ..Settings::default()
    });
    // X1 = 1; loop: SUBS XZR, X1, XZR; B.NE loop (X1 never changes).
    emu.load_program(0, &[movz(1, 1), subs_reg(31, 1, 31), b_cond(NE, -4)])
        .unwrap();
    assert!(matches!(emu.run(), Err(EmuError::DeviceError { .. })));
}

#[test]
fn read_only_region_write_faults_mid_program() {
    let mut emu = Emulator::with_memory_size(0x10000);
    emu.memory_mut()
        .unwrap()
        .add_region(0x2000, 0x100, true, "rom");
    emu.set_float_register(0, 1.0);
    emu.load_program(BASE, &[movz(1, 0x2000), str_fp(0, 1, 0, false), NOP])
        .unwrap();
    assert!(matches!(
        emu.run(),
        Err(EmuError::MemoryProtectionViolation { address: 0x2000 })
    ));
    // The MOVZ before the fault is still visible.
    assert_eq!(emu.get_register(1), 0x2000);
}

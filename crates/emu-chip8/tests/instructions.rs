//! Unit tests for instruction behaviour.
//!
//! Each test loads a small program (bytes at 0x200), steps the machine and
//! asserts on registers, memory, the framebuffer or the program counter.

use emu_chip8::{Chip8, Chip8Config, Fault, Quirks, ScriptedEntropy, STACK_DEPTH};

fn machine(program: &[u8]) -> Chip8 {
    machine_with_quirks(program, Quirks::default())
}

fn machine_with_quirks(program: &[u8], quirks: Quirks) -> Chip8 {
    let config = Chip8Config {
        quirks,
        ..Chip8Config::default()
    };
    let mut vm = Chip8::new(&config);
    vm.load_rom(program).expect("program fits");
    vm
}

/// Step `n` instructions, failing the test on any fault.
fn run(vm: &mut Chip8, n: usize) {
    for _ in 0..n {
        if let Some(fault) = vm.step() {
            panic!("unexpected fault: {fault}");
        }
    }
}

// ---------------------------------------------------------------------------
// Loads, immediates, register copies
// ---------------------------------------------------------------------------

#[test]
fn ld_imm_sets_register_and_advances() {
    let mut vm = machine(&[0x63, 0xAB]);
    run(&mut vm, 1);
    assert_eq!(vm.register(3), 0xAB);
    assert_eq!(vm.pc(), 0x202);
}

#[test]
fn add_imm_wraps_and_never_sets_vf() {
    // V0 = 0xFF; V0 += 0x02; VF preloaded to observe it is untouched.
    let mut vm = machine(&[0x6F, 0x07, 0x60, 0xFF, 0x70, 0x02]);
    run(&mut vm, 3);
    assert_eq!(vm.register(0), 0x01, "wraps mod 256");
    assert_eq!(vm.register(0xF), 0x07, "7xkk must not touch VF");
}

#[test]
fn ld_reg_copies() {
    let mut vm = machine(&[0x65, 0x2A, 0x81, 0x50]);
    run(&mut vm, 2);
    assert_eq!(vm.register(1), 0x2A);
}

// ---------------------------------------------------------------------------
// ALU family: carry, borrow, shifts
// ---------------------------------------------------------------------------

#[test]
fn add_reg_sets_carry_iff_sum_exceeds_255() {
    // 0xFF + 0x01 = 0x00 carry 1
    let mut vm = machine(&[0x60, 0xFF, 0x61, 0x01, 0x80, 0x14]);
    run(&mut vm, 3);
    assert_eq!(vm.register(0), 0x00);
    assert_eq!(vm.register(0xF), 1);

    // 0x01 + 0x01 = 0x02 carry 0
    let mut vm = machine(&[0x60, 0x01, 0x61, 0x01, 0x80, 0x14]);
    run(&mut vm, 3);
    assert_eq!(vm.register(0), 0x02);
    assert_eq!(vm.register(0xF), 0);
}

#[test]
fn sub_sets_vf_iff_no_borrow() {
    // 5 - 3 = 2, no borrow
    let mut vm = machine(&[0x60, 0x05, 0x61, 0x03, 0x80, 0x15]);
    run(&mut vm, 3);
    assert_eq!(vm.register(0), 0x02);
    assert_eq!(vm.register(0xF), 1);

    // 3 - 5 = 0xFE mod 256, borrow
    let mut vm = machine(&[0x60, 0x03, 0x61, 0x05, 0x80, 0x15]);
    run(&mut vm, 3);
    assert_eq!(vm.register(0), 0xFE);
    assert_eq!(vm.register(0xF), 0);
}

#[test]
fn subn_subtracts_the_other_way() {
    // V0 = V1 - V0 = 5 - 3 = 2, no borrow
    let mut vm = machine(&[0x60, 0x03, 0x61, 0x05, 0x80, 0x17]);
    run(&mut vm, 3);
    assert_eq!(vm.register(0), 0x02);
    assert_eq!(vm.register(0xF), 1);

    // V0 = V1 - V0 = 3 - 5: borrow
    let mut vm = machine(&[0x60, 0x05, 0x61, 0x03, 0x80, 0x17]);
    run(&mut vm, 3);
    assert_eq!(vm.register(0), 0xFE);
    assert_eq!(vm.register(0xF), 0);
}

#[test]
fn sub_flag_uses_pre_mutation_values_when_x_is_vf() {
    // VF = VF - V1 where VF=3, V1=5: the result is overwritten by the
    // borrow flag, which must come from the pre-subtraction comparison.
    let mut vm = machine(&[0x6F, 0x03, 0x61, 0x05, 0x8F, 0x15]);
    run(&mut vm, 3);
    assert_eq!(vm.register(0xF), 0, "flag wins over result");
}

#[test]
fn bitwise_ops_clear_vf() {
    let mut vm = machine(&[0x6F, 0x01, 0x60, 0x0C, 0x61, 0x0A, 0x80, 0x11]);
    run(&mut vm, 4);
    assert_eq!(vm.register(0), 0x0E);
    assert_eq!(vm.register(0xF), 0, "OR clears VF");

    let mut vm = machine(&[0x6F, 0x01, 0x60, 0x0C, 0x61, 0x0A, 0x80, 0x12]);
    run(&mut vm, 4);
    assert_eq!(vm.register(0), 0x08);
    assert_eq!(vm.register(0xF), 0, "AND clears VF");

    let mut vm = machine(&[0x6F, 0x01, 0x60, 0x0C, 0x61, 0x0A, 0x80, 0x13]);
    run(&mut vm, 4);
    assert_eq!(vm.register(0), 0x06);
    assert_eq!(vm.register(0xF), 0, "XOR clears VF");
}

#[test]
fn shr_shifts_vx_in_place_by_default() {
    // V0 = 0x05, V1 = 0xFF; SHR V0, V1 ignores V1 without the quirk.
    let mut vm = machine(&[0x60, 0x05, 0x61, 0xFF, 0x80, 0x16]);
    run(&mut vm, 3);
    assert_eq!(vm.register(0), 0x02);
    assert_eq!(vm.register(0xF), 1, "low bit of pre-shift value");
}

#[test]
fn shr_uses_vy_under_the_quirk() {
    let quirks = Quirks {
        shift_source_vy: true,
        ..Quirks::default()
    };
    let mut vm = machine_with_quirks(&[0x60, 0x05, 0x61, 0xF0, 0x80, 0x16], quirks);
    run(&mut vm, 3);
    assert_eq!(vm.register(0), 0x78);
    assert_eq!(vm.register(0xF), 0);
}

#[test]
fn shl_sets_vf_from_high_bit() {
    let mut vm = machine(&[0x60, 0x81, 0x80, 0x0E]);
    run(&mut vm, 2);
    assert_eq!(vm.register(0), 0x02);
    assert_eq!(vm.register(0xF), 1, "high bit of pre-shift value");

    let mut vm = machine(&[0x60, 0x41, 0x80, 0x0E]);
    run(&mut vm, 2);
    assert_eq!(vm.register(0), 0x82);
    assert_eq!(vm.register(0xF), 0);
}

// ---------------------------------------------------------------------------
// Control flow: jumps, calls, skips
// ---------------------------------------------------------------------------

#[test]
fn jp_sets_pc() {
    let mut vm = machine(&[0x13, 0x45]);
    run(&mut vm, 1);
    assert_eq!(vm.pc(), 0x345);
}

#[test]
fn jp_v0_adds_offset() {
    let mut vm = machine(&[0x60, 0x10, 0xB3, 0x00]);
    run(&mut vm, 2);
    assert_eq!(vm.pc(), 0x310);
}

#[test]
fn call_then_ret_restores_fall_through_address() {
    // 0x200: CALL 0x300; 0x300: RET -> PC back at 0x202.
    let mut program = vec![0x23, 0x00];
    program.resize(0x100, 0);
    program.extend_from_slice(&[0x00, 0xEE]);
    let mut vm = machine(&program);
    run(&mut vm, 1);
    assert_eq!(vm.pc(), 0x300);
    assert_eq!(vm.stack_depth(), 1);
    run(&mut vm, 1);
    assert_eq!(vm.pc(), 0x202);
    assert_eq!(vm.stack_depth(), 0);
}

#[test]
fn call_ret_round_trip_from_an_odd_corner_of_memory() {
    // Jump deep first: 0x200: JP 0x3FC; 0x3FC: CALL 0x300; 0x300: RET.
    let mut program = vec![0x13, 0xFC];
    program.resize(0x100, 0);
    program.extend_from_slice(&[0x00, 0xEE]); // 0x300
    program.resize(0x1FC, 0);
    program.extend_from_slice(&[0x23, 0x00]); // 0x3FC
    let mut vm = machine(&program);
    run(&mut vm, 3);
    assert_eq!(vm.pc(), 0x3FE, "RET resumes after the CALL site");
}

#[test]
fn call_overflow_is_reported_and_degrades() {
    // 0x200: CALL 0x200 forever: each call pushes until the stack is full.
    let mut vm = machine(&[0x22, 0x00]);
    for _ in 0..STACK_DEPTH {
        assert_eq!(vm.step(), None);
    }
    assert_eq!(vm.stack_depth(), STACK_DEPTH);
    // The next call faults and falls through to 0x202 instead of jumping.
    assert_eq!(vm.step(), Some(Fault::StackOverflow { pc: 0x200 }));
    assert_eq!(vm.stack_depth(), STACK_DEPTH, "stack unchanged");
    assert_eq!(vm.pc(), 0x202, "degrades to a plain advance");
}

#[test]
fn ret_underflow_is_reported_and_degrades() {
    let mut vm = machine(&[0x00, 0xEE]);
    assert_eq!(vm.step(), Some(Fault::StackUnderflow { pc: 0x200 }));
    assert_eq!(vm.pc(), 0x202);
    assert_eq!(vm.fault_count(), 1);
}

#[test]
fn skip_family_distances() {
    // SE taken: PC += 4.
    let mut vm = machine(&[0x60, 0x42, 0x30, 0x42]);
    run(&mut vm, 2);
    assert_eq!(vm.pc(), 0x208);

    // SE not taken: PC += 2.
    let mut vm = machine(&[0x60, 0x42, 0x30, 0x41]);
    run(&mut vm, 2);
    assert_eq!(vm.pc(), 0x206);

    // SNE taken.
    let mut vm = machine(&[0x60, 0x42, 0x40, 0x41]);
    run(&mut vm, 2);
    assert_eq!(vm.pc(), 0x208);

    // SE Vx,Vy taken; SNE Vx,Vy not taken.
    let mut vm = machine(&[0x60, 0x42, 0x61, 0x42, 0x50, 0x10]);
    run(&mut vm, 3);
    assert_eq!(vm.pc(), 0x208);
    let mut vm = machine(&[0x60, 0x42, 0x61, 0x42, 0x90, 0x10]);
    run(&mut vm, 3);
    assert_eq!(vm.pc(), 0x206);
}

#[test]
fn sys_and_unknown_opcodes_are_no_ops() {
    // SYS 0x123 then an undocumented 8xy8 pattern.
    let mut vm = machine(&[0x01, 0x23, 0x81, 0x28]);
    assert_eq!(vm.step(), None);
    assert_eq!(vm.pc(), 0x202);
    assert_eq!(vm.step(), None);
    assert_eq!(vm.pc(), 0x204);
}

// ---------------------------------------------------------------------------
// Index register
// ---------------------------------------------------------------------------

#[test]
fn ld_index() {
    let mut vm = machine(&[0xA1, 0x23]);
    run(&mut vm, 1);
    assert_eq!(vm.index(), 0x123);
}

#[test]
fn add_index_flags_overflow_past_addressable_range() {
    // I = 0xFFF, V0 = 0x01: result 0x1000 wraps to 0 and sets VF.
    let mut vm = machine(&[0xAF, 0xFF, 0x60, 0x01, 0xF0, 0x1E]);
    run(&mut vm, 3);
    assert_eq!(vm.index(), 0x000);
    assert_eq!(vm.register(0xF), 1);

    // No overflow clears VF.
    let mut vm = machine(&[0x6F, 0x01, 0xA1, 0x00, 0x60, 0x02, 0xF0, 0x1E]);
    run(&mut vm, 4);
    assert_eq!(vm.index(), 0x102);
    assert_eq!(vm.register(0xF), 0);
}

// ---------------------------------------------------------------------------
// Random
// ---------------------------------------------------------------------------

#[test]
fn rnd_masks_the_injected_byte() {
    let mut vm = machine(&[0xC0, 0x0F, 0xC1, 0xF0]);
    vm.set_entropy(Box::new(ScriptedEntropy::new(&[0xAB, 0xAB])));
    run(&mut vm, 2);
    assert_eq!(vm.register(0), 0x0B);
    assert_eq!(vm.register(1), 0xA0);
}

// ---------------------------------------------------------------------------
// Draw
// ---------------------------------------------------------------------------

#[test]
fn drw_reports_collision_on_second_identical_blit() {
    // I = font sprite for 0 (5 rows); draw twice at (0, 0).
    let program = [
        0x60, 0x00, // V0 = 0
        0xF0, 0x29, // I = font(V0)
        0xD0, 0x05, // DRW V0,V0,5
        0xD0, 0x05, // DRW V0,V0,5
    ];
    let mut vm = machine(&program);
    run(&mut vm, 3);
    assert_eq!(vm.register(0xF), 0, "first blit: no collision");
    assert!(vm.framebuffer().pixels().iter().any(|&p| p));
    run(&mut vm, 1);
    assert_eq!(vm.register(0xF), 1, "second blit: full collision");
    assert!(
        vm.framebuffer().pixels().iter().all(|&p| !p),
        "XOR of a sprite with itself is blank"
    );
}

#[test]
fn drw_clips_at_the_bottom_by_default() {
    // Draw digit 0 (5 rows) at y = 30: only rows 30 and 31 land.
    let program = [
        0x60, 0x00, // V0 = 0 (x, and font digit)
        0x61, 0x1E, // V1 = 30 (y)
        0xF0, 0x29, // I = font(0)
        0xD0, 0x15, // DRW V0,V1,5
    ];
    let mut vm = machine(&program);
    run(&mut vm, 4);
    let fb = vm.framebuffer();
    assert!(fb.pixel(0, 30));
    assert!(!fb.pixel(0, 0), "clipped rows do not wrap to the top");
}

#[test]
fn drw_wraps_under_the_quirk() {
    let quirks = Quirks {
        sprite_wrap: true,
        ..Quirks::default()
    };
    let program = [
        0x60, 0x00, 0x61, 0x1E, // x = 0, y = 30
        0xF0, 0x29, // I = font(0)
        0xD0, 0x15, // DRW V0,V1,5
    ];
    let mut vm = machine_with_quirks(&program, quirks);
    run(&mut vm, 4);
    // Font 0's third row (0x90) lands on wrapped row 0.
    assert!(vm.framebuffer().pixel(0, 0));
}

#[test]
fn drw_start_coordinates_wrap_into_the_grid() {
    // x = 66 behaves as x = 2.
    let program = [
        0x60, 0x42, // V0 = 66
        0x61, 0x00, // V1 = 0
        0xF0, 0x29, // I = font(digit 2? no: font(V0 & 0xF) = font(2))
        0xD0, 0x15,
    ];
    let mut vm = machine(&program);
    run(&mut vm, 4);
    assert!(vm.framebuffer().pixel(2, 0), "x coordinate taken mod 64");
}

#[test]
fn cls_blanks_the_screen() {
    let program = [
        0x60, 0x00, 0xF0, 0x29, 0xD0, 0x05, // draw something
        0x00, 0xE0, // CLS
    ];
    let mut vm = machine(&program);
    run(&mut vm, 4);
    assert!(vm.framebuffer().pixels().iter().all(|&p| !p));
}

// ---------------------------------------------------------------------------
// Keypad
// ---------------------------------------------------------------------------

#[test]
fn skp_and_sknp_test_the_key_in_vx() {
    let mut vm = machine(&[0x60, 0x07, 0xE0, 0x9E, 0xE0, 0xA1]);
    vm.press_key(0x7);
    run(&mut vm, 2);
    assert_eq!(vm.pc(), 0x206, "SKP taken while key 7 down");
    // Now at 0x206... re-load to test SKNP with the key up.
    let mut vm = machine(&[0x60, 0x07, 0xE0, 0xA1]);
    run(&mut vm, 2);
    assert_eq!(vm.pc(), 0x206, "SKNP taken while key 7 up");
}

#[test]
fn wait_key_spins_without_advancing() {
    let mut vm = machine(&[0xF0, 0x0A]);
    for _ in 0..10 {
        assert_eq!(vm.step(), None);
        assert_eq!(vm.pc(), 0x200, "poll-spin leaves PC on the instruction");
    }
    vm.press_key(0xB);
    run(&mut vm, 1);
    assert_eq!(vm.register(0), 0xB);
    assert_eq!(vm.pc(), 0x202, "advances exactly once on a key");
}

#[test]
fn wait_key_does_not_stall_timers() {
    let mut vm = machine(&[0x61, 0x05, 0xF1, 0x15, 0xF0, 0x0A]);
    run(&mut vm, 2);
    assert_eq!(vm.delay_timer(), 5);
    for _ in 0..5 {
        vm.step(); // spinning on the wait
        vm.timer_tick();
    }
    assert_eq!(vm.pc(), 0x204, "still waiting");
    assert_eq!(vm.delay_timer(), 0, "timers decayed during the wait");
}

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

#[test]
fn timer_loads_and_reads() {
    let program = [
        0x60, 0x3C, // V0 = 60
        0xF0, 0x15, // DT = V0
        0xF0, 0x18, // ST = V0
        0xF1, 0x07, // V1 = DT
    ];
    let mut vm = machine(&program);
    run(&mut vm, 4);
    assert_eq!(vm.register(1), 60);
    assert!(vm.sound_active());
}

// ---------------------------------------------------------------------------
// Font, BCD, bulk transfers
// ---------------------------------------------------------------------------

#[test]
fn ld_font_points_i_at_the_digit_sprite() {
    let mut vm = machine(&[0x60, 0x0A, 0xF0, 0x29]);
    run(&mut vm, 2);
    assert_eq!(vm.index(), 0x050 + 0xA * 5);
    // The sprite data for 'A' starts 0xF0 0x90.
    assert_eq!(vm.peek(vm.index()), 0xF0);
    assert_eq!(vm.peek(vm.index() + 1), 0x90);
}

#[test]
fn bcd_stores_three_decimal_digits() {
    let mut vm = machine(&[0x60, 0xFE, 0xA3, 0x00, 0xF0, 0x33]);
    run(&mut vm, 3);
    assert_eq!(vm.peek(0x300), 2);
    assert_eq!(vm.peek(0x301), 5);
    assert_eq!(vm.peek(0x302), 4);
}

#[test]
fn bcd_of_a_single_digit_pads_with_zeros() {
    let mut vm = machine(&[0x60, 0x07, 0xA3, 0x00, 0xF0, 0x33]);
    run(&mut vm, 3);
    assert_eq!(
        [vm.peek(0x300), vm.peek(0x301), vm.peek(0x302)],
        [0, 0, 7]
    );
}

#[test]
fn bulk_store_and_load_round_trip() {
    let program = [
        0x60, 0x11, // V0
        0x61, 0x22, // V1
        0x62, 0x33, // V2
        0xA3, 0x00, // I = 0x300
        0xF2, 0x55, // store V0..=V2
        0x60, 0x00, 0x61, 0x00, 0x62, 0x00, // clobber
        0xF2, 0x65, // load V0..=V2
    ];
    let mut vm = machine(&program);
    run(&mut vm, 9);
    assert_eq!(vm.register(0), 0x11);
    assert_eq!(vm.register(1), 0x22);
    assert_eq!(vm.register(2), 0x33);
    assert_eq!(vm.peek(0x300), 0x11);
    assert_eq!(vm.peek(0x302), 0x33);
    assert_eq!(vm.index(), 0x300, "I unchanged by default");
}

#[test]
fn bulk_store_only_touches_v0_through_vx() {
    let program = [
        0x60, 0x11, 0x61, 0x22, 0x62, 0x33, // V0..V2
        0xA3, 0x00, // I = 0x300
        0xF1, 0x55, // store V0..=V1 only
    ];
    let mut vm = machine(&program);
    run(&mut vm, 5);
    assert_eq!(vm.peek(0x300), 0x11);
    assert_eq!(vm.peek(0x301), 0x22);
    assert_eq!(vm.peek(0x302), 0x00, "V2 not stored");
}

#[test]
fn bulk_transfers_advance_i_under_the_quirk() {
    let quirks = Quirks {
        index_increment: true,
        ..Quirks::default()
    };
    let program = [
        0x60, 0x11, 0x61, 0x22, // V0, V1
        0xA3, 0x00, // I = 0x300
        0xF1, 0x55, // store V0..=V1
    ];
    let mut vm = machine_with_quirks(&program, quirks);
    run(&mut vm, 4);
    assert_eq!(vm.index(), 0x302, "I = I + x + 1");
    assert_eq!(vm.peek(0x300), 0x11);
}

//! The execution unit: one handler per instruction.
//!
//! `step()` advances the program counter past the instruction at fetch, so
//! inside a handler `self.pc` is already the return/fall-through address.
//! Jumps overwrite it, skips add two more, and the key-wait poll backs it
//! up so the same instruction re-executes next tick.
//!
//! Flag discipline: VF is an ordinary register slot that flag-setting
//! instructions are contractually required to overwrite. The flag is always
//! computed from the pre-mutation operand values and written after the
//! result, so `x = 0xF` cases end with the flag, not the result.
//!
//! Handlers validate preconditions before mutating anything: an instruction
//! either fully commits or (on stack overflow/underflow) leaves state
//! unchanged and reports a [`Fault`].

use crate::chip8::{Chip8, Fault, STACK_DEPTH};
use crate::decode::{Instruction, Opcode};
use crate::display::BlitMode;
use crate::memory::Memory;

impl Chip8 {
    pub(crate) fn execute(&mut self, opcode: u16, op_addr: u16) -> Option<Fault> {
        match Instruction::decode(Opcode(opcode)) {
            // Deliberate no-ops: SYS was never implemented by historical
            // interpreters and undocumented patterns fall through.
            Instruction::Sys(_) | Instruction::Unknown(_) => {}

            Instruction::Cls => self.framebuffer.clear(),

            Instruction::Ret => {
                if self.sp == 0 {
                    return Some(Fault::StackUnderflow { pc: op_addr });
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp];
            }

            Instruction::Jp(nnn) => self.pc = nnn,

            Instruction::Call(nnn) => {
                if self.sp == STACK_DEPTH {
                    return Some(Fault::StackOverflow { pc: op_addr });
                }
                self.stack[self.sp] = self.pc;
                self.sp += 1;
                self.pc = nnn;
            }

            Instruction::SeImm { x, kk } => self.skip_if(self.v[x as usize] == kk),
            Instruction::SneImm { x, kk } => self.skip_if(self.v[x as usize] != kk),
            Instruction::SeReg { x, y } => {
                self.skip_if(self.v[x as usize] == self.v[y as usize]);
            }
            Instruction::SneReg { x, y } => {
                self.skip_if(self.v[x as usize] != self.v[y as usize]);
            }

            Instruction::LdImm { x, kk } => self.v[x as usize] = kk,

            // Wrapping add, and unlike 8xy4 the flag is untouched.
            Instruction::AddImm { x, kk } => {
                self.v[x as usize] = self.v[x as usize].wrapping_add(kk);
            }

            Instruction::LdReg { x, y } => self.v[x as usize] = self.v[y as usize],

            // The bitwise ops leave VF undefined historically; cleared here
            // for determinism.
            Instruction::Or { x, y } => {
                self.v[x as usize] |= self.v[y as usize];
                self.v[0xF] = 0;
            }
            Instruction::And { x, y } => {
                self.v[x as usize] &= self.v[y as usize];
                self.v[0xF] = 0;
            }
            Instruction::Xor { x, y } => {
                self.v[x as usize] ^= self.v[y as usize];
                self.v[0xF] = 0;
            }

            Instruction::AddReg { x, y } => {
                let sum = u16::from(self.v[x as usize]) + u16::from(self.v[y as usize]);
                self.v[x as usize] = sum as u8;
                self.v[0xF] = u8::from(sum > 0xFF);
            }

            Instruction::Sub { x, y } => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.v[x as usize] = vx.wrapping_sub(vy);
                self.v[0xF] = u8::from(vx >= vy);
            }

            Instruction::Subn { x, y } => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.v[x as usize] = vy.wrapping_sub(vx);
                self.v[0xF] = u8::from(vy >= vx);
            }

            Instruction::Shr { x, y } => {
                let src = self.shift_operand(x, y);
                self.v[x as usize] = src >> 1;
                self.v[0xF] = src & 0x01;
            }

            Instruction::Shl { x, y } => {
                let src = self.shift_operand(x, y);
                self.v[x as usize] = src << 1;
                self.v[0xF] = src >> 7;
            }

            Instruction::LdIndex(nnn) => self.i = nnn,

            Instruction::JpV0(nnn) => {
                self.pc = nnn.wrapping_add(u16::from(self.v[0])) & 0xFFF;
            }

            Instruction::Rnd { x, kk } => {
                self.v[x as usize] = self.entropy.next_byte() & kk;
            }

            Instruction::Drw { x, y, n } => {
                let mut rows = [0u8; 15];
                for (offset, row) in rows[..n as usize].iter_mut().enumerate() {
                    *row = self.memory.read(self.i.wrapping_add(offset as u16));
                }
                let mode = if self.quirks.sprite_wrap {
                    BlitMode::Wrap
                } else {
                    BlitMode::Clip
                };
                let collided = self.framebuffer.blit(
                    self.v[x as usize] as usize,
                    self.v[y as usize] as usize,
                    &rows[..n as usize],
                    mode,
                );
                self.v[0xF] = u8::from(collided);
            }

            Instruction::Skp { x } => self.skip_if(self.keypad.is_pressed(self.v[x as usize])),
            Instruction::Sknp { x } => self.skip_if(!self.keypad.is_pressed(self.v[x as usize])),

            Instruction::LdFromDelay { x } => self.v[x as usize] = self.delay_timer,

            // Non-blocking poll: no key means the PC backs up over this
            // instruction, so it re-executes next CPU tick. Timers and
            // frames keep running in the meantime.
            Instruction::WaitKey { x } => match self.keypad.first_pressed() {
                Some(key) => self.v[x as usize] = key,
                None => self.pc = self.pc.wrapping_sub(2) & 0xFFF,
            },

            Instruction::LdDelay { x } => self.delay_timer = self.v[x as usize],
            Instruction::LdSound { x } => self.sound_timer = self.v[x as usize],

            Instruction::AddIndex { x } => {
                let sum = self.i.wrapping_add(u16::from(self.v[x as usize]));
                self.i = sum & 0xFFF;
                self.v[0xF] = u8::from(sum >= 0x1000);
            }

            Instruction::LdFont { x } => {
                self.i = Memory::font_addr(self.v[x as usize]);
            }

            Instruction::LdBcd { x } => {
                let val = self.v[x as usize];
                self.memory.write(self.i, val / 100);
                self.memory.write(self.i.wrapping_add(1), val / 10 % 10);
                self.memory.write(self.i.wrapping_add(2), val % 10);
            }

            Instruction::StoreRegs { x } => {
                for r in 0..=x {
                    self.memory
                        .write(self.i.wrapping_add(u16::from(r)), self.v[r as usize]);
                }
                self.bulk_index_adjust(x);
            }

            Instruction::LoadRegs { x } => {
                for r in 0..=x {
                    self.v[r as usize] = self.memory.read(self.i.wrapping_add(u16::from(r)));
                }
                self.bulk_index_adjust(x);
            }
        }
        None
    }

    /// Skip the next instruction when `cond` holds.
    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc = self.pc.wrapping_add(2) & 0xFFF;
        }
    }

    /// Pre-shift operand for `8xy6`/`8xyE`: Vx in place by default, Vy
    /// under the quirk.
    fn shift_operand(&self, x: u8, y: u8) -> u8 {
        if self.quirks.shift_source_vy {
            self.v[y as usize]
        } else {
            self.v[x as usize]
        }
    }

    /// Index side effect of `Fx55`/`Fx65` under the quirk; unchanged by
    /// default.
    fn bulk_index_adjust(&mut self, x: u8) {
        if self.quirks.index_increment {
            self.i = self.i.wrapping_add(u16::from(x) + 1) & 0xFFF;
        }
    }
}

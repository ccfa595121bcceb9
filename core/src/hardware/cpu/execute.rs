use crate::hardware::cpu::alu;
use crate::hardware::cpu::Cpu;
use crate::hardware::mmu::MemoryMapper;
use crate::hardware::registers::Flags;

/// Opcodes are decoded by splitting the byte into fields `xxyyyzzz` (and the
/// further split of `yyy` into `ppq`), the standard scheme for this CPU
/// family. It reproduces the instruction set's regularity - and its GB-specific
/// irregularities, like `LDH`/`ADD SP,e8` replacing the Z80 opcodes that would
/// otherwise sit at those positions - without needing a hand-listed 256-entry
/// table.
impl<M: MemoryMapper> Cpu<M> {
    pub fn execute(&mut self, opcode: u8) -> u8 {
        if opcode == 0xCB {
            return self.execute_cb();
        }

        let x = opcode >> 6;
        let y = (opcode >> 3) & 0x07;
        let z = opcode & 0x07;
        let p = y >> 1;
        let q = y & 1;

        match x {
            0 => self.execute_block0(y, z, p, q),
            1 => self.execute_block1(y, z),
            2 => {
                let value = self.get_r8_field(z);
                self.alu_op(y, value);
                if z == 6 {
                    8
                } else {
                    4
                }
            }
            3 => self.execute_block3(opcode, y, z, p, q),
            _ => unreachable!("x is masked to 2 bits"),
        }
    }

    fn execute_block0(&mut self, y: u8, z: u8, p: u8, q: u8) -> u8 {
        match z {
            0 => match y {
                0 => 4, // NOP
                1 => {
                    let addr = self.fetch_word();
                    self.memory.write_u16(addr, self.registers.sp);
                    20
                }
                2 => {
                    self.fetch_byte(); // STOP's mandatory (and ignored) second byte
                    4
                }
                3 => {
                    self.jump_relative();
                    12
                }
                4..=7 => {
                    if self.condition_met(y - 4) {
                        self.jump_relative();
                        12
                    } else {
                        self.fetch_byte();
                        8
                    }
                }
                _ => unreachable!(),
            },
            1 => {
                if q == 0 {
                    let value = self.fetch_word();
                    self.set_r16_field(p, value);
                    12
                } else {
                    self.add_hl(self.get_r16_field(p));
                    8
                }
            }
            2 => {
                self.indirect_load_store(p, q);
                8
            }
            3 => {
                let value = self.get_r16_field(p);
                if q == 0 {
                    self.set_r16_field(p, value.wrapping_add(1));
                } else {
                    self.set_r16_field(p, value.wrapping_sub(1));
                }
                8
            }
            4 => {
                self.inc_r8(y);
                if y == 6 {
                    12
                } else {
                    4
                }
            }
            5 => {
                self.dec_r8(y);
                if y == 6 {
                    12
                } else {
                    4
                }
            }
            6 => {
                let value = self.fetch_byte();
                self.set_r8_field(y, value);
                if y == 6 {
                    12
                } else {
                    8
                }
            }
            7 => {
                self.accumulator_op(y);
                4
            }
            _ => unreachable!("z is masked to 3 bits"),
        }
    }

    fn execute_block1(&mut self, y: u8, z: u8) -> u8 {
        if y == 6 && z == 6 {
            self.halt();
            return 4;
        }
        let value = self.get_r8_field(z);
        self.set_r8_field(y, value);
        if y == 6 || z == 6 {
            8
        } else {
            4
        }
    }

    fn execute_block3(&mut self, opcode: u8, y: u8, z: u8, p: u8, q: u8) -> u8 {
        match z {
            0 => match y {
                0..=3 => {
                    if self.condition_met(y) {
                        self.registers.pc = self.pop_u16();
                        20
                    } else {
                        8
                    }
                }
                4 => {
                    let offset = self.fetch_byte() as u16;
                    let a = self.registers.a;
                    self.memory.write(0xFF00 + offset, a);
                    12
                }
                5 => {
                    self.add_sp_e8();
                    16
                }
                6 => {
                    let offset = self.fetch_byte() as u16;
                    self.registers.a = self.memory.read(0xFF00 + offset);
                    12
                }
                7 => {
                    self.ld_hl_sp_e8();
                    12
                }
                _ => unreachable!(),
            },
            1 => {
                if q == 0 {
                    let value = self.pop_u16();
                    self.set_r16_stack_field(p, value);
                    12
                } else {
                    match p {
                        0 => {
                            self.registers.pc = self.pop_u16();
                            16
                        }
                        1 => {
                            self.registers.pc = self.pop_u16();
                            self.ime = true;
                            16
                        }
                        2 => {
                            self.registers.pc = self.registers.hl();
                            4
                        }
                        3 => {
                            self.registers.sp = self.registers.hl();
                            8
                        }
                        _ => unreachable!(),
                    }
                }
            }
            2 => match y {
                0..=3 => {
                    let addr = self.fetch_word();
                    if self.condition_met(y) {
                        self.registers.pc = addr;
                        16
                    } else {
                        12
                    }
                }
                4 => {
                    let addr = 0xFF00 + self.registers.c as u16;
                    self.memory.write(addr, self.registers.a);
                    8
                }
                5 => {
                    let addr = self.fetch_word();
                    self.memory.write(addr, self.registers.a);
                    16
                }
                6 => {
                    let addr = 0xFF00 + self.registers.c as u16;
                    self.registers.a = self.memory.read(addr);
                    8
                }
                7 => {
                    let addr = self.fetch_word();
                    self.registers.a = self.memory.read(addr);
                    16
                }
                _ => unreachable!(),
            },
            3 => match y {
                0 => {
                    self.registers.pc = self.fetch_word();
                    16
                }
                1 => unreachable!("0xCB is intercepted before opcode decode"),
                6 => {
                    self.disable_interrupts();
                    4
                }
                7 => {
                    self.enable_interrupts_delayed();
                    4
                }
                _ => self.invalid_opcode(opcode),
            },
            4 => match y {
                0..=3 => {
                    let addr = self.fetch_word();
                    if self.condition_met(y) {
                        self.push_u16(self.registers.pc);
                        self.registers.pc = addr;
                        24
                    } else {
                        12
                    }
                }
                _ => self.invalid_opcode(opcode),
            },
            5 => {
                if q == 0 {
                    self.push_u16(self.get_r16_stack_field(p));
                    16
                } else if p == 0 {
                    let addr = self.fetch_word();
                    self.push_u16(self.registers.pc);
                    self.registers.pc = addr;
                    24
                } else {
                    self.invalid_opcode(opcode)
                }
            }
            6 => {
                let value = self.fetch_byte();
                self.alu_op(y, value);
                8
            }
            7 => {
                self.push_u16(self.registers.pc);
                self.registers.pc = (y as u16) * 8;
                16
            }
            _ => unreachable!("z is masked to 3 bits"),
        }
    }

    fn execute_cb(&mut self) -> u8 {
        let opcode = self.fetch_byte();
        let x = opcode >> 6;
        let y = (opcode >> 3) & 0x07;
        let z = opcode & 0x07;

        match x {
            0 => {
                let value = self.get_r8_field(z);
                let mut flags = self.registers.f;
                let result = match y {
                    0 => alu::rotate_left(value, &mut flags),
                    1 => alu::rotate_right(value, &mut flags),
                    2 => alu::rotate_left_carry(value, &mut flags),
                    3 => alu::rotate_right_carry(value, &mut flags),
                    4 => alu::shift_left(value, &mut flags),
                    5 => alu::shift_right_arithmetic(value, &mut flags),
                    6 => alu::swap(value, &mut flags),
                    7 => alu::shift_right_logical(value, &mut flags),
                    _ => unreachable!(),
                };
                flags.set(Flags::ZF, result == 0);
                self.registers.f = flags;
                self.set_r8_field(z, result);
                if z == 6 {
                    16
                } else {
                    8
                }
            }
            1 => {
                let value = self.get_r8_field(z);
                self.registers.set_zf(value & (1 << y) == 0);
                self.registers.set_n(false);
                self.registers.set_h(true);
                if z == 6 {
                    12
                } else {
                    8
                }
            }
            2 => {
                let value = self.get_r8_field(z) & !(1 << y);
                self.set_r8_field(z, value);
                if z == 6 {
                    16
                } else {
                    8
                }
            }
            3 => {
                let value = self.get_r8_field(z) | (1 << y);
                self.set_r8_field(z, value);
                if z == 6 {
                    16
                } else {
                    8
                }
            }
            _ => unreachable!("x is masked to 2 bits"),
        }
    }

    fn invalid_opcode(&self, opcode: u8) -> ! {
        panic!(
            "illegal opcode {:#04x} at pc {:#06x}\n{}",
            opcode,
            self.registers.pc.wrapping_sub(1),
            self.registers
        );
    }

    fn jump_relative(&mut self) {
        let offset = self.fetch_byte() as i8 as i16 as u16;
        self.registers.pc = self.registers.pc.wrapping_add(offset);
    }

    fn indirect_load_store(&mut self, p: u8, q: u8) {
        let addr = match p {
            0 => self.registers.bc(),
            1 => self.registers.de(),
            2 | 3 => self.registers.hl(),
            _ => unreachable!(),
        };
        if q == 0 {
            self.memory.write(addr, self.registers.a);
        } else {
            self.registers.a = self.memory.read(addr);
        }
        match p {
            2 => self.registers.set_hl(addr.wrapping_add(1)),
            3 => self.registers.set_hl(addr.wrapping_sub(1)),
            _ => {}
        }
    }

    fn inc_r8(&mut self, field: u8) {
        let value = self.get_r8_field(field);
        let result = value.wrapping_add(1);
        self.set_r8_field(field, result);
        self.registers.set_zf(result == 0);
        self.registers.set_n(false);
        self.registers.set_h(value & 0xF == 0xF);
    }

    fn dec_r8(&mut self, field: u8) {
        let value = self.get_r8_field(field);
        let result = value.wrapping_sub(1);
        self.set_r8_field(field, result);
        self.registers.set_zf(result == 0);
        self.registers.set_n(true);
        self.registers.set_h(value & 0xF == 0);
    }

    fn add_hl(&mut self, value: u16) {
        let hl = self.registers.hl();
        let (result, carry) = hl.overflowing_add(value);
        let half = (hl & 0xFFF) + (value & 0xFFF) > 0xFFF;
        self.registers.set_hl(result);
        self.registers.set_n(false);
        self.registers.set_h(half);
        self.registers.set_cf(carry);
    }

    fn add_sp_e8(&mut self) {
        let (result, half, carry) = self.sp_plus_e8();
        self.registers.sp = result;
        self.registers.set_zf(false);
        self.registers.set_n(false);
        self.registers.set_h(half);
        self.registers.set_cf(carry);
    }

    fn ld_hl_sp_e8(&mut self) {
        let (result, half, carry) = self.sp_plus_e8();
        self.registers.set_hl(result);
        self.registers.set_zf(false);
        self.registers.set_n(false);
        self.registers.set_h(half);
        self.registers.set_cf(carry);
    }

    fn sp_plus_e8(&mut self) -> (u16, bool, bool) {
        let offset = self.fetch_byte() as i8 as i16 as u16;
        let sp = self.registers.sp;
        let result = sp.wrapping_add(offset);
        let half = (sp & 0xF) + (offset & 0xF) > 0xF;
        let carry = (sp & 0xFF) + (offset & 0xFF) > 0xFF;
        (result, half, carry)
    }

    fn accumulator_op(&mut self, y: u8) {
        match y {
            0 => {
                let mut flags = self.registers.f;
                self.registers.a = alu::rotate_left(self.registers.a, &mut flags);
                flags.set(Flags::ZF, false);
                self.registers.f = flags;
            }
            1 => {
                let mut flags = self.registers.f;
                self.registers.a = alu::rotate_right(self.registers.a, &mut flags);
                flags.set(Flags::ZF, false);
                self.registers.f = flags;
            }
            2 => {
                let mut flags = self.registers.f;
                self.registers.a = alu::rotate_left_carry(self.registers.a, &mut flags);
                flags.set(Flags::ZF, false);
                self.registers.f = flags;
            }
            3 => {
                let mut flags = self.registers.f;
                self.registers.a = alu::rotate_right_carry(self.registers.a, &mut flags);
                flags.set(Flags::ZF, false);
                self.registers.f = flags;
            }
            4 => self.daa(),
            5 => {
                self.registers.a = !self.registers.a;
                self.registers.set_n(true);
                self.registers.set_h(true);
            }
            6 => {
                self.registers.set_n(false);
                self.registers.set_h(false);
                self.registers.set_cf(true);
            }
            7 => {
                self.registers.set_n(false);
                self.registers.set_h(false);
                let carry = self.registers.cf();
                self.registers.set_cf(!carry);
            }
            _ => unreachable!("y is masked to 3 bits"),
        }
    }

    /// Re-bias the accumulator into packed BCD after an add/subtract, per the
    /// standard table of corrections keyed off the carry/half-carry left by
    /// that instruction.
    fn daa(&mut self) {
        let mut adjust = 0u8;
        let mut carry = self.registers.cf();
        let a = self.registers.a;

        if self.registers.h() || (!self.registers.n() && (a & 0xF) > 9) {
            adjust |= 0x06;
        }
        if self.registers.cf() || (!self.registers.n() && a > 0x99) {
            adjust |= 0x60;
            carry = true;
        }

        let result = if self.registers.n() {
            a.wrapping_sub(adjust)
        } else {
            a.wrapping_add(adjust)
        };

        self.registers.a = result;
        self.registers.set_zf(result == 0);
        self.registers.set_h(false);
        self.registers.set_cf(carry);
    }

    fn alu_op(&mut self, op: u8, value: u8) {
        let a = self.registers.a;
        match op {
            0 => {
                let (result, carry) = a.overflowing_add(value);
                let half = (a & 0xF) + (value & 0xF) > 0xF;
                self.registers.a = result;
                self.registers.set_zf(result == 0);
                self.registers.set_n(false);
                self.registers.set_h(half);
                self.registers.set_cf(carry);
            }
            1 => {
                let c = self.registers.cf() as u8;
                let result = a.wrapping_add(value).wrapping_add(c);
                let half = (a & 0xF) + (value & 0xF) + c > 0xF;
                let carry = (a as u16) + (value as u16) + (c as u16) > 0xFF;
                self.registers.a = result;
                self.registers.set_zf(result == 0);
                self.registers.set_n(false);
                self.registers.set_h(half);
                self.registers.set_cf(carry);
            }
            2 => {
                let (result, borrow) = a.overflowing_sub(value);
                let half = (a & 0xF) < (value & 0xF);
                self.registers.a = result;
                self.registers.set_zf(result == 0);
                self.registers.set_n(true);
                self.registers.set_h(half);
                self.registers.set_cf(borrow);
            }
            3 => {
                let c = self.registers.cf() as u8;
                let result = a.wrapping_sub(value).wrapping_sub(c);
                let half = (a & 0xF) < (value & 0xF) + c;
                let borrow = (a as u16) < (value as u16) + (c as u16);
                self.registers.a = result;
                self.registers.set_zf(result == 0);
                self.registers.set_n(true);
                self.registers.set_h(half);
                self.registers.set_cf(borrow);
            }
            4 => {
                let result = a & value;
                self.registers.a = result;
                self.registers.set_zf(result == 0);
                self.registers.set_n(false);
                self.registers.set_h(true);
                self.registers.set_cf(false);
            }
            5 => {
                let result = a ^ value;
                self.registers.a = result;
                self.registers.set_zf(result == 0);
                self.registers.set_n(false);
                self.registers.set_h(false);
                self.registers.set_cf(false);
            }
            6 => {
                let result = a | value;
                self.registers.a = result;
                self.registers.set_zf(result == 0);
                self.registers.set_n(false);
                self.registers.set_h(false);
                self.registers.set_cf(false);
            }
            7 => {
                let (result, borrow) = a.overflowing_sub(value);
                let half = (a & 0xF) < (value & 0xF);
                self.registers.set_zf(result == 0);
                self.registers.set_n(true);
                self.registers.set_h(half);
                self.registers.set_cf(borrow);
            }
            _ => unreachable!("alu op is masked to 3 bits"),
        }
    }
}

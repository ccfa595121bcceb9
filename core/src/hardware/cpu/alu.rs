use crate::hardware::registers::Flags;

/// Rotate left, old bit 7 becomes both the new bit 0 and the carry flag.
/// N and H are always cleared; Z is left to the caller since RLCA clears it
/// unconditionally while the CB-prefixed RLC sets it from the result.
pub fn rotate_left(value: u8, flags: &mut Flags) -> u8 {
    let carry = value & 0x80 != 0;
    let result = value.rotate_left(1);
    set_shift_flags(flags, carry);
    result
}

/// Rotate left through carry: old carry becomes bit 0, old bit 7 becomes the new carry.
pub fn rotate_left_carry(value: u8, flags: &mut Flags) -> u8 {
    let old_carry = flags.contains(Flags::CF) as u8;
    let new_carry = value & 0x80 != 0;
    let result = (value << 1) | old_carry;
    set_shift_flags(flags, new_carry);
    result
}

/// Rotate right, old bit 0 becomes both the new bit 7 and the carry flag.
pub fn rotate_right(value: u8, flags: &mut Flags) -> u8 {
    let carry = value & 0x01 != 0;
    let result = value.rotate_right(1);
    set_shift_flags(flags, carry);
    result
}

/// Rotate right through carry: old carry becomes bit 7, old bit 0 becomes the new carry.
pub fn rotate_right_carry(value: u8, flags: &mut Flags) -> u8 {
    let old_carry = flags.contains(Flags::CF) as u8;
    let new_carry = value & 0x01 != 0;
    let result = (value >> 1) | (old_carry << 7);
    set_shift_flags(flags, new_carry);
    result
}

/// SLA: shift left into carry, bit 0 reset.
pub fn shift_left(value: u8, flags: &mut Flags) -> u8 {
    let carry = value & 0x80 != 0;
    let result = value << 1;
    set_shift_flags(flags, carry);
    result
}

/// SRA: shift right into carry, bit 7 preserved (arithmetic).
pub fn shift_right_arithmetic(value: u8, flags: &mut Flags) -> u8 {
    let carry = value & 0x01 != 0;
    let result = (value >> 1) | (value & 0x80);
    set_shift_flags(flags, carry);
    result
}

/// SRL: shift right into carry, bit 7 reset (logical).
pub fn shift_right_logical(value: u8, flags: &mut Flags) -> u8 {
    let carry = value & 0x01 != 0;
    let result = value >> 1;
    set_shift_flags(flags, carry);
    result
}

/// SWAP: exchange the low and high nibbles. Clears carry.
pub fn swap(value: u8, flags: &mut Flags) -> u8 {
    let result = (value << 4) | (value >> 4);
    flags.set(Flags::N, false);
    flags.set(Flags::H, false);
    flags.set(Flags::CF, false);
    result
}

fn set_shift_flags(flags: &mut Flags, carry: bool) {
    flags.set(Flags::N, false);
    flags.set(Flags::H, false);
    flags.set(Flags::CF, carry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_left_wraps_bit7_into_carry_and_bit0() {
        let mut flags = Flags::empty();
        let result = rotate_left(0b1000_0001, &mut flags);
        assert_eq!(result, 0b0000_0011);
        assert!(flags.contains(Flags::CF));
    }

    #[test]
    fn test_rotate_left_carry_uses_old_carry_as_bit0() {
        let mut flags = Flags::CF;
        let result = rotate_left_carry(0b0000_0001, &mut flags);
        assert_eq!(result, 0b0000_0011);
        assert!(flags.contains(Flags::CF));
    }

    #[test]
    fn test_shift_right_arithmetic_preserves_sign_bit() {
        let mut flags = Flags::empty();
        let result = shift_right_arithmetic(0b1000_0001, &mut flags);
        assert_eq!(result, 0b1100_0000);
        assert!(flags.contains(Flags::CF));
    }

    #[test]
    fn test_swap_exchanges_nibbles() {
        let mut flags = Flags::CF;
        let result = swap(0xAB, &mut flags);
        assert_eq!(result, 0xBA);
        assert!(!flags.contains(Flags::CF));
    }
}

/// CRC-16/CCITT-FALSE as used by the Pix payload trailer: polynomial 0x1021,
/// register starts at 0xFFFF, MSB first, no reflection, no final xor.

use crate::tables::{CRC_INITIAL, CRC_POLYNOMIAL};


/// Compute the checksum over the characters of `payload`. Each character's
/// code point is shifted into the top byte of the register; only its low
/// eight bits can ever reach bit 15, so wider code points contribute their
/// low byte.
pub fn crc16(payload: &str) -> u16 {
    let mut register = CRC_INITIAL;
    for c in payload.chars() {
        register ^= ((c as u32 & 0xFF) as u16) << 8;
        for _ in 0..8 {
            if register & 0x8000 != 0 {
                register = (register << 1) ^ CRC_POLYNOMIAL;
            } else {
                register <<= 1;
            }
        }
    }
    register
}

/// Checksum formatted the way the payload carries it: four uppercase hex
/// digits, zero padded.
pub fn checksum_hex(payload: &str) -> String {
    format!("{:04X}", crc16(payload))
}

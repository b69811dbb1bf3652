//! CRC-16/CCITT-FALSE checksum used as the BR Code integrity field (`63`).
//!
//! Polynomial `0x1021`, initial register `0xFFFF`, no reflection, no final
//! XOR. Input is consumed as UTF-16 code units, one register update per unit.

const POLYNOMIAL: u16 = 0x1021;
const INITIAL: u16 = 0xFFFF;

/// Compute the raw 16-bit checksum over `input`.
pub fn crc16_value(input: &str) -> u16 {
    let mut crc = INITIAL;
    for unit in input.encode_utf16() {
        crc ^= unit << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ POLYNOMIAL;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Compute the checksum over `input` as 4 uppercase, zero-padded hex digits.
///
/// # Examples
///
/// ```rust
/// use pixkit_lib::crc::crc16;
///
/// assert_eq!(crc16("123456789"), "29B1");
/// ```
pub fn crc16(input: &str) -> String {
    format!("{:04X}", crc16_value(input))
}

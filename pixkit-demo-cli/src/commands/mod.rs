//! CLI command implementations

pub mod crc;
pub mod key;
pub mod qr;

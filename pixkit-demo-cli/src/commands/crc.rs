//! Checksum helper

use anyhow::Result;
use pixkit_lib::crc::crc16;

use crate::ui;

/// Print the CRC16 of `text`
pub fn run(text: &str, verbose: bool) -> Result<()> {
    let checksum = crc16(text);
    if verbose {
        ui::key_value("Input", text);
        ui::key_value("Length", &text.chars().count().to_string());
    }
    println!("{}", checksum);
    Ok(())
}

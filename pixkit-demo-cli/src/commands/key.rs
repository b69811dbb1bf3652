//! Recipient key inspection

use anyhow::Result;
use pixkit_lib::key::{classify as classify_key, format};
use pixkit_lib::KeyType;

use crate::ui;

/// Show the detected type and canonical form of a raw key
pub fn classify(raw: &str, verbose: bool) -> Result<()> {
    ui::header("Recipient Key");

    let key_type = classify_key(raw);
    ui::key_value("Input", raw);
    ui::key_value("Type", key_type.as_str());

    match format(raw, key_type) {
        Ok(formatted) => {
            ui::key_value("Formatted", &formatted);
            if verbose {
                ui::key_value("Length", &formatted.chars().count().to_string());
            }
        }
        Err(e) => {
            ui::error(&e.to_string());
            return Err(e.into());
        }
    }

    if key_type == KeyType::Unknown {
        ui::warning("Key type not recognized; it will be used as entered");
    }

    Ok(())
}

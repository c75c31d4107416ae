//! Translation table listing.

use anyhow::Result;
use c64_matrix::ShiftPolicy;
use irkey_c64::config::keymap_to_toml;
use irkey_c64::Config;
use irkey_protocol::hid;

use crate::cli::KeymapFormat;

pub fn print(config: &Config, format: KeymapFormat) -> Result<()> {
    let table = config.load_keymap()?;
    match format {
        KeymapFormat::Toml => print!("{}", keymap_to_toml(&table)?),
        KeymapFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&c64_matrix::KeymapFile::from(&table))?
        ),
        KeymapFormat::Table => {
            match config.keymap_path() {
                Some(path) => println!("Keymap: {}", path.display()),
                None => println!("Keymap: built-in"),
            }
            println!("{} entries\n", table.len());
            println!("{:<12} {:<18} {:<8} Auto-shift", "Input", "Output", "Shift in");
            println!("{}", "-".repeat(56));
            for entry in table.entries() {
                let input = format!("{} (0x{:02X})", hid::key_name(entry.input), entry.input);
                let shift_in = match (
                    entry.flags.contains(ShiftPolicy::NO_SHIFT),
                    entry.flags.contains(ShiftPolicy::SHIFT),
                ) {
                    (true, true) => "any",
                    (true, false) => "up",
                    (false, true) => "down",
                    (false, false) => "never",
                };
                let auto = if entry.flags.auto_shift(false) {
                    "always"
                } else if entry.flags.auto_shift(true) {
                    "with shift"
                } else {
                    "no"
                };
                println!(
                    "{:<12} {:<18} {:<8} {}",
                    input,
                    entry.output.to_string(),
                    shift_in,
                    auto
                );
            }
        }
    }
    Ok(())
}

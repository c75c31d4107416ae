// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "irkey-c64")]
#[command(author, version, about = "IR keyboard and joystick to C64 keyboard matrix bridge")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/irkey-c64/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a capture file through the decoder and a simulated switch matrix
    #[command(visible_alias = "r")]
    Replay {
        /// Capture file (one frame per line)
        capture: PathBuf,

        /// Print the matrix state after every applied key
        #[arg(long)]
        dump: bool,
    },

    /// Decode one frame given as pulse durations
    #[command(visible_alias = "d")]
    Decode {
        /// Durations in µs, first mark first (commas or spaces)
        #[arg(required = true, num_args = 1..)]
        pulses: Vec<String>,
    },

    /// Print the pulse train for a key or joystick event
    #[command(visible_alias = "e")]
    Encode {
        #[command(subcommand)]
        event: EncodeEvent,
    },

    /// Print the active translation table
    #[command(visible_aliases = ["map", "k"])]
    Keymap {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: KeymapFormat,
    },
}

#[derive(Subcommand)]
pub enum EncodeEvent {
    /// Keyboard key event
    Key {
        /// HID key name or usage code (e.g. "A", "Up", 0x52)
        key: String,

        /// Key release instead of press
        #[arg(long)]
        release: bool,

        /// Repeat flag
        #[arg(long)]
        repeat: bool,

        /// Modifier byte (0x01 shift, 0x02 alt, 0x04 ctrl, 0x08 gui)
        #[arg(short, long, default_value = "0", value_parser = parse_u8)]
        modifier: u8,
    },

    /// Joystick protocol frame
    Joystick {
        /// X axis (-64..=63)
        #[arg(allow_hyphen_values = true, value_parser = clap::value_parser!(i8).range(-64..=63))]
        x: i8,

        /// Y axis (-64..=63)
        #[arg(allow_hyphen_values = true, value_parser = clap::value_parser!(i8).range(-64..=63))]
        y: i8,

        #[arg(long)]
        button1: bool,

        #[arg(long)]
        button2: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KeymapFormat {
    /// Human-readable table
    Table,
    /// Keymap file (TOML)
    Toml,
    /// JSON
    Json,
}

/// Parse a decimal or 0x-prefixed hex byte
pub fn parse_u8(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid byte \"{s}\": {e}"))
}

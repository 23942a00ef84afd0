//! Build script for keystone-firmware
//!
//! - Sets up linker arguments (memory.x comes from embassy-stm32)
//! - Validates board.toml and turns it into Rust constants

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use keystone_core::config::BoardConfig;

fn main() {
    setup_linker();
    generate_board_config();
}

/// Linker arguments for cortex-m-rt and defmt
fn setup_linker() {
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate board.toml and write `board.rs` into OUT_DIR
fn generate_board_config() {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Failed to read board.toml                                ║\n\
            ║                                                                  ║\n\
            ║  Error: {:<56} ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            e
        ),
    };

    let config: BoardConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board.toml                                       ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&e.to_string())
        ),
    };

    if let Err(e) = config.validate() {
        let detail = match e {
            keystone_core::config::ConfigError::EmptyRegion => {
                "a region has sector_count = 0".to_string()
            }
            keystone_core::config::ConfigError::OutOfRange => {
                "a region runs past the last sector number".to_string()
            }
            keystone_core::config::ConfigError::Overlap(i) => format!(
                "deployment region overlaps reserved region '{}'",
                config.reserved[i].name
            ),
        };
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml failed validation                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&detail)
        );
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("board.rs"), render(&config)).unwrap();

    println!("cargo:warning=board.toml validated successfully");
}

/// Render the constants the firmware includes
fn render(config: &BoardConfig) -> String {
    let mut out = String::new();
    writeln!(out, "// Generated from board.toml by build.rs").unwrap();
    writeln!(
        out,
        "pub const DEPLOYMENT: keystone_core::DeploymentLayout = \
         keystone_core::DeploymentLayout::new({}, {});",
        config.deployment.base_sector, config.deployment.sector_count
    )
    .unwrap();
    writeln!(
        out,
        "pub const CLOCK: keystone_core::ClockConfig = \
         keystone_core::ClockConfig {{ external_oscillator: {} }};",
        config.clock.external_oscillator
    )
    .unwrap();
    let hold_line = match config.bootloader_hold {
        Some(hold) => writeln!(
            out,
            "pub const BOOTLOADER_HOLD: Option<keystone_core::BootloaderHold> = \
             Some(keystone_core::BootloaderHold {{ address: {:#010x}, value: {:#010x} }});",
            hold.address, hold.value
        ),
        None => writeln!(
            out,
            "pub const BOOTLOADER_HOLD: Option<keystone_core::BootloaderHold> = None;"
        ),
    };
    hold_line.unwrap();
    out
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

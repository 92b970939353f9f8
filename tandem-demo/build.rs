//! Build script for tandem-demo
//!
//! Validates platform.toml at compile time so a broken configuration never
//! makes it into the binary.

use std::fs;
use std::path::Path;

#[path = "build/report.rs"]
mod report;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=build/report.rs");
    validate_config();
}

fn validate_config() {
    println!("cargo:rerun-if-changed=platform.toml");

    let config_path = Path::new("platform.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read platform.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in platform.toml",
            &e.to_string().lines().map(str::to_owned).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_timeouts(&config, &mut errors);
    validate_board(&config, &mut errors);
    if !errors.is_empty() {
        fail("Invalid values in platform.toml", &errors);
    }
}

fn validate_timeouts(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(toml::Value::Table(timeouts)) = config.get("timeouts") else {
        return;
    };
    for (name, value) in timeouts {
        match value {
            toml::Value::Integer(ms) if (0..=i64::from(u32::MAX)).contains(ms) => {}
            _ => errors.push(format!("[timeouts] {} must be a millisecond count", name)),
        }
    }
    if let Some(toml::Value::Integer(0)) = timeouts.get("probe_ms") {
        errors.push("[timeouts] probe_ms must be non-zero".to_owned());
    }
}

fn validate_board(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(toml::Value::Table(board)) = config.get("board") else {
        return;
    };
    if let Some(toml::Value::Array(devices)) = board.get("i2c_devices") {
        for device in devices {
            match device {
                toml::Value::Integer(addr) if (0..=0x7F).contains(addr) => {}
                other => errors.push(format!(
                    "[board] i2c_devices entry {} is not a 7-bit address",
                    other
                )),
            }
        }
    }
    if let Some(toml::Value::Integer(pin)) = board.get("button_pin") {
        if !(0..=i64::from(u16::MAX)).contains(pin) {
            errors.push("[board] button_pin must fit in 16 bits".to_owned());
        }
    }
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| report::row(line))
        .collect::<Vec<_>>()
        .join("\n");
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

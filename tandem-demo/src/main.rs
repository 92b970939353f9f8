//! Tandem host demo
//!
//! Runs the peripheral layer against simulated controllers. Lines typed on
//! stdin arrive on the console UART; `help` lists the commands. `press`
//! plays the user button, which wakes the master task to scan the I2C bus.

mod commands;
mod platform;

use std::io::{self, Read};
use std::process::ExitCode;

use platform::Console;

/// Configuration baked in at compile time (validated by build.rs)
const EMBEDDED_CONFIG: &str = include_str!("../platform.toml");

fn main() -> ExitCode {
    let config = match platform::load_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let (platform, wire) = match platform::init(&config) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("platform init failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    install_post_mortem(platform.debugger);

    if let Err(e) = platform::start(platform) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    // stdin is the far end of the console UART
    let mut stdin = io::stdin().lock();
    let mut buf = [0u8; 64];
    loop {
        match stdin.read(&mut buf) {
            Ok(0) => return ExitCode::SUCCESS,
            Ok(n) => wire.feed(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                eprintln!("stdin: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
}

/// Report panics on the console before the process exits
fn install_post_mortem(debugger: &'static Console) {
    std::panic::set_hook(Box::new(move |info| {
        debugger.dump_post_mortem(format_args!("{}", info), None);
        std::process::exit(101);
    }));
}

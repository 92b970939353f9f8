//! Console commands
//!
//! One word per command, arguments in hex. Output goes through the
//! debugger so it never interleaves with the master task's reports.

use core::fmt::Write;

use heapless::String;
use tandem_core::driver::UartError;

use crate::platform::Platform;

const HELP: &str = "\
commands:\r\n\
  help                    this text\r\n\
  scan                    probe every I2C address\r\n\
  read <addr> <reg> [n]   read n bytes from an I2C register\r\n\
  spi <byte>...           full-duplex transfer with the flash\r\n\
  press                   press the user button\r\n\
  assert                  report a failed parameter check\r\n\
  panic                   stop with a post-mortem report\r\n\
an empty line repeats the last command\r\n";

/// Longest transfer the console will issue
const MAX_BYTES: usize = 16;

/// Run one command line
pub fn execute(platform: &Platform, line: &str) {
    let console = platform.debugger;
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return;
    };

    let result = match command {
        "help" => console.print_str(HELP),
        "scan" => {
            let table = platform.i2c.lock().scan(platform.config.timeouts.probe());
            console.print(format_args!("{}", table))
        }
        "read" => read_register(platform, words),
        "spi" => spi_transfer(platform, words),
        "press" => {
            platform.button.press();
            Ok(())
        }
        "assert" => console.assert_failed(file!(), line!()),
        "panic" => panic!("requested from the console"),
        other => console.print(format_args!("unknown command '{}'\r\n", other)),
    };

    if let Err(e) = result {
        eprintln!("console output failed: {}", e);
    }
}

fn read_register<'w>(
    platform: &Platform,
    mut args: impl Iterator<Item = &'w str>,
) -> Result<(), UartError> {
    let console = platform.debugger;
    let address = args.next().and_then(parse_byte).filter(|a| *a <= 0x7F);
    let register = args.next().and_then(parse_byte);
    let (Some(address), Some(register)) = (address, register) else {
        return console.print_str("usage: read <addr 00..7F> <reg> [n]\r\n");
    };
    let len = args
        .next()
        .and_then(|w| w.parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_BYTES);

    let mut buf = [0u8; MAX_BYTES];
    let result = platform.i2c.lock().transmit_then_receive(
        address,
        &[register],
        &mut buf[..len],
        platform.config.timeouts.i2c(),
    );
    match console.escalate(result) {
        Ok(()) => {
            let mut line: String<80> = String::new();
            let _ = write!(line, "{:02X}:{:02X} ->", address, register);
            print_bytes(platform, line, &buf[..len])
        }
        Err(e) => console.print(format_args!("read failed: {}\r\n", e)),
    }
}

fn spi_transfer<'w>(
    platform: &Platform,
    args: impl Iterator<Item = &'w str>,
) -> Result<(), UartError> {
    let console = platform.debugger;
    let mut tx = [0u8; MAX_BYTES];
    let mut len = 0;
    for word in args {
        let Some(byte) = parse_byte(word) else {
            return console.print(format_args!("not a byte: '{}'\r\n", word));
        };
        if len == MAX_BYTES {
            return console.print_str("too many bytes\r\n");
        }
        tx[len] = byte;
        len += 1;
    }
    if len == 0 {
        return console.print_str("usage: spi <byte>...\r\n");
    }

    let mut rx = [0u8; MAX_BYTES];
    let result = {
        let mut flash = match platform.flash.lock() {
            Ok(flash) => flash,
            Err(poisoned) => poisoned.into_inner(),
        };
        platform.spi.transmit_and_receive(
            &mut *flash,
            &tx[..len],
            &mut rx[..len],
            platform.config.timeouts.spi(),
        )
    };
    match console.escalate(result) {
        Ok(()) => {
            let mut line: String<80> = String::new();
            let _ = line.push_str("spi ->");
            print_bytes(platform, line, &rx[..len])
        }
        Err(e) => console.print(format_args!("spi failed: {}\r\n", e)),
    }
}

fn print_bytes(platform: &Platform, mut line: String<80>, bytes: &[u8]) -> Result<(), UartError> {
    for byte in bytes {
        let _ = write!(line, " {:02X}", byte);
    }
    let _ = line.push_str("\r\n");
    platform.debugger.print_str(&line)
}

fn parse_byte(word: &str) -> Option<u8> {
    let digits = word
        .strip_prefix("0x")
        .or_else(|| word.strip_prefix("0X"))
        .unwrap_or(word);
    u8::from_str_radix(digits, 16).ok()
}

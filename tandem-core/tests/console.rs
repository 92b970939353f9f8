mod common;

use std::thread;

use common::{board, Board, HostUart, Sem, LONG};
use tandem_core::console::{Debugger, EditMode, Submission, CHUNK_SIZE};
use tandem_core::driver::{TransferError, UartError};
use tandem_hal_host::SimUart;

fn debugger(board: &Board) -> &'static Debugger<'static, Sem, SimUart> {
    let uart: &'static HostUart = board.uart;
    Box::leak(Box::new(Debugger::new(uart, LONG)))
}

#[test]
fn test_long_print_arrives_intact() {
    let board = board();
    let console = debugger(&board);

    let text: String = (0..CHUNK_SIZE * 3 + 7)
        .map(|i| char::from(b'a' + (i % 26) as u8))
        .collect();
    console.print(format_args!("{}\r\n", text)).unwrap();

    assert_eq!(board.uart_wire.sent_text(), format!("{}\r\n", text));
}

#[test]
fn test_concurrent_prints_do_not_interleave() {
    let board = board();
    let console = debugger(&board);

    let writers: Vec<_> = ['A', 'B', 'C']
        .into_iter()
        .map(|tag| {
            thread::spawn(move || {
                let body: String = std::iter::repeat(tag).take(CHUNK_SIZE + 10).collect();
                for _ in 0..10 {
                    console.print(format_args!("{}\r\n", body)).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let sent = board.uart_wire.sent_text();
    let lines: Vec<&str> = sent.split_terminator("\r\n").collect();
    assert_eq!(lines.len(), 30);
    for line in lines {
        let first = line.chars().next().unwrap();
        assert!(line.chars().all(|c| c == first), "interleaved: {line}");
        assert_eq!(line.len(), CHUNK_SIZE + 10);
    }
}

#[test]
fn test_read_line_echoes_and_edits() {
    let board = board();
    let console = debugger(&board);
    board.uart_wire.feed(b"scam\x08n\r\n");

    let line = console.read_line().unwrap();
    assert_eq!(line.text(), Some("scan"));
    assert_eq!(board.uart_wire.sent_text(), "scam\x08 \x08n\r\n");
}

#[test]
fn test_auto_re_print_repeats_last_command_once_per_empty_line() {
    let board = board();
    let console = debugger(&board);
    console.auto_re_print();
    assert_eq!(console.edit_mode(), EditMode::AutoRePrint);

    board.uart_wire.feed(b"scan\r\r");
    assert_eq!(console.next_command().unwrap().as_str(), "scan");
    board.uart_wire.clear_sent();

    let repeated = console.read_line().unwrap();
    assert!(matches!(&repeated, Submission::Repeat(text) if text.as_str() == "scan"));
    assert_eq!(board.uart_wire.sent_text(), "scan\r\n");

    // Nothing further was queued: the single empty line produced one repeat.
    let uart = board.uart;
    let mut byte = [0u8; 1];
    assert_eq!(
        uart.receive(&mut byte, common::SHORT),
        Err(TransferError::Timeout)
    );
}

#[test]
fn test_empty_line_is_skipped_without_auto_re_print() {
    let board = board();
    let console = debugger(&board);
    board.uart_wire.feed(b"\r\rhelp\r");
    assert_eq!(console.next_command().unwrap().as_str(), "help");
}

#[test]
fn test_assert_failed_message() {
    let board = board();
    let console = debugger(&board);
    console.assert_failed("main.c", 42).unwrap();
    assert_eq!(
        board.uart_wire.sent_text(),
        "Wrong parameters value: file main.c on line 42\r\n"
    );
}

#[test]
fn test_post_mortem_report_uses_polling_path() {
    let board = board();
    let console = debugger(&board);
    board.uart_wire.feed(b"scan\r");
    console.next_command().unwrap();
    board.uart_wire.clear_sent();

    // Interrupts are dead; the report must still get out.
    board.uart_wire.set_stalled(true);
    let location = std::panic::Location::caller();
    console.dump_post_mortem(format_args!("bus fault"), Some(location));

    let report = board.uart_wire.sent_text();
    assert!(report.contains("POST MORTEM"));
    assert!(report.contains("cause: bus fault"));
    assert!(report.contains(&format!("at {}:{}", location.file(), location.line())));
    assert!(report.contains("last command: scan"));
}

#[test]
fn test_escalate_passes_runtime_errors_through() {
    let board = board();
    let console = debugger(&board);

    let timeout: Result<(), UartError> = Err(TransferError::Timeout);
    assert_eq!(console.escalate(timeout), Err(TransferError::Timeout));
    assert_eq!(console.escalate(Ok::<u8, UartError>(5)), Ok(5));
}

#[test]
fn test_print_reports_transmit_timeout() {
    let board = board();
    let uart: &'static HostUart = board.uart;
    let console = Box::leak(Box::new(Debugger::new(uart, common::SHORT)));
    board.uart_wire.set_stalled(true);

    assert_eq!(
        console.print_str("lost"),
        Err(TransferError::Timeout)
    );
}

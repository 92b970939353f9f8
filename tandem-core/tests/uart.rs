mod common;

use std::thread;

use common::{board, sleep_ms, LONG, SHORT};
use tandem_core::driver::TransferError;
use tandem_hal::{StartError, UartFault};

#[test]
fn test_transmit_completes_through_interrupt() {
    let board = board();
    board.uart.transmit(b"hello\r\n", LONG).unwrap();
    assert_eq!(board.uart_wire.sent(), b"hello\r\n");
}

#[test]
fn test_receive_returns_fed_bytes() {
    let board = board();
    let wire = board.uart_wire.clone();
    let feeder = thread::spawn(move || {
        sleep_ms(20);
        wire.feed(b"abcd");
    });

    let mut buf = [0u8; 4];
    assert_eq!(board.uart.receive(&mut buf, LONG), Ok(4));
    assert_eq!(&buf, b"abcd");
    feeder.join().unwrap();
}

#[test]
fn test_bytes_fed_before_receive_are_kept() {
    let board = board();
    board.uart_wire.feed(b"xy");
    let mut buf = [0u8; 2];
    assert_eq!(board.uart.receive(&mut buf, LONG), Ok(2));
    assert_eq!(&buf, b"xy");
}

#[test]
fn test_receive_times_out_then_recovers() {
    let board = board();
    let mut buf = [0u8; 3];
    assert_eq!(board.uart.receive(&mut buf, SHORT), Err(TransferError::Timeout));

    board.uart_wire.feed(b"late");
    assert_eq!(board.uart.receive(&mut buf, LONG), Ok(3));
    assert_eq!(&buf, b"lat");
}

#[test]
fn test_line_fault_surfaces_as_hardware_error() {
    let board = board();
    let wire = board.uart_wire.clone();
    let injector = thread::spawn(move || {
        sleep_ms(30);
        wire.inject_fault(UartFault::Framing);
    });

    let mut buf = [0u8; 8];
    assert_eq!(
        board.uart.receive(&mut buf, LONG),
        Err(TransferError::Hardware(UartFault::Framing))
    );
    injector.join().unwrap();
}

#[test]
fn test_transmit_while_pending_is_busy() {
    let board = board();
    board.uart_wire.set_stalled(true);

    let uart = board.uart;
    let first = thread::spawn(move || uart.transmit(b"first", common::Timeout::Millis(300)));
    sleep_ms(50);

    assert_eq!(board.uart.transmit(b"second", LONG), Err(TransferError::Busy));
    assert_eq!(first.join().unwrap(), Err(TransferError::Timeout));
}

#[test]
fn test_late_completion_after_timeout_is_discarded() {
    let board = board();
    board.uart_wire.set_delay(std::time::Duration::from_millis(80));
    assert_eq!(board.uart.transmit(b"slow", SHORT), Err(TransferError::Timeout));

    // Let the stale completion arrive while the driver is idle.
    sleep_ms(150);
    board.uart_wire.set_stalled(true);
    assert_eq!(board.uart.transmit(b"next", SHORT), Err(TransferError::Timeout));
}

#[test]
fn test_oversized_transmit_is_rejected_and_driver_stays_usable() {
    let board = board();
    let big = [0x55u8; 300];
    assert_eq!(
        board.uart.transmit(&big, LONG),
        Err(TransferError::Rejected(StartError::TooLong))
    );
    board.uart.transmit(b"ok", LONG).unwrap();
}

#[test]
fn test_controllers_complete_independently() {
    let board = board();
    board.uart2_wire.set_stalled(true);

    board.uart.transmit(b"one", LONG).unwrap();
    assert_eq!(board.uart2.transmit(b"two", SHORT), Err(TransferError::Timeout));
    assert_eq!(board.uart_wire.sent(), b"one");
}

#[test]
fn test_polling_transmit_bypasses_interrupts() {
    let board = board();
    board.uart_wire.set_stalled(true);
    board.uart.transmit_polling(b"fatal");
    assert_eq!(board.uart_wire.sent(), b"fatal");
}

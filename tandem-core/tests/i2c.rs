mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use common::{board, HostI2c, Sem, LONG, SHORT};
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use tandem_core::driver::TransferError;
use tandem_core::scan::{Probe, ADDRESSES};
use tandem_core::sync::TaskMutex;
use tandem_hal::{AfterWrite, StartError};

#[test]
fn test_write_reaches_device() {
    let board = board();
    board.i2c_bus.add_device(0x50);

    board.i2c.transmit(0x50, &[0x00, 0x42], LONG).unwrap();
    assert_eq!(
        board.i2c_bus.writes(0x50),
        vec![(vec![0x00, 0x42], AfterWrite::Stop)]
    );
}

#[test]
fn test_missing_device_is_not_acknowledged() {
    let board = board();
    assert_eq!(
        board.i2c.transmit(0x3C, &[1], LONG),
        Err(TransferError::Hardware(ErrorKind::NoAcknowledge(
            NoAcknowledgeSource::Address
        )))
    );
}

#[test]
fn test_eight_bit_address_rejected() {
    let board = board();
    assert_eq!(
        board.i2c.transmit(0x80, &[1], LONG),
        Err(TransferError::Rejected(StartError::InvalidAddress))
    );
}

#[test]
fn test_register_read_uses_repeated_start() {
    let board = board();
    board.i2c_bus.set_response(0x1A, &[0xDE, 0xAD]);

    let mut rx = [0u8; 3];
    board
        .i2c
        .transmit_then_receive(0x1A, &[0x0F], &mut rx, LONG)
        .unwrap();

    assert_eq!(rx, [0xDE, 0xAD, 0xFF]);
    assert_eq!(
        board.i2c_bus.writes(0x1A),
        vec![(vec![0x0F], AfterWrite::RepeatedStart)]
    );
}

#[test]
fn test_receive_fills_buffer() {
    let board = board();
    board.i2c_bus.set_response(0x68, &[1, 2, 3, 4]);
    let mut rx = [0u8; 4];
    board.i2c.receive(0x68, &mut rx, LONG).unwrap();
    assert_eq!(rx, [1, 2, 3, 4]);
}

#[test]
fn test_bus_fault_surfaces() {
    let board = board();
    board.i2c_bus.add_device(0x50);
    board.i2c_bus.force_fault(Some(ErrorKind::ArbitrationLoss));
    assert_eq!(
        board.i2c.transmit(0x50, &[0], LONG),
        Err(TransferError::Hardware(ErrorKind::ArbitrationLoss))
    );
}

#[test]
fn test_stalled_bus_times_out() {
    let board = board();
    board.i2c_bus.add_device(0x50);
    board.i2c_bus.set_stalled(true);
    assert_eq!(board.i2c.transmit(0x50, &[0], SHORT), Err(TransferError::Timeout));

    board.i2c_bus.set_stalled(false);
    board.i2c.transmit(0x50, &[0], LONG).unwrap();
}

#[test]
fn test_probe_classifies_outcomes() {
    let board = board();
    board.i2c_bus.add_device(0x50);

    assert_eq!(board.i2c.probe(0x50, LONG), Probe::Acknowledge);
    assert_eq!(board.i2c.probe(0x51, LONG), Probe::NoAcknowledge);
    assert_eq!(board.i2c.probe(0x80, LONG), Probe::Error);

    board.i2c_bus.force_fault(Some(ErrorKind::Bus));
    assert_eq!(board.i2c.probe(0x50, LONG), Probe::Error);
}

#[test]
fn test_scan_and_register_reads_share_the_bus_under_task_mutex() {
    let board = board();
    board.i2c_bus.add_device(0x50);
    board.i2c_bus.set_response(0x50, &[0x5A]);
    board.i2c_bus.set_delay(Duration::from_micros(200));

    let bus: &'static TaskMutex<Sem, &'static HostI2c> =
        Box::leak(Box::new(TaskMutex::new(board.i2c)));
    let done: &'static AtomicBool = Box::leak(Box::new(AtomicBool::new(false)));

    let reader = thread::spawn(move || {
        let mut reads = 0;
        loop {
            let mut rx = [0u8; 1];
            bus.lock()
                .transmit_then_receive(0x50, &[0x00], &mut rx, LONG)
                .unwrap();
            assert_eq!(rx, [0x5A]);
            reads += 1;
            if done.load(Ordering::SeqCst) {
                break reads;
            }
        }
    });

    let table = bus.lock().scan(LONG);
    done.store(true, Ordering::SeqCst);
    let reads = reader.join().unwrap();

    assert!(reads >= 1);
    for address in 0..ADDRESSES as u8 {
        assert_ne!(table.get(address), Probe::Error, "address {:#04x}", address);
    }
    assert_eq!(table.responders().collect::<Vec<_>>(), vec![0x50]);
}

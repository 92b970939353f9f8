mod common;

use common::{board, LONG, SHORT};
use embedded_hal::spi::ErrorKind;
use tandem_core::driver::{SpiSlaveSpecifier, TransferError};
use tandem_hal::{Mode, Phase, Polarity, StartError};
use tandem_hal_host::SimPin;

#[test]
fn test_full_duplex_transfer_with_chip_select() {
    let board = board();
    let cs = SimPin::new();
    let mut slave = SpiSlaveSpecifier::new(Mode::Mode3, cs.clone());
    board.spi_bus.queue_reply(&[0xA5, 0x5A]);

    let mut rx = [0u8; 2];
    board
        .spi
        .transmit_and_receive(&mut slave, &[0x9F, 0x00], &mut rx, LONG)
        .unwrap();

    assert_eq!(rx, [0xA5, 0x5A]);
    assert_eq!(board.spi_bus.sent(), vec![(Mode::Mode3, vec![0x9F, 0x00])]);
    assert_eq!(cs.history(), vec![false, true]);
}

#[test]
fn test_slaves_with_different_modes_share_the_bus() {
    let board = board();
    let mut flash = SpiSlaveSpecifier::new(Mode::Mode0, SimPin::new());
    let mut adc = SpiSlaveSpecifier::with_clock(
        Polarity::IdleLow,
        Phase::CaptureOnSecondTransition,
        SimPin::new(),
    );

    board.spi.transmit(&mut flash, &[1], LONG).unwrap();
    board.spi.transmit(&mut adc, &[2], LONG).unwrap();

    assert_eq!(
        board.spi_bus.sent(),
        vec![(Mode::Mode0, vec![1]), (Mode::Mode1, vec![2])]
    );
}

#[test]
fn test_mismatched_lengths_rejected_before_selecting() {
    let board = board();
    let cs = SimPin::new();
    let mut slave = SpiSlaveSpecifier::new(Mode::Mode0, cs.clone());

    let mut rx = [0u8; 1];
    assert_eq!(
        board.spi.transmit_and_receive(&mut slave, &[1, 2], &mut rx, LONG),
        Err(TransferError::Rejected(StartError::InvalidArgument))
    );
    assert!(cs.history().is_empty());
}

#[test]
fn test_chip_select_released_after_fault() {
    let board = board();
    let cs = SimPin::new();
    let mut slave = SpiSlaveSpecifier::new(Mode::Mode0, cs.clone());
    board.spi_bus.force_fault(Some(ErrorKind::Overrun));

    let mut rx = [0u8; 1];
    assert_eq!(
        board.spi.transmit_and_receive(&mut slave, &[1], &mut rx, LONG),
        Err(TransferError::Hardware(ErrorKind::Overrun))
    );
    assert!(cs.is_high());
}

#[test]
fn test_chip_select_released_after_timeout() {
    let board = board();
    let cs = SimPin::new();
    let mut slave = SpiSlaveSpecifier::new(Mode::Mode0, cs.clone());
    board.spi_bus.set_stalled(true);

    assert_eq!(
        board.spi.transmit(&mut slave, &[1], SHORT),
        Err(TransferError::Timeout)
    );
    assert_eq!(cs.history(), vec![false, true]);
}

#[test]
fn test_chip_select_fault_leaves_driver_idle() {
    let board = board();
    let cs = SimPin::new();
    let mut slave = SpiSlaveSpecifier::new(Mode::Mode0, cs.clone());

    cs.set_failing(true);
    assert_eq!(
        board.spi.transmit(&mut slave, &[1], LONG),
        Err(TransferError::Hardware(ErrorKind::ChipSelectFault))
    );

    cs.set_failing(false);
    board.spi.transmit(&mut slave, &[1], LONG).unwrap();
    assert!(cs.is_high());
}

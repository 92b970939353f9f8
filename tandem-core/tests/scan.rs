mod common;

use common::board;
use embedded_hal::i2c::ErrorKind;
use tandem_core::scan::Probe;
use tandem_hal::Timeout;

const PROBE: Timeout = Timeout::Millis(200);

#[test]
fn test_scan_shows_only_attached_devices() {
    let board = board();
    board.i2c_bus.add_device(0x1A);
    board.i2c_bus.add_device(0x50);

    let table = board.i2c.scan(PROBE);
    assert_eq!(table.responders().collect::<Vec<_>>(), vec![0x1A, 0x50]);

    let text = table.to_string();
    let rows: Vec<&str> = text.split("\r\n").skip(2).take(8).collect();
    assert_eq!(rows.len(), 8);
    for row in &rows {
        assert_eq!(row.len(), "70 |".len() + 16 * 3);
    }
    assert_eq!(rows[1], "10 | -- -- -- -- -- -- -- -- -- -- 1A -- -- -- -- --");
    assert_eq!(rows[5], "50 | 50 -- -- -- -- -- -- -- -- -- -- -- -- -- -- --");
    let shown = rows
        .iter()
        .flat_map(|row| row[4..].split_whitespace())
        .filter(|cell| *cell != "--")
        .count();
    assert_eq!(shown, 2);
}

#[test]
fn test_scan_on_faulty_bus_marks_every_cell() {
    let board = board();
    board.i2c_bus.force_fault(Some(ErrorKind::Bus));

    let table = board.i2c.scan(PROBE);
    assert!((0..128).all(|address| table.get(address) == Probe::Error));
    assert!(!table.to_string().contains(" --"));
}

#[test]
fn test_scan_on_stalled_bus_finishes() {
    let board = board();
    board.i2c_bus.set_stalled(true);

    let table = board.i2c.scan(Timeout::Millis(1));
    assert_eq!(table.responders().count(), 0);
    assert_eq!(table.get(0x00), Probe::Error);
}

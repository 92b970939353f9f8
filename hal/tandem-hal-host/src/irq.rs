//! Simulated interrupt controller
//!
//! Every simulated controller raises its interrupts through an [`IrqLine`].
//! One dispatcher thread delivers them in deadline order, so handlers never
//! run concurrently with each other, as on a single-core MCU.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tandem_hal::Interrupt;

struct Raised {
    due: Instant,
    seq: u64,
    irq: Interrupt,
}

/// Sending side of the interrupt controller
#[derive(Clone)]
pub struct IrqLine {
    tx: Sender<(Instant, Interrupt)>,
}

impl IrqLine {
    /// Raise an interrupt now
    pub fn raise(&self, irq: Interrupt) {
        self.raise_after(irq, Duration::ZERO);
    }

    /// Raise an interrupt once `delay` has elapsed
    pub fn raise_after(&self, irq: Interrupt, delay: Duration) {
        // A stopped controller drops interrupts, like masked hardware.
        let _ = self.tx.send((Instant::now() + delay, irq));
    }
}

/// Queue of raised interrupts plus the thread that dispatches them
pub struct InterruptController {
    tx: Sender<(Instant, Interrupt)>,
    rx: Receiver<(Instant, Interrupt)>,
}

impl InterruptController {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// New line for a simulated controller to raise interrupts on
    pub fn line(&self) -> IrqLine {
        IrqLine {
            tx: self.tx.clone(),
        }
    }

    /// Start the dispatcher thread
    ///
    /// `dispatch` is called once per interrupt, in due order. The thread
    /// exits after every [`IrqLine`] has been dropped and the queue drained.
    pub fn run<F>(self, dispatch: F) -> io::Result<JoinHandle<()>>
    where
        F: Fn(Interrupt) + Send + 'static,
    {
        let Self { tx, rx } = self;
        drop(tx);

        thread::Builder::new()
            .name("irq".to_owned())
            .spawn(move || dispatch_loop(&rx, dispatch))
    }
}

impl Default for InterruptController {
    fn default() -> Self {
        Self::new()
    }
}

fn dispatch_loop<F: Fn(Interrupt)>(rx: &Receiver<(Instant, Interrupt)>, dispatch: F) {
    let mut pending: Vec<Raised> = Vec::new();
    let mut seq = 0u64;
    let mut connected = true;

    loop {
        let now = Instant::now();
        while let Some(index) = next_due(&pending, now) {
            let raised = pending.swap_remove(index);
            dispatch(raised.irq);
        }

        let received = match pending.iter().map(|r| r.due).min() {
            Some(due) if connected => rx
                .recv_timeout(due.saturating_duration_since(Instant::now()))
                .map_err(|e| e == RecvTimeoutError::Disconnected),
            Some(due) => {
                thread::sleep(due.saturating_duration_since(Instant::now()));
                continue;
            }
            None if connected => rx.recv().map_err(|_| true),
            None => return,
        };

        match received {
            Ok((due, irq)) => {
                pending.push(Raised { due, seq, irq });
                seq += 1;
            }
            Err(disconnected) => connected &= !disconnected,
        }
    }
}

/// Earliest interrupt whose deadline has passed, oldest first on ties
fn next_due(pending: &[Raised], now: Instant) -> Option<usize> {
    pending
        .iter()
        .enumerate()
        .filter(|(_, r)| r.due <= now)
        .min_by_key(|(_, r)| (r.due, r.seq))
        .map(|(index, _)| index)
}

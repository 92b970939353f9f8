use core::cell::RefCell;
use core::fmt::{self, Write};
use core::panic::{Location, PanicInfo};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::{String, Vec};
use tandem_hal::{BinarySemaphore, Timeout, UartPort};

use super::{EditMode, Input, LineEditor, Submission};
use crate::driver::{ProgrammingFault, Uart, UartError};
use crate::sync::TaskLock;

/// Longest console input line
pub const MAX_LINE: usize = 64;

/// Bytes formatted before each transmit
pub const CHUNK_SIZE: usize = 64;

/// Text console over a UART, shared by every task
///
/// Each [`print`](Self::print) runs under a task lock, so output of
/// different tasks never interleaves mid-message. Input is read by one task
/// through [`read_line`](Self::read_line) or
/// [`next_command`](Self::next_command).
pub struct Debugger<'a, S, P> {
    uart: &'a Uart<S, P>,
    lock: TaskLock<S>,
    editor: Mutex<CriticalSectionRawMutex, RefCell<LineEditor<MAX_LINE>>>,
    timeout: Timeout,
}

impl<'a, S: BinarySemaphore, P: UartPort + Send> Debugger<'a, S, P> {
    /// `timeout` bounds each transmitted chunk
    pub fn new(uart: &'a Uart<S, P>, timeout: Timeout) -> Self {
        Self {
            uart,
            lock: TaskLock::new(),
            editor: Mutex::new(RefCell::new(LineEditor::new())),
            timeout,
        }
    }

    /// Format and send, e.g. `debugger.print(format_args!("{}\r\n", x))`
    pub fn print(&self, args: fmt::Arguments<'_>) -> Result<(), UartError> {
        let _guard = self.lock.lock();
        let mut out = ChunkWriter::new(self.uart, self.timeout);
        // A transmit failure stops formatting; `finish` reports it.
        let _ = out.write_fmt(args);
        out.finish()
    }

    pub fn print_str(&self, text: &str) -> Result<(), UartError> {
        self.print(format_args!("{}", text))
    }

    /// Repeat the last command whenever an empty line is entered
    pub fn auto_re_print(&self) {
        self.editor
            .lock(|editor| editor.borrow_mut().set_mode(EditMode::AutoRePrint));
    }

    pub fn edit_mode(&self) -> EditMode {
        self.editor.lock(|editor| editor.borrow().mode())
    }

    /// Last non-empty line entered
    pub fn last_command(&self) -> String<MAX_LINE> {
        self.editor
            .lock(|editor| String::try_from(editor.borrow().last()).unwrap_or_default())
    }

    fn echo(&self, bytes: &[u8]) -> Result<(), UartError> {
        let _guard = self.lock.lock();
        self.uart.transmit(bytes, self.timeout)
    }

    /// Receive one line, echoing and editing as it is typed
    ///
    /// A repeated line (AutoRePrint) is echoed in full so the terminal shows
    /// what runs.
    pub fn read_line(&self) -> Result<Submission<MAX_LINE>, UartError> {
        loop {
            let mut byte = [0u8; 1];
            self.uart.receive(&mut byte, Timeout::Forever)?;

            let input = self.editor.lock(|editor| editor.borrow_mut().feed(byte[0]));
            match input {
                Input::Ignored => {}
                Input::Echo(b) => self.echo(&[b])?,
                Input::Erase => self.echo(b"\x08 \x08")?,
                Input::Submit(submission) => {
                    if let Submission::Repeat(text) = &submission {
                        self.echo(text.as_bytes())?;
                    }
                    self.echo(b"\r\n")?;
                    return Ok(submission);
                }
            }
        }
    }

    /// Block until a non-empty (or repeated) line is entered
    pub fn next_command(&self) -> Result<String<MAX_LINE>, UartError> {
        loop {
            match self.read_line()? {
                Submission::Line(text) | Submission::Repeat(text) => return Ok(text),
                Submission::Empty => {}
            }
        }
    }

    /// Report a failed parameter check
    pub fn assert_failed(&self, file: &str, line: u32) -> Result<(), UartError> {
        self.print(format_args!(
            "Wrong parameters value: file {} on line {}\r\n",
            file, line
        ))
    }

    /// Pass `result` through unless it holds a programming error
    ///
    /// Programming errors end in [`do_post_mortem`](Self::do_post_mortem),
    /// reported at the caller's location.
    #[track_caller]
    pub fn escalate<T, E>(&self, result: Result<T, E>) -> Result<T, E>
    where
        E: ProgrammingFault + fmt::Debug,
    {
        match result {
            Err(e) if e.is_programming_error() => {
                let location = Location::caller();
                self.dump_post_mortem(format_args!("{:?}", e), Some(location));
                halt()
            }
            other => other,
        }
    }

    /// Report `cause` and stop
    #[track_caller]
    pub fn do_post_mortem(&self, cause: fmt::Arguments<'_>) -> ! {
        self.dump_post_mortem(cause, Some(Location::caller()));
        halt()
    }

    /// Report a panic and stop
    pub fn panic(&self, info: &PanicInfo<'_>) -> ! {
        self.dump_post_mortem(format_args!("{}", info), None);
        halt()
    }

    /// Write the post-mortem report without stopping
    ///
    /// Uses the polling transmit path and takes no task lock: the scheduler
    /// and interrupts may already be unusable.
    pub fn dump_post_mortem(&self, cause: fmt::Arguments<'_>, location: Option<&Location<'_>>) {
        error!("post-mortem");
        let mut out = PollingWriter(self.uart);
        let _ = out.write_str("\r\n*** POST MORTEM ***\r\n");
        let _ = write!(out, "cause: {}\r\n", cause);
        if let Some(location) = location {
            let _ = write!(out, "at {}:{}\r\n", location.file(), location.line());
        }
        self.editor.lock(|editor| {
            if let Ok(editor) = editor.try_borrow() {
                if !editor.last().is_empty() {
                    let _ = write!(out, "last command: {}\r\n", editor.last());
                }
            }
        });
    }
}

fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

/// Buffers formatted output and transmits it in fixed-size chunks
struct ChunkWriter<'u, S, P> {
    uart: &'u Uart<S, P>,
    timeout: Timeout,
    buf: Vec<u8, CHUNK_SIZE>,
    error: Option<UartError>,
}

impl<'u, S: BinarySemaphore, P: UartPort + Send> ChunkWriter<'u, S, P> {
    fn new(uart: &'u Uart<S, P>, timeout: Timeout) -> Self {
        Self {
            uart,
            timeout,
            buf: Vec::new(),
            error: None,
        }
    }

    fn flush(&mut self) -> fmt::Result {
        if self.buf.is_empty() {
            return Ok(());
        }
        let result = self.uart.transmit(&self.buf, self.timeout);
        self.buf.clear();
        result.map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }

    fn finish(mut self) -> Result<(), UartError> {
        if self.error.is_none() {
            let _ = self.flush();
        }
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<S: BinarySemaphore, P: UartPort + Send> Write for ChunkWriter<'_, S, P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let room = CHUNK_SIZE - self.buf.len();
            let (now, rest) = bytes.split_at(room.min(bytes.len()));
            // Fits: `now` is no longer than the free space.
            let _ = self.buf.extend_from_slice(now);
            bytes = rest;
            if self.buf.is_full() {
                self.flush()?;
            }
        }
        Ok(())
    }
}

struct PollingWriter<'u, S, P>(&'u Uart<S, P>);

impl<S: BinarySemaphore, P: UartPort + Send> Write for PollingWriter<'_, S, P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.transmit_polling(s.as_bytes());
        Ok(())
    }
}

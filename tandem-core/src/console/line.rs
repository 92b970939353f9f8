use heapless::String;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// How an empty line is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EditMode {
    /// Empty lines are submitted as empty
    #[default]
    Normal,
    /// An empty line repeats the last non-empty line
    AutoRePrint,
}

/// A finished line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<const N: usize> {
    /// Freshly typed text
    Line(String<N>),
    /// Empty line in AutoRePrint mode; carries the repeated line
    Repeat(String<N>),
    /// Empty line with nothing to repeat
    Empty,
}

impl<const N: usize> Submission<N> {
    /// Text to act on, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Submission::Line(text) | Submission::Repeat(text) => Some(text.as_str()),
            Submission::Empty => None,
        }
    }
}

/// Result of feeding one received byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<const N: usize> {
    /// Nothing to do
    Ignored,
    /// Byte was appended; echo it
    Echo(u8),
    /// Last character was removed; erase it on the terminal
    Erase,
    /// Line terminated
    Submit(Submission<N>),
}

/// Edits one input line at a time
///
/// CR or LF ends a line, and a CR LF pair ends only one. Backspace and
/// delete remove the last character. Printable ASCII is appended while
/// there is room; every other byte is ignored.
#[derive(Debug, Clone, Default)]
pub struct LineEditor<const N: usize> {
    line: String<N>,
    last: String<N>,
    mode: EditMode,
    after_cr: bool,
}

impl<const N: usize> LineEditor<N> {
    pub const fn new() -> Self {
        Self {
            line: String::new(),
            last: String::new(),
            mode: EditMode::Normal,
            after_cr: false,
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
    }

    /// Line typed so far
    pub fn current(&self) -> &str {
        &self.line
    }

    /// Last non-empty line submitted
    pub fn last(&self) -> &str {
        &self.last
    }

    pub fn feed(&mut self, byte: u8) -> Input<N> {
        let after_cr = core::mem::replace(&mut self.after_cr, byte == b'\r');
        match byte {
            b'\n' if after_cr => Input::Ignored,
            b'\r' | b'\n' => Input::Submit(self.submit()),
            BACKSPACE | DELETE => match self.line.pop() {
                Some(_) => Input::Erase,
                None => Input::Ignored,
            },
            0x20..=0x7E => match self.line.push(char::from(byte)) {
                Ok(()) => Input::Echo(byte),
                Err(()) => Input::Ignored,
            },
            _ => Input::Ignored,
        }
    }

    fn submit(&mut self) -> Submission<N> {
        if self.line.is_empty() {
            return match self.mode {
                EditMode::AutoRePrint if !self.last.is_empty() => {
                    Submission::Repeat(self.last.clone())
                }
                _ => Submission::Empty,
            };
        }
        let line = core::mem::take(&mut self.line);
        self.last = line.clone();
        Submission::Line(line)
    }
}

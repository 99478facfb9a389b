//! Request-line recognizer.
//!
//! A five-state automaton that scans raw request bytes for a case-insensitive
//! `GET ` and then stays in a capture state until it hits a delimiter:
//!
//! ```text
//!   Start ──G/g──▶ G ──E/e──▶ E ──T/t──▶ T ──' '──▶ Capture ──'\n' '\0' ' '──▶ Done
//!     ▲            │          │          │            │
//!     └── other ───┴──────────┴──────────┘            └── other ──▶ Capture
//! ```
//!
//! The table is total over byte values, so every `u8` is a valid column.

use std::sync::OnceLock;

/// Number of states that own a row in the table (`Done` has none).
const ROWS: usize = 5;

static SHARED: OnceLock<TransitionTable> = OnceLock::new();

/// Automaton state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Scanning for the start of `GET`.
    Start,
    /// Seen `G`.
    G,
    /// Seen `GE`.
    E,
    /// Seen `GET`.
    T,
    /// Seen `GET `; bytes belong to the resource.
    Capture,
    /// Sink. Capture is complete and no further input is consumed.
    Done,
}

impl State {
    fn row(self) -> Option<usize> {
        match self {
            State::Start => Some(0),
            State::G => Some(1),
            State::E => Some(2),
            State::T => Some(3),
            State::Capture => Some(4),
            State::Done => None,
        }
    }

    /// Whether the scan has finished.
    pub fn is_terminal(self) -> bool {
        self == State::Done
    }
}

/// Lookup table mapping `(state, byte)` to the next state.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    rows: [[State; 256]; ROWS],
}

impl TransitionTable {
    /// Builds the table from scratch.
    ///
    /// Most callers want [`TransitionTable::shared`] instead.
    pub fn new() -> Self {
        let mut rows = [[State::Start; 256]; ROWS];
        rows[4] = [State::Capture; 256];

        for (byte, next) in [(b'G', State::G), (b'g', State::G)] {
            rows[0][byte as usize] = next;
        }
        for (byte, next) in [(b'E', State::E), (b'e', State::E)] {
            rows[1][byte as usize] = next;
        }
        for (byte, next) in [(b'T', State::T), (b't', State::T)] {
            rows[2][byte as usize] = next;
        }
        rows[3][b' ' as usize] = State::Capture;

        for delimiter in [b'\n', b'\0', b' '] {
            rows[4][delimiter as usize] = State::Done;
        }

        Self { rows }
    }

    /// Process-wide table, built on first use.
    ///
    /// The listener touches this before accepting so the build never happens
    /// on a connection task.
    pub fn shared() -> &'static TransitionTable {
        SHARED.get_or_init(TransitionTable::new)
    }

    /// Next state after consuming `byte` in `state`.
    pub fn next(&self, state: State, byte: u8) -> State {
        match state.row() {
            Some(row) => self.rows[row][byte as usize],
            None => State::Done,
        }
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::new()
    }
}

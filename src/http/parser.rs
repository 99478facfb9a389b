use crate::http::dfa::{State, TransitionTable};

/// End-of-headers marker.
pub const HEADERS_TERMINATOR: &[u8; 4] = b"\r\n\r\n";

/// Extracts the resource that follows `GET ` in the request.
///
/// Input that never matches `GET ` (or matches it with nothing after it)
/// yields an empty string. That is a normal outcome, not an error.
pub fn extract_resource(table: &TransitionTable, request: &[u8]) -> String {
    String::from_utf8_lossy(&extract_resource_bytes(table, request)).into_owned()
}

/// Same as [`extract_resource`] but returns the captured bytes untouched.
pub fn extract_resource_bytes(table: &TransitionTable, request: &[u8]) -> Vec<u8> {
    let mut state = State::Start;
    let mut resource = Vec::new();

    for &byte in request {
        if state.is_terminal() {
            break;
        }

        if state == State::Capture && !is_space(byte) {
            resource.push(byte);
        }

        state = table.next(state, byte);
    }

    resource
}

/// Offset of the first `\r\n\r\n` in `buf`, if any.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADERS_TERMINATOR.len())
        .position(|w| w == HEADERS_TERMINATOR)
}

// C-locale whitespace; `u8::is_ascii_whitespace` leaves out vertical tab.
fn is_space(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == 0x0b
}

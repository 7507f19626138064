#[derive(Clone, Copy)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
}

pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Advance past a quoted or commented byte; returns the new state and how many extra bytes were consumed.
pub(super) fn step_quoted(state: State, bytes: &[u8], idx: usize) -> (State, usize) {
    let b = bytes[idx];
    match state {
        State::Normal => (State::Normal, 0),
        State::SingleQuoted | State::DoubleQuoted => {
            let quote = if matches!(state, State::SingleQuoted) {
                b'\''
            } else {
                b'"'
            };
            if b != quote {
                (state, 0)
            } else if bytes.get(idx + 1) == Some(&quote) {
                (state, 1) // escaped quote
            } else {
                (State::Normal, 0)
            }
        }
        State::LineComment => {
            if b == b'\n' {
                (State::Normal, 0)
            } else {
                (state, 0)
            }
        }
        State::BlockComment(depth) => {
            if is_block_comment_start(bytes, idx) {
                (State::BlockComment(depth + 1), 1)
            } else if is_block_comment_end(bytes, idx) {
                if depth == 1 {
                    (State::Normal, 1)
                } else {
                    (State::BlockComment(depth - 1), 1)
                }
            } else {
                (state, 0)
            }
        }
    }
}

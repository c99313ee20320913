//! Statement splitting for SQL scripts with `SET TERM` support.
//!
//! Scripts are cut into statements line by line. The statement terminator
//! starts as `;` and can be redefined mid-file with the runner directive
//! `SET TERM <new> <old>`, which is how procedure and trigger bodies that
//! contain `;` are written:
//!
//! ```text
//! SET TERM ^ ;
//! CREATE PROCEDURE touch AS
//! BEGIN
//!   UPDATE counters SET hits = hits + 1;
//! END^
//! SET TERM ; ^
//! ```
//!
//! Terminator matching is a plain substring search. A terminator inside a
//! string literal or a comment still ends the statement; scripts written for
//! this dialect's tooling already assume that behaviour.

/// Terminator in effect at the start of every script.
pub const DEFAULT_TERMINATOR: &str = ";";

const SET_TERM: &str = "SET TERM";

/// Lexer state threaded through a splitting pass.
///
/// The only state is the active terminator and the text accumulated since
/// the last emitted statement. [`SplitState::feed`] is a pure transition
/// from one state and one input line to the next state plus the statements
/// completed by that line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitState {
    terminator: String,
    buffer: String,
}

impl Default for SplitState {
    fn default() -> Self {
        Self::new(DEFAULT_TERMINATOR)
    }
}

impl SplitState {
    /// Create a state with the given initial terminator.
    ///
    /// An empty terminator falls back to [`DEFAULT_TERMINATOR`].
    pub fn new(terminator: impl Into<String>) -> Self {
        let terminator = terminator.into();
        Self {
            terminator: if terminator.is_empty() {
                DEFAULT_TERMINATOR.to_string()
            } else {
                terminator
            },
            buffer: String::new(),
        }
    }

    /// The terminator currently in effect.
    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// Text accumulated but not yet terminated.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Consume one line of input (without its line break).
    pub fn feed(mut self, line: &str) -> (Self, Vec<String>) {
        let mut emitted = Vec::new();
        let trimmed = line.trim();

        if is_set_term(trimmed) {
            // Whatever the old terminator already closed is emitted first.
            flush(&mut self.buffer, &self.terminator, &mut emitted);
            self.terminator = parse_set_term(trimmed, &self.terminator);
            return (self, emitted);
        }

        self.buffer.push_str(line);
        self.buffer.push('\n');
        flush(&mut self.buffer, &self.terminator, &mut emitted);

        (self, emitted)
    }

    /// End of input: unterminated trailing text becomes the last statement.
    pub fn finish(self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer)
        }
    }
}

/// Split a script into statements using the default `;` terminator.
///
/// Emitted statements are untrimmed and may be blank; callers decide what
/// to do with whitespace.
pub fn split_statements(script: &str) -> Vec<String> {
    split_statements_with(script, DEFAULT_TERMINATOR)
}

/// Split a script into statements starting from a custom terminator.
pub fn split_statements_with(script: &str, terminator: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut state = SplitState::new(terminator);

    for line in script.lines() {
        let (next, emitted) = state.feed(line);
        statements.extend(emitted);
        state = next;
    }

    statements.extend(state.finish());
    statements
}

/// Check whether a trimmed line is a `SET TERM` directive (case-insensitive).
pub fn is_set_term(trimmed: &str) -> bool {
    trimmed
        .get(..SET_TERM.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SET_TERM))
}

/// Extract the new terminator from a `SET TERM <new> <old>` line.
///
/// Lines with fewer than four tokens keep the current terminator.
pub fn parse_set_term(trimmed: &str, current: &str) -> String {
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() >= 4 {
        tokens[2].to_string()
    } else {
        current.to_string()
    }
}

fn flush(buffer: &mut String, terminator: &str, out: &mut Vec<String>) {
    while let Some(idx) = buffer.find(terminator) {
        out.push(buffer[..idx].to_string());
        buffer.drain(..idx + terminator.len());
    }
}

//! Breadcrumb tracking for nested Markdown headers.
//!
//! A [`HeaderStack`] holds the chain of ancestor headers open at the
//! current scan position. Each document scan owns exactly one instance;
//! it is a plain value with no shared state, dropped when the scan
//! returns.

/// Stack of currently-open headers, one entry per ancestor.
///
/// Entries store `(depth, title)`. Pushing a header of depth `d` first
/// pops every entry of depth ≥ `d`, so the stack always reads as the
/// ancestor chain for the current position and never contains gaps in
/// order (a jump from `#` straight to `###` leaves two entries).
#[derive(Debug, Clone, Default)]
pub struct HeaderStack {
    entries: Vec<(usize, String)>,
}

impl HeaderStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next document line. Returns `true` if the line was a
    /// header and mutated the stack; content lines (including malformed
    /// header syntax such as `#notitle`) return `false` and leave the
    /// stack untouched.
    pub fn observe(&mut self, line: &str) -> bool {
        let Some((depth, title)) = parse_header(line) else {
            return false;
        };
        while self
            .entries
            .last()
            .is_some_and(|(open_depth, _)| *open_depth >= depth)
        {
            self.entries.pop();
        }
        self.entries.push((depth, title.to_string()));
        true
    }

    /// Breadcrumb for the current state, e.g. `"A > B > C"`. Empty
    /// string when no headers are open.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(_, title)| title.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a line would mutate the stack. Lets the scanner flush the
/// pending section before the breadcrumb changes.
pub(crate) fn is_header_line(line: &str) -> bool {
    parse_header(line).is_some()
}

/// Parse a header line: one or more `#` (depth is unbounded) followed by
/// at least one space or tab, then the title. Returns the trimmed title.
fn parse_header(line: &str) -> Option<(usize, &str)> {
    let depth = line.chars().take_while(|&c| c == '#').count();
    if depth == 0 {
        return None;
    }
    let rest = &line[depth..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some((depth, rest.trim()))
}

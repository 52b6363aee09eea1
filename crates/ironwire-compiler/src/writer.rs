//! Indentation-aware source text builder.

const INDENT: &str = "    ";

/// Accumulates source lines at the current indentation level.
#[derive(Debug, Default)]
pub struct SourceWriter {
    buf: String,
    depth: usize,
}

impl SourceWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one line; an empty `text` writes a blank line without indentation.
    pub fn line(&mut self, text: &str) -> &mut Self {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(INDENT);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
        self
    }

    /// Writes each line of a multi-line fragment at the current indentation.
    pub fn lines(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            let _ = self.line(line);
        }
        self
    }

    /// Writes a blank line.
    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Writes `head {` and indents.
    pub fn open(&mut self, head: &str) -> &mut Self {
        let _ = self.line(&format!("{head} {{"));
        self.depth += 1;
        self
    }

    /// Writes `text` verbatim as an opening line and indents.
    pub fn open_raw(&mut self, text: &str) -> &mut Self {
        let _ = self.line(text);
        self.depth += 1;
        self
    }

    /// Dedents and writes `text` verbatim.
    pub fn close_raw(&mut self, text: &str) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(text)
    }

    /// Dedents and writes `}` followed by `tail`.
    pub fn close(&mut self, tail: &str) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("}}{tail}"))
    }

    /// Returns the accumulated source.
    #[must_use]
    pub fn finish(self) -> String {
        self.buf
    }
}

/// Indents every non-empty line of `text` by one level.
#[must_use]
pub fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Rendering of command reports.

use std::io::{self, Write};

/// Destination of a rendered report.
///
/// Reports call these in reading order and leave layout to the
/// implementation.
pub trait Output {
    /// Heading of a group of lines.
    fn section(&mut self, title: &str);

    fn key_value(&mut self, key: &str, value: &str);

    /// Key-value pair belonging to the line above it.
    fn key_value_indented(&mut self, key: &str, value: &str);

    fn list_item(&mut self, text: &str);

    /// A file the command created or rewrote.
    fn added_item(&mut self, text: &str);

    fn error(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Text emitted as is.
    fn preformatted(&mut self, text: &str);

    fn newline(&mut self);
}

/// Command results that know how to present themselves.
pub trait Report {
    fn render(&self, out: &mut dyn Output);
}

/// Report lines go to stdout, problems to stderr.
///
/// Write errors (a closed pipe, say) are ignored so that piping into
/// `head` does not abort the command.
pub struct TerminalOutput {
    stdout: io::StdoutLock<'static>,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout().lock(),
        }
    }

    fn line(&mut self, prefix: &str, text: &str) {
        let _ = writeln!(self.stdout, "{prefix}{text}");
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for TerminalOutput {
    fn section(&mut self, title: &str) {
        let _ = writeln!(self.stdout, "{title}:");
    }

    fn key_value(&mut self, key: &str, value: &str) {
        let _ = writeln!(self.stdout, "{key}: {value}");
    }

    fn key_value_indented(&mut self, key: &str, value: &str) {
        let _ = writeln!(self.stdout, "  {key}: {value}");
    }

    fn list_item(&mut self, text: &str) {
        self.line("  - ", text);
    }

    fn added_item(&mut self, text: &str) {
        self.line("  + ", text);
    }

    fn error(&mut self, msg: &str) {
        let _ = self.stdout.flush();
        eprintln!("error: {msg}");
    }

    fn warning(&mut self, msg: &str) {
        let _ = self.stdout.flush();
        eprintln!("warning: {msg}");
    }

    fn preformatted(&mut self, text: &str) {
        self.line("", text);
    }

    fn newline(&mut self) {
        self.line("", "");
    }
}

/// Keeps rendered lines in memory.
#[cfg(test)]
#[derive(Default)]
pub struct BufferOutput {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl Output for BufferOutput {
    fn section(&mut self, title: &str) {
        self.lines.push(format!("{title}:"));
    }

    fn key_value(&mut self, key: &str, value: &str) {
        self.lines.push(format!("{key}: {value}"));
    }

    fn key_value_indented(&mut self, key: &str, value: &str) {
        self.lines.push(format!("  {key}: {value}"));
    }

    fn list_item(&mut self, text: &str) {
        self.lines.push(format!("  - {text}"));
    }

    fn added_item(&mut self, text: &str) {
        self.lines.push(format!("  + {text}"));
    }

    fn error(&mut self, msg: &str) {
        self.lines.push(format!("error: {msg}"));
    }

    fn warning(&mut self, msg: &str) {
        self.lines.push(format!("warning: {msg}"));
    }

    fn preformatted(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn newline(&mut self) {
        self.lines.push(String::new());
    }
}

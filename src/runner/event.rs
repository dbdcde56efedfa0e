// src/runner/event.rs

/// One line of output emitted by a running playbook or executable.
///
/// Progress handlers forward the raw text; the output filter works on the
/// parsed record once the run is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEvent {
    line: String,
}

impl RunEvent {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    pub fn text(&self) -> &str {
        &self.line
    }

    pub fn into_line(self) -> String {
        self.line
    }
}

impl AsRef<str> for RunEvent {
    fn as_ref(&self) -> &str {
        &self.line
    }
}

impl From<&str> for RunEvent {
    fn from(line: &str) -> Self {
        RunEvent::new(line)
    }
}

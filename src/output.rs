//! Lines captured from a launched process and how they are rendered.

use std::fmt;

/// Indicates the source stream of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Standard Output.
    Stdout,
    /// Standard Error.
    Stderr,
}

impl StreamKind {
    /// Fixed marker placed before every line from this stream.
    pub fn marker(self) -> &'static str {
        match self {
            StreamKind::Stdout => "OUT:",
            StreamKind::Stderr => "ERR:",
        }
    }
}

/// A single line read from a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    /// The stream it originated from (stdout/stderr).
    pub stream: StreamKind,
    /// Line content without the trailing newline.
    pub text: String,
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.stream.marker(), self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_render_with_stream_marker() {
        let out = OutputLine {
            stream: StreamKind::Stdout,
            text: "hello".into(),
        };
        let err = OutputLine {
            stream: StreamKind::Stderr,
            text: "oops".into(),
        };
        assert_eq!(out.to_string(), "OUT: hello");
        assert_eq!(err.to_string(), "ERR: oops");
    }
}

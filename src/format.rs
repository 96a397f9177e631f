use std::fmt;
use anyhow::Result;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Line terminator used by a text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    Cr,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::CrLf => "\r\n",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineEnding::Lf => "LF",
            LineEnding::Cr => "CR",
            LineEnding::CrLf => "CRLF",
        };
        f.write_str(name)
    }
}

/// Indentation unit used by a text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indentation {
    Spaces(usize),
    Tab,
}

impl Indentation {
    /// The literal characters making up one indentation level.
    pub fn unit(&self) -> String {
        match self {
            Indentation::Spaces(count) => " ".repeat(*count),
            Indentation::Tab => "\t".to_string(),
        }
    }
}

impl Default for Indentation {
    fn default() -> Self {
        Indentation::Spaces(2)
    }
}

/// How a manifest was laid out on disk, so a rewrite can reproduce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatting {
    pub end_of_line: LineEnding,
    pub indentation: Indentation,
    /// Whether the text ended with its line terminator.
    pub final_newline: bool,
}

impl Formatting {
    /// Sniffs line ending, indentation and trailing newline from raw text.
    pub fn detect(text: &str) -> Self {
        let end_of_line = detect_end_of_line(text);
        Self {
            end_of_line,
            indentation: detect_indentation(text),
            final_newline: text.ends_with(end_of_line.as_str()),
        }
    }

    /// Serializes `value` as JSON laid out with this formatting.
    ///
    /// Zero-width space indentation produces compact output, everything else
    /// is pretty-printed with one indentation unit per nesting level.
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let rendered = match self.indentation {
            Indentation::Spaces(0) => serde_json::to_string(value)?,
            indentation => {
                let unit = indentation.unit();
                let mut buffer = Vec::new();
                let formatter = PrettyFormatter::with_indent(unit.as_bytes());
                let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
                value.serialize(&mut serializer)?;
                String::from_utf8(buffer)?
            }
        };
        // Newlines inside strings are escaped by serde_json, so every raw `\n`
        // left is a line break inserted by the formatter.
        let mut text = match self.end_of_line {
            LineEnding::Lf => rendered,
            eol => rendered.replace('\n', eol.as_str()),
        };
        if self.final_newline {
            text.push_str(self.end_of_line.as_str());
        }
        Ok(text)
    }
}

/// Detects the line terminator of `text`. CRLF wins over a lone CR, and LF is
/// the fallback when neither appears.
pub fn detect_end_of_line(text: &str) -> LineEnding {
    if text.contains("\r\n") {
        LineEnding::CrLf
    } else if text.contains('\r') {
        LineEnding::Cr
    } else {
        LineEnding::Lf
    }
}

/// Detects the indentation of `text` from its first indented line.
/// Defaults to two spaces when no line is indented.
pub fn detect_indentation(text: &str) -> Indentation {
    let eol = detect_end_of_line(text);
    let first_indented = text
        .split(eol.as_str())
        .find(|line| line.starts_with('\t') || line.starts_with(' '));

    match first_indented {
        Some(line) if line.starts_with('\t') => Indentation::Tab,
        Some(line) => Indentation::Spaces(line.chars().take_while(|c| *c == ' ').count()),
        None => Indentation::default(),
    }
}

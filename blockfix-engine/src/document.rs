//! Document model
//!
//! A document is an ordered list of lines with no terminators stored. The line
//! ending style and the presence of a final terminator are recorded separately so
//! that rendering an unedited document reproduces its source exactly.

use crate::error::EncodingError;

/// Line terminator used when rendering a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    line_ending: LineEnding,
    final_newline: bool,
}

impl Document {
    /// Split source text into lines.
    ///
    /// CRLF is only adopted when every terminator in the text is `\r\n`; with mixed
    /// terminators the stray `\r` characters stay part of the line content.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Document {
                lines: Vec::new(),
                line_ending: LineEnding::Lf,
                final_newline: false,
            };
        }

        let mut raw: Vec<&str> = text.split('\n').collect();
        let final_newline = text.ends_with('\n');
        if final_newline {
            raw.pop();
        }

        let terminated = if final_newline { raw.len() } else { raw.len() - 1 };
        let all_crlf = terminated > 0 && raw[..terminated].iter().all(|l| l.ends_with('\r'));
        let line_ending = if all_crlf {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        };

        let lines = raw
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                if all_crlf && idx < terminated {
                    line[..line.len() - 1].to_string()
                } else {
                    line.to_string()
                }
            })
            .collect();

        Document {
            lines,
            line_ending,
            final_newline,
        }
    }

    /// Decode raw bytes as UTF-8 and split them into lines.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        let text = std::str::from_utf8(bytes).map_err(|e| EncodingError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })?;
        Ok(Self::parse(text))
    }

    /// Build an LF document that ends with a newline.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Document {
            lines: lines.into_iter().map(Into::into).collect(),
            line_ending: LineEnding::Lf,
            final_newline: true,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn final_newline(&self) -> bool {
        self.final_newline
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// A document with the same line ending and the given lines.
    pub fn with_lines(&self, lines: Vec<String>, final_newline: bool) -> Self {
        Document {
            lines,
            line_ending: self.line_ending,
            final_newline,
        }
    }

    pub fn render(&self) -> String {
        let ending = self.line_ending.as_str();
        let mut out = self.lines.join(ending);
        if self.final_newline && !self.lines.is_empty() {
            out.push_str(ending);
        }
        out
    }
}

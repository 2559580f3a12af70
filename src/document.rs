// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Line-oriented text documents.
//!
//! The patcher works on plain line sequences. This module handles the text
//! around them, so a patched file keeps the line ending and trailing newline
//! style it was read with. Output is always UTF-8 without a byte-order mark.

use std::{
    convert::Infallible,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

const BOM: char = '\u{feff}';

/// Line terminator style.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// Unix style `\n`.
    #[default]
    Lf,

    /// Windows style `\r\n`.
    CrLf,
}

impl LineEnding {
    /// Terminator as string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Text document split into lines.
///
/// Every line remembers its own terminator, so files that mix `\n` and `\r\n`
/// come back out exactly as they went in. Lines added later use the ending of
/// the first line break.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    endings: Vec<LineEnding>,
    line_ending: LineEnding,
    trailing_newline: bool,
}

impl Document {
    /// Construct empty document for a file that does not exist yet.
    ///
    /// Lines given to it later will end with a trailing newline.
    pub fn fresh() -> Self {
        Self {
            trailing_newline: true,
            ..Self::default()
        }
    }

    /// Lines without terminators.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Terminator used for lines that did not come from the source text.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Whether the last line is followed by a terminator.
    pub fn trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    /// Construct new document with same text style but different lines.
    ///
    /// Lines matching the original ones in order keep their terminator. Every
    /// other line is treated as new.
    pub fn with_lines(&self, lines: Vec<String>) -> Self {
        let mut original = self.lines.iter().zip(&self.endings).peekable();
        let endings = lines
            .iter()
            .map(|line| {
                original
                    .next_if(|(kept, _)| *kept == line)
                    .map_or(self.line_ending, |(_, ending)| *ending)
            })
            .collect();

        Self {
            lines,
            endings,
            line_ending: self.line_ending,
            trailing_newline: self.trailing_newline,
        }
    }
}

impl FromStr for Document {
    type Err = Infallible;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let data = data.strip_prefix(BOM).unwrap_or(data);
        let line_ending = match data.find('\n') {
            Some(index) if data[..index].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        };

        let mut lines = Vec::new();
        let mut endings = Vec::new();
        for chunk in data.split_inclusive('\n') {
            let (line, ending) = if let Some(line) = chunk.strip_suffix("\r\n") {
                (line, LineEnding::CrLf)
            } else if let Some(line) = chunk.strip_suffix('\n') {
                (line, LineEnding::Lf)
            } else {
                // INVARIANT: Only the unterminated last line gets here.
                (chunk, line_ending)
            };
            lines.push(line.to_owned());
            endings.push(ending);
        }

        Ok(Self {
            lines,
            endings,
            line_ending,
            trailing_newline: data.ends_with('\n'),
        })
    }
}

impl Display for Document {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let last = self.lines.len().saturating_sub(1);
        for (index, (line, ending)) in self.lines.iter().zip(&self.endings).enumerate() {
            fmt.write_str(line)?;
            if index < last || self.trailing_newline {
                fmt.write_str(ending.as_str())?;
            }
        }

        Ok(())
    }
}

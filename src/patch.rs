// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Schema list patching.
//!
//! RIME reads user overrides from `default.custom.yaml`, where the active
//! input schemas live in a list under `patch:` → `schema_list:`. Installing a
//! schema set means adding entries to that list without disturbing whatever
//! the user already has in there.
//!
//! # Heuristic, Not a Parser
//!
//! The [`IndentPatcher`] never builds a syntax tree. It walks the document
//! line by line, finds the first line whose trimmed content is
//! `<section_key>:`, and treats everything up to the next non-empty line with
//! zero indentation as the section body. The insertion block goes right before
//! that terminating line, or at the end of the document if the section runs
//! to the end. If the section key never shows up, a fresh
//! `<enclosing_key>:` → `<section_key>:` section is appended instead.
//!
//! Inline comments after the header, flow-style lists (`schema_list: []`),
//! and sections reordered under other keys are not understood. Callers that
//! need more than this should provide their own [`Patcher`].
//!
//! # Idempotence
//!
//! Each [`PatchRequest`] carries a set of __already-patched markers__. If any
//! marker occurs anywhere in the document, the document is returned as is
//! and nothing is applied.

use tracing::{debug, instrument};

/// Separator comment wrapped around the banner label.
pub const DEFAULT_SEPARATOR: &str =
    "#------------------------------------------------------------------------";

/// Label comment of the bundled BP schema set.
pub const DEFAULT_LABEL: &str = "# 閩拼方案（BP）輸入法";

/// Top-level key written when the section has to be created from scratch.
pub const DEFAULT_ENCLOSING_KEY: &str = "patch";

/// Section key holding RIME's active schema list.
pub const DEFAULT_SECTION_KEY: &str = "schema_list";

/// Indentation of the section key under the enclosing key in a fresh section.
const FALLBACK_SECTION_INDENT: usize = 2;

/// Fixed lines to insert into the target section.
///
/// # Invariant
///
/// - Never empty.
/// - Stored lines have their common leading-space prefix removed; that prefix
///   is remembered as [`InsertionBlock::indent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionBlock {
    lines: Vec<String>,
    indent: usize,
}

impl InsertionBlock {
    /// Construct new insertion block from raw lines.
    ///
    /// The smallest leading-space count among non-blank lines becomes the
    /// block's own indentation. Relative indentation between lines is kept.
    ///
    /// # Errors
    ///
    /// - Return [`PatchError::EmptyBlock`] if no lines are given.
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        let raw = lines.into_iter().map(Into::into).collect::<Vec<String>>();
        if raw.is_empty() {
            return Err(PatchError::EmptyBlock);
        }

        let indent = raw
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| leading_spaces(line))
            .min()
            .unwrap_or(0);

        // INVARIANT: Every non-blank line starts with at least `indent` ASCII spaces.
        let lines = raw
            .into_iter()
            .map(|line| {
                if line.trim().is_empty() {
                    String::new()
                } else {
                    line[indent..].to_string()
                }
            })
            .collect();

        Ok(Self { lines, indent })
    }

    /// Leading-space count the block was written with.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Block lines without their common indentation.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines in block.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if block has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Everything needed to patch one section of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRequest {
    /// Key of the list-valued section to insert into.
    pub section_key: String,

    /// Top-level key to wrap a freshly created section in.
    pub enclosing_key: String,

    /// Comment lines written right before the block.
    pub banner: Vec<String>,

    /// Lines to insert.
    pub block: InsertionBlock,

    /// Substrings that mark a document as already patched.
    pub markers: Vec<String>,
}

impl PatchRequest {
    /// Construct new patch request with the default banner and enclosing key.
    pub fn new(section_key: impl Into<String>, block: InsertionBlock) -> Self {
        Self {
            section_key: section_key.into(),
            enclosing_key: DEFAULT_ENCLOSING_KEY.into(),
            banner: default_banner(DEFAULT_LABEL),
            block,
            markers: Vec::new(),
        }
    }

    /// Replace already-patched markers.
    pub fn with_markers(mut self, markers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Replace banner lines.
    pub fn with_banner(mut self, banner: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.banner = banner.into_iter().map(Into::into).collect();
        self
    }

    /// Replace enclosing key.
    pub fn with_enclosing_key(mut self, key: impl Into<String>) -> Self {
        self.enclosing_key = key.into();
        self
    }

    /// Check if text already contains any non-empty marker.
    pub fn is_patched(&self, text: &str) -> bool {
        self.markers
            .iter()
            .filter(|marker| !marker.is_empty())
            .any(|marker| text.contains(marker.as_str()))
    }

    fn render(&self, depth: usize) -> impl Iterator<Item = String> + '_ {
        self.banner
            .iter()
            .map(|line| line.trim())
            .chain(self.block.lines.iter().map(String::as_str))
            .map(move |line| indent_line(depth, line))
    }
}

/// Banner of separator, label, separator.
pub fn default_banner(label: impl Into<String>) -> Vec<String> {
    vec![DEFAULT_SEPARATOR.into(), label.into(), DEFAULT_SEPARATOR.into()]
}

/// Result of a patch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Patched {
    /// Updated document.
    pub lines: Vec<String>,

    /// False only if the document was already patched.
    pub applied: bool,
}

/// Layer of indirection for document patching.
pub trait Patcher {
    /// Patch document according to request.
    ///
    /// Never fails. Worst case is an insertion at the wrong depth, or a
    /// skipped patch because some unrelated line happens to contain a marker.
    fn patch(&self, document: Vec<String>, request: &PatchRequest) -> Patched;
}

/// Indentation-scanning patcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndentPatcher;

#[derive(Debug, Clone, Copy)]
enum Scan {
    Searching,
    Inside { indent: usize, sibling: Option<usize> },
    Done,
}

impl Patcher for IndentPatcher {
    #[instrument(skip_all, fields(section = %request.section_key), level = "debug")]
    fn patch(&self, document: Vec<String>, request: &PatchRequest) -> Patched {
        if request.is_patched(&document.join("\n")) {
            debug!("marker found, leaving document untouched");
            return Patched {
                lines: document,
                applied: false,
            };
        }

        let header = format!("{}:", request.section_key);
        let mut lines =
            Vec::with_capacity(document.len() + request.banner.len() + request.block.len() + 3);
        let mut scan = Scan::Searching;

        for line in document {
            match scan {
                Scan::Searching if line.trim() == header.as_str() => {
                    debug!("found section header {header:?}");
                    scan = Scan::Inside {
                        indent: leading_spaces(&line),
                        sibling: None,
                    };
                }
                Scan::Inside { indent, sibling } if is_top_level(&line) => {
                    let depth = section_depth(indent, sibling, &request.block);
                    debug!("section ends before {line:?}, inserting at depth {depth}");
                    lines.extend(request.render(depth));
                    scan = Scan::Done;
                }
                Scan::Inside {
                    indent,
                    sibling: None,
                } if line.trim_start().starts_with('-') => {
                    scan = Scan::Inside {
                        indent,
                        sibling: Some(leading_spaces(&line)),
                    };
                }
                _ => {}
            }

            lines.push(line);
        }

        match scan {
            Scan::Inside { indent, sibling } => {
                let depth = section_depth(indent, sibling, &request.block);
                debug!("section runs to end of document, appending at depth {depth}");
                lines.extend(request.render(depth));
            }
            Scan::Searching => {
                debug!("no section header {header:?}, appending new section");
                if lines.last().is_some_and(|line| !line.trim().is_empty()) {
                    lines.push(String::new());
                }
                lines.push(format!("{}:", request.enclosing_key));
                lines.push(indent_line(FALLBACK_SECTION_INDENT, &header));
                let depth = request.block.indent().max(FALLBACK_SECTION_INDENT + 2);
                lines.extend(request.render(depth));
            }
            Scan::Done => {}
        }

        Patched {
            lines,
            applied: true,
        }
    }
}

/// Patch document with [`IndentPatcher`], default banner, and default
/// enclosing key.
pub fn patch(
    document: Vec<String>,
    block: &InsertionBlock,
    section_key: &str,
    markers: &[impl AsRef<str>],
) -> Patched {
    let request = PatchRequest::new(section_key, block.clone())
        .with_markers(markers.iter().map(|marker| marker.as_ref().to_string()));
    IndentPatcher.patch(document, &request)
}

fn section_depth(indent: usize, sibling: Option<usize>, block: &InsertionBlock) -> usize {
    sibling.unwrap_or_else(|| block.indent().max(indent + 2))
}

fn is_top_level(line: &str) -> bool {
    !line.is_empty() && !line.starts_with([' ', '\t'])
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn indent_line(depth: usize, line: &str) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{}{line}", " ".repeat(depth))
    }
}

/// Patch error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// Insertion block has no lines.
    #[error("insertion block must contain at least one line")]
    EmptyBlock,
}

/// Friendly result alias :3
type Result<T, E = PatchError> = std::result::Result<T, E>;

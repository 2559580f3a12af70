// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Custom file handling.
//!
//! RIME never expects users to edit its shipped YAML directly. Overrides go
//! into `*.custom.yaml` files that RIME merges on redeploy. This module reads
//! such a file whole, runs it through a [`Patcher`], and writes it back whole
//! if anything changed.
//!
//! Writes are not atomic. RIME only picks up changes on redeploy, and nothing
//! else is expected to touch the file while rimepatch runs.

use crate::{
    document::Document,
    patch::{IndentPatcher, PatchRequest, Patcher},
};

use std::{
    fs::{read, write},
    io::{Error as IoError, ErrorKind},
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

/// What to do when the target file is missing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Fail if the file does not exist.
    #[default]
    Existing,

    /// Start from an empty document if the file does not exist.
    Create,
}

/// Result of applying a patch to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Existing file was patched and written back.
    Patched,

    /// File already contained a marker, and was left alone.
    AlreadyPatched,

    /// File did not exist, and was created with the patch.
    Created,
}

/// Patched text that has not been written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Whether the patch would change anything.
    pub applied: bool,

    /// Full text of the patched document.
    pub text: String,
}

/// RIME custom file bound to a patcher.
#[derive(Debug)]
pub struct CustomConfig<P = IndentPatcher>
where
    P: Patcher,
{
    path: PathBuf,
    patcher: P,
}

impl<P> CustomConfig<P>
where
    P: Patcher,
{
    /// Construct new custom file handle.
    ///
    /// Does not touch the file system.
    pub fn new(path: impl Into<PathBuf>, patcher: P) -> Self {
        Self {
            path: path.into(),
            patcher,
        }
    }

    /// Path to custom file.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Patch custom file in memory without writing it.
    ///
    /// With [`ApplyMode::Create`], a missing file previews as the text it
    /// would be created with.
    ///
    /// # Errors
    ///
    /// - Return [`CustomError::Missing`] if custom file does not exist, and
    ///   mode is [`ApplyMode::Existing`].
    /// - Return [`CustomError::Read`] if custom file cannot be read, or is not
    ///   valid UTF-8.
    pub fn preview(&self, request: &PatchRequest, mode: ApplyMode) -> Result<Preview> {
        let (document, _) = self.load_for(mode)?;
        let patched = self.patcher.patch(document.lines().to_vec(), request);

        Ok(Preview {
            applied: patched.applied,
            text: document.with_lines(patched.lines).to_string(),
        })
    }

    /// Patch custom file in place.
    ///
    /// The file is only rewritten when the patch applied, so an already
    /// patched file stays byte-for-byte identical.
    ///
    /// # Errors
    ///
    /// - Return [`CustomError::Missing`] if custom file does not exist, and
    ///   mode is [`ApplyMode::Existing`].
    /// - Return [`CustomError::Read`] if custom file cannot be read, or is not
    ///   valid UTF-8.
    /// - Return [`CustomError::CreateDir`] if parent directories cannot be
    ///   created.
    /// - Return [`CustomError::Write`] if patched text cannot be written.
    #[instrument(skip(self, request), fields(path = %self.path.display()), level = "debug")]
    pub fn apply(&self, request: &PatchRequest, mode: ApplyMode) -> Result<Outcome> {
        let (document, created) = self.load_for(mode)?;
        let patched = self.patcher.patch(document.lines().to_vec(), request);
        if !patched.applied {
            info!("{} is already patched", self.path.display());
            return Ok(Outcome::AlreadyPatched);
        }

        if created {
            self.create_parent()?;
        }

        let text = document.with_lines(patched.lines).to_string();
        write(&self.path, text.as_bytes()).map_err(|err| CustomError::Write {
            source: err,
            path: self.path.clone(),
        })?;

        if created {
            info!("created {}", self.path.display());
            Ok(Outcome::Created)
        } else {
            info!("patched {}", self.path.display());
            Ok(Outcome::Patched)
        }
    }

    /// Check if custom file already contains any of the request's markers.
    ///
    /// # Errors
    ///
    /// - Return [`CustomError::Missing`] if custom file does not exist.
    /// - Return [`CustomError::Read`] if custom file cannot be read, or is not
    ///   valid UTF-8.
    pub fn is_patched(&self, request: &PatchRequest) -> Result<bool> {
        let document = self.load()?;
        Ok(request.is_patched(&document.lines().join("\n")))
    }

    fn load_for(&self, mode: ApplyMode) -> Result<(Document, bool)> {
        match self.load() {
            Ok(document) => Ok((document, false)),
            Err(CustomError::Missing { .. }) if mode == ApplyMode::Create => {
                warn!("{} does not exist, starting from empty file", self.path.display());
                Ok((Document::fresh(), true))
            }
            Err(error) => Err(error),
        }
    }

    fn load(&self) -> Result<Document> {
        let bytes = read(&self.path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => CustomError::Missing {
                path: self.path.clone(),
            },
            _ => CustomError::Read {
                source: err,
                path: self.path.clone(),
            },
        })?;

        let text = String::from_utf8(bytes).map_err(|err| CustomError::Read {
            source: IoError::new(ErrorKind::InvalidData, err),
            path: self.path.clone(),
        })?;

        // INVARIANT: Document parsing is infallible.
        let document = match text.parse::<Document>() {
            Ok(document) => document,
            Err(never) => match never {},
        };

        Ok(document)
    }

    fn create_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            mkdirp::mkdirp(parent).map_err(|err| CustomError::CreateDir {
                source: err,
                path: parent.to_path_buf(),
            })?;
        }

        Ok(())
    }
}

impl CustomConfig<IndentPatcher> {
    /// Construct new custom file handle using the heuristic patcher.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(path, IndentPatcher)
    }
}

/// Custom file error types.
#[derive(Debug, thiserror::Error)]
pub enum CustomError {
    /// Custom file does not exist.
    #[error("custom file {path:?} does not exist")]
    Missing { path: PathBuf },

    /// Custom file cannot be read.
    #[error("failed to read custom file {path:?}")]
    Read { source: IoError, path: PathBuf },

    /// Custom file cannot be written.
    #[error("failed to write custom file {path:?}")]
    Write { source: IoError, path: PathBuf },

    /// Parent directories of custom file cannot be created.
    #[error("failed to create directory {path:?}")]
    CreateDir { source: IoError, path: PathBuf },
}

/// Friendly result alias :3
type Result<T, E = CustomError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{InsertionBlock, Patched};
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::read_to_string;

    struct AppendPatcher;

    impl Patcher for AppendPatcher {
        fn patch(&self, mut document: Vec<String>, request: &PatchRequest) -> Patched {
            if request.is_patched(&document.join("\n")) {
                return Patched {
                    lines: document,
                    applied: false,
                };
            }
            document.extend(request.block.lines().iter().cloned());
            Patched {
                lines: document,
                applied: true,
            }
        }
    }

    fn request() -> PatchRequest {
        let block = InsertionBlock::new(["    - schema: foo_im"]).unwrap();
        PatchRequest::new("schema_list", block).with_markers(["foo_im"])
    }

    #[sealed_test]
    fn apply_uses_given_patcher() -> anyhow::Result<()> {
        write("custom.yaml", "a: 1\n")?;
        let custom = CustomConfig::new("custom.yaml", AppendPatcher);

        assert_eq!(custom.apply(&request(), ApplyMode::Existing)?, Outcome::Patched);
        assert_eq!(read_to_string("custom.yaml")?, "a: 1\n- schema: foo_im\n");

        Ok(())
    }

    #[sealed_test]
    fn preview_does_not_write() -> anyhow::Result<()> {
        let original = indoc! {"
            patch:
              schema_list:
                - schema: luna_pinyin
        "};
        write("default.custom.yaml", original)?;
        let custom = CustomConfig::open("default.custom.yaml");

        let preview = custom.preview(&request(), ApplyMode::Existing)?;

        assert!(preview.applied);
        assert!(preview.text.contains("    - schema: foo_im\n"));
        assert_eq!(read_to_string("default.custom.yaml")?, original);

        Ok(())
    }

    #[sealed_test]
    fn preview_of_missing_file_in_create_mode() -> anyhow::Result<()> {
        let custom = CustomConfig::open("Rime/default.custom.yaml");

        let request = request().with_banner(Vec::<String>::new());

        let preview = custom.preview(&request, ApplyMode::Create)?;

        assert!(preview.applied);
        assert_eq!(
            preview.text,
            "patch:\n  schema_list:\n    - schema: foo_im\n"
        );
        assert!(!Path::new("Rime").exists());

        Ok(())
    }

    #[sealed_test]
    fn preview_of_missing_file_needs_create_mode() {
        let custom = CustomConfig::open("nowhere.yaml");
        let result = custom.preview(&request(), ApplyMode::Existing);

        assert!(matches!(result, Err(CustomError::Missing { .. })));
    }

    #[sealed_test]
    fn missing_file_is_reported() {
        let custom = CustomConfig::open("nowhere.yaml");
        let result = custom.apply(&request(), ApplyMode::Existing);

        assert!(matches!(result, Err(CustomError::Missing { .. })));
    }

    #[sealed_test]
    fn invalid_utf8_is_read_error() -> anyhow::Result<()> {
        write("default.custom.yaml", b"\xff\xfe\x00")?;
        let custom = CustomConfig::open("default.custom.yaml");

        match custom.is_patched(&request()) {
            Err(CustomError::Read { source, .. }) => {
                assert_eq!(source.kind(), ErrorKind::InvalidData)
            }
            other => panic!("expected read error, got {other:?}"),
        }

        Ok(())
    }

    #[sealed_test]
    fn is_patched_checks_markers() -> anyhow::Result<()> {
        write("default.custom.yaml", "patch:\n  schema_list:\n    - schema: foo_im\n")?;
        let custom = CustomConfig::open("default.custom.yaml");

        assert!(custom.is_patched(&request())?);

        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the patch profile that rimepatch uses to decide what
//! gets inserted where. File I/O is left to the caller to figure out.

use crate::patch::{
    InsertionBlock, PatchError, PatchRequest, DEFAULT_ENCLOSING_KEY, DEFAULT_LABEL,
    DEFAULT_SECTION_KEY, DEFAULT_SEPARATOR,
};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
};

/// Patch profile layout.
///
/// A __profile__ names the RIME file to patch, and describes the patch
/// itself: which section receives the new lines, what those lines are, and
/// which substrings prove that the file was already patched.
///
/// # General Layout
///
/// A profile is composed of two tables: target and patch. The target table
/// locates the file. The patch table describes the insertion. Every field
/// falls back to the bundled BP schema set when left out.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PatchProfile {
    /// Where the patched file lives.
    pub target: TargetSettings,

    /// What gets inserted.
    pub patch: PatchSettings,
}

impl PatchProfile {
    /// Build patch request from profile.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Block`] if the insertion block is empty.
    pub fn request(&self) -> Result<PatchRequest> {
        let settings = &self.patch;
        let block = InsertionBlock::new(settings.block.iter().cloned())?;
        let separator = &settings.separator;
        let banner = [separator, &settings.label, separator]
            .into_iter()
            .filter(|line| !line.is_empty())
            .cloned();

        Ok(PatchRequest::new(settings.section_key.clone(), block)
            .with_enclosing_key(settings.enclosing_key.clone())
            .with_banner(banner)
            .with_markers(settings.markers.iter().cloned()))
    }
}

impl FromStr for PatchProfile {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut profile: PatchProfile =
            toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on RIME directory field.
        if let Some(rime_dir) = &profile.target.rime_dir {
            profile.target.rime_dir = Some(PathBuf::from(
                shellexpand::full(rime_dir.to_string_lossy().as_ref())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            ));
        }

        Ok(profile)
    }
}

impl Display for PatchProfile {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Target file settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetSettings {
    /// File name relative to the RIME user directory.
    pub file: String,

    /// RIME user directory to use instead of probing for one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rime_dir: Option<PathBuf>,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            file: "default.custom.yaml".into(),
            rime_dir: None,
        }
    }
}

/// Insertion settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PatchSettings {
    /// Key of the list section to insert into.
    pub section_key: String,

    /// Key to wrap the section in when it has to be created.
    pub enclosing_key: String,

    /// Separator comment placed around the label, left out if empty.
    pub separator: String,

    /// Label comment placed before the block, left out if empty.
    pub label: String,

    /// Substrings proving that the file is already patched.
    pub markers: Vec<String>,

    /// Lines to insert, with their intended indentation.
    pub block: Vec<String>,
}

impl Default for PatchSettings {
    fn default() -> Self {
        Self {
            section_key: DEFAULT_SECTION_KEY.into(),
            enclosing_key: DEFAULT_ENCLOSING_KEY.into(),
            separator: DEFAULT_SEPARATOR.into(),
            label: DEFAULT_LABEL.into(),
            markers: vec![
                "bp_phing_im".into(),
                "bp_hong_im".into(),
                "bp_kb_zu_im".into(),
            ],
            block: vec![
                "    - { schema: bp_kb_zu_im } # 閩拚輸入法注音符號按鍵練習".into(),
                "    - { schema: bp_phing_im } # 閩拼方案輸入法".into(),
                "    - { schema: bp_hong_im }  # 閩拼方案輸入法".into(),
            ],
        }
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Profile describes an unusable insertion block.
    #[error(transparent)]
    Block(#[from] PatchError),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

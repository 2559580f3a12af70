// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, or managed in some way. Mostly this means figuring out
//! where the user's RIME frontend keeps its user directory.
//!
//! # RIME User Directories
//!
//! Each RIME frontend picks its own user directory:
//!
//! - Weasel (Windows): `%APPDATA%\Rime`
//! - Squirrel (macOS): `~/Library/Rime`
//! - fcitx5-rime: `$XDG_DATA_HOME/fcitx5/rime`
//! - ibus-rime: `~/.config/ibus/rime`
//! - fcitx-rime: `~/.config/fcitx/rime`
//!
//! Candidates are checked in that order for the current platform, and the
//! first one that exists wins.

use std::path::PathBuf;
use tracing::debug;

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(PathError::NoWayHome)
}

/// List candidate RIME user directories for current platform.
///
/// Paths are given in probing order. Does not check if they exist.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn rime_dir_candidates() -> Result<Vec<PathBuf>> {
    let home = home_dir()?;

    if cfg!(windows) {
        return Ok(dirs::config_dir()
            .map(|path| vec![path.join("Rime")])
            .unwrap_or_else(|| vec![home.join("AppData").join("Roaming").join("Rime")]));
    }

    if cfg!(target_os = "macos") {
        return Ok(vec![home.join("Library").join("Rime")]);
    }

    let data_dir = dirs::data_dir().unwrap_or_else(|| home.join(".local").join("share"));
    Ok(vec![
        data_dir.join("fcitx5").join("rime"),
        home.join(".config").join("ibus").join("rime"),
        home.join(".config").join("fcitx").join("rime"),
    ])
}

/// Find existing RIME user directory.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
/// - Return [`PathError::NoRimeDir`] if none of the candidates exist.
pub fn find_rime_dir() -> Result<PathBuf> {
    let candidates = rime_dir_candidates()?;
    for candidate in &candidates {
        debug!("check rime user directory {}", candidate.display());
        if candidate.is_dir() {
            return Ok(candidate.clone());
        }
    }

    Err(PathError::NoRimeDir {
        searched: candidates,
    })
}

/// Determine default absolute path to patch profile.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/rimepatch/profile.toml` as
/// the default absolute path for the profile. Does not check if the path
/// returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_profile_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("rimepatch").join("profile.toml"))
        .ok_or(PathError::NoWayHome)
}

/// Path resolution error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum PathError {
    /// No way to determine user's home directory.
    ///
    /// # See Also
    ///
    /// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
    #[error("cannot determine absolute path to user's home directory")]
    NoWayHome,

    /// No RIME user directory exists at any candidate path.
    #[error("cannot find rime user directory, searched: {}", display_paths(.searched))]
    NoRimeDir { searched: Vec<PathBuf> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::create_dir_all;

    #[sealed_test(env = [("HOME", "/home/blah"), ("XDG_DATA_HOME", "/home/blah/.local/share")])]
    fn candidates_follow_search_order() -> anyhow::Result<()> {
        let result = rime_dir_candidates()?;
        let expect = vec![
            PathBuf::from("/home/blah/.local/share/fcitx5/rime"),
            PathBuf::from("/home/blah/.config/ibus/rime"),
            PathBuf::from("/home/blah/.config/fcitx/rime"),
        ];

        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn find_picks_first_existing_candidate() -> anyhow::Result<()> {
        let home = std::env::current_dir()?;
        std::env::set_var("HOME", &home);
        std::env::set_var("XDG_DATA_HOME", home.join("data"));
        create_dir_all(home.join(".config/ibus/rime"))?;
        create_dir_all(home.join(".config/fcitx/rime"))?;

        assert_eq!(find_rime_dir()?, home.join(".config/ibus/rime"));

        Ok(())
    }

    #[sealed_test]
    fn find_reports_every_searched_path() -> anyhow::Result<()> {
        let home = std::env::current_dir()?;
        std::env::set_var("HOME", &home);
        std::env::set_var("XDG_DATA_HOME", home.join("data"));

        let error = find_rime_dir().unwrap_err();
        let message = error.to_string();

        assert!(matches!(error, PathError::NoRimeDir { ref searched } if searched.len() == 3));
        assert!(message.contains("fcitx5/rime"));
        assert!(message.contains(".config/ibus/rime"));

        Ok(())
    }

    #[sealed_test(env = [("XDG_CONFIG_HOME", "/home/blah/.config")])]
    fn profile_path_lives_in_config_dir() -> anyhow::Result<()> {
        assert_eq!(
            default_profile_path()?,
            PathBuf::from("/home/blah/.config/rimepatch/profile.toml")
        );

        Ok(())
    }
}

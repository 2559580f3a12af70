// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use std::{
    fs::{create_dir_all, read_to_string, write},
    path::{Path, PathBuf},
};

pub(crate) struct CustomFixture {
    path: PathBuf,
}

impl CustomFixture {
    pub(crate) fn new(path: impl AsRef<Path>, contents: impl AsRef<str>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // INVARIANT: Always provide parent directories for nested fixtures.
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            create_dir_all(parent)?;
        }
        write(&path, contents.as_ref())?;

        Ok(Self { path })
    }

    pub(crate) fn absent(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub(crate) fn contents(&self) -> Result<String> {
        Ok(read_to_string(&self.path)?)
    }
}

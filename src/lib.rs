// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Install schema entries into RIME user configuration.
//!
//! RIME keeps the list of active input schemas in `default.custom.yaml`
//! under `patch:` → `schema_list:`. Shipping a new schema set means adding
//! a few entries to that list on the user's machine, while leaving every
//! other setting they have alone.
//!
//! # Overview
//!
//! - [`patch`]: line-oriented heuristic that inserts a block into the schema
//!   list, or appends a fresh section when there is none.
//! - [`document`]: splits text into lines and puts it back together with the
//!   same line endings.
//! - [`config`]: patch profile describing the target file and the block.
//! - [`path`]: locates the RIME user directory of the installed frontend.
//! - [`custom`]: reads, patches, and writes back a custom file.

pub mod config;
pub mod custom;
pub mod document;
pub mod patch;
pub mod path;

pub use config::PatchProfile;
pub use custom::{ApplyMode, CustomConfig, Outcome};
pub use patch::{IndentPatcher, InsertionBlock, PatchRequest, Patched, Patcher};

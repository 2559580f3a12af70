// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use rimepatch::{
    custom::{ApplyMode, CustomConfig, Outcome},
    path::{default_profile_path, find_rime_dir},
    PatchProfile,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::{fs::read_to_string, path::PathBuf, process::exit};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "rimepatch [options] <rimepatch-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Apply(opts) => run_apply(opts),
            Command::Status(opts) => run_status(opts),
            Command::Locate => run_locate(),
            Command::Profile(opts) => run_profile(opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Insert schema entries into RIME custom file.
    #[command(override_usage = "rimepatch apply [options]")]
    Apply(ApplyOptions),

    /// Show whether RIME custom file is already patched.
    #[command(override_usage = "rimepatch status [options]")]
    Status(TargetOptions),

    /// Print RIME user directory of installed frontend.
    #[command(override_usage = "rimepatch locate")]
    Locate,

    /// Print effective patch profile.
    #[command(override_usage = "rimepatch profile [options]")]
    Profile(ProfileOptions),
}

#[derive(Args, Clone, Debug)]
struct TargetOptions {
    /// Path to custom file, overrides RIME directory lookup.
    #[arg(short, long, value_name = "path")]
    pub file: Option<PathBuf>,

    /// RIME user directory to use instead of probing for one.
    #[arg(short, long, value_name = "dir")]
    pub rime_dir: Option<PathBuf>,

    /// Path to patch profile.
    #[arg(short, long, value_name = "path")]
    pub profile: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ApplyOptions {
    #[command(flatten)]
    pub target: TargetOptions,

    /// Create custom file if it does not exist.
    #[arg(short, long)]
    pub create: bool,

    /// Print patched text instead of writing it.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ProfileOptions {
    /// Path to patch profile.
    #[arg(short, long, value_name = "path")]
    pub profile: Option<PathBuf>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_apply(opts: ApplyOptions) -> Result<()> {
    let profile = load_profile(opts.target.profile.as_ref())?;
    let request = profile.request()?;
    let custom = CustomConfig::open(resolve_target(&opts.target, &profile)?);

    let mode = if opts.create {
        ApplyMode::Create
    } else {
        ApplyMode::Existing
    };

    if opts.dry_run {
        let preview = custom.preview(&request, mode)?;
        if !preview.applied {
            info!("{} is already patched", custom.path().display());
        }
        print!("{}", preview.text);
        return Ok(());
    }

    match custom.apply(&request, mode)? {
        Outcome::Patched | Outcome::Created => {
            info!("redeploy rime for the new schemas to take effect")
        }
        Outcome::AlreadyPatched => {}
    }

    Ok(())
}

fn run_status(opts: TargetOptions) -> Result<()> {
    let profile = load_profile(opts.profile.as_ref())?;
    let request = profile.request()?;
    let custom = CustomConfig::open(resolve_target(&opts, &profile)?);

    if custom.is_patched(&request)? {
        info!("{} is patched", custom.path().display());
    } else {
        info!("{} is not patched", custom.path().display());
    }

    Ok(())
}

fn run_locate() -> Result<()> {
    println!("{}", find_rime_dir()?.display());
    Ok(())
}

fn run_profile(opts: ProfileOptions) -> Result<()> {
    print!("{}", load_profile(opts.profile.as_ref())?);
    Ok(())
}

fn load_profile(path: Option<&PathBuf>) -> Result<PatchProfile> {
    let path = match path {
        Some(path) => path.clone(),
        None => {
            let path = default_profile_path()?;
            if !path.exists() {
                debug!("no profile at {}, using bundled schemas", path.display());
                return Ok(PatchProfile::default());
            }
            path
        }
    };

    debug!("load profile {}", path.display());
    let data = read_to_string(&path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    data.parse::<PatchProfile>()
        .with_context(|| format!("failed to parse profile {}", path.display()))
}

fn resolve_target(opts: &TargetOptions, profile: &PatchProfile) -> Result<PathBuf> {
    if let Some(file) = &opts.file {
        return Ok(file.clone());
    }

    let rime_dir = match (&opts.rime_dir, &profile.target.rime_dir) {
        (Some(dir), _) | (None, Some(dir)) => dir.clone(),
        (None, None) => find_rime_dir()?,
    };

    Ok(rime_dir.join(&profile.target.file))
}

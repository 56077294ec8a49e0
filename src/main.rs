//! ppbind - Native performance library front end
//!
//! Main CLI entry point for loading a performance library and running
//! calculations through it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ppbind::config::{PpbindConfig, CONFIG_FILE_NAME};
use ppbind::{GameMode, Mods, PerformanceLibrary, ScoreParams};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ppbind")]
#[command(version)]
#[command(about = "Run performance calculations through a native library", long_about = None)]
struct Cli {
    /// Config file (default: nearest ppbind.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate pp and stars for a beatmap
    Calc {
        /// Beatmap (.osu) file
        #[arg(short, long)]
        beatmap: PathBuf,

        /// Native library (overrides [library] path)
        #[arg(short, long)]
        lib: Option<PathBuf>,

        /// Game mode: osu, taiko, catch, mania or 0-3
        #[arg(short, long)]
        mode: Option<GameMode>,

        /// Mods as acronyms, bits or JSON
        #[arg(long)]
        mods: Option<String>,

        /// Max combo
        #[arg(long, default_value = "0")]
        combo: u32,

        /// Accuracy in percent
        #[arg(long, default_value = "100.0")]
        acc: f64,

        /// Miss count
        #[arg(long, default_value = "0")]
        misses: u32,

        /// Only score the first N hit objects
        #[arg(long)]
        passed: Option<u32>,

        /// Use lazer scoring
        #[arg(long)]
        lazer: bool,

        /// Read the beatmap into memory and use calculate_score_bytes
        #[arg(long)]
        bytes: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a native library and check its entry points
    Check {
        /// Native library (overrides [library] path)
        #[arg(short, long)]
        lib: Option<PathBuf>,
    },

    /// Show how a mods string is read
    Mods {
        /// Mods text
        #[arg(allow_hyphen_values = true)]
        text: String,

        /// Game mode JSON mods are resolved against
        #[arg(short, long, default_value = "osu")]
        mode: GameMode,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage ppbind.toml
    Config {
        /// Write a default ppbind.toml
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,

        /// Target file (default: ./ppbind.toml)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ppbind=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calc {
            beatmap,
            lib,
            mode,
            mods,
            combo,
            acc,
            misses,
            passed,
            lazer,
            bytes,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let params = ScoreParams::new(mode.unwrap_or(config.defaults.mode))
                .with_combo(combo)
                .with_accuracy(acc)
                .with_misses(misses)
                .with_passed_objects(passed)
                .with_lazer(lazer || config.defaults.lazer);
            let mods = mods.unwrap_or_else(|| config.defaults.mods.clone());
            cmd_calc(&config, lib, &beatmap, &mods, &params, bytes, json)
        }
        Commands::Check { lib } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_check(&config, lib)
        }
        Commands::Mods { text, mode, json } => cmd_mods(&text, mode, json),
        Commands::Config { init, force, path } => cmd_config(cli.config, init, force, path),
    }
}

fn load_config(path: Option<&Path>) -> Result<PpbindConfig> {
    let config = match path {
        Some(path) => PpbindConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PpbindConfig::load_from_cwd().context("Failed to load ppbind.toml")?,
    };
    debug!(?config, "configuration");
    Ok(config)
}

fn open_library(config: &PpbindConfig, lib: Option<PathBuf>) -> Result<PerformanceLibrary> {
    let path = lib.or_else(|| config.library.path.clone()).with_context(|| {
        format!(
            "No native library given: pass --lib or set [library] path in {}",
            CONFIG_FILE_NAME
        )
    })?;
    let library = PerformanceLibrary::load(&path)?.with_policy(config.call_policy());
    Ok(library)
}

#[derive(Serialize)]
struct CalcOutput<'a> {
    beatmap: &'a Path,
    mode: GameMode,
    mods: &'a str,
    entry_point: &'static str,
    lazer: bool,
    pp: f64,
    stars: f64,
}

fn cmd_calc(
    config: &PpbindConfig,
    lib: Option<PathBuf>,
    beatmap: &Path,
    mods: &str,
    params: &ScoreParams,
    bytes: bool,
    json: bool,
) -> Result<()> {
    let library = open_library(config, lib)?;

    let start = Instant::now();
    let (entry_point, result) = if bytes {
        let data = fs::read(beatmap)
            .with_context(|| format!("Failed to read beatmap {}", beatmap.display()))?;
        let parsed = Mods::parse(mods, params.mode)
            .with_context(|| format!("Invalid mods {:?}", mods))?;
        let bits = parsed.legacy_bits().with_context(|| {
            format!(
                "Mods {:?} have no legacy bitmask; drop --bytes to pass them as text",
                mods
            )
        })?;
        let result = library.calculate_score_bytes(&data, bits, params)?;
        ("calculate_score_bytes", result)
    } else {
        // The native side falls back to no mods on text it cannot read.
        if let Err(e) = Mods::parse(mods, params.mode) {
            warn!("mods {:?} will be treated as no mods: {}", mods, e);
        }
        let result = library.calculate_score(beatmap, mods, params)?;
        ("calculate_score", result)
    };
    debug!(elapsed = ?start.elapsed(), entry_point, "calculation finished");

    if json {
        let output = CalcOutput {
            beatmap,
            mode: params.mode,
            mods,
            entry_point,
            lazer: params.lazer,
            pp: result.pp,
            stars: result.stars,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", result);
    }

    Ok(())
}

fn cmd_check(config: &PpbindConfig, lib: Option<PathBuf>) -> Result<()> {
    let library = open_library(config, lib)?;
    let path = library
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    println!("Library: {}", path);
    println!("  calculate_score        ok");
    println!("  calculate_score_bytes  ok");
    println!("  call policy            {:?}", library.policy());

    Ok(())
}

#[derive(Serialize)]
struct ModsOutput<'a> {
    input: &'a str,
    #[serde(flatten)]
    mods: &'a Mods,
    legacy_bits: Option<u32>,
}

fn cmd_mods(text: &str, mode: GameMode, json: bool) -> Result<()> {
    let mods = Mods::parse(text, mode)?;
    let legacy_bits = mods.legacy_bits();

    if json {
        let output = ModsOutput {
            input: text,
            mods: &mods,
            legacy_bits,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Kind:        {}", mods.kind());
    println!("Mods:        {}", mods);
    match legacy_bits {
        Some(bits) => println!("Legacy bits: {}", bits),
        None => println!("Legacy bits: (none)"),
    }

    Ok(())
}

fn cmd_config(
    config_arg: Option<PathBuf>,
    init: bool,
    force: bool,
    path: Option<PathBuf>,
) -> Result<()> {
    if init {
        let target = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        if target.exists() && !force {
            bail!(
                "{} already exists (use --force to overwrite)",
                target.display()
            );
        }
        PpbindConfig::default()
            .save(&target)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        println!("Wrote {}", target.display());
        return Ok(());
    }

    let source = match path.or(config_arg) {
        Some(path) => Some(path),
        None => PpbindConfig::find(&std::env::current_dir()?),
    };
    let config = match &source {
        Some(path) => PpbindConfig::load(path)?,
        None => PpbindConfig::default(),
    };

    match &source {
        Some(path) => println!("# {}", path.display()),
        None => println!("# defaults (no {} found)", CONFIG_FILE_NAME),
    }
    print!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}

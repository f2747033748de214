//! ffc: command-line flat-field correction.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use flatfield::{Config, CorrectionSession, InputKind};

const LOG_BASENAME: &str = "ffc";

#[derive(Parser)]
#[command(name = "ffc")]
#[command(about = "Dark/flat-field correction for grayscale images")]
#[command(version)]
struct Cli {
    /// YAML or JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, overrides the config file (e.g. `debug`).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correct a raw image and write the 8-bit result.
    Correct(CorrectArgs),

    /// Derive synthetic dark and flat fields from a raw image.
    Generate(GenerateArgs),
}

#[derive(Debug, Clone, Args)]
struct CorrectArgs {
    /// Raw exposure.
    #[arg(long)]
    raw: PathBuf,

    /// Dark-field image.
    #[arg(long)]
    dark: Option<PathBuf>,

    /// Flat-field image.
    #[arg(long)]
    flat: Option<PathBuf>,

    /// Synthesize whichever of dark/flat is not given.
    #[arg(long)]
    generate: bool,

    /// Noise seed for synthetic flat fields.
    #[arg(long)]
    seed: Option<u64>,

    /// Output path for the corrected image (`.png` appended if no extension).
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct GenerateArgs {
    /// Raw exposure.
    #[arg(long)]
    raw: PathBuf,

    /// Output path for the dark field.
    #[arg(long)]
    dark_out: PathBuf,

    /// Output path for the flat field.
    #[arg(long)]
    flat_out: PathBuf,

    /// Noise seed for the flat field.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    let _logger =
        common::log_setup::setup_logging(&config.log_level, config.log_dir.as_deref(), LOG_BASENAME)
            .context("Failed to initialize logging")?;

    match cli.command {
        Commands::Correct(args) => run_correct(args, config),
        Commands::Generate(args) => run_generate(args, config),
    }
}

fn run_correct(args: CorrectArgs, mut config: Config) -> anyhow::Result<()> {
    if args.seed.is_some() {
        config.synthetic.seed = args.seed;
    }

    let mut session = CorrectionSession::new();
    load(&mut session, InputKind::Raw, &args.raw)?;

    if args.generate && (args.dark.is_none() || args.flat.is_none()) {
        session
            .generate_fields(&config.synthetic)
            .context("Failed to generate calibration fields")?;
    } else if args.dark.is_none() || args.flat.is_none() {
        bail!("Both --dark and --flat are required unless --generate is set");
    }

    if let Some(dark) = &args.dark {
        load(&mut session, InputKind::Dark, dark)?;
    }
    if let Some(flat) = &args.flat {
        load(&mut session, InputKind::Flat, flat)?;
    }

    session.correct().context("Flat-field correction failed")?;
    let written = session.save_corrected(&args.out)?;
    log::info!("Corrected image written to {}", written.display());

    Ok(())
}

fn run_generate(args: GenerateArgs, mut config: Config) -> anyhow::Result<()> {
    if args.seed.is_some() {
        config.synthetic.seed = args.seed;
    }

    let mut session = CorrectionSession::new();
    load(&mut session, InputKind::Raw, &args.raw)?;
    session
        .generate_fields(&config.synthetic)
        .context("Failed to generate calibration fields")?;

    let dark = session.save_field(InputKind::Dark, &args.dark_out)?;
    let flat = session.save_field(InputKind::Flat, &args.flat_out)?;
    log::info!(
        "Synthetic fields written to {} and {}",
        dark.display(),
        flat.display()
    );

    Ok(())
}

fn load(session: &mut CorrectionSession, kind: InputKind, path: &Path) -> anyhow::Result<()> {
    let result = match kind {
        InputKind::Raw => session.load_raw(path),
        InputKind::Dark => session.load_dark(path),
        InputKind::Flat => session.load_flat(path),
        InputKind::Corrected => bail!("The corrected image is an output, not an input"),
    };
    result.with_context(|| format!("Failed to load {} image", kind))
}

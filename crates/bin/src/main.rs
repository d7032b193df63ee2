//! Patrol CLI binary.
//!
//! Drives the preparation and modeling stages from the command line.

use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use patrol::{
    NetworkKind, PipelineConfig, PipelineInputs, PreparedStudy, export, fit_complete_case,
    fit_multiply_imputed_with_progress, prepare, summarize_alaam,
};
use patrol_models::{DrawFileEstimator, read_draws};
use patrol_network::{Contagion, available_covariates};
use patrol_output::{
    AlaamArtifacts, CoefficientRow, ExportFormat, Exporter, RunReportBuilder, logistic_table,
    pooled_table, posterior_table, summarize_network,
};
use serde_json::json;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "patrol")]
#[command(about = "Officer nomination networks: ALAAM inputs and logistic regression", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Raw tables and configuration shared by the data commands.
#[derive(Args)]
struct StudyArgs {
    /// First survey wave (CSV); defines the roster
    #[arg(long)]
    wave1: PathBuf,

    /// Second survey wave (CSV)
    #[arg(long)]
    wave2: PathBuf,

    /// Incident log (CSV)
    #[arg(long)]
    incidents: PathBuf,

    /// Pipeline configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Nomination network: mentor, friend or combined
    #[arg(long)]
    network: Option<NetworkKind>,

    /// Output directory
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
    PrettyJson,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
            Format::PrettyJson => Self::PrettyJson,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the surveys, build the network and write the ALAAM inputs
    Prepare {
        #[command(flatten)]
        study: StudyArgs,

        /// Contagion term of the ALAAM: none or simple
        #[arg(long)]
        contagion: Option<Contagion>,

        /// Artifact format
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },

    /// Fit the complete-case and multiply imputed logistic regressions
    Regress {
        #[command(flatten)]
        study: StudyArgs,

        /// Number of imputed datasets
        #[arg(long)]
        imputations: Option<usize>,

        /// Seed of the imputation draws
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Summarize coefficient draws written by an external ALAAM run
    AlaamSummary {
        /// Draw file (CSV, one column per parameter)
        #[arg(long)]
        draws: PathBuf,

        /// Output coefficient table (CSV)
        #[arg(long)]
        out: PathBuf,

        /// Directory of the exported inputs; checks the draw columns against them
        #[arg(long)]
        artifacts: Option<PathBuf>,

        /// Format of the exported inputs
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        /// Pipeline configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Contagion term the run used
        #[arg(long)]
        contagion: Option<Contagion>,

        /// Iterations of the chain
        #[arg(long)]
        iterations: Option<usize>,

        /// Leading iterations to discard
        #[arg(long)]
        burn_in: Option<usize>,

        /// Keep every n-th iteration after burn-in
        #[arg(long)]
        thinning: Option<usize>,

        /// Credible interval level
        #[arg(long)]
        level: Option<f64>,
    },

    /// List the network covariates
    Covariates,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare {
            study,
            contagion,
            format,
        } => {
            let mut config = load_config(study.config.as_deref(), study.network)?;
            if let Some(contagion) = contagion {
                config.contagion = contagion;
            }
            run_prepare(&study, &config, format.into())?;
        }
        Commands::Regress {
            study,
            imputations,
            seed,
        } => {
            let mut config = load_config(study.config.as_deref(), study.network)?;
            if let Some(imputations) = imputations {
                config.imputations = imputations;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            config.validate()?;
            run_regress(&study, &config)?;
        }
        Commands::AlaamSummary {
            draws,
            out,
            artifacts,
            format,
            config,
            contagion,
            iterations,
            burn_in,
            thinning,
            level,
        } => {
            let mut config = load_config(config.as_deref(), None)?;
            if let Some(contagion) = contagion {
                config.contagion = contagion;
            }
            if let Some(iterations) = iterations {
                config.alaam.iterations = iterations;
            }
            if let Some(burn_in) = burn_in {
                config.alaam.burn_in = burn_in;
            }
            if let Some(thinning) = thinning {
                config.alaam.thinning = thinning;
            }
            if let Some(level) = level {
                config.interval_level = level;
            }
            config.validate()?;
            run_alaam_summary(&draws, &out, artifacts.as_deref(), format.into(), &config)?;
        }
        Commands::Covariates => list_covariates(),
    }

    Ok(())
}

fn load_config(
    path: Option<&Path>,
    network: Option<NetworkKind>,
) -> Result<PipelineConfig, Box<dyn Error>> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(network) = network {
        config.network = network;
    }
    Ok(config)
}

fn load_study(study: &StudyArgs, config: &PipelineConfig) -> Result<PreparedStudy, Box<dyn Error>> {
    let inputs = PipelineInputs::read(&study.wave1, &study.wave2, &study.incidents)?;
    Ok(prepare(&inputs, config)?)
}

fn run_prepare(
    study: &StudyArgs,
    config: &PipelineConfig,
    format: ExportFormat,
) -> Result<(), Box<dyn Error>> {
    let prepared = load_study(study, config)?;
    fs::create_dir_all(&study.out)?;
    let paths = export(&prepared, config, &study.out, format)?;
    let summary = summarize_network(&prepared.network)?;

    println!("\n{} network", config.network);
    println!("  Nodes:          {}", summary.nodes);
    println!("  Edges:          {}", summary.edges);
    println!("  Density:        {:.4}", summary.density);
    println!("  Isolates:       {}", summary.isolates);
    println!("  Mutual dyads:   {}", summary.mutual_dyads);
    println!("  Triangles:      {}", summary.triangles);
    println!("\nWrote {} files to {}", paths.len(), study.out.display());

    let report_path = study.out.join("report.json");
    RunReportBuilder::new()
        .stage("prepare")
        .network(&summary)
        .artifacts(paths)
        .contents(json!({
            "network": config.network,
            "contagion": config.contagion,
            "attributes": config.alaam_attributes,
            "summary": summary,
        }))
        .build()?
        .write(&report_path)?;
    info!("report written to {}", report_path.display());
    Ok(())
}

fn run_regress(study: &StudyArgs, config: &PipelineConfig) -> Result<(), Box<dyn Error>> {
    let prepared = load_study(study, config)?;
    fs::create_dir_all(&study.out)?;

    let complete = fit_complete_case(&prepared, config)?;

    let pb = ProgressBar::new(config.imputations as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.set_message("Fitting imputed datasets...");
    let imputed = match fit_multiply_imputed_with_progress(&prepared, config, |done| {
        pb.set_position(done as u64);
    }) {
        Ok(imputed) => {
            pb.finish_with_message(format!("Pooled {} fits", imputed.fits.len()));
            imputed
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    let mut rows = logistic_table("complete_case", &complete, config.interval_level);
    rows.extend(pooled_table("pooled", &imputed.pooled, config.interval_level));
    print_coefficients(&rows);

    let table_path = study.out.join("coefficients.csv");
    rows.export_to_file(&table_path, ExportFormat::Csv)?;

    let summary = summarize_network(&prepared.network)?;
    RunReportBuilder::new()
        .stage("regress")
        .network(&summary)
        .artifacts([table_path.clone()])
        .contents(json!({
            "terms": config.regression_terms,
            "complete_case": {
                "observations": complete.observations,
                "converged": complete.converged,
                "aic": complete.aic(),
            },
            "imputations": imputed.pooled.imputations,
            "seed": config.seed,
        }))
        .build()?
        .write(&study.out.join("report.json"))?;
    println!("\nCoefficient table written to {}", table_path.display());
    Ok(())
}

fn run_alaam_summary(
    draws: &Path,
    out: &Path,
    artifacts: Option<&Path>,
    format: ExportFormat,
    config: &PipelineConfig,
) -> Result<(), Box<dyn Error>> {
    let summaries = match artifacts {
        Some(dir) => {
            let input = AlaamArtifacts::load(dir, format)?.to_input(true, config.contagion)?;
            summarize_alaam(&DrawFileEstimator::new(draws), &input, config)?
        }
        None => read_draws(draws, &config.alaam)?.summarize(config.interval_level)?,
    };

    let rows = posterior_table("alaam", &summaries);
    print_coefficients(&rows);
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    rows.export_to_file(out, ExportFormat::Csv)?;
    println!("\nPosterior summary written to {}", out.display());
    Ok(())
}

fn print_coefficients(rows: &[CoefficientRow]) {
    println!(
        "\n{:<14} {:<20} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Model", "Term", "Estimate", "Std.Err", "Lower", "Upper", "p"
    );
    println!("{}", "-".repeat(90));
    for row in rows {
        let p = row
            .p_value
            .map_or_else(|| "-".to_string(), |p| format!("{p:.4}"));
        println!(
            "{:<14} {:<20} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10}",
            row.model, row.term, row.estimate, row.standard_error, row.lower, row.upper, p
        );
    }
}

fn list_covariates() {
    println!("\nNetwork covariates ({} total)", available_covariates().len());
    println!("{}", "-".repeat(80));
    for info in available_covariates() {
        println!(
            "{:>2}. {:<16} {:<12} {}",
            info.position + 1,
            info.name,
            info.category.to_string(),
            info.description
        );
    }
}

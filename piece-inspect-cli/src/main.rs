use clap::{Parser, Subcommand};
use piece_inspect::{
    BoxAreaCheck, Calibration, Comparator, CompareConfig, Decimal, InspectError, Sample, Template,
    TrainConfig, TrainingRun,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Piece inspection CLI (train templates, compare samples)")]
struct Cli {
    /// Optional JSON configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Log level for the inspection library (trace, debug, info, warn, error).
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a template from `<PREFIX>_01.json` .. `<PREFIX>_NN.json`.
    Train {
        /// Sample file prefix.
        #[arg(long, value_name = "PREFIX")]
        samples: String,
        /// Template file to write.
        #[arg(long, value_name = "FILE")]
        template: String,
    },
    /// Compare one sample against a template.
    Compare {
        /// Sample file to inspect.
        #[arg(long, value_name = "FILE")]
        sample: String,
        /// Template file; refined in place when the sample matches.
        #[arg(long, value_name = "FILE")]
        template: String,
        /// Report file, `<sample>_errors.json` by default.
        #[arg(long, value_name = "FILE")]
        report: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct TrainConfigJson {
    required_samples: usize,
    calibration: Option<Calibration>,
}

impl Default for TrainConfigJson {
    fn default() -> Self {
        let cfg = TrainConfig::default();
        Self {
            required_samples: cfg.required_samples,
            calibration: cfg.calibration,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CompareConfigJson {
    sigma_multiplier: Decimal,
    box_area_check: BoxAreaCheck,
    refine_on_match: bool,
}

impl Default for CompareConfigJson {
    fn default() -> Self {
        let cfg = CompareConfig::default();
        Self {
            sigma_multiplier: cfg.sigma_multiplier,
            box_area_check: cfg.box_area_check,
            refine_on_match: cfg.refine_on_match,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    train: TrainConfigJson,
    compare: CompareConfigJson,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}: file not found")]
    Missing(PathBuf),
    #[error("{path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot encode record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Inspect(#[from] InspectError),
    #[error("invalid log level {0:?}")]
    LogLevel(String),
    #[error("no command given (try --help)")]
    NoCommand,
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Missing(_) => 10,
            CliError::Read { .. } | CliError::Parse { .. } => 11,
            CliError::Inspect(InspectError::AreaCountMismatch { .. }) => 12,
            CliError::Inspect(InspectError::CalibrationMismatch { .. }) => 14,
            CliError::Write { .. } => 9,
            _ => 1,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompareSummary {
    is_match: bool,
    rotation: piece_inspect::Rotation,
    report: Option<PathBuf>,
    template: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let directive: Directive = format!("piece_inspect={}", cli.log)
        .parse()
        .map_err(|_| CliError::LogLevel(cli.log.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config: Config = match &cli.config {
        Some(path) => read_json(path)?,
        None => Config::default(),
    };

    match cli.command.ok_or(CliError::NoCommand)? {
        Command::Train { samples, template } => train(&config.train, &samples, &template),
        Command::Compare {
            sample,
            template,
            report,
        } => compare(&config.compare, &sample, &template, report.as_deref()),
    }
}

fn train(config: &TrainConfigJson, prefix: &str, template: &str) -> Result<(), CliError> {
    let prefix = strip_json(prefix);
    let train_config = TrainConfig {
        required_samples: config.required_samples,
        calibration: config.calibration,
    };
    let mut run = TrainingRun::new(train_config);
    for idx in 1..=config.required_samples {
        let path = PathBuf::from(format!("{prefix}_{idx:02}.json"));
        let sample: Sample = read_json(&path)?;
        run.push(&sample)?;
        info!(sample = %path.display(), "folded training sample");
    }
    let trained = run.finish()?;

    let out = json_path(template);
    write_json(&out, &trained)?;
    println!(
        "trained {} areas from {} samples into {}",
        trained.total_areas(),
        trained.sample_size(),
        out.display()
    );
    Ok(())
}

fn compare(
    config: &CompareConfigJson,
    sample: &str,
    template: &str,
    report: Option<&str>,
) -> Result<(), CliError> {
    let sample_path = json_path(sample);
    let template_path = json_path(template);
    let probe: Sample = read_json(&sample_path)?;
    let stored: Template = read_json(&template_path)?;

    let comparator = Comparator::new(CompareConfig {
        sigma_multiplier: config.sigma_multiplier,
        box_area_check: config.box_area_check,
        refine_on_match: config.refine_on_match,
    });
    let inspection = comparator.compare(&probe, stored);

    let summary = match &inspection.report {
        None => {
            write_json(&template_path, &inspection.template)?;
            CompareSummary {
                is_match: true,
                rotation: inspection.correspondence.rotation(),
                report: None,
                template: template_path,
            }
        }
        Some(found) => {
            let report_path = report
                .map(json_path)
                .unwrap_or_else(|| errors_path(sample));
            let counters_path = errors_path(template);
            warn!(
                findings = found.findings().len(),
                report = %report_path.display(),
                "sample does not match the template"
            );
            write_json(&report_path, found)?;
            write_json(&counters_path, &inspection.template)?;
            CompareSummary {
                is_match: false,
                rotation: inspection.correspondence.rotation(),
                report: Some(report_path),
                template: counters_path,
            }
        }
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn strip_json(path: &str) -> &str {
    path.strip_suffix(".json").unwrap_or(path)
}

fn json_path(path: &str) -> PathBuf {
    PathBuf::from(format!("{}.json", strip_json(path)))
}

fn errors_path(path: &str) -> PathBuf {
    PathBuf::from(format!("{}_errors.json", strip_json(path)))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => CliError::Missing(path.to_path_buf()),
        _ => CliError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{errors_path, json_path, Config};
    use piece_inspect::BoxAreaCheck;
    use std::path::PathBuf;

    #[test]
    fn json_suffix_is_optional() {
        assert_eq!(json_path("tpl"), PathBuf::from("tpl.json"));
        assert_eq!(json_path("tpl.json"), PathBuf::from("tpl.json"));
        assert_eq!(errors_path("run/s1.json"), PathBuf::from("run/s1_errors.json"));
    }

    #[test]
    fn example_config_parses() {
        let config: Config = serde_json::from_str(super::EXAMPLE_JSON).unwrap();
        assert_eq!(config.train.required_samples, 10);
        assert!(config.train.calibration.is_none());
        assert_eq!(config.compare.box_area_check, BoxAreaCheck::Legacy);
        assert!(config.compare.refine_on_match);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "compare": { "box_area_check": "band" } }"#).unwrap();
        assert_eq!(config.train.required_samples, 10);
        assert_eq!(config.compare.box_area_check, BoxAreaCheck::Band);
        assert_eq!(config.compare.sigma_multiplier, piece_inspect::Decimal::from(3));
    }
}

//! ats-scorer: rule-based ATS compatibility scoring for PDF resumes

use ats_scorer::cli::{self, Cli, Commands, ConfigAction};
use ats_scorer::config::Config;
use ats_scorer::error::{AtsScorerError, Result};
use ats_scorer::input::InputManager;
use ats_scorer::output::{report_destination, save_report_to_file, ReportGenerator, ScoreReport};
use ats_scorer::processing::Analyzer;
use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path) {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Score {
            resume,
            job,
            job_text,
            output,
            detailed,
            save,
        } => score(&config, resume, job, job_text, output, detailed, save),

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("Current Configuration ({})\n", config_path.display());
                println!("Max resume size: {} MB", config.input.max_file_size_mb);
                println!("Output format: {}", config.output.format);
                println!("Detailed output: {}", config.output.detailed);
                println!("Color output: {}", config.output.color_output);
                Ok(())
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
                Ok(())
            }

            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("Configuration reset to defaults");
                Ok(())
            }

            Some(ConfigAction::Set { key, value }) => {
                let mut config = config;
                config.set(&key, &value)?;
                config.save_to(config_path)?;
                println!("Set {} = {}", key, value);
                Ok(())
            }
        },
    }
}

fn score(
    config: &Config,
    resume: PathBuf,
    job: Option<PathBuf>,
    job_text: Option<String>,
    output: Option<String>,
    detailed: bool,
    save: Option<PathBuf>,
) -> Result<()> {
    cli::validate_file_extension(&resume, &cli::RESUME_EXTENSIONS)
        .map_err(|e| AtsScorerError::InvalidInput(format!("Resume file: {}", e)))?;
    if let Some(job_path) = &job {
        cli::validate_file_extension(job_path, &cli::JOB_DESCRIPTION_EXTENSIONS)
            .map_err(|e| AtsScorerError::InvalidInput(format!("Job description file: {}", e)))?;
    }

    let output_format = match output {
        Some(format) => cli::parse_output_format(&format).map_err(AtsScorerError::InvalidInput)?,
        None => config.output.format,
    };
    let detailed = detailed || config.output.detailed;

    let input_manager = InputManager::new(config.max_file_size_bytes());
    let document = input_manager.load_resume(&resume)?;
    let job_description = match (job, job_text) {
        (Some(path), _) => Some(input_manager.read_job_description(&path)?),
        (None, text) => text,
    };

    let analyzer = Analyzer::new()?;
    let analysis = analyzer.analyze_detailed(&document, job_description.as_deref())?;

    let job_description_provided = job_description.as_deref().is_some_and(|text| !text.trim().is_empty());
    let report = ScoreReport::from_analysis(
        analysis,
        &resume.to_string_lossy(),
        job_description_provided,
        detailed,
    );

    // Files never get ANSI escapes
    let use_colors = config.output.color_output && save.is_none();
    let generator = ReportGenerator::with_options(use_colors, detailed, true, true);
    let rendered = generator.generate_report(&report, &output_format)?;

    match save {
        Some(save) => {
            let path = report_destination(&save, &output_format, &resume.to_string_lossy());
            save_report_to_file(&rendered, &path)?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

//! mri-prep - Patch extraction and batching for 3D MRI segmentation.
//!
//! This binary wires the NIfTI loader and the NPY store into the
//! preprocessing pipeline.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mri_prep::{
    config::{Cli, Command, InspectConfig, LocateConfig, PrepareConfig},
    discover_cases, CaseReport, Mode, NiftiCaseLoader, NpyCaseStore, Preprocessor,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Prepare(config) => run_prepare(config),
        Command::Inspect(config) => run_inspect(config),
        Command::Locate(config) => run_locate(config),
    }
}

// =============================================================================
// Prepare Command
// =============================================================================

fn run_prepare(config: PrepareConfig) -> ExitCode {
    init_logging(config.verbose);

    let pipeline_config = match config.pipeline.to_pipeline_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cases = match config.cases {
        Some(cases) => cases,
        None => match discover_cases(&pipeline_config.data_path) {
            Ok(cases) => cases,
            Err(e) => {
                error!("Failed to list cases: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };
    if cases.is_empty() {
        warn!(
            "No cases found under {}",
            pipeline_config.data_path.display()
        );
    }

    let mode = Mode::from_training_flag(config.training);

    info!("Configuration:");
    info!("  Data path: {}", pipeline_config.data_path.display());
    info!("  Output: {}", config.output.display());
    info!("  Mode: {:?}", mode);
    info!("  Patch size: {:?}", pipeline_config.patch_size);
    info!("  Overlap: {:?}", pipeline_config.overlap);
    info!("  Batch size: {}", pipeline_config.batch_size);
    info!("  Cases: {}", cases.len());

    let loader = NiftiCaseLoader::new(&pipeline_config.data_path);
    let store = NpyCaseStore::new(&config.output);
    let preprocessor = match Preprocessor::new(pipeline_config, loader, store) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let index = match preprocessor.preprocess_cases(&cases, mode) {
        Ok(index) => index,
        Err(e) => {
            error!("Preprocessing failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match preprocessor.store().save_index(&index) {
        Ok(path) => info!("Case index written to {}", path.display()),
        Err(e) => {
            error!("Failed to write case index: {}", e);
            return ExitCode::FAILURE;
        }
    }

    for summary in index.batch_counts() {
        info!("  {}: {} batch(es)", summary.case_id, summary.steps);
    }
    info!("Total: {} batch(es) from {} case(s)", index.len(), cases.len());

    ExitCode::SUCCESS
}

// =============================================================================
// Inspect Command
// =============================================================================

fn run_inspect(config: InspectConfig) -> ExitCode {
    init_logging(config.verbose);

    let pipeline_config = match config.pipeline.to_pipeline_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mode = Mode::from_training_flag(config.training);
    let loader = NiftiCaseLoader::new(&pipeline_config.data_path);
    let preprocessor = match Preprocessor::new(pipeline_config, loader, ()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let case = match preprocessor.prepare_case(&config.case_id, mode) {
        Ok(case) => case,
        Err(e) => {
            eprintln!("Failed to process {}: {}", config.case_id, e);
            return ExitCode::FAILURE;
        }
    };
    let report = CaseReport::new(&config.case_id, mode, &case);

    if config.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("Case: {}", report.case_id);
    println!("═════════════════════════════════");
    println!("Mode:            {:?}", report.mode);
    println!("Volume shape:    {:?}", report.volume_shape);
    println!("Patch grid:      {:?}", report.grid_counts);
    println!("Sliced patches:  {}", report.sliced_patches);
    println!("Kept patches:    {}", report.patch_count);
    println!("Batches:         {}", report.steps);
    if let Some(shape) = &report.volume_batch_shape {
        println!("Volume batch:    {:?}", shape);
    }
    if let Some(shape) = &report.label_batch_shape {
        println!("Label batch:     {:?}", shape);
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Locate Command
// =============================================================================

fn run_locate(config: LocateConfig) -> ExitCode {
    let store = NpyCaseStore::new(&config.output);
    let index = match store.load_index() {
        Ok(index) => index,
        Err(e) => {
            eprintln!("Failed to load case index: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(location) = index.locate(config.batch) else {
        eprintln!(
            "Batch {} is out of range (index holds {} batches)",
            config.batch,
            index.len()
        );
        return ExitCode::FAILURE;
    };

    println!("Batch:  {}", config.batch);
    println!("Case:   {}", location.case_id);
    println!("Local:  {}", location.local);
    println!(
        "Volume: {}",
        store
            .volume_batch_path(location.case_id, location.local)
            .display()
    );
    let label_path = store.label_batch_path(location.case_id, location.local);
    if label_path.is_file() {
        println!("Labels: {}", label_path.display());
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Logging
// =============================================================================

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "mri_prep=debug"
    } else {
        "mri_prep=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

mod commands;
mod config;
mod entities;
mod manifest;
mod report;

use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tpm_boot_verifier::{BootVerifier, EventLog, EventLogError};

use crate::commands::Command;
use crate::config::VerifierConfig;
use crate::entities::{LogEncoding, OutputFormat};

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[clap(author, version, about = "Decode TCG event logs and verify them against a reference manifest", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Decode(#[from] EventLogError),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) | CliError::Decode(EventLogError::InputError(_)) => EXIT_USAGE,
            CliError::Decode(_) => EXIT_FAILURE,
        }
    }
}

fn init_logging(config: &VerifierConfig) -> Result<(), CliError> {
    let log_config = config.logging.clone().unwrap_or_else(|| common_log::LogConfig {
        level: "warn".to_string(),
        ..common_log::LogConfig::default()
    });
    common_log::init_with_config(log_config).map_err(|e| CliError::Usage(e.to_string()))
}

fn read_log(path: &Path, encoding: LogEncoding) -> Result<EventLog, CliError> {
    let data = std::fs::read(path)
        .map_err(|e| CliError::Usage(format!("Failed to read event log {}: {}", path.display(), e)))?;
    let log = match encoding {
        LogEncoding::Binary => EventLog::parse(&data)?,
        LogEncoding::Base64 => {
            let text = String::from_utf8(data)
                .map_err(|e| CliError::Usage(format!("Event log {} is not text: {}", path.display(), e)))?;
            EventLog::from_base64(&text)?
        }
    };
    info!("Decoded {} entries from {}", log.len(), path.display());
    Ok(log)
}

fn run_parse(log_path: &Path, encoding: LogEncoding) -> Result<u8, CliError> {
    let log = read_log(log_path, encoding)?;
    let value = log.to_json_value()?;
    let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::Usage(e.to_string()))?;
    println!("{}", text);
    Ok(EXIT_SUCCESS)
}

fn run_verify(
    config: &VerifierConfig,
    log_path: &Path,
    rim_path: &Path,
    encoding: LogEncoding,
    format: OutputFormat,
    workers: Option<usize>,
    check_event_digests: bool,
) -> Result<u8, CliError> {
    let manifest = manifest::load_manifest(rim_path).map_err(|e| CliError::Usage(e.to_string()))?;
    let log = read_log(log_path, encoding)?;

    let options = config.verification.to_options(workers, check_event_digests);
    let report = BootVerifier::new(&manifest).with_options(options).verify(&log)?;

    match format {
        OutputFormat::Text => print!("{}", report::render_text(&report, &log)),
        OutputFormat::Json => {
            let value = report::render_json(&report).map_err(|e| CliError::Usage(e.to_string()))?;
            let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::Usage(e.to_string()))?;
            println!("{}", text);
        }
    }

    if report.status().is_success() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILURE)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };
    if let Err(e) = init_logging(config) {
        eprintln!("error: {}", e);
        return ExitCode::from(EXIT_USAGE);
    }

    let result = match &cli.command {
        Command::Parse { log, encoding } => run_parse(log, *encoding),
        Command::Verify { log, rim, encoding, format, workers, check_event_digests } => {
            run_verify(config, log, rim, *encoding, *format, *workers, *check_event_digests)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

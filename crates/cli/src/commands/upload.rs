//! upload - Upload files and register them as custom emoji
//!
//! Resolves credentials and input files, prepares the Drive folder, then runs
//! the batch. Setup failures abort before any file is touched; per-file
//! failures are reported and the batch carries on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use mku_core::{
    ApiFailure, BatchOptions, BatchReport, BatchUploader, CollectOptions, Credentials,
    EmojiApi as _, EmojiOptions, FileOutcome, Outcome, SkipReason, Stage, collect_files,
    ensure_folder_path,
};
use mku_misskey::MisskeyClient;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload arguments
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local emoji file, or a directory of them (not recursive)
    #[arg(required_unless_present = "completions")]
    pub path: Option<PathBuf>,

    /// Misskey instance URL
    #[arg(long, env = "MISSKEY_URL", value_name = "URL")]
    pub url: Option<String>,

    /// API token
    #[arg(long, env = "MISSKEY_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Drive folder path for the uploads, e.g. "emojis/blobs" ("" for the root)
    #[arg(short = 'd', long, default_value = "emojis")]
    pub drive_path: String,

    /// Category of the emojis
    #[arg(short, long)]
    pub category: Option<String>,

    /// License of the emojis
    #[arg(short = 'L', long)]
    pub license: Option<String>,

    /// Mark the emojis as sensitive
    #[arg(short, long)]
    pub sensitive: bool,

    /// Make the emojis local only
    #[arg(short, long, alias = "local_only")]
    pub local_only: bool,

    /// Reverse the upload order
    #[arg(short = 'R', long)]
    pub reverse: bool,

    /// Only upload files whose name matches this glob, e.g. "*.png"
    #[arg(long, value_name = "GLOB")]
    pub include: Option<String>,

    /// Skip files whose emoji name already exists on the instance
    #[arg(long)]
    pub skip_existing: bool,

    /// Show the emoji names that would be registered without uploading
    #[arg(long)]
    pub dry_run: bool,

    /// Request timeout in seconds
    #[arg(
        long,
        default_value = "10",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    status: &'static str,
    total: usize,
    registered: usize,
    skipped: usize,
    failed: usize,
    files: Vec<FileReport>,
}

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    emoji_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_human: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_error: Option<ApiFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    orphaned_file_id: Option<String>,
}

impl FileReport {
    fn new(outcome: &FileOutcome) -> Self {
        let mut report = Self {
            file: outcome.path.display().to_string(),
            name: outcome.name.as_ref().map(|n| n.to_string()),
            status: "",
            emoji_id: None,
            file_id: None,
            size_bytes: None,
            size_human: None,
            reason: None,
            stage: None,
            error: None,
            api_error: None,
            orphaned_file_id: None,
        };

        match &outcome.outcome {
            Outcome::Registered {
                file_id,
                emoji_id,
                size_bytes,
            } => {
                report.status = "registered";
                report.emoji_id = Some(emoji_id.clone());
                report.file_id = Some(file_id.clone());
                report.size_bytes = Some(*size_bytes);
                report.size_human = Some(humansize::format_size(*size_bytes, humansize::BINARY));
            }
            Outcome::Skipped(reason) => {
                report.status = "skipped";
                report.reason = Some(*reason);
            }
            Outcome::Failed(step) => {
                report.status = "failed";
                report.stage = Some(step.stage);
                report.error = Some(step.error.to_string());
                report.api_error = step.error.api_failure().cloned();
                report.orphaned_file_id = step.orphaned_file_id.clone();
            }
        }
        report
    }
}

/// Execute the upload
pub async fn execute(args: UploadArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let credentials = match Credentials::new(args.url.as_deref(), args.token.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let Some(path) = args.path.as_deref() else {
        formatter.error("No input path given");
        return ExitCode::UsageError;
    };

    let collect_options = CollectOptions {
        include: args.include.clone(),
        reverse: args.reverse,
    };
    let files = match collect_files(path, &collect_options) {
        Ok(f) => f,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let client = match MisskeyClient::new(credentials, Duration::from_secs(args.timeout)) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create client: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let options = if args.dry_run {
        BatchOptions {
            emoji: emoji_options(&args),
            dry_run: true,
            ..Default::default()
        }
    } else {
        match prepare(&client, &args, &output_config).await {
            Ok(options) => options,
            Err(code) => return code,
        }
    };

    let progress = ProgressBar::new(&output_config, files.len() as u64);
    let uploader = BatchUploader::new(&client, options);
    let report = uploader
        .run(&files, |outcome| {
            progress.suspend(|| print_outcome(&formatter, outcome));
            progress.set_message(&display_name(&outcome.path));
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    print_summary(&formatter, &report, args.dry_run);

    if report.is_success() {
        ExitCode::Success
    } else {
        ExitCode::GeneralError
    }
}

fn emoji_options(args: &UploadArgs) -> EmojiOptions {
    EmojiOptions {
        category: args.category.clone().filter(|c| !c.is_empty()),
        license: args.license.clone().filter(|l| !l.is_empty()),
        is_sensitive: args.sensitive,
        local_only: args.local_only,
    }
}

/// Remote setup before the batch: existing emoji list and Drive folder
async fn prepare(
    client: &MisskeyClient,
    args: &UploadArgs,
    output_config: &OutputConfig,
) -> Result<BatchOptions, ExitCode> {
    let formatter = Formatter::new(output_config.clone());

    let existing = if args.skip_existing {
        let spinner = ProgressBar::spinner(output_config, "Fetching current emoji list...");
        let result = client.list_emojis().await;
        spinner.finish_and_clear();
        match result {
            Ok(emojis) => {
                tracing::debug!(count = emojis.len(), "fetched existing emoji");
                emojis.into_iter().map(|e| e.name).collect()
            }
            Err(e) => {
                formatter.error(&format!("Failed to fetch emoji list: {e}"));
                return Err(ExitCode::from_error(&e));
            }
        }
    } else {
        HashSet::new()
    };

    let spinner = ProgressBar::spinner(output_config, "Preparing drive folder...");
    let folder = ensure_folder_path(client, &args.drive_path).await;
    spinner.finish_and_clear();
    let folder_id = match folder {
        Ok(folder) => {
            tracing::debug!(folder = ?folder, "drive folder ready");
            folder.map(|f| f.id)
        }
        Err(e) => {
            formatter.error(&format!(
                "Failed to prepare drive folder '{}': {e}",
                args.drive_path
            ));
            return Err(ExitCode::from_error(&e));
        }
    };

    Ok(BatchOptions {
        emoji: emoji_options(args),
        folder_id,
        existing,
        dry_run: false,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_outcome(formatter: &Formatter, outcome: &FileOutcome) {
    let file = display_name(&outcome.path);
    let name = outcome
        .name
        .as_ref()
        .map(|n| n.to_string())
        .unwrap_or_default();

    match &outcome.outcome {
        Outcome::Registered {
            emoji_id,
            size_bytes,
            ..
        } => formatter.success(&format!(
            ":{name}: <- {file} ({}, id {emoji_id})",
            humansize::format_size(*size_bytes, humansize::BINARY)
        )),
        Outcome::Skipped(SkipReason::AlreadyExists) => {
            formatter.warning(&format!(":{name}: already exists, skipped {file}"))
        }
        Outcome::Skipped(SkipReason::DryRun) => {
            formatter.println(&format!("Would register :{name}: <- {file}"))
        }
        Outcome::Failed(step) => {
            formatter.error(&format!("{file}: {step}"));
            if let Some(id) = &step.orphaned_file_id {
                formatter.warning(&format!(
                    "Drive file {id} was uploaded for {file} but not registered"
                ));
            }
        }
    }
}

fn print_summary(formatter: &Formatter, report: &BatchReport, dry_run: bool) {
    if formatter.is_json() {
        let output = UploadOutput {
            status: if report.is_success() { "success" } else { "partial" },
            total: report.total(),
            registered: report.registered(),
            skipped: report.skipped(),
            failed: report.failed(),
            files: report.outcomes.iter().map(FileReport::new).collect(),
        };
        formatter.json(&output);
        return;
    }

    if dry_run {
        formatter.println(&format!("Dry run: {} file(s) checked.", report.total()));
    } else if report.is_success() {
        formatter.success(&format!(
            "Finished uploading emojis. {} out of {} emojis uploaded.",
            report.registered(),
            report.total()
        ));
    } else {
        formatter.warning(&format!(
            "Completed with errors: {} registered, {} failed, {} total",
            report.registered(),
            report.failed(),
            report.total()
        ));
    }

    let existing = report
        .outcomes
        .iter()
        .filter(|o| matches!(o.outcome, Outcome::Skipped(SkipReason::AlreadyExists)))
        .count();
    if existing > 0 {
        formatter.println(&format!("Skipped {existing} emoji(s) that already exist."));
    }
}

//! Upload and registration workflow
//!
//! Each file goes through `Uploading -> Registering -> Done`. A failure at any
//! step ends that file with a [`Outcome::Failed`] and the batch moves on to the
//! next file. Nothing is retried and nothing is rolled back: when registration
//! fails after a successful upload, the Drive file stays where it is and its id
//! is reported as orphaned.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::name::EmojiName;
use crate::traits::{DriveFile, DriveUpload, EmojiAddRequest, EmojiApi, RegisteredEmoji};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Attributes applied to every registered emoji
#[derive(Debug, Clone, Default)]
pub struct EmojiOptions {
    pub category: Option<String>,
    pub license: Option<String>,
    pub is_sensitive: bool,
    pub local_only: bool,
}

/// Step of the per-file workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Naming,
    Reading,
    Uploading,
    Registering,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Naming => "naming",
            Stage::Reading => "reading",
            Stage::Uploading => "uploading",
            Stage::Registering => "registering",
        })
    }
}

/// A workflow failure together with the step it happened in
#[derive(Debug)]
pub struct StepError {
    pub stage: Stage,
    pub error: Error,
    /// Drive file left behind by a failed registration
    pub orphaned_file_id: Option<String>,
}

impl StepError {
    fn at(stage: Stage, error: Error) -> Self {
        Self {
            stage,
            error,
            orphaned_file_id: None,
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Result of a successful upload and registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub file: DriveFile,
    pub emoji: RegisteredEmoji,
}

/// Read a local file into a Drive upload
pub fn prepare_upload(path: &Path, folder_id: Option<&str>) -> Result<DriveUpload> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    Ok(DriveUpload {
        file_name,
        content_type,
        bytes,
        folder_id: folder_id.map(str::to_string),
    })
}

/// Upload `path` to the Drive, then register it as emoji `name`
pub async fn upload_and_register<A>(
    api: &A,
    path: &Path,
    name: &EmojiName,
    options: &EmojiOptions,
    folder_id: Option<&str>,
) -> std::result::Result<Registration, StepError>
where
    A: EmojiApi + ?Sized,
{
    let upload = prepare_upload(path, folder_id).map_err(|e| StepError::at(Stage::Reading, e))?;

    tracing::debug!(
        file = %upload.file_name,
        content_type = %upload.content_type,
        folder = ?upload.folder_id,
        "uploading to drive"
    );
    let file = api
        .drive_upload(upload)
        .await
        .map_err(|e| StepError::at(Stage::Uploading, e))?;
    tracing::info!(emoji = %name, file_id = %file.id, "uploaded to drive");

    let request = EmojiAddRequest {
        name: name.to_string(),
        file_id: file.id.clone(),
        category: options.category.clone(),
        license: options.license.clone(),
        is_sensitive: options.is_sensitive,
        local_only: options.local_only,
        aliases: Vec::new(),
    };
    let emoji = match api.emoji_add(request).await {
        Ok(emoji) => emoji,
        Err(error) => {
            tracing::debug!(
                emoji = %name,
                file_id = %file.id,
                "registration failed, drive file left in place"
            );
            return Err(StepError {
                stage: Stage::Registering,
                error,
                orphaned_file_id: Some(file.id),
            });
        }
    };
    tracing::info!(emoji = %name, id = %emoji.id, "emoji registered");

    Ok(Registration { file, emoji })
}

/// Why a file was not uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// An emoji with the same name is already on the server
    AlreadyExists,
    DryRun,
}

/// What happened to one file
#[derive(Debug)]
pub enum Outcome {
    Registered {
        file_id: String,
        emoji_id: String,
        size_bytes: u64,
    },
    Skipped(SkipReason),
    Failed(StepError),
}

/// Outcome for one input file
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// `None` when the name could not be derived
    pub name: Option<EmojiName>,
    pub outcome: Outcome,
}

impl FileOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

/// Per-file outcomes of a batch, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn registered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Registered { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Skipped(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// True when no file failed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Batch-wide settings
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub emoji: EmojiOptions,

    /// Drive folder receiving the uploads, root when `None`
    pub folder_id: Option<String>,

    /// Emoji names already on the server; matching files are skipped
    pub existing: HashSet<String>,

    /// Derive names only, make no remote calls
    pub dry_run: bool,
}

/// Sequential uploader for a list of files
pub struct BatchUploader<'a, A: ?Sized> {
    api: &'a A,
    options: BatchOptions,
}

impl<'a, A> BatchUploader<'a, A>
where
    A: EmojiApi + ?Sized,
{
    pub fn new(api: &'a A, options: BatchOptions) -> Self {
        Self { api, options }
    }

    /// Process every file in order, calling `on_outcome` after each one
    pub async fn run<F>(&self, files: &[PathBuf], mut on_outcome: F) -> BatchReport
    where
        F: FnMut(&FileOutcome),
    {
        let mut report = BatchReport::default();
        for path in files {
            let outcome = self.process(path).await;
            on_outcome(&outcome);
            report.outcomes.push(outcome);
        }

        tracing::info!(
            total = report.total(),
            registered = report.registered(),
            skipped = report.skipped(),
            failed = report.failed(),
            "batch finished"
        );
        report
    }

    async fn process(&self, path: &Path) -> FileOutcome {
        let name = match EmojiName::from_path(path) {
            Ok(name) => name,
            Err(e) => {
                return FileOutcome {
                    path: path.to_path_buf(),
                    name: None,
                    outcome: Outcome::Failed(StepError::at(Stage::Naming, e)),
                };
            }
        };

        let outcome = if self.options.existing.contains(name.as_str()) {
            tracing::debug!(emoji = %name, "emoji already exists, skipping");
            Outcome::Skipped(SkipReason::AlreadyExists)
        } else if self.options.dry_run {
            Outcome::Skipped(SkipReason::DryRun)
        } else {
            match upload_and_register(
                self.api,
                path,
                &name,
                &self.options.emoji,
                self.options.folder_id.as_deref(),
            )
            .await
            {
                Ok(registration) => Outcome::Registered {
                    size_bytes: registration.file.size,
                    file_id: registration.file.id,
                    emoji_id: registration.emoji.id,
                },
                Err(e) => Outcome::Failed(e),
            }
        };

        FileOutcome {
            path: path.to_path_buf(),
            name: Some(name),
            outcome,
        }
    }
}

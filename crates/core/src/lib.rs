//! mku-core: Core library for the mku Misskey emoji uploader
//!
//! This crate provides the core functionality for the mku CLI, including:
//! - Emoji name normalization
//! - Credentials loading
//! - Input file collection
//! - The EmojiApi trait for remote operations
//! - Drive folder resolution and the batch upload workflow
//!
//! This crate does not perform HTTP itself, so the workflow can be tested
//! against a mock and the transport can be swapped out.

pub mod batch;
pub mod config;
pub mod drive;
pub mod error;
pub mod files;
pub mod name;
pub mod traits;

pub use batch::{
    BatchOptions, BatchReport, BatchUploader, EmojiOptions, FileOutcome, Outcome, Registration,
    SkipReason, Stage, StepError, upload_and_register,
};
pub use config::Credentials;
pub use drive::{ensure_folder_path, find_folder};
pub use error::{ApiFailure, Error, Result};
pub use files::{CollectOptions, collect_files};
pub use name::{EmojiName, normalize};
pub use traits::{
    CreateFolder, DriveFile, DriveFolder, DriveUpload, EmojiAddRequest, EmojiApi, EmojiSummary,
    FOLDER_PAGE_LIMIT, FolderListOptions, RegisteredEmoji,
};

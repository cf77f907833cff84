//! mku-misskey: Misskey HTTP adapter for the mku emoji uploader
//!
//! This crate provides the implementation of the EmojiApi trait on top of
//! reqwest. It is the only crate that performs HTTP.

pub mod client;

pub use client::{DEFAULT_TIMEOUT, MisskeyClient};

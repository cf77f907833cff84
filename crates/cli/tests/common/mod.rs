//! Shared test utilities.

#[path = "../../../misskey/tests/common/mock_misskey.rs"]
pub mod mock_misskey;

//! Drive folder resolution
//!
//! Uploaded emoji files land in a Drive folder given as a slash separated
//! path such as `emojis/blobs`. Missing folders along the path are created.

use crate::error::Result;
use crate::traits::{CreateFolder, DriveFolder, EmojiApi, FOLDER_PAGE_LIMIT, FolderListOptions};

/// Find the folder called `name` directly under `parent_id`
///
/// Pages through the listing until the folder turns up or a short page
/// marks the end.
pub async fn find_folder<A>(
    api: &A,
    name: &str,
    parent_id: Option<&str>,
) -> Result<Option<DriveFolder>>
where
    A: EmojiApi + ?Sized,
{
    let mut until_id: Option<String> = None;

    loop {
        let options = FolderListOptions {
            parent_id: parent_id.map(str::to_string),
            until_id: until_id.clone(),
        };
        let page = api.list_folders(options).await?;
        let full = page.len() >= FOLDER_PAGE_LIMIT;
        let last_id = page.last().map(|f| f.id.clone());

        if let Some(folder) = page.into_iter().find(|f| f.name == name) {
            return Ok(Some(folder));
        }

        match last_id {
            Some(id) if full => until_id = Some(id),
            _ => return Ok(None),
        }
    }
}

/// Find or create every folder along `path`, returning the innermost one
///
/// An empty path resolves to `None`, the Drive root.
pub async fn ensure_folder_path<A>(api: &A, path: &str) -> Result<Option<DriveFolder>>
where
    A: EmojiApi + ?Sized,
{
    let mut current: Option<DriveFolder> = None;

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let parent_id = current.as_ref().map(|f| f.id.clone());

        let folder = match find_folder(api, segment, parent_id.as_deref()).await? {
            Some(folder) => {
                tracing::debug!(name = segment, id = %folder.id, "reusing drive folder");
                folder
            }
            None => {
                tracing::info!(name = segment, parent = ?parent_id, "creating drive folder");
                api.create_folder(CreateFolder {
                    name: segment.to_string(),
                    parent_id,
                })
                .await?
            }
        };
        current = Some(folder);
    }

    Ok(current)
}

//! `anon select ...`: the file selection in the current folder.

use std::path::PathBuf;

use glob::Pattern as GlobPattern;
use walkdir::WalkDir;

use crate::commands::{Confirm, Context};
use crate::error::{AppError, Result};
use crate::models::FileSelection;
use crate::storage::SELECTION_FILE_NAME;

/// Compile a file name pattern such as `*.dcm` or `img[12].dcm`.
pub fn file_pattern(pattern: &str) -> Result<GlobPattern> {
    GlobPattern::new(pattern)
        .map_err(|e| AppError::validation(format!("Invalid pattern '{pattern}': {e}")))
}

/// Files below the current folder whose name matches `pattern`.
pub fn find_files(ctx: &Context, pattern: &str, recurse: bool) -> Result<Vec<PathBuf>> {
    let matcher = file_pattern(pattern)?;
    let walker = WalkDir::new(&ctx.current_dir)
        .max_depth(if recurse { usize::MAX } else { 1 })
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| AppError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name == SELECTION_FILE_NAME {
            continue;
        }
        if matcher.matches(&name) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Add matching files to the selection, starting one if needed.
pub async fn add(ctx: &Context, pattern: &str, recurse: bool) -> Result<String> {
    let folder = ctx.selection_folder();
    let mut selection = if folder.has_selection().await {
        folder.load().await?
    } else {
        FileSelection::new(
            format!("Files matching '{pattern}'"),
            &ctx.current_dir,
            Vec::new(),
        )?
    };

    let before = selection.len();
    for path in find_files(ctx, pattern, recurse)? {
        selection.add_path(&ctx.current_dir, &path)?;
    }
    folder.save(&selection).await?;
    Ok(format!(
        "Added {} files matching '{pattern}' to selection. Selection has {} files",
        selection.len() - before,
        selection.len()
    ))
}

pub async fn status(ctx: &Context) -> Result<String> {
    let selection = ctx.selection_folder().load().await?;
    Ok(selection.describe())
}

pub async fn delete(ctx: &Context, confirm: &dyn Confirm) -> Result<String> {
    let folder = ctx.selection_folder();
    if !folder.has_selection().await {
        return Err(AppError::NoSelection(folder.folder().to_path_buf()));
    }
    if !confirm.confirm(&format!("Delete {}?", folder.selection_path().display()))? {
        return Ok("Deleted nothing".to_string());
    }
    folder.delete().await?;
    Ok(format!("Removed {}", folder.selection_path().display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{AssumeYes, testing};

    fn touch(ctx: &Context, relative: &str) {
        let path = ctx.current_dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_file_pattern() {
        let pattern = file_pattern("*.dcm").unwrap();
        assert!(pattern.matches("1.dcm"));
        assert!(!pattern.matches("1.dcm.bak"));
        assert!(!pattern.matches("1xdcm"));

        let pattern = file_pattern("img?.*").unwrap();
        assert!(pattern.matches("img1.png"));
        assert!(!pattern.matches("img12.png"));

        let pattern = file_pattern("img[12].dcm").unwrap();
        assert!(pattern.matches("img1.dcm"));
        assert!(pattern.matches("img2.dcm"));
        assert!(!pattern.matches("img3.dcm"));

        assert!(file_pattern("img[.dcm").is_err());
    }

    #[tokio::test]
    async fn test_add_with_character_class() {
        let (_dir, ctx) = testing::context();
        touch(&ctx, "img1.dcm");
        touch(&ctx, "img2.dcm");
        touch(&ctx, "sub/img3.dcm");

        let text = add(&ctx, "img[13].dcm", true).await.unwrap();
        assert!(text.contains("Added 2 files"));
        let selection = ctx.selection_folder().load().await.unwrap();
        assert_eq!(
            selection.selected_paths,
            vec![PathBuf::from("img1.dcm"), PathBuf::from("sub").join("img3.dcm")]
        );
    }

    #[tokio::test]
    async fn test_add_recursive_and_flat() {
        let (_dir, ctx) = testing::context();
        touch(&ctx, "1.dcm");
        touch(&ctx, "sub/2.dcm");
        touch(&ctx, "sub/notes.txt");
        touch(&ctx, ".anonapi/hidden.dcm");

        let flat = add(&ctx, "*.dcm", false).await.unwrap();
        assert!(flat.contains("Added 1 files"));

        let deep = add(&ctx, "*.dcm", true).await.unwrap();
        assert!(deep.contains("Added 1 files"));
        assert!(deep.contains("Selection has 2 files"));

        let selection = ctx.selection_folder().load().await.unwrap();
        assert_eq!(
            selection.selected_paths,
            vec![PathBuf::from("1.dcm"), PathBuf::from("sub").join("2.dcm")]
        );
        assert!(status(&ctx).await.unwrap().contains("2 files"));

        delete(&ctx, &AssumeYes).await.unwrap();
        assert!(matches!(status(&ctx).await, Err(AppError::NoSelection(_))));
    }
}

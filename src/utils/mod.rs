pub mod db_inspector;

use std::fs;
use std::path::Path;
use anyhow::{Result, Context};

/// Ensures that the directory for the given file path exists
///
/// Creates every missing parent directory of `file_path`.
pub fn ensure_directory_exists(file_path: impl AsRef<Path>) -> Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(||
                format!("Failed to create directory: {}", parent.display())
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_directory_exists() {
        let root = std::env::temp_dir().join(format!("roster-utils-{}", std::process::id()));
        let file = root.join("nested").join("roster.db");

        ensure_directory_exists(&file).unwrap();
        assert!(root.join("nested").is_dir());

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_bare_file_name_needs_no_directory() {
        ensure_directory_exists("roster.db").unwrap();
    }
}

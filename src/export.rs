//! Export the current document to a Markdown file.
//!
//! Writes to the given path (creating parent directories), or to stdout
//! when the path is `-`.

use anyhow::{Context, Result};
use std::path::Path;

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    File(std::path::PathBuf),
    Stdout,
}

pub fn export_document(document: &str, output: &Path) -> Result<ExportTarget> {
    if output.as_os_str() == "-" {
        println!("{}", document);
        return Ok(ExportTarget::Stdout);
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let mut contents = document.to_string();
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    std::fs::write(output, contents)
        .with_context(|| format!("Failed to write export: {}", output.display()))?;
    Ok(ExportTarget::File(output.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("kb.md");
        let target = export_document("# KB", &path).unwrap();
        assert_eq!(target, ExportTarget::File(path.clone()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# KB\n");
    }

    #[test]
    fn test_export_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kb.md");
        export_document("# Old", &path).unwrap();
        export_document("# New\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# New\n");
    }
}

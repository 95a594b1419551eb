//! File pattern resolution using glob

use crate::error::CliError;
use anyhow::{Context, Result};
use glob::glob;
use std::path::PathBuf;

/// Resolve file patterns to actual file paths
///
/// Files keep the order of the patterns that found them; within one
/// pattern they are sorted, and a file matched twice is read once.
pub fn resolve_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let paths = glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;

        let mut matched = Vec::new();
        for path_result in paths {
            let path = path_result.with_context(|| format!("Error resolving pattern: {pattern}"))?;
            if path.is_file() {
                matched.push(path);
            }
        }
        matched.sort();
        for path in matched {
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        return Err(CliError::NoInputFiles(patterns.join(" ")).into());
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_in_pattern_order() {
        let dir = TempDir::new().unwrap();
        for name in ["b.txt", "a.txt", "z.tok"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        let patterns = vec![
            dir.path().join("z.tok").display().to_string(),
            dir.path().join("*.txt").display().to_string(),
            dir.path().join("a.txt").display().to_string(),
        ];
        let files = resolve_patterns(&patterns).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["z.tok", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_no_match() {
        let dir = TempDir::new().unwrap();
        let pattern = dir.path().join("*.missing").display().to_string();
        let err = resolve_patterns(&[pattern]).unwrap_err();
        assert!(err.downcast_ref::<CliError>().is_some());
    }
}

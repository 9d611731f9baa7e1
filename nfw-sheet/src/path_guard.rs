use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Refuse an output location that is, or sits inside, one of the inputs.
pub fn ensure_output_not_same(output: &Path, inputs: &[&Path]) -> Result<()> {
    let out_norm = normalize_for_compare(output)
        .with_context(|| format!("failed to normalize output path {}", output.display()))?;

    for input in inputs {
        let in_norm = normalize_for_compare(input)
            .with_context(|| format!("failed to normalize input path {}", input.display()))?;
        if out_norm == in_norm {
            bail!(
                "refusing to overwrite input: output {} matches input {}",
                output.display(),
                input.display()
            );
        }
        if in_norm.is_dir() && out_norm.starts_with(&in_norm) {
            bail!(
                "refusing to write inside input directory: output {} is under {}",
                output.display(),
                input.display()
            );
        }
    }
    Ok(())
}

fn normalize_for_compare(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("canonicalize {}", path.display()));
    }

    // Outputs usually do not exist yet; resolve the nearest existing parent.
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        if !parent.as_os_str().is_empty() && parent.exists() {
            let parent = parent
                .canonicalize()
                .with_context(|| format!("canonicalize {}", parent.display()))?;
            return Ok(parent.join(name));
        }
    }

    let base = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().context("current_dir")?
    };
    Ok(base.join(path))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::ensure_output_not_same;

    #[test]
    fn rejects_output_equal_to_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("book");
        fs::create_dir_all(&input).expect("mkdir");

        let err = ensure_output_not_same(&input, &[&input]).expect_err("same path");
        assert!(err.to_string().contains("refusing to overwrite input"));
    }

    #[test]
    fn rejects_output_nested_in_input_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("snapshot");
        fs::create_dir_all(&input).expect("mkdir");

        let err = ensure_output_not_same(&input.join("out"), &[&input]).expect_err("nested");
        assert!(err.to_string().contains("inside input directory"));
    }

    #[test]
    fn accepts_sibling_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("book");
        fs::create_dir_all(&input).expect("mkdir");

        ensure_output_not_same(&dir.path().join("artifacts"), &[&input]).expect("sibling is fine");
    }
}

//! Submission-ready JSON documents, one file per category.
//!
//! Every document is rendered before the first file is written, so a
//! serialization failure leaves the output directory untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::ArtifactNames;
use crate::error::ConvertError;
use crate::model::{Category, PolicyBundle};

/// One rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub category: Category,
    pub file_name: String,
    pub count: usize,
    pub body: String,
}

/// Render all seven documents in category order.
pub fn render_artifacts(
    bundle: &PolicyBundle,
    names: &ArtifactNames,
) -> Result<Vec<Artifact>, ConvertError> {
    Category::ALL
        .into_iter()
        .map(|category| {
            let file_name = artifact_name(names, category).to_string();
            let body = match category {
                Category::SecurityRule => to_json(&bundle.rules, &file_name),
                Category::AddressList => to_json(&bundle.address_lists, &file_name),
                Category::UrlList => to_json(&bundle.url_lists, &file_name),
                Category::Service => to_json(&bundle.services, &file_name),
                Category::ServiceGroup => to_json(&bundle.service_groups, &file_name),
                Category::Application => to_json(&bundle.applications, &file_name),
                Category::ApplicationGroup => to_json(&bundle.application_groups, &file_name),
            }?;
            Ok(Artifact {
                category,
                file_name,
                count: bundle.count(category),
                body,
            })
        })
        .collect()
}

/// File name configured for `category`.
pub fn artifact_name(names: &ArtifactNames, category: Category) -> &str {
    match category {
        Category::SecurityRule => &names.rules,
        Category::AddressList => &names.address_lists,
        Category::UrlList => &names.url_lists,
        Category::Service => &names.services,
        Category::ServiceGroup => &names.service_groups,
        Category::Application => &names.applications,
        Category::ApplicationGroup => &names.application_groups,
    }
}

/// Write rendered documents into `dir`, creating it when needed.
pub fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>, ConvertError> {
    fs::create_dir_all(dir).map_err(|source| ConvertError::Artifact {
        path: dir.display().to_string(),
        source,
    })?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = dir.join(&artifact.file_name);
        fs::write(&path, format!("{}\n", artifact.body)).map_err(|source| {
            ConvertError::Artifact {
                path: path.display().to_string(),
                source,
            }
        })?;
        info!(path = %path.display(), objects = artifact.count, "artifact written");
        written.push(path);
    }
    Ok(written)
}

fn to_json<T: Serialize + ?Sized>(value: &T, file_name: &str) -> Result<String, ConvertError> {
    serde_json::to_string_pretty(value).map_err(|source| ConvertError::Serialize {
        path: file_name.to_string(),
        source,
    })
}

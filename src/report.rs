use crate::{
    pipeline::JobOutput,
    util::{now_rfc3339, sha256_hex},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub bytes: u64,
}

/// Regular files directly under `dir`, sorted by name.
pub fn list_output_dir(dir: &Path) -> Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read_dir {}", dir.display()))? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            bytes: meta.len(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

pub fn format_entry(entry: &FileEntry) -> String {
    format!("{} ({:.1} KB)", entry.name, entry.bytes as f64 / 1024.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_at: String,
    pub generated_on: String,
    pub documents: Vec<ManifestDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestDocument {
    pub title: String,
    pub renditions: Vec<Rendition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rendition {
    pub file: String,
    pub bytes: u64,
    pub sha256: String,
}

impl Manifest {
    pub fn build(outputs: &[JobOutput], generated_on: &str) -> Result<Self> {
        let mut documents = Vec::with_capacity(outputs.len());
        for out in outputs {
            let mut renditions = Vec::new();
            for path in out.html_path.iter().chain(std::iter::once(&out.pdf_path)) {
                renditions.push(rendition(path)?);
            }
            documents.push(ManifestDocument {
                title: out.title.clone(),
                renditions,
            });
        }
        Ok(Self {
            generated_at: now_rfc3339(),
            generated_on: generated_on.to_string(),
            documents,
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("writing manifest: {}", path.display()))
    }
}

fn rendition(path: &Path) -> Result<Rendition> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(Rendition {
        file: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        bytes: bytes.len() as u64,
        sha256: sha256_hex(&bytes),
    })
}

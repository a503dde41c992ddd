//! Startup data: a JSON array of books in the create-request shape.

use std::path::Path;

use anyhow::Context;

use super::models::{describe, BookDto};
use super::service::BookService;

/// Validation problems found in one seed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedIssue {
    /// Zero-based position in the seed array
    pub index: usize,
    pub problems: Vec<String>,
}

pub async fn read_seed(path: &Path) -> anyhow::Result<Vec<BookDto>> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read seed file {}", path.display()))?;

    serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse seed file {}", path.display()))
}

/// Every entry that would be rejected on create.
pub fn check_entries(entries: &[BookDto]) -> Vec<SeedIssue> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, dto)| {
            dto.validate().err().map(|violations| SeedIssue {
                index,
                problems: describe(&violations),
            })
        })
        .collect()
}

/// Create every entry; the first rejected entry aborts the load.
pub async fn load_into(service: &dyn BookService, entries: Vec<BookDto>) -> anyhow::Result<usize> {
    let total = entries.len();

    for (index, dto) in entries.into_iter().enumerate() {
        service
            .create_book(dto)
            .await
            .with_context(|| format!("seed entry {} rejected", index))?;
    }

    Ok(total)
}

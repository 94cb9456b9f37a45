//! Conversion of raw poster analysis text into a [`GeneratedFragment`].
//!
//! The analysis arrives as plain text with three headed sections, in this
//! order: the simple description, the research description and the tag
//! categories as `Key: value, value` lines.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CatalogError;
use crate::model::{GeneratedFragment, TagGroup, TagGroups};

static SECTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)WERSJA PROSTA:\s*(.*?)\s*WERSJA BADAWCZA:\s*(.*?)\s*ELEMENTY \(TAGI\):\s*(.*)")
        .expect("section pattern is valid")
});

/// Split analysis text into simple description, research description and the
/// raw tags section.
pub fn split_sections(text: &str) -> Result<(String, String, String), CatalogError> {
    let caps = SECTIONS.captures(text).ok_or(CatalogError::AnalysisFormat)?;
    let part = |i: usize| caps.get(i).map_or("", |m| m.as_str()).trim().to_string();
    Ok((part(1), part(2), part(3)))
}

/// Parse `Key: a, b` lines into ordered categories. Lines without a colon are
/// ignored; a repeated key replaces the earlier values in place.
pub fn parse_tag_lines(raw: &str) -> Vec<TagGroup> {
    let mut groups: Vec<TagGroup> = Vec::new();
    for line in raw.lines() {
        let Some((key, values)) = line.trim().split_once(':') else {
            continue;
        };
        let tags: Vec<String> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        let category = key.trim().to_string();
        match groups.iter_mut().find(|g| g.category == category) {
            Some(existing) => existing.tags = tags,
            None => groups.push(TagGroup { category, tags }),
        }
    }
    groups
}

pub fn parse_analysis(text: &str) -> Result<GeneratedFragment, CatalogError> {
    let (simple, research, tags) = split_sections(text)?;
    Ok(GeneratedFragment {
        simple_description: Some(simple),
        research_description: Some(research),
        tags: TagGroups::Groups(parse_tag_lines(&tags)),
    })
}

/// The id becomes a file name inside the output directory, so it may not
/// contain separators or be a dot segment.
fn fragment_file_name(id: &str) -> Result<String, CatalogError> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
        return Err(CatalogError::InvalidId(id.to_string()));
    }
    Ok(format!("{}.json", id))
}

/// Parse an analysis file and write it as `<out_dir>/<id>.json`.
pub fn ingest_file(input: &Path, id: &str, out_dir: &Path) -> Result<PathBuf, CatalogError> {
    let file_name = fragment_file_name(id)?;
    let text = std::fs::read_to_string(input)?;
    let fragment = parse_analysis(&text)?;
    std::fs::create_dir_all(out_dir)?;
    let out = out_dir.join(file_name);
    std::fs::write(&out, serde_json::to_string_pretty(&fragment)?)?;
    tracing::info!("wrote analysis fragment {}", out.display());
    Ok(out)
}

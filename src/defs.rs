//! Definition file discovery and import
//!
//! A definitions directory holds one JSON object per category, mapping each
//! item or building name to its attributes (`recipes.json`, `furnaces.json`,
//! and so on). Files can sit in nested directories; later files override
//! earlier ones entry by entry.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::db;
use crate::models::Definitions;
use crate::registry::RecipeRegistry;

/// The definition category a file holds, taken from its file stem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Smeltables,
    Furnaces,
    Belts,
    Drills,
    Recipes,
}

impl Category {
    pub fn from_stem(stem: &str) -> Option<Self> {
        match stem {
            "smeltables" => Some(Self::Smeltables),
            "furnaces" => Some(Self::Furnaces),
            "belts" => Some(Self::Belts),
            "drills" => Some(Self::Drills),
            "recipes" => Some(Self::Recipes),
            _ => None,
        }
    }
}

/// Find all JSON files under `dir`, sorted by path
pub fn find_definition_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn parse_map<T: DeserializeOwned>(path: &Path, content: &str) -> Result<HashMap<String, T>> {
    serde_json::from_str(content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse one definition file into `defs`, returning how many entries it held
pub fn parse_definitions(path: &Path, category: Category, defs: &mut Definitions) -> Result<usize> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let count = match category {
        Category::Smeltables => merge(&mut defs.smeltables, parse_map(path, &content)?),
        Category::Furnaces => merge(&mut defs.furnaces, parse_map(path, &content)?),
        Category::Belts => merge(&mut defs.belts, parse_map(path, &content)?),
        Category::Drills => merge(&mut defs.drills, parse_map(path, &content)?),
        Category::Recipes => merge(&mut defs.recipes, parse_map(path, &content)?),
    };
    Ok(count)
}

fn merge<T>(into: &mut HashMap<String, T>, parsed: HashMap<String, T>) -> usize {
    let count = parsed.len();
    into.extend(parsed);
    count
}

/// Read every recognised definition file under `dir`
pub fn load_directory(dir: &Path) -> Result<(Definitions, ImportStats)> {
    let mut defs = Definitions::default();
    let mut stats = ImportStats::default();

    let files = find_definition_files(dir)?;
    info!(count = files.len(), dir = %dir.display(), "found definition files");

    for path in &files {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let Some(category) = Category::from_stem(stem) else {
            warn!(file = %path.display(), "skipping file with unknown category");
            stats.skipped += 1;
            continue;
        };

        let count = parse_definitions(path, category, &mut defs)?;
        info!(file = %path.display(), entries = count, "parsed definitions");
        stats.files += 1;
    }

    stats.record(&defs);
    Ok((defs, stats))
}

/// Load every definition file under `dir` into the database, replacing what
/// is stored when `replace` is set.
///
/// Files and recipes are checked before anything is written, and the write
/// (including the removal of old entries) is one transaction, so malformed
/// input leaves the database untouched.
pub fn import_to_database(conn: &mut Connection, dir: &Path, replace: bool) -> Result<ImportStats> {
    let (defs, mut stats) = load_directory(dir)?;

    let registry = RecipeRegistry::new(defs.recipes.clone())
        .with_context(|| format!("Invalid recipe in {}", dir.display()))?;
    for (item, ingredient) in registry.missing_references() {
        warn!(%item, %ingredient, "recipe references an undefined item");
        stats.missing_references += 1;
    }

    db::store_definitions(conn, &defs, replace)?;
    Ok(stats)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub files: usize,
    pub skipped: usize,
    pub smeltables: usize,
    pub furnaces: usize,
    pub belts: usize,
    pub drills: usize,
    pub recipes: usize,
    pub missing_references: usize,
}

impl ImportStats {
    fn record(&mut self, defs: &Definitions) {
        self.smeltables = defs.smeltables.len();
        self.furnaces = defs.furnaces.len();
        self.belts = defs.belts.len();
        self.drills = defs.drills.len();
        self.recipes = defs.recipes.len();
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Imported {} files ({} recipes, {} smeltables, {} furnaces, {} drills, {} belts). Skipped: {}, Missing references: {}",
            self.files,
            self.recipes,
            self.smeltables,
            self.furnaces,
            self.drills,
            self.belts,
            self.skipped,
            self.missing_references
        )
    }
}

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing::{info, warn};
use walkdir::WalkDir;

use super::ini::{self, IniSection};
use crate::{
    config::AppConfig,
    models::{BookDescriptor, DisplayLabel, EngineCategory, EngineDescriptor, LevelDescriptor},
};

/// Installed engines per category plus the available opening books.
///
/// Lists are reference counted so navigators and front ends can share one
/// loaded catalog without copying it.
#[derive(Debug, Clone)]
pub struct EngineCatalog {
    /// Modern UCI engines.
    pub modern: Arc<[EngineDescriptor]>,
    /// Retro (emulated) engines.
    pub retro: Arc<[EngineDescriptor]>,
    /// Favorite engines.
    pub favorites: Arc<[EngineDescriptor]>,
    /// Opening books.
    pub books: Arc<[BookDescriptor]>,
}

impl Default for EngineCatalog {
    fn default() -> Self {
        Self {
            modern: Arc::from(Vec::new()),
            retro: Arc::from(Vec::new()),
            favorites: Arc::from(Vec::new()),
            books: Arc::from(Vec::new()),
        }
    }
}

impl EngineCatalog {
    /// Engines of one category in menu order.
    pub fn category(&self, category: EngineCategory) -> &[EngineDescriptor] {
        match category {
            EngineCategory::Modern => &self.modern,
            EngineCategory::Retro => &self.retro,
            EngineCategory::Favorite => &self.favorites,
        }
    }

    /// Look up an engine by file within a category.
    pub fn find_engine(
        &self,
        category: EngineCategory,
        file: &str,
    ) -> Option<(usize, &EngineDescriptor)> {
        self.category(category)
            .iter()
            .enumerate()
            .find(|(_, engine)| engine.file == file)
    }

    /// Total number of installed engines across categories.
    pub fn engine_count(&self) -> usize {
        self.modern.len() + self.retro.len() + self.favorites.len()
    }
}

/// Files the catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    /// Directory holding the engine ini files, executables and `.uci` level files.
    pub engines_dir: PathBuf,
    /// Modern engine list file name.
    pub modern_ini: String,
    /// Retro engine list file name.
    pub retro_ini: String,
    /// Favorite engine list file name.
    pub favorites_ini: String,
    /// Directory holding the opening books.
    pub books_dir: PathBuf,
    /// Book list file name inside `books_dir`.
    pub books_ini: String,
}

impl CatalogPaths {
    /// Paths configured in `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            engines_dir: config.engines_dir.clone(),
            modern_ini: config.modern_ini.clone(),
            retro_ini: config.retro_ini.clone(),
            favorites_ini: config.favorites_ini.clone(),
            books_dir: config.books_dir.clone(),
            books_ini: config.books_ini.clone(),
        }
    }

    /// Standard file names inside `engines_dir` and `books_dir`.
    pub fn with_dirs(engines_dir: impl Into<PathBuf>, books_dir: impl Into<PathBuf>) -> Self {
        Self {
            engines_dir: engines_dir.into(),
            modern_ini: "engines.ini".to_string(),
            retro_ini: "retro.ini".to_string(),
            favorites_ini: "favorites.ini".to_string(),
            books_dir: books_dir.into(),
            books_ini: "books.ini".to_string(),
        }
    }

    fn ini_for(&self, category: EngineCategory) -> &str {
        match category {
            EngineCategory::Modern => &self.modern_ini,
            EngineCategory::Retro => &self.retro_ini,
            EngineCategory::Favorite => &self.favorites_ini,
        }
    }
}

/// Thread-safe loader that reads and caches the engine catalog.
pub struct CatalogLoader {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    paths: CatalogPaths,
    cache: Option<EngineCatalog>,
}

impl CatalogLoader {
    /// Build a loader for the given files.
    pub fn new(paths: CatalogPaths) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner { paths, cache: None })),
        }
    }

    /// Files the catalog is read from.
    pub fn paths(&self) -> CatalogPaths {
        self.inner.read().paths.clone()
    }

    /// Drop the cached catalog so the next call to [`Self::catalog`] rereads the files.
    pub fn refresh(&self) {
        self.inner.write().cache = None;
    }

    /// Point the loader at different files and drop the cache.
    pub fn relocate(&self, paths: CatalogPaths) {
        let mut inner = self.inner.write();
        inner.paths = paths;
        inner.cache = None;
    }

    /// Return the catalog, reading it from disk on first use.
    pub fn catalog(&self) -> Result<EngineCatalog> {
        if let Some(catalog) = self.inner.read().cache.clone() {
            return Ok(catalog);
        }

        let mut inner = self.inner.write();
        if inner.cache.is_none() {
            inner.cache = Some(load_catalog(&inner.paths)?);
        }
        Ok(inner.cache.clone().unwrap_or_default())
    }
}

impl Clone for CatalogLoader {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn load_catalog(paths: &CatalogPaths) -> Result<EngineCatalog> {
    let mut lists = Vec::with_capacity(EngineCategory::ALL.len());
    for category in EngineCategory::ALL {
        lists.push(read_engine_ini(&paths.engines_dir, paths.ini_for(category))?);
    }
    let favorites = lists.pop().unwrap_or_default();
    let retro = lists.pop().unwrap_or_default();
    let modern = lists.pop().unwrap_or_default();
    let books = read_books(&paths.books_dir, &paths.books_ini)?;

    info!(
        modern = modern.len(),
        retro = retro.len(),
        favorites = favorites.len(),
        books = books.len(),
        "Catalog loaded"
    );

    Ok(EngineCatalog {
        modern: modern.into(),
        retro: retro.into(),
        favorites: favorites.into(),
        books: books.into(),
    })
}

/// Read one engine list file from `engines_dir`.
///
/// A missing file yields an empty list. Levels come from `<section>.uci` next
/// to the list; an unreadable level file leaves the engine without levels.
pub fn read_engine_ini(engines_dir: &Path, filename: &str) -> Result<Vec<EngineDescriptor>> {
    let path = engines_dir.join(filename);
    if !path.is_file() {
        warn!("Engine list {} not found", path.display());
        return Ok(Vec::new());
    }

    let content =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let sections =
        ini::parse(&content).with_context(|| format!("failed to parse {}", path.display()))?;

    Ok(sections
        .iter()
        .map(|section| build_engine(engines_dir, section))
        .collect())
}

fn build_engine(engines_dir: &Path, section: &IniSection) -> EngineDescriptor {
    let name = section.get("name").unwrap_or(&section.name).to_string();
    EngineDescriptor {
        file: engines_dir.join(&section.name).display().to_string(),
        display: display_label(section, &name),
        elo: section.get("elo").map(str::to_string),
        levels: read_levels(&engines_dir.join(format!("{}.uci", section.name))),
        name,
    }
}

fn read_levels(path: &Path) -> Vec<LevelDescriptor> {
    if !path.is_file() {
        return Vec::new();
    }

    let parsed = fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|content| ini::parse(&content).map_err(anyhow::Error::from));
    match parsed {
        Ok(sections) => sections
            .into_iter()
            .map(|section| LevelDescriptor {
                label: section.name,
                options: section.entries.into_iter().collect(),
            })
            .collect(),
        Err(err) => {
            warn!("Ignoring levels in {}: {err}", path.display());
            Vec::new()
        }
    }
}

/// Read the opening books from `books_dir`.
///
/// Uses the book list file when present, otherwise lists `*.bin` files.
pub fn read_books(books_dir: &Path, filename: &str) -> Result<Vec<BookDescriptor>> {
    let path = books_dir.join(filename);
    if path.is_file() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let sections =
            ini::parse(&content).with_context(|| format!("failed to parse {}", path.display()))?;
        return Ok(sections
            .iter()
            .map(|section| {
                let stem = file_stem(&section.name);
                BookDescriptor {
                    file: section.name.clone(),
                    display: display_label(section, &stem),
                }
            })
            .collect());
    }

    if !books_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files: Vec<String> = WalkDir::new(books_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("bin"))
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    files.sort();

    Ok(files
        .into_iter()
        .map(|file| {
            let stem = file_stem(&file);
            BookDescriptor::new(file, &stem)
        })
        .collect())
}

fn display_label(section: &IniSection, fallback: &str) -> DisplayLabel {
    let derived = DisplayLabel::from_name(fallback);
    DisplayLabel {
        large: section.get("large").map(str::to_string).unwrap_or(derived.large),
        medium: section.get("medium").map(str::to_string).unwrap_or(derived.medium),
        small: section.get("small").map(str::to_string).unwrap_or(derived.small),
    }
}

fn file_stem(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_engines_with_levels() -> Result<()> {
        let temp = tempdir()?;
        let dir = temp.path();
        fs::write(
            dir.join("engines.ini"),
            r#"
[lc0]
name = Lc0
elo = 3600
large = Lc0
medium = Lc0
small = lc0

[zurichess]
name = zurichess
"#,
        )?;
        fs::write(
            dir.join("lc0.uci"),
            "[1 Core]\nThreads = 1\n\n[2 Cores]\nThreads = 2\n",
        )?;
        fs::write(dir.join("zurichess.uci"), "[[broken\n")?;

        let engines = read_engine_ini(dir, "engines.ini")?;
        assert_eq!(engines.len(), 2);

        let lc0 = &engines[0];
        assert_eq!(lc0.name, "Lc0");
        assert_eq!(lc0.elo.as_deref(), Some("3600"));
        assert_eq!(lc0.display.small, "lc0");
        assert_eq!(lc0.file, dir.join("lc0").display().to_string());
        let labels: Vec<_> = lc0.levels.iter().map(|level| level.label.as_str()).collect();
        assert_eq!(labels, ["1 Core", "2 Cores"]);
        assert_eq!(lc0.levels[1].options.get("Threads").map(String::as_str), Some("2"));

        let zurichess = &engines[1];
        assert_eq!(zurichess.display.medium, "zurichess".chars().take(8).collect::<String>());
        assert!(zurichess.levels.is_empty(), "broken level file is ignored");
        Ok(())
    }

    #[test]
    fn missing_engine_list_is_empty() -> Result<()> {
        let temp = tempdir()?;
        assert!(read_engine_ini(temp.path(), "retro.ini")?.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_engine_list_is_an_error() -> Result<()> {
        let temp = tempdir()?;
        fs::write(temp.path().join("engines.ini"), "name = orphan\n")?;
        assert!(read_engine_ini(temp.path(), "engines.ini").is_err());
        Ok(())
    }

    #[test]
    fn lists_books_from_ini_or_directory() -> Result<()> {
        let temp = tempdir()?;
        let dir = temp.path();
        fs::write(dir.join("b-gm.bin"), b"")?;
        fs::write(dir.join("a-fun.bin"), b"")?;
        fs::write(dir.join("notes.txt"), b"")?;

        let books = read_books(dir, "books.ini")?;
        let files: Vec<_> = books.iter().map(|book| book.file.as_str()).collect();
        assert_eq!(files, ["a-fun.bin", "b-gm.bin"]);
        assert_eq!(books[0].display.large, "a-fun");

        fs::write(
            dir.join("books.ini"),
            "[b-gm.bin]\nlarge = GM book\n\n[a-fun.bin]\n",
        )?;
        let books = read_books(dir, "books.ini")?;
        assert_eq!(books[0].file, "b-gm.bin");
        assert_eq!(books[0].display.large, "GM book");
        assert_eq!(books[1].display.large, "a-fun");
        Ok(())
    }

    #[test]
    fn loader_caches_until_refresh() -> Result<()> {
        let temp = tempdir()?;
        let dir = temp.path();
        fs::write(dir.join("engines.ini"), "[lc0]\nname = Lc0\n")?;

        let loader = CatalogLoader::new(CatalogPaths::with_dirs(dir, dir.join("books")));
        assert_eq!(loader.catalog()?.modern.len(), 1);

        fs::write(dir.join("engines.ini"), "[lc0]\nname = Lc0\n[sf]\nname = Stockfish\n")?;
        assert_eq!(loader.catalog()?.modern.len(), 1);

        loader.refresh();
        let catalog = loader.catalog()?;
        assert_eq!(catalog.modern.len(), 2);
        assert!(catalog.retro.is_empty());
        assert_eq!(
            catalog.find_engine(EngineCategory::Modern, &dir.join("sf").display().to_string()).map(|(index, _)| index),
            Some(1)
        );
        Ok(())
    }
}

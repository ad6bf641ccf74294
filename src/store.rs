//! Flat-directory page store plus the crawl manifest.
//!
//! One file per page, named by its storage key, under a directory that is
//! recreated at the start of every crawl. The store is write-once-per-key
//! during the crawl phase and read-only during extraction, so no locking is
//! needed; concurrent crawl fetches funnel their saves through a single
//! receiver task.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScrapeError;
use crate::keys::KEY_EXT;

const MANIFEST_FILE: &str = "manifest.json";

pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discard any previous crawl and start from an empty directory.
    pub fn reset(&self) -> Result<(), ScrapeError> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Write (or overwrite) a page under `key`.
    pub fn save(&self, key: &str, html: &str) -> Result<(), ScrapeError> {
        fs::write(self.root.join(key), html)?;
        Ok(())
    }

    /// Load a page, failing with `PageNotFound` if the key is absent.
    pub fn load(&self, key: &str) -> Result<String, ScrapeError> {
        match fs::read_to_string(self.root.join(key)) {
            Ok(html) => Ok(html),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ScrapeError::PageNotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All stored page keys, lexicographically sorted.
    pub fn keys(&self) -> Result<Vec<String>, ScrapeError> {
        let mut keys = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(keys),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let name = entry?.file_name();
            let name = name.to_string_lossy().into_owned();
            if name.ends_with(KEY_EXT) {
                keys.push(name);
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Keys containing `pattern` as a literal substring, sorted. An empty
    /// result is a valid answer, not an error.
    pub fn find_by_pattern(&self, pattern: &str) -> Result<Vec<String>, ScrapeError> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.contains(pattern))
            .collect())
    }

    pub fn page_count(&self) -> Result<usize, ScrapeError> {
        Ok(self.keys()?.len())
    }

    pub fn save_manifest(&self, manifest: &Manifest) -> Result<(), ScrapeError> {
        let json = serde_json::to_string_pretty(manifest)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;
        fs::write(self.root.join(MANIFEST_FILE), json)?;
        Ok(())
    }

    /// Load the crawl manifest; an absent manifest is an empty one, so
    /// extraction over a store produced without one still works via pattern
    /// matching alone.
    pub fn load_manifest(&self) -> Result<Manifest, ScrapeError> {
        match fs::read_to_string(self.root.join(MANIFEST_FILE)) {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e).into()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Manifest::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Registry of `(original URL, storage key)` pairs recorded as pages are
/// saved. Extraction resolves exact URLs through it before falling back to
/// re-deriving a key, which removes the silent-miss risk of the lossy codec
/// for well-formed hrefs.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Manifest {
    pages: BTreeMap<String, String>,
}

impl Manifest {
    pub fn record(&mut self, url: &str, key: &str) {
        // Two URLs can flatten to the same key; last write wins in the
        // store, so the manifest keeps both URL entries pointing at it.
        if let Some((other, _)) = self
            .pages
            .iter()
            .find(|(u, k)| k.as_str() == key && u.as_str() != url)
        {
            debug!("key collision: {} and {} both map to {}", other, url, key);
        }
        self.pages.insert(url.to_string(), key.to_string());
    }

    pub fn key_for(&self, url: &str) -> Option<&str> {
        self.pages.get(url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::page_key;

    fn temp_store() -> (tempfile::TempDir, PageStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::open(dir.path().join("pages"));
        store.reset().unwrap();
        (dir, store)
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (_dir, store) = temp_store();
        let key = page_key("https://example.xyz/category/templates/");
        store.save(&key, "<html>listing</html>").unwrap();
        assert_eq!(store.load(&key).unwrap(), "<html>listing</html>");
    }

    #[test]
    fn load_missing_key_is_not_found() {
        let (_dir, store) = temp_store();
        match store.load("absent.html") {
            Err(ScrapeError::PageNotFound(key)) => assert_eq!(key, "absent.html"),
            other => panic!("expected PageNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn find_by_pattern_is_literal_and_sorted() {
        let (_dir, store) = temp_store();
        store.save("site_category_b.html", "").unwrap();
        store.save("site_category_a.html", "").unwrap();
        store.save("site_downloads_x.html", "").unwrap();
        let found = store.find_by_pattern("category").unwrap();
        assert_eq!(found, vec!["site_category_a.html", "site_category_b.html"]);
        assert!(store.find_by_pattern("nothing").unwrap().is_empty());
    }

    #[test]
    fn reset_discards_previous_contents() {
        let (_dir, store) = temp_store();
        store.save("old.html", "stale").unwrap();
        store.reset().unwrap();
        assert_eq!(store.page_count().unwrap(), 0);
    }

    #[test]
    fn manifest_roundtrip_and_lookup() {
        let (_dir, store) = temp_store();
        let mut manifest = Manifest::default();
        manifest.record("https://example.xyz/a/", "example.xyz_a.html");
        manifest.record("https://example.xyz/b/", "example.xyz_b.html");
        store.save_manifest(&manifest).unwrap();

        let loaded = store.load_manifest().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded.key_for("https://example.xyz/a/"),
            Some("example.xyz_a.html")
        );
        assert_eq!(loaded.key_for("https://example.xyz/c/"), None);
    }

    #[test]
    fn manifest_absent_is_empty() {
        let (_dir, store) = temp_store();
        assert!(store.load_manifest().unwrap().is_empty());
    }

    #[test]
    fn duplicate_key_saves_overwrite() {
        let (_dir, store) = temp_store();
        let key = "example.xyz_page.html";
        store.save(key, "first").unwrap();
        store.save(key, "second").unwrap();
        assert_eq!(store.load(key).unwrap(), "second");
        assert_eq!(store.page_count().unwrap(), 1);
    }
}

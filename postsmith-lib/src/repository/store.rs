use std::{
    fs,
    io::Write,
    path::PathBuf,
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{
    Error, Result,
    repository::models::{Links, ProfileRecord},
};

const EXTENSION: &str = "json";

/// The on-disk shape of a profile: one JSON object per file, named after the sanitized profile
/// name.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileFile {
    /// The unsanitized display name, used to detect two names mapping to the same file. Files
    /// written without it are still readable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    platform: String,
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    links: Links,
}

impl ProfileFile {
    fn from_record(record: &ProfileRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            platform: record.platform.clone(),
            api_key: record.credential.clone(),
            links: record.links.clone(),
        }
    }

    fn into_record(self, key: &str) -> ProfileRecord {
        ProfileRecord {
            name: self.name.unwrap_or_else(|| key.to_string()),
            platform: self.platform,
            credential: self.api_key,
            links: self.links,
        }
    }
}

/// Strip everything but letters, digits, spaces, hyphens and underscores, then trim.
///
/// This is the storage key of a profile. Distinct names can map to the same key (`"A/B"` and
/// `"AB"`); [`ProfileStore::save`] refuses the second one.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// File-backed profile storage, one JSON file per profile.
///
/// There is no locking: two processes saving the same profile race and the last writer wins.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{EXTENSION}"))
    }

    /// Names of every stored profile, sorted alphabetically. A store that has never been written
    /// to is empty.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| Error::Walk {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();

            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION)
            {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    pub fn contains(&self, name: &str) -> bool {
        let key = sanitize_name(name);
        !key.is_empty() && self.path_for_key(&key).is_file()
    }

    /// Load the profile stored under `name`.
    ///
    /// Never fails: a missing, unreadable or corrupt file yields an empty record, which callers
    /// must treat as "not found".
    pub fn load(&self, name: &str) -> ProfileRecord {
        let key = sanitize_name(name);
        if key.is_empty() {
            return ProfileRecord::default();
        }

        self.read_file(&key)
            .map(|file| file.into_record(&key))
            .unwrap_or_default()
    }

    fn read_file(&self, key: &str) -> Option<ProfileFile> {
        let path = self.path_for_key(key);
        if !path.exists() {
            return None;
        }

        let contents = fs::read_to_string(&path)
            .inspect_err(|err| warn!("Could not read profile {}: {err}", path.display()))
            .ok()?;

        serde_json::from_str(&contents)
            .inspect_err(|err| warn!("Ignoring corrupt profile {}: {err}", path.display()))
            .ok()
    }

    /// Insert or fully overwrite the profile named `record.name`, returning the storage key it was
    /// written under. The store directory is created if needed.
    pub fn save(&self, record: &ProfileRecord) -> Result<String> {
        let key = sanitize_name(&record.name);
        if key.is_empty() {
            return Err(Error::EmptyName);
        }

        if let Some(existing) = self.read_file(&key).and_then(|file| file.name)
            && existing.trim() != record.name.trim()
        {
            return Err(Error::NameConflict {
                name: record.name.clone(),
                key,
                existing,
            });
        }

        fs::create_dir_all(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, &ProfileFile::from_record(record))?;
        tmp.write_all(b"\n")?;
        tmp.persist(self.path_for_key(&key))?;

        debug!("Saved profile {key}");

        Ok(key)
    }
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::*;
    use crate::repository::models::{Channel, Provider};

    fn client_a() -> ProfileRecord {
        ProfileRecord::new("Client A", Provider::Gemini, "k1")
            .with_link(Channel::Website, "https://a.io")
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("profiles"));
        let record = client_a();

        assert_eq!(store.save(&record).unwrap(), "Client A");

        assert!(store.list().unwrap().contains(&"Client A".to_string()));
        assert_eq!(store.load("Client A"), record);
    }

    #[test]
    fn test_padded_name_kept() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        let record = ProfileRecord::new(" Client A ", Provider::Gemini, "k1");

        assert_eq!(store.save(&record).unwrap(), "Client A");

        assert_eq!(store.load(" Client A "), record);
        assert_eq!(store.load("Client A").name, " Client A ");

        let trimmed = ProfileRecord::new("Client A", Provider::ChatGpt, "k2");
        store.save(&trimmed).unwrap();
        assert_eq!(store.load("Client A"), trimmed);
    }

    #[test]
    fn test_list_sorted() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());

        for name in ["zeta", "Alpha", "beta"] {
            store
                .save(&ProfileRecord::new(name, Provider::ChatGpt, "k"))
                .unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "not a profile").unwrap();

        assert_eq!(store.list().unwrap(), vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_list_missing_dir() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("never-created"));

        assert!(store.list().unwrap().is_empty());
        assert!(!dir.path().join("never-created").exists());
    }

    #[test]
    fn test_overwrite() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        store.save(&client_a()).unwrap();

        let updated = ProfileRecord::new("Client A", Provider::ChatGpt, "k2");
        store.save(&updated).unwrap();

        assert_eq!(store.load("Client A"), updated);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_or_corrupt() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        fs::write(dir.path().join("Broken.json"), "{ not json").unwrap();

        assert!(store.load("Nobody").is_empty());
        assert!(store.load("Broken").is_empty());
        assert!(store.load("///").is_empty());
    }

    #[test]
    fn test_load_legacy_file() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        fs::write(
            dir.path().join("Old.json"),
            r#"{"platform": "Gemini", "api_key": "k", "links": {"YouTube": "", "Website": "https://o.io"}}"#,
        )
        .unwrap();

        let record = store.load("Old");

        assert_eq!(record.name, "Old");
        assert_eq!(record.provider().unwrap(), Provider::Gemini);
        assert_eq!(record.links.len(), 2);
        assert!(record.links.has_active());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_name("  Client A  "), "Client A");
        assert_eq!(sanitize_name("a/b\\c:d*e?"), "abcde");
        assert_eq!(sanitize_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_name("été_2024-v2"), "été_2024-v2");
        assert_eq!(sanitize_name("!!!"), "");
    }

    #[test]
    fn test_sanitize_idempotent() {
        for s in ["", " x ", "a / b", "Client A!", "\t-_- ", "ü ß 1", " .hidden. "] {
            let once = sanitize_name(s);
            assert_eq!(sanitize_name(&once), once);
        }
    }

    #[test]
    fn test_empty_name_rejected() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());

        assert!(matches!(
            store.save(&ProfileRecord::new("???", Provider::Gemini, "k")),
            Err(Error::EmptyName)
        ));
    }

    #[test]
    fn test_sanitized_collision_rejected() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        store.save(&ProfileRecord::new("AB", Provider::Gemini, "k1")).unwrap();

        let result = store.save(&ProfileRecord::new("A/B", Provider::ChatGpt, "k2"));

        assert!(matches!(
            result,
            Err(Error::NameConflict { ref key, ref existing, .. })
                if key == "AB" && existing == "AB"
        ));
        assert_eq!(store.load("AB").credential, "k1");
    }

    #[test]
    fn test_legacy_file_overwritten() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        fs::write(
            dir.path().join("AB.json"),
            r#"{"platform": "Gemini", "api_key": "old"}"#,
        )
        .unwrap();

        store.save(&ProfileRecord::new("A/B", Provider::Gemini, "new")).unwrap();

        let record = store.load("AB");
        assert_eq!(record.name, "A/B");
        assert_eq!(record.credential, "new");
    }
}

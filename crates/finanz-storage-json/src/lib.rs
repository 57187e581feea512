//! On-device key-value store: one JSON file per key, with rolling backups.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{NaiveDateTime, Utc};
use finanz_core::{CoreError, KeyValueStore};
use tracing::{debug, warn};

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const BACKUPS_DIR: &str = "backups";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// One saved copy of a key's previous value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub id: String,
    pub path: PathBuf,
    pub created_at: Option<NaiveDateTime>,
}

/// Filesystem-backed [`KeyValueStore`].
///
/// Every overwrite first copies the current file into `backups/<key>/` and
/// keeps the newest `retention` copies. Writes go through a temp file and a
/// rename, so a reader sees either the old or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
    retention: usize,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(root, DEFAULT_RETENTION)
    }

    pub fn with_retention(root: PathBuf, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            retention: retention.max(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn item_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_name(key), FILE_EXTENSION))
    }

    /// Backups for `key`, newest first.
    pub fn list_backups(&self, key: &str) -> Result<Vec<BackupInfo>, CoreError> {
        let dir = self.backup_dir(key);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(BackupInfo {
                    id: file_name.to_string(),
                    created_at: parse_backup_timestamp(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| std::cmp::Reverse(backup_order(&info.id)));
        Ok(entries)
    }

    /// Replaces the current value of `key` with a backup.
    ///
    /// The backup must hold valid JSON; the value being replaced is itself
    /// backed up first.
    pub fn restore_backup(&self, key: &str, backup_id: &str) -> Result<(), CoreError> {
        let source = self.backup_dir(key).join(backup_id);
        if !source.is_file() {
            return Err(CoreError::Storage(format!("backup `{backup_id}` not found")));
        }
        let data = fs::read_to_string(&source)?;
        serde_json::from_str::<serde_json::Value>(&data)?;
        self.set_item(key, &data)?;
        debug!(key, backup = backup_id, "backup restored");
        Ok(())
    }

    fn backup_dir(&self, key: &str) -> PathBuf {
        self.root.join(BACKUPS_DIR).join(canonical_name(key))
    }

    fn backup_existing_file(&self, key: &str, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(key);
        fs::create_dir_all(&dir)?;
        let stem = format!(
            "{}_{}",
            canonical_name(key),
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        let mut backup_path = dir.join(format!("{stem}.{FILE_EXTENSION}"));
        let mut seq = 1;
        while backup_path.exists() {
            backup_path = dir.join(format!("{stem}-{seq}.{FILE_EXTENSION}"));
            seq += 1;
        }
        fs::copy(path, &backup_path)?;
        self.prune_backups(key)
    }

    fn prune_backups(&self, key: &str) -> Result<(), CoreError> {
        for stale in self.list_backups(key)?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&stale.path) {
                warn!(backup = %stale.id, %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError> {
        let path = self.item_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let path = self.item_path(key);
        self.backup_existing_file(key, &path)?;
        let tmp = tmp_path(&path);
        write_file(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(key, bytes = value.len(), "item written");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), CoreError> {
        let path = self.item_path(key);
        if path.exists() {
            self.backup_existing_file(key, &path)?;
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

fn canonical_name(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "store".into()
    } else {
        sanitized
    }
}

/// Splits `<key>_<date>_<time>[-<seq>].json` into its timestamp and sequence.
fn split_backup_name(name: &str) -> Option<(&str, &str, u32)> {
    let trimmed = name.strip_suffix(&format!(".{FILE_EXTENSION}"))?;
    let (rest, time) = trimmed.rsplit_once('_')?;
    let (_, date) = rest.rsplit_once('_')?;
    let (time, seq) = match time.split_once('-') {
        Some((time, seq)) => (time, seq.parse().ok()?),
        None => (time, 0),
    };
    if !is_digits(date, 8) || !is_digits(time, 6) {
        return None;
    }
    Some((date, time, seq))
}

fn parse_backup_timestamp(name: &str) -> Option<NaiveDateTime> {
    let (date, time, _) = split_backup_name(name)?;
    NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S").ok()
}

fn backup_order(name: &str) -> (Option<NaiveDateTime>, u32) {
    let seq = split_backup_name(name).map_or(0, |(_, _, seq)| seq);
    (parse_backup_timestamp(name), seq)
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_names_parse_with_and_without_sequence() {
        let plain = "mifinanzapp_20240301_101500.json";
        let repeat = "mifinanzapp_20240301_101500-2.json";
        assert!(parse_backup_timestamp(plain).is_some());
        assert_eq!(parse_backup_timestamp(plain), parse_backup_timestamp(repeat));
        assert!(backup_order(repeat) > backup_order(plain));
        assert!(parse_backup_timestamp("notes.json").is_none());
    }

    #[test]
    fn keys_become_safe_file_names() {
        assert_eq!(canonical_name("MiFinanzApp"), "mifinanzapp");
        assert_eq!(canonical_name("../etc/passwd"), "___etc_passwd");
        assert_eq!(canonical_name("  "), "store");
    }
}

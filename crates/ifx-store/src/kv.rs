//! String key-value stores with a durable hex-record file format.

use ifx_core::PageError;
use ifx_core::PageResult;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Synchronous string store, touched only from discrete event handlers.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> PageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> PageResult<()>;
    fn remove(&mut self, key: &str) -> PageResult<()>;
}

/// In-memory store used by tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, bypassing any validation. Lets tests stage
    /// corrupt persisted state.
    pub fn seed(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_owned(), value.to_owned());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PageResult<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PageResult<()> {
        self.map.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> PageResult<()> {
        self.map.remove(key);
        Ok(())
    }
}

/// File-backed store holding hex-encoded tab-separated records, one per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> PageResult<Option<String>> {
        let map = read_record_map(&self.path)?;
        Ok(map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PageResult<()> {
        let mut map = read_record_map(&self.path)?;
        map.insert(key.to_owned(), value.to_owned());
        write_record_map(&self.path, &map)
    }

    fn remove(&mut self, key: &str) -> PageResult<()> {
        let mut map = read_record_map(&self.path)?;
        map.remove(key);

        if map.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(|error| {
                    PageError::new(
                        "store.file_remove_failed",
                        format!(
                            "failed removing empty store file `{}`: {error}",
                            self.path.display()
                        ),
                    )
                })?;
            }
            return Ok(());
        }

        write_record_map(&self.path, &map)
    }
}

fn read_record_map(path: &Path) -> PageResult<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let content = fs::read_to_string(path).map_err(|error| {
        PageError::new(
            "store.file_read_failed",
            format!("failed to read store file `{}`: {error}", path.display()),
        )
    })?;

    let mut map = BTreeMap::new();
    for (index, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }

        let (key_hex, value_hex) = line.split_once('\t').ok_or_else(|| {
            PageError::new(
                "store.record_format_invalid",
                format!("invalid record format at `{}` line {}", path.display(), index + 1),
            )
        })?;

        let key = decode_hex_string(key_hex)?;
        let value = decode_hex_string(value_hex)?;
        map.insert(key, value);
    }

    Ok(map)
}

fn write_record_map(path: &Path, map: &BTreeMap<String, String>) -> PageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            PageError::new(
                "store.dir_create_failed",
                format!(
                    "failed to create store directory `{}`: {error}",
                    parent.display()
                ),
            )
        })?;
    }

    let mut encoded = String::new();
    for (key, value) in map {
        encoded.push_str(&encode_hex_string(key));
        encoded.push('\t');
        encoded.push_str(&encode_hex_string(value));
        encoded.push('\n');
    }

    fs::write(path, encoded).map_err(|error| {
        PageError::new(
            "store.file_write_failed",
            format!("failed to write store file `{}`: {error}", path.display()),
        )
    })
}

fn encode_hex_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len().saturating_mul(2));
    for byte in value.as_bytes() {
        out.push(hex_char(byte >> 4));
        out.push(hex_char(byte & 0x0f));
    }
    out
}

fn decode_hex_string(value: &str) -> PageResult<String> {
    if value.len() % 2 != 0 {
        return Err(PageError::new(
            "store.hex_invalid",
            "hex field length must be even",
        ));
    }

    let mut bytes = Vec::with_capacity(value.len() / 2);
    let chars: Vec<char> = value.chars().collect();
    let mut index = 0_usize;
    while index < chars.len() {
        let high = decode_hex_nibble(chars[index])?;
        let low = decode_hex_nibble(chars[index + 1])?;
        bytes.push((high << 4) | low);
        index += 2;
    }

    String::from_utf8(bytes).map_err(|error| {
        PageError::new(
            "store.utf8_invalid",
            format!("store field is not valid UTF-8: {error}"),
        )
    })
}

fn hex_char(value: u8) -> char {
    match value {
        0..=9 => (b'0' + value) as char,
        10..=15 => (b'a' + (value - 10)) as char,
        _ => '0',
    }
}

fn decode_hex_nibble(ch: char) -> PageResult<u8> {
    match ch {
        '0'..='9' => Ok((ch as u8) - b'0'),
        'a'..='f' => Ok((ch as u8) - b'a' + 10),
        'A'..='F' => Ok((ch as u8) - b'A' + 10),
        _ => Err(PageError::new(
            "store.hex_invalid",
            format!("invalid hex character `{ch}`"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::FileStore;
    use super::KeyValueStore;
    use super::MemoryStore;

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.set("users", "[]"), Ok(()));
        assert_eq!(store.get("users"), Ok(Some("[]".to_owned())));
        assert_eq!(store.remove("users"), Ok(()));
        assert_eq!(store.get("users"), Ok(None));
    }

    #[test]
    fn file_store_roundtrip_with_tab_and_newline_payloads() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("tempdir failed: {error}"),
        };
        let mut store = FileStore::new(dir.path().join("page.kv"));

        let value = "line one\n\tline two";
        assert_eq!(store.set("loggedInUser", value), Ok(()));
        assert_eq!(store.get("loggedInUser"), Ok(Some(value.to_owned())));
    }

    #[test]
    fn missing_file_reads_as_absent() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("tempdir failed: {error}"),
        };
        let store = FileStore::new(dir.path().join("never-written.kv"));
        assert_eq!(store.get("users"), Ok(None));
    }

    #[test]
    fn removing_last_key_deletes_the_file() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("tempdir failed: {error}"),
        };
        let mut store = FileStore::new(dir.path().join("page.kv"));
        assert_eq!(store.set("users", "[]"), Ok(()));
        assert_eq!(store.remove("users"), Ok(()));
        assert!(!store.path().exists());
    }
}

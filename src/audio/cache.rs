use std::fs;
use std::path::PathBuf;

/// Persistent audio cache, content-addressed by the exact spoken text.
///
/// Write-once, read-many: nothing in this core ever evicts an entry. Entries
/// survive process restarts so a phrase synthesized once never hits the
/// network again.
#[derive(Clone, Debug)]
pub struct AudioCache {
    base_dir: PathBuf,
}

impl AudioCache {
    pub fn new() -> Option<Self> {
        let base = dirs::data_dir()?.join("kioska").join("tts");
        fs::create_dir_all(&base).ok()?;
        Some(Self { base_dir: base })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Option<Self> {
        fs::create_dir_all(&base_dir).ok()?;
        Some(Self { base_dir })
    }

    pub fn get(&self, text: &str) -> Option<Vec<u8>> {
        fs::read(self.entry_path(text)).ok()
    }

    pub fn put(&self, text: &str, bytes: &[u8]) -> bool {
        fs::write(self.entry_path(text), bytes).is_ok()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entry_path(text).exists()
    }

    fn entry_path(&self, text: &str) -> PathBuf {
        self.base_dir.join(Self::file_key(text))
    }

    /// Sanitized prefix keeps entries greppable on disk; the hash suffix keeps
    /// distinct texts distinct after sanitization collapses their characters.
    fn file_key(text: &str) -> String {
        let prefix: String = text
            .chars()
            .take(40)
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{prefix}-{:016x}.audio", fnv1a(text.as_bytes()))
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_cache() -> (TempDir, AudioCache) {
        let dir = TempDir::new().unwrap();
        let cache = AudioCache::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, cache)
    }

    #[test]
    fn test_round_trip() {
        let (_dir, cache) = make_cache();
        assert!(cache.get("hello").is_none());
        assert!(cache.put("hello", &[1, 2, 3]));
        assert_eq!(cache.get("hello"), Some(vec![1, 2, 3]));
        assert!(cache.contains("hello"));
    }

    #[test]
    fn test_exact_text_addressing() {
        let (_dir, cache) = make_cache();
        cache.put("Order complete", &[1]);
        // Near-identical texts that sanitize to the same prefix stay separate.
        assert!(cache.get("Order complete!").is_none());
        assert!(cache.get("order complete").is_none());
        assert_eq!(cache.get("Order complete"), Some(vec![1]));
    }

    #[test]
    fn test_non_ascii_keys() {
        let (_dir, cache) = make_cache();
        cache.put("초기화", &[7, 7]);
        assert_eq!(cache.get("초기화"), Some(vec![7, 7]));
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let (_dir, cache) = make_cache();
        cache.put("x", &[1]);
        cache.put("x", &[2]);
        assert_eq!(cache.get("x"), Some(vec![2]));
    }
}

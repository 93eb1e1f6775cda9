//! # Configuration
//!
//! A minimal string key/value store. Values are layered by the binary
//! (defaults first, then environment) and read back through a
//! [`CoachConfigSnapshot`] with typed getters.
//!
//! ```rust
//! use coach_core::CoachConfig;
//! let mut config = CoachConfig::new();
//!
//! config.set("http.port", "3030");
//! config.set("ingest.max_photo_bytes", "1048576");
//!
//! let snapshot = config.snapshot();
//! assert_eq!(snapshot.get_u64("ingest.max_photo_bytes"), Some(1_048_576));
//! ```
//!
//! ## Environment overrides
//!
//! [`CoachConfig::load_env`] maps `COACH__HTTP__PORT=8080` to `http.port`
//! and `COACH__REMOTE__USERS__URL` to `remote.users.url`.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CoachConfig {
    values: HashMap<String, String>,
}

impl CoachConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set a key only if nothing has been set for it yet.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Copy every `<PREFIX>A__B` variable into `a.b`. Returns how many keys were loaded.
    pub fn load_env(&mut self, prefix: &str) -> usize {
        self.load_vars(prefix, std::env::vars())
    }

    pub fn load_vars<I>(&mut self, prefix: &str, vars: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut loaded = 0;
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                if normalized.is_empty() {
                    continue;
                }
                self.values.insert(normalized, value);
                loaded += 1;
            }
        }
        loaded
    }

    pub fn snapshot(&self) -> CoachConfigSnapshot {
        CoachConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoachConfigSnapshot {
    map: HashMap<String, String>,
}

impl CoachConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.parse::<bool>().ok())
    }
}

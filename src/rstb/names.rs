use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use std::sync::OnceLock;

use crate::hash::resource_hash;
use crate::{Error, Result};

static GLOBAL: OnceLock<NameDictionary> = OnceLock::new();

/// Reverse mapping from resource hash to resource path.
///
/// Hashes can collide; the first name inserted for a hash is kept and
/// later ones are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameDictionary {
    names: HashMap<u32, String>,
}

impl NameDictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dictionary from resource paths.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dict = Self::new();
        for name in names {
            dict.insert(name);
        }
        dict
    }

    /// Parses a name list with one path per line.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn load(text: &str) -> Self {
        Self::from_names(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Reads and parses a name list file.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let dict = Self::load(&text);
        log::debug!(
            "loaded {} resource names from {}",
            dict.len(),
            path.as_ref().display()
        );
        Ok(dict)
    }

    /// Adds a name. Returns `false` if its hash was already taken.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        match self.names.entry(resource_hash(&name)) {
            Entry::Occupied(existing) => {
                if existing.get() != &name {
                    log::trace!("hash collision: keeping {} over {}", existing.get(), name);
                }
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(name);
                true
            }
        }
    }

    /// Returns the name registered for `hash`.
    pub fn get(&self, hash: u32) -> Option<&str> {
        self.names.get(&hash).map(String::as_str)
    }

    /// Returns the name for `hash`, or its value as `0xXXXXXXXX`.
    pub fn display_name(&self, hash: u32) -> String {
        match self.get(hash) {
            Some(name) => name.to_string(),
            None => format!("0x{:08X}", hash),
        }
    }

    /// Returns the number of distinct hashes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the dictionary holds no names.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Installs the process-wide dictionary.
///
/// # Errors
///
/// Returns [`Error::DictionaryInstalled`] if one was installed before.
pub fn install_global(dict: NameDictionary) -> Result<()> {
    GLOBAL.set(dict).map_err(|_| Error::DictionaryInstalled)
}

/// Returns the process-wide dictionary, if installed.
pub fn global() -> Option<&'static NameDictionary> {
    GLOBAL.get()
}

// The variable table: a flat string-to-string map with last-write-wins sets.
use std::collections::{BTreeMap, HashMap};

use crate::core::buffer::DEFAULT_CHUNK_SIZE;
use crate::core::command::{Assignment, parse_assignment};
use crate::core::error::{Error, ErrorKind};
use crate::core::text::CText;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EmptyKeys {
    #[default]
    Reject,
    Accept,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StoreOptions {
    pub chunk_size: usize,
    pub empty_keys: EmptyKeys,
}

impl StoreOptions {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            empty_keys: EmptyKeys::Reject,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_empty_keys(mut self, empty_keys: EmptyKeys) -> Self {
        self.empty_keys = empty_keys;
        self
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SetOutcome {
    Created,
    Replaced,
}

#[derive(Debug, Default)]
pub struct VariableTable {
    entries: HashMap<String, CText>,
    options: StoreOptions,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::with_options(StoreOptions::new())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            entries: HashMap::new(),
            options,
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Parses `line` and stores the resulting pair, returning the parsed key.
    pub fn assign_line(&mut self, line: &str) -> Result<(String, SetOutcome), Error> {
        let Assignment { key, value } = parse_assignment(line, self.options.chunk_size)?;
        let outcome = self.set(&key, value)?;
        Ok((key, outcome))
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<SetOutcome, Error> {
        self.check_key(key)?;
        let value = CText::new(value).map_err(|err| err.with_key(key))?;
        if let Some(slot) = self.entries.get_mut(key) {
            *slot = value;
            return Ok(SetOutcome::Replaced);
        }
        self.entries.try_reserve(1)?;
        self.entries.insert(key.to_string(), value);
        Ok(SetOutcome::Created)
    }

    pub fn get(&self, key: &str) -> Option<&CText> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), value.as_str().to_string()))
            .collect()
    }

    fn check_key(&self, key: &str) -> Result<(), Error> {
        if key.is_empty() && self.options.empty_keys == EmptyKeys::Reject {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("empty key")
                .with_key(key));
        }
        if key.contains('\0') {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("key contains NUL")
                .with_key(key.replace('\0', "\\0")));
        }
        Ok(())
    }
}

//! Blackboard shared by decision-making structures
//!
//! A string-keyed store of values of any type. States, transitions and
//! behavior tree nodes read and write it instead of holding references to
//! the agent and world directly.

use std::any::{Any, type_name};
use std::fmt;

use rustc_hash::FxHashMap;

struct Entry {
    value: Box<dyn Any>,
    type_name: &'static str,
}

/// Typed key/value store
#[derive(Default)]
pub struct Blackboard {
    data: FxHashMap<String, Entry>,
}

impl Blackboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`BlackboardError::DuplicateKey`] if the key is already in use.
    pub fn add_data<T: Any>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), BlackboardError> {
        let key = key.into();
        if self.data.contains_key(&key) {
            return Err(BlackboardError::DuplicateKey(key));
        }
        self.data.insert(
            key,
            Entry {
                value: Box::new(value),
                type_name: type_name::<T>(),
            },
        );
        Ok(())
    }

    /// Replace the value of an existing entry of the same type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or holds another type.
    pub fn change_data<T: Any>(&mut self, key: &str, value: T) -> Result<(), BlackboardError> {
        *self.get_data_mut::<T>(key)? = value;
        Ok(())
    }

    /// Read an entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or holds another type.
    pub fn get_data<T: Any>(&self, key: &str) -> Result<&T, BlackboardError> {
        let entry = self
            .data
            .get(key)
            .ok_or_else(|| BlackboardError::MissingKey(key.to_string()))?;
        entry
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| BlackboardError::TypeMismatch {
                key: key.to_string(),
                stored: entry.type_name,
                requested: type_name::<T>(),
            })
    }

    /// Mutable access to an entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or holds another type.
    pub fn get_data_mut<T: Any>(&mut self, key: &str) -> Result<&mut T, BlackboardError> {
        let entry = self
            .data
            .get_mut(key)
            .ok_or_else(|| BlackboardError::MissingKey(key.to_string()))?;
        let stored = entry.type_name;
        entry
            .value
            .downcast_mut::<T>()
            .ok_or_else(|| BlackboardError::TypeMismatch {
                key: key.to_string(),
                stored,
                requested: type_name::<T>(),
            })
    }

    /// Remove an entry, returning whether it existed
    pub fn remove_data(&mut self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.data.iter().map(|(key, entry)| (key, entry.type_name)))
            .finish()
    }
}

/// Errors from blackboard access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlackboardError {
    /// No entry under this key
    MissingKey(String),
    /// An entry already uses this key
    DuplicateKey(String),
    /// The entry holds a different type
    TypeMismatch {
        key: String,
        stored: &'static str,
        requested: &'static str,
    },
}

impl fmt::Display for BlackboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey(key) => write!(f, "No blackboard entry '{key}'"),
            Self::DuplicateKey(key) => write!(f, "Blackboard entry '{key}' already exists"),
            Self::TypeMismatch {
                key,
                stored,
                requested,
            } => write!(
                f,
                "Blackboard entry '{key}' holds {stored}, not {requested}"
            ),
        }
    }
}

impl std::error::Error for BlackboardError {}

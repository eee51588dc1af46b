use std::{
    any::{type_name, Any},
    collections::HashMap,
};

use crate::{Error, Result};

struct SideEntry {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl SideEntry {
    fn new<T: Any + Send>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }
}

impl std::fmt::Debug for SideEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Heterogeneous, string-keyed storage through which cooperating handlers share data.
///
/// Keys are namespaced by convention, e.g. `OMI_physics_shape/shapes`. Each consumer names the
/// type it expects; asking for the wrong type is an error from
/// [get_or_create](Self::get_or_create) and an absence from [try_get](Self::try_get).
#[derive(Debug, Default)]
pub struct SideChannel {
    entries: HashMap<String, SideEntry>,
}

impl SideChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value under `key`, first storing `T::default()` there if it's vacant.
    ///
    /// # Errors
    /// * [Error::SideDataType] if `key` holds a value of another type
    pub fn get_or_create<T: Any + Send + Default>(&mut self, key: &str) -> Result<&mut T> {
        let entry = self
            .entries
            .entry(key.to_owned())
            .or_insert_with(|| SideEntry::new(T::default()));
        let found = entry.type_name;
        entry
            .value
            .downcast_mut::<T>()
            .ok_or_else(|| Error::SideDataType {
                key: key.to_owned(),
                expected: type_name::<T>(),
                found,
            })
    }

    /// The value under `key`, if there is one and it's a `T`.
    pub fn try_get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.value.downcast_ref()
    }

    pub fn try_get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)?.value.downcast_mut()
    }

    /// Store `value` under `key`, replacing whatever was there.
    pub fn insert<T: Any + Send>(&mut self, key: &str, value: T) {
        self.entries.insert(key.to_owned(), SideEntry::new(value));
    }

    /// Remove & return the value under `key` if it's a `T`; values of other types are left alone.
    pub fn take<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.entries.get(key)?.value.is::<T>() {
            return None;
        }
        let entry = self.entries.remove(key)?;
        entry.value.downcast::<T>().ok().map(|b| *b)
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

use bimap::BiHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::utils::is_name_valid;

/// Errors reported when interning identifiers
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum NameError {
	#[error("Invalid identifier name")]
	InvalidName,
}

/// Opaque key type for an interned identifier.
///
/// Has stable hash and equality for the lifetime of the owning NameTable.
#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Name {
	key: usize,
}

/// Identifier interner - used to avoid storing and comparing strings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NameTable {
	names: BiHashMap<String, Name>,
}

impl NameTable {
	/// Creates a new name table
	pub fn new() -> NameTable {
		NameTable {
			names: BiHashMap::<String, Name>::new(),
		}
	}

	/// Checks if given identifier is known
	pub fn contains_name(&self, name: &str) -> bool {
		self.get_by_name(name).is_some()
	}

	/// Checks if key is known
	pub fn contains_key(&self, key: &Name) -> bool {
		self.get_by_key(key).is_some()
	}

	/// Gets identifier string by key (or None)
	pub fn get_by_key(&self, key: &Name) -> Option<&String> {
		self.names.get_by_right(key)
	}

	/// Gets key by identifier string (or None)
	pub fn get_by_name(&self, name: &str) -> Option<Name> {
		self.names.get_by_left(name).copied()
	}

	/// Interns a new identifier or returns the key for it
	pub fn intern(&mut self, name: &str) -> Result<Name, NameError> {
		if !is_name_valid(name) {
			return Err(NameError::InvalidName);
		}

		match self.get_by_name(name) {
			Some(id) => Ok(id),
			None => {
				let new_id = Name { key: self.names.len() };
				match self.names.insert(String::from(name), new_id) {
					bimap::Overwritten::Neither => Ok(new_id),
					_ => panic!("Name table key integrity loss!"),
				}
			},
		}
	}

	/// Gets identifier string by key. Panics if key is not present
	pub fn get_value(&self, key: &Name) -> &String {
		self.get_by_key(key).unwrap()
	}
}

impl Default for NameTable {
	fn default() -> Self {
		Self::new()
	}
}

impl IntoIterator for NameTable {
	type Item = <BiHashMap<String, Name> as IntoIterator>::Item;
	type IntoIter = <BiHashMap<String, Name> as IntoIterator>::IntoIter;
	fn into_iter(self) -> Self::IntoIter {
		self.names.into_iter()
	}
}

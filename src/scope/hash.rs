use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::core::Name;

use super::EntryId;

/// Number of entries a scope may hold before a hash index is built.
/// Below this linear chain scans are cheaper than maintaining buckets.
pub(super) const MIN_HASHED_SCOPE_SIZE: usize = 12;

/// Smallest bucket table ever allocated. Must be a power of two so the
/// bucket index is a bit-mask of the name hash.
pub(super) const MIN_BUCKETS: usize = 16;

/// Checks the 2/3 fill-factor trigger for (re)building a bucket table
pub(super) fn needs_growth(count: usize, bucket_count: usize) -> bool {
	3 * count >= 2 * bucket_count
}

fn name_hash(name: Name) -> usize {
	let mut hasher = DefaultHasher::new();
	name.hash(&mut hasher);
	hasher.finish() as usize
}

/// Power-of-two bucket table over entry ids.
///
/// Each bucket stores ids oldest-first; scans walk them in reverse so the
/// most recently entered binding for a name is found first. Buckets are
/// owned by one scope and never shared, so indexing entries inherited from
/// an outer scope writes nothing into those entries.
#[derive(Clone, Debug)]
pub(super) struct HashBuckets {
	buckets: Vec<Vec<EntryId>>,
}

impl HashBuckets {
	pub(super) fn new(bucket_count: usize) -> Self {
		debug_assert!(bucket_count.is_power_of_two());
		Self {
			buckets: vec![Vec::new(); bucket_count],
		}
	}

	pub(super) fn bucket_count(&self) -> usize {
		self.buckets.len()
	}

	fn index_of(&self, name: Name) -> usize {
		name_hash(name) & (self.buckets.len() - 1)
	}

	/// Appends an entry to its name's bucket
	pub(super) fn insert(&mut self, name: Name, entry: EntryId) {
		let index = self.index_of(name);
		self.buckets[index].push(entry);
	}

	/// Splices an entry out of its name's bucket
	pub(super) fn remove(&mut self, name: Name, entry: EntryId) {
		let index = self.index_of(name);
		self.buckets[index].retain(|&e| e != entry);
	}

	/// Returns the bucket an entry for this name would live in
	pub(super) fn bucket(&self, name: Name) -> &[EntryId] {
		&self.buckets[self.index_of(name)]
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::core::NameTable;

	#[test]
	fn fill_factor_trigger() {
		// virtual 12-slot capacity fills at 8 entries
		assert!(!needs_growth(7, MIN_HASHED_SCOPE_SIZE));
		assert!(needs_growth(8, MIN_HASHED_SCOPE_SIZE));
		// a real 16-bucket table grows at 11
		assert!(!needs_growth(10, MIN_BUCKETS));
		assert!(needs_growth(11, MIN_BUCKETS));
	}

	#[test]
	fn insert_remove_roundtrip() {
		let mut table = NameTable::new();
		let name = table.intern("foo").unwrap();
		let mut buckets = HashBuckets::new(MIN_BUCKETS);

		let first = EntryId::new(0);
		let second = EntryId::new(1);
		buckets.insert(name, first);
		buckets.insert(name, second);
		assert_eq!(buckets.bucket(name), &[first, second]);

		buckets.remove(name, first);
		assert_eq!(buckets.bucket(name), &[second]);
	}
}

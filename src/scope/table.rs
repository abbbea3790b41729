use log::{debug, trace};

use crate::core::{Name, Symbol};

use super::entry::Entry;
use super::hash::{needs_growth, HashBuckets, MIN_BUCKETS, MIN_HASHED_SCOPE_SIZE};
use super::scope_error::ScopeError;
use super::{EntryId, ScopeId};

/// The shared terminal scope every table is created with
pub(super) const EMPTY_SCOPE: ScopeId = ScopeId::new(0);

#[derive(Clone, Debug)]
pub(super) enum ScopeKind {
	/// Immutable terminal scope - the base case all top-level scopes nest under
	Empty,

	/// The general growable case
	Mutable,

	/// Mutable scope attached to a declaration whose elaboration failed
	Error { owner: Symbol },
}

/// One scope record in the arena
#[derive(Clone, Debug)]
pub(super) struct ScopeData {
	kind: ScopeKind,
	last_entry: Option<EntryId>,
	count: usize,
	nesting_level: usize,
	buckets: Option<HashBuckets>,
	local_cache: Option<Vec<EntryId>>,
}

impl ScopeData {
	fn empty() -> Self {
		Self::with_chain(ScopeKind::Empty, None, 0, 0)
	}

	fn with_chain(kind: ScopeKind, last_entry: Option<EntryId>, count: usize, nesting_level: usize) -> Self {
		Self {
			kind,
			last_entry,
			count,
			nesting_level,
			buckets: None,
			local_cache: None,
		}
	}
}

/// Core part of the symbol table - all scopes and entries of one
/// compilation unit live in these arenas and are addressed by id.
/// Referred to via handles, see the handle module.
#[derive(Debug)]
pub(super) struct SymbolTableCore {
	scopes: Vec<ScopeData>,
	entries: Vec<Entry>,
}

impl SymbolTableCore {
	/// Creates a new core holding only the empty scope
	pub(super) fn new() -> Self {
		Self {
			scopes: vec![ScopeData::empty()],
			entries: Vec::new(),
		}
	}

	fn scope(&self, scope: ScopeId) -> Result<&ScopeData, ScopeError> {
		self.scopes.get(scope.index()).ok_or(ScopeError::InvalidScopeId(scope))
	}

	/// Returns the entry with the given ID
	pub(super) fn entry(&self, entry: EntryId) -> Result<&Entry, ScopeError> {
		self.entries.get(entry.index()).ok_or(ScopeError::InvalidEntryId(entry))
	}

	fn push_scope(&mut self, data: ScopeData) -> ScopeId {
		let id = ScopeId::new(self.scopes.len());
		self.scopes.push(data);
		id
	}

	/// Creates a new top-level mutable scope
	pub(super) fn new_scope(&mut self) -> ScopeId {
		self.push_scope(ScopeData::with_chain(ScopeKind::Mutable, None, 0, 0))
	}

	/// Creates a scope inheriting everything currently visible in `outer`.
	///
	/// No entry is copied - the new scope's chain starts at the outer
	/// scope's current last entry and only grows on top of it.
	pub(super) fn nested_scope(&mut self, outer: ScopeId) -> Result<ScopeId, ScopeError> {
		let outer_data = self.scope(outer)?;
		let data = ScopeData::with_chain(
			ScopeKind::Mutable,
			outer_data.last_entry,
			outer_data.count,
			outer_data.nesting_level + 1,
		);
		let id = self.push_scope(data);

		// a scope nested over a large outer scope starts hashed right away
		self.ensure_capacity(id);
		Ok(id)
	}

	/// Creates a mutable scope tagged with the declaration that failed
	pub(super) fn error_scope(&mut self, owner: Symbol) -> ScopeId {
		self.push_scope(ScopeData::with_chain(ScopeKind::Error { owner }, None, 0, 0))
	}

	/// Creates a scope pre-populated from an ordered sequence of symbols
	pub(super) fn scope_with(&mut self, symbols: Vec<Symbol>) -> Result<ScopeId, ScopeError> {
		let id = self.new_scope();
		for symbol in symbols {
			self.enter(id, symbol)?;
		}
		Ok(id)
	}

	/// Creates a fresh scope containing this scope's local symbols,
	/// re-entered in order. Severs sharing with any outer scope.
	pub(super) fn clone_scope(&mut self, scope: ScopeId) -> Result<ScopeId, ScopeError> {
		self.scope(scope)?;
		let symbols = self.local_symbols(scope);
		self.scope_with(symbols)
	}

	/// Returns the symbol attached to the scope by error recovery, if any
	pub(super) fn error_owner(&self, scope: ScopeId) -> Option<Symbol> {
		match self.scopes[scope.index()].kind {
			ScopeKind::Error { owner } => Some(owner),
			_ => None,
		}
	}

	/// Number of symbols visible in the scope, including inherited ones
	pub(super) fn count(&self, scope: ScopeId) -> usize {
		self.scopes[scope.index()].count
	}

	/// Number of outer scopes whose symbols are inherited
	pub(super) fn nesting_level(&self, scope: ScopeId) -> usize {
		self.scopes[scope.index()].nesting_level
	}

	/// Enters a symbol into the scope.
	///
	/// Duplicate names are tolerated for term symbols (overloading), but a
	/// type symbol whose name already resolves in the scope is a caller
	/// defect and is rejected.
	pub(super) fn enter(&mut self, scope: ScopeId, symbol: Symbol) -> Result<EntryId, ScopeError> {
		match self.scope(scope)?.kind {
			ScopeKind::Empty => return Err(ScopeError::EmptyScopeImmutable),
			_ => {},
		}

		if symbol.is_type() {
			if let Some(existing) = self.lookup_first(scope, symbol.name()) {
				return Err(ScopeError::TypeNameConflict {
					scope,
					first: self.entries[existing.index()].symbol(),
					second: symbol,
				});
			}
		}

		self.ensure_capacity(scope);

		let id = EntryId::new(self.entries.len());
		let prev = self.scopes[scope.index()].last_entry;
		self.entries.push(Entry::new(symbol, scope, prev));

		let data = &mut self.scopes[scope.index()];
		data.last_entry = Some(id);
		data.count += 1;
		if let Some(buckets) = &mut data.buckets {
			buckets.insert(symbol.name(), id);
		}
		data.local_cache = None;

		trace!("Entered entry {:?} into scope {:?}", id, scope);
		Ok(id)
	}

	/// Enters a symbol, requiring that its name does not resolve yet
	pub(super) fn enter_unique(&mut self, scope: ScopeId, symbol: Symbol) -> Result<EntryId, ScopeError> {
		if let Some(existing) = self.lookup_first(scope, symbol.name()) {
			return Err(ScopeError::DuplicateName {
				scope,
				first: self.entries[existing.index()].symbol(),
				second: symbol,
			});
		}
		self.enter(scope, symbol)
	}

	/// Builds or grows the bucket table once the 2/3 fill factor is hit.
	/// While no table exists the scope has a virtual capacity of
	/// MIN_HASHED_SCOPE_SIZE, so small scopes stay on linear scans.
	fn ensure_capacity(&mut self, scope: ScopeId) {
		let data = &self.scopes[scope.index()];
		let bucket_count = match &data.buckets {
			Some(buckets) => buckets.bucket_count(),
			None => MIN_HASHED_SCOPE_SIZE,
		};

		if needs_growth(data.count, bucket_count) {
			let target = match &data.buckets {
				Some(buckets) => buckets.bucket_count() * 2,
				None => MIN_BUCKETS,
			};
			self.create_hash(scope, target);
		}
	}

	fn create_hash(&mut self, scope: ScopeId, bucket_count: usize) {
		let count = self.scopes[scope.index()].count;
		let mut bucket_count = bucket_count;
		while needs_growth(count, bucket_count) {
			bucket_count *= 2;
		}

		// Collect the reachable chain into a buffer - newest first - so
		// buckets can be filled oldest-first without recursing over it.
		let mut reachable = Vec::with_capacity(count);
		let mut cursor = self.scopes[scope.index()].last_entry;
		while let Some(id) = cursor {
			reachable.push(id);
			cursor = self.entries[id.index()].chain_prev();
		}

		let mut buckets = HashBuckets::new(bucket_count);
		for &id in reachable.iter().rev() {
			buckets.insert(self.entries[id.index()].symbol().name(), id);
		}

		debug!(
			"Built {} bucket index for scope {:?} ({} reachable entries)",
			bucket_count, scope, count
		);
		self.scopes[scope.index()].buckets = Some(buckets);
	}

	fn lookup_in_chain(&self, from: Option<EntryId>, name: Name) -> Option<EntryId> {
		let mut cursor = from;
		while let Some(id) = cursor {
			let entry = &self.entries[id.index()];
			if entry.symbol().name() == name {
				return Some(id);
			}
			cursor = entry.chain_prev();
		}
		None
	}

	/// Finds the most recently entered binding for a name, searching
	/// this scope before any outer scope it inherits from
	pub(super) fn lookup_first(&self, scope: ScopeId, name: Name) -> Option<EntryId> {
		let data = self.scopes.get(scope.index())?;
		match &data.buckets {
			// name filter skips accidental hash collisions in the bucket
			Some(buckets) => buckets
				.bucket(name)
				.iter()
				.rev()
				.copied()
				.find(|&id| self.entries[id.index()].symbol().name() == name),
			None => self.lookup_in_chain(data.last_entry, name),
		}
	}

	/// Continues a lookup past the given entry, in whichever chain the
	/// scope currently resolves names through
	pub(super) fn lookup_next(&self, scope: ScopeId, entry: EntryId) -> Option<EntryId> {
		let data = self.scopes.get(scope.index())?;
		let name = self.entries.get(entry.index())?.symbol().name();
		match &data.buckets {
			Some(buckets) => {
				let bucket = buckets.bucket(name);
				let position = bucket.iter().rposition(|&id| id == entry)?;
				bucket[..position]
					.iter()
					.rev()
					.copied()
					.find(|&id| self.entries[id.index()].symbol().name() == name)
			},
			None => self.lookup_in_chain(self.entries[entry.index()].chain_prev(), name),
		}
	}

	/// Returns the first symbol the name resolves to
	pub(super) fn lookup(&self, scope: ScopeId, name: Name) -> Option<Symbol> {
		self.lookup_first(scope, name)
			.map(|id| self.entries[id.index()].symbol())
	}

	/// Splices an entry out of the scope's chain and bucket.
	///
	/// The entry must be owned by the scope and still linked - anything
	/// else is a defect in the caller and is reported, never tolerated.
	pub(super) fn unlink(&mut self, scope: ScopeId, entry: EntryId) -> Result<(), ScopeError> {
		self.scope(scope)?;
		let e = self.entry(entry)?;
		if e.owner() != scope {
			return Err(ScopeError::ForeignEntry {
				scope,
				owner: e.owner(),
			});
		}
		if !e.is_linked() {
			return Err(ScopeError::EntryNotLinked(entry));
		}

		let prev = e.chain_prev();
		let name = e.symbol().name();

		if self.scopes[scope.index()].last_entry == Some(entry) {
			self.scopes[scope.index()].last_entry = prev;
		}
		else {
			// find the successor whose chain link points at the entry
			let mut cursor = self.scopes[scope.index()].last_entry;
			let mut successor = None;
			while let Some(id) = cursor {
				if self.entries[id.index()].chain_prev() == Some(entry) {
					successor = Some(id);
					break;
				}
				cursor = self.entries[id.index()].chain_prev();
			}
			match successor {
				Some(id) => self.entries[id.index()].set_chain_prev(prev),
				None => return Err(ScopeError::EntryNotLinked(entry)),
			}
		}

		let data = &mut self.scopes[scope.index()];
		if let Some(buckets) = &mut data.buckets {
			buckets.remove(name, entry);
		}
		data.count -= 1;
		data.local_cache = None;
		self.entries[entry.index()].retire();

		trace!("Unlinked entry {:?} from scope {:?}", entry, scope);
		Ok(())
	}

	/// Unlinks every entry of this scope bound to the given symbol.
	/// Entries inherited from outer scopes are left untouched - they can
	/// only be retracted through the scope that owns them.
	pub(super) fn unlink_symbol(&mut self, scope: ScopeId, symbol: Symbol) -> Result<(), ScopeError> {
		self.scope(scope)?;

		// collect first - unlinking splices the chain under the walk
		let mut matches = Vec::new();
		let mut cursor = self.scopes[scope.index()].last_entry;
		while let Some(id) = cursor {
			let entry = &self.entries[id.index()];
			if entry.owner() == scope && entry.symbol() == symbol {
				matches.push(id);
			}
			cursor = entry.chain_prev();
		}

		for id in matches {
			self.unlink(scope, id)?;
		}
		Ok(())
	}

	/// Entries created by this scope itself, oldest first. Memoized until
	/// the next mutation of the scope.
	pub(super) fn local_entries(&mut self, scope: ScopeId) -> Vec<EntryId> {
		if let Some(cache) = &self.scopes[scope.index()].local_cache {
			return cache.clone();
		}

		let mut locals = Vec::new();
		let mut cursor = self.scopes[scope.index()].last_entry;
		while let Some(id) = cursor {
			let entry = &self.entries[id.index()];
			if entry.owner() != scope {
				// depth boundary - everything below belongs to outer scopes
				break;
			}
			locals.push(id);
			cursor = entry.chain_prev();
		}
		locals.reverse();

		self.scopes[scope.index()].local_cache = Some(locals.clone());
		locals
	}

	/// Locally declared symbols in insertion order
	pub(super) fn local_symbols(&mut self, scope: ScopeId) -> Vec<Symbol> {
		self.local_entries(scope)
			.iter()
			.map(|&id| self.entries[id.index()].symbol())
			.collect()
	}
}

use crate::core::Symbol;

use super::ScopeId;

/// References an entry in a symbol table
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub struct EntryId {
	id: usize,
}

impl EntryId {
	pub(crate) const fn new(id: usize) -> Self {
		Self { id }
	}

	pub(crate) fn index(self) -> usize {
		self.id
	}
}

/// A single binding record in a scope's insertion chain.
///
/// Entries are created only by entering a symbol and spliced out only by
/// the owning scope's unlink operations. An unlinked entry's slot is
/// retired and never reused.
#[derive(Clone, Debug)]
pub struct Entry {
	symbol: Symbol,
	owner: ScopeId,
	chain_prev: Option<EntryId>,
	linked: bool,
}

impl Entry {
	pub(super) fn new(symbol: Symbol, owner: ScopeId, chain_prev: Option<EntryId>) -> Self {
		Self {
			symbol,
			owner,
			chain_prev,
			linked: true,
		}
	}

	/// Returns the symbol this entry binds
	pub fn symbol(&self) -> Symbol {
		self.symbol
	}

	/// Returns the scope that created this entry. Never changes.
	pub fn owner(&self) -> ScopeId {
		self.owner
	}

	/// Returns the entry inserted immediately before this one.
	/// May point into an outer scope once nesting is used.
	pub fn chain_prev(&self) -> Option<EntryId> {
		self.chain_prev
	}

	/// Checks if the entry is still part of its scope's chain
	pub fn is_linked(&self) -> bool {
		self.linked
	}

	pub(super) fn set_chain_prev(&mut self, prev: Option<EntryId>) {
		self.chain_prev = prev;
	}

	pub(super) fn retire(&mut self) {
		self.linked = false;
	}
}

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{Name, Symbol};

use super::entry::Entry;
use super::table::{SymbolTableCore, EMPTY_SCOPE};
use super::{EntryId, ScopeError, ScopeId};

/// Shared reference to a symbol table core
type TableHandle = Rc<RefCell<SymbolTableCore>>;

/// Owns every scope and entry of one compilation unit.
///
/// Construction and teardown are tied to whichever compilation phase
/// holds the table - this is never a process-wide singleton.
#[derive(Debug)]
pub struct SymbolTable {
	handle: TableHandle,
}

impl SymbolTable {
	/// Creates a new symbol table holding only the empty scope
	pub fn new() -> Self {
		Self {
			handle: Rc::new(RefCell::new(SymbolTableCore::new())),
		}
	}

	fn scope_handle(&self, scope: ScopeId) -> ScopeHandle {
		ScopeHandle {
			table: self.handle.clone(),
			scope,
		}
	}

	/// Returns the shared immutable terminal scope
	pub fn empty_scope(&self) -> ScopeHandle {
		self.scope_handle(EMPTY_SCOPE)
	}

	/// Creates a new top-level mutable scope
	pub fn new_scope(&mut self) -> ScopeHandle {
		let id = self.handle.borrow_mut().new_scope();
		self.scope_handle(id)
	}

	/// Creates a mutable scope for error recovery, attached to the
	/// declaration whose name resolution failed
	pub fn error_scope(&mut self, owner: Symbol) -> ScopeHandle {
		let id = self.handle.borrow_mut().error_scope(owner);
		self.scope_handle(id)
	}

	/// Creates a scope pre-populated from an ordered sequence of symbols
	pub fn scope_with(&mut self, symbols: impl IntoIterator<Item = Symbol>) -> Result<ScopeHandle, ScopeError> {
		let id = self.handle.borrow_mut().scope_with(symbols.into_iter().collect())?;
		Ok(self.scope_handle(id))
	}
}

impl Default for SymbolTable {
	fn default() -> Self {
		Self::new()
	}
}

/// Handle to one scope in a symbol table
#[derive(Clone, Debug)]
pub struct ScopeHandle {
	table: TableHandle,
	scope: ScopeId,
}

impl ScopeHandle {
	pub fn id(&self) -> ScopeId {
		self.scope
	}

	/// Enters a symbol into this scope.
	///
	/// Duplicate term names are tolerated (overloading); a type symbol
	/// whose name already resolves is rejected.
	pub fn enter(&mut self, symbol: Symbol) -> Result<EntryId, ScopeError> {
		self.table.borrow_mut().enter(self.scope, symbol)
	}

	/// Enters a symbol, requiring that no symbol with the same name is
	/// resolvable in this scope yet
	pub fn enter_unique(&mut self, symbol: Symbol) -> Result<EntryId, ScopeError> {
		self.table.borrow_mut().enter_unique(self.scope, symbol)
	}

	/// Splices an entry of this scope out of its chain and bucket
	pub fn unlink(&mut self, entry: EntryId) -> Result<(), ScopeError> {
		self.table.borrow_mut().unlink(self.scope, entry)
	}

	/// Unlinks every entry of this scope bound to the given symbol
	pub fn unlink_symbol(&mut self, symbol: Symbol) -> Result<(), ScopeError> {
		self.table.borrow_mut().unlink_symbol(self.scope, symbol)
	}

	/// Finds the most recently entered binding for a name, inner scopes
	/// before outer ones
	pub fn lookup_first(&self, name: Name) -> Option<EntryId> {
		self.table.borrow().lookup_first(self.scope, name)
	}

	/// Continues a lookup past the given entry
	pub fn lookup_next(&self, entry: EntryId) -> Option<EntryId> {
		self.table.borrow().lookup_next(self.scope, entry)
	}

	/// Returns the first symbol the name resolves to
	pub fn lookup(&self, name: Name) -> Option<Symbol> {
		self.table.borrow().lookup(self.scope, name)
	}

	/// Returns all symbols the name resolves to, most recently entered
	/// first, as a lazy non-restartable sequence
	pub fn lookup_all(&self, name: Name) -> LookupAll {
		LookupAll {
			table: self.table.clone(),
			scope: self.scope,
			name,
			state: LookupState::Start,
		}
	}

	/// Returns a copy of the entry with the given ID
	pub fn entry(&self, entry: EntryId) -> Option<Entry> {
		self.table.borrow().entry(entry).ok().cloned()
	}

	/// Returns the symbol bound by the given entry
	pub fn symbol(&self, entry: EntryId) -> Option<Symbol> {
		self.table.borrow().entry(entry).ok().map(|e| e.symbol())
	}

	/// Number of symbols visible in this scope, including inherited ones
	pub fn count(&self) -> usize {
		self.table.borrow().count(self.scope)
	}

	pub fn is_empty(&self) -> bool {
		self.count() == 0
	}

	/// Number of outer scopes whose symbols are inherited
	pub fn nesting_level(&self) -> usize {
		self.table.borrow().nesting_level(self.scope)
	}

	/// Symbols declared by this scope itself, in insertion order
	pub fn local_symbols(&self) -> Vec<Symbol> {
		self.table.borrow_mut().local_symbols(self.scope)
	}

	/// Creates a scope nested under this one. The new scope sees every
	/// symbol currently visible here without copying a single entry.
	pub fn nested_scope(&mut self) -> Result<ScopeHandle, ScopeError> {
		let id = self.table.borrow_mut().nested_scope(self.scope)?;
		Ok(ScopeHandle {
			table: self.table.clone(),
			scope: id,
		})
	}

	/// Creates a fresh scope containing this scope's local symbols,
	/// re-entered in order. Severs sharing with any outer scope.
	pub fn clone_scope(&mut self) -> Result<ScopeHandle, ScopeError> {
		let id = self.table.borrow_mut().clone_scope(self.scope)?;
		Ok(ScopeHandle {
			table: self.table.clone(),
			scope: id,
		})
	}

	/// Returns the declaration this scope was attached to by error
	/// recovery, if any
	pub fn error_owner(&self) -> Option<Symbol> {
		self.table.borrow().error_owner(self.scope)
	}
}

#[derive(Clone, Copy, Debug)]
enum LookupState {
	Start,
	At(EntryId),
	Done,
}

/// Lazy, finite, non-restartable sequence over all bindings for one name.
///
/// The sequence reads the live structure - mutating the scope while it is
/// being consumed leaves the remaining items unspecified (never unsafe).
pub struct LookupAll {
	table: TableHandle,
	scope: ScopeId,
	name: Name,
	state: LookupState,
}

impl Iterator for LookupAll {
	type Item = Symbol;

	fn next(&mut self) -> Option<Symbol> {
		let table = self.table.borrow();
		let next = match self.state {
			LookupState::Start => table.lookup_first(self.scope, self.name),
			LookupState::At(entry) => table.lookup_next(self.scope, entry),
			LookupState::Done => None,
		};

		match next {
			Some(entry) => {
				self.state = LookupState::At(entry);
				Some(table.entry(entry).ok()?.symbol())
			},
			None => {
				self.state = LookupState::Done;
				None
			},
		}
	}
}

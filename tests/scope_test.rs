use rstest::*;
use symscope::{NameTable, ScopeError, SourceSpan, Symbol, SymbolKind, SymbolTable};

fn init() {
	let _ = env_logger::builder().is_test(true).try_init();
}

fn term(names: &mut NameTable, name: &str) -> Symbol {
	Symbol::new(names.intern(name).unwrap(), SymbolKind::Term)
}

fn type_sym(names: &mut NameTable, name: &str) -> Symbol {
	Symbol::new(names.intern(name).unwrap(), SymbolKind::Type)
}

#[test]
fn enter_preserves_order_and_count() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut scope = table.new_scope();

	let a = term(&mut names, "a");
	let b = term(&mut names, "b");
	let c = term(&mut names, "c");
	scope.enter(a)?;
	scope.enter(b)?;
	scope.enter(c)?;

	assert_eq!(scope.count(), 3);
	assert!(!scope.is_empty());
	assert_eq!(scope.local_symbols(), vec![a, b, c]);
	Ok(())
}

/// Two same-named term declarations are both kept and collide in
/// declaration order, most recently entered first
#[test]
fn duplicate_term_names_are_overloads() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut scope = table.new_scope();

	let first_a = term(&mut names, "a").with_span(SourceSpan::new(0, 1));
	let b = term(&mut names, "b").with_span(SourceSpan::new(2, 1));
	let second_a = term(&mut names, "a").with_span(SourceSpan::new(4, 1));
	scope.enter(first_a)?;
	scope.enter(b)?;
	scope.enter(second_a)?;

	assert_eq!(scope.count(), 3);
	let all: Vec<_> = scope.lookup_all(first_a.name()).collect();
	assert_eq!(all, vec![second_a, first_a]);
	Ok(())
}

#[test]
fn nested_scope_inherits_without_copying() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut outer = table.new_scope();

	let a = term(&mut names, "a");
	let b = term(&mut names, "b");
	outer.enter(a)?;
	outer.enter(b)?;

	let mut inner = outer.nested_scope()?;
	assert_eq!(inner.count(), outer.count());
	assert_eq!(inner.nesting_level(), 1);

	let c = term(&mut names, "c");
	inner.enter(c)?;

	assert_eq!(inner.count(), 3);
	assert_eq!(outer.count(), 2);
	assert_eq!(inner.local_symbols(), vec![c]);
	assert_eq!(inner.lookup(a.name()), outer.lookup(a.name()));

	let mut innermost = inner.nested_scope()?;
	assert_eq!(innermost.nesting_level(), 2);
	assert_eq!(innermost.count(), 3);
	innermost.enter(term(&mut names, "d"))?;
	assert_eq!(innermost.count(), 4);
	Ok(())
}

/// Shadowing changes what the inner scope resolves, never the outer one
#[test]
fn shadowing_is_local_to_the_inner_scope() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut outer = table.new_scope();

	let outer_a = term(&mut names, "a").with_span(SourceSpan::new(0, 1));
	outer.enter(outer_a)?;

	let mut inner = outer.nested_scope()?;
	assert_eq!(inner.lookup(outer_a.name()), Some(outer_a));

	let inner_a = term(&mut names, "a").with_span(SourceSpan::new(8, 1));
	inner.enter(inner_a)?;

	assert_eq!(inner.lookup(outer_a.name()), Some(inner_a));
	assert_eq!(outer.lookup(outer_a.name()), Some(outer_a));

	let all: Vec<_> = inner.lookup_all(outer_a.name()).collect();
	assert_eq!(all, vec![inner_a, outer_a]);
	Ok(())
}

/// Unlink is the exact inverse of enter
#[test]
fn unlink_restores_the_scope() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut scope = table.new_scope();

	let a = term(&mut names, "a");
	let b = term(&mut names, "b");
	scope.enter(a)?;
	scope.enter(b)?;

	let before_count = scope.count();
	let before_locals = scope.local_symbols();

	let x = term(&mut names, "x");
	let entry = scope.enter(x)?;
	assert_eq!(scope.count(), before_count + 1);

	scope.unlink(entry)?;
	assert_eq!(scope.count(), before_count);
	assert_eq!(scope.local_symbols(), before_locals);
	assert_eq!(scope.lookup_first(x.name()), None);

	// a retired entry cannot be unlinked again
	assert!(matches!(scope.unlink(entry), Err(ScopeError::EntryNotLinked(..))));
	Ok(())
}

#[test]
fn unlink_in_the_middle_of_the_chain() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut scope = table.new_scope();

	let a = term(&mut names, "a");
	let b = term(&mut names, "b");
	let c = term(&mut names, "c");
	scope.enter(a)?;
	let middle = scope.enter(b)?;
	scope.enter(c)?;

	scope.unlink(middle)?;
	assert_eq!(scope.count(), 2);
	assert_eq!(scope.local_symbols(), vec![a, c]);
	assert_eq!(scope.lookup(b.name()), None);
	assert_eq!(scope.lookup(a.name()), Some(a));
	assert_eq!(scope.lookup(c.name()), Some(c));
	Ok(())
}

/// Unlinking through a scope that does not own the entry is a reported
/// fault, never a silent no-op
#[test]
fn foreign_unlink_fails_fast() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut owner_scope = table.new_scope();

	let a = term(&mut names, "a");
	let entry = owner_scope.enter(a)?;

	let mut unrelated = table.new_scope();
	assert!(matches!(
		unrelated.unlink(entry),
		Err(ScopeError::ForeignEntry { .. })
	));

	// inherited entries can only be retracted through their owner
	let mut inner = owner_scope.nested_scope()?;
	assert_eq!(inner.lookup(a.name()), Some(a));
	assert!(matches!(inner.unlink(entry), Err(ScopeError::ForeignEntry { .. })));

	// the entry survived both attempts
	assert_eq!(owner_scope.lookup_first(a.name()), Some(entry));
	Ok(())
}

/// Lookup results do not depend on whether the scope has crossed the
/// hash threshold yet
#[rstest]
#[case(4)]
#[case(7)]
#[case(8)]
#[case(13)]
#[case(20)]
#[case(50)]
fn lookup_is_independent_of_hashing(#[case] total: usize) -> Result<(), ScopeError> {
	init();
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut scope = table.new_scope();

	let mut entered = Vec::new();
	for i in 0..total {
		let symbol = term(&mut names, &format!("sym_{}", i));
		let entry = scope.enter(symbol)?;
		entered.push((symbol, entry));
	}

	assert_eq!(scope.count(), total);
	for (symbol, entry) in entered {
		assert_eq!(scope.lookup_first(symbol.name()), Some(entry));
		assert_eq!(scope.lookup(symbol.name()), Some(symbol));
	}
	Ok(())
}

#[test]
fn enter_unique_rejects_resolvable_names() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut scope = table.new_scope();

	let a = term(&mut names, "a").with_span(SourceSpan::new(0, 1));
	scope.enter_unique(a)?;

	let second = term(&mut names, "a").with_span(SourceSpan::new(5, 1));
	assert!(matches!(
		scope.enter_unique(second),
		Err(ScopeError::DuplicateName { .. })
	));
	assert_eq!(scope.count(), 1);

	// the plain path still accepts the term overload
	scope.enter(second)?;
	assert_eq!(scope.count(), 2);
	Ok(())
}

/// Term overloading is allowed, type overloading is not
#[test]
fn type_names_cannot_conflict() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut scope = table.new_scope();

	let value = term(&mut names, "thing");
	scope.enter(value)?;

	let shadowing_type = type_sym(&mut names, "thing");
	assert!(matches!(
		scope.enter(shadowing_type),
		Err(ScopeError::TypeNameConflict { .. })
	));

	// a term may still overload an existing type name
	let ty = type_sym(&mut names, "T");
	scope.enter(ty)?;
	scope.enter(term(&mut names, "T"))?;

	// the check sees inherited names too
	let mut inner = scope.nested_scope()?;
	assert!(matches!(
		inner.enter(type_sym(&mut names, "thing")),
		Err(ScopeError::TypeNameConflict { .. })
	));
	Ok(())
}

#[test]
fn empty_scope_is_terminal_and_immutable() {
	let mut names = NameTable::new();
	let table = SymbolTable::new();
	let mut empty = table.empty_scope();

	assert_eq!(empty.count(), 0);
	assert!(empty.is_empty());
	assert_eq!(empty.nesting_level(), 0);
	assert_eq!(empty.local_symbols(), vec![]);

	let a = term(&mut names, "a");
	assert_eq!(empty.lookup_first(a.name()), None);
	assert_eq!(empty.lookup_all(a.name()).count(), 0);
	assert!(matches!(empty.enter(a), Err(ScopeError::EmptyScopeImmutable)));
}

#[test]
fn clone_scope_severs_sharing() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut outer = table.new_scope();

	let a = term(&mut names, "a");
	let b = term(&mut names, "b");
	outer.enter(a)?;
	outer.enter(b)?;

	let mut inner = outer.nested_scope()?;
	let c = term(&mut names, "c");
	inner.enter(c)?;

	let copy = inner.clone_scope()?;
	assert_eq!(copy.count(), 1);
	assert_eq!(copy.nesting_level(), 0);
	assert_eq!(copy.local_symbols(), vec![c]);
	assert_eq!(copy.lookup(a.name()), None);

	// later mutation of the original is invisible to the copy
	inner.enter(term(&mut names, "d"))?;
	assert_eq!(copy.count(), 1);
	assert_eq!(copy.lookup(names.intern("d")?), None);
	Ok(())
}

#[test]
fn scope_with_enters_in_sequence_order() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();

	let a = term(&mut names, "a");
	let b = term(&mut names, "b");
	let c = term(&mut names, "c");
	let scope = table.scope_with([a, b, c])?;

	assert_eq!(scope.count(), 3);
	assert_eq!(scope.local_symbols(), vec![a, b, c]);
	assert_eq!(scope.lookup(b.name()), Some(b));
	Ok(())
}

#[test]
fn unlink_symbol_removes_every_binding() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut scope = table.new_scope();

	let a = term(&mut names, "a");
	let b = term(&mut names, "b");
	scope.enter(a)?;
	scope.enter(b)?;
	scope.enter(a)?;

	scope.unlink_symbol(a)?;
	assert_eq!(scope.count(), 1);
	assert_eq!(scope.local_symbols(), vec![b]);
	assert_eq!(scope.lookup(a.name()), None);
	Ok(())
}

/// unlink_symbol never reaches across the nesting boundary
#[test]
fn unlink_symbol_spares_inherited_bindings() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut outer = table.new_scope();

	let a = term(&mut names, "a");
	outer.enter(a)?;

	let mut inner = outer.nested_scope()?;
	inner.enter(a)?;
	assert_eq!(inner.count(), 2);

	inner.unlink_symbol(a)?;
	assert_eq!(inner.count(), 1);
	assert_eq!(inner.lookup(a.name()), Some(a));
	assert_eq!(outer.count(), 1);
	Ok(())
}

#[test]
fn error_scope_behaves_like_a_mutable_scope() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();

	let broken = term(&mut names, "broken_decl");
	let mut scope = table.error_scope(broken);
	assert_eq!(scope.error_owner(), Some(broken));

	let a = term(&mut names, "a");
	let entry = scope.enter(a)?;
	assert_eq!(scope.lookup_first(a.name()), Some(entry));
	scope.unlink(entry)?;
	assert!(scope.is_empty());

	let plain = table.new_scope();
	assert_eq!(plain.error_owner(), None);
	Ok(())
}

/// Overload enumeration walks inner bindings before outer ones, in both
/// the hashed and unhashed representation
#[test]
fn lookup_all_walks_inner_before_outer() -> Result<(), ScopeError> {
	init();
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut outer = table.new_scope();

	// enough filler that the nested scope starts out hashed
	for i in 0..10 {
		outer.enter(term(&mut names, &format!("filler_{}", i)))?;
	}
	let f1 = term(&mut names, "f").with_span(SourceSpan::new(0, 1));
	let f2 = term(&mut names, "f").with_span(SourceSpan::new(2, 1));
	outer.enter(f1)?;
	outer.enter(f2)?;

	let mut inner = outer.nested_scope()?;
	let f3 = term(&mut names, "f").with_span(SourceSpan::new(4, 1));
	inner.enter(f3)?;

	let from_inner: Vec<_> = inner.lookup_all(f1.name()).collect();
	assert_eq!(from_inner, vec![f3, f2, f1]);

	let from_outer: Vec<_> = outer.lookup_all(f1.name()).collect();
	assert_eq!(from_outer, vec![f2, f1]);
	Ok(())
}

#[test]
fn lookup_next_steps_through_overloads() -> Result<(), ScopeError> {
	let mut names = NameTable::new();
	let mut table = SymbolTable::new();
	let mut scope = table.new_scope();

	let f1 = term(&mut names, "f").with_span(SourceSpan::new(0, 1));
	let f2 = term(&mut names, "f").with_span(SourceSpan::new(2, 1));
	let first_entry = scope.enter(f1)?;
	let second_entry = scope.enter(f2)?;
	scope.enter(term(&mut names, "unrelated"))?;

	assert_eq!(scope.lookup_first(f1.name()), Some(second_entry));
	assert_eq!(scope.lookup_next(second_entry), Some(first_entry));
	assert_eq!(scope.lookup_next(first_entry), None);

	assert_eq!(scope.symbol(second_entry), Some(f2));
	assert_eq!(scope.symbol(first_entry), Some(f1));

	let entry = scope.entry(first_entry).unwrap();
	assert_eq!(entry.owner(), scope.id());
	assert_eq!(entry.symbol(), f1);
	assert!(entry.is_linked());
	Ok(())
}

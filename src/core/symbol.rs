use serde::{Deserialize, Serialize};

use super::{Name, SourceSpan};

/// Classifies a declaration as term-level or type-level.
///
/// Duplicate-name rules differ between the two kinds - see scope entering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
	Term,
	Type,
}

/// A named declaration as seen by the scope structure.
///
/// The scope machinery only relies on the name, the kind and equality;
/// everything else a compiler attaches to its symbols lives elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
	name: Name,
	kind: SymbolKind,
	span: Option<SourceSpan>,
}

impl Symbol {
	/// Creates a new symbol without a declaration site
	pub fn new(name: Name, kind: SymbolKind) -> Symbol {
		Symbol {
			name,
			kind,
			span: None,
		}
	}

	/// Attaches the declaration site
	pub fn with_span(mut self, span: SourceSpan) -> Symbol {
		self.span = Some(span);
		self
	}

	/// Returns the symbol's name key
	pub fn name(&self) -> Name {
		self.name
	}

	/// Returns the symbol's kind
	pub fn kind(&self) -> SymbolKind {
		self.kind
	}

	/// Checks if this is a type-level declaration
	pub fn is_type(&self) -> bool {
		self.kind == SymbolKind::Type
	}

	/// Returns the declaration site if known
	pub fn span(&self) -> Option<SourceSpan> {
		self.span
	}
}

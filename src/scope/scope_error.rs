use thiserror::Error;

use crate::core::name_table::NameError;
use crate::core::{CompilerDiagnostic, CompilerDiagnosticBuilder, ProvidesCompilerDiagnostic, Symbol};

use super::{EntryId, ScopeId};

/// Represents a defect in how a caller used the scope structure.
///
/// Looking up an absent name is not an error - lookups report that case
/// as None. Every variant here indicates a logic error upstream in the
/// compiler and is reported instead of corrupting the chain structure.
#[derive(Clone, Debug, Error)]
pub enum ScopeError {
	#[error("The empty scope cannot be modified")]
	EmptyScopeImmutable,

	#[error("Invalid scope ID")]
	InvalidScopeId(ScopeId),

	#[error("Invalid entry ID")]
	InvalidEntryId(EntryId),

	#[error("Entry is owned by a different scope")]
	ForeignEntry { scope: ScopeId, owner: ScopeId },

	#[error("Entry is no longer linked in its scope")]
	EntryNotLinked(EntryId),

	#[error("Name is already declared in this scope")]
	DuplicateName {
		scope: ScopeId,
		first: Symbol,
		second: Symbol,
	},

	#[error("Type name conflicts with an existing declaration")]
	TypeNameConflict {
		scope: ScopeId,
		first: Symbol,
		second: Symbol,
	},

	#[error(transparent)]
	Name(#[from] NameError),
}

impl ProvidesCompilerDiagnostic for ScopeError {
	fn to_diagnostic(&self) -> CompilerDiagnostic {
		use ScopeError::*;
		match self {
			EmptyScopeImmutable => CompilerDiagnosticBuilder::from_error(self)
				.help("The empty scope is the shared terminal scope. Enter symbols into a mutable scope instead.")
				.build(),
			InvalidScopeId(..) => CompilerDiagnosticBuilder::from_error(self)
				.help("The scope ID does not refer to any scope of this table.")
				.build(),
			InvalidEntryId(..) => CompilerDiagnosticBuilder::from_error(self)
				.help("The entry ID does not refer to any entry of this table.")
				.build(),
			ForeignEntry { .. } => CompilerDiagnosticBuilder::from_error(self)
				.help("Entries must be unlinked through the scope that created them.")
				.build(),
			EntryNotLinked(..) => CompilerDiagnosticBuilder::from_error(self)
				.help("Each entry can be unlinked at most once.")
				.build(),
			DuplicateName { first, second, .. } => {
				let mut diag = CompilerDiagnosticBuilder::from_error(self).help(
					"A unique entry was requested for a name that already resolves. \
					Use the plain entry path if overloading was intended.",
				);
				if let Some(span) = first.span() {
					diag = diag.label(span, "first declared here");
				}
				if let Some(span) = second.span() {
					diag = diag.label(span, "redeclared here");
				}
				diag.build()
			},
			TypeNameConflict { first, second, .. } => {
				let mut diag = CompilerDiagnosticBuilder::from_error(self)
					.help("Type declarations cannot overload a name that already resolves in the scope.");
				if let Some(span) = first.span() {
					diag = diag.label(span, "existing declaration");
				}
				if let Some(span) = second.span() {
					diag = diag.label(span, "conflicting type declaration");
				}
				diag.build()
			},
			Name(..) => CompilerDiagnosticBuilder::from_error(self)
				.help("Symbol names must be valid identifiers.")
				.build(),
		}
	}
}

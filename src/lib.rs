pub mod core;
pub mod scope;

pub use crate::core::CompilerDiagnostic;
pub use crate::core::ProvidesCompilerDiagnostic;
pub use crate::core::{Name, NameTable, SourceSpan, Symbol, SymbolKind};
pub use scope::{Entry, EntryId, LookupAll, ScopeError, ScopeHandle, ScopeId, SymbolTable};

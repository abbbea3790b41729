use crate::SourceSpan;
use miette::{Diagnostic, LabeledSpan, Severity};
use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// A generic compiler diagnostic message
#[derive(Clone, Debug)]
pub struct CompilerDiagnostic {
	severity: Severity,
	error_text: String,
	help_text: Option<String>,
	labels: Vec<LabeledSpan>,
}

impl CompilerDiagnostic {
	/// Creates a new diagnostic message
	fn new(severity: Severity, msg: &str) -> Self {
		Self {
			severity,
			error_text: msg.into(),
			help_text: None,
			labels: Vec::new(),
		}
	}

	/// Creates a new error diagnostic
	pub fn new_error(msg: &str) -> Self {
		Self::new(Severity::Error, msg)
	}

	/// Creates a new warning diagnostic
	pub fn new_warning(msg: &str) -> Self {
		Self::new(Severity::Warning, msg)
	}

	/// Attaches a source code label
	pub fn add_label(&mut self, span: SourceSpan, msg: &str) {
		self.labels.push(LabeledSpan::new_with_span(
			Some(String::from(msg)),
			<SourceSpan as Into<miette::SourceSpan>>::into(span),
		));
	}

	/// Sets the help message
	pub fn set_help(&mut self, help: &str) {
		self.help_text = Some(help.into());
	}
}

/// Used to conveniently craft compiler error messages
/// Note: Builder is single use only. After build() is called it becomes invalid.
pub struct CompilerDiagnosticBuilder {
	diag: Option<CompilerDiagnostic>,
}

impl From<CompilerDiagnostic> for CompilerDiagnosticBuilder {
	fn from(diag: CompilerDiagnostic) -> Self {
		Self { diag: Some(diag) }
	}
}

impl CompilerDiagnosticBuilder {
	/// Creates an error diagnostic from an error type
	pub fn from_error<ErrorType>(err: &ErrorType) -> Self
	where
		ErrorType: Error,
	{
		Self::new_error(&err.to_string())
	}

	/// Creates a new error message
	pub fn new_error(msg: &str) -> Self {
		CompilerDiagnostic::new_error(msg).into()
	}

	/// Creates a new warning message
	pub fn new_warning(msg: &str) -> Self {
		CompilerDiagnostic::new_warning(msg).into()
	}

	/// Adds a source code label
	pub fn label(mut self, span: SourceSpan, msg: &str) -> Self {
		self.diag.as_mut().unwrap().add_label(span, msg);
		self
	}

	/// Attaches a help message
	pub fn help(mut self, help: &str) -> Self {
		self.diag.as_mut().unwrap().set_help(help);
		self
	}

	/// Returns the new diagnostic
	pub fn build(mut self) -> CompilerDiagnostic {
		self.diag.take().unwrap()
	}
}

impl Display for CompilerDiagnostic {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.error_text)
	}
}

impl Error for CompilerDiagnostic {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		None
	}
}

impl Diagnostic for CompilerDiagnostic {
	fn severity(&self) -> Option<Severity> {
		Some(self.severity)
	}

	fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
		match &self.help_text {
			Some(msg) => Some(Box::new(miette::Report::msg(msg.clone()))),
			None => None,
		}
	}

	fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
		Some(Box::new(self.labels.clone().into_iter()))
	}
}

/// Indicates that type can provide a CompilerDiagnostic message.
/// All compiler error types must implement this trait.
pub trait ProvidesCompilerDiagnostic: Into<CompilerDiagnostic> {
	/// Must be implemented by the error type
	fn to_diagnostic(&self) -> CompilerDiagnostic;

	/// Returns a diagnostic message builder - useful when you want to modify the message
	fn to_diagnostic_builder(&self) -> CompilerDiagnosticBuilder {
		self.to_diagnostic().into()
	}

	/// Returns a Miette report
	fn to_miette_report(&self) -> miette::Report {
		miette::Report::new(self.to_diagnostic())
	}
}

/// Implements conversions between CompilerDiagnostic and error types
impl<T> From<T> for CompilerDiagnostic
where
	T: ProvidesCompilerDiagnostic,
{
	fn from(err: T) -> Self {
		err.to_diagnostic()
	}
}

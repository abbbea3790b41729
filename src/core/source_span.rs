use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Indicates a region in the source code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
	offset: usize,
	len: usize,
}

impl SourceSpan {
	/// Creates a new source span from offset and length
	pub fn new(offset: usize, len: usize) -> SourceSpan {
		SourceSpan { offset, len }
	}

	/// Returns offset of the span
	pub fn offset(&self) -> usize {
		self.offset
	}

	/// Returns end of the span
	pub fn end(&self) -> usize {
		self.offset + self.len
	}

	/// Returns length of the span
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}
}

impl From<Range<usize>> for SourceSpan {
	fn from(range: Range<usize>) -> Self {
		SourceSpan::new(range.start, range.end - range.start)
	}
}

impl From<SourceSpan> for miette::SourceSpan {
	fn from(span: SourceSpan) -> Self {
		(span.offset, span.len).into()
	}
}

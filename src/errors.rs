use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

// ResultBoxedError returns a result of a given type or a boxed error, in order
// to encapsulate generic error types without requiring an explicit
// implementation for each error type. The error is `Send + Sync` so that
// per-document results can be collected from parallel iterators.
pub type ResultBoxedError<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ErrorInvalidParameters is associated with malformed scheme configuration:
// zero subkey counts, truncation widths outside the supported range, empty
// filters, or false-positive targets outside (0,1). Surfaced immediately to
// the caller and never retried.
#[derive(Debug)]
pub struct ErrorInvalidParameters {
  details: String,
}

impl ErrorInvalidParameters {
  pub fn new(msg: &str) -> Self {
    Self {
      details: msg.to_string(),
    }
  }
}

impl Display for ErrorInvalidParameters {
  fn fmt(&self, f: &mut Formatter) -> FmtResult {
    write!(f, "Invalid scheme parameters: {}", self.details)
  }
}

impl Error for ErrorInvalidParameters {}

// ErrorUnknownDocument is raised by the direct per-document query API when
// the requested document id has no stored index. A full search never raises
// it: an absent document simply contributes no match.
#[derive(Debug)]
pub struct ErrorUnknownDocument {
  document_id: String,
}

impl ErrorUnknownDocument {
  pub fn new(document_id: &str) -> Self {
    Self {
      document_id: document_id.to_string(),
    }
  }
}

impl Display for ErrorUnknownDocument {
  fn fmt(&self, f: &mut Formatter) -> FmtResult {
    write!(f, "No index stored for document id: {}", self.document_id)
  }
}

impl Error for ErrorUnknownDocument {}

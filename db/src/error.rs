use std::{fmt, io};
use storage;

/// Database errors.
#[derive(Debug)]
pub enum Error {
	/// File could not be opened, mapped or extended.
	Io(io::Error),
	/// On-disk state does not describe a valid database.
	InconsistentState(&'static str),
}

impl From<io::Error> for Error {
	fn from(err: io::Error) -> Self {
		Error::Io(err)
	}
}

impl From<Error> for storage::Error {
	fn from(err: Error) -> Self {
		storage::Error::DatabaseError(format!("{}", err))
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::Io(ref err) => write!(f, "i/o error: {}", err),
			Error::InconsistentState(msg) => write!(f, "inconsistent database state: {}", msg),
		}
	}
}

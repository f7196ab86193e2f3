use std::fmt;

/// Storage errors.
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
	/// Referenced entity is missing from the store.
	NotFound,
	/// Block parent is not the current best block.
	CannotCanonize,
	/// There is no block to decanonize.
	CannotDecanonize,
	/// Low-level database error.
	DatabaseError(String),
	/// Invalid or unreadable on-disk state.
	InconsistentData,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::NotFound => write!(f, "entity is not found in the store"),
			Error::CannotCanonize => write!(f, "block is not on top of the current chain"),
			Error::CannotDecanonize => write!(f, "there is no block to unchain"),
			Error::DatabaseError(ref s) => write!(f, "database error: {}", s),
			Error::InconsistentData => write!(f, "database is corrupted"),
		}
	}
}

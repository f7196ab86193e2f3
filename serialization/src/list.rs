use std::io;
use stream::{Serializable, Stream};
use reader::{Deserializable, Reader, Error};

/// Serializable list wrapper, prefixing the items with their count.
#[derive(Debug, Clone, PartialEq)]
pub struct List<T>(Vec<T>);

impl<T> List<T> where T: Serializable + Deserializable {
	pub fn from(vec: Vec<T>) -> Self {
		List(vec)
	}

	pub fn into(self) -> Vec<T> {
		self.0
	}
}

impl<T> Serializable for List<T> where T: Serializable {
	fn serialize(&self, s: &mut Stream) {
		s.append_list(&self.0);
	}
}

impl<T> Deserializable for List<T> where T: Deserializable {
	fn deserialize<R>(reader: &mut Reader<R>) -> Result<Self, Error> where R: io::Read {
		reader.read_list().map(List)
	}
}

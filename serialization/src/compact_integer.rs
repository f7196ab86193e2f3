//! Variable-length integer commonly used in the Bitcoin P2P protocol and
//! Bitcoin serialized data structures.

use std::io;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use stream::{Serializable, Stream};
use reader::{Deserializable, Reader, Error as ReaderError};

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct CompactInteger(u64);

impl From<CompactInteger> for usize {
	fn from(i: CompactInteger) -> Self {
		i.0 as usize
	}
}

impl From<CompactInteger> for u64 {
	fn from(i: CompactInteger) -> Self {
		i.0
	}
}

impl From<u8> for CompactInteger {
	fn from(i: u8) -> Self {
		CompactInteger(i as u64)
	}
}

impl From<u16> for CompactInteger {
	fn from(i: u16) -> Self {
		CompactInteger(i as u64)
	}
}

impl From<u32> for CompactInteger {
	fn from(i: u32) -> Self {
		CompactInteger(i as u64)
	}
}

impl From<usize> for CompactInteger {
	fn from(i: usize) -> Self {
		CompactInteger(i as u64)
	}
}

impl From<u64> for CompactInteger {
	fn from(i: u64) -> Self {
		CompactInteger(i)
	}
}

impl Serializable for CompactInteger {
	fn serialize(&self, stream: &mut Stream) {
		match self.0 {
			0..=0xfc => {
				stream.append_slice(&[self.0 as u8]);
			},
			0xfd..=0xffff => {
				stream.append_slice(&[0xfd]);
				stream.write_u16::<LittleEndian>(self.0 as u16).unwrap();
			},
			0x10000..=0xffff_ffff => {
				stream.append_slice(&[0xfe]);
				stream.write_u32::<LittleEndian>(self.0 as u32).unwrap();
			},
			_ => {
				stream.append_slice(&[0xff]);
				stream.write_u64::<LittleEndian>(self.0).unwrap();
			},
		}
	}

	fn serialized_size(&self) -> usize {
		match self.0 {
			0..=0xfc => 1,
			0xfd..=0xffff => 3,
			0x10000..=0xffff_ffff => 5,
			_ => 9,
		}
	}
}

impl Deserializable for CompactInteger {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError> where T: io::Read {
		let result = match reader.read::<u8>()? {
			i @ 0..=0xfc => i.into(),
			0xfd => reader.read_u16::<LittleEndian>()?.into(),
			0xfe => reader.read_u32::<LittleEndian>()?.into(),
			_ => reader.read_u64::<LittleEndian>()?.into(),
		};

		Ok(result)
	}
}

#[cfg(test)]
mod tests {
	use reader::{deserialize, Reader, Error as ReaderError};
	use stream::Stream;
	use super::CompactInteger;

	#[test]
	fn test_compact_integer_stream() {
		let expected = vec![
			0xfc,
			0xfd, 0xfd, 0x00,
			0xfd, 0xff, 0xff,
			0xfe, 0x00, 0x00, 0x01, 0x00,
			0xfe, 0xff, 0xff, 0xff, 0xff,
			0xff, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
		].into();

		let mut stream = Stream::default();
		stream
			.append(&CompactInteger::from(0xfcu64))
			.append(&CompactInteger::from(0xfdu64))
			.append(&CompactInteger::from(0xffffu64))
			.append(&CompactInteger::from(0x10000u64))
			.append(&CompactInteger::from(0xffff_ffffu64))
			.append(&CompactInteger::from(0x1_0000_0000u64));

		assert_eq!(stream.out(), expected);
	}

	#[test]
	fn test_compact_integer_reader() {
		let buffer = vec![
			0xfc,
			0xfd, 0xfd, 0x00,
			0xfd, 0xff, 0xff,
			0xfe, 0x00, 0x00, 0x01, 0x00,
			0xfe, 0xff, 0xff, 0xff, 0xff,
			0xff, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
		];

		let expected: Vec<CompactInteger> = vec![
			0xfcu64.into(),
			0xfdu64.into(),
			0xffffu64.into(),
			0x10000u64.into(),
			0xffff_ffffu64.into(),
			0x1_0000_0000u64.into(),
		];

		let mut reader = Reader::new(&buffer);
		for expected_value in expected {
			assert_eq!(expected_value, reader.read::<CompactInteger>().unwrap());
		}
		assert_eq!(ReaderError::UnexpectedEnd, reader.read::<CompactInteger>().unwrap_err());
	}

	#[test]
	fn test_compact_integer_error() {
		assert_eq!(ReaderError::UnreadData, deserialize::<_, CompactInteger>(&[0xfau8, 0x00u8] as &[u8]).unwrap_err());
	}
}

use std::fmt;
use std::io;
use hex::FromHex;
use ser::{deserialize, serialize, Deserializable, Error as ReaderError, Reader, Serializable, Stream};
use crypto::dhash256;
use compact::Compact;
use hash::H256;

#[derive(PartialEq, Clone)]
pub struct BlockHeader {
	pub version: u32,
	pub previous_header_hash: H256,
	pub merkle_root_hash: H256,
	pub time: u32,
	pub bits: Compact,
	pub nonce: u32,
}

impl BlockHeader {
	/// Compute hash of the block header.
	pub fn hash(&self) -> H256 {
		block_header_hash(self)
	}
}

impl fmt::Debug for BlockHeader {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("BlockHeader")
			.field("version", &self.version)
			.field("previous_header_hash", &self.previous_header_hash.reversed())
			.field("merkle_root_hash", &self.merkle_root_hash.reversed())
			.field("time", &self.time)
			.field("bits", &self.bits)
			.field("nonce", &self.nonce)
			.finish()
	}
}

impl From<&'static str> for BlockHeader {
	fn from(s: &'static str) -> Self {
		deserialize(&s.from_hex::<Vec<u8>>().unwrap() as &[u8]).unwrap()
	}
}

impl Serializable for BlockHeader {
	fn serialize(&self, stream: &mut Stream) {
		stream
			.append(&self.version)
			.append(&self.previous_header_hash)
			.append(&self.merkle_root_hash)
			.append(&self.time)
			.append(&self.bits)
			.append(&self.nonce);
	}

	fn serialized_size(&self) -> usize {
		4 + 32 + 32 + 4 + 4 + 4
	}
}

impl Deserializable for BlockHeader {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError> where T: io::Read {
		Ok(BlockHeader {
			version: reader.read()?,
			previous_header_hash: reader.read()?,
			merkle_root_hash: reader.read()?,
			time: reader.read()?,
			bits: reader.read()?,
			nonce: reader.read()?,
		})
	}
}

/// Compute hash of the block header.
pub fn block_header_hash(block_header: &BlockHeader) -> H256 {
	dhash256(&serialize(block_header))
}

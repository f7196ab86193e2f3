use hash::H256;

/// Block reference, by number or by hash.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockRef {
	Number(u32),
	Hash(H256),
}

impl From<u32> for BlockRef {
	fn from(u: u32) -> Self {
		BlockRef::Number(u)
	}
}

impl From<H256> for BlockRef {
	fn from(hash: H256) -> Self {
		BlockRef::Hash(hash)
	}
}

use crypto::dhash256;
use hash::H256;

#[inline]
fn concat(a: &H256, b: &H256) -> [u8; 64] {
	let mut result = [0u8; 64];
	result[0..32].copy_from_slice(&**a);
	result[32..64].copy_from_slice(&**b);
	result
}

/// Calculates the root of the merkle tree
/// https://en.bitcoin.it/wiki/Protocol_documentation#Merkle_Trees
pub fn merkle_root<T>(hashes: &[T]) -> H256 where T: AsRef<H256> {
	if hashes.is_empty() {
		return H256::default();
	}

	if hashes.len() == 1 {
		return hashes[0].as_ref().clone();
	}

	let mut row = Vec::with_capacity(hashes.len() / 2 + 1);
	let mut i = 0;
	while i + 1 < hashes.len() {
		row.push(merkle_node_hash(hashes[i].as_ref(), hashes[i + 1].as_ref()));
		i += 2;
	}

	// duplicate the last element if len is not even
	if hashes.len() % 2 == 1 {
		let last = hashes[hashes.len() - 1].as_ref();
		row.push(merkle_node_hash(last, last));
	}

	merkle_root(&row)
}

/// Calculate merkle tree node hash
pub fn merkle_node_hash(left: &H256, right: &H256) -> H256 {
	dhash256(&concat(left, right))
}

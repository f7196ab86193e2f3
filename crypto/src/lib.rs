extern crate primitives;
extern crate sha2;

use sha2::{Digest, Sha256};
use primitives::hash::H256;

/// SHA-256
#[inline]
pub fn sha256(input: &[u8]) -> H256 {
	let mut result = H256::default();
	result.copy_from_slice(&Sha256::digest(input));
	result
}

/// Double SHA-256
#[inline]
pub fn dhash256(input: &[u8]) -> H256 {
	sha256(&*sha256(input))
}

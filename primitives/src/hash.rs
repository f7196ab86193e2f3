//! Fixed-size hashes.

use std::{cmp, fmt, ops, str};
use hex::{FromHex, FromHexError, ToHex};

macro_rules! impl_hash {
	($name: ident, $size: expr) => {
		#[derive(Copy)]
		#[repr(C)]
		pub struct $name([u8; $size]);

		impl Default for $name {
			fn default() -> Self {
				$name([0u8; $size])
			}
		}

		impl AsRef<$name> for $name {
			fn as_ref(&self) -> &$name {
				self
			}
		}

		impl Clone for $name {
			fn clone(&self) -> Self {
				let mut result = Self::default();
				result.copy_from_slice(&self.0);
				result
			}
		}

		impl From<[u8; $size]> for $name {
			fn from(h: [u8; $size]) -> Self {
				$name(h)
			}
		}

		impl From<$name> for [u8; $size] {
			fn from(h: $name) -> Self {
				h.0
			}
		}

		impl<'a> From<&'a [u8]> for $name {
			fn from(slc: &[u8]) -> Self {
				let mut inner = [0u8; $size];
				inner[..].copy_from_slice(&slc[0..$size]);
				$name(inner)
			}
		}

		impl From<&'static str> for $name {
			fn from(s: &'static str) -> Self {
				s.parse().unwrap()
			}
		}

		impl From<u8> for $name {
			fn from(v: u8) -> Self {
				let mut result = Self::default();
				result.0[0] = v;
				result
			}
		}

		impl str::FromStr for $name {
			type Err = FromHexError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				let vec: Vec<u8> = s.from_hex()?;
				match vec.len() {
					$size => {
						let mut result = [0u8; $size];
						result.copy_from_slice(&vec);
						Ok($name(result))
					},
					_ => Err(FromHexError::InvalidHexLength),
				}
			}
		}

		impl fmt::Debug for $name {
			fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str(&self.0.to_hex::<String>())
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str(&self.0.to_hex::<String>())
			}
		}

		impl ops::Deref for $name {
			type Target = [u8; $size];

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}

		impl ops::DerefMut for $name {
			fn deref_mut(&mut self) -> &mut Self::Target {
				&mut self.0
			}
		}

		impl cmp::PartialEq for $name {
			fn eq(&self, other: &Self) -> bool {
				let self_ref: &[u8] = &self.0;
				let other_ref: &[u8] = &other.0;
				self_ref == other_ref
			}
		}

		impl cmp::PartialOrd for $name {
			fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
				Some(self.cmp(other))
			}
		}

		impl cmp::Ord for $name {
			fn cmp(&self, other: &Self) -> cmp::Ordering {
				let self_ref: &[u8] = &self.0;
				let other_ref: &[u8] = &other.0;
				self_ref.cmp(other_ref)
			}
		}

		impl cmp::Eq for $name {}

		impl ::std::hash::Hash for $name {
			fn hash<H>(&self, state: &mut H) where H: ::std::hash::Hasher {
				state.write(&self.0);
				state.finish();
			}
		}

		impl $name {
			pub fn take(self) -> [u8; $size] {
				self.0
			}

			pub fn reversed(&self) -> Self {
				let mut result = self.clone();
				result.reverse();
				result
			}

			pub fn size() -> usize {
				$size
			}

			pub fn is_zero(&self) -> bool {
				self.0.iter().all(|b| *b == 0)
			}
		}
	}
}

impl_hash!(H160, 20);
impl_hash!(H256, 32);

impl H256 {
	/// Parse a hash from the reversed (display) byte order.
	pub fn from_reversed_str(s: &'static str) -> Self {
		H256::from(s).reversed()
	}

	/// Format the hash in the reversed (display) byte order.
	pub fn to_reversed_str(&self) -> String {
		self.reversed().to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::H256;

	#[test]
	fn test_hash_to_reversed_str() {
		let hash = H256::from_reversed_str("00000000000000001bf9114c5cbac04071f97d4e797f3cc745ba4d8e9c7f1253");
		assert_eq!(hash.to_reversed_str(), "00000000000000001bf9114c5cbac04071f97d4e797f3cc745ba4d8e9c7f1253".to_owned());
	}

	#[test]
	fn test_hash_is_zero() {
		assert!(H256::default().is_zero());
		assert!(!H256::from(1).is_zero());
	}
}

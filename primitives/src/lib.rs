extern crate byteorder;
extern crate rustc_hex as hex;
#[macro_use]
extern crate uint;

pub mod bytes;
pub mod compact;
pub mod hash;

pub use bytes::Bytes;
pub use compact::Compact;
pub use hash::{H160, H256};

/// 256-bit unsigned integer used for difficulty targets and chain work.
pub mod bigint {
	construct_uint! {
		pub struct U256(4);
	}
}

pub use bigint::U256;

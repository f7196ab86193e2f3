//! Networks the chain engine can run on.

use chain::Block;
use primitives::bigint::U256;
use primitives::compact::Compact;
use primitives::hash::H256;

const MAX_BITS_MAINNET: u32 = 0x1d00ffff;
const MAX_BITS_TESTNET: u32 = 0x1d00ffff;
const MAX_BITS_REGTEST: u32 = 0x207fffff;

/// Network the engine operates on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Network {
	/// The original and main network for Bitcoin transactions.
	Mainnet,
	/// The alternative network, used for testing.
	Testnet,
	/// Private network, used for application testing.
	Regtest,
	/// Network used by unit tests.
	Unitest,
}

lazy_static! {
	static ref MAX_TARGET_MAINNET: U256 = Compact::new(MAX_BITS_MAINNET).to_u256()
		.expect("hardcoded compact value is positive and in range; qed");
	static ref MAX_TARGET_TESTNET: U256 = Compact::new(MAX_BITS_TESTNET).to_u256()
		.expect("hardcoded compact value is positive and in range; qed");
	static ref MAX_TARGET_REGTEST: U256 = Compact::new(MAX_BITS_REGTEST).to_u256()
		.expect("hardcoded compact value is positive and in range; qed");
}

impl Network {
	/// Highest allowed proof-of-work target in compact form.
	pub fn max_bits(&self) -> Compact {
		match *self {
			Network::Mainnet => MAX_BITS_MAINNET.into(),
			Network::Testnet => MAX_BITS_TESTNET.into(),
			Network::Regtest | Network::Unitest => MAX_BITS_REGTEST.into(),
		}
	}

	/// Highest allowed proof-of-work target.
	pub fn max_target(&self) -> U256 {
		match *self {
			Network::Mainnet => *MAX_TARGET_MAINNET,
			Network::Testnet => *MAX_TARGET_TESTNET,
			Network::Regtest | Network::Unitest => *MAX_TARGET_REGTEST,
		}
	}

	/// The full genesis block of the network.
	pub fn genesis_block(&self) -> Block {
		match *self {
			Network::Mainnet => "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c0101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000".into(),
			Network::Testnet => "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4adae5494dffff001d1aa4ae180101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000".into(),
			Network::Regtest | Network::Unitest => "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4adae5494dffff7f20020000000101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000".into(),
		}
	}

	/// Hash of the genesis block.
	pub fn genesis_block_hash(&self) -> H256 {
		match *self {
			Network::Mainnet => H256::from_reversed_str("000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"),
			Network::Testnet => H256::from_reversed_str("000000000933ea01ad0ee984209779baaec3ced90fa3f408719526f8d77f4943"),
			Network::Regtest | Network::Unitest => H256::from_reversed_str("0f9188f13cb7b2c71f2a335e3a4fc328bf5beb436012afca590b1a11466e2206"),
		}
	}
}

#[cfg(test)]
mod tests {
	use primitives::compact::Compact;
	use super::Network;

	#[test]
	fn test_network_max_bits() {
		assert_eq!(Network::Mainnet.max_bits(), Compact::new(0x1d00ffff));
		assert_eq!(Network::Testnet.max_bits(), Compact::new(0x1d00ffff));
	}

	#[test]
	fn test_network_genesis_block() {
		let genesis = Network::Mainnet.genesis_block();
		assert_eq!(genesis.hash(), Network::Mainnet.genesis_block_hash());
		assert_eq!(genesis.merkle_root(), genesis.block_header.merkle_root_hash);
	}
}

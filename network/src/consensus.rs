use primitives::hash::H256;
use Network;

/// Parameters that influence chain consensus.
#[derive(Debug, Clone)]
pub struct ConsensusParams {
	/// Network.
	pub network: Network,
	/// Block height at which BIP16 becomes active.
	/// See https://github.com/bitcoin/bips/blob/master/bip-0016.mediawiki
	pub bip16_height: u32,
	/// Heights excluded from the otherwise retro-active BIP30 rule.
	/// See https://github.com/bitcoin/bips/blob/master/bip-0030.mediawiki
	pub bip30_exception_heights: &'static [u32],
	/// Number of preceding header versions sampled when deriving the
	/// minimum version and BIP34/66/65 activation.
	pub version_sample: usize,
	/// Sampled count at which an upgraded version becomes mandatory.
	pub version_enforce: usize,
	/// Sampled count at which an upgraded rule set becomes active.
	pub version_activate: usize,
	/// Block subsidy halving interval (in blocks).
	pub subsidy_halving_interval: u32,
	/// Known (height, hash) pairs the chain must pass through.
	pub checkpoints: &'static [(u32, &'static str)],
}

static MAINNET_BIP30_EXCEPTIONS: [u32; 2] = [91_842, 91_880];
static NO_BIP30_EXCEPTIONS: [u32; 0] = [];

static MAINNET_CHECKPOINTS: [(u32, &'static str); 9] = [
	(0, "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"),
	(11_111, "0000000069e244f73d78e8fd29ba2fd2ed618bd6fa2ee92559f542fdb26e7c1d"),
	(33_333, "000000002dd5588a74784eaa7ab0507a18ad16a236e7b1ce69f00d7ddfb5d0a6"),
	(74_000, "0000000000573993a3c9e41ce34471c079dcf5f52a0e824a81e7f953b8661a20"),
	(105_000, "00000000000291ce28027faea320c8d2b054b2e0fe44a773f3eefb151d6bdc97"),
	(134_444, "00000000000005b12ffd4cd315cd34ffd4a594f430ac814c91184a0d42d2b0fe"),
	(168_000, "000000000000099e61ea72015e79632f216fe6cb33d7899acb35b75c8303b763"),
	(193_000, "000000000000059f452a5f7340de6682a977387c17010ff6e6c3bd83ca8b1317"),
	(210_000, "000000000000048b95347e83192f69cf0366076336c639f9b7228e9ba171342e"),
];

static TESTNET_CHECKPOINTS: [(u32, &'static str); 2] = [
	(0, "000000000933ea01ad0ee984209779baaec3ced90fa3f408719526f8d77f4943"),
	(546, "000000002a936ca763904c3c35fce2f3556c559c0214345d31b1bcebf76acb70"),
];

static NO_CHECKPOINTS: [(u32, &'static str); 0] = [];

impl ConsensusParams {
	pub fn new(network: Network) -> Self {
		match network {
			Network::Mainnet => ConsensusParams {
				network: network,
				// Block 173805 is the first block after the (date-based) activation.
				bip16_height: 173_805,
				bip30_exception_heights: &MAINNET_BIP30_EXCEPTIONS,
				version_sample: 1000,
				version_enforce: 950,
				version_activate: 750,
				subsidy_halving_interval: 210_000,
				checkpoints: &MAINNET_CHECKPOINTS,
			},
			Network::Testnet => ConsensusParams {
				network: network,
				// Block 514 is the first block after the (date-based) activation.
				bip16_height: 514,
				bip30_exception_heights: &NO_BIP30_EXCEPTIONS,
				version_sample: 100,
				version_enforce: 75,
				version_activate: 51,
				subsidy_halving_interval: 210_000,
				checkpoints: &TESTNET_CHECKPOINTS,
			},
			Network::Regtest | Network::Unitest => ConsensusParams {
				network: network,
				bip16_height: 0,
				bip30_exception_heights: &NO_BIP30_EXCEPTIONS,
				version_sample: 100,
				version_enforce: 75,
				version_activate: 51,
				subsidy_halving_interval: 210_000,
				checkpoints: &NO_CHECKPOINTS,
			},
		}
	}

	pub fn is_bip16_active(&self, height: u32) -> bool {
		height >= self.bip16_height
	}

	pub fn is_bip30_exception(&self, height: u32) -> bool {
		self.bip30_exception_heights.iter().any(|h| *h == height)
	}

	/// Checkpoint hash at the given height, if one is configured.
	pub fn checkpoint(&self, height: u32) -> Option<H256> {
		self.checkpoints.iter()
			.find(|&&(checkpoint_height, _)| checkpoint_height == height)
			.map(|&(_, hash)| H256::from_reversed_str(hash))
	}

	/// Does the block hash pass the configured checkpoints?
	pub fn is_checkpoint_passed(&self, height: u32, hash: &H256) -> bool {
		match self.checkpoint(height) {
			Some(checkpoint_hash) => checkpoint_hash == *hash,
			None => true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{ConsensusParams, Network};

	#[test]
	fn test_consensus_params_bip16() {
		let consensus = ConsensusParams::new(Network::Mainnet);
		assert!(!consensus.is_bip16_active(173_804));
		assert!(consensus.is_bip16_active(173_805));

		let consensus = ConsensusParams::new(Network::Testnet);
		assert!(consensus.is_bip16_active(514));
	}

	#[test]
	fn test_consensus_params_bip30_exceptions() {
		let consensus = ConsensusParams::new(Network::Mainnet);
		assert!(consensus.is_bip30_exception(91_842));
		assert!(consensus.is_bip30_exception(91_880));
		assert!(!consensus.is_bip30_exception(91_881));
	}

	#[test]
	fn test_consensus_params_checkpoints() {
		let consensus = ConsensusParams::new(Network::Mainnet);
		let genesis_hash = Network::Mainnet.genesis_block_hash();
		assert!(consensus.is_checkpoint_passed(0, &genesis_hash));
		assert!(!consensus.is_checkpoint_passed(11_111, &genesis_hash));
		assert!(consensus.is_checkpoint_passed(11_112, &genesis_hash));
	}
}

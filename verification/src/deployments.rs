//! Consensus rule activation derived from preceding header versions.

use network::ConsensusParams;
use script::VerificationFlags;
use fork_view::ForkChainView;

/// Rule activations for one block, derived by sampling the versions of the
/// headers preceding it.
///
/// A counted rule applies to the block only if the block's own version is
/// high enough to commit to it (v2 for the height rule, v3 for strict DER,
/// v4 for checklocktimeverify).
pub struct BlockDeployments {
	minimum_version: u32,
	block_version: u32,
	bip34_counted: bool,
	bip65_counted: bool,
	bip66_counted: bool,
	bip30_active: bool,
	bip16_active: bool,
}

impl BlockDeployments {
	pub fn new(view: &ForkChainView, height: u32, block_version: u32, consensus: &ConsensusParams) -> Self {
		// continue even if fewer than `version_sample` headers exist
		// (simpler and faster overall)
		let versions = view.preceding_block_versions(height, consensus.version_sample);

		let count_4 = versions.iter().filter(|v| **v >= 4).count();
		let count_3 = versions.iter().filter(|v| **v >= 3).count();
		let count_2 = versions.iter().filter(|v| **v >= 2).count();

		let enforced = |count: usize| count >= consensus.version_enforce;
		let activated = |count: usize| count >= consensus.version_activate;

		let minimum_version = if enforced(count_4) {
			4
		} else if enforced(count_3) {
			3
		} else if enforced(count_2) {
			2
		} else {
			1
		};

		BlockDeployments {
			minimum_version: minimum_version,
			block_version: block_version,
			bip34_counted: activated(count_2),
			bip66_counted: activated(count_3),
			bip65_counted: activated(count_4),
			// the height rule applies retro-actively to all but two
			// historical blocks that violate it
			bip30_active: !consensus.is_bip30_exception(height),
			bip16_active: consensus.is_bip16_active(height),
		}
	}

	/// Lowest header version acceptable at this height.
	pub fn minimum_version(&self) -> u32 {
		self.minimum_version
	}

	/// Coinbase must begin with the serialized block height.
	pub fn is_bip34_active(&self) -> bool {
		self.bip34_counted && self.block_version >= 2
	}

	/// Strict DER signatures enforced.
	pub fn is_bip66_active(&self) -> bool {
		self.bip66_counted && self.block_version >= 3
	}

	/// OP_CHECKLOCKTIMEVERIFY enforced.
	pub fn is_bip65_active(&self) -> bool {
		self.bip65_counted && self.block_version >= 4
	}

	/// Duplicate transaction hashes rejected unless fully spent.
	pub fn is_bip30_active(&self) -> bool {
		self.bip30_active
	}

	/// Pay-to-script-hash evaluation enabled.
	pub fn is_bip16_active(&self) -> bool {
		self.bip16_active
	}

	/// Flags handed to the script verifier.
	pub fn verification_flags(&self) -> VerificationFlags {
		let mut flags = VerificationFlags::NONE;
		if self.is_bip16_active() {
			flags |= VerificationFlags::VERIFY_P2SH;
		}
		if self.is_bip66_active() {
			flags |= VerificationFlags::VERIFY_DERSIG;
		}
		if self.is_bip65_active() {
			flags |= VerificationFlags::VERIFY_CLTV;
		}
		flags
	}
}

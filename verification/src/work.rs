//! Proof-of-work checks and the difficulty retarget algorithm.

use primitives::bigint::U256;
use primitives::compact::Compact;
use primitives::hash::H256;
use network::{ConsensusParams, Network};
use fork_view::ForkChainView;
use constants::{DOUBLE_SPACING_SECONDS, RETARGETING_INTERVAL, TARGET_TIMESPAN_SECONDS};

/// Returns true if hash is lower or equal than target represented by
/// compact bits.
pub fn is_valid_proof_of_work_hash(bits: Compact, hash: &H256) -> bool {
	let target = match bits.to_u256() {
		Ok(target) => target,
		_err => return false,
	};

	let value = U256::from(&*hash.reversed() as &[u8]);
	value <= target
}

/// Returns true if hash is lower or equal than target and target is lower
/// or equal than the network maximum.
pub fn is_valid_proof_of_work(max_work_bits: Compact, bits: Compact, hash: &H256) -> bool {
	let maximum = match max_work_bits.to_u256() {
		Ok(max) => max,
		_err => return false,
	};

	let target = match bits.to_u256() {
		Ok(target) => target,
		_err => return false,
	};

	let value = U256::from(&*hash.reversed() as &[u8]);
	target <= maximum && value <= target
}

/// Work the chain gains from a block with the given bits.
pub fn block_work(bits: Compact) -> U256 {
	let target = match bits.to_u256() {
		Ok(target) => target,
		_err => return U256::zero(),
	};

	// 2^256 / (target + 1), written without the 257-bit numerator
	(!target / (target + U256::one())) + U256::one()
}

/// Miner subsidy at the given height.
pub fn block_reward_satoshi(height: u32, halving_interval: u32) -> u64 {
	let mut reward = 50 * 100_000_000u64;
	for _ in 0..height / halving_interval {
		reward /= 2;
	}
	reward
}

/// Bits required of a block at `height` whose predecessors are readable
/// through `view`.
pub fn work_required(
	view: &ForkChainView,
	height: u32,
	current_block_time: u32,
	consensus: &ConsensusParams,
) -> Compact {
	let max_bits = consensus.network.max_bits();
	if height == 0 {
		return max_bits;
	}

	if height % RETARGETING_INTERVAL != 0 {
		if consensus.network == Network::Testnet {
			return work_required_testnet(view, height, current_block_time, max_bits);
		}

		return view.previous_block_bits(height);
	}

	// total time the last 2016 blocks took, constrained to one quarter
	// through four times the target timespan
	let actual = view.actual_timespan(height, RETARGETING_INTERVAL);
	let constrained = range_constrain(
		actual,
		TARGET_TIMESPAN_SECONDS as i64 / 4,
		TARGET_TIMESPAN_SECONDS as i64 * 4,
	);

	let mut retarget: U256 = view.previous_block_bits(height).into();
	retarget = retarget * U256::from(constrained as u64);
	retarget = retarget / U256::from(TARGET_TIMESPAN_SECONDS as u64);

	if retarget > consensus.network.max_target() {
		max_bits
	} else {
		retarget.into()
	}
}

/// Testnet allows a minimum-difficulty block once the gap since the
/// previous block exceeds twice the target spacing; otherwise the bits of
/// the last block that is not such a special block apply.
fn work_required_testnet(
	view: &ForkChainView,
	height: u32,
	current_block_time: u32,
	max_bits: Compact,
) -> Compact {
	let previous = view.block_header(height - 1)
		.expect("blocks below the one under validation exist on one side of the fork; qed");

	let max_time_gap = previous.time + DOUBLE_SPACING_SECONDS;
	if current_block_time > max_time_gap {
		return max_bits;
	}

	last_non_special_bits(view, height, max_bits)
}

fn last_non_special_bits(view: &ForkChainView, height: u32, max_bits: Compact) -> Compact {
	// walk backwards until a retarget boundary or a block that does not
	// carry the special minimum-difficulty bits
	let mut bits = max_bits;
	let mut previous_height = height;

	loop {
		if previous_height % RETARGETING_INTERVAL == 0 {
			break;
		}

		previous_height -= 1;
		bits = view.block_header(previous_height)
			.expect("blocks below the one under validation exist on one side of the fork; qed")
			.bits;
		if bits != max_bits {
			break;
		}
	}

	bits
}

fn range_constrain(value: i64, min: i64, max: i64) -> i64 {
	if value < min {
		min
	} else if value > max {
		max
	} else {
		value
	}
}

#[cfg(test)]
mod tests {
	use primitives::bigint::U256;
	use primitives::compact::Compact;
	use primitives::hash::H256;
	use super::{block_reward_satoshi, block_work, is_valid_proof_of_work_hash};

	#[test]
	fn test_reward() {
		assert_eq!(block_reward_satoshi(0, 210_000), 5000000000);
		assert_eq!(block_reward_satoshi(209999, 210_000), 5000000000);
		assert_eq!(block_reward_satoshi(210000, 210_000), 2500000000);
		assert_eq!(block_reward_satoshi(420000, 210_000), 1250000000);
		assert_eq!(block_reward_satoshi(629999, 210_000), 1250000000);
		assert_eq!(block_reward_satoshi(630000, 210_000), 625000000);
	}

	#[test]
	fn test_is_valid_proof_of_work_hash() {
		let genesis = H256::from_reversed_str("000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f");
		assert!(is_valid_proof_of_work_hash(Compact::new(0x1d00ffff), &genesis));

		// an arbitrary hash well above the genesis target
		let invalid = H256::from_reversed_str("7000000000000000000000000000000000000000000000000000000000000000");
		assert!(!is_valid_proof_of_work_hash(Compact::new(0x1d00ffff), &invalid));
	}

	#[test]
	fn test_block_work_increases_with_difficulty() {
		let easy = block_work(Compact::new(0x1d00ffff));
		let hard = block_work(Compact::new(0x1c00ffff));
		assert!(hard > easy);
		assert!(easy > U256::zero());
	}
}

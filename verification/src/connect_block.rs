//! Input connection: the block has been chosen for the main chain and its
//! transactions are checked against the outputs they spend.

use chain::{IndexedBlock, IndexedTransaction};
use network::ConsensusParams;
use script::{script_hash_sigops_count, Script, ScriptVerifier};
use constants::{COINBASE_MATURITY, MAX_BLOCK_SIGOPS, MAX_MONEY};
use deployments::BlockDeployments;
use error::Error;
use fork_view::ForkChainView;
use sigops::transaction_sigops;
use stop::StopSignal;
use work::block_reward_satoshi;

/// Connects block transactions to their previous outputs, under the write
/// barrier, once the block was chosen for the main chain.
pub struct BlockConnector<'a> {
	view: &'a ForkChainView<'a>,
	consensus: &'a ConsensusParams,
	block: &'a IndexedBlock,
	height: u32,
	deployments: &'a BlockDeployments,
	script_verifier: &'a ScriptVerifier,
}

impl<'a> BlockConnector<'a> {
	pub fn new(
		view: &'a ForkChainView<'a>,
		consensus: &'a ConsensusParams,
		block: &'a IndexedBlock,
		height: u32,
		deployments: &'a BlockDeployments,
		script_verifier: &'a ScriptVerifier,
	) -> Self {
		trace!(target: "verification", "Block connection {}", block.hash().to_reversed_str());
		BlockConnector {
			view: view,
			consensus: consensus,
			block: block,
			height: height,
			deployments: deployments,
			script_verifier: script_verifier,
		}
	}

	pub fn check(&self, stop: &StopSignal) -> Result<(), Error> {
		let transactions = &self.block.transactions;

		if self.deployments.is_bip30_active() {
			for tx in transactions {
				if self.is_spent_duplicate(tx) {
					return Err(Error::DuplicateOrSpent);
				}

				stop.check()?;
			}
		}

		let mut fees = 0u64;
		let mut total_sigops = 0usize;

		for (tx_index, tx) in transactions.iter().enumerate() {
			total_sigops += transaction_sigops(&tx.raw);
			if total_sigops > MAX_BLOCK_SIGOPS {
				return Err(Error::TooManySigops);
			}

			stop.check()?;

			// sigops of the coinbase count, nothing else of it is connected
			if tx.raw.is_coinbase() {
				continue;
			}

			let mut value_in = 0u64;
			for input_index in 0..tx.raw.inputs.len() {
				if !self.connect_input(tx_index, tx, input_index, &mut value_in, &mut total_sigops) {
					warn!(
						target: "verification",
						"Invalid input [{}:{}]",
						tx.hash.to_reversed_str(),
						input_index,
					);
					return Err(Error::ValidateInputsFailed);
				}
			}

			stop.check()?;

			let value_out = tx.raw.total_spends();
			if value_in < value_out {
				return Err(Error::FeesOutOfRange);
			}

			fees = match fees.checked_add(value_in - value_out) {
				Some(fees) if fees <= MAX_MONEY => fees,
				_ => return Err(Error::FeesOutOfRange),
			};
		}

		stop.check()?;

		let coinbase_value = transactions[0].raw.total_spends();
		let reward = block_reward_satoshi(self.height, self.consensus.subsidy_halving_interval);
		if coinbase_value > reward + fees {
			return Err(Error::CoinbaseTooLarge);
		}

		Ok(())
	}

	/// Does an earlier transaction with the same hash exist with all of its
	/// outputs spent? Such coinbase-era duplicates are not re-indexable.
	fn is_spent_duplicate(&self, tx: &IndexedTransaction) -> bool {
		if !self.view.transaction_exists(&tx.hash) {
			return false;
		}

		let previous = match self.view.transaction_with_height(&tx.hash) {
			Some((previous, _)) => previous,
			None => return false,
		};

		(0..previous.outputs.len() as u32).all(|output_index| {
			let outpoint = ::chain::OutPoint {
				hash: tx.hash.clone(),
				index: output_index,
			};
			self.view.is_main_chain_spent(&outpoint)
		})
	}

	fn connect_input(
		&self,
		tx_index: usize,
		tx: &IndexedTransaction,
		input_index: usize,
		value_in: &mut u64,
		total_sigops: &mut usize,
	) -> bool {
		let input = &tx.raw.inputs[input_index];
		let previous_output = &input.previous_output;

		let (previous_tx, previous_height) = match self.view.transaction_with_height(&previous_output.hash) {
			Some(resolved) => resolved,
			None => {
				warn!(
					target: "verification",
					"Failure fetching input transaction [{}]",
					previous_output.hash.to_reversed_str(),
				);
				return false;
			},
		};

		let previous_tx_out = match previous_tx.outputs.get(previous_output.index as usize) {
			Some(output) => output,
			None => return false,
		};

		// pay-to-script-hash spends carry extra signature operations in
		// their redeem script
		let output_script = Script::new(previous_tx_out.script_pubkey.clone());
		let input_script = Script::new(input.script_sig.clone());
		*total_sigops += script_hash_sigops_count(&output_script, &input_script);
		if *total_sigops > MAX_BLOCK_SIGOPS {
			warn!(target: "verification", "Total sigops exceeds block maximum");
			return false;
		}

		let output_value = previous_tx_out.value;
		if output_value > MAX_MONEY {
			warn!(target: "verification", "Output money exceeds the currency cap");
			return false;
		}

		if previous_tx.is_coinbase() {
			debug_assert!(previous_height <= self.height);
			if self.height - previous_height < COINBASE_MATURITY {
				warn!(target: "verification", "Immature coinbase spend attempt");
				return false;
			}
		}

		if !self.script_verifier.verify_script(&output_script, &tx.raw, input_index, self.deployments.verification_flags()) {
			warn!(target: "verification", "Input script invalid consensus");
			return false;
		}

		// double spends are searched on both sides of the fork: the
		// unspent-output index answers for the main chain, the candidate
		// chain is scanned input by input
		let spent_in_main = self.view.is_main_chain_height(previous_height)
			&& self.view.is_main_chain_spent(previous_output);
		if spent_in_main || self.view.is_orphan_spent(previous_output, tx_index, input_index) {
			warn!(target: "verification", "Double spend attempt");
			return false;
		}

		*value_in += output_value;
		if *value_in > MAX_MONEY {
			warn!(target: "verification", "Input money exceeds the currency cap");
			return false;
		}

		true
	}
}

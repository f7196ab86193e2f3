//! Contextual block checks: the block's height and preceding headers are
//! known, but its transactions are not yet connected.

use chain::IndexedBlock;
use network::ConsensusParams;
use deployments::BlockDeployments;
use error::Error;
use fork_view::ForkChainView;
use script::Builder;
use stop::StopSignal;
use work::work_required;

/// Contextual verification of an ordered block.
pub struct BlockAcceptor<'a> {
	pub work: BlockWork<'a>,
	pub median_timestamp: BlockMedianTimestamp<'a>,
	pub finality: BlockFinality<'a>,
	pub checkpoint: BlockCheckpoint<'a>,
	pub version: BlockVersion<'a>,
	pub coinbase_height: BlockCoinbaseHeight<'a>,
}

impl<'a> BlockAcceptor<'a> {
	pub fn new(
		view: &'a ForkChainView<'a>,
		consensus: &'a ConsensusParams,
		block: &'a IndexedBlock,
		height: u32,
		deployments: &'a BlockDeployments,
	) -> Self {
		trace!(target: "verification", "Block verification {}", block.hash().to_reversed_str());
		BlockAcceptor {
			work: BlockWork::new(view, consensus, block, height),
			median_timestamp: BlockMedianTimestamp::new(view, block, height),
			finality: BlockFinality::new(block, height),
			checkpoint: BlockCheckpoint::new(consensus, block, height),
			version: BlockVersion::new(block, deployments),
			coinbase_height: BlockCoinbaseHeight::new(block, height, deployments),
		}
	}

	/// Run every check, polling the stop signal between them.
	pub fn check(&self, stop: &StopSignal) -> Result<(), Error> {
		self.work.check()?;
		stop.check()?;
		self.median_timestamp.check()?;
		stop.check()?;
		self.finality.check(stop)?;
		stop.check()?;
		self.checkpoint.check()?;
		stop.check()?;
		self.version.check()?;
		stop.check()?;
		self.coinbase_height.check()?;
		Ok(())
	}
}

pub struct BlockWork<'a> {
	view: &'a ForkChainView<'a>,
	consensus: &'a ConsensusParams,
	block: &'a IndexedBlock,
	height: u32,
}

impl<'a> BlockWork<'a> {
	fn new(view: &'a ForkChainView<'a>, consensus: &'a ConsensusParams, block: &'a IndexedBlock, height: u32) -> Self {
		BlockWork {
			view: view,
			consensus: consensus,
			block: block,
			height: height,
		}
	}

	fn check(&self) -> Result<(), Error> {
		let required = work_required(self.view, self.height, self.block.header.raw.time, self.consensus);
		if self.block.header.raw.bits == required {
			Ok(())
		} else {
			Err(Error::IncorrectProofOfWork)
		}
	}
}

pub struct BlockMedianTimestamp<'a> {
	view: &'a ForkChainView<'a>,
	block: &'a IndexedBlock,
	height: u32,
}

impl<'a> BlockMedianTimestamp<'a> {
	fn new(view: &'a ForkChainView<'a>, block: &'a IndexedBlock, height: u32) -> Self {
		BlockMedianTimestamp {
			view: view,
			block: block,
			height: height,
		}
	}

	fn check(&self) -> Result<(), Error> {
		if self.block.header.raw.time <= self.view.median_time_past(self.height) {
			Err(Error::TimestampTooEarly)
		} else {
			Ok(())
		}
	}
}

pub struct BlockFinality<'a> {
	block: &'a IndexedBlock,
	height: u32,
}

impl<'a> BlockFinality<'a> {
	fn new(block: &'a IndexedBlock, height: u32) -> Self {
		BlockFinality {
			block: block,
			height: height,
		}
	}

	fn check(&self, stop: &StopSignal) -> Result<(), Error> {
		// txs should be final when included in a block
		let time = self.block.header.raw.time;
		for tx in &self.block.transactions {
			if !tx.raw.is_final_in_block(self.height, time) {
				return Err(Error::NonFinalTransaction);
			}

			stop.check()?;
		}

		Ok(())
	}
}

pub struct BlockCheckpoint<'a> {
	consensus: &'a ConsensusParams,
	block: &'a IndexedBlock,
	height: u32,
}

impl<'a> BlockCheckpoint<'a> {
	fn new(consensus: &'a ConsensusParams, block: &'a IndexedBlock, height: u32) -> Self {
		BlockCheckpoint {
			consensus: consensus,
			block: block,
			height: height,
		}
	}

	fn check(&self) -> Result<(), Error> {
		// both DOS protection and a performance optimization for sync
		if self.consensus.is_checkpoint_passed(self.height, self.block.hash()) {
			Ok(())
		} else {
			Err(Error::CheckpointsFailed)
		}
	}
}

pub struct BlockVersion<'a> {
	block: &'a IndexedBlock,
	deployments: &'a BlockDeployments,
}

impl<'a> BlockVersion<'a> {
	fn new(block: &'a IndexedBlock, deployments: &'a BlockDeployments) -> Self {
		BlockVersion {
			block: block,
			deployments: deployments,
		}
	}

	fn check(&self) -> Result<(), Error> {
		if self.block.header.raw.version < self.deployments.minimum_version() {
			Err(Error::OldVersionBlock)
		} else {
			Ok(())
		}
	}
}

pub struct BlockCoinbaseHeight<'a> {
	block: &'a IndexedBlock,
	height: u32,
	deployments: &'a BlockDeployments,
}

impl<'a> BlockCoinbaseHeight<'a> {
	fn new(block: &'a IndexedBlock, height: u32, deployments: &'a BlockDeployments) -> Self {
		BlockCoinbaseHeight {
			block: block,
			height: height,
			deployments: deployments,
		}
	}

	fn check(&self) -> Result<(), Error> {
		if !self.deployments.is_bip34_active() {
			return Ok(());
		}

		let prefix = Builder::default()
			.push_num(self.height as i64)
			.into_script();

		let matches = self.block.transactions.first()
			.and_then(|tx| tx.raw.inputs.first())
			.map(|input| input.script_sig.starts_with(&prefix))
			.unwrap_or(false);

		if matches {
			Ok(())
		} else {
			Err(Error::CoinbaseHeightMismatch)
		}
	}
}

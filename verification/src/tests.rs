//! Whole-validator tests over an in-memory store.

use std::collections::HashMap;
use chain::{Block, BlockHeader, IndexedBlock, OutPoint, Transaction};
use network::{ConsensusParams, Network};
use primitives::compact::Compact;
use primitives::hash::H256;
use storage::{BlockHeaderProvider, BlockRef, InputPoint, TransactionIndex, TransactionProvider,
	UtxoProvider, UtxoStatInfo};
use accept_block::BlockAcceptor;
use deployments::BlockDeployments;
use fork_view::ForkChainView;
use stop::StopSignal;
use verify_block::BlockVerifier;
use work::work_required;

#[derive(Default)]
struct TestStore {
	headers: Vec<BlockHeader>,
	transactions: HashMap<H256, (Transaction, u32)>,
	spent: Vec<OutPoint>,
}

impl BlockHeaderProvider for TestStore {
	fn block_header(&self, block_ref: BlockRef) -> Option<BlockHeader> {
		match block_ref {
			BlockRef::Number(number) => self.headers.get(number as usize).cloned(),
			BlockRef::Hash(hash) => self.headers.iter().find(|header| header.hash() == hash).cloned(),
		}
	}

	fn block_number(&self, hash: &H256) -> Option<u32> {
		self.headers.iter().position(|header| header.hash() == *hash).map(|pos| pos as u32)
	}

	fn block_hash(&self, number: u32) -> Option<H256> {
		self.headers.get(number as usize).map(BlockHeader::hash)
	}
}

impl TransactionProvider for TestStore {
	fn transaction(&self, hash: &H256) -> Option<Transaction> {
		self.transactions.get(hash).map(|&(ref tx, _)| tx.clone())
	}

	fn transaction_index(&self, hash: &H256) -> Option<TransactionIndex> {
		self.transactions.get(hash).map(|&(_, height)| TransactionIndex {
			height: height,
			position: 0,
		})
	}
}

impl UtxoProvider for TestStore {
	fn utxo(&self, outpoint: &OutPoint) -> Option<InputPoint> {
		let produced = self.transactions.get(&outpoint.hash)
			.map(|&(ref tx, _)| (outpoint.index as usize) < tx.outputs.len())
			.unwrap_or(false);

		if produced && !self.spent.contains(outpoint) {
			Some(InputPoint::null())
		} else {
			None
		}
	}

	fn utxo_statinfo(&self) -> UtxoStatInfo {
		UtxoStatInfo {
			buckets: 1,
			rows: self.transactions.len() as u64,
		}
	}
}

fn genesis_chain() -> Vec<IndexedBlock> {
	vec![Network::Mainnet.genesis_block().into()]
}

#[test]
fn test_genesis_acceptance() {
	let store = TestStore::default();
	let consensus = ConsensusParams::new(Network::Mainnet);
	let chain = genesis_chain();
	let genesis = &chain[0];
	let view = ForkChainView::new(&store, None, &chain, 0);
	let stop = StopSignal::new();

	let verifier = BlockVerifier::new(genesis, &consensus, genesis.header.raw.time);
	assert_eq!(verifier.check(&stop), Ok(()));

	let deployments = BlockDeployments::new(&view, 0, genesis.header.raw.version, &consensus);
	let acceptor = BlockAcceptor::new(&view, &consensus, genesis, 0, &deployments);
	assert_eq!(acceptor.check(&stop), Ok(()));

	assert_eq!(work_required(&view, 0, genesis.header.raw.time, &consensus), Compact::new(0x1d00ffff));
}

fn header(previous: &BlockHeader, time: u32, bits: u32) -> BlockHeader {
	BlockHeader {
		version: 1,
		previous_header_hash: previous.hash(),
		merkle_root_hash: H256::default(),
		time: time,
		bits: bits.into(),
		nonce: 0,
	}
}

#[test]
fn test_retarget_boundary_doubles_target() {
	// 2016 headers; the span of the retargeting window is exactly twice the
	// target timespan, so the new target is the previous target doubled
	let bits = 0x1c010000;
	let mut store = TestStore::default();
	store.headers.push(Network::Mainnet.genesis_block().block_header);
	for height in 1..2016u32 {
		let time = if height == 2015 {
			store.headers[0].time + 2 * 14 * 24 * 60 * 60
		} else {
			store.headers[0].time + height * 600
		};
		let previous = store.headers[height as usize - 1].clone();
		store.headers.push(header(&previous, time, bits));
	}

	let consensus = ConsensusParams::new(Network::Mainnet);
	let candidate_header = header(&store.headers[2015], store.headers[2015].time + 600, 0x1c020000);
	let chain = vec![IndexedBlock::from_raw(Block::new(candidate_header.clone(), Vec::new()))];
	let view = ForkChainView::new(&store, Some(2015), &chain, 0);

	assert_eq!(work_required(&view, 2016, candidate_header.time, &consensus), Compact::new(0x1c020000));
}

#[test]
fn test_retarget_is_capped_at_maximum_target() {
	// the previous target already sits at the network maximum, so however
	// slow the window was, the requirement stays at the cap
	let bits = 0x1d00ffff;
	let mut store = TestStore::default();
	store.headers.push(Network::Mainnet.genesis_block().block_header);
	for height in 1..2016u32 {
		let previous = store.headers[height as usize - 1].clone();
		let time = store.headers[0].time + height * 6000;
		store.headers.push(header(&previous, time, bits));
	}

	let consensus = ConsensusParams::new(Network::Mainnet);
	let candidate_header = header(&store.headers[2015], store.headers[2015].time + 600, bits);
	let chain = vec![IndexedBlock::from_raw(Block::new(candidate_header.clone(), Vec::new()))];
	let view = ForkChainView::new(&store, Some(2015), &chain, 0);

	assert_eq!(work_required(&view, 2016, candidate_header.time, &consensus), Compact::new(0x1d00ffff));
}

#[test]
fn test_work_between_retargets_repeats_previous_bits() {
	let mut store = TestStore::default();
	store.headers.push(Network::Mainnet.genesis_block().block_header);
	let previous = store.headers[0].clone();
	store.headers.push(header(&previous, previous.time + 600, 0x1d00ffff));

	let consensus = ConsensusParams::new(Network::Mainnet);
	let candidate_header = header(&store.headers[1], store.headers[1].time + 600, 0x1d00ffff);
	let chain = vec![IndexedBlock::from_raw(Block::new(candidate_header.clone(), Vec::new()))];
	let view = ForkChainView::new(&store, Some(1), &chain, 0);

	assert_eq!(work_required(&view, 2, candidate_header.time, &consensus), Compact::new(0x1d00ffff));
}

#[test]
fn test_median_time_past() {
	let mut store = TestStore::default();
	store.headers.push(Network::Mainnet.genesis_block().block_header);
	for height in 1..12u32 {
		let previous = store.headers[height as usize - 1].clone();
		// deliberately unsorted timestamps
		let time = store.headers[0].time + (12 - height) * 600;
		store.headers.push(header(&previous, time, 0x1d00ffff));
	}

	let candidate_header = header(&store.headers[11], store.headers[0].time + 100_000, 0x1d00ffff);
	let chain = vec![IndexedBlock::from_raw(Block::new(candidate_header, Vec::new()))];
	let view = ForkChainView::new(&store, Some(11), &chain, 0);

	// 11 most recent preceding timestamps are heights 1..=11, offsets
	// 11*600 down to 1*600; the median offset is 6*600
	assert_eq!(view.median_time_past(12), store.headers[0].time + 6 * 600);
}

#[test]
fn test_deployment_counting() {
	let mut store = TestStore::default();
	store.headers.push(Network::Mainnet.genesis_block().block_header);
	for height in 1..1001u32 {
		let previous = store.headers[height as usize - 1].clone();
		let mut upgraded = header(&previous, store.headers[0].time + height * 600, 0x1d00ffff);
		// 800 of the last 1000 headers advertise version 2: activated
		// (>= 750), not enforced (< 950)
		upgraded.version = if height > 200 { 2 } else { 1 };
		store.headers.push(upgraded);
	}

	let consensus = ConsensusParams::new(Network::Mainnet);
	let candidate_header = header(&store.headers[1000], store.headers[1000].time + 600, 0x1d00ffff);
	let chain = vec![IndexedBlock::from_raw(Block::new(candidate_header.clone(), Vec::new()))];
	let view = ForkChainView::new(&store, Some(1000), &chain, 0);

	let deployments = BlockDeployments::new(&view, 1001, 2, &consensus);
	assert_eq!(deployments.minimum_version(), 1);
	assert!(deployments.is_bip34_active());
	assert!(!deployments.is_bip66_active());

	// an old-version block does not commit to the counted rule
	let deployments = BlockDeployments::new(&view, 1001, 1, &consensus);
	assert!(!deployments.is_bip34_active());
}

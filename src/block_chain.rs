//! Public chain entry point: a single FIFO write strand, seqlock-guarded
//! reads and a process-wide lock on the database directory.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;
use fs2::FileExt;
use parking_lot::Mutex;
use chain::{BlockHeader, IndexedBlock, OutPoint, Transaction};
use db::BlockChainDatabase;
use network::ConsensusParams;
use primitives::hash::{H160, H256};
use script::ScriptVerifier;
use storage::{BlockHeaderProvider, BlockProvider, BlockRef, HistoryProvider, HistoryRow,
	InputPoint, StealthPrefix, StealthProvider, StealthRow, Store, TransactionIndex,
	TransactionProvider, UtxoProvider, UtxoStatInfo};
use verification::{Error, StopSignal};
use block_detail::BlockInfo;
use organizer::{Organizer, ReorganizeHandler};
use orphan_pool::OrphanPool;

/// Name of the sentinel file holding the exclusive process lock.
const LOCK_FILE: &'static str = "db-lock";

/// How long a reader sleeps while a write is in progress.
const SEQLOCK_RETRY_DELAY_MS: u64 = 10;

/// Protocol limit incorporated into locator queries.
const MAX_GET_BLOCKS: u32 = 500;

/// Write strand tasks.
enum WriteTask {
	/// Store a block through the orphan pool and the organizer.
	Store(IndexedBlock, Sender<Result<BlockInfo, Error>>),
	/// Append a block without validation.
	Import(IndexedBlock, Sender<Result<(), Error>>),
	/// Stop the write strand.
	Stop,
}

/// Completion handle of a queued write.
pub struct WriteCompletion<T> {
	receiver: Receiver<T>,
}

impl<T> WriteCompletion<T> {
	/// Block until the write strand has processed the task.
	pub fn wait(self) -> T {
		self.receiver.recv().expect("write strand replies before dropping a task; qed")
	}
}

/// The blockchain facade.
///
/// All mutations are queued onto a single worker thread and performed
/// under an odd seqlock value; queries run on the caller's thread, retried
/// until they observe a stable even seqlock.
pub struct BlockChain {
	database: Arc<BlockChainDatabase>,
	seqlock: Arc<AtomicU64>,
	stop: StopSignal,
	subscribers: Arc<Mutex<Vec<ReorganizeHandler>>>,
	write_sender: Mutex<Sender<WriteTask>>,
	write_thread: Mutex<Option<thread::JoinHandle<()>>>,
	lock_file: Mutex<Option<File>>,
	data_path: PathBuf,
}

impl BlockChain {
	/// Open a chain over the given data directory.
	pub fn open<P: AsRef<Path>>(
		path: P,
		consensus: ConsensusParams,
		script_verifier: Arc<ScriptVerifier>,
		orphan_capacity: usize,
	) -> Result<Self, Error> {
		let database = BlockChainDatabase::open(path.as_ref())
			.map_err(|err| Error::Database(err.into()))?;
		Ok(Self::with_database(path, database, consensus, script_verifier, orphan_capacity))
	}

	/// Open with an explicit UTXO bucket count (tests use small tables).
	pub fn open_with_utxo_buckets<P: AsRef<Path>>(
		path: P,
		utxo_buckets: u64,
		consensus: ConsensusParams,
		script_verifier: Arc<ScriptVerifier>,
		orphan_capacity: usize,
	) -> Result<Self, Error> {
		let database = BlockChainDatabase::open_with_utxo_buckets(path.as_ref(), utxo_buckets)
			.map_err(|err| Error::Database(err.into()))?;
		Ok(Self::with_database(path, database, consensus, script_verifier, orphan_capacity))
	}

	fn with_database<P: AsRef<Path>>(
		path: P,
		database: BlockChainDatabase,
		consensus: ConsensusParams,
		script_verifier: Arc<ScriptVerifier>,
		orphan_capacity: usize,
	) -> Self {
		let database = Arc::new(database);
		let seqlock = Arc::new(AtomicU64::new(0));
		let stop = StopSignal::new();
		let subscribers = Arc::new(Mutex::new(Vec::new()));
		let (sender, receiver) = channel();

		let thread = {
			let database = database.clone();
			let seqlock = seqlock.clone();
			let stop = stop.clone();
			let subscribers = subscribers.clone();
			thread::Builder::new()
				.name("Chain write thread".to_string())
				.spawn(move || write_worker(
					database,
					consensus,
					script_verifier,
					subscribers,
					seqlock,
					stop,
					receiver,
					orphan_capacity,
				))
				.expect("Error creating chain write thread")
		};

		BlockChain {
			database: database,
			seqlock: seqlock,
			stop: stop,
			subscribers: subscribers,
			write_sender: Mutex::new(sender),
			write_thread: Mutex::new(Some(thread)),
			lock_file: Mutex::new(None),
			data_path: path.as_ref().to_path_buf(),
		}
	}

	/// Acquire the exclusive process lock on the data directory. Returns
	/// false if another process holds it.
	pub fn start(&self) -> bool {
		let lock_path = self.data_path.join(LOCK_FILE);
		let file = match OpenOptions::new().write(true).create(true).open(&lock_path) {
			Ok(file) => file,
			Err(err) => {
				warn!(target: "chain", "cannot touch the lock file: {}", err);
				return false;
			},
		};

		if file.try_lock_exclusive().is_err() {
			return false;
		}

		*self.lock_file.lock() = Some(file);
		true
	}

	/// Request a stop: in-flight validation aborts, queued and new writes
	/// are refused, the write strand drains and the process lock is
	/// released.
	pub fn stop(&self) {
		self.stop.stop();
		let _ = self.write_sender.lock().send(WriteTask::Stop);

		if let Some(thread) = self.write_thread.lock().take() {
			thread.join().expect("Clean shutdown.");
		}

		if let Some(file) = self.lock_file.lock().take() {
			let _ = file.unlock();
		}
	}

	/// Queue a block for storage. The block travels through the orphan
	/// pool and the organizer on the write strand; the returned completion
	/// resolves once its fate is known.
	pub fn store(&self, block: IndexedBlock) -> WriteCompletion<Result<BlockInfo, Error>> {
		let (sender, receiver) = channel();
		let task = WriteTask::Store(block, sender);

		if let Err(send_error) = self.write_sender.lock().send(task) {
			if let WriteTask::Store(_, sender) = send_error.0 {
				let _ = sender.send(Err(Error::ServiceStopped));
			}
		}

		WriteCompletion {
			receiver: receiver,
		}
	}

	/// Queue a block for unvalidated append on top of the current chain.
	pub fn import(&self, block: IndexedBlock) -> WriteCompletion<Result<(), Error>> {
		let (sender, receiver) = channel();
		let task = WriteTask::Import(block, sender);

		if let Err(send_error) = self.write_sender.lock().send(task) {
			if let WriteTask::Import(_, sender) = send_error.0 {
				let _ = sender.send(Err(Error::ServiceStopped));
			}
		}

		WriteCompletion {
			receiver: receiver,
		}
	}

	/// Subscribe to reorganization notifications.
	pub fn subscribe_reorganize(&self, handler: ReorganizeHandler) {
		self.subscribers.lock().push(handler);
	}

	/// Run a query under the seqlock read protocol: wait out writers, run,
	/// publish only if no write intervened.
	fn fetch<F, R>(&self, read: F) -> R where F: Fn(&BlockChainDatabase) -> R {
		loop {
			let lock = self.seqlock.load(Ordering::SeqCst);
			if lock % 2 == 1 {
				// sleeping while waiting for the write to complete
				thread::sleep(Duration::from_millis(SEQLOCK_RETRY_DELAY_MS));
				continue;
			}

			let result = read(&self.database);
			if self.seqlock.load(Ordering::SeqCst) == lock {
				return result;
			}
		}
	}

	pub fn fetch_last_height(&self) -> Result<u32, Error> {
		self.fetch(|db| db.best_block().map(|best| best.number).ok_or(Error::NotFound))
	}

	pub fn fetch_block_header(&self, block_ref: BlockRef) -> Result<BlockHeader, Error> {
		self.fetch(|db| db.block_header(block_ref.clone()).ok_or(Error::NotFound))
	}

	pub fn fetch_block_height(&self, hash: &H256) -> Result<u32, Error> {
		self.fetch(|db| db.block_number(hash).ok_or(Error::NotFound))
	}

	pub fn fetch_block_transaction_hashes(&self, hash: &H256) -> Result<Vec<H256>, Error> {
		self.fetch(|db| {
			if !db.contains_block(BlockRef::Hash(hash.clone())) {
				return Err(Error::NotFound);
			}
			Ok(db.block_transaction_hashes(BlockRef::Hash(hash.clone())))
		})
	}

	pub fn fetch_transaction(&self, hash: &H256) -> Result<Transaction, Error> {
		self.fetch(|db| db.transaction(hash).ok_or(Error::NotFound))
	}

	pub fn fetch_transaction_index(&self, hash: &H256) -> Result<TransactionIndex, Error> {
		self.fetch(|db| db.transaction_index(hash).ok_or(Error::NotFound))
	}

	/// Input point recorded for the outpoint; `UnspentOutput` when the
	/// outpoint has no entry.
	pub fn fetch_spend(&self, outpoint: &OutPoint) -> Result<InputPoint, Error> {
		self.fetch(|db| db.utxo(outpoint).ok_or(Error::UnspentOutput))
	}

	pub fn fetch_history(&self, address_hash: &H160, limit: u64, from_height: u32) -> Vec<HistoryRow> {
		self.fetch(|db| db.history(address_hash, limit, from_height))
	}

	pub fn fetch_stealth(&self, prefix: StealthPrefix, from_height: u32) -> Vec<StealthRow> {
		self.fetch(|db| db.stealth(prefix, from_height))
	}

	pub fn utxo_statinfo(&self) -> UtxoStatInfo {
		self.fetch(|db| db.utxo_statinfo())
	}

	/// Hashes of main-chain blocks at the locator heights: the last ten,
	/// then exponentially sparser down to the genesis block.
	pub fn fetch_block_locator(&self) -> Result<Vec<H256>, Error> {
		self.fetch(|db| {
			let best = db.best_block().ok_or(Error::NotFound)?;
			block_locator_indexes(best.number).into_iter()
				.map(|height| db.block_hash(height).ok_or(Error::NotFound))
				.collect()
		})
	}

	/// Main-chain block hashes following the first locator hash we know,
	/// bounded by `hash_stop`, `threshold` and the protocol limit.
	pub fn fetch_locator_blocks(
		&self,
		locator: &[H256],
		hash_stop: &H256,
		threshold: &H256,
	) -> Vec<H256> {
		self.fetch(|db| {
			// find the first block height; with no locator hash on our
			// chain the walk starts at the genesis block
			let mut start = 0;
			for hash in locator {
				if let Some(height) = db.block_number(hash) {
					start = height;
					break;
				}
			}

			// the maximum stop returns up to MAX_GET_BLOCKS hashes
			let mut stop = start + MAX_GET_BLOCKS + 1;
			if !hash_stop.is_zero() {
				if let Some(height) = db.block_number(hash_stop) {
					stop = ::std::cmp::min(height, stop);
				}
			}

			// a threshold above the start becomes the new start
			if !threshold.is_zero() {
				if let Some(height) = db.block_number(threshold) {
					start = ::std::cmp::max(height, start);
				}
			}

			let mut hashes = Vec::new();
			for height in start + 1..stop {
				match db.block_hash(height) {
					Some(hash) => hashes.push(hash),
					None => break,
				}
			}

			hashes
		})
	}

	/// The subset of `hashes` missing from the block store.
	pub fn fetch_missing_block_hashes(&self, hashes: &[H256]) -> Vec<H256> {
		self.fetch(|db| hashes.iter()
			.filter(|hash| db.block_number(hash).is_none())
			.cloned()
			.collect())
	}
}

impl Drop for BlockChain {
	fn drop(&mut self) {
		self.stop();
	}
}

/// Heights sampled by a block locator: the last ten, then each step
/// doubling, always ending at the genesis block.
fn block_locator_indexes(top: u32) -> Vec<u32> {
	let mut indexes = Vec::new();
	let mut step = 1i64;
	let mut index = top as i64;

	while index > 0 {
		if indexes.len() >= 10 {
			step *= 2;
		}
		indexes.push(index as u32);
		index -= step;
	}

	indexes.push(0);
	indexes
}

fn start_write(seqlock: &AtomicU64) {
	let lock = seqlock.fetch_add(1, Ordering::SeqCst) + 1;
	// seqlock is now odd
	debug_assert_eq!(lock % 2, 1);
}

fn stop_write(seqlock: &AtomicU64) {
	let lock = seqlock.fetch_add(1, Ordering::SeqCst) + 1;
	// seqlock is now even
	debug_assert_eq!(lock % 2, 0);
}

fn write_worker(
	database: Arc<BlockChainDatabase>,
	consensus: ConsensusParams,
	script_verifier: Arc<ScriptVerifier>,
	subscribers: Arc<Mutex<Vec<ReorganizeHandler>>>,
	seqlock: Arc<AtomicU64>,
	stop: StopSignal,
	receiver: Receiver<WriteTask>,
	orphan_capacity: usize,
) {
	let mut orphans = OrphanPool::new(orphan_capacity);
	let mut organizer = Organizer::new(
		database.clone(),
		consensus,
		script_verifier,
		subscribers,
		stop.clone(),
	);

	loop {
		let task = match receiver.recv() {
			Ok(task) => task,
			Err(_) => break,
		};

		match task {
			WriteTask::Store(block, completion) => {
				let result = do_store(&database, &mut organizer, &mut orphans, &seqlock, &stop, block);
				let _ = completion.send(result);
			},
			WriteTask::Import(block, completion) => {
				let result = do_import(&database, &seqlock, &stop, block);
				let _ = completion.send(result);
			},
			WriteTask::Stop => break,
		}
	}

	// refuse everything still queued
	loop {
		match receiver.try_recv() {
			Ok(WriteTask::Store(_, completion)) => {
				let _ = completion.send(Err(Error::ServiceStopped));
			},
			Ok(WriteTask::Import(_, completion)) => {
				let _ = completion.send(Err(Error::ServiceStopped));
			},
			Ok(WriteTask::Stop) => (),
			Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
		}
	}

	trace!(target: "chain", "Stopping chain write thread");
}

fn do_store(
	database: &BlockChainDatabase,
	organizer: &mut Organizer,
	orphans: &mut OrphanPool,
	seqlock: &AtomicU64,
	stop: &StopSignal,
	block: IndexedBlock,
) -> Result<BlockInfo, Error> {
	if stop.is_stopped() {
		return Err(Error::ServiceStopped);
	}

	start_write(seqlock);
	let result = store_under_lock(database, organizer, orphans, block);
	stop_write(seqlock);
	result
}

fn store_under_lock(
	database: &BlockChainDatabase,
	organizer: &mut Organizer,
	orphans: &mut OrphanPool,
	block: IndexedBlock,
) -> Result<BlockInfo, Error> {
	let hash = block.hash().clone();

	if database.block_number(&hash).is_some() {
		return Err(Error::Duplicate);
	}

	organizer.clear_outcomes();

	if !orphans.add(block) {
		return Err(Error::Duplicate);
	}

	organizer.organize(orphans)?;

	if let Some(height) = organizer.take_confirmed(&hash) {
		return Ok(BlockInfo::confirmed(height));
	}

	if let Some(error) = organizer.take_rejected(&hash) {
		return Err(error);
	}

	Ok(BlockInfo::orphan())
}

fn do_import(
	database: &BlockChainDatabase,
	seqlock: &AtomicU64,
	stop: &StopSignal,
	block: IndexedBlock,
) -> Result<(), Error> {
	if stop.is_stopped() {
		return Err(Error::ServiceStopped);
	}

	start_write(seqlock);
	let height = database.best_block().map(|best| best.number + 1).unwrap_or(0);
	let result = database.push_block(&block, height).map_err(Error::from);
	stop_write(seqlock);
	result
}

#[cfg(test)]
mod tests {
	extern crate tempdir;

	use std::sync::Arc;
	use parking_lot::Mutex;
	use self::tempdir::TempDir;
	use chain::{IndexedBlock, OutPoint};
	use network::{ConsensusParams, Network};
	use primitives::hash::H256;
	use script::AcceptingScriptVerifier;
	use storage::BlockRef;
	use verification::Error;
	use block_detail::{BlockInfo, BlockStatus};
	use test_chain::ChainBuilder;
	use super::{block_locator_indexes, BlockChain};

	fn open_chain(dir: &TempDir) -> BlockChain {
		BlockChain::open_with_utxo_buckets(
			dir.path(),
			1009,
			ConsensusParams::new(Network::Unitest),
			Arc::new(AcceptingScriptVerifier),
			50,
		).unwrap()
	}

	fn coinbase_outpoint(block: &IndexedBlock) -> OutPoint {
		OutPoint {
			hash: block.transactions[0].hash.clone(),
			index: 0,
		}
	}

	#[test]
	fn test_store_chain_of_blocks() {
		let dir = TempDir::new("chain").unwrap();
		let chain = open_chain(&dir);
		assert!(chain.start());

		let builder = ChainBuilder::new(Network::Unitest);
		let genesis = builder.genesis();
		let blocks = builder.generate(2);

		assert_eq!(chain.store(genesis.clone()).wait(), Ok(BlockInfo::confirmed(0)));
		assert_eq!(chain.store(blocks[0].clone()).wait(), Ok(BlockInfo::confirmed(1)));
		assert_eq!(chain.store(blocks[1].clone()).wait(), Ok(BlockInfo::confirmed(2)));

		// repeated store of a connected block
		assert_eq!(chain.store(blocks[0].clone()).wait(), Err(Error::Duplicate));

		assert_eq!(chain.fetch_last_height(), Ok(2));
		assert_eq!(chain.fetch_block_height(blocks[1].hash()), Ok(2));
		assert_eq!(
			chain.fetch_block_header(BlockRef::Number(1)),
			Ok(blocks[0].header.raw.clone())
		);
		assert_eq!(
			chain.fetch_block_header(BlockRef::Hash(blocks[0].hash().clone())),
			Ok(blocks[0].header.raw.clone())
		);

		let coinbase_hash = blocks[1].transactions[0].hash.clone();
		assert_eq!(
			chain.fetch_block_transaction_hashes(blocks[1].hash()),
			Ok(vec![coinbase_hash.clone()])
		);
		assert_eq!(chain.fetch_transaction(&coinbase_hash), Ok(blocks[1].transactions[0].raw.clone()));
		assert_eq!(chain.fetch_transaction_index(&coinbase_hash).map(|index| index.height), Ok(2));

		// fresh coinbase outputs are unspent
		assert!(chain.fetch_spend(&coinbase_outpoint(&blocks[1])).is_ok());
		assert_eq!(chain.fetch_spend(&OutPoint { hash: H256::from(7), index: 0 }), Err(Error::UnspentOutput));

		chain.stop();
	}

	#[test]
	fn test_store_orphan_connects_with_parent() {
		let dir = TempDir::new("chain").unwrap();
		let chain = open_chain(&dir);
		assert!(chain.start());

		let builder = ChainBuilder::new(Network::Unitest);
		let genesis = builder.genesis();
		let blocks = builder.generate(2);

		assert_eq!(chain.store(genesis.clone()).wait(), Ok(BlockInfo::confirmed(0)));

		// the child arrives before its parent
		let info = chain.store(blocks[1].clone()).wait().unwrap();
		assert_eq!(info.status, BlockStatus::Orphan);
		assert_eq!(chain.fetch_last_height(), Ok(0));

		// the parent pulls the whole chain in
		assert_eq!(chain.store(blocks[0].clone()).wait(), Ok(BlockInfo::confirmed(1)));
		assert_eq!(chain.fetch_last_height(), Ok(2));
		assert_eq!(chain.fetch_block_height(blocks[1].hash()), Ok(2));

		// storing the pooled duplicate again is refused
		assert_eq!(chain.store(blocks[1].clone()).wait(), Err(Error::Duplicate));

		chain.stop();
	}

	#[test]
	fn test_reorganization_notifies_subscribers() {
		let dir = TempDir::new("chain").unwrap();
		let chain = open_chain(&dir);
		assert!(chain.start());

		let events = Arc::new(Mutex::new(Vec::new()));
		{
			let events = events.clone();
			chain.subscribe_reorganize(Box::new(move |event| {
				events.lock().push((
					event.fork_height,
					event.disconnected.iter().map(|block| block.hash().clone()).collect::<Vec<H256>>(),
					event.connected.iter().map(|block| block.hash().clone()).collect::<Vec<H256>>(),
				));
			}));
		}

		let builder = ChainBuilder::new(Network::Unitest);
		let genesis = builder.genesis();
		let main = builder.generate(10);

		chain.store(genesis.clone()).wait().unwrap();
		for block in &main {
			chain.store(block.clone()).wait().unwrap();
		}
		assert_eq!(chain.fetch_last_height(), Ok(10));

		// a heavier fork rooted at height 7: five blocks, stored tip-first
		// so the pool holds the whole chain before it becomes attachable
		let fork = builder.generate_from(&main[6], 5, 1000);
		for block in fork.iter().skip(1) {
			let info = chain.store(block.clone()).wait().unwrap();
			assert_eq!(info.status, BlockStatus::Orphan);
		}
		assert_eq!(chain.store(fork[0].clone()).wait(), Ok(BlockInfo::confirmed(8)));

		assert_eq!(chain.fetch_last_height(), Ok(12));
		assert_eq!(chain.fetch_block_height(fork[4].hash()), Ok(12));
		assert_eq!(chain.fetch_block_height(main[9].hash()), Err(Error::NotFound));

		// disconnected coinbase outputs left the utxo index, connected
		// ones entered it
		assert_eq!(chain.fetch_spend(&coinbase_outpoint(&main[9])), Err(Error::UnspentOutput));
		assert!(chain.fetch_spend(&coinbase_outpoint(&fork[4])).is_ok());

		let events = events.lock();
		let last_event = events.last().unwrap();
		assert_eq!(last_event.0, Some(7));
		assert_eq!(last_event.1, main[7..10].iter().map(|block| block.hash().clone()).collect::<Vec<H256>>());
		assert_eq!(last_event.2, fork.iter().map(|block| block.hash().clone()).collect::<Vec<H256>>());

		chain.stop();
	}

	#[test]
	fn test_double_spend_within_block_is_rejected() {
		let dir = TempDir::new("chain").unwrap();
		let chain = open_chain(&dir);
		assert!(chain.start());

		let builder = ChainBuilder::new(Network::Unitest);
		let genesis = builder.genesis();
		// coinbases need 100 confirmations before they may be spent
		let blocks = builder.generate(101);

		chain.store(genesis.clone()).wait().unwrap();
		for block in &blocks {
			chain.store(block.clone()).wait().unwrap();
		}
		assert_eq!(chain.fetch_last_height(), Ok(101));

		let mature_coinbase = coinbase_outpoint(&blocks[0]);
		let tx_a = builder.spend(mature_coinbase.clone(), 50 * 100_000_000);
		let output_a = OutPoint { hash: tx_a.hash(), index: 0 };
		let tx_b = builder.spend(output_a.clone(), 50 * 100_000_000);
		// a conflicting spend of the same output, distinct by value
		let mut tx_c = builder.spend(output_a.clone(), 50 * 100_000_000);
		tx_c.outputs[0].value = 49 * 100_000_000;

		let invalid = builder.block_with_transactions(
			&blocks[100],
			vec![tx_a.clone(), tx_b.clone(), tx_c],
			7000,
		);
		assert_eq!(chain.store(invalid).wait(), Err(Error::ValidateInputsFailed));

		// nothing changed: the chain kept its height and the mature
		// coinbase output is still unspent
		assert_eq!(chain.fetch_last_height(), Ok(101));
		assert!(chain.fetch_spend(&mature_coinbase).is_ok());

		// the same-block spend pattern without the conflict connects
		let valid = builder.block_with_transactions(&blocks[100], vec![tx_a, tx_b.clone()], 7001);
		assert_eq!(chain.store(valid).wait(), Ok(BlockInfo::confirmed(102)));

		// the spent coinbase output left the utxo index, the fresh output
		// of the spending chain's tip is present
		assert_eq!(chain.fetch_spend(&mature_coinbase), Err(Error::UnspentOutput));
		assert!(chain.fetch_spend(&OutPoint { hash: tx_b.hash(), index: 0 }).is_ok());

		chain.stop();
	}

	#[test]
	fn test_import_skips_validation() {
		let dir = TempDir::new("chain").unwrap();
		let chain = open_chain(&dir);
		assert!(chain.start());

		let builder = ChainBuilder::new(Network::Unitest);
		assert_eq!(chain.import(builder.genesis()).wait(), Ok(()));
		let blocks = builder.generate(1);
		assert_eq!(chain.import(blocks[0].clone()).wait(), Ok(()));
		assert_eq!(chain.fetch_last_height(), Ok(1));

		chain.stop();
	}

	#[test]
	fn test_stopped_chain_refuses_writes() {
		let dir = TempDir::new("chain").unwrap();
		let chain = open_chain(&dir);
		assert!(chain.start());
		chain.stop();

		let builder = ChainBuilder::new(Network::Unitest);
		assert_eq!(chain.store(builder.genesis()).wait(), Err(Error::ServiceStopped));
	}

	#[test]
	fn test_start_takes_the_process_lock() {
		let dir = TempDir::new("chain").unwrap();
		let first = open_chain(&dir);
		assert!(first.start());

		let second = open_chain(&dir);
		assert!(!second.start());

		first.stop();
		assert!(second.start());
		second.stop();
	}

	#[test]
	fn test_block_locator_indexes() {
		assert_eq!(block_locator_indexes(0), vec![0]);
		assert_eq!(block_locator_indexes(1), vec![1, 0]);
		assert_eq!(
			block_locator_indexes(15),
			vec![15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 3, 0]
		);
	}

	#[test]
	fn test_fetch_block_locator_and_missing_hashes() {
		let dir = TempDir::new("chain").unwrap();
		let chain = open_chain(&dir);
		assert!(chain.start());

		let builder = ChainBuilder::new(Network::Unitest);
		let genesis = builder.genesis();
		let blocks = builder.generate(3);

		chain.store(genesis.clone()).wait().unwrap();
		for block in &blocks {
			chain.store(block.clone()).wait().unwrap();
		}

		let locator = chain.fetch_block_locator().unwrap();
		assert_eq!(locator[0], blocks[2].hash().clone());
		assert_eq!(locator.last().unwrap(), genesis.hash());

		// a peer locator rooted at the genesis block gets everything above
		let hashes = chain.fetch_locator_blocks(
			&[genesis.hash().clone()],
			&H256::default(),
			&H256::default(),
		);
		assert_eq!(hashes, blocks.iter().map(|block| block.hash().clone()).collect::<Vec<H256>>());

		let unknown = H256::from(9);
		let missing = chain.fetch_missing_block_hashes(&[genesis.hash().clone(), unknown.clone()]);
		assert_eq!(missing, vec![unknown]);

		chain.stop();
	}
}

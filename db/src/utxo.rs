//! Unspent-output index.

use std::path::Path;
use byteorder::{ByteOrder, LittleEndian};
use chain::OutPoint;
use crypto::sha256;
use primitives::hash::H256;
use storage::{InputPoint, UtxoStatInfo};
use record_table::RecordTable;
use error::Error;

/// Bucket count of the production table. Fixed for the life of the file;
/// sized for a load factor below one half at the expected set size.
pub const UTXO_NUMBER_BUCKETS: u64 = 228_110_589;

/// Stored value: spender tx hash + spender input index.
const VALUE_SIZE: usize = 32 + 4;

/// Derive the table key of an outpoint.
///
/// The outpoint index has almost no bit entropy, so the pair is re-hashed
/// to restore the uniform distribution the table presumes. This digest
/// defines on-disk key identity and must never change.
fn outpoint_to_key(outpoint: &OutPoint) -> [u8; 32] {
	let mut data = [0u8; 36];
	data[..32].copy_from_slice(&*outpoint.hash);
	LittleEndian::write_u32(&mut data[32..], outpoint.index);
	sha256(&data).take()
}

/// Persistent map from outpoints to the input points recorded for them.
///
/// An outpoint is present iff it is unspent on the main chain.
pub struct UtxoDatabase {
	table: RecordTable,
}

impl UtxoDatabase {
	/// Open the production-size table.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
		Self::with_buckets(path, UTXO_NUMBER_BUCKETS)
	}

	/// Open a table with an explicit bucket count. The count must match
	/// the one the file was created with.
	pub fn with_buckets<P: AsRef<Path>>(path: P, buckets: u64) -> Result<Self, Error> {
		let table = RecordTable::open(path.as_ref(), buckets, VALUE_SIZE)?;
		Ok(UtxoDatabase {
			table: table,
		})
	}

	/// Input point recorded for the outpoint, if it is unspent.
	pub fn get(&self, outpoint: &OutPoint) -> Option<InputPoint> {
		let key = outpoint_to_key(outpoint);
		self.table.get(&key).map(|value| InputPoint {
			hash: H256::from(&value[..32]),
			index: LittleEndian::read_u32(&value[32..]),
		})
	}

	/// Store an entry for the outpoint. Presumes the outpoint is absent;
	/// callers ensure uniqueness by a preceding `remove` or by invariant.
	pub fn store(&mut self, outpoint: &OutPoint, input: &InputPoint) -> Result<(), Error> {
		let key = outpoint_to_key(outpoint);
		self.table.store(&key, |value| {
			value[..32].copy_from_slice(&*input.hash);
			LittleEndian::write_u32(&mut value[32..], input.index);
		})
	}

	/// Delete the outpoint's entry. The entry must exist.
	pub fn remove(&mut self, outpoint: &OutPoint) {
		let key = outpoint_to_key(outpoint);
		let existed = self.table.unlink(&key);
		assert!(existed, "caller asserted outpoint presence");
	}

	/// Flush the table so things are consistent on disk.
	/// Done at the end of every block write.
	pub fn sync(&mut self) -> Result<(), Error> {
		self.table.sync()
	}

	/// Statistical info about the index.
	pub fn statinfo(&self) -> UtxoStatInfo {
		UtxoStatInfo {
			buckets: self.table.buckets(),
			rows: self.table.rows(),
		}
	}
}

#[cfg(test)]
mod tests {
	extern crate tempdir;

	use self::tempdir::TempDir;
	use chain::OutPoint;
	use storage::InputPoint;
	use super::UtxoDatabase;

	fn outpoint(fill: u8, index: u32) -> OutPoint {
		OutPoint {
			hash: [fill; 32].into(),
			index: index,
		}
	}

	fn input_point(fill: u8, index: u32) -> InputPoint {
		InputPoint {
			hash: [fill; 32].into(),
			index: index,
		}
	}

	#[test]
	fn test_utxo_round_trip() {
		let dir = TempDir::new("utxo").unwrap();
		let mut database = UtxoDatabase::with_buckets(dir.path().join("utxo"), 101).unwrap();

		let point = outpoint(0x01, 7);
		let spend = input_point(0xaa, 3);

		assert_eq!(database.get(&point), None);
		database.store(&point, &spend).unwrap();
		assert_eq!(database.get(&point), Some(spend));

		database.remove(&point);
		assert_eq!(database.get(&point), None);
	}

	#[test]
	#[should_panic]
	fn test_utxo_remove_absent_asserts() {
		let dir = TempDir::new("utxo").unwrap();
		let mut database = UtxoDatabase::with_buckets(dir.path().join("utxo"), 101).unwrap();
		database.remove(&outpoint(0x01, 7));
	}

	#[test]
	fn test_utxo_index_distinguishes_outpoints() {
		let dir = TempDir::new("utxo").unwrap();
		let mut database = UtxoDatabase::with_buckets(dir.path().join("utxo"), 101).unwrap();

		// same tx hash, different output index: distinct keys by re-hash
		database.store(&outpoint(0x01, 0), &input_point(0xaa, 0)).unwrap();
		database.store(&outpoint(0x01, 1), &input_point(0xbb, 1)).unwrap();

		assert_eq!(database.get(&outpoint(0x01, 0)), Some(input_point(0xaa, 0)));
		assert_eq!(database.get(&outpoint(0x01, 1)), Some(input_point(0xbb, 1)));
		assert_eq!(database.get(&outpoint(0x01, 2)), None);
	}

	#[test]
	fn test_utxo_statinfo() {
		let dir = TempDir::new("utxo").unwrap();
		let mut database = UtxoDatabase::with_buckets(dir.path().join("utxo"), 101).unwrap();
		database.store(&outpoint(0x01, 0), &input_point(0xaa, 0)).unwrap();
		database.store(&outpoint(0x02, 0), &input_point(0xbb, 0)).unwrap();

		let statinfo = database.statinfo();
		assert_eq!(statinfo.buckets, 101);
		assert_eq!(statinfo.rows, 2);
	}

	#[test]
	fn test_utxo_digest_collisions_chain() {
		let dir = TempDir::new("utxo").unwrap();
		// a single bucket makes every digest collide
		let mut database = UtxoDatabase::with_buckets(dir.path().join("utxo"), 1).unwrap();

		database.store(&outpoint(0x01, 0), &input_point(0x11, 0)).unwrap();
		database.store(&outpoint(0x02, 0), &input_point(0x22, 0)).unwrap();
		database.store(&outpoint(0x03, 0), &input_point(0x33, 0)).unwrap();

		database.remove(&outpoint(0x02, 0));

		assert_eq!(database.get(&outpoint(0x01, 0)), Some(input_point(0x11, 0)));
		assert_eq!(database.get(&outpoint(0x02, 0)), None);
		assert_eq!(database.get(&outpoint(0x03, 0)), Some(input_point(0x33, 0)));
	}
}

//! Open-addressing hash table chained through fixed-size records.

use byteorder::{ByteOrder, LittleEndian};
use memory_map::MemoryMappedFile;
use record_allocator::RecordAllocator;
use error::Error;

/// Sentinel for an empty bucket or the tail of a chain.
pub const EMPTY_RECORD_INDEX: u32 = 0xffff_ffff;

/// Size of record keys.
const KEY_SIZE: usize = 32;
/// Size of the intrusive next-link embedded after the key.
const LINK_SIZE: usize = 4;

/// Persistent map from 32-byte digests to fixed-size values.
///
/// File layout: `[bucket_index: u32 x buckets]` at offset zero, followed
/// by the allocator region; each record is `[key][next][value]`. The
/// bucket count is fixed for the life of the file; unlinked records leak
/// (there is no free list).
pub struct RecordTable {
	file: MemoryMappedFile,
	buckets: u64,
	value_size: usize,
	allocator: RecordAllocator,
}

impl RecordTable {
	/// Open the table, creating a fresh one if the file did not exist.
	pub fn open(path: &::std::path::Path, buckets: u64, value_size: usize) -> Result<Self, Error> {
		let header_size = buckets * 4;
		let minimum_size = RecordAllocator::minimum_file_size(header_size);
		let record_size = KEY_SIZE + LINK_SIZE + value_size;

		// a file shorter than the bucket header was never fully created
		let fresh = match ::std::fs::metadata(path) {
			Ok(metadata) => metadata.len() < minimum_size,
			Err(_) => true,
		};
		let mut file = MemoryMappedFile::open(path, minimum_size)?;
		let mut allocator = RecordAllocator::new(header_size, record_size);

		if fresh {
			// all buckets start empty
			for chunk in file.data_mut()[..header_size as usize].chunks_mut(4) {
				LittleEndian::write_u32(chunk, EMPTY_RECORD_INDEX);
			}
			allocator.create(&mut file)?;
		} else {
			allocator.start(&file)?;
		}

		Ok(RecordTable {
			file: file,
			buckets: buckets,
			value_size: value_size,
			allocator: allocator,
		})
	}

	/// Number of buckets.
	pub fn buckets(&self) -> u64 {
		self.buckets
	}

	/// Number of records ever allocated.
	pub fn rows(&self) -> u64 {
		self.allocator.count() as u64
	}

	/// Value bytes stored under the key, if present.
	pub fn get(&self, key: &[u8; KEY_SIZE]) -> Option<&[u8]> {
		let mut index = self.read_bucket(self.bucket_index(key));

		while index != EMPTY_RECORD_INDEX {
			let record = self.allocator.record(&self.file, index);
			if &record[..KEY_SIZE] == &key[..] {
				return Some(&self.allocator.record(&self.file, index)[KEY_SIZE + LINK_SIZE..]);
			}

			index = LittleEndian::read_u32(&record[KEY_SIZE..]);
		}

		None
	}

	/// Store a value under the key, prepending it to the bucket chain.
	///
	/// Duplicates are not prevented; callers requiring uniqueness must
	/// `unlink` first.
	pub fn store<F>(&mut self, key: &[u8; KEY_SIZE], write: F) -> Result<(), Error>
		where F: FnOnce(&mut [u8])
	{
		let bucket = self.bucket_index(key);
		let head = self.read_bucket(bucket);

		let index = self.allocator.allocate(&mut self.file)?;
		{
			let record = self.allocator.record_mut(&mut self.file, index);
			record[..KEY_SIZE].copy_from_slice(&key[..]);
			LittleEndian::write_u32(&mut record[KEY_SIZE..KEY_SIZE + LINK_SIZE], head);
			write(&mut record[KEY_SIZE + LINK_SIZE..]);
		}

		// the record becomes reachable only now
		self.write_bucket(bucket, index);
		Ok(())
	}

	/// Remove the key from its bucket chain. The record slot is leaked.
	/// Returns false if the key was absent.
	pub fn unlink(&mut self, key: &[u8; KEY_SIZE]) -> bool {
		let bucket = self.bucket_index(key);
		let mut previous: Option<u32> = None;
		let mut index = self.read_bucket(bucket);

		while index != EMPTY_RECORD_INDEX {
			let next = {
				let record = self.allocator.record(&self.file, index);
				if &record[..KEY_SIZE] == &key[..] {
					None
				} else {
					Some(LittleEndian::read_u32(&record[KEY_SIZE..]))
				}
			};

			match next {
				Some(next) => {
					previous = Some(index);
					index = next;
				},
				None => {
					let unlinked_next = {
						let record = self.allocator.record(&self.file, index);
						LittleEndian::read_u32(&record[KEY_SIZE..])
					};

					match previous {
						Some(previous) => {
							let record = self.allocator.record_mut(&mut self.file, previous);
							LittleEndian::write_u32(&mut record[KEY_SIZE..KEY_SIZE + LINK_SIZE], unlinked_next);
						},
						None => self.write_bucket(bucket, unlinked_next),
					}

					return true;
				},
			}
		}

		false
	}

	/// Persist the record count and flush everything.
	pub fn sync(&mut self) -> Result<(), Error> {
		self.allocator.sync(&mut self.file)
	}

	/// Fold the key into its bucket: XOR of the key's little-endian u32
	/// words, modulo the bucket count.
	fn bucket_index(&self, key: &[u8; KEY_SIZE]) -> u64 {
		let folded = key.chunks(4).fold(0u32, |acc, chunk| acc ^ LittleEndian::read_u32(chunk));
		folded as u64 % self.buckets
	}

	fn read_bucket(&self, bucket: u64) -> u32 {
		let offset = bucket as usize * 4;
		LittleEndian::read_u32(&self.file.data()[offset..offset + 4])
	}

	fn write_bucket(&mut self, bucket: u64, index: u32) {
		let offset = bucket as usize * 4;
		LittleEndian::write_u32(&mut self.file.data_mut()[offset..offset + 4], index);
	}
}

#[cfg(test)]
mod tests {
	extern crate tempdir;

	use self::tempdir::TempDir;
	use super::RecordTable;

	fn key(fill: u8) -> [u8; 32] {
		[fill; 32]
	}

	#[test]
	fn test_record_table_get_store_unlink() {
		let dir = TempDir::new("record_table").unwrap();
		let path = dir.path().join("table");
		let mut table = RecordTable::open(&path, 17, 8).unwrap();

		assert_eq!(table.get(&key(1)), None);

		table.store(&key(1), |value| value.copy_from_slice(&[1u8; 8])).unwrap();
		table.store(&key(2), |value| value.copy_from_slice(&[2u8; 8])).unwrap();

		assert_eq!(table.get(&key(1)), Some(&[1u8; 8][..]));
		assert_eq!(table.get(&key(2)), Some(&[2u8; 8][..]));
		assert_eq!(table.rows(), 2);

		assert!(table.unlink(&key(1)));
		assert!(!table.unlink(&key(1)));
		assert_eq!(table.get(&key(1)), None);
		assert_eq!(table.get(&key(2)), Some(&[2u8; 8][..]));

		// unlinked slots leak
		assert_eq!(table.rows(), 2);
	}

	#[test]
	fn test_record_table_collision_chain() {
		let dir = TempDir::new("record_table").unwrap();
		let path = dir.path().join("table");
		// single bucket forces every key into one chain
		let mut table = RecordTable::open(&path, 1, 4).unwrap();

		table.store(&key(1), |value| value.copy_from_slice(&[1u8; 4])).unwrap();
		table.store(&key(2), |value| value.copy_from_slice(&[2u8; 4])).unwrap();
		table.store(&key(3), |value| value.copy_from_slice(&[3u8; 4])).unwrap();

		assert_eq!(table.get(&key(1)), Some(&[1u8; 4][..]));
		assert_eq!(table.get(&key(2)), Some(&[2u8; 4][..]));
		assert_eq!(table.get(&key(3)), Some(&[3u8; 4][..]));

		// removing the middle of the chain re-threads its neighbours
		assert!(table.unlink(&key(2)));
		assert_eq!(table.get(&key(1)), Some(&[1u8; 4][..]));
		assert_eq!(table.get(&key(2)), None);
		assert_eq!(table.get(&key(3)), Some(&[3u8; 4][..]));
	}

	#[test]
	fn test_record_table_reopen() {
		let dir = TempDir::new("record_table").unwrap();
		let path = dir.path().join("table");

		{
			let mut table = RecordTable::open(&path, 17, 8).unwrap();
			table.store(&key(7), |value| value.copy_from_slice(&[7u8; 8])).unwrap();
			table.sync().unwrap();
		}

		let table = RecordTable::open(&path, 17, 8).unwrap();
		assert_eq!(table.get(&key(7)), Some(&[7u8; 8][..]));
		assert_eq!(table.rows(), 1);
	}
}

//! Fixed-size record allocator over a memory-mapped region.

use byteorder::{ByteOrder, LittleEndian};
use memory_map::MemoryMappedFile;
use error::Error;

/// Minimum growth factor of the backing file (3/2).
const GROWTH_NUMERATOR: u64 = 3;
const GROWTH_DENOMINATOR: u64 = 2;

/// Appends fixed-size records past a header offset.
///
/// Layout at `offset`: `[count: u64 little-endian][records...]`.
/// The count is persisted only on `sync`; a crash between an allocation
/// and the next sync leaves unreferenced slots behind, which is tolerable
/// because nothing links to them.
pub struct RecordAllocator {
	offset: u64,
	record_size: usize,
	count: u32,
}

impl RecordAllocator {
	pub fn new(offset: u64, record_size: usize) -> Self {
		RecordAllocator {
			offset: offset,
			record_size: record_size,
			count: 0,
		}
	}

	/// Number of bytes the file must have before the allocator can start.
	pub fn minimum_file_size(offset: u64) -> u64 {
		offset + 8
	}

	/// Initialize a fresh region: zero the persisted count.
	pub fn create(&mut self, file: &mut MemoryMappedFile) -> Result<(), Error> {
		self.count = 0;
		self.write_count(file);
		Ok(())
	}

	/// Load the persisted count. Must be called before any other use of a
	/// previously created region.
	pub fn start(&mut self, file: &MemoryMappedFile) -> Result<(), Error> {
		let data = file.data();
		if (self.offset + 8) as usize > data.len() {
			return Err(Error::InconsistentState("allocator region past end of file"));
		}

		let count = LittleEndian::read_u64(&data[self.offset as usize..]);
		if self.offset + 8 + count * self.record_size as u64 > file.len() {
			return Err(Error::InconsistentState("allocated records past end of file"));
		}

		self.count = count as u32;
		Ok(())
	}

	/// Allocate the next record, growing the file when needed.
	/// Returns the index of the allocated record.
	pub fn allocate(&mut self, file: &mut MemoryMappedFile) -> Result<u32, Error> {
		let index = self.count;
		let required = self.record_end(index as u64 + 1);

		if required > file.len() {
			let grown = file.len() * GROWTH_NUMERATOR / GROWTH_DENOMINATOR;
			file.resize(::std::cmp::max(required, grown))?;
		}

		self.count += 1;
		Ok(index)
	}

	/// Number of allocated records.
	pub fn count(&self) -> u32 {
		self.count
	}

	/// The record's byte range. The index must have been allocated.
	pub fn record<'a>(&self, file: &'a MemoryMappedFile, index: u32) -> &'a [u8] {
		debug_assert!(index < self.count);
		let start = self.record_start(index as u64) as usize;
		&file.data()[start..start + self.record_size]
	}

	/// Mutable variant of `record`.
	pub fn record_mut<'a>(&self, file: &'a mut MemoryMappedFile, index: u32) -> &'a mut [u8] {
		debug_assert!(index < self.count);
		let start = self.record_start(index as u64) as usize;
		&mut file.data_mut()[start..start + self.record_size]
	}

	/// Persist the count and flush the region.
	pub fn sync(&self, file: &mut MemoryMappedFile) -> Result<(), Error> {
		self.write_count(file);
		file.sync()
	}

	fn write_count(&self, file: &mut MemoryMappedFile) {
		let offset = self.offset as usize;
		LittleEndian::write_u64(&mut file.data_mut()[offset..offset + 8], self.count as u64);
	}

	fn record_start(&self, index: u64) -> u64 {
		self.offset + 8 + index * self.record_size as u64
	}

	fn record_end(&self, count: u64) -> u64 {
		self.record_start(count)
	}
}

#[cfg(test)]
mod tests {
	extern crate tempdir;

	use self::tempdir::TempDir;
	use memory_map::MemoryMappedFile;
	use super::RecordAllocator;

	#[test]
	fn test_allocator_grows_and_persists_count() {
		let dir = TempDir::new("allocator").unwrap();
		let path = dir.path().join("records");

		let mut file = MemoryMappedFile::open(&path, RecordAllocator::minimum_file_size(0)).unwrap();
		let mut allocator = RecordAllocator::new(0, 16);
		allocator.create(&mut file).unwrap();

		for expected in 0..100 {
			let index = allocator.allocate(&mut file).unwrap();
			assert_eq!(index, expected);
			allocator.record_mut(&mut file, index)[0] = expected as u8;
		}

		assert_eq!(allocator.count(), 100);
		allocator.sync(&mut file).unwrap();
		drop(allocator);
		drop(file);

		let file = MemoryMappedFile::open(&path, RecordAllocator::minimum_file_size(0)).unwrap();
		let mut allocator = RecordAllocator::new(0, 16);
		allocator.start(&file).unwrap();
		assert_eq!(allocator.count(), 100);
		assert_eq!(allocator.record(&file, 42)[0], 42);
	}
}

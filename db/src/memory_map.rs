//! Growable memory-mapped file region.

use std::fs::{File, OpenOptions};
use std::path::Path;
use memmap2::{MmapMut, MmapOptions};
use error::Error;

/// Memory-mapped file with a contiguous byte view.
///
/// The view stays valid until the next `resize`. All users must quiesce
/// around `resize` calls; the chain facade guarantees that by funnelling
/// every mutation through its single write strand.
pub struct MemoryMappedFile {
	file: File,
	map: MmapMut,
	len: u64,
}

impl MemoryMappedFile {
	/// Open (or create) the file and map it read/write, extending it to at
	/// least `min_len` bytes first.
	pub fn open<P: AsRef<Path>>(path: P, min_len: u64) -> Result<Self, Error> {
		let file = OpenOptions::new()
			.read(true)
			.write(true)
			.create(true)
			.open(path)?;

		let mut len = file.metadata()?.len();
		if len < min_len {
			file.set_len(min_len)?;
			len = min_len;
		}

		let map = unsafe { MmapOptions::new().map_mut(&file)? };

		Ok(MemoryMappedFile {
			file: file,
			map: map,
			len: len,
		})
	}

	/// Length of the mapped region.
	pub fn len(&self) -> u64 {
		self.len
	}

	/// Contiguous view of the file.
	pub fn data(&self) -> &[u8] {
		&self.map
	}

	/// Mutable contiguous view of the file.
	pub fn data_mut(&mut self) -> &mut [u8] {
		&mut self.map
	}

	/// Extend the file to `new_len` bytes and remap, preserving existing
	/// bytes. Shrinking is not supported.
	pub fn resize(&mut self, new_len: u64) -> Result<(), Error> {
		debug_assert!(new_len >= self.len);

		self.map.flush()?;
		self.file.set_len(new_len)?;
		self.map = unsafe { MmapOptions::new().map_mut(&self.file)? };
		self.len = new_len;

		trace!(target: "db", "remapped file to {} bytes", new_len);
		Ok(())
	}

	/// Flush dirty pages to durable storage.
	pub fn sync(&self) -> Result<(), Error> {
		self.map.flush()?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	extern crate tempdir;

	use self::tempdir::TempDir;
	use super::MemoryMappedFile;

	#[test]
	fn test_memory_map_resize_preserves_data() {
		let dir = TempDir::new("memory_map").unwrap();
		let path = dir.path().join("map");

		let mut file = MemoryMappedFile::open(&path, 16).unwrap();
		file.data_mut()[0..4].copy_from_slice(&[1, 2, 3, 4]);
		file.resize(1024).unwrap();

		assert_eq!(file.len(), 1024);
		assert_eq!(&file.data()[0..4], &[1, 2, 3, 4]);
		assert_eq!(file.data()[1023], 0);

		file.sync().unwrap();

		// reopen and check durability
		drop(file);
		let file = MemoryMappedFile::open(&path, 16).unwrap();
		assert_eq!(file.len(), 1024);
		assert_eq!(&file.data()[0..4], &[1, 2, 3, 4]);
	}
}

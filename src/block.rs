//! Block device adapter: opens a single disk image and performs whole-block
//! I/O on it by block index. This is the narrow interface the rest of the
//! crate consumes; no module outside this file touches `std::fs::File`
//! directly.

use crate::error::FsError;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;

/// Fixed block size consumed by the whole file system.
pub const BLOCK_SIZE: usize = 4096;

/// A single open disk image, addressed by 4096-byte block index.
pub struct BlockDevice {
	file: File,
	block_count: u16,
}

impl BlockDevice {
	/// Opens the image at `path`. The image's length must be an exact,
	/// non-zero multiple of [`BLOCK_SIZE`] blocks, and must fit in a `u16`
	/// block count (the width of the superblock's `total_blocks` field).
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FsError> {
		let file = OpenOptions::new()
			.read(true)
			.write(true)
			.open(path)
			.map_err(FsError::OpenFailed)?;
		let len = file.metadata().map_err(FsError::OpenFailed)?.len();
		if len == 0 || len % BLOCK_SIZE as u64 != 0 {
			return Err(FsError::OpenFailed(io::Error::new(
				io::ErrorKind::InvalidData,
				"disk image size is not a non-zero multiple of the block size",
			)));
		}
		let blocks = len / BLOCK_SIZE as u64;
		let block_count = u16::try_from(blocks).map_err(|_| {
			FsError::OpenFailed(io::Error::new(
				io::ErrorKind::InvalidData,
				"disk image has more than 65535 blocks",
			))
		})?;
		log::debug!("opened disk image with {block_count} blocks");
		Ok(Self { file, block_count })
	}

	/// Total number of blocks on the device, including metadata blocks.
	pub fn block_count(&self) -> u16 {
		self.block_count
	}

	/// Reads the block at `index` into `buf`.
	pub fn read_block(&mut self, index: u16, buf: &mut [u8; BLOCK_SIZE]) -> Result<(), FsError> {
		self.seek_to(index).map_err(FsError::BlockIoFailed)?;
		self.file.read_exact(buf).map_err(FsError::BlockIoFailed)
	}

	/// Writes `buf` to the block at `index`.
	pub fn write_block(&mut self, index: u16, buf: &[u8; BLOCK_SIZE]) -> Result<(), FsError> {
		self.seek_to(index).map_err(FsError::BlockIoFailed)?;
		self.file.write_all(buf).map_err(FsError::BlockIoFailed)
	}

	fn seek_to(&mut self, index: u16) -> io::Result<()> {
		self.file
			.seek(SeekFrom::Start(index as u64 * BLOCK_SIZE as u64))?;
		Ok(())
	}

	/// Closes the device, flushing any buffered writes.
	pub fn close(mut self) -> Result<(), FsError> {
		self.file.flush().map_err(FsError::CloseFailed)
	}
}

//! `ecs150fs` is a small, self-contained FAT-style file system layered over
//! a fixed-size virtual block device: a single disk image holds a
//! superblock, a File Allocation Table, a single-level root directory, and
//! a pool of fixed-size data blocks.
//!
//! The crate exposes file creation, deletion, open/close, positional read
//! and write with implicit offset advancement, and introspection, all
//! through the [`FileSystem`] handle.

mod block;
mod descriptor;
mod directory;
mod error;
mod fat;
mod format;
mod io_engine;

pub use block::BLOCK_SIZE;
pub use descriptor::Fd;
pub use directory::Listing;
pub use error::FsError;
pub use error::FsResult;
pub use format::FS_FILENAME_LEN;
pub use format::FS_FILE_MAX_COUNT;
pub use format::FS_OPEN_MAX_COUNT;

use block::BlockDevice;
use descriptor::DescriptorTable;
use fat::Fat;
use format::DirEntry;
use format::Superblock;
use std::fmt;
use std::path::Path;

/// State that exists only while a file system is mounted.
struct Mounted {
	device: BlockDevice,
	superblock: Superblock,
	fat: Fat,
	root_dir: Vec<DirEntry>,
	descriptors: DescriptorTable,
}

/// A handle to an ECS150FS session.
///
/// Every operation in `spec.md` §4 is a method here. An instance starts
/// unmounted; call [`FileSystem::mount`] before any other operation, and
/// [`FileSystem::unmount`] to flush and release it. Unlike the reference
/// implementation's process-wide globals, each `FileSystem` instance owns
/// its own state, so several images could in principle be mounted
/// concurrently through separate handles (still single-threaded per
/// handle; see `spec.md` §5).
#[derive(Default)]
pub struct FileSystem {
	mounted: Option<Mounted>,
}

/// A read-only snapshot returned by [`FileSystem::info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Info {
	pub total_blocks: u16,
	pub fat_block_count: u8,
	pub root_dir_block: u16,
	pub data_start_block: u16,
	pub data_block_count: u16,
	/// `(free entries, total entries)`.
	pub fat_free_ratio: (usize, usize),
	/// `(free entries, total entries)`.
	pub root_dir_free_ratio: (usize, usize),
}

impl fmt::Display for Info {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "FS Info:")?;
		writeln!(f, "total_blk_count={}", self.total_blocks)?;
		writeln!(f, "fat_blk_count={}", self.fat_block_count)?;
		writeln!(f, "rdir_blk={}", self.root_dir_block)?;
		writeln!(f, "data_blk={}", self.data_start_block)?;
		writeln!(f, "data_blk_count={}", self.data_block_count)?;
		writeln!(
			f,
			"fat_free_ratio={}/{}",
			self.fat_free_ratio.0, self.fat_free_ratio.1
		)?;
		write!(
			f,
			"rdir_free_ratio={}/{}",
			self.root_dir_free_ratio.0, self.root_dir_free_ratio.1
		)
	}
}

impl FileSystem {
	/// Creates an unmounted handle.
	pub fn new() -> Self {
		Self { mounted: None }
	}

	fn mounted(&self) -> FsResult<&Mounted> {
		self.mounted.as_ref().ok_or(FsError::NotMounted)
	}

	fn mounted_mut(&mut self) -> FsResult<&mut Mounted> {
		self.mounted.as_mut().ok_or(FsError::NotMounted)
	}

	/// Mounts the disk image at `path`.
	///
	/// Errors: [`FsError::AlreadyMounted`], [`FsError::OpenFailed`],
	/// [`FsError::BadSignature`], [`FsError::BadGeometry`].
	pub fn mount(&mut self, path: impl AsRef<Path>) -> FsResult<()> {
		if self.mounted.is_some() {
			return Err(FsError::AlreadyMounted);
		}

		let mut device = BlockDevice::open(path)?;
		let mut raw_block = [0u8; BLOCK_SIZE];
		device.read_block(0, &mut raw_block)?;
		let superblock = Superblock::parse(&raw_block)?;
		superblock.validate_against_device(device.block_count())?;

		let mut fat_raw = vec![0u8; superblock.fat_blocks() as usize * BLOCK_SIZE];
		for i in 0..superblock.fat_blocks() {
			let mut block = [0u8; BLOCK_SIZE];
			device.read_block(1 + i, &mut block)?;
			let off = i as usize * BLOCK_SIZE;
			fat_raw[off..off + BLOCK_SIZE].copy_from_slice(&block);
		}
		let fat = Fat::parse(&fat_raw, superblock.data_block_count);

		let mut root_block = [0u8; BLOCK_SIZE];
		device.read_block(superblock.root_dir_block, &mut root_block)?;
		let root_dir = format::parse_root_dir(&root_block);

		log::debug!(
			"mounted image: {} blocks, {} data blocks",
			superblock.total_blocks,
			superblock.data_block_count
		);
		self.mounted = Some(Mounted {
			device,
			superblock,
			fat,
			root_dir,
			descriptors: DescriptorTable::new(),
		});
		Ok(())
	}

	/// Flushes the FAT and root directory to disk and unmounts.
	///
	/// Errors: [`FsError::NotMounted`], [`FsError::DescriptorsOpen`].
	pub fn unmount(&mut self) -> FsResult<()> {
		{
			let m = self.mounted()?;
			if m.descriptors.any_open() {
				log::warn!("unmount refused: descriptors still open");
				return Err(FsError::DescriptorsOpen);
			}
		}
		self.flush()?;

		let m = self.mounted.take().expect("checked mounted above");
		m.device.close()?;
		log::debug!("unmounted image");
		Ok(())
	}

	/// Writes the in-memory FAT and root directory back to disk without
	/// unmounting. `spec.md` leaves flush timing optional before `create`;
	/// this method lets a caller flush explicitly, and `unmount` always
	/// calls it.
	pub fn flush(&mut self) -> FsResult<()> {
		let m = self.mounted_mut()?;
		let fat_raw = m.fat.serialize(m.superblock.fat_block_count);
		for i in 0..m.superblock.fat_blocks() {
			let mut block = [0u8; BLOCK_SIZE];
			let off = i as usize * BLOCK_SIZE;
			block.copy_from_slice(&fat_raw[off..off + BLOCK_SIZE]);
			m.device.write_block(1 + i, &block)?;
		}
		let root_raw = format::serialize_root_dir(&m.root_dir);
		m.device.write_block(m.superblock.root_dir_block, &root_raw)?;
		Ok(())
	}

	/// Returns a read-only snapshot of the mounted image's geometry and
	/// occupancy.
	pub fn info(&self) -> FsResult<Info> {
		let m = self.mounted()?;
		let data_block_count = m.superblock.data_block_count as usize;
		Ok(Info {
			total_blocks: m.superblock.total_blocks,
			fat_block_count: m.superblock.fat_block_count,
			root_dir_block: m.superblock.root_dir_block,
			data_start_block: m.superblock.data_start_block,
			data_block_count: m.superblock.data_block_count,
			fat_free_ratio: (m.fat.free_count(), data_block_count),
			root_dir_free_ratio: (
				m.root_dir.iter().filter(|e| e.is_empty()).count(),
				format::FS_FILE_MAX_COUNT,
			),
		})
	}

	/// Creates a new, empty file named `name`.
	///
	/// Errors: [`FsError::NotMounted`], [`FsError::BadName`],
	/// [`FsError::Exists`], [`FsError::DirFull`].
	pub fn create(&mut self, name: &str) -> FsResult<()> {
		let m = self.mounted_mut()?;
		directory::create(&mut m.root_dir, name)
	}

	/// Deletes the file named `name`, freeing its data-block chain.
	///
	/// Errors: [`FsError::NotMounted`], [`FsError::NotFound`],
	/// [`FsError::Busy`].
	pub fn delete(&mut self, name: &str) -> FsResult<()> {
		let m = self.mounted_mut()?;
		let dir_index = directory::find_by_name(&m.root_dir, name).ok_or(FsError::NotFound)?;
		if m.descriptors.references(dir_index) {
			return Err(FsError::Busy);
		}
		let first_block = directory::delete(&mut m.root_dir, name)?;
		m.fat.free_chain(first_block);
		Ok(())
	}

	/// Lists every non-empty file in directory order.
	///
	/// Errors: [`FsError::NotMounted`].
	pub fn ls(&self) -> FsResult<Vec<Listing>> {
		let m = self.mounted()?;
		Ok(directory::ls(&m.root_dir))
	}

	/// Opens `name`, returning a fresh descriptor positioned at offset 0.
	///
	/// Errors: [`FsError::NotMounted`], [`FsError::NotFound`],
	/// [`FsError::TooManyOpen`].
	pub fn open(&mut self, name: &str) -> FsResult<Fd> {
		let m = self.mounted_mut()?;
		let dir_index = directory::find_by_name(&m.root_dir, name).ok_or(FsError::NotFound)?;
		m.descriptors.open(dir_index)
	}

	/// Closes `fd`.
	///
	/// Errors: [`FsError::NotMounted`], [`FsError::BadDescriptor`].
	pub fn close(&mut self, fd: Fd) -> FsResult<()> {
		let m = self.mounted_mut()?;
		m.descriptors.close(fd)
	}

	/// Returns the size of the file referenced by `fd`.
	///
	/// Errors: [`FsError::NotMounted`], [`FsError::BadDescriptor`].
	pub fn stat(&self, fd: Fd) -> FsResult<u32> {
		let m = self.mounted()?;
		let dir_index = m.descriptors.dir_index(fd)?;
		Ok(m.root_dir[dir_index].file_size)
	}

	/// Repositions `fd`'s offset. `offset` may equal the file's size
	/// (positioning at EOF for append) but not exceed it.
	///
	/// Errors: [`FsError::NotMounted`], [`FsError::BadDescriptor`],
	/// [`FsError::OffsetOutOfRange`].
	pub fn seek(&mut self, fd: Fd, offset: u32) -> FsResult<()> {
		let m = self.mounted_mut()?;
		let dir_index = m.descriptors.dir_index(fd)?;
		if offset > m.root_dir[dir_index].file_size {
			return Err(FsError::OffsetOutOfRange);
		}
		m.descriptors.set_offset(fd, offset)
	}

	/// Reads into `buf`, starting at `fd`'s current offset, and advances
	/// that offset by the number of bytes copied.
	///
	/// Returns `Ok(0)` at end of file, never an error for that case. The
	/// only errors are [`FsError::NotMounted`] and
	/// [`FsError::BadDescriptor`]; see `spec.md` §7 for the `-1`-on-error
	/// convention callers needing the raw ABI can reconstruct with
	/// `Result::is_err`.
	pub fn read(&mut self, fd: Fd, buf: &mut [u8]) -> FsResult<usize> {
		let m = self.mounted_mut()?;
		let dir_index = m.descriptors.dir_index(fd)?;
		let offset = m.descriptors.offset(fd)?;
		let n = io_engine::read(
			&mut m.device,
			&m.fat,
			m.superblock.data_start_block,
			&m.root_dir[dir_index],
			offset,
			buf,
		)?;
		m.descriptors.set_offset(fd, offset + n as u32)?;
		Ok(n)
	}

	/// Writes from `buf`, starting at `fd`'s current offset, allocating new
	/// data blocks as needed, and advances the offset and file size by the
	/// number of bytes written.
	///
	/// A full disk is not an error: the call returns the number of bytes
	/// actually written, which may be less than `buf.len()` or `0`.
	///
	/// Errors: [`FsError::NotMounted`], [`FsError::BadDescriptor`].
	pub fn write(&mut self, fd: Fd, buf: &[u8]) -> FsResult<usize> {
		let m = self.mounted_mut()?;
		let dir_index = m.descriptors.dir_index(fd)?;
		let offset = m.descriptors.offset(fd)?;
		let n = io_engine::write(
			&mut m.device,
			&mut m.fat,
			m.superblock.data_start_block,
			&mut m.root_dir[dir_index],
			offset,
			buf,
		)?;
		m.descriptors.set_offset(fd, offset + n as u32)?;
		Ok(n)
	}
}

//! Open-file table: a fixed pool of descriptors, each holding an index into
//! the root directory array (never a pointer, so the descriptor stays valid
//! across directory array revalidation) and a byte offset.

use crate::error::FsError;
use crate::format::FS_OPEN_MAX_COUNT;

/// A file descriptor handle, i.e. an index into the open-file table.
pub type Fd = usize;

#[derive(Debug, Clone, Copy)]
struct OpenFile {
	dir_index: usize,
	offset: u32,
}

/// The fixed-size pool of open-file descriptors.
pub struct DescriptorTable {
	slots: [Option<OpenFile>; FS_OPEN_MAX_COUNT],
}

impl DescriptorTable {
	pub fn new() -> Self {
		Self {
			slots: [None; FS_OPEN_MAX_COUNT],
		}
	}

	/// True if any slot is currently in use.
	pub fn any_open(&self) -> bool {
		self.slots.iter().any(Option::is_some)
	}

	/// Binds the lowest-indexed free slot to `dir_index` at offset 0.
	///
	/// Errors with [`FsError::TooManyOpen`] if every slot is in use.
	pub fn open(&mut self, dir_index: usize) -> Result<Fd, FsError> {
		let fd = self
			.slots
			.iter()
			.position(Option::is_none)
			.ok_or(FsError::TooManyOpen)?;
		self.slots[fd] = Some(OpenFile {
			dir_index,
			offset: 0,
		});
		Ok(fd)
	}

	/// True if some open descriptor currently references `dir_index`.
	pub fn references(&self, dir_index: usize) -> bool {
		self.slots
			.iter()
			.flatten()
			.any(|of| of.dir_index == dir_index)
	}

	fn get(&self, fd: Fd) -> Result<&OpenFile, FsError> {
		self.slots
			.get(fd)
			.and_then(Option::as_ref)
			.ok_or(FsError::BadDescriptor)
	}

	fn get_mut(&mut self, fd: Fd) -> Result<&mut OpenFile, FsError> {
		self.slots
			.get_mut(fd)
			.and_then(Option::as_mut)
			.ok_or(FsError::BadDescriptor)
	}

	/// The root directory index the given descriptor refers to.
	pub fn dir_index(&self, fd: Fd) -> Result<usize, FsError> {
		Ok(self.get(fd)?.dir_index)
	}

	/// The current byte offset of the given descriptor.
	pub fn offset(&self, fd: Fd) -> Result<u32, FsError> {
		Ok(self.get(fd)?.offset)
	}

	/// Overwrites the byte offset of the given descriptor.
	pub fn set_offset(&mut self, fd: Fd, offset: u32) -> Result<(), FsError> {
		self.get_mut(fd)?.offset = offset;
		Ok(())
	}

	/// Marks the given descriptor unused.
	pub fn close(&mut self, fd: Fd) -> Result<(), FsError> {
		self.get(fd)?;
		self.slots[fd] = None;
		Ok(())
	}
}

impl Default for DescriptorTable {
	fn default() -> Self {
		Self::new()
	}
}

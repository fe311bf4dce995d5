//! The error taxonomy surfaced by every public operation.

use std::io;

/// Errors returned by [`crate::FileSystem`] operations.
///
/// Every public method documents which of these variants it can return.
/// `Read`/`Write` failures coming from the block device are wrapped rather
/// than silently dropped, even on a partial-progress exit path.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
	/// An operation requiring a mounted file system was called on one that
	/// isn't mounted.
	#[error("no file system is currently mounted")]
	NotMounted,
	/// `mount` was called on a handle that is already mounted.
	#[error("a file system is already mounted")]
	AlreadyMounted,
	/// `unmount` was called while one or more descriptors are still open.
	#[error("cannot unmount: descriptors are still open")]
	DescriptorsOpen,

	/// A file name is null, has no NUL terminator within
	/// [`crate::format::FS_FILENAME_LEN`] bytes, or is otherwise malformed.
	#[error("invalid file name")]
	BadName,
	/// A file descriptor index is out of range or refers to an unused slot.
	#[error("invalid file descriptor")]
	BadDescriptor,
	/// The caller's buffer pointer was null.
	///
	/// Unreachable through this crate's safe API, since `read`/`write` take
	/// `&[u8]`/`&mut [u8]` rather than raw pointers; retained so the error
	/// taxonomy stays complete for callers building a C ABI on top.
	#[error("null buffer")]
	NullBuffer,
	/// `seek` was called with an offset strictly greater than the file size.
	#[error("seek offset out of range")]
	OffsetOutOfRange,

	/// No entry with the given name exists.
	#[error("file not found")]
	NotFound,
	/// An entry with the given name already exists.
	#[error("file already exists")]
	Exists,
	/// The file is currently open and cannot be deleted.
	#[error("file is open")]
	Busy,

	/// The root directory has no free entry.
	#[error("root directory is full")]
	DirFull,
	/// The open-file table has no free descriptor.
	#[error("too many open files")]
	TooManyOpen,

	/// Opening the backing block device failed.
	#[error("failed to open disk image: {0}")]
	OpenFailed(#[source] io::Error),
	/// Closing the backing block device failed.
	#[error("failed to close disk image: {0}")]
	CloseFailed(#[source] io::Error),
	/// The superblock signature did not match `"ECS150FS"`.
	#[error("bad file system signature")]
	BadSignature,
	/// The superblock's geometry fields are inconsistent with each other or
	/// with the device's reported block count.
	#[error("bad file system geometry")]
	BadGeometry,
	/// A block read or write failed.
	#[error("block I/O error: {0}")]
	BlockIoFailed(#[source] io::Error),
}

pub type FsResult<T> = Result<T, FsError>;

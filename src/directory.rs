//! Directory manager: linear search over the fixed-size root directory,
//! enforcing name uniqueness and the maximum file count.

use crate::error::FsError;
use crate::format::DirEntry;

/// Finds the index of the non-empty entry named `name`, if any.
pub fn find_by_name(entries: &[DirEntry], name: &str) -> Option<usize> {
	entries
		.iter()
		.position(|e| !e.is_empty() && e.name_string() == name)
}

/// Finds the lowest-indexed empty slot, if any.
fn find_empty_slot(entries: &[DirEntry]) -> Option<usize> {
	entries.iter().position(DirEntry::is_empty)
}

/// Creates a new, empty file named `name`.
///
/// Errors with [`FsError::BadName`] for an invalid name,
/// [`FsError::Exists`] if the name is already taken, or [`FsError::DirFull`]
/// if every entry is occupied.
pub fn create(entries: &mut [DirEntry], name: &str) -> Result<(), FsError> {
	let entry = DirEntry::new_file(name)?;
	if find_by_name(entries, name).is_some() {
		return Err(FsError::Exists);
	}
	let slot = find_empty_slot(entries).ok_or(FsError::DirFull)?;
	log::debug!("creating file {name:?} in directory slot {slot}");
	entries[slot] = entry;
	Ok(())
}

/// Deletes the file named `name`, returning the data-block chain head that
/// the caller must free from the FAT.
///
/// Errors with [`FsError::NotFound`] if no such file exists. The caller is
/// responsible for checking [`FsError::Busy`] (an open descriptor
/// referencing the entry) before calling this.
pub fn delete(entries: &mut [DirEntry], name: &str) -> Result<u16, FsError> {
	let slot = find_by_name(entries, name).ok_or(FsError::NotFound)?;
	let first_block = entries[slot].first_data_block;
	log::debug!("deleting file {name:?} from directory slot {slot}");
	entries[slot] = DirEntry::empty();
	Ok(first_block)
}

/// One line of `ls` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
	pub name: String,
	pub size: u32,
	pub first_data_block: u16,
}

/// Lists every non-empty entry in directory order.
pub fn ls(entries: &[DirEntry]) -> Vec<Listing> {
	entries
		.iter()
		.filter(|e| !e.is_empty())
		.map(|e| Listing {
			name: e.name_string(),
			size: e.file_size,
			first_data_block: e.first_data_block,
		})
		.collect()
}

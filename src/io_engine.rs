//! The I/O engine: bounce-buffered read and write loops translating
//! `(offset, count)` into a sequence of `(block index, within-block offset,
//! length)` operations over the FAT chain.

use crate::block::BlockDevice;
use crate::block::BLOCK_SIZE;
use crate::error::FsError;
use crate::fat::Fat;
use crate::format::DirEntry;

/// Walks `k` steps from `first_block`, returning the logical data-block
/// index the walk lands on, or `None` if the chain ends before `k` steps
/// (i.e. the position is beyond EOF).
fn chain_block_at(fat: &Fat, first_block: u16, k: u32) -> Option<u16> {
	let mut cur = first_block;
	for _ in 0..k {
		cur = fat.next(cur)?;
	}
	Some(cur)
}

/// Reads up to `buf.len()` bytes starting at `offset` from the file
/// described by `entry`, capped at the file's size. Returns the number of
/// bytes copied, which may be `0`.
pub fn read(
	device: &mut BlockDevice,
	fat: &Fat,
	data_start_block: u16,
	entry: &DirEntry,
	offset: u32,
	buf: &mut [u8],
) -> Result<usize, FsError> {
	let size = entry.file_size;
	let remaining_in_file = size.saturating_sub(offset);
	let mut remaining = (buf.len() as u32).min(remaining_in_file) as usize;
	if remaining == 0 {
		return Ok(0);
	}

	let k = offset / BLOCK_SIZE as u32;
	let mut cur = match chain_block_at(fat, entry.first_data_block, k) {
		Some(b) => b,
		None => return Ok(0),
	};
	let mut off = offset;
	let mut copied = 0usize;
	let mut bounce = [0u8; BLOCK_SIZE];

	loop {
		let within = (off as usize) % BLOCK_SIZE;
		let n = remaining.min(BLOCK_SIZE - within);
		let physical = data_start_block + cur;
		device.read_block(physical, &mut bounce)?;
		buf[copied..copied + n].copy_from_slice(&bounce[within..within + n]);

		off += n as u32;
		copied += n;
		remaining -= n;
		if remaining == 0 {
			break;
		}
		match fat.next(cur) {
			Some(next) => cur = next,
			None => break,
		}
	}

	Ok(copied)
}

/// Locates (allocating/linking as needed) the logical data block that
/// should receive a write at `offset`. Mutates `entry.first_data_block` and
/// `fat` when growing the chain. Returns `None` if allocation failed before
/// any block could be produced.
fn locate_or_alloc_for_write(fat: &mut Fat, entry: &mut DirEntry, offset: u32) -> Option<u16> {
	use crate::format::FAT_EOC;

	if entry.first_data_block == FAT_EOC {
		let block = fat.alloc_block()?;
		entry.first_data_block = block;
		return Some(block);
	}

	let k = offset / BLOCK_SIZE as u32;
	let mut cur = entry.first_data_block;
	for _ in 0..k {
		cur = match fat.next(cur) {
			Some(next) => next,
			None => {
				let block = fat.alloc_block()?;
				fat.link(cur, block);
				block
			}
		};
	}
	Some(cur)
}

/// Writes up to `buf.len()` bytes starting at `offset` into the file
/// described by `entry`, growing the FAT chain and the file size as
/// needed. Returns the number of bytes actually written, which may be
/// less than `buf.len()` (or `0`) if the disk fills up mid-write; that is
/// not an error.
pub fn write(
	device: &mut BlockDevice,
	fat: &mut Fat,
	data_start_block: u16,
	entry: &mut DirEntry,
	offset: u32,
	buf: &[u8],
) -> Result<usize, FsError> {
	let mut remaining = buf.len();
	if remaining == 0 {
		return Ok(0);
	}

	let mut cur = match locate_or_alloc_for_write(fat, entry, offset) {
		Some(b) => b,
		None => return Ok(0),
	};
	let mut off = offset;
	let mut written = 0usize;
	let mut bounce = [0u8; BLOCK_SIZE];

	loop {
		let within = (off as usize) % BLOCK_SIZE;
		let w = remaining.min(BLOCK_SIZE - within);
		let physical = data_start_block + cur;

		if w == BLOCK_SIZE {
			bounce.copy_from_slice(&buf[written..written + w]);
		} else {
			device.read_block(physical, &mut bounce)?;
			bounce[within..within + w].copy_from_slice(&buf[written..written + w]);
		}
		device.write_block(physical, &bounce)?;

		off += w as u32;
		written += w;
		remaining -= w;
		if remaining == 0 {
			break;
		}

		cur = match fat.next(cur) {
			Some(next) => next,
			None => match fat.alloc_block() {
				Some(block) => {
					fat.link(cur, block);
					block
				}
				None => break,
			},
		};
	}

	if off > entry.file_size {
		entry.file_size = off;
	}
	Ok(written)
}

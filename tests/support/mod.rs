//! Shared test fixture: builds a raw ECS150FS image from scratch.
//!
//! This only uses plain byte arithmetic, not `ecs150fs`'s internals, since
//! integration tests only see the crate's public API. It plays the same
//! role a disk-image creation tool would, but it's test-only scaffolding,
//! never built as a binary or exposed to callers of the library.

use std::io::Write;

pub const BLOCK_SIZE: usize = 4096;

/// Builds a fresh, empty image with `data_block_count` data blocks and
/// returns its path. The path is kept alive by the returned `TempPath`
/// guard; drop it only after the test is done with the image.
pub fn build_image(data_block_count: u16) -> tempfile::TempPath {
	let _ = env_logger::try_init();

	let fat_block_count = ((data_block_count as u32 * 2) as usize).div_ceil(BLOCK_SIZE) as u8;
	let root_dir_block = 1 + fat_block_count as u16;
	let data_start_block = root_dir_block + 1;
	let total_blocks = 1 + fat_block_count as u16 + 1 + data_block_count;

	let mut image = Vec::with_capacity(total_blocks as usize * BLOCK_SIZE);

	// Superblock.
	let mut sb = [0u8; BLOCK_SIZE];
	sb[0..8].copy_from_slice(b"ECS150FS");
	sb[8..10].copy_from_slice(&total_blocks.to_le_bytes());
	sb[10..12].copy_from_slice(&root_dir_block.to_le_bytes());
	sb[12..14].copy_from_slice(&data_start_block.to_le_bytes());
	sb[14..16].copy_from_slice(&data_block_count.to_le_bytes());
	sb[16] = fat_block_count;
	image.extend_from_slice(&sb);

	// FAT: every entry, including entry 0, starts out free. Entry 0 is never
	// handed out by the allocator, so it has no need for an EOC marker here.
	let fat = vec![0u8; fat_block_count as usize * BLOCK_SIZE];
	image.extend_from_slice(&fat);

	// Root directory: 128 zeroed (empty) entries.
	image.extend_from_slice(&[0u8; BLOCK_SIZE]);

	// Data region.
	image.extend_from_slice(&vec![0u8; data_block_count as usize * BLOCK_SIZE]);

	let mut file = tempfile::NamedTempFile::new().unwrap();
	file.write_all(&image).unwrap();
	file.flush().unwrap();
	file.into_temp_path()
}

//! End-to-end scenarios from `spec.md` §8.

mod support;

use ecs150fs::FileSystem;
use ecs150fs::FsError;
use support::build_image;

#[test]
fn fresh_image_reports_expected_geometry() {
	let path = build_image(4096);
	let mut fs = FileSystem::new();
	fs.mount(&path).unwrap();

	let info = fs.info().unwrap();
	assert_eq!(info.total_blocks, 4100);
	assert_eq!(info.fat_block_count, 2);
	assert_eq!(info.root_dir_block, 3);
	assert_eq!(info.data_start_block, 4);
	assert_eq!(info.data_block_count, 4096);
	assert_eq!(info.fat_free_ratio, (4096, 4096));
	assert_eq!(info.root_dir_free_ratio, (128, 128));

	fs.unmount().unwrap();
}

#[test]
fn hello_world_write_read_stat() {
	let path = build_image(16);
	let mut fs = FileSystem::new();
	fs.mount(&path).unwrap();

	fs.create("hello.txt").unwrap();
	let fd = fs.open("hello.txt").unwrap();
	assert_eq!(fs.write(fd, b"Hello, world!").unwrap(), 13);

	fs.seek(fd, 0).unwrap();
	let mut buf = [0u8; 13];
	assert_eq!(fs.read(fd, &mut buf).unwrap(), 13);
	assert_eq!(&buf, b"Hello, world!");
	assert_eq!(fs.stat(fd).unwrap(), 13);

	fs.close(fd).unwrap();
	fs.unmount().unwrap();
}

#[test]
fn big_file_spans_two_fat_links() {
	let path = build_image(16);
	let mut fs = FileSystem::new();
	fs.mount(&path).unwrap();

	fs.create("big.bin").unwrap();
	let fd = fs.open("big.bin").unwrap();
	let data = vec![0xABu8; 8192];
	assert_eq!(fs.write(fd, &data).unwrap(), 8192);
	assert_eq!(fs.stat(fd).unwrap(), 8192);

	// Re-read and check the chain actually round-trips both blocks.
	fs.seek(fd, 0).unwrap();
	let mut out = vec![0u8; 8192];
	assert_eq!(fs.read(fd, &mut out).unwrap(), 8192);
	assert_eq!(out, data);
}

#[test]
fn two_opens_of_same_file_advance_independently() {
	let path = build_image(16);
	let mut fs = FileSystem::new();
	fs.mount(&path).unwrap();
	fs.create("hello.txt").unwrap();
	let setup_fd = fs.open("hello.txt").unwrap();
	fs.write(setup_fd, b"Hello, world!").unwrap();
	fs.close(setup_fd).unwrap();

	let fd1 = fs.open("hello.txt").unwrap();
	let fd2 = fs.open("hello.txt").unwrap();
	assert_ne!(fd1, fd2);

	fs.seek(fd1, 7).unwrap();
	let mut buf1 = [0u8; 5];
	assert_eq!(fs.read(fd1, &mut buf1).unwrap(), 5);
	assert_eq!(&buf1, b"world");

	let mut buf2 = [0u8; 5];
	assert_eq!(fs.read(fd2, &mut buf2).unwrap(), 5);
	assert_eq!(&buf2, b"Hello");
}

#[test]
fn filling_disk_then_one_more_byte_writes_nothing() {
	// 2 data blocks: index 0 is the reserved placeholder, so exactly one
	// block (4096 bytes) is actually allocatable.
	let path = build_image(2);
	let mut fs = FileSystem::new();
	fs.mount(&path).unwrap();
	fs.create("f").unwrap();
	let fd = fs.open("f").unwrap();

	let chunk = vec![0xFFu8; 4096];
	assert_eq!(fs.write(fd, &chunk).unwrap(), 4096);
	let size_before = fs.stat(fd).unwrap();

	assert_eq!(fs.write(fd, &[0x01]).unwrap(), 0);
	assert_eq!(fs.stat(fd).unwrap(), size_before);
}

#[test]
fn create_delete_cycle_is_idempotent_and_round_trips_image() {
	let path = build_image(32);
	let mut fs = FileSystem::new();
	fs.mount(&path).unwrap();

	let before = fs.info().unwrap();
	for _ in 0..100 {
		fs.create("tmp").unwrap();
		fs.delete("tmp").unwrap();
	}
	let after = fs.info().unwrap();
	assert_eq!(before, after);

	let before_bytes = std::fs::read(&path).unwrap();
	fs.unmount().unwrap();
	let after_bytes = std::fs::read(&path).unwrap();
	assert_eq!(before_bytes, after_bytes);
}

#[test]
fn mount_then_unmount_without_mutation_is_byte_identical() {
	let path = build_image(16);
	let before = std::fs::read(&path).unwrap();

	let mut fs = FileSystem::new();
	fs.mount(&path).unwrap();
	fs.unmount().unwrap();

	let after = std::fs::read(&path).unwrap();
	assert_eq!(before, after);
}

#[test]
fn filename_exactly_16_bytes_with_terminator_accepted() {
	let path = build_image(8);
	let mut fs = FileSystem::new();
	fs.mount(&path).unwrap();

	let name15 = "a".repeat(15); // + NUL = 16 bytes total.
	fs.create(&name15).unwrap();

	let name16 = "a".repeat(16); // + NUL = 17 bytes, rejected.
	assert!(matches!(fs.create(&name16), Err(FsError::BadName)));
}

#[test]
fn seek_to_eof_then_read_returns_zero() {
	let path = build_image(8);
	let mut fs = FileSystem::new();
	fs.mount(&path).unwrap();
	fs.create("f").unwrap();
	let fd = fs.open("f").unwrap();
	fs.write(fd, b"abcdef").unwrap();

	let size = fs.stat(fd).unwrap();
	fs.seek(fd, size).unwrap();
	let mut buf = [0u8; 4];
	assert_eq!(fs.read(fd, &mut buf).unwrap(), 0);

	assert!(matches!(fs.seek(fd, size + 1), Err(FsError::OffsetOutOfRange)));
}

#[test]
fn split_reads_match_one_combined_read() {
	let path = build_image(8);
	let mut fs = FileSystem::new();
	fs.mount(&path).unwrap();
	fs.create("f").unwrap();
	let fd = fs.open("f").unwrap();
	let data = b"0123456789ABCDEF";
	fs.write(fd, data).unwrap();

	fs.seek(fd, 0).unwrap();
	let mut whole = vec![0u8; data.len()];
	fs.read(fd, &mut whole).unwrap();

	fs.seek(fd, 0).unwrap();
	let mut first = [0u8; 6];
	let mut second = vec![0u8; data.len() - 6];
	fs.read(fd, &mut first).unwrap();
	fs.read(fd, &mut second).unwrap();

	let mut combined = first.to_vec();
	combined.extend_from_slice(&second);
	assert_eq!(combined, whole);
}

#[test]
fn write_round_trip_law_holds_for_short_writes() {
	let path = build_image(2);
	let mut fs = FileSystem::new();
	fs.mount(&path).unwrap();
	fs.create("f").unwrap();
	let fd = fs.open("f").unwrap();

	let attempted = vec![0x7Eu8; 8192]; // more than the single free block holds
	let written = fs.write(fd, &attempted).unwrap();
	assert!(written <= attempted.len());

	fs.seek(fd, 0).unwrap();
	let mut readback = vec![0u8; written];
	assert_eq!(fs.read(fd, &mut readback).unwrap(), written);
	assert_eq!(readback, attempted[..written]);
}

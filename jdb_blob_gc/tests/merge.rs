//! Merge scanner tests / 合并扫描器测试

mod fixture;

use aok::{OK, Void};
use fixture::{Built, FileBuilder, file_of, key, value};
use jdb_blob_gc::{Desc, MergeScanner, consts::RECORD_HEAD_SIZE};
use log::info;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

fn merge_of(files: &[&Built]) -> MergeScanner<Vec<u8>> {
  let children = files
    .iter()
    .enumerate()
    .map(|(id, built)| built.scanner(id as u64 + 1))
    .collect();
  MergeScanner::new(children)
}

fn keys_of(m: &mut MergeScanner<Vec<u8>>) -> Vec<u32> {
  let mut out = Vec::new();
  m.seek_to_first();
  while m.valid() {
    let k: [u8; 4] = m.key().try_into().unwrap();
    out.push(u32::from_be_bytes(k));
    m.next();
  }
  out
}

#[test]
fn overlapping_files_merge_in_key_order() -> Void {
  let a = file_of(1..=5);
  let b = file_of(3..=8);
  let c = file_of(2..=9);
  let mut m = merge_of(&[&a, &b, &c]);

  let got = keys_of(&mut m);
  let mut want: Vec<u32> = (1..=5).chain(3..=8).chain(2..=9).collect();
  want.sort_unstable();
  assert_eq!(got, want);
  assert!(m.status().is_ok());
  info!("merged {} records", got.len());
  OK
}

#[test]
fn equal_keys_come_from_lower_child_first() -> Void {
  let a = file_of([1, 4]);
  let b = file_of([1, 4]);
  let mut m = merge_of(&[&a, &b]);

  let mut ids = Vec::new();
  m.seek_to_first();
  while m.valid() {
    ids.push(m.handle().unwrap().file_id);
    m.next();
  }
  assert_eq!(ids, vec![1, 2, 1, 2]);
  OK
}

#[test]
fn handle_points_into_owning_file() -> Void {
  let a = file_of([10, 30]);
  let b = file_of([20]);
  let mut m = merge_of(&[&a, &b]);

  m.seek_to_first();
  let h = m.handle().unwrap();
  assert_eq!((h.file_id, h.offset), (1, a.offsets[0]));
  m.next();
  let h = m.handle().unwrap();
  assert_eq!((h.file_id, h.offset), (2, b.offsets[0]));
  assert_eq!(m.value(), value(20));
  assert_eq!(h.size, RECORD_HEAD_SIZE + 8 + value(20).len() as u64);
  m.next();
  assert_eq!(m.handle().unwrap().offset, a.offsets[1]);
  OK
}

#[test]
fn exhausted_merge_is_clean() -> Void {
  let a = file_of([1]);
  let b = file_of([2]);
  let mut m = merge_of(&[&a, &b]);

  assert_eq!(keys_of(&mut m), vec![1, 2]);
  assert!(!m.valid());
  assert!(m.status().is_ok());
  assert_eq!(m.failed().count(), 0);
  assert!(m.handle().is_none());
  OK
}

#[test]
fn no_valid_child_aborts() -> Void {
  let empty = FileBuilder::new()
    .block_size(64)
    .add(key(1), value(1))
    .punch(0)
    .build();
  let mut m = merge_of(&[&empty]);

  m.seek_to_first();
  assert!(!m.valid());
  assert!(m.status().unwrap_err().is_aborted());
  OK
}

#[test]
fn no_children_aborts() -> Void {
  let mut m: MergeScanner<Vec<u8>> = MergeScanner::new(Vec::new());

  m.seek_to_first();
  assert!(!m.valid());
  assert!(m.status().unwrap_err().is_aborted());
  OK
}

#[test]
fn broken_child_is_left_out() -> Void {
  let a = file_of([1, 3, 5]);
  let mut bad = file_of([2, 4]);
  bad.data[0] ^= 0xFF;
  let c = file_of([6]);
  let mut m = merge_of(&[&a, &bad, &c]);

  assert_eq!(keys_of(&mut m), vec![1, 3, 5, 6]);
  assert!(m.status().is_ok());
  assert!(m.children()[1].status().is_err());
  let failed: Vec<u64> = m.failed().map(|(id, _)| id).collect();
  assert_eq!(failed, vec![2]);
  OK
}

#[test]
fn child_failing_mid_scan_is_dropped() -> Void {
  let a = file_of([1, 3, 5, 7]);
  let mut b = file_of([2, 4, 6]);
  let at = (b.offsets[1] + RECORD_HEAD_SIZE) as usize;
  b.data[at] ^= 0xFF;
  let mut m = merge_of(&[&a, &b]);

  assert_eq!(keys_of(&mut m), vec![1, 2, 3, 5, 7]);
  // Exhausted cleanly, yet file 2 was not fully read
  // 正常耗尽，但文件 2 未读完
  assert!(m.status().is_ok());
  let failed: Vec<_> = m.failed().collect();
  assert_eq!(failed.len(), 1);
  assert_eq!(failed[0].0, 2);
  assert!(failed[0].1.is_corruption());
  let children = m.into_children();
  assert!(children[1].status().unwrap_err().is_corruption());
  OK
}

#[test]
fn descending_order() -> Void {
  let desc = |keys: &[u32]| {
    keys
      .iter()
      .fold(FileBuilder::new(), |b, &n| b.add(key(n), value(n)))
      .build()
  };
  let a = desc(&[9, 6, 3]);
  let b = desc(&[8, 7, 1]);
  let children = vec![a.scanner(1), b.scanner(2)];
  let mut m: MergeScanner<Vec<u8>, Desc> = MergeScanner::new(children);

  let mut got = Vec::new();
  m.seek_to_first();
  while m.valid() {
    got.push(m.key()[3]);
    m.next();
  }
  assert_eq!(got, vec![9, 8, 7, 6, 3, 1]);
  OK
}

#[test]
fn repeated_passes_reuse_key_buffers() -> Void {
  let a = file_of((0..200).step_by(2));
  let b = file_of((1..200).step_by(2));
  let mut m = merge_of(&[&a, &b]);

  let want: Vec<u32> = (0..200).collect();
  for _ in 0..3 {
    assert_eq!(keys_of(&mut m), want);
    assert!(m.status().is_ok());
  }
  OK
}

#[test]
fn seek_to_first_restarts() -> Void {
  let a = file_of([1, 2]);
  let b = file_of([3]);
  let mut m = merge_of(&[&a, &b]);

  m.seek_to_first();
  m.next();
  assert_eq!(m.key(), key(2));
  assert_eq!(keys_of(&mut m), vec![1, 2, 3]);
  OK
}

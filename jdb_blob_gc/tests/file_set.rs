//! File set scoring tests / 文件集合评分测试

use aok::{OK, Void};
use jdb_blob_gc::{BlobStorage, Conf, FileMeta, FileSet, FileState, GcConf, Picker, PlanKind};

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

fn ids(scores: &[jdb_blob_gc::Score]) -> Vec<u64> {
  scores.iter().map(|s| s.file_id).collect()
}

fn set() -> FileSet {
  let mut set = FileSet::new(GcConf::parse(&[
    Conf::PunchHoleThreshold(100),
    Conf::MergeSmallFileThreshold(1000),
  ]));
  set.add(FileMeta::new(1, 10_000, 9_000).with_block_size(4096));
  set.add(FileMeta::new(2, 10_000, 1_000));
  set.add(FileMeta::new(3, 10_000, 9_950).with_block_size(4096));
  set.add(FileMeta::new(4, 10_000, 7_000).with_block_size(4096));
  set.add(FileMeta::new(5, 500, 500));
  set
}

#[test]
fn punch_hole_list_is_ascending_and_filtered() -> Void {
  let mut set = set();
  set.compute_scores();

  // 2 and 5 are unaligned, 3 is below the threshold
  // 2 和 5 未对齐，3 低于阈值
  assert_eq!(ids(set.punch_hole_score()), vec![1, 4]);
  let scores: Vec<f64> = set.punch_hole_score().iter().map(|s| s.score).collect();
  assert!((scores[0] - 0.1).abs() < 1e-9);
  assert!((scores[1] - 0.3).abs() < 1e-9);
  OK
}

#[test]
fn gc_list_is_descending_with_small_files_first() -> Void {
  let mut set = set();
  set.compute_scores();

  assert_eq!(ids(set.gc_score()), vec![5, 2, 4, 1, 3]);
  let gc = set.gc_score();
  assert_eq!(gc[0].score, 1.0);
  assert!(gc.windows(2).all(|w| w[0].score >= w[1].score));
  assert!(gc.iter().all(|s| s.in_range()));
  OK
}

#[test]
fn punch_hole_disabled_by_default() -> Void {
  let mut set = FileSet::new(GcConf::default());
  set.add(FileMeta::new(1, 10_000, 0).with_block_size(4096));
  set.compute_scores();

  assert!(set.punch_hole_score().is_empty());
  assert_eq!(ids(set.gc_score()), vec![1]);
  OK
}

#[test]
fn obsolete_and_retired_files_drop_out() -> Void {
  let mut set = set();
  assert!(set.set_state(2, FileState::Obsolete));
  assert!(set.retire(4).is_some());
  assert!(set.retire(4).is_none());
  set.compute_scores();

  assert_eq!(ids(set.gc_score()), vec![5, 1, 3]);
  assert_eq!(ids(set.punch_hole_score()), vec![1]);
  assert!(set.find_file(4).is_none());
  assert_eq!(set.len(), 4);
  OK
}

#[test]
fn updates_on_unknown_files_are_ignored() -> Void {
  let mut set = set();
  assert!(!set.set_state(42, FileState::BeingGc));
  assert!(!set.set_live_size(42, 1));

  assert!(set.set_live_size(5, 1_000_000));
  assert_eq!(set.find_file(5).unwrap().live_size, 500);
  OK
}

#[test]
fn picker_runs_against_file_set() -> Void {
  let mut set = set();
  set.compute_scores();
  let picker = Picker::new(3, *set.conf());

  let plan = picker.pick(&set).unwrap();
  assert_eq!(plan.kind, PlanKind::PunchHole);
  assert_eq!(plan.file_ids(), vec![1, 4]);

  // Picked files are marked busy, the rest goes to merge
  // 已选文件标记为忙，其余进入合并
  for id in plan.file_ids() {
    set.set_state(id, FileState::BeingGc);
  }
  let conf = GcConf::parse(&[
    Conf::PunchHoleThreshold(100),
    Conf::MergeSmallFileThreshold(1000),
    Conf::MinGcBatchSize(1000),
  ]);
  let plan = Picker::new(3, conf).pick(&set).unwrap();
  assert_eq!(plan.kind, PlanKind::Merge);
  assert_eq!(plan.file_ids(), vec![5, 2, 3]);
  OK
}

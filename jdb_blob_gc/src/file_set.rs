//! In-memory blob file set of one column family
//! 单个列族的内存 blob 文件集合
//!
//! File ids are never reused, so an id alone identifies one generation of a
//! file: once retired, lookups resolve to `None`.
//! 文件 ID 不复用，ID 本身即代表文件的一代：退役后查询返回 `None`。

use std::collections::HashMap;

use crate::{
  GcConf,
  meta::{BlobStorage, FileMeta, FileState, Score},
};

#[derive(Debug, Default)]
pub struct FileSet {
  conf: GcConf,
  files: HashMap<u64, FileMeta>,
  punch_hole: Vec<Score>,
  gc: Vec<Score>,
}

impl FileSet {
  pub fn new(conf: GcConf) -> Self {
    Self {
      conf,
      ..Self::default()
    }
  }

  #[inline]
  pub fn conf(&self) -> &GcConf {
    &self.conf
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.files.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  /// Add or replace a file / 添加或替换文件
  pub fn add(&mut self, meta: FileMeta) {
    self.files.insert(meta.id, meta);
  }

  /// Returns false when the file is unknown / 文件不存在时返回 false
  pub fn set_state(&mut self, id: u64, state: FileState) -> bool {
    self
      .files
      .get_mut(&id)
      .map(|f| f.state = state)
      .is_some()
  }

  pub fn set_live_size(&mut self, id: u64, live_size: u64) -> bool {
    self
      .files
      .get_mut(&id)
      .map(|f| f.live_size = live_size.min(f.size))
      .is_some()
  }

  /// Remove a file for good / 永久移除文件
  pub fn retire(&mut self, id: u64) -> Option<FileMeta> {
    self.files.remove(&id)
  }

  /// Rebuild both candidate lists / 重建两个候选列表
  ///
  /// - punch-hole: aligned files whose discardable bytes reach the punch-hole
  ///   threshold, ascending by discard ratio.
  /// - gc: small files score 1.0, the rest their discard ratio, descending.
  pub fn compute_scores(&mut self) {
    self.punch_hole.clear();
    self.gc.clear();

    for f in self.files.values() {
      if f.state == FileState::Obsolete {
        continue;
      }
      let ratio = f.discardable_ratio().clamp(0.0, 1.0);

      if self.conf.punch_hole_threshold > 0
        && f.block_size > 0
        && f.discardable_size() >= self.conf.punch_hole_threshold
      {
        self.punch_hole.push(Score::new(f.id, ratio));
      }

      let score = if f.size <= self.conf.merge_small_file_threshold {
        1.0
      } else {
        ratio
      };
      self.gc.push(Score::new(f.id, score));
    }

    // Ties by id keep the order stable / 分数相同时按 ID 排序保持稳定
    self
      .punch_hole
      .sort_by(|a, b| a.score.total_cmp(&b.score).then(a.file_id.cmp(&b.file_id)));
    self
      .gc
      .sort_by(|a, b| b.score.total_cmp(&a.score).then(a.file_id.cmp(&b.file_id)));
  }
}

impl BlobStorage for FileSet {
  #[inline]
  fn punch_hole_score(&self) -> &[Score] {
    &self.punch_hole
  }

  #[inline]
  fn gc_score(&self) -> &[Score] {
    &self.gc
  }

  #[inline]
  fn find_file(&self, id: u64) -> Option<&FileMeta> {
    self.files.get(&id)
  }
}

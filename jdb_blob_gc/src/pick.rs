//! GC candidate picker / GC 候选挑选器
//!
//! ## Flow / 流程
//!
//! 1. Punch-hole pass: files below the discardable ratio, ascending
//!    打洞阶段：低于可丢弃比例的文件，按分数升序
//! 2. Merge pass (only if 1 picked nothing): most garbage first
//!    合并阶段（仅当阶段 1 未选中文件）：垃圾最多者优先
//! 3. Admission control, skipped in fallback mode
//!    准入控制，回退模式下跳过

use std::sync::Arc;

use log::{debug, info};

use crate::{
  GcConf, RunMode,
  consts::SCORE_EPSILON,
  meta::{BlobStorage, FileMeta, Score},
  plan::{GcPlan, PlanKind},
  stat::GcStats,
};

/// Picks one GC plan per call, keeps no state between calls.
/// The caller holds the column family's metadata lock for the whole call.
/// 每次调用挑选一个 GC 计划，调用间不保留状态。
/// 调用方需在整个调用期间持有列族元数据锁。
pub struct Picker {
  cf_id: u32,
  conf: GcConf,
  stats: Arc<GcStats>,
}

impl Picker {
  pub fn new(cf_id: u32, conf: GcConf) -> Self {
    Self::with_stats(cf_id, conf, Arc::default())
  }

  /// Share counters with other pickers / 与其他挑选器共享计数器
  pub fn with_stats(cf_id: u32, conf: GcConf, stats: Arc<GcStats>) -> Self {
    Self { cf_id, conf, stats }
  }

  #[inline]
  pub fn conf(&self) -> &GcConf {
    &self.conf
  }

  #[inline]
  pub fn stats(&self) -> &Arc<GcStats> {
    &self.stats
  }

  pub fn pick<S: BlobStorage + ?Sized>(&self, storage: &S) -> Option<GcPlan> {
    if self.conf.run_mode == RunMode::ReadOnly {
      debug!("cf {} read-only, skip gc", self.cf_id);
      return None;
    }
    self
      .pick_punch_hole(storage)
      .or_else(|| self.pick_merge(storage))
  }

  fn pick_punch_hole<S: BlobStorage + ?Sized>(&self, storage: &S) -> Option<GcPlan> {
    let mut files = Vec::new();
    let mut batch_size = 0u64;
    let mut stop_picking = false;
    let mut more = false;

    for score in storage.punch_hole_score() {
      if score.score >= self.conf.discardable_ratio {
        break;
      }
      let Some(file) = self.resolve(storage, score) else {
        continue;
      };
      if stop_picking {
        more = true;
        break;
      }
      files.push(*file);
      batch_size += file.size;
      if batch_size >= self.conf.max_gc_batch_size {
        stop_picking = true;
      }
    }

    if files.is_empty() {
      return None;
    }
    GcStats::inc(&self.stats.punch_hole_plans);
    Some(self.plan(files, more, PlanKind::PunchHole))
  }

  fn pick_merge<S: BlobStorage + ?Sized>(&self, storage: &S) -> Option<GcPlan> {
    let in_fallback = self.conf.in_fallback();
    let mut files: Vec<FileMeta> = Vec::new();
    let mut batch_size = 0u64;
    let mut estimate_output = 0u64;
    let mut next_gc_size = 0u64;
    let mut stop_picking = false;
    let mut more = false;

    for score in storage.gc_score() {
      // Fallback only drains fully discardable files / 回退模式只回收完全可丢弃的文件
      if in_fallback && (1.0 - score.score).abs() > SCORE_EPSILON {
        break;
      }
      let Some(file) = self.resolve(storage, score) else {
        continue;
      };

      if !stop_picking {
        files.push(*file);
        if file.size <= self.conf.merge_small_file_threshold {
          GcStats::inc(&self.stats.small_file);
        } else {
          GcStats::inc(&self.stats.discardable);
        }
        batch_size += file.size;
        estimate_output += file.live_size;
        if batch_size >= self.conf.max_gc_batch_size
          || estimate_output >= self.conf.blob_file_target_size
        {
          stop_picking = true;
        }
      } else {
        next_gc_size += file.size;
        if next_gc_size > self.conf.min_gc_batch_size || in_fallback {
          more = true;
          GcStats::inc(&self.stats.remain);
          info!(
            "cf {} remain more than {next_gc_size} bytes to gc, trigger after this gc",
            self.cf_id
          );
          break;
        }
      }
    }
    debug!(
      "cf {} got batch size {batch_size}, estimate output {estimate_output} bytes",
      self.cf_id
    );

    if files.is_empty() {
      return None;
    }

    if !in_fallback {
      if batch_size < self.conf.min_gc_batch_size
        && estimate_output < self.conf.blob_file_target_size
      {
        return None;
      }
      // A lone small, mostly live file is not worth rewriting
      // 单个小且大部分存活的文件不值得重写
      if let [only] = files.as_slice()
        && only.size <= self.conf.merge_small_file_threshold
        && only.discardable_ratio() < self.conf.discardable_ratio
      {
        return None;
      }
    }

    GcStats::inc(&self.stats.merge_plans);
    Some(self.plan(files, more, PlanKind::Merge))
  }

  /// Look a candidate up, `None` if it must be skipped / 查询候选，需跳过时返回 `None`
  fn resolve<'a, S: BlobStorage + ?Sized>(
    &self,
    storage: &'a S,
    score: &Score,
  ) -> Option<&'a FileMeta> {
    if !score.in_range() {
      info!(
        "cf {} blob file {} score {} out of range, skip",
        self.cf_id, score.file_id, score.score
      );
      return None;
    }
    match storage.find_file(score.file_id) {
      Some(file) if file.is_normal() => Some(file),
      _ => {
        info!("cf {} blob file {} no need gc", self.cf_id, score.file_id);
        None
      }
    }
  }

  #[inline]
  fn plan(&self, files: Vec<FileMeta>, more: bool, kind: PlanKind) -> GcPlan {
    GcPlan {
      files,
      conf: self.conf,
      more,
      cf_id: self.cf_id,
      kind,
    }
  }
}

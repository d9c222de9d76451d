//! GC pick statistics / GC 挑选统计

use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Counters shared by pickers of all column families
/// 所有列族挑选器共享的计数器
#[derive(Debug, Default)]
pub struct GcStats {
  /// Small files picked for merge / 参与合并的小文件
  pub small_file: AtomicU64,
  /// Large discardable files picked for merge / 参与合并的可丢弃大文件
  pub discardable: AtomicU64,
  /// Picks that left enough garbage for another run / 剩余垃圾足以再次运行
  pub remain: AtomicU64,
  /// Punch-hole plans produced / 产生的打洞计划
  pub punch_hole_plans: AtomicU64,
  /// Merge plans produced / 产生的合并计划
  pub merge_plans: AtomicU64,
}

/// Plain copy of [`GcStats`] / [`GcStats`] 的普通副本
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcStatsSnapshot {
  pub small_file: u64,
  pub discardable: u64,
  pub remain: u64,
  pub punch_hole_plans: u64,
  pub merge_plans: u64,
}

impl GcStats {
  #[inline]
  pub(crate) fn inc(counter: &AtomicU64) {
    counter.fetch_add(1, Relaxed);
  }

  pub fn snapshot(&self) -> GcStatsSnapshot {
    GcStatsSnapshot {
      small_file: self.small_file.load(Relaxed),
      discardable: self.discardable.load(Relaxed),
      remain: self.remain.load(Relaxed),
      punch_hole_plans: self.punch_hole_plans.load(Relaxed),
      merge_plans: self.merge_plans.load(Relaxed),
    }
  }
}

impl GcStatsSnapshot {
  /// Merge stats / 合并统计
  pub fn merge(&mut self, other: &GcStatsSnapshot) {
    self.small_file += other.small_file;
    self.discardable += other.discardable;
    self.remain += other.remain;
    self.punch_hole_plans += other.punch_hole_plans;
    self.merge_plans += other.merge_plans;
  }
}

//! GC configuration / GC 配置

/// Default min blob size (4KB) / 默认最小 blob 大小
pub const DEFAULT_MIN_BLOB_SIZE: u64 = 4096;

/// Default discardable ratio / 默认可丢弃比例
pub const DEFAULT_DISCARDABLE_RATIO: f64 = 0.5;

/// Default max GC batch size (1GB) / 默认最大 GC 批大小
pub const DEFAULT_MAX_GC_BATCH_SIZE: u64 = 1 << 30;

/// Default min GC batch size (128MB) / 默认最小 GC 批大小
pub const DEFAULT_MIN_GC_BATCH_SIZE: u64 = 128 << 20;

/// Default blob file target size (256MB) / 默认 blob 文件目标大小
pub const DEFAULT_BLOB_FILE_TARGET_SIZE: u64 = 256 << 20;

/// Default small file merge threshold (8MB) / 默认小文件合并阈值
pub const DEFAULT_MERGE_SMALL_FILE_THRESHOLD: u64 = 8 << 20;

/// Blob run mode / Blob 运行模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
  /// Normal GC / 正常 GC
  #[default]
  Normal,
  /// No new GC is scheduled / 不调度新的 GC
  ReadOnly,
  /// Drain fully discardable files, skip batch economics
  /// 回收完全可丢弃的文件，不考虑批次收益
  Fallback,
}

/// GC configuration options / GC 配置选项
#[derive(Debug, Clone, Copy)]
pub enum Conf {
  /// Scanner look-ahead past each record header / 扫描器在记录头之后的预读量
  MinBlobSize(u64),
  /// Discard ratio separating punch-hole from rewrite GC
  /// 区分打洞与重写 GC 的丢弃比例
  DiscardableRatio(f64),
  /// Cumulative input size that closes a batch / 关闭批次的累计输入大小
  MaxGcBatchSize(u64),
  /// Smallest batch worth running / 值得运行的最小批次
  MinGcBatchSize(u64),
  /// Estimated output size that closes a batch / 关闭批次的估计输出大小
  BlobFileTargetSize(u64),
  /// Files at or below this size are merged / 不超过该大小的文件参与合并
  MergeSmallFileThreshold(u64),
  /// Discardable bytes that make a file a punch-hole candidate (0 disables)
  /// 成为打洞候选所需的可丢弃字节数（0 表示禁用）
  PunchHoleThreshold(u64),
  RunMode(RunMode),
}

/// Parsed config / 解析后的配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GcConf {
  pub min_blob_size: u64,
  pub discardable_ratio: f64,
  pub max_gc_batch_size: u64,
  pub min_gc_batch_size: u64,
  pub blob_file_target_size: u64,
  pub merge_small_file_threshold: u64,
  pub punch_hole_threshold: u64,
  pub run_mode: RunMode,
}

impl Default for GcConf {
  fn default() -> Self {
    Self {
      min_blob_size: DEFAULT_MIN_BLOB_SIZE,
      discardable_ratio: DEFAULT_DISCARDABLE_RATIO,
      max_gc_batch_size: DEFAULT_MAX_GC_BATCH_SIZE,
      min_gc_batch_size: DEFAULT_MIN_GC_BATCH_SIZE,
      blob_file_target_size: DEFAULT_BLOB_FILE_TARGET_SIZE,
      merge_small_file_threshold: DEFAULT_MERGE_SMALL_FILE_THRESHOLD,
      punch_hole_threshold: 0,
      run_mode: RunMode::Normal,
    }
  }
}

impl GcConf {
  pub fn parse(conf: &[Conf]) -> Self {
    let mut c = Self::default();
    for item in conf {
      match *item {
        Conf::MinBlobSize(v) => c.min_blob_size = v,
        Conf::DiscardableRatio(v) => {
          // NaN keeps the default / NaN 保留默认值
          if !v.is_nan() {
            c.discardable_ratio = v.clamp(0.0, 1.0);
          }
        }
        Conf::MaxGcBatchSize(v) => c.max_gc_batch_size = v,
        Conf::MinGcBatchSize(v) => c.min_gc_batch_size = v,
        Conf::BlobFileTargetSize(v) => c.blob_file_target_size = v,
        Conf::MergeSmallFileThreshold(v) => c.merge_small_file_threshold = v,
        Conf::PunchHoleThreshold(v) => c.punch_hole_threshold = v,
        Conf::RunMode(v) => c.run_mode = v,
      }
    }
    c
  }

  #[inline]
  pub fn in_fallback(&self) -> bool {
    self.run_mode == RunMode::Fallback
  }
}

//! Blob file metadata / Blob 文件元数据

/// File lifecycle / 文件生命周期
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileState {
  #[default]
  Uninit,
  Normal,
  /// Selected by a running GC / 正在被 GC
  BeingGc,
  Obsolete,
}

/// Metadata of one blob file / 单个 blob 文件的元数据
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FileMeta {
  pub id: u64,
  /// Total file size / 文件总大小
  pub size: u64,
  /// Estimated live bytes / 估计存活字节数
  pub live_size: u64,
  /// Record alignment, 0 = not hole-punchable / 记录对齐，0 表示不可打洞
  pub block_size: u64,
  pub state: FileState,
}

impl FileMeta {
  #[inline]
  pub fn new(id: u64, size: u64, live_size: u64) -> Self {
    Self {
      id,
      size,
      live_size: live_size.min(size),
      block_size: 0,
      state: FileState::Normal,
    }
  }

  #[inline]
  pub fn with_block_size(mut self, block_size: u64) -> Self {
    self.block_size = block_size;
    self
  }

  #[inline]
  pub fn with_state(mut self, state: FileState) -> Self {
    self.state = state;
    self
  }

  #[inline]
  pub fn discardable_size(&self) -> u64 {
    self.size.saturating_sub(self.live_size)
  }

  /// Fraction of bytes no longer live, in `[0, 1]` / 不再存活的字节比例
  #[inline]
  pub fn discardable_ratio(&self) -> f64 {
    if self.size == 0 {
      0.0
    } else {
      self.discardable_size() as f64 / self.size as f64
    }
  }

  #[inline(always)]
  pub fn is_normal(&self) -> bool {
    self.state == FileState::Normal
  }
}

/// GC candidate / GC 候选
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
  pub file_id: u64,
  pub score: f64,
}

impl Score {
  #[inline]
  pub fn new(file_id: u64, score: f64) -> Self {
    Self { file_id, score }
  }

  /// Finite and within `[0, 1]` / 有限且在 `[0, 1]` 内
  #[inline]
  pub fn in_range(&self) -> bool {
    (0.0..=1.0).contains(&self.score)
  }
}

/// Scored populations and metadata lookup of one column family
/// 单个列族的评分候选与元数据查询
pub trait BlobStorage {
  /// Ascending by score / 按分数升序
  fn punch_hole_score(&self) -> &[Score];

  /// Descending by score / 按分数降序
  fn gc_score(&self) -> &[Score];

  /// `None` when the file has been retired / 文件已退役时返回 `None`
  fn find_file(&self, id: u64) -> Option<&FileMeta>;
}

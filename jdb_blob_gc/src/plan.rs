//! GC plan - one unit of GC work
//! GC 计划 - 一次 GC 工作单元

use crate::{GcConf, meta::FileMeta};

/// How the selected files are reclaimed / 选中文件的回收方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
  /// Punch holes over dead records in place / 原地对失效记录打洞
  PunchHole,
  /// Rewrite live records into new files / 将存活记录重写到新文件
  Merge,
}

/// Files picked for one GC run, never empty / 一次 GC 选中的文件，非空
#[derive(Debug, Clone, PartialEq)]
pub struct GcPlan {
  pub files: Vec<FileMeta>,
  /// Config at pick time / 挑选时的配置
  pub conf: GcConf,
  /// More garbage remains, schedule again / 仍有垃圾，需再次调度
  pub more: bool,
  pub cf_id: u32,
  pub kind: PlanKind,
}

impl GcPlan {
  #[inline]
  pub fn is_punch_hole(&self) -> bool {
    self.kind == PlanKind::PunchHole
  }

  pub fn file_ids(&self) -> Vec<u64> {
    self.files.iter().map(|f| f.id).collect()
  }

  /// Total size of the selected files / 选中文件总大小
  pub fn input_size(&self) -> u64 {
    self.files.iter().map(|f| f.size).sum()
  }

  #[inline]
  pub fn into_files(self) -> Vec<FileMeta> {
    self.files
  }
}

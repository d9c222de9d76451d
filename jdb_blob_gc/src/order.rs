//! Order - Merge key order
//! 排序 - 合并键序

use std::cmp::Ordering;

/// Key comparator injected into the merge scanner
/// 注入合并扫描器的键比较器
pub trait Order {
  fn cmp(a: &[u8], b: &[u8]) -> Ordering;
}

/// Bytewise ascending / 字节升序
#[derive(Debug, Clone, Copy, Default)]
pub struct Asc;

impl Order for Asc {
  #[inline]
  fn cmp(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
  }
}

/// Bytewise descending / 字节降序
#[derive(Debug, Clone, Copy, Default)]
pub struct Desc;

impl Order for Desc {
  #[inline]
  fn cmp(a: &[u8], b: &[u8]) -> Ordering {
    b.cmp(a)
  }
}

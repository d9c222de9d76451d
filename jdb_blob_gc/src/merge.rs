//! Merge scanner - key-ordered view over many blob files
//! 合并扫描器 - 多个 blob 文件的全局有序视图

use std::{cmp::Ordering, collections::BinaryHeap, marker::PhantomData, mem};

use log::warn;

use crate::{
  Error,
  io::BlobRead,
  order::{Asc, Order},
  record::BlobHandle,
  scan::Scanner,
};

/// Heap item: copy of a child's current key plus the child index.
/// Key buffers are recycled, so advancing does not allocate once warmed up.
/// 堆项：子扫描器当前键的副本及其索引。键缓冲区循环复用，预热后前进不再分配。
struct Item<O> {
  key: Vec<u8>,
  idx: usize,
  _o: PhantomData<O>,
}

impl<O> Item<O> {
  #[inline]
  fn new(mut buf: Vec<u8>, key: &[u8], idx: usize) -> Self {
    buf.clear();
    buf.extend_from_slice(key);
    Self {
      key: buf,
      idx,
      _o: PhantomData,
    }
  }
}

impl<O: Order> PartialEq for Item<O> {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl<O: Order> Eq for Item<O> {}

impl<O: Order> PartialOrd for Item<O> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<O: Order> Ord for Item<O> {
  #[inline]
  fn cmp(&self, other: &Self) -> Ordering {
    // Reverse for min-heap, equal keys: lower child index first
    // 反转以实现最小堆，键相等时子索引小者优先
    match O::cmp(&other.key, &self.key) {
      Ordering::Equal => other.idx.cmp(&self.idx),
      ord => ord,
    }
  }
}

/// K-way merge over single-file scanners / 单文件扫描器的多路归并
pub struct MergeScanner<R, O = Asc> {
  children: Vec<Scanner<R>>,
  heap: BinaryHeap<Item<O>>,
  cur: Option<usize>,
  /// Key buffer of the popped item / 已弹出项的键缓冲区
  spare: Vec<u8>,
  err: Option<Error>,
}

impl<R: BlobRead, O: Order> MergeScanner<R, O> {
  pub fn new(children: Vec<Scanner<R>>) -> Self {
    let cap = children.len();
    Self {
      children,
      heap: BinaryHeap::with_capacity(cap),
      cur: None,
      spare: Vec::new(),
      err: None,
    }
  }

  pub fn seek_to_first(&mut self) {
    self.cur = None;
    let mut bufs: Vec<Vec<u8>> = self.heap.drain().map(|item| item.key).collect();
    for (idx, child) in self.children.iter_mut().enumerate() {
      child.seek_to_first();
      match child.status() {
        Ok(()) if child.valid() => {
          let buf = bufs.pop().unwrap_or_default();
          self.heap.push(Item::new(buf, child.key(), idx));
        }
        Ok(()) => {}
        Err(e) => warn!("merge: blob {} seek failed: {e}", child.file_id()),
      }
    }
    if !self.pop() {
      self.err = Some(Error::Aborted("no valid blob file"));
    }
  }

  pub fn next(&mut self) {
    debug_assert!(self.valid());
    let Some(idx) = self.cur else {
      return;
    };
    let child = &mut self.children[idx];
    child.next();
    match child.status() {
      Ok(()) if child.valid() => {
        let buf = mem::take(&mut self.spare);
        self.heap.push(Item::new(buf, child.key(), idx));
      }
      Ok(()) => {}
      Err(e) => warn!("merge: blob {} next failed: {e}", child.file_id()),
    }
    self.pop();
  }

  /// Make the heap minimum current, false when the heap is empty
  /// 将堆顶设为当前项，堆为空时返回 false
  fn pop(&mut self) -> bool {
    match self.heap.pop() {
      Some(item) => {
        self.cur = Some(item.idx);
        self.spare = item.key;
        true
      }
      None => {
        self.cur = None;
        false
      }
    }
  }

  pub fn valid(&self) -> bool {
    if self.err.is_some() {
      return false;
    }
    self
      .current()
      .is_some_and(|child| child.valid() && child.status().is_ok())
  }

  #[inline]
  pub fn key(&self) -> &[u8] {
    self.expect_current().key()
  }

  #[inline]
  pub fn value(&self) -> &[u8] {
    self.expect_current().value()
  }

  /// Location of the current record / 当前记录位置
  #[inline]
  pub fn handle(&self) -> Option<BlobHandle> {
    self.current().and_then(Scanner::handle)
  }

  /// Own status, then the current child's / 先自身状态，再当前子扫描器状态
  pub fn status(&self) -> std::result::Result<(), &Error> {
    if let Some(e) = &self.err {
      return Err(e);
    }
    match self.current() {
      Some(child) => child.status(),
      None => Ok(()),
    }
  }

  /// Children that stopped on an error. Their remaining records were never
  /// produced, so these inputs must not be retired after the merge.
  /// 因错误停止的子扫描器。其剩余记录未被产出，合并后不得退役这些输入。
  pub fn failed(&self) -> impl Iterator<Item = (u64, &Error)> {
    self
      .children
      .iter()
      .filter_map(|child| child.status().err().map(|e| (child.file_id(), e)))
  }

  #[inline]
  pub fn children(&self) -> &[Scanner<R>] {
    &self.children
  }

  #[inline]
  pub fn into_children(self) -> Vec<Scanner<R>> {
    self.children
  }

  #[inline]
  fn current(&self) -> Option<&Scanner<R>> {
    self.cur.map(|idx| &self.children[idx])
  }

  #[inline]
  fn expect_current(&self) -> &Scanner<R> {
    debug_assert!(self.cur.is_some());
    &self.children[self.cur.unwrap_or_default()]
  }
}

//! Blob file fixtures / Blob 文件测试夹具
//!
//! Assembles byte-exact blob files in memory.
//! 在内存中组装逐字节精确的 blob 文件。

#![allow(dead_code)]

use std::{cell::RefCell, ops::Range};

use jdb_blob_gc::{
  BlobRead, Compression, GcConf, RecordEncoder, Scanner,
  consts::{DICT_BLOCK_NAME, FLAG_DICT},
  format::{BlockHandle, FileFoot, FileHead, MetaIndex, encode_block},
};

/// Built file / 构建结果
pub struct Built {
  pub data: Vec<u8>,
  /// Start offset of every added record / 每条记录的起始偏移
  pub offsets: Vec<u64>,
  /// End of the record region / 记录区末尾
  pub end: u64,
}

impl Built {
  #[inline]
  pub fn size(&self) -> u64 {
    self.data.len() as u64
  }

  pub fn scanner(&self, file_id: u64) -> Scanner<Vec<u8>> {
    Scanner::new(self.data.clone(), file_id, self.size(), &GcConf::default())
  }
}

#[derive(Default)]
pub struct FileBuilder {
  head: FileHead,
  compression: Compression,
  dict: Option<Vec<u8>>,
  meta_index: bool,
  records: Vec<(Vec<u8>, Vec<u8>)>,
  punched: Vec<usize>,
}

impl FileBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn block_size(mut self, block_size: u64) -> Self {
    self.head.block_size = block_size;
    self
  }

  pub fn version(mut self, version: u32) -> Self {
    self.head.version = version;
    self
  }

  pub fn compression(mut self, compression: Compression) -> Self {
    self.compression = compression;
    self
  }

  pub fn dict(mut self, dict: &[u8]) -> Self {
    self.dict = Some(dict.to_vec());
    self
  }

  /// Write a meta-index block even without a dictionary / 无字典时也写元索引块
  pub fn meta_index(mut self) -> Self {
    self.meta_index = true;
    self
  }

  pub fn add(mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Self {
    self
      .records
      .push((key.as_ref().to_vec(), value.as_ref().to_vec()));
    self
  }

  /// Zero the blocks of record `idx` / 将第 `idx` 条记录所在块清零
  pub fn punch(mut self, idx: usize) -> Self {
    self.punched.push(idx);
    self
  }

  pub fn build(self) -> Built {
    let mut head = self.head;
    if self.dict.is_some() {
      head.flags |= FLAG_DICT;
    }
    let block = head.block_size;

    let mut data = head.encode();
    pad(&mut data, block);

    let encoder = match &self.dict {
      Some(dict) => RecordEncoder::with_dict(self.compression, dict),
      None => RecordEncoder::new(self.compression),
    };

    let mut offsets = Vec::with_capacity(self.records.len());
    let mut spans = Vec::with_capacity(self.records.len());
    for (key, value) in &self.records {
      let start = data.len();
      encoder.encode(key, value, &mut data).unwrap();
      pad(&mut data, block);
      offsets.push(start as u64);
      spans.push(start..data.len());
    }
    for idx in self.punched {
      data[spans[idx].clone()].fill(0);
    }
    let end = data.len() as u64;

    let mut meta = MetaIndex::new();
    if let Some(dict) = &self.dict {
      let handle = BlockHandle::new(data.len() as u64, dict.len() as u64);
      encode_block(dict, &mut data);
      meta.add(DICT_BLOCK_NAME, handle);
    }

    let mut foot = FileFoot::default();
    if self.dict.is_some() || self.meta_index {
      let contents = meta.encode();
      foot.meta_index = BlockHandle::new(data.len() as u64, contents.len() as u64);
      encode_block(&contents, &mut data);
    }
    data.extend_from_slice(&foot.encode());

    Built { data, offsets, end }
  }
}

fn pad(data: &mut Vec<u8>, block: u64) {
  if block == 0 {
    return;
  }
  let len = (data.len() as u64).div_ceil(block) * block;
  data.resize(len as usize, 0);
}

/// Big-endian key so bytewise order matches numeric order
/// 大端键，使字节序与数值序一致
pub fn key(n: u32) -> [u8; 4] {
  n.to_be_bytes()
}

pub fn value(n: u32) -> Vec<u8> {
  format!("value-{n:08}").into_bytes()
}

/// Build a file holding keys `range` / 构建包含 `range` 中键的文件
pub fn file_of(range: impl IntoIterator<Item = u32>) -> Built {
  range
    .into_iter()
    .fold(FileBuilder::new(), |b, n| b.add(key(n), value(n)))
    .build()
}

/// Drain a scanner from the first record / 从第一条记录开始耗尽扫描器
pub fn drain<R: BlobRead>(scanner: &mut Scanner<R>) -> Vec<(Vec<u8>, Vec<u8>)> {
  let mut out = Vec::new();
  scanner.seek_to_first();
  while scanner.valid() {
    out.push((scanner.key().to_vec(), scanner.value().to_vec()));
    scanner.next();
  }
  out
}

/// Reader recording prefetch hints / 记录预取提示的读取器
#[derive(Default)]
pub struct Recording {
  pub data: Vec<u8>,
  pub prefetched: RefCell<Vec<(u64, u64)>>,
}

impl Recording {
  pub fn new(data: Vec<u8>) -> Self {
    Self {
      data,
      prefetched: RefCell::default(),
    }
  }
}

impl BlobRead for Recording {
  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
    self.data.read_exact_at(offset, buf)
  }

  fn prefetch(&self, offset: u64, len: u64) {
    self.prefetched.borrow_mut().push((offset, len));
  }
}

/// Reader failing every read overlapping `bad` / 与 `bad` 重叠的读取均失败
pub struct Failing {
  pub data: Vec<u8>,
  pub bad: Range<u64>,
}

impl BlobRead for Failing {
  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
    let end = offset + buf.len() as u64;
    if offset < self.bad.end && end > self.bad.start {
      return Err(std::io::Error::other("injected read failure"));
    }
    self.data.read_exact_at(offset, buf)
  }
}

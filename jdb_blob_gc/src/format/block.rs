//! Trailing blocks: dictionary and meta-index / 尾部块：字典与元索引

use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned, byteorder::little_endian::U64,
};

use crate::{Error, Result, consts::BLOCK_TRAILER_SIZE, io::BlobRead};

/// Raw block kind / 原始块类型
const KIND_RAW: u8 = 0;

#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy)]
#[repr(C)]
struct RawHandle {
  offset: U64,
  size: U64,
}

const HANDLE_SIZE: usize = size_of::<RawHandle>();

/// Location of a block, trailer excluded / 块位置（不含块尾）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockHandle {
  pub offset: u64,
  pub size: u64,
}

impl BlockHandle {
  #[inline]
  pub const fn new(offset: u64, size: u64) -> Self {
    Self { offset, size }
  }

  #[inline(always)]
  pub fn is_null(&self) -> bool {
    self.offset == 0 && self.size == 0
  }

  /// First byte past the trailer, `None` on overflow
  /// 块尾之后的第一个字节，溢出时为 `None`
  #[inline]
  pub fn end(&self) -> Option<u64> {
    self
      .offset
      .checked_add(self.size)?
      .checked_add(BLOCK_TRAILER_SIZE)
  }
}

/// Append `contents` followed by its trailer / 追加块内容及块尾
pub fn encode_block(contents: &[u8], out: &mut Vec<u8>) {
  out.extend_from_slice(contents);
  out.push(KIND_RAW);
  let mut hasher = crc32fast::Hasher::new();
  hasher.update(contents);
  hasher.update(&[KIND_RAW]);
  out.extend_from_slice(&hasher.finalize().to_le_bytes());
}

/// Read a block and verify its trailer. The caller bounds `handle` to the file.
/// 读取块并校验块尾，调用方需保证 `handle` 位于文件内。
pub fn read_block<R: BlobRead + ?Sized>(file: &R, handle: BlockHandle) -> Result<Vec<u8>> {
  let too_large = || Error::BlockOutOfRange {
    offset: handle.offset,
    size: handle.size,
  };
  let size = usize::try_from(handle.size).map_err(|_| too_large())?;
  let len = size
    .checked_add(BLOCK_TRAILER_SIZE as usize)
    .ok_or_else(too_large)?;
  let mut buf = vec![0u8; len];
  file.read_exact_at(handle.offset, &mut buf)?;

  let kind = buf[size];
  if kind != KIND_RAW {
    return Err(Error::UnknownCodec(kind));
  }
  let mut crc = [0u8; 4];
  crc.copy_from_slice(&buf[size + 1..]);
  let expected = u32::from_le_bytes(crc);
  let got = crc32fast::hash(&buf[..=size]);
  if expected != got {
    return Err(Error::BlockCrc {
      offset: handle.offset,
      expected,
      got,
    });
  }

  buf.truncate(size);
  Ok(buf)
}

/// Named block handles / 具名块句柄
///
/// Entry: `name_len u8 | name | offset u64 | size u64`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaIndex {
  entries: Vec<(Box<[u8]>, BlockHandle)>,
}

impl MetaIndex {
  #[inline]
  pub fn new() -> Self {
    Self::default()
  }

  /// Add an entry, names longer than 255 bytes are truncated
  /// 添加条目，超过 255 字节的名称被截断
  pub fn add(&mut self, name: &[u8], handle: BlockHandle) {
    let name = &name[..name.len().min(u8::MAX as usize)];
    self.entries.push((name.into(), handle));
  }

  pub fn get(&self, name: &[u8]) -> Option<BlockHandle> {
    self
      .entries
      .iter()
      .find(|(n, _)| n.as_ref() == name)
      .map(|(_, h)| *h)
  }

  pub fn decode(mut buf: &[u8]) -> Result<Self> {
    let mut entries = Vec::new();
    while let Some((&name_len, rest)) = buf.split_first() {
      let name_len = name_len as usize;
      if rest.len() < name_len + HANDLE_SIZE {
        return Err(Error::Truncated {
          what: "meta-index entry",
          need: (name_len + HANDLE_SIZE) as u64,
          got: rest.len() as u64,
        });
      }
      let (name, rest) = rest.split_at(name_len);
      let (raw, rest) =
        RawHandle::read_from_prefix(rest).map_err(|_| Error::BadRecord("meta-index handle"))?;
      entries.push((
        name.into(),
        BlockHandle::new(raw.offset.get(), raw.size.get()),
      ));
      buf = rest;
    }
    Ok(Self { entries })
  }

  pub fn encode(&self) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, handle) in &self.entries {
      out.push(name.len() as u8);
      out.extend_from_slice(name);
      let raw = RawHandle {
        offset: U64::new(handle.offset),
        size: U64::new(handle.size),
      };
      out.extend_from_slice(raw.as_bytes());
    }
    out
  }
}

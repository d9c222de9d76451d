//! Blob file header / Blob 文件头
//!
//! | Field      | Size | Since |
//! |------------|------|-------|
//! | magic      | 4    | v1    |
//! | version    | 4    | v1    |
//! | flags      | 4    | v2    |
//! | block_size | 8    | v3    |

use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
  byteorder::little_endian::{U32, U64},
};

use crate::{
  Error, Result,
  consts::{FLAG_DICT, HEAD_MAGIC},
};

pub const HEAD_V1: u32 = 1;
pub const HEAD_V2: u32 = 2;
pub const HEAD_V3: u32 = 3;

/// Longest header (v3) / 最长文件头（v3）
pub const HEAD_MAX_SIZE: usize = size_of::<RawHead>();

#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy)]
#[repr(C)]
struct RawHead {
  magic: U32,
  version: U32,
  flags: U32,
  block_size: U64,
}

/// Decoded header / 解码后的文件头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHead {
  pub version: u32,
  pub flags: u32,
  /// 0 = records not aligned / 0 表示记录不对齐
  pub block_size: u64,
}

impl Default for FileHead {
  fn default() -> Self {
    Self {
      version: HEAD_V3,
      flags: 0,
      block_size: 0,
    }
  }
}

impl FileHead {
  /// Encoded length of a header of `version` / 指定版本的编码长度
  #[inline]
  pub fn len_of(version: u32) -> Option<usize> {
    match version {
      HEAD_V1 => Some(8),
      HEAD_V2 => Some(12),
      HEAD_V3 => Some(HEAD_MAX_SIZE),
      _ => None,
    }
  }

  #[inline]
  pub fn size(&self) -> u64 {
    Self::len_of(self.version).unwrap_or(HEAD_MAX_SIZE) as u64
  }

  #[inline(always)]
  pub fn has_dict(&self) -> bool {
    self.flags & FLAG_DICT != 0
  }

  /// Decode from the start of the file, trailing bytes ignored
  /// 从文件起始解码，忽略多余字节
  pub fn decode(buf: &[u8]) -> Result<Self> {
    let mut raw = [0u8; HEAD_MAX_SIZE];
    let n = buf.len().min(HEAD_MAX_SIZE);
    raw[..n].copy_from_slice(&buf[..n]);
    if n < 8 {
      return Err(Error::Truncated {
        what: "header",
        need: 8,
        got: n as u64,
      });
    }

    let head =
      RawHead::read_from_bytes(&raw[..]).map_err(|_| Error::BadRecord("header layout"))?;
    let magic = head.magic.get();
    if magic != HEAD_MAGIC {
      return Err(Error::BadMagic(u64::from(magic)));
    }
    let version = head.version.get();
    let need = Self::len_of(version).ok_or(Error::BadVersion(version))?;
    if n < need {
      return Err(Error::Truncated {
        what: "header",
        need: need as u64,
        got: n as u64,
      });
    }

    Ok(Self {
      version,
      flags: if version >= HEAD_V2 { head.flags.get() } else { 0 },
      block_size: if version >= HEAD_V3 {
        head.block_size.get()
      } else {
        0
      },
    })
  }

  /// Encode at this header's version / 按版本编码
  pub fn encode(&self) -> Vec<u8> {
    let raw = RawHead {
      magic: U32::new(HEAD_MAGIC),
      version: U32::new(self.version),
      flags: U32::new(self.flags),
      block_size: U64::new(self.block_size),
    };
    let len = self.size() as usize;
    raw.as_bytes()[..len].to_vec()
  }
}

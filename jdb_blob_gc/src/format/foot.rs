//! Blob file footer / Blob 文件尾
//!
//! ```text
//! [0..16]  meta-index handle (offset u64, size u64)
//! [16..24] magic u64
//! [24..28] reserved
//! [28..32] crc32 over [0..28]
//! ```

use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
  byteorder::little_endian::{U32, U64},
};

use super::BlockHandle;
use crate::{Error, Result, consts::FOOT_MAGIC};

#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy)]
#[repr(C)]
struct RawFoot {
  meta_offset: U64,
  meta_size: U64,
  magic: U64,
  _reserved: U32,
  crc: U32,
}

pub const FOOT_SIZE: usize = size_of::<RawFoot>();

const CRC_COVER: usize = FOOT_SIZE - 4;

/// Decoded footer / 解码后的文件尾
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileFoot {
  /// Null when no meta-index block / 无元索引块时为空
  pub meta_index: BlockHandle,
}

impl FileFoot {
  pub fn decode(buf: &[u8]) -> Result<Self> {
    let Ok(foot) = RawFoot::read_from_bytes(buf) else {
      return Err(Error::Truncated {
        what: "footer",
        need: FOOT_SIZE as u64,
        got: buf.len() as u64,
      });
    };
    let magic = foot.magic.get();
    if magic != FOOT_MAGIC {
      return Err(Error::BadMagic(magic));
    }
    let expected = foot.crc.get();
    let got = crc32fast::hash(&buf[..CRC_COVER]);
    if expected != got {
      return Err(Error::FootCrc { expected, got });
    }
    Ok(Self {
      meta_index: BlockHandle::new(foot.meta_offset.get(), foot.meta_size.get()),
    })
  }

  pub fn encode(&self) -> [u8; FOOT_SIZE] {
    let mut raw = RawFoot {
      meta_offset: U64::new(self.meta_index.offset),
      meta_size: U64::new(self.meta_index.size),
      magic: U64::new(FOOT_MAGIC),
      _reserved: U32::new(0),
      crc: U32::new(0),
    };
    raw.crc = U32::new(crc32fast::hash(&raw.as_bytes()[..CRC_COVER]));
    let mut out = [0u8; FOOT_SIZE];
    out.copy_from_slice(raw.as_bytes());
    out
  }
}

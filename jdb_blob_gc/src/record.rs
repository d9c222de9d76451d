//! Record layout / 记录布局
//!
//! ```text
//! [0..4]  crc32 (u32)        - covers [4..9] and payload / 覆盖 [4..9] 与负载
//! [4..8]  payload_len (u32)  - 0 marks a hole-punched slot / 0 表示已打洞
//! [8]     codec (u8)         - 0=none, 1=lz4, 2=zstd
//! [9..]   payload
//! ```
//!
//! Decompressed payload: `key_len u32 | key | value`.
//! 解压后负载：`key_len u32 | key | value`。

use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned, byteorder::little_endian::U32,
};

use crate::consts::{PAYLOAD_LEN_OFFSET, RECORD_HEAD_SIZE};

/// Fixed record header / 定长记录头
#[derive(
  FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy, Debug, Default,
)]
#[repr(C)]
pub struct RecordHead {
  pub crc: U32,
  pub len: U32,
  pub codec: u8,
}

const _: () = assert!(size_of::<RecordHead>() == RECORD_HEAD_SIZE as usize);

impl RecordHead {
  /// Payload length sub-field, read without decoding the header
  /// 不解码整个头，直接读取负载长度
  #[inline(always)]
  pub fn payload_len_of(buf: &[u8; RECORD_HEAD_SIZE as usize]) -> u32 {
    let mut len = [0u8; 4];
    len.copy_from_slice(&buf[PAYLOAD_LEN_OFFSET..PAYLOAD_LEN_OFFSET + 4]);
    u32::from_le_bytes(len)
  }

  #[inline(always)]
  pub fn payload_len(&self) -> u64 {
    u64::from(self.len.get())
  }

  /// Bytes covered by the checksum besides the payload
  /// 除负载外校验和覆盖的字节
  #[inline(always)]
  pub fn crc_prefix(&self) -> &[u8] {
    &self.as_bytes()[PAYLOAD_LEN_OFFSET..]
  }
}

/// Decoded key/value, buffers reused across records
/// 解码后的键值，缓冲区跨记录复用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobRecord {
  pub key: Vec<u8>,
  pub value: Vec<u8>,
}

/// Where a record lives / 记录位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BlobHandle {
  pub file_id: u64,
  /// Record start (header included) / 记录起始（含头）
  pub offset: u64,
  /// Header + payload, before block rounding / 头 + 负载，不含块对齐
  pub size: u64,
}

//! Record codec / 记录编解码

use zerocopy::{FromBytes, IntoBytes};
use zstd::bulk::{Compressor, Decompressor};

use crate::{
  Error, Result,
  record::{BlobRecord, RecordHead},
};

/// zstd level used by the encoder / 编码器使用的 zstd 级别
const ZSTD_LEVEL: i32 = 3;

/// Size of the key length prefix / 键长度前缀大小
const KEY_LEN_SIZE: usize = 4;

/// Compression codec / 压缩算法
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Compression {
  #[default]
  None = 0,
  Lz4 = 1,
  Zstd = 2,
}

impl Compression {
  #[inline]
  pub fn from_u8(v: u8) -> Result<Self> {
    match v {
      0 => Ok(Self::None),
      1 => Ok(Self::Lz4),
      2 => Ok(Self::Zstd),
      _ => Err(Error::UnknownCodec(v)),
    }
  }
}

/// Decodes record headers and payloads / 解码记录头与负载
#[derive(Default)]
pub struct RecordDecoder {
  dict: Option<Box<[u8]>>,
  zstd: Option<Decompressor<'static>>,
}

impl RecordDecoder {
  #[inline]
  pub fn new() -> Self {
    Self::default()
  }

  /// Install the shared compression dictionary / 安装共享压缩字典
  pub fn set_dict(&mut self, dict: Vec<u8>) -> Result<()> {
    self.zstd = Some(Decompressor::with_dictionary(&dict).map_err(Error::decompress)?);
    self.dict = Some(dict.into_boxed_slice());
    Ok(())
  }

  #[inline]
  pub fn has_dict(&self) -> bool {
    self.dict.is_some()
  }

  /// Validate a record header / 校验记录头
  pub fn decode_head(&self, buf: &[u8]) -> Result<RecordHead> {
    let Ok((head, _)) = RecordHead::read_from_prefix(buf) else {
      return Err(Error::Truncated {
        what: "record header",
        need: size_of::<RecordHead>() as u64,
        got: buf.len() as u64,
      });
    };
    if head.len.get() == 0 {
      return Err(Error::BadRecord("empty payload"));
    }
    Compression::from_u8(head.codec)?;
    Ok(head)
  }

  /// Verify, decompress and split `payload` into `out`
  /// 校验、解压并将 `payload` 拆分到 `out`
  pub fn decode(
    &mut self,
    head: &RecordHead,
    payload: &[u8],
    offset: u64,
    out: &mut BlobRecord,
  ) -> Result<()> {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(head.crc_prefix());
    hasher.update(payload);
    let got = hasher.finalize();
    let expected = head.crc.get();
    if expected != got {
      return Err(Error::RecordCrc {
        offset,
        expected,
        got,
      });
    }

    match Compression::from_u8(head.codec)? {
      Compression::None => split(payload, out),
      Compression::Lz4 => {
        let raw = match &self.dict {
          Some(dict) => lz4_flex::block::decompress_size_prepended_with_dict(payload, dict)?,
          None => lz4_flex::block::decompress_size_prepended(payload)?,
        };
        split(&raw, out)
      }
      Compression::Zstd => {
        let (raw_len, data) = raw_len_prefix(payload)?;
        let raw = match &mut self.zstd {
          Some(zstd) => zstd.decompress(data, raw_len),
          None => zstd::bulk::decompress(data, raw_len),
        }
        .map_err(Error::decompress)?;
        if raw.len() != raw_len {
          return Err(Error::BadRecord("zstd length mismatch"));
        }
        split(&raw, out)
      }
    }
  }
}

/// Encodes records, the inverse of [`RecordDecoder`]
/// 记录编码器，与 [`RecordDecoder`] 互逆
#[derive(Default)]
pub struct RecordEncoder {
  compression: Compression,
  dict: Option<Box<[u8]>>,
}

impl RecordEncoder {
  #[inline]
  pub fn new(compression: Compression) -> Self {
    Self {
      compression,
      dict: None,
    }
  }

  #[inline]
  pub fn with_dict(compression: Compression, dict: &[u8]) -> Self {
    Self {
      compression,
      dict: Some(dict.into()),
    }
  }

  /// Append header + payload to `out` / 追加记录头与负载到 `out`
  pub fn encode(&self, key: &[u8], value: &[u8], out: &mut Vec<u8>) -> Result<()> {
    let key_len = u32::try_from(key.len()).map_err(|_| Error::BadRecord("key too large"))?;
    let mut raw = Vec::with_capacity(KEY_LEN_SIZE + key.len() + value.len());
    raw.extend_from_slice(&key_len.to_le_bytes());
    raw.extend_from_slice(key);
    raw.extend_from_slice(value);

    let payload = match self.compression {
      Compression::None => raw,
      Compression::Lz4 => match &self.dict {
        Some(dict) => lz4_flex::block::compress_prepend_size_with_dict(&raw, dict),
        None => lz4_flex::block::compress_prepend_size(&raw),
      },
      Compression::Zstd => {
        let data = match &self.dict {
          Some(dict) => Compressor::with_dictionary(ZSTD_LEVEL, dict)?.compress(&raw)?,
          None => zstd::bulk::compress(&raw, ZSTD_LEVEL)?,
        };
        let raw_len =
          u32::try_from(raw.len()).map_err(|_| Error::BadRecord("record too large"))?;
        let mut payload = Vec::with_capacity(4 + data.len());
        payload.extend_from_slice(&raw_len.to_le_bytes());
        payload.extend_from_slice(&data);
        payload
      }
    };

    let len = u32::try_from(payload.len()).map_err(|_| Error::BadRecord("record too large"))?;
    let mut head = RecordHead {
      crc: 0.into(),
      len: len.into(),
      codec: self.compression as u8,
    };
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(head.crc_prefix());
    hasher.update(&payload);
    head.crc = hasher.finalize().into();

    out.extend_from_slice(head.as_bytes());
    out.extend_from_slice(&payload);
    Ok(())
  }
}

fn raw_len_prefix(payload: &[u8]) -> Result<(usize, &[u8])> {
  let Some((len, data)) = payload.split_first_chunk::<4>() else {
    return Err(Error::BadRecord("missing length prefix"));
  };
  Ok((u32::from_le_bytes(*len) as usize, data))
}

fn split(raw: &[u8], out: &mut BlobRecord) -> Result<()> {
  let Some((key_len, rest)) = raw.split_first_chunk::<KEY_LEN_SIZE>() else {
    return Err(Error::BadRecord("missing key length"));
  };
  let key_len = u32::from_le_bytes(*key_len) as usize;
  if key_len > rest.len() {
    return Err(Error::BadRecord("key length exceeds payload"));
  }
  let (key, value) = rest.split_at(key_len);
  out.key.clear();
  out.key.extend_from_slice(key);
  out.value.clear();
  out.value.extend_from_slice(value);
  Ok(())
}

//! Blob GC errors / Blob GC 错误

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("bad magic: {0:08x}")]
  BadMagic(u64),

  #[error("unsupported version: {0}")]
  BadVersion(u32),

  #[error("truncated {what}: need {need} bytes, got {got}")]
  Truncated {
    what: &'static str,
    need: u64,
    got: u64,
  },

  #[error("footer crc mismatch: expected {expected:08x}, got {got:08x}")]
  FootCrc { expected: u32, got: u32 },

  #[error("block crc mismatch at {offset}: expected {expected:08x}, got {got:08x}")]
  BlockCrc {
    offset: u64,
    expected: u32,
    got: u32,
  },

  #[error("record crc mismatch at {offset}: expected {expected:08x}, got {got:08x}")]
  RecordCrc {
    offset: u64,
    expected: u32,
    got: u32,
  },

  #[error("unknown codec: {0}")]
  UnknownCodec(u8),

  #[error("decompress: {0}")]
  Decompress(Box<str>),

  #[error("bad record: {0}")]
  BadRecord(&'static str),

  #[error("dictionary flag set but no dictionary block")]
  MissingDict,

  #[error("record region end {end} not beyond header length {head}")]
  BadLayout { head: u64, end: u64 },

  #[error("block at {offset} with size {size} lies outside its region")]
  BlockOutOfRange { offset: u64, size: u64 },

  #[error("hole punch at {0} in a file without block alignment")]
  HoleWithoutBlock(u64),

  #[error("offset {offset} out of bound, records end at {end}")]
  OutOfBound { offset: u64, end: u64 },

  #[error("aborted: {0}")]
  Aborted(&'static str),
}

impl Error {
  /// Storage read failure / 存储读取失败
  #[inline]
  pub fn is_io(&self) -> bool {
    matches!(self, Self::Io(_))
  }

  /// Header, footer, block or record could not be decoded
  /// 头、尾、块或记录无法解码
  pub fn is_corruption(&self) -> bool {
    matches!(
      self,
      Self::BadMagic(_)
        | Self::BadVersion(_)
        | Self::Truncated { .. }
        | Self::FootCrc { .. }
        | Self::BlockCrc { .. }
        | Self::RecordCrc { .. }
        | Self::UnknownCodec(_)
        | Self::Decompress(_)
        | Self::BadRecord(_)
        | Self::MissingDict
        | Self::BadLayout { .. }
        | Self::BlockOutOfRange { .. }
        | Self::HoleWithoutBlock(_)
    )
  }

  #[inline]
  pub fn is_invalid_argument(&self) -> bool {
    matches!(self, Self::OutOfBound { .. })
  }

  #[inline]
  pub fn is_aborted(&self) -> bool {
    matches!(self, Self::Aborted(_))
  }

  #[inline]
  pub(crate) fn decompress(msg: impl ToString) -> Self {
    Self::Decompress(msg.to_string().into_boxed_str())
  }
}

impl From<lz4_flex::block::DecompressError> for Error {
  fn from(err: lz4_flex::block::DecompressError) -> Self {
    Self::decompress(err)
  }
}

//! Storage access used by scanners / 扫描器使用的存储访问
//!
//! Reads block the caller. Prefetch is advisory and never fails the caller.
//! 读取阻塞调用方；预取仅为建议，不会让调用方失败。

use std::{io, rc::Rc, sync::Arc};

/// Ranged reader over one blob file / 单个 blob 文件的区间读取
pub trait BlobRead {
  /// Fill `buf` from `offset` / 从 `offset` 填满 `buf`
  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()>;

  /// Hint that `[offset, offset + len)` will be read soon
  /// 提示即将读取 `[offset, offset + len)`
  #[inline]
  fn prefetch(&self, _offset: u64, _len: u64) {}
}

impl BlobRead for [u8] {
  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    let start = usize::try_from(offset).map_err(|_| eof(offset))?;
    let end = start.checked_add(buf.len()).ok_or_else(|| eof(offset))?;
    match self.get(start..end) {
      Some(src) => {
        buf.copy_from_slice(src);
        Ok(())
      }
      None => Err(eof(offset)),
    }
  }
}

impl BlobRead for Vec<u8> {
  #[inline]
  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    self.as_slice().read_exact_at(offset, buf)
  }
}

impl BlobRead for Box<[u8]> {
  #[inline]
  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    (**self).read_exact_at(offset, buf)
  }
}

impl<T: BlobRead + ?Sized> BlobRead for &T {
  #[inline]
  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    (**self).read_exact_at(offset, buf)
  }

  #[inline]
  fn prefetch(&self, offset: u64, len: u64) {
    (**self).prefetch(offset, len)
  }
}

impl<T: BlobRead + ?Sized> BlobRead for Rc<T> {
  #[inline]
  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    (**self).read_exact_at(offset, buf)
  }

  #[inline]
  fn prefetch(&self, offset: u64, len: u64) {
    (**self).prefetch(offset, len)
  }
}

impl<T: BlobRead + ?Sized> BlobRead for Arc<T> {
  #[inline]
  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    (**self).read_exact_at(offset, buf)
  }

  #[inline]
  fn prefetch(&self, offset: u64, len: u64) {
    (**self).prefetch(offset, len)
  }
}

#[cfg(unix)]
impl BlobRead for std::fs::File {
  #[inline]
  fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    std::os::unix::fs::FileExt::read_exact_at(self, buf, offset)
  }

  fn prefetch(&self, offset: u64, len: u64) {
    os::fadvise_willneed(self, offset, len);
  }
}

fn eof(offset: u64) -> io::Error {
  io::Error::new(
    io::ErrorKind::UnexpectedEof,
    format!("read past end at {offset}"),
  )
}

#[cfg(target_os = "linux")]
mod os {
  use std::{fs::File, os::fd::AsRawFd};

  pub fn fadvise_willneed(file: &File, offset: u64, len: u64) {
    let (Ok(off), Ok(len)) = (i64::try_from(offset), i64::try_from(len)) else {
      return;
    };
    // Advisory only, result ignored / 仅为建议，忽略结果
    unsafe {
      libc::posix_fadvise(file.as_raw_fd(), off, len, libc::POSIX_FADV_WILLNEED);
    }
  }
}

#[cfg(all(unix, not(target_os = "linux")))]
mod os {
  use std::fs::File;

  #[inline]
  pub fn fadvise_willneed(_file: &File, _offset: u64, _len: u64) {}
}

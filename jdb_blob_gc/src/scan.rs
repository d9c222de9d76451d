//! Single blob file scanner / 单个 blob 文件扫描器
//!
//! Walks the record region in offset order, skipping hole-punched blocks and
//! growing a read-ahead window as it goes.
//! 按偏移顺序遍历记录区，跳过已打洞的块，并逐步扩大预读窗口。

use log::{debug, warn};

use crate::{
  Error, GcConf, Result,
  codec::RecordDecoder,
  consts::{
    BLOCK_TRAILER_SIZE, DICT_BLOCK_NAME, MAX_READAHEAD, MIN_READAHEAD, PAGE_SIZE, RECORD_HEAD_SIZE,
  },
  format::{BlockHandle, FOOT_SIZE, FileFoot, FileHead, HEAD_MAX_SIZE, MetaIndex, read_block},
  io::BlobRead,
  record::{BlobHandle, BlobRecord, RecordHead},
};

const HEAD: usize = RECORD_HEAD_SIZE as usize;

/// Scanner state / 扫描器状态
#[derive(Debug)]
pub enum State {
  /// Header and footer not read yet / 尚未读取头尾
  Uninit,
  /// Initialised, no record decoded / 已初始化，未解码记录
  Idle,
  /// Holding a decoded record / 持有已解码记录
  Positioned(BlobHandle),
  /// Reached the end of the record region / 已到达记录区末尾
  Exhausted,
  /// Sticky failure / 粘性失败
  Failed(Error),
}

/// Adaptive read-ahead window `[begin, end)` / 自适应预读窗口
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readahead {
  pub begin: u64,
  pub end: u64,
  /// Next prefetch size / 下次预取大小
  pub size: u64,
}

impl Readahead {
  /// Make sure `[cursor, want]` is being fetched / 确保 `[cursor, want]` 已在预取中
  fn advance<R: BlobRead>(&mut self, file: &R, cursor: u64, want: u64) {
    if self.begin > cursor || self.end < cursor {
      self.begin = cursor - (cursor & (PAGE_SIZE - 1));
      self.end = self.begin;
      self.size = MIN_READAHEAD;
    }
    if self.end <= want {
      while self.end + self.size <= want && self.size < MAX_READAHEAD {
        self.size <<= 1;
      }
      file.prefetch(self.end, self.size);
      self.end += self.size;
      self.size = MAX_READAHEAD.min(self.size << 1);
    }
  }
}

/// Record region bounds, known after init / 记录区边界，初始化后可用
#[derive(Debug, Clone, Copy, Default)]
struct Layout {
  head_size: u64,
  /// First byte past the last record / 最后一条记录之后的第一个字节
  end: u64,
  block_size: u64,
}

impl Layout {
  #[inline(always)]
  fn first(&self) -> u64 {
    round_up(self.head_size, self.block_size)
  }
}

/// Sequential scanner over one blob file / 单文件顺序扫描器
pub struct Scanner<R> {
  file: R,
  file_id: u64,
  file_size: u64,
  min_blob_size: u64,
  layout: Layout,
  decoder: RecordDecoder,
  cursor: u64,
  readahead: Readahead,
  state: State,
  rec: BlobRecord,
  payload: Vec<u8>,
}

impl<R: BlobRead> Scanner<R> {
  pub fn new(file: R, file_id: u64, file_size: u64, conf: &GcConf) -> Self {
    Self {
      file,
      file_id,
      file_size,
      min_blob_size: conf.min_blob_size,
      layout: Layout::default(),
      decoder: RecordDecoder::new(),
      cursor: 0,
      readahead: Readahead::default(),
      state: State::Uninit,
      rec: BlobRecord::default(),
      payload: Vec::new(),
    }
  }

  /// Position at the first record / 定位到第一条记录
  pub fn seek_to_first(&mut self) {
    if !self.ensure_init() {
      return;
    }
    self.cursor = self.layout.first();
    self.scan();
  }

  /// Advance past the current record / 前进到下一条记录
  pub fn next(&mut self) {
    match self.state {
      State::Failed(_) => {}
      State::Uninit => self.fail(Error::Aborted("next before seek")),
      _ => self.scan(),
    }
  }

  /// Place the cursor on the record starting at the greatest offset <= `target`.
  /// Only headers are read; call [`Self::next`] to decode that record.
  /// 将游标放到起始偏移不大于 `target` 的最后一条记录。
  /// 只读取记录头，需调用 [`Self::next`] 解码。
  pub fn iterate_for_prev(&mut self, target: u64) {
    if !self.ensure_init() {
      return;
    }
    if target >= self.layout.end {
      self.cursor = target;
      self.fail(Error::OutOfBound {
        offset: target,
        end: self.layout.end,
      });
      return;
    }

    let mut step = 0;
    self.cursor = self.layout.first();
    while self.cursor < target {
      step = match self.record_len_at(self.cursor) {
        Ok(n) => n,
        Err(e) => return self.fail(e),
      };
      self.cursor += step;
    }
    if self.cursor > target {
      self.cursor -= step;
    }
    self.state = State::Idle;
  }

  #[inline]
  pub fn valid(&self) -> bool {
    matches!(self.state, State::Positioned(_))
  }

  #[inline]
  pub fn key(&self) -> &[u8] {
    debug_assert!(self.valid());
    &self.rec.key
  }

  #[inline]
  pub fn value(&self) -> &[u8] {
    debug_assert!(self.valid());
    &self.rec.value
  }

  /// Location of the current record / 当前记录位置
  #[inline]
  pub fn handle(&self) -> Option<BlobHandle> {
    match self.state {
      State::Positioned(h) => Some(h),
      _ => None,
    }
  }

  #[inline]
  pub fn status(&self) -> std::result::Result<(), &Error> {
    match &self.state {
      State::Failed(e) => Err(e),
      _ => Ok(()),
    }
  }

  #[inline]
  pub fn state(&self) -> &State {
    &self.state
  }

  #[inline]
  pub fn file_id(&self) -> u64 {
    self.file_id
  }

  /// Next offset to scan from / 下一个扫描起点
  #[inline]
  pub fn cursor(&self) -> u64 {
    self.cursor
  }

  /// End of the record region, 0 before init / 记录区末尾，初始化前为 0
  #[inline]
  pub fn end_of_records(&self) -> u64 {
    self.layout.end
  }

  #[inline]
  pub fn block_size(&self) -> u64 {
    self.layout.block_size
  }

  #[inline]
  pub fn readahead(&self) -> Readahead {
    self.readahead
  }

  fn ensure_init(&mut self) -> bool {
    match self.state {
      State::Failed(_) => false,
      State::Uninit => match self.init() {
        Ok(()) => {
          self.state = State::Idle;
          true
        }
        Err(e) => {
          self.fail(e);
          false
        }
      },
      _ => true,
    }
  }

  fn init(&mut self) -> Result<()> {
    let head_len = self.file_size.min(HEAD_MAX_SIZE as u64) as usize;
    let mut buf = [0u8; HEAD_MAX_SIZE];
    self.file.read_exact_at(0, &mut buf[..head_len])?;
    let head = FileHead::decode(&buf[..head_len])?;

    let foot_size = FOOT_SIZE as u64;
    let Some(foot_at) = self.file_size.checked_sub(foot_size) else {
      return Err(Error::Truncated {
        what: "footer",
        need: foot_size,
        got: self.file_size,
      });
    };
    let mut buf = [0u8; FOOT_SIZE];
    self.file.read_exact_at(foot_at, &mut buf)?;
    let foot = FileFoot::decode(&buf)?;

    let bad_layout = || Error::BadLayout {
      head: head.size(),
      end: 0,
    };
    let mut end = foot_at;
    if !foot.meta_index.is_null() {
      check_block(foot.meta_index, head.size(), foot_at)?;
      end = end
        .checked_sub(foot.meta_index.size)
        .and_then(|n| n.checked_sub(BLOCK_TRAILER_SIZE))
        .ok_or_else(bad_layout)?;
    }

    if head.has_dict() {
      if foot.meta_index.is_null() {
        return Err(Error::MissingDict);
      }
      let meta = MetaIndex::decode(&read_block(&self.file, foot.meta_index)?)?;
      let handle = meta.get(DICT_BLOCK_NAME).ok_or(Error::MissingDict)?;
      // Dictionary sits between the header and the meta-index
      // 字典位于文件头与元索引之间
      check_block(handle, head.size(), foot.meta_index.offset)?;
      let dict = read_block(&self.file, handle)?;
      end = end
        .checked_sub(handle.size)
        .and_then(|n| n.checked_sub(BLOCK_TRAILER_SIZE))
        .ok_or_else(bad_layout)?;
      self.decoder.set_dict(dict)?;
    }

    if end <= head.size() {
      return Err(Error::BadLayout {
        head: head.size(),
        end,
      });
    }

    self.layout = Layout {
      head_size: head.size(),
      end,
      block_size: head.block_size,
    };
    debug!(
      "blob {} init: head={} end={} block={} dict={}",
      self.file_id,
      head.size(),
      end,
      head.block_size,
      self.decoder.has_dict()
    );
    Ok(())
  }

  /// Scan forward from the cursor to the next live record
  /// 从游标向前扫描到下一条有效记录
  fn scan(&mut self) {
    while self.cursor < self.layout.end {
      let want = self.cursor + RECORD_HEAD_SIZE + self.min_blob_size;
      self.readahead.advance(&self.file, self.cursor, want);

      let live = match self.read_record() {
        Ok(live) => live,
        Err(e) => return self.fail(e),
      };

      if self.readahead.end < self.cursor {
        self.readahead.end = self.cursor;
      }
      if let Some(handle) = live {
        self.state = State::Positioned(handle);
        return;
      }
    }
    self.state = State::Exhausted;
  }

  /// Decode the record at the cursor and move past it, `None` for a hole
  /// 解码游标处记录并越过它，打洞返回 `None`
  fn read_record(&mut self) -> Result<Option<BlobHandle>> {
    let offset = self.cursor;
    let head_buf = self.read_head(offset)?;

    if RecordHead::payload_len_of(&head_buf) == 0 {
      self.cursor += self.hole_step(offset)?;
      return Ok(None);
    }

    let head = self.decoder.decode_head(&head_buf)?;
    let size = RECORD_HEAD_SIZE + head.payload_len();
    self.check_bound(offset, size, "record")?;

    self.payload.resize(head.payload_len() as usize, 0);
    self
      .file
      .read_exact_at(offset + RECORD_HEAD_SIZE, &mut self.payload)?;
    self
      .decoder
      .decode(&head, &self.payload, offset, &mut self.rec)?;

    self.cursor = round_up(offset + size, self.layout.block_size);
    Ok(Some(BlobHandle {
      file_id: self.file_id,
      offset,
      size,
    }))
  }

  /// Encoded length of the record at `offset`, block rounded, payload not read
  /// `offset` 处记录的编码长度（块对齐），不读取负载
  fn record_len_at(&self, offset: u64) -> Result<u64> {
    let head_buf = self.read_head(offset)?;
    if RecordHead::payload_len_of(&head_buf) == 0 {
      return self.hole_step(offset);
    }
    let head = self.decoder.decode_head(&head_buf)?;
    Ok(round_up(
      RECORD_HEAD_SIZE + head.payload_len(),
      self.layout.block_size,
    ))
  }

  fn read_head(&self, offset: u64) -> Result<[u8; HEAD]> {
    self.check_bound(offset, RECORD_HEAD_SIZE, "record header")?;
    let mut buf = [0u8; HEAD];
    self.file.read_exact_at(offset, &mut buf)?;
    Ok(buf)
  }

  #[inline]
  fn hole_step(&self, offset: u64) -> Result<u64> {
    match self.layout.block_size {
      0 => Err(Error::HoleWithoutBlock(offset)),
      n => Ok(n),
    }
  }

  #[inline]
  fn check_bound(&self, offset: u64, len: u64, what: &'static str) -> Result<()> {
    let avail = self.layout.end.saturating_sub(offset);
    if len > avail {
      return Err(Error::Truncated {
        what,
        need: len,
        got: avail,
      });
    }
    Ok(())
  }

  fn fail(&mut self, err: Error) {
    warn!("blob {} scan failed at {}: {err}", self.file_id, self.cursor);
    self.state = State::Failed(err);
  }
}

/// Block plus trailer must lie in `[lo, hi)` / 块及块尾须位于 `[lo, hi)` 内
fn check_block(handle: BlockHandle, lo: u64, hi: u64) -> Result<()> {
  if handle.offset >= lo && handle.end().is_some_and(|end| end <= hi) {
    return Ok(());
  }
  Err(Error::BlockOutOfRange {
    offset: handle.offset,
    size: handle.size,
  })
}

#[inline(always)]
fn round_up(n: u64, block: u64) -> u64 {
  if block == 0 { n } else { n.div_ceil(block) * block }
}

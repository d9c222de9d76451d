//! Constants / 常量定义

/// Page size used to align the read-ahead window / 预读窗口对齐页大小
pub const PAGE_SIZE: u64 = 4096;

/// Initial read-ahead window / 初始预读窗口
pub const MIN_READAHEAD: u64 = 4 << 10;

/// Read-ahead window cap / 预读窗口上限
pub const MAX_READAHEAD: u64 = 256 << 10;

/// Blob file header magic / Blob 文件头魔数
pub const HEAD_MAGIC: u32 = 0x4A42_4C42;

/// Blob file footer magic / Blob 文件尾魔数
pub const FOOT_MAGIC: u64 = 0x4A44_4242_4C4F_4246;

/// Header flag: shared compression dictionary present
/// 头标志：存在共享压缩字典
pub const FLAG_DICT: u32 = 1;

/// Block trailer: kind(1) + crc32(4) / 块尾：类型(1) + crc32(4)
pub const BLOCK_TRAILER_SIZE: u64 = 5;

/// Meta-index entry name of the shared dictionary
/// 共享字典在元索引中的名称
pub const DICT_BLOCK_NAME: &[u8] = b"jdb.blob.dict";

/// Record header: crc32(4) + payload_len(4) + codec(1)
/// 记录头：crc32(4) + 负载长度(4) + 编码(1)
pub const RECORD_HEAD_SIZE: u64 = 9;

/// Offset of the payload length inside the record header
/// 负载长度在记录头中的偏移
pub const PAYLOAD_LEN_OFFSET: usize = 4;

/// Score tolerance when testing for fully discardable files in fallback mode
/// 回退模式下判断文件完全可丢弃的容差
pub const SCORE_EPSILON: f64 = f64::EPSILON;

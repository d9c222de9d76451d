//! Blob file layout / Blob 文件布局
//!
//! ```text
//! | Header | Record | hole-punched block | ... | dict block + trailer | meta-index block + trailer | Footer |
//! ```
//!
//! The dictionary and meta-index blocks are optional. The footer holds the
//! meta-index handle; the meta-index names the dictionary block.
//! 字典块与元索引块可选。文件尾保存元索引句柄；元索引记录字典块位置。

mod block;
mod foot;
mod head;

pub use block::{BlockHandle, MetaIndex, encode_block, read_block};
pub use foot::{FOOT_SIZE, FileFoot};
pub use head::{FileHead, HEAD_MAX_SIZE, HEAD_V1, HEAD_V2, HEAD_V3};

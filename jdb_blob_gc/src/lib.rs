//! jdb_blob_gc - Blob file garbage collection
//! Blob 文件垃圾回收
//!
//! Large values live in append-only blob files. As they are overwritten or
//! deleted the files fill with garbage. This crate provides:
//! 大值存放在只追加的 blob 文件中，覆盖或删除后文件中积累垃圾。本 crate 提供：
//!
//! | Part            | Role                                              |
//! |-----------------|---------------------------------------------------|
//! | [`Scanner`]     | Sequential scan of one file, skips punched holes  |
//! | [`MergeScanner`]| Key-ordered k-way merge across files              |
//! | [`Picker`]      | Greedy selection of the files for one GC run      |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod codec;
mod conf;
pub mod consts;
mod error;
mod file_set;
pub mod format;
mod io;
mod merge;
mod meta;
mod order;
mod pick;
mod plan;
mod record;
mod scan;
mod stat;

pub use codec::{Compression, RecordDecoder, RecordEncoder};
pub use conf::{Conf, GcConf, RunMode};
pub use error::{Error, Result};
pub use file_set::FileSet;
pub use io::BlobRead;
pub use merge::MergeScanner;
pub use meta::{BlobStorage, FileMeta, FileState, Score};
pub use order::{Asc, Desc, Order};
pub use pick::Picker;
pub use plan::{GcPlan, PlanKind};
pub use record::{BlobHandle, BlobRecord, RecordHead};
pub use scan::{Readahead, Scanner, State};
pub use stat::{GcStats, GcStatsSnapshot};

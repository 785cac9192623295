//! Sync module - signals that keep decoupled views consistent.

mod notice;
mod signals;

pub use notice::{Notice, NoticeLevel, DEFAULT_NOTICE_TTL_SECS};
pub use signals::{SignalKind, SyncSignal};

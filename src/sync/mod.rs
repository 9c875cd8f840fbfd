//! 打轴与回放相关的状态机。

pub mod media;
pub mod segment;
pub mod synchronizer;
pub mod ticker;
pub mod tracker;
pub mod word_sync;

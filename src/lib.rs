//! Wire Sequence
//!
//! ワイヤーハーネス端面の写真から色順序を抽出し、基準と照合する。
//! 呼び出しごとに独立した同期処理で、状態は持たない。

pub mod batch;
pub mod cli;
pub mod comparator;
pub mod config;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod protocol;

pub use wire_sequence_common as common;

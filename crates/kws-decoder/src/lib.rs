//! # kws-decoder
//!
//! Greedy CTC-декодирование для RustKWS: argmax по таймстепам,
//! удаление blank, склейка повторов, sparse-результат с накопленной оценкой.

pub mod greedy;

pub use greedy::GreedyCtcDecoder;

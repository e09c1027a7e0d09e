//! # kws-pipeline
//!
//! End-to-end пайплайн RustKWS: стек признаков → оконный квантованный
//! инференс → greedy CTC-декодирование.

pub mod pipeline;

pub use pipeline::{KwsPipeline, Recognition};

//! # kws-engine
//!
//! Оконный квантованный инференс для RustKWS:
//! - паддинг входа репликацией последнего фрейма
//! - план окон первое/средние/последнее с контекстными полями
//! - извлечение срезов с зажимом границ и нулевым дозаполнением
//! - int8-квантование входа, деквантование выхода
//! - сшивка внутренних срезов в одну последовательность оценок

pub mod engine;
pub mod quant;
pub mod window;

pub use engine::WindowedInferenceEngine;
pub use window::{extract_window, plan_windows, InferenceWindow};

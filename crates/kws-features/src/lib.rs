//! # kws-features
//!
//! Аугментация признаков для RustKWS:
//! - коэффициенты Savitzky–Golay (Вандермонд + SVD-псевдообратная, мемоизация)
//! - дельта/дельта²-свёртка с зеркальными границами
//! - построчная нормализация и вертикальный стек

pub mod augment;
pub mod savgol;

pub use augment::{apply_derivative, build_features, normalize_rows, vstack};
pub use savgol::coefficients;

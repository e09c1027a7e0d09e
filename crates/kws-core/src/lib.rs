//! # kws-core
//!
//! Базовые типы, трейты и определения ошибок для RustKWS Engine.
//!
//! Этот крейт предоставляет фундаментальные абстракции для всех остальных
//! крейтов в workspace:
//!
//! - Общие типы данных (`ClassScoreSequence`, `DecodedResult`)
//! - Конфигурационные структуры (`ClassifierSpec`, `FilterConfig`, `DecoderConfig`)
//! - Унифицированная обработка ошибок через `KwsError`
//! - Trait [`QuantizedClassifier`] — интерфейс привязанного классификатора

pub mod config;
pub mod debug;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{ClassifierSpec, DecoderConfig, FilterConfig, QuantizationParams};
pub use error::{KwsError, KwsResult};
pub use traits::QuantizedClassifier;
pub use types::{ClassScoreSequence, DecodedResult};

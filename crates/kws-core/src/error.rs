//! Типы ошибок для RustKWS.

use thiserror::Error;

/// Основной тип ошибки численного ядра.
///
/// Ошибки параметров и форм обнаруживаются до начала численной работы
/// и никогда не ретраятся — они означают неверную конфигурацию.
#[derive(Error, Debug)]
pub enum KwsError {
    /// Некорректные параметры фильтра или движка
    /// (чётная длина окна, deriv_order > poly_order и т.п.).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Несогласованные размерности матриц (конкатенация, свёртка, вход движка).
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Некорректный вход декодера.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Ошибка классификатора во время инференса.
    ///
    /// Фатальна для текущего высказывания: оставшиеся окна не обрабатываются,
    /// частичный результат не возвращается.
    #[error("Inference error: {0}")]
    Inference(String),
}

/// Alias результата для операций RustKWS.
pub type KwsResult<T> = Result<T, KwsError>;

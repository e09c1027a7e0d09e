//! Trait квантованного классификатора.
//!
//! Классификатор — явно сконструированный handle с временем жизни,
//! управляемым вызывающей стороной. Загрузка файла модели — внешняя
//! ответственность; ядро получает уже привязанный экземпляр.

use ndarray::Array2;

use crate::config::ClassifierSpec;
use crate::error::KwsResult;

/// Непрозрачный квантованный классификатор с фиксированным окном.
///
/// # Пример
/// ```ignore
/// let mut engine = WindowedInferenceEngine::new(Box::new(classifier))?;
/// let scores = engine.evaluate(&features)?;
/// ```
pub trait QuantizedClassifier: Send {
    /// Геометрия и параметры квантования модели.
    fn spec(&self) -> &ClassifierSpec;

    /// Один прямой проход по квантованному окну.
    ///
    /// # Аргументы
    /// * `window` — тензор формы [window_length, feature_dim], int8.
    ///
    /// # Ошибки
    /// Ошибка классификатора фатальна для текущего высказывания.
    fn run(&mut self, window: &Array2<i8>) -> KwsResult<Array2<i8>>;
}

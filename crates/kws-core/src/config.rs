//! Конфигурационные структуры численного ядра.

use serde::{Deserialize, Serialize};

use crate::error::{KwsError, KwsResult};

/// Параметры аффинного квантования: `real ≈ (quantized − zero_point) × scale`.
///
/// Загружаются один раз при привязке модели и неизменны в течение её жизни.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantizationParams {
    /// Масштаб (строго положительный).
    pub scale: f32,

    /// Нулевая точка.
    pub zero_point: i32,
}

impl QuantizationParams {
    /// Создать параметры квантования. `scale` должен быть > 0.
    pub fn new(scale: f32, zero_point: i32) -> KwsResult<Self> {
        if !(scale > 0.0) {
            return Err(KwsError::InvalidParameter(format!(
                "quantization scale must be positive, got {scale}"
            )));
        }
        Ok(Self { scale, zero_point })
    }

    /// Тождественное квантование (scale=1, zero_point=0).
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            zero_point: 0,
        }
    }
}

/// Геометрия и квантование привязанного классификатора.
///
/// Описывает вход формы (1, window_length, feature_dim) и выход
/// (1, 1, output_steps, num_classes). `context_length` — константа
/// receptive field, задаётся вместе с моделью и не пересчитывается.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSpec {
    /// Фиксированная длина временного окна модели (чётная).
    pub window_length: usize,

    /// Размерность вектора признаков на фрейм.
    pub feature_dim: usize,

    /// Количество выходных таймстепов на одно окно.
    pub output_steps: usize,

    /// Количество классов (включая blank).
    pub num_classes: usize,

    /// Длина контекста (receptive field, чётная, < window_length / 2).
    pub context_length: usize,

    /// Квантование входного тензора.
    pub input_quant: QuantizationParams,

    /// Квантование выходного тензора.
    pub output_quant: QuantizationParams,
}

impl ClassifierSpec {
    /// Геометрия tiny_wav2letter_int8: вход (1, 296, 39), выход (1, 1, 148, 38),
    /// контекст 24 + 2·(7·3 + 16) = 98.
    pub fn tiny_wav2letter(input_quant: QuantizationParams, output_quant: QuantizationParams) -> Self {
        Self {
            window_length: 296,
            feature_dim: 39,
            output_steps: 148,
            num_classes: 38,
            context_length: 98,
            input_quant,
            output_quant,
        }
    }

    /// Внутренняя (неперекрывающаяся) часть окна: window_length − 2·context_length.
    pub fn inner_length(&self) -> usize {
        self.window_length.saturating_sub(2 * self.context_length)
    }
}

impl Default for ClassifierSpec {
    fn default() -> Self {
        Self::tiny_wav2letter(QuantizationParams::identity(), QuantizationParams::identity())
    }
}

/// Параметры Savitzky–Golay фильтра для дельта-признаков.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Длина окна фильтра (нечётная, например 9).
    pub window_length: usize,

    /// Порядок полинома (например 2 или 3).
    pub poly_order: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_length: 9,
            poly_order: 2,
        }
    }
}

/// Конфигурация greedy CTC-декодера.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Склеивать ли подряд идущие одинаковые классы.
    pub merge_repeated: bool,

    /// Индекс blank-токена.
    pub blank_index: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            merge_repeated: true,
            blank_index: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_geometry() {
        let spec = ClassifierSpec::default();
        assert_eq!(spec.window_length, 296);
        assert_eq!(spec.feature_dim, 39);
        assert_eq!(spec.output_steps, 148);
        assert_eq!(spec.num_classes, 38);
        assert_eq!(spec.context_length, 98);
        assert_eq!(spec.inner_length(), 100);
    }

    #[test]
    fn test_quant_params_validation() {
        assert!(QuantizationParams::new(0.1, -12).is_ok());
        assert!(QuantizationParams::new(0.0, 0).is_err());
        assert!(QuantizationParams::new(-1.0, 0).is_err());
        assert!(QuantizationParams::new(f32::NAN, 0).is_err());
    }

    #[test]
    fn test_spec_serde_round_trip() {
        let spec = ClassifierSpec::default();
        let json = serde_json::to_string(&spec).unwrap();
        let back: ClassifierSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_decoder_config_defaults() {
        let cfg = DecoderConfig::default();
        assert!(cfg.merge_repeated);
        assert_eq!(cfg.blank_index, 0);
    }
}

//! Движок оконного квантованного инференса.
//!
//! Держит привязанный классификатор как явный handle (`Box<dyn QuantizedClassifier>`)
//! и на каждый вызов `evaluate` собирает одну непрерывную последовательность
//! оценок из внутренних срезов окон в строгом порядке курсора.

use ndarray::Array2;
use tracing::debug;

use kws_core::{
    ClassScoreSequence, ClassifierSpec, KwsError, KwsResult, QuantizedClassifier,
};

use crate::quant;
use crate::window::{extract_window, plan_windows};

/// Движок инференса с фиксированным окном и контекстными полями.
pub struct WindowedInferenceEngine {
    /// Привязанный классификатор; время жизни управляется вызывающей стороной.
    classifier: Box<dyn QuantizedClassifier>,

    /// Копия геометрии классификатора, проверенная при создании.
    spec: ClassifierSpec,
}

impl std::fmt::Debug for WindowedInferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowedInferenceEngine")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl WindowedInferenceEngine {
    /// Создать движок поверх привязанного классификатора.
    ///
    /// Длина окна и длина контекста обязаны быть чётными, а окно — строго
    /// больше удвоенного контекста: тогда все деления на два в арифметике
    /// сшивки точные, и граничный фрейм не теряется и не дублируется.
    ///
    /// # Ошибки
    /// `InvalidParameter` при нарушении любого из условий геометрии.
    pub fn new(classifier: Box<dyn QuantizedClassifier>) -> KwsResult<Self> {
        let spec = classifier.spec().clone();

        if spec.window_length == 0 || spec.window_length % 2 != 0 {
            return Err(KwsError::InvalidParameter(format!(
                "window_length must be even and positive, got {}",
                spec.window_length
            )));
        }
        if spec.context_length % 2 != 0 {
            return Err(KwsError::InvalidParameter(format!(
                "context_length must be even, got {}",
                spec.context_length
            )));
        }
        if spec.window_length <= 2 * spec.context_length {
            return Err(KwsError::InvalidParameter(format!(
                "window_length ({}) must exceed 2 * context_length ({})",
                spec.window_length, spec.context_length
            )));
        }
        if spec.feature_dim == 0 || spec.num_classes == 0 {
            return Err(KwsError::InvalidParameter(
                "feature_dim and num_classes must be positive".to_string(),
            ));
        }
        if spec.output_steps < spec.window_length / 2 {
            return Err(KwsError::InvalidParameter(format!(
                "output_steps ({}) must cover half the window ({})",
                spec.output_steps,
                spec.window_length / 2
            )));
        }

        Ok(Self { classifier, spec })
    }

    /// Геометрия привязанного классификатора.
    pub fn spec(&self) -> &ClassifierSpec {
        &self.spec
    }

    /// Полный проход по высказыванию.
    ///
    /// # Аргументы
    /// * `features` — стек признаков [feature_dim, n_frames].
    ///
    /// # Ошибки
    /// * `ShapeMismatch` — размерность признаков не совпадает с моделью
    ///   (проверяется до первого вызова классификатора).
    /// * `InvalidArgument` — пустая последовательность фреймов.
    /// * `Inference` — ошибка классификатора; оставшиеся окна не обрабатываются,
    ///   частичный результат не возвращается.
    pub fn evaluate(&mut self, features: &Array2<f32>) -> KwsResult<ClassScoreSequence> {
        let (feature_dim, n_frames) = features.dim();

        if feature_dim != self.spec.feature_dim {
            return Err(KwsError::ShapeMismatch(format!(
                "features have {feature_dim} rows, classifier expects {}",
                self.spec.feature_dim
            )));
        }
        if n_frames == 0 {
            return Err(KwsError::InvalidArgument(
                "cannot evaluate an empty feature sequence".to_string(),
            ));
        }

        let padded = self.pad_frames(features);
        let plan = plan_windows(
            padded.nrows(),
            self.spec.window_length,
            self.spec.context_length,
        );

        let num_classes = self.spec.num_classes;
        let emitted: usize = plan.iter().map(|w| w.emit_len()).sum();
        let mut scores = Vec::with_capacity(emitted * num_classes);
        let dump = kws_core::debug::enabled();

        for (i, w) in plan.iter().enumerate() {
            let slice = extract_window(&padded, w.start, w.end);
            let quantized = quant::quantize(&slice, self.spec.input_quant);

            if dump {
                let (lo, hi) = quantized
                    .iter()
                    .fold((i8::MAX, i8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
                eprintln!(
                    "DEBUG engine window {i}: frames [{}, {}), quantized range [{lo}, {hi}]",
                    w.start, w.end
                );
            }

            let raw = self.classifier.run(&quantized).map_err(|e| match e {
                KwsError::Inference(_) => e,
                other => KwsError::Inference(other.to_string()),
            })?;

            if raw.ncols() != num_classes || raw.nrows() < w.emit_end {
                return Err(KwsError::Inference(format!(
                    "classifier output has shape {:?}, expected at least [{}, {num_classes}]",
                    raw.dim(),
                    w.emit_end
                )));
            }

            debug!(
                window = i,
                start = w.start,
                end = w.end,
                emit_start = w.emit_start,
                emit_end = w.emit_end,
                "window evaluated"
            );

            for t in w.emit_start..w.emit_end {
                for c in 0..num_classes {
                    scores.push(quant::dequantize_value(raw[[t, c]], self.spec.output_quant));
                }
            }
        }

        let scores = Array2::from_shape_vec((emitted, num_classes), scores)
            .map_err(|e| KwsError::ShapeMismatch(e.to_string()))?;

        Ok(ClassScoreSequence::new(scores))
    }

    /// Дополнить вход по времени: реплицировать последний фрейм до длины окна,
    /// затем при нечётной длине добавить один нулевой фрейм.
    ///
    /// Вход [feature_dim, n_frames] транспонируется в [время][признак].
    fn pad_frames(&self, features: &Array2<f32>) -> Array2<f32> {
        let feature_dim = features.nrows();
        let n_frames = features.ncols();

        let replicated = n_frames.max(self.spec.window_length);
        let total = replicated + replicated % 2;

        let mut out = Array2::<f32>::zeros((total, feature_dim));
        for t in 0..replicated {
            let src = t.min(n_frames - 1);
            for f in 0..feature_dim {
                out[[t, f]] = features[[f, src]];
            }
        }

        out
    }
}

//! End-to-end распознавание одного высказывания.
//!
//! Композиция стадий:
//! 1. MFCC → стек признаков (kws-features)
//! 2. Стек → последовательность оценок классов (kws-engine)
//! 3. Оценки → метки + оценка (kws-decoder)

use std::time::Instant;

use ndarray::Array2;
use tracing::info;

use kws_core::{DecodedResult, DecoderConfig, FilterConfig, KwsResult, QuantizedClassifier};
use kws_decoder::GreedyCtcDecoder;
use kws_engine::WindowedInferenceEngine;
use kws_features::{build_features, coefficients};

/// Результат распознавания одного высказывания.
#[derive(Debug, Clone)]
pub struct Recognition {
    /// Декодированные метки (батч 0) в темпоральном порядке.
    pub labels: Vec<usize>,

    /// Накопленная оценка декодера.
    pub score: f32,

    /// Количество таймстепов, выданных движком.
    pub num_steps: usize,

    /// Время инференса в секундах.
    pub inference_time_secs: f64,

    /// Полный sparse-результат декодирования.
    pub decoded: DecodedResult,
}

/// Пайплайн распознавания поверх привязанного классификатора.
pub struct KwsPipeline {
    filter: FilterConfig,
    engine: WindowedInferenceEngine,
    decoder: GreedyCtcDecoder,
}

impl std::fmt::Debug for KwsPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KwsPipeline")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl KwsPipeline {
    /// Собрать пайплайн.
    ///
    /// Параметры фильтра проверяются сразу (и коэффициенты Δ/Δ² попадают
    /// в кэш), чтобы ошибка конфигурации не всплывала на первом высказывании.
    pub fn new(
        classifier: Box<dyn QuantizedClassifier>,
        filter: FilterConfig,
        decoder: DecoderConfig,
    ) -> KwsResult<Self> {
        coefficients(filter.window_length, filter.poly_order, 1)?;
        coefficients(filter.window_length, filter.poly_order, 2)?;

        let engine = WindowedInferenceEngine::new(classifier)?;

        Ok(Self {
            filter,
            engine,
            decoder: GreedyCtcDecoder::from_config(decoder),
        })
    }

    /// Распознать одно высказывание.
    ///
    /// # Аргументы
    /// * `mfcc` — базовая матрица признаков [n_coeffs, n_frames] от внешнего
    ///   экстрактора; после стека признаков строк станет втрое больше.
    pub fn recognize(&mut self, mfcc: &Array2<f32>) -> KwsResult<Recognition> {
        let started = Instant::now();

        let features = build_features(mfcc, self.filter.window_length, self.filter.poly_order)?;
        let sequence = self.engine.evaluate(&features)?;

        let num_steps = sequence.num_steps();
        let ctc_input = sequence.into_ctc_input();
        let decoded = self.decoder.decode(&ctc_input, &[num_steps])?;

        let labels = decoded.batch_labels(0);
        let score = decoded.score[0];
        let inference_time_secs = started.elapsed().as_secs_f64();

        info!(
            frames = mfcc.ncols(),
            num_steps,
            num_labels = labels.len(),
            score,
            inference_time_secs,
            "utterance recognized"
        );

        Ok(Recognition {
            labels,
            score,
            num_steps,
            inference_time_secs,
            decoded,
        })
    }
}

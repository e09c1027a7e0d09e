//! Greedy CTC-декодирование.
//!
//! Per-timestep argmax → удаление blank и склейка повторов →
//! sparse-представление (batch, позиция) → метка + накопленная оценка.

use ndarray::Array3;
use tracing::debug;

use kws_core::{DecodedResult, DecoderConfig, KwsError, KwsResult};

/// Greedy CTC-декодер.
///
/// `merge_repeated` склеивает подряд идущие одинаковые классы; blank
/// разрывает склейку (трекер предыдущего argmax обновляется безусловно,
/// в том числе на blank).
pub struct GreedyCtcDecoder {
    merge_repeated: bool,
    blank_index: usize,
}

impl GreedyCtcDecoder {
    /// Создать декодер.
    pub fn new(merge_repeated: bool, blank_index: usize) -> Self {
        Self {
            merge_repeated,
            blank_index,
        }
    }

    /// Создать декодер из конфигурации.
    pub fn from_config(config: DecoderConfig) -> Self {
        Self::new(config.merge_repeated, config.blank_index)
    }

    /// Декодировать оценки классов.
    ///
    /// # Аргументы
    /// * `scores` — тензор [время, батч, класс].
    /// * `sequence_lengths` — количество значимых таймстепов на батч.
    ///
    /// # Ошибки
    /// `InvalidArgument`, если тензор пуст по любому измерению, длина
    /// `sequence_lengths` не равна размеру батча или какая-то из длин
    /// превышает количество таймстепов.
    pub fn decode(
        &self,
        scores: &Array3<f32>,
        sequence_lengths: &[usize],
    ) -> KwsResult<DecodedResult> {
        let (max_time, batch_size, num_classes) = scores.dim();

        if max_time == 0 || batch_size == 0 || num_classes == 0 {
            return Err(KwsError::InvalidArgument(format!(
                "scores tensor is empty: shape {:?}",
                scores.dim()
            )));
        }
        if sequence_lengths.len() != batch_size {
            return Err(KwsError::InvalidArgument(format!(
                "sequence_lengths has {} entries, batch size is {batch_size}",
                sequence_lengths.len()
            )));
        }
        for (b, &len) in sequence_lengths.iter().enumerate() {
            if len > max_time {
                return Err(KwsError::InvalidArgument(format!(
                    "sequence_lengths[{b}] = {len} exceeds {max_time} timesteps"
                )));
            }
        }

        let mut sequences: Vec<Vec<usize>> = vec![Vec::new(); batch_size];
        let mut score = vec![0.0_f32; batch_size];

        for b in 0..batch_size {
            // prev за пределами диапазона классов: первый таймстеп не склеивается.
            let mut prev = num_classes;

            for t in 0..sequence_lengths[b] {
                let (argmax, max_val) = argmax_row(scores, t, b, num_classes);

                score[b] += -max_val;

                if argmax != self.blank_index && !(self.merge_repeated && argmax == prev) {
                    sequences[b].push(argmax);
                }
                prev = argmax;
            }
        }

        let max_decoded_len = sequences.iter().map(Vec::len).max().unwrap_or(0);
        let total: usize = sequences.iter().map(Vec::len).sum();

        let mut indices = Vec::with_capacity(total);
        let mut values = Vec::with_capacity(total);
        for (b, seq) in sequences.iter().enumerate() {
            for (pos, &label) in seq.iter().enumerate() {
                indices.push([b, pos]);
                values.push(label);
            }
        }

        debug!(
            batch_size,
            total_labels = total,
            max_decoded_len,
            "greedy CTC decode complete"
        );

        Ok(DecodedResult {
            indices,
            values,
            shape: [batch_size, max_decoded_len],
            score,
        })
    }
}

/// Argmax по классам в точке (t, b); при равенстве побеждает меньший индекс
/// (сканирование слева направо со строгим `>`).
fn argmax_row(scores: &Array3<f32>, t: usize, b: usize, num_classes: usize) -> (usize, f32) {
    let mut max_val = scores[[t, b, 0]];
    let mut argmax = 0;
    for c in 1..num_classes {
        let v = scores[[t, b, c]];
        if v > max_val {
            max_val = v;
            argmax = c;
        }
    }
    (argmax, max_val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Построить тензор [время, 1, классы], где argmax на шаге t — pattern[t],
    /// с максимумом 1.0 и нулями в остальных классах.
    fn scores_from_pattern(pattern: &[usize], num_classes: usize) -> Array3<f32> {
        let mut scores = Array3::<f32>::zeros((pattern.len(), 1, num_classes));
        for (t, &c) in pattern.iter().enumerate() {
            scores[[t, 0, c]] = 1.0;
        }
        scores
    }

    #[test]
    fn test_merge_repeated_collapses_runs() {
        let scores = scores_from_pattern(&[0, 2, 2, 0, 3, 3, 3, 0], 4);
        let decoder = GreedyCtcDecoder::new(true, 0);
        let result = decoder.decode(&scores, &[8]).unwrap();

        assert_eq!(result.batch_labels(0), vec![2, 3]);
        assert_eq!(result.shape, [1, 2]);
    }

    #[test]
    fn test_no_merge_keeps_repeats() {
        let scores = scores_from_pattern(&[0, 2, 2, 0, 3, 3, 3, 0], 4);
        let decoder = GreedyCtcDecoder::new(false, 0);
        let result = decoder.decode(&scores, &[8]).unwrap();

        assert_eq!(result.batch_labels(0), vec![2, 2, 3, 3, 3]);
    }

    #[test]
    fn test_blank_breaks_merging() {
        // 2, blank, 2 → две отдельные метки даже при merge_repeated.
        let scores = scores_from_pattern(&[2, 0, 2], 3);
        let decoder = GreedyCtcDecoder::new(true, 0);
        let result = decoder.decode(&scores, &[3]).unwrap();

        assert_eq!(result.batch_labels(0), vec![2, 2]);
    }

    #[test]
    fn test_cumulative_score_is_negated_max_sum() {
        let scores = scores_from_pattern(&[1, 2, 1], 3);
        let decoder = GreedyCtcDecoder::new(true, 0);
        let result = decoder.decode(&scores, &[3]).unwrap();

        assert!((result.score[0] - (-3.0)).abs() < 1e-6);
    }

    #[test]
    fn test_ties_pick_lowest_index() {
        let mut scores = Array3::<f32>::zeros((1, 1, 4));
        scores[[0, 0, 1]] = 0.5;
        scores[[0, 0, 3]] = 0.5;
        let decoder = GreedyCtcDecoder::new(false, 0);
        let result = decoder.decode(&scores, &[1]).unwrap();

        assert_eq!(result.batch_labels(0), vec![1]);
    }

    #[test]
    fn test_empty_scores_rejected() {
        let scores = Array3::<f32>::zeros((0, 1, 4));
        let decoder = GreedyCtcDecoder::new(true, 0);
        let err = decoder.decode(&scores, &[]).unwrap_err();
        assert!(matches!(err, KwsError::InvalidArgument(_)));
    }

    #[test]
    fn test_sequence_lengths_size_mismatch_rejected() {
        let scores = scores_from_pattern(&[1, 2], 3);
        let decoder = GreedyCtcDecoder::new(true, 0);
        let err = decoder.decode(&scores, &[2, 2]).unwrap_err();
        assert!(matches!(err, KwsError::InvalidArgument(_)));
    }

    #[test]
    fn test_sequence_length_beyond_time_rejected() {
        let scores = scores_from_pattern(&[1, 2], 3);
        let decoder = GreedyCtcDecoder::new(true, 0);
        let err = decoder.decode(&scores, &[3]).unwrap_err();
        assert!(matches!(err, KwsError::InvalidArgument(_)));
    }

    #[test]
    fn test_multi_batch_dense_shape() {
        // Батч 0: [1, 2, 3] (3 метки); батч 1: [1, 1, 0] со склейкой (1 метка).
        let mut scores = Array3::<f32>::zeros((3, 2, 4));
        for (t, &c) in [1usize, 2, 3].iter().enumerate() {
            scores[[t, 0, c]] = 1.0;
        }
        for (t, &c) in [1usize, 1, 0].iter().enumerate() {
            scores[[t, 1, c]] = 1.0;
        }

        let decoder = GreedyCtcDecoder::new(true, 0);
        let result = decoder.decode(&scores, &[3, 3]).unwrap();

        assert_eq!(result.shape, [2, 3]);
        assert_eq!(result.batch_labels(0), vec![1, 2, 3]);
        assert_eq!(result.batch_labels(1), vec![1]);
        // Sparse-индексы в темпоральном порядке.
        assert_eq!(result.indices, vec![[0, 0], [0, 1], [0, 2], [1, 0]]);
    }

    #[test]
    fn test_shorter_sequence_length_limits_decoding() {
        let scores = scores_from_pattern(&[1, 2, 3, 0], 4);
        let decoder = GreedyCtcDecoder::new(true, 0);
        let result = decoder.decode(&scores, &[2]).unwrap();

        assert_eq!(result.batch_labels(0), vec![1, 2]);
        assert!((result.score[0] - (-2.0)).abs() < 1e-6);
    }
}

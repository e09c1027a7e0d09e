//! Общие типы данных численного ядра.
//!
//! Матрица признаков хранится как `ndarray::Array2<f32>` в ориентации
//! [коэффициент][фрейм]: строки — кепстральные коэффициенты, столбцы — время.

use ndarray::{Array2, Array3, Axis};

// ---------------------------------------------------------------------------
// Последовательность оценок классов
// ---------------------------------------------------------------------------

/// Непрерывная последовательность оценок классов [время][класс].
///
/// Собирается движком инференса из внутренних срезов окон в порядке курсора;
/// инвариант — ни один таймстеп не пропущен и не добавлен дважды.
/// Живёт в пределах одного вызова `evaluate`, затем передаётся декодеру.
#[derive(Debug, Clone)]
pub struct ClassScoreSequence {
    /// Оценки формы [num_steps, num_classes].
    pub scores: Array2<f32>,
}

impl ClassScoreSequence {
    /// Создать последовательность из готовой матрицы оценок.
    pub fn new(scores: Array2<f32>) -> Self {
        Self { scores }
    }

    /// Количество выданных таймстепов.
    pub fn num_steps(&self) -> usize {
        self.scores.nrows()
    }

    /// Количество классов.
    pub fn num_classes(&self) -> usize {
        self.scores.ncols()
    }

    /// Перестроить в форму входа CTC-декодера [время][батч=1][класс].
    pub fn into_ctc_input(self) -> Array3<f32> {
        self.scores.insert_axis(Axis(1))
    }
}

// ---------------------------------------------------------------------------
// Результат декодирования
// ---------------------------------------------------------------------------

/// Результат greedy CTC-декодирования (sparse-представление).
///
/// Строится один раз на вызов `decode` и далее неизменен.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResult {
    /// Sparse-индексы (batch, позиция внутри батча) в темпоральном порядке.
    pub indices: Vec<[usize; 2]>,

    /// Метки, соответствующие `indices`.
    pub values: Vec<usize>,

    /// Плотная форма [batch_size, max_decoded_len].
    pub shape: [usize; 2],

    /// Накопленная оценка по каждому батчу (сумма −max по таймстепам).
    pub score: Vec<f32>,
}

impl DecodedResult {
    /// Метки одного батча в темпоральном порядке.
    pub fn batch_labels(&self, batch: usize) -> Vec<usize> {
        self.indices
            .iter()
            .zip(self.values.iter())
            .filter(|(idx, _)| idx[0] == batch)
            .map(|(_, &v)| v)
            .collect()
    }

    /// Общее количество выданных меток по всем батчам.
    pub fn num_labels(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_ctc_input_shape() {
        let seq = ClassScoreSequence::new(array![[0.1f32, 0.9], [0.8, 0.2]]);
        assert_eq!(seq.num_steps(), 2);
        assert_eq!(seq.num_classes(), 2);
        let ctc = seq.into_ctc_input();
        assert_eq!(ctc.dim(), (2, 1, 2));
        assert_eq!(ctc[[0, 0, 1]], 0.9);
    }

    #[test]
    fn test_batch_labels_filter() {
        let result = DecodedResult {
            indices: vec![[0, 0], [0, 1], [1, 0]],
            values: vec![5, 7, 3],
            shape: [2, 2],
            score: vec![0.0, 0.0],
        };
        assert_eq!(result.batch_labels(0), vec![5, 7]);
        assert_eq!(result.batch_labels(1), vec![3]);
        assert_eq!(result.num_labels(), 3);
    }
}

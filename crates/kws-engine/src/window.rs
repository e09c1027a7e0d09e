//! Планирование окон и извлечение срезов.
//!
//! Полный проход по высказыванию разбивается на окна трёх видов
//! (первое / средние / последнее) с перекрытием в `context_length` фреймов;
//! из каждого окна в выход попадает только внутренний диапазон
//! `[emit_start, emit_end)`, так что таймстепы не дублируются и не теряются.

use ndarray::{s, Array2};

/// Одно запланированное окно инференса.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceWindow {
    /// Начало среза во фреймах (может выходить за границы данных).
    pub start: isize,
    /// Конец среза во фреймах, `end − start == window_length`.
    pub end: isize,
    /// Начало внутреннего диапазона в выходе классификатора.
    pub emit_start: usize,
    /// Конец внутреннего диапазона.
    pub emit_end: usize,
}

impl InferenceWindow {
    /// Количество выдаваемых таймстепов.
    pub fn emit_len(&self) -> usize {
        self.emit_end - self.emit_start
    }
}

/// Построить план окон для дополненной последовательности.
///
/// Предусловия (проверяются движком при создании): `window_length` и
/// `context_length` чётные, `window_length > 2 · context_length`,
/// `padded_len ≥ window_length`, `padded_len` чётная. Тогда все деления
/// на два точные.
///
/// Если первое окно уже покрывает всю последовательность, план состоит
/// из него одного с внутренним диапазоном `[0, (size − ctx) / 2)`.
pub fn plan_windows(padded_len: usize, window_length: usize, context_length: usize) -> Vec<InferenceWindow> {
    let size = window_length;
    let ctx = context_length;
    let inner = size - 2 * ctx;
    let data_end = padded_len;

    // Первое окно: старт в нуле, внутренний диапазон от начала.
    let mut windows = vec![InferenceWindow {
        start: 0,
        end: size as isize,
        emit_start: 0,
        emit_end: (size - ctx) / 2,
    }];

    if data_end == size {
        return windows;
    }

    let mut cursor = size - ctx;

    // Средние окна, пока остаток вмещает inner + ctx.
    while cursor + inner + ctx < data_end {
        let start = cursor - ctx;
        windows.push(InferenceWindow {
            start: start as isize,
            end: (start + size) as isize,
            emit_start: ctx / 2,
            emit_end: ctx / 2 + inner / 2,
        });
        cursor = start + size - ctx;
    }

    // Последнее окно сдвигается назад, чтобы уложиться в данные.
    let shift = cursor + inner + ctx - data_end;
    let start = cursor - ctx - shift;
    windows.push(InferenceWindow {
        start: start as isize,
        end: (start + size) as isize,
        emit_start: (shift + ctx) / 2,
        emit_end: size / 2,
    });

    windows
}

/// Извлечь срез `[start, end)` из фреймов [время][признак].
///
/// Индексы вне диапазона зажимаются к границам данных, недостающие
/// строки дозаполняются нулями (без wraparound). Результат всегда имеет
/// ровно `end − start` строк.
pub fn extract_window(frames: &Array2<f32>, start: isize, end: isize) -> Array2<f32> {
    let n = frames.nrows() as isize;
    let feature_dim = frames.ncols();
    let len = (end - start).max(0) as usize;

    let mut out = Array2::<f32>::zeros((len, feature_dim));

    let lo = start.clamp(0, n);
    let hi = end.clamp(0, n);
    let copy = (hi - lo).max(0) as usize;
    if copy > 0 {
        out.slice_mut(s![0..copy, ..])
            .assign(&frames.slice(s![lo as usize..hi as usize, ..]));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Компактная геометрия для проверок: окно 16, контекст 4, inner 8.
    const SIZE: usize = 16;
    const CTX: usize = 4;

    fn emitted_total(windows: &[InferenceWindow]) -> usize {
        windows.iter().map(|w| w.emit_len()).sum()
    }

    #[test]
    fn test_single_window_plan() {
        let plan = plan_windows(SIZE, SIZE, CTX);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].start, 0);
        assert_eq!(plan[0].end, SIZE as isize);
        assert_eq!(plan[0].emit_start, 0);
        assert_eq!(plan[0].emit_end, (SIZE - CTX) / 2);
    }

    #[test]
    fn test_fractional_second_window() {
        // 20 фреймов: первое окно + сдвинутое последнее.
        let plan = plan_windows(20, SIZE, CTX);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].emit_len(), 6);
        let last = plan[1];
        assert_eq!(last.end, 20);
        assert_eq!(last.start, 4);
        assert_eq!(last.emit_start, 4);
        assert_eq!(last.emit_end, 8);
        assert_eq!(emitted_total(&plan), 10);
    }

    #[test]
    fn test_middle_windows_cover_without_gaps() {
        for padded_len in [18usize, 24, 30, 48, 64, 100] {
            let plan = plan_windows(padded_len, SIZE, CTX);
            assert_eq!(
                emitted_total(&plan),
                padded_len / 2,
                "padded_len={padded_len}"
            );
            // Каждое окно имеет полную длину.
            for w in &plan {
                assert_eq!(w.end - w.start, SIZE as isize);
                assert!(w.emit_end <= SIZE / 2);
            }
            // Последнее окно заканчивается ровно на границе данных.
            assert_eq!(plan.last().unwrap().end, padded_len as isize);
        }
    }

    #[test]
    fn test_extract_within_bounds() {
        let frames = Array2::from_shape_fn((10, 2), |(t, f)| (t * 10 + f) as f32);
        let out = extract_window(&frames, 2, 6);
        assert_eq!(out.dim(), (4, 2));
        assert_eq!(out[[0, 0]], 20.0);
        assert_eq!(out[[3, 1]], 51.0);
    }

    #[test]
    fn test_extract_negative_start_clamps() {
        let frames = Array2::from_shape_fn((6, 2), |(t, _)| t as f32);
        let out = extract_window(&frames, -3, 5);
        assert_eq!(out.dim(), (8, 2));
        // Скопированы фреймы 0..5, хвост дополнен нулями.
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[4, 0]], 4.0);
        assert_eq!(out[[5, 0]], 0.0);
        assert_eq!(out[[7, 0]], 0.0);
    }

    #[test]
    fn test_extract_overrun_zero_pads() {
        let frames = Array2::from_shape_fn((4, 1), |(t, _)| (t + 1) as f32);
        let out = extract_window(&frames, 2, 8);
        assert_eq!(out.dim(), (6, 1));
        assert_eq!(out[[0, 0]], 3.0);
        assert_eq!(out[[1, 0]], 4.0);
        for t in 2..6 {
            assert_eq!(out[[t, 0]], 0.0);
        }
    }
}

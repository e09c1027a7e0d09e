//! Аугментация признаков: дельта-свёртка, нормализация строк, стек.
//!
//! Вход — базовая матрица MFCC [коэффициент][фрейм] от внешнего экстрактора.
//! Выход `build_features` — вертикальный стек нормализованных base + Δ + Δ²
//! той же длины по времени (например 13 × T → 39 × T).

use ndarray::{concatenate, Array2, ArrayView2, Axis};
use tracing::debug;

use kws_core::{KwsError, KwsResult};

use crate::savgol;

/// Применить Savitzky–Golay производную к каждой строке матрицы.
///
/// Свёртка идёт вдоль времени с зеркальной обработкой границ:
/// индекс < 0 отражается в −idx, индекс ≥ n — в 2n − idx − 2.
/// Форма результата совпадает с формой входа.
///
/// # Ошибки
/// * `InvalidParameter` — чётная длина окна или deriv_order > poly_order.
/// * `ShapeMismatch` — фреймов меньше, чем полуокно + 1 (зеркальный индекс
///   вышел бы за границы данных).
pub fn apply_derivative(
    data: &Array2<f32>,
    window_length: usize,
    poly_order: usize,
    deriv_order: usize,
) -> KwsResult<Array2<f32>> {
    let coeffs = savgol::coefficients(window_length, poly_order, deriv_order)?;
    let (rows, frames) = data.dim();
    let half = (window_length - 1) / 2;

    if frames <= half {
        return Err(KwsError::ShapeMismatch(format!(
            "derivative needs more than {half} frames for mirror padding, got {frames}"
        )));
    }

    let n = frames as isize;
    let mut out = Array2::<f32>::zeros((rows, frames));

    for r in 0..rows {
        for t in 0..frames {
            let mut sum = 0.0_f64;
            for k in -(half as isize)..=(half as isize) {
                let mut idx = t as isize + k;
                if idx < 0 {
                    idx = -idx;
                } else if idx >= n {
                    idx = 2 * n - idx - 2;
                }
                sum += coeffs[(k + half as isize) as usize] * data[[r, idx as usize]] as f64;
            }
            out[[r, t]] = sum as f32;
        }
    }

    Ok(out)
}

/// Нормализовать каждую строку к нулевому среднему и единичному
/// стандартному отклонению. Строки с нулевой дисперсией обнуляются.
pub fn normalize_rows(data: &Array2<f32>) -> Array2<f32> {
    let (rows, cols) = data.dim();
    let mut out = Array2::<f32>::zeros((rows, cols));
    if cols == 0 {
        return out;
    }

    for r in 0..rows {
        let row = data.row(r);
        let mean = row.iter().map(|&v| v as f64).sum::<f64>() / cols as f64;
        let variance = row
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / cols as f64;
        let std = variance.sqrt();

        if std != 0.0 {
            for c in 0..cols {
                out[[r, c]] = ((data[[r, c]] as f64 - mean) / std) as f32;
            }
        }
    }

    out
}

/// Вертикальная конкатенация матриц (по строкам).
///
/// # Ошибки
/// `ShapeMismatch`, если количество столбцов различается.
pub fn vstack(parts: &[ArrayView2<f32>]) -> KwsResult<Array2<f32>> {
    let Some(first) = parts.first() else {
        return Ok(Array2::zeros((0, 0)));
    };

    let cols = first.ncols();
    for (i, part) in parts.iter().enumerate() {
        if part.ncols() != cols {
            return Err(KwsError::ShapeMismatch(format!(
                "matrix {i} has {} columns, expected {cols}",
                part.ncols()
            )));
        }
    }

    concatenate(Axis(0), parts).map_err(|e| KwsError::ShapeMismatch(e.to_string()))
}

/// Построить стек признаков: normalize(mfcc) + normalize(Δ) + normalize(Δ²).
///
/// # Аргументы
/// * `mfcc` — базовая матрица [n_coeffs, n_frames].
/// * `window_length` — длина окна фильтра (нечётная).
/// * `poly_order` — порядок полинома.
pub fn build_features(
    mfcc: &Array2<f32>,
    window_length: usize,
    poly_order: usize,
) -> KwsResult<Array2<f32>> {
    let delta = apply_derivative(mfcc, window_length, poly_order, 1)?;
    let delta2 = apply_derivative(mfcc, window_length, poly_order, 2)?;

    let stacked = vstack(&[
        normalize_rows(mfcc).view(),
        normalize_rows(&delta).view(),
        normalize_rows(&delta2).view(),
    ])?;

    debug!(
        base_rows = mfcc.nrows(),
        stacked_rows = stacked.nrows(),
        frames = stacked.ncols(),
        "feature stack built"
    );

    Ok(stacked)
}

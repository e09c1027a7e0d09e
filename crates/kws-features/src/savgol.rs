//! Коэффициенты фильтра Savitzky–Golay.
//!
//! Коэффициенты — чистая функция тройки (window_length, poly_order, deriv_order):
//! псевдообратная матрица Вандермонда через SVD, строка `deriv_order`,
//! умноженная на factorial(deriv_order). Результат мемоизируется.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use nalgebra::DMatrix;

use kws_core::{KwsError, KwsResult};

type CoeffKey = (usize, usize, usize);

fn cache() -> &'static Mutex<HashMap<CoeffKey, Arc<[f64]>>> {
    static CACHE: OnceLock<Mutex<HashMap<CoeffKey, Arc<[f64]>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Вычислить (или взять из кэша) коэффициенты свёртки Savitzky–Golay.
///
/// # Аргументы
/// * `window_length` — длина окна фильтра (нечётная, > 0, например 9).
/// * `poly_order` — порядок полинома (например 2 или 3).
/// * `deriv_order` — порядок производной (0 — сглаживание, 1 — дельта, 2 — дельта²).
///
/// # Ошибки
/// `InvalidParameter`, если `window_length` чётная или `deriv_order > poly_order`.
pub fn coefficients(
    window_length: usize,
    poly_order: usize,
    deriv_order: usize,
) -> KwsResult<Arc<[f64]>> {
    if window_length == 0 || window_length % 2 == 0 {
        return Err(KwsError::InvalidParameter(format!(
            "window_length must be odd, got {window_length}"
        )));
    }
    if deriv_order > poly_order {
        return Err(KwsError::InvalidParameter(format!(
            "deriv_order ({deriv_order}) must be <= poly_order ({poly_order})"
        )));
    }

    let key = (window_length, poly_order, deriv_order);
    if let Some(cached) = cache().lock().unwrap().get(&key) {
        return Ok(Arc::clone(cached));
    }

    let coeffs = compute(window_length, poly_order, deriv_order)?;
    let mut guard = cache().lock().unwrap();
    // Параллельный вызов мог вычислить раньше нас; результат детерминирован.
    let entry = guard.entry(key).or_insert(coeffs);
    Ok(Arc::clone(entry))
}

fn compute(window_length: usize, poly_order: usize, deriv_order: usize) -> KwsResult<Arc<[f64]>> {
    let m = ((window_length - 1) / 2) as f64;

    // Матрица Вандермонда A: A[i][j] = (i - m)^j.
    let vandermonde =
        DMatrix::from_fn(window_length, poly_order + 1, |i, j| (i as f64 - m).powi(j as i32));

    // Псевдообратная Мура–Пенроуза через SVD, shape: (poly_order+1) x window_length.
    let pinv = vandermonde
        .svd(true, true)
        .pseudo_inverse(1e-12)
        .map_err(|e| KwsError::InvalidParameter(format!("SVD pseudo-inverse failed: {e}")))?;

    let factorial = (2..=deriv_order).fold(1.0_f64, |acc, k| acc * k as f64);

    let coeffs: Vec<f64> = (0..window_length)
        .map(|i| factorial * pinv[(deriv_order, i)])
        .collect();

    Ok(coeffs.into())
}

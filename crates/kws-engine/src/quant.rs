//! Аффинное int8-квантование: `real ≈ (quantized − zero_point) × scale`.

use ndarray::Array2;

use kws_core::QuantizationParams;

/// Квантовать одно значение: `round(v / scale) + zero_point`,
/// с зажимом в диапазон знакового байта.
pub fn quantize_value(v: f32, params: QuantizationParams) -> i8 {
    let q = (v / params.scale).round() + params.zero_point as f32;
    q.clamp(i8::MIN as f32, i8::MAX as f32) as i8
}

/// Деквантовать одно значение: `(raw − zero_point) × scale`.
pub fn dequantize_value(raw: i8, params: QuantizationParams) -> f32 {
    (raw as i32 - params.zero_point) as f32 * params.scale
}

/// Квантовать окно признаков целиком.
pub fn quantize(window: &Array2<f32>, params: QuantizationParams) -> Array2<i8> {
    window.mapv(|v| quantize_value(v, params))
}

/// Деквантовать выходной тензор классификатора целиком.
pub fn dequantize(raw: &Array2<i8>, params: QuantizationParams) -> Array2<f32> {
    raw.mapv(|v| dequantize_value(v, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kws_core::QuantizationParams;

    #[test]
    fn test_round_trip_within_scale() {
        // Для любого представимого v: |dequantize(quantize(v)) − v| ≤ scale.
        let params = QuantizationParams::new(0.05, -12).unwrap();
        let lo = (i8::MIN as i32 - params.zero_point) as f32 * params.scale;
        let hi = (i8::MAX as i32 - params.zero_point) as f32 * params.scale;

        let mut v = lo;
        while v <= hi {
            let back = dequantize_value(quantize_value(v, params), params);
            assert!(
                (back - v).abs() <= params.scale,
                "round trip error for v={v}: back={back}"
            );
            v += 0.013;
        }
    }

    #[test]
    fn test_clamp_to_signed_byte_range() {
        let params = QuantizationParams::new(1.0, 0).unwrap();
        assert_eq!(quantize_value(1000.0, params), 127);
        assert_eq!(quantize_value(-1000.0, params), -128);
    }

    #[test]
    fn test_zero_point_shift() {
        let params = QuantizationParams::new(0.5, 10).unwrap();
        assert_eq!(quantize_value(0.0, params), 10);
        assert_eq!(dequantize_value(10, params), 0.0);
        assert_eq!(dequantize_value(12, params), 1.0);
    }
}

//! Lag polynomials.
//!
//! A polynomial in the backshift operator `B` is stored as its coefficient
//! vector, lowest power first: `[c0, c1, c2]` is `c0 + c1·B + c2·B²`.

/// Product of two lag polynomials.
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `1 + sign·Σ_k c_k·B^(step·k)` for `k = 1..=coeffs.len()`.
///
/// `sign = -1.0` gives the AR convention `1 - φ1·B - ...`,
/// `sign = 1.0` the MA convention `1 + θ1·B + ...`.
pub fn lag_polynomial(coeffs: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let step = step.max(1);
    let mut out = vec![0.0; coeffs.len() * step + 1];
    out[0] = 1.0;
    for (k, &c) in coeffs.iter().enumerate() {
        out[(k + 1) * step] = sign * c;
    }
    out
}

/// `(1 - B)^d · (1 - B^m)^D`.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut out = vec![1.0];
    for _ in 0..d {
        out = multiply(&out, &[1.0, -1.0]);
    }
    let seasonal = lag_polynomial(&[1.0], period, -1.0);
    for _ in 0..seasonal_d {
        out = multiply(&out, &seasonal);
    }
    out
}

/// Apply `poly` to `series`: `out_t = Σ_k poly_k · series_{t-k}`.
///
/// The first `poly.len() - 1` observations have no complete lag window and
/// are dropped.
pub fn apply_filter(poly: &[f64], series: &[f64]) -> Vec<f64> {
    let degree = poly.len().saturating_sub(1);
    if poly.is_empty() || series.len() <= degree {
        return Vec::new();
    }
    (degree..series.len())
        .map(|t| poly.iter().enumerate().map(|(k, &c)| c * series[t - k]).sum())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_expands_product() {
        // (1 - B)(1 - B) = 1 - 2B + B²
        assert_eq!(multiply(&[1.0, -1.0], &[1.0, -1.0]), vec![1.0, -2.0, 1.0]);
    }

    #[test]
    fn seasonal_lag_polynomial_places_terms_at_multiples() {
        assert_eq!(lag_polynomial(&[0.5, 0.25], 3, -1.0), vec![1.0, 0.0, 0.0, -0.5, 0.0, 0.0, -0.25]);
    }

    #[test]
    fn differencing_polynomial_combines_both_orders() {
        // (1 - B)(1 - B^2) = 1 - B - B² + B³
        assert_eq!(differencing_polynomial(1, 1, 2), vec![1.0, -1.0, -1.0, 1.0]);
        assert_eq!(differencing_polynomial(0, 0, 5), vec![1.0]);
    }

    #[test]
    fn filter_matches_plain_differences() {
        let y = [1.0, 4.0, 9.0, 16.0, 25.0];
        let first = apply_filter(&differencing_polynomial(1, 0, 5), &y);
        assert_eq!(first, vec![3.0, 5.0, 7.0, 9.0]);
        let second = apply_filter(&differencing_polynomial(2, 0, 5), &y);
        assert_eq!(second, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn filter_on_short_series_is_empty() {
        assert!(apply_filter(&differencing_polynomial(0, 1, 5), &[1.0, 2.0, 3.0]).is_empty());
    }
}

//! Seasonal ARIMA estimated by conditional sum of squares (CSS).
//!
//! Model, with `w_t = (1 - B)^d (1 - B^m)^D y_t`:
//!
//! ```text
//! φ(B) Φ(B^m) (w_t - μ) = θ(B) Θ(B^m) ε_t
//! ```
//!
//! The seasonal and non-seasonal polynomials are multiplied out into plain lag
//! coefficients, residuals are computed recursively with pre-sample
//! innovations at zero, and the sum of squared residuals is minimized with
//! Nelder–Mead. `μ` is estimated only when no differencing is applied.
//!
//! Stationarity and invertibility are not enforced: explosive AR or
//! non-invertible MA estimates are returned as-is as long as they are finite.

use tracing::{debug, warn};

use crate::domain::{FitDiagnostics, ModelConfig, PriceSeries};
use crate::error::PipelineError;
use crate::math::poly::{apply_filter, differencing_polynomial, lag_polynomial, multiply};
use crate::math::{fit_autoregression, nelder_mead, NelderMeadConfig};
use crate::model::SarimaBackend;

/// Optimizer budget for a single fit.
#[derive(Debug, Clone)]
pub struct FitSettings {
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
        }
    }
}

/// Default backend: CSS objective + Nelder–Mead.
///
/// Deterministic: the same series and configuration always produce the same
/// estimates.
#[derive(Debug, Clone, Default)]
pub struct CssBackend {
    settings: FitSettings,
}

impl CssBackend {
    pub fn new(settings: FitSettings) -> Self {
        Self { settings }
    }
}

/// Estimated coefficients, one vector per polynomial.
#[derive(Debug, Clone, PartialEq)]
pub struct SarimaCoefficients {
    pub mean: f64,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
}

impl SarimaCoefficients {
    // Parameter vector layout: [μ?] φ.. θ.. Φ.. Θ..
    fn from_params(config: &ModelConfig, params: &[f64]) -> Self {
        let mut rest = params;
        let mean = if config.has_mean() {
            let (m, tail) = rest.split_at(1);
            rest = tail;
            m[0]
        } else {
            0.0
        };
        let (ar, rest) = rest.split_at(config.p);
        let (ma, rest) = rest.split_at(config.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(config.seasonal_p);
        Self {
            mean,
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            seasonal_ar: seasonal_ar.to_vec(),
            seasonal_ma: seasonal_ma[..config.seasonal_q].to_vec(),
        }
    }

    fn to_params(&self, config: &ModelConfig) -> Vec<f64> {
        let mut out = Vec::with_capacity(config.n_params());
        if config.has_mean() {
            out.push(self.mean);
        }
        out.extend(&self.ar);
        out.extend(&self.ma);
        out.extend(&self.seasonal_ar);
        out.extend(&self.seasonal_ma);
        out
    }

    fn is_finite(&self) -> bool {
        self.mean.is_finite()
            && self
                .ar
                .iter()
                .chain(&self.ma)
                .chain(&self.seasonal_ar)
                .chain(&self.seasonal_ma)
                .all(|v| v.is_finite())
    }

    /// Named coefficients (`ar.L1`, `ma.S.L5`, ...).
    pub fn named(&self, config: &ModelConfig) -> Vec<(String, f64)> {
        let m = config.period;
        let mut out = Vec::new();
        if config.has_mean() {
            out.push(("mean".to_string(), self.mean));
        }
        out.extend(self.ar.iter().enumerate().map(|(i, &v)| (format!("ar.L{}", i + 1), v)));
        out.extend(self.ma.iter().enumerate().map(|(i, &v)| (format!("ma.L{}", i + 1), v)));
        out.extend(
            self.seasonal_ar
                .iter()
                .enumerate()
                .map(|(i, &v)| (format!("ar.S.L{}", m * (i + 1)), v)),
        );
        out.extend(
            self.seasonal_ma
                .iter()
                .enumerate()
                .map(|(i, &v)| (format!("ma.S.L{}", m * (i + 1)), v)),
        );
        out
    }
}

/// Coefficients expanded to plain lags: `w_t - μ ≈ Σ a_i (w_{t-i} - μ) + Σ b_j ε_{t-j}`.
#[derive(Debug, Clone)]
struct LagForm {
    mean: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
}

impl LagForm {
    fn new(c: &SarimaCoefficients, config: &ModelConfig) -> Self {
        let ar_poly = multiply(
            &lag_polynomial(&c.ar, 1, -1.0),
            &lag_polynomial(&c.seasonal_ar, config.period, -1.0),
        );
        let ma_poly = multiply(
            &lag_polynomial(&c.ma, 1, 1.0),
            &lag_polynomial(&c.seasonal_ma, config.period, 1.0),
        );
        Self {
            mean: c.mean,
            ar: ar_poly[1..].iter().map(|v| -v).collect(),
            ma: ma_poly[1..].to_vec(),
        }
    }

    /// One-step prediction of `w[t]` from everything before `t`.
    fn predict(&self, w: &[f64], e: &[f64], t: usize) -> f64 {
        let mut pred = self.mean;
        for (i, a) in self.ar.iter().enumerate() {
            if t > i {
                pred += a * (w[t - 1 - i] - self.mean);
            }
        }
        for (j, b) in self.ma.iter().enumerate() {
            if t > j {
                pred += b * e[t - 1 - j];
            }
        }
        pred
    }

    /// Residuals (zero before the first complete AR window) and their CSS.
    fn residuals(&self, w: &[f64]) -> (Vec<f64>, f64) {
        let start = self.ar.len();
        let mut e = vec![0.0; w.len()];
        let mut css = 0.0;
        for t in start..w.len() {
            let err = w[t] - self.predict(w, &e, t);
            e[t] = err;
            css += err * err;
        }
        (e, css)
    }
}

/// A fitted model: coefficients plus the state needed to keep forecasting.
#[derive(Debug, Clone)]
pub struct SarimaModel {
    config: ModelConfig,
    coefficients: SarimaCoefficients,
    form: LagForm,
    diff_poly: Vec<f64>,
    /// Last `diff_poly.len() - 1` levels, for undoing the differencing.
    level_tail: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    diagnostics: FitDiagnostics,
}

impl SarimaModel {
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn coefficients(&self) -> &SarimaCoefficients {
        &self.coefficients
    }

    pub fn diagnostics(&self) -> &FitDiagnostics {
        &self.diagnostics
    }
}

impl SarimaBackend for CssBackend {
    type Model = SarimaModel;

    fn fit(&self, series: &PriceSeries, config: &ModelConfig) -> Result<SarimaModel, PipelineError> {
        let y = series.closes();
        let diff_poly = differencing_polynomial(config.d, config.seasonal_d, config.period);
        let w = apply_filter(&diff_poly, y);

        let start = config.ar_lags();
        let n_params = config.n_params();
        if w.len() <= start + n_params {
            return Err(PipelineError::FitDivergence(format!(
                "{} needs more than {} observations after differencing, {} of {} remain",
                config.display(),
                start + n_params,
                w.len(),
                y.len()
            )));
        }

        let mean0 = if config.has_mean() {
            w.iter().sum::<f64>() / w.len() as f64
        } else {
            0.0
        };
        let centered: Vec<f64> = w.iter().map(|v| v - mean0).collect();
        let initial = SarimaCoefficients {
            mean: mean0,
            ar: fit_autoregression(&centered, config.p).unwrap_or_else(|| vec![0.0; config.p]),
            ma: vec![0.0; config.q],
            seasonal_ar: vec![0.0; config.seasonal_p],
            seasonal_ma: vec![0.0; config.seasonal_q],
        };

        debug!(
            config = %config.display(),
            n_obs = w.len(),
            ar_lags = start,
            ma_lags = config.ma_lags(),
            n_params,
            "fitting seasonal ARIMA"
        );

        // With no ARMA terms the CSS minimizer is the sample mean (or nothing
        // at all once differenced).
        let (coefficients, iterations, converged) = if n_params == usize::from(config.has_mean()) {
            (initial, 0, true)
        } else {
            let nm = NelderMeadConfig {
                max_iter: self.settings.max_iter,
                tolerance: self.settings.tolerance,
                ..Default::default()
            };
            let result = nelder_mead(
                |params| {
                    let c = SarimaCoefficients::from_params(config, params);
                    LagForm::new(&c, config).residuals(&w).1
                },
                &initial.to_params(config),
                &nm,
            );
            if !result.converged {
                warn!(
                    config = %config.display(),
                    iterations = result.iterations,
                    "optimizer stopped at the iteration cap before converging"
                );
            }
            (
                SarimaCoefficients::from_params(config, &result.optimal_point),
                result.iterations,
                result.converged,
            )
        };

        if !coefficients.is_finite() {
            return Err(PipelineError::FitDivergence(format!(
                "{} produced non-finite coefficient estimates",
                config.display()
            )));
        }

        let form = LagForm::new(&coefficients, config);
        let (residuals, css) = form.residuals(&w);
        if !css.is_finite() {
            return Err(PipelineError::FitDivergence(format!(
                "{} has a non-finite sum of squares at the estimate",
                config.display()
            )));
        }

        let n_effective = w.len() - start;
        let sigma2 = css / n_effective as f64;
        let log_likelihood =
            -0.5 * n_effective as f64 * (1.0 + (2.0 * std::f64::consts::PI * sigma2).ln());
        let aic = -2.0 * log_likelihood + 2.0 * (n_params + 1) as f64;

        let diagnostics = FitDiagnostics {
            coefficients: coefficients.named(config),
            sigma2,
            css,
            aic,
            n_effective,
            iterations,
            converged,
        };

        let degree = config.diff_lags();
        Ok(SarimaModel {
            config: *config,
            coefficients,
            form,
            diff_poly,
            level_tail: y[y.len() - degree..].to_vec(),
            differenced: w,
            residuals,
            diagnostics,
        })
    }

    fn forecast(&self, model: &SarimaModel, horizon: usize) -> Result<Vec<f64>, PipelineError> {
        let n = model.differenced.len();
        let mut w = model.differenced.clone();
        let mut e = model.residuals.clone();
        w.reserve(horizon);
        e.reserve(horizon);
        for _ in 0..horizon {
            let t = w.len();
            let pred = model.form.predict(&w, &e, t);
            w.push(pred);
            e.push(0.0);
        }

        // y_t = w_t - Σ_{k≥1} δ_k y_{t-k}
        let mut levels = model.level_tail.clone();
        let base = levels.len();
        for &wt in &w[n..] {
            let t = levels.len();
            let lagged: f64 = model
                .diff_poly
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, &c)| c * levels[t - k])
                .sum();
            levels.push(wt - lagged);
        }

        Ok(levels.split_off(base))
    }

    fn diagnostics(&self, model: &SarimaModel) -> Option<FitDiagnostics> {
        Some(model.diagnostics.clone())
    }
}

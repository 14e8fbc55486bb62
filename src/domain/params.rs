//! Model configuration and the bounded controls that produce it.

use serde::Serialize;

pub const HORIZON_MIN: usize = 1;
pub const HORIZON_MAX: usize = 60;
pub const DEFAULT_HORIZON: usize = 30;

/// Seasonal ARIMA orders `(p, d, q) x (P, D, Q, m)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ModelConfig {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl ModelConfig {
    /// Total number of differencing lags: `d + m·D`.
    pub fn diff_lags(&self) -> usize {
        self.d + self.period * self.seasonal_d
    }

    /// Highest AR lag after expanding the seasonal polynomial: `p + m·P`.
    pub fn ar_lags(&self) -> usize {
        self.p + self.period * self.seasonal_p
    }

    /// Highest MA lag after expanding the seasonal polynomial: `q + m·Q`.
    pub fn ma_lags(&self) -> usize {
        self.q + self.period * self.seasonal_q
    }

    /// A mean term is estimated only when the series is not differenced.
    pub fn has_mean(&self) -> bool {
        self.d == 0 && self.seasonal_d == 0
    }

    /// Number of free parameters (without the innovation variance).
    pub fn n_params(&self) -> usize {
        usize::from(self.has_mean()) + self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    pub fn display(&self) -> String {
        format!(
            "SARIMA({},{},{})({},{},{},{})",
            self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
        )
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            p: 5,
            d: 1,
            q: 0,
            seasonal_p: 1,
            seasonal_d: 1,
            seasonal_q: 1,
            period: 5,
        }
    }
}

/// One adjustable control on the parameter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    P,
    D,
    Q,
    SeasonalP,
    SeasonalD,
    SeasonalQ,
    Period,
    Horizon,
}

impl ParamField {
    pub const ALL: [ParamField; 8] = [
        ParamField::P,
        ParamField::D,
        ParamField::Q,
        ParamField::SeasonalP,
        ParamField::SeasonalD,
        ParamField::SeasonalQ,
        ParamField::Period,
        ParamField::Horizon,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ParamField::P => "AR (p)",
            ParamField::D => "Differencing (d)",
            ParamField::Q => "MA (q)",
            ParamField::SeasonalP => "Seasonal AR (P)",
            ParamField::SeasonalD => "Seasonal Diff (D)",
            ParamField::SeasonalQ => "Seasonal MA (Q)",
            ParamField::Period => "Seasonal Period (m)",
            ParamField::Horizon => "Forecast days",
        }
    }

    /// Inclusive `(min, max)` accepted by the control.
    pub fn bounds(self) -> (usize, usize) {
        match self {
            ParamField::P | ParamField::Q => (0, 5),
            ParamField::D => (0, 2),
            ParamField::SeasonalP | ParamField::SeasonalD | ParamField::SeasonalQ => (0, 2),
            ParamField::Period => (5, 30),
            ParamField::Horizon => (HORIZON_MIN, HORIZON_MAX),
        }
    }
}

/// Current values of every control: the model configuration plus the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub config: ModelConfig,
    pub horizon: usize,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            config: ModelConfig::default(),
            horizon: DEFAULT_HORIZON,
        }
    }
}

impl Controls {
    pub fn value(&self, field: ParamField) -> usize {
        match field {
            ParamField::P => self.config.p,
            ParamField::D => self.config.d,
            ParamField::Q => self.config.q,
            ParamField::SeasonalP => self.config.seasonal_p,
            ParamField::SeasonalD => self.config.seasonal_d,
            ParamField::SeasonalQ => self.config.seasonal_q,
            ParamField::Period => self.config.period,
            ParamField::Horizon => self.horizon,
        }
    }

    /// Set a control, clamping to its bounds.
    pub fn set(&mut self, field: ParamField, value: usize) {
        let (lo, hi) = field.bounds();
        let v = value.clamp(lo, hi);
        let slot = match field {
            ParamField::P => &mut self.config.p,
            ParamField::D => &mut self.config.d,
            ParamField::Q => &mut self.config.q,
            ParamField::SeasonalP => &mut self.config.seasonal_p,
            ParamField::SeasonalD => &mut self.config.seasonal_d,
            ParamField::SeasonalQ => &mut self.config.seasonal_q,
            ParamField::Period => &mut self.config.period,
            ParamField::Horizon => &mut self.horizon,
        };
        *slot = v;
    }

    /// Step a control by `delta`, saturating at its bounds.
    ///
    /// Returns `true` when the value changed.
    pub fn adjust(&mut self, field: ParamField, delta: i64) -> bool {
        let before = self.value(field);
        let next = (before as i64).saturating_add(delta).max(0) as usize;
        self.set(field, next);
        self.value(field) != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_controls() {
        let c = Controls::default();
        assert_eq!(c.config.display(), "SARIMA(5,1,0)(1,1,1,5)");
        assert_eq!(c.horizon, 30);
    }

    #[test]
    fn adjust_saturates_at_bounds() {
        let mut c = Controls::default();
        assert!(!c.adjust(ParamField::P, 1));
        assert_eq!(c.config.p, 5);

        c.set(ParamField::Period, 5);
        assert!(!c.adjust(ParamField::Period, -1));
        assert_eq!(c.config.period, 5);

        c.set(ParamField::Horizon, 1);
        assert!(!c.adjust(ParamField::Horizon, -10));
        assert_eq!(c.horizon, 1);
        assert!(c.adjust(ParamField::Horizon, 100));
        assert_eq!(c.horizon, 60);
    }

    #[test]
    fn set_clamps_out_of_range_input() {
        let mut c = Controls::default();
        c.set(ParamField::SeasonalD, 9);
        assert_eq!(c.config.seasonal_d, 2);
        c.set(ParamField::Period, 0);
        assert_eq!(c.config.period, 5);
    }

    #[test]
    fn lag_counts_expand_seasonal_terms() {
        let cfg = ModelConfig::default();
        assert_eq!(cfg.ar_lags(), 5 + 5);
        assert_eq!(cfg.ma_lags(), 5);
        assert_eq!(cfg.diff_lags(), 1 + 5);
        assert_eq!(cfg.n_params(), 5 + 1 + 1);
        assert!(!cfg.has_mean());
    }
}

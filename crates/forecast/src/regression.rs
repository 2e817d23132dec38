use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Ordinary least squares line through `(i, ys[i])`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub observations: usize,
    pub r_squared: f64,
}

impl LinearFit {
    /// Regresses `ys` against the day index `0..ys.len()`.
    pub fn fit(ys: &[f64]) -> Result<Self, ForecastError> {
        let n = ys.len();
        if n < 2 {
            return Err(ForecastError::Degenerate { observations: n });
        }
        if let Some(index) = ys.iter().position(|y| !y.is_finite()) {
            return Err(ForecastError::NonFinite { index });
        }

        let n_f = n as f64;
        let mean_x = (n_f - 1.0) / 2.0;
        let mean_y = ys.iter().sum::<f64>() / n_f;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (i, y) in ys.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxx += dx * dx;
            sxy += dx * (y - mean_y);
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for (i, y) in ys.iter().enumerate() {
            let residual = y - (intercept + slope * i as f64);
            ss_res += residual * residual;
            ss_tot += (y - mean_y) * (y - mean_y);
        }
        // A flat series is fit exactly.
        let r_squared = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

        Ok(Self {
            slope,
            intercept,
            observations: n,
            r_squared,
        })
    }

    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Predictions for the day indices `first..first + count`.
    pub fn predict_range(&self, first: usize, count: usize) -> Vec<f64> {
        (first..first + count).map(|x| self.predict(x as f64)).collect()
    }
}

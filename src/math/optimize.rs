//! Unconstrained Nelder–Mead simplex minimization.
//!
//! The CSS objective is cheap to evaluate and has no analytic gradient once
//! seasonal polynomials are multiplied out, so a derivative-free search is
//! used. There are no parameter bounds: stationarity and invertibility are
//! not enforced.

use std::cmp::Ordering;

/// Result of a Nelder–Mead run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub optimal_point: Vec<f64>,
    pub optimal_value: f64,
    pub iterations: usize,
    /// `false` when the run stopped at `max_iter`.
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    /// Relative spread of objective values across the simplex at which the
    /// search stops.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Initial simplex step, relative to the start value (absolute near zero).
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Minimize `objective` starting from `initial`.
///
/// Non-finite objective values are treated as `+inf`, so the simplex moves
/// away from regions where the recursion overflows.
pub fn nelder_mead<F>(objective: F, initial: &[f64], config: &NelderMeadConfig) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        let step = if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        simplex.push(vertex);
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let spread = values[worst] - values[best];
        if spread.is_finite() && spread <= config.tolerance * (values[best].abs() + config.tolerance) {
            converged = true;
            break;
        }

        let centroid = centroid_without(&simplex, worst);
        let diameter = simplex
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        if diameter < config.tolerance {
            converged = true;
            break;
        }

        let reflected = along(&centroid, &simplex[worst], -config.alpha);
        let reflected_value = eval(&reflected);

        if reflected_value < values[second_worst] && reflected_value >= values[best] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        if reflected_value < values[best] {
            let expanded = along(&centroid, &reflected, config.gamma);
            let expanded_value = eval(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[worst] {
            let contracted = along(&centroid, &reflected, config.rho);
            let contracted_value = eval(&contracted);
            if contracted_value <= reflected_value {
                simplex[worst] = contracted;
                values[worst] = contracted_value;
                continue;
            }
        } else {
            let contracted = along(&centroid, &simplex[worst], config.rho);
            let contracted_value = eval(&contracted);
            if contracted_value < values[worst] {
                simplex[worst] = contracted;
                values[worst] = contracted_value;
                continue;
            }
        }

        // Shrink towards the best vertex.
        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i == best {
                continue;
            }
            for j in 0..n {
                simplex[i][j] = anchor[j] + config.sigma * (simplex[i][j] - anchor[j]);
            }
            values[i] = eval(&simplex[i]);
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    NelderMeadResult {
        optimal_point: simplex[best].clone(),
        optimal_value: values[best],
        iterations,
        converged,
    }
}

fn centroid_without(simplex: &[Vec<f64>], exclude: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let count = (simplex.len() - 1) as f64;
    let mut c = vec![0.0; n];
    for (i, vertex) in simplex.iter().enumerate() {
        if i == exclude {
            continue;
        }
        for (cj, vj) in c.iter_mut().zip(vertex) {
            *cj += vj;
        }
    }
    c.iter_mut().for_each(|v| *v /= count);
    c
}

/// `centroid + t·(point - centroid)`.
///
/// `t = -alpha` reflects, `t = gamma` expands, `t = rho` contracts.
fn along(centroid: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point)
        .map(|(c, p)| c + t * (p - c))
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn finds_quadratic_minimum() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            &NelderMeadConfig::default(),
        );
        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], 3.0, epsilon = 1e-3);
    }

    #[test]
    fn rosenbrock_with_larger_budget() {
        let config = NelderMeadConfig {
            max_iter: 5000,
            tolerance: 1e-12,
            ..Default::default()
        };
        let result = nelder_mead(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2),
            &[0.0, 0.0],
            &config,
        );
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-2);
        assert_relative_eq!(result.optimal_point[1], 1.0, epsilon = 1e-2);
    }

    #[test]
    fn reports_iteration_cap() {
        let config = NelderMeadConfig {
            max_iter: 3,
            tolerance: 1e-15,
            ..Default::default()
        };
        let result = nelder_mead(|x| (x[0] - 100.0).powi(2), &[0.0], &config);
        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
    }

    #[test]
    fn steps_away_from_non_finite_region() {
        // Objective is NaN for x > 1; the minimum sits at the edge.
        let result = nelder_mead(
            |x| if x[0] > 1.0 { f64::NAN } else { (x[0] - 1.0).powi(2) },
            &[0.0],
            &NelderMeadConfig::default(),
        );
        assert!(result.optimal_value.is_finite());
        assert!(result.optimal_point[0] <= 1.0);
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-2);
    }

    #[test]
    fn empty_start_is_not_converged() {
        let result = nelder_mead(|_| 0.0, &[], &NelderMeadConfig::default());
        assert!(!result.converged);
        assert!(result.optimal_value.is_nan());
    }
}

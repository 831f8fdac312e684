/// Non-negative matrix factorization with multiplicative updates
///
/// Factorizes `V ≈ W·H` under the Frobenius loss. `W` holds per-document
/// topic weights, `H` per-topic term weights. Initial matrices come from a
/// seeded RNG so identical input always yields identical topics.
use super::TopicModel;
use crate::error::{ChapterizerError, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

const EPSILON: f64 = 1e-10;
const CONVERGENCE_CHECK_INTERVAL: usize = 10;

#[derive(Debug, Clone)]
pub struct NmfModel {
    n_components: usize,
    seed: u64,
    max_iter: usize,
    tolerance: f64,
    components: Option<Array2<f64>>,
}

impl NmfModel {
    pub fn new(n_components: usize, seed: u64) -> Self {
        Self {
            n_components,
            seed,
            max_iter: 200,
            tolerance: 1e-4,
            components: None,
        }
    }

    pub fn with_iterations(mut self, max_iter: usize, tolerance: f64) -> Self {
        self.max_iter = max_iter;
        self.tolerance = tolerance;
        self
    }

    fn random_init(&self, rows: usize, cols: usize, scale: f64, rng: &mut StdRng) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |_| scale * (EPSILON + rng.gen::<f64>()))
    }
}

fn reconstruction_error(v: &Array2<f64>, w: &Array2<f64>, h: &Array2<f64>) -> f64 {
    let diff = v - &w.dot(h);
    diff.iter().map(|x| x * x).sum::<f64>().sqrt()
}

impl TopicModel for NmfModel {
    fn fit_transform(&mut self, matrix: &Array2<f64>) -> Result<Array2<f64>> {
        if self.n_components == 0 {
            return Err(ChapterizerError::Config("n_components must be greater than 0".into()));
        }
        if matrix.iter().any(|v| *v < 0.0) {
            return Err(ChapterizerError::Config("factorization input must be non-negative".into()));
        }

        let (n_docs, n_terms) = matrix.dim();
        let k = self.n_components;
        let mean = if matrix.is_empty() { 0.0 } else { matrix.mean().unwrap_or(0.0) };
        let scale = (mean / k as f64).sqrt();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut h = self.random_init(k, n_terms, scale, &mut rng);
        let mut w = self.random_init(n_docs, k, scale, &mut rng);

        let initial_error = reconstruction_error(matrix, &w, &h);
        let mut previous_error = initial_error;

        for iteration in 1..=self.max_iter {
            let numerator = w.t().dot(matrix);
            let denominator = w.t().dot(&w).dot(&h);
            h.zip_mut_with(&numerator, |x, n| *x *= n);
            h.zip_mut_with(&denominator, |x, d| *x /= d + EPSILON);

            let numerator = matrix.dot(&h.t());
            let denominator = w.dot(&h).dot(&h.t());
            w.zip_mut_with(&numerator, |x, n| *x *= n);
            w.zip_mut_with(&denominator, |x, d| *x /= d + EPSILON);

            if iteration % CONVERGENCE_CHECK_INTERVAL == 0 {
                let error = reconstruction_error(matrix, &w, &h);
                if initial_error > 0.0 && (previous_error - error) / initial_error < self.tolerance {
                    debug!("NMF converged after {} iterations (error {:.4})", iteration, error);
                    break;
                }
                previous_error = error;
            }
        }

        self.components = Some(h);
        Ok(w)
    }

    fn components(&self) -> Option<&Array2<f64>> {
        self.components.as_ref()
    }
}

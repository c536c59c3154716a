//! Per-bucket mixture fitting
//!
//! Normalized events in a bucket are a mix of canonical and analogue
//! signal. A two-component 1D Gaussian mixture is fit by EM, seeded from
//! the base model: the first component starts at the model distribution,
//! the second at the same mean with twice the spread. The second
//! component is what the trained analogue model records.

use crate::aggregate::TrainingSet;
use clew_bio::{KmerLevel, PoreModel};
use clew_core::{ClewError, ClewResult};
use tracing::warn;

/// Log-likelihood improvement below which EM is considered converged.
pub const EM_TOLERANCE: f64 = 1e-4;

pub const EM_MAX_ITERATIONS: usize = 500;

/// Floor for component spreads so a component cannot collapse onto a
/// single sample.
const MIN_STDV: f64 = 1e-3;

/// Fitted two-component mixture for one bucket.
#[derive(Debug, Clone, Copy)]
pub struct MixtureFit {
    pub weight_base: f64,
    pub base: KmerLevel,
    pub weight_analogue: f64,
    pub analogue: KmerLevel,
}

fn normal_pdf(x: f64, mean: f64, stdv: f64) -> f64 {
    let z = (x - mean) / stdv;
    (-0.5 * z * z).exp() / (stdv * (2.0 * std::f64::consts::PI).sqrt())
}

/// Fit a two-component mixture to pooled normalized events.
///
/// Fails when there are too few samples or the likelihood degenerates;
/// callers skip the bucket and count it.
pub fn fit_mixture(samples: &[f64], prior: KmerLevel) -> ClewResult<MixtureFit> {
    if samples.len() < 2 {
        return Err(ClewError::InvalidInput(format!(
            "{} events are not enough to fit a mixture",
            samples.len()
        )));
    }

    let n = samples.len() as f64;
    let mut weight_base = 0.5;
    let mut weight_analogue = 0.5;
    let mut base = prior;
    let mut analogue = KmerLevel {
        mean: prior.mean,
        stdv: 2.0 * prior.stdv,
    };

    let mut previous_log_likelihood = f64::NEG_INFINITY;
    let mut responsibilities = vec![0.0f64; samples.len()];

    for _ in 0..EM_MAX_ITERATIONS {
        // E step: responsibility of the analogue component per sample
        let mut log_likelihood = 0.0;
        for (i, &x) in samples.iter().enumerate() {
            let p_base = weight_base * normal_pdf(x, base.mean, base.stdv);
            let p_analogue = weight_analogue * normal_pdf(x, analogue.mean, analogue.stdv);
            let total = p_base + p_analogue;
            if !total.is_finite() || total <= 0.0 {
                return Err(ClewError::InvalidInput(
                    "mixture likelihood degenerated during fitting".to_string(),
                ));
            }
            responsibilities[i] = p_analogue / total;
            log_likelihood += total.ln();
        }

        // M step
        let n_analogue: f64 = responsibilities.iter().sum();
        let n_base = n - n_analogue;
        if n_analogue < 1e-9 || n_base < 1e-9 {
            return Err(ClewError::InvalidInput(
                "a mixture component lost all responsibility".to_string(),
            ));
        }

        let mean_analogue = samples
            .iter()
            .zip(&responsibilities)
            .map(|(&x, &r)| r * x)
            .sum::<f64>()
            / n_analogue;
        let var_analogue = samples
            .iter()
            .zip(&responsibilities)
            .map(|(&x, &r)| r * (x - mean_analogue).powi(2))
            .sum::<f64>()
            / n_analogue;

        let mean_base = samples
            .iter()
            .zip(&responsibilities)
            .map(|(&x, &r)| (1.0 - r) * x)
            .sum::<f64>()
            / n_base;
        let var_base = samples
            .iter()
            .zip(&responsibilities)
            .map(|(&x, &r)| (1.0 - r) * (x - mean_base).powi(2))
            .sum::<f64>()
            / n_base;

        base = KmerLevel {
            mean: mean_base,
            stdv: var_base.sqrt().max(MIN_STDV),
        };
        analogue = KmerLevel {
            mean: mean_analogue,
            stdv: var_analogue.sqrt().max(MIN_STDV),
        };
        weight_analogue = n_analogue / n;
        weight_base = n_base / n;

        if (log_likelihood - previous_log_likelihood).abs() < EM_TOLERANCE {
            break;
        }
        previous_log_likelihood = log_likelihood;
    }

    Ok(MixtureFit {
        weight_base,
        base,
        weight_analogue,
        analogue,
    })
}

/// Seed distribution for a bucket: the model entry for the context itself
/// when present, otherwise the model k-mer centered on the base of
/// interest inside the context.
fn prior_for(kmer: &str, model: &PoreModel) -> Option<KmerLevel> {
    if let Some(level) = model.get(kmer) {
        return Some(*level);
    }
    let model_k = model.iter().next().map(|(k, _)| k.len())?;
    if model_k < kmer.len() {
        let start = (kmer.len() - model_k) / 2;
        return model.get(&kmer[start..start + model_k]).copied();
    }
    None
}

fn empirical_level(samples: &[f64]) -> KmerLevel {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    KmerLevel {
        mean,
        stdv: var.sqrt().max(MIN_STDV),
    }
}

/// Fit every bucket of a training set and collect the analogue components
/// into a trained model. Buckets that cannot be fit are skipped with a
/// warning; the returned count says how many.
pub fn train_model(training_set: &TrainingSet, model: &PoreModel) -> (PoreModel, usize) {
    let mut trained = Vec::new();
    let mut skipped = 0usize;

    for (kmer, reads) in training_set {
        let samples: Vec<f64> = reads.iter().flatten().copied().collect();
        if samples.len() < 2 {
            warn!(kmer = %kmer, "too few events to fit, skipping bucket");
            skipped += 1;
            continue;
        }

        let prior = prior_for(kmer, model).unwrap_or_else(|| empirical_level(&samples));
        match fit_mixture(&samples, prior) {
            Ok(fit) => trained.push((kmer.clone(), fit.analogue)),
            Err(e) => {
                warn!(kmer = %kmer, error = %e, "mixture fit failed, skipping bucket");
                skipped += 1;
            }
        }
    }

    (PoreModel::from_entries(trained), skipped)
}

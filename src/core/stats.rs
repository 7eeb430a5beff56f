//! Point-in-time kinetic-theory statistics over the particle population.
//!
//! Everything here is a pure projection of the particle fields; nothing is
//! persisted between ticks.

use crate::core::particle::Particle;

/// Boltzmann constant (J/K).
pub const BOLTZMANN: f64 = 1.38065e-23;

/// Number of speed-histogram bins.
pub const HISTOGRAM_BINS: usize = 16;

/// Number of samples of the theoretical speed-distribution curve.
pub const CURVE_SAMPLES: usize = 65;

/// Derived macroscopic metrics for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStatistics {
    pub particle_count: usize,
    /// Empirical mean free path: population average of the per-particle
    /// running free-path lengths.
    pub mean_free_path: f64,
    /// Closed-form mean free path for the working area, mean radius and
    /// particle count: `A / (sqrt(2) * 4 * r_mean * n)`.
    pub mean_free_path_theory: f64,
    pub rms_speed: f64,
    pub rms_mass: f64,
    /// `sum(m * v^2) / n`, the equipartition energy measure feeding the
    /// temperature estimate.
    pub mean_kinetic_energy: f64,
    /// Equipartition temperature `T = 2 * E_mean / (3 k)`.
    pub temperature: f64,
    /// Most likely speed `sqrt(2 k T / m_rms)`.
    pub most_likely_speed: f64,
    /// Speed histogram over `histogram_range`; bins always sum to
    /// `particle_count` (speeds beyond the range land in the last bin).
    pub histogram: Vec<u32>,
    /// Histogram range `[0, 2 * most_likely_speed]`.
    pub histogram_range: (f64, f64),
    /// Maxwell speed-distribution density sampled over
    /// `[0, 3 * most_likely_speed]` for overlay comparison.
    pub maxwell_curve: Vec<(f64, f64)>,
}

/// Maxwell speed-distribution density `f(v) = (m/T) v^2 exp(-m v^2 / (2kT))`.
#[inline]
pub fn maxwell_density(v: f64, mass: f64, temperature: f64) -> f64 {
    mass / temperature * v * v * (-mass * v * v / (2.0 * BOLTZMANN * temperature)).exp()
}

/// Compute the full summary for the current population.
///
/// Returns `None` for a degenerate population (no particles, or all speeds
/// zero so temperature is undefined) instead of propagating NaN.
pub fn summarize(particles: &[Particle], working_area: f64) -> Option<SummaryStatistics> {
    if particles.is_empty() {
        return None;
    }
    let n = particles.len() as f64;

    let mean_free_path = particles.iter().map(|p| p.free_path_length).sum::<f64>() / n;
    let mean_radius = particles.iter().map(|p| p.radius as f64).sum::<f64>() / n;
    let mean_free_path_theory = working_area / (2.0_f64.sqrt() * 4.0 * mean_radius * n);

    let rms_speed = (particles.iter().map(|p| p.speed * p.speed).sum::<f64>() / n).sqrt();
    let rms_mass = (particles.iter().map(|p| p.mass * p.mass).sum::<f64>() / n).sqrt();
    let mean_kinetic_energy = particles
        .iter()
        .map(|p| p.mass * p.speed * p.speed)
        .sum::<f64>()
        / n;
    let temperature = 2.0 * mean_kinetic_energy / (3.0 * BOLTZMANN);
    if temperature <= 0.0 {
        return None;
    }
    let most_likely_speed = (2.0 * BOLTZMANN * temperature / rms_mass).sqrt();

    let histogram_range = (0.0, 2.0 * most_likely_speed);
    let bin_width = histogram_range.1 / HISTOGRAM_BINS as f64;
    let mut histogram = vec![0u32; HISTOGRAM_BINS];
    for p in particles {
        let bin = ((p.speed / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        histogram[bin] += 1;
    }

    let v_max = 3.0 * most_likely_speed;
    let maxwell_curve = (0..CURVE_SAMPLES)
        .map(|i| {
            let v = v_max * i as f64 / (CURVE_SAMPLES - 1) as f64;
            (v, maxwell_density(v, rms_mass, temperature))
        })
        .collect();

    Some(SummaryStatistics {
        particle_count: particles.len(),
        mean_free_path,
        mean_free_path_theory,
        rms_speed,
        rms_mass,
        mean_kinetic_energy,
        temperature,
        most_likely_speed,
        histogram,
        histogram_range,
        maxwell_curve,
    })
}

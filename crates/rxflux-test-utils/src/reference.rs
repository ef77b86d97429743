//! Independent explicit-Euler solver for one species on a uniform cable.
//!
//! Works directly on the closed-form stencil `D / dx² * (c[i-1] - 2c[i] +
//! c[i+1])` with no-flux ends, without going through `Space` couplings or
//! rate terms. Used to cross-check the integrator.

/// Dense state of a single-species uniform cable.
#[derive(Clone, Debug)]
pub struct UniformCableReference {
    pub values: Vec<f64>,
    pub time: f64,
    dx: f64,
    diffusion: f64,
}

impl UniformCableReference {
    /// A cable of `length` split into `initial.len()` segments.
    pub fn new(length: f64, diffusion: f64, initial: Vec<f64>) -> Self {
        assert!(!initial.is_empty(), "reference cable needs at least one segment");
        Self {
            dx: length / initial.len() as f64,
            values: initial,
            time: 0.0,
            diffusion,
        }
    }

    /// Advance by `dt`, adding `injection[i]` (concentration per unit time)
    /// to segment `i`.
    pub fn step(&mut self, dt: f64, injection: &[f64]) {
        assert_eq!(injection.len(), self.values.len(), "injection length mismatch");
        let n = self.values.len();
        let k = self.diffusion / (self.dx * self.dx);
        let prev = self.values.clone();
        for i in 0..n {
            let mut lap = 0.0;
            if i > 0 {
                lap += prev[i - 1] - prev[i];
            }
            if i + 1 < n {
                lap += prev[i + 1] - prev[i];
            }
            self.values[i] = prev[i] + dt * (k * lap + injection[i]);
        }
        self.time += dt;
    }

    /// Advance `steps` times, computing the injection from the step-start
    /// state each time.
    pub fn run(&mut self, dt: f64, steps: usize, mut injection: impl FnMut(&[f64]) -> Vec<f64>) {
        for _ in 0..steps {
            let inj = injection(&self.values);
            self.step(dt, &inj);
        }
    }

    /// Total amount per unit cross-section: `Σ c_i * dx`.
    pub fn mass(&self) -> f64 {
        self.values.iter().sum::<f64>() * self.dx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diffusion_conserves_mass() {
        let mut r = UniformCableReference::new(10.0, 1.0, vec![0.0, 0.0, 10.0, 0.0, 0.0]);
        let before = r.mass();
        r.run(0.1, 50, |v| vec![0.0; v.len()]);
        assert!((r.mass() - before).abs() < 1e-9);
        assert!((r.time - 5.0).abs() < 1e-9);
    }

    #[test]
    fn injection_without_diffusion_is_linear() {
        let mut r = UniformCableReference::new(1.0, 0.0, vec![0.0; 3]);
        r.run(0.5, 4, |_| vec![1.0, 0.0, 2.0]);
        assert_eq!(r.values, vec![2.0, 0.0, 4.0]);
    }
}

//! Trajectory recording and comparison.
//!
//! Hashes use FNV-1a over `f64::to_bits()`, so two trajectories hash equal
//! only when every recorded value is bitwise identical.

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Time series of a fixed set of probes.
///
/// Each call to [`record`](Trajectory::record) appends one sample per
/// probe. Probe `i` of every sample is stored in `series[i]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub series: Vec<Vec<f64>>,
}

impl Trajectory {
    /// An empty trajectory with `probes` series.
    pub fn new(probes: usize) -> Self {
        Self {
            times: Vec::new(),
            series: vec![Vec::new(); probes],
        }
    }

    /// Append one sample.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not yield exactly one value per probe.
    pub fn record(&mut self, time: f64, values: impl IntoIterator<Item = f64>) {
        let mut n = 0;
        for (series, v) in self.series.iter_mut().zip(values) {
            series.push(v);
            n += 1;
        }
        assert_eq!(n, self.series.len(), "sample has the wrong number of probes");
        self.times.push(time);
    }

    /// Number of samples recorded.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Samples of probe `i`.
    pub fn probe(&self, i: usize) -> &[f64] {
        &self.series[i]
    }

    /// FNV-1a hash over times and all series values.
    pub fn hash(&self) -> u64 {
        let mut hash = fnv1a_u64(FNV_OFFSET, self.times.len() as u64);
        for t in &self.times {
            hash = fnv1a_u64(hash, t.to_bits());
        }
        for s in &self.series {
            hash = trajectory_hash_from(hash, s);
        }
        hash
    }
}

fn trajectory_hash_from(mut hash: u64, values: &[f64]) -> u64 {
    hash = fnv1a_u64(hash, values.len() as u64);
    for v in values {
        hash = fnv1a_u64(hash, v.to_bits());
    }
    hash
}

/// FNV-1a hash over a flat sequence of values.
pub fn trajectory_hash(values: &[f64]) -> u64 {
    trajectory_hash_from(FNV_OFFSET, values)
}

/// Largest relative error of `actual` against `expected`, element-wise.
///
/// The error at each point is `|a - e| / max(|e|, floor)`, so that points
/// where the expected value is zero compare absolutely against `floor`.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn max_relative_error(actual: &[f64], expected: &[f64], floor: f64) -> f64 {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    actual
        .iter()
        .zip(expected)
        .map(|(a, e)| (a - e).abs() / e.abs().max(floor))
        .fold(0.0, f64::max)
}

//! Define basic accumulator machinery (that doesn't require the standard lib)
//!
//! # Accumulation Machinery
//!
//! The calculation is framed as a _binned reduction_. Every sampled sphere
//! produces one value per shell (the number of enclosed particles) and the
//! shell index acts as the bin index. The accumulation logic for a single
//! bin is encapsulated by a type implementing [`Reducer`].
//!
//! We draw a distinction between the current state of the accumulator and
//! the actual accumulation logic.
//! - We refer to the current state of a single accumulator as the
//!   `accum_state`.
//! - a collection of `accum_state`s (one per bin) is usually managed by a
//!   [`StatePackViewMut`](crate::StatePackViewMut) instance.
//! - the reducers are agnostic about the precise way that a given
//!   `accum_state` is organized in memory. This is what lets the executors
//!   hand out separate statepacks to separate threads and merge them
//!   afterwards.

use ndarray::{ArrayView1, ArrayViewMut1};

/// Instances of this element are consumed by the Reducer
///
/// For the counts-in-cells statistic, `value` is the number of particles
/// enclosed by a shell (stored as a float to keep the reducer interface
/// uniform) and `weight` is the weight of the sample.
#[derive(Clone, Copy)]
pub struct Datum {
    pub value: f64,
    pub weight: f64,
}

impl Datum {
    /// a sample with unit weight
    pub fn from_count(count: u64) -> Self {
        Datum {
            value: count as f64,
            weight: 1.0,
        }
    }
}

/// describes the output components from a single Reducer accum_state
pub enum OutputDescr {
    SingleVecComp { size: usize, name: &'static str },
}

impl OutputDescr {
    /// the number of components to allocate per component
    pub fn n_per_accum_state(&self) -> usize {
        match self {
            Self::SingleVecComp { size, .. } => *size,
        }
    }
}

/// Reducers generally operate on individual `accum_state`s.
pub trait Reducer {
    /// the number of f64 elements needed to track the accumulator data
    fn accum_state_size(&self) -> usize;

    /// initializes the storage tracking the acumulator's state.
    ///
    /// You need to call this function before you start working with the
    /// storage. You can also use this to reset the accumulator's state since
    /// it blindly overwrites any existing values.
    fn init_accum_state(&self, accum_state: &mut ArrayViewMut1<f64>);

    /// consume the datum to update the accum_state
    fn consume(&self, accum_state: &mut ArrayViewMut1<f64>, datum: &Datum);

    /// merge the state information tracked by `accum_state` and `other`, and
    /// update `accum_state` accordingly
    fn merge(&self, accum_state: &mut ArrayViewMut1<f64>, other: &ArrayView1<f64>);

    /// Describes the outputs produced from a single accum_state
    fn output_descr(&self) -> OutputDescr;
}

/// Reports whether the tail probability needed to be clamped while
/// converting a histogram to probabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TailStatus {
    Exact,
    /// round-off made `1 - sum(pN[..num_pN-1])` negative; it was set to 0
    Clamped,
}

/// Tracks the distribution of particle counts, for a single shell, across
/// all sampled spheres.
///
/// The accum_state holds the total weight of all samples, followed by
/// `num_pn` buckets. Bucket `k < num_pn - 1` tracks samples that contained
/// exactly `k` particles, while the final bucket tracks the "tail" (every
/// sample with at least `num_pn - 1` particles).
#[derive(Clone, Copy)]
pub struct CountsInCells {
    num_pn: usize,
}

impl CountsInCells {
    const WEIGHT: usize = 0;
    const FIRST_BUCKET: usize = 1;

    pub fn new(num_pn: usize) -> Result<CountsInCells, &'static str> {
        if num_pn == 0 {
            Err("num_pN must be at least 1")
        } else {
            Ok(Self { num_pn })
        }
    }

    pub fn num_pn(&self) -> usize {
        self.num_pn
    }

    /// the number of samples (spheres) that have been consumed
    pub fn total_weight(&self, accum_state: &ArrayView1<f64>) -> f64 {
        accum_state[CountsInCells::WEIGHT]
    }

    /// Convert the tracked histogram into probabilities. This is the only way
    /// to extract output from an accum_state; `pn` must have the length given
    /// by `self.output_descr().n_per_accum_state()`.
    ///
    /// `pn[k]` is the fraction of samples with exactly `k` particles for
    /// `k < num_pn - 1`. The final entry is computed as `1 - sum(others)`.
    ///
    /// When no samples have been consumed, every entry is set to 0 (rather
    /// than dividing by 0).
    pub fn fill_probabilities(&self, pn: &mut [f64], accum_state: &ArrayView1<f64>) -> TailStatus {
        debug_assert_eq!(pn.len(), self.num_pn);
        let total = accum_state[CountsInCells::WEIGHT];
        if total <= 0.0 {
            pn.fill(0.0);
            return TailStatus::Exact;
        }

        let last = self.num_pn - 1;
        let mut sum = 0.0;
        for (k, prob) in pn[..last].iter_mut().enumerate() {
            *prob = accum_state[CountsInCells::FIRST_BUCKET + k] / total;
            sum += *prob;
        }
        let tail = 1.0 - sum;
        if tail < 0.0 {
            pn[last] = 0.0;
            TailStatus::Clamped
        } else {
            pn[last] = tail;
            TailStatus::Exact
        }
    }
}

impl Reducer for CountsInCells {
    fn accum_state_size(&self) -> usize {
        self.num_pn + 1
    }

    fn init_accum_state(&self, accum_state: &mut ArrayViewMut1<f64>) {
        accum_state.fill(0.0);
    }

    #[inline(always)]
    fn consume(&self, accum_state: &mut ArrayViewMut1<f64>, datum: &Datum) {
        // counts beyond the last bucket are folded into the tail
        let bucket = if datum.value >= (self.num_pn - 1) as f64 {
            self.num_pn - 1
        } else {
            datum.value as usize
        };
        accum_state[CountsInCells::WEIGHT] += datum.weight;
        accum_state[CountsInCells::FIRST_BUCKET + bucket] += datum.weight;
    }

    fn merge(&self, accum_state: &mut ArrayViewMut1<f64>, other: &ArrayView1<f64>) {
        for i in 0..self.accum_state_size() {
            accum_state[i] += other[i];
        }
    }

    fn output_descr(&self) -> OutputDescr {
        OutputDescr::SingleVecComp {
            size: self.num_pn,
            name: "pN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, arr1};

    fn consume_counts(reducer: &CountsInCells, counts: &[u64]) -> Array1<f64> {
        let mut accum_state = Array1::<f64>::zeros(reducer.accum_state_size());
        reducer.init_accum_state(&mut accum_state.view_mut());
        for count in counts {
            reducer.consume(&mut accum_state.view_mut(), &Datum::from_count(*count));
        }
        accum_state
    }

    #[test]
    fn invalid_num_pn() {
        assert!(CountsInCells::new(0).is_err());
    }

    #[test]
    fn output_size() {
        let reducer = CountsInCells::new(5).unwrap();
        assert_eq!(reducer.accum_state_size(), 6);
        assert_eq!(reducer.output_descr().n_per_accum_state(), 5);
    }

    #[test]
    fn consume_and_tail() {
        let reducer = CountsInCells::new(3).unwrap();
        let accum_state = consume_counts(&reducer, &[0, 0, 1, 2, 5, 9, 0, 1]);
        assert_eq!(
            accum_state.as_slice().unwrap(),
            &[8.0, 3.0, 2.0, 3.0],
            "layout is [weight, p0, p1, tail]"
        );

        let mut pn = [0.0; 3];
        let status = reducer.fill_probabilities(&mut pn, &accum_state.view());
        assert_eq!(status, TailStatus::Exact);
        assert_eq!(pn, [0.375, 0.25, 0.375]);
    }

    #[test]
    fn single_bucket() {
        // with num_pN = 1, the only entry is the tail
        let reducer = CountsInCells::new(1).unwrap();
        let accum_state = consume_counts(&reducer, &[0, 3, 4]);
        let mut pn = [0.0; 1];
        reducer.fill_probabilities(&mut pn, &accum_state.view());
        assert_eq!(pn, [1.0]);
    }

    #[test]
    fn no_samples() {
        let reducer = CountsInCells::new(4).unwrap();
        let accum_state = consume_counts(&reducer, &[]);
        let mut pn = [f64::NAN; 4];
        let status = reducer.fill_probabilities(&mut pn, &accum_state.view());
        assert_eq!(status, TailStatus::Exact);
        assert_eq!(pn, [0.0; 4]);
    }

    #[test]
    fn clamped_tail() {
        // construct a state where round-off pushes the sum above 1
        let reducer = CountsInCells::new(4).unwrap();
        let accum_state = arr1(&[3.0, 1.0, 1.0, 1.0, 0.0]);
        let mut pn = [0.0; 4];
        let status = reducer.fill_probabilities(&mut pn, &accum_state.view());
        // 1/3 + 1/3 + 1/3 may or may not exceed 1 in floating point, so we
        // only check the invariants
        assert!(pn.iter().all(|p| (0.0..=1.0).contains(p)));
        if status == TailStatus::Clamped {
            assert_eq!(pn[3], 0.0);
        }

        // an unambiguous case: the buckets claim more weight than the total
        let accum_state = arr1(&[2.0, 1.0, 1.5, 0.0, 0.0]);
        let status = reducer.fill_probabilities(&mut pn, &accum_state.view());
        assert_eq!(status, TailStatus::Clamped);
        assert_eq!(pn[3], 0.0);
    }

    #[test]
    fn merge() {
        let reducer = CountsInCells::new(2).unwrap();
        let mut state_a = consume_counts(&reducer, &[0, 4]);
        let state_b = consume_counts(&reducer, &[0, 0, 1]);
        reducer.merge(&mut state_a.view_mut(), &state_b.view());
        assert_eq!(state_a.as_slice().unwrap(), &[5.0, 3.0, 2.0]);
    }
}

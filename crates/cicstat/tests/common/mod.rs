// not every integration test uses every helper
#![allow(dead_code)]

// the reason this is named mod.rs has to do with some complexities of how
// testing is handled
//
// we are following the advice of the rust book
// https://doc.rust-lang.org/book/ch11-03-test-organization.html#submodules-in-integration-tests

use cicstat::ResultRow;
use rand::distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

// based on numpy!
// https://numpy.org/doc/stable/reference/generated/numpy.isclose.html
pub fn isclose(actual: f64, ref_val: f64, rtol: f64, atol: f64) -> bool {
    let actual_nan = actual.is_nan();
    let ref_nan = ref_val.is_nan();
    if actual_nan || ref_nan {
        actual_nan && ref_nan
    } else {
        (actual - ref_val).abs() <= (atol + rtol * ref_val.abs())
    }
}

/// Owns particle positions
pub struct OwnedParticles<T> {
    pub x: Vec<T>,
    pub y: Vec<T>,
    pub z: Vec<T>,
}

/// draw `n` particle positions uniformly from `[0, boxsize)` along each
/// axis
pub fn uniform_particles(seed: u64, n: usize, boxsize: f64) -> OwnedParticles<f64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let distr = Uniform::try_from(0.0..boxsize).unwrap();
    let mut draw = || -> Vec<f64> { (0..n).map(|_| distr.sample(&mut rng)).collect() };
    let x = draw();
    let y = draw();
    let z = draw();
    OwnedParticles { x, y, z }
}

impl OwnedParticles<f64> {
    pub fn to_f32(&self) -> OwnedParticles<f32> {
        let convert = |v: &Vec<f64>| -> Vec<f32> { v.iter().map(|val| *val as f32).collect() };
        OwnedParticles {
            x: convert(&self.x),
            y: convert(&self.y),
            z: convert(&self.z),
        }
    }
}

/// checks the properties that every set of result rows must satisfy
pub fn assert_valid_rows(rows: &[ResultRow], nbins: usize, num_pn: usize, rmax: f64) {
    assert_eq!(rows.len(), nbins);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.pn.len(), num_pn, "row {i}");
        assert!(
            row.pn.iter().all(|p| (0.0..=1.0).contains(p)),
            "row {i} has an entry outside of [0, 1]: {:?}",
            row.pn
        );
        let sum: f64 = row.pn.iter().sum();
        assert!(
            isclose(sum, 1.0, 0.0, 1e-9),
            "row {i} sums to {sum}: {:?}",
            row.pn
        );
        let expected_radius = rmax * ((i + 1) as f64) / (nbins as f64);
        assert!(isclose(row.rmax, expected_radius, 1e-15, 0.0));
        if i > 0 {
            assert!(row.rmax > rows[i - 1].rmax);
        }
    }
    assert_eq!(rows[nbins - 1].rmax, rmax);
}

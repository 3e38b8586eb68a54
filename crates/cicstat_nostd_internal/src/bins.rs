//! Implements [`ShellEdges`], the representation of the concentric shells
//! that a sphere is divided into.
//!
//! Shell `i` has an outer radius of `rmax * (i + 1) / n_shells`. Unlike the
//! distance bins of a two-point calculation, the shells are cumulative: a
//! particle that lies within shell `i` also lies within every shell with a
//! larger index. We exploit this by only recording the innermost shell that
//! contains each particle and computing a prefix-sum afterwards.

use crate::real::Real;

/// Compute the outer radius of shell `i`
///
/// The outermost radius is exactly `rmax` (we avoid computing
/// `rmax * n / n`, which isn't guaranteed to round-trip).
pub fn shell_outer_radius(rmax: f64, n_shells: usize, i: usize) -> f64 {
    if i + 1 == n_shells {
        rmax
    } else {
        rmax * ((i + 1) as f64) / (n_shells as f64)
    }
}

/// Fill `out` with the squared outer radius of every shell, converted to the
/// working precision. The number of shells is given by `out.len()`.
pub fn fill_squared_shell_radii<T: Real>(rmax: f64, out: &mut [T]) {
    let n_shells = out.len();
    for (i, val) in out.iter_mut().enumerate() {
        let r = shell_outer_radius(rmax, n_shells, i);
        *val = T::from_f64(r * r);
    }
}

/// The squared outer radii of each shell.
///
/// This borrows the squared radii (rather than holding a vector) so that we
/// don't need an allocator.
#[derive(Clone, Copy)]
pub struct ShellEdges<'a, T: Real> {
    rmax: f64,
    squared_radii: &'a [T],
}

impl<'a, T: Real> ShellEdges<'a, T> {
    /// `squared_radii` should generally be filled by [`fill_squared_shell_radii`]
    pub fn new(rmax: f64, squared_radii: &'a [T]) -> Result<ShellEdges<'a, T>, &'static str> {
        if !(rmax.is_finite() && rmax > 0.0) {
            Err("rmax must be positive and finite")
        } else if squared_radii.is_empty() {
            Err("at least one shell is required")
        } else if squared_radii
            .iter()
            .any(|r2| !r2.is_finite() || *r2 <= T::ZERO)
        {
            Err("squared shell radii must be positive and finite")
        } else if squared_radii.windows(2).any(|pair| pair[1] <= pair[0]) {
            // this can occur when converting to f32 with lots of shells
            Err("squared shell radii must be strictly increasing")
        } else {
            Ok(Self {
                rmax,
                squared_radii,
            })
        }
    }

    #[inline(always)]
    pub fn n_shells(&self) -> usize {
        self.squared_radii.len()
    }

    pub fn rmax(&self) -> f64 {
        self.rmax
    }

    /// the (unsquared) outer radius of shell `i`, in double precision
    pub fn outer_radius(&self, i: usize) -> f64 {
        shell_outer_radius(self.rmax, self.n_shells(), i)
    }

    #[inline(always)]
    pub fn max_squared_radius(&self) -> T {
        self.squared_radii[self.squared_radii.len() - 1]
    }

    /// Returns the index of the innermost shell that encloses a particle
    /// with the specified squared distance from the center. A particle lying
    /// exactly on a shell's outer radius is enclosed by that shell.
    ///
    /// Returns None if the particle lies outside of the outermost shell.
    #[inline(always)]
    pub fn innermost_shell(&self, distance_squared: T) -> Option<usize> {
        if distance_squared > self.max_squared_radius() {
            None
        } else {
            // the index of the first edge that is not smaller than
            // distance_squared
            Some(self.squared_radii.partition_point(|r2| *r2 < distance_squared))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_radii() {
        assert_eq!(shell_outer_radius(10.0, 4, 0), 2.5);
        assert_eq!(shell_outer_radius(10.0, 4, 3), 10.0);
        // the last radius must be exact even when rmax*n/n doesn't round-trip
        for n in 1..50 {
            assert_eq!(shell_outer_radius(0.1, n, n - 1), 0.1);
        }
        let mut squared = [0.0_f64; 5];
        fill_squared_shell_radii(5.0, &mut squared);
        assert_eq!(squared, [1.0, 4.0, 9.0, 16.0, 25.0]);
    }

    #[test]
    fn shell_edges_invalid_creation() {
        assert!(ShellEdges::new(0.0, &[1.0_f64]).is_err());
        assert!(ShellEdges::new(f64::NAN, &[1.0_f64]).is_err());
        let empty: [f64; 0] = [];
        assert!(ShellEdges::new(1.0, &empty).is_err());
        assert!(ShellEdges::new(2.0, &[1.0_f64, 1.0]).is_err());
        assert!(ShellEdges::new(2.0, &[0.0_f64, 4.0]).is_err());
        assert!(ShellEdges::new(2.0, &[1.0_f64, f64::INFINITY]).is_err());
    }

    #[test]
    fn innermost_shell() {
        let squared = [1.0_f64, 4.0, 9.0];
        let shells = ShellEdges::new(3.0, &squared).unwrap();
        assert_eq!(shells.n_shells(), 3);
        assert_eq!(shells.innermost_shell(0.0), Some(0));
        assert_eq!(shells.innermost_shell(0.5), Some(0));
        // the boundary belongs to the inner shell
        assert_eq!(shells.innermost_shell(1.0), Some(0));
        assert_eq!(shells.innermost_shell(1.5), Some(1));
        assert_eq!(shells.innermost_shell(4.0), Some(1));
        assert_eq!(shells.innermost_shell(8.9), Some(2));
        assert_eq!(shells.innermost_shell(9.0), Some(2));
        assert_eq!(shells.innermost_shell(9.1), None);

        assert_eq!(shells.outer_radius(0), 1.0);
        assert_eq!(shells.outer_radius(2), 3.0);
    }
}

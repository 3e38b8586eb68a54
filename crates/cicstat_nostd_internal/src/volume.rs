//! Describes the domain that sphere centers are drawn from and the distance
//! metric that is used within it.

use crate::points::ParticleSet;
use crate::real::Real;
use rand::Rng;

/// Describes where the centers of the spheres may be drawn when the domain
/// isn't periodic.
///
/// This choice has no effect on periodic domains (any center is valid since
/// the spheres simply wrap around the edges).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Centers are drawn such that every sphere lies entirely inside of the
    /// domain, i.e. each center is at least `rmax` from every face.
    #[default]
    Interior,
    /// Centers are drawn from anywhere in the domain. Spheres that cross a
    /// face of the domain will undercount particles
    Anywhere,
}

/// The (rectangular) domain containing the particles.
///
/// When `periodic` is true, the domain tiles space and separations follow
/// the minimum image convention.
#[derive(Clone, Copy)]
pub struct BoundingVolume<T: Real> {
    origin: [T; 3],
    lengths: [T; 3],
    half_lengths: [T; 3],
    periodic: bool,
}

impl<T: Real> BoundingVolume<T> {
    /// create an instance from explicit per-axis origin & lengths
    pub fn new(origin: [T; 3], lengths: [T; 3], periodic: bool) -> Result<Self, &'static str> {
        if origin.iter().any(|val| !val.is_finite()) {
            Err("the domain origin must be finite")
        } else if lengths.iter().any(|val| !val.is_finite() || *val <= T::ZERO) {
            Err("every domain length must be positive and finite")
        } else {
            Ok(Self {
                origin,
                lengths,
                half_lengths: [
                    lengths[0] * T::HALF,
                    lengths[1] * T::HALF,
                    lengths[2] * T::HALF,
                ],
                periodic,
            })
        }
    }

    /// create a cubical domain with a corner at the origin
    pub fn from_boxsize(boxsize: T, periodic: bool) -> Result<Self, &'static str> {
        Self::new([T::ZERO; 3], [boxsize; 3], periodic)
    }

    /// create a domain from the extent of the particle distribution along
    /// each axis
    pub fn from_particle_extents(
        particles: &ParticleSet<T>,
        periodic: bool,
    ) -> Result<Self, &'static str> {
        let (min, max) = particles.extrema();
        let lengths = [max[0] - min[0], max[1] - min[1], max[2] - min[2]];
        if lengths.iter().any(|val| *val <= T::ZERO) {
            Err("the particles must span a nonzero extent along every axis")
        } else {
            Self::new(min, lengths, periodic)
        }
    }

    #[inline(always)]
    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    pub fn origin(&self) -> [T; 3] {
        self.origin
    }

    pub fn lengths(&self) -> [T; 3] {
        self.lengths
    }

    /// the volume of the domain (always computed in double precision)
    pub fn volume(&self) -> f64 {
        self.lengths[0].to_f64() * self.lengths[1].to_f64() * self.lengths[2].to_f64()
    }

    /// the smallest domain length
    pub fn min_length(&self) -> f64 {
        let [a, b, c] = self.lengths.map(Real::to_f64);
        a.min(b).min(c)
    }

    /// returns whether `pos` lies within the closed domain
    pub fn contains(&self, pos: [T; 3]) -> bool {
        (0..3).all(|k| pos[k] >= self.origin[k] && pos[k] <= self.origin[k] + self.lengths[k])
    }

    /// Apply the minimum image convention (when periodic) to the displacement
    /// along `axis`. The result lies in `(-L/2, L/2]`.
    ///
    /// This assumes that `|disp| < L`, which holds whenever both points lie
    /// inside the domain.
    #[inline(always)]
    pub fn wrap_displacement(&self, axis: usize, disp: T) -> T {
        if !self.periodic {
            disp
        } else if disp > self.half_lengths[axis] {
            disp - self.lengths[axis]
        } else if disp <= -self.half_lengths[axis] {
            disp + self.lengths[axis]
        } else {
            disp
        }
    }

    /// The squared separation between 2 points.
    ///
    /// Every count kernel must produce exactly the same sequence of floating
    /// point operations as this function.
    #[inline(always)]
    pub fn separation_squared(&self, a: [T; 3], b: [T; 3]) -> T {
        let dx = self.wrap_displacement(0, a[0] - b[0]);
        let dy = self.wrap_displacement(1, a[1] - b[1]);
        let dz = self.wrap_displacement(2, a[2] - b[2]);
        dx * dx + dy * dy + dz * dz
    }

    /// Checks whether spheres of radius `rmax` can be placed in this domain.
    ///
    /// Only a non-periodic domain using [`EdgePolicy::Interior`] constrains
    /// `rmax`: a sphere must fit inside the domain. Any radius is valid in a
    /// periodic domain (see [`Self::exceeds_half_length`]).
    pub fn check_sphere_fits(&self, rmax: f64, policy: EdgePolicy) -> Result<(), &'static str> {
        if !self.periodic && policy == EdgePolicy::Interior && 2.0 * rmax >= self.min_length() {
            Err("a sphere of radius rmax doesn't fit inside the domain")
        } else {
            Ok(())
        }
    }

    /// Returns whether a periodic sphere of radius `rmax` is wider than the
    /// domain along some axis. Such a sphere only ever sees the nearest image
    /// of each particle, so a particle is counted at most once.
    pub fn exceeds_half_length(&self, rmax: f64) -> bool {
        self.periodic && 2.0 * rmax > self.min_length()
    }

    /// Draw a sphere center.
    ///
    /// Each axis is drawn independently & uniformly. The draws are made in
    /// the working precision.
    #[inline]
    pub fn draw_center<G: Rng + ?Sized>(
        &self,
        rng: &mut G,
        rmax: T,
        policy: EdgePolicy,
    ) -> [T; 3] {
        let mut center = [T::ZERO; 3];
        for (k, coord) in center.iter_mut().enumerate() {
            let u = T::sample_unit(rng);
            *coord = if self.periodic || policy == EdgePolicy::Anywhere {
                self.origin[k] + u * self.lengths[k]
            } else {
                let span = self.lengths[k] - rmax - rmax;
                self.origin[k] + rmax + u * span
            };
        }
        center
    }
}

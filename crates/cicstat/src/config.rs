//! Configuration of a counts-in-cells calculation.
//!
//! [`VpfConfig`] holds every parameter that affects the result. Parameters
//! that only affect performance live in [`crate::RuntimeSpec`].

use crate::{Error, SeedChoice};
use cicstat_nostd_internal::EdgePolicy;

/// The validated parameters of a counts-in-cells calculation.
///
/// Use [`VpfBuilder`] to construct an instance.
#[derive(Clone, Debug, PartialEq)]
pub struct VpfConfig {
    rmax: f64,
    nbins: usize,
    nspheres: usize,
    num_pn: usize,
    seed: SeedChoice,
    periodic: bool,
    boxsize: f64,
    edge_policy: EdgePolicy,
}

impl VpfConfig {
    /// the radius of the largest shell
    pub fn rmax(&self) -> f64 {
        self.rmax
    }

    /// the number of concentric shells
    pub fn nbins(&self) -> usize {
        self.nbins
    }

    /// the number of spheres to draw
    pub fn nspheres(&self) -> usize {
        self.nspheres
    }

    /// the number of probabilities reported per shell
    pub fn num_pn(&self) -> usize {
        self.num_pn
    }

    pub fn seed(&self) -> SeedChoice {
        self.seed
    }

    pub fn periodic(&self) -> bool {
        self.periodic
    }

    /// The side length of the cubical domain. A value of 0 means that the
    /// domain is derived from the extent of the particles.
    pub fn boxsize(&self) -> f64 {
        self.boxsize
    }

    pub fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }
}

/// Used to construct a [`VpfConfig`]
///
/// # Examples
/// ```
/// use cicstat::VpfBuilder;
/// let config = VpfBuilder::new()
///     .rmax(10.0)
///     .nbins(10)
///     .nspheres(10000)
///     .num_pn(6)
///     .seed(42)
///     .boxsize(420.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.nbins(), 10);
/// ```
#[derive(Clone, Debug)]
pub struct VpfBuilder {
    rmax: Option<f64>,
    nbins: Option<usize>,
    nspheres: Option<usize>,
    num_pn: Option<usize>,
    seed: SeedChoice,
    periodic: bool,
    boxsize: f64,
    edge_policy: EdgePolicy,
}

impl Default for VpfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VpfBuilder {
    pub fn new() -> VpfBuilder {
        VpfBuilder {
            rmax: None,
            nbins: None,
            nspheres: None,
            num_pn: None,
            seed: SeedChoice::default(),
            periodic: true,
            boxsize: 0.0,
            edge_policy: EdgePolicy::default(),
        }
    }

    pub fn rmax(&mut self, rmax: f64) -> &mut Self {
        self.rmax = Some(rmax);
        self
    }

    pub fn nbins(&mut self, nbins: usize) -> &mut Self {
        self.nbins = Some(nbins);
        self
    }

    pub fn nspheres(&mut self, nspheres: usize) -> &mut Self {
        self.nspheres = Some(nspheres);
        self
    }

    pub fn num_pn(&mut self, num_pn: usize) -> &mut Self {
        self.num_pn = Some(num_pn);
        self
    }

    /// positive values are used verbatim. Zero or negative values select a
    /// seed from the wall clock.
    pub fn seed(&mut self, seed: i64) -> &mut Self {
        self.seed = SeedChoice::from_signed(seed);
        self
    }

    pub fn seed_choice(&mut self, seed: SeedChoice) -> &mut Self {
        self.seed = seed;
        self
    }

    pub fn periodic(&mut self, periodic: bool) -> &mut Self {
        self.periodic = periodic;
        self
    }

    /// 0 (the default) means that the domain is derived from the particles
    pub fn boxsize(&mut self, boxsize: f64) -> &mut Self {
        self.boxsize = boxsize;
        self
    }

    /// only matters for non-periodic domains
    pub fn edge_policy(&mut self, edge_policy: EdgePolicy) -> &mut Self {
        self.edge_policy = edge_policy;
        self
    }

    pub fn build(&self) -> Result<VpfConfig, Error> {
        let Some(rmax) = self.rmax else {
            return Err(Error::argument("rmax", "was not specified"));
        };
        let Some(nbins) = self.nbins else {
            return Err(Error::argument("nbins", "was not specified"));
        };
        let Some(nspheres) = self.nspheres else {
            return Err(Error::argument("nspheres", "was not specified"));
        };
        let Some(num_pn) = self.num_pn else {
            return Err(Error::argument("num_pN", "was not specified"));
        };

        if !(rmax.is_finite() && rmax > 0.0) {
            Err(Error::argument(
                "rmax",
                format!("{rmax} isn't a positive, finite value"),
            ))
        } else if nbins == 0 {
            Err(Error::argument("nbins", "at least 1 shell is required"))
        } else if num_pn == 0 {
            Err(Error::argument("num_pN", "must be at least 1"))
        } else if !(self.boxsize.is_finite() && self.boxsize >= 0.0) {
            Err(Error::argument(
                "boxsize",
                format!("{} is negative or not finite", self.boxsize),
            ))
        } else {
            Ok(VpfConfig {
                rmax,
                nbins,
                nspheres,
                num_pn,
                seed: self.seed,
                periodic: self.periodic,
                boxsize: self.boxsize,
                edge_policy: self.edge_policy,
            })
        }
    }
}

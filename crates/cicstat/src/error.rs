// The error-handling follows the same approach as our other crates: the
// internal crate returns `&'static str` everywhere and the public crate
// defines a single opaque Error type that wraps a private ErrorKind.
//
// Callers that need to branch on the kind of failure should use
// [`Error::category`]. We intentionally avoid exposing ErrorKind so that we
// are free to reorganize the individual error structs.

/// The broad classes of failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// An argument (or combination of arguments) is invalid
    InvalidArgument,
    /// The requested spheres can't be placed in the domain
    InfeasibleSampling,
    /// Something went wrong while carrying out the calculation
    Computation,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The underlying internal error type
#[non_exhaustive]
#[derive(Clone, Debug)]
enum ErrorKind {
    /// An error that occurs when an argument has a bad value
    Argument(ArgumentError),
    /// An error that occurs when an unknown instruction set name is given
    IsaName(IsaNameError),
    /// An error that occurs when the spheres collectively occupy more volume
    /// than the domain
    VolumeFeasibility(VolumeFeasibilityError),
    /// An error that occurs when an individual sphere is too large for the
    /// domain
    SphereFit(SphereFitError),
    /// An error that occurs when too few candidate centers lie within the
    /// footprint described by the randoms
    Footprint(FootprintError),
    /// An error that occurs while setting up the thread pool
    ThreadPool(ThreadPoolError),
    /// An error that occurs within `cicstat_nostd_internal` that doesn't
    /// stem from invalid arguments. If this occurs, there is probably a bug
    InternalLegacyAdHoc(InternalLegacyAdHocError),
}

// define constructor methods for Error
impl Error {
    /// produce an error indicating that `who` has a bad value
    pub(crate) fn argument(who: &'static str, what: impl Into<String>) -> Self {
        Error {
            kind: ErrorKind::Argument(ArgumentError {
                who,
                what: what.into(),
            }),
        }
    }

    /// produce an error indicating that an unknown instruction set was named
    pub(crate) fn isa_name(actual: &str, choices: &[&'static str]) -> Self {
        Error {
            kind: ErrorKind::IsaName(IsaNameError {
                actual: actual.to_owned(),
                choices: choices.to_vec(),
            }),
        }
    }

    /// produce an error indicating that the total volume of the spheres
    /// exceeds the volume of the domain
    pub(crate) fn volume_feasibility(nspheres: usize, rmax: f64, domain_volume: f64) -> Self {
        Error {
            kind: ErrorKind::VolumeFeasibility(VolumeFeasibilityError {
                nspheres,
                rmax,
                domain_volume,
            }),
        }
    }

    /// produce an error indicating that an individual sphere doesn't fit
    pub(crate) fn sphere_fit(what: &'static str, rmax: f64, min_length: f64) -> Self {
        Error {
            kind: ErrorKind::SphereFit(SphereFitError {
                what,
                rmax,
                min_length,
            }),
        }
    }

    /// produce an error indicating that not enough sphere centers were found
    /// within the footprint
    pub(crate) fn footprint(what: &'static str, threshold: usize, rmax: f64) -> Self {
        Error {
            kind: ErrorKind::Footprint(FootprintError {
                what,
                threshold,
                rmax,
            }),
        }
    }

    /// produce an error indicating that the thread pool couldn't be built
    pub(crate) fn thread_pool(err: rayon::ThreadPoolBuildError) -> Self {
        Error {
            kind: ErrorKind::ThreadPool(ThreadPoolError(err.to_string())),
        }
    }

    /// wraps a legacy internal error string
    pub(crate) fn internal_legacy_adhoc(message: &'static str) -> Self {
        Error {
            kind: ErrorKind::InternalLegacyAdHoc(InternalLegacyAdHocError(message)),
        }
    }

    /// Reports the broad class of this error
    pub fn category(&self) -> ErrorCategory {
        match self.kind {
            ErrorKind::Argument(_) | ErrorKind::IsaName(_) => ErrorCategory::InvalidArgument,
            ErrorKind::VolumeFeasibility(_)
            | ErrorKind::SphereFit(_)
            | ErrorKind::Footprint(_) => ErrorCategory::InfeasibleSampling,
            ErrorKind::ThreadPool(_) | ErrorKind::InternalLegacyAdHoc(_) => {
                ErrorCategory::Computation
            }
        }
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for ErrorKind {}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::Argument(ref err) => err.fmt(f),
            ErrorKind::IsaName(ref err) => err.fmt(f),
            ErrorKind::VolumeFeasibility(ref err) => err.fmt(f),
            ErrorKind::SphereFit(ref err) => err.fmt(f),
            ErrorKind::Footprint(ref err) => err.fmt(f),
            ErrorKind::ThreadPool(ref err) => err.fmt(f),
            ErrorKind::InternalLegacyAdHoc(ref err) => err.fmt(f),
        }
    }
}

/// An error that occurs when an argument has a bad value
#[derive(Clone, Debug)]
struct ArgumentError {
    who: &'static str,
    what: String,
}

impl std::error::Error for ArgumentError {}

impl core::fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let ArgumentError { who, what } = self;
        write!(f, "problem with {who}: {what}")
    }
}

/// An error that occurs when an unknown instruction set name is given
#[derive(Clone, Debug)]
struct IsaNameError {
    actual: String,
    choices: Vec<&'static str>,
}

impl std::error::Error for IsaNameError {}

impl core::fmt::Display for IsaNameError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "\"{}\" is not an instruction set name. Choices include: {:?}",
            self.actual, self.choices
        )
    }
}

/// An error that occurs when the spheres collectively occupy more volume
/// than the domain
#[derive(Clone, Debug)]
struct VolumeFeasibilityError {
    nspheres: usize,
    rmax: f64,
    domain_volume: f64,
}

impl std::error::Error for VolumeFeasibilityError {}

impl core::fmt::Display for VolumeFeasibilityError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let sphere_volume = 4.0 * std::f64::consts::PI * self.rmax.powi(3) / 3.0;
        let total = (self.nspheres as f64) * sphere_volume;
        write!(
            f,
            "{} spheres of radius {} occupy a volume of {:e}, which exceeds \
             the domain volume of {:e}. Reduce nspheres or rmax",
            self.nspheres, self.rmax, total, self.domain_volume
        )
    }
}

/// An error that occurs when an individual sphere is too large for the domain
#[derive(Clone, Debug)]
struct SphereFitError {
    what: &'static str,
    rmax: f64,
    min_length: f64,
}

impl std::error::Error for SphereFitError {}

impl core::fmt::Display for SphereFitError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} (rmax = {}, shortest domain length = {})",
            self.what, self.rmax, self.min_length
        )
    }
}

/// An error that occurs when too few candidate centers lie within the
/// footprint
#[derive(Clone, Debug)]
struct FootprintError {
    what: &'static str,
    threshold: usize,
    rmax: f64,
}

impl std::error::Error for FootprintError {}

impl core::fmt::Display for FootprintError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} (threshold = {} randoms, rmax = {})",
            self.what, self.threshold, self.rmax
        )
    }
}

#[derive(Clone, Debug)]
struct ThreadPoolError(String);

impl std::error::Error for ThreadPoolError {}

impl core::fmt::Display for ThreadPoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "failed to create thread pool: {}", self.0)
    }
}

/// A temporary type that wraps the string errors from
/// `cicstat_nostd_internal`.
#[derive(Clone)]
struct InternalLegacyAdHocError(&'static str);

impl std::error::Error for InternalLegacyAdHocError {}

impl core::fmt::Display for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::fmt::Debug for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.0, f)
    }
}

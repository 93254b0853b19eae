// We define separate error handling for the public crate and the internal
// crate. The internal crate returns `&'static str` everywhere (it's no_std and
// its constructors are the only fallible functions). The public crate does
// all of the up-front validation and wraps anything that slips through from
// the internal crate.
//
// Every failure that this crate reports is a fatal problem with the inputs.
// None of them are recoverable in the sense that retrying would help.

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The underlying internal error type
#[non_exhaustive]
#[derive(Clone, Debug)]
enum ErrorKind {
    /// An error that occurs when an integer lies outside of the acceptable
    /// range of values
    IntegerRange(IntegerRangeError),
    /// An error that occurs within `bispec_nostd_internal`
    ///
    /// The idea is to wrap the stringly errors produced by the internal
    /// crate.
    InternalLegacyAdHoc(InternalLegacyAdHocError),
    /// An error that occurs when a scale factor can't be used (it must be
    /// positive and finite so that we can take its square root)
    ScaleFactor(ScaleFactorError),
    /// An error that occurs when a precomputed table is too short
    TableShape(TableShapeError),
    /// An error that occurs when the workshare fraction is invalid
    Workshare(WorkshareError),
}

// define constructor methods for Error
impl Error {
    /// produce an error indicating that an integer lies outside the acceptable
    /// range of values
    pub(crate) fn integer_range(
        description: &'static str,
        actual: i64,
        min_val: i64,
        max_val: i64,
    ) -> Self {
        Error {
            kind: ErrorKind::IntegerRange(IntegerRangeError {
                description,
                actual,
                min_val,
                max_val,
            }),
        }
    }

    /// wraps a legacy internal error string
    pub(crate) fn internal_legacy_adhoc(message: &'static str) -> Self {
        Error {
            kind: ErrorKind::InternalLegacyAdHoc(InternalLegacyAdHocError(message)),
        }
    }

    /// produce an error indicating that the scale factor for `degree` isn't
    /// positive & finite
    pub(crate) fn scale_factor(degree: usize, value: f64) -> Self {
        Error {
            kind: ErrorKind::ScaleFactor(ScaleFactorError { degree, value }),
        }
    }

    /// produce an error indicating that a table has the wrong length
    pub(crate) fn table_shape(name: &'static str, expected: usize, actual: usize) -> Self {
        Error {
            kind: ErrorKind::TableShape(TableShapeError {
                name,
                expected,
                actual,
            }),
        }
    }

    /// produce an error indicating that the workshare fraction is invalid
    pub(crate) fn workshare(actual: f64) -> Self {
        Error {
            kind: ErrorKind::Workshare(WorkshareError { actual }),
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
            ErrorKind::IntegerRange(ref err) => err.fmt(f),
            ErrorKind::InternalLegacyAdHoc(ref msg) => msg.fmt(f),
            ErrorKind::ScaleFactor(ref err) => err.fmt(f),
            ErrorKind::TableShape(ref err) => err.fmt(f),
            ErrorKind::Workshare(ref err) => err.fmt(f),
        }
    }
}

/// An error that occurs when an integer lies outside of the acceptable
/// range of values
#[derive(Clone, Debug)]
struct IntegerRangeError {
    description: &'static str,
    actual: i64,
    min_val: i64,
    max_val: i64,
}

impl std::error::Error for IntegerRangeError {}

impl core::fmt::Display for IntegerRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} has a value of {}. The value should be no less than {} and \
             not exceed {}",
            self.description, self.actual, self.min_val, self.max_val
        )
    }
}

/// A type that wraps the string errors from `bispec_nostd_internal`
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

/// An error that occurs when a scale factor isn't positive & finite
#[derive(Clone, Debug)]
struct ScaleFactorError {
    degree: usize,
    value: f64,
}

impl std::error::Error for ScaleFactorError {}

impl core::fmt::Display for ScaleFactorError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let ScaleFactorError { degree, value } = self;
        write!(
            f,
            "the scale factor for degree {degree} is {value}. It must be positive and finite"
        )
    }
}

/// An error that occurs when a precomputed table is too short
#[derive(Clone, Debug)]
struct TableShapeError {
    name: &'static str,
    expected: usize,
    actual: usize,
}

impl std::error::Error for TableShapeError {}

impl core::fmt::Display for TableShapeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} has {} entries. It needs at least {}",
            self.name, self.actual, self.expected
        )
    }
}

/// An error that occurs when the workshare fraction isn't in `[0, 1]`
#[derive(Clone, Debug)]
struct WorkshareError {
    actual: f64,
}

impl std::error::Error for WorkshareError {}

impl core::fmt::Display for WorkshareError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "workshare has a value of {}. It must lie between 0 and 1",
            self.actual
        )
    }
}

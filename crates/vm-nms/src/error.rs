use core::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Threshold is negative or not finite.
    InvalidThreshold(f32),
    /// Neither maxima nor minima are enabled.
    NoPolarity,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidThreshold(value) => {
                write!(f, "threshold must be finite and >= 0, got {value}")
            }
            Self::NoPolarity => write!(f, "at least one of maxima/minima detection must be enabled"),
        }
    }
}

impl std::error::Error for Error {}

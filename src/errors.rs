use std::{error, fmt};

/// An error from the harness itself: a bad run request, an unloadable test
/// source, or a failed container resolution. Distinct from a [Fault][f],
/// which is a failure raised by a test body.
///
/// [f]: crate::check::Fault
pub struct EngineError(pub String);

impl fmt::Debug for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError(err.to_string())
    }
}

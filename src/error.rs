use thiserror::Error;

/// Errors raised while loading or validating a background configuration.
///
/// The animation core itself never fails; only the configuration surface and
/// the terminal host deal in errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid color {0:?}: expected \"r, g, b\" with components in 0..=255")]
    InvalidColor(String),

    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("yaml error: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

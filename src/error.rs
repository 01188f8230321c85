use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed xml at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("xliff document contains bytes that are not valid {encoding}")]
    Encoding { encoding: &'static str },

    #[error("xliff document declares an unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("failed to read glossary {}: {message}", .path.display())]
    Glossary { path: PathBuf, message: String },

    #[error("fuzzy cutoff must be within [0, 1], got {0}")]
    InvalidCutoff(f64),

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn xml(position: u64, message: impl Into<String>) -> Self {
        Self::Xml {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn glossary(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Glossary {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the run was aborted because an input could not be parsed or decoded.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Xml { .. }
                | Self::Encoding { .. }
                | Self::UnsupportedEncoding(_)
                | Self::Glossary { .. }
        )
    }
}

//! Error types for case writing.

use std::fmt;
use std::io;
use std::path::PathBuf;

use cfdcase_core::ValidationError;

/// Errors that can occur while writing a case directory.
#[derive(Debug)]
pub enum WriteError {
    /// The case model is invalid or incomplete. Carries every problem
    /// found, never only the first.
    Validation(Vec<ValidationError>),
    /// A filesystem operation failed. The previous directory contents are
    /// left in place.
    Io {
        /// The path being written, moved, or read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// An external process is running against the case; writing now could
    /// change files under it.
    Busy,
}

impl WriteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The validation problems, if this is a validation failure.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(errors) => {
                write!(f, "case is not valid ({} problem", errors.len())?;
                if errors.len() != 1 {
                    f.write_str("s")?;
                }
                f.write_str(")")?;
                for e in errors {
                    write!(f, "\n  - {e}")?;
                }
                Ok(())
            }
            Self::Io { path, source } => write!(f, "I/O error at {}: {source}", path.display()),
            Self::Busy => write!(f, "an external process is running against this case"),
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfdcase_core::EntityRef;

    #[test]
    fn validation_display_lists_every_problem() {
        let err = WriteError::Validation(vec![
            ValidationError::MissingValue {
                entity: EntityRef::Boundary("a".into()),
                field: "x".into(),
            },
            ValidationError::MissingValue {
                entity: EntityRef::Boundary("b".into()),
                field: "y".into(),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("case is not valid (2 problems)"));
        assert_eq!(text.lines().count(), 3);
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn io_error_has_source() {
        use std::error::Error;
        let err = WriteError::io("/x", io::Error::other("boom"));
        assert!(err.source().is_some());
        assert!(err.validation_errors().is_empty());
    }
}

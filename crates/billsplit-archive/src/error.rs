//! Error types for archive operations

use thiserror::Error;
use zip::result::ZipError;

/// Errors that can occur during archive operations
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// IO error during archive operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid ZIP archive format
    #[error("Invalid ZIP archive: {0}")]
    InvalidZip(#[from] ZipError),

    /// Archive is password-protected
    #[error("Archive is password-protected")]
    PasswordProtected,
}

impl ArchiveError {
    /// Map a ZIP error, singling out entries that need a password.
    pub(crate) fn from_zip(err: ZipError) -> Self {
        match err {
            ZipError::UnsupportedArchive(msg) if msg == ZipError::PASSWORD_REQUIRED => Self::PasswordProtected,
            ZipError::InvalidPassword => Self::PasswordProtected,
            other => Self::InvalidZip(other),
        }
    }
}

impl From<ArchiveError> for billsplit_core::BillsplitError {
    fn from(err: ArchiveError) -> Self {
        Self::ArchiveOpen {
            path: "<root>".to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_required_is_password_protected() {
        let err = ArchiveError::from_zip(ZipError::UnsupportedArchive(ZipError::PASSWORD_REQUIRED));
        assert!(matches!(err, ArchiveError::PasswordProtected));
        assert!(matches!(
            ArchiveError::from_zip(ZipError::FileNotFound),
            ArchiveError::InvalidZip(ZipError::FileNotFound)
        ));
    }

    #[test]
    fn test_conversion_to_pipeline_error() {
        let err: billsplit_core::BillsplitError = ArchiveError::PasswordProtected.into();
        assert!(err.to_string().contains("password-protected"));
    }
}

//! Size limits applied to uploads.

use crate::{Error, Result};

/// Room left in the request body for multipart framing and small text fields.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Size limits enforced while reading an upload.
///
/// The file limit is checked against the bytes of the file part itself, the
/// body limit caps the whole request so that oversized parts in other fields
/// are rejected before they are buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    max_file_size: u64,
    max_body_size: usize,
}

impl UploadLimits {
    /// Creates limits for the given file size in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the derived body limit does not fit in `usize`.
    pub fn new(max_file_size: u64) -> Result<Self> {
        let max_body_size = usize::try_from(max_file_size)
            .ok()
            .and_then(|size| size.checked_add(MULTIPART_OVERHEAD))
            .ok_or_else(|| {
                Error::invalid_setting(
                    "max_file_size",
                    format!("{max_file_size} bytes exceeds the addressable body size"),
                )
            })?;

        Ok(Self {
            max_file_size,
            max_body_size,
        })
    }

    /// Returns the maximum size of the uploaded file in bytes.
    #[inline]
    pub const fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Returns the maximum size of the whole request body in bytes.
    #[inline]
    pub const fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Returns whether `size` bytes exceed the file limit.
    #[inline]
    pub const fn exceeds_file_size(&self, size: u64) -> bool {
        size > self.max_file_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_limit_includes_overhead() {
        let limits = UploadLimits::new(1024).unwrap();
        assert_eq!(limits.max_file_size(), 1024);
        assert_eq!(limits.max_body_size(), 1024 + MULTIPART_OVERHEAD);
    }

    #[test]
    fn file_limit_is_inclusive() {
        let limits = UploadLimits::new(5).unwrap();
        assert!(!limits.exceeds_file_size(5));
        assert!(limits.exceeds_file_size(6));
    }

    #[test]
    fn reject_overflowing_limit() {
        assert!(UploadLimits::new(u64::MAX).is_err());
    }
}

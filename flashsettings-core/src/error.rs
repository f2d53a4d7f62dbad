//! Error types for loading settings

use flashsettings_hal::EepromError;

/// Why stored settings were rejected
///
/// Every variant leaves the in-memory record untouched, so the caller keeps
/// running on the defaults it constructed the record with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Stored record size differs from the compiled record size
    ///
    /// The record layout changed (e.g. firmware update added a field) or the
    /// storage was never written.
    SizeMismatch {
        /// Size field found in storage
        stored: u16,
        /// Size of the record as compiled
        expected: u16,
    },
    /// Stored checksum does not match the stored bytes
    ChecksumMismatch {
        /// Checksum field found in storage
        stored: u16,
        /// Checksum recomputed over the stored image
        computed: u16,
    },
    /// Storage device failed
    Storage(EepromError),
}

impl From<EepromError> for LoadError {
    fn from(e: EepromError) -> Self {
        LoadError::Storage(e)
    }
}

impl LoadError {
    /// True when data was read but judged invalid (as opposed to an I/O
    /// failure)
    pub fn is_invalid_data(&self) -> bool {
        matches!(
            self,
            LoadError::SizeMismatch { .. } | LoadError::ChecksumMismatch { .. }
        )
    }
}

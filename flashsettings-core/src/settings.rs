//! Settings persistence engine
//!
//! [`FlashSettings`] owns a storage device, an [`Envelope`] and the user's
//! payload. The payload is any flat `#[repr(C)]` aggregate deriving
//! [`bytemuck::Pod`], which guarantees at compile time that it has no
//! padding, no pointers and accepts every bit pattern, so its bytes can be
//! stored and restored verbatim.
//!
//! Typical use from a control loop:
//!
//! ```text
//! startup:   settings = FlashSettings::new(eeprom)
//!            settings.load()        // false -> running on defaults
//! each loop: settings.field = ...
//!            settings.save()?       // writes only if something changed
//! ```

use core::mem::size_of;
use core::ops::{Deref, DerefMut};

use bytemuck::Pod;
use flashsettings_hal::{Eeprom, EepromError};

use crate::envelope::Envelope;
use crate::error::LoadError;

/// Storage partition reserved for the record unless specified otherwise
pub const DEFAULT_PARTITION_SIZE: usize = 512;

/// Storage offset of the record
pub const BASE_OFFSET: usize = 0;

/// Result of a conditional save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SaveOutcome {
    /// Record matched what was last loaded or written; storage untouched
    Unchanged,
    /// Record was written and committed
    Written,
}

/// A settings record persisted at offset 0 of an EEPROM
///
/// - `S`: storage device
/// - `T`: payload, the caller's settings fields
/// - `PARTITION_SIZE`: bytes reserved on the device for the record
///
/// The stored record is the 4-byte envelope followed by the payload bytes,
/// `RECORD_SIZE = 4 + size_of::<T>()` bytes in total. A record that does
/// not fit in `PARTITION_SIZE` (or whose size does not fit the 16-bit size
/// field) fails the build.
///
/// Payload fields are reachable directly through `Deref`/`DerefMut`; writes
/// are not tracked, change detection compares checksums.
///
/// # Changes the checksum cannot see
///
/// Fletcher-16 sums bytes modulo 255, so a byte going from `0x00` to `0xFF`
/// (or back) leaves the checksum unchanged and [`save`](Self::save) reports
/// [`SaveOutcome::Unchanged`]. Other changes to several bytes at once can
/// cancel out the same way. A field whose only states are `0` and `255`
/// should use other values (`0`/`1`), or the caller should follow such an
/// edit with [`mark_dirty`](Self::mark_dirty) so the next save writes.
///
/// Payloads that are not plain data are rejected at compile time:
///
/// ```compile_fail
/// use flashsettings_core::FlashSettings;
/// use flashsettings_hal::MemEeprom;
///
/// #[derive(Clone, Copy, Default)]
/// struct Named {
///     name: &'static str,
/// }
///
/// let mut settings: FlashSettings<_, Named> = FlashSettings::new(MemEeprom::<512>::new());
/// settings.load();
/// ```
///
/// So are records larger than the partition:
///
/// ```compile_fail
/// use flashsettings_core::FlashSettings;
/// use flashsettings_hal::MemEeprom;
///
/// // 4 + 512 bytes in the default 512-byte partition
/// let settings: FlashSettings<_, [u8; 512]> =
///     FlashSettings::with_defaults(MemEeprom::<512>::new(), [0; 512]);
/// # drop(settings);
/// ```
///
/// and records whose size overflows the 16-bit size field, whatever the
/// partition:
///
/// ```compile_fail
/// use flashsettings_core::FlashSettings;
/// use flashsettings_hal::MemEeprom;
///
/// type Huge = [[u8; 1024]; 64];
///
/// let settings: FlashSettings<_, Huge, 70_000> =
///     FlashSettings::with_defaults(MemEeprom::<70_000>::new(), [[0; 1024]; 64]);
/// # drop(settings);
/// ```
pub struct FlashSettings<S, T, const PARTITION_SIZE: usize = DEFAULT_PARTITION_SIZE> {
    storage: S,
    envelope: Envelope,
    payload: T,
    /// A save computed a new checksum but failed to reach storage
    unsynced: bool,
}

impl<S, T, const P: usize> FlashSettings<S, T, P>
where
    S: Eeprom,
    T: Pod,
{
    /// Size of the stored record (envelope + payload)
    pub const RECORD_SIZE: usize = Envelope::SIZE + size_of::<T>();

    /// Bytes reserved on the device
    pub const PARTITION_SIZE: usize = P;

    const LAYOUT_CHECK: () = {
        assert!(
            Self::RECORD_SIZE <= P,
            "settings record does not fit in the storage partition"
        );
        assert!(
            Self::RECORD_SIZE <= u16::MAX as usize,
            "settings record too large for the 16-bit size field"
        );
    };

    /// Create a record holding `defaults`
    ///
    /// Storage is not touched until [`load`](Self::load) or
    /// [`save`](Self::save).
    pub fn with_defaults(storage: S, defaults: T) -> Self {
        let () = Self::LAYOUT_CHECK;

        Self {
            storage,
            envelope: Envelope::new(Self::RECORD_SIZE as u16),
            payload: defaults,
            unsynced: false,
        }
    }

    /// Load the record from storage
    ///
    /// Returns `true` if the stored record was accepted and copied over the
    /// in-memory record, `false` if the defaults remain in effect. Use
    /// [`try_load`](Self::try_load) to find out why a record was rejected.
    pub fn load(&mut self) -> bool {
        match self.try_load() {
            Ok(()) => {
                info!("Loaded settings ({} bytes) from storage", Self::RECORD_SIZE);
                true
            }
            Err(e) => {
                warn!("Stored settings rejected: {:?}, using defaults", e);
                false
            }
        }
    }

    /// Load the record from storage, reporting why it was rejected
    ///
    /// Reads `RECORD_SIZE` bytes from offset 0 and accepts them only if the
    /// stored size equals `RECORD_SIZE` and the stored checksum matches the
    /// recomputed one. On success the envelope and payload are overwritten
    /// in one step; on any error the in-memory record is left as it was.
    pub fn try_load(&mut self) -> Result<(), LoadError> {
        self.storage.init(P)?;

        let mut header = [0u8; Envelope::SIZE];
        let mut scratch = T::zeroed();
        self.storage.read(BASE_OFFSET, &mut header)?;
        self.storage
            .read(BASE_OFFSET + Envelope::SIZE, bytemuck::bytes_of_mut(&mut scratch))?;

        let stored = Envelope::from_bytes(header);
        debug!(
            "Stored envelope: size={}, checksum={:#x}",
            stored.size,
            stored.checksum
        );

        if stored.size as usize != Self::RECORD_SIZE {
            return Err(LoadError::SizeMismatch {
                stored: stored.size,
                expected: Self::RECORD_SIZE as u16,
            });
        }

        let computed = stored.checksum_with(bytemuck::bytes_of(&scratch));
        if computed != stored.checksum {
            return Err(LoadError::ChecksumMismatch {
                stored: stored.checksum,
                computed,
            });
        }

        self.envelope = stored;
        self.payload = scratch;
        self.unsynced = false;
        Ok(())
    }

    /// Write the record to storage if it changed
    ///
    /// Recomputes the checksum and stores it in the envelope. If it equals
    /// the previous value (and the last write did not fail) nothing is
    /// written. Otherwise the full record is written at offset 0 and
    /// committed.
    ///
    /// Cheap enough to call on every iteration of a control loop.
    ///
    /// Only changes that alter the checksum are seen: setting a byte from
    /// `0x00` to `0xFF` or back is not. Call [`mark_dirty`](Self::mark_dirty)
    /// first when such an edit must reach storage.
    pub fn save(&mut self) -> Result<SaveOutcome, EepromError> {
        let previous = self.envelope.checksum;
        self.envelope.checksum = self.compute_checksum();

        if self.envelope.checksum == previous && !self.unsynced {
            return Ok(SaveOutcome::Unchanged);
        }

        self.unsynced = true;
        self.write_record()?;
        self.unsynced = false;

        debug!(
            "Saved settings ({} bytes), checksum={:#x}",
            Self::RECORD_SIZE,
            self.envelope.checksum
        );
        Ok(SaveOutcome::Written)
    }

    /// Make the next [`save`](Self::save) write even if the checksum matches
    pub fn mark_dirty(&mut self) {
        self.unsynced = true;
    }

    /// Whether [`save`](Self::save) would write to storage
    pub fn is_dirty(&self) -> bool {
        self.unsynced || self.compute_checksum() != self.envelope.checksum
    }

    /// Checksum of the current record, with the checksum field taken as zero
    ///
    /// Does not modify the record.
    pub fn compute_checksum(&self) -> u16 {
        self.envelope.checksum_with(bytemuck::bytes_of(&self.payload))
    }

    /// Copy the record image, as it would be stored, into `out`
    ///
    /// Returns the number of bytes written (`RECORD_SIZE`), or `None` if
    /// `out` is too small. The checksum field holds whatever the envelope
    /// currently holds, i.e. the value from the last load or save.
    pub fn write_image(&self, out: &mut [u8]) -> Option<usize> {
        let image = out.get_mut(..Self::RECORD_SIZE)?;
        let (header, payload) = image.split_at_mut(Envelope::SIZE);
        header.copy_from_slice(&self.envelope.to_bytes());
        payload.copy_from_slice(bytemuck::bytes_of(&self.payload));
        Some(Self::RECORD_SIZE)
    }

    /// Current envelope
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Settings fields
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Mutable settings fields
    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    /// Storage device
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable storage device
    ///
    /// Writing into the record's region behind the engine's back is not
    /// detected until the next load.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Consume the record and return the storage device
    pub fn release(self) -> S {
        self.storage
    }

    fn write_record(&mut self) -> Result<(), EepromError> {
        if self.storage.capacity() < P {
            self.storage.init(P)?;
        }

        self.storage.write(BASE_OFFSET, &self.envelope.to_bytes())?;
        self.storage
            .write(BASE_OFFSET + Envelope::SIZE, bytemuck::bytes_of(&self.payload))?;
        self.storage.commit()
    }
}

impl<S, T, const P: usize> FlashSettings<S, T, P>
where
    S: Eeprom,
    T: Pod + Default,
{
    /// Create a record holding `T::default()`
    pub fn new(storage: S) -> Self {
        Self::with_defaults(storage, T::default())
    }
}

impl<S, T, const P: usize> Deref for FlashSettings<S, T, P> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.payload
    }
}

impl<S, T, const P: usize> DerefMut for FlashSettings<S, T, P> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.payload
    }
}

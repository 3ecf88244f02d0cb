//! usbh-msc-disk - Storage transport support
//!
//! Generic code for talking to a USB mass-storage transport. The transport
//! itself (SCSI-over-bulk plumbing, host controller, enumeration) lives in
//! the USB host stack; this module only defines the seam the block-device
//! adapter drives.

/// Number of bytes per sector. Every transport this crate drives uses this
/// fixed sector size.
pub const SECTOR_SIZE: usize = 512;

/// The index of a sector on the device, counted from zero.
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SectorIdx(pub u32);

/// A number of sectors.
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SectorCount(pub u32);

impl SectorCount {
    /// How many bytes this many sectors occupy.
    pub fn byte_len(&self) -> usize {
        self.0 as usize * SECTOR_SIZE
    }
}

/// Connection state of the mass-storage device, as reported by the
/// transport.
///
/// The device can disconnect at any time (hot unplug), so a queried state is
/// stale the moment it is returned. Callers must query again rather than
/// hold on to an old value.
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceState {
    /// No device attached to the port.
    Disconnected,
    /// A device is attached but has not been initialized yet.
    Connected,
    /// The device is enumerated and ready for block I/O.
    Initialized,
    /// The transport gave up with a vendor-specific code.
    Error(u8),
}

/// An opaque transport-defined error code. Always nonzero.
///
/// The code space belongs to the transport vendor; this crate carries the
/// value through to the filesystem layer without interpreting it.
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransportError(u8);

impl TransportError {
    pub fn new(code: u8) -> Self {
        debug_assert!(code != 0);
        Self(code)
    }

    /// The raw vendor code.
    pub fn code(&self) -> u8 {
        self.0
    }
}

/// A USB mass-storage transport - something that can report its connection
/// state, bring an attached device up, and read raw sectors from it.
pub trait MscTransport {
    /// Bring the attached device to the [`DeviceState::Initialized`] state.
    ///
    /// May block while the device enumerates. Does not retry; retry policy
    /// belongs to the caller.
    fn initialize(&mut self) -> Result<(), TransportError>;

    /// Query the current connection state.
    fn state(&self) -> DeviceState;

    /// Read `count` sectors starting at `start` into `buffer`.
    ///
    /// `buffer` must hold at least `count.byte_len()` bytes. Fails with the
    /// transport's own code if the device is gone or the transfer errors.
    fn read_sectors(
        &mut self,
        start: SectorIdx,
        count: SectorCount,
        buffer: &mut [u8],
    ) -> Result<(), TransportError>;
}

impl<T> MscTransport for &mut T
where
    T: MscTransport,
{
    fn initialize(&mut self) -> Result<(), TransportError> {
        (*self).initialize()
    }

    fn state(&self) -> DeviceState {
        (**self).state()
    }

    fn read_sectors(
        &mut self,
        start: SectorIdx,
        count: SectorCount,
        buffer: &mut [u8],
    ) -> Result<(), TransportError> {
        (*self).read_sectors(start, count, buffer)
    }
}

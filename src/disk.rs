//! usbh-msc-disk - Block Device Adapter
//!
//! Translates a USB mass-storage transport into the four-function
//! block-device contract a FAT filesystem layer's low-level disk I/O
//! invokes.

use crate::transport::{DeviceState, MscTransport, SectorCount, SectorIdx};

#[cfg(feature = "log")]
use log::warn;

#[cfg(feature = "defmt-log")]
use defmt::warn;

use bitflags::bitflags;

bitflags! {
    /// Status of the block device as seen by the filesystem layer.
    ///
    /// `empty()` means a medium is present, initialized and readable.
    ///
    /// The full flag set belongs to the contract; [`UsbDisk`] itself
    /// collapses every not-ready condition into `NO_DISK` and reports its
    /// read-only policy through [`DiskError::WriteProtected`] on write, so
    /// it never sets `NO_INIT` or `WRITE_PROTECTED`. Other block devices
    /// may.
    pub struct DiskStatus: u8 {
        /// The device has not been initialized.
        const NO_INIT = 0x01;
        /// No medium present (device absent or not brought up).
        const NO_DISK = 0x02;
        /// The medium is write protected.
        const WRITE_PROTECTED = 0x04;
    }
}

/// The errors a block device surfaces to the filesystem layer.
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DiskError {
    /// The device is not present or not initialized.
    NotReady,
    /// The medium is write protected; all writes fail with this.
    WriteProtected,
    /// The transport failed with a vendor-specific code, carried through
    /// without translation.
    Hardware(u8),
}

/// The four-function callback contract a filesystem layer expects from any
/// block device.
pub trait DiskIo {
    /// Bring the underlying device up. Returns the transport's own code on
    /// failure; no internal retry.
    fn initialize(&mut self) -> Result<(), DiskError>;

    /// Current device status. Checked fresh on every call.
    fn status(&mut self) -> DiskStatus;

    /// Read `count` sectors starting at `start` into `buffer`.
    ///
    /// `buffer` must hold at least `count.byte_len()` bytes.
    fn read(
        &mut self,
        buffer: &mut [u8],
        start: SectorIdx,
        count: SectorCount,
    ) -> Result<(), DiskError>;

    /// Write `count` sectors starting at `start` from `buffer`.
    fn write(
        &mut self,
        buffer: &[u8],
        start: SectorIdx,
        count: SectorCount,
    ) -> Result<(), DiskError>;
}

/// A block device backed by a USB mass-storage transport.
///
/// Owns the transport handle it is built with - there is no process-wide
/// device singleton. The adapter performs no retries and no error
/// translation beyond mapping "not initialized" to a no-disk status; retry
/// policy belongs to the filesystem layer driving it.
///
/// The device is read-only: [`DiskIo::write`] always reports a
/// write-protected medium, whatever the transport could do.
pub struct UsbDisk<T>
where
    T: MscTransport,
{
    transport: T,
}

impl<T> UsbDisk<T>
where
    T: MscTransport,
{
    /// Create a new block device over the given transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give the transport handle back.
    pub fn release(self) -> T {
        self.transport
    }
}

impl<T> DiskIo for UsbDisk<T>
where
    T: MscTransport,
{
    fn initialize(&mut self) -> Result<(), DiskError> {
        match self.transport.initialize() {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("device not connected: code {}", e.code());
                Err(DiskError::Hardware(e.code()))
            }
        }
    }

    /// Queries the transport state on every call. The device can disconnect
    /// between calls, so nothing here is cached.
    fn status(&mut self) -> DiskStatus {
        match self.transport.state() {
            DeviceState::Initialized => DiskStatus::empty(),
            state => {
                warn!("device not ready: {:?}", state);
                DiskStatus::NO_DISK
            }
        }
    }

    /// Reads go straight to the transport without a connection-state check;
    /// a read against a vanished device fails inside the transport and the
    /// code comes back unchanged. `count == 0` succeeds without touching
    /// the transport.
    fn read(
        &mut self,
        buffer: &mut [u8],
        start: SectorIdx,
        count: SectorCount,
    ) -> Result<(), DiskError> {
        if count.0 == 0 {
            return Ok(());
        }

        debug_assert!(buffer.len() >= count.byte_len());

        self.transport
            .read_sectors(start, count, buffer)
            .map_err(|e| DiskError::Hardware(e.code()))
    }

    fn write(
        &mut self,
        _buffer: &[u8],
        _start: SectorIdx,
        _count: SectorCount,
    ) -> Result<(), DiskError> {
        // Read-only policy. The medium is reported as write protected
        // regardless of transport capability.
        Err(DiskError::WriteProtected)
    }
}

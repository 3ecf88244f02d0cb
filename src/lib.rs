//! # usbh-msc-disk
//!
//! > A USB-host mass-storage block device for Embedded Rust
//!
//! This crate sits between a USB mass-storage transport (the class driver a
//! USB host stack provides) and a FAT filesystem layer. It implements the
//! four-function block-device contract the filesystem's low-level disk I/O
//! expects - initialize, status, read, write - on top of whatever implements
//! [`MscTransport`], and ships a small serial-console test harness for
//! exercising a mounted volume interactively.
//!
//! The device is treated as read-only: every write reports a write-protected
//! medium, whatever the attached hardware could do.
//!
//! ## Using the crate
//!
//! You will need something that implements the [`MscTransport`] trait (your
//! USB host stack's mass-storage driver) and something that implements the
//! [`Filesystem`] trait (your FAT layer). Wrap the transport in a
//! [`UsbDisk`] and hand the filesystem, a serial receiver, a console writer
//! and a millisecond clock to the [`Harness`]:
//!
//! ```rust,ignore
//! let disk = usbh_msc_disk::UsbDisk::new(msc_driver);
//! let fs = MyFatLayer::new(disk);
//! let mut harness = usbh_msc_disk::Harness::new(
//!     fs,
//!     serial_rx,
//!     serial_tx,
//!     millis_clock,
//!     "2:/",
//!     "/testfiles/128MBrandom.bin",
//! );
//! harness.greet();
//! loop {
//!     harness.poll();
//! }
//! ```
//!
//! ## Features
//!
//! * `defmt-log`: By turning off the default features and enabling the
//! `defmt-log` feature you can configure this crate to log messages over
//! defmt instead.
//!
//! Make sure that either the `log` feature or the `defmt-log` feature is
//! enabled.

#![cfg_attr(not(test), no_std)]

// ****************************************************************************
//
// Imports
//
// ****************************************************************************

#[cfg(test)]
mod test;

pub mod disk;
pub mod fs;
pub mod harness;
pub mod transport;

pub use crate::disk::{DiskError, DiskIo, DiskStatus, UsbDisk};
pub use crate::fs::{DirEntryInfo, EntryKind, Filesystem};
pub use crate::harness::{Harness, HarnessState, TimeSource};
pub use crate::transport::{
    DeviceState, MscTransport, SectorCount, SectorIdx, TransportError, SECTOR_SIZE,
};

// ****************************************************************************
//
// End Of File
//
// ****************************************************************************

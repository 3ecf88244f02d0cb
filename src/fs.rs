//! usbh-msc-disk - Filesystem layer seam
//!
//! The harness drives a FAT (or any other) filesystem through this trait.
//! Implementing it is the filesystem crate's job; this crate only consumes
//! it. Which physical interface backs the volume - fixed media, SD card, or
//! a USB-host auto-detected partition - is the implementor's compile-time
//! choice.

use core::fmt::Debug;

/// What kind of thing a directory entry names.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File {
        /// File size in bytes.
        size: u64,
    },
}

/// A root-directory entry, as handed to the listing callback.
#[derive(Debug)]
pub struct DirEntryInfo<'a> {
    pub name: &'a str,
    pub kind: EntryKind,
}

/// A mounted-volume filesystem.
///
/// The volume handle is created by [`mount`](Filesystem::mount), destroyed
/// by [`unmount`](Filesystem::unmount), and opaque to everything else.
pub trait Filesystem {
    /// Result codes surfaced by the filesystem layer. Must be debug
    /// formattable.
    type Error: Debug;
    /// The mount handle.
    type Volume;
    /// An open file handle.
    type File;

    /// Mount the volume.
    fn mount(&mut self) -> Result<Self::Volume, Self::Error>;

    /// Unmount a previously mounted volume.
    fn unmount(&mut self, volume: Self::Volume) -> Result<(), Self::Error>;

    /// Enumerate the root directory, calling `sink` once per entry.
    fn list_root(
        &mut self,
        volume: &mut Self::Volume,
        sink: &mut dyn FnMut(&DirEntryInfo<'_>),
    ) -> Result<(), Self::Error>;

    /// Open a file for reading.
    fn open(&mut self, volume: &mut Self::Volume, path: &str)
        -> Result<Self::File, Self::Error>;

    /// Read from an open file. Returns the number of bytes read, which is
    /// less than `buffer.len()` only at end of file or on a device error.
    fn read(
        &mut self,
        volume: &mut Self::Volume,
        file: &mut Self::File,
        buffer: &mut [u8],
    ) -> Result<usize, Self::Error>;

    /// Close an open file.
    fn close(&mut self, volume: &mut Self::Volume, file: Self::File) -> Result<(), Self::Error>;
}

//! usbh-msc-disk - Interactive test harness
//!
//! A serial-console menu that exercises a mounted volume: root directory
//! listing and a large-file read throughput measurement. Single-character
//! commands, one pending byte serviced per poll.
//!
//! Filesystem errors are treated as unrecoverable: the harness prints the
//! failing operation and its result code, then parks itself in
//! [`HarnessState::Fatal`] until the device is reset.

use core::fmt::{Debug, Write};

use embedded_hal::serial::Read;

use crate::fs::{EntryKind, Filesystem};

/// How many bytes each throughput-test read asks for.
pub const CHUNK_SIZE: usize = 8192;

/// Total byte budget of the throughput test (16 MiB).
pub const TEST_SIZE: u32 = 16 * 1024 * 1024;

/// A source of monotonic milliseconds for throughput measurement.
pub trait TimeSource {
    fn millis(&mut self) -> u32;
}

impl<T> TimeSource for &mut T
where
    T: TimeSource,
{
    fn millis(&mut self) -> u32 {
        (*self).millis()
    }
}

/// Harness state.
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HarnessState {
    /// Waiting for a command; no volume mounted.
    Idle,
    /// A volume is mounted. Commands mount and unmount within a single
    /// poll, so this state is only ever observed from inside a command.
    Mounted,
    /// A filesystem call failed. No further commands are serviced; only a
    /// device reset leaves this state.
    Fatal,
}

/// The interactive test harness.
///
/// Generic over the filesystem layer, a serial receiver for command input,
/// a console writer for human-readable output, and a millisecond clock.
/// The drive label and test file path are fixed at construction.
pub struct Harness<FS, RX, TX, CLK>
where
    FS: Filesystem,
    RX: Read<u8>,
    TX: Write,
    CLK: TimeSource,
{
    fs: FS,
    rx: RX,
    console: TX,
    clock: CLK,
    drive: &'static str,
    test_file: &'static str,
    state: HarnessState,
    chunk: [u8; CHUNK_SIZE],
}

impl<FS, RX, TX, CLK> Harness<FS, RX, TX, CLK>
where
    FS: Filesystem,
    RX: Read<u8>,
    TX: Write,
    CLK: TimeSource,
{
    /// Create a new harness around the given collaborators.
    ///
    /// `drive` is the label printed in mount/unmount messages (for example
    /// `"2:/"` for a USB-host auto-detected partition); `test_file` is the
    /// path the throughput test opens.
    pub fn new(
        fs: FS,
        rx: RX,
        console: TX,
        clock: CLK,
        drive: &'static str,
        test_file: &'static str,
    ) -> Self {
        Self {
            fs,
            rx,
            console,
            clock,
            drive,
            test_file,
            state: HarnessState::Idle,
            chunk: [0u8; CHUNK_SIZE],
        }
    }

    /// Print the menu once, as the boot sequence does after setup.
    pub fn greet(&mut self) {
        self.usage();
    }

    pub fn state(&self) -> HarnessState {
        self.state
    }

    /// Take the collaborators back.
    pub fn release(self) -> (FS, RX, TX, CLK) {
        (self.fs, self.rx, self.console, self.clock)
    }

    /// Service at most one pending command byte. Call from the main loop.
    ///
    /// Consumes one byte from the receiver and discards at most one
    /// additional buffered byte unread (line endings, key repeats). Does
    /// nothing once the harness is [`HarnessState::Fatal`].
    pub fn poll(&mut self) -> HarnessState {
        if self.state == HarnessState::Fatal {
            return self.state;
        }

        let byte = match self.rx.read() {
            Ok(byte) => byte,
            // Nothing pending, or a line error we cannot act on.
            Err(nb::Error::WouldBlock) => return self.state,
            Err(nb::Error::Other(_)) => return self.state,
        };

        let _ = self.rx.read();

        match byte {
            b'1' => self.cmd_list(),
            b'2' => self.cmd_largefile(),
            // 'h' and anything unrecognised
            _ => self.usage(),
        }

        self.state
    }

    fn usage(&mut self) {
        let _ = writeln!(self.console, "USB host mass-storage tests");
        let _ = writeln!(self.console, " h: show this help page");
        let _ = writeln!(self.console, " 1: list files/folders");
        let _ = writeln!(self.console, " 2: usb speed test");
    }

    /// Record a fatal filesystem error. The harness stays dead until the
    /// device is reset.
    fn die(&mut self, op: &str, err: &dyn Debug) {
        let _ = writeln!(self.console, "{}: Failed with rc={:?}.", op, err);
        let _ = writeln!(self.console, "Please reboot...");
        self.state = HarnessState::Fatal;
    }

    fn mount(&mut self) -> Option<FS::Volume> {
        let _ = writeln!(self.console, "Mounting drive {}", self.drive);
        match self.fs.mount() {
            Ok(volume) => {
                self.state = HarnessState::Mounted;
                Some(volume)
            }
            Err(e) => {
                self.die("Mount", &e);
                None
            }
        }
    }

    fn unmount(&mut self, volume: FS::Volume) {
        let _ = writeln!(self.console, "Unmounting {}", self.drive);
        match self.fs.unmount(volume) {
            Ok(()) => self.state = HarnessState::Idle,
            Err(e) => self.die("Unmount", &e),
        }
    }

    /// Command `1`: list the root directory.
    fn cmd_list(&mut self) {
        let mut volume = match self.mount() {
            Some(volume) => volume,
            None => return,
        };

        let console = &mut self.console;
        let result = self.fs.list_root(&mut volume, &mut |entry| match entry.kind {
            EntryKind::Directory => {
                let _ = writeln!(console, "         <DIR> {}", entry.name);
            }
            EntryKind::File { size } => {
                let _ = writeln!(console, "  {:12} {}", size, entry.name);
            }
        });

        if let Err(e) = result {
            self.die("Readdir", &e);
            return;
        }

        self.unmount(volume);
    }

    /// Command `2`: sequentially read the test file in [`CHUNK_SIZE`]
    /// chunks up to [`TEST_SIZE`] bytes and report the throughput.
    fn cmd_largefile(&mut self) {
        let mut volume = match self.mount() {
            Some(volume) => volume,
            None => return,
        };

        let _ = writeln!(self.console);
        let _ = writeln!(self.console, "Measuring read performance");

        let mut file = match self.fs.open(&mut volume, self.test_file) {
            Ok(file) => file,
            Err(e) => {
                self.die("Open", &e);
                return;
            }
        };

        let start = self.clock.millis();
        let mut read = 0u32;
        while read < TEST_SIZE {
            // A device error reads as a short chunk, same as end of file.
            let count = self
                .fs
                .read(&mut volume, &mut file, &mut self.chunk)
                .unwrap_or(0);

            if count == CHUNK_SIZE {
                read += CHUNK_SIZE as u32;
            } else {
                let _ = writeln!(self.console, "Read error");
                break;
            }
        }
        let end = self.clock.millis();

        let elapsed_ms = end.wrapping_sub(start);
        let _ = writeln!(self.console, "Read: {} bytes", read);
        let bps = if elapsed_ms == 0 {
            0.0
        } else {
            read as f32 / (elapsed_ms as f32 / 1000.0)
        };
        let _ = writeln!(self.console, "Time: {} ms, {:.0} bps", elapsed_ms, bps);

        let _ = writeln!(self.console);
        let _ = writeln!(self.console, "Closing file");
        if let Err(e) = self.fs.close(&mut volume, file) {
            self.die("Close", &e);
            return;
        }

        self.unmount(volume);
    }
}

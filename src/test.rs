use crate::{
    DeviceState, DiskError, DiskIo, DiskStatus, MscTransport, SectorCount, SectorIdx,
    TransportError, UsbDisk,
};

/// A scriptable transport standing in for a USB host stack.
struct FakeTransport {
    state: DeviceState,
    init_result: Result<(), TransportError>,
    read_result: Result<(), TransportError>,
    reads: usize,
    fill: u8,
}

impl FakeTransport {
    fn with_state(state: DeviceState) -> Self {
        Self {
            state,
            init_result: Ok(()),
            read_result: Ok(()),
            reads: 0,
            fill: 0xA5,
        }
    }

    fn unplugged(code: u8) -> Self {
        let mut fake = Self::with_state(DeviceState::Disconnected);
        fake.init_result = Err(TransportError::new(code));
        fake
    }
}

impl MscTransport for FakeTransport {
    fn initialize(&mut self) -> Result<(), TransportError> {
        self.init_result?;
        self.state = DeviceState::Initialized;
        Ok(())
    }

    fn state(&self) -> DeviceState {
        self.state
    }

    fn read_sectors(
        &mut self,
        _start: SectorIdx,
        count: SectorCount,
        buffer: &mut [u8],
    ) -> Result<(), TransportError> {
        self.reads += 1;
        self.read_result?;
        for byte in buffer[..count.byte_len()].iter_mut() {
            *byte = self.fill;
        }
        Ok(())
    }
}

#[test]
fn status_reports_no_disk_until_initialized() {
    for state in [
        DeviceState::Disconnected,
        DeviceState::Connected,
        DeviceState::Error(7),
    ] {
        let mut disk = UsbDisk::new(FakeTransport::with_state(state));
        assert_eq!(disk.status(), DiskStatus::NO_DISK);
    }

    let mut disk = UsbDisk::new(FakeTransport::with_state(DeviceState::Initialized));
    assert_eq!(disk.status(), DiskStatus::empty());
}

#[test]
fn status_collapses_not_ready_into_no_disk() {
    // The adapter reports NO_DISK alone; NO_INIT and WRITE_PROTECTED are
    // for devices that distinguish those conditions.
    for state in [
        DeviceState::Disconnected,
        DeviceState::Connected,
        DeviceState::Error(3),
    ] {
        let mut disk = UsbDisk::new(FakeTransport::with_state(state));
        let status = disk.status();
        assert!(!status.contains(DiskStatus::NO_INIT));
        assert!(!status.contains(DiskStatus::WRITE_PROTECTED));
    }
}

#[test]
fn status_is_idempotent() {
    let mut disk = UsbDisk::new(FakeTransport::with_state(DeviceState::Connected));
    let first = disk.status();
    assert_eq!(disk.status(), first);
    assert_eq!(disk.status(), first);
}

#[test]
fn status_follows_the_transport_state() {
    // Hot unplug between calls must show up on the next query.
    let mut disk = UsbDisk::new(FakeTransport::with_state(DeviceState::Initialized));
    assert_eq!(disk.status(), DiskStatus::empty());

    disk.transport_mut().state = DeviceState::Disconnected;
    assert_eq!(disk.status(), DiskStatus::NO_DISK);
}

#[test]
fn write_is_always_write_protected() {
    let mut disk = UsbDisk::new(FakeTransport::with_state(DeviceState::Initialized));

    let data = [0u8; 512];
    assert_eq!(
        disk.write(&data, SectorIdx(0), SectorCount(1)),
        Err(DiskError::WriteProtected)
    );
    assert_eq!(
        disk.write(&[], SectorIdx(1000), SectorCount(0)),
        Err(DiskError::WriteProtected)
    );
}

#[test]
fn zero_sector_read_is_a_no_op() {
    let mut disk = UsbDisk::new(FakeTransport::with_state(DeviceState::Initialized));

    assert_eq!(disk.read(&mut [], SectorIdx(0), SectorCount(0)), Ok(()));
    assert_eq!(disk.transport().reads, 0);
}

#[test]
fn read_delegates_to_the_transport() {
    let mut disk = UsbDisk::new(FakeTransport::with_state(DeviceState::Initialized));

    let mut buffer = [0u8; 1024];
    assert_eq!(disk.read(&mut buffer, SectorIdx(4), SectorCount(2)), Ok(()));
    assert_eq!(disk.transport().reads, 1);
    assert!(buffer.iter().all(|b| *b == 0xA5));
}

#[test]
fn read_passes_the_transport_code_through() {
    let mut fake = FakeTransport::with_state(DeviceState::Initialized);
    fake.read_result = Err(TransportError::new(0x20));
    let mut disk = UsbDisk::new(fake);

    let mut buffer = [0u8; 512];
    assert_eq!(
        disk.read(&mut buffer, SectorIdx(0), SectorCount(1)),
        Err(DiskError::Hardware(0x20))
    );
}

#[test]
fn initialize_while_unplugged_reports_the_vendor_code() {
    let mut disk = UsbDisk::new(FakeTransport::unplugged(2));

    assert_eq!(disk.initialize(), Err(DiskError::Hardware(2)));
    assert_eq!(disk.status(), DiskStatus::NO_DISK);
}

#[test]
fn initialize_brings_the_device_up() {
    let mut disk = UsbDisk::new(FakeTransport::with_state(DeviceState::Disconnected));

    assert_eq!(disk.initialize(), Ok(()));
    assert_eq!(disk.status(), DiskStatus::empty());
}

use std::any::Any;

use crate::cpu::{AccessKind, Bus};
use crate::error::{MapError, StateError};
use crate::interrupts::InterruptManager;

/// Value read from an address no device answers.
pub const OPEN_BUS: u8 = 0xFF;

/// A peripheral that can be mapped into memory or port space.
///
/// Offsets passed to `read`/`write` are relative to the start of the
/// mapping, so a device does not need to know where it lives.
pub trait Device: Any + Send {
    fn read(&mut self, offset: u16) -> u8;
    fn write(&mut self, offset: u16, value: u8);

    /// Advance one clock cycle.
    fn tick(&mut self, _irq: &mut InterruptManager) {}

    fn reset(&mut self);

    /// Fixed size of the block returned by `save_state`.
    fn state_len(&self) -> usize {
        0
    }

    fn save_state(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Restore a block written by `save_state`. The default accepts only
    /// the empty block of a stateless device.
    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        if data.is_empty() {
            Ok(())
        } else {
            Err(StateError::LengthMismatch {
                expected: 0,
                actual: data.len(),
            })
        }
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Handle returned by [`SystemBus::add_device`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct DeviceId(usize);

/// Inclusive address range served by one device.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DeviceMapping {
    pub device: DeviceId,
    pub start: u16,
    pub end: u16,
}

impl DeviceMapping {
    #[inline]
    fn contains(&self, addr: u16) -> bool {
        (self.start..=self.end).contains(&addr)
    }

    #[inline]
    fn overlaps(&self, start: u16, end: u16) -> bool {
        start <= self.end && self.start <= end
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessDirection {
    Read,
    Write,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AddressSpace {
    Memory,
    Port,
}

/// One bus transaction as seen by an observer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AccessEvent {
    pub address: u16,
    pub value: u8,
    pub direction: AccessDirection,
    pub kind: AccessKind,
    pub space: AddressSpace,
}

/// Passive listener attached to the bus. It sees every access and the
/// instruction boundaries but cannot change what the CPU reads.
pub trait BusObserver: Any + Send {
    fn access(&mut self, event: AccessEvent);
    fn begin_instruction(&mut self, _pc: u16) {}
    fn end_instruction(&mut self, _pc: u16, _mnemonic: &'static str, _cycles: u32) {}
    fn interrupt_accepted(&mut self, _return_pc: u16) {}

    fn as_any(&self) -> &dyn Any;
}

/// Address decoder for the board.
///
/// Devices are owned by the bus and referred to by [`DeviceId`]. Memory
/// and port space each hold their own ordered list of mappings; the first
/// mapping containing an address wins.
#[derive(Default)]
pub struct SystemBus {
    devices: Vec<Box<dyn Device>>,
    memory_map: Vec<DeviceMapping>,
    port_map: Vec<DeviceMapping>,
    observer: Option<Box<dyn BusObserver>>,
}

impl SystemBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&mut self, device: Box<dyn Device>) -> DeviceId {
        self.devices.push(device);
        DeviceId(self.devices.len() - 1)
    }

    pub fn map_memory(&mut self, device: DeviceId, start: u16, end: u16) -> Result<(), MapError> {
        Self::map(&mut self.memory_map, device, start, end)
    }

    /// Map a port range. Only the low byte of a port address is decoded.
    pub fn map_port(&mut self, device: DeviceId, start: u16, end: u16) -> Result<(), MapError> {
        Self::map(&mut self.port_map, device, start, end)
    }

    fn map(
        list: &mut Vec<DeviceMapping>,
        device: DeviceId,
        start: u16,
        end: u16,
    ) -> Result<(), MapError> {
        if start > end {
            return Err(MapError::Inverted { start, end });
        }
        if list.iter().any(|m| m.overlaps(start, end)) {
            return Err(MapError::Overlap { start, end });
        }
        list.push(DeviceMapping { device, start, end });
        Ok(())
    }

    pub fn memory_mappings(&self) -> &[DeviceMapping] {
        &self.memory_map
    }

    pub fn port_mappings(&self) -> &[DeviceMapping] {
        &self.port_map
    }

    pub fn get(&self, id: DeviceId) -> Option<&dyn Device> {
        self.devices.get(id.0).map(|device| device.as_ref())
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut dyn Device> {
        match self.devices.get_mut(id.0) {
            Some(device) => Some(device.as_mut()),
            None => None,
        }
    }

    pub fn device<T: Device>(&self, id: DeviceId) -> Option<&T> {
        self.devices.get(id.0)?.as_any().downcast_ref::<T>()
    }

    pub fn device_mut<T: Device>(&mut self, id: DeviceId) -> Option<&mut T> {
        self.devices.get_mut(id.0)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn set_observer(&mut self, observer: Option<Box<dyn BusObserver>>) {
        self.observer = observer;
    }

    pub fn observer<T: BusObserver>(&self) -> Option<&T> {
        self.observer.as_deref()?.as_any().downcast_ref::<T>()
    }

    /// Advance every device `cycles` clock cycles, one cycle at a time, in
    /// registration order.
    pub fn tick(&mut self, cycles: u32, irq: &mut InterruptManager) {
        for _ in 0..cycles {
            for device in self.devices.iter_mut() {
                device.tick(irq);
            }
        }
    }

    pub fn reset_devices(&mut self) {
        for device in self.devices.iter_mut() {
            device.reset();
        }
    }

    pub fn read_memory(&mut self, addr: u16) -> u8 {
        Self::dispatch_read(&mut self.devices, &self.memory_map, addr)
    }

    pub fn write_memory(&mut self, addr: u16, value: u8) {
        Self::dispatch_write(&mut self.devices, &self.memory_map, addr, value);
    }

    pub fn read_port(&mut self, port: u16) -> u8 {
        Self::dispatch_read(&mut self.devices, &self.port_map, port & 0xFF)
    }

    pub fn write_port(&mut self, port: u16, value: u8) {
        Self::dispatch_write(&mut self.devices, &self.port_map, port & 0xFF, value);
    }

    fn dispatch_read(devices: &mut [Box<dyn Device>], map: &[DeviceMapping], addr: u16) -> u8 {
        match map.iter().find(|m| m.contains(addr)) {
            Some(m) => match devices.get_mut(m.device.0) {
                Some(device) => device.read(addr - m.start),
                None => OPEN_BUS,
            },
            None => OPEN_BUS,
        }
    }

    fn dispatch_write(
        devices: &mut [Box<dyn Device>],
        map: &[DeviceMapping],
        addr: u16,
        value: u8,
    ) {
        if let Some(m) = map.iter().find(|m| m.contains(addr)) {
            if let Some(device) = devices.get_mut(m.device.0) {
                device.write(addr - m.start, value);
            }
        }
    }

    #[inline]
    fn notify(
        &mut self,
        address: u16,
        value: u8,
        direction: AccessDirection,
        kind: AccessKind,
        space: AddressSpace,
    ) {
        if let Some(observer) = self.observer.as_mut() {
            observer.access(AccessEvent {
                address,
                value,
                direction,
                kind,
                space,
            });
        }
    }
}

impl Bus for SystemBus {
    fn read8(&mut self, addr: u16, kind: AccessKind) -> u8 {
        let value = self.read_memory(addr);
        self.notify(addr, value, AccessDirection::Read, kind, AddressSpace::Memory);
        value
    }

    fn write8(&mut self, addr: u16, value: u8, kind: AccessKind) {
        self.write_memory(addr, value);
        self.notify(addr, value, AccessDirection::Write, kind, AddressSpace::Memory);
    }

    fn port_in(&mut self, port: u16) -> u8 {
        let value = self.read_port(port);
        self.notify(
            port & 0xFF,
            value,
            AccessDirection::Read,
            AccessKind::Standard,
            AddressSpace::Port,
        );
        value
    }

    fn port_out(&mut self, port: u16, value: u8) {
        self.write_port(port, value);
        self.notify(
            port & 0xFF,
            value,
            AccessDirection::Write,
            AccessKind::Standard,
            AddressSpace::Port,
        );
    }

    fn tracing(&self) -> bool {
        self.observer.is_some()
    }

    fn begin_instruction(&mut self, pc: u16) {
        if let Some(observer) = self.observer.as_mut() {
            observer.begin_instruction(pc);
        }
    }

    fn end_instruction(&mut self, pc: u16, mnemonic: &'static str, cycles: u32) {
        if let Some(observer) = self.observer.as_mut() {
            observer.end_instruction(pc, mnemonic, cycles);
        }
    }

    fn interrupt_accepted(&mut self, return_pc: u16) {
        if let Some(observer) = self.observer.as_mut() {
            observer.interrupt_accepted(return_pc);
        }
    }
}

use crate::cpu::{Cpu, Registers, CPU_STATE_LEN};
use crate::error::{Ceres80Error, StateError};
use crate::interrupts::{InterruptManager, INTERRUPT_STATE_LEN};
use crate::{
    CLOCK_HZ, FRAMES_PER_SECOND, MAX_SPEED_PERCENT, RAM_SIZE, ROM_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH,
};

use super::bus::{BusObserver, DeviceId, SystemBus};
use super::{
    Ctc, Lcd, Memory, Pio, TraceLog, CTC_PORTS, LCD_PORTS, PIO_PORTS, RAM_END, RAM_START,
    ROM_END, ROM_START,
};

/// The Ceres80 board: Z80 CPU, 32 KiB ROM, 32 KiB RAM, CTC, PIO and a
/// 128x64 LCD.
///
/// Nothing here sleeps or touches the host; pacing belongs to the caller.
pub struct Ceres80 {
    cpu: Cpu,
    bus: SystemBus,
    irq: InterruptManager,
    rom: DeviceId,
    ram: DeviceId,
    ctc: DeviceId,
    pio: DeviceId,
    lcd: DeviceId,
    speed_percent: u32,
    cycles_per_frame: u32,
}

impl Ceres80 {
    pub fn new() -> Result<Self, Ceres80Error> {
        let mut bus = SystemBus::new();

        let rom = bus.add_device(Box::new(Memory::new(ROM_SIZE, false)));
        let ram = bus.add_device(Box::new(Memory::new(RAM_SIZE, true)));
        let ctc = bus.add_device(Box::new(Ctc::new()));
        let pio = bus.add_device(Box::new(Pio::new()));
        let lcd = bus.add_device(Box::new(Lcd::new()));

        bus.map_memory(rom, ROM_START, ROM_END)?;
        bus.map_memory(ram, RAM_START, RAM_END)?;
        bus.map_port(ctc, CTC_PORTS.0, CTC_PORTS.1)?;
        bus.map_port(pio, PIO_PORTS.0, PIO_PORTS.1)?;
        bus.map_port(lcd, LCD_PORTS.0, LCD_PORTS.1)?;

        Ok(Self {
            cpu: Cpu::new(),
            bus,
            irq: InterruptManager::new(),
            rom,
            ram,
            ctc,
            pio,
            lcd,
            speed_percent: 100,
            cycles_per_frame: cycles_per_frame(100),
        })
    }

    /// Copy a program image to the start of ROM. Oversized images are
    /// rejected and leave ROM untouched.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), Ceres80Error> {
        self.load_store(self.rom, "ROM", image)?;
        log::info!("loaded {} byte ROM image", image.len());
        Ok(())
    }

    /// Copy an image to the start of RAM (0x8000).
    pub fn load_ram(&mut self, image: &[u8]) -> Result<(), Ceres80Error> {
        self.load_store(self.ram, "RAM", image)?;
        log::info!("loaded {} byte RAM image", image.len());
        Ok(())
    }

    fn load_store(
        &mut self,
        id: DeviceId,
        store: &'static str,
        image: &[u8],
    ) -> Result<(), Ceres80Error> {
        let memory = self
            .bus
            .device_mut::<Memory>(id)
            .ok_or(Ceres80Error::MissingDevice(store))?;
        if !memory.load(image) {
            return Err(Ceres80Error::ImageTooLarge {
                store,
                size: image.len(),
                capacity: memory.size(),
            });
        }
        Ok(())
    }

    /// Power-cycle the board. RAM and all peripherals are cleared; the ROM
    /// image stays in place.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.irq.reset();
        self.bus.reset_devices();
        log::info!("machine reset");
    }

    /// Execute one instruction (or accept one interrupt), then tick every
    /// device once per cycle it took.
    pub fn step(&mut self) -> u32 {
        let cycles = self.cpu.step(&mut self.bus, &mut self.irq);
        self.bus.tick(cycles, &mut self.irq);
        cycles
    }

    /// Run until one frame's cycle budget is used up and return the cycles
    /// actually executed.
    ///
    /// Stops early if a step makes no progress (an unassigned opcode), so a
    /// bad ROM cannot spin forever. At speed 0 nothing runs.
    pub fn run_frame(&mut self) -> u32 {
        let mut elapsed = 0u32;
        while elapsed < self.cycles_per_frame {
            let taken = self.step();
            if taken == 0 {
                break;
            }
            elapsed = elapsed.saturating_add(taken);
        }
        elapsed
    }

    /// Run whole frames back to back until `stop` returns true. `stop` is
    /// checked before every frame.
    pub fn run_until<F>(&mut self, mut stop: F)
    where
        F: FnMut(&Ceres80) -> bool,
    {
        while !stop(self) {
            self.run_frame();
        }
    }

    /// Step until the CPU halts or `max_cycles` have elapsed. Returns true
    /// if the CPU halted.
    pub fn run_until_halt(&mut self, max_cycles: u64) -> bool {
        let mut elapsed = 0u64;
        while !self.cpu.halted && elapsed < max_cycles {
            let taken = self.step();
            if taken == 0 {
                break;
            }
            elapsed += u64::from(taken);
        }
        self.cpu.halted
    }

    /// Set emulation speed as a percentage of the 6.144 MHz clock.
    /// 0 selects single-step mode: frames do nothing and the host drives
    /// `step` directly.
    pub fn set_speed(&mut self, percent: u32) -> Result<(), Ceres80Error> {
        if percent > MAX_SPEED_PERCENT {
            return Err(Ceres80Error::InvalidSpeed(percent));
        }
        self.speed_percent = percent;
        self.cycles_per_frame = cycles_per_frame(percent);
        log::debug!(
            "speed {}%, {} cycles per frame",
            percent,
            self.cycles_per_frame
        );
        Ok(())
    }

    pub fn speed(&self) -> u32 {
        self.speed_percent
    }

    pub fn cycles_per_frame(&self) -> u32 {
        self.cycles_per_frame
    }

    /// Total save-state size: CPU, interrupt lines, then every device in
    /// port order.
    pub fn state_len(&self) -> usize {
        CPU_STATE_LEN
            + INTERRUPT_STATE_LEN
            + self
                .state_devices()
                .iter()
                .map(|&id| self.device_state_len(id))
                .sum::<usize>()
    }

    /// Serialize CPU, interrupt lines, CTC, PIO and LCD state, concatenated
    /// in that order. Memory contents are not included; use
    /// [`Ceres80::ram`] for those.
    pub fn save_state(&self) -> Vec<u8> {
        let mut out = self.cpu.save_state();
        out.extend(self.irq.save_state());
        for id in self.state_devices() {
            out.extend(self.device_save_state(id));
        }
        out
    }

    /// Restore a blob written by [`Ceres80::save_state`]. The total length
    /// is checked before anything is modified.
    pub fn load_state(&mut self, data: &[u8]) -> Result<(), Ceres80Error> {
        let expected = self.state_len();
        if data.len() != expected {
            return Err(StateError::LengthMismatch {
                expected,
                actual: data.len(),
            }
            .into());
        }

        let (cpu, rest) = data.split_at(CPU_STATE_LEN);
        let (irq, mut rest) = rest.split_at(INTERRUPT_STATE_LEN);
        self.cpu.load_state(cpu)?;
        self.irq.load_state(irq)?;
        for id in self.state_devices() {
            let len = self.device_state_len(id);
            let (block, tail) = rest.split_at(len);
            self.device_load_state(id, block)?;
            rest = tail;
        }
        Ok(())
    }

    fn state_devices(&self) -> [DeviceId; 3] {
        [self.ctc, self.pio, self.lcd]
    }

    fn device_state_len(&self, id: DeviceId) -> usize {
        self.bus.get(id).map_or(0, |device| device.state_len())
    }

    fn device_save_state(&self, id: DeviceId) -> Vec<u8> {
        self.bus
            .get(id)
            .map(|device| device.save_state())
            .unwrap_or_default()
    }

    fn device_load_state(&mut self, id: DeviceId, block: &[u8]) -> Result<(), Ceres80Error> {
        let device = self
            .bus
            .get_mut(id)
            .ok_or(Ceres80Error::MissingDevice("state device"))?;
        device.load_state(block)?;
        Ok(())
    }

    /// Current LCD contents, 128x64 bytes, row-major, 1 = pixel set.
    pub fn framebuffer(&self) -> Vec<u8> {
        self.bus
            .device::<Lcd>(self.lcd)
            .map(Lcd::framebuffer)
            .unwrap_or_else(|| vec![0; SCREEN_WIDTH * SCREEN_HEIGHT])
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn registers(&self) -> &Registers {
        &self.cpu.regs
    }

    pub fn ram(&self) -> &[u8] {
        self.bus
            .device::<Memory>(self.ram)
            .map(Memory::as_slice)
            .unwrap_or(&[])
    }

    pub fn ctc(&self) -> Option<&Ctc> {
        self.bus.device::<Ctc>(self.ctc)
    }

    pub fn interrupts(&self) -> &InterruptManager {
        &self.irq
    }

    pub fn bus(&self) -> &SystemBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut SystemBus {
        &mut self.bus
    }

    /// Attach or detach a [`TraceLog`]. While attached every instruction is
    /// rendered and sent to `log::trace!`.
    pub fn set_tracing(&mut self, enabled: bool) {
        let observer: Option<Box<dyn BusObserver>> = if enabled {
            Some(Box::new(TraceLog::new()))
        } else {
            None
        };
        self.bus.set_observer(observer);
    }

    /// Rendered trace of the last instruction, if tracing is on.
    pub fn last_trace(&self) -> Option<&str> {
        self.bus.observer::<TraceLog>().map(TraceLog::last)
    }
}

fn cycles_per_frame(percent: u32) -> u32 {
    (u64::from(CLOCK_HZ) * u64::from(percent) / 100 / u64::from(FRAMES_PER_SECOND)) as u32
}

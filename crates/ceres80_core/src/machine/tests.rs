use super::*;
use crate::cpu::{Bus, Flags};
use crate::error::{Ceres80Error, MapError, StateError};
use crate::{InterruptManager, INTERRUPT_STATE_LEN, RAM_SIZE, ROM_SIZE, SCREEN_WIDTH};

/// Set up SP, mode 1 and CTC channel 0 (interrupts on, prescale 16, time
/// constant 5), then halt in a loop. The handler counts interrupts at
/// 0x8000.
const CTC_PROGRAM: &[u8] = &[
    0x31, 0x00, 0x00, // LD SP,0x0000
    0xED, 0x56, // IM 1
    0x3E, 0x87, // LD A,0x87
    0xD3, 0x00, // OUT (0),A
    0x3E, 0x05, // LD A,5
    0xD3, 0x00, // OUT (0),A
    0xFB, // EI
    0x76, // HALT
    0x18, 0xFD, // JR -3
];

const HANDLER: &[u8] = &[
    0x21, 0x00, 0x80, // LD HL,0x8000
    0x34, // INC (HL)
    0xFB, // EI
    0xED, 0x4D, // RETI
];

fn machine_with(program: &[u8]) -> Ceres80 {
    let mut machine = Ceres80::new().unwrap();
    machine.load_rom(program).unwrap();
    machine
}

fn rom_with_handler(program: &[u8], handler: &[u8]) -> Vec<u8> {
    let mut rom = vec![0; 0x38 + handler.len()];
    rom[..program.len()].copy_from_slice(program);
    rom[0x38..].copy_from_slice(handler);
    rom
}

#[test]
fn unmapped_memory_is_open_bus() {
    let mut bus = SystemBus::new();
    let ram = bus.add_device(Box::new(Memory::new(RAM_SIZE, true)));
    bus.map_memory(ram, RAM_START, RAM_END).unwrap();

    assert_eq!(bus.read_memory(0x1234), OPEN_BUS);
    bus.write_memory(0x1234, 0x00);
    assert_eq!(bus.read_memory(0x1234), OPEN_BUS);
    assert_eq!(bus.read_port(0x20), OPEN_BUS);

    bus.write_memory(0x8001, 0x5A);
    assert_eq!(bus.read_memory(0x8001), 0x5A);
    let memory = bus.device::<Memory>(ram).unwrap();
    assert_eq!(memory.as_slice()[1], 0x5A);
}

#[test]
fn overlapping_ranges_are_rejected() {
    let mut bus = SystemBus::new();
    let a = bus.add_device(Box::new(Memory::new(0x100, true)));
    let b = bus.add_device(Box::new(Memory::new(0x100, true)));

    bus.map_memory(a, 0x1000, 0x10FF).unwrap();
    assert_eq!(
        bus.map_memory(b, 0x10FF, 0x11FF),
        Err(MapError::Overlap {
            start: 0x10FF,
            end: 0x11FF
        })
    );
    assert_eq!(
        bus.map_memory(b, 0x2000, 0x1FFF),
        Err(MapError::Inverted {
            start: 0x2000,
            end: 0x1FFF
        })
    );
    // Port space is separate.
    bus.map_port(b, 0x10, 0x13).unwrap();
    assert_eq!(bus.memory_mappings().len(), 1);
    assert_eq!(bus.port_mappings().len(), 1);
}

#[test]
fn ports_decode_low_byte_and_translate_offsets() {
    let mut bus = SystemBus::new();
    let lcd = bus.add_device(Box::new(Lcd::new()));
    bus.map_port(lcd, LCD_PORTS.0, LCD_PORTS.1).unwrap();

    // High byte (B or A on the real bus) is ignored.
    bus.port_out(0x3F08, 0x3F);
    assert_eq!(bus.port_in(0xFF08), 0x20);
    assert!(bus.device::<Lcd>(lcd).is_some());
    assert!(bus.device::<Ctc>(lcd).is_none());
}

#[test]
fn memory_wraps_offsets_and_protects_rom() {
    let mut rom = Memory::new(4, false);
    assert!(rom.load(&[1, 2, 3, 4]));
    assert_eq!(rom.read(5), 2);
    rom.write(0, 0xFF);
    assert_eq!(rom.read(0), 1);

    let mut ram = Memory::new(4, true);
    ram.write(6, 0xAB);
    assert_eq!(ram.read(2), 0xAB);
}

#[test]
fn oversized_rom_is_rejected_without_changes() {
    let mut machine = Ceres80::new().unwrap();
    machine.load_rom(&[0xAA; 16]).unwrap();

    let err = machine.load_rom(&vec![0x55; ROM_SIZE + 1]).unwrap_err();
    assert!(matches!(
        err,
        Ceres80Error::ImageTooLarge {
            store: "ROM",
            size,
            capacity: ROM_SIZE,
        } if size == ROM_SIZE + 1
    ));
    assert_eq!(machine.bus_mut().read_memory(0x0000), 0xAA);
    assert_eq!(machine.bus_mut().read_memory(0x0010), 0x00);

    let image: Vec<u8> = (0..ROM_SIZE).map(|i| (i % 251) as u8).collect();
    machine.load_rom(&image).unwrap();
    for (addr, &byte) in image.iter().enumerate() {
        assert_eq!(machine.bus_mut().read_memory(addr as u16), byte);
    }
}

#[test]
fn oversized_ram_is_rejected() {
    let mut machine = Ceres80::new().unwrap();
    assert!(machine.load_ram(&vec![0; RAM_SIZE + 1]).is_err());
    machine.load_ram(&[1, 2, 3]).unwrap();
    assert_eq!(&machine.ram()[..3], &[1, 2, 3]);
    assert_eq!(machine.bus_mut().read_memory(0x8002), 3);
}

#[test]
fn program_runs_to_halt() {
    let mut machine = machine_with(&[0x3E, 0x05, 0xC6, 0x03, 0x76]);

    assert!(machine.run_until_halt(1_000));
    let regs = machine.registers();
    assert_eq!(regs.a, 8);
    assert!(!regs.flag(Flags::ZERO));
    assert_eq!(regs.pc, 5);
}

#[test]
fn ctc_interrupts_drive_the_handler() {
    let rom = rom_with_handler(CTC_PROGRAM, HANDLER);
    let mut machine = machine_with(&rom);

    let mut cycles = 0u32;
    while machine.ram()[0] < 3 && cycles < 10_000 {
        cycles += machine.step();
    }
    assert_eq!(machine.ram()[0], 3);
    // Three periods of 5 * 16 cycles plus setup and handler overhead.
    assert!(cycles >= 3 * 80, "{cycles}");

    let channel = machine.ctc().unwrap().channel(0).unwrap();
    assert!(channel.is_running());
}

#[test]
fn step_ticks_devices_per_cycle() {
    // LD A,0x07 ; OUT (1),A ; LD A,0x40 ; OUT (1),A ; NOP...
    let mut machine = machine_with(&[0x3E, 0x07, 0xD3, 0x01, 0x3E, 0x40, 0xD3, 0x01]);
    let mut cycles = 0;
    for _ in 0..4 {
        cycles += machine.step();
    }
    assert_eq!(cycles, 7 + 11 + 7 + 11);
    assert_eq!(machine.ctc().unwrap().channel(1).unwrap().read(), 0x40);

    // 16 NOPs of 4 cycles = 64 cycles = 4 prescale periods.
    for _ in 0..16 {
        machine.step();
    }
    assert_eq!(machine.ctc().unwrap().channel(1).unwrap().read(), 0x40 - 4);
}

#[test]
fn lcd_is_reachable_through_ports() {
    let mut machine = machine_with(&[
        0x3E, 0x3F, // LD A,0x3F
        0xD3, 0x08, // OUT (8),A  display on
        0x3E, 0xFF, // LD A,0xFF
        0xD3, 0x09, // OUT (9),A  y=0 page=0
        0x76,
    ]);
    assert!(machine.run_until_halt(1_000));

    let frame = machine.framebuffer();
    for row in 0..8 {
        assert_eq!(frame[row * SCREEN_WIDTH], 1);
    }
    assert_eq!(frame.iter().filter(|&&p| p != 0).count(), 8);
}

#[test]
fn speed_controls_frame_budget() {
    let mut machine = machine_with(&[0x18, 0xFE]); // JR -2

    assert_eq!(machine.cycles_per_frame(), 102_400);
    let ran = machine.run_frame();
    assert!(ran >= 102_400 && ran < 102_400 + 12);

    machine.set_speed(500).unwrap();
    assert_eq!(machine.cycles_per_frame(), 512_000);

    machine.set_speed(0).unwrap();
    assert_eq!(machine.run_frame(), 0);

    assert!(matches!(
        machine.set_speed(501),
        Err(Ceres80Error::InvalidSpeed(501))
    ));
    assert_eq!(machine.speed(), 0);
}

#[test]
fn run_frame_stops_on_zero_cycle_step() {
    // ED 00 is unassigned and makes no progress.
    let mut machine = machine_with(&[0xED, 0x00]);
    assert_eq!(machine.run_frame(), 0);
    assert_eq!(machine.registers().pc, 2);
}

#[test]
fn run_until_checks_predicate_between_frames() {
    let mut machine = machine_with(&[0x18, 0xFE]);
    let mut frames = 0;
    machine.run_until(|_| {
        frames += 1;
        frames > 3
    });
    assert_eq!(frames, 4);
}

#[test]
fn save_and_load_state_round_trip() {
    let rom = rom_with_handler(CTC_PROGRAM, HANDLER);
    let mut machine = machine_with(&rom);
    for _ in 0..20 {
        machine.step();
    }

    let state = machine.save_state();
    assert_eq!(
        state.len(),
        crate::cpu::CPU_STATE_LEN + INTERRUPT_STATE_LEN + CTC_STATE_LEN
    );
    assert_eq!(machine.state_len(), state.len());

    let mut other = machine_with(&rom);
    other.load_state(&state).unwrap();
    assert_eq!(other.registers(), machine.registers());
    assert_eq!(other.save_state(), state);

    // Both machines continue identically.
    for _ in 0..200 {
        assert_eq!(machine.step(), other.step());
    }
    assert_eq!(other.registers(), machine.registers());
}

#[test]
fn pending_interrupt_survives_save_and_load() {
    // Program channel 0 (interrupts on, time constant 1) and spin with
    // interrupts disabled, so the request stays pending.
    let program = [
        0x3E, 0x87, // LD A,0x87
        0xD3, 0x00, // OUT (0),A
        0x3E, 0x01, // LD A,1
        0xD3, 0x00, // OUT (0),A
        0x18, 0xFE, // JR -2
    ];
    let mut machine = machine_with(&program);
    for _ in 0..20 {
        machine.step();
    }
    assert!(machine.interrupts().is_interrupt_pending());
    assert!(machine.ctc().unwrap().channel(0).unwrap().is_waiting_for_ack());

    let state = machine.save_state();
    let mut other = machine_with(&program);
    other.load_state(&state).unwrap();
    assert_eq!(other.interrupts(), machine.interrupts());

    // Once interrupts are enabled, the restored machine takes the request
    // and the channel starts counting again.
    for m in [&mut machine, &mut other] {
        m.cpu_mut().regs.iff1 = true;
        assert_eq!(m.step(), 13);
        assert_eq!(m.registers().pc, 0x0038);
        assert!(!m.ctc().unwrap().channel(0).unwrap().is_waiting_for_ack());
        assert!(!m.interrupts().is_acknowledge_pending());
    }
    assert_eq!(other.save_state(), machine.save_state());
}

#[test]
fn load_state_rejects_wrong_length_untouched() {
    let mut machine = machine_with(&[0x3E, 0x05, 0x76]);
    machine.step();
    let before = machine.save_state();

    let err = machine.load_state(&before[..40]).unwrap_err();
    assert!(matches!(
        err,
        Ceres80Error::State(StateError::LengthMismatch {
            expected: 66,
            actual: 40
        })
    ));
    assert_eq!(machine.save_state(), before);
}

#[test]
fn reset_keeps_rom_and_clears_ram() {
    let mut machine = machine_with(&[0x3E, 0x05, 0x32, 0x00, 0x80, 0x76]);
    assert!(machine.run_until_halt(1_000));
    assert_eq!(machine.ram()[0], 0x05);

    machine.reset();
    assert_eq!(machine.ram()[0], 0x00);
    assert_eq!(machine.registers().pc, 0);
    assert!(!machine.cpu().halted);
    assert!(machine.run_until_halt(1_000));
    assert_eq!(machine.ram()[0], 0x05);
}

#[test]
fn tracing_renders_last_instruction() {
    let mut machine = machine_with(&[0x31, 0x00, 0x00, 0x3E, 0x42, 0x32, 0x10, 0x80]);
    assert_eq!(machine.last_trace(), None);

    machine.set_tracing(true);
    machine.step();
    assert_eq!(
        machine.last_trace(),
        Some("Executed 0x31 LD SP,0x0000 @ 0x0000 (10 cycles)")
    );

    machine.step();
    machine.step();
    assert_eq!(
        machine.last_trace(),
        Some(
            "Executed 0x32 LD (0x8010),A @ 0x0005 (13 cycles)\n    \
             Wrote Value 0x42 @ Address 0x8010"
        )
    );

    machine.set_tracing(false);
    assert_eq!(machine.last_trace(), None);
}

#[test]
fn interrupt_manager_starts_idle() {
    let machine = Ceres80::new().unwrap();
    assert_eq!(*machine.interrupts(), InterruptManager::new());
}

use std::path::PathBuf;

use anyhow::{bail, Context};
use ceres80::{format_registers, load_machine, render_ascii, run_headless, DEFAULT_FRAMES};

const USAGE: &str = "usage: ceres80 <rom> [ram] [frames]";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(rom_path) = args.next().map(PathBuf::from) else {
        bail!("no ROM image given\n{USAGE}");
    };

    // A bare number in second position is the frame count.
    let mut ram_path = None;
    let mut frames = None;
    for arg in args {
        match arg.parse::<u32>() {
            Ok(n) if frames.is_none() => frames = Some(n),
            _ if ram_path.is_none() && frames.is_none() => ram_path = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument '{arg}'\n{USAGE}"),
        }
    }
    let frames = frames.unwrap_or(DEFAULT_FRAMES);

    log::info!("Running ROM '{}' for {} frames", rom_path.display(), frames);
    let mut machine = load_machine(&rom_path, ram_path.as_deref())
        .context("could not start the emulator")?;

    let ran = run_headless(&mut machine, frames);
    if machine.cpu().halted {
        println!("CPU halted after {ran} frame(s)");
    } else {
        println!("Ran {ran} frame(s)");
    }
    println!("{}", format_registers(machine.registers()));
    println!();
    print!("{}", render_ascii(&machine.framebuffer()));

    Ok(())
}

// SSD1305 Simulator - Main Entry Point
//
// Brings up the driver against an in-memory bus, draws a demo scene, flushes
// it and prints what the panel would show along with bus statistics.
//
// Usage: ssd1305-sim [--config <path>] [--screenshot <dir>] [--snapshot <file>] [--trace]

use ssd1305::capture::{save_screenshot, FrameSnapshot};
use ssd1305::config::CONFIG_FILE;
use ssd1305::sim::{RecordingTransport, SimDelay, SimPin};
use ssd1305::{BusMode, DisplayConfig, LogLevel, Ssd1305};
use std::path::PathBuf;

/// Command line options
struct Options {
    config_path: PathBuf,
    screenshot_dir: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
    trace: bool,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        config_path: PathBuf::from(CONFIG_FILE),
        screenshot_dir: None,
        snapshot_path: None,
        trace: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                options.config_path = args.next().ok_or("--config needs a path")?.into();
            }
            "--screenshot" => {
                options.screenshot_dir =
                    Some(args.next().ok_or("--screenshot needs a directory")?.into());
            }
            "--snapshot" => {
                options.snapshot_path = Some(args.next().ok_or("--snapshot needs a path")?.into());
            }
            "--trace" => options.trace = true,
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    Ok(options)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("SSD1305 Simulator v0.1.0");
    println!("========================");
    println!();

    let options = parse_args()?;

    let mut config = DisplayConfig::load_or_default(&options.config_path);
    println!(
        "Configuration loaded from '{}'",
        options.config_path.display()
    );
    if options.trace {
        config.logging.level = LogLevel::Trace;
        config.logging.bus_trace = true;
    }

    let dc = SimPin::new();
    let transport = RecordingTransport::new().with_dc_probe(dc.probe());
    let mut delay = SimDelay::new();
    let mut display = Ssd1305::new(transport, dc, SimPin::new(), &mut delay, &config)?;

    let init_bytes = display.transport().transfers().len();
    println!(
        "Controller initialized: {} bytes sent, reset held {} us",
        init_bytes,
        delay.elapsed_ns() / 1_000
    );
    println!();

    // Demo scene: border, diagonals and a few circles
    let geometry = *display.geometry();
    let (w, h) = (geometry.width() as i32, geometry.height() as i32);
    display.draw_line(0, 0, w - 1, 0);
    display.draw_line(w - 1, 0, w - 1, h - 1);
    display.draw_line(w - 1, h - 1, 0, h - 1);
    display.draw_line(0, h - 1, 0, 0);
    display.draw_line(0, 0, w - 1, h - 1);
    display.draw_line(0, h - 1, w - 1, 0);
    display.draw_circle(w / 2, h / 2, h / 2 - 3);
    display.draw_circle(w / 4, h / 2, h / 4);
    display.draw_circle(3 * w / 4, h / 2, h / 4);

    let sent = display.flush()?;
    let repeat = display.flush()?;

    print!("{}", display.framebuffer().to_ascii());
    println!();
    println!("Flush:        {} bytes", sent);
    println!("Second flush: {} bytes (frame unchanged)", repeat);
    println!(
        "Bus totals:   {} command bytes, {} data bytes, {} transfers completed",
        display.transport().bytes(BusMode::Command).len(),
        display.transport().bytes(BusMode::Data).len(),
        display.transport().completed_transfers()
    );

    if let Some(dir) = &options.screenshot_dir {
        let path = save_screenshot(display.framebuffer(), dir)?;
        println!("Screenshot saved to '{}'", path.display());
    }

    if let Some(path) = &options.snapshot_path {
        FrameSnapshot::capture(display.framebuffer()).save_to_file(path)?;
        println!("Snapshot saved to '{}'", path.display());
    }

    if options.trace {
        println!();
        println!("Last bus activity:");
        print!("{}", display.logger().format_last_entries(16));
    }

    Ok(())
}

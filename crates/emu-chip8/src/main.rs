//! CHIP-8 emulator binary.
//!
//! Runs a ROM in a winit window with a pixels framebuffer, or in headless
//! mode for a fixed number of steps with an optional PNG screenshot.

use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use emu_chip8::{
    Chip8, Chip8Config, Quirks, SCREEN_HEIGHT, SCREEN_WIDTH, Scheduler, SeededEntropy, capture,
    keyboard_map,
};
use pixels::{Pixels, SurfaceTexture};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

/// Window scale factor for the 64×32 framebuffer.
const SCALE: u32 = 10;

/// Timer cadence used by headless runs.
const TIMER_PERIOD: Duration = Duration::from_nanos(16_666_667);

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    rom_path: Option<PathBuf>,
    cpu_hz: u32,
    quirks: Quirks,
    seed: Option<u64>,
    headless: bool,
    steps: u64,
    screenshot_path: Option<PathBuf>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        rom_path: None,
        cpu_hz: emu_chip8::DEFAULT_CPU_HZ,
        quirks: Quirks::default(),
        seed: None,
        headless: false,
        steps: 10_000,
        screenshot_path: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--cpu-hz" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.cpu_hz = s.parse().unwrap_or(emu_chip8::DEFAULT_CPU_HZ);
                }
            }
            "--wrap-sprites" => {
                cli.quirks.sprite_wrap = true;
            }
            "--shift-vy" => {
                cli.quirks.shift_source_vy = true;
            }
            "--index-increment" => {
                cli.quirks.index_increment = true;
            }
            "--seed" => {
                i += 1;
                cli.seed = args.get(i).and_then(|s| s.parse().ok());
            }
            "--headless" => {
                cli.headless = true;
            }
            "--steps" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.steps = s.parse().unwrap_or(10_000);
                }
            }
            "--screenshot" => {
                i += 1;
                cli.screenshot_path = args.get(i).map(PathBuf::from);
            }
            "--help" | "-h" => {
                eprintln!("Usage: emu-chip8 --rom <file> [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --rom <file>         ROM to load at 0x200 (required)");
                eprintln!("  --cpu-hz <n>         Instruction rate [default: 700]");
                eprintln!("  --wrap-sprites       Sprites wrap at screen edges instead of clipping");
                eprintln!("  --shift-vy           8xy6/8xyE shift Vy into Vx instead of Vx in place");
                eprintln!("  --index-increment    Fx55/Fx65 leave I at I + x + 1");
                eprintln!("  --seed <n>           Seed the random source (reproducible runs)");
                eprintln!("  --headless           Run without a window");
                eprintln!("  --steps <n>          Instructions to run in headless mode [default: 10000]");
                eprintln!("  --screenshot <file>  Save a PNG screenshot (headless)");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn make_machine(cli: &CliArgs) -> Chip8 {
    let Some(ref path) = cli.rom_path else {
        eprintln!("A ROM is required: emu-chip8 --rom <file>");
        process::exit(1);
    };
    let rom = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read ROM file {}: {e}", path.display());
            process::exit(1);
        }
    };

    let config = Chip8Config {
        cpu_hz: cli.cpu_hz,
        quirks: cli.quirks,
    };
    let mut machine = Chip8::new(&config);
    if let Some(seed) = cli.seed {
        machine.set_entropy(Box::new(SeededEntropy::new(seed)));
    }
    if let Err(e) = machine.load_rom(&rom) {
        eprintln!("Failed to load {}: {e}", path.display());
        process::exit(1);
    }
    machine
}

// ---------------------------------------------------------------------------
// Headless mode
// ---------------------------------------------------------------------------

fn run_headless(cli: &CliArgs) {
    let mut machine = make_machine(cli);
    let mut scheduler = Scheduler::new(machine.cpu_hz());

    // Synthetic time: one 60 Hz period per pass, no sleeping.
    while machine.step_count() < cli.steps {
        let pass = scheduler.advance_elapsed(&mut machine, TIMER_PERIOD);
        for fault in &pass.faults {
            eprintln!("fault: {fault}");
        }
        if pass.cpu_steps == 0 && !pass.timer_ticked {
            break;
        }
    }

    if let Some(ref path) = cli.screenshot_path {
        if let Err(e) = capture::save_screenshot(&machine, path, SCALE) {
            eprintln!("Screenshot error: {e}");
            process::exit(1);
        }
        eprintln!("Screenshot saved to {}", path.display());
    }
}

// ---------------------------------------------------------------------------
// Windowed mode (winit + pixels)
// ---------------------------------------------------------------------------

struct App {
    machine: Chip8,
    scheduler: Scheduler,
    window: Option<&'static Window>,
    pixels: Option<Pixels<'static>>,
    title: String,
    beeping: bool,
}

impl App {
    fn new(machine: Chip8, title: String) -> Self {
        let scheduler = Scheduler::new(machine.cpu_hz());
        Self {
            machine,
            scheduler,
            window: None,
            pixels: None,
            title,
            beeping: false,
        }
    }

    fn handle_key(&mut self, keycode: KeyCode, pressed: bool) {
        if let Some(key) = keyboard_map::map_keycode(keycode) {
            if pressed {
                self.machine.press_key(key);
            } else {
                self.machine.release_key(key);
            }
        }
    }

    fn update_pixels(&mut self) {
        let Some(pixels) = self.pixels.as_mut() else {
            return;
        };

        let fb = self.machine.framebuffer().pixels();
        let frame = pixels.frame_mut();
        for (cell, &on) in frame.chunks_exact_mut(4).zip(fb.iter()) {
            let value = if on { 0xFF } else { 0x00 };
            cell[0] = value;
            cell[1] = value;
            cell[2] = value;
            cell[3] = 0xFF;
        }
    }

    /// Reflect the sound-timer condition in the window title. This is the
    /// whole audio obligation: the core exposes the condition, the
    /// frontend decides how to present it.
    fn update_beep_indicator(&mut self) {
        let beeping = self.machine.sound_active();
        if beeping == self.beeping {
            return;
        }
        self.beeping = beeping;
        if let Some(window) = self.window {
            if beeping {
                window.set_title(&format!("{} ♪", self.title));
            } else {
                window.set_title(&self.title);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already created
        }

        let size = winit::dpi::LogicalSize::new(
            SCREEN_WIDTH as u32 * SCALE,
            SCREEN_HEIGHT as u32 * SCALE,
        );
        let attrs = WindowAttributes::default()
            .with_title(&self.title)
            .with_inner_size(size)
            .with_resizable(false);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                // Leak the window to get a 'static reference. Intentional:
                // it lives for the whole process and the OS reclaims it at
                // exit.
                let window: &'static Window = Box::leak(Box::new(window));
                let inner = window.inner_size();
                let surface = SurfaceTexture::new(inner.width, inner.height, window);
                match Pixels::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, surface) {
                    Ok(pixels) => {
                        self.pixels = Some(pixels);
                    }
                    Err(e) => {
                        eprintln!("Failed to create pixels: {e}");
                        event_loop.exit();
                        return;
                    }
                }
                self.window = Some(window);
            }
            Err(e) => {
                eprintln!("Failed to create window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                // Between scheduler passes, never mid-instruction.
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    match keycode {
                        KeyCode::Escape if pressed => {
                            event_loop.exit();
                            return;
                        }
                        KeyCode::F5 if pressed => {
                            self.machine.reset();
                            self.scheduler.pause();
                            return;
                        }
                        _ => self.handle_key(keycode, pressed),
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let pass = self.scheduler.advance(&mut self.machine, Instant::now());
                for fault in &pass.faults {
                    eprintln!("fault: {fault}");
                }
                if pass.frame_due {
                    self.update_pixels();
                    self.update_beep_indicator();
                    if let Some(pixels) = self.pixels.as_ref() {
                        if let Err(e) = pixels.render() {
                            eprintln!("Render error: {e}");
                            event_loop.exit();
                        }
                    }
                }
                // Sleep off the slack to the next due tick instead of
                // spinning the redraw loop flat out.
                thread::sleep(self.scheduler.until_next());
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    let cli = parse_args();

    if cli.headless {
        run_headless(&cli);
        return;
    }

    let machine = make_machine(&cli);
    let title = cli
        .rom_path
        .as_ref()
        .and_then(|p| p.file_name())
        .map_or_else(|| "CHIP-8".to_string(), |n| format!("CHIP-8: {}", n.to_string_lossy()));

    let event_loop = match EventLoop::new() {
        Ok(el) => el,
        Err(e) => {
            eprintln!("Failed to create event loop: {e}");
            process::exit(1);
        }
    };
    let mut app = App::new(machine, title);
    if let Err(e) = event_loop.run_app(&mut app) {
        eprintln!("Event loop error: {e}");
        process::exit(1);
    }
}

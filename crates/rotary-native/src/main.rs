mod input;
mod port;
mod render;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use rotary_core::{
    Installation, OrthoCamera, PrefsStore, SampleQueue, SceneLayout, DEFAULT_BAUD_RATE,
};
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::PhysicalKey,
    window::WindowBuilder,
};

use input::{InputState, KeyCommand};
use port::SerialLink;
use render::SpriteRenderer;

/// Rotary-encoder driven camera installation.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Serial port of the encoder; overrides the saved port.
    #[arg(long)]
    port: Option<String>,

    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Preferences file (default: ~/.rotary_cam/prefs.json).
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// List available serial ports and exit.
    #[arg(long)]
    list_ports: bool,

    /// Start from default settings, discarding saved ones.
    #[arg(long)]
    reset_prefs: bool,

    /// Run without opening a serial port (arrow keys only).
    #[arg(long)]
    no_serial: bool,
}

fn open_prefs(args: &Args) -> PrefsStore {
    let path = match &args.prefs {
        Some(path) => path.clone(),
        None => PrefsStore::default_path().unwrap_or_else(|e| {
            log::warn!("{e}; using ./prefs.json");
            PathBuf::from("prefs.json")
        }),
    };
    let mut prefs = match PrefsStore::open(&path) {
        Ok(prefs) => prefs,
        Err(e) => {
            log::warn!("{e}; starting with default settings");
            PrefsStore::empty(&path)
        }
    };
    if args.reset_prefs {
        prefs.clear();
        log::info!("preferences reset");
    }
    prefs
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    if args.list_ports {
        port::list_ports();
        return Ok(());
    }

    let mut prefs = open_prefs(&args);
    let mut scene = Installation::new(SceneLayout::default(), OrthoCamera::default());
    scene.load(&prefs);
    if let Some(port) = &args.port {
        scene.controller.port_name = port.clone();
    }
    scene.controller.baud_rate = args.baud;

    let mut link = SerialLink::new(SampleQueue::new(), scene.controller.baud_rate);
    if !args.no_serial {
        link.open(&scene.controller.port_name);
    }
    if !link.is_open() {
        log::warn!("no encoder connected; arrow keys move the camera, P tries the next port");
    }

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Rotary Camera")
        .build(&event_loop)?;

    let mut gpu = pollster::block_on(SpriteRenderer::new(&window))?;
    let size = gpu.size();
    scene.camera.resize(size.width, size.height);

    let mut input = InputState::default();
    let start = Instant::now();
    let mut last_frame = start;
    let mut shut_down = false;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => {
            gpu.resize(size);
            if size.width > 0 && size.height > 0 {
                scene.camera.resize(size.width, size.height);
            }
        }
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event: WindowEvent::CursorMoved { position, .. },
            ..
        } => input.cursor_px = [position.x as f32, position.y as f32],
        Event::WindowEvent {
            event: WindowEvent::MouseInput { state, button, .. },
            ..
        } => input.on_mouse(state, button),
        Event::WindowEvent {
            event: WindowEvent::KeyboardInput { event, .. },
            ..
        } => {
            if let PhysicalKey::Code(code) = event.physical_key {
                if input.on_key(code, event.state, event.repeat) == Some(KeyCommand::Quit) {
                    elwt.exit();
                }
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            let dt = (now - last_frame).as_secs_f32();
            last_frame = now;

            if input.take_next_port() {
                let ports = port::available_ports();
                match port::next_port(&scene.controller.port_name, &ports) {
                    Some(next) => {
                        if scene.controller.request_port(&next) {
                            link.open(&next);
                        }
                    }
                    None => log::warn!("no other serial port available"),
                }
            }

            let camera = scene.camera.clone();
            let frame = input.take_frame(dt, start.elapsed().as_secs_f32(), |p| {
                camera.screen_to_world(p[0], p[1])
            });
            let lines = link.drain();
            if !lines.is_empty() {
                log::debug!("drained {} lines", lines.len());
            }
            scene.tick(&frame, lines);

            let instances = scene.draw_list(frame.time_sec);
            match gpu.render(scene.camera.view_proj(), &instances) {
                Ok(_) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    gpu.resize(gpu.window.inner_size())
                }
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(e) => log::warn!("frame skipped: {e}"),
            }
        }
        Event::LoopExiting => {
            if shut_down {
                return;
            }
            shut_down = true;
            link.close();
            scene.save(&mut prefs);
            match prefs.save() {
                Ok(()) => log::info!("settings saved to {}", prefs.path().display()),
                Err(e) => log::error!("{e}"),
            }
        }
        _ => {}
    })?;
    Ok(())
}

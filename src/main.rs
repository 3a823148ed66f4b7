// What you SEE:
// • The image at its own size. Hover it and the chosen filter appears
//   around the pointer; move away and it fades out.
// • Up/Down: radius. [ / ]: cell size. Tab: next style. ESC quits.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use hover_fx::config::load_options;
use hover_fx::cursor::Viewport;
use hover_fx::raster::{composite_over, draw_crosshair, draw_text_5x7};
use hover_fx::window::{Command, PointerEvent, Viewer};
use hover_fx::{Effect, EffectOptions, Element, FrameBuffer, ImageElement, Point, Rgb, Setting, StyleTag};

/// hover-fx - cursor-reactive image filters
#[derive(Parser, Debug)]
#[command(name = "hover-fx")]
#[command(version, about, long_about = None)]
struct Args {
    /// Image to display
    image: PathBuf,

    /// Effect style: pixel, minecraft, particle-dust, ascii, zoom, blur, lego, dot-matrix
    #[arg(short, long, default_value = "pixel")]
    effect: String,

    /// TOML file with effect options (overrides --effect)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn init_logging(level: LevelFilter) -> anyhow::Result<()> {
    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S%.3f)} {h({l:<5})} {t} {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(Root::builder().appender("console").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

const BACKDROP: Rgb = Rgb::new(24, 24, 24);
const RADIUS_STEP: f32 = 10.0;

/// The setter that changes this style's cell size, if it has one.
fn cell_setting(style: StyleTag, step: u32) -> Option<Setting> {
    match style {
        StyleTag::Pixel | StyleTag::Minecraft | StyleTag::Lego => Some(Setting::BlockSize(step)),
        StyleTag::ParticleDust => Some(Setting::Spacing(step)),
        StyleTag::Ascii => Some(Setting::Size(step)),
        StyleTag::DotMatrix => Some(Setting::LedSpacing(step)),
        StyleTag::Zoom | StyleTag::Blur => None,
    }
}

fn next_style(style: StyleTag) -> StyleTag {
    let i = StyleTag::ALL.iter().position(|&t| t == style).unwrap_or(0);
    StyleTag::ALL[(i + 1) % StyleTag::ALL.len()]
}

/// Apply one key command. Style switches replace the effect.
fn apply_command(effect: &mut Effect, cmd: Command, element: &Element, pointer: Option<Point>) {
    let style = effect.tag();
    let result = match cmd {
        Command::RadiusUp => effect.set(Setting::Radius(effect.options().radius() + RADIUS_STEP)).map(|_| ()),
        Command::RadiusDown => {
            effect.set(Setting::Radius((effect.options().radius() - RADIUS_STEP).max(0.0))).map(|_| ())
        }
        Command::CellSmaller | Command::CellLarger => {
            let Some(step) = effect.options().cell_size() else { return };
            let next = match cmd {
                Command::CellSmaller => step.saturating_sub((step / 5).max(1)).max(1),
                _ => step + (step / 4).max(1),
            };
            match cell_setting(style, next) {
                Some(setting) => effect.set(setting).map(|_| ()),
                None => Ok(()),
            }
        }
        Command::NextStyle => {
            effect.destroy();
            let tag = next_style(style);
            *effect = Effect::new(EffectOptions::defaults(tag));
            effect.attach(element);
            if let Some(p) = pointer {
                effect.pointer_enter(p);
            }
            log::info!("switched to {tag}");
            Ok(())
        }
    };
    if let Err(e) = result {
        log::warn!("{e}");
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level)?;

    /* --- Source image ---
       Visual: the picture you hover. */
    let mut image = ImageElement::open(&args.image)
        .with_context(|| format!("failed to open {}", args.image.display()))?;
    image.id = Some("viewer".into());
    let img = image.pixels().map(Arc::clone).context("image has no pixels")?;
    let (w, h) = (image.width, image.height);

    let opts = match &args.config {
        Some(path) => load_options(path)?,
        None => EffectOptions::defaults(args.effect.parse()?),
    };

    let element = Element::Image(image);
    let mut effect = Effect::new(opts);
    effect.attach(&element);

    let mut viewer = Viewer::new("hover-fx", w as usize, h as usize)?;
    // The window shows the image 1:1 at its top-left corner.
    let viewport = Viewport::new(Point::new(0.0, 0.0), (w as f32, h as f32), (w as usize, h as usize));

    /* --- Base picture, flattened over a dark backdrop ---
       Visual: transparent parts of the image show dark gray. */
    let mut base = FrameBuffer::new(w as usize, h as usize);
    base.pixels.fill(BACKDROP.to_argb(255));
    composite_over(&mut base, &FrameBuffer::from_rgba(&img), 1.0);
    let mut screen = base.clone();

    /* --- HUD / FPS --- */
    let start = Instant::now();
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while viewer.is_open() {
        let now = start.elapsed();

        /* 1) Pointer -> effect (cheap: just records the position). */
        match viewer.poll_pointer() {
            Some(PointerEvent::Enter(p)) => effect.pointer_enter(viewport.to_surface(p)),
            Some(PointerEvent::Move(p)) => effect.pointer_move(viewport.to_surface(p)),
            Some(PointerEvent::Leave) => effect.pointer_leave(now),
            None => {}
        }

        /* 2) Keys */
        for cmd in viewer.commands() {
            apply_command(&mut effect, cmd, &element, viewer.pointer().map(|p| viewport.to_surface(p)));
        }

        /* 3) Run the effect's scheduled frame, if it has one. */
        effect.tick(now);
        if let Some(handle) = effect.pending_frame() {
            effect.run_frame(handle, now);
        }

        /* 4) Compose: image, overlay at its fade opacity, crosshair, HUD. */
        screen.pixels.copy_from_slice(&base.pixels);
        effect.composite_onto(&mut screen);
        if let Some(p) = viewer.pointer() {
            draw_crosshair(&mut screen, p.x as i32, p.y as i32, 8, Rgb::new(255, 204, 51));
        }

        let info = effect.debug_info();
        let cell = info.cell_size.map_or(String::new(), |c| format!(" | SIZE {c}"));
        let hud = format!(
            "{} | R {:.0}{} | CELLS {} | {}",
            info.style.as_str().to_uppercase(),
            info.radius,
            cell,
            info.cells,
            hud_fps_text
        );
        draw_text_5x7(&mut screen, 8, 8, &hud, Rgb::WHITE);

        /* 5) Present */
        viewer.present(&screen)?;

        /* 6) FPS, once per second */
        frames_this_second += 1;
        let since = last_fps_time.elapsed();
        if since >= Duration::from_secs(1) {
            let fps = frames_this_second as f32 / since.as_secs_f32();
            log::debug!("FPS: {fps:.1} ({} effect frames total)", info.frames_rendered);
            hud_fps_text = format!("FPS {fps:.1}");
            frames_this_second = 0;
            last_fps_time = Instant::now();
        }
    }

    effect.destroy();
    Ok(())
}

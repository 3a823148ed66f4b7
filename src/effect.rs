// Effect façade: one hover effect bound to one image.
//
//   Unattached --attach--> Attached --decoded--> Sampled <--enter/leave--> Rendering
//        \______________________ destroy() from anywhere ______________________/--> Destroyed
//
// The host drives everything: it forwards pointer events, asks for the
// pending frame handle and runs it with its own clock. Pointer handlers only
// record state; drawing happens in `Effect::run_frame`.
// Visual: nothing until the pointer enters, then the style redrawn each frame.

use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use log::{debug, error, info, trace, warn};
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::cursor::{Cursor, CursorMotion};
use crate::error::Error;
use crate::frame::{FrameHandle, FrameLoop, Tick};
use crate::params::{Applied, EffectOptions, Setting, SettingKind, StyleTag};
use crate::raster::composite_over;
use crate::render::{FrameCtx, Renderer};
use crate::sampler::{Grid, SourcePixels, sample_grid};
use crate::surface::RenderSurface;
use crate::targets::{Element, ImageSource};
use crate::types::{FrameBuffer, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unattached,
    /// Bound to an image that has not finished decoding.
    Attached,
    /// Cells sampled; cursor away.
    Sampled,
    /// Cursor over the image; frame loop running.
    Rendering,
    Destroyed,
}

/// Snapshot for introspection.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
    pub style: StyleTag,
    pub state: Lifecycle,
    pub cells: usize,
    pub cursor_active: bool,
    pub cursor: Point,
    pub surface: (usize, usize),
    pub frames_rendered: u64,
    pub radius: f32,
    pub cell_size: Option<u32>,
}

pub struct Effect {
    opts: EffectOptions,
    state: Lifecycle,
    /// Displayed size of the target; the surface is sized to it.
    display: (u32, u32),
    image: Option<Arc<RgbaImage>>,
    source: Option<SourcePixels>,
    surface: Option<RenderSurface>,
    grid: Grid,
    renderer: Option<Renderer>,
    cursor: Cursor,
    motion: CursorMotion,
    frames: FrameLoop,
    frames_rendered: u64,
    rng: Box<dyn RngCore>,
}

impl Effect {
    pub fn new(mut opts: EffectOptions) -> Self {
        opts.sanitize();
        let frames = FrameLoop::new(opts.max_fps());
        Self {
            opts,
            state: Lifecycle::Unattached,
            display: (0, 0),
            image: None,
            source: None,
            surface: None,
            grid: Grid::default(),
            renderer: None,
            cursor: Cursor::default(),
            motion: CursorMotion::default(),
            frames,
            frames_rendered: 0,
            rng: Box::new(Xoshiro256PlusPlus::from_rng(&mut rand::rng())),
        }
    }

    /// Replace the random source (particle spawn, LED drift, motion jitter).
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn tag(&self) -> StyleTag {
        self.opts.tag()
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn options(&self) -> &EffectOptions {
        &self.opts
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn surface(&self) -> Option<&RenderSurface> {
        self.surface.as_ref()
    }

    /// Bind to `element`. Anything but an image is logged and ignored,
    /// leaving the effect inert (detach/destroy stay safe).
    pub fn attach(&mut self, element: &Element) {
        if self.state != Lifecycle::Unattached {
            warn!("{} effect is already attached ({:?}); destroy and recreate to retarget", self.tag(), self.state);
            return;
        }
        let Element::Image(img) = element else {
            error!("{}", Error::InvalidTarget { tag: element.tag().to_string() });
            return;
        };

        self.display = (img.width, img.height);
        self.state = Lifecycle::Attached;
        info!("{} effect attached to {}", self.tag(), element.describe());

        match &img.source {
            ImageSource::Decoded(pixels) => self.image_decoded(Arc::clone(pixels)),
            ImageSource::Pending => debug!("waiting for image decode"),
            ImageSource::Tainted { width, height } => {
                let (w, h) = self.surface_size((*width, *height));
                self.source = Some(SourcePixels::Tainted { width: w as usize, height: h as usize });
                self.setup(w, h);
            }
        }
    }

    /// Decode-complete notification for the attached image.
    pub fn image_decoded(&mut self, image: Arc<RgbaImage>) {
        if self.state != Lifecycle::Attached {
            warn!("ignoring decode notification in state {:?}", self.state);
            return;
        }
        let (w, h) = self.surface_size(image.dimensions());
        self.source = Some(SourcePixels::from_image(&image, w, h));
        self.image = Some(image);
        self.setup(w, h);
    }

    fn surface_size(&self, natural: (u32, u32)) -> (u32, u32) {
        match self.display {
            (0, _) | (_, 0) => natural,
            d => d,
        }
    }

    fn setup(&mut self, w: u32, h: u32) {
        self.surface = Some(RenderSurface::new(w as usize, h as usize));
        self.state = Lifecycle::Sampled;
        self.resample();
        info!("{} effect ready: {}x{} surface, {} cells", self.tag(), w, h, self.grid.len());
    }

    /// Rebuild the source at surface size if needed, then the cell list and
    /// the renderer state. Failures leave an empty grid.
    fn resample(&mut self) {
        let Some(surface) = &self.surface else { return };
        let (w, h) = surface.size();

        if let Some(source) = &self.source
            && source.size() != (w, h)
        {
            self.source = Some(match (&self.image, source) {
                (Some(img), SourcePixels::Readable(_)) => SourcePixels::from_image(img, w as u32, h as u32),
                _ => SourcePixels::Tainted { width: w, height: h },
            });
        }
        let Some(source) = &self.source else { return };

        self.grid = match self.opts.grid_spec() {
            Some(spec) => sample_grid(source, &spec).unwrap_or_else(|e| {
                warn!("{} effect: {e}; rendering nothing", self.opts.tag());
                Grid::empty(spec, w, h)
            }),
            None => {
                if let Err(e) = source.read() {
                    warn!("{} effect: {e}; rendering nothing", self.opts.tag());
                }
                Grid { width: w, height: h, ..Grid::default() }
            }
        };
        self.renderer = Some(Renderer::prepare(&self.opts, &self.grid, source, self.rng.as_mut()));
        self.frames.reset_throttle();
        debug!("{} effect sampled {} cells", self.opts.tag(), self.grid.len());
    }

    fn grid_is_stale(&self) -> bool {
        let Some(surface) = &self.surface else { return false };
        let (w, h) = surface.size();
        match self.opts.grid_spec() {
            Some(spec) => !self.grid.matches(&spec, w, h),
            None => (self.grid.width, self.grid.height) != (w, h),
        }
    }

    /// Stop rendering and drop the surface. Safe in any state.
    pub fn detach(&mut self) {
        if self.state == Lifecycle::Destroyed {
            return;
        }
        self.frames.cancel();
        self.cursor.leave();
        self.motion.reset();
        if self.surface.take().is_some() {
            debug!("{} effect detached", self.tag());
        }
        self.renderer = None;
        self.grid = Grid::default();
        self.source = None;
        self.image = None;
        self.state = Lifecycle::Unattached;
    }

    /// Release everything. Calling it again does nothing.
    pub fn destroy(&mut self) {
        if self.state == Lifecycle::Destroyed {
            return;
        }
        self.detach();
        self.state = Lifecycle::Destroyed;
        info!("{} effect destroyed", self.tag());
    }

    fn can_render(&self) -> bool {
        matches!(self.state, Lifecycle::Sampled | Lifecycle::Rendering)
    }

    pub fn pointer_enter(&mut self, pos: Point) {
        if !self.can_render() {
            return;
        }
        self.cursor.enter(pos);
        if let Some(surface) = &mut self.surface {
            surface.show();
        }
        if self.state != Lifecycle::Rendering {
            self.state = Lifecycle::Rendering;
            self.frames.reset_throttle();
        }
        self.frames.request();
    }

    /// Only records the position; the next frame draws it.
    pub fn pointer_move(&mut self, pos: Point) {
        match self.state {
            Lifecycle::Sampled => self.pointer_enter(pos),
            Lifecycle::Rendering => self.cursor.pos = pos,
            _ => {}
        }
    }

    pub fn pointer_leave(&mut self, now: Duration) {
        if self.state != Lifecycle::Rendering {
            return;
        }
        self.cursor.leave();
        self.motion.reset();
        self.frames.cancel();
        if let Some(surface) = &mut self.surface {
            surface.hide(now);
        }
        self.state = Lifecycle::Sampled;
    }

    /// The handle the host should run next, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frames.pending()
    }

    /// Run a scheduled frame. Stale handles do nothing. Returns true when
    /// the surface was redrawn.
    pub fn run_frame(&mut self, handle: FrameHandle, now: Duration) -> bool {
        let frame = match self.frames.accept(handle, now) {
            Tick::Stale => {
                trace!("{} effect: frame {} is stale", self.tag(), handle.id());
                return false;
            }
            Tick::Throttled => {
                self.frames.request();
                return false;
            }
            Tick::Run { frame } => frame,
        };
        if self.state != Lifecycle::Rendering || self.surface.is_none() {
            return false;
        }

        if self.grid_is_stale() {
            debug!("{} effect: surface no longer matches grid, re-sampling", self.tag());
            self.resample();
        }
        self.motion.update(&self.cursor, now);

        let (Some(surface), Some(renderer), Some(source)) = (&mut self.surface, &mut self.renderer, &self.source)
        else {
            return false;
        };
        surface.tick(now);
        let ctx = FrameCtx { cursor: self.cursor, falloff: self.opts.falloff(), motion: &self.motion, frame, now };
        renderer.draw(&mut surface.fb, &self.opts, &self.grid, source, &ctx, self.rng.as_mut());

        self.frames_rendered += 1;
        self.frames.request();
        true
    }

    /// Advance the surface fade and delayed clear. Hosts call this every
    /// tick, frame loop or not.
    pub fn tick(&mut self, now: Duration) {
        if let Some(surface) = &mut self.surface {
            surface.tick(now);
        }
    }

    /// The target was resized; the next frame re-samples.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.state == Lifecycle::Destroyed {
            return;
        }
        self.display = (width, height);
        if let Some(surface) = &mut self.surface
            && surface.resize(width as usize, height as usize)
        {
            debug!("{} effect surface resized to {width}x{height}", self.opts.tag());
        }
    }

    pub fn supports(&self, kind: SettingKind) -> bool {
        self.opts.supports(kind)
    }

    /// Change one parameter. Structural changes re-sample right away when
    /// there is something to sample.
    pub fn set(&mut self, setting: Setting) -> Result<Applied, Error> {
        let kind = setting.kind();
        let applied = self.opts.apply(setting)?;
        debug!("{} effect: {} -> {:?}", self.tag(), kind.name(), applied);
        if applied == Applied::Resampled && self.can_render() {
            self.resample();
            info!("{} effect re-sampled: {} cells", self.tag(), self.grid.len());
        }
        Ok(applied)
    }

    pub fn samples_count(&self) -> usize {
        self.grid.len()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo {
            style: self.tag(),
            state: self.state,
            cells: self.grid.len(),
            cursor_active: self.cursor.active,
            cursor: self.cursor.pos,
            surface: self.surface.as_ref().map_or((0, 0), RenderSurface::size),
            frames_rendered: self.frames_rendered,
            radius: self.opts.radius(),
            cell_size: self.opts.cell_size(),
        }
    }

    /// Composite the surface over `base` at its current fade opacity.
    pub fn composite_onto(&self, base: &mut FrameBuffer) {
        if let Some(surface) = &self.surface {
            composite_over(base, &surface.fb, surface.opacity());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::ImageElement;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn opaque(w: u32, h: u32) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_pixel(w, h, image::Rgba([200, 120, 40, 255])))
    }

    fn img_element(source: ImageSource, w: u32, h: u32) -> Element {
        Element::Image(ImageElement { id: None, classes: Vec::new(), width: w, height: h, source })
    }

    fn effect(tag: StyleTag) -> Effect {
        Effect::new(EffectOptions::defaults(tag)).with_rng(Xoshiro256PlusPlus::seed_from_u64(42))
    }

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn test_decoded_image_goes_straight_to_sampled() {
        let mut fx = effect(StyleTag::Pixel);
        fx.attach(&img_element(ImageSource::Decoded(opaque(320, 200)), 320, 200));
        assert_eq!(fx.state(), Lifecycle::Sampled);
        assert_eq!(fx.samples_count(), 260);
    }

    #[test]
    fn test_pending_image_waits_for_decode() {
        let mut fx = effect(StyleTag::Minecraft);
        fx.attach(&img_element(ImageSource::Pending, 56, 56));
        assert_eq!(fx.state(), Lifecycle::Attached);
        assert_eq!(fx.samples_count(), 0);
        fx.image_decoded(opaque(112, 112));
        assert_eq!(fx.state(), Lifecycle::Sampled);
        // sampled at displayed size
        assert_eq!(fx.debug_info().surface, (56, 56));
        assert_eq!(fx.samples_count(), 4);
    }

    #[test]
    fn test_non_image_target_leaves_effect_inert() {
        let mut fx = effect(StyleTag::Lego);
        fx.attach(&Element::Other { tag: "div".into(), id: None, classes: Vec::new() });
        assert_eq!(fx.state(), Lifecycle::Unattached);
        fx.pointer_enter(Point::new(1.0, 1.0));
        assert!(fx.pending_frame().is_none());
        fx.detach();
        fx.destroy();
        fx.destroy();
        assert_eq!(fx.state(), Lifecycle::Destroyed);
    }

    #[test]
    fn test_tainted_source_samples_nothing() {
        let mut fx = effect(StyleTag::ParticleDust);
        fx.attach(&img_element(ImageSource::Tainted { width: 64, height: 64 }, 64, 64));
        assert_eq!(fx.state(), Lifecycle::Sampled);
        assert_eq!(fx.samples_count(), 0);
        fx.pointer_enter(Point::new(10.0, 10.0));
        let h = fx.pending_frame().unwrap();
        assert!(fx.run_frame(h, MS(0)));
        assert!(fx.surface().unwrap().fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_enter_frame_leave_cycle() {
        let mut fx = effect(StyleTag::Pixel);
        fx.attach(&img_element(ImageSource::Decoded(opaque(64, 64)), 64, 64));
        fx.pointer_enter(Point::new(32.0, 32.0));
        assert_eq!(fx.state(), Lifecycle::Rendering);

        let h = fx.pending_frame().unwrap();
        assert!(fx.run_frame(h, MS(0)));
        let px = fx.surface().unwrap().fb.pixels[32 * 64 + 32];
        assert_eq!(px >> 24, 255);

        fx.pointer_leave(MS(10));
        assert_eq!(fx.state(), Lifecycle::Sampled);
        assert!(fx.pending_frame().is_none());
        // the cancelled handle is stale
        assert!(!fx.run_frame(h, MS(20)));
        fx.tick(MS(400));
        assert!(fx.surface().unwrap().fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_first_move_activates() {
        let mut fx = effect(StyleTag::Ascii);
        fx.attach(&img_element(ImageSource::Decoded(opaque(64, 64)), 64, 64));
        fx.pointer_move(Point::new(5.0, 5.0));
        assert_eq!(fx.state(), Lifecycle::Rendering);
        assert!(fx.cursor().active);
    }

    #[test]
    fn test_frame_after_destroy_is_noop() {
        let mut fx = effect(StyleTag::DotMatrix);
        fx.attach(&img_element(ImageSource::Decoded(opaque(64, 64)), 64, 64));
        fx.pointer_enter(Point::new(5.0, 5.0));
        let h = fx.pending_frame().unwrap();
        fx.destroy();
        assert!(!fx.run_frame(h, MS(0)));
        assert!(fx.surface().is_none());
        assert_eq!(fx.frames_rendered(), 0);
    }

    #[test]
    fn test_structural_setter_resamples() {
        let mut fx = effect(StyleTag::Pixel);
        fx.attach(&img_element(ImageSource::Decoded(opaque(64, 64)), 64, 64));
        assert_eq!(fx.samples_count(), 16);
        assert_eq!(fx.set(Setting::BlockSize(8)).unwrap(), Applied::Resampled);
        assert_eq!(fx.samples_count(), 64);
        assert_eq!(fx.set(Setting::Radius(10.0)).unwrap(), Applied::Cosmetic);
        assert_eq!(fx.samples_count(), 64);
        assert!(fx.set(Setting::Gap(3)).is_err());
    }

    #[test]
    fn test_setters_work_before_attach() {
        let mut fx = effect(StyleTag::Lego);
        assert_eq!(fx.set(Setting::BlockSize(10)).unwrap(), Applied::Resampled);
        assert_eq!(fx.samples_count(), 0);
        fx.attach(&img_element(ImageSource::Decoded(opaque(40, 40)), 40, 40));
        assert_eq!(fx.samples_count(), 16);
    }

    #[test]
    fn test_resize_resamples_on_next_frame() {
        let mut fx = effect(StyleTag::Pixel);
        fx.attach(&img_element(ImageSource::Decoded(opaque(64, 64)), 64, 64));
        fx.pointer_enter(Point::new(0.0, 0.0));
        fx.resize(32, 32);
        assert_eq!(fx.samples_count(), 16);
        let h = fx.pending_frame().unwrap();
        fx.run_frame(h, MS(0));
        assert_eq!(fx.samples_count(), 4);
    }

    #[test]
    fn test_fps_cap_skips_early_frames() {
        let mut fx = effect(StyleTag::Ascii);
        fx.attach(&img_element(ImageSource::Decoded(opaque(64, 64)), 64, 64));
        fx.pointer_enter(Point::new(5.0, 5.0));
        let h = fx.pending_frame().unwrap();
        assert!(fx.run_frame(h, MS(0)));
        let h = fx.pending_frame().unwrap();
        assert!(!fx.run_frame(h, MS(10)));
        // rescheduled, not dropped
        let h = fx.pending_frame().unwrap();
        assert!(fx.run_frame(h, MS(40)));
        assert_eq!(fx.frames_rendered(), 2);
    }

    #[test]
    fn test_every_style_renders_a_frame() {
        for tag in StyleTag::ALL {
            let mut fx = effect(tag);
            fx.attach(&img_element(ImageSource::Decoded(opaque(96, 64)), 96, 64));
            fx.pointer_enter(Point::new(48.0, 32.0));
            let h = fx.pending_frame().unwrap();
            assert!(fx.run_frame(h, MS(100)), "{tag} did not render");
            let drawn = fx.surface().unwrap().fb.pixels.iter().any(|&p| p >> 24 != 0);
            assert!(drawn, "{tag} drew nothing");
        }
    }

    #[test]
    fn test_structural_setter_while_rendering_rebuilds_renderer_state() {
        let mut fx = effect(StyleTag::ParticleDust);
        fx.attach(&img_element(ImageSource::Decoded(opaque(64, 64)), 64, 64));
        fx.pointer_enter(Point::new(32.0, 32.0));
        let h = fx.pending_frame().unwrap();
        assert!(fx.run_frame(h, MS(0)));
        assert_eq!(fx.state(), Lifecycle::Rendering);

        assert_eq!(fx.set(Setting::Spacing(8)).unwrap(), Applied::Resampled);
        assert_eq!(fx.samples_count(), 64);
        let Some(Renderer::Dust(field)) = &fx.renderer else { panic!("expected particles") };
        assert_eq!(field.len(), fx.samples_count());
        // still rendering, next frame draws the new field
        let h = fx.pending_frame().unwrap();
        assert!(fx.run_frame(h, MS(16)));

        let mut fx = effect(StyleTag::DotMatrix);
        fx.set(Setting::AnimationType(crate::params::AnimationType::Drift)).unwrap();
        fx.attach(&img_element(ImageSource::Decoded(opaque(63, 63)), 63, 63));
        fx.pointer_enter(Point::new(30.0, 30.0));
        assert_eq!(fx.samples_count(), 49);
        assert_eq!(fx.set(Setting::LedSpacing(21)).unwrap(), Applied::Resampled);
        assert_eq!(fx.samples_count(), 9);
        let Some(Renderer::Led(drift)) = &fx.renderer else { panic!("expected LEDs") };
        assert_eq!(drift.len(), 9);
        assert_eq!(fx.set(Setting::LedSpacing(21)).unwrap(), Applied::Unchanged);
    }
}

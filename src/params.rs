// Effect parameters.
// Each style has one flat options record. The same record is the runtime
// parameter set: setters mutate it in place and report whether the change
// was structural (cell list must be re-sampled) or cosmetic (next frame).

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;
use crate::influence::Falloff;
use crate::sampler::GridSpec;

/// Style tags as they appear in configuration (`effect = "..."`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTag {
    Pixel,
    Minecraft,
    ParticleDust,
    Ascii,
    Zoom,
    Blur,
    Lego,
    DotMatrix,
}

impl StyleTag {
    pub const ALL: [StyleTag; 8] = [
        StyleTag::Pixel,
        StyleTag::Minecraft,
        StyleTag::ParticleDust,
        StyleTag::Ascii,
        StyleTag::Zoom,
        StyleTag::Blur,
        StyleTag::Lego,
        StyleTag::DotMatrix,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleTag::Pixel => "pixel",
            StyleTag::Minecraft => "minecraft",
            StyleTag::ParticleDust => "particle-dust",
            StyleTag::Ascii => "ascii",
            StyleTag::Zoom => "zoom",
            StyleTag::Blur => "blur",
            StyleTag::Lego => "lego",
            StyleTag::DotMatrix => "dot-matrix",
        }
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleTag::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownStyle(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Mono,
    Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationType {
    None,
    #[default]
    Wave,
    Pulse,
    Drift,
    Ripple,
    Rotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphQuality {
    #[default]
    Simple,
    Enhanced,
}

pub const DEFAULT_RAMP: [char; 11] = ['█', '@', '%', '#', '*', '+', '=', '-', ':', '.', ' '];

/// Alpha below which a sampled position counts as transparent.
const OPAQUE_ALPHA: u8 = 120;
const BRICK_ALPHA: u8 = 50;

/// Largest blur lens radius in pixels.
pub const MAX_BLUR_STRENGTH: u32 = 64;

/* ------------------------------- options ------------------------------- */

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PixelOptions {
    pub block_size: u32,
    pub radius: f32,
    /// Unset: min(70, radius / 2), following the radius.
    pub soft_edge: Option<f32>,
    pub fade_exp: f32,
}

impl Default for PixelOptions {
    fn default() -> Self {
        Self { block_size: 16, radius: 130.0, soft_edge: None, fade_exp: 1.4 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VoxelOptions {
    pub block_size: u32,
    pub radius: f32,
    pub soft_edge: Option<f32>,
    pub fade_exp: f32,
}

impl Default for VoxelOptions {
    fn default() -> Self {
        Self { block_size: 28, radius: 130.0, soft_edge: None, fade_exp: 1.4 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DustOptions {
    pub spacing: u32,
    pub max_drift: f32,
    pub radius: f32,
    /// Unset: min(20, radius / 2), following the radius.
    pub soft_edge: Option<f32>,
    pub fade_exp: f32,
}

impl Default for DustOptions {
    fn default() -> Self {
        Self { spacing: 4, max_drift: 28.0, radius: 110.0, soft_edge: None, fade_exp: 1.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AsciiOptions {
    pub size: u32,
    pub radius: f32,
    pub glitch_intensity: f32,
    pub glitch_speed: f32,
    pub chars: Vec<char>,
    pub colored: bool,
    pub quality: GlyphQuality,
}

impl Default for AsciiOptions {
    fn default() -> Self {
        Self {
            size: 16,
            radius: 100.0,
            glitch_intensity: 3.0,
            glitch_speed: 0.5,
            chars: DEFAULT_RAMP.to_vec(),
            colored: false,
            quality: GlyphQuality::Simple,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoomOptions {
    pub scale: f32,
    pub radius: f32,
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self { scale: 1.2, radius: 100.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlurOptions {
    pub radius: f32,
    /// Box blur radius in pixels, at most [`MAX_BLUR_STRENGTH`].
    pub strength: u32,
    pub soft_edge: f32,
}

impl Default for BlurOptions {
    fn default() -> Self {
        Self { radius: 80.0, strength: 5, soft_edge: 16.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegoOptions {
    pub block_size: u32,
    pub gap: u32,
    pub stud_scale: f32,
    pub depth: f32,
    pub radius: f32,
    pub soft_edge: f32,
    pub fade_exp: f32,
}

impl Default for LegoOptions {
    fn default() -> Self {
        Self { block_size: 20, gap: 2, stud_scale: 0.4, depth: 0.3, radius: 140.0, soft_edge: 90.0, fade_exp: 1.4 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DotMatrixOptions {
    pub led_size: u32,
    /// Unset: led_size + 1.
    pub led_spacing: Option<u32>,
    pub radius: f32,
    pub soft_edge: f32,
    pub fade_exp: f32,
    pub glow: bool,
    pub color_mode: ColorMode,
    pub animation_type: AnimationType,
    pub animation_speed: f32,
    pub animation_intensity: f32,
}

impl Default for DotMatrixOptions {
    fn default() -> Self {
        Self {
            led_size: 8,
            led_spacing: None,
            radius: 120.0,
            soft_edge: 20.0,
            fade_exp: 2.0,
            glow: true,
            color_mode: ColorMode::Mono,
            animation_type: AnimationType::Wave,
            animation_speed: 1.0,
            animation_intensity: 3.0,
        }
    }
}

impl DotMatrixOptions {
    pub fn spacing(&self) -> u32 {
        self.led_spacing.unwrap_or(self.led_size + 1)
    }
}

/// A full construction record: style tag plus that style's options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum EffectOptions {
    Pixel(PixelOptions),
    Minecraft(VoxelOptions),
    ParticleDust(DustOptions),
    Ascii(AsciiOptions),
    Zoom(ZoomOptions),
    Blur(BlurOptions),
    Lego(LegoOptions),
    DotMatrix(DotMatrixOptions),
}

impl EffectOptions {
    /// Defaults for a style.
    pub fn defaults(tag: StyleTag) -> Self {
        match tag {
            StyleTag::Pixel => Self::Pixel(PixelOptions::default()),
            StyleTag::Minecraft => Self::Minecraft(VoxelOptions::default()),
            StyleTag::ParticleDust => Self::ParticleDust(DustOptions::default()),
            StyleTag::Ascii => Self::Ascii(AsciiOptions::default()),
            StyleTag::Zoom => Self::Zoom(ZoomOptions::default()),
            StyleTag::Blur => Self::Blur(BlurOptions::default()),
            StyleTag::Lego => Self::Lego(LegoOptions::default()),
            StyleTag::DotMatrix => Self::DotMatrix(DotMatrixOptions::default()),
        }
    }

    pub fn tag(&self) -> StyleTag {
        match self {
            Self::Pixel(_) => StyleTag::Pixel,
            Self::Minecraft(_) => StyleTag::Minecraft,
            Self::ParticleDust(_) => StyleTag::ParticleDust,
            Self::Ascii(_) => StyleTag::Ascii,
            Self::Zoom(_) => StyleTag::Zoom,
            Self::Blur(_) => StyleTag::Blur,
            Self::Lego(_) => StyleTag::Lego,
            Self::DotMatrix(_) => StyleTag::DotMatrix,
        }
    }

    /// Falloff the renderer uses this frame.
    pub fn falloff(&self) -> Falloff {
        match self {
            Self::Pixel(o) => Falloff::new(o.radius, o.soft_edge.unwrap_or((o.radius / 2.0).min(70.0)), o.fade_exp),
            Self::Minecraft(o) => Falloff::new(o.radius, o.soft_edge.unwrap_or((o.radius / 2.0).min(70.0)), o.fade_exp),
            Self::ParticleDust(o) => {
                Falloff::new(o.radius, o.soft_edge.unwrap_or((o.radius / 2.0).min(20.0)), o.fade_exp)
            }
            // linear from the cursor out to the radius
            Self::Ascii(o) => Falloff::new(0.0, o.radius, 1.0),
            Self::Zoom(o) => Falloff::new(o.radius, 0.0, 1.0),
            Self::Blur(o) => Falloff::new(o.radius, o.soft_edge, 1.0),
            Self::Lego(o) => Falloff::new(o.radius, o.soft_edge, o.fade_exp),
            Self::DotMatrix(o) => Falloff::new(o.radius, o.soft_edge, o.fade_exp),
        }
    }

    /// Grid the sampler lays over the surface; `None` for the per-pixel lenses.
    pub fn grid_spec(&self) -> Option<GridSpec> {
        match self {
            Self::Pixel(o) => Some(GridSpec::corner(o.block_size, OPAQUE_ALPHA)),
            Self::Minecraft(o) => Some(GridSpec::corner(o.block_size, OPAQUE_ALPHA)),
            Self::ParticleDust(o) => Some(GridSpec::corner(o.spacing, OPAQUE_ALPHA)),
            Self::Ascii(o) => Some(GridSpec::center(o.size)),
            Self::Lego(o) => Some(GridSpec::corner(o.block_size, BRICK_ALPHA)),
            Self::DotMatrix(o) => Some(GridSpec::center(o.spacing())),
            Self::Zoom(_) | Self::Blur(_) => None,
        }
    }

    /// Logical update cap; `None` renders on every scheduled frame.
    pub fn max_fps(&self) -> Option<u32> {
        match self {
            Self::Ascii(_) | Self::DotMatrix(_) => Some(30),
            _ => None,
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            Self::Pixel(o) => o.radius,
            Self::Minecraft(o) => o.radius,
            Self::ParticleDust(o) => o.radius,
            Self::Ascii(o) => o.radius,
            Self::Zoom(o) => o.radius,
            Self::Blur(o) => o.radius,
            Self::Lego(o) => o.radius,
            Self::DotMatrix(o) => o.radius,
        }
    }

    /// The structural size knob (block size / spacing / glyph size), if any.
    pub fn cell_size(&self) -> Option<u32> {
        self.grid_spec().map(|g| g.step)
    }

    /// Clamp values into ranges the renderers can use.
    pub(crate) fn sanitize(&mut self) {
        match self {
            Self::Pixel(o) => o.block_size = o.block_size.max(1),
            Self::Minecraft(o) => o.block_size = o.block_size.max(1),
            Self::ParticleDust(o) => o.spacing = o.spacing.max(1),
            Self::Ascii(o) => {
                o.size = o.size.max(1);
                if o.chars.is_empty() {
                    o.chars = DEFAULT_RAMP.to_vec();
                }
            }
            Self::Zoom(o) => o.scale = o.scale.max(0.01),
            Self::Blur(o) => o.strength = o.strength.min(MAX_BLUR_STRENGTH),
            Self::Lego(o) => o.block_size = o.block_size.max(1),
            Self::DotMatrix(o) => {
                o.radius = o.radius.clamp(10.0, 500.0);
                o.led_size = o.led_size.clamp(2, 20);
                let min_spacing = o.led_size + 1;
                o.led_spacing = o.led_spacing.map(|s| s.clamp(min_spacing, 50u32.max(min_spacing)));
                o.soft_edge = o.soft_edge.clamp(0.0, 100.0);
                o.fade_exp = o.fade_exp.clamp(0.5, 5.0);
                o.animation_speed = o.animation_speed.clamp(0.1, 5.0);
                o.animation_intensity = o.animation_intensity.clamp(0.1, 10.0);
            }
        }
    }
}

/* ------------------------------- setters ------------------------------- */

/// One runtime parameter change (`set<Param>(value)`).
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    Radius(f32),
    SoftEdge(f32),
    FadeExp(f32),
    BlockSize(u32),
    Spacing(u32),
    MaxDrift(f32),
    Size(u32),
    GlitchIntensity(f32),
    GlitchSpeed(f32),
    Chars(Vec<char>),
    Colored(bool),
    Quality(GlyphQuality),
    Scale(f32),
    Strength(u32),
    Gap(u32),
    StudScale(f32),
    Depth(f32),
    LedSize(u32),
    LedSpacing(u32),
    Glow(bool),
    ColorMode(ColorMode),
    AnimationType(AnimationType),
    AnimationSpeed(f32),
    AnimationIntensity(f32),
}

/// Name-only mirror of [`Setting`], for feature detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    Radius,
    SoftEdge,
    FadeExp,
    BlockSize,
    Spacing,
    MaxDrift,
    Size,
    GlitchIntensity,
    GlitchSpeed,
    Chars,
    Colored,
    Quality,
    Scale,
    Strength,
    Gap,
    StudScale,
    Depth,
    LedSize,
    LedSpacing,
    Glow,
    ColorMode,
    AnimationType,
    AnimationSpeed,
    AnimationIntensity,
}

impl SettingKind {
    pub fn name(self) -> &'static str {
        match self {
            SettingKind::Radius => "radius",
            SettingKind::SoftEdge => "softEdge",
            SettingKind::FadeExp => "fadeExp",
            SettingKind::BlockSize => "blockSize",
            SettingKind::Spacing => "spacing",
            SettingKind::MaxDrift => "maxDrift",
            SettingKind::Size => "size",
            SettingKind::GlitchIntensity => "glitchIntensity",
            SettingKind::GlitchSpeed => "glitchSpeed",
            SettingKind::Chars => "chars",
            SettingKind::Colored => "colored",
            SettingKind::Quality => "quality",
            SettingKind::Scale => "scale",
            SettingKind::Strength => "strength",
            SettingKind::Gap => "gap",
            SettingKind::StudScale => "studScale",
            SettingKind::Depth => "depth",
            SettingKind::LedSize => "ledSize",
            SettingKind::LedSpacing => "ledSpacing",
            SettingKind::Glow => "glow",
            SettingKind::ColorMode => "colorMode",
            SettingKind::AnimationType => "animationType",
            SettingKind::AnimationSpeed => "animationSpeed",
            SettingKind::AnimationIntensity => "animationIntensity",
        }
    }
}

impl Setting {
    pub fn kind(&self) -> SettingKind {
        match self {
            Setting::Radius(_) => SettingKind::Radius,
            Setting::SoftEdge(_) => SettingKind::SoftEdge,
            Setting::FadeExp(_) => SettingKind::FadeExp,
            Setting::BlockSize(_) => SettingKind::BlockSize,
            Setting::Spacing(_) => SettingKind::Spacing,
            Setting::MaxDrift(_) => SettingKind::MaxDrift,
            Setting::Size(_) => SettingKind::Size,
            Setting::GlitchIntensity(_) => SettingKind::GlitchIntensity,
            Setting::GlitchSpeed(_) => SettingKind::GlitchSpeed,
            Setting::Chars(_) => SettingKind::Chars,
            Setting::Colored(_) => SettingKind::Colored,
            Setting::Quality(_) => SettingKind::Quality,
            Setting::Scale(_) => SettingKind::Scale,
            Setting::Strength(_) => SettingKind::Strength,
            Setting::Gap(_) => SettingKind::Gap,
            Setting::StudScale(_) => SettingKind::StudScale,
            Setting::Depth(_) => SettingKind::Depth,
            Setting::LedSize(_) => SettingKind::LedSize,
            Setting::LedSpacing(_) => SettingKind::LedSpacing,
            Setting::Glow(_) => SettingKind::Glow,
            Setting::ColorMode(_) => SettingKind::ColorMode,
            Setting::AnimationType(_) => SettingKind::AnimationType,
            Setting::AnimationSpeed(_) => SettingKind::AnimationSpeed,
            Setting::AnimationIntensity(_) => SettingKind::AnimationIntensity,
        }
    }
}

/// What a setter did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Value already set; nothing to do.
    Unchanged,
    /// Takes effect on the next frame.
    Cosmetic,
    /// Cell list is stale and must be re-sampled.
    Resampled,
}

fn changed<T: PartialEq>(slot: &mut T, value: T, kind: Applied) -> Applied {
    if *slot == value {
        return Applied::Unchanged;
    }
    *slot = value;
    kind
}

impl EffectOptions {
    pub fn supports(&self, kind: SettingKind) -> bool {
        use SettingKind as K;
        match self {
            Self::Pixel(_) | Self::Minecraft(_) => matches!(kind, K::Radius | K::SoftEdge | K::FadeExp | K::BlockSize),
            Self::ParticleDust(_) => {
                matches!(kind, K::Radius | K::SoftEdge | K::FadeExp | K::Spacing | K::MaxDrift)
            }
            Self::Ascii(_) => matches!(
                kind,
                K::Radius | K::Size | K::GlitchIntensity | K::GlitchSpeed | K::Chars | K::Colored | K::Quality
            ),
            Self::Zoom(_) => matches!(kind, K::Radius | K::Scale),
            Self::Blur(_) => matches!(kind, K::Radius | K::SoftEdge | K::Strength),
            Self::Lego(_) => matches!(
                kind,
                K::Radius | K::SoftEdge | K::FadeExp | K::BlockSize | K::Gap | K::StudScale | K::Depth
            ),
            Self::DotMatrix(_) => matches!(
                kind,
                K::Radius
                    | K::SoftEdge
                    | K::FadeExp
                    | K::LedSize
                    | K::LedSpacing
                    | K::Glow
                    | K::ColorMode
                    | K::AnimationType
                    | K::AnimationSpeed
                    | K::AnimationIntensity
            ),
        }
    }

    /// Apply one setting. Unknown-for-this-style settings are `UnsupportedSetting`.
    pub fn apply(&mut self, setting: Setting) -> Result<Applied, Error> {
        use Applied::{Cosmetic, Resampled};

        let kind = setting.kind();
        if !self.supports(kind) {
            return Err(Error::UnsupportedSetting { style: self.tag().as_str(), setting: kind.name() });
        }

        let applied = match (self, setting) {
            (Self::Pixel(o), Setting::Radius(v)) => changed(&mut o.radius, v.max(0.0), Cosmetic),
            (Self::Pixel(o), Setting::SoftEdge(v)) => changed(&mut o.soft_edge, Some(v.max(0.0)), Cosmetic),
            (Self::Pixel(o), Setting::FadeExp(v)) => changed(&mut o.fade_exp, v.max(0.0), Cosmetic),
            (Self::Pixel(o), Setting::BlockSize(v)) => changed(&mut o.block_size, v.max(1), Resampled),

            (Self::Minecraft(o), Setting::Radius(v)) => changed(&mut o.radius, v.max(0.0), Cosmetic),
            (Self::Minecraft(o), Setting::SoftEdge(v)) => changed(&mut o.soft_edge, Some(v.max(0.0)), Cosmetic),
            (Self::Minecraft(o), Setting::FadeExp(v)) => changed(&mut o.fade_exp, v.max(0.0), Cosmetic),
            (Self::Minecraft(o), Setting::BlockSize(v)) => changed(&mut o.block_size, v.max(1), Resampled),

            (Self::ParticleDust(o), Setting::Radius(v)) => changed(&mut o.radius, v.max(0.0), Cosmetic),
            (Self::ParticleDust(o), Setting::SoftEdge(v)) => changed(&mut o.soft_edge, Some(v.max(0.0)), Cosmetic),
            (Self::ParticleDust(o), Setting::FadeExp(v)) => changed(&mut o.fade_exp, v.max(0.0), Cosmetic),
            (Self::ParticleDust(o), Setting::Spacing(v)) => changed(&mut o.spacing, v.max(1), Resampled),
            (Self::ParticleDust(o), Setting::MaxDrift(v)) => changed(&mut o.max_drift, v, Cosmetic),

            (Self::Ascii(o), Setting::Radius(v)) => changed(&mut o.radius, v.max(0.0), Cosmetic),
            (Self::Ascii(o), Setting::Size(v)) => changed(&mut o.size, v.max(1), Resampled),
            (Self::Ascii(o), Setting::GlitchIntensity(v)) => changed(&mut o.glitch_intensity, v, Cosmetic),
            (Self::Ascii(o), Setting::GlitchSpeed(v)) => changed(&mut o.glitch_speed, v, Cosmetic),
            (Self::Ascii(o), Setting::Chars(v)) => {
                let v = if v.is_empty() { DEFAULT_RAMP.to_vec() } else { v };
                changed(&mut o.chars, v, Cosmetic)
            }
            (Self::Ascii(o), Setting::Colored(v)) => changed(&mut o.colored, v, Cosmetic),
            (Self::Ascii(o), Setting::Quality(v)) => changed(&mut o.quality, v, Cosmetic),

            (Self::Zoom(o), Setting::Radius(v)) => changed(&mut o.radius, v.max(0.0), Cosmetic),
            (Self::Zoom(o), Setting::Scale(v)) => changed(&mut o.scale, v.max(0.01), Cosmetic),

            (Self::Blur(o), Setting::Radius(v)) => changed(&mut o.radius, v.max(0.0), Cosmetic),
            (Self::Blur(o), Setting::SoftEdge(v)) => changed(&mut o.soft_edge, v.max(0.0), Cosmetic),
            (Self::Blur(o), Setting::Strength(v)) => changed(&mut o.strength, v.min(MAX_BLUR_STRENGTH), Resampled),

            (Self::Lego(o), Setting::Radius(v)) => changed(&mut o.radius, v.max(0.0), Cosmetic),
            (Self::Lego(o), Setting::SoftEdge(v)) => changed(&mut o.soft_edge, v.max(0.0), Cosmetic),
            (Self::Lego(o), Setting::FadeExp(v)) => changed(&mut o.fade_exp, v.max(0.0), Cosmetic),
            (Self::Lego(o), Setting::BlockSize(v)) => changed(&mut o.block_size, v.max(1), Resampled),
            (Self::Lego(o), Setting::Gap(v)) => changed(&mut o.gap, v, Resampled),
            (Self::Lego(o), Setting::StudScale(v)) => changed(&mut o.stud_scale, v.max(0.0), Cosmetic),
            (Self::Lego(o), Setting::Depth(v)) => changed(&mut o.depth, v, Cosmetic),

            (Self::DotMatrix(o), Setting::Radius(v)) => changed(&mut o.radius, v.clamp(10.0, 500.0), Cosmetic),
            (Self::DotMatrix(o), Setting::SoftEdge(v)) => changed(&mut o.soft_edge, v.clamp(0.0, 100.0), Cosmetic),
            (Self::DotMatrix(o), Setting::FadeExp(v)) => changed(&mut o.fade_exp, v.clamp(0.5, 5.0), Cosmetic),
            (Self::DotMatrix(o), Setting::LedSize(v)) => {
                let size = v.clamp(2, 20);
                if size == o.led_size {
                    Applied::Unchanged
                } else {
                    let before = o.spacing();
                    o.led_size = size;
                    // an explicit spacing must still leave a gap between LEDs
                    o.led_spacing = o.led_spacing.map(|s| s.max(size + 1));
                    if o.spacing() != before { Resampled } else { Cosmetic }
                }
            }
            (Self::DotMatrix(o), Setting::LedSpacing(v)) => {
                let spacing = v.clamp(o.led_size + 1, 50u32.max(o.led_size + 1));
                if spacing == o.spacing() {
                    Applied::Unchanged
                } else {
                    o.led_spacing = Some(spacing);
                    Resampled
                }
            }
            (Self::DotMatrix(o), Setting::Glow(v)) => changed(&mut o.glow, v, Cosmetic),
            (Self::DotMatrix(o), Setting::ColorMode(v)) => changed(&mut o.color_mode, v, Cosmetic),
            (Self::DotMatrix(o), Setting::AnimationType(v)) => changed(&mut o.animation_type, v, Cosmetic),
            (Self::DotMatrix(o), Setting::AnimationSpeed(v)) => {
                changed(&mut o.animation_speed, v.clamp(0.1, 5.0), Cosmetic)
            }
            (Self::DotMatrix(o), Setting::AnimationIntensity(v)) => {
                changed(&mut o.animation_intensity, v.clamp(0.1, 10.0), Cosmetic)
            }

            // supports() already filtered every other pairing
            (this, s) => {
                return Err(Error::UnsupportedSetting { style: this.tag().as_str(), setting: s.kind().name() });
            }
        };
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_parsing_round_trips_and_rejects_unknown() {
        for tag in StyleTag::ALL {
            assert_eq!(tag.as_str().parse::<StyleTag>().unwrap(), tag);
        }
        let err = "sparkle".parse::<StyleTag>().unwrap_err();
        assert!(matches!(err, Error::UnknownStyle(ref s) if s == "sparkle"));
    }

    #[test]
    fn test_defaults_match_construction_table() {
        let EffectOptions::Lego(lego) = EffectOptions::defaults(StyleTag::Lego) else { panic!() };
        assert_eq!((lego.block_size, lego.gap), (20, 2));
        assert_eq!(lego.soft_edge, 90.0);

        let EffectOptions::DotMatrix(dm) = EffectOptions::defaults(StyleTag::DotMatrix) else { panic!() };
        assert_eq!(dm.spacing(), 9);
        assert!(dm.glow);

        let ascii = EffectOptions::defaults(StyleTag::Ascii);
        assert_eq!(ascii.max_fps(), Some(30));
        assert_eq!(ascii.cell_size(), Some(16));
    }

    #[test]
    fn test_pixel_soft_edge_follows_radius_until_set() {
        let mut opts = EffectOptions::defaults(StyleTag::Pixel);
        assert_eq!(opts.falloff().soft_edge, 65.0);
        opts.apply(Setting::Radius(200.0)).unwrap();
        assert_eq!(opts.falloff().soft_edge, 70.0);
        opts.apply(Setting::SoftEdge(5.0)).unwrap();
        opts.apply(Setting::Radius(20.0)).unwrap();
        assert_eq!(opts.falloff().soft_edge, 5.0);
    }

    #[test]
    fn test_structural_vs_cosmetic() {
        let mut opts = EffectOptions::defaults(StyleTag::Minecraft);
        assert_eq!(opts.apply(Setting::BlockSize(12)).unwrap(), Applied::Resampled);
        assert_eq!(opts.apply(Setting::BlockSize(12)).unwrap(), Applied::Unchanged);
        assert_eq!(opts.apply(Setting::Radius(40.0)).unwrap(), Applied::Cosmetic);
        assert_eq!(opts.apply(Setting::FadeExp(2.0)).unwrap(), Applied::Cosmetic);
    }

    #[test]
    fn test_unsupported_setting_is_reported() {
        let mut opts = EffectOptions::defaults(StyleTag::Zoom);
        assert!(!opts.supports(SettingKind::BlockSize));
        let err = opts.apply(Setting::BlockSize(3)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedSetting { style: "zoom", setting: "blockSize" }));
    }

    #[test]
    fn test_dot_matrix_setters_clamp() {
        let mut opts = EffectOptions::defaults(StyleTag::DotMatrix);
        opts.apply(Setting::Radius(5000.0)).unwrap();
        opts.apply(Setting::LedSpacing(2)).unwrap();
        opts.apply(Setting::AnimationSpeed(0.0)).unwrap();
        let EffectOptions::DotMatrix(dm) = opts else { panic!() };
        assert_eq!(dm.radius, 500.0);
        assert_eq!(dm.spacing(), 9);
        assert_eq!(dm.animation_speed, 0.1);
    }

    #[test]
    fn test_empty_ramp_falls_back_to_default() {
        let mut opts = EffectOptions::defaults(StyleTag::Ascii);
        opts.apply(Setting::Chars(vec!['a', 'b'])).unwrap();
        opts.apply(Setting::Chars(Vec::new())).unwrap();
        let EffectOptions::Ascii(a) = opts else { panic!() };
        assert_eq!(a.chars, DEFAULT_RAMP.to_vec());
    }

    #[test]
    fn test_led_spacing_equal_to_derived_is_unchanged() {
        let mut opts = EffectOptions::defaults(StyleTag::DotMatrix);
        assert_eq!(opts.apply(Setting::LedSpacing(9)).unwrap(), Applied::Unchanged);
        assert_eq!(opts.apply(Setting::LedSpacing(12)).unwrap(), Applied::Resampled);
        assert_eq!(opts.apply(Setting::LedSpacing(12)).unwrap(), Applied::Unchanged);
        assert_eq!(opts.cell_size(), Some(12));
    }

    #[test]
    fn test_blur_strength_is_capped() {
        let mut opts = EffectOptions::defaults(StyleTag::Blur);
        assert_eq!(opts.apply(Setting::Strength(20_000_000)).unwrap(), Applied::Resampled);
        let EffectOptions::Blur(b) = &opts else { panic!() };
        assert_eq!(b.strength, MAX_BLUR_STRENGTH);

        let mut loaded = EffectOptions::Blur(BlurOptions { strength: u32::MAX, ..BlurOptions::default() });
        loaded.sanitize();
        let EffectOptions::Blur(b) = loaded else { panic!() };
        assert_eq!(b.strength, MAX_BLUR_STRENGTH);
    }
}

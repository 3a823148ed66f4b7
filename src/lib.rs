// Cursor-reactive image filters.
//
// An image is sampled once into a sparse grid of cells; every frame each
// cell near the pointer is redrawn in the chosen style with an opacity (or
// displacement) given by a shared soft-edged influence field.

pub mod blur;
pub mod config;
pub mod cursor;
pub mod effect;
pub mod error;
pub mod frame;
pub mod gamma;
pub mod influence;
pub mod params;
pub mod raster;
pub mod render;
pub mod sampler;
pub mod surface;
pub mod targets;
pub mod types;
pub mod window;

pub use effect::{DebugInfo, Effect, Lifecycle};
pub use error::Error;
pub use influence::Falloff;
pub use params::{Applied, EffectOptions, Setting, SettingKind, StyleTag};
pub use targets::{Element, ImageElement, ImageSource, Target, apply_effect};
pub use types::{Cell, FrameBuffer, Point, Rgb};

// Error taxonomy. Only construction/config problems ever reach the caller;
// sampling and rendering failures are logged where they happen and degrade
// to "nothing drawn".
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// attach() was handed something that is not an image.
    #[error("invalid target: <{tag}> is not an image element")]
    InvalidTarget { tag: String },

    /// Pixel data could not be read (tainted source or zero-sized image).
    #[error("sample unavailable: {0}")]
    SampleUnavailable(String),

    /// The factory was given a style tag it does not know.
    #[error("unknown effect style: {0:?}")]
    UnknownStyle(String),

    /// The style has no such parameter; destroy and recreate with new options.
    #[error("{style} effect has no `{setting}` setting")]
    UnsupportedSetting { style: &'static str, setting: &'static str },

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config is missing the `effect` tag")]
    MissingStyle,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Creating or updating the viewer window failed.
    #[error("window error: {0}")]
    Window(String),
}

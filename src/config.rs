// Effect options from TOML.
//
//   effect = "lego"
//   blockSize = 24
//   radius = 160
//
// The tag is checked before the body so a typo reads as an unknown style
// instead of a serde variant error.

use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::params::{EffectOptions, StyleTag};

pub fn parse_options(text: &str) -> Result<EffectOptions, Error> {
    let table: toml::Table = toml::from_str(text)?;
    let tag = table.get("effect").and_then(|v| v.as_str()).ok_or(Error::MissingStyle)?;
    let style: StyleTag = tag.parse()?;

    let mut opts: EffectOptions = toml::from_str(text)?;
    opts.sanitize();
    log::debug!("parsed {style} options: {opts:?}");
    Ok(opts)
}

pub fn load_options(path: &Path) -> Result<EffectOptions, Error> {
    let text = fs::read_to_string(path)?;
    let opts = parse_options(&text)?;
    log::info!("loaded {} options from {}", opts.tag(), path.display());
    Ok(opts)
}

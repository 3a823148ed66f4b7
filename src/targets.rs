// Host elements and target fan-out.
// The page itself lives outside this crate; these types carry just enough
// of it for an effect to decide whether it can attach and what to sample.

use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use log::{info, warn};

use crate::effect::Effect;
use crate::error::Error;
use crate::params::{EffectOptions, StyleTag};

/// Pixel data behind an image element.
#[derive(Clone)]
pub enum ImageSource {
    /// Still loading; the host calls [`Effect::image_decoded`] later.
    Pending,
    Decoded(Arc<RgbaImage>),
    /// Decoded, but reading pixels is refused (cross-origin).
    Tainted { width: u32, height: u32 },
}

#[derive(Clone)]
pub struct ImageElement {
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Displayed size in pixels.
    pub width: u32,
    pub height: u32,
    pub source: ImageSource,
}

impl ImageElement {
    /// Decode `path` into an element displayed at the image's own size.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        info!("decoded {} ({width}x{height})", path.display());
        Ok(Self { id: None, classes: Vec::new(), width, height, source: ImageSource::Decoded(Arc::new(img)) })
    }

    /// The decoded pixels, once available.
    pub fn pixels(&self) -> Option<&Arc<RgbaImage>> {
        match &self.source {
            ImageSource::Decoded(img) => Some(img),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub enum Element {
    Image(ImageElement),
    Other { tag: String, id: Option<String>, classes: Vec<String> },
}

impl Element {
    pub fn tag(&self) -> &str {
        match self {
            Element::Image(_) => "img",
            Element::Other { tag, .. } => tag,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Element::Image(img) => img.id.as_deref(),
            Element::Other { id, .. } => id.as_deref(),
        }
    }

    pub fn classes(&self) -> &[String] {
        match self {
            Element::Image(img) => &img.classes,
            Element::Other { classes, .. } => classes,
        }
    }

    /// `<img#hero>` style label for logs.
    pub fn describe(&self) -> String {
        match self.id() {
            Some(id) => format!("<{}#{}>", self.tag(), id),
            None => format!("<{}>", self.tag()),
        }
    }

    /// Simple selector match: `#id`, `.class`, a tag name or `*`.
    pub fn matches(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            self.id() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.classes().iter().any(|c| c == class)
        } else {
            selector == "*" || selector.eq_ignore_ascii_case(self.tag())
        }
    }
}

/// Resolves selectors to elements.
pub trait ElementQuery {
    fn query_all(&self, selector: &str) -> Vec<&Element>;
}

/// A flat list of elements, enough to resolve the simple selectors above.
/// Comma-separated selector lists match any of their parts.
#[derive(Clone, Default)]
pub struct Page {
    elements: Vec<Element>,
}

impl Page {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}

impl ElementQuery for Page {
    fn query_all(&self, selector: &str) -> Vec<&Element> {
        self.elements.iter().filter(|e| selector.split(',').any(|s| e.matches(s))).collect()
    }
}

pub enum Target<'a> {
    Selector(&'a str),
    Element(&'a Element),
    Collection(&'a [Element]),
}

/// Effect for a style tag with default options. An unknown tag is the
/// caller's mistake and the one error surfaced here.
pub fn effect_for_tag(tag: &str) -> Result<Effect, Error> {
    let style: StyleTag = tag.parse()?;
    Ok(Effect::new(EffectOptions::defaults(style)))
}

/// One effect per matched element, all created from the same options.
pub struct EffectGroup {
    effects: Vec<Effect>,
}

impl EffectGroup {
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Effect> {
        self.effects.iter_mut()
    }

    pub fn destroy(&mut self) {
        self.effects.iter_mut().for_each(Effect::destroy);
    }
}

/// Attach `options` to every element `target` names.
pub fn apply_effect(page: &impl ElementQuery, target: Target<'_>, options: &EffectOptions) -> EffectGroup {
    let elements: Vec<&Element> = match target {
        Target::Selector(sel) => page.query_all(sel),
        Target::Element(el) => vec![el],
        Target::Collection(list) => list.iter().collect(),
    };
    if elements.is_empty() {
        warn!("no elements matched; nothing to apply {} to", options.tag());
    }

    let effects = elements
        .into_iter()
        .map(|el| {
            let mut fx = Effect::new(options.clone());
            fx.attach(el);
            fx
        })
        .collect::<Vec<_>>();
    info!("applied {} to {} element(s)", options.tag(), effects.len());
    EffectGroup { effects }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Lifecycle;

    fn img(id: &str, classes: &[&str]) -> Element {
        Element::Image(ImageElement {
            id: Some(id.into()),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            width: 16,
            height: 16,
            source: ImageSource::Decoded(Arc::new(RgbaImage::from_pixel(16, 16, image::Rgba([9, 9, 9, 255])))),
        })
    }

    fn page() -> Page {
        Page::new(vec![
            img("a", &["hover"]),
            img("b", &[]),
            Element::Other { tag: "div".into(), id: Some("c".into()), classes: vec!["hover".into()] },
        ])
    }

    #[test]
    fn test_selectors() {
        let p = page();
        assert_eq!(p.query_all("img").len(), 2);
        assert_eq!(p.query_all(".hover").len(), 2);
        assert_eq!(p.query_all("#b").len(), 1);
        assert_eq!(p.query_all("#a, #c").len(), 2);
        assert!(p.query_all("#zzz").is_empty());
    }

    #[test]
    fn test_fan_out_one_effect_per_match() {
        let p = page();
        let mut group = apply_effect(&p, Target::Selector(".hover"), &EffectOptions::defaults(StyleTag::Pixel));
        assert_eq!(group.len(), 2);
        let states: Vec<_> = group.iter().map(Effect::state).collect();
        // the div is not an image: inert
        assert_eq!(states, vec![Lifecycle::Sampled, Lifecycle::Unattached]);
        group.destroy();
        group.destroy();
        assert!(group.iter().all(|fx| fx.state() == Lifecycle::Destroyed));
    }

    #[test]
    fn test_element_and_collection_targets() {
        let p = page();
        let opts = EffectOptions::defaults(StyleTag::Zoom);
        assert_eq!(apply_effect(&p, Target::Element(&p.elements()[1]), &opts).len(), 1);
        assert_eq!(apply_effect(&p, Target::Collection(p.elements()), &opts).len(), 3);
    }

    #[test]
    fn test_open_decodes_file_or_reports_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.png");
        RgbaImage::from_pixel(12, 7, image::Rgba([1, 2, 3, 255])).save(&path).unwrap();

        let el = ImageElement::open(&path).unwrap();
        assert_eq!((el.width, el.height), (12, 7));
        assert_eq!(el.pixels().unwrap().dimensions(), (12, 7));

        let missing = ImageElement::open(&dir.path().join("gone.png"));
        assert!(matches!(missing, Err(Error::Image(_))));
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        assert!(matches!(effect_for_tag("wobble"), Err(Error::UnknownStyle(_))));
        assert_eq!(effect_for_tag("lego").unwrap().tag(), StyleTag::Lego);
    }
}

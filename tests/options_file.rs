use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use hover_fx::config::load_options;
use hover_fx::{Effect, EffectOptions, Element, Error, ImageElement, ImageSource, Lifecycle, Point, StyleTag};
use image::{Rgba, RgbaImage};

fn write_config(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn gradient(w: u32, h: u32) -> Element {
    let img = RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 255 / w) as u8, (y * 255 / h) as u8, 128, 255]));
    Element::Image(ImageElement {
        id: Some("photo".into()),
        classes: vec!["hover".into()],
        width: w,
        height: h,
        source: ImageSource::Decoded(Arc::new(img)),
    })
}

#[test]
fn loaded_options_drive_an_effect() {
    let file = write_config("effect = \"lego\"\nblockSize = 10\nradius = 200\n");
    let opts = load_options(file.path()).unwrap();
    assert_eq!(opts.tag(), StyleTag::Lego);
    assert_eq!(opts.cell_size(), Some(10));

    let mut fx = Effect::new(opts);
    fx.attach(&gradient(100, 60));
    assert_eq!(fx.state(), Lifecycle::Sampled);
    assert_eq!(fx.samples_count(), 60);

    fx.pointer_enter(Point::new(50.0, 30.0));
    let handle = fx.pending_frame().unwrap();
    assert!(fx.run_frame(handle, Duration::ZERO));
    assert_eq!(fx.debug_info().radius, 200.0);

    fx.destroy();
    assert_eq!(fx.state(), Lifecycle::Destroyed);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_options(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn unknown_style_in_file() {
    let file = write_config("effect = \"glitter\"\n");
    assert!(matches!(load_options(file.path()), Err(Error::UnknownStyle(s)) if s == "glitter"));
}

#[test]
fn composite_fades_after_leave() {
    let mut fx = Effect::new(EffectOptions::defaults(StyleTag::Pixel));
    fx.attach(&gradient(64, 64));
    fx.pointer_enter(Point::new(32.0, 32.0));
    let handle = fx.pending_frame().unwrap();
    assert!(fx.run_frame(handle, Duration::ZERO));
    fx.tick(Duration::from_millis(300));
    assert_eq!(fx.surface().unwrap().opacity(), 1.0);

    fx.pointer_leave(Duration::from_millis(300));
    fx.tick(Duration::from_millis(1000));
    assert_eq!(fx.surface().unwrap().opacity(), 0.0);

    let mut base = hover_fx::FrameBuffer::new(64, 64);
    base.pixels.fill(0xFF10_2030);
    let before = base.pixels.clone();
    fx.composite_onto(&mut base);
    assert_eq!(base.pixels, before);
}

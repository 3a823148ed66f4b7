// sRGB <-> linear lookup tables for the blur lens.
// Visual: blurred and sharp pixels mix without dark halos at the lens rim.

use crate::types::Rgb;

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1)
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255), 4096-step quantization
    linear_to_srgb: [u8; 4096],
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

impl GammaLut {
    /// Build both tables once; an effect keeps one for its lifetime.
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = i as f32 / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    pub fn to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn to_srgb(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Mix `over` into `base` by `t` in linear light. t=0 keeps base, t=1 gives over.
    #[inline]
    pub fn mix(&self, base: Rgb, over: Rgb, t: f32) -> Rgb {
        if t <= 0.0 {
            return base;
        }
        if t >= 1.0 {
            return over;
        }
        let inv = 1.0 - t;
        let ch = |b: u8, o: u8| self.to_srgb(t * self.to_linear(o) + inv * self.to_linear(b));
        Rgb::new(ch(base.r, over.r), ch(base.g, over.g), ch(base.b, over.b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_survive_round_trip() {
        let lut = GammaLut::new();
        assert_eq!(lut.to_srgb(lut.to_linear(0)), 0);
        assert_eq!(lut.to_srgb(lut.to_linear(255)), 255);
    }

    #[test]
    fn test_mix_extremes_return_inputs() {
        let lut = GammaLut::new();
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(200, 100, 0);
        assert_eq!(lut.mix(a, b, 0.0), a);
        assert_eq!(lut.mix(a, b, 1.0), b);
    }

    #[test]
    fn test_linear_mix_is_brighter_than_srgb_average() {
        let lut = GammaLut::new();
        let m = lut.mix(Rgb::BLACK, Rgb::WHITE, 0.5);
        // linear-light midpoint of black/white is ~188 in sRGB, not 128
        assert!(m.r > 170 && m.r < 200, "got {}", m.r);
    }
}

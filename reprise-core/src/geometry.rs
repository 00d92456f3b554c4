//! Presentation geometry derived from the available stream variants.

use reprise_model::{AspectRatio, StreamVariant};

/// Variant with the greatest height; the first one seen wins ties.
pub fn select_source(variants: &[StreamVariant]) -> Option<&StreamVariant> {
    let mut iter = variants.iter();
    let first = iter.next()?;
    Some(iter.fold(first, |max, v| if v.height > max.height { v } else { max }))
}

/// Reduce `width/height` to lowest terms.
///
/// Unknown geometry (either side reported as 0) resolves to 16/9.
pub fn aspect_ratio_for(width: u32, height: u32) -> AspectRatio {
    if width == 0 || height == 0 {
        return AspectRatio::WIDESCREEN;
    }
    let divisor = gcd(width, height);
    AspectRatio::new(width / divisor, height / divisor)
}

/// Aspect ratio of the best variant, `None` when there are no variants.
pub fn resolve(variants: &[StreamVariant]) -> Option<AspectRatio> {
    select_source(variants).map(|v| aspect_ratio_for(v.width, v.height))
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Tracks the ratio currently applied to the player.
#[derive(Debug, Clone, Default)]
pub struct GeometryResolver {
    current: AspectRatio,
}

impl GeometryResolver {
    /// Starts at 16/9.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ratio last applied.
    pub fn current(&self) -> AspectRatio {
        self.current
    }

    /// Recompute for a new variant list. Returns the ratio when it changed.
    pub fn update(&mut self, variants: &[StreamVariant]) -> Option<AspectRatio> {
        let ratio = resolve(variants)?;
        if ratio == self.current {
            return None;
        }
        self.current = ratio;
        Some(ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(width: u32, height: u32) -> StreamVariant {
        StreamVariant::new(width, height, format!("https://cdn/{height}.m3u8"), format!("{height}p"))
    }

    #[test]
    fn full_hd_reduces_to_sixteen_by_nine() {
        assert_eq!(aspect_ratio_for(1920, 1080).to_string(), "16/9");
        assert_eq!(aspect_ratio_for(1440, 1080).to_string(), "4/3");
        assert_eq!(aspect_ratio_for(2560, 1080).to_string(), "64/27");
    }

    #[test]
    fn reduced_ratio_is_in_lowest_terms() {
        for (w, h) in [(1280, 720), (854, 480), (3840, 1600), (1000, 999), (7, 3)] {
            let ratio = aspect_ratio_for(w, h);
            assert_eq!(gcd(ratio.width, ratio.height), 1, "{w}x{h}");
            assert_eq!(ratio.width as u64 * h as u64, ratio.height as u64 * w as u64);
        }
    }

    #[test]
    fn unknown_geometry_falls_back_to_widescreen() {
        let variants = vec![variant(0, 0), variant(0, 0)];
        assert_eq!(resolve(&variants), Some(AspectRatio::WIDESCREEN));
        assert_eq!(resolve(&[]), None);
    }

    #[test]
    fn half_reported_geometry_is_treated_as_unknown() {
        assert_eq!(aspect_ratio_for(0, 1080), AspectRatio::WIDESCREEN);
        assert_eq!(aspect_ratio_for(1440, 0), AspectRatio::WIDESCREEN);
        assert_eq!(
            resolve(&[variant(640, 360), variant(0, 1080)]),
            Some(AspectRatio::WIDESCREEN)
        );
    }

    #[test]
    fn tallest_variant_wins_and_first_seen_breaks_ties() {
        let variants = vec![
            variant(640, 360),
            variant(1440, 1080),
            variant(1920, 1080),
            variant(1280, 720),
        ];
        let chosen = select_source(&variants).unwrap();
        assert_eq!((chosen.width, chosen.height), (1440, 1080));
        assert_eq!(resolve(&variants).unwrap().to_string(), "4/3");
    }

    #[test]
    fn resolver_reports_only_changes() {
        let mut resolver = GeometryResolver::new();
        assert_eq!(resolver.current().to_string(), "16/9");
        assert_eq!(resolver.update(&[variant(1920, 1080)]), None);
        assert_eq!(
            resolver.update(&[variant(1440, 1080)]),
            Some(AspectRatio::new(4, 3))
        );
        assert_eq!(resolver.update(&[]), None);
        assert_eq!(resolver.current(), AspectRatio::new(4, 3));
    }
}

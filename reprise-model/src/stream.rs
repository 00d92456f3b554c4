use std::fmt;

/// One playable rendition of a title as reported by the catalog/player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamVariant {
    /// Reported pixel width, 0 when unknown
    #[cfg_attr(feature = "serde", serde(default))]
    pub width: u32,
    /// Reported pixel height, 0 when unknown
    #[cfg_attr(feature = "serde", serde(default))]
    pub height: u32,
    pub url: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: String,
}

impl StreamVariant {
    pub fn new(
        width: u32,
        height: u32,
        url: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            width,
            height,
            url: url.into(),
            label: label.into(),
        }
    }
}

/// Display aspect ratio in lowest terms, rendered as `"W/H"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Fallback used whenever geometry is unknown.
    pub const WIDESCREEN: AspectRatio = AspectRatio {
        width: 16,
        height: 9,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.width, self.height)
    }
}

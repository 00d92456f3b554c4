use crate::ids::{EpisodeKey, ProviderId, SeriesId, ViewerId};
use crate::skip::SkipInterval;
use url::form_urlencoded;

/// Reference to the episode that follows the one being played.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NextEpisode {
    pub key: EpisodeKey,
    pub number: u32,
}

/// Everything the catalog knows about the episode being loaded.
///
/// Built once per episode load and never mutated by the session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeContext {
    pub series_id: SeriesId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub series_title: Option<String>,
    /// Series-level cover art, used when the episode thumbnail is unusable
    #[cfg_attr(feature = "serde", serde(default))]
    pub series_cover: Option<String>,
    pub episode_key: EpisodeKey,
    pub episode_number: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub episode_title: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub thumbnail: Option<String>,
    pub provider_id: ProviderId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_dub: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub next: Option<NextEpisode>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skip_intervals: Vec<SkipInterval>,
    /// Signed-in viewer; remote writes are skipped without one
    #[cfg_attr(feature = "serde", serde(default))]
    pub viewer: Option<ViewerId>,
    /// Watched seconds the server had on record when the page loaded
    #[cfg_attr(feature = "serde", serde(default))]
    pub server_time_watched: Option<f64>,
}

impl EpisodeContext {
    /// Title stored with progress: episode title, then series title, then
    /// a numbered fallback.
    pub fn display_title(&self) -> String {
        self.episode_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(self.series_title.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Episode {}", self.episode_number))
    }

    pub fn next_target(&self) -> Option<NavigationTarget> {
        self.next.as_ref().map(|next| NavigationTarget {
            series_id: self.series_id.clone(),
            provider_id: self.provider_id.clone(),
            episode_key: next.key.clone(),
            episode_number: next.number,
            is_dub: self.is_dub,
        })
    }
}

/// Where auto-advance sends the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavigationTarget {
    pub series_id: SeriesId,
    pub provider_id: ProviderId,
    pub episode_key: EpisodeKey,
    pub episode_number: u32,
    pub is_dub: bool,
}

impl NavigationTarget {
    /// Watch-page route for this target, with ids percent-encoded.
    pub fn route(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("id", self.episode_key.as_str())
            .append_pair("num", &self.episode_number.to_string());
        if self.is_dub {
            query.append_pair("dub", "true");
        }
        format!(
            "/en/anime/watch/{}/{}?{}",
            path_segment(self.series_id.as_str()),
            path_segment(self.provider_id.as_str()),
            query.finish()
        )
    }
}

fn path_segment(raw: &str) -> String {
    // byte_serialize writes spaces as '+', which only means space in queries
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> EpisodeContext {
        EpisodeContext {
            series_id: SeriesId::new("21").unwrap(),
            series_title: Some("One Piece".into()),
            series_cover: None,
            episode_key: EpisodeKey::new("op-1071").unwrap(),
            episode_number: 1071,
            episode_title: None,
            thumbnail: None,
            provider_id: ProviderId::new("gogoanime").unwrap(),
            is_dub: false,
            next: Some(NextEpisode {
                key: EpisodeKey::new("op-1072").unwrap(),
                number: 1072,
            }),
            skip_intervals: Vec::new(),
            viewer: None,
            server_time_watched: None,
        }
    }

    #[test]
    fn title_falls_back_to_series_title() {
        let mut ctx = context();
        assert_eq!(ctx.display_title(), "One Piece");

        ctx.episode_title = Some("Luffy's Peak".into());
        assert_eq!(ctx.display_title(), "Luffy's Peak");

        ctx.episode_title = None;
        ctx.series_title = None;
        assert_eq!(ctx.display_title(), "Episode 1071");
    }

    #[test]
    fn route_carries_dub_flag_only_when_dubbed() {
        let mut ctx = context();
        let sub = ctx.next_target().unwrap();
        assert_eq!(sub.route(), "/en/anime/watch/21/gogoanime?id=op-1072&num=1072");

        ctx.is_dub = true;
        let dub = ctx.next_target().unwrap();
        assert_eq!(
            dub.route(),
            "/en/anime/watch/21/gogoanime?id=op-1072&num=1072&dub=true"
        );
    }

    #[test]
    fn route_escapes_reserved_characters() {
        let target = NavigationTarget {
            series_id: SeriesId::new("one piece").unwrap(),
            provider_id: ProviderId::new("zoro/hd").unwrap(),
            episode_key: EpisodeKey::new("op-1072&ep=1#t").unwrap(),
            episode_number: 1072,
            is_dub: false,
        };
        assert_eq!(
            target.route(),
            "/en/anime/watch/one%20piece/zoro%2Fhd?id=op-1072%26ep%3D1%23t&num=1072"
        );
    }
}

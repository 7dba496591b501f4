// FormatSelector - picks one stream out of the fetcher's format list
//
// Rules, first match wins:
// - Audio: audio-only m4a, then any audio-only
// - Video: combined format whose label contains the quality hint (unless "best"),
//   then the first combined format
//
// Only formats with a direct URL qualify. Ties go to the earlier entry: the
// fetcher's ordering is authoritative and nothing is re-ranked by bitrate or
// resolution.

use super::models::{MediaKind, StreamFormat};

/// Quality hint meaning "no preference"
pub const BEST_QUALITY: &str = "best";

pub struct FormatSelector;

impl FormatSelector {
    /// Choose a format for `kind`. `None` is a normal outcome, not an error.
    pub fn select<'a>(
        formats: &'a [StreamFormat],
        kind: MediaKind,
        quality_hint: Option<&str>,
    ) -> Option<&'a StreamFormat> {
        match kind {
            MediaKind::Audio => Self::select_audio(formats),
            MediaKind::Video => Self::select_video(formats, quality_hint),
        }
    }

    fn select_audio(formats: &[StreamFormat]) -> Option<&StreamFormat> {
        let mut audio = formats
            .iter()
            .filter(|f| f.is_audio_only() && f.has_resource_url());

        // Prefer m4a for compatibility
        audio
            .clone()
            .find(|f| f.is_m4a())
            .or_else(|| audio.next())
    }

    fn select_video<'a>(
        formats: &'a [StreamFormat],
        quality_hint: Option<&str>,
    ) -> Option<&'a StreamFormat> {
        let mut combined = formats
            .iter()
            .filter(|f| f.is_combined() && f.has_resource_url());

        if let Some(hint) = Self::effective_hint(quality_hint) {
            let matched = combined.clone().find(|f| {
                f.quality_label
                    .as_deref()
                    .is_some_and(|label| label.contains(hint))
            });
            if matched.is_some() {
                return matched;
            }
        }

        combined.next()
    }

    /// Blank and "best" hints carry no preference
    fn effective_hint(quality_hint: Option<&str>) -> Option<&str> {
        quality_hint
            .map(str::trim)
            .filter(|h| !h.is_empty() && !h.eq_ignore_ascii_case(BEST_QUALITY))
    }
}

//! Host-side playback glue: sparse track-list navigation and elapsed-time
//! formatting. The engine never depends on any of this.

/// A playlist entry. An empty `url` marks a gap that cannot be played.
#[derive(Debug, Clone, Default)]
pub struct Track {
    pub url: String,
    pub artist: String,
    pub song: String,
}

impl Track {
    pub fn is_playable(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Index of the next playable track after `current`, if any.
pub fn next_playable(tracks: &[Track], current: usize) -> Option<usize> {
    tracks
        .iter()
        .enumerate()
        .skip(current + 1)
        .find(|(_, t)| t.is_playable())
        .map(|(i, _)| i)
}

/// Index of the closest playable track before `current`, if any.
pub fn prev_playable(tracks: &[Track], current: usize) -> Option<usize> {
    tracks
        .iter()
        .enumerate()
        .take(current)
        .rev()
        .find(|(_, t)| t.is_playable())
        .map(|(i, _)| i)
}

/// `minutes:seconds` with zero-padded seconds, e.g. `0:07`, `3:42`, `61:05`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist() -> Vec<Track> {
        // Gaps at 1 and 3.
        ["a.mp3", "", "c.mp3", "", "e.mp3"]
            .iter()
            .map(|url| Track {
                url: url.to_string(),
                ..Track::default()
            })
            .collect()
    }

    #[test]
    fn next_skips_gaps() {
        let tracks = playlist();
        assert_eq!(next_playable(&tracks, 0), Some(2));
        assert_eq!(next_playable(&tracks, 2), Some(4));
        assert_eq!(next_playable(&tracks, 4), None);
    }

    #[test]
    fn prev_skips_gaps() {
        let tracks = playlist();
        assert_eq!(prev_playable(&tracks, 4), Some(2));
        assert_eq!(prev_playable(&tracks, 2), Some(0));
        assert_eq!(prev_playable(&tracks, 0), None);
    }

    #[test]
    fn elapsed_is_zero_padded() {
        assert_eq!(format_elapsed(0), "0:00");
        assert_eq!(format_elapsed(7), "0:07");
        assert_eq!(format_elapsed(179), "2:59");
        assert_eq!(format_elapsed(3665), "61:05");
    }
}

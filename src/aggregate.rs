//! Aggregation of per-track audio features into artist-level statistics.

use crate::{AggregateStats, TrackFeatures};

/// Compute aggregate statistics over an artist's fetched top tracks.
///
/// Each dimension gets an arithmetic mean and a population standard
/// deviation (the fetched set *is* the whole sample, not a draw from one).
/// An empty slice yields [`AggregateStats::neutral`], whose zero
/// `track_count` tells downstream scorers to treat the artist as
/// insufficient data rather than a genuinely mid-scale one.
pub fn aggregate(tracks: &[TrackFeatures]) -> AggregateStats {
    if tracks.is_empty() {
        return AggregateStats::neutral();
    }

    let (mean_energy, std_dev_energy) = stats_of(tracks, |t| t.energy);
    let (mean_danceability, std_dev_danceability) = stats_of(tracks, |t| t.danceability);
    let (mean_valence, std_dev_valence) = stats_of(tracks, |t| t.valence);
    let (mean_acousticness, std_dev_acousticness) = stats_of(tracks, |t| t.acousticness);
    let (mean_instrumentalness, std_dev_instrumentalness) =
        stats_of(tracks, |t| t.instrumentalness);
    let (mean_tempo, std_dev_tempo) = stats_of(tracks, |t| t.tempo);

    AggregateStats {
        mean_energy,
        mean_danceability,
        mean_valence,
        mean_acousticness,
        mean_instrumentalness,
        mean_tempo,
        std_dev_energy,
        std_dev_danceability,
        std_dev_valence,
        std_dev_acousticness,
        std_dev_instrumentalness,
        std_dev_tempo,
        track_count: tracks.len(),
    }
}

/// Mean and population standard deviation of one dimension.
fn stats_of(tracks: &[TrackFeatures], dimension: impl Fn(&TrackFeatures) -> f64) -> (f64, f64) {
    let n = tracks.len() as f64;
    let mean = tracks.iter().map(&dimension).sum::<f64>() / n;
    let variance = tracks
        .iter()
        .map(|t| {
            let delta = dimension(t) - mean;
            delta * delta
        })
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

//! Mood and complexity scoring over aggregate statistics.
//!
//! Both scorers are pure functions over [`AggregateStats`]; the same input
//! always produces the same output. The constant tables below are part of
//! the crate's observable behavior and only change with a version bump.

use crate::{AggregateStats, ComplexityFactor, ComplexityScore, MoodLabel, MoodProfile};

/// Confidence reported when the sample is too small to score.
pub const INSUFFICIENT_DATA_CONFIDENCE: f64 = 0.1;

/// Complexity reported when the sample is too small to score.
pub const NEUTRAL_COMPLEXITY: f64 = 50.0;

/// Mood centroids in (energy, valence, acousticness) space.
///
/// Order matters: on an exact distance tie the earlier entry wins.
const MOOD_CENTROIDS: [(MoodLabel, [f64; 3]); 8] = [
    (MoodLabel::Energetic, [0.85, 0.55, 0.10]),
    (MoodLabel::Euphoric, [0.75, 0.90, 0.15]),
    (MoodLabel::Aggressive, [0.85, 0.20, 0.10]),
    (MoodLabel::Brooding, [0.55, 0.25, 0.35]),
    (MoodLabel::Melancholic, [0.25, 0.20, 0.55]),
    (MoodLabel::Contemplative, [0.35, 0.45, 0.75]),
    (MoodLabel::Serene, [0.20, 0.75, 0.70]),
    (MoodLabel::Balanced, [0.50, 0.50, 0.40]),
];

// Complexity factor weights. They sum to 1.0 so a maximal profile scores 100.
const WEIGHT_ACOUSTIC_TEXTURE: f64 = 0.30;
const WEIGHT_RHYTHMIC_RESISTANCE: f64 = 0.25;
const WEIGHT_TEMPO_SPREAD: f64 = 0.25;
const WEIGHT_GENRE_BREADTH: f64 = 0.20;

/// Tempo standard deviation (BPM) that counts as maximal spread.
const TEMPO_SPREAD_CAP: f64 = 60.0;

/// Genre count that counts as maximal breadth.
const GENRE_BREADTH_CAP: f64 = 6.0;

/// Score the dominant mood of a discography.
///
/// Finds the nearest and second-nearest centroids to the artist's mean
/// (energy, valence, acousticness) point; confidence is how decisively the
/// nearest wins: `1 - d1/(d1+d2)`, clamped to `[0, 1]`. Equidistant
/// centroids therefore score exactly 0.5. Insufficient or non-finite
/// samples score [`MoodLabel::Balanced`] at the
/// [`INSUFFICIENT_DATA_CONFIDENCE`] floor.
pub fn score_mood(stats: &AggregateStats) -> MoodProfile {
    let point = [stats.mean_energy, stats.mean_valence, stats.mean_acousticness];

    if stats.is_insufficient() || !point.iter().all(|v| v.is_finite()) {
        return MoodProfile {
            label: MoodLabel::Balanced,
            confidence: INSUFFICIENT_DATA_CONFIDENCE,
        };
    }

    let mut nearest = (MOOD_CENTROIDS[0].0, distance(point, MOOD_CENTROIDS[0].1));
    let mut runner_up = f64::INFINITY;
    for (candidate, centroid) in MOOD_CENTROIDS.iter().skip(1) {
        let d = distance(point, *centroid);
        // Strict comparison keeps the earlier label on exact ties.
        if d < nearest.1 {
            runner_up = nearest.1;
            nearest = (*candidate, d);
        } else if d < runner_up {
            runner_up = d;
        }
    }

    MoodProfile {
        label: nearest.0,
        confidence: confidence_from(nearest.1, runner_up),
    }
}

/// Separation-based confidence from the two nearest centroid distances.
fn confidence_from(d1: f64, d2: f64) -> f64 {
    let total = d1 + d2;
    if !total.is_finite() || total <= 0.0 {
        // Infinite runner-up means there was only one candidate.
        return if d2.is_infinite() { 1.0 } else { 0.5 };
    }
    (1.0 - d1 / total).clamp(0.0, 1.0)
}

fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    let de = a[0] - b[0];
    let dv = a[1] - b[1];
    let da = a[2] - b[2];
    (de * de + dv * dv + da * da).sqrt()
}

/// Score musical complexity on a 0-100 scale.
///
/// A weighted linear combination of four normalized factors: acoustic
/// texture (mean acousticness), rhythmic resistance (inverse mean
/// danceability), tempo spread (capped standard deviation), and genre
/// breadth (capped genre count). The result is clamped to `[0, 100]`;
/// non-finite inputs collapse to [`NEUTRAL_COMPLEXITY`], as does an
/// insufficient sample.
pub fn score_complexity(stats: &AggregateStats, genre_count: usize) -> ComplexityScore {
    if stats.is_insufficient() {
        return ComplexityScore {
            value: NEUTRAL_COMPLEXITY,
            factors: vec![ComplexityFactor {
                name: "insufficient-data".to_string(),
                contribution: NEUTRAL_COMPLEXITY,
            }],
        };
    }

    let acoustic = WEIGHT_ACOUSTIC_TEXTURE * stats.mean_acousticness;
    let rhythmic = WEIGHT_RHYTHMIC_RESISTANCE * (1.0 - stats.mean_danceability);
    let tempo_spread = WEIGHT_TEMPO_SPREAD * (stats.std_dev_tempo / TEMPO_SPREAD_CAP).min(1.0);
    let genre_breadth = WEIGHT_GENRE_BREADTH * (genre_count as f64 / GENRE_BREADTH_CAP).min(1.0);

    let factors = vec![
        ComplexityFactor {
            name: "acoustic-texture".to_string(),
            contribution: 100.0 * acoustic,
        },
        ComplexityFactor {
            name: "rhythmic-resistance".to_string(),
            contribution: 100.0 * rhythmic,
        },
        ComplexityFactor {
            name: "tempo-spread".to_string(),
            contribution: 100.0 * tempo_spread,
        },
        ComplexityFactor {
            name: "genre-breadth".to_string(),
            contribution: 100.0 * genre_breadth,
        },
    ];

    let raw = 100.0 * (acoustic + rhythmic + tempo_spread + genre_breadth);
    let value = if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        NEUTRAL_COMPLEXITY
    };

    ComplexityScore { value, factors }
}

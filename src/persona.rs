//! Persona library and insight selection.
//!
//! A persona is a fixed analytical viewpoint: a set of typed trigger
//! predicates deciding whether it has anything to say about an artist, and a
//! renderer that says it. The standard library ships 42 personas; callers
//! can inject their own catalog instead, which is how the engine tests run
//! against a handful of fixture personas.
//!
//! Selection is fully deterministic: no randomness, no clocks, no iteration
//! over unordered maps. Given the same analysis twice, the same insights
//! come back in the same order.

use crate::{
    AggregateStats, ArtistRef, ComplexityScore, Dimension, MoodLabel, MoodProfile, PersonaInsight,
};

/// Everything a trigger predicate or renderer may look at.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub artist: &'a ArtistRef,
    pub stats: &'a AggregateStats,
    pub mood: &'a MoodProfile,
    pub complexity: &'a ComplexityScore,
}

/// A typed trigger predicate.
///
/// Personas activate when *all* their triggers hold; a persona with no
/// triggers is always active. Needles for the string variants are matched
/// case-insensitively and must be given in lowercase.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Any catalog genre contains the needle
    GenreContains(&'static str),
    /// Any catalog genre contains any of the needles
    GenreContainsAny(&'static [&'static str]),
    /// The artist display name contains any of the needles
    NameContainsAny(&'static [&'static str]),
    PopularityAtLeast(u8),
    PopularityAtMost(u8),
    MeanAtLeast(Dimension, f64),
    MeanAtMost(Dimension, f64),
    StdDevAtLeast(Dimension, f64),
    StdDevAtMost(Dimension, f64),
    /// Mean tempo at least this many BPM
    TempoAtLeast(f64),
    /// Mean tempo at most this many BPM
    TempoAtMost(f64),
    GenreCountAtLeast(usize),
    MoodIs(MoodLabel),
    ConfidenceAtLeast(f64),
    ComplexityAtLeast(f64),
    ComplexityAtMost(f64),
    /// At least one track had usable features
    HasTracks,
}

impl Trigger {
    pub fn matches(&self, ctx: &AnalysisContext) -> bool {
        match self {
            Trigger::GenreContains(needle) => genre_matches(ctx.artist, &[needle]),
            Trigger::GenreContainsAny(needles) => genre_matches(ctx.artist, needles),
            Trigger::NameContainsAny(needles) => {
                let name = ctx.artist.name.to_lowercase();
                needles.iter().any(|n| name.contains(n))
            }
            Trigger::PopularityAtLeast(bound) => ctx.artist.popularity >= *bound,
            Trigger::PopularityAtMost(bound) => ctx.artist.popularity <= *bound,
            Trigger::MeanAtLeast(dim, bound) => ctx.stats.mean(*dim) >= *bound,
            Trigger::MeanAtMost(dim, bound) => ctx.stats.mean(*dim) <= *bound,
            Trigger::StdDevAtLeast(dim, bound) => ctx.stats.std_dev(*dim) >= *bound,
            Trigger::StdDevAtMost(dim, bound) => ctx.stats.std_dev(*dim) <= *bound,
            Trigger::TempoAtLeast(bound) => ctx.stats.mean_tempo >= *bound,
            Trigger::TempoAtMost(bound) => ctx.stats.mean_tempo <= *bound,
            Trigger::GenreCountAtLeast(bound) => ctx.artist.genres.len() >= *bound,
            Trigger::MoodIs(label) => ctx.mood.label == *label,
            Trigger::ConfidenceAtLeast(bound) => ctx.mood.confidence >= *bound,
            Trigger::ComplexityAtLeast(bound) => ctx.complexity.value >= *bound,
            Trigger::ComplexityAtMost(bound) => ctx.complexity.value <= *bound,
            Trigger::HasTracks => ctx.stats.track_count > 0,
        }
    }
}

fn genre_matches(artist: &ArtistRef, needles: &[&str]) -> bool {
    artist
        .genres
        .iter()
        .any(|g| needles.iter().any(|n| g.to_lowercase().contains(n)))
}

/// Selection band of a persona.
///
/// Specialists (genre and technical) are included first whenever they match;
/// mood and complexity personas fill remaining slots ranked by alignment;
/// generalists pad the tail. Within a band, declaration order breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaKind {
    Specialist,
    Mood,
    Complexity,
    Generalist,
}

/// A single analytical viewpoint.
#[derive(Debug, Clone)]
pub struct Persona {
    /// Stable identifier, unique within a library
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    pub kind: PersonaKind,
    /// All triggers must hold for the persona to activate
    pub triggers: Vec<Trigger>,
    /// Topic tags copied onto rendered insights
    pub tags: &'static [&'static str],
    /// Narrative renderer
    pub render: fn(&AnalysisContext) -> String,
    /// Preferred complexity for alignment ranking (complexity personas only)
    pub complexity_anchor: Option<f64>,
}

impl Persona {
    pub fn is_active(&self, ctx: &AnalysisContext) -> bool {
        self.triggers.iter().all(|t| t.matches(ctx))
    }

    /// How well this persona fits the analysis, in `[0, 1]`.
    ///
    /// Mood personas align with the mood confidence; complexity personas
    /// with their distance from the preferred complexity. Other kinds rank
    /// purely by declaration order.
    pub fn alignment(&self, ctx: &AnalysisContext) -> f64 {
        match self.kind {
            PersonaKind::Mood => ctx.mood.confidence,
            PersonaKind::Complexity => match self.complexity_anchor {
                Some(anchor) => 1.0 - ((ctx.complexity.value - anchor).abs() / 100.0).min(1.0),
                None => 0.0,
            },
            PersonaKind::Specialist | PersonaKind::Generalist => 0.0,
        }
    }

    pub fn render_insight(&self, ctx: &AnalysisContext) -> PersonaInsight {
        PersonaInsight {
            persona_id: self.id.to_string(),
            persona_name: self.name.to_string(),
            narrative: (self.render)(ctx),
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// An immutable, injectable persona catalog.
#[derive(Debug, Clone)]
pub struct PersonaLibrary {
    personas: Vec<Persona>,
}

impl Default for PersonaLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

impl PersonaLibrary {
    /// The standard 42-persona catalog.
    pub fn standard() -> Self {
        Self {
            personas: standard_personas(),
        }
    }

    /// Build a library from a custom catalog.
    pub fn custom(personas: Vec<Persona>) -> Self {
        Self { personas }
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    /// Select the personas that get to speak, capped to the 8-12 band.
    ///
    /// Matching specialists come first in declaration order; matching mood
    /// and complexity personas follow, ranked by [`Persona::alignment`]
    /// (stable sort, so equal alignment keeps declaration order); matching
    /// generalists fill whatever room is left.
    pub fn select<'a>(&'a self, ctx: &AnalysisContext, cap: usize) -> Vec<&'a Persona> {
        let cap = cap.clamp(8, 12);
        let mut picked: Vec<&Persona> = Vec::with_capacity(cap);

        for persona in self
            .personas
            .iter()
            .filter(|p| p.kind == PersonaKind::Specialist && p.is_active(ctx))
        {
            if picked.len() == cap {
                return picked;
            }
            picked.push(persona);
        }

        let mut ranked: Vec<&Persona> = self
            .personas
            .iter()
            .filter(|p| {
                matches!(p.kind, PersonaKind::Mood | PersonaKind::Complexity) && p.is_active(ctx)
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.alignment(ctx)
                .partial_cmp(&a.alignment(ctx))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for persona in ranked {
            if picked.len() == cap {
                return picked;
            }
            picked.push(persona);
        }

        for persona in self
            .personas
            .iter()
            .filter(|p| p.kind == PersonaKind::Generalist && p.is_active(ctx))
        {
            if picked.len() == cap {
                return picked;
            }
            picked.push(persona);
        }

        picked
    }

    /// Select and render in one pass.
    pub fn render(&self, ctx: &AnalysisContext, cap: usize) -> Vec<PersonaInsight> {
        self.select(ctx, cap)
            .into_iter()
            .map(|p| p.render_insight(ctx))
            .collect()
    }
}

// ================================================================================================
// STANDARD CATALOG
// ================================================================================================

/// Names with an earned honorific. Kept in sync with [`LEGEND_TITLES`].
const LEGEND_NAMES: &[&str] = &[
    "michael jackson",
    "taylor swift",
    "beyonc",
    "drake",
    "kendrick lamar",
    "the beatles",
    "queen",
    "led zeppelin",
    "whitney houston",
    "stevie wonder",
    "billie eilish",
    "the weeknd",
    "daft punk",
    "johnny cash",
];

const LEGEND_TITLES: &[(&str, &str)] = &[
    ("michael jackson", "The King of Pop"),
    ("taylor swift", "The Music Industry"),
    ("beyonc", "Queen Bey"),
    ("drake", "Champagne Papi"),
    ("kendrick lamar", "King Kendrick"),
    ("the beatles", "The Fab Four"),
    ("queen", "Rock Royalty"),
    ("led zeppelin", "Gods of Rock"),
    ("whitney houston", "The Voice"),
    ("stevie wonder", "The Genius"),
    ("billie eilish", "The Whisper Queen"),
    ("the weeknd", "King of the Fall"),
    ("daft punk", "The Robots"),
    ("johnny cash", "The Man in Black"),
];

fn persona(
    id: &'static str,
    name: &'static str,
    kind: PersonaKind,
    triggers: Vec<Trigger>,
    tags: &'static [&'static str],
    render: fn(&AnalysisContext) -> String,
) -> Persona {
    Persona {
        id,
        name,
        kind,
        triggers,
        tags,
        render,
        complexity_anchor: None,
    }
}

fn complexity_persona(
    id: &'static str,
    name: &'static str,
    triggers: Vec<Trigger>,
    anchor: f64,
    tags: &'static [&'static str],
    render: fn(&AnalysisContext) -> String,
) -> Persona {
    Persona {
        id,
        name,
        kind: PersonaKind::Complexity,
        triggers,
        tags,
        render,
        complexity_anchor: Some(anchor),
    }
}

fn standard_personas() -> Vec<Persona> {
    use Dimension::*;
    use PersonaKind::*;
    use Trigger::*;

    vec![
        // ---- Genre specialists -------------------------------------------------------------
        persona(
            "jazz-scholar",
            "The Jazz Scholar",
            Specialist,
            vec![GenreContains("jazz")],
            &["genre", "jazz"],
            render_jazz_scholar,
        ),
        persona(
            "classical-curator",
            "The Classical Curator",
            Specialist,
            vec![GenreContainsAny(&["classical", "orchestral", "baroque"])],
            &["genre", "classical"],
            render_classical_curator,
        ),
        persona(
            "hiphop-head",
            "The Hip-Hop Head",
            Specialist,
            vec![GenreContainsAny(&["hip hop", "rap", "trap"])],
            &["genre", "hip-hop"],
            render_hiphop_head,
        ),
        persona(
            "rock-historian",
            "The Rock Historian",
            Specialist,
            vec![GenreContainsAny(&["rock", "grunge"])],
            &["genre", "rock"],
            render_rock_historian,
        ),
        persona(
            "metal-forge",
            "Keeper of the Forge",
            Specialist,
            vec![GenreContainsAny(&["metal", "punk", "hardcore"])],
            &["genre", "metal"],
            render_metal_forge,
        ),
        persona(
            "chart-pop-analyst",
            "The Chart Analyst",
            Specialist,
            vec![GenreContains("pop"), PopularityAtLeast(80)],
            &["genre", "pop", "mainstream"],
            render_chart_pop,
        ),
        persona(
            "leftfield-pop-analyst",
            "The Left-Field Pop Analyst",
            Specialist,
            vec![GenreContains("pop"), PopularityAtMost(79)],
            &["genre", "pop"],
            render_leftfield_pop,
        ),
        persona(
            "electronic-architect",
            "The Electronic Architect",
            Specialist,
            vec![GenreContainsAny(&["electronic", "edm", "house", "techno"])],
            &["genre", "electronic"],
            render_electronic_architect,
        ),
        persona(
            "country-storyteller",
            "The Porch Storyteller",
            Specialist,
            vec![GenreContainsAny(&["country", "folk", "americana"])],
            &["genre", "country"],
            render_country_storyteller,
        ),
        persona(
            "soul-connoisseur",
            "The Soul Connoisseur",
            Specialist,
            vec![GenreContainsAny(&["r&b", "soul"])],
            &["genre", "soul"],
            render_soul_connoisseur,
        ),
        persona(
            "indie-cartographer",
            "The Indie Cartographer",
            Specialist,
            vec![GenreContainsAny(&["indie", "alternative"])],
            &["genre", "indie"],
            render_indie_cartographer,
        ),
        persona(
            "ambient-drifter",
            "The Ambient Drifter",
            Specialist,
            vec![GenreContainsAny(&["ambient", "drone", "new age"])],
            &["genre", "ambient"],
            render_ambient_drifter,
        ),
        persona(
            "blues-keeper",
            "Keeper of the Twelve Bars",
            Specialist,
            vec![GenreContains("blues")],
            &["genre", "blues"],
            render_blues_keeper,
        ),
        persona(
            "latin-pulse",
            "The Latin Pulse",
            Specialist,
            vec![GenreContainsAny(&["latin", "reggaeton", "salsa"])],
            &["genre", "latin"],
            render_latin_pulse,
        ),
        persona(
            "reggae-roots",
            "The Roots Operator",
            Specialist,
            vec![GenreContainsAny(&["reggae", "dub", "ska"])],
            &["genre", "reggae"],
            render_reggae_roots,
        ),
        // ---- Technical specialists ---------------------------------------------------------
        persona(
            "acoustic-purist",
            "The Acoustic Purist",
            Specialist,
            vec![MeanAtLeast(Acousticness, 0.6)],
            &["technical", "acoustic"],
            render_acoustic_purist,
        ),
        persona(
            "instrumental-voyager",
            "The Instrumental Voyager",
            Specialist,
            vec![MeanAtLeast(Instrumentalness, 0.5), HasTracks],
            &["technical", "instrumental"],
            render_instrumental_voyager,
        ),
        persona(
            "dance-floor-cartographer",
            "The Dance-Floor Cartographer",
            Specialist,
            vec![MeanAtLeast(Danceability, 0.75)],
            &["technical", "dance"],
            render_dance_floor,
        ),
        persona(
            "velocity-chaser",
            "The Velocity Chaser",
            Specialist,
            vec![TempoAtLeast(140.0), HasTracks],
            &["technical", "tempo"],
            render_velocity_chaser,
        ),
        persona(
            "slow-burn-specialist",
            "The Slow-Burn Specialist",
            Specialist,
            vec![TempoAtMost(85.0), HasTracks],
            &["technical", "tempo"],
            render_slow_burn,
        ),
        persona(
            "dynamic-range-surveyor",
            "The Dynamic-Range Surveyor",
            Specialist,
            vec![StdDevAtLeast(Energy, 0.2), HasTracks],
            &["technical", "dynamics"],
            render_dynamic_range,
        ),
        persona(
            "consistency-auditor",
            "The Consistency Auditor",
            Specialist,
            vec![StdDevAtMost(Energy, 0.05), HasTracks],
            &["technical", "dynamics"],
            render_consistency_auditor,
        ),
        persona(
            "mainstream-monitor",
            "The Mainstream Monitor",
            Specialist,
            vec![PopularityAtLeast(75)],
            &["technical", "popularity"],
            render_mainstream_monitor,
        ),
        persona(
            "underground-scout",
            "The Underground Scout",
            Specialist,
            vec![PopularityAtMost(35)],
            &["technical", "popularity"],
            render_underground_scout,
        ),
        persona(
            "genre-polyglot",
            "The Genre Polyglot",
            Specialist,
            vec![GenreCountAtLeast(4)],
            &["technical", "breadth"],
            render_genre_polyglot,
        ),
        persona(
            "legend-recognizer",
            "The Legend Recognizer",
            Specialist,
            vec![NameContainsAny(LEGEND_NAMES)],
            &["legend"],
            render_legend_recognizer,
        ),
        // ---- Mood specialists --------------------------------------------------------------
        persona(
            "voltage-reader",
            "The Voltage Reader",
            Mood,
            vec![MoodIs(MoodLabel::Energetic)],
            &["mood", "energetic"],
            render_mood_energetic,
        ),
        persona(
            "euphoria-cartographer",
            "The Euphoria Cartographer",
            Mood,
            vec![MoodIs(MoodLabel::Euphoric)],
            &["mood", "euphoric"],
            render_mood_euphoric,
        ),
        persona(
            "intensity-witness",
            "The Intensity Witness",
            Mood,
            vec![MoodIs(MoodLabel::Aggressive)],
            &["mood", "aggressive"],
            render_mood_aggressive,
        ),
        persona(
            "shadow-reader",
            "The Shadow Reader",
            Mood,
            vec![MoodIs(MoodLabel::Brooding)],
            &["mood", "brooding"],
            render_mood_brooding,
        ),
        persona(
            "melancholy-keeper",
            "Keeper of the Melancholy",
            Mood,
            vec![MoodIs(MoodLabel::Melancholic)],
            &["mood", "melancholic"],
            render_mood_melancholic,
        ),
        persona(
            "quiet-observer",
            "The Quiet Observer",
            Mood,
            vec![MoodIs(MoodLabel::Contemplative)],
            &["mood", "contemplative"],
            render_mood_contemplative,
        ),
        persona(
            "stillness-surveyor",
            "The Stillness Surveyor",
            Mood,
            vec![MoodIs(MoodLabel::Serene)],
            &["mood", "serene"],
            render_mood_serene,
        ),
        persona(
            "equilibrium-witness",
            "The Equilibrium Witness",
            Mood,
            vec![MoodIs(MoodLabel::Balanced)],
            &["mood", "balanced"],
            render_mood_balanced,
        ),
        // ---- Complexity specialists --------------------------------------------------------
        complexity_persona(
            "virtuoso-admirer",
            "The Virtuoso's Admirer",
            vec![ComplexityAtLeast(80.0)],
            90.0,
            &["complexity"],
            render_virtuoso,
        ),
        complexity_persona(
            "sophistication-spotter",
            "The Sophistication Spotter",
            vec![ComplexityAtLeast(60.0), ComplexityAtMost(80.0)],
            70.0,
            &["complexity"],
            render_sophistication,
        ),
        complexity_persona(
            "balanced-craft-judge",
            "The Balanced-Craft Judge",
            vec![ComplexityAtLeast(40.0), ComplexityAtMost(60.0)],
            50.0,
            &["complexity"],
            render_balanced_craft,
        ),
        complexity_persona(
            "accessibility-advocate",
            "The Accessibility Advocate",
            vec![ComplexityAtMost(40.0)],
            20.0,
            &["complexity"],
            render_accessibility,
        ),
        complexity_persona(
            "experimental-ear",
            "The Experimental Ear",
            vec![ComplexityAtLeast(70.0), StdDevAtLeast(Energy, 0.15), HasTracks],
            85.0,
            &["complexity", "experimental"],
            render_experimental,
        ),
        // ---- Generalists -------------------------------------------------------------------
        persona(
            "catalog-overview",
            "The Cartographer",
            Generalist,
            vec![],
            &["overview"],
            render_catalog_overview,
        ),
        persona(
            "tempo-surveyor",
            "The Tempo Surveyor",
            Generalist,
            vec![],
            &["overview", "tempo"],
            render_tempo_surveyor,
        ),
        persona(
            "closing-verdict",
            "The Closer",
            Generalist,
            vec![],
            &["overview", "verdict"],
            render_closing_verdict,
        ),
    ]
}

// ================================================================================================
// NARRATIVE RENDERERS
// ================================================================================================

fn render_jazz_scholar(ctx: &AnalysisContext) -> String {
    format!(
        "{} works a real jazz vocabulary: extended harmony, improvisational space, \
         and a rhythm section that breathes. A complexity of {:.0} sits right where \
         the idiom demands it.",
        ctx.artist.name, ctx.complexity.value
    )
}

fn render_classical_curator(ctx: &AnalysisContext) -> String {
    format!(
        "Compositional depth over immediacy: {} favors long-form arrangement and \
         orchestral color, music built to be studied as much as heard.",
        ctx.artist.name
    )
}

fn render_hiphop_head(ctx: &AnalysisContext) -> String {
    format!(
        "{} lives on bars, cadence and beat selection. Mean energy of {:.2} says the \
         production does as much talking as the verses.",
        ctx.artist.name, ctx.stats.mean_energy
    )
}

fn render_rock_historian(ctx: &AnalysisContext) -> String {
    format!(
        "Guitar-forward and anthem-minded, {} carries the rock lineage: riffs first, \
         polish second.",
        ctx.artist.name
    )
}

fn render_metal_forge(ctx: &AnalysisContext) -> String {
    format!(
        "Distortion is a first language here. {} trades in controlled violence of \
         sound, with energy averaging {:.2}.",
        ctx.artist.name, ctx.stats.mean_energy
    )
}

fn render_chart_pop(ctx: &AnalysisContext) -> String {
    format!(
        "At popularity {}, {} is engineering at scale: hooks compressed to their \
         essence and choruses built for maximum reach.",
        ctx.artist.popularity, ctx.artist.name
    )
}

fn render_leftfield_pop(ctx: &AnalysisContext) -> String {
    format!(
        "{} writes pop from outside the machine: familiar shapes, unfamiliar angles, \
         and no committee in the writing room.",
        ctx.artist.name
    )
}

fn render_electronic_architect(ctx: &AnalysisContext) -> String {
    format!(
        "Sound design is the songwriting. {} builds tracks from synthesis and \
         texture, averaging {:.2} danceability across the set.",
        ctx.artist.name, ctx.stats.mean_danceability
    )
}

fn render_country_storyteller(ctx: &AnalysisContext) -> String {
    format!(
        "Three chords and a narrative arc: {} keeps the storytelling tradition alive \
         with accessible, rooted instrumentation.",
        ctx.artist.name
    )
}

fn render_soul_connoisseur(ctx: &AnalysisContext) -> String {
    format!(
        "Smooth vocal runs and emotional depth; {} sits in the R&B lineage where \
         feel outranks flash. Valence averages {:.2}.",
        ctx.artist.name, ctx.stats.mean_valence
    )
}

fn render_indie_cartographer(ctx: &AnalysisContext) -> String {
    format!(
        "{} maps independent territory: experimental tendencies, no label-mandated \
         edges, a catalog that rewards digging.",
        ctx.artist.name
    )
}

fn render_ambient_drifter(ctx: &AnalysisContext) -> String {
    format!(
        "Texture over pulse. {} builds rooms of sound rather than songs, with \
         acousticness at {:.2} and nowhere to hurry to.",
        ctx.artist.name, ctx.stats.mean_acousticness
    )
}

fn render_blues_keeper(ctx: &AnalysisContext) -> String {
    format!(
        "Twelve bars and the truth: {} keeps the blues form honest, bending notes \
         where lesser catalogs bend facts.",
        ctx.artist.name
    )
}

fn render_latin_pulse(ctx: &AnalysisContext) -> String {
    format!(
        "Polyrhythmic heat runs through {}: clave logic, dance-first arrangement, \
         danceability averaging {:.2}.",
        ctx.artist.name, ctx.stats.mean_danceability
    )
}

fn render_reggae_roots(ctx: &AnalysisContext) -> String {
    format!(
        "Offbeat skank, deep pocket: {} rides the one-drop with patience most \
         catalogs never learn.",
        ctx.artist.name
    )
}

fn render_acoustic_purist(ctx: &AnalysisContext) -> String {
    format!(
        "Unplugged at heart: with acousticness averaging {:.2}, {} trusts wood, \
         wire and room tone over the rack of processors.",
        ctx.stats.mean_acousticness, ctx.artist.name
    )
}

fn render_instrumental_voyager(ctx: &AnalysisContext) -> String {
    format!(
        "Words optional. {} lets the instruments narrate; instrumentalness runs \
         {:.2} across the top tracks.",
        ctx.artist.name, ctx.stats.mean_instrumentalness
    )
}

fn render_dance_floor(ctx: &AnalysisContext) -> String {
    format!(
        "Built for motion: {} averages {:.2} danceability. The floor fills itself.",
        ctx.artist.name, ctx.stats.mean_danceability
    )
}

fn render_velocity_chaser(ctx: &AnalysisContext) -> String {
    format!(
        "{} operates at {:.0} BPM on average, high-velocity territory where \
         precision matters more than space.",
        ctx.artist.name, ctx.stats.mean_tempo
    )
}

fn render_slow_burn(ctx: &AnalysisContext) -> String {
    format!(
        "Patience as a discipline: {} averages {:.0} BPM and lets every phrase \
         finish its thought.",
        ctx.artist.name, ctx.stats.mean_tempo
    )
}

fn render_dynamic_range(ctx: &AnalysisContext) -> String {
    format!(
        "{} swings between restraint and eruption: an energy deviation of {:.2} is \
         wider than most catalogs dare.",
        ctx.artist.name, ctx.stats.std_dev_energy
    )
}

fn render_consistency_auditor(ctx: &AnalysisContext) -> String {
    format!(
        "A remarkably uniform signature: {} holds energy within a {:.2} deviation. \
         You always know what you came for.",
        ctx.artist.name, ctx.stats.std_dev_energy
    )
}

fn render_mainstream_monitor(ctx: &AnalysisContext) -> String {
    format!(
        "At popularity {}, {} is part of the cultural furniture. Ubiquity at this \
         level is its own craft.",
        ctx.artist.popularity, ctx.artist.name
    )
}

fn render_underground_scout(ctx: &AnalysisContext) -> String {
    format!(
        "Popularity {} keeps {} below the radar, which is exactly where the \
         interesting decisions get made.",
        ctx.artist.popularity, ctx.artist.name
    )
}

fn render_genre_polyglot(ctx: &AnalysisContext) -> String {
    format!(
        "{} refuses a single lane: {} distinct genre labels and a catalog that \
         treats boundaries as suggestions.",
        ctx.artist.name,
        ctx.artist.genres.len()
    )
}

fn render_legend_recognizer(ctx: &AnalysisContext) -> String {
    let name = ctx.artist.name.to_lowercase();
    let title = LEGEND_TITLES
        .iter()
        .find(|(needle, _)| name.contains(needle))
        .map(|(_, title)| *title)
        .unwrap_or("a name that needs no honorific");
    format!(
        "Known to the faithful as {}. {} earned the title the slow way: by \
         reshaping what everyone after them had to sound like.",
        title, ctx.artist.name
    )
}

fn render_mood_energetic(ctx: &AnalysisContext) -> String {
    format!(
        "The needle reads high energy, sustained: {} averages {:.2} on the energy \
         axis with forward drive to spare. Confidence {:.2}.",
        ctx.artist.name, ctx.stats.mean_energy, ctx.mood.confidence
    )
}

fn render_mood_euphoric(ctx: &AnalysisContext) -> String {
    format!(
        "High energy meeting high spirits: {} pairs {:.2} energy with {:.2} valence, \
         peak-hours music that refuses to come down. Confidence {:.2}.",
        ctx.artist.name, ctx.stats.mean_energy, ctx.stats.mean_valence, ctx.mood.confidence
    )
}

fn render_mood_aggressive(ctx: &AnalysisContext) -> String {
    format!(
        "Powerful, dark and uncompromising: {} channels intensity without apology, \
         valence sitting low at {:.2}.",
        ctx.artist.name, ctx.stats.mean_valence
    )
}

fn render_mood_brooding(ctx: &AnalysisContext) -> String {
    format!(
        "{} works the shadowed middle register: weight without spectacle, tension \
         that never fully resolves.",
        ctx.artist.name
    )
}

fn render_mood_melancholic(ctx: &AnalysisContext) -> String {
    format!(
        "Introspective and emotionally deep: {} writes from the low-valence end \
         ({:.2}) where the honest songs live.",
        ctx.artist.name, ctx.stats.mean_valence
    )
}

fn render_mood_contemplative(ctx: &AnalysisContext) -> String {
    format!(
        "Intimate, unhurried, acoustic-leaning: {} makes music for the hour when \
         the room goes quiet.",
        ctx.artist.name
    )
}

fn render_mood_serene(ctx: &AnalysisContext) -> String {
    format!(
        "Peaceful and quietly uplifting: {} keeps energy low and spirits high, a \
         rare equilibrium.",
        ctx.artist.name
    )
}

fn render_mood_balanced(ctx: &AnalysisContext) -> String {
    format!(
        "{} resists a single temperature, holding a versatile emotional range that \
         moves with the listener rather than at them.",
        ctx.artist.name
    )
}

fn render_virtuoso(ctx: &AnalysisContext) -> String {
    format!(
        "Complexity {:.0}: {} is operating at the technical ceiling, where \
         virtuosity stops being decoration and becomes the subject.",
        ctx.complexity.value, ctx.artist.name
    )
}

fn render_sophistication(ctx: &AnalysisContext) -> String {
    format!(
        "At complexity {:.0}, {} layers sophistication without losing the thread, \
         the kind of craft you notice on the third listen.",
        ctx.complexity.value, ctx.artist.name
    )
}

fn render_balanced_craft(ctx: &AnalysisContext) -> String {
    format!(
        "Complexity {:.0} is the craftsman's middle path: {} keeps enough texture \
         to reward attention and enough clarity to survive the car stereo.",
        ctx.complexity.value, ctx.artist.name
    )
}

fn render_accessibility(ctx: &AnalysisContext) -> String {
    format!(
        "Directness is underrated: at complexity {:.0}, {} says the thing plainly \
         and trusts the song to carry it.",
        ctx.complexity.value, ctx.artist.name
    )
}

fn render_experimental(ctx: &AnalysisContext) -> String {
    format!(
        "{} pairs high complexity ({:.0}) with volatile dynamics, the profile of a \
         catalog still running experiments in public.",
        ctx.artist.name, ctx.complexity.value
    )
}

fn render_catalog_overview(ctx: &AnalysisContext) -> String {
    if ctx.stats.is_insufficient() {
        return format!(
            "The catalog lists {} but offered no per-track features to chart; the \
             profile sits at neutral midpoints until the provider opens up.",
            ctx.artist.name
        );
    }
    format!(
        "Across {} top tracks, {} averages {:.2} energy, {:.2} valence and {:.2} \
         acousticness: the raw coordinates everything else here is drawn from.",
        ctx.stats.track_count,
        ctx.artist.name,
        ctx.stats.mean_energy,
        ctx.stats.mean_valence,
        ctx.stats.mean_acousticness
    )
}

fn render_tempo_surveyor(ctx: &AnalysisContext) -> String {
    format!(
        "Tempo centers on {:.0} BPM with a spread of {:.0}; {} has a home velocity \
         and knows when to leave it.",
        ctx.stats.mean_tempo, ctx.stats.std_dev_tempo, ctx.artist.name
    )
}

fn render_closing_verdict(ctx: &AnalysisContext) -> String {
    format!(
        "Verdict: {} reads {} (confidence {:.2}) at complexity {:.0}. File \
         accordingly.",
        ctx.artist.name, ctx.mood.label, ctx.mood.confidence, ctx.complexity.value
    )
}

// ================================================================================================
// TESTS
// ================================================================================================

use crate::{
    AnalysisEngine, AnalysisResult, EngineConfig, EngineError, EngineEvent, EngineEventReceiver,
    HistoryStore, Result, SpotifyCatalog,
};

/// Handle the search command: run a full analysis and print the result.
pub async fn handle_search_command(
    catalog: &SpotifyCatalog,
    artist: &str,
    insights: Option<usize>,
    json: bool,
    no_history: bool,
    verbose: bool,
) -> Result<()> {
    let mut config = EngineConfig::new();
    if let Some(cap) = insights {
        config = config.with_max_insights(cap);
    }

    let catalog_events = catalog.subscribe();
    let engine = AnalysisEngine::new(Box::new(catalog.clone())).with_config(config);

    if verbose {
        spawn_event_printer(engine.subscribe());
        spawn_event_printer(catalog_events);
    }

    if !json {
        println!("🔍 Analyzing '{artist}'...");
    }

    let result = engine.analyze(artist).await?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&result).map_err(|e| EngineError::Parse(e.to_string()))?;
        println!("{rendered}");
    } else {
        print_result(&result);
    }

    // The engine never touches history; recording is the caller's call.
    if !no_history {
        let mut history = HistoryStore::load();
        history.record_result(&result);
        if let Err(e) = HistoryStore::save(&history) {
            log::warn!("Could not save query history: {e}");
        }
    }

    Ok(())
}

fn print_result(result: &AnalysisResult) {
    let artist = &result.artist;
    println!();
    println!("✅ {} (popularity {})", artist.name, artist.popularity);
    if !artist.genres.is_empty() {
        let genres: Vec<&str> = artist.genres.iter().map(String::as_str).collect();
        println!("   Genres: {}", genres.join(", "));
    }

    println!();
    println!(
        "🎭 Mood: {} ({:.0}% confidence)",
        result.mood.label,
        result.mood.confidence * 100.0
    );
    println!("🧩 Complexity: {:.0}/100", result.complexity.value);
    for factor in &result.complexity.factors {
        println!("   {:<22} {:>5.1}", factor.name, factor.contribution);
    }

    let stats = &result.stats;
    println!();
    if stats.track_count == 0 {
        println!("📊 No per-track features were available; a neutral profile was assumed");
    } else {
        println!(
            "📊 Averages over {} track{}:",
            stats.track_count,
            plural(stats.track_count)
        );
        println!(
            "   energy {:.2} ±{:.2}   valence {:.2} ±{:.2}   danceability {:.2} ±{:.2}",
            stats.mean_energy,
            stats.std_dev_energy,
            stats.mean_valence,
            stats.std_dev_valence,
            stats.mean_danceability,
            stats.std_dev_danceability,
        );
        println!(
            "   acousticness {:.2} ±{:.2}   instrumentalness {:.2} ±{:.2}   tempo {:.0} ±{:.0} BPM",
            stats.mean_acousticness,
            stats.std_dev_acousticness,
            stats.mean_instrumentalness,
            stats.std_dev_instrumentalness,
            stats.mean_tempo,
            stats.std_dev_tempo,
        );
    }

    if result.partial_data {
        println!();
        println!("⚠️  Some tracks were missing audio features; scores use partial data");
    }

    println!();
    println!("💬 Insights:");
    for (index, insight) in result.insights.iter().enumerate() {
        println!(
            "{:>3}. [{}] {}",
            index + 1,
            insight.persona_name,
            insight.narrative
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Print engine and catalog events as they arrive. The task winds down
/// when the analysis completes or the sender side is dropped.
fn spawn_event_printer(mut rx: EngineEventReceiver) {
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                EngineEvent::StageChanged { stage } => println!("   ⏳ stage: {stage}"),
                EngineEvent::FetchStarted { request } => {
                    println!("   📡 {}", request.short_description())
                }
                EngineEvent::FetchCompleted {
                    request,
                    status_code,
                    duration_ms,
                } => println!(
                    "   📨 {} returned {status_code} in {duration_ms}ms",
                    request.short_description()
                ),
                EngineEvent::RateLimited {
                    delay_seconds,
                    attempt,
                    max_attempts,
                    ..
                } => println!(
                    "   ⏸  rate limited; waiting {delay_seconds}s (attempt {attempt}/{max_attempts})"
                ),
                EngineEvent::AnalysisCompleted { .. } => break,
            }
        }
    });
}

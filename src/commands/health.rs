use crate::{AnalysisEngine, HealthStatus, Result, SpotifyCatalog};

/// Handle the health command: probe the catalog and report.
pub async fn handle_health_command(catalog: &SpotifyCatalog) -> Result<()> {
    println!("🩺 Checking catalog reachability...");

    let engine = AnalysisEngine::new(Box::new(catalog.clone()));
    let report = engine.health().await;

    match report.status {
        HealthStatus::Ok => println!("✅ Catalog reachable; analyses should succeed"),
        HealthStatus::Degraded => {
            println!("⚠️  Catalog unreachable; analyses will fail until it recovers")
        }
    }
    Ok(())
}

mod config;
mod controller;
mod data;
mod monitoring;
mod page;

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use config::{Config, EnvConfig};
use controller::submit::SubmitOutcome;
use controller::{init_form_controller, PageEvent, Services};
use data::predict_api::PredictApiClient;
use monitoring::journal::PredictionJournal;
use page::{ids, Document};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [home, away] = args.as_slice() else {
        bail!("usage: match-predict <home team> <away team>");
    };

    tracing::info!("⚽ match-predict starting...");

    let mut config = Config::load_or_default("config.toml")?;
    let env_config = EnvConfig::load();
    config.apply_env(&env_config);
    tracing::info!("Prediction API: {}", config.api.base_url);

    let client = Arc::new(PredictApiClient::with_settings(
        &config.api.base_url,
        config.api.request_timeout(),
        config.autocomplete.cache_ttl(),
    )?);

    if env_config.skip_health_check {
        tracing::info!("Skipping health check");
    } else {
        match client.health().await {
            Ok(health) => tracing::info!(
                "Backend {} is {}",
                health.service.as_deref().unwrap_or("(unnamed)"),
                health.status
            ),
            Err(e) => tracing::warn!("Health check failed: {}", e),
        }
    }

    let journal = if config.journal.enabled {
        tracing::info!("Journaling predictions to {}", config.journal.csv_path);
        Some(Arc::new(PredictionJournal::new(&config.journal.csv_path)?))
    } else {
        None
    };

    let document = Arc::new(Document::with_form_template());
    let settings = config.autocomplete.settings();
    let quiet_period = settings.debounce + Duration::from_millis(200);
    let services = Services {
        predictions: client.clone(),
        search: client.clone(),
    };
    let form = init_form_controller(Arc::clone(&document), services, settings, journal)?;

    for (input_id, list_id, name) in [
        (ids::HOME_TEAM, ids::HOME_SUGGESTIONS, home),
        (ids::AWAY_TEAM, ids::AWAY_SUGGESTIONS, away),
    ] {
        form.dispatch(PageEvent::Input {
            id: input_id.to_string(),
            value: name.clone(),
        })
        .await?;
        tokio::time::sleep(quiet_period).await;

        let list = document.suggestion_list(list_id)?;
        if list.visible {
            println!("Suggestions for {:?}:", name.trim());
            for item in &list.items {
                match &item.secondary {
                    Some(secondary) => println!("  - {} ({})", item.display_name, secondary),
                    None => println!("  - {}", item.display_name),
                }
            }
        }
    }

    match form.dispatch(PageEvent::Submit).await? {
        Some(SubmitOutcome::Predicted(response)) => tracing::info!(
            "Prediction for {} vs {}: {}",
            response.features.home_team,
            response.features.away_team,
            response.prediction.as_str()
        ),
        Some(SubmitOutcome::Invalid(err)) => tracing::warn!("Form rejected: {}", err),
        Some(SubmitOutcome::Failed(err)) => tracing::warn!("Prediction request failed: {}", err),
        None => {}
    }
    let panel = document.panel(ids::RESULT)?;
    println!("{}", panel.plain_text());

    let stats = client.cache_stats();
    tracing::info!(
        "Suggestion cache: {} hits, {} misses ({:.1}% hit rate)",
        stats.hits,
        stats.misses,
        stats.hit_rate()
    );

    Ok(())
}

use std::sync::Arc;
use tracing::{error, info, warn};
use crate::controller::render::{
    details_html, outcome_title, ResultContent, ResultRenderer, ResultStatus,
};
use crate::data::predict_api::{ApiError, PredictionService};
use crate::data::types::{PredictionRequest, PredictionResponse};
use crate::monitoring::journal::{JournalEntry, PredictionJournal};
use crate::page::{ids, Document, PageError};

pub const LOADING_LABEL: &str = "Analysing match data...";
pub const RETRY_HINT: &str = "Please check the team names, or try again later";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("please fill in both team names")]
    EmptyTeamName,

    #[error("home and away team cannot be the same")]
    SameTeam,
}

/// Trim both names and check them, first failure wins
pub fn validate(home: &str, away: &str) -> Result<PredictionRequest, ValidationError> {
    let home = home.trim();
    let away = away.trim();

    if home.is_empty() || away.is_empty() {
        return Err(ValidationError::EmptyTeamName);
    }
    if home.to_lowercase() == away.to_lowercase() {
        return Err(ValidationError::SameTeam);
    }

    Ok(PredictionRequest {
        home_team: home.to_string(),
        away_team: away.to_string(),
    })
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Predicted(PredictionResponse),
    Invalid(ValidationError),
    Failed(ApiError),
}

/// Keeps the submit button disabled while alive, restores it on drop
struct ButtonGuard<'a> {
    document: &'a Document,
    id: &'a str,
    label: String,
}

impl<'a> ButtonGuard<'a> {
    fn engage(document: &'a Document, id: &'a str, busy_label: &str) -> Result<Self, PageError> {
        let label = document.update_button(id, |button| {
            button.disabled = true;
            std::mem::replace(&mut button.label, busy_label.to_string())
        })?;

        Ok(Self { document, id, label })
    }
}

impl Drop for ButtonGuard<'_> {
    fn drop(&mut self) {
        let label = std::mem::take(&mut self.label);
        if let Err(e) = self.document.update_button(self.id, |button| {
            button.disabled = false;
            button.label = label;
        }) {
            warn!("Could not restore submit button: {}", e);
        }
    }
}

pub struct SubmitHandler {
    document: Arc<Document>,
    renderer: ResultRenderer,
    service: Arc<dyn PredictionService>,
    journal: Option<Arc<PredictionJournal>>,
}

impl SubmitHandler {
    pub fn new(
        document: Arc<Document>,
        service: Arc<dyn PredictionService>,
        journal: Option<Arc<PredictionJournal>>,
    ) -> Self {
        let renderer = ResultRenderer::new(Arc::clone(&document), ids::RESULT);
        Self {
            document,
            renderer,
            service,
            journal,
        }
    }

    /// Handle one form submission end to end
    pub async fn submit(&self) -> Result<SubmitOutcome, PageError> {
        let home = self.document.input_value(ids::HOME_TEAM)?;
        let away = self.document.input_value(ids::AWAY_TEAM)?;

        self.renderer.hide()?;

        let request = match validate(&home, &away) {
            Ok(request) => request,
            Err(err) => {
                info!("Rejected submission: {}", err);
                self.show(home.trim(), away.trim(), ResultStatus::Error, ResultContent {
                    title: format!("❌ {}", err),
                    details: String::new(),
                })?;
                return Ok(SubmitOutcome::Invalid(err));
            }
        };

        info!("Requesting prediction: home={}, away={}", request.home_team, request.away_team);
        let result = {
            let _busy = ButtonGuard::engage(&self.document, ids::PREDICT_BTN, LOADING_LABEL)?;
            self.service.predict(&request).await
        };

        match result {
            Ok(response) => {
                let status = ResultStatus::from_outcome(&response.prediction);
                info!(
                    "Prediction for {} vs {}: {}",
                    request.home_team,
                    request.away_team,
                    response.prediction.as_str()
                );
                self.show(&request.home_team, &request.away_team, status, ResultContent {
                    title: outcome_title(&response.prediction).to_string(),
                    details: details_html(&response.features),
                })?;
                Ok(SubmitOutcome::Predicted(response))
            }
            Err(err) => {
                error!("Prediction request failed: {}", err);
                self.show(&request.home_team, &request.away_team, ResultStatus::Error, ResultContent {
                    title: format!("❌ {}", err),
                    details: RETRY_HINT.to_string(),
                })?;
                Ok(SubmitOutcome::Failed(err))
            }
        }
    }

    fn show(
        &self,
        home: &str,
        away: &str,
        status: ResultStatus,
        content: ResultContent,
    ) -> Result<(), PageError> {
        self.renderer.show(status, &content)?;

        if let Some(journal) = &self.journal {
            let entry = JournalEntry {
                home_team: home,
                away_team: away,
                status: status.class_name(),
                title: &content.title,
            };
            if let Err(e) = journal.record(&entry) {
                warn!("Failed to write prediction journal: {:#}", e);
            }
        }
        Ok(())
    }
}

//! In-memory service doubles for controller tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use crate::data::predict_api::{ApiError, PredictionService, TeamSearch};
use crate::data::types::{MatchFeatures, PredictionRequest, PredictionResponse, TeamSuggestion};
use crate::page::document::ButtonState;
use crate::page::{ids, Document};

type Responder = Box<dyn Fn(&PredictionRequest) -> Result<PredictionResponse, ApiError> + Send + Sync>;

pub fn features(home: &str, away: &str) -> MatchFeatures {
    MatchFeatures {
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_avg_goals: 1.8,
        home_win_rate: 0.55,
        away_avg_goals: 1.1,
        away_win_rate: 0.3,
    }
}

pub fn team(name: &str, zh_name: Option<&str>, country: &str) -> TeamSuggestion {
    TeamSuggestion {
        id: None,
        name: name.to_string(),
        zh_name: zh_name.map(str::to_string),
        country: Some(country.to_string()),
    }
}

pub struct FakePredictions {
    document: Arc<Document>,
    respond: Responder,
    requests: Mutex<Vec<PredictionRequest>>,
    button_seen: Mutex<Option<ButtonState>>,
}

impl FakePredictions {
    pub fn new(
        document: Arc<Document>,
        respond: impl Fn(&PredictionRequest) -> Result<PredictionResponse, ApiError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            document,
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
            button_seen: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<PredictionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Submit button state observed while the request was in flight
    pub fn button_seen_during_call(&self) -> Option<ButtonState> {
        self.button_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionService for FakePredictions {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        *self.button_seen.lock().unwrap() = self.document.button(ids::PREDICT_BTN).ok();
        self.requests.lock().unwrap().push(request.clone());
        tokio::task::yield_now().await;
        (self.respond)(request)
    }
}

#[derive(Default)]
pub struct FakeSearch {
    results: HashMap<String, Vec<TeamSuggestion>>,
    delays: HashMap<String, Duration>,
    failing: Vec<String>,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, teams: Vec<TeamSuggestion>) -> Self {
        self.results.insert(query.to_string(), teams);
        self
    }

    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.push(query.to_string());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TeamSearch for FakeSearch {
    async fn search_teams(&self, query: &str) -> Result<Vec<TeamSuggestion>, ApiError> {
        self.queries.lock().unwrap().push(query.to_string());

        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.iter().any(|q| q == query) {
            return Err(ApiError::Network("search backend unreachable".to_string()));
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionRequest {
    pub home_team: String,
    pub away_team: String,
}

/// Predicted result from the home side's point of view.
///
/// Values outside the known set are kept verbatim so callers can still
/// render something sensible for them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Outcome {
    Win,
    Draw,
    Loss,
    Unknown(String),
}

impl From<String> for Outcome {
    fn from(value: String) -> Self {
        match value.as_str() {
            "win" => Outcome::Win,
            "draw" => Outcome::Draw,
            "loss" => Outcome::Loss,
            _ => Outcome::Unknown(value),
        }
    }
}

impl Outcome {
    pub fn as_str(&self) -> &str {
        match self {
            Outcome::Win => "win",
            Outcome::Draw => "draw",
            Outcome::Loss => "loss",
            Outcome::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchFeatures {
    pub home_team: String,
    pub away_team: String,
    pub home_avg_goals: f64,
    pub home_win_rate: f64,
    pub away_avg_goals: f64,
    pub away_win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionResponse {
    pub prediction: Outcome,
    pub features: MatchFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSuggestion {
    #[serde(default)]
    #[allow(dead_code)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub zh_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl TeamSuggestion {
    fn localized_name(&self) -> Option<&str> {
        self.zh_name.as_deref().filter(|n| !n.is_empty())
    }

    /// Name written into the input when the suggestion is picked
    pub fn display_name(&self) -> &str {
        self.localized_name().unwrap_or(&self.name)
    }

    /// "name · country", only shown when a localized name takes the main line
    pub fn secondary_text(&self) -> Option<String> {
        self.localized_name()?;
        Some(format!(
            "{} · {}",
            self.name,
            self.country.as_deref().unwrap_or("")
        ))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub teams: Vec<TeamSuggestion>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

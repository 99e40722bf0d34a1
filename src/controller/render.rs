use std::sync::Arc;
use crate::data::types::{MatchFeatures, Outcome};
use crate::page::{Document, PageError};

pub const DEFAULT_COLOR: &str = "#2c3e50";
pub const UNKNOWN_TITLE: &str = "Unknown result";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Win,
    Draw,
    Loss,
    Error,
    Unknown,
}

impl ResultStatus {
    pub fn from_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Win => ResultStatus::Win,
            Outcome::Draw => ResultStatus::Draw,
            Outcome::Loss => ResultStatus::Loss,
            Outcome::Unknown(_) => ResultStatus::Unknown,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ResultStatus::Win => "win",
            ResultStatus::Draw => "draw",
            ResultStatus::Loss => "loss",
            ResultStatus::Error => "error",
            ResultStatus::Unknown => "unknown",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ResultStatus::Win => "#2ecc71",
            ResultStatus::Draw => "#f1c40f",
            ResultStatus::Loss => "#e74c3c",
            ResultStatus::Error | ResultStatus::Unknown => DEFAULT_COLOR,
        }
    }
}

pub fn outcome_title(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "🏆 Home win",
        Outcome::Draw => "🤝 Draw",
        Outcome::Loss => "🏆 Away win",
        Outcome::Unknown(_) => UNKNOWN_TITLE,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultContent {
    pub title: String,
    /// Trusted HTML fragment
    pub details: String,
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Win rate in 0..1 as a percentage with one decimal
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Stats list for both sides of a prediction
pub fn details_html(features: &MatchFeatures) -> String {
    let side = |team: &str, avg_goals: f64, win_rate: f64| {
        format!(
            "<li><strong>{}</strong><div>Avg goals: {}</div><div>Recent win rate: {}</div></li>",
            escape_html(team),
            avg_goals,
            format_rate(win_rate)
        )
    };

    format!(
        r#"<ul class="stats-list">{}{}</ul>"#,
        side(&features.home_team, features.home_avg_goals, features.home_win_rate),
        side(&features.away_team, features.away_avg_goals, features.away_win_rate)
    )
}

pub struct ResultRenderer {
    document: Arc<Document>,
    panel_id: String,
}

impl ResultRenderer {
    pub fn new(document: Arc<Document>, panel_id: &str) -> Self {
        Self {
            document,
            panel_id: panel_id.to_string(),
        }
    }

    pub fn hide(&self) -> Result<(), PageError> {
        self.document.update_panel(&self.panel_id, |panel| panel.visible = false)
    }

    /// Replace the panel content and bring it into view
    pub fn show(&self, status: ResultStatus, content: &ResultContent) -> Result<(), PageError> {
        let color = status.color();
        let html = format!(
            r#"<div class="prediction-result" style="color: {}">{}</div><div class="stats-box">{}</div>"#,
            color,
            escape_html(&content.title),
            content.details
        );

        self.document.update_panel(&self.panel_id, |panel| {
            panel.html = html;
            panel.color = Some(color.to_string());
            panel.class_name = status.class_name().to_string();
            panel.visible = true;
            panel.scroll_requests += 1;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ids;

    fn renderer() -> (Arc<Document>, ResultRenderer) {
        let doc = Arc::new(Document::with_form_template());
        let renderer = ResultRenderer::new(Arc::clone(&doc), ids::RESULT);
        (doc, renderer)
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(ResultStatus::Win.color(), "#2ecc71");
        assert_eq!(ResultStatus::Draw.color(), "#f1c40f");
        assert_eq!(ResultStatus::Loss.color(), "#e74c3c");
        assert_eq!(ResultStatus::Error.color(), DEFAULT_COLOR);
        assert_eq!(
            ResultStatus::from_outcome(&Outcome::Unknown("void".into())),
            ResultStatus::Unknown
        );
    }

    #[test]
    fn test_show_sets_panel_state() {
        let (doc, renderer) = renderer();
        let content = ResultContent {
            title: outcome_title(&Outcome::Loss).to_string(),
            details: "<p>stats</p>".to_string(),
        };

        renderer.show(ResultStatus::Loss, &content).unwrap();

        let panel = doc.panel(ids::RESULT).unwrap();
        assert!(panel.visible);
        assert_eq!(panel.class_name, "loss");
        assert_eq!(panel.color.as_deref(), Some("#e74c3c"));
        assert!(panel.html.contains("🏆 Away win"));
        assert!(panel.html.contains("<p>stats</p>"));
        assert_eq!(panel.scroll_requests, 1);
    }

    #[test]
    fn test_show_replaces_previous_content() {
        let (doc, renderer) = renderer();
        renderer.show(ResultStatus::Error, &ResultContent {
            title: "first".into(),
            details: String::new(),
        }).unwrap();
        renderer.show(ResultStatus::Draw, &ResultContent {
            title: "second".into(),
            details: String::new(),
        }).unwrap();

        let panel = doc.panel(ids::RESULT).unwrap();
        assert!(!panel.html.contains("first"));
        assert!(panel.html.contains("second"));
        assert_eq!(panel.class_name, "draw");

        renderer.hide().unwrap();
        assert!(!doc.panel(ids::RESULT).unwrap().visible);
    }

    #[test]
    fn test_title_is_escaped() {
        let (doc, renderer) = renderer();
        renderer.show(ResultStatus::Error, &ResultContent {
            title: "<script>x</script>".into(),
            details: String::new(),
        }).unwrap();

        let panel = doc.panel(ids::RESULT).unwrap();
        assert!(panel.html.contains("&lt;script&gt;"));
        assert!(panel.plain_text().contains("<script>x</script>"));
    }

    #[test]
    fn test_details_html() {
        let features = MatchFeatures {
            home_team: "Milan".into(),
            away_team: "Roma & Co".into(),
            home_avg_goals: 1.5,
            home_win_rate: 0.6,
            away_avg_goals: 0.9,
            away_win_rate: 0.333,
        };
        let html = details_html(&features);

        assert!(html.contains("<strong>Milan</strong>"));
        assert!(html.contains("Roma &amp; Co"));
        assert!(html.contains("Avg goals: 1.5"));
        assert!(html.contains("60.0%"));
        assert!(html.contains("33.3%"));
    }
}

pub mod autocomplete;
pub mod render;
pub mod submit;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use tracing::{debug, info};
use crate::data::predict_api::{PredictionService, TeamSearch};
use crate::monitoring::journal::PredictionJournal;
use crate::page::{ids, Document, PageError};
use autocomplete::{AutocompleteController, AutocompleteSettings, ClickTarget};
use submit::{SubmitHandler, SubmitOutcome};

/// Backends the form talks to
#[derive(Clone)]
pub struct Services {
    pub predictions: Arc<dyn PredictionService>,
    pub search: Arc<dyn TeamSearch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Submit,
    Input { id: String, value: String },
    Click(ClickTarget),
}

pub struct FormController {
    document: Arc<Document>,
    submit: SubmitHandler,
    home: AutocompleteController,
    away: AutocompleteController,
}

/// Wire the prediction form found in `document`.
///
/// Fails if any element of the form template is missing or has the wrong kind.
pub fn init_form_controller(
    document: Arc<Document>,
    services: Services,
    settings: AutocompleteSettings,
    journal: Option<Arc<PredictionJournal>>,
) -> Result<FormController, PageError> {
    let required = [
        (ids::PREDICT_FORM, "form"),
        (ids::HOME_TEAM, "input"),
        (ids::AWAY_TEAM, "input"),
        (ids::HOME_SUGGESTIONS, "suggestion list"),
        (ids::AWAY_SUGGESTIONS, "suggestion list"),
        (ids::RESULT, "panel"),
        (ids::PREDICT_BTN, "button"),
    ];
    for (id, kind) in required {
        document.require(id, kind)?;
    }

    let home = AutocompleteController::new(
        Arc::clone(&document),
        ids::HOME_TEAM,
        ids::HOME_SUGGESTIONS,
        Arc::clone(&services.search),
        settings.clone(),
    );
    let away = AutocompleteController::new(
        Arc::clone(&document),
        ids::AWAY_TEAM,
        ids::AWAY_SUGGESTIONS,
        services.search,
        settings,
    );
    let submit = SubmitHandler::new(Arc::clone(&document), services.predictions, journal);

    info!("Form controller ready");
    Ok(FormController {
        document,
        submit,
        home,
        away,
    })
}

impl FormController {
    #[cfg(test)]
    pub fn home(&self) -> &AutocompleteController {
        &self.home
    }

    #[cfg(test)]
    pub fn away(&self) -> &AutocompleteController {
        &self.away
    }

    fn autocomplete_for_input(&self, id: &str) -> Option<&AutocompleteController> {
        [&self.home, &self.away].into_iter().find(|ac| ac.input_id() == id)
    }

    fn autocomplete_for_list(&self, id: &str) -> Option<&AutocompleteController> {
        [&self.home, &self.away].into_iter().find(|ac| ac.list_id() == id)
    }

    /// Route a page event. Only `Submit` yields an outcome.
    pub async fn dispatch(&self, event: PageEvent) -> Result<Option<SubmitOutcome>, PageError> {
        match event {
            PageEvent::Submit => self.submit.submit().await.map(Some),
            PageEvent::Input { id, value } => {
                debug!("input #{} = {:?}", id, value);
                self.document.set_input_value(&id, &value)?;
                if let Some(ac) = self.autocomplete_for_input(&id) {
                    ac.on_input()?;
                }
                Ok(None)
            }
            PageEvent::Click(target) => {
                if let ClickTarget::SuggestionItem { list_id, index } = &target {
                    if let Some(ac) = self.autocomplete_for_list(list_id) {
                        ac.select(*index)?;
                    }
                }
                self.home.on_document_click(&target)?;
                self.away.on_document_click(&target)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::autocomplete::AutocompleteState;
    use crate::controller::testing::{features, team, FakePredictions, FakeSearch};
    use crate::data::types::{Outcome, PredictionResponse};
    use crate::page::document::Element;
    use std::time::Duration;

    fn build(search: FakeSearch) -> (Arc<Document>, Arc<FakeSearch>, Arc<FakePredictions>, FormController) {
        let doc = Arc::new(Document::with_form_template());
        let search = Arc::new(search);
        let predictions = Arc::new(FakePredictions::new(Arc::clone(&doc), |req| {
            Ok(PredictionResponse {
                prediction: Outcome::Draw,
                features: features(&req.home_team, &req.away_team),
            })
        }));
        let services = Services {
            predictions: predictions.clone(),
            search: search.clone(),
        };
        let controller = init_form_controller(
            Arc::clone(&doc),
            services,
            AutocompleteSettings::default(),
            None,
        )
        .unwrap();
        (doc, search, predictions, controller)
    }

    fn input(id: &str, value: &str) -> PageEvent {
        PageEvent::Input {
            id: id.to_string(),
            value: value.to_string(),
        }
    }

    fn both_teams() -> FakeSearch {
        FakeSearch::new()
            .with_results("Liv", vec![team("Liverpool", Some("利物浦"), "England")])
            .with_results("Eve", vec![team("Everton", None, "England")])
    }

    #[test]
    fn test_init_rejects_missing_elements() {
        let doc = Arc::new(Document::with_form_template());
        doc.remove(ids::AWAY_SUGGESTIONS);
        let services = Services {
            predictions: Arc::new(FakePredictions::new(Arc::clone(&doc), |_| {
                unreachable!("no requests during init")
            })),
            search: Arc::new(FakeSearch::new()),
        };

        let err = init_form_controller(doc, services, AutocompleteSettings::default(), None)
            .err()
            .unwrap();
        assert_eq!(err, PageError::MissingElement(ids::AWAY_SUGGESTIONS.to_string()));
    }

    #[test]
    fn test_init_rejects_wrong_element_kind() {
        let doc = Arc::new(Document::with_form_template());
        doc.insert(ids::RESULT, Element::Form);
        let services = Services {
            predictions: Arc::new(FakePredictions::new(Arc::clone(&doc), |_| {
                unreachable!("no requests during init")
            })),
            search: Arc::new(FakeSearch::new()),
        };

        let result = init_form_controller(doc, services, AutocompleteSettings::default(), None);
        assert!(matches!(result, Err(PageError::WrongElementKind { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_instances_do_not_share_timers() {
        let (doc, search, _p, controller) = build(both_teams());

        controller.dispatch(input(ids::HOME_TEAM, "Liv")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        controller.dispatch(input(ids::AWAY_TEAM, "Eve")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        // home fired at 300ms even though away was typed in between
        assert_eq!(search.queries(), vec!["Liv".to_string()]);
        assert_eq!(controller.home().state(), AutocompleteState::ShowingSuggestions);
        assert_eq!(controller.away().state(), AutocompleteState::Debouncing);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(search.queries(), vec!["Liv".to_string(), "Eve".to_string()]);
        assert!(doc.suggestion_list(ids::HOME_SUGGESTIONS).unwrap().visible);
        assert!(doc.suggestion_list(ids::AWAY_SUGGESTIONS).unwrap().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_outside_only_hides_that_list() {
        let (doc, _search, _p, controller) = build(both_teams());

        controller.dispatch(input(ids::HOME_TEAM, "Liv")).await.unwrap();
        controller.dispatch(input(ids::AWAY_TEAM, "Eve")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;

        controller
            .dispatch(PageEvent::Click(ClickTarget::Element(ids::HOME_TEAM.to_string())))
            .await
            .unwrap();
        assert!(doc.suggestion_list(ids::HOME_SUGGESTIONS).unwrap().visible);
        assert!(!doc.suggestion_list(ids::AWAY_SUGGESTIONS).unwrap().visible);

        controller.dispatch(PageEvent::Click(ClickTarget::Outside)).await.unwrap();
        assert!(!doc.suggestion_list(ids::HOME_SUGGESTIONS).unwrap().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_flow_select_then_submit() {
        let (doc, search, predictions, controller) = build(both_teams());

        controller.dispatch(input(ids::HOME_TEAM, "Liv")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        controller
            .dispatch(PageEvent::Click(ClickTarget::SuggestionItem {
                list_id: ids::HOME_SUGGESTIONS.to_string(),
                index: 0,
            }))
            .await
            .unwrap();
        assert_eq!(doc.input_value(ids::HOME_TEAM).unwrap(), "利物浦");
        assert!(!doc.suggestion_list(ids::HOME_SUGGESTIONS).unwrap().visible);

        controller.dispatch(input(ids::AWAY_TEAM, "E")).await.unwrap();
        controller.dispatch(input(ids::AWAY_TEAM, "Everton")).await.unwrap();
        let outcome = controller.dispatch(PageEvent::Submit).await.unwrap();

        assert!(matches!(outcome, Some(SubmitOutcome::Predicted(_))));
        let request = predictions.last_request().unwrap();
        assert_eq!(request.home_team, "利物浦");
        assert_eq!(request.away_team, "Everton");
        assert_eq!(doc.panel(ids::RESULT).unwrap().class_name, "draw");
        assert_eq!(search.queries()[0], "Liv");
    }
}

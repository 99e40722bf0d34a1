use dashmap::DashMap;

/// Element IDs the form template is expected to provide
pub mod ids {
    pub const PREDICT_FORM: &str = "predictForm";
    pub const HOME_TEAM: &str = "home_team";
    pub const AWAY_TEAM: &str = "away_team";
    pub const HOME_SUGGESTIONS: &str = "home_suggestions";
    pub const AWAY_SUGGESTIONS: &str = "away_suggestions";
    pub const RESULT: &str = "result";
    pub const PREDICT_BTN: &str = "predictBtn";
}

pub const DEFAULT_BUTTON_LABEL: &str = "Start analysis";

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Form,
    Input(InputState),
    Button(ButtonState),
    Panel(PanelState),
    SuggestionList(SuggestionListState),
}

impl Element {
    fn kind(&self) -> &'static str {
        match self {
            Element::Form => "form",
            Element::Input(_) => "input",
            Element::Button(_) => "button",
            Element::Panel(_) => "panel",
            Element::SuggestionList(_) => "suggestion list",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub disabled: bool,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub visible: bool,
    pub class_name: String,
    pub color: Option<String>,
    pub html: String,
    /// Number of times the panel asked to be scrolled into view
    pub scroll_requests: u32,
}

impl PanelState {
    /// Panel markup with tags dropped, one line per non-empty text run
    pub fn plain_text(&self) -> String {
        let mut text = String::with_capacity(self.html.len());
        let mut in_tag = false;
        for c in self.html.chars() {
            match c {
                '<' => {
                    in_tag = true;
                    text.push('\n');
                }
                '>' => in_tag = false,
                _ if !in_tag => text.push(c),
                _ => {}
            }
        }

        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(unescape_html)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionListState {
    pub visible: bool,
    pub items: Vec<SuggestionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionItem {
    pub display_name: String,
    pub secondary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("Missing element #{0}")]
    MissingElement(String),

    #[error("Element #{id} is a {found}, expected a {expected}")]
    WrongElementKind {
        id: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Element tree of a single page, keyed by element ID
pub struct Document {
    elements: DashMap<String, Element>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            elements: DashMap::new(),
        }
    }

    /// Page with every element the prediction form needs
    pub fn with_form_template() -> Self {
        let doc = Self::new();
        doc.insert(ids::PREDICT_FORM, Element::Form);
        doc.insert(ids::HOME_TEAM, Element::Input(InputState::default()));
        doc.insert(ids::AWAY_TEAM, Element::Input(InputState::default()));
        doc.insert(ids::HOME_SUGGESTIONS, Element::SuggestionList(SuggestionListState::default()));
        doc.insert(ids::AWAY_SUGGESTIONS, Element::SuggestionList(SuggestionListState::default()));
        doc.insert(ids::RESULT, Element::Panel(PanelState::default()));
        doc.insert(ids::PREDICT_BTN, Element::Button(ButtonState {
            disabled: false,
            label: DEFAULT_BUTTON_LABEL.to_string(),
        }));
        doc
    }

    pub fn insert(&self, id: impl Into<String>, element: Element) {
        self.elements.insert(id.into(), element);
    }

    #[cfg(test)]
    pub fn remove(&self, id: &str) -> Option<Element> {
        self.elements.remove(id).map(|(_, el)| el)
    }

    /// Fail unless `id` exists and is of the given kind
    pub fn require(&self, id: &str, expected: &'static str) -> Result<(), PageError> {
        self.modify(id, expected, |el| (el.kind() == expected).then_some(()))
    }

    fn modify<T>(
        &self,
        id: &str,
        expected: &'static str,
        f: impl FnOnce(&mut Element) -> Option<T>,
    ) -> Result<T, PageError> {
        let mut entry = self
            .elements
            .get_mut(id)
            .ok_or_else(|| PageError::MissingElement(id.to_string()))?;
        let found = entry.kind();
        f(entry.value_mut()).ok_or_else(|| PageError::WrongElementKind {
            id: id.to_string(),
            expected,
            found,
        })
    }

    pub fn input_value(&self, id: &str) -> Result<String, PageError> {
        self.update_input(id, |input| input.value.clone())
    }

    pub fn set_input_value(&self, id: &str, value: &str) -> Result<(), PageError> {
        self.update_input(id, |input| input.value = value.to_string())
    }

    pub fn update_input<T>(&self, id: &str, f: impl FnOnce(&mut InputState) -> T) -> Result<T, PageError> {
        self.modify(id, "input", |el| match el {
            Element::Input(input) => Some(f(input)),
            _ => None,
        })
    }

    pub fn button(&self, id: &str) -> Result<ButtonState, PageError> {
        self.update_button(id, |b| b.clone())
    }

    pub fn update_button<T>(&self, id: &str, f: impl FnOnce(&mut ButtonState) -> T) -> Result<T, PageError> {
        self.modify(id, "button", |el| match el {
            Element::Button(button) => Some(f(button)),
            _ => None,
        })
    }

    pub fn panel(&self, id: &str) -> Result<PanelState, PageError> {
        self.update_panel(id, |p| p.clone())
    }

    pub fn update_panel<T>(&self, id: &str, f: impl FnOnce(&mut PanelState) -> T) -> Result<T, PageError> {
        self.modify(id, "panel", |el| match el {
            Element::Panel(panel) => Some(f(panel)),
            _ => None,
        })
    }

    pub fn suggestion_list(&self, id: &str) -> Result<SuggestionListState, PageError> {
        self.update_suggestion_list(id, |l| l.clone())
    }

    pub fn update_suggestion_list<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut SuggestionListState) -> T,
    ) -> Result<T, PageError> {
        self.modify(id, "suggestion list", |el| match el {
            Element::SuggestionList(list) => Some(f(list)),
            _ => None,
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

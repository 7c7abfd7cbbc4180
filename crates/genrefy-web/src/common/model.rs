use serde::{Deserialize, Serialize};

pub const DEFAULT_ITEM_TYPE: &str = "genre";

pub const ADD_TOOLTIP: &str = "Добавить в избранное";
pub const REMOVE_TOOLTIP: &str = "Удалить из избранного";
pub const ADDED_MESSAGE: &str = "Добавлено в избранное";
pub const REMOVED_MESSAGE: &str = "Удалено из избранного";
pub const NETWORK_ERROR_MESSAGE: &str = "Ошибка сети";
pub const SEARCH_ERROR_MESSAGE: &str = "Не удалось выполнить поиск";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FavoriteTarget {
    pub item_id: String,
    pub item_type: String,
}

impl FavoriteTarget {
    pub fn new(item_id: impl Into<String>, item_type: Option<String>) -> Self {
        let item_type = item_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_ITEM_TYPE.to_string());

        Self {
            item_id: item_id.into(),
            item_type,
        }
    }

    /// Reads a target from an icon's `data-item-id` and `data-item-type`. Icons without an id have no target.
    pub fn from_attributes(item_id: Option<String>, item_type: Option<String>) -> Option<Self> {
        let item_id = item_id.filter(|id| !id.is_empty())?;
        Some(Self::new(item_id, item_type))
    }

    /// Matches every icon rendered for this target. Icons of the default type
    /// may omit `data-item-type` or leave it empty.
    pub fn selector(&self) -> String {
        let id = escape_attribute(&self.item_id);
        let explicit = format!(
            ".favorite-icon[data-item-id=\"{}\"][data-item-type=\"{}\"]",
            id,
            escape_attribute(&self.item_type)
        );

        if self.item_type != DEFAULT_ITEM_TYPE {
            return explicit;
        }

        format!(
            "{}, .favorite-icon[data-item-id=\"{}\"]:not([data-item-type]), .favorite-icon[data-item-id=\"{}\"][data-item-type=\"\"]",
            explicit, id, id
        )
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleRequest<'a> {
    pub item_id: &'a str,
    pub item_type: &'a str,
}

impl<'a> From<&'a FavoriteTarget> for ToggleRequest<'a> {
    fn from(target: &'a FavoriteTarget) -> Self {
        Self {
            item_id: &target.item_id,
            item_type: &target.item_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

impl ToggleAction {
    pub fn message(&self) -> &'static str {
        match self {
            ToggleAction::Added => ADDED_MESSAGE,
            ToggleAction::Removed => REMOVED_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToggleResponse {
    pub status: String,
    pub action: Option<ToggleAction>,
    pub is_favorite: Option<bool>,
    pub message: Option<String>,
}

/// What the page should do with a toggle response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Reconcile {
        appearance: FavoriteAppearance,
        message: Option<&'static str>,
    },
    Failed(String),
}

impl ToggleResponse {
    pub fn outcome(&self) -> ToggleOutcome {
        if self.status != "success" {
            return ToggleOutcome::Failed(format!(
                "Ошибка: {}",
                self.message.as_deref().unwrap_or_default()
            ));
        }

        // older backends only send the action
        let is_favorite = match (self.is_favorite, self.action) {
            (Some(is_favorite), _) => is_favorite,
            (None, Some(action)) => action == ToggleAction::Added,
            (None, None) => {
                return ToggleOutcome::Failed(format!(
                    "Ошибка: {}",
                    self.message.as_deref().unwrap_or("empty response")
                ));
            }
        };

        ToggleOutcome::Reconcile {
            appearance: FavoriteAppearance::from(is_favorite),
            message: self.action.map(|action| action.message()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteAppearance {
    pub glyph: &'static str,
    pub active: bool,
    pub tooltip: &'static str,
}

impl From<bool> for FavoriteAppearance {
    fn from(is_favorite: bool) -> Self {
        if is_favorite {
            Self {
                glyph: "♥",
                active: true,
                tooltip: REMOVE_TOOLTIP,
            }
        } else {
            Self {
                glyph: "♡",
                active: false,
                tooltip: ADD_TOOLTIP,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(body: &str) -> ToggleResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_target_default_type() {
        let target = FavoriteTarget::new("7", None);
        assert_eq!(target.item_type, "genre");

        let target = FavoriteTarget::new("7", Some("".to_string()));
        assert_eq!(target.item_type, "genre");

        let target = FavoriteTarget::new("7", Some("artist".to_string()));
        assert_eq!(target.item_type, "artist");
    }

    #[test]
    fn test_target_selector() {
        let target = FavoriteTarget::new("12", Some("track".to_string()));

        assert_eq!(
            target.selector(),
            ".favorite-icon[data-item-id=\"12\"][data-item-type=\"track\"]"
        );
    }

    #[test]
    fn test_default_type_selector_covers_untyped_icons() {
        let target = FavoriteTarget::new("12", None);

        assert_eq!(
            target.selector(),
            ".favorite-icon[data-item-id=\"12\"][data-item-type=\"genre\"], \
             .favorite-icon[data-item-id=\"12\"]:not([data-item-type]), \
             .favorite-icon[data-item-id=\"12\"][data-item-type=\"\"]"
        );
    }

    #[test]
    fn test_target_from_attributes() {
        assert_eq!(
            FavoriteTarget::from_attributes(Some("5".to_string()), None),
            Some(FavoriteTarget::new("5", None))
        );
        assert_eq!(
            FavoriteTarget::from_attributes(Some("5".to_string()), Some("artist".to_string()))
                .map(|target| target.item_type),
            Some("artist".to_string())
        );
        assert_eq!(FavoriteTarget::from_attributes(None, Some("artist".to_string())), None);
        assert_eq!(FavoriteTarget::from_attributes(Some("".to_string()), None), None);
    }

    #[test]
    fn test_request_body() {
        let target = FavoriteTarget::new("12", None);
        let body = serde_json::to_value(ToggleRequest::from(&target)).unwrap();

        assert_eq!(body, serde_json::json!({"item_id": "12", "item_type": "genre"}));
    }

    #[test]
    fn test_added_outcome() {
        let outcome = parse(r#"{"status":"success","action":"added","is_favorite":true}"#).outcome();

        assert_eq!(
            outcome,
            ToggleOutcome::Reconcile {
                appearance: FavoriteAppearance {
                    glyph: "♥",
                    active: true,
                    tooltip: REMOVE_TOOLTIP,
                },
                message: Some(ADDED_MESSAGE),
            }
        );
    }

    #[test]
    fn test_removed_outcome() {
        let outcome =
            parse(r#"{"status":"success","action":"removed","is_favorite":false}"#).outcome();

        match outcome {
            ToggleOutcome::Reconcile { appearance, message } => {
                assert_eq!(appearance.glyph, "♡");
                assert!(!appearance.active);
                assert_eq!(appearance.tooltip, ADD_TOOLTIP);
                assert_eq!(message, Some(REMOVED_MESSAGE));
            }
            ToggleOutcome::Failed(msg) => panic!("unexpected failure {}", msg),
        }
    }

    #[test]
    fn test_error_outcome() {
        let outcome = parse(r#"{"status":"error","message":"X"}"#).outcome();

        match outcome {
            ToggleOutcome::Failed(msg) => assert!(msg.contains('X')),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_success_without_state() {
        let outcome = parse(r#"{"status":"success"}"#).outcome();

        assert!(matches!(outcome, ToggleOutcome::Failed(_)));
    }

    #[test]
    fn test_toggle_twice_restores_appearance() {
        let original = FavoriteAppearance::from(false);
        let first = parse(r#"{"status":"success","action":"added","is_favorite":true}"#).outcome();
        let second =
            parse(r#"{"status":"success","action":"removed","is_favorite":false}"#).outcome();

        let ToggleOutcome::Reconcile { appearance: first, .. } = first else {
            panic!("first toggle failed");
        };
        let ToggleOutcome::Reconcile { appearance: second, .. } = second else {
            panic!("second toggle failed");
        };

        assert_ne!(first, original);
        assert_eq!(second, original);
    }
}

use std::rc::Rc;

use dominator::clone;
use gloo_timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::{
    common::{
        cookie::get_cookie,
        events::{self, listen},
        FavoriteAppearance, FavoriteTarget, NotificationSink, SequenceMap, ToggleOutcome,
        ToggleResponse, NETWORK_ERROR_MESSAGE,
    },
    config::Config,
    error::{Error, Result},
    query,
    utils::{absolute_url, document, query_all, set_style},
};

const ICON_SELECTOR: &str = ".favorite-icon";
const ACTIVE_CLASS: &str = "active";
const PULSE_MS: u32 = 300;

/// Keeps favorite icons in sync with the backend. State changes only after the
/// backend answers; nothing is predicted locally.
pub struct FavoriteToggle {
    endpoint: String,
    csrf_cookie: String,
    sink: Rc<dyn NotificationSink>,
    sequence: SequenceMap<FavoriteTarget>,
}

impl FavoriteToggle {
    pub fn new(config: &Config, sink: Rc<dyn NotificationSink>) -> Rc<Self> {
        Rc::new(Self {
            endpoint: config.toggle_endpoint.clone(),
            csrf_cookie: config.csrf_cookie.clone(),
            sink,
            sequence: SequenceMap::new(),
        })
    }

    /// Rewrites icons relying on the default type, then listens for icon clicks
    /// on the document so icons swapped in later by search are handled too.
    pub fn attach(toggle: Rc<Self>) -> Result<usize> {
        let icons = query_all(ICON_SELECTOR).map_err(|e| Error::Dom(e.to_string()))?;

        let mut typed = 0;
        for icon in icons {
            let Some(target) = icon_target(&icon) else {
                warn!("favorite icon without data-item-id, skipping");
                continue;
            };
            icon.set_attribute("data-item-type", &target.item_type)?;
            typed += 1;
        }

        listen(&document(), clone!(toggle => move |event: events::Click| {
            let Some(icon) = event
                .dyn_target::<Element>()
                .and_then(|target| target.closest(ICON_SELECTOR).ok().flatten())
            else {
                return;
            };

            event.prevent_default();
            event.stop_propagation();

            let Some(target) = icon_target(&icon) else {
                warn!("favorite icon without data-item-id, ignoring click");
                return;
            };
            if let Err(e) = icon.set_attribute("data-item-type", &target.item_type) {
                warn!("failed to set data-item-type: {:?}", e);
            }

            Self::toggle(toggle.clone(), target);
        }));

        debug!("found {} favorite icons", typed);

        Ok(typed)
    }

    pub fn toggle(toggle: Rc<Self>, target: FavoriteTarget) {
        let ticket = toggle.sequence.issue(&target);
        let csrf_token = get_cookie(&toggle.csrf_cookie).unwrap_or_default();

        spawn_local(async move {
            let result = match absolute_url(&toggle.endpoint) {
                Ok(url) => query::toggle_favorite(&url, &csrf_token, &target).await,
                Err(e) => Err(Error::Dom(e.to_string())),
            };

            if let Some(appearance) = toggle.settle(&target, ticket, result) {
                match reconcile(&target, appearance) {
                    Ok(count) => debug!("updated {} icons for {:?}", count, target),
                    Err(e) => error!("failed to update favorite icons: {}", e),
                }
            }
        });
    }

    /// Interprets the answer to request `ticket`. Returns the appearance to apply,
    /// or `None` when the page must stay as it is.
    fn settle(
        &self,
        target: &FavoriteTarget,
        ticket: u64,
        result: Result<ToggleResponse>,
    ) -> Option<FavoriteAppearance> {
        if !self.sequence.is_current(target, ticket) {
            debug!("dropping stale favorite response {} for {:?}", ticket, target);
            return None;
        }

        match result.map(|response| response.outcome()) {
            Ok(ToggleOutcome::Reconcile {
                appearance,
                message,
            }) => {
                if let Some(message) = message {
                    self.sink.notify(message);
                }
                Some(appearance)
            }
            Ok(ToggleOutcome::Failed(message)) => {
                error!("favorite toggle rejected: {}", message);
                self.sink.notify(&message);
                None
            }
            Err(e) => {
                error!("favorite toggle failed: {}", e);
                self.sink.notify(NETWORK_ERROR_MESSAGE);
                None
            }
        }
    }
}

fn icon_target(icon: &Element) -> Option<FavoriteTarget> {
    FavoriteTarget::from_attributes(
        icon.get_attribute("data-item-id"),
        icon.get_attribute("data-item-type"),
    )
}

/// Something on the page that renders a favorite state.
pub trait FavoriteIcon {
    fn show(&self, appearance: FavoriteAppearance) -> Result<()>;
}

impl FavoriteIcon for Element {
    fn show(&self, appearance: FavoriteAppearance) -> Result<()> {
        self.set_text_content(Some(appearance.glyph));
        self.class_list()
            .toggle_with_force(ACTIVE_CLASS, appearance.active)?;
        self.set_attribute("title", appearance.tooltip)?;
        pulse(self);

        Ok(())
    }
}

/// Applies `appearance` to every icon rendered for `target`.
pub fn reconcile(target: &FavoriteTarget, appearance: FavoriteAppearance) -> Result<usize> {
    let icons = query_all(&target.selector()).map_err(|e| Error::Dom(e.to_string()))?;

    reconcile_all(&icons, appearance)
}

pub fn reconcile_all<I: FavoriteIcon>(icons: &[I], appearance: FavoriteAppearance) -> Result<usize> {
    for icon in icons {
        icon.show(appearance)?;
    }

    Ok(icons.len())
}

fn pulse(icon: &Element) {
    if let Err(e) = set_style(icon, "transform", "scale(1.3)") {
        warn!("{}", e);
        return;
    }

    let icon = icon.clone();
    Timeout::new(PULSE_MS, move || {
        if let Err(e) = set_style(&icon, "transform", "scale(1)") {
            warn!("{}", e);
        }
    })
    .forget();
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use super::*;
    use crate::common::notification::test::RecordingSink;

    #[derive(Default)]
    struct StubIcon {
        shown: RefCell<Vec<FavoriteAppearance>>,
    }

    impl FavoriteIcon for StubIcon {
        fn show(&self, appearance: FavoriteAppearance) -> Result<()> {
            self.shown.borrow_mut().push(appearance);
            Ok(())
        }
    }

    fn controller() -> (Rc<FavoriteToggle>, Rc<RecordingSink>) {
        let sink = Rc::new(RecordingSink::default());
        let toggle = FavoriteToggle::new(&Config::default(), sink.clone());
        (toggle, sink)
    }

    fn response(body: &str) -> Result<ToggleResponse> {
        Ok(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn test_settle_success() {
        let (toggle, sink) = controller();
        let target = FavoriteTarget::new("3", None);
        let ticket = toggle.sequence.issue(&target);

        let appearance = toggle.settle(
            &target,
            ticket,
            response(r#"{"status":"success","action":"added","is_favorite":true}"#),
        );

        assert_eq!(appearance, Some(FavoriteAppearance::from(true)));
        assert_eq!(*sink.messages.borrow(), vec!["Добавлено в избранное"]);
    }

    #[test]
    fn test_settle_rejected_leaves_page() {
        let (toggle, sink) = controller();
        let target = FavoriteTarget::new("3", None);
        let ticket = toggle.sequence.issue(&target);

        let appearance =
            toggle.settle(&target, ticket, response(r#"{"status":"error","message":"X"}"#));

        assert_eq!(appearance, None);
        let messages = sink.messages.borrow();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains('X'));
    }

    #[test]
    fn test_settle_transport_failure() {
        let (toggle, sink) = controller();
        let target = FavoriteTarget::new("3", None);
        let ticket = toggle.sequence.issue(&target);

        let appearance = toggle.settle(&target, ticket, Err(Error::Status(502)));

        assert_eq!(appearance, None);
        assert_eq!(*sink.messages.borrow(), vec![NETWORK_ERROR_MESSAGE]);
    }

    #[test]
    fn test_settle_drops_stale_response() {
        let (toggle, sink) = controller();
        let target = FavoriteTarget::new("3", None);
        let stale = toggle.sequence.issue(&target);
        let latest = toggle.sequence.issue(&target);

        let dropped = toggle.settle(
            &target,
            stale,
            response(r#"{"status":"success","action":"added","is_favorite":true}"#),
        );
        let applied = toggle.settle(
            &target,
            latest,
            response(r#"{"status":"success","action":"removed","is_favorite":false}"#),
        );

        assert_eq!(dropped, None);
        assert_eq!(applied, Some(FavoriteAppearance::from(false)));
        assert_eq!(*sink.messages.borrow(), vec!["Удалено из избранного"]);
    }

    #[test]
    fn test_settle_other_target_unaffected() {
        let (toggle, _) = controller();
        let genre = FavoriteTarget::new("3", None);
        let artist = FavoriteTarget::new("3", Some("artist".to_string()));
        let genre_ticket = toggle.sequence.issue(&genre);
        toggle.sequence.issue(&artist);

        let appearance = toggle.settle(
            &genre,
            genre_ticket,
            response(r#"{"status":"success","action":"added","is_favorite":true}"#),
        );

        assert!(appearance.is_some());
    }

    #[test]
    fn test_reconcile_updates_every_icon() {
        let icons = vec![StubIcon::default(), StubIcon::default(), StubIcon::default()];
        let appearance = FavoriteAppearance::from(true);

        let count = reconcile_all(&icons, appearance).unwrap();

        assert_eq!(count, 3);
        for icon in icons.iter() {
            assert_eq!(*icon.shown.borrow(), vec![appearance]);
        }
    }

    #[test]
    fn test_reconcile_after_settle() {
        let (toggle, _) = controller();
        let target = FavoriteTarget::new("3", None);
        let icons = vec![StubIcon::default(), StubIcon::default()];
        let ticket = toggle.sequence.issue(&target);

        let appearance = toggle
            .settle(
                &target,
                ticket,
                response(r#"{"status":"success","action":"removed","is_favorite":false}"#),
            )
            .unwrap();
        reconcile_all(&icons, appearance).unwrap();

        for icon in icons.iter() {
            let shown = icon.shown.borrow();
            assert_eq!(shown[0].glyph, "♡");
            assert!(!shown[0].active);
            assert_eq!(shown[0].tooltip, crate::common::ADD_TOOLTIP);
        }
    }
}

use std::rc::Rc;

use dominator::{clone, html};
use web_sys::Element;

use crate::{
    common::{
        events::{self, listen},
        Toast,
    },
    config::Config,
    error::{Error, Result},
    format::{abbreviate, group_thousands, parse_digits},
    utils::{body, document, local_storage, query_all, set_style, window},
};

pub const CARD_FAVORITES_KEY: &str = "genrefy_favorites";

const CARD_SELECTOR: &str = ".card";
const NAV_LINK_SELECTOR: &str = ".nav-link[href]";
const NUMBER_SELECTOR: &str = "[data-format-number], [data-count]";
const HOVER_INDICATOR: &str = "hover-indicator";
const NAV_INDICATOR: &str = "nav-indicator";

/// Presentational behaviour shared by every page: hover effects, nav state,
/// number formatting, mobile layout, and the toast surface.
pub struct PageEnhancer {
    accent_color: String,
    mobile_breakpoint: f64,
    toast: Rc<Toast>,
}

impl PageEnhancer {
    pub fn new(config: &Config) -> Rc<Self> {
        Rc::new(Self {
            accent_color: config.accent_color.clone(),
            mobile_breakpoint: config.mobile_breakpoint,
            toast: Toast::new(config.toast_ms, &config.accent_color),
        })
    }

    pub fn init(enhancer: Rc<Self>) -> Result<()> {
        enhancer.mount_toast()?;
        Self::enhance_cards(enhancer.clone())?;
        enhancer.highlight_nav()?;
        enhancer.format_numbers()?;
        enhancer.check_mobile_view();
        Self::setup_listeners(enhancer.clone());
        enhancer.load_card_favorites();

        info!("page enhanced");

        Ok(())
    }

    pub fn toast(&self) -> Rc<Toast> {
        self.toast.clone()
    }

    fn mount_toast(&self) -> Result<()> {
        if let Some(style) = Toast::render_style() {
            let head = document()
                .head()
                .ok_or_else(|| Error::Dom("document has no head".to_string()))?;
            dominator::append_dom(&head, style);
        }
        dominator::append_dom(&body(), Toast::render(self.toast.clone()));

        Ok(())
    }

    fn setup_listeners(enhancer: Rc<Self>) {
        listen(&document(), |event: events::Click| {
            if let Some(target) = event.dyn_target::<Element>() {
                track_click(&target);
            }
        });

        listen(&window(), clone!(enhancer => move |_: events::Resize| {
            enhancer.check_mobile_view();
        }));

        listen(&window(), clone!(enhancer => move |_: events::BeforeUnload| {
            enhancer.save_card_favorites();
        }));
    }

    fn enhance_cards(enhancer: Rc<Self>) -> Result<()> {
        let cards = query_all(CARD_SELECTOR).map_err(|e| Error::Dom(e.to_string()))?;

        for (index, card) in cards.into_iter().enumerate() {
            card.set_attribute("data-card-id", &index.to_string())?;

            listen(&card, clone!(enhancer, card => move |_: events::MouseEnter| {
                style_all(&card, &[
                    ("transition", "all 0.3s cubic-bezier(0.25, 0.8, 0.25, 1)"),
                    ("transform", "translateY(-5px) scale(1.02)"),
                    ("box-shadow", "0 10px 20px rgba(0, 0, 0, 0.1)"),
                ]);
                enhancer.add_hover_indicator(&card);
            }));

            listen(&card, clone!(card => move |_: events::MouseLeave| {
                style_all(&card, &[("transform", "translateY(0) scale(1)"), ("box-shadow", "")]);
                remove_hover_indicator(&card);
            }));
        }

        Ok(())
    }

    fn add_hover_indicator(&self, card: &Element) {
        if has_child_with_class(card, HOVER_INDICATOR) {
            return;
        }

        style_all(card, &[("position", "relative")]);
        dominator::append_dom(card, html!("div", {
            .class(HOVER_INDICATOR)
            .style("position", "absolute")
            .style("top", "10px")
            .style("right", "10px")
            .style("width", "8px")
            .style("height", "8px")
            .style("background", self.accent_color.as_str())
            .style("border-radius", "50%")
            .style("opacity", "0.7")
        }));
    }

    fn highlight_nav(&self) -> Result<()> {
        let path = window().location().pathname()?;

        for link in query_all(NAV_LINK_SELECTOR).map_err(|e| Error::Dom(e.to_string()))? {
            let Some(href) = link.get_attribute("href") else {
                continue;
            };
            if !is_active_link(&href, &path) {
                continue;
            }

            link.class_list().add_1("active")?;
            if has_child_with_class(&link, NAV_INDICATOR) {
                continue;
            }

            style_all(&link, &[("position", "relative")]);
            dominator::append_dom(&link, html!("span", {
                .class(NAV_INDICATOR)
                .style("position", "absolute")
                .style("bottom", "-2px")
                .style("left", "0")
                .style("right", "0")
                .style("height", "2px")
                .style("background", self.accent_color.as_str())
                .style("border-radius", "2px")
            }));
        }

        Ok(())
    }

    fn format_numbers(&self) -> Result<()> {
        for element in query_all(NUMBER_SELECTOR).map_err(|e| Error::Dom(e.to_string()))? {
            let raw = element
                .get_attribute("data-count")
                .filter(|count| !count.trim().is_empty())
                .or_else(|| element.text_content());
            let Some(number) = raw.as_deref().and_then(parse_digits) else {
                debug!("leaving {:?} unformatted", raw);
                continue;
            };

            let abbreviated = abbreviate(number);
            element.set_inner_html("");
            dominator::append_dom(&element, html!("span", {
                .attr("title", &group_thousands(number))
                .text(&abbreviated.value)
                .children(abbreviated.suffix.map(|suffix| html!("small", {
                    .text(suffix)
                })))
            }));
        }

        Ok(())
    }

    fn check_mobile_view(&self) {
        let width = window()
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(self.mobile_breakpoint);
        let is_mobile = width < self.mobile_breakpoint;

        if let Err(e) = body().class_list().toggle_with_force("mobile-view", is_mobile) {
            error!("failed to toggle mobile view: {:?}", e);
        }

        if is_mobile {
            match query_all(CARD_SELECTOR) {
                Ok(cards) => cards
                    .iter()
                    .for_each(|card| style_all(card, &[("transition", "none")])),
                Err(e) => error!("{}", e),
            }
        }
    }

    fn load_card_favorites(&self) {
        let Some(storage) = local_storage() else {
            return;
        };
        let saved = match storage.get_item(CARD_FAVORITES_KEY) {
            Ok(Some(saved)) => saved,
            Ok(None) => return,
            Err(e) => {
                error!("failed to read {}: {:?}", CARD_FAVORITES_KEY, e);
                return;
            }
        };

        let ids = match parse_card_favorites(&saved) {
            Ok(ids) => ids,
            Err(e) => {
                error!("ignoring corrupt {}: {}", CARD_FAVORITES_KEY, e);
                return;
            }
        };

        for id in ids.iter() {
            let selector = format!("[data-card-id=\"{}\"]", id.replace('"', "\\\""));
            if let Ok(Some(card)) = document().query_selector(&selector) {
                if let Err(e) = card.class_list().add_1("favorite") {
                    warn!("{:?}", e);
                }
                let border = format!("4px solid {}", self.accent_color);
                style_all(&card, &[("border-left", border.as_str())]);
            }
        }

        debug!("restored card favorites {:?}", ids);
    }

    fn save_card_favorites(&self) {
        let ids: Vec<String> = match query_all(".card.favorite") {
            Ok(cards) => cards
                .iter()
                .filter_map(|card| card.get_attribute("data-card-id"))
                .collect(),
            Err(e) => {
                error!("{}", e);
                return;
            }
        };

        if ids.is_empty() {
            return;
        }

        let result = local_storage()
            .ok_or_else(|| Error::Storage("local storage unavailable".to_string()))
            .and_then(|storage| {
                let value = serde_json::to_string(&ids)?;
                storage
                    .set_item(CARD_FAVORITES_KEY, &value)
                    .map_err(|e| Error::Storage(format!("{:?}", e)))
            });

        match result {
            Ok(()) => debug!("saved card favorites {:?}", ids),
            Err(e) => error!("failed to save card favorites: {}", e),
        }
    }
}

/// `href` is active on its own path and, except for the site root, on every path below it.
pub fn is_active_link(href: &str, path: &str) -> bool {
    href == path || (href != "/" && path.starts_with(href))
}

pub fn parse_card_favorites(raw: &str) -> std::result::Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(raw)
}

fn track_click(target: &Element) {
    if let Ok(Some(card)) = target.closest(CARD_SELECTOR) {
        let title = card
            .query_selector(".card-title")
            .ok()
            .flatten()
            .and_then(|title| title.text_content())
            .map(|title| title.trim().to_string())
            .unwrap_or_else(|| "untitled".to_string());
        debug!(
            "card click id={:?} title={:?}",
            card.get_attribute("data-card-id"),
            title
        );
    }

    if target.matches(".btn").unwrap_or(false) {
        let kind = if target.class_list().contains("btn-primary") {
            "primary"
        } else {
            "secondary"
        };
        debug!(
            "button click text={:?} kind={}",
            target.text_content().unwrap_or_default().trim(),
            kind
        );
    }
}

fn has_child_with_class(element: &Element, class: &str) -> bool {
    element
        .query_selector(&format!(".{}", class))
        .ok()
        .flatten()
        .is_some()
}

fn remove_hover_indicator(card: &Element) {
    if let Ok(Some(indicator)) = card.query_selector(&format!(".{}", HOVER_INDICATOR)) {
        indicator.remove();
    }
}

fn style_all(element: &Element, styles: &[(&str, &str)]) {
    for (property, value) in styles {
        if let Err(e) = set_style(element, property, value) {
            warn!("{}", e);
        }
    }
}

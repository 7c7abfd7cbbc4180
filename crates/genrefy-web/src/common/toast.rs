use std::{cell::RefCell, rc::Rc};

use dominator::{clone, html, Dom};
use futures_signals::signal::{Mutable, SignalExt};
use gloo_timers::callback::Timeout;

use crate::common::events;

const STYLE_ID: &str = "toast-styles";

const KEYFRAMES: &str = r#"
@keyframes slideIn {
    from { transform: translateX(100%); opacity: 0; }
    to { transform: translateX(0); opacity: 1; }
}
.genrefy-toast {
    font-family: system-ui, -apple-system, sans-serif;
    font-size: 14px;
}
"#;

pub struct Toast {
    message: Mutable<Option<String>>,
    hide_timer: RefCell<Option<Timeout>>,
    duration_ms: u32,
    accent_color: String,
}

impl Toast {
    pub fn new(duration_ms: u32, accent_color: &str) -> Rc<Self> {
        Rc::new(Self {
            message: Mutable::new(None),
            hide_timer: RefCell::new(None),
            duration_ms,
            accent_color: accent_color.to_string(),
        })
    }

    /// Shows `message`, replacing any visible one and restarting the hide timer.
    pub fn show(&self, message: String) {
        self.message.set(Some(message));

        let message = self.message.clone();
        let timeout = Timeout::new(self.duration_ms, move || message.set(None));
        // dropping the previous timeout cancels it
        self.hide_timer.replace(Some(timeout));
    }

    pub fn render_style() -> Option<Dom> {
        if crate::utils::document().get_element_by_id(STYLE_ID).is_some() {
            return None;
        }

        Some(html!("style", {
            .attr("id", STYLE_ID)
            .text(KEYFRAMES)
        }))
    }

    pub fn render(toast: Rc<Self>) -> Dom {
        html!("div", {
            .class("genrefy-toast")
            .style("position", "fixed")
            .style("bottom", "20px")
            .style("right", "20px")
            .style("background", toast.accent_color.as_str())
            .style("color", "white")
            .style("padding", "12px 20px")
            .style("border-radius", "8px")
            .style("box-shadow", "0 4px 12px rgba(0,0,0,0.15)")
            .style("z-index", "1000")
            .style("animation", "slideIn 0.3s ease")
            .visible_signal(toast.message.signal_cloned().map(|message| message.is_some()))
            .event(clone!(toast => move |_: events::Click| toast.message.set(None)))
            .child_signal(toast.message.signal_cloned().map(|message| message.map(|msg| html!("span", {
                .text(&msg)
            }))))
        })
    }
}

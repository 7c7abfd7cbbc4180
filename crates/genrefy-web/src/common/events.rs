use dominator::traits::StaticEvent;
use wasm_bindgen::{prelude::*, JsCast};
use web_sys::EventTarget;

pub use dominator::events::*;

/// Attaches `f` to a node that already exists in the server-rendered page.
/// The listener lives as long as the page.
pub fn listen<E, F>(target: &EventTarget, mut f: F)
where
    E: StaticEvent + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
        f(E::unchecked_from_event(event))
    }) as Box<dyn FnMut(_)>);

    if let Err(e) =
        target.add_event_listener_with_callback(E::EVENT_TYPE, closure.as_ref().unchecked_ref())
    {
        error!("failed to listen for {}: {:?}", E::EVENT_TYPE, e);
    }

    closure.forget();
}

pub struct BeforeUnload {
    #[allow(dead_code)]
    event: web_sys::Event,
}

impl StaticEvent for BeforeUnload {
    const EVENT_TYPE: &'static str = "beforeunload";

    #[inline]
    fn unchecked_from_event(event: web_sys::Event) -> Self {
        Self { event }
    }
}

impl BeforeUnload {
    #[allow(dead_code)]
    #[inline]
    pub fn target(&self) -> Option<web_sys::EventTarget> { self.event.target() }
}

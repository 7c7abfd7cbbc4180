use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use futures::{
    future::{abortable, AbortHandle},
    Future,
};
use futures_signals::signal::Mutable;
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, History, HtmlElement, Storage, Window};

thread_local! {
    static WINDOW: Window = web_sys::window().unwrap_throw();
    static DOCUMENT: Document = WINDOW.with(|w| w.document().unwrap_throw());
    static BODY: HtmlElement = DOCUMENT.with(|d| d.body().unwrap_throw());
    static LOCAL_STORAGE: Option<Storage> = WINDOW.with(|w| w.local_storage().ok().flatten());
    static HISTORY: History = WINDOW.with(|w| w.history().unwrap_throw());
}

pub struct AsyncState {
    id: usize,
    handle: AbortHandle,
}

impl AsyncState {
    fn new(handle: AbortHandle) -> Self {
        static ID: AtomicUsize = AtomicUsize::new(0);
        let id = ID.fetch_add(1, Ordering::SeqCst);

        Self { id, handle }
    }
}

/// Runs at most one future at a time; loading a new one aborts the previous.
pub struct AsyncLoader {
    loading: Mutable<Option<AsyncState>>,
}

impl Default for AsyncLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncLoader {
    pub fn new() -> Self {
        Self {
            loading: Mutable::new(None),
        }
    }

    pub fn replace(&self, value: Option<AsyncState>) {
        let mut loading = self.loading.lock_mut();
        if let Some(state) = loading.as_mut() {
            state.handle.abort();
        }
        *loading = value;
    }

    pub fn load<F>(&self, fut: F)
    where
        F: Future<Output = ()> + 'static,
    {
        let (fut, handle) = abortable(fut);

        let state = AsyncState::new(handle);
        let id = state.id;

        self.replace(Some(state));

        let loading = self.loading.clone();

        spawn_local(async move {
            match fut.await {
                Ok(()) => {
                    let mut loading = loading.lock_mut();

                    if let Some(current_id) = loading.as_ref().map(|x| x.id) {
                        if current_id == id {
                            *loading = None;
                        }
                    }
                }
                Err(_) => {
                    debug!("request {} superseded", id);
                }
            }
        });
    }

    pub fn is_loading(&self) -> bool {
        self.loading.lock_ref().is_some()
    }
}

/// Resolves a site-relative path against the page origin, since fetch through reqwest needs absolute urls.
pub fn absolute_url(path: &str) -> Result<String, anyhow::Error> {
    let origin = window()
        .location()
        .origin()
        .map_err(|e| anyhow!("error read origin: {:?}", e))?;

    Ok(format!("{}/{}", origin.trim_end_matches('/'), path.trim_start_matches('/')))
}

pub fn query_all(selector: &str) -> Result<Vec<Element>, anyhow::Error> {
    query_all_in(&document(), selector)
}

pub fn query_all_in(document: &Document, selector: &str) -> Result<Vec<Element>, anyhow::Error> {
    let nodes = document
        .query_selector_all(selector)
        .map_err(|e| anyhow!("error query {}: {:?}", selector, e))?;

    Ok((0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

pub fn set_style(element: &Element, property: &str, value: &str) -> Result<(), anyhow::Error> {
    element
        .dyn_ref::<HtmlElement>()
        .ok_or_else(|| anyhow!("element is not html"))?
        .style()
        .set_property(property, value)
        .map_err(|e| anyhow!("error set {}: {:?}", property, e))
}

pub fn window() -> Window {
    WINDOW.with(|s| s.clone())
}

pub fn local_storage() -> Option<Storage> {
    LOCAL_STORAGE.with(|s| s.clone())
}

pub fn history() -> History {
    HISTORY.with(|h| h.clone())
}

pub fn document() -> Document {
    DOCUMENT.with(|d| d.clone())
}

pub fn body() -> HtmlElement {
    BODY.with(|d| d.clone())
}

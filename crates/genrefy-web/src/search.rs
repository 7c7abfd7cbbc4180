use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use dominator::clone;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use reqwest::Url;
use web_sys::{DomParser, HtmlInputElement, SupportedType};

use crate::{
    common::{
        events::{self, listen},
        NotificationSink, RequestSequence, SEARCH_ERROR_MESSAGE,
    },
    config::Config,
    error::{Error, Result},
    query,
    utils::{document, history, window, AsyncLoader},
};

pub const SEARCH_PARAM: &str = "search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// An empty query resets the listing; a too short one would match nearly everything.
    pub fn is_searchable(&self, min_chars: usize) -> bool {
        let len = self.0.chars().count();
        len == 0 || len >= min_chars
    }

    /// Value for the `search` url parameter, `None` meaning the parameter is removed.
    pub fn param(&self) -> Option<&str> {
        (!self.is_empty()).then_some(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DebounceState {
    Idle,
    Pending { generation: u64, query: SearchQuery },
}

/// Keystroke scheduling without timers: every input supersedes the pending one and
/// only the generation handed out last may fire.
#[derive(Debug)]
pub struct Debounce {
    min_chars: usize,
    generation: Cell<u64>,
    state: RefCell<DebounceState>,
}

impl Debounce {
    pub fn new(min_chars: usize) -> Self {
        Self {
            min_chars,
            generation: Cell::new(0),
            state: RefCell::new(DebounceState::Idle),
        }
    }

    pub fn input(&self, raw: &str) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.state.replace(DebounceState::Pending {
            generation,
            query: SearchQuery::new(raw),
        });

        generation
    }

    /// Called when the quiet period for `generation` ran out.
    pub fn elapse(&self, generation: u64) -> Option<SearchQuery> {
        let mut state = self.state.borrow_mut();
        match &*state {
            DebounceState::Pending {
                generation: pending,
                ..
            } if *pending == generation => {}
            _ => return None,
        }

        let DebounceState::Pending { query, .. } =
            std::mem::replace(&mut *state, DebounceState::Idle)
        else {
            return None;
        };

        if query.is_searchable(self.min_chars) {
            Some(query)
        } else {
            debug!("query {:?} too short, not searching", query.as_str());
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), DebounceState::Pending { .. })
    }
}

/// Orders search responses. Only the answer to the last issued request may
/// reach the page, and a failure is reported once through the sink.
pub struct SearchRequests {
    sequence: RequestSequence,
    sink: Rc<dyn NotificationSink>,
}

impl SearchRequests {
    pub fn new(sink: Rc<dyn NotificationSink>) -> Self {
        Self {
            sequence: RequestSequence::new(),
            sink,
        }
    }

    pub fn issue(&self) -> u64 {
        self.sequence.issue()
    }

    /// Hands the fragment answering `ticket` to `apply`. Returns whether the page changed.
    pub fn settle<F>(&self, ticket: u64, result: Result<String>, apply: F) -> bool
    where
        F: FnOnce(&str) -> Result<()>,
    {
        // AsyncLoader already aborts superseded fetches; the ticket check keeps
        // ordering independent of when the abort lands
        if !self.sequence.is_current(ticket) {
            debug!("dropping stale search response {}", ticket);
            return false;
        }

        match result.and_then(|html| apply(&html)) {
            Ok(()) => true,
            Err(e) => {
                error!("search failed: {}", e);
                self.sink.notify(SEARCH_ERROR_MESSAGE);
                false
            }
        }
    }
}

pub struct LiveSearch {
    input: HtmlInputElement,
    debounce: Debounce,
    debounce_ms: u32,
    timer: RefCell<Option<Timeout>>,
    requests: SearchRequests,
    loader: AsyncLoader,
    results_selector: String,
    count_selector: String,
    sink: Rc<dyn NotificationSink>,
}

impl LiveSearch {
    /// Binds to the search field. Returns `None` on pages without one.
    pub fn attach(config: &Config, sink: Rc<dyn NotificationSink>) -> Result<Option<Rc<Self>>> {
        let Some(input) = document().query_selector(&config.search_input_selector)? else {
            debug!("no search input on this page");
            return Ok(None);
        };
        let input = input
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| Error::Dom("search field is not an input".to_string()))?;

        let search = Rc::new(Self {
            input,
            debounce: Debounce::new(config.min_query_chars),
            debounce_ms: config.debounce_ms,
            timer: RefCell::new(None),
            requests: SearchRequests::new(sink.clone()),
            loader: AsyncLoader::new(),
            results_selector: config.results_selector.clone(),
            count_selector: config.count_selector.clone(),
            sink,
        });

        listen(&search.input, clone!(search => move |_: events::Input| {
            Self::schedule(search.clone());
        }));

        Ok(Some(search))
    }

    fn schedule(search: Rc<Self>) {
        let generation = search.debounce.input(&search.input.value());
        let timeout = Timeout::new(search.debounce_ms, clone!(search => move || {
            Self::fire(search.clone(), generation);
        }));
        // replacing the handle drops, and so cancels, the previous timer
        search.timer.replace(Some(timeout));
    }

    fn fire(search: Rc<Self>, generation: u64) {
        search.timer.replace(None);
        if let Some(keyword) = search.debounce.elapse(generation) {
            Self::search(search, keyword);
        }
    }

    pub fn search(search: Rc<Self>, keyword: SearchQuery) {
        let url = match update_url(&keyword) {
            Ok(url) => url,
            Err(e) => {
                error!("failed to update search url: {}", e);
                search.sink.notify(SEARCH_ERROR_MESSAGE);
                return;
            }
        };

        if search.loader.is_loading() {
            debug!("superseding in-flight search");
        }

        let ticket = search.requests.issue();
        search.loader.load(clone!(search => async move {
            let result = query::fetch_fragment(&url).await;

            let applied = search
                .requests
                .settle(ticket, result, |html| search.replace_results(html));
            if applied {
                info!("search results updated for {:?}", keyword.as_str());
            }
        }));
    }

    /// Swaps the live results and counter for the ones in `html`. A response
    /// without a results container is a failure; a missing counter, or a
    /// container absent from the page, is only logged.
    fn replace_results(&self, html: &str) -> Result<()> {
        let fragment = DomParser::new()?.parse_from_string(html, SupportedType::TextHtml)?;

        let Some(results) = fragment.query_selector(&self.results_selector)? else {
            return Err(Error::Dom(format!(
                "response has no {}",
                self.results_selector
            )));
        };

        for (selector, source) in [
            (&self.results_selector, Some(results)),
            (&self.count_selector, fragment.query_selector(&self.count_selector)?),
        ] {
            let Some(source) = source else {
                warn!("response has no {}", selector);
                continue;
            };
            match document().query_selector(selector)? {
                Some(live) => live.set_inner_html(&source.inner_html()),
                None => warn!("page has no {}", selector),
            }
        }

        Ok(())
    }
}

/// Mirrors the query into the address bar without navigating.
fn update_url(query: &SearchQuery) -> Result<String> {
    let href = with_search_param(&window().location().href()?, query)?;

    let history = history();
    history.replace_state_with_url(&history.state()?, "", Some(&href))?;

    Ok(href)
}

/// Returns `href` with the `search` parameter set to the query, or removed for an
/// empty query. Other parameters keep their order.
pub fn with_search_param(href: &str, query: &SearchQuery) -> Result<String> {
    let mut url = Url::parse(href).map_err(|e| Error::Dom(format!("bad url {}: {}", href, e)))?;

    let mut value = query.param();
    let mut pairs = vec![];
    for (key, current) in url.query_pairs().into_owned() {
        if key != SEARCH_PARAM {
            pairs.push((key, current));
        } else if let Some(value) = value.take() {
            pairs.push((key, value.to_string()));
        }
    }
    if let Some(value) = value {
        pairs.push((SEARCH_PARAM.to_string(), value.to_string()));
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    Ok(url.to_string())
}

#[macro_use]
extern crate log;

pub mod common;
pub mod config;
pub mod enhance;
pub mod error;
pub mod favorite;
pub mod format;
pub mod query;
pub mod search;
mod utils;

use wasm_bindgen::prelude::*;

use common::notification;
use config::Config;
use enhance::PageEnhancer;
use favorite::FavoriteToggle;
use search::LiveSearch;

#[wasm_bindgen(start)]
pub async fn main_js() -> Result<(), JsValue> {
    #[cfg(debug_assertions)]
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Debug));

    let config = Config::load();
    log::set_max_level(config.log_level().to_level_filter());

    let enhancer = PageEnhancer::new(&config);
    let toast = match PageEnhancer::init(enhancer.clone()) {
        Ok(()) => Some(enhancer.toast()),
        Err(e) => {
            error!("failed to enhance page: {}", e);
            None
        }
    };
    let sink = notification::select(toast);

    if let Err(e) = FavoriteToggle::attach(FavoriteToggle::new(&config, sink.clone())) {
        error!("failed to attach favorite icons: {}", e);
    }

    if let Err(e) = LiveSearch::attach(&config, sink) {
        error!("failed to attach live search: {}", e);
    }

    Ok(())
}

use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

use crate::utils::document;

/// Returns the raw, still percent-encoded value of `name` in a `document.cookie` string.
pub fn find_cookie<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(name)?.strip_prefix('='))
}

pub fn get_cookie(name: &str) -> Option<String> {
    let cookies = document().dyn_into::<HtmlDocument>().ok()?.cookie().ok()?;
    let raw = find_cookie(&cookies, name)?;

    match js_sys::decode_uri_component(raw) {
        Ok(value) => Some(value.into()),
        Err(e) => {
            warn!("failed to decode cookie {}: {:?}", name, e);
            Some(raw.to_string())
        }
    }
}

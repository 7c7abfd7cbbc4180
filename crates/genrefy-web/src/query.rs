use crate::{
    common::{FavoriteTarget, ToggleRequest, ToggleResponse},
    error::{Error, Result},
};

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

pub async fn toggle_favorite(
    url: &str,
    csrf_token: &str,
    target: &FavoriteTarget,
) -> Result<ToggleResponse> {
    let client = reqwest::Client::new();

    let res = client
        .post(url)
        .header(CSRF_HEADER, csrf_token)
        .json(&ToggleRequest::from(target))
        .send()
        .await?;

    let status = res.status();
    let body = res.text().await?;

    decode_toggle_response(status.as_u16(), &body)
}

/// A JSON body is honoured whatever the status; anything else off a non-2xx is a transport failure.
pub fn decode_toggle_response(status: u16, body: &str) -> Result<ToggleResponse> {
    match serde_json::from_str::<ToggleResponse>(body) {
        Ok(response) => Ok(response),
        Err(_) if !(200..300).contains(&status) => Err(Error::Status(status)),
        Err(e) => Err(Error::Decode(e)),
    }
}

/// Fetches `url` as a partial page; the backend answers with a fragment instead of the full layout.
pub async fn fetch_fragment(url: &str) -> Result<String> {
    let client = reqwest::Client::new();

    let res = client
        .get(url)
        .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
        .send()
        .await?;

    if !res.status().is_success() {
        return Err(Error::Status(res.status().as_u16()));
    }

    Ok(res.text().await?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode_success() {
        let response = decode_toggle_response(
            200,
            r#"{"status":"success","action":"added","is_favorite":true}"#,
        )
        .unwrap();

        assert_eq!(response.status, "success");
        assert_eq!(response.is_favorite, Some(true));
    }

    #[test]
    fn test_decode_error_body_on_bad_status() {
        let response =
            decode_toggle_response(400, r#"{"status":"error","message":"bad item"}"#).unwrap();

        assert_eq!(response.message.as_deref(), Some("bad item"));
    }

    #[test]
    fn test_decode_html_on_bad_status() {
        let result = decode_toggle_response(403, "<h1>Forbidden</h1>");

        assert!(matches!(result, Err(Error::Status(403))));
    }

    #[test]
    fn test_decode_garbage_on_ok() {
        let result = decode_toggle_response(200, "not json");

        assert!(matches!(result, Err(Error::Decode(_))));
    }
}

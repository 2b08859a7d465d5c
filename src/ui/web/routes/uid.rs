use axum::Json;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::base_system::uid::{UidError, resolve_uid};

pub(crate) const MSG_MISSING_LINK: &str = "Missing 'link' query parameter.";
pub(crate) const MSG_NOT_EXTRACTED: &str = "Could not extract UID from the provided link.";

/// `GET /get_uid?link=<url>`
///
/// Raw pairs rather than a struct: repeated `link` keys are legal and the
/// first one wins.
pub(crate) async fn api_get_uid(Query(pairs): Query<Vec<(String, String)>>) -> Response {
    let link = first_value(&pairs, "link");
    match resolve_uid(link) {
        Ok(uid) => Json(json!({ "uid": uid })).into_response(),
        Err(UidError::InputMissing) => api_error(StatusCode::BAD_REQUEST, MSG_MISSING_LINK),
        Err(UidError::ExtractionFailed) => api_error(StatusCode::NOT_FOUND, MSG_NOT_EXTRACTED),
    }
}

fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn api_error(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "error": msg }))).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::Uri;
    use serde_json::Value;

    use super::*;

    async fn call(uri: &str) -> (StatusCode, Value) {
        let uri: Uri = uri.parse().unwrap();
        let query = Query::<Vec<(String, String)>>::try_from_uri(&uri).unwrap();
        let resp = api_get_uid(query).await;
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_link_is_bad_request() {
        let (status, body) = call("/get_uid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": MSG_MISSING_LINK }));

        let (status, _) = call("/get_uid?link=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn username_link_returns_uid() {
        let (status, body) = call("/get_uid?link=https://facebook.com/zuck").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "uid": "zuck" }));
    }

    #[tokio::test]
    async fn percent_encoded_link_is_decoded_before_matching() {
        let (status, body) =
            call("/get_uid?link=https%3A%2F%2Ffacebook.com%2Fphoto.php%3Ffbid%3D987654321").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "uid": "987654321" }));
    }

    #[tokio::test]
    async fn repeated_link_uses_the_first_value() {
        let (status, body) = call("/get_uid?link=https://facebook.com/zuck&link=x").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "uid": "zuck" }));

        let (status, _) = call("/get_uid?link=&link=https://facebook.com/zuck").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unrelated_params_are_ignored() {
        let (status, body) = call("/get_uid?ref=abc&link=https://facebook.com/zuck&x").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "uid": "zuck" }));

        let (status, body) = call("/get_uid?lnk=https://facebook.com/zuck").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": MSG_MISSING_LINK }));
    }

    #[tokio::test]
    async fn unmatched_link_is_not_found() {
        let (status, body) = call("/get_uid?link=https://example.com/not-facebook").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": MSG_NOT_EXTRACTED }));
    }
}

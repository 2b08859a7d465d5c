use axum::Form;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tracing::debug;

use crate::base_system::uid::{UidError, resolve_uid};
use crate::ui::web::templates::{self, FormOutcome};

pub(crate) const MSG_NO_LINK: &str = "Please enter a Facebook link.";
pub(crate) const MSG_NO_UID: &str =
    "Could not extract UID from the provided link. Please check the URL format.";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LinkForm {
    pub(crate) facebook_link: Option<String>,
}

pub(crate) async fn index() -> Response {
    page(templates::render_index("", &FormOutcome::Empty))
}

/// A body that is not urlencoded (empty, multipart) counts as a missing link.
pub(crate) async fn submit(form: Option<Form<LinkForm>>) -> Response {
    let link = form
        .and_then(|Form(f)| f.facebook_link)
        .unwrap_or_default();

    let html = match resolve_uid(Some(&link)) {
        Ok(uid) => templates::render_index(
            &link,
            &FormOutcome::Uid {
                uid: uid.as_str(),
                kind: uid.kind(),
            },
        ),
        Err(e) => {
            debug!(target: "web", link = %link, error = %e, "form lookup failed");
            let msg = match e {
                UidError::InputMissing => MSG_NO_LINK,
                UidError::ExtractionFailed => MSG_NO_UID,
            };
            templates::render_index(&link, &FormOutcome::Error(msg))
        }
    };

    page(html)
}

pub(crate) async fn asset_css() -> Response {
    let mut resp = Response::new(templates::APP_CSS.into());
    *resp.status_mut() = StatusCode::OK;
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/css; charset=utf-8"),
    );
    no_cache(&mut resp);
    resp
}

fn page(html: String) -> Response {
    let mut resp = Html(html).into_response();
    no_cache(&mut resp);
    resp
}

fn no_cache(resp: &mut Response) {
    resp.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    resp.headers_mut()
        .insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    resp.headers_mut()
        .insert(header::EXPIRES, HeaderValue::from_static("0"));
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn post(link: Option<&str>) -> (StatusCode, String) {
        let resp = submit(Some(Form(LinkForm {
            facebook_link: link.map(str::to_string),
        })))
        .await;
        let status = resp.status();
        (status, body_text(resp).await)
    }

    #[tokio::test]
    async fn get_renders_empty_form() {
        let resp = index().await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store, no-cache, must-revalidate"
        );
        let html = body_text(resp).await;
        assert!(html.contains(r#"name="facebook_link""#));
        assert!(!html.contains(MSG_NO_LINK));
    }

    #[tokio::test]
    async fn missing_or_empty_link_asks_for_one() {
        for link in [None, Some("")] {
            let (status, html) = post(link).await;
            assert_eq!(status, StatusCode::OK);
            assert!(html.contains(MSG_NO_LINK));
        }
    }

    #[tokio::test]
    async fn body_that_is_not_a_form_asks_for_a_link() {
        let resp = submit(None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains(MSG_NO_LINK));
    }

    #[tokio::test]
    async fn unmatched_link_reports_format_problem() {
        let (_, html) = post(Some("https://example.com/not-facebook")).await;
        assert!(html.contains(MSG_NO_UID));
        assert!(html.contains(r#"value="https://example.com/not-facebook""#));
    }

    #[tokio::test]
    async fn matched_link_shows_uid() {
        let (_, html) = post(Some("https://facebook.com/johndoe/posts/123456789")).await;
        assert!(html.contains(r#"<code id="uid">123456789</code>"#));
        assert!(html.contains("UID (numeric)"));

        let (_, html) = post(Some("https://facebook.com/zuck")).await;
        assert!(html.contains(r#"<code id="uid">zuck</code>"#));
        assert!(html.contains("UID (username)"));
    }

    #[tokio::test]
    async fn stylesheet_is_served_as_css() {
        let resp = asset_css().await;
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css; charset=utf-8"
        );
        assert!(body_text(resp).await.contains(".result.ok"));
    }
}

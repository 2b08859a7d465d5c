pub(crate) const INDEX_HTML: &str = include_str!("templates/index.html");
pub(crate) const APP_CSS: &str = include_str!("templates/app.css");

const SLOT_LINK: &str = "{{link}}";
const SLOT_RESULT: &str = "{{result}}";

/// Outcome of a form submission, rendered under the input box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FormOutcome<'a> {
    Empty,
    Uid { uid: &'a str, kind: &'a str },
    Error(&'a str),
}

pub(crate) fn render_index(link: &str, outcome: &FormOutcome<'_>) -> String {
    let result = match outcome {
        FormOutcome::Empty => String::new(),
        FormOutcome::Uid { uid, kind } => format!(
            r#"<div class="result ok"><span class="label">UID ({})</span><code id="uid">{}</code></div>"#,
            escape_html(kind),
            escape_html(uid)
        ),
        FormOutcome::Error(msg) => {
            format!(r#"<div class="result err">{}</div>"#, escape_html(msg))
        }
    };

    INDEX_HTML
        .replace(SLOT_LINK, &escape_html(link))
        .replace(SLOT_RESULT, &result)
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

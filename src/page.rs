//! Server-rendered HTML building blocks shared by both apps.
//!
//! Every page is rendered in full on each request; values are escaped here so
//! handlers can pass raw text.

use actix_web::{http::header::ContentType, HttpResponse, Responder};

// -----------------------------------------------------------------------------
// Models
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    Success,
    Info,
    Warning,
    Error,
}

impl Alert {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alert::Success => "success",
            Alert::Info => "info",
            Alert::Warning => "warning",
            Alert::Error => "error",
        }
    }
}

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; min-height: 100vh; color: #262730; }
aside { width: 18rem; padding: 1.5rem; background: #f0f2f6; }
aside label { display: block; margin: 1rem 0 0.25rem; font-size: 0.9rem; }
aside input, aside select { width: 100%; padding: 0.4rem; box-sizing: border-box; }
aside button { margin-top: 1.25rem; width: 100%; padding: 0.5rem; background: #ff4b4b; color: #fff; border: 0; border-radius: 0.3rem; }
main { flex: 1; padding: 1.5rem 3rem; }
.alert { padding: 0.75rem 1rem; border-radius: 0.3rem; margin: 0.5rem 0; }
.alert-success { background: #dff5e3; }
.alert-info { background: #e1ecfb; }
.alert-warning { background: #fdf6d8; }
.alert-error { background: #fde2e2; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #e6e6e6; }
pre { background: #f6f8fa; padding: 1rem; overflow-x: auto; }
"#;

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn layout(title: &str, sidebar: Option<&str>, main: &str) -> String {
    let sidebar = sidebar
        .map(|content| format!("<aside>{}</aside>", content))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>{}<main>{}</main></body>\n</html>\n",
        escape_html(title),
        STYLE,
        sidebar,
        main
    )
}

pub fn title(text: &str) -> String {
    format!("<h1>{}</h1>", escape_html(text))
}

pub fn header(text: &str) -> String {
    format!("<h2>{}</h2>", escape_html(text))
}

pub fn subheader(text: &str) -> String {
    format!("<h3>{}</h3>", escape_html(text))
}

pub fn divider() -> String {
    "<hr>".to_string()
}

pub fn alert(kind: Alert, message: &str) -> String {
    format!(
        "<div class=\"alert alert-{}\">{}</div>",
        kind.as_str(),
        escape_html(message)
    )
}

/// A paragraph with a bold label, e.g. `Type: object`.
pub fn labeled(label: &str, value: &str) -> String {
    format!(
        "<p><strong>{}</strong> {}</p>",
        escape_html(label),
        escape_html(value)
    )
}

pub fn strong(text: &str) -> String {
    format!("<p><strong>{}</strong></p>", escape_html(text))
}

pub fn code(text: &str) -> String {
    format!("<pre><code>{}</code></pre>", escape_html(text))
}

pub fn json(value: &serde_json::Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!("<pre class=\"json\"><code>{}</code></pre>", escape_html(&pretty))
}

pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let head: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape_html(h)))
        .collect();
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| format!("<td>{}</td>", escape_html(cell)))
                .collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();
    format!(
        "<table><thead><tr>{}</tr></thead><tbody>{}</tbody></table>",
        head, body
    )
}

pub fn html_response(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

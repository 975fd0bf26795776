//! Server-rendered pages for `/p/{id}`.

use burnbox_core::ConsumedPaste;
use jiff::Timestamp;

use crate::model::format_timestamp;

const STYLE: &str = "body{font-family:system-ui,sans-serif;background:#f9fafb;margin:0;padding:2rem 1rem}\
main{max-width:56rem;margin:0 auto;background:#fff;border-radius:.5rem;box-shadow:0 1px 3px rgba(0,0,0,.1);padding:1.5rem}\
h1{font-size:1.5rem;margin:0 0 1rem;color:#1f2937}\
h1.missing{color:#dc2626}\
pre{white-space:pre-wrap;word-break:break-word;background:#f3f4f6;border-radius:.25rem;padding:1rem;font-size:.875rem}\
.meta{font-size:.875rem;color:#4b5563}";

/// Escapes text for use inside HTML element content and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn render_paste(paste: &ConsumedPaste) -> String {
    let mut meta = String::new();
    if let Some(remaining) = paste.remaining_views {
        meta.push_str(&format!("<p>Remaining views: {remaining}</p>"));
    }
    if let Some(expires_at) = paste.expires_at {
        meta.push_str(&format!(
            "<p>Expires at: <time datetime=\"{}\">{}</time></p>",
            format_timestamp(expires_at),
            display_time(expires_at)
        ));
    }

    layout(
        "Paste",
        &format!(
            "<h1>Paste Content</h1><pre>{}</pre><div class=\"meta\">{meta}</div>",
            escape_html(&paste.content)
        ),
    )
}

pub fn render_not_found() -> String {
    layout(
        "Paste Not Found",
        "<h1 class=\"missing\">Paste Not Found</h1>\
         <p>This paste does not exist, has expired, or has reached its view limit.</p>",
    )
}

fn display_time(timestamp: Timestamp) -> String {
    timestamp.strftime("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <meta name=\"robots\" content=\"noindex\">\
         <title>{title}</title><style>{STYLE}</style></head>\
         <body><main>{body}</main></body></html>"
    )
}

//! Output helpers shared by the commands.
//!
//! JSON goes to stdout pretty-printed; list commands wrap their items in the
//! paged envelope produced by `ListResponse`'s serializer.

use std::io::{self, Write};

use go365_graph::PageToken;
use go365_graph::mail::ItemBody;
use serde::Serialize;

/// Result of a command that performs an action rather than reading data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Writes `value` as indented JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// Prints `value` as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    write_json(&mut io::stdout().lock(), value)
}

/// Tells the user how to fetch the next page, if there is one.
///
/// Cursors are opaque and may contain quotes or spaces, so they are
/// shell-quoted when needed.
pub fn next_page_hint<W: Write>(out: &mut W, token: Option<&PageToken>) -> io::Result<()> {
    match token {
        Some(PageToken::Cursor(cursor)) => writeln!(
            out,
            "\nNext page: --page-token {}",
            shell_words::quote(cursor)
        ),
        Some(offset) => writeln!(out, "\nNext page: --page-token {offset}"),
        None => Ok(()),
    }
}

/// HTML to Markdown. Falls back to the input if conversion fails.
pub fn html_to_markdown(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    match htmd::convert(html) {
        Ok(md) => md.trim().to_string(),
        Err(e) => {
            tracing::debug!(error = %e, "markdown conversion failed, keeping HTML");
            html.to_string()
        }
    }
}

/// Rewrites an HTML body as Markdown in place; other bodies are left alone.
pub fn markdown_body(body: Option<&mut ItemBody>) {
    let Some(body) = body.filter(|b| b.is_html()) else {
        return;
    };
    body.content = body.content.as_deref().map(html_to_markdown);
    body.content_type = Some("Markdown".to_string());
}

/// Splits a comma-separated flag value, dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

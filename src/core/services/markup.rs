//! Message markup shared by the engines.
//!
//! Messages are stored with light HTML (`<b>`, `<br/>`, links) for the list
//! view to render. Every piece of host-supplied text goes through `escape`.

/// Line separator inside a message.
pub const BR: &str = "<br/>";

/// Escape text for inclusion in message markup.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<b>escaped</b>`
pub fn bold(text: &str) -> String {
    format!("<b>{}</b>", escape(text))
}

/// Anchor opening in a new tab. `inner` is inserted as-is.
pub fn link(url: &str, inner: &str) -> String {
    format!("<a href=\"{}\" target=\"_blank\">{inner}</a>", escape(url))
}

/// Link when a URL is known, otherwise the bare inner markup.
pub fn maybe_link(url: Option<&str>, inner: &str) -> String {
    match url {
        Some(url) => link(url, inner),
        None => inner.to_string(),
    }
}

/// `<b>` around an optional link whose text is escaped.
pub fn bold_link(url: Option<&str>, text: &str) -> String {
    format!("<b>{}</b>", maybe_link(url, &escape(text)))
}

/// Render a value that may be empty: blank text becomes a literal `""`.
pub fn or_empty_quotes(text: &str) -> String {
    if text.trim().is_empty() {
        "\"\"".to_string()
    } else {
        escape(text)
    }
}

/// `Label: <b>value</b>`
pub fn labelled(label: &str, value: &str) -> String {
    format!("{label}: {}", bold(value))
}

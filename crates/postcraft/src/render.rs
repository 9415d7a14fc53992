use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HASHTAG: Regex = Regex::new(r"#\w+").expect("hashtag pattern is valid");
}

/// Escape text for inclusion in HTML content or attribute values
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Wrap every hashtag in a `hashtag` span and escape everything else.
pub fn highlight_hashtags(text: &str) -> String {
    let mut html = String::with_capacity(text.len() + 32);
    let mut last = 0;

    for tag in HASHTAG.find_iter(text) {
        html.push_str(&html_escape(&text[last..tag.start()]));
        html.push_str(r#"<span class="hashtag">"#);
        html.push_str(&html_escape(tag.as_str()));
        html.push_str("</span>");
        last = tag.end();
    }
    html.push_str(&html_escape(&text[last..]));

    html
}

/// Terminal counterpart of [`highlight_hashtags`]
pub fn colorize_hashtags(text: &str) -> String {
    HASHTAG
        .replace_all(text, |caps: &regex::Captures| {
            caps[0].bright_cyan().bold().to_string()
        })
        .into_owned()
}

pub fn hashtags(text: &str) -> Vec<&str> {
    HASHTAG.find_iter(text).map(|m| m.as_str()).collect()
}

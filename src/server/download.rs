//! Content headers for served objects.
//!
//! The content type is inferred from the filename extension and the
//! `Content-Disposition` header names the file so that browsers save it under
//! its original name.

use clap::ValueEnum;

/// Fallback content type when neither the filename nor the store knows better.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// How the browser should present the downloaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Disposition {
    /// Prompt a download (`Content-Disposition: attachment`)
    #[default]
    Attachment,
    /// Render in the browser when possible (`Content-Disposition: inline`)
    Inline,
}

impl Disposition {
    fn as_str(self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }
}

/// Pick the response content type for an object.
///
/// The filename extension wins; the store-recorded type is used for unknown
/// extensions, then `application/octet-stream`.
pub fn content_type_for(filename: &str, stored: Option<&str>) -> String {
    if let Some(guess) = mime_guess::from_path(filename).first() {
        return guess.to_string();
    }

    match stored {
        Some(content_type) if !content_type.trim().is_empty() => content_type.to_string(),
        _ => OCTET_STREAM.to_string(),
    }
}

/// The name presented to the caller: the last segment of the object key.
pub fn display_name(key: &str) -> &str {
    key.rsplit('/').find(|s| !s.is_empty()).unwrap_or(key)
}

/// Build the `Content-Disposition` header value for an object key.
///
/// Produces a quoted ASCII `filename` parameter and, when the name is not
/// plain ASCII, an RFC 5987 `filename*` parameter carrying the exact name.
pub fn content_disposition(disposition: Disposition, key: &str) -> String {
    let name = display_name(key);
    let fallback = ascii_fallback(name);

    if fallback == name {
        format!("{}; filename=\"{}\"", disposition.as_str(), fallback)
    } else {
        format!(
            "{}; filename=\"{}\"; filename*=UTF-8''{}",
            disposition.as_str(),
            fallback,
            urlencoding::encode(name)
        )
    }
}

fn ascii_fallback(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect()
}

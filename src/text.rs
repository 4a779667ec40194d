//! Text helpers for outbound record fields

/// Default language code used when no locale is available
pub const DEFAULT_LANGUAGE: &str = "en";

/// Reduce a locale tag to its bare language code
///
/// `"sv-SE"` becomes `"sv"`, a tag without a region passes through, and a
/// missing or empty locale falls back to [`DEFAULT_LANGUAGE`].
pub fn sanitize_locale(locale: Option<&str>) -> String {
    match locale {
        Some(tag) if !tag.is_empty() => {
            let end = tag.find('-').unwrap_or(tag.len());
            tag[..end].to_string()
        }
        _ => DEFAULT_LANGUAGE.to_string(),
    }
}

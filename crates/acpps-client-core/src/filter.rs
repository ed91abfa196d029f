//! Semester filter navigation over the current page URL.

use url::Url;

pub const SEMESTER_QUERY_PARAM: &str = "semester";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("current page address `{href}` is not a valid url: {reason}")]
    InvalidPageUrl { href: String, reason: String },
}

/// Where the browser should go after the semester dropdown changes.
///
/// An empty selection removes the parameter; anything else sets it.
pub fn semester_filter_target(current_href: &str, selected: &str) -> Result<String, FilterError> {
    let value = (!selected.is_empty()).then_some(selected);
    with_query_param(current_href, SEMESTER_QUERY_PARAM, value)
}

/// Sets or removes one query parameter, keeping the other pairs in order.
///
/// Setting replaces the first occurrence in place and drops later duplicates;
/// a new parameter is appended. When no pairs remain the `?` is dropped.
pub fn with_query_param(
    current_href: &str,
    name: &str,
    value: Option<&str>,
) -> Result<String, FilterError> {
    let mut url = Url::parse(current_href).map_err(|error| FilterError::InvalidPageUrl {
        href: current_href.to_string(),
        reason: error.to_string(),
    })?;

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (key, existing) in url.query_pairs() {
        if key != name {
            pairs.push((key.into_owned(), existing.into_owned()));
            continue;
        }
        if let Some(value) = value {
            if !replaced {
                pairs.push((key.into_owned(), value.to_string()));
                replaced = true;
            }
        }
    }
    if let Some(value) = value {
        if !replaced {
            pairs.push((name.to_string(), value.to_string()));
        }
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_semester_appends_after_existing_params() {
        let target =
            semester_filter_target("https://portal.example/preferences/list?foo=1", "3")
                .expect("target");
        assert_eq!(
            target,
            "https://portal.example/preferences/list?foo=1&semester=3"
        );
    }

    #[test]
    fn selecting_empty_option_removes_param() {
        let target = semester_filter_target(
            "https://portal.example/preferences/list?foo=1&semester=3",
            "",
        )
        .expect("target");
        assert_eq!(target, "https://portal.example/preferences/list?foo=1");
    }

    #[test]
    fn removing_last_param_drops_question_mark() {
        let target = semester_filter_target("https://portal.example/list?semester=3", "")
            .expect("target");
        assert_eq!(target, "https://portal.example/list");
    }

    #[test]
    fn replacing_keeps_position_and_drops_duplicates() {
        let target = with_query_param(
            "https://portal.example/list?semester=1&page=2&semester=9#top",
            "semester",
            Some("4"),
        )
        .expect("target");
        assert_eq!(target, "https://portal.example/list?semester=4&page=2#top");
    }

    #[test]
    fn values_are_form_encoded() {
        let target =
            semester_filter_target("https://portal.example/list", "AY 2025/26").expect("target");
        assert_eq!(target, "https://portal.example/list?semester=AY+2025%2F26");
    }

    #[test]
    fn relative_href_is_rejected() {
        let error = semester_filter_target("/list?foo=1", "3").expect_err("relative");
        assert!(matches!(error, FilterError::InvalidPageUrl { .. }));
    }
}

//! Endpoint templates with named `{placeholder}` tokens.
//!
//! Server-rendered pages that predate named tokens emit a reversed URL with a
//! literal `0` argument (`/supervisors/0/toggle/`). Those are accepted through
//! [`UrlTemplate::from_attribute`], which turns the last path segment equal to
//! `0` into a placeholder. Only a whole segment is ever replaced.

use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const LEGACY_PLACEHOLDER_SEGMENT: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("url template is empty")]
    Empty,
    #[error("url template `{0}` has an unclosed placeholder")]
    UnclosedPlaceholder(String),
    #[error("url template `{0}` has an empty placeholder name")]
    EmptyPlaceholderName(String),
    #[error("url template `{0}` has no placeholder to substitute")]
    MissingPlaceholder(String),
    #[error("no value supplied for placeholder `{0}`")]
    MissingValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    pieces: Vec<Piece>,
}

impl UrlTemplate {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        if raw.trim().is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut pieces = Vec::new();
        let mut rest = raw;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                pieces.push(Piece::Literal(rest[..open].to_string()));
            }
            let after_open = &rest[open + 1..];
            let Some(close) = after_open.find('}') else {
                return Err(TemplateError::UnclosedPlaceholder(raw.to_string()));
            };
            let name = after_open[..close].trim();
            if name.is_empty() {
                return Err(TemplateError::EmptyPlaceholderName(raw.to_string()));
            }
            pieces.push(Piece::Param(name.to_string()));
            rest = &after_open[close + 1..];
        }
        if !rest.is_empty() {
            pieces.push(Piece::Literal(rest.to_string()));
        }

        if !pieces.iter().any(|piece| matches!(piece, Piece::Param(_))) {
            return Err(TemplateError::MissingPlaceholder(raw.to_string()));
        }
        Ok(Self { pieces })
    }

    /// Accepts a `data-*` attribute value in either the named or the legacy form.
    pub fn from_attribute(raw: &str, param: &str) -> Result<Self, TemplateError> {
        if raw.contains('{') {
            return Self::parse(raw);
        }
        Self::from_legacy_segment(raw, param)
    }

    pub fn from_legacy_segment(raw: &str, param: &str) -> Result<Self, TemplateError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TemplateError::Empty);
        }

        let path_end = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
        let (path, suffix) = trimmed.split_at(path_end);
        let path_start = path
            .find("://")
            .and_then(|scheme_end| {
                path[scheme_end + 3..]
                    .find('/')
                    .map(|slash| scheme_end + 3 + slash)
            })
            .unwrap_or(0);
        let (origin, path) = path.split_at(path_start);

        let segments: Vec<&str> = path.split('/').collect();
        let Some(index) = segments
            .iter()
            .rposition(|segment| *segment == LEGACY_PLACEHOLDER_SEGMENT)
        else {
            return Err(TemplateError::MissingPlaceholder(raw.to_string()));
        };

        let mut pieces = Vec::with_capacity(3);
        let before = if index == 0 {
            origin.to_string()
        } else {
            format!("{origin}{}/", segments[..index].join("/"))
        };
        if !before.is_empty() {
            pieces.push(Piece::Literal(before));
        }
        pieces.push(Piece::Param(param.to_string()));
        let after = segments[index + 1..].join("/");
        let tail = if index + 1 < segments.len() {
            format!("/{after}{suffix}")
        } else {
            suffix.to_string()
        };
        if !tail.is_empty() {
            pieces.push(Piece::Literal(tail));
        }
        Ok(Self { pieces })
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Param(name) => Some(name.as_str()),
            Piece::Literal(_) => None,
        })
    }

    pub fn render(&self, values: &[(&str, &str)]) -> Result<String, TemplateError> {
        let mut rendered = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => rendered.push_str(text),
                Piece::Param(name) => {
                    let value = values
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| TemplateError::MissingValue(name.clone()))?;
                    rendered.extend(utf8_percent_encode(value, PATH_SEGMENT));
                }
            }
        }
        Ok(rendered)
    }

    pub fn render_one(&self, name: &str, value: &str) -> Result<String, TemplateError> {
        self.render(&[(name, value)])
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => f.write_str(text)?,
                Piece::Param(name) => write!(f, "{{{name}}}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_placeholder_renders_value() {
        let template = UrlTemplate::parse("/api/coordinator/task-status/{task_id}/").expect("parse");
        assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["task_id"]);
        assert_eq!(
            template.render_one("task_id", "9f1c-20").expect("render"),
            "/api/coordinator/task-status/9f1c-20/"
        );
    }

    #[test]
    fn legacy_zero_segment_is_replaced_without_substring_collisions() {
        let template =
            UrlTemplate::from_attribute("/academics/supervisors/0/toggle-acceptance/", "id")
                .expect("legacy template");
        assert_eq!(
            template.to_string(),
            "/academics/supervisors/{id}/toggle-acceptance/"
        );
        assert_eq!(
            template.render_one("id", "10").expect("render"),
            "/academics/supervisors/10/toggle-acceptance/"
        );
    }

    #[test]
    fn legacy_template_keeps_origin_with_zeros_intact() {
        let template =
            UrlTemplate::from_attribute("http://10.0.0.1:8000/api/v0/capacity/0/", "id")
                .expect("legacy template");
        assert_eq!(
            template.render_one("id", "42").expect("render"),
            "http://10.0.0.1:8000/api/v0/capacity/42/"
        );
    }

    #[test]
    fn legacy_template_preserves_query_suffix() {
        let template = UrlTemplate::from_attribute("/rows/0?next=/list", "id").expect("legacy");
        assert_eq!(
            template.render_one("id", "3").expect("render"),
            "/rows/3?next=/list"
        );
    }

    #[test]
    fn relative_legacy_template_gains_no_leading_slash() {
        let bare = UrlTemplate::from_attribute("0", "id").expect("bare");
        assert_eq!(bare.render_one("id", "5").expect("render"), "5");

        let relative = UrlTemplate::from_attribute("0/edit/", "id").expect("relative");
        assert_eq!(relative.render_one("id", "5").expect("render"), "5/edit/");
    }

    #[test]
    fn legacy_template_without_zero_segment_is_rejected() {
        let error = UrlTemplate::from_attribute("/rows/10/toggle/", "id").expect_err("no zero");
        assert_eq!(
            error,
            TemplateError::MissingPlaceholder("/rows/10/toggle/".to_string())
        );
    }

    #[test]
    fn values_are_encoded_as_single_path_segment() {
        let template = UrlTemplate::parse("/rows/{id}/").expect("parse");
        assert_eq!(
            template.render_one("id", "a/b c").expect("render"),
            "/rows/a%2Fb%20c/"
        );
    }

    #[test]
    fn missing_value_and_malformed_templates_error() {
        let template = UrlTemplate::parse("/rows/{id}/").expect("parse");
        assert_eq!(
            template.render_one("other", "1"),
            Err(TemplateError::MissingValue("id".to_string()))
        );
        assert!(matches!(
            UrlTemplate::parse("/rows/{id/"),
            Err(TemplateError::UnclosedPlaceholder(_))
        ));
        assert!(matches!(
            UrlTemplate::parse("/rows/{}/"),
            Err(TemplateError::EmptyPlaceholderName(_))
        ));
        assert_eq!(UrlTemplate::parse("  "), Err(TemplateError::Empty));
    }
}

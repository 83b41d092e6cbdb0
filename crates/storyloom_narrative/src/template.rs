//! Prompt templates and placeholder rendering.
//!
//! Templates use `{name}` placeholders; `{{` and `}}` produce literal braces.
//! A placeholder with no supplied value is an error, never a silent blank.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use storyloom_error::{ConfigError, TemplateError, TemplateErrorKind};
use strum::IntoEnumIterator;

/// Identifies one prompt template.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    /// Story topic from the seed
    Topic,
    /// Character sheet from the topic
    Characters,
    /// Coarse outline from topic and characters
    Outline,
    /// Opening window of the detailed-outline expansion
    DetailedOutlineFirst,
    /// Every later window of the detailed-outline expansion
    DetailedOutlineSubsequent,
    /// Opening window of the prose expansion
    ProseFirst,
    /// Every later window of the prose expansion
    ProseSubsequent,
    /// Title from the finished prose
    Title,
    /// Teaser blurb from the finished prose
    Teaser,
}

/// Named values available to a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateValues {
    values: HashMap<String, String>,
}

impl TemplateValues {
    /// Empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove a value, returning it if it was set.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Look up a value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Render `template`, substituting every `{name}` from `values`.
///
/// Rendering is pure: the same inputs always give the same output.
///
/// # Errors
///
/// Fails on a placeholder without a value, an unclosed `{`, a stray `}`, or
/// a placeholder name that is not an identifier.
///
/// # Examples
///
/// ```
/// use storyloom_narrative::{TemplateValues, render};
///
/// let values = TemplateValues::new().with("topic", "a lighthouse");
/// let text = render("Write about {topic} {{briefly}}", &values).unwrap();
/// assert_eq!(text, "Write about a lighthouse {briefly}");
/// ```
pub fn render(template: &str, values: &TemplateValues) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, next)| next == '{').is_some() {
                    out.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(TemplateError::new(TemplateErrorKind::UnclosedPlaceholder(
                        offset,
                    )));
                }
                if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return Err(TemplateError::new(TemplateErrorKind::InvalidPlaceholder(
                        name,
                    )));
                }

                let value = values.get(&name).ok_or_else(|| {
                    TemplateError::new(TemplateErrorKind::MissingPlaceholder(name.clone()))
                })?;
                out.push_str(value);
            }
            '}' => {
                if chars.next_if(|&(_, next)| next == '}').is_none() {
                    return Err(TemplateError::new(TemplateErrorKind::UnmatchedBrace(offset)));
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// The complete set of prompt templates, one per [`TemplateId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    templates: BTreeMap<TemplateId, String>,
}

impl TemplateSet {
    /// Build a set from configured entries keyed by identifier name.
    ///
    /// Unknown keys are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any identifier is missing or blank.
    pub fn from_entries(entries: &HashMap<String, String>) -> Result<Self, ConfigError> {
        for key in entries.keys() {
            if key.parse::<TemplateId>().is_err() {
                tracing::warn!(template = %key, "Ignoring unknown template entry");
            }
        }

        let mut templates = BTreeMap::new();
        for id in TemplateId::iter() {
            match entries.get(id.as_ref()) {
                Some(text) if !text.trim().is_empty() => {
                    templates.insert(id, text.clone());
                }
                _ => {
                    return Err(ConfigError::new(format!(
                        "Template '{}' is missing or blank",
                        id
                    )));
                }
            }
        }

        Ok(Self { templates })
    }

    /// The raw text for `id`.
    pub fn get(&self, id: TemplateId) -> Result<&str, TemplateError> {
        self.templates
            .get(&id)
            .map(String::as_str)
            .ok_or_else(|| TemplateError::new(TemplateErrorKind::UnknownTemplate(id.to_string())))
    }

    /// Render the template for `id` with `values`.
    pub fn render(&self, id: TemplateId, values: &TemplateValues) -> Result<String, TemplateError> {
        render(self.get(id)?, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_id_names() {
        assert_eq!(TemplateId::DetailedOutlineFirst.to_string(), "detailed_outline_first");
        assert_eq!("prose_subsequent".parse::<TemplateId>().unwrap(), TemplateId::ProseSubsequent);
        assert_eq!(TemplateId::iter().count(), 9);
    }

    #[test]
    fn test_render_errors_carry_position() {
        let values = TemplateValues::new();
        let err = render("abc {topic", &values).unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::UnclosedPlaceholder(4));

        let err = render("a } b", &values).unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::UnmatchedBrace(2));

        let err = render("{bad name}", &values).unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::InvalidPlaceholder("bad name".into()));
    }

    #[test]
    fn test_from_entries_requires_every_template() {
        let mut entries: HashMap<String, String> = TemplateId::iter()
            .map(|id| (id.to_string(), format!("{} prompt", id)))
            .collect();
        assert!(TemplateSet::from_entries(&entries).is_ok());

        entries.insert("teaser".into(), "   ".into());
        let err = TemplateSet::from_entries(&entries).unwrap_err();
        assert!(err.to_string().contains("teaser"));
    }
}

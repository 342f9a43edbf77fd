//! Style registry: style id to prompt template

use std::collections::BTreeMap;
use log::{debug, error};

/// Placeholder substituted with the topic
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// Immutable mapping of style ids to prompt templates.
///
/// Unknown ids resolve to the default style, so `resolve` is total.
#[derive(Debug, Clone)]
pub struct StyleRegistry
{   templates: BTreeMap<String, String>
  , default_style: String
}

impl StyleRegistry
{   /// Build a registry, checking every template carries one placeholder
    pub fn new(
      templates: BTreeMap<String, String>
    , default_style: impl Into<String>
    ) -> Result<Self, crate::error::Error>
    {   let default_style = default_style.into();
        debug!(
          "Creating StyleRegistry with {} styles, default {}",
          templates.len(), default_style
        );

        for (id, template) in &templates
        {   let count = template.matches(TOPIC_PLACEHOLDER).count();
            if count != 1
            {   error!("Style {} has {} placeholders", id, count);
                return Err(crate::error::Error::InvalidConfiguration(
                  format!(
                    "style '{}' must contain exactly one {} placeholder, found {}",
                    id, TOPIC_PLACEHOLDER, count
                  )
                ));
            }
        }

        if !templates.contains_key(&default_style)
        {   error!("Default style {} is not registered", default_style);
            return Err(crate::error::Error::InvalidConfiguration(
              format!("default style '{}' is not registered", default_style)
            ));
        }

        Ok(StyleRegistry
        {   templates
          , default_style
        })
    }

    /// Registry from the styles in `config`
    pub fn from_config(config: &crate::config::QuillConfig)
      -> Result<Self, crate::error::Error>
    {   Self::new(config.styles.clone(), config.default_style.clone())
    }

    /// Template for `style_id`, or the default style's template
    pub fn resolve(&self, style_id: &str) -> &str
    {   match self.templates.get(style_id)
        {   Some(template) => template.as_str()
          , None => {
              debug!(
                "Unknown style {}, falling back to {}",
                style_id, self.default_style
              );
              self.templates[&self.default_style].as_str()
            }
        }
    }

    /// Fill the resolved template with `topic`, verbatim
    pub fn render(&self, style_id: &str, topic: &str) -> String
    {   self.resolve(style_id).replacen(TOPIC_PLACEHOLDER, topic, 1)
    }

    pub fn contains(&self, style_id: &str) -> bool
    {   self.templates.contains_key(style_id)
    }

    pub fn default_style(&self) -> &str
    {   &self.default_style
    }

    /// Registered style ids in sorted order
    pub fn style_ids(&self) -> Vec<String>
    {   self.templates.keys().cloned().collect()
    }
}

impl Default for StyleRegistry
{   fn default() -> Self
    {   StyleRegistry
        {   templates: crate::config::default_styles()
          , default_style: crate::config::DEFAULT_STYLE.to_string()
        }
    }
}

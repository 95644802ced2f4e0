use std::collections::{BTreeMap, BTreeSet};

use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

use crate::{catalog_en, catalog_es};

#[derive(Debug, Error)]
/// Enumerates supported `TranslationError` values.
pub enum TranslationError {
    #[error("invalid template '{key}' for locale '{locale}': {source}")]
    InvalidTemplate {
        locale: String,
        key: String,
        #[source]
        source: minijinja::Error,
    },
    #[error("couldn't find required translation key '{key}' at language {locale}")]
    MissingKey { locale: String, key: String },
    #[error("unknown message key '{0}'")]
    UnknownKey(String),
    #[error("failed to render '{key}': {source}")]
    Render {
        key: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Compiled message templates for every loaded locale.
pub struct TranslationBundle {
    default_locale: String,
    env: Environment<'static>,
    keys_by_locale: BTreeMap<String, BTreeSet<String>>,
}

impl std::fmt::Debug for TranslationBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationBundle")
            .field("default_locale", &self.default_locale)
            .field("locales", &self.keys_by_locale.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn template_name(locale: &str, key: &str) -> String {
    format!("{locale}/{key}")
}

impl TranslationBundle {
    pub fn new(default_locale: &str) -> Self {
        Self {
            default_locale: default_locale.trim().to_ascii_lowercase(),
            env: Environment::new(),
            keys_by_locale: BTreeMap::new(),
        }
    }

    /// Bundle preloaded with the built-in catalogs, checked for completeness.
    pub fn builtin(default_locale: &str) -> Result<Self, TranslationError> {
        let mut bundle = Self::new(default_locale);
        bundle.add_locale("en", catalog_en::MESSAGES)?;
        bundle.add_locale("es", catalog_es::MESSAGES)?;
        bundle.check()?;
        Ok(bundle)
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.keys_by_locale.keys().map(String::as_str)
    }

    /// Compiles every template of `locale`; a malformed template fails the whole call.
    pub fn add_locale(
        &mut self,
        locale: &str,
        messages: &[(&str, &str)],
    ) -> Result<(), TranslationError> {
        let locale = locale.trim().to_ascii_lowercase();
        let mut keys = BTreeSet::new();
        for (key, source) in messages {
            self.env
                .add_template_owned(template_name(&locale, key), (*source).to_string())
                .map_err(|source| TranslationError::InvalidTemplate {
                    locale: locale.clone(),
                    key: (*key).to_string(),
                    source,
                })?;
            keys.insert((*key).to_string());
        }
        self.keys_by_locale
            .entry(locale)
            .or_default()
            .extend(keys);
        Ok(())
    }

    /// Every key of the default locale must exist in every other locale.
    pub fn check(&self) -> Result<(), TranslationError> {
        let Some(required) = self.keys_by_locale.get(&self.default_locale) else {
            return Err(TranslationError::MissingKey {
                locale: self.default_locale.clone(),
                key: "*".to_string(),
            });
        };
        for (locale, keys) in &self.keys_by_locale {
            if let Some(missing) = required.iter().find(|key| !keys.contains(*key)) {
                return Err(TranslationError::MissingKey {
                    locale: locale.clone(),
                    key: missing.clone(),
                });
            }
        }
        Ok(())
    }

    /// Whether the default locale defines `key`.
    pub fn has(&self, key: &str) -> bool {
        self.keys_by_locale
            .get(&self.default_locale)
            .is_some_and(|keys| keys.contains(key))
    }

    fn resolve_locale(&self, locale: &str, key: &str) -> Option<String> {
        let requested = locale.trim().to_ascii_lowercase();
        let base = requested
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_string();
        [requested, base, self.default_locale.clone()]
            .into_iter()
            .find(|candidate| {
                self.keys_by_locale
                    .get(candidate)
                    .is_some_and(|keys| keys.contains(key))
            })
    }

    pub fn render<S: Serialize>(
        &self,
        locale: &str,
        key: &str,
        data: S,
    ) -> Result<String, TranslationError> {
        let resolved = self
            .resolve_locale(locale, key)
            .ok_or_else(|| TranslationError::UnknownKey(key.to_string()))?;
        let template = self
            .env
            .get_template(&template_name(&resolved, key))
            .map_err(|source| TranslationError::Render {
                key: key.to_string(),
                source,
            })?;
        template
            .render(data)
            .map(|rendered| rendered.trim().to_string())
            .map_err(|source| TranslationError::Render {
                key: key.to_string(),
                source,
            })
    }

    /// Renders `key`, degrading to the bare key name when rendering fails so a
    /// broken translation never swallows a reply.
    pub fn render_or_key<S: Serialize>(&self, locale: &str, key: &str, data: S) -> String {
        self.render(locale, key, data)
            .unwrap_or_else(|_| key.to_string())
    }
}

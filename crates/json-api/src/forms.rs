//! Form body parsing.
//!
//! Multipart and url-encoded bodies are read once into a [`FormInput`]: text
//! fields keep every submitted value (so `targetHours` and `targetHours[]`
//! both work) and uploaded files become [`MediaUpload`]s pointing at salvo's
//! temporary copy, which lives until the request is dropped.

use std::{collections::BTreeMap, str::FromStr};

use salvo::{Request, http::ParseError};

use umutoza_app::media::{MediaKind, MediaUpload};

use crate::errors::ApiError;

/// Text fields and multipart framing allowed on top of the file itself.
const FORM_OVERHEAD_BYTES: u64 = 256 * 1024;

fn body_limit(uploads: MediaKind) -> usize {
    usize::try_from(uploads.max_bytes() + FORM_OVERHEAD_BYTES).unwrap_or(usize::MAX)
}

/// Owned view of a submitted form.
#[derive(Debug, Default)]
pub(crate) struct FormInput {
    fields: BTreeMap<String, Vec<String>>,
    files: BTreeMap<String, MediaUpload>,
}

impl FormInput {
    /// Parse the request body as form data, allowing room for one file of
    /// `uploads` kind on top of the text fields.
    pub(crate) async fn read(req: &mut Request, uploads: MediaKind) -> Result<Self, ApiError> {
        let limit = body_limit(uploads);

        req.set_secure_max_size(limit);

        let form = req.form_data().await.map_err(|source| match source {
            ParseError::PayloadTooLarge => {
                ApiError::validation(format!("request body exceeds the {limit} byte limit"))
            }
            other => {
                ApiError::validation(format!("expected a multipart or url-encoded form: {other}"))
            }
        })?;

        let fields = form
            .fields
            .iter_all()
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect();

        let files = form
            .files
            .iter_all()
            .filter_map(|(name, parts)| {
                let part = parts.first()?;

                Some((
                    name.clone(),
                    MediaUpload {
                        file_name: part.name().map(ToOwned::to_owned),
                        content_type: part.content_type().map(|mime| mime.to_string()),
                        size: part.size(),
                        path: part.path().clone(),
                    },
                ))
            })
            .collect();

        Ok(Self { fields, files })
    }

    #[cfg(test)]
    pub(crate) fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut input = Self::default();

        for (name, value) in pairs {
            input
                .fields
                .entry(name.to_owned())
                .or_default()
                .push(value.to_owned());
        }

        input
    }

    /// First value of `name` exactly as submitted.
    pub(crate) fn raw(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// First value of `name`, trimmed. Blank values count as absent.
    pub(crate) fn text(&self, name: &str) -> Option<&str> {
        self.raw(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Submitted value for a clearable field: `None` when the field is
    /// missing, `Some(None)` when it was sent blank.
    pub(crate) fn nullable(&self, name: &str) -> Option<Option<String>> {
        self.raw(name).map(|value| {
            let value = value.trim();

            (!value.is_empty()).then(|| value.to_owned())
        })
    }

    /// Every value of `name` and `name[]`, as submitted.
    pub(crate) fn values(&self, name: &str) -> Vec<&str> {
        let bracketed = format!("{name}[]");

        [name, bracketed.as_str()]
            .into_iter()
            .filter_map(|key| self.fields.get(key))
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Every non-blank value of `name` and `name[]`, split on commas.
    pub(crate) fn list(&self, name: &str) -> Vec<&str> {
        self.values(name)
            .into_iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Parse the trimmed value of `name`.
    pub(crate) fn parse<T>(&self, name: &str) -> Result<Option<T>, ApiError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.text(name)
            .map(|value| {
                value.parse::<T>().map_err(|source| {
                    ApiError::validation(format!("{name} is invalid: {source}"))
                })
            })
            .transpose()
    }

    /// Checkbox-style boolean: `true`, `1` and `on` are set, anything else
    /// submitted is unset.
    pub(crate) fn flag(&self, name: &str) -> Option<bool> {
        self.text(name).map(|value| {
            ["true", "1", "on"]
                .iter()
                .any(|truthy| value.eq_ignore_ascii_case(truthy))
        })
    }

    /// Take the uploaded file sent as `name`.
    pub(crate) fn take_file(&mut self, name: &str) -> Option<MediaUpload> {
        self.files.remove(name)
    }
}

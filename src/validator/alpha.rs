use derive_getters::Getters;
use regex::Regex;
use std::sync::OnceLock;

fn unicode_alpha() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[\p{L}\p{M}]+$").expect("alpha pattern is valid"))
}

/// Outcome of validating one field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Getters)]
pub struct ValidatorResult {
    value: Option<String>,
    error_message: Option<String>,
}

impl ValidatorResult {
    pub fn is_valid(&self) -> bool {
        self.error_message.is_none()
    }
}

/// Checks that a field holds only alphabetic characters.
///
/// By default any Unicode letter or combining mark is accepted. With `ascii_only` just
/// `A-Z` and `a-z` are. An empty field is not an error: it takes the default value if one is
/// configured and otherwise yields neither a value nor an error.
#[derive(Clone, Debug)]
pub struct ValidatorAlpha {
    field: String,
    ascii_only: bool,
    trim: bool,
    label: Option<String>,
    default_value: Option<String>,
    custom_error: Option<String>,
}

impl ValidatorAlpha {
    pub fn new(field: impl Into<String>) -> Self {
        ValidatorAlpha {
            field: field.into(),
            ascii_only: false,
            trim: true,
            label: None,
            default_value: None,
            custom_error: None,
        }
    }

    pub fn ascii_only(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Replaces the generated error message.
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.custom_error = Some(message.into());
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_valid(value: &str, ascii_only: bool) -> bool {
        if ascii_only {
            value.chars().all(|ch| ch.is_ascii_alphabetic())
        } else {
            unicode_alpha().is_match(value)
        }
    }

    pub fn validate(&self, params: &[(String, String)]) -> ValidatorResult {
        let value = params
            .iter()
            .find(|(key, _)| key == &self.field)
            .map(|(_, value)| if self.trim { value.trim() } else { value.as_str() })
            .unwrap_or_default();

        if value.is_empty() {
            return ValidatorResult {
                value: self.default_value.clone(),
                error_message: None,
            };
        }

        if Self::is_valid(value, self.ascii_only) {
            ValidatorResult {
                value: Some(value.to_string()),
                error_message: None,
            }
        } else {
            log::debug!(
                "ValidatorAlpha: Validation failed for field {}: \"{}\" contains characters that are not allowed",
                self.field,
                value
            );
            ValidatorResult {
                value: None,
                error_message: Some(self.validation_error()),
            }
        }
    }

    fn validation_error(&self) -> String {
        if let Some(message) = &self.custom_error {
            return message.clone();
        }
        let kind = if self.ascii_only {
            "alphabetical latin characters"
        } else {
            "alphabetical characters"
        };
        match &self.label {
            Some(label) if !label.is_empty() => {
                format!("The text in the “{label}” field must only contain {kind}.")
            }
            _ => format!("Must only contain {kind}."),
        }
    }
}

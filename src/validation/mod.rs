//! Field validation with English error messages.
//!
//! # Rules
//! - `required`: non-empty
//! - `email`: looks like an email address
//! - `passwd`: 8+ characters with lowercase, uppercase, digit and symbol
//! - `uuid`: well-formed UUID
//! - `requiredUuid`: well-formed UUID other than the nil UUID
//!
//! Rules are referenced by comma-separated tag lists, e.g. `"required,passwd"`.

pub mod extract;
pub mod rules;

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

pub use extract::ValidatedJson;

/// Predicate applied to a field's string value.
pub type RuleFn = fn(&str) -> bool;

/// A rule name paired with its message template. `{0}` is replaced by the
/// field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRule {
    pub name: &'static str,
    pub template: &'static str,
}

pub const VALIDATIONS: &[ValidationRule] = &[
    ValidationRule {
        name: "required",
        template: "{0} is a required field",
    },
    ValidationRule {
        name: "email",
        template: "{0} must be a valid email address",
    },
    ValidationRule {
        name: "passwd",
        template: "{0} must be 8 or more characters and contain at least one of each uppercase, lowercase, number and symbol",
    },
    ValidationRule {
        name: "uuid",
        template: "{0} must be a valid uuid",
    },
    ValidationRule {
        name: "requiredUuid",
        template: "{0} must be a valid uuid and must not be nil",
    },
];

/// Errors raised while building a validator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidatorError {
    #[error("rule {0:?} is already registered")]
    DuplicateRule(String),

    #[error("rule {0:?} has no message template")]
    MissingMessage(String),

    #[error("unknown validation rule {0:?}")]
    UnknownRule(String),
}

/// A field that failed a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FieldError {}

/// Every field failure for one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `tags` against `value` and record a failure, if any.
    pub fn check(&mut self, validator: &Validator, field: &str, value: &str, tags: &str) -> &mut Self {
        if let Err(e) = validator.validate_field(field, value, tags) {
            self.errors.push(e);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Field name to message, for response bodies.
    pub fn messages(&self) -> HashMap<String, String> {
        self.errors
            .iter()
            .map(|e| (e.field.clone(), e.message.clone()))
            .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Types that can check their own fields.
pub trait Validate {
    fn validate(&self, validator: &Validator) -> Result<(), ValidationErrors>;
}

/// Rule registry plus message templates.
#[derive(Debug, Clone)]
pub struct Validator {
    rules: HashMap<&'static str, RuleFn>,
    templates: HashMap<&'static str, &'static str>,
}

impl Validator {
    /// Build a validator with the built-in rule set.
    pub fn new() -> Result<Self, ValidatorError> {
        tracing::info!("Setting up translation and validation");
        Self::with_rules(
            &[
                ("required", rules::required as RuleFn),
                ("email", rules::email as RuleFn),
                ("passwd", rules::password as RuleFn),
                ("uuid", rules::uuid as RuleFn),
                ("requiredUuid", rules::required_uuid as RuleFn),
            ],
            VALIDATIONS,
        )
    }

    fn with_rules(
        rules: &[(&'static str, RuleFn)],
        templates: &[ValidationRule],
    ) -> Result<Self, ValidatorError> {
        let mut validator = Self {
            rules: HashMap::new(),
            templates: HashMap::new(),
        };

        for rule in templates {
            validator.templates.insert(rule.name, rule.template);
        }
        for (name, check) in rules {
            validator.register(*name, *check)?;
        }

        Ok(validator)
    }

    fn register(&mut self, name: &'static str, check: RuleFn) -> Result<(), ValidatorError> {
        if !self.templates.contains_key(name) {
            tracing::error!(rule = name, "error registering translation");
            return Err(ValidatorError::MissingMessage(name.to_string()));
        }
        if self.rules.insert(name, check).is_some() {
            return Err(ValidatorError::DuplicateRule(name.to_string()));
        }
        Ok(())
    }

    /// Names of every registered rule.
    pub fn rule_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.rules.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Check `value` against each rule in the comma-separated `tags`,
    /// stopping at the first failure.
    pub fn validate_field(&self, field: &str, value: &str, tags: &str) -> Result<(), FieldError> {
        for tag in tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let Some(check) = self.rules.get(tag) else {
                return Err(FieldError {
                    field: field.to_string(),
                    rule: tag.to_string(),
                    message: ValidatorError::UnknownRule(tag.to_string()).to_string(),
                });
            };

            if !check(value) {
                return Err(FieldError {
                    field: field.to_string(),
                    rule: tag.to_string(),
                    message: self.translate(tag, field),
                });
            }
        }
        Ok(())
    }

    fn translate(&self, rule: &str, field: &str) -> String {
        self.templates
            .get(rule)
            .map(|t| t.replace("{0}", field))
            .unwrap_or_else(|| format!("{} failed on the {} rule", field, rule))
    }
}

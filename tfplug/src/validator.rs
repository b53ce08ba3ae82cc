use crate::schema::{Block, NestingMode, Schema};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

pub trait Validator: Send + Sync {
    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>);
}

/// Checks configuration against a schema: required attributes, nested
/// block counts, then every attribute's validators. Unknown values are
/// skipped, they are checked again once known.
pub fn validate_config(schema: &Schema, config: &DynamicValue) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, &config.value, &AttributePath::root(), &mut diagnostics);
    diagnostics
}

fn validate_block(
    block: &Block,
    value: &Dynamic,
    path: &AttributePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if matches!(value, Dynamic::Unknown) {
        return;
    }
    let fields = value.as_map();

    for attr in &block.attributes {
        let attr_path = path.clone().attribute(&attr.name);
        let attr_value = fields.and_then(|m| m.get(&attr.name)).unwrap_or(&Dynamic::Null);

        match attr_value {
            Dynamic::Null if attr.required => diagnostics.push(
                Diagnostic::error(
                    "Missing required argument",
                    format!("The argument \"{}\" is required, but no definition was found.", attr_path),
                )
                .with_attribute(attr_path),
            ),
            Dynamic::Null | Dynamic::Unknown => {}
            _ => {
                for validator in &attr.validators {
                    validator.validate(attr_value, &attr_path, diagnostics);
                }
            }
        }
    }

    for nested in &block.block_types {
        let block_path = path.clone().attribute(&nested.type_name);
        let items: Vec<&Dynamic> = match fields.and_then(|m| m.get(&nested.type_name)) {
            None | Some(Dynamic::Null) => Vec::new(),
            Some(Dynamic::Unknown) => continue,
            Some(Dynamic::List(items)) => items.iter().collect(),
            Some(single) if nested.nesting == NestingMode::Single => vec![single],
            Some(other) => {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid block",
                        format!("Expected a list of \"{}\" blocks, got {}", block_path, other.type_name()),
                    )
                    .with_attribute(block_path),
                );
                continue;
            }
        };

        let count = items.len() as i64;
        if count < nested.min_items {
            diagnostics.push(
                Diagnostic::error(
                    "Insufficient blocks",
                    format!("At least {} \"{}\" blocks are required", nested.min_items, block_path),
                )
                .with_attribute(block_path.clone()),
            );
        }
        if nested.max_items > 0 && count > nested.max_items {
            diagnostics.push(
                Diagnostic::error(
                    "Too many blocks",
                    format!("No more than {} \"{}\" blocks are allowed", nested.max_items, block_path),
                )
                .with_attribute(block_path.clone()),
            );
        }

        for (idx, item) in items.into_iter().enumerate() {
            validate_block(&nested.block, item, &block_path.clone().index(idx as i64), diagnostics);
        }
    }
}

/// Accepts a string from a fixed set, or a list whose every string is in the set
pub struct StringOneOfValidator {
    pub allowed: Vec<String>,
}

impl StringOneOfValidator {
    pub fn new(allowed: &[&str]) -> Self {
        Self {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn check(&self, value: &str, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if !self.allowed.iter().any(|a| a == value) {
            diagnostics.push(
                Diagnostic::error(
                    format!("{} must be one of {:?}", path, self.allowed),
                    format!("Got \"{}\"", value),
                )
                .with_attribute(path.clone()),
            );
        }
    }
}

impl Validator for StringOneOfValidator {
    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        match value {
            Dynamic::String(s) => self.check(s, path, diagnostics),
            Dynamic::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if let Some(s) = item.as_string() {
                        self.check(s, &path.clone().index(idx as i64), diagnostics);
                    }
                }
            }
            _ => {}
        }
    }
}

pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLengthValidator {
    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_string() {
            let length = s.chars().count();
            if let Some(min) = self.min {
                if length < min {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must have minimum length of {}", path, min),
                            format!("Got length {}", length),
                        )
                        .with_attribute(path.clone()),
                    );
                }
            }
            if let Some(max) = self.max {
                if length > max {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must have maximum length of {}", path, max),
                            format!("Got length {}", length),
                        )
                        .with_attribute(path.clone()),
                    );
                }
            }
        }
    }
}

pub struct StringPatternValidator {
    pub pattern: regex::Regex,
    pub description: String,
}

impl StringPatternValidator {
    pub fn new(pattern: &str, description: &str) -> crate::Result<Self> {
        let pattern = regex::Regex::new(pattern).map_err(|e| {
            crate::TfplugError::InvalidConfiguration(format!("invalid pattern {}: {}", pattern, e))
        })?;
        Ok(Self {
            pattern,
            description: description.to_string(),
        })
    }
}

impl Validator for StringPatternValidator {
    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_string() {
            if !self.pattern.is_match(s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must match {}", path, self.description),
                        format!("Value '{}' does not match pattern", s),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

pub struct ListLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for ListLengthValidator {
    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Dynamic::List(items) = value {
            if let Some(min) = self.min {
                if items.len() < min {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must have at least {} items", path, min),
                            format!("Got {} items", items.len()),
                        )
                        .with_attribute(path.clone()),
                    );
                }
            }
            if let Some(max) = self.max {
                if items.len() > max {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} must have at most {} items", path, max),
                            format!("Got {} items", items.len()),
                        )
                        .with_attribute(path.clone()),
                    );
                }
            }
        }
    }
}

//! The shared `filter { name = ..., values = [...] }` block of AWS data sources

use aws_sdk_route53resolver::types::Filter;
use tfplug::schema::{AttributeBuilder, AttributeType, NestedBlock, NestedBlockBuilder, NestingMode};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::ListLengthValidator;

/// One filter criterion: a field name and the values it may take
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriterion {
    pub name: String,
    pub values: Vec<String>,
}

/// Filter blocks from configuration, one entry per distinct name.
/// Names keep the position of their first block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    criteria: Vec<FilterCriterion>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated name extends the existing criterion with its values
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        let name = name.into();
        match self.criteria.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values.extend(values),
            None => self.criteria.push(FilterCriterion { name, values }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterCriterion> {
        self.criteria.iter()
    }

    /// Reads the `filter` blocks of a configuration
    pub fn from_config(config: &DynamicValue) -> Result<Self, Diagnostic> {
        let mut set = FilterSet::new();
        let blocks = match config.get(&AttributePath::new("filter")) {
            Ok(Dynamic::List(blocks)) => blocks.len(),
            Ok(Dynamic::Null) => 0,
            Err(e) if e.is_not_found() => 0,
            Ok(other) => {
                return Err(Diagnostic::error(
                    "Invalid filter",
                    format!("expected a set of filter blocks, got {}", other.type_name()),
                )
                .with_attribute(AttributePath::new("filter")))
            }
            Err(e) => {
                return Err(Diagnostic::error("Invalid filter", e.to_string())
                    .with_attribute(AttributePath::new("filter")))
            }
        };

        for idx in 0..blocks {
            let block = AttributePath::new("filter").index(idx as i64);
            let name_path = block.clone().attribute("name");
            let values_path = block.attribute("values");
            let name = config.get_string(&name_path).map_err(|e| {
                Diagnostic::error("Invalid filter name", e.to_string()).with_attribute(name_path)
            })?;
            let values = config.get_string_list(&values_path).map_err(|e| {
                Diagnostic::error("Invalid filter values", e.to_string())
                    .with_attribute(values_path)
            })?;
            set.insert(name, values);
        }

        Ok(set)
    }
}

/// Filter names are not checked here; the service rejects unknown ones.
pub fn build_filters(filters: &FilterSet) -> Vec<Filter> {
    filters
        .iter()
        .map(|c| {
            Filter::builder()
                .name(&c.name)
                .set_values(Some(c.values.clone()))
                .build()
        })
        .collect()
}

pub fn filter_block() -> NestedBlock {
    NestedBlockBuilder::new("filter", NestingMode::Set)
        .description("Narrows the lookup. Field names are those of the service's Filter type")
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .description("Name of the field to filter by, e.g. HostVPCId or Direction")
                .required()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("values", AttributeType::list_of_strings())
                .description("Accepted values for the field")
                .required()
                .validator(ListLengthValidator {
                    min: Some(1),
                    max: None,
                })
                .build(),
        )
        .build()
}

//! Column model

use super::default_value::{parse_default_value, DefaultValue};
use super::TypeCode;

/// A table column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Abstract type code; the ASE spelling comes from the type map
    pub type_code: TypeCode,
    /// Size or precision
    pub size: Option<u32>,
    pub scale: Option<u32>,
    /// NOT NULL
    pub required: bool,
    /// IDENTITY
    pub auto_increment: bool,
    /// Computed column (ASE `COMPUTE`)
    pub generated: bool,
    pub unique: bool,
    /// Raw default as written in the model
    pub default_value: Option<String>,
    /// Free-form SQL expression of a computed column
    pub generated_definition: Option<String>,
    /// Platform type used verbatim instead of the type map (e.g. `BIGDATETIME`)
    pub native_type: Option<String>,
    pub description: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, type_code: TypeCode) -> Self {
        Self {
            name: name.into(),
            type_code,
            size: None,
            scale: None,
            required: false,
            auto_increment: false,
            generated: false,
            unique: false,
            default_value: None,
            generated_definition: None,
            native_type: None,
            description: None,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_precision(mut self, size: u32, scale: u32) -> Self {
        self.size = Some(size);
        self.scale = Some(scale);
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_generated(mut self, definition: impl Into<String>) -> Self {
        self.generated = true;
        self.generated_definition = Some(definition.into());
        self
    }

    pub fn with_native_type(mut self, native_type: impl Into<String>) -> Self {
        self.native_type = Some(native_type.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// The default parsed according to the column type
    pub fn parsed_default_value(&self) -> Option<DefaultValue> {
        parse_default_value(self.default_value.as_deref(), self.type_code)
    }

    /// Size as written in model files: `10` or `10,2`
    pub fn size_spec(&self) -> Option<String> {
        match (self.size, self.scale) {
            (Some(size), Some(scale)) => Some(format!("{},{}", size, scale)),
            (Some(size), None) => Some(size.to_string()),
            _ => None,
        }
    }
}

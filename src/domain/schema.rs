//! Schema extraction from declared record descriptors.
//!
//! Record types describe their fields once through [`RecordBuilder`]; the
//! extractor turns that description into a [`TypeManifest`] on every call.
//!
//! Field tags mirror the annotations a data-structure author attaches:
//!
//! - `wire`: `name[,opts]`, the serialized name plus options
//! - `doc`, falling back to `description`
//! - `example`: free text
//! - `schema`: free text; a field is required when it contains `required`

use crate::domain::error::ExtractError;
use std::fmt;

/// Shape of a described type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Record(Vec<FieldDef>),
    Scalar,
    List,
    Optional,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeKind::Record(_) => "record",
            TypeKind::Scalar => "scalar",
            TypeKind::List => "list",
            TypeKind::Optional => "option",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTags {
    pub wire: Option<String>,
    pub doc: Option<String>,
    pub description: Option<String>,
    pub example: Option<String>,
    pub schema: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub type_name: String,
    pub exported: bool,
    pub tags: FieldTags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub name: String,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Scalar,
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self.kind, TypeKind::Record(_))
    }

    /// Number of exported fields; zero for non-records.
    pub fn exported_field_count(&self) -> usize {
        match &self.kind {
            TypeKind::Record(fields) => fields.iter().filter(|f| f.exported).count(),
            _ => 0,
        }
    }
}

/// Types that can describe their own shape.
pub trait Describe {
    fn descriptor() -> TypeDescriptor;
}

macro_rules! describe_scalar {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl Describe for $t {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::scalar($name)
                }
            }
        )*
    };
}

describe_scalar! {
    f64 => "f64",
    f32 => "f32",
    i64 => "i64",
    i32 => "i32",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
    bool => "bool",
    String => "String",
}

impl<T: Describe> Describe for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor {
            name: format!("Vec<{}>", T::descriptor().name),
            kind: TypeKind::List,
        }
    }
}

impl<T: Describe> Describe for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor {
            name: format!("Option<{}>", T::descriptor().name),
            kind: TypeKind::Optional,
        }
    }
}

/// Declares a record's fields in order. Tag setters apply to the most
/// recently declared field.
///
/// ```
/// use tmpldoc::domain::schema::{RecordBuilder, TypeDescriptor};
///
/// let desc: TypeDescriptor = RecordBuilder::new("ExitPlan")
///     .field::<f64>("stop_loss")
///     .wire("stop_loss")
///     .doc("Stop loss price")
///     .example("44000.00")
///     .build();
/// assert_eq!(desc.exported_field_count(), 1);
/// ```
#[derive(Debug)]
pub struct RecordBuilder {
    name: String,
    fields: Vec<FieldDef>,
}

impl RecordBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field<T: Describe>(self, name: impl Into<String>) -> Self {
        self.push::<T>(name.into(), true)
    }

    /// A field that exists on the record but is skipped by extraction.
    pub fn private_field<T: Describe>(self, name: impl Into<String>) -> Self {
        self.push::<T>(name.into(), false)
    }

    fn push<T: Describe>(mut self, name: String, exported: bool) -> Self {
        self.fields.push(FieldDef {
            name,
            type_name: T::descriptor().name,
            exported,
            tags: FieldTags::default(),
        });
        self
    }

    fn tag(mut self, set: impl FnOnce(&mut FieldTags)) -> Self {
        if let Some(field) = self.fields.last_mut() {
            set(&mut field.tags);
        }
        self
    }

    pub fn wire(self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tag(|t| t.wire = Some(tag))
    }

    pub fn doc(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.tag(|t| t.doc = Some(text))
    }

    pub fn description(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.tag(|t| t.description = Some(text))
    }

    pub fn example(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.tag(|t| t.example = Some(text))
    }

    pub fn schema(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.tag(|t| t.schema = Some(text))
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            name: self.name,
            kind: TypeKind::Record(self.fields),
        }
    }
}

/// One extracted field row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Empty when the field has no wire tag.
    pub json_name: String,
    pub type_name: String,
    pub description: String,
    pub example: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeManifest {
    pub type_name: String,
    /// Type-level documentation is not extracted; always empty.
    pub description: String,
    pub fields: Vec<FieldDescriptor>,
}

pub fn generate(desc: &TypeDescriptor) -> Result<TypeManifest, ExtractError> {
    let fields = match &desc.kind {
        TypeKind::Record(fields) => fields,
        other => {
            return Err(ExtractError {
                type_name: desc.name.clone(),
                kind: other.to_string(),
            });
        }
    };

    Ok(TypeManifest {
        type_name: desc.name.clone(),
        description: String::new(),
        fields: fields
            .iter()
            .filter(|f| f.exported)
            .map(field_descriptor)
            .collect(),
    })
}

pub fn generate_for<T: Describe>() -> Result<TypeManifest, ExtractError> {
    generate(&T::descriptor())
}

/// Same as [`generate_for`], inferring the type from a value.
pub fn generate_value<T: Describe>(_value: &T) -> Result<TypeManifest, ExtractError> {
    generate_for::<T>()
}

fn field_descriptor(field: &FieldDef) -> FieldDescriptor {
    let tags = &field.tags;
    FieldDescriptor {
        name: field.name.clone(),
        json_name: tags
            .wire
            .as_deref()
            .and_then(|w| w.split(',').next())
            .unwrap_or_default()
            .to_string(),
        type_name: field.type_name.clone(),
        description: tags
            .doc
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(tags.description.as_deref())
            .unwrap_or_default()
            .to_string(),
        example: tags.example.clone().unwrap_or_default(),
        required: tags
            .schema
            .as_deref()
            .is_some_and(|s| s.contains("required")),
    }
}

//! Mapping flattening.
//!
//! Collapses the nested field trees of a `GET /_mappings` response into one
//! level per type: dotted field path -> [`FieldDescriptor`]. Object fields
//! (`properties`) and multi-fields (`fields`) are both followed. The source
//! value is never modified; every descriptor is built fresh.
//!
//! Two definitions that land on the same dotted path are a
//! [`FlattenPathCollision`]. The first definition is kept and the collision
//! is recorded on the type so it can be reported with the index. The
//! sub-fields of a rejected definition are not flattened.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Nested object fields
const PROPERTIES: &str = "properties";
/// Multi-field members
const FIELDS: &str = "fields";
/// Legacy multi-field mapping type
const MULTI_FIELD: &str = "multi_field";
/// Key holding the qualified name in the rendered `index.flat_mappings` tree
const QUALIFIED_NAME_KEY: &str = "_name";

/// One mapped field after flattening.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Mapping type the field belongs to
    pub type_name: String,
    /// Dotted path from the type root
    pub path: String,
    /// The field's own key in its parent container
    pub name: String,
    /// `"{type}:{path}"`
    pub qualified_name: String,
    /// Field attributes without `properties` and `fields`
    pub attributes: Map<String, Value>,
}

impl FieldDescriptor {
    /// Attribute lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// The mapping `type` attribute, if it is a string
    pub fn field_type(&self) -> Option<&str> {
        self.attributes.get("type").and_then(Value::as_str)
    }

    fn to_value(&self) -> Value {
        let mut attributes = self.attributes.clone();
        attributes.insert(
            QUALIFIED_NAME_KEY.to_string(),
            Value::String(self.qualified_name.clone()),
        );
        Value::Object(attributes)
    }
}

/// Two field definitions flattened to the same dotted path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field path `{qualified_name}` in index [{index}] is defined more than once")]
pub struct FlattenPathCollision {
    pub index: String,
    pub type_name: String,
    pub path: String,
    pub qualified_name: String,
}

/// A single mapping type after flattening.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatType {
    /// Type-level attributes (`_all`, `_source`, `dynamic`, ...)
    pub attributes: Map<String, Value>,
    /// Every field, keyed by dotted path
    pub fields: BTreeMap<String, FieldDescriptor>,
    /// Paths defined more than once, in discovery order
    pub collisions: Vec<FlattenPathCollision>,
}

impl FlatType {
    fn to_value(&self) -> Value {
        let mut out = self.attributes.clone();
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|(path, field)| (path.clone(), field.to_value()))
            .collect();
        out.insert(PROPERTIES.to_string(), Value::Object(properties));
        Value::Object(out)
    }
}

/// Flattened types of one index, keyed by type name.
pub type FlatIndex = BTreeMap<String, FlatType>;

/// Flattened mappings of every index, keyed by index name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatMappings {
    indices: BTreeMap<String, FlatIndex>,
}

impl FlatMappings {
    /// Types of one index
    pub fn index(&self, name: &str) -> Option<&FlatIndex> {
        self.indices.get(name)
    }

    /// Iterate over `(index name, types)` in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FlatIndex)> {
        self.indices.iter()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Every collision of one index, across its types
    pub fn collisions(&self, index: &str) -> Vec<&FlattenPathCollision> {
        self.indices
            .get(index)
            .map(|types| types.values().flat_map(|t| t.collisions.iter()).collect())
            .unwrap_or_default()
    }

    /// Render as the `index.flat_mappings` namespace of the snapshot tree:
    /// `{index: {type: {<type attrs>, properties: {path: {<attrs>, _name}}}}}`
    pub fn to_value(&self) -> Value {
        let indices: Map<String, Value> = self
            .indices
            .iter()
            .map(|(index, types)| {
                let types: Map<String, Value> = types
                    .iter()
                    .map(|(name, flat)| (name.clone(), flat.to_value()))
                    .collect();
                (index.clone(), Value::Object(types))
            })
            .collect();
        Value::Object(indices)
    }
}

/// Flatten a `GET /_mappings` response.
///
/// Expects `{index: {mappings: {type: {properties: {...}}}}}`. Indices whose
/// entry has no `mappings` object get an empty set of types; non-object
/// types and fields are ignored.
pub fn flatten(mappings: &Value) -> FlatMappings {
    let mut indices = BTreeMap::new();

    if let Some(by_index) = mappings.as_object() {
        for (index, entry) in by_index {
            let mut types = FlatIndex::new();
            if let Some(type_defs) = entry.get("mappings").and_then(Value::as_object) {
                for (type_name, type_def) in type_defs {
                    if let Some(type_def) = type_def.as_object() {
                        types.insert(type_name.clone(), flatten_type(index, type_name, type_def));
                    }
                }
            }
            indices.insert(index.clone(), types);
        }
    }

    FlatMappings { indices }
}

fn flatten_type(index: &str, type_name: &str, type_def: &Map<String, Value>) -> FlatType {
    let mut flat = FlatType {
        attributes: without(type_def, &[PROPERTIES]),
        ..FlatType::default()
    };

    if let Some(properties) = type_def.get(PROPERTIES).and_then(Value::as_object) {
        let mut walker = Walker {
            index,
            type_name,
            out: &mut flat,
        };
        walker.visit_container(properties, "", None);
    }

    flat
}

struct Walker<'a> {
    index: &'a str,
    type_name: &'a str,
    out: &'a mut FlatType,
}

impl Walker<'_> {
    /// Visit every field of one `properties` or `fields` container.
    ///
    /// `multi_field_parent` carries `(name, path)` of a legacy `multi_field`
    /// parent: its member with the same name is the parent's default field
    /// and maps to the parent's own path.
    fn visit_container(
        &mut self,
        container: &Map<String, Value>,
        prefix: &str,
        multi_field_parent: Option<(&str, &str)>,
    ) {
        for (name, field) in container {
            let Some(field) = field.as_object() else {
                continue;
            };
            let path = match multi_field_parent {
                Some((parent_name, parent_path)) if parent_name == name.as_str() => {
                    parent_path.to_string()
                }
                _ => format!("{}{}", prefix, name),
            };
            self.visit_field(name, &path, field);
        }
    }

    fn visit_field(&mut self, name: &str, path: &str, field: &Map<String, Value>) {
        if !self.record(name, path, without(field, &[PROPERTIES, FIELDS])) {
            return;
        }

        let child_prefix = format!("{}.", path);
        if let Some(properties) = field.get(PROPERTIES).and_then(Value::as_object) {
            self.visit_container(properties, &child_prefix, None);
        }
        if let Some(members) = field.get(FIELDS).and_then(Value::as_object) {
            let is_multi_field = field.get("type").and_then(Value::as_str) == Some(MULTI_FIELD);
            let parent = is_multi_field.then_some((name, path));
            self.visit_container(members, &child_prefix, parent);
        }
    }

    /// Record one field; `false` when the path was already taken
    fn record(&mut self, name: &str, path: &str, attributes: Map<String, Value>) -> bool {
        let qualified_name = format!("{}:{}", self.type_name, path);

        if self.out.fields.contains_key(path) {
            tracing::warn!(
                index = self.index,
                field = %qualified_name,
                "field path defined more than once"
            );
            self.out.collisions.push(FlattenPathCollision {
                index: self.index.to_string(),
                type_name: self.type_name.to_string(),
                path: path.to_string(),
                qualified_name,
            });
            return false;
        }

        self.out.fields.insert(
            path.to_string(),
            FieldDescriptor {
                type_name: self.type_name.to_string(),
                path: path.to_string(),
                name: name.to_string(),
                qualified_name,
                attributes,
            },
        );
        true
    }
}

/// Copy of `map` without the given keys
fn without(map: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

//! Property tests for severity aggregation, path lookup and flattening.

use index_doc::engine::flatten::flatten;
use index_doc::engine::path::{resolve, resolve_segments};
use index_doc::Severity;
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

fn severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

/// Shape of one generated field
#[derive(Debug, Clone)]
enum FieldSpec {
    Leaf(&'static str),
    Object(BTreeMap<String, FieldSpec>),
    /// A field with a `fields` container; `legacy` marks a `multi_field`
    /// parent, `default_member` adds a member named like the parent
    Multi {
        members: BTreeMap<String, &'static str>,
        legacy: bool,
        default_member: bool,
    },
}

fn field_type() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["string", "long", "date", "boolean"])
}

fn field_spec() -> impl Strategy<Value = FieldSpec> {
    let leaf = prop_oneof![
        field_type().prop_map(FieldSpec::Leaf),
        (
            prop::collection::btree_map("[a-z]{1,6}", field_type(), 1..3),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(members, legacy, default_member)| FieldSpec::Multi {
                members,
                legacy,
                default_member,
            }),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop::collection::btree_map("[a-z]{1,6}", inner, 1..4).prop_map(FieldSpec::Object)
    })
}

fn field_json(name: &str, spec: &FieldSpec) -> Value {
    match spec {
        FieldSpec::Leaf(t) => json!({ "type": t }),
        FieldSpec::Object(children) => json!({ "properties": container(children) }),
        FieldSpec::Multi {
            members,
            legacy,
            default_member,
        } => {
            let mut fields: Map<String, Value> = members
                .iter()
                .map(|(member, t)| (member.clone(), json!({ "type": t })))
                .collect();
            if *legacy && *default_member {
                fields.insert(name.to_string(), json!({ "type": "string", "index": "analyzed" }));
            }
            let t = if *legacy { "multi_field" } else { "string" };
            json!({ "type": t, "fields": fields })
        }
    }
}

fn container(children: &BTreeMap<String, FieldSpec>) -> Map<String, Value> {
    children
        .iter()
        .map(|(name, spec)| (name.clone(), field_json(name, spec)))
        .collect()
}

fn properties() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z]{1,6}", field_spec(), 1..5).prop_map(|fields| container(&fields))
}

/// `(fields, collisions)` expected from flattening a `properties` or
/// `fields` container. A `multi_field` member named like its parent lands
/// on the parent's path and collides.
fn count_fields(container: &Map<String, Value>, multi_field_parent: Option<&str>) -> (usize, usize) {
    let mut fields = 0;
    let mut collisions = 0;

    for (name, field) in container {
        if multi_field_parent == Some(name.as_str()) {
            collisions += 1;
            continue;
        }
        fields += 1;

        if let Some(properties) = field.get("properties").and_then(Value::as_object) {
            let (f, c) = count_fields(properties, None);
            fields += f;
            collisions += c;
        }
        if let Some(members) = field.get("fields").and_then(Value::as_object) {
            let legacy = field.get("type").and_then(Value::as_str) == Some("multi_field");
            let (f, c) = count_fields(members, legacy.then_some(name.as_str()));
            fields += f;
            collisions += c;
        }
    }

    (fields, collisions)
}

proptest! {
    #[test]
    fn combine_is_commutative(a in severity(), b in severity()) {
        prop_assert_eq!(a.combine(b), b.combine(a));
    }

    #[test]
    fn combine_is_associative(a in severity(), b in severity(), c in severity()) {
        prop_assert_eq!(a.combine(b).combine(c), a.combine(b.combine(c)));
    }

    #[test]
    fn combine_is_idempotent_with_green_identity(a in severity()) {
        prop_assert_eq!(a.combine(a), a);
        prop_assert_eq!(a.combine(Severity::Green), a);
    }

    #[test]
    fn fold_is_the_maximum(list in prop::collection::vec(severity(), 0..12)) {
        let expected = list.iter().copied().max().unwrap_or(Severity::Green);
        prop_assert_eq!(Severity::fold(list), expected);
    }

    #[test]
    fn resolve_finds_nested_leaf(keys in prop::collection::vec("[a-z_]{1,8}", 1..6), leaf in any::<i64>()) {
        let mut value = json!(leaf);
        for key in keys.iter().rev() {
            value = json!({ (key.clone()): value });
        }
        let path = keys.join(".");
        prop_assert_eq!(resolve(&value, &path), Some(&json!(leaf)));
        prop_assert_eq!(resolve_segments(&value, keys.as_slice()), Some(&json!(leaf)));

        let missing = format!("{}.nope", path);
        prop_assert_eq!(resolve(&value, &missing), None);
    }

    #[test]
    fn flatten_covers_every_field_once(props in properties()) {
        let input = json!({ "idx": { "mappings": { "doc": { "properties": props.clone() } } } });
        let before = input.clone();

        let flat = flatten(&input);
        let doc = &flat.index("idx").unwrap()["doc"];

        let (fields, collisions) = count_fields(&props, None);
        prop_assert_eq!(&input, &before);
        prop_assert_eq!(doc.fields.len(), fields);
        prop_assert_eq!(doc.collisions.len(), collisions);

        for collision in &doc.collisions {
            let kept = &doc.fields[&collision.path];
            prop_assert_eq!(kept.field_type(), Some("multi_field"));
        }

        for (path, field) in &doc.fields {
            prop_assert_eq!(&field.path, path);
            prop_assert_eq!(&field.qualified_name, &format!("doc:{}", path));
            prop_assert!(path.ends_with(field.name.as_str()));
            prop_assert!(field.get("properties").is_none());
            prop_assert!(field.get("fields").is_none());
        }
    }
}

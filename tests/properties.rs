use std::sync::Arc;

use control_contract::normalize::normalize_padding;
use control_contract::{validate, AdditionalPolicy, ObjectSchema, SchemaNode, ValidationOptions, Value};
use indexmap::IndexMap;
use proptest::prelude::*;

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(Value::Int),
        (-1000.0f64..1000.0).prop_map(Value::Float),
        "[a-z%]{0,6}".prop_map(Value::Str),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-e]", inner), 0..6)
                .prop_map(|kvs| Value::Object(kvs.into_iter().collect::<IndexMap<_, _>>())),
        ]
    })
}

fn arb_schema() -> impl Strategy<Value = SchemaNode> {
    let leaf = prop_oneof![
        Just(SchemaNode::any()),
        Just(SchemaNode::number()),
        Just(SchemaNode::integer()),
        Just(SchemaNode::string()),
        Just(SchemaNode::boolean()),
        Just(SchemaNode::enumeration(["a", "b"])),
        (proptest::option::of(-10.0f64..0.0), proptest::option::of(0.0f64..10.0))
            .prop_map(|(min, max)| SchemaNode::range(min, max)),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (inner.clone(), proptest::option::of(0usize..3), proptest::option::of(2usize..5))
                .prop_map(|(items, min, max)| SchemaNode::array_between(items, min, max)),
            (prop::collection::vec(("[a-e]", inner.clone()), 0..4), any::<bool>(), proptest::option::of("[a-e]"))
                .prop_map(|(props, closed, required)| {
                    let mut obj = props.into_iter().fold(ObjectSchema::new(), |o, (k, s)| o.prop(&k, s));
                    if let Some(key) = required {
                        obj = obj.require(&key);
                    }
                    if closed {
                        obj = obj.additional(AdditionalPolicy::Reject);
                    }
                    obj.into_node()
                }),
            prop::collection::vec(inner.clone(), 0..3).prop_map(SchemaNode::any_of),
            prop::collection::vec(inner, 0..3).prop_map(SchemaNode::one_of),
        ]
    })
}

fn arb_padding_input() -> impl Strategy<Value = Value> {
    let n = || -1.0e6f64..1.0e6;
    prop_oneof![
        n().prop_map(Value::Float),
        prop::sample::select(vec![1usize, 2, 4])
            .prop_flat_map(move |len| prop::collection::vec(n(), len))
            .prop_map(Value::from),
        (proptest::option::of(n()), n(), proptest::option::of(n())).prop_map(|(left, top, bottom)| {
            let mut m = IndexMap::new();
            if let Some(l) = left {
                m.insert("left".to_string(), Value::Float(l));
            }
            m.insert("top".to_string(), Value::Float(top));
            if let Some(b) = bottom {
                m.insert("bottom".to_string(), Value::Float(b));
            }
            Value::Object(m)
        }),
    ]
}

proptest! {
    #[test]
    fn validation_is_deterministic(value in arb_value(), schema in arb_schema(), strict in any::<bool>()) {
        let opts = ValidationOptions::lenient().with_strict(strict);
        let first = validate(&value, &schema, "p", &opts);
        let second = validate(&value, &schema, "p", &opts);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn null_is_valid_for_every_schema(schema in arb_schema(), strict in any::<bool>()) {
        let opts = ValidationOptions::lenient().with_strict(strict);
        prop_assert!(validate(&Value::Null, &schema, "p", &opts).is_empty());
    }

    #[test]
    fn shared_and_cloned_schemas_agree(value in arb_value(), schema in arb_schema()) {
        let shared: Arc<SchemaNode> = schema.clone().shared();
        let opts = ValidationOptions::strict();
        prop_assert_eq!(validate(&value, &shared, "p", &opts), validate(&value, &schema, "p", &opts));
    }

    #[test]
    fn padding_normalization_is_idempotent(input in arb_padding_input()) {
        let once = normalize_padding(Some(&input)).unwrap().map(Value::from);
        let twice = normalize_padding(once.as_ref()).unwrap().map(Value::from);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn lenient_never_reports_more_than_strict(value in arb_value(), schema in arb_schema()) {
        let lenient = validate(&value, &schema, "p", &ValidationOptions::lenient()).len();
        let strict = validate(&value, &schema, "p", &ValidationOptions::strict()).len();
        prop_assert!(lenient <= strict || contains_union(&schema));
    }
}

// strictness can flip a union branch from matching to failing, which may
// trade several nested errors for one union error
fn contains_union(schema: &SchemaNode) -> bool {
    match schema {
        SchemaNode::AnyOf { .. } | SchemaNode::OneOf { .. } => true,
        SchemaNode::ArrayOf { items, .. } => contains_union(items),
        SchemaNode::ObjectOf(obj) => obj.properties.values().any(|s| contains_union(s)),
        _ => false,
    }
}

use std::sync::Arc;

use control_contract::value::bag_from_json;
use control_contract::{
    AdditionalPolicy, Catalog, ContractError, JsonCatalog, ObjectSchema, PropertyBag, SchemaNode, SchemaRegistry,
    StaticCatalog, Value,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn sample_registry() -> SchemaRegistry {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/catalogs/sample.json");
    SchemaRegistry::new(JsonCatalog::load(path).expect("sample catalog loads"))
}

fn bag(v: serde_json::Value) -> PropertyBag {
    bag_from_json(v).expect("object")
}

fn paths(errors: &[control_contract::ValidationError]) -> Vec<String> {
    errors.iter().map(|e| e.path.clone()).collect()
}

#[test]
fn sample_catalog_lists_controls() {
    let reg = sample_registry();
    let controls = reg.catalog().control_types();
    assert_eq!(controls, ["button", "text", "image", "slider", "row", "segmented"]);
    assert_eq!(reg.warm(), controls.len());
}

#[test]
fn button_radius_below_minimum_is_one_error() {
    let reg = sample_registry();
    let errors = reg.validate_props("button", &bag(json!({"label": "OK", "radius": -1})), false);
    assert_eq!(paths(&errors), ["button.props.radius"]);
    assert!(errors[0].message.contains("minimum"), "{}", errors[0].message);
}

#[test]
fn mixins_apply_to_every_control() {
    let reg = sample_registry();
    for control in reg.catalog().control_types() {
        let schema = reg.schema_for(&control).unwrap();
        for key in ["width", "padding", "events", "tooltip", "tab_index"] {
            assert!(schema.property(key).is_some(), "{control} lacks {key}");
        }
    }
}

#[test]
fn hints_are_accepted_under_strict_mode() {
    let reg = sample_registry();
    let props = bag(json!({"label": "Save", "icon": {"name": "save"}, "badge": 3, "shortcut": "ctrl+s"}));
    assert!(reg.validate_props("button", &props, true).is_empty());
    let errors = reg.validate_props("button", &bag(json!({"label": "Save", "tint": "red"})), true);
    assert_eq!(paths(&errors), ["button.props.tint"]);
}

#[test]
fn nested_paths_are_reported() {
    let reg = sample_registry();
    let errors = reg.validate_props(
        "segmented",
        &bag(json!({"segments": [{"id": "a"}, {"label": "b"}, {"id": 3}], "selected": ["a", 1]})),
        false,
    );
    assert_eq!(
        paths(&errors),
        ["segmented.props.segments[1].id", "segmented.props.segments[2].id", "segmented.props.selected"]
    );
}

#[test]
fn prepare_props_returns_coerced_bag() {
    let reg = sample_registry();
    let out = reg
        .prepare_props("row", &bag(json!({"spacing": 8, "width": "100%", "margin": ["4", 8]})), true)
        .unwrap();
    assert_eq!(out["width"], Value::from("100%"));
    assert_eq!(out["margin"], Value::from(vec![4.0, 8.0]));

    match reg.prepare_props("image", &bag(json!({"fit": "cover"})), false) {
        Err(ContractError::Invalid { subject, violations }) => {
            assert_eq!(subject, "image.props");
            assert_eq!(violations.paths().collect::<Vec<_>>(), ["image.props.src"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn registry_is_shareable_across_threads() {
    let reg = Arc::new(sample_registry());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let reg = Arc::clone(&reg);
            std::thread::spawn(move || {
                let errors = reg.validate_props("text", &bag(json!({"text": "x", "size": i})), false);
                (reg.schema_for("text").unwrap(), errors.len())
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = &results[0].0;
    assert!(results.iter().all(|(schema, _)| Arc::ptr_eq(schema, first)));
    // size 0 is below the minimum of 1
    assert_eq!(results.iter().map(|(_, n)| n).sum::<usize>(), 1);
}

#[test]
fn static_catalog_works_end_to_end() {
    let schema = ObjectSchema::new()
        .prop("kind", SchemaNode::enumeration(["a", "b"]))
        .require("kind")
        .additional(AdditionalPolicy::Reject)
        .into_node();
    let reg = SchemaRegistry::new(StaticCatalog::new().with("chip", schema, ["avatar"]));
    assert!(reg.ensure_valid_props("chip", &bag(json!({"kind": "a", "avatar": null})), true).is_ok());
    let err = reg.ensure_valid_props("chip", &bag(json!({"kind": "c"})), true).unwrap_err();
    assert_eq!(err.violations().len(), 1);
    assert!(err.to_string().contains("chip.props.kind must be one of [\"a\", \"b\"]"));
}

//! Integration Tests for Computed Fields
//!
//! These tests verify that record types, records and the update protocol
//! work together correctly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fieldgraph_core::{
    Attrs, Catalog, ComputeError, FieldName, Permissive, Record, RecordError, Schema, SchemaError,
    SchemaOptions, ValidationError,
};

/// Route engine logs to the test harness. Set `RUST_LOG=fieldgraph_core=trace`
/// to see every evaluated computation.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn totals(allow_set_computed: bool) -> Arc<Schema<i64>> {
    init_tracing();
    Schema::<i64>::builder("Totals")
        .fields(["a", "b"])
        .compute("sum", ["a", "b"], |inputs| Ok(inputs.get("a")? + inputs.get("b")?))
        .allow_set_computed(allow_set_computed)
        .build()
        .unwrap()
}

/// Counts how often each computation of the chain type runs.
#[derive(Default)]
struct Counters {
    step1: AtomicUsize,
    step2: AtomicUsize,
    last: AtomicUsize,
    sibling: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> [usize; 4] {
        [
            self.step1.load(Ordering::SeqCst),
            self.step2.load(Ordering::SeqCst),
            self.last.load(Ordering::SeqCst),
            self.sibling.load(Ordering::SeqCst),
        ]
    }
}

/// `base -> step1 -> step2 -> final`, plus `sibling` computed from `other`.
fn chain(counters: &Arc<Counters>) -> Arc<Schema<i64>> {
    let (c1, c2, c3, c4) = (
        Arc::clone(counters),
        Arc::clone(counters),
        Arc::clone(counters),
        Arc::clone(counters),
    );

    init_tracing();
    Schema::<i64>::builder("Chain")
        .fields(["base", "other"])
        .compute("step1", ["base"], move |inputs| {
            c1.step1.fetch_add(1, Ordering::SeqCst);
            Ok(inputs.get("base")? * 2)
        })
        .compute("step2", ["step1"], move |inputs| {
            c2.step2.fetch_add(1, Ordering::SeqCst);
            Ok(inputs.get("step1")? + 10)
        })
        .compute("final", ["step2"], move |inputs| {
            c3.last.fetch_add(1, Ordering::SeqCst);
            let step2 = inputs.get("step2")?;
            Ok(step2 * step2)
        })
        .compute("sibling", ["other"], move |inputs| {
            c4.sibling.fetch_add(1, Ordering::SeqCst);
            Ok(inputs.get("other")? - 1)
        })
        .build()
        .unwrap()
}

/// Test that a sum follows its inputs through create and update.
#[test]
fn sum_follows_its_inputs() {
    let schema = totals(false);

    let record = schema.create([("a", 1), ("b", 2)]).unwrap();
    assert_eq!(record.get("sum"), Some(&3));

    let record = schema.update(&record, [("a", 10)]).unwrap();
    assert_eq!(record.get("a"), Some(&10));
    assert_eq!(record.get("sum"), Some(&12));
}

/// Test that a chain settles in one pass.
#[test]
fn chain_settles_on_create_and_update() {
    let counters = Arc::new(Counters::default());
    let schema = chain(&counters);

    let record = schema.create([("base", 3), ("other", 0)]).unwrap();
    assert_eq!(record.get("step1"), Some(&6));
    assert_eq!(record.get("step2"), Some(&16));
    assert_eq!(record.get("final"), Some(&256));

    let record = record.put("base", 5).unwrap();
    assert_eq!(record.get("final"), Some(&400));
}

/// Test that only fields downstream of a change are recomputed.
#[test]
fn update_recomputes_only_downstream_fields() {
    let counters = Arc::new(Counters::default());
    let schema = chain(&counters);

    let record = schema.create([("base", 3), ("other", 7)]).unwrap();
    assert_eq!(counters.snapshot(), [1, 1, 1, 1]);

    let updated = record.put("base", 5).unwrap();
    assert_eq!(counters.snapshot(), [2, 2, 2, 1]);
    assert_eq!(updated.get("sibling"), Some(&6));

    let updated = updated.put("other", 9).unwrap();
    assert_eq!(counters.snapshot(), [2, 2, 2, 2]);
    assert_eq!(updated.get("sibling"), Some(&8));
    assert_eq!(updated.get("final"), Some(&400));
}

/// Test that recomputing a consistent record changes nothing.
#[test]
fn refresh_is_idempotent() {
    let counters = Arc::new(Counters::default());
    let schema = chain(&counters);

    let record = schema.create([("base", 3), ("other", 7)]).unwrap();
    let refreshed = record.refresh().unwrap();
    assert_eq!(refreshed, record);

    let updated = record.put("base", 4).unwrap();
    assert_eq!(updated.refresh().unwrap(), updated);
}

/// Test that the default policy rejects computed assignments everywhere.
#[test]
fn computed_fields_are_rejected_by_default() {
    let schema = totals(false);

    let err = schema.create([("a", 1), ("b", 2), ("sum", 100)]).unwrap_err();
    assert!(err.to_string().contains("sum"));
    assert!(matches!(
        err,
        RecordError::ComputedFieldAssignment { ref fields }
            if *fields == vec![FieldName::new("sum")]
    ));

    let record = schema.create([("a", 1), ("b", 2)]).unwrap();
    let err = record.update([("a", 5), ("sum", 1)]).unwrap_err();
    assert!(matches!(err, RecordError::ComputedFieldAssignment { .. }));
    assert_eq!(record.get("sum"), Some(&3));
}

/// Test that a rejected update names every computed field, in the order given.
#[test]
fn rejected_update_names_every_computed_field() {
    let schema = Schema::<i64>::builder("Pair")
        .field("a")
        .compute("x", ["a"], |inputs| Ok(inputs.get("a")? + 1))
        .compute("y", ["x"], |inputs| Ok(inputs.get("x")? + 1))
        .build()
        .unwrap();

    let record = schema.create([("a", 1)]).unwrap();
    let err = record.update([("y", 1), ("a", 2), ("x", 3)]).unwrap_err();

    assert_eq!(
        err.to_string(),
        "computed fields cannot be assigned directly: y, x"
    );
    match err {
        RecordError::ComputedFieldAssignment { fields } => {
            assert_eq!(fields, vec![FieldName::new("y"), FieldName::new("x")]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = record.put("x", 9).unwrap_err();
    assert!(matches!(
        err,
        RecordError::ComputedFieldAssignment { ref fields }
            if *fields == vec![FieldName::new("x")]
    ));
    assert_eq!(record.get("y"), Some(&3));
}

/// Test that the permissive policy keeps supplied computed values.
#[test]
fn permissive_policy_keeps_supplied_values() {
    let schema = totals(true);

    let record = schema.create([("a", 1), ("b", 2), ("sum", 100)]).unwrap();
    assert_eq!(record.get("sum"), Some(&100));

    // Input changes still propagate
    let record = record.put("b", 3).unwrap();
    assert_eq!(record.get("sum"), Some(&4));
}

/// Test that options can be loaded under either name.
#[test]
fn options_load_from_json() {
    let options: SchemaOptions =
        serde_json::from_str(r#"{ "allow_update_computed": true }"#).unwrap();

    let schema = Schema::<i64>::builder("Totals")
        .fields(["a", "b"])
        .compute("sum", ["a", "b"], |inputs| Ok(inputs.get("a")? + inputs.get("b")?))
        .options(options)
        .build()
        .unwrap();

    assert!(schema.options().allow_set_computed);
}

/// Test that a failing computation leaves the original record usable.
#[test]
fn failed_update_is_atomic() {
    let schema = Schema::<i64>::builder("Ratio")
        .fields(["num", "den"])
        .compute("ratio", ["num", "den"], |inputs| {
            let den = *inputs.get("den")?;
            if den == 0 {
                return Err(ComputeError::msg("division by zero"));
            }
            Ok(inputs.get("num")? / den)
        })
        .compute("percent", ["ratio"], |inputs| Ok(inputs.get("ratio")? * 100))
        .build()
        .unwrap();

    let record = schema.create([("num", 10), ("den", 5)]).unwrap();
    let err = record.update([("num", 20), ("den", 0)]).unwrap_err();

    assert_eq!(err.to_string(), "failed to compute 'ratio': division by zero");
    assert!(err.compute_error().is_some());

    assert_eq!(record.get("num"), Some(&10));
    assert_eq!(record.get("percent"), Some(&200));
    assert_eq!(record.put("num", 15).unwrap().get("percent"), Some(&300));
}

/// Test that an unknown dependency prevents the type from existing.
#[test]
fn unknown_dependency_is_rejected() {
    let catalog = Catalog::<i64>::new();
    let err = catalog
        .define(
            Schema::<i64>::builder("Order")
                .field("price")
                .compute("total", ["price", "tax"], |inputs| Ok(*inputs.get("price")?)),
        )
        .unwrap_err();

    assert_eq!(
        err,
        SchemaError::UnknownDependency {
            field: "total".into(),
            dep: "tax".into(),
        }
    );
    assert!(catalog.get("Order").is_none());
}

/// Test that cycles are reported field by field.
#[test]
fn cycles_are_rejected() {
    let err = Schema::<i64>::builder("Loop")
        .field("seed")
        .compute("a", ["b"], |_| Ok(0))
        .compute("b", ["a"], |_| Ok(0))
        .build()
        .unwrap_err();

    assert_eq!(
        err,
        SchemaError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        }
    );
    assert_eq!(err.to_string(), "cyclic dependency: a -> b -> a");
}

/// Test that validation errors reach the caller unchanged.
#[test]
fn validation_errors_propagate() {
    let schema = totals(false);

    let err = schema.create([("a", 1)]).unwrap_err();
    assert!(matches!(
        err,
        RecordError::Validation(ValidationError::RequiredFieldMissing(ref missing))
            if *missing == vec![FieldName::new("b")]
    ));

    let err = schema.create([("a", 1), ("b", 2), ("c", 3)]).unwrap_err();
    assert!(matches!(
        err,
        RecordError::Validation(ValidationError::UnknownField(ref key)) if key == "c"
    ));
}

/// Test that a permissive validator leaves missing inputs to the computations.
#[test]
fn permissive_validator_defers_to_computations() {
    let schema = Schema::<i64>::builder("Totals")
        .fields(["a", "b"])
        .compute("sum", ["a", "b"], |inputs| Ok(inputs.get("a")? + inputs.get("b")?))
        .validator(Permissive)
        .build()
        .unwrap();

    let err = schema.create([("a", 1)]).unwrap_err();
    assert!(matches!(
        err.compute_error(),
        Some(ComputeError::MissingInput(name)) if name == "b"
    ));
}

/// Test that records and schemas can be shared between threads.
#[test]
fn records_are_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Schema<i64>>();
    assert_send_sync::<Record<i64>>();
    assert_send_sync::<Catalog<i64>>();

    let schema = totals(false);
    let record = schema.create([("a", 1), ("b", 2)]).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let record = record.clone();
            std::thread::spawn(move || record.put("a", i).unwrap().get("sum").copied())
        })
        .collect();

    let sums: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(sums, vec![Some(2), Some(3), Some(4), Some(5)]);
    assert_eq!(record.get("sum"), Some(&3));
}

/// Test that attributes can come from JSON and records serialize as maps.
#[test]
fn json_in_and_out() {
    let schema = totals(false);

    let attrs: Attrs<i64> = serde_json::from_str(r#"{ "a": 4, "b": 5 }"#).unwrap();
    let record = schema.create(attrs).unwrap();

    assert_eq!(
        serde_json::to_string(&record).unwrap(),
        r#"{"a":4,"b":5,"sum":9}"#
    );
    assert_eq!(record.to_attrs().len(), 3);
}

/// Test that absent fields serialize as null.
#[test]
fn absent_fields_serialize_as_null() {
    let schema = Schema::<i64>::builder("Notes")
        .fields(["title", "body"])
        .build()
        .unwrap();

    let record = schema.create([("title", 1)]).unwrap();
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        serde_json::json!({ "title": 1, "body": null })
    );
}

//! One callout instance and one engine shared by many concurrent requests.

use std::sync::Arc;
use std::thread;

use jsv_callout::{ExecutionResult, ValidatorCallout};
use jsv_core::{ContextValue, InMemoryContext};
use jsv_schema::{EngineConfig, MemoryBundle, SchemaEngine};

const THREADS: usize = 8;
const REQUESTS_PER_THREAD: usize = 50;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn shared_types_are_send_sync() {
    assert_send_sync::<SchemaEngine>();
    assert_send_sync::<ValidatorCallout>();
}

fn shared_engine(cache_capacity: usize) -> Arc<SchemaEngine> {
    let bundle = MemoryBundle::new().with_resource(
        "point.json",
        r#"{"type":"object","required":["x","y"],"properties":{"x":{"type":"number"},"y":{"type":"number"}}}"#,
    );
    Arc::new(SchemaEngine::new(
        Arc::new(bundle),
        EngineConfig {
            default_draft: None,
            cache_capacity,
        },
    ))
}

fn hammer(callout: &ValidatorCallout) {
    thread::scope(|scope| {
        for t in 0..THREADS {
            scope.spawn(move || {
                for i in 0..REQUESTS_PER_THREAD {
                    let conforming = (t + i) % 2 == 0;
                    let body = if conforming {
                        format!(r#"{{"x": {t}, "y": {i}}}"#)
                    } else {
                        format!(r#"{{"x": "{t}"}}"#)
                    };
                    let mut ctx = InMemoryContext::with_content(body);
                    let result = callout.execute(&mut ctx);
                    let valid = ctx.variable("jsv_valid").and_then(ContextValue::as_bool);
                    if conforming {
                        assert_eq!(result, ExecutionResult::Proceed);
                        assert_eq!(valid, Some(true));
                        assert!(ctx.variable("jsv_error").is_none());
                    } else {
                        assert_eq!(result, ExecutionResult::Abort);
                        assert_eq!(valid, Some(false));
                    }
                }
            });
        }
    });
}

#[test]
fn concurrent_requests_on_one_callout() {
    let engine = shared_engine(16);
    let callout = ValidatorCallout::from_properties([("schema", "point.json")], Arc::clone(&engine))
        .unwrap();
    hammer(&callout);
    assert_eq!(engine.cached_schemas(), 1);
}

#[test]
fn concurrent_requests_without_cache() {
    let engine = shared_engine(0);
    let callout = ValidatorCallout::from_properties([("schema", "point.json")], Arc::clone(&engine))
        .unwrap();
    hammer(&callout);
    assert_eq!(engine.cached_schemas(), 0);
}

#[test]
fn many_callouts_share_one_engine() {
    let engine = shared_engine(1);
    let by_resource =
        ValidatorCallout::from_properties([("schema", "point.json")], Arc::clone(&engine)).unwrap();
    let inline = ValidatorCallout::from_properties(
        [("schema", r#"{"type":"array","maxItems":3}"#)],
        Arc::clone(&engine),
    )
    .unwrap();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..REQUESTS_PER_THREAD {
                    let mut a = InMemoryContext::with_content(r#"{"x": 1, "y": 2}"#);
                    assert_eq!(by_resource.execute(&mut a), ExecutionResult::Proceed);
                    let mut b = InMemoryContext::with_content("[1, 2, 3, 4]");
                    assert_eq!(inline.execute(&mut b), ExecutionResult::Abort);
                }
            });
        }
    });
    assert!(engine.cached_schemas() <= 1);
}

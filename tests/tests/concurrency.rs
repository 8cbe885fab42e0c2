//! Concurrency tests: independent runs on one shared graph, cancellation.

use osp_tests::prelude::*;
use pretty_assertions::assert_eq;
use std::thread;
use std::time::Duration;

fn scenario() -> Scenario {
    Scenario::new("concurrency").schema(|reg| {
        reg.add_node_type("Mark")
            .attr(AttrDef::new("by", "String").required())
            .done()?;
        reg.add_edge_type("made").done()?;
        reg.add_walker_type("Marker")
            .attr(AttrDef::new("tag", "String").required())
            .attr(AttrDef::new("count", "Int").with_default(0i64))
            .done()?;
        reg.add_ability("mark", "Marker", Trigger::Entry)
            .guard("Root")
            .body(ability(|ctx| {
                let tag = ctx
                    .walker_attr("tag")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let root = ctx.graph().root();
                for _ in 0..50 {
                    let mark = ctx.spawn_node("Mark", attrs! { "by" => tag.clone() })?;
                    ctx.connect(root, mark, "made", attrs!())?;
                    let count = ctx.walker_attr("count").and_then(Value::as_int).unwrap_or(0);
                    ctx.set_walker_attr("count", count + 1)?;
                }
                ctx.report(tag);
                Ok(())
            }))
            .done()?;
        reg.add_walker_type("Spinner").done()?;
        reg.add_ability("spin", "Spinner", Trigger::Entry)
            .body(ability(|ctx| {
                let here = ctx.here();
                ctx.visit(here)
            }))
            .done()?;
        Ok(())
    })
}

#[test]
fn test_concurrent_runs_both_complete() {
    // GIVEN one engine shared by two threads
    let world = scenario().build().unwrap();
    let engine = world.engine().clone();

    // WHEN each thread runs its own walker
    let handles: Vec<_> = ["left", "right"]
        .into_iter()
        .map(|tag| {
            let engine = engine.clone();
            thread::spawn(move || engine.run("Marker", attrs! { "tag" => tag }, None))
        })
        .collect();
    let outcomes: Vec<RunOutcome> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    // THEN both complete with their own state, and all marks landed
    for (outcome, tag) in outcomes.iter().zip(["left", "right"]) {
        assert!(outcome.completed());
        assert_eq!(outcome.report_strings(), vec![tag]);
        assert_eq!(outcome.walker_attrs.get("count"), Some(&Value::Int(50)));
    }
    let graph = world.graph().read();
    assert_eq!(graph.node_count(), 101);
    assert_eq!(graph.edge_count(), 100);
}

#[test]
fn test_readers_see_committed_visits() {
    let world = scenario().build().unwrap();
    world
        .run("Marker", attrs! { "tag" => "solo" }, None)
        .unwrap();

    // Two read guards may be held at once.
    let first = world.graph().read();
    let second = world.graph().read();
    assert_eq!(first.edge_count(), second.edge_count());
}

#[test]
fn test_cancel_from_another_thread() {
    // GIVEN a walker that never finishes on its own
    let world = scenario().build().unwrap();
    let engine = world.engine().clone();
    let token = CancelToken::new();

    // WHEN another thread cancels it
    let remote = token.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        remote.cancel();
    });
    let outcome = engine
        .run_with_cancel("Spinner", attrs!(), None, token)
        .unwrap();
    canceller.join().unwrap();

    // THEN the run disengages at a dispatch boundary
    assert!(outcome.disengaged());
    assert_eq!(outcome.disengaged_by, Some(DisengageCause::Cancelled));
    assert!(outcome.steps > 0);
}

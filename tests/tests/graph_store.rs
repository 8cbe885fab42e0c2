//! Graph store tests driven through walkers: deletion, creation, sweep and
//! snapshots.

use osp_core::GraphError;
use osp_graph::GraphSnapshot;
use osp_tests::prelude::*;

fn schema(reg: &mut AbilityRegistryBuilder) -> Result<(), RegistryError> {
    reg.add_node_type("Person")
        .attr(AttrDef::new("name", "String").required())
        .attr(AttrDef::new("age", "Int").with_default(0i64))
        .done()?;
    reg.add_edge_type("knows")
        .attr(AttrDef::new("since", "Int"))
        .done()?;
    Ok(())
}

mod deletion {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        Scenario::new("deletion")
            .schema(|reg| {
                schema(reg)?;
                reg.add_walker_type("Pruner")
                    .attr(AttrDef::new("victim", "String").required())
                    .done()?;
                reg.add_ability("prune", "Pruner", Trigger::Entry)
                    .guard("Root")
                    .body(ability(|ctx| {
                        let victim = ctx
                            .walker_attr("victim")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string();
                        for (_, node) in ctx.neighbors(Direction::Any, &EdgeFilter::any())? {
                            let name = ctx
                                .graph()
                                .node(node)?
                                .get_attr("name")
                                .and_then(Value::as_str)
                                .map(str::to_string);
                            if name.as_deref() == Some(victim.as_str()) {
                                ctx.delete_node(node)?;
                            }
                        }
                        let left = ctx.neighbors(Direction::Any, &EdgeFilter::any())?;
                        ctx.report(left.len());
                        Ok(())
                    }))
                    .done()?;
                reg.add_ability("vandal", "Pruner", Trigger::Exit)
                    .guard("Root")
                    .body(ability(|ctx| {
                        if ctx.walker_attr("victim") == Some(&Value::from("Root")) {
                            let root = ctx.graph().root();
                            ctx.delete_node(root)?;
                        }
                        Ok(())
                    }))
                    .done()?;
                Ok(())
            })
            .node("ada", "Person", attrs! { "name" => "Ada" })
            .node("bob", "Person", attrs! { "name" => "Bob" })
            .edge("root", "ada", "knows", attrs!())
            .edge("bob", "root", "knows", attrs!())
            .edge("ada", "bob", "knows", attrs!())
    }

    #[test]
    fn test_deleted_node_disappears_from_neighbors() {
        // GIVEN Root with an outgoing edge to Ada and an incoming one from Bob
        let world = scenario().build().unwrap();

        // WHEN a walker deletes Ada
        let outcome = world
            .run("Pruner", attrs! { "victim" => "Ada" }, None)
            .unwrap();

        // THEN the walker saw one neighbor left
        assert_eq!(outcome.reports, vec![Value::Int(1)]);

        // AND no query on a former counterpart references Ada
        let graph = world.graph().read();
        let ada = world.node("ada");
        for node in [graph.root(), world.node("bob")] {
            let neighbors = graph
                .neighbors(node, Direction::Any, &EdgeFilter::any())
                .unwrap();
            assert!(neighbors.iter().all(|n| n.node_id() != ada));
            assert!(neighbors.iter().all(|n| !n.edge.involves(ada)));
        }
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_root_cannot_be_deleted() {
        let world = scenario().build().unwrap();

        let fault = expect_fault(world.run("Pruner", attrs! { "victim" => "Root" }, None));

        let root = world.graph().root();
        assert_eq!(fault.ability, "vandal");
        assert_eq!(
            fault.source,
            AbilityError::Graph(GraphError::RootProtected(root))
        );
        assert_eq!(fault.reports, vec![Value::Int(2)]);
        assert!(world.graph().read().contains_node(root));
    }
}

mod creation {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        Scenario::new("creation").schema(|reg| {
            schema(reg)?;
            reg.add_walker_type("Builder")
                .attr(AttrDef::new("names", "List"))
                .done()?;
            reg.add_ability("build", "Builder", Trigger::Entry)
                .guard("Root")
                .body(ability(|ctx| {
                    let names: Vec<String> = ctx
                        .walker_attr("names")
                        .and_then(Value::as_list)
                        .unwrap_or_default()
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect();
                    let root = ctx.graph().root();
                    let mut previous = None;
                    for name in names {
                        let node = ctx.spawn_node("Person", attrs! { "name" => name })?;
                        match previous {
                            None => ctx.connect(root, node, "knows", attrs! { "since" => 2020i64 })?,
                            Some(prev) => ctx.connect(prev, node, "knows", attrs!())?,
                        };
                        previous = Some(node);
                    }
                    Ok(())
                }))
                .done()?;
            reg.add_ability("orphan", "Builder", Trigger::Exit)
                .guard("Root")
                .body(ability(|ctx| {
                    ctx.spawn_node("Person", attrs! { "name" => "Nobody" })?;
                    Ok(())
                }))
                .done()?;
            reg.add_ability("bad_spawn", "Builder", Trigger::Entry)
                .guard("Person")
                .body(ability(|ctx| {
                    ctx.spawn_node("Person", attrs! { "age" => 3i64 })?;
                    Ok(())
                }))
                .done()?;
            Ok(())
        })
    }

    #[test]
    fn test_walker_builds_chain_with_defaults() {
        // GIVEN a walker carrying three names
        let world = scenario().build().unwrap();
        let names = Value::List(vec!["Ada".into(), "Bob".into(), "Cy".into()]);

        // WHEN it runs at the root
        let outcome = world
            .run("Builder", attrs! { "names" => names }, None)
            .unwrap();
        assert!(outcome.completed());

        // THEN a chain hangs off the root and every Person got its default age
        let graph = world.graph().read();
        let person = world.engine().registry().node_type_id("Person").unwrap();
        assert_eq!(graph.nodes_by_type(person).count(), 4);
        assert!(graph
            .nodes_by_type(person)
            .all(|id| graph.get_node(id).unwrap().get_attr("age") == Some(&Value::Int(0))));

        let first = graph
            .neighbors(graph.root(), Direction::Out, &EdgeFilter::any())
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].node.get_attr("name"), Some(&Value::from("Ada")));
        assert_eq!(first[0].edge.get_attr("since"), Some(&Value::Int(2020)));
    }

    #[test]
    fn test_sweep_removes_orphans_only() {
        // GIVEN a run that leaves one unconnected Person behind
        let world = scenario().build().unwrap();
        let names = Value::List(vec!["Ada".into()]);
        world
            .run("Builder", attrs! { "names" => names }, None)
            .unwrap();
        assert_eq!(world.graph().read().node_count(), 3);

        // WHEN sweeping
        let stats = world.engine().sweep();

        // THEN only the orphan is gone
        assert_eq!(stats.nodes_removed, 1);
        assert_eq!(stats.edges_removed, 0);
        assert_eq!(world.graph().read().node_count(), 2);
    }

    #[test]
    fn test_spawn_with_missing_required_attr_faults() {
        let world = scenario()
            .node("ada", "Person", attrs! { "name" => "Ada" })
            .build()
            .unwrap();

        let fault = expect_fault(world.run("Builder", attrs!(), Some("ada")));

        assert_eq!(fault.ability, "bad_spawn");
        assert_eq!(
            fault.source,
            AbilityError::Registry(RegistryError::missing_required("Person", "name"))
        );
    }
}

mod snapshots {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snapshot_after_run_round_trips() {
        // GIVEN a graph changed by a run
        let world = creation::scenario().build().unwrap();
        let names = Value::List(vec!["Ada".into(), "Bob".into()]);
        world
            .run("Builder", attrs! { "names" => names }, None)
            .unwrap();

        // WHEN snapshotting to JSON and restoring
        let snapshot = world.graph().read().snapshot();
        let json = snapshot.to_json().unwrap();
        let restored = Graph::restore(GraphSnapshot::from_json(&json).unwrap()).unwrap();

        // THEN ids, attributes and adjacency survive
        let original = world.graph().read();
        assert_eq!(restored.node_count(), original.node_count());
        assert_eq!(restored.edge_count(), original.edge_count());
        assert_eq!(restored.root(), original.root());
        for node in original.nodes() {
            let copy = restored.get_node(node.id).unwrap();
            assert_eq!(copy.attributes, node.attributes);
            assert_eq!(copy.outgoing, node.outgoing);
        }
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("nodes").is_some());
    }
}

//! Dispatch tests: ability ordering, guards, skip, disengage and faults.

use osp_tests::prelude::*;

fn name_of(ctx: &AbilityContext<'_>) -> String {
    ctx.here_attr("name")
        .and_then(Value::as_str)
        .unwrap_or("?")
        .to_string()
}

/// Registers a body that reports a fixed label.
fn label(text: &'static str) -> AbilityFn {
    ability(move |ctx| {
        ctx.report(text);
        Ok(())
    })
}

fn base_schema(reg: &mut AbilityRegistryBuilder) -> Result<(), RegistryError> {
    reg.add_node_type("Place")
        .attr(AttrDef::new("name", "String").required())
        .attr(AttrDef::new("visited", "Bool").with_default(false))
        .done()?;
    reg.add_edge_type("link").done()?;
    Ok(())
}

fn three_places(scenario: Scenario) -> Scenario {
    scenario
        .node("a", "Place", attrs! { "name" => "a" })
        .node("b", "Place", attrs! { "name" => "b" })
        .node("c", "Place", attrs! { "name" => "c" })
        .edge("root", "a", "link", attrs!())
        .edge("root", "b", "link", attrs!())
        .edge("root", "c", "link", attrs!())
}

fn fan_out() -> AbilityFn {
    ability(|ctx| {
        ctx.visit_selected(Direction::Out, &EdgeFilter::any())?;
        Ok(())
    })
}

mod ordering {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        let scenario = Scenario::new("ordering").schema(|reg| {
            base_schema(reg)?;
            reg.add_walker_type("Visitor").done()?;
            reg.add_walker_type("Inspector").done()?;
            reg.add_ability("fan_out", "Visitor", Trigger::Entry)
                .guard("Root")
                .body(fan_out())
                .done()?;
            // Registered out of order on purpose.
            reg.add_ability("walker_exit", "Visitor", Trigger::Exit)
                .guard("Place")
                .body(label("walker-exit"))
                .done()?;
            reg.add_ability("place_exit", "Place", Trigger::Exit)
                .guard("Visitor")
                .body(label("place-exit"))
                .done()?;
            reg.add_ability("walker_entry", "Visitor", Trigger::Entry)
                .guard("Place")
                .body(label("walker-entry"))
                .done()?;
            reg.add_ability("place_entry", "Place", Trigger::Entry)
                .guard("Visitor")
                .body(label("place-entry"))
                .done()?;
            reg.add_ability("inspect", "Place", Trigger::Entry)
                .guard("Inspector")
                .body(label("inspected"))
                .done()?;
            Ok(())
        });
        scenario
            .node("a", "Place", attrs! { "name" => "a" })
            .edge("root", "a", "link", attrs!())
    }

    #[test]
    fn test_location_entry_first_and_location_exit_last() {
        let world = scenario().build().unwrap();

        let outcome = world.run("Visitor", attrs!(), None).unwrap();

        assert_eq!(
            outcome.report_strings(),
            vec!["place-entry", "walker-entry", "walker-exit", "place-exit"]
        );
    }

    #[test]
    fn test_guard_selects_walker_type() {
        // GIVEN a Place ability guarded by Inspector only
        let world = scenario().build().unwrap();

        // WHEN an Inspector visits the Place
        let outcome = world.run("Inspector", attrs!(), Some("a")).unwrap();

        // THEN only the Inspector ability fires
        assert_eq!(outcome.report_strings(), vec!["inspected"]);
    }

    #[test]
    fn test_registration_order_within_a_group() {
        let world = Scenario::new("registration_order")
            .schema(|reg| {
                reg.add_walker_type("Echo").done()?;
                for text in ["first", "second", "third"] {
                    reg.add_ability(text, "Echo", Trigger::Entry)
                        .body(label(text))
                        .done()?;
                }
                Ok(())
            })
            .build()
            .unwrap();

        let outcome = world.run("Echo", attrs!(), None).unwrap();

        assert_eq!(outcome.report_strings(), vec!["first", "second", "third"]);
    }
}

mod skip {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        three_places(Scenario::new("skip").schema(|reg| {
            base_schema(reg)?;
            reg.add_walker_type("Skipper").done()?;
            reg.add_ability("fan_out", "Skipper", Trigger::Entry)
                .guard("Root")
                .body(fan_out())
                .done()?;
            reg.add_ability("gate", "Place", Trigger::Entry)
                .body(ability(|ctx| {
                    if name_of(ctx) == "b" {
                        ctx.skip();
                    }
                    Ok(())
                }))
                .done()?;
            reg.add_ability("enter", "Skipper", Trigger::Entry)
                .guard("Place")
                .body(ability(|ctx| {
                    let name = name_of(ctx);
                    ctx.report(name);
                    Ok(())
                }))
                .done()?;
            reg.add_ability("leave", "Skipper", Trigger::Exit)
                .guard("Place")
                .body(ability(|ctx| {
                    let name = name_of(ctx);
                    ctx.report(format!("exit:{}", name));
                    Ok(())
                }))
                .done()?;
            Ok(())
        }))
    }

    #[test]
    fn test_skip_aborts_only_the_current_location() {
        // GIVEN a location ability that skips at b
        let world = scenario().build().unwrap();

        // WHEN running over a, b, c
        let outcome = world.run("Skipper", attrs!(), None).unwrap();

        // THEN b gets neither the walker's entry nor exit, and c still runs
        assert_eq!(
            outcome.report_strings(),
            vec!["a", "exit:a", "c", "exit:c"]
        );
        assert!(outcome.completed());
        assert_eq!(outcome.steps, 4);
    }
}

mod disengage {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scenario(stop_in_exit: bool) -> Scenario {
        three_places(Scenario::new("disengage").schema(move |reg| {
            base_schema(reg)?;
            reg.add_walker_type("Quitter").done()?;
            reg.add_ability("fan_out", "Quitter", Trigger::Entry)
                .guard("Root")
                .body(fan_out())
                .done()?;
            reg.add_ability("enter", "Quitter", Trigger::Entry)
                .guard("Place")
                .body(ability(move |ctx| {
                    let name = name_of(ctx);
                    ctx.set_here_attr("visited", true)?;
                    ctx.report(name.clone());
                    if name == "b" && !stop_in_exit {
                        ctx.disengage();
                        ctx.report("after-disengage");
                    }
                    Ok(())
                }))
                .done()?;
            reg.add_ability("leave", "Quitter", Trigger::Exit)
                .guard("Place")
                .body(ability(move |ctx| {
                    let name = name_of(ctx);
                    ctx.report(format!("exit:{}", name));
                    if name == "b" && stop_in_exit {
                        ctx.disengage();
                    }
                    Ok(())
                }))
                .done()?;
            Ok(())
        }))
    }

    #[test]
    fn test_disengage_in_entry_prevents_exit_and_drops_queue() {
        // GIVEN a walker that disengages on entry at b
        let world = scenario(false).build().unwrap();

        // WHEN running over a, b, c
        let outcome = world.run("Quitter", attrs!(), None).unwrap();

        // THEN b's exit never runs, c is never visited, and the body that
        // disengaged still finished
        assert_eq!(
            outcome.report_strings(),
            vec!["a", "exit:a", "b", "after-disengage"]
        );
        assert_eq!(outcome.state, RunState::Disengaged);
        assert_eq!(outcome.disengaged_by, Some(DisengageCause::Ability));
        assert_eq!(outcome.steps, 3);

        // AND mutations made before disengaging stay committed
        let graph = world.graph().read();
        let visited = |label: &str| {
            graph
                .get_node(world.node(label))
                .and_then(|n| n.get_attr("visited").cloned())
        };
        assert_eq!(visited("b"), Some(Value::Bool(true)));
        assert_eq!(visited("c"), Some(Value::Bool(false)));
    }

    #[test]
    fn test_disengage_in_exit_drops_queue() {
        let world = scenario(true).build().unwrap();

        let outcome = world.run("Quitter", attrs!(), None).unwrap();

        assert_eq!(
            outcome.report_strings(),
            vec!["a", "exit:a", "b", "exit:b"]
        );
        assert!(outcome.disengaged());
    }
}

mod faults {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        three_places(Scenario::new("faults").schema(|reg| {
            base_schema(reg)?;
            reg.add_walker_type("Painter").done()?;
            reg.add_ability("fan_out", "Painter", Trigger::Entry)
                .guard("Root")
                .body(fan_out())
                .done()?;
            reg.add_ability("paint", "Painter", Trigger::Entry)
                .guard("Place")
                .body(ability(|ctx| {
                    let name = name_of(ctx);
                    ctx.set_here_attr("visited", true)?;
                    ctx.report(name.clone());
                    if name == "b" {
                        ctx.set_here_attr("color", "red")?;
                    }
                    Ok(())
                }))
                .done()?;
            Ok(())
        }))
    }

    #[test]
    fn test_fault_aborts_run_with_partial_reports() {
        // GIVEN a walker that writes an undeclared attribute at b
        let world = scenario().build().unwrap();

        // WHEN running
        let fault = expect_fault(world.run("Painter", attrs!(), None));

        // THEN the schema error surfaces verbatim with the reports so far
        assert_eq!(fault.ability, "paint");
        assert_eq!(fault.location, Location::Node(world.node("b")));
        assert_eq!(
            fault.source,
            AbilityError::Registry(RegistryError::unknown_attribute("Place", "color"))
        );
        assert_eq!(report_strings(&fault.reports), vec!["a", "b"]);

        // AND nothing is rolled back
        let graph = world.graph().read();
        let b = graph.get_node(world.node("b")).unwrap();
        assert_eq!(b.get_attr("visited"), Some(&Value::Bool(true)));
        let c = graph.get_node(world.node("c")).unwrap();
        assert_eq!(c.get_attr("visited"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_body_message_is_kept() {
        let world = Scenario::new("message")
            .schema(|reg| {
                reg.add_walker_type("Grumpy").done()?;
                reg.add_ability("refuse", "Grumpy", Trigger::Exit)
                    .body(ability(|_| Err(AbilityError::message("not today"))))
                    .done()?;
                Ok(())
            })
            .build()
            .unwrap();

        let fault = expect_fault(world.run("Grumpy", attrs!(), None));

        assert_eq!(fault.source, AbilityError::message("not today"));
        assert_eq!(fault.location, Location::Node(world.graph().root()));
    }

    #[test]
    fn test_panicking_body_is_reported_as_fault() {
        // GIVEN a body that panics after one report
        let world = three_places(Scenario::new("panics").schema(|reg| {
            base_schema(reg)?;
            reg.add_walker_type("Reckless").done()?;
            reg.add_ability("fan_out", "Reckless", Trigger::Entry)
                .guard("Root")
                .body(fan_out())
                .done()?;
            reg.add_ability("stumble", "Reckless", Trigger::Entry)
                .guard("Place")
                .body(ability(|ctx| {
                    let name = name_of(ctx);
                    ctx.report(name.clone());
                    if name == "b" {
                        panic!("tripped at {name}");
                    }
                    Ok(())
                }))
                .done()?;
            Ok(())
        }))
        .build()
        .unwrap();

        // WHEN running through the engine
        let fault = expect_fault(world.run("Reckless", attrs!(), None));

        // THEN the panic is a fault at b carrying the reports so far
        assert_eq!(fault.ability, "stumble");
        assert_eq!(fault.location, Location::Node(world.node("b")));
        assert_eq!(fault.source, AbilityError::Panicked("tripped at b".to_string()));
        assert_eq!(report_strings(&fault.reports), vec!["a", "b"]);

        // AND the engine still runs walkers afterwards
        let again = expect_fault(world.run("Reckless", attrs!(), None));
        assert_eq!(again.ability, "stumble");
    }
}

mod invoke {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        Scenario::new("invoke").schema(|reg| {
            base_schema(reg)?;
            reg.add_walker_type("Caller").done()?;
            reg.add_ability("call", "Caller", Trigger::Entry)
                .guard("Root")
                .body(ability(|ctx| {
                    ctx.invoke("shout")?;
                    match ctx.invoke("greet") {
                        Err(AbilityError::Registry(RegistryError::TypeMismatch { .. })) => {
                            ctx.report("guard-mismatch");
                            Ok(())
                        }
                        other => other,
                    }
                }))
                .done()?;
            reg.add_ability("shout", "Caller", Trigger::Exit)
                .guard("Root")
                .body(label("shout"))
                .done()?;
            reg.add_ability("greet", "Caller", Trigger::Entry)
                .guard("Place")
                .body(label("greet"))
                .done()?;
            Ok(())
        })
    }

    #[test]
    fn test_direct_invocation_checks_guard() {
        // GIVEN an entry ability that calls one matching and one mismatched ability
        let world = scenario().build().unwrap();

        // WHEN running at the root
        let outcome = world.run("Caller", attrs!(), None).unwrap();

        // THEN the matching one runs twice (direct, then by dispatch) and the
        // mismatched one is refused
        assert_eq!(
            outcome.report_strings(),
            vec!["shout", "guard-mismatch", "shout"]
        );
    }

    #[test]
    fn test_unknown_ability_name_faults() {
        let world = Scenario::new("unknown_invoke")
            .schema(|reg| {
                reg.add_walker_type("Lost").done()?;
                reg.add_ability("call", "Lost", Trigger::Entry)
                    .body(ability(|ctx| ctx.invoke("missing")))
                    .done()?;
                Ok(())
            })
            .build()
            .unwrap();

        let fault = expect_fault(world.run("Lost", attrs!(), None));

        assert_eq!(
            fault.source,
            AbilityError::Registry(RegistryError::unknown_ability("Lost", "missing"))
        );
    }
}

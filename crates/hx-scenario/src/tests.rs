//! Unit tests for hx-scenario.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hx_backend::{LocalWorld, SimBackend};
use hx_core::{ActorId, Location, Transform};

use crate::{HighwayCross, ScenarioConfig};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Defaults with a fixed seed and no real-time pulse hold.
fn test_config() -> ScenarioConfig {
    let mut config = ScenarioConfig::default();
    config.seed = Some(7);
    config.clock.pulse_hold_seconds = 0.0;
    config.traffic.join_timeout_seconds = 5.0;
    config
}

fn spawn_ego(world: &LocalWorld, x: f32, y: f32, autopilot: bool) -> ActorId {
    let ego = world
        .spawn_actor("vehicle.tesla.model3", Transform::at(Location::new(x, y, 0.5)))
        .unwrap();
    if autopilot {
        world.set_autopilot(ego, true, 8000).unwrap();
    }
    ego
}

fn scenario_with(world: &LocalWorld, ego: ActorId, config: ScenarioConfig) -> HighwayCross {
    let backend: Arc<dyn SimBackend> = Arc::new(world.clone());
    HighwayCross::new(backend, ego, config).unwrap()
}

fn wait_until(what: &str, mut pred: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !pred() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        std::thread::sleep(Duration::from_millis(1));
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::ScenarioError;

    #[test]
    fn defaults_match_the_scenario() {
        let c = ScenarioConfig::default();
        assert_eq!(c.traffic.tm_port, 8000);
        assert_eq!(c.traffic.speed_difference, -1000.0);
        assert_eq!(c.traffic.spawn_probability, 0.5);
        assert_eq!(c.traffic.burst_rounds, 24);
        assert_eq!(c.traffic.round_interval_seconds, 5.0);
        assert_eq!(c.lanes.count, 5);
        assert_eq!(c.clock.accelerate_step, 0.05);
        assert_eq!(c.clock.pulse_step, 0.1);
        assert_eq!(c.timeout_seconds, 120.0);
        assert!(!c.tree.traffic_refresh);
        assert!(!c.tree.skip_ahead);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = ScenarioConfig::from_json_str(r#"{ "seed": 3, "tree": { "skip_ahead": true } }"#).unwrap();
        assert_eq!(c.seed, Some(3));
        assert!(c.tree.skip_ahead);
        assert_eq!(c.tree.skip_wait_seconds, 10.0);
        assert_eq!(c.traffic, ScenarioConfig::default().traffic);
        assert_eq!(ScenarioConfig::from_json_str("{}").unwrap(), ScenarioConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ScenarioConfig::from_json_str(r#"{ "traffic": { "spawn_probability": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ScenarioError::Value(_)));

        let err = ScenarioConfig::from_json_str(
            r#"{ "trigger": { "region": { "min_x": 520, "max_x": 500, "min_y": 0, "max_y": 30 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScenarioError::Value(_)));

        let err = ScenarioConfig::from_json_str(r#"{ "timeout_seconds": 0 }"#).unwrap_err();
        assert!(matches!(err, ScenarioError::Config(_)));

        let err = ScenarioConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ScenarioError::Json(_)));
    }

    #[test]
    fn from_path_reads_file() {
        let path = std::env::temp_dir().join(format!("hx-scenario-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "timeout_seconds": 30 }"#).unwrap();
        let c = ScenarioConfig::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(c.timeout_seconds, 30.0);

        let err = ScenarioConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ScenarioError::Io { .. }));
    }

    #[test]
    fn lane_layout_follows_section() {
        let mut c = ScenarioConfig::default();
        c.lanes.count = 3;
        let layout = c.lane_layout();
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.slots()[0].transform.location, Location::new(340.0, 38.5, 0.5));
    }

    #[test]
    fn durations_follow_seconds_fields() {
        let mut c = ScenarioConfig::default();
        assert_eq!(c.clock.pulse_hold(), Duration::from_millis(400));
        assert_eq!(c.join_timeout(), Duration::from_secs(2));
        c.clock.pulse_hold_seconds = -1.0;
        c.traffic.join_timeout_seconds = 1e300;
        assert_eq!(c.clock.pulse_hold(), Duration::ZERO);
        assert_eq!(c.join_timeout(), Duration::MAX);
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod clock_tests {
    use super::*;
    use crate::{ClockController, ClockGuard, RestoreSimulation};
    use hx_core::WorldSettings;
    use hx_tree::{Node, Status, TickContext};

    fn controller(world: &LocalWorld) -> ClockController {
        ClockController::new(Arc::new(world.clone()))
    }

    #[test]
    fn accelerate_and_restore() {
        let world = LocalWorld::default();
        let clock = controller(&world);
        clock.accelerate().unwrap();
        assert_eq!(world.settings().fixed_delta_seconds, 0.05);
        clock.restore().unwrap();
        assert!(world.settings().is_variable());
    }

    #[test]
    fn pulse_holds_step_in_real_time() {
        let world = LocalWorld::default();
        let clock = controller(&world);
        let started = Instant::now();
        clock.pulse().unwrap();
        assert!(started.elapsed() >= Duration::from_millis(400));
        let steps: Vec<f64> = world.settings_history().iter().map(|s| s.fixed_delta_seconds).collect();
        assert_eq!(steps, vec![0.1, 0.0]);
    }

    #[test]
    fn guard_restores_captured_settings() {
        let world = LocalWorld::default();
        world.apply_settings(WorldSettings::fixed(0.2).unwrap()).unwrap();
        let guard = ClockGuard::capture(Arc::new(world.clone()));
        controller(&world).accelerate().unwrap();
        guard.restore().unwrap();
        assert_eq!(world.settings().fixed_delta_seconds, 0.2);
    }

    #[test]
    fn restore_leaf_keeps_running_unless_completing() {
        let world = LocalWorld::default();
        let ctx = TickContext::new(0, world.snapshot(), &world);

        let mut forever = Node::new(RestoreSimulation::new(controller(&world)));
        for _ in 0..3 {
            assert_eq!(forever.tick(&ctx), Status::Running);
        }
        let mut once = Node::new(RestoreSimulation::completing(controller(&world)));
        assert_eq!(once.tick(&ctx), Status::Success);
        assert!(world.settings().is_variable());
    }
}

// ── Phase ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod phase_tests {
    use crate::{PhaseTracker, ScenarioError, ScenarioState};

    #[test]
    fn forward_only() {
        let phase = PhaseTracker::new();
        assert_eq!(phase.current(), ScenarioState::Initializing);
        assert!(phase.advance(ScenarioState::TrafficActive).unwrap());
        assert!(!phase.advance(ScenarioState::TrafficActive).unwrap());
        assert!(phase.advance(ScenarioState::CleaningUp).unwrap());

        let err = phase.advance(ScenarioState::WaitingForTrigger).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidTransition {
            from: ScenarioState::CleaningUp,
            to:   ScenarioState::WaitingForTrigger,
        }));
        assert_eq!(phase.current(), ScenarioState::CleaningUp);
        assert_eq!(phase.history(), vec![
            ScenarioState::Initializing,
            ScenarioState::TrafficActive,
            ScenarioState::CleaningUp,
        ]);
    }
}

// ── Cleanup ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cleanup_tests {
    use super::*;
    use crate::{Cleanup, CleanupReport, ClockGuard, PhaseTracker, ScenarioState};
    use hx_backend::Command;
    use hx_traffic::ActorRegistry;

    fn cleanup_for(world: &LocalWorld, registry: &Arc<ActorRegistry>) -> (Cleanup, Arc<PhaseTracker>) {
        let backend: Arc<dyn SimBackend> = Arc::new(world.clone());
        let phase = Arc::new(PhaseTracker::new());
        let cleanup = Cleanup::new(
            Arc::clone(&backend),
            Arc::clone(registry),
            ClockGuard::capture(backend),
            Arc::clone(&phase),
            Duration::from_secs(1),
        );
        (cleanup, phase)
    }

    #[test]
    fn destroys_each_registered_actor_once() {
        let world = LocalWorld::default();
        let registry = Arc::new(ActorRegistry::new());
        let ids: Vec<ActorId> = (0..3)
            .map(|i| world.spawn_actor("vehicle.audi.a2", Transform::at(Location::new(i as f32 * 10.0, 0.0, 0.5))).unwrap())
            .collect();
        registry.extend(ids.iter().copied());
        // One actor already gone: a stale id.
        world.apply_batch_sync(vec![Command::DestroyActor(ids[1])], false);
        let batches_before = world.batches().len();

        let (cleanup, phase) = cleanup_for(&world, &registry);
        let report = cleanup.run();
        assert_eq!(report.destroyed, 2);
        assert_eq!(report.stale, 1);
        assert!(report.clock_restored);
        assert_eq!(world.actor_count(), 0);
        assert_eq!(phase.current(), ScenarioState::Done);

        let batches = world.batches();
        assert_eq!(batches.len(), batches_before + 1);
        assert_eq!(batches.last().unwrap().commands, Command::destroy_all(&ids));

        // Second run issues nothing.
        assert_eq!(cleanup.run(), CleanupReport::default());
        assert_eq!(world.batches().len(), batches_before + 1);
        assert_eq!(cleanup.report(), Some(report));
    }

    #[test]
    fn empty_registry_issues_no_commands() {
        let world = LocalWorld::default();
        let registry = Arc::new(ActorRegistry::new());
        let (cleanup, _) = cleanup_for(&world, &registry);
        let report = cleanup.run();
        assert_eq!(report.destroyed + report.stale, 0);
        assert!(world.batches().is_empty());
        assert!(registry.is_sealed());
    }
}

// ── Topology ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod topology_tests {
    use super::*;
    use crate::config::TreeSection;
    use crate::{topology, ClockController};
    use hx_core::{Region, SpawnRng};
    use hx_traffic::{ActorRegistry, LaneLayout, SpawnerConfig, TrafficSpawner};
    use hx_tree::{Node, ParallelPolicy, Status, TickContext};

    #[test]
    fn refresh_sequence_shape() {
        let world = LocalWorld::default();
        let backend: Arc<dyn SimBackend> = Arc::new(world.clone());
        let spawner = TrafficSpawner::new(backend, LaneLayout::default(), Arc::new(ActorRegistry::new()), SpawnerConfig::default())
            .unwrap();
        let seq = topology::traffic_refresh_sequence(&spawner, &mut SpawnRng::new(1), &TreeSection::default());
        let names: Vec<&str> = seq.children().iter().map(Node::name).collect();
        assert_eq!(names.len(), 11);
        for pair in names[..10].chunks(2) {
            assert_eq!(pair[0], "TrafficBehavior");
            assert_eq!(pair[1], "Timeout(5s)");
        }
        assert_eq!(names[10], "Timeout(20s)");
    }

    #[test]
    fn skip_sequence_accelerates_then_stalls() {
        let world = LocalWorld::default();
        let clock = ClockController::new(Arc::new(world.clone()));
        let mut node = Node::new(topology::skip_ahead_sequence(&clock, &TreeSection::default()));

        let ctx = |t: u64, secs: f64| TickContext::new(t, hx_core::WorldSnapshot { frame: t, elapsed_seconds: secs, delta_seconds: 0.05 }, &world);
        assert_eq!(node.tick(&ctx(0, 0.0)), Status::Running);
        assert_eq!(world.settings().fixed_delta_seconds, 0.05);
        assert_eq!(node.tick(&ctx(1, 10.0)), Status::Running);
        assert!(world.settings().is_variable());
        assert_eq!(node.tick(&ctx(2, 500.0)), Status::Running);
    }

    #[test]
    fn end_condition_races_trigger_and_branches() {
        let region = Region::new(500.0, 520.0, 0.0, 30.0).unwrap();
        let race = topology::end_condition(ActorId(0), region, vec![Node::new(hx_tree::Timeout::new(1.0))]);
        assert_eq!(race.policy(), ParallelPolicy::SuccessOnOne);
        let names: Vec<&str> = race.children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["InTriggerRegion", "Timeout(1s)"]);
    }
}

// ── Scenario + runner ─────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;
    use crate::{NoopObserver, ScenarioObserver, ScenarioOutcome, ScenarioReport, ScenarioRunner, ScenarioState};
    use hx_core::WorldSnapshot;
    use hx_tree::{Status, Verdict};

    #[derive(Default)]
    struct CountingObserver {
        started: bool,
        ticks:   u64,
        ended:   bool,
    }

    impl ScenarioObserver for CountingObserver {
        fn on_start(&mut self, _snapshot: &WorldSnapshot) {
            self.started = true;
        }

        fn on_tick_end(&mut self, _tick: u64, _snapshot: &WorldSnapshot, _status: Status) {
            self.ticks += 1;
        }

        fn on_end(&mut self, _report: &ScenarioReport) {
            self.ended = true;
        }
    }

    #[test]
    fn setup_biases_traffic_manager_and_pulses_clock() {
        let world = LocalWorld::default();
        let ego = spawn_ego(&world, 300.0, 15.0, false);
        let scenario = scenario_with(&world, ego, test_config());
        assert_eq!(world.speed_difference(8000), Some(-1000.0));
        let steps: Vec<f64> = world.settings_history().iter().map(|s| s.fixed_delta_seconds).collect();
        assert_eq!(&steps[..2], &[0.1, 0.0]);
        assert_eq!(scenario.phase().current(), ScenarioState::TrafficActive);
        assert_eq!(scenario.create_test_criteria().len(), 1);
    }

    #[test]
    fn ego_reaching_region_passes_and_cleans_up() {
        let world = LocalWorld::default();
        let ego = spawn_ego(&world, 300.0, 15.0, true);
        let mut scenario = scenario_with(&world, ego, test_config());
        let mut observer = CountingObserver::default();

        let report = ScenarioRunner::new().run(&mut scenario, &mut observer);

        assert_eq!(report.outcome, ScenarioOutcome::Passed);
        assert_eq!(report.tree_status, Status::Success);
        assert_eq!(report.criteria[0].verdict, Verdict::Success);
        assert_eq!(report.final_state, ScenarioState::Done);
        assert!(observer.started && observer.ended);
        assert_eq!(observer.ticks, report.ticks);

        let ego_x = world.actor_transform(ego).unwrap().location.x;
        assert!((500.0..=520.0).contains(&ego_x));

        // Only the ego survives cleanup.
        assert_eq!(world.actor_ids(), vec![ego]);
        assert!(scenario.registry().is_sealed());
        assert!(world.settings().is_variable());
        assert_eq!(scenario.phase().history(), vec![
            ScenarioState::Initializing,
            ScenarioState::TrafficActive,
            ScenarioState::WaitingForTrigger,
            ScenarioState::CleaningUp,
            ScenarioState::Done,
        ]);
    }

    #[test]
    fn stationary_ego_times_out() {
        let world = LocalWorld::default();
        let ego = spawn_ego(&world, 300.0, 15.0, false);
        let mut config = test_config();
        config.timeout_seconds = 2.0;
        let mut scenario = scenario_with(&world, ego, config);

        let report = ScenarioRunner::new().run(&mut scenario, &mut NoopObserver);

        assert_eq!(report.outcome, ScenarioOutcome::TimedOut);
        assert_eq!(report.tree_status, Status::Invalid);
        assert!(report.sim_seconds >= 2.0);
        assert_eq!(report.final_state, ScenarioState::Done);
        assert_eq!(world.actor_ids(), vec![ego]);
    }

    #[test]
    fn clock_ends_variable_whichever_way_the_run_ends() {
        use hx_core::WorldSettings;

        for autopilot in [true, false] {
            let world = LocalWorld::default();
            world.apply_settings(WorldSettings::fixed(0.2).unwrap()).unwrap();
            let ego = spawn_ego(&world, 300.0, 15.0, autopilot);
            let mut config = test_config();
            config.timeout_seconds = if autopilot { 120.0 } else { 2.0 };
            let mut scenario = scenario_with(&world, ego, config);

            let report = ScenarioRunner::new().run(&mut scenario, &mut NoopObserver);

            let expected = if autopilot { ScenarioOutcome::Passed } else { ScenarioOutcome::TimedOut };
            assert_eq!(report.outcome, expected);
            assert!(report.cleanup.clock_restored);
            assert!(world.settings().is_variable(), "autopilot={autopilot}");
            let history = world.settings_history();
            assert_eq!(history.last(), Some(&WorldSettings::VARIABLE));
            // The captured fixed step was put back before the final switch.
            assert_eq!(history[history.len() - 2].fixed_delta_seconds, 0.2);
        }
    }

    #[test]
    fn collision_fails_the_run() {
        let world = LocalWorld::default();
        let ego = spawn_ego(&world, 300.0, 15.0, true);
        world.spawn_actor("vehicle.audi.a2", Transform::at(Location::new(400.0, 15.0, 0.5))).unwrap();
        let mut scenario = scenario_with(&world, ego, test_config());

        let report = ScenarioRunner::new().run(&mut scenario, &mut NoopObserver);

        assert_eq!(report.outcome, ScenarioOutcome::Failed { criteria: vec!["CollisionTest".to_string()] });
        assert!(report.criteria[0].actual >= 1.0);
    }

    #[test]
    fn optional_branches_run_when_enabled() {
        let world = LocalWorld::default();
        let ego = spawn_ego(&world, 300.0, 15.0, true);
        let mut config = test_config();
        config.tree.traffic_refresh = true;
        config.tree.skip_ahead = true;
        let mut scenario = scenario_with(&world, ego, config);

        let report = ScenarioRunner::new().run(&mut scenario, &mut NoopObserver);

        assert_eq!(report.outcome, ScenarioOutcome::Passed);
        let steps: Vec<f64> = world.settings_history().iter().map(|s| s.fixed_delta_seconds).collect();
        assert!(steps.contains(&0.05));
        assert!(world.settings().is_variable());
        assert_eq!(world.actor_ids(), vec![ego]);
    }

    #[test]
    fn drop_removes_spawned_and_other_actors() {
        let world = LocalWorld::default();
        let ego = spawn_ego(&world, 300.0, 15.0, false);
        let prop = world.spawn_actor("vehicle.audi.a2", Transform::at(Location::new(0.0, 0.0, 0.5))).unwrap();
        let mut config = test_config();
        config.traffic.spawn_probability = 1.0;

        let mut scenario = scenario_with(&world, ego, config);
        scenario.register_other_actor(prop);
        let registry = Arc::clone(scenario.registry());
        wait_until("first burst round", || registry.len() == 5);
        assert_eq!(world.actor_count(), 7);

        drop(scenario);

        assert_eq!(world.actor_ids(), vec![ego]);
        assert!(registry.is_sealed());
    }
}

//! Unit tests for hx-backend.

use hx_core::{Location, Rotation, Transform, WorldSettings};

use crate::{
    ActorRef, BackendError, Blueprint, BlueprintLibrary, Command, CommandError, LocalWorld, LocalWorldConfig,
    SimBackend, SpawnActor,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn at(x: f32, y: f32) -> Transform {
    Transform::at(Location::new(x, y, 0.5))
}

fn car() -> Blueprint {
    Blueprint::vehicle("vehicle.audi.a2", 4)
}

// ── Blueprints ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod blueprint_tests {
    use super::*;

    fn ids(pattern: &str) -> Vec<String> {
        BlueprintLibrary::stock().filter(pattern).unwrap().into_iter().map(|bp| bp.id).collect()
    }

    #[test]
    fn pattern_semantics() {
        assert_eq!(ids("vehicle.?udi.*"), vec!["vehicle.audi.a2"]);
        assert_eq!(ids("*.a2"), vec!["vehicle.audi.a2"]);
        assert_eq!(ids("vehicle.[kt]*"), vec!["vehicle.tesla.model3", "vehicle.kawasaki.ninja"]);
        assert_eq!(ids("*").len(), BlueprintLibrary::stock().len());
        assert!(ids("vehicle.audi").is_empty());
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = BlueprintLibrary::stock().filter("vehicle.[").unwrap_err();
        assert!(matches!(err, BackendError::InvalidPattern { ref pattern, .. } if pattern == "vehicle.["));
    }

    #[test]
    fn stock_filter_keeps_catalogue_order() {
        let vehicles = BlueprintLibrary::stock().filter("vehicle.*").unwrap();
        assert_eq!(vehicles.len(), 8);
        assert_eq!(vehicles[0].id, "vehicle.audi.a2");
        assert!(vehicles.iter().all(|bp| bp.id.starts_with("vehicle.")));
    }

    #[test]
    fn number_of_wheels_parsing() {
        assert_eq!(car().number_of_wheels(), Some(4));
        assert_eq!(Blueprint::new("x").number_of_wheels(), None);
        let junk = Blueprint::new("x").with_attribute("number_of_wheels", "four");
        assert_eq!(junk.number_of_wheels(), None);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod command_tests {
    use super::*;

    #[test]
    fn spawn_with_autopilot_chains_future_actor() {
        let cmd = Command::spawn_with_autopilot(car(), at(1.0, 2.0), 8000);
        let Command::Spawn(spawn) = cmd else { panic!("wrong variant") };
        assert_eq!(spawn.then, vec![Command::SetAutopilot {
            actor:   ActorRef::Future,
            enabled: true,
            tm_port: 8000,
        }]);
    }

    #[test]
    fn destroy_all_preserves_order() {
        let ids = [hx_core::ActorId(3), hx_core::ActorId(1)];
        let cmds = Command::destroy_all(&ids);
        assert_eq!(cmds, vec![
            Command::DestroyActor(hx_core::ActorId(3)),
            Command::DestroyActor(hx_core::ActorId(1)),
        ]);
    }
}

// ── LocalWorld ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod local_world_tests {
    use super::*;

    #[test]
    fn sync_batch_answers_in_order() {
        let world = LocalWorld::default();
        let batch = vec![
            Command::spawn_with_autopilot(car(), at(0.0, 0.0), 8000),
            Command::spawn_with_autopilot(Blueprint::new("vehicle.nope"), at(10.0, 0.0), 8000),
            Command::spawn_with_autopilot(car(), at(20.0, 0.0), 8000),
        ];
        let responses = world.apply_batch_sync(batch, false);
        assert_eq!(responses.len(), 3);
        assert!(responses[0].is_ok());
        assert_eq!(
            responses[1],
            Err(CommandError::UnknownBlueprint("vehicle.nope".into()))
        );
        assert!(responses[2].is_ok());
        assert_eq!(world.actor_count(), 2);
        let a = *responses[0].as_ref().unwrap();
        assert_eq!(world.autopilot_port(a), Some(8000));
    }

    #[test]
    fn overlapping_spawn_is_rejected() {
        let world = LocalWorld::default();
        world.spawn_actor("vehicle.audi.a2", at(0.0, 0.0)).unwrap();
        let err = world.spawn_actor("vehicle.audi.a2", at(1.0, 0.0)).unwrap_err();
        assert!(matches!(err, CommandError::SpawnCollision { .. }));
        assert_eq!(world.actor_count(), 1);
    }

    #[test]
    fn failed_follow_up_rolls_back_spawn() {
        let world = LocalWorld::default();
        let responses = world.apply_batch_sync(
            vec![Command::spawn_with_autopilot(car(), at(0.0, 0.0), 9999)],
            false,
        );
        assert_eq!(responses, vec![Err(CommandError::UnknownTrafficManager(9999))]);
        assert_eq!(world.actor_count(), 0);
    }

    #[test]
    fn future_actor_outside_spawn_chain_fails() {
        let world = LocalWorld::default();
        let responses = world.apply_batch_sync(
            vec![Command::SetAutopilot { actor: ActorRef::Future, enabled: true, tm_port: 8000 }],
            false,
        );
        assert_eq!(responses, vec![Err(CommandError::UnresolvedFutureActor)]);
    }

    #[test]
    fn destroying_stale_actor_reports_not_found() {
        let world = LocalWorld::default();
        let id = world.spawn_actor("vehicle.audi.a2", at(0.0, 0.0)).unwrap();
        let responses = world.apply_batch_sync(Command::destroy_all(&[id, id]), false);
        assert_eq!(responses[0], Ok(id));
        assert_eq!(responses[1], Err(CommandError::ActorNotFound(id)));
        assert!(!world.is_alive(id));
    }

    #[test]
    fn fire_and_forget_batch_is_recorded() {
        let world = LocalWorld::default();
        let id = world.spawn_actor("vehicle.audi.a2", at(0.0, 0.0)).unwrap();
        world.apply_batch(Command::destroy_all(&[id]));
        let batches = world.batches();
        assert_eq!(batches.len(), 1);
        assert!(!batches[0].synchronous);
        assert_eq!(world.actor_count(), 0);
    }

    #[test]
    fn tick_uses_fixed_step_when_set() {
        let world = LocalWorld::default();
        let s0 = world.tick();
        assert!((s0.delta_seconds - 0.05).abs() < 1e-12);
        world.apply_settings(WorldSettings::fixed(0.1).unwrap()).unwrap();
        let s1 = world.tick();
        assert!((s1.delta_seconds - 0.1).abs() < 1e-12);
        assert!((s1.elapsed_seconds - 0.15).abs() < 1e-9);
        assert_eq!(s1.frame, 2);
        assert_eq!(world.settings_history(), vec![WorldSettings { fixed_delta_seconds: 0.1 }]);
    }

    #[test]
    fn negative_step_is_rejected() {
        let world = LocalWorld::default();
        assert!(world.apply_settings(WorldSettings { fixed_delta_seconds: -1.0 }).is_err());
        assert!(world.settings_history().is_empty());
    }

    #[test]
    fn snapshot_is_static_unless_free_running() {
        let world = LocalWorld::default();
        assert_eq!(world.snapshot().elapsed_seconds, 0.0);
        assert_eq!(world.snapshot().elapsed_seconds, 0.0);

        let free = LocalWorld::new(LocalWorldConfig {
            free_running_step: Some(1.0),
            ..LocalWorldConfig::default()
        });
        assert_eq!(free.snapshot().elapsed_seconds, 1.0);
        assert_eq!(free.snapshot().elapsed_seconds, 2.0);
    }

    #[test]
    fn autopilot_moves_along_heading_with_speed_bias() {
        let world = LocalWorld::default();
        world.apply_settings(WorldSettings::fixed(1.0).unwrap()).unwrap();
        let id = world.spawn_actor("vehicle.audi.a2", at(0.0, 0.0)).unwrap();
        world.set_autopilot(id, true, 8000).unwrap();

        world.tick();
        let x1 = world.actor_transform(id).unwrap().location.x;
        assert!((x1 - 20.0).abs() < 1e-3, "cruise speed, got {x1}");

        let tm = world.traffic_manager(8000).unwrap();
        tm.set_global_percentage_speed_difference(-1000.0);
        world.tick();
        let x2 = world.actor_transform(id).unwrap().location.x;
        assert!((x2 - x1 - 40.0).abs() < 1e-3, "capped at max speed, got {}", x2 - x1);
        assert_eq!(world.speed_difference(8000), Some(-1000.0));
    }

    #[test]
    fn unknown_traffic_manager_port() {
        let world = LocalWorld::default();
        assert!(world.traffic_manager(1234).is_err());
        assert_eq!(world.traffic_manager(8000).unwrap().port(), 8000);
    }

    #[test]
    fn collisions_are_edge_triggered() {
        let world = LocalWorld::default();
        world.apply_settings(WorldSettings::fixed(0.1).unwrap()).unwrap();
        let ego = world.spawn_actor("vehicle.audi.a2", at(0.0, 0.0)).unwrap();
        let other = world.spawn_actor("vehicle.tesla.model3", at(10.0, 0.0)).unwrap();

        // Drive `other` backwards into the stationary ego.
        let facing_back = Transform::new(Location::new(10.0, 0.0, 0.5), Rotation { yaw: 180.0, ..Rotation::default() });
        world.set_transform(other, facing_back).unwrap();
        world.set_autopilot(other, true, 8000).unwrap();
        for _ in 0..6 {
            world.tick();
        }
        assert_eq!(world.collision_count(ego), 1);
        assert_eq!(world.collision_count(other), 1);

        // Still in contact / passing through: no new events until separated.
        world.tick();
        assert_eq!(world.collision_count(ego), 1);
    }

    #[test]
    fn spawn_struct_then_builder() {
        let spawn = SpawnActor::new(car(), at(0.0, 0.0)).then(Command::DestroyActor(hx_core::ActorId(1)));
        assert_eq!(spawn.then.len(), 1);
        assert!(Command::from(spawn).is_spawn());
    }
}

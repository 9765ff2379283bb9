//! Unit tests for fleet-adapter.

#[cfg(test)]
mod stop_tests {
    use crate::StopState;

    #[test]
    fn flags_combine_and_intersect() {
        let parked = StopState::STOPPED | StopState::PARKING | StopState::PARKING_AREA;
        assert!(parked.is_stopped());
        assert!(parked.intersects(StopState::PARKING_AREA | StopState::CONTAINER_STOP));
        assert!(!parked.intersects(StopState::BUS_STOP));
        assert!(parked.contains(StopState::STOPPED | StopState::PARKING));
        assert!(!parked.contains(StopState::STOPPED | StopState::BUS_STOP));
        assert_eq!(parked.bits(), 1 + 2 + 128);
    }

    #[test]
    fn none_is_not_stopped() {
        assert!(!StopState::NONE.is_stopped());
        assert!(!StopState::NONE.intersects(StopState(u32::MAX)));
    }
}

#[cfg(test)]
mod error_tests {
    use crate::AdapterError;
    use fleet_core::VehicleId;

    #[test]
    fn only_connection_failures_are_fatal() {
        assert!(AdapterError::Disconnected.is_fatal());
        assert!(AdapterError::Connection("reset".into()).is_fatal());
        assert!(!AdapterError::UnknownVehicle(VehicleId::new("trk1")).is_fatal());
        assert!(!AdapterError::rejected("move_to", "trk1", "bad lane").is_fatal());
    }

    #[test]
    fn rejected_message_names_command_and_subject() {
        let err = AdapterError::rejected("move_to", "trk1", "bad lane");
        assert_eq!(err.to_string(), "move_to rejected for trk1: bad lane");
    }
}

#[cfg(test)]
mod scripted_tests {
    use fleet_core::{EdgeId, LaneId, ResourceId, VehicleId};

    use crate::{
        AdapterError, ResourceKind, ScriptedSimulator, SimCommand, SimulatorAdapter, StopState,
        VehicleSpec,
    };

    fn vid(s: &str) -> VehicleId {
        VehicleId::new(s)
    }

    /// Two 100 m edges at 10 m/s, a two-slot parking area on `b`.
    fn corridor() -> ScriptedSimulator {
        ScriptedSimulator::new(1.0)
            .with_edge("a", 100.0, 10.0)
            .with_edge("b", 100.0, 10.0)
            .with_edge("exit", 100.0, 10.0)
            .with_resource("P1", "b", ResourceKind::ParkingArea, Some(2))
            .with_resource("S1", "b", ResourceKind::LoadingBay, None)
    }

    fn connected(mut sim: ScriptedSimulator) -> ScriptedSimulator {
        sim.connect().unwrap();
        sim
    }

    fn run(sim: &mut ScriptedSimulator, steps: u64) {
        for _ in 0..steps {
            sim.step().unwrap();
        }
    }

    #[test]
    fn step_requires_connection() {
        let mut sim = corridor();
        assert!(matches!(sim.step(), Err(AdapterError::Disconnected)));
        sim.connect().unwrap();
        sim.step().unwrap();
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn close_is_idempotent_and_final() {
        let mut sim = connected(corridor());
        sim.close().unwrap();
        sim.close().unwrap();
        assert!(!sim.is_connected());
        assert!(matches!(sim.connect(), Err(AdapterError::Connection(_))));
        assert!(matches!(sim.vehicle_ids(), Err(AdapterError::Disconnected)));
    }

    #[test]
    fn vehicle_departs_drives_and_leaves() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("v", ["a", "b"])));
        assert!(sim.vehicle_ids().unwrap().is_empty());

        sim.step().unwrap();
        assert_eq!(sim.vehicle_ids().unwrap(), vec![vid("v")]);
        assert_eq!(sim.road_id(&vid("v")).unwrap(), EdgeId::new("a"));
        assert_eq!(sim.edges_ahead(&vid("v")).unwrap(), 1);

        run(&mut sim, 10);
        assert_eq!(sim.road_id(&vid("v")).unwrap(), EdgeId::new("b"));
        assert_eq!(sim.lane_id(&vid("v")).unwrap(), LaneId::new("b_0"));
        assert_eq!(sim.edges_ahead(&vid("v")).unwrap(), 0);
        assert!((sim.distance(&vid("v")).unwrap() - 100.0).abs() < 1e-9);

        run(&mut sim, 10);
        assert!(sim.has_left("v"));
        assert!(sim.vehicle_ids().unwrap().is_empty());
        assert!(matches!(
            sim.speed(&vid("v")),
            Err(AdapterError::UnknownVehicle(_))
        ));
    }

    #[test]
    fn scheduled_departure_is_respected() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("late", ["a"]).departing_at(5)));
        run(&mut sim, 4);
        assert!(sim.vehicle_ids().unwrap().is_empty());
        sim.step().unwrap();
        assert_eq!(sim.vehicle_ids().unwrap().len(), 1);
    }

    #[test]
    fn resource_stop_occupies_slot_for_duration() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("v", ["a"])));
        let v = vid("v");
        sim.step().unwrap();
        sim.change_target(&v, &EdgeId::new("b")).unwrap();
        sim.set_resource_stop(&v, &ResourceId::new("P1"), 5.0).unwrap();
        assert_eq!(sim.pending_stop("v"), Some(&ResourceId::new("P1")));

        // 100 m to the end of `a`, then 50 m to the halting point on `b`.
        run(&mut sim, 15);
        let state = sim.stop_state(&v).unwrap();
        assert!(state.is_stopped());
        assert!(state.intersects(StopState::PARKING_AREA));
        assert_eq!(sim.resource_occupancy(&ResourceId::new("P1")).unwrap(), 1);
        assert_eq!(sim.speed(&v).unwrap(), 0.0);

        run(&mut sim, 5);
        assert_eq!(sim.stop_state(&v).unwrap(), StopState::NONE);
        assert_eq!(sim.resource_occupancy(&ResourceId::new("P1")).unwrap(), 0);
        assert!(sim.vehicle_ids().unwrap().contains(&v));
    }

    #[test]
    fn loading_bay_reports_container_stop() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("v", ["b"])));
        let v = vid("v");
        sim.step().unwrap();
        sim.set_resource_stop(&v, &ResourceId::new("S1"), 10.0).unwrap();
        run(&mut sim, 6);
        let state = sim.stop_state(&v).unwrap();
        assert!(state.contains(StopState::STOPPED | StopState::CONTAINER_STOP));
        assert!(!state.intersects(StopState::PARKING_AREA));
        assert_eq!(sim.resource_capacity(&ResourceId::new("S1")).unwrap(), None);
    }

    #[test]
    fn full_resource_makes_vehicle_queue() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("v", ["b"])));
        sim.set_background_occupancy("P1", 2);
        let v = vid("v");
        sim.step().unwrap();
        sim.set_resource_stop(&v, &ResourceId::new("P1"), 5.0).unwrap();
        run(&mut sim, 20);
        assert_eq!(sim.speed(&v).unwrap(), 0.0);
        assert!(!sim.stop_state(&v).unwrap().is_stopped());
        assert!(sim.accumulated_waiting_time(&v).unwrap() > 10.0);

        sim.set_background_occupancy("P1", 1);
        sim.step().unwrap();
        assert!(sim.stop_state(&v).unwrap().is_stopped());
        assert_eq!(sim.resource_occupancy(&ResourceId::new("P1")).unwrap(), 2);
    }

    #[test]
    fn stop_off_route_is_rejected() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("v", ["a"])));
        let v = vid("v");
        sim.step().unwrap();
        let err = sim.set_resource_stop(&v, &ResourceId::new("P1"), 5.0).unwrap_err();
        assert!(matches!(err, AdapterError::Rejected { command: "set_resource_stop", .. }));
        assert!(matches!(
            sim.set_resource_stop(&v, &ResourceId::new("nope"), 5.0),
            Err(AdapterError::UnknownResource(_))
        ));
    }

    #[test]
    fn clear_stop_drops_pending_stop() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("v", ["b"])));
        let v = vid("v");
        sim.step().unwrap();
        sim.set_resource_stop(&v, &ResourceId::new("P1"), 5.0).unwrap();
        sim.clear_stop(&v).unwrap();
        assert_eq!(sim.pending_stop("v"), None);
        run(&mut sim, 6);
        assert!(!sim.stop_state(&v).unwrap().is_stopped());
    }

    #[test]
    fn change_target_rejects_unknown_edge() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("v", ["a"])));
        sim.step().unwrap();
        assert!(matches!(
            sim.change_target(&vid("v"), &EdgeId::new("nowhere")),
            Err(AdapterError::UnknownEdge(_))
        ));
        sim.change_target(&vid("v"), &EdgeId::new("exit")).unwrap();
        assert_eq!(
            sim.route(&vid("v")).unwrap(),
            vec![EdgeId::new("a"), EdgeId::new("exit")]
        );
    }

    #[test]
    fn held_vehicle_stands_still_and_accumulates_waiting() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("bg", ["a", "b"])));
        sim.step().unwrap();
        assert!(sim.hold("bg"));
        run(&mut sim, 5);
        assert_eq!(sim.speed(&vid("bg")).unwrap(), 0.0);
        assert_eq!(sim.accumulated_waiting_time(&vid("bg")).unwrap(), 5.0);
        assert!(sim.release("bg"));
        sim.step().unwrap();
        assert!(sim.speed(&vid("bg")).unwrap() > 0.0);
    }

    #[test]
    fn move_to_validates_lane_and_position() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("bg", ["a", "b"])));
        let bg = vid("bg");
        sim.step().unwrap();
        let lane = sim.lane_id(&bg).unwrap();
        assert_eq!(sim.lane_length(&lane).unwrap(), 100.0);

        sim.move_to(&bg, &lane, 42.0).unwrap();
        assert_eq!(sim.lane_position(&bg).unwrap(), 42.0);

        assert!(matches!(
            sim.move_to(&bg, &lane, 150.0),
            Err(AdapterError::Rejected { command: "move_to", .. })
        ));
        assert!(matches!(
            sim.move_to(&bg, &LaneId::new("b_0"), 10.0),
            Err(AdapterError::Rejected { .. })
        ));
        assert!(matches!(
            sim.lane_length(&LaneId::new("zzz")),
            Err(AdapterError::UnknownLane(_))
        ));
        assert_eq!(
            sim.commands().last(),
            Some(&SimCommand::MoveTo {
                vehicle:  bg,
                lane,
                position: 42.0,
            })
        );
    }

    #[test]
    fn speed_factor_scales_motion() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("v", ["a", "b"])));
        let v = vid("v");
        sim.step().unwrap();
        sim.set_speed_factor(&v, 0.5).unwrap();
        sim.step().unwrap();
        assert!((sim.speed(&v).unwrap() - 5.0).abs() < 1e-9);
        assert!(sim.set_speed_factor(&v, 0.0).is_err());
        assert_eq!(sim.speed_factor(&v).unwrap(), 0.5);
    }

    #[test]
    fn edge_speed_limit_can_be_changed() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("v", ["a"])));
        let a = EdgeId::new("a");
        sim.set_edge_max_speed(&a, 3.0).unwrap();
        assert_eq!(sim.edge_max_speed(&a).unwrap(), 3.0);
        run(&mut sim, 2);
        assert!((sim.speed(&vid("v")).unwrap() - 3.0).abs() < 1e-9);
        assert!(matches!(
            sim.set_edge_max_speed(&EdgeId::new("nope"), 1.0),
            Err(AdapterError::UnknownEdge(_))
        ));
    }

    #[test]
    fn poisoned_vehicle_queries_fail_but_others_work() {
        let mut sim = connected(
            corridor()
                .with_vehicle(VehicleSpec::new("bad", ["a"]))
                .with_vehicle(VehicleSpec::new("good", ["a"])),
        );
        sim.poison("bad");
        sim.step().unwrap();
        assert!(matches!(sim.speed(&vid("bad")), Err(AdapterError::Rejected { .. })));
        assert!(sim.speed(&vid("good")).is_ok());
        assert_eq!(sim.vehicle_ids().unwrap().len(), 2);
        sim.cure("bad");
        assert!(sim.speed(&vid("bad")).is_ok());
    }

    #[test]
    fn failing_step_disconnects() {
        let mut sim = connected(corridor());
        sim.fail_step_at(3);
        run(&mut sim, 3);
        let err = sim.step().unwrap_err();
        assert!(err.is_fatal());
        assert!(!sim.is_connected());
    }

    #[test]
    fn emissions_are_zero_while_parked() {
        let mut sim = connected(corridor().with_vehicle(VehicleSpec::new("v", ["b"])));
        let v = vid("v");
        sim.step().unwrap();
        sim.set_resource_stop(&v, &ResourceId::new("P1"), 30.0).unwrap();
        sim.step().unwrap();
        assert!(sim.co2_emission(&v).unwrap() > 0.0);
        assert!(sim.nox_emission(&v).unwrap() > 0.0);
        run(&mut sim, 8);
        assert!(sim.stop_state(&v).unwrap().is_stopped());
        assert_eq!(sim.co2_emission(&v).unwrap(), 0.0);
    }

    #[test]
    fn duplicate_vehicle_is_ignored() {
        let mut sim = corridor()
            .with_vehicle(VehicleSpec::new("v", ["a"]))
            .with_vehicle(VehicleSpec::new("v", ["b"]));
        sim.connect().unwrap();
        sim.step().unwrap();
        assert_eq!(sim.vehicle_ids().unwrap().len(), 1);
        assert_eq!(sim.road_id(&vid("v")).unwrap(), EdgeId::new("a"));
    }
}

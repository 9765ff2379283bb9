//! Unit tests for fleet-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, LaneId, ResourceId, VehicleId};

    #[test]
    fn display_is_raw_string() {
        assert_eq!(VehicleId::from("trk7").to_string(), "trk7");
        assert_eq!(EdgeId::new("-13963").to_string(), "-13963");
    }

    #[test]
    fn blank_ids_are_empty() {
        assert!(ResourceId::default().is_empty());
        assert!(ResourceId::from("  ").is_empty());
        assert!(!ResourceId::from("Prk1").is_empty());
    }

    #[test]
    fn lane_edge_round_trip() {
        let edge = EdgeId::from("--101938#11");
        let lane = LaneId::first_of(&edge);
        assert_eq!(lane.as_str(), "--101938#11_0");
        assert_eq!(lane.edge(), Some(edge));
    }

    #[test]
    fn lane_without_index_has_no_edge() {
        assert_eq!(LaneId::from("junction").edge(), None);
        assert_eq!(LaneId::from("a_b").edge(), None);
    }

    #[test]
    fn usable_as_map_key_by_str() {
        let mut map = std::collections::HashMap::new();
        map.insert(VehicleId::from("trk1"), 1);
        assert_eq!(map.get("trk1"), Some(&1));
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn tick_arithmetic() {
        assert_eq!(Tick(5) + 3, Tick(8));
        assert_eq!(Tick(8) - Tick(5), 3);
        assert_eq!(Tick(2).since(Tick(5)), 0);
        assert_eq!(Tick(5).offset(10), Tick(15));
    }

    #[test]
    fn interval_boundaries() {
        assert!(!Tick(0).closes_interval(60));
        assert!(!Tick(59).closes_interval(60));
        assert!(Tick(60).closes_interval(60));
        assert!(Tick(120).closes_interval(60));
        assert!(!Tick(60).closes_interval(0));
    }

    #[test]
    fn clock_advances_and_formats() {
        let mut clock = SimClock::new(1.0);
        for _ in 0..3_725 {
            clock.advance();
        }
        assert_eq!(clock.current_tick, Tick(3_725));
        assert_eq!(clock.elapsed_hms(), (1, 2, 5));
        assert_eq!(clock.to_string(), "T3725 (01:02:05)");
    }

    #[test]
    fn half_second_steps() {
        let mut clock = SimClock::new(0.5);
        clock.advance();
        clock.advance();
        assert_eq!(clock.elapsed_secs(), 1.0);
    }
}

#[cfg(test)]
mod mode {
    use crate::{ArbitrationPolicy, ChokepointProfile, FleetError, RunMode};

    #[test]
    fn parses_all_flags() {
        let mode: RunMode = "Mode011".parse().unwrap();
        assert_eq!(mode.chokepoints, ChokepointProfile::Restricted);
        assert_eq!(mode.arbitration, ArbitrationPolicy::Proactive);
        assert!(mode.throttle);

        let mode: RunMode = "Mode100".parse().unwrap();
        assert_eq!(mode.chokepoints, ChokepointProfile::Open);
        assert_eq!(mode.arbitration, ArbitrationPolicy::Reactive);
        assert!(!mode.throttle);
    }

    #[test]
    fn display_round_trips() {
        for label in ["Mode000", "Mode101", "Mode111", "Mode010"] {
            let mode: RunMode = label.parse().unwrap();
            assert_eq!(mode.to_string(), label);
        }
    }

    #[test]
    fn rejects_malformed_labels() {
        for bad in ["", "Mode", "Mode11", "Mode1111", "Mode1x1", "Node111"] {
            let err = bad.parse::<RunMode>().unwrap_err();
            assert!(matches!(err, FleetError::InvalidMode(_)), "{bad:?} → {err}");
        }
    }

    #[test]
    fn default_is_open_proactive_unthrottled() {
        assert_eq!(RunMode::default().to_string(), "Mode110");
    }
}

//! Unit tests for fleet-mission.

use std::io::Cursor;

use fleet_core::{EdgeId, ResourceId};

use crate::{
    Action, ActionDefect, ActionKind, ActionStatus, Mission, MissionError, MissionGenerator,
    MissionStore, ResourceEntry, ResourcePool, load_missions_reader, load_resources_reader,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn with_status(mut action: Action, status: ActionStatus) -> Action {
    action.status = status;
    action
}

fn load_then_go() -> Mission {
    Mission::new(
        "trk1",
        vec![
            Action::new(ActionKind::Load, "S1", "e_s1"),
            Action::new(ActionKind::Go, "E1", "E1"),
        ],
    )
}

fn pool(ids: &[&str]) -> ResourcePool {
    ResourcePool::new(
        ids.iter()
            .map(|id| ResourceEntry::new(*id, format!("edge_{id}")))
            .collect(),
    )
}

// ── Action ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod action_tests {
    use super::*;

    #[test]
    fn kind_parses_names_and_codes() {
        assert_eq!("Load".parse::<ActionKind>().unwrap(), ActionKind::Load);
        assert_eq!("unload".parse::<ActionKind>().unwrap(), ActionKind::Unload);
        assert_eq!("P".parse::<ActionKind>().unwrap(), ActionKind::Park);
        assert_eq!(" go ".parse::<ActionKind>().unwrap(), ActionKind::Go);
        assert!("Fly".parse::<ActionKind>().is_err());
        assert!("".parse::<ActionKind>().is_err());
    }

    #[test]
    fn status_accepts_legacy_codes() {
        assert_eq!("0".parse::<ActionStatus>().unwrap(), ActionStatus::Pending);
        assert_eq!("2".parse::<ActionStatus>().unwrap(), ActionStatus::Arrived);
        assert_eq!("done".parse::<ActionStatus>().unwrap(), ActionStatus::Done);
        assert_eq!("".parse::<ActionStatus>().unwrap(), ActionStatus::Pending);
        assert!("4".parse::<ActionStatus>().is_err());
        for status in [ActionStatus::Pending, ActionStatus::Assigned, ActionStatus::Arrived, ActionStatus::Done] {
            assert_eq!(ActionStatus::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn status_order_follows_lifecycle() {
        assert!(ActionStatus::Pending < ActionStatus::Assigned);
        assert!(ActionStatus::Assigned < ActionStatus::Arrived);
        assert!(ActionStatus::Arrived < ActionStatus::Done);
    }

    #[test]
    fn defects_are_reported() {
        assert_eq!(Action::new(ActionKind::Park, "", "e1").defect(), Some(ActionDefect::MissingTarget));
        assert_eq!(Action::new(ActionKind::Park, "P1", " ").defect(), Some(ActionDefect::MissingEdge));
        assert_eq!(Action::new(ActionKind::Park, "P1", "e1").defect(), None);
    }

    #[test]
    fn retarget_resets_status_and_keeps_kind() {
        let mut action = with_status(Action::new(ActionKind::Park, "R1", "e1"), ActionStatus::Assigned);
        action.retarget(ResourceId::from("R2"), EdgeId::from("e2"));
        assert_eq!(action.kind, ActionKind::Park);
        assert_eq!(action.status, ActionStatus::Pending);
        assert_eq!(action.target.as_str(), "R2");
        assert_eq!(action.edge.as_str(), "e2");
    }
}

// ── Mission ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod mission_tests {
    use super::*;

    #[test]
    fn current_is_first_not_done() {
        let mut mission = load_then_go();
        assert_eq!(mission.current_index(), Some(0));

        mission.current_mut().unwrap().status = ActionStatus::Done;
        assert_eq!(mission.current_index(), Some(1));
        assert_eq!(mission.current().unwrap().kind, ActionKind::Go);
        assert_eq!(mission.done_count(), 1);
        assert!(!mission.is_complete());

        mission.current_mut().unwrap().status = ActionStatus::Done;
        assert!(mission.current().is_none());
        assert!(mission.is_complete());
        assert_eq!(mission.last().unwrap().kind, ActionKind::Go);
    }

    #[test]
    fn empty_mission_is_not_complete() {
        let mission = Mission::new("trk9", vec![]);
        assert!(!mission.is_complete());
        assert!(mission.is_well_ordered());
    }

    #[test]
    fn ordering_invariant() {
        let ok = Mission::new(
            "trk1",
            vec![
                with_status(Action::new(ActionKind::Load, "S1", "e"), ActionStatus::Done),
                with_status(Action::new(ActionKind::Park, "P1", "e"), ActionStatus::Arrived),
                Action::new(ActionKind::Go, "E1", "E1"),
            ],
        );
        assert!(ok.is_well_ordered());

        let gap = Mission::new(
            "trk2",
            vec![
                Action::new(ActionKind::Load, "S1", "e"),
                with_status(Action::new(ActionKind::Go, "E1", "E1"), ActionStatus::Done),
            ],
        );
        assert!(!gap.is_well_ordered());

        let two_active = Mission::new(
            "trk3",
            vec![
                with_status(Action::new(ActionKind::Load, "S1", "e"), ActionStatus::Assigned),
                with_status(Action::new(ActionKind::Go, "E1", "E1"), ActionStatus::Assigned),
            ],
        );
        assert!(!two_active.is_well_ordered());
    }
}

// ── MissionStore ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod store_tests {
    use super::*;

    #[test]
    fn fleet_order_is_insertion_order() {
        let store = MissionStore::from_missions(vec![
            Mission::new("trk2", vec![]),
            Mission::new("trk1", vec![]),
        ])
        .unwrap();
        assert_eq!(store.fleet_index("trk2"), Some(0));
        assert_eq!(store.fleet_index("trk1"), Some(1));
        assert!(store.contains("trk1"));
        assert!(!store.contains("car7"));
        let ids: Vec<&str> = store.vehicle_ids().map(|v| v.as_str()).collect();
        assert_eq!(ids, ["trk2", "trk1"]);
    }

    #[test]
    fn duplicate_vehicle_rejected() {
        let err = MissionStore::from_missions(vec![load_then_go(), load_then_go()]).unwrap_err();
        assert!(matches!(err, MissionError::DuplicateMission(v) if v.as_str() == "trk1"));
    }

    #[test]
    fn badly_ordered_mission_rejected() {
        let bad = Mission::new(
            "trk1",
            vec![
                Action::new(ActionKind::Load, "S1", "e"),
                with_status(Action::new(ActionKind::Go, "E1", "E1"), ActionStatus::Done),
            ],
        );
        assert!(matches!(MissionStore::from_missions(vec![bad]), Err(MissionError::InvalidOrdering(_))));
    }

    #[test]
    fn incomplete_lists_unfinished_vehicles() {
        let mut store = MissionStore::from_missions(vec![
            Mission::new("trk1", vec![Action::new(ActionKind::Go, "E1", "E1")]),
            Mission::new("trk2", vec![Action::new(ActionKind::Go, "E1", "E1")]),
        ])
        .unwrap();
        store.get_mut("trk1").unwrap().current_mut().unwrap().status = ActionStatus::Done;
        let open: Vec<&str> = store.incomplete().map(|v| v.as_str()).collect();
        assert_eq!(open, ["trk2"]);
    }

    #[test]
    fn snapshot_json_round_trip_keeps_status() {
        let mut store = MissionStore::from_missions(vec![load_then_go()]).unwrap();
        store.get_mut("trk1").unwrap().current_mut().unwrap().status = ActionStatus::Arrived;

        let mut buf = Vec::new();
        store.write_snapshot_json(&mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.contains("\"arrived\""), "{text}");

        let back = MissionStore::read_snapshot_json(Cursor::new(buf)).unwrap();
        assert_eq!(back.get("trk1"), store.get("trk1"));
    }

    #[test]
    fn snapshot_saved_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missions.json");
        let store = MissionStore::from_missions(vec![load_then_go()]).unwrap();
        store.save_snapshot(&path).unwrap();
        let back = MissionStore::read_snapshot_json(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(back.len(), 1);
    }
}

// ── ResourcePool ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod pool_tests {
    use super::*;

    #[test]
    fn alternative_is_first_other_entry() {
        let pool = pool(&["R1", "R2", "R3"]);
        assert_eq!(pool.find_alternative(&"R1".into()).unwrap().id.as_str(), "R2");
        assert_eq!(pool.find_alternative(&"R2".into()).unwrap().id.as_str(), "R1");
        assert_eq!(pool.find_alternative(&"R9".into()).unwrap().id.as_str(), "R1");
    }

    #[test]
    fn alternative_never_equals_excluded() {
        let pool = pool(&["R1", "R2", "R3"]);
        for entry in pool.entries() {
            let alt = pool.find_alternative(&entry.id).unwrap();
            assert_ne!(alt.id, entry.id);
        }
    }

    #[test]
    fn tiny_pools_have_no_alternative() {
        assert!(pool(&[]).find_alternative(&"R1".into()).is_none());
        assert!(pool(&["R1"]).find_alternative(&"R1".into()).is_none());
        assert!(pool(&["R2"]).find_alternative(&"R1".into()).is_none());
    }

    #[test]
    fn lookup_by_id() {
        let pool = pool(&["R1", "R2"]);
        assert_eq!(pool.get(&"R2".into()).unwrap().edge.as_str(), "edge_R2");
        assert!(pool.get(&"R3".into()).is_none());
    }
}

// ── Loaders ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use super::*;

    const MISSIONS_CSV: &str = "\
vehicle_id,kind,target,edge,status
trk1,Load,S1,e_s1,done
trk2,Park,Prk1,e_p1,
trk1,Go,E1,E1,1
trk2,G,E2,E2,0
";

    #[test]
    fn missions_grouped_in_first_seen_order() {
        let store = load_missions_reader(Cursor::new(MISSIONS_CSV)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.fleet_index("trk1"), Some(0));

        let trk1 = store.get("trk1").unwrap();
        assert_eq!(trk1.len(), 2);
        assert_eq!(trk1.actions()[0].status, ActionStatus::Done);
        assert_eq!(trk1.actions()[1].status, ActionStatus::Assigned);

        let trk2 = store.get("trk2").unwrap();
        assert_eq!(trk2.actions()[0].kind, ActionKind::Park);
        assert_eq!(trk2.actions()[1].kind, ActionKind::Go);
    }

    #[test]
    fn blank_target_loads_for_later_rejection() {
        let csv = "vehicle_id,kind,target,edge,status\ntrk1,Park,,e1,\n";
        let store = load_missions_reader(Cursor::new(csv)).unwrap();
        let action = store.get("trk1").unwrap().current().unwrap();
        assert_eq!(action.defect(), Some(ActionDefect::MissingTarget));
    }

    #[test]
    fn unknown_kind_is_parse_error() {
        let csv = "vehicle_id,kind,target,edge,status\ntrk1,Fly,P1,e1,\n";
        assert!(matches!(load_missions_reader(Cursor::new(csv)), Err(MissionError::Parse(_))));
    }

    #[test]
    fn missing_file_is_configuration_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = crate::load_missions_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, MissionError::ConfigurationMissing { what: "missions", .. }));
        let err = crate::load_resources_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, MissionError::ConfigurationMissing { what: "resource pool", .. }));
    }

    #[test]
    fn resources_with_optional_capacity() {
        let csv = "resource_id,edge,capacity\nPrk1,e1,10\nPrk2,e2,\n";
        let pool = load_resources_reader(Cursor::new(csv)).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.entries()[0].capacity_hint, Some(10));
        assert_eq!(pool.entries()[1].capacity_hint, None);
    }

    #[test]
    fn resource_without_edge_rejected() {
        let csv = "resource_id,edge,capacity\nPrk1,,10\n";
        assert!(load_resources_reader(Cursor::new(csv)).is_err());
    }
}

// ── MissionGenerator ──────────────────────────────────────────────────────────

#[cfg(test)]
mod generator_tests {
    use super::*;

    fn generator(templates: &[&str]) -> MissionGenerator {
        MissionGenerator::new(templates.iter().map(|t| t.to_string()).collect())
            .stops(vec![ResourceEntry::new("S1", "e_s1")])
            .parkings(vec![ResourceEntry::new("Prk1", "e_p1"), ResourceEntry::new("Prk2", "e_p2")])
            .exits(vec![EdgeId::from("-2252")])
    }

    #[test]
    fn same_seed_same_fleet() {
        let g = generator(&["LP", "UG", "PG"]);
        let a = g.generate(20, 7).unwrap();
        let b = g.generate(20, 7).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x, y);
        }
    }

    #[test]
    fn ids_and_kinds_follow_template() {
        let store = generator(&["LG"]).generate(3, 1).unwrap();
        let ids: Vec<&str> = store.vehicle_ids().map(|v| v.as_str()).collect();
        assert_eq!(ids, ["trk1", "trk2", "trk3"]);
        for mission in store.iter() {
            let kinds: Vec<ActionKind> = mission.actions().iter().map(|a| a.kind).collect();
            assert_eq!(kinds, [ActionKind::Load, ActionKind::Go]);
            let go = &mission.actions()[1];
            assert_eq!(go.target.as_str(), go.edge.as_str());
            assert!(mission.actions().iter().all(|a| a.status == ActionStatus::Pending));
        }
    }

    #[test]
    fn unknown_code_fails() {
        assert!(matches!(generator(&["LX"]).generate(1, 1), Err(MissionError::Generator(_))));
    }

    #[test]
    fn empty_candidates_fail() {
        let g = MissionGenerator::new(vec!["P".into()]);
        assert!(g.generate(1, 1).is_err());
        assert!(MissionGenerator::new(vec![]).generate(1, 1).is_err());
    }

    #[test]
    fn zero_count_is_empty_store() {
        assert!(generator(&["P"]).generate(0, 1).unwrap().is_empty());
    }
}

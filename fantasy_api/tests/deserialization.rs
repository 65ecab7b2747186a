use fantasy_api::types::{BootstrapStatic, ElementSummary, Fixture, Picks};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_bootstrap_static() {
    let json = load_fixture("bootstrap_static.json");
    let resp: BootstrapStatic = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.teams.len(), 2);
    assert_eq!(resp.events.len(), 3);
    assert_eq!(resp.element_types.len(), 1);
    assert_eq!(resp.elements.len(), 3);

    let salah = &resp.elements[0];
    assert_eq!(salah.id, 328);
    assert_eq!(salah.web_name, "Salah");
    assert_eq!(salah.form, "8.5");
    assert_eq!(salah.now_cost, 125);
    assert_eq!(salah.ict_index_rank, Some(1));

    let mid = &resp.element_types[0];
    assert_eq!(mid.singular_name, "Midfielder");
    assert_eq!(mid.squad_select, 5);
    assert_eq!(mid.squad_min_play, 2);
}

#[test]
fn deserialize_events_with_null_most_captained() {
    let json = load_fixture("bootstrap_static.json");
    let resp: BootstrapStatic = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.events[0].most_captained, Some(351));
    assert!(resp.events[1].is_current);
    assert!(resp.events[2].is_next);
    assert_eq!(resp.events[2].most_captained, None);
    assert_eq!(
        resp.events[1].deadline_time.to_rfc3339(),
        "2024-08-24T10:00:00+00:00"
    );
}

#[test]
fn deserialize_fixtures() {
    let json = load_fixture("fixtures.json");
    let resp: Vec<Fixture> = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.len(), 1);
    assert_eq!(resp[0].event, Some(2));
    assert_eq!(resp[0].team_h, 1);
    assert_eq!(resp[0].team_a, 14);
}

#[test]
fn deserialize_unscheduled_fixture() {
    let json = r#"[{"id": 99, "event": null, "team_h": 1, "team_a": 2,
        "team_h_difficulty": 3, "team_a_difficulty": 3}]"#;
    let resp: Vec<Fixture> = serde_json::from_str(json).unwrap();
    assert_eq!(resp[0].event, None);
    assert!(!resp[0].finished);
}

#[test]
fn deserialize_element_summary() {
    let json = load_fixture("element_summary.json");
    let resp: ElementSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.history.len(), 2);
    assert_eq!(resp.history[0].fixture, 3);
    assert_eq!(resp.history[0].total_points, 8);
    assert_eq!(resp.history[1].minutes, 0);
}

#[test]
fn deserialize_picks() {
    let json = load_fixture("picks.json");
    let resp: Picks = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.picks.len(), 2);
    assert!(resp.picks[0].is_captain);
    assert!(resp.picks[1].is_vice_captain);
    assert_eq!(resp.entry_history.bank, 15);
}

#[test]
fn deserialize_missing_required_fields_returns_error() {
    let json = r#"{"teams": [], "events": []}"#;
    let result = serde_json::from_str::<BootstrapStatic>(json);
    assert!(result.is_err());
}

use super::*;

fn artwork(n: u8) -> Artwork {
    Artwork { image_url: format!("https://img.test/{n}"), prompt: format!("story - 第{n}格") }
}

// =============================================================================
// PanelId
// =============================================================================

#[test]
fn panel_id_accepts_one_through_four() {
    for raw in 1_u64..=4 {
        let id = PanelId::try_from(raw).unwrap();
        assert_eq!(u64::from(id.ordinal()), raw);
    }
}

#[test]
fn panel_id_rejects_out_of_range() {
    assert_eq!(PanelId::try_from(0_u64), Err(PanelIdOutOfRange(0)));
    assert_eq!(PanelId::try_from(5_u64), Err(PanelIdOutOfRange(5)));
    assert!(PanelId::try_from(u64::MAX).is_err());
}

#[test]
fn panel_id_index_and_ordinal_agree() {
    let id = PanelId::from_index(2).unwrap();
    assert_eq!(id.index(), 2);
    assert_eq!(id.ordinal(), 3);
    assert_eq!(id.to_string(), "3");
    assert!(PanelId::from_index(PANEL_COUNT).is_none());
}

#[test]
fn panel_id_all_is_ordered() {
    let ids: Vec<u8> = PanelId::all().map(PanelId::ordinal).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn panel_id_serde_uses_plain_integer() {
    let id = PanelId::try_from(4_u8).unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), "4");
    let parsed: PanelId = serde_json::from_str("2").unwrap();
    assert_eq!(parsed.ordinal(), 2);
    assert!(serde_json::from_str::<PanelId>("9").is_err());
}

// =============================================================================
// PanelState transitions
// =============================================================================

#[test]
fn pending_panel_has_no_artwork() {
    let panel = PanelState::pending(PanelId::from_index(0).unwrap());
    assert_eq!(panel.status(), PanelStatus::Pending);
    assert!(panel.image_url().is_none());
    assert!(panel.prompt().is_none());
    assert!(panel.artwork().is_none());
}

#[test]
fn complete_attaches_url_and_prompt() {
    let mut panel = PanelState::pending(PanelId::from_index(0).unwrap());
    panel.begin_generating();
    assert_eq!(panel.status(), PanelStatus::Generating);

    panel.complete(artwork(1));
    assert!(panel.is_completed());
    assert_eq!(panel.image_url(), Some("https://img.test/1"));
    assert_eq!(panel.prompt(), Some("story - 第1格"));
    assert_eq!(panel.artwork(), Some(artwork(1)));
}

#[test]
fn regenerating_clears_artwork_until_completed() {
    let mut panel = PanelState::pending(PanelId::from_index(1).unwrap());
    panel.complete(artwork(2));
    panel.begin_generating();

    assert_eq!(panel.status(), PanelStatus::Generating);
    assert!(panel.image_url().is_none());
    assert!(panel.prompt().is_none());
}

#[test]
fn reset_pending_clears_everything() {
    let mut panel = PanelState::pending(PanelId::from_index(3).unwrap());
    panel.begin_generating();
    panel.reset_pending();
    assert_eq!(panel, PanelState::pending(PanelId::from_index(3).unwrap()));
}

#[test]
fn serialized_pending_panel_omits_artwork_fields() {
    let panel = PanelState::pending(PanelId::from_index(0).unwrap());
    let json = serde_json::to_value(&panel).unwrap();
    assert_eq!(json, serde_json::json!({"id": 1, "status": "pending"}));
}

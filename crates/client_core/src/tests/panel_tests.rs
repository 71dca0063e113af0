use super::*;

fn floor(n: i64) -> Floor {
    Floor::new(n).expect("floor")
}

#[test]
fn rebuild_creates_one_neutral_button_per_floor() {
    let mut panel = Panel::new(0);
    panel.set_visual(panel.handle(floor(3)), ButtonVisual::PendingSuccess);
    panel.apply_validity(&BTreeSet::new(), InvalidFloorTreatment::Disabled);

    panel.rebuild(1);

    assert_eq!(panel.generation(), 1);
    assert_eq!(panel.buttons().len(), 14);
    for (button, expected) in panel.buttons().iter().zip(floor_catalog()) {
        assert_eq!(button.floor, *expected);
        assert_eq!(button.visual, ButtonVisual::Neutral);
        assert_eq!(button.validity, Validity::Unmarked);
    }
    assert_eq!(panel.buttons()[0].label, "Ground Floor");
}

#[test]
fn reset_visuals_clears_every_mark() {
    let mut panel = Panel::new(0);
    panel.set_visual(panel.handle(floor(2)), ButtonVisual::PendingSuccess);
    panel.set_visual(panel.handle(floor(9)), ButtonVisual::PendingFailure);

    assert!(panel.reset_visuals());
    assert!(panel
        .buttons()
        .iter()
        .all(|b| b.visual == ButtonVisual::Neutral));
    assert!(!panel.reset_visuals());
}

#[test]
fn handle_from_previous_build_is_ignored() {
    let mut panel = Panel::new(0);
    let old = panel.handle(floor(5));
    panel.rebuild(1);

    assert_eq!(panel.set_visual(old, ButtonVisual::PendingSuccess), None);
    assert_eq!(
        panel.button(floor(5)).map(|b| b.visual),
        Some(ButtonVisual::Neutral)
    );
}

#[test]
fn clear_failure_only_clears_its_own_mark() {
    let mut panel = Panel::new(0);
    let handle = panel.handle(floor(4));
    let first = panel
        .set_visual(handle, ButtonVisual::PendingFailure)
        .expect("stamp");
    let second = panel
        .set_visual(handle, ButtonVisual::PendingFailure)
        .expect("stamp");

    assert!(!panel.clear_failure(handle, first));
    assert!(panel.clear_failure(handle, second));
    assert_eq!(
        panel.button(floor(4)).map(|b| b.visual),
        Some(ButtonVisual::Neutral)
    );
}

#[test]
fn clear_failure_leaves_success_alone() {
    let mut panel = Panel::new(0);
    let handle = panel.handle(floor(6));
    let stamp = panel
        .set_visual(handle, ButtonVisual::PendingFailure)
        .expect("stamp");
    panel.set_visual(handle, ButtonVisual::PendingSuccess);

    assert!(!panel.clear_failure(handle, stamp));
    assert_eq!(
        panel.button(floor(6)).map(|b| b.visual),
        Some(ButtonVisual::PendingSuccess)
    );
}

#[test]
fn validity_marking_follows_treatment() {
    let valid: BTreeSet<Floor> = [floor(1), floor(3)].into_iter().collect();
    let mut panel = Panel::new(0);

    panel.apply_validity(&valid, InvalidFloorTreatment::Ignore);
    assert!(panel
        .buttons()
        .iter()
        .all(|b| b.validity == Validity::Unmarked));

    panel.apply_validity(&valid, InvalidFloorTreatment::Unstyled);
    assert_eq!(panel.button(floor(1)).map(|b| b.validity), Some(Validity::Unmarked));
    assert_eq!(panel.button(floor(2)).map(|b| b.validity), Some(Validity::Invalid));

    panel.apply_validity(&valid, InvalidFloorTreatment::Disabled);
    assert_eq!(panel.button(floor(0)).map(|b| b.validity), Some(Validity::Disabled));
    assert_eq!(panel.button(floor(3)).map(|b| b.validity), Some(Validity::Unmarked));
}

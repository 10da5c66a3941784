//! Integration tests: coloring, group swaps, clear-all and reconciliation.

use ch_core::color::{ColorChoice, ColorTag};
use ch_core::config::HelperConfig;
use ch_core::id::TileId;
use ch_core::store::{MemoryStore, SessionStore};
use ch_engine::controller::Controller;
use ch_engine::headless::HeadlessPage;
use ch_engine::input::PageEvent;
use ch_engine::menu::MenuAction;
use ch_engine::page::{HostPage, painted_color};
use ch_engine::transition::BulkPhase;
use pretty_assertions::assert_eq;

type Helper = Controller<HeadlessPage, MemoryStore>;

const COLORS_KEY: &str = "connections-helper-card-colors";
const BUSY: &str = "Please wait for the current color change to finish";

fn id(s: &str) -> TileId {
    TileId::intern(s)
}

/// Board `c0..c5` with `c0 c1` yellow, `c2` green and `c3` blue.
fn colored_board() -> Helper {
    let page = HeadlessPage::with_tiles(&["c0", "c1", "c2", "c3", "c4", "c5"]);
    let mut helper = Controller::new(page, MemoryStore::new(), HelperConfig::default());
    assert!(helper.try_initialize());
    for (tile, tag) in [
        ("c0", ColorTag::Yellow),
        ("c1", ColorTag::Yellow),
        ("c2", ColorTag::Green),
        ("c3", ColorTag::Blue),
    ] {
        helper.set_color(id(tile), ColorChoice::Tag(tag));
    }
    helper.pump_mutations();
    helper
}

fn painted(helper: &Helper, tile: &str) -> Option<ColorTag> {
    painted_color(helper.page(), helper.config(), id(tile))
}

fn stored_colors(helper: &Helper) -> Option<String> {
    helper.store().get(COLORS_KEY)
}

// ─── Single tile ─────────────────────────────────────────────────────────

#[test]
fn recoloring_replaces_the_previous_tag() {
    let mut helper = colored_board();
    helper.set_color(id("c0"), ColorChoice::Tag(ColorTag::Pink));

    assert_eq!(painted(&helper, "c0"), Some(ColorTag::Pink));
    assert!(!helper.page().has_class(id("c0"), "connections-helper-yellow"));
    assert_eq!(helper.page().last_status(), Some("Card colored Pink!"));
}

#[test]
fn clear_choice_removes_the_entry() {
    let mut helper = colored_board();
    helper.set_color(id("c3"), ColorChoice::Clear);

    assert_eq!(painted(&helper, "c3"), None);
    assert_eq!(helper.colors().unwrap().get(id("c3")), None);
    assert_eq!(
        stored_colors(&helper).as_deref(),
        Some(r#"{"c0":"yellow","c1":"yellow","c2":"green"}"#)
    );
    assert_eq!(helper.page().last_status(), Some("Card colored Clear!"));
}

// ─── Reconciliation ──────────────────────────────────────────────────────

#[test]
fn host_class_rewrite_is_repainted_without_persisting() {
    let mut helper = colored_board();
    let before = stored_colors(&helper);

    helper.page_mut().host_reset_classes(id("c2"));
    assert_eq!(painted(&helper, "c2"), None);
    helper.pump_mutations();

    assert_eq!(painted(&helper, "c2"), Some(ColorTag::Green));
    assert_eq!(stored_colors(&helper), before);
}

#[test]
fn uncolored_tiles_stay_uncolored() {
    let mut helper = colored_board();
    helper.page_mut().host_reset_classes(id("c4"));
    helper.pump_mutations();
    assert_eq!(painted(&helper, "c4"), None);
}

// ─── Group swap ──────────────────────────────────────────────────────────

#[test]
fn group_swap_exchanges_every_tile() {
    let mut helper = colored_board();
    assert!(helper.swap_color_group(ColorTag::Yellow, ColorTag::Green));
    assert_eq!(
        helper.page().last_status(),
        Some("Swapped 🟡 Yellow (Easy) with 🟢 Green (Medium)")
    );
    helper.run_timers();

    assert_eq!(painted(&helper, "c0"), Some(ColorTag::Green));
    assert_eq!(painted(&helper, "c1"), Some(ColorTag::Green));
    assert_eq!(painted(&helper, "c2"), Some(ColorTag::Yellow));
    assert_eq!(painted(&helper, "c3"), Some(ColorTag::Blue));
    assert!(!helper.page().has_class(id("c0"), "color-transition"));
    assert_eq!(helper.bulk_phase(), BulkPhase::Idle);
    assert_eq!(
        stored_colors(&helper).as_deref(),
        Some(r#"{"c0":"green","c1":"green","c2":"yellow","c3":"blue"}"#)
    );
}

#[test]
fn swapping_twice_restores_the_mapping() {
    let mut helper = colored_board();
    let before = stored_colors(&helper);

    helper.swap_color_group(ColorTag::Yellow, ColorTag::Blue);
    helper.run_timers();
    helper.swap_color_group(ColorTag::Yellow, ColorTag::Blue);
    helper.run_timers();

    assert_eq!(stored_colors(&helper), before);
    assert_eq!(painted(&helper, "c0"), Some(ColorTag::Yellow));
    assert_eq!(painted(&helper, "c3"), Some(ColorTag::Blue));
}

#[test]
fn swap_with_empty_side_moves_one_group() {
    let mut helper = colored_board();
    helper.swap_color_group(ColorTag::Blue, ColorTag::Lavender);
    helper.run_timers();
    assert_eq!(painted(&helper, "c3"), Some(ColorTag::Lavender));
}

#[test]
fn swapping_a_color_with_itself_is_rejected() {
    let mut helper = colored_board();
    assert!(!helper.swap_color_group(ColorTag::Blue, ColorTag::Blue));
    assert_eq!(
        helper.page().last_status(),
        Some("Can't swap a color with itself!")
    );
    assert!(helper.take_wakeups().is_empty());
}

#[test]
fn second_bulk_operation_waits_for_the_first() {
    let mut helper = colored_board();
    assert!(helper.swap_color_group(ColorTag::Yellow, ColorTag::Green));
    assert!(!helper.clear_colors());
    assert_eq!(helper.page().last_status(), Some(BUSY));
    assert!(!helper.swap_color_group(ColorTag::Blue, ColorTag::Pink));

    helper.run_timers();
    assert!(helper.clear_colors());
}

#[test]
fn suppressed_tiles_are_not_repainted_mid_swap() {
    let mut helper = colored_board();
    helper.swap_color_group(ColorTag::Yellow, ColorTag::Green);
    assert_eq!(helper.bulk_phase(), BulkPhase::Removing);

    helper.page_mut().host_reset_classes(id("c3"));
    helper.pump_mutations();
    assert_eq!(painted(&helper, "c3"), None);
    assert_eq!(painted(&helper, "c0"), None);

    helper.run_timers();
    helper.page_mut().host_reset_classes(id("c3"));
    helper.pump_mutations();
    assert_eq!(painted(&helper, "c3"), Some(ColorTag::Blue));
}

#[test]
fn coloring_waits_for_a_running_swap() {
    let mut helper = colored_board();
    helper.swap_color_group(ColorTag::Yellow, ColorTag::Green);

    assert!(!helper.set_color(id("c0"), ColorChoice::Tag(ColorTag::Blue)));
    assert_eq!(helper.page().last_status(), Some(BUSY));

    helper.handle(PageEvent::ContextMenu {
        tile: id("c1"),
        x: 0.0,
        y: 0.0,
    });
    helper.handle_message_json(r#"{"action":"colorElement","color":"blue"}"#);
    assert_eq!(helper.page().select_keys(), &[id("c1")]);
    assert_eq!(helper.page().last_status(), Some(BUSY));

    helper.run_timers();
    assert_eq!(
        helper.page().classes(id("c0")),
        vec!["connections-helper-green".to_string()]
    );
    assert_eq!(
        helper.colors().and_then(|colors| colors.get(id("c0"))),
        Some(ColorTag::Green)
    );
    assert_eq!(
        stored_colors(&helper).as_deref(),
        Some(r#"{"c0":"green","c1":"green","c2":"yellow","c3":"blue"}"#)
    );

    assert!(helper.set_color(id("c0"), ColorChoice::Tag(ColorTag::Blue)));
    assert_eq!(painted(&helper, "c0"), Some(ColorTag::Blue));
}

#[test]
fn tiles_rerendered_mid_swap_stay_watched() {
    let mut helper = colored_board();
    helper.swap_color_group(ColorTag::Yellow, ColorTag::Green);
    helper
        .page_mut()
        .render(&["c0", "c1", "c2", "c3", "c4", "c5"]);
    helper.handle(PageEvent::TreeMutated);
    assert_eq!(helper.bulk_phase(), BulkPhase::Removing);

    helper.run_timers();
    assert_eq!(helper.bulk_phase(), BulkPhase::Idle);
    assert_eq!(painted(&helper, "c0"), Some(ColorTag::Green));
    assert_eq!(painted(&helper, "c2"), Some(ColorTag::Yellow));
    assert_eq!(painted(&helper, "c3"), Some(ColorTag::Blue));
    assert_eq!(helper.page().connected_observers(), 6);

    helper.page_mut().host_reset_classes(id("c0"));
    helper.page_mut().host_reset_classes(id("c3"));
    helper.pump_mutations();
    assert_eq!(painted(&helper, "c0"), Some(ColorTag::Green));
    assert_eq!(painted(&helper, "c3"), Some(ColorTag::Blue));
}

// ─── Clear all ───────────────────────────────────────────────────────────

#[test]
fn clear_all_deletes_the_stored_mapping() {
    let mut helper = colored_board();
    assert!(helper.clear_colors());

    assert!(!helper.store().contains(COLORS_KEY));
    assert!(helper.colors().unwrap().is_empty());
    assert_eq!(painted(&helper, "c0"), None);
    assert_eq!(helper.page().last_status(), Some("All colors cleared!"));
    assert_eq!(helper.watched_tiles(), 0);

    helper.run_timers();
    assert_eq!(helper.watched_tiles(), 6);
    helper.page_mut().host_reset_classes(id("c0"));
    helper.pump_mutations();
    assert_eq!(painted(&helper, "c0"), None);
}

// ─── Menu and picker ─────────────────────────────────────────────────────

#[test]
fn right_click_menu_colors_the_target() {
    let mut helper = colored_board();
    assert!(helper.handle(PageEvent::ContextMenu {
        tile: id("c4"),
        x: 40.0,
        y: 80.0,
    }));
    assert_eq!(helper.menu().unwrap().position(), Some((40.0, 80.0)));
    assert_eq!(helper.page().select_keys(), &[id("c4")]);
    assert_eq!(
        helper.store().get("connections-helper-target-text").as_deref(),
        Some("C4")
    );

    helper.handle(PageEvent::Menu(MenuAction::Color(ColorChoice::Tag(
        ColorTag::Orange,
    ))));
    assert!(!helper.menu().unwrap().is_open());
    assert_eq!(painted(&helper, "c4"), Some(ColorTag::Orange));
}

#[test]
fn document_click_closes_the_menu() {
    let mut helper = colored_board();
    helper.handle(PageEvent::ContextMenu {
        tile: id("c1"),
        x: 0.0,
        y: 0.0,
    });
    assert!(helper.handle(PageEvent::DocumentClick));
    assert!(!helper.handle(PageEvent::DocumentClick));
}

#[test]
fn picker_defaults_to_the_target_color() {
    let mut helper = colored_board();
    helper.handle(PageEvent::ContextMenu {
        tile: id("c3"),
        x: 0.0,
        y: 0.0,
    });
    helper.handle(PageEvent::Menu(MenuAction::SwapColors));

    let picker = helper.picker().unwrap();
    assert!(picker.is_open());
    assert_eq!(picker.source(), ColorTag::Blue);
    assert_eq!(picker.target(), ColorTag::Purple);

    helper.handle(PageEvent::PickerConfirm {
        source: ColorTag::Blue,
        target: ColorTag::Yellow,
    });
    assert!(!helper.picker().unwrap().is_open());
    helper.run_timers();
    assert_eq!(painted(&helper, "c3"), Some(ColorTag::Yellow));
    assert_eq!(painted(&helper, "c0"), Some(ColorTag::Blue));
}

#[test]
fn picker_keeps_open_on_same_color() {
    let mut helper = colored_board();
    helper.handle(PageEvent::Menu(MenuAction::SwapColors));
    helper.handle(PageEvent::PickerConfirm {
        source: ColorTag::Green,
        target: ColorTag::Green,
    });
    assert!(helper.picker().unwrap().is_open());
    assert_eq!(
        helper.page().last_status(),
        Some("Can't swap a color with itself!")
    );
    assert!(helper.handle(PageEvent::PickerCancel));
    assert!(!helper.picker().unwrap().is_open());
}

//! Change ledger tests
//!
//! Overwrite semantics, output ordering and removal behaviour, checked through
//! the rendered block and the saved file.

mod common;

use common::{block_body, read, session, standard_figure};
use plotedit::ledger::{statement, ChangeKey, ChangeLedger, Removal};
use plotedit::model::{Bounds, ElementTree, Point, Size};
use plotedit::reference;

// ========================================================================
// Overwrite, not append
// ========================================================================

#[test]
fn test_second_position_wins_in_saved_file() {
    let dir = tempfile::tempdir().unwrap();
    let (mut model, fig, path) = session(dir.path());

    model
        .ledger
        .add_change(fig.left, ".set_position([0.1,0.1,0.2,0.2])")
        .unwrap();
    model
        .ledger
        .add_change(fig.left, ".set_position([0.3,0.1,0.2,0.2])")
        .unwrap();
    assert_eq!(model.ledger.len(), 1);

    let doc = model.document.as_mut().unwrap();
    model.ledger.save(doc, &model.tree).unwrap();

    let text = read(&path);
    assert_eq!(
        block_body(&text),
        vec!["plt.figure(1).axes[0].set_position([0.3,0.1,0.2,0.2])".to_string()]
    );
    assert_eq!(text.matches(".set_position(").count(), 1);
    assert!(!text.contains("[0.1,0.1,0.2,0.2]"));
}

#[test]
fn test_different_properties_coexist() {
    let (tree, fig) = standard_figure();
    let mut ledger = ChangeLedger::new();
    ledger
        .add_change(fig.title, statement::set_text("Results"))
        .unwrap();
    ledger
        .add_change(fig.title, statement::set_rotation(90.0))
        .unwrap();
    let previous = ledger
        .add_change(fig.title, statement::set_text("Final results"))
        .unwrap();

    assert_eq!(previous.unwrap().command, ".set_text(\"Results\")");
    assert_eq!(ledger.changes_for(fig.title).len(), 2);
    assert_eq!(
        ledger.render(&tree),
        vec![
            "plt.figure(1).texts[0].set_rotation(90.000000)".to_string(),
            "plt.figure(1).texts[0].set_text(\"Final results\")".to_string(),
        ]
    );
}

// ========================================================================
// Ordering
// ========================================================================

#[test]
fn test_natural_order_of_container_indices() {
    let mut tree = ElementTree::new(1, Size::new(16.0, 12.0));
    let axes: Vec<_> = (0..11)
        .map(|i| tree.add_container(Bounds::new(0.05 * i as f64, 0.1, 0.04, 0.2), None))
        .collect();

    let mut ledger = ChangeLedger::new();
    ledger.add_change(axes[10], statement::hide()).unwrap();
    ledger.add_change(axes[2], statement::hide()).unwrap();

    assert_eq!(
        ledger.render(&tree),
        vec![
            "plt.figure(1).axes[2].set_visible(False)".to_string(),
            "plt.figure(1).axes[10].set_visible(False)".to_string(),
        ]
    );
}

#[test]
fn test_figure_then_containers_then_children() {
    let (mut tree, fig) = standard_figure();
    let mut ledger = ChangeLedger::new();

    ledger
        .add_change(fig.note, statement::set_text_position(Point::new(0.2, 0.25)))
        .unwrap();
    ledger
        .add_change(fig.upper, statement::set_position(&Bounds::new(0.1, 0.6, 0.35, 0.3)))
        .unwrap();
    ledger
        .add_change(fig.x_label, statement::set_text("time [s]"))
        .unwrap();
    tree.set_figure_size_cm(Size::new(20.0, 12.0)).unwrap();
    ledger
        .add_change(tree.root(), statement::set_figure_size(Size::new(20.0, 12.0)))
        .unwrap();
    ledger
        .add_change(fig.left, statement::hide())
        .unwrap();

    assert_eq!(
        ledger.render(&tree),
        vec![
            "plt.figure(1).set_size_inches(20.000000/2.54, 12.000000/2.54, forward=True)",
            "plt.figure(1).axes[0].set_visible(False)",
            "plt.figure(1).axes[2].set_position([0.100000, 0.600000, 0.350000, 0.300000])",
            "plt.figure(1).axes[0].texts[0].set_position([0.200000, 0.250000])",
            "plt.figure(1).axes[2].xaxis.label.set_text(\"time [s]\")",
        ]
    );
}

#[test]
fn test_label_lookup_header_comes_first() {
    let (tree, fig) = standard_figure();
    let mut ledger = ChangeLedger::new();
    ledger.add_change(fig.main, statement::hide()).unwrap();

    let root = reference::root_path(1);
    assert_eq!(
        ledger.render(&tree),
        vec![
            statement::label_table_header(&root),
            "plt.figure(1).ax_dict[\"main\"].set_visible(False)".to_string(),
        ]
    );
}

// ========================================================================
// Removal
// ========================================================================

#[test]
fn test_removing_created_element_leaves_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let (mut model, fig, path) = session(dir.path());

    let root_path = reference::root_path(1);
    let created = model
        .tree
        .add_text(fig.left, Point::new(0.3, 0.4), "temporary")
        .unwrap();
    model
        .ledger
        .record_creation(
            created,
            fig.left,
            statement::create_text(&root_path, Point::new(0.3, 0.4), "temporary"),
        )
        .unwrap();
    model
        .ledger
        .add_change(created, statement::set_rotation(45.0))
        .unwrap();
    assert!(model.ledger.is_created(created));

    let removal = model
        .ledger
        .remove_element(&mut model.tree, created)
        .unwrap();
    assert_eq!(removal, Removal::Deleted);
    assert!(!model.tree.contains(created));
    assert!(model.ledger.changes_for(created).is_empty());
    assert!(model.ledger.is_empty());

    let doc = model.document.as_mut().unwrap();
    model.ledger.save(doc, &model.tree).unwrap();
    let text = read(&path);
    assert!(block_body(&text).is_empty());
    assert!(!text.contains("temporary"));
}

#[test]
fn test_removing_existing_element_hides_it() {
    let (mut tree, fig) = standard_figure();
    let mut ledger = ChangeLedger::new();

    let removal = ledger.remove_element(&mut tree, fig.rect).unwrap();
    assert_eq!(removal, Removal::Hidden);

    let changes = ledger.changes_for(fig.rect);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].0, &ChangeKey::property(".set_visible"));
    assert_eq!(changes[0].1.command, ".set_visible(False)");

    // Still addressable by the same path
    let path = reference::resolve(&tree, fig.rect).unwrap();
    assert_eq!(path.as_str(), "plt.figure(1).axes[0].patches[0]");
    assert_eq!(reference::evaluate(&tree, path.as_str()).unwrap(), fig.rect);
    assert!(!tree.element(fig.rect).unwrap().is_visible());
}

#[test]
fn test_figure_cannot_be_removed() {
    let (mut tree, _) = standard_figure();
    let mut ledger = ChangeLedger::new();
    let root = tree.root();
    assert!(ledger.remove_element(&mut tree, root).is_err());
    assert!(ledger.is_empty());
    assert!(ledger.is_saved());
}

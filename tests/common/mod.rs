//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use plotedit::config::EditorConfig;
use plotedit::model::{AppModel, Axis, Bounds, ElementId, ElementTree, Point, Size};

/// Handles of the elements in [`standard_figure`]
#[derive(Debug, Clone, Copy)]
pub struct Figure {
    /// `plt.figure(1).axes[0]`
    pub left: ElementId,
    /// `plt.figure(1).ax_dict["main"]`
    pub main: ElementId,
    /// `plt.figure(1).axes[2]`
    pub upper: ElementId,
    /// `plt.figure(1).texts[0]`
    pub title: ElementId,
    /// `plt.figure(1).axes[0].texts[0]`
    pub note: ElementId,
    /// `plt.figure(1).axes[0].patches[0]`
    pub rect: ElementId,
    /// `plt.figure(1).axes[0].legends[0]`
    pub legend: ElementId,
    /// `plt.figure(1).axes[2].xaxis.label`
    pub x_label: ElementId,
}

/// Figure 1, 16x12 cm: three containers (one labelled "main"), a figure
/// title, and a text, rectangle and legend inside the first container
pub fn standard_figure() -> (ElementTree, Figure) {
    let mut tree = ElementTree::new(1, Size::new(16.0, 12.0));
    let root = tree.root();

    let left = tree.add_container(Bounds::new(0.1, 0.1, 0.35, 0.35), None);
    let main = tree.add_container(Bounds::new(0.55, 0.1, 0.35, 0.35), Some("main"));
    let upper = tree.add_container(Bounds::new(0.1, 0.55, 0.35, 0.35), None);

    let title = tree
        .add_text(root, Point::new(0.5, 0.95), "Title")
        .unwrap();
    let note = tree.add_text(left, Point::new(0.2, 0.2), "note").unwrap();
    let rect = tree
        .add_shape(left, Bounds::new(0.15, 0.15, 0.1, 0.05))
        .unwrap();
    let legend = tree
        .add_legend(left, Point::new(0.3, 0.3), Size::new(0.1, 0.05))
        .unwrap();
    let x_label = tree
        .set_axis_label(upper, Axis::X, "time", Point::new(0.25, 0.5))
        .unwrap();

    (
        tree,
        Figure {
            left,
            main,
            upper,
            title,
            note,
            rect,
            legend,
            x_label,
        },
    )
}

/// Two sibling containers sharing the left edge x=0.2, and a small target
/// container to drag around
pub fn snap_figure() -> (ElementTree, ElementId, ElementId, ElementId) {
    let mut tree = ElementTree::new(1, Size::new(16.0, 12.0));
    let a = tree.add_container(Bounds::new(0.2, 0.1, 0.3, 0.2), None);
    let b = tree.add_container(Bounds::new(0.2, 0.5, 0.3, 0.2), None);
    let target = tree.add_container(Bounds::new(0.6, 0.75, 0.1, 0.1), None);
    (tree, a, b, target)
}

/// The script used by on-disk tests; the anchor is the `plt.show()` line
pub const SCRIPT: &str = "import matplotlib as mpl
import matplotlib.pyplot as plt

fig = plt.figure(1)
ax = fig.add_axes([0.1, 0.1, 0.35, 0.35])
ax.plot([1, 2, 3])

plt.show()
";

pub const SCRIPT_ANCHOR: usize = 7;

/// Write `text` to `plot.py` inside `dir`
pub fn write_script(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("plot.py");
    std::fs::write(&path, text).unwrap();
    path
}

/// Session over the standard figure backed by [`SCRIPT`] on disk
pub fn session(dir: &Path) -> (AppModel, Figure, PathBuf) {
    let path = write_script(dir, SCRIPT);
    let (tree, fig) = standard_figure();
    let model = AppModel::open(tree, &path, SCRIPT_ANCHOR, EditorConfig::default()).unwrap();
    (model, fig, path)
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// Lines strictly between the generated block markers of `text`
pub fn block_body(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|l| l.trim() == plotedit::model::START_MARKER)
        .expect("start marker");
    let end = lines
        .iter()
        .position(|l| l.trim() == plotedit::model::END_MARKER)
        .expect("end marker");
    lines[start + 1..end].iter().map(|l| l.trim().to_string()).collect()
}

//! Statement vocabulary of the generated block
//!
//! Every function returns the command text that follows an object path, starting
//! with the property selector (e.g. `.set_position([...])`). Numbers use fixed
//! six-decimal formatting so the output is byte-stable across round trips.

use crate::model::{Bounds, Point, Size};
use crate::reference::ReferencePath;
use crate::util::quote_literal;

/// Selectors of statements that create an element rather than update one
pub const CREATION_SELECTORS: &[&str] = &[".text", ".annotate", ".patches.append"];

fn num(v: f64) -> String {
    format!("{:.6}", v)
}

pub fn set_position(bounds: &Bounds) -> String {
    format!(
        ".set_position([{}, {}, {}, {}])",
        num(bounds.x),
        num(bounds.y),
        num(bounds.width),
        num(bounds.height)
    )
}

pub fn set_text_position(position: Point) -> String {
    format!(".set_position([{}, {}])", num(position.x), num(position.y))
}

pub fn set_anchor(anchor: Point) -> String {
    format!(".set_anchor([{}, {}])", num(anchor.x), num(anchor.y))
}

pub fn set_xy(origin: Point) -> String {
    format!(".set_xy([{}, {}])", num(origin.x), num(origin.y))
}

pub fn set_width(width: f64) -> String {
    format!(".set_width({})", num(width))
}

pub fn set_height(height: f64) -> String {
    format!(".set_height({})", num(height))
}

pub fn set_legend_loc(position: Point) -> String {
    format!("._set_loc(({}, {}))", num(position.x), num(position.y))
}

pub fn set_text(text: &str) -> String {
    format!(".set_text({})", quote_literal(text))
}

pub fn set_rotation(degrees: f64) -> String {
    format!(".set_rotation({})", num(degrees))
}

pub fn set_figure_size(size_cm: Size) -> String {
    format!(
        ".set_size_inches({}/2.54, {}/2.54, forward=True)",
        num(size_cm.width),
        num(size_cm.height)
    )
}

pub fn hide() -> String {
    ".set_visible(False)".to_string()
}

pub fn create_text(root: &ReferencePath, position: Point, text: &str) -> String {
    format!(
        ".text({}, {}, {}, transform={}.transFigure)",
        num(position.x),
        num(position.y),
        quote_literal(text),
        root
    )
}

pub fn create_annotation(root: &ReferencePath, text: &str, anchor: Point, position: Point) -> String {
    format!(
        ".annotate({}, xy=({}, {}), xytext=({}, {}), xycoords={root}.transFigure, textcoords={root}.transFigure)",
        quote_literal(text),
        num(anchor.x),
        num(anchor.y),
        num(position.x),
        num(position.y),
        root = root
    )
}

pub fn create_rectangle(root: &ReferencePath, bounds: &Bounds) -> String {
    format!(
        ".patches.append(mpl.patches.Rectangle(({}, {}), {}, {}, transform={}.transFigure))",
        num(bounds.x),
        num(bounds.y),
        num(bounds.width),
        num(bounds.height),
        root
    )
}

/// Trailing comment tagging a creation statement with the path it creates
pub fn creation_tag(created: &ReferencePath) -> String {
    format!("  # id={}.new", created)
}

/// Header statement that defines the label lookup table used by `ax_dict` paths
pub fn label_table_header(root: &ReferencePath) -> String {
    format!(
        "{root}.ax_dict = {{ax.get_label(): ax for ax in {root}.axes}}",
        root = root
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::root_path;

    #[test]
    fn test_fixed_precision() {
        assert_eq!(
            set_position(&Bounds::new(0.1, 0.2, 0.3, 0.25)),
            ".set_position([0.100000, 0.200000, 0.300000, 0.250000])"
        );
        assert_eq!(set_width(0.5), ".set_width(0.500000)");
        assert_eq!(
            set_figure_size(Size::new(16.0, 12.0)),
            ".set_size_inches(16.000000/2.54, 12.000000/2.54, forward=True)"
        );
    }

    #[test]
    fn test_creation_statements() {
        let root = root_path(1);
        assert_eq!(
            create_text(&root, Point::new(0.5, 0.5), "New Text"),
            ".text(0.500000, 0.500000, \"New Text\", transform=plt.figure(1).transFigure)"
        );
        assert_eq!(
            create_rectangle(&root, &Bounds::new(0.1, 0.1, 0.2, 0.2)),
            ".patches.append(mpl.patches.Rectangle((0.100000, 0.100000), 0.200000, 0.200000, transform=plt.figure(1).transFigure))"
        );
        assert!(create_annotation(&root, "peak", Point::new(0.2, 0.3), Point::new(0.4, 0.5))
            .starts_with(".annotate(\"peak\", xy=(0.200000, 0.300000), xytext=(0.400000, 0.500000)"));
    }

    #[test]
    fn test_label_table_header() {
        assert_eq!(
            label_table_header(&root_path(1)),
            "plt.figure(1).ax_dict = {ax.get_label(): ax for ax in plt.figure(1).axes}"
        );
    }

    #[test]
    fn test_text_is_quoted() {
        assert_eq!(set_text("a \"b\""), ".set_text(\"a \\\"b\\\"\")");
    }
}

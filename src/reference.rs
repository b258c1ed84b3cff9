//! Reference resolver - serializable paths from the figure root to an element
//!
//! `resolve` and `evaluate` are inverses of each other for every element that is
//! attached to the tree. Paths are cheap to compute and depend on sibling order,
//! so callers resolve them when they need them instead of storing them.
//!
//! Vocabulary:
//! - figure: `plt.figure(1)`
//! - container: `plt.figure(1).axes[0]`, or `plt.figure(1).ax_dict["label"]` when labelled
//! - texts / shapes / legends: `<owner>.texts[i]`, `<owner>.patches[i]`, `<owner>.legends[i]`
//! - axis labels: `<container>.xaxis.label`, `<container>.yaxis.label`

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{EditError, Result};
use crate::model::{ElementId, ElementKind, ElementTree};

static ROOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^plt\.figure\((\d+)\)").expect("valid root regex"));

static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\.(?:(?P<list>axes|texts|patches|legends)\[(?P<index>\d+)\]|ax_dict\["(?P<label>[^"\\]*)"\]|(?P<role>[xy])axis\.label)"#,
    )
    .expect("valid segment regex")
});

/// Immutable path expression naming one element from the figure root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferencePath(String);

impl ReferencePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the path goes through the label lookup table
    pub fn uses_label_lookup(&self) -> bool {
        self.0.contains(".ax_dict[")
    }

    fn child(&self, segment: impl fmt::Display) -> ReferencePath {
        ReferencePath(format!("{}{}", self.0, segment))
    }
}

impl fmt::Display for ReferencePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReferencePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ReferencePath> for String {
    fn from(path: ReferencePath) -> Self {
        path.0
    }
}

/// Literal path of the figure with the given number
pub fn root_path(figure_number: u32) -> ReferencePath {
    ReferencePath(format!("plt.figure({})", figure_number))
}

/// A label can be used as a lookup key when it survives quoting untouched
/// and stays on one line
fn is_keyable_label(label: &str) -> bool {
    !label.is_empty() && !label.contains(['"', '\\']) && !label.chars().any(char::is_control)
}

/// Containers of the figure carrying exactly `label`
fn containers_labelled<'a>(
    tree: &'a ElementTree,
    label: &'a str,
) -> impl Iterator<Item = ElementId> + 'a {
    tree.containers()
        .iter()
        .copied()
        .filter(move |&c| tree.get(c).and_then(|c| c.label.as_deref()) == Some(label))
}

/// Compute the path of an element
///
/// Fails with `DetachedElement` when the element is not reachable from the root.
pub fn resolve(tree: &ElementTree, id: ElementId) -> Result<ReferencePath> {
    let el = tree.element(id)?;
    let root = tree.root_element();
    let root_ref = root_path(tree.figure_number());

    match el.kind {
        ElementKind::Root => {
            if id == tree.root() {
                Ok(root_ref)
            } else {
                Err(EditError::DetachedElement(id))
            }
        }
        ElementKind::Container => resolve_container(tree, id),
        ElementKind::Shape | ElementKind::Legend => {
            let segment = if el.kind == ElementKind::Shape {
                "patches"
            } else {
                "legends"
            };
            let owner = el.parent.ok_or(EditError::DetachedElement(id))?;
            let owner_el = tree.element(owner)?;
            let list = match el.kind {
                ElementKind::Shape => &owner_el.children.shapes,
                _ => &owner_el.children.legends,
            };
            let index = list
                .iter()
                .position(|&c| c == id)
                .ok_or(EditError::DetachedElement(id))?;
            let owner_ref = match owner_el.kind {
                ElementKind::Root => root_ref,
                ElementKind::Container => resolve_container(tree, owner)?,
                _ => return Err(EditError::DetachedElement(id)),
            };
            Ok(owner_ref.child(format_args!(".{}[{}]", segment, index)))
        }
        ElementKind::TextLabel => {
            // Owning container's text list first
            if let Some(owner) = el.parent.and_then(|p| tree.get(p)) {
                if owner.kind == ElementKind::Container {
                    if let Some(index) = owner.children.texts.iter().position(|&c| c == id) {
                        return Ok(resolve_container(tree, owner.id)?
                            .child(format_args!(".texts[{}]", index)));
                    }
                }
            }
            // Then the figure's own texts
            if let Some(index) = root.children.texts.iter().position(|&c| c == id) {
                return Ok(root_ref.child(format_args!(".texts[{}]", index)));
            }
            // Finally the axis-label roles of any container
            for &container in &root.children.containers {
                let Some(c) = tree.get(container) else {
                    continue;
                };
                if c.children.x_label == Some(id) {
                    return Ok(resolve_container(tree, container)?.child(".xaxis.label"));
                }
                if c.children.y_label == Some(id) {
                    return Ok(resolve_container(tree, container)?.child(".yaxis.label"));
                }
            }
            Err(EditError::DetachedElement(id))
        }
    }
}

fn resolve_container(tree: &ElementTree, id: ElementId) -> Result<ReferencePath> {
    let root_ref = root_path(tree.figure_number());
    let index = tree
        .containers()
        .iter()
        .position(|&c| c == id)
        .ok_or(EditError::DetachedElement(id))?;
    let label = tree.element(id)?.label.as_deref();
    // A shared label would make the lookup name several containers
    match label {
        Some(label) if is_keyable_label(label) && containers_labelled(tree, label).nth(1).is_none() => {
            Ok(root_ref.child(format_args!(".ax_dict[\"{}\"]", label)))
        }
        _ => Ok(root_ref.child(format_args!(".axes[{}]", index))),
    }
}

/// Evaluate a path against the live tree
pub fn evaluate(tree: &ElementTree, path: &str) -> Result<ElementId> {
    let unresolved = || EditError::UnresolvedPath(path.to_string());

    let caps = ROOT_RE.captures(path).ok_or_else(unresolved)?;
    let number: u32 = caps[1].parse().map_err(|_| unresolved())?;
    if number != tree.figure_number() {
        return Err(unresolved());
    }

    let mut current = tree.root();
    let mut rest = &path[caps[0].len()..];
    while !rest.is_empty() {
        let seg = SEGMENT_RE.captures(rest).ok_or_else(unresolved)?;
        let el = tree.element(current)?;

        current = if let Some(list) = seg.name("list") {
            let index: usize = seg["index"].parse().map_err(|_| unresolved())?;
            let children = &el.children;
            let items = match (list.as_str(), el.kind) {
                ("axes", ElementKind::Root) => &children.containers,
                ("texts", k) if k.can_own() => &children.texts,
                ("patches", k) if k.can_own() => &children.shapes,
                ("legends", k) if k.can_own() => &children.legends,
                _ => return Err(unresolved()),
            };
            *items.get(index).ok_or_else(unresolved)?
        } else if let Some(label) = seg.name("label") {
            if el.kind != ElementKind::Root {
                return Err(unresolved());
            }
            let mut matches = containers_labelled(tree, label.as_str());
            match (matches.next(), matches.next()) {
                (Some(container), None) => container,
                _ => return Err(unresolved()),
            }
        } else {
            if el.kind != ElementKind::Container {
                return Err(unresolved());
            }
            let slot = match &seg["role"] {
                "x" => el.children.x_label,
                _ => el.children.y_label,
            };
            slot.ok_or_else(unresolved)?
        };

        rest = &rest[seg[0].len()..];
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Axis, Bounds, Point, Size};

    #[test]
    fn test_root_path() {
        let tree = ElementTree::new(3, Size::new(10.0, 10.0));
        assert_eq!(resolve(&tree, tree.root()).unwrap().as_str(), "plt.figure(3)");
        assert_eq!(evaluate(&tree, "plt.figure(3)").unwrap(), tree.root());
    }

    #[test]
    fn test_container_index_and_label_paths() {
        let mut tree = ElementTree::new(1, Size::new(10.0, 10.0));
        let a = tree.add_container(Bounds::new(0.1, 0.1, 0.3, 0.3), None);
        let b = tree.add_container(Bounds::new(0.5, 0.1, 0.3, 0.3), Some("b"));
        let c = tree.add_container(Bounds::new(0.5, 0.5, 0.3, 0.3), Some("say \"hi\""));

        assert_eq!(resolve(&tree, a).unwrap().as_str(), "plt.figure(1).axes[0]");
        assert_eq!(
            resolve(&tree, b).unwrap().as_str(),
            "plt.figure(1).ax_dict[\"b\"]"
        );
        // Labels that would need escaping fall back to the index form
        assert_eq!(resolve(&tree, c).unwrap().as_str(), "plt.figure(1).axes[2]");
        assert!(resolve(&tree, b).unwrap().uses_label_lookup());
    }

    #[test]
    fn test_shared_or_multiline_labels_use_index_form() {
        let mut tree = ElementTree::new(1, Size::new(10.0, 10.0));
        let a = tree.add_container(Bounds::new(0.1, 0.1, 0.3, 0.3), Some("a"));
        let b = tree.add_container(Bounds::new(0.5, 0.1, 0.3, 0.3), Some("a"));
        let c = tree.add_container(Bounds::new(0.5, 0.5, 0.3, 0.3), Some("two\nlines"));

        assert_eq!(resolve(&tree, a).unwrap().as_str(), "plt.figure(1).axes[0]");
        assert_eq!(resolve(&tree, b).unwrap().as_str(), "plt.figure(1).axes[1]");
        assert_eq!(resolve(&tree, c).unwrap().as_str(), "plt.figure(1).axes[2]");
        for id in [a, b, c] {
            let path = resolve(&tree, id).unwrap();
            assert_eq!(evaluate(&tree, path.as_str()).unwrap(), id);
        }

        // An ambiguous lookup names no container at all
        assert!(matches!(
            evaluate(&tree, "plt.figure(1).ax_dict[\"a\"]"),
            Err(EditError::UnresolvedPath(_))
        ));
    }

    #[test]
    fn test_text_search_order_and_roles() {
        let mut tree = ElementTree::new(1, Size::new(10.0, 10.0));
        let axes = tree.add_container(Bounds::new(0.1, 0.1, 0.3, 0.3), None);
        let in_axes = tree.add_text(axes, Point::new(0.2, 0.2), "a").unwrap();
        let in_fig = tree.add_text(tree.root(), Point::new(0.5, 0.9), "title").unwrap();
        let xlabel = tree
            .set_axis_label(axes, Axis::X, "time", Point::new(0.2, 0.05))
            .unwrap();

        assert_eq!(
            resolve(&tree, in_axes).unwrap().as_str(),
            "plt.figure(1).axes[0].texts[0]"
        );
        assert_eq!(
            resolve(&tree, in_fig).unwrap().as_str(),
            "plt.figure(1).texts[0]"
        );
        assert_eq!(
            resolve(&tree, xlabel).unwrap().as_str(),
            "plt.figure(1).axes[0].xaxis.label"
        );
    }

    #[test]
    fn test_resolve_evaluate_are_inverse() {
        let mut tree = ElementTree::new(2, Size::new(10.0, 10.0));
        let root = tree.root();
        let a = tree.add_container(Bounds::new(0.1, 0.1, 0.3, 0.3), Some("left"));
        let mut ids = vec![root, a];
        ids.push(tree.add_text(a, Point::new(0.1, 0.1), "t").unwrap());
        ids.push(tree.add_shape(a, Bounds::new(0.1, 0.1, 0.1, 0.1)).unwrap());
        ids.push(tree.add_shape(root, Bounds::new(0.1, 0.1, 0.1, 0.1)).unwrap());
        ids.push(
            tree.add_legend(a, Point::new(0.3, 0.3), Size::new(0.1, 0.05))
                .unwrap(),
        );
        ids.push(
            tree.set_axis_label(a, Axis::Y, "v", Point::new(0.0, 0.2))
                .unwrap(),
        );

        for id in ids {
            let path = resolve(&tree, id).unwrap();
            assert_eq!(evaluate(&tree, path.as_str()).unwrap(), id, "{}", path);
        }
    }

    #[test]
    fn test_paths_follow_sibling_order() {
        let mut tree = ElementTree::new(1, Size::new(10.0, 10.0));
        let root = tree.root();
        let first = tree.add_text(root, Point::new(0.1, 0.1), "a").unwrap();
        let second = tree.add_text(root, Point::new(0.2, 0.2), "b").unwrap();
        assert_eq!(
            resolve(&tree, second).unwrap().as_str(),
            "plt.figure(1).texts[1]"
        );
        tree.remove(first).unwrap();
        assert_eq!(
            resolve(&tree, second).unwrap().as_str(),
            "plt.figure(1).texts[0]"
        );
    }

    #[test]
    fn test_detached_element() {
        let mut tree = ElementTree::new(1, Size::new(10.0, 10.0));
        let root = tree.root();
        let text = tree.add_text(root, Point::new(0.1, 0.1), "a").unwrap();
        tree.remove(text).unwrap();
        assert!(matches!(
            resolve(&tree, text),
            Err(EditError::DetachedElement(id)) if id == text
        ));
    }

    #[test]
    fn test_evaluate_rejects_unknown_paths() {
        let mut tree = ElementTree::new(1, Size::new(10.0, 10.0));
        tree.add_container(Bounds::new(0.1, 0.1, 0.3, 0.3), None);
        for bad in [
            "plt.figure(2)",
            "plt.figure(1).axes[1]",
            "plt.figure(1).axes[0].axes[0]",
            "plt.figure(1).ax_dict[\"missing\"]",
            "plt.figure(1).texts[0].xaxis.label",
            "fig.axes[0]",
            "plt.figure(1).axes[0]extra",
        ] {
            assert!(
                matches!(evaluate(&tree, bad), Err(EditError::UnresolvedPath(_))),
                "{} should not resolve",
                bad
            );
        }
    }
}

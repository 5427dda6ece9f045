//! Conversion between stored, parent-linked menu rows and the nested tree the
//! admin editor and the site header work with.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::MenuItem;

/// Deepest nesting accepted on save and rendered on read.
pub const MAX_DEPTH: usize = 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    #[error("menu is nested deeper than {MAX_DEPTH} levels")]
    TooDeep,

    #[error("menu item {0} has an empty label")]
    MissingLabel(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub label: String,
    #[serde(default = "default_href")]
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub children: Vec<MenuNode>,
}

fn default_href() -> String {
    "#".to_owned()
}

fn default_active() -> bool {
    true
}

/// One row to insert, in depth-first order so a parent always precedes its children.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatItem<'a> {
    /// Index of the parent within the flattened list.
    pub parent: Option<usize>,
    pub sort_order: i32,
    pub label: &'a str,
    pub href: &'a str,
    pub target: Option<&'a str>,
    pub active: bool,
}

/// Nests stored rows under their parents and orders every sibling group by
/// `sort_order`. Rows pointing at a missing parent (or at themselves) become
/// roots; rows only reachable through a cycle are dropped.
pub fn build_tree(rows: &[MenuItem]) -> Vec<MenuNode> {
    let ids: HashSet<i32> = rows.iter().map(|r| r.id).collect();
    let mut by_parent: HashMap<Option<i32>, Vec<&MenuItem>> = HashMap::new();

    for row in rows {
        let parent = row.parent_id.filter(|p| *p != row.id && ids.contains(p));
        by_parent.entry(parent).or_default().push(row);
    }

    for siblings in by_parent.values_mut() {
        siblings.sort_by_key(|row| (row.sort_order, row.id));
    }

    attach(None, &by_parent, 1)
}

fn attach(
    parent: Option<i32>,
    by_parent: &HashMap<Option<i32>, Vec<&MenuItem>>,
    depth: usize,
) -> Vec<MenuNode> {
    let Some(siblings) = by_parent.get(&parent) else {
        return Vec::new();
    };

    siblings
        .iter()
        .map(|row| MenuNode {
            id: Some(row.id),
            label: row.label.clone(),
            href: row.href.clone(),
            target: row.target.clone(),
            sort_order: row.sort_order,
            active: row.active,
            children: if depth < MAX_DEPTH {
                attach(Some(row.id), by_parent, depth + 1)
            } else {
                Vec::new()
            },
        })
        .collect()
}

/// Flattens an edited tree into insert order. Sort order is the position
/// within the sibling list; incoming ids and sort orders are ignored.
pub fn flatten(nodes: &[MenuNode]) -> Result<Vec<FlatItem<'_>>, TreeError> {
    let mut out = Vec::new();
    walk(nodes, None, 1, &mut out)?;
    Ok(out)
}

fn walk<'a>(
    nodes: &'a [MenuNode],
    parent: Option<usize>,
    depth: usize,
    out: &mut Vec<FlatItem<'a>>,
) -> Result<(), TreeError> {
    if nodes.is_empty() {
        return Ok(());
    }
    if depth > MAX_DEPTH {
        return Err(TreeError::TooDeep);
    }

    for (position, node) in nodes.iter().enumerate() {
        let index = out.len();
        let label = node.label.trim();
        if label.is_empty() {
            return Err(TreeError::MissingLabel(index));
        }

        let href = node.href.trim();

        out.push(FlatItem {
            parent,
            sort_order: position as i32,
            label,
            href: if href.is_empty() { "#" } else { href },
            target: node.target.as_deref().filter(|t| !t.is_empty()),
            active: node.active,
        });

        walk(&node.children, Some(index), depth + 1, out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(label: &str, href: &str, children: Vec<MenuNode>) -> MenuNode {
        MenuNode {
            id: None,
            label: label.to_owned(),
            href: href.to_owned(),
            target: None,
            sort_order: 0,
            active: true,
            children,
        }
    }

    /// Emulates the insert loop: row ids are assigned in flatten order.
    fn store(flat: &[FlatItem<'_>]) -> Vec<MenuItem> {
        flat.iter()
            .enumerate()
            .map(|(i, item)| MenuItem {
                id: i as i32 + 100,
                menu_id: 1,
                parent_id: item.parent.map(|p| p as i32 + 100),
                label: item.label.to_owned(),
                href: item.href.to_owned(),
                target: item.target.map(str::to_owned),
                sort_order: item.sort_order,
                active: item.active,
            })
            .collect()
    }

    /// Drops storage-assigned fields so trees can be compared by shape.
    fn shape(nodes: &[MenuNode]) -> Vec<MenuNode> {
        nodes
            .iter()
            .map(|n| MenuNode {
                id: None,
                sort_order: 0,
                children: shape(&n.children),
                ..n.clone()
            })
            .collect()
    }

    fn sample(depth: usize) -> Vec<MenuNode> {
        let mut leaf = node("Car", "/buy/car", vec![]);
        leaf.target = Some("_blank".to_owned());

        let mut second = node("Buy", "/buy", vec![leaf, node("Truck", "/buy/truck", vec![])]);
        let mut inactive = node("Recharge", "/recharge", vec![]);
        inactive.active = false;

        match depth {
            1 => vec![node("Home", "/", vec![]), inactive],
            2 => vec![node("Home", "/", vec![]), second, inactive],
            _ => {
                second.children[0].children = vec![
                    node("SBI", "/buy/car/sbi", vec![]),
                    node("ICICI", "/buy/car/icici", vec![]),
                ];
                vec![node("Home", "/", vec![]), second, inactive]
            }
        }
    }

    #[test]
    fn round_trip_preserves_shape_for_depths_one_to_three() {
        for depth in 1..=3 {
            let tree = sample(depth);
            let rows = store(&flatten(&tree).unwrap());

            assert_eq!(shape(&build_tree(&rows)), shape(&tree), "depth {depth}");
        }
    }

    #[test]
    fn read_path_ignores_row_order() {
        let tree = sample(3);
        let mut rows = store(&flatten(&tree).unwrap());
        rows.reverse();

        assert_eq!(shape(&build_tree(&rows)), shape(&tree));
    }

    #[test]
    fn sort_order_follows_sibling_position() {
        let tree = sample(2);
        let flat = flatten(&tree).unwrap();

        let orders: Vec<_> = flat.iter().map(|f| (f.label, f.parent, f.sort_order)).collect();
        assert_eq!(
            orders,
            [
                ("Home", None, 0),
                ("Buy", None, 1),
                ("Car", Some(1), 0),
                ("Truck", Some(1), 1),
                ("Recharge", None, 2),
            ]
        );
    }

    #[test]
    fn saving_twice_is_idempotent() {
        let tree = sample(3);
        let first = build_tree(&store(&flatten(&tree).unwrap()));
        let second = build_tree(&store(&flatten(&first).unwrap()));

        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn orphans_become_roots_and_cycles_are_dropped() {
        let row = |id, parent_id, sort_order| MenuItem {
            id,
            menu_id: 1,
            parent_id,
            label: format!("item-{id}"),
            href: "#".to_owned(),
            target: None,
            sort_order,
            active: true,
        };

        let rows = vec![
            row(1, None, 1),
            row(2, Some(99), 0),
            row(3, Some(4), 0),
            row(4, Some(3), 0),
            row(5, Some(5), 2),
        ];

        let labels: Vec<_> = build_tree(&rows).into_iter().map(|n| n.label).collect();
        assert_eq!(labels, ["item-2", "item-1", "item-5"]);
    }

    #[test]
    fn deep_trees_are_rejected_on_save() {
        let mut tree = node("leaf", "#", vec![]);
        for level in 0..MAX_DEPTH {
            tree = node(&format!("level-{level}"), "#", vec![tree]);
        }

        assert_eq!(flatten(&[tree]), Err(TreeError::TooDeep));
    }

    #[test]
    fn empty_labels_are_rejected() {
        let tree = vec![node("Home", "/", vec![node("  ", "/x", vec![])])];

        assert_eq!(flatten(&tree), Err(TreeError::MissingLabel(1)));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: Vec<MenuNode> = serde_json::from_str(
            r#"[{"label":"Home","href":"/"},{"label":"Buy","children":[{"label":"Car","href":"/buy/car"}]}]"#,
        )
        .unwrap();

        assert!(parsed.iter().all(|n| n.active));
        assert_eq!(parsed[1].href, "#");
        assert_eq!(parsed[1].children.len(), 1);
    }
}

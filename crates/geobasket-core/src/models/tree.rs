//! Arena-backed selection tree.
//!
//! The hierarchy produced by a discovery pass is a plain owned tree of
//! [`TreeItem`] records addressed by stable [`ItemId`]s. Rendering is a pure
//! projection of this structure; nothing here touches a widget toolkit.
//!
//! Invariant: only leaf items without the disabled flag are checkable or
//! selectable. Sibling display order is deterministic by case-insensitive
//! name sort, never by arrival order.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::export::ExportInfo;
use super::layer::LayerCandidate;
use super::service::ServiceDescriptor;

/// Stable identifier of one tree item within its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub usize);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Non-selectable container item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupItem {
    /// The service this group represents, when it is a service group
    pub service: Option<ServiceDescriptor>,

    /// Set when the group is an error placeholder (failed capabilities)
    pub disabled: bool,
    pub disabled_reason: Option<String>,

    pub children: Vec<ItemId>,
}

/// Selectable item carrying one layer candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafItem {
    /// Absent on error leaves and on the global-properties item
    pub candidate: Option<LayerCandidate>,

    /// Export state; absent on error leaves
    pub export: Option<ExportInfo>,

    pub checked: bool,
    pub disabled: bool,
    pub disabled_reason: Option<String>,

    /// The distinguished default-parameters item
    pub is_global_properties: bool,
}

impl LeafItem {
    /// A selectable layer leaf with its export info attached
    pub fn layer(candidate: LayerCandidate, export: ExportInfo, checked: bool) -> Self {
        Self {
            candidate: Some(candidate),
            export: Some(export),
            checked,
            disabled: false,
            disabled_reason: None,
            is_global_properties: false,
        }
    }

    /// A disabled error placeholder
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            candidate: None,
            export: None,
            checked: false,
            disabled: true,
            disabled_reason: Some(reason.into()),
            is_global_properties: false,
        }
    }

    /// The distinguished global-properties item
    pub fn global_properties(export: ExportInfo) -> Self {
        Self {
            candidate: None,
            export: Some(export),
            checked: false,
            disabled: false,
            disabled_reason: None,
            is_global_properties: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Group(GroupItem),
    Leaf(LeafItem),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeItem {
    pub id: ItemId,
    pub parent: Option<ItemId>,
    pub display_name: String,
    pub kind: ItemKind,
}

impl TreeItem {
    pub fn as_group(&self) -> Option<&GroupItem> {
        match &self.kind {
            ItemKind::Group(group) => Some(group),
            ItemKind::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafItem> {
        match &self.kind {
            ItemKind::Leaf(leaf) => Some(leaf),
            ItemKind::Group(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut LeafItem> {
        match &mut self.kind {
            ItemKind::Leaf(leaf) => Some(leaf),
            ItemKind::Group(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, ItemKind::Leaf(_))
    }
}

/// The selection hierarchy of one discovery pass.
///
/// Created once per pass and replaced wholesale by the next one; item ids are
/// only meaningful within the tree that issued them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTree {
    items: Vec<TreeItem>,
    root: ItemId,
}

impl LayerTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = TreeItem {
            id: ItemId(0),
            parent: None,
            display_name: root_name.into(),
            kind: ItemKind::Group(GroupItem {
                service: None,
                disabled: false,
                disabled_reason: None,
                children: Vec::new(),
            }),
        };
        Self { items: vec![root], root: ItemId(0) }
    }

    pub fn root(&self) -> ItemId {
        self.root
    }

    pub fn get(&self, id: ItemId) -> Option<&TreeItem> {
        self.items.get(id.0)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut TreeItem> {
        self.items.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, parent: ItemId, display_name: String, kind: ItemKind) -> ItemId {
        let id = ItemId(self.items.len());
        self.items.push(TreeItem { id, parent: Some(parent), display_name, kind });
        if let Some(ItemKind::Group(group)) = self.items.get_mut(parent.0).map(|p| &mut p.kind) {
            group.children.push(id);
        }
        id
    }

    /// Append a container group under `parent`
    pub fn add_group(
        &mut self,
        parent: ItemId,
        display_name: impl Into<String>,
        service: Option<ServiceDescriptor>,
    ) -> ItemId {
        self.push(
            parent,
            display_name.into(),
            ItemKind::Group(GroupItem {
                service,
                disabled: false,
                disabled_reason: None,
                children: Vec::new(),
            }),
        )
    }

    /// Append a disabled placeholder group (failed service)
    pub fn add_disabled_group(
        &mut self,
        parent: ItemId,
        display_name: impl Into<String>,
        service: Option<ServiceDescriptor>,
        reason: impl Into<String>,
    ) -> ItemId {
        self.push(
            parent,
            display_name.into(),
            ItemKind::Group(GroupItem {
                service,
                disabled: true,
                disabled_reason: Some(reason.into()),
                children: Vec::new(),
            }),
        )
    }

    /// Append a leaf under `parent`
    pub fn add_leaf(
        &mut self,
        parent: ItemId,
        display_name: impl Into<String>,
        leaf: LeafItem,
    ) -> ItemId {
        self.push(parent, display_name.into(), ItemKind::Leaf(leaf))
    }

    /// Children of an item sorted by display name, case-insensitive
    /// ascending, with groups stable relative to leaves only through the
    /// name sort. Ties break on insertion id so the order is total.
    pub fn children_sorted(&self, id: ItemId) -> Vec<ItemId> {
        let mut children: Vec<ItemId> = self
            .get(id)
            .and_then(TreeItem::as_group)
            .map(|group| group.children.clone())
            .unwrap_or_default();
        children.sort_by(|a, b| {
            let name_a = self.items[a.0].display_name.to_lowercase();
            let name_b = self.items[b.0].display_name.to_lowercase();
            name_a.cmp(&name_b).then(a.0.cmp(&b.0))
        });
        children
    }

    /// Whether an item can be selected: an enabled leaf
    pub fn is_selectable(&self, id: ItemId) -> bool {
        self.get(id)
            .and_then(TreeItem::as_leaf)
            .map(|leaf| !leaf.disabled)
            .unwrap_or(false)
    }

    fn dfs_sorted(&self, id: ItemId, out: &mut Vec<ItemId>) {
        for child in self.children_sorted(id) {
            match &self.items[child.0].kind {
                ItemKind::Leaf(_) => out.push(child),
                ItemKind::Group(_) => self.dfs_sorted(child, out),
            }
        }
    }

    /// All leaves in depth-first, display-sorted order
    pub fn leaves(&self) -> Vec<ItemId> {
        let mut out = Vec::new();
        self.dfs_sorted(self.root, &mut out);
        out
    }

    /// Checked, enabled layer leaves in depth-first order.
    ///
    /// The global-properties item and error leaves never appear here.
    pub fn checked_leaves(&self) -> Vec<ItemId> {
        self.leaves()
            .into_iter()
            .filter(|id| {
                self.items[id.0]
                    .as_leaf()
                    .map(|leaf| {
                        leaf.checked && !leaf.disabled && !leaf.is_global_properties
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn checked_count(&self) -> usize {
        self.checked_leaves().len()
    }

    fn leaf_checkable(leaf: &LeafItem) -> bool {
        !leaf.disabled && !leaf.is_global_properties
    }

    /// Set the checked flag on one item. Checking a group cascades to every
    /// checkable descendant leaf. Returns how many leaves changed state.
    pub fn set_checked(&mut self, id: ItemId, checked: bool) -> usize {
        let children = match self.get(id) {
            Some(item) => match &item.kind {
                ItemKind::Group(group) => Some(group.children.clone()),
                ItemKind::Leaf(_) => None,
            },
            None => return 0,
        };
        match children {
            Some(children) => children
                .into_iter()
                .map(|child| self.set_checked(child, checked))
                .sum(),
            None => {
                if let Some(leaf) = self.get_mut(id).and_then(TreeItem::as_leaf_mut) {
                    if Self::leaf_checkable(leaf) && leaf.checked != checked {
                        leaf.checked = checked;
                        return 1;
                    }
                }
                0
            }
        }
    }

    /// Check every checkable leaf. Returns how many changed state.
    pub fn select_all(&mut self) -> usize {
        self.set_checked(self.root, true)
    }

    /// The distinguished global-properties item, when present
    pub fn global_properties_item(&self) -> Option<ItemId> {
        self.items
            .iter()
            .find(|item| item.as_leaf().map(|leaf| leaf.is_global_properties).unwrap_or(false))
            .map(|item| item.id)
    }
}

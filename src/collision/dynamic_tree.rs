//! Dynamic AABB tree: the broad phase's spatial index.
//!
//! A binary tree of fattened AABBs, rebalanced incrementally on insert
//! using a surface-area-heuristic insertion cost, matching Box2D's
//! `b2DynamicTree`. Leaves carry an opaque payload (a fixture/shape
//! handle) supplied by the caller.

use smallvec::SmallVec;

use super::aabb::Aabb;
use crate::types::{Real, Vec2};

const NULL_NODE: i32 = -1;

#[derive(Copy, Clone, Debug)]
struct Node<T> {
    aabb: Aabb,
    user_data: Option<T>,
    parent_or_next: i32,
    child1: i32,
    child2: i32,
    /// Leaf height is 0; `-1` marks a free-list entry.
    height: i32,
}

impl<T: Copy> Node<T> {
    fn is_leaf(&self) -> bool {
        self.child1 == NULL_NODE
    }
}

/// A dynamic AABB tree keyed by opaque `i32` proxy ids.
pub struct DynamicTree<T> {
    nodes: Vec<Node<T>>,
    root: i32,
    free_list: i32,
    node_count: i32,
    insertion_count: u32,
}

impl<T: Copy> Default for DynamicTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> DynamicTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: NULL_NODE,
            free_list: NULL_NODE,
            node_count: 0,
            insertion_count: 0,
        }
    }

    fn allocate_node(&mut self) -> i32 {
        if self.free_list == NULL_NODE {
            let index = self.nodes.len() as i32;
            self.nodes.push(Node {
                aabb: Aabb::EMPTY,
                user_data: None,
                parent_or_next: NULL_NODE,
                child1: NULL_NODE,
                child2: NULL_NODE,
                height: -1,
            });
            self.node_count += 1;
            return index;
        }

        let index = self.free_list;
        self.free_list = self.nodes[index as usize].parent_or_next;
        let node = &mut self.nodes[index as usize];
        node.parent_or_next = NULL_NODE;
        node.child1 = NULL_NODE;
        node.child2 = NULL_NODE;
        node.height = 0;
        node.user_data = None;
        self.node_count += 1;
        index
    }

    fn free_node(&mut self, index: i32) {
        let node = &mut self.nodes[index as usize];
        node.parent_or_next = self.free_list;
        node.height = -1;
        node.user_data = None;
        self.free_list = index;
        self.node_count -= 1;
    }

    /// Creates a leaf proxy with a fattened AABB and returns its id.
    pub fn create_proxy(&mut self, aabb: Aabb, margin: Real, data: T) -> i32 {
        let proxy = self.allocate_node();
        self.nodes[proxy as usize].aabb = aabb.fattened(margin);
        self.nodes[proxy as usize].user_data = Some(data);
        self.nodes[proxy as usize].height = 0;
        self.insert_leaf(proxy);
        proxy
    }

    pub fn destroy_proxy(&mut self, proxy: i32) {
        debug_assert!(self.nodes[proxy as usize].is_leaf());
        self.remove_leaf(proxy);
        self.free_node(proxy);
    }

    /// Re-inserts the proxy only if its fattened AABB no longer contains
    /// the tight AABB, mirroring Box2D's "fat AABB still valid" check.
    /// Returns `true` if the tree was modified.
    pub fn move_proxy(&mut self, proxy: i32, aabb: Aabb, margin: Real, displacement: Vec2) -> bool {
        let fat_current = self.nodes[proxy as usize].aabb;
        if fat_current.contains(&aabb) {
            return false;
        }

        self.remove_leaf(proxy);

        let mut fat = aabb.fattened(margin);
        // Predict motion direction so the fat box doesn't need re-insertion
        // next step if the body keeps moving the same way.
        if displacement.x < 0.0 {
            fat.lower.x += displacement.x;
        } else {
            fat.upper.x += displacement.x;
        }
        if displacement.y < 0.0 {
            fat.lower.y += displacement.y;
        } else {
            fat.upper.y += displacement.y;
        }

        self.nodes[proxy as usize].aabb = fat;
        self.insert_leaf(proxy);
        true
    }

    pub fn user_data(&self, proxy: i32) -> Option<T> {
        self.nodes[proxy as usize].user_data
    }

    pub fn fat_aabb(&self, proxy: i32) -> Aabb {
        self.nodes[proxy as usize].aabb
    }

    pub fn height(&self) -> i32 {
        if self.root == NULL_NODE {
            0
        } else {
            self.nodes[self.root as usize].height
        }
    }

    /// Visits every leaf whose fat AABB overlaps `aabb`.
    pub fn query(&self, aabb: &Aabb, mut callback: impl FnMut(i32) -> bool) {
        if self.root == NULL_NODE {
            return;
        }
        let mut stack: SmallVec<[i32; 64]> = SmallVec::new();
        stack.push(self.root);
        while let Some(node_id) = stack.pop() {
            if node_id == NULL_NODE {
                continue;
            }
            let node = &self.nodes[node_id as usize];
            if node.aabb.overlaps(aabb) {
                if node.is_leaf() {
                    if !callback(node_id) {
                        return;
                    }
                } else {
                    stack.push(node.child1);
                    stack.push(node.child2);
                }
            }
        }
    }

    /// Visits every leaf whose fat AABB the segment `p1 -> p2` might hit,
    /// narrowing the search AABB as `callback` returns a tighter fraction.
    pub fn ray_cast(&self, p1: Vec2, p2: Vec2, max_fraction: Real, mut callback: impl FnMut(i32, Vec2, Vec2) -> Real) {
        if self.root == NULL_NODE {
            return;
        }
        let mut fraction = max_fraction;
        let mut seg_aabb = Aabb {
            lower: p1.min(p1 + (p2 - p1) * fraction),
            upper: p1.max(p1 + (p2 - p1) * fraction),
        };

        let mut stack: SmallVec<[i32; 64]> = SmallVec::new();
        stack.push(self.root);
        while let Some(node_id) = stack.pop() {
            if node_id == NULL_NODE {
                continue;
            }
            let node = &self.nodes[node_id as usize];
            if !node.aabb.overlaps(&seg_aabb) {
                continue;
            }
            if node.is_leaf() {
                let value = callback(node_id, p1, p2);
                if value == 0.0 {
                    return;
                }
                if value < fraction {
                    fraction = value;
                    let target = p1 + (p2 - p1) * fraction;
                    seg_aabb = Aabb {
                        lower: p1.min(target),
                        upper: p1.max(target),
                    };
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }

    fn insert_leaf(&mut self, leaf: i32) {
        self.insertion_count += 1;

        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf as usize].parent_or_next = NULL_NODE;
            return;
        }

        let leaf_aabb = self.nodes[leaf as usize].aabb;
        let mut index = self.root;

        while !self.nodes[index as usize].is_leaf() {
            let child1 = self.nodes[index as usize].child1;
            let child2 = self.nodes[index as usize].child2;

            let area = self.nodes[index as usize].aabb.perimeter();
            let combined = Aabb::union(&self.nodes[index as usize].aabb, &leaf_aabb);
            let combined_area = combined.perimeter();

            let cost = 2.0 * combined_area;
            let inheritance_cost = 2.0 * (combined_area - area);

            let cost1 = Self::child_cost(&self.nodes[child1 as usize], leaf_aabb, inheritance_cost);
            let cost2 = Self::child_cost(&self.nodes[child2 as usize], leaf_aabb, inheritance_cost);

            if cost < cost1 && cost < cost2 {
                break;
            }

            index = if cost1 < cost2 { child1 } else { child2 };
        }

        let sibling = index;
        let old_parent = self.nodes[sibling as usize].parent_or_next;
        let new_parent = self.allocate_node();
        self.nodes[new_parent as usize].parent_or_next = old_parent;
        self.nodes[new_parent as usize].aabb = Aabb::union(&leaf_aabb, &self.nodes[sibling as usize].aabb);
        self.nodes[new_parent as usize].height = self.nodes[sibling as usize].height + 1;

        if old_parent != NULL_NODE {
            if self.nodes[old_parent as usize].child1 == sibling {
                self.nodes[old_parent as usize].child1 = new_parent;
            } else {
                self.nodes[old_parent as usize].child2 = new_parent;
            }
            self.nodes[new_parent as usize].child1 = sibling;
            self.nodes[new_parent as usize].child2 = leaf;
            self.nodes[sibling as usize].parent_or_next = new_parent;
            self.nodes[leaf as usize].parent_or_next = new_parent;
        } else {
            self.nodes[new_parent as usize].child1 = sibling;
            self.nodes[new_parent as usize].child2 = leaf;
            self.nodes[sibling as usize].parent_or_next = new_parent;
            self.nodes[leaf as usize].parent_or_next = new_parent;
            self.root = new_parent;
        }

        let mut idx = self.nodes[leaf as usize].parent_or_next;
        while idx != NULL_NODE {
            idx = self.balance(idx);

            let child1 = self.nodes[idx as usize].child1;
            let child2 = self.nodes[idx as usize].child2;

            self.nodes[idx as usize].height =
                1 + self.nodes[child1 as usize].height.max(self.nodes[child2 as usize].height);
            self.nodes[idx as usize].aabb =
                Aabb::union(&self.nodes[child1 as usize].aabb, &self.nodes[child2 as usize].aabb);

            idx = self.nodes[idx as usize].parent_or_next;
        }
    }

    fn child_cost(child: &Node<T>, leaf_aabb: Aabb, inheritance_cost: Real) -> Real {
        let combined = Aabb::union(&leaf_aabb, &child.aabb);
        if child.is_leaf() {
            combined.perimeter() + inheritance_cost
        } else {
            let old_area = child.aabb.perimeter();
            let new_area = combined.perimeter();
            (new_area - old_area) + inheritance_cost
        }
    }

    fn remove_leaf(&mut self, leaf: i32) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf as usize].parent_or_next;
        let grand_parent = self.nodes[parent as usize].parent_or_next;
        let sibling = if self.nodes[parent as usize].child1 == leaf {
            self.nodes[parent as usize].child2
        } else {
            self.nodes[parent as usize].child1
        };

        if grand_parent != NULL_NODE {
            if self.nodes[grand_parent as usize].child1 == parent {
                self.nodes[grand_parent as usize].child1 = sibling;
            } else {
                self.nodes[grand_parent as usize].child2 = sibling;
            }
            self.nodes[sibling as usize].parent_or_next = grand_parent;
            self.free_node(parent);

            let mut idx = grand_parent;
            while idx != NULL_NODE {
                idx = self.balance(idx);
                let child1 = self.nodes[idx as usize].child1;
                let child2 = self.nodes[idx as usize].child2;
                self.nodes[idx as usize].aabb =
                    Aabb::union(&self.nodes[child1 as usize].aabb, &self.nodes[child2 as usize].aabb);
                self.nodes[idx as usize].height =
                    1 + self.nodes[child1 as usize].height.max(self.nodes[child2 as usize].height);
                idx = self.nodes[idx as usize].parent_or_next;
            }
        } else {
            self.root = sibling;
            self.nodes[sibling as usize].parent_or_next = NULL_NODE;
            self.free_node(parent);
        }
    }

    /// Single AVL-style rotation around `idx` if its children differ in
    /// height by more than one. Returns the new subtree root.
    fn balance(&mut self, idx: i32) -> i32 {
        let node = self.nodes[idx as usize];
        if node.is_leaf() || node.height < 2 {
            return idx;
        }

        let a = idx;
        let i_b = node.child1;
        let i_c = node.child2;
        let balance = self.nodes[i_c as usize].height - self.nodes[i_b as usize].height;

        if balance > 1 {
            return self.rotate(a, i_c, i_b, true);
        }
        if balance < -1 {
            return self.rotate(a, i_b, i_c, false);
        }
        a
    }

    /// Rotates `a`'s heavy child `heavy` up to replace `a`, pushing `a`
    /// down with the lighter of `heavy`'s two children. `heavy_is_child2`
    /// selects which of `a`'s original children `heavy` was.
    fn rotate(&mut self, a: i32, heavy: i32, light_sibling: i32, heavy_is_child2: bool) -> i32 {
        let f = self.nodes[heavy as usize].child1;
        let g = self.nodes[heavy as usize].child2;

        self.nodes[heavy as usize].child1 = a;
        self.nodes[heavy as usize].parent_or_next = self.nodes[a as usize].parent_or_next;
        self.nodes[a as usize].parent_or_next = heavy;

        let old_parent = self.nodes[heavy as usize].parent_or_next;
        if old_parent != NULL_NODE {
            if self.nodes[old_parent as usize].child1 == a {
                self.nodes[old_parent as usize].child1 = heavy;
            } else {
                self.nodes[old_parent as usize].child2 = heavy;
            }
        } else {
            self.root = heavy;
        }

        // Swap in the taller of heavy's two children under `heavy`, drop
        // the other to `a`.
        if self.nodes[f as usize].height > self.nodes[g as usize].height {
            self.nodes[heavy as usize].child2 = f;
            if heavy_is_child2 {
                self.nodes[a as usize].child2 = g;
            } else {
                self.nodes[a as usize].child1 = g;
            }
            self.nodes[g as usize].parent_or_next = a;
        } else {
            self.nodes[heavy as usize].child2 = g;
            if heavy_is_child2 {
                self.nodes[a as usize].child2 = f;
            } else {
                self.nodes[a as usize].child1 = f;
            }
            self.nodes[f as usize].parent_or_next = a;
        }
        let _ = light_sibling;

        let a_c1 = self.nodes[a as usize].child1;
        let a_c2 = self.nodes[a as usize].child2;
        self.nodes[a as usize].aabb = Aabb::union(&self.nodes[a_c1 as usize].aabb, &self.nodes[a_c2 as usize].aabb);
        self.nodes[a as usize].height = 1 + self.nodes[a_c1 as usize].height.max(self.nodes[a_c2 as usize].height);

        let h_c1 = self.nodes[heavy as usize].child1;
        let h_c2 = self.nodes[heavy as usize].child2;
        self.nodes[heavy as usize].aabb = Aabb::union(&self.nodes[h_c1 as usize].aabb, &self.nodes[h_c2 as usize].aabb);
        self.nodes[heavy as usize].height =
            1 + self.nodes[h_c1 as usize].height.max(self.nodes[h_c2 as usize].height);

        heavy
    }

    /// Translates every node's AABB by `-origin`, used when the world
    /// re-centers to keep float precision for simulations that drift far
    /// from the origin (`b2BroadPhase::ShiftOrigin`). Relative positions
    /// between nodes are unchanged, so no rebalance is needed.
    pub fn shift_origin(&mut self, origin: Vec2) {
        for node in &mut self.nodes {
            if node.height < 0 {
                continue;
            }
            node.aabb.lower -= origin;
            node.aabb.upper -= origin;
        }
    }

    pub fn node_count(&self) -> i32 {
        self.node_count
    }

    pub fn insertion_count(&self) -> u32 {
        self.insertion_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_at(x: Real, y: Real) -> Aabb {
        Aabb {
            lower: Vec2::new(x - 0.5, y - 0.5),
            upper: Vec2::new(x + 0.5, y + 0.5),
        }
    }

    #[test]
    fn query_finds_overlapping_proxies() {
        let mut tree: DynamicTree<i32> = DynamicTree::new();
        let a = tree.create_proxy(box_at(0.0, 0.0), 0.1, 1);
        let b = tree.create_proxy(box_at(10.0, 10.0), 0.1, 2);

        let mut hits = Vec::new();
        tree.query(&box_at(0.0, 0.0), |id| {
            hits.push(id);
            true
        });
        assert!(hits.contains(&a));
        assert!(!hits.contains(&b));
    }

    #[test]
    fn destroy_proxy_shrinks_tree() {
        let mut tree: DynamicTree<i32> = DynamicTree::new();
        let a = tree.create_proxy(box_at(0.0, 0.0), 0.1, 1);
        let _b = tree.create_proxy(box_at(5.0, 5.0), 0.1, 2);
        assert_eq!(tree.node_count(), 3); // 2 leaves + 1 internal
        tree.destroy_proxy(a);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn move_proxy_only_reinserts_when_outside_fat_aabb() {
        let mut tree: DynamicTree<i32> = DynamicTree::new();
        let a = tree.create_proxy(box_at(0.0, 0.0), 0.5, 1);
        let moved = tree.move_proxy(a, box_at(0.01, 0.0), 0.5, Vec2::new(0.01, 0.0));
        assert!(!moved);
        let moved_far = tree.move_proxy(a, box_at(50.0, 50.0), 0.5, Vec2::new(50.0, 50.0));
        assert!(moved_far);
    }

    #[test]
    fn ray_cast_hits_proxy_in_path() {
        let mut tree: DynamicTree<i32> = DynamicTree::new();
        let a = tree.create_proxy(box_at(5.0, 0.0), 0.1, 42);
        let mut hit_id = None;
        tree.ray_cast(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 1.0, |id, _p1, _p2| {
            hit_id = Some(id);
            0.5
        });
        assert_eq!(hit_id, Some(a));
    }

    #[test]
    fn many_insertions_keep_tree_balanced() {
        let mut tree: DynamicTree<i32> = DynamicTree::new();
        for i in 0..200 {
            let x = (i as Real) * 0.3;
            tree.create_proxy(box_at(x, 0.0), 0.05, i);
        }
        // A balanced AVL-style tree over 200 leaves has height well under
        // a degenerate chain's 200.
        assert!(tree.height() < 30, "height={}", tree.height());
    }
}

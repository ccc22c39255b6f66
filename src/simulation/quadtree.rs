//! # Region quadtree (2D)
//!
//! This module implements a **loose-storage region quadtree** used as a
//! collision broad phase. Instead of comparing every body with every other
//! body (`O(N²)`), bodies are filed into square regions and a body only
//! looks at the bodies filed in regions its bounding box overlaps.
//!
//! ## Core Concepts
//!
//! - The root is a square centred on the arena, with half-width equal to half
//!   of the larger arena side, at depth 1.
//! - Every node below `max_depth` splits into four quadrants: top-left,
//!   top-right, bottom-left, bottom-right (y grows downward).
//! - A body is stored at the **shallowest** node none of whose quadrants can
//!   fully contain its bounding box. Bodies straddling a split line therefore
//!   stay in interior nodes; small bodies sink to the leaves.
//! - At `max_depth` every body that reaches the node is stored there.
//!
//! ## Storage
//!
//! Nodes live in a single `Vec` and refer to their children by index
//! (`NodeId`). The tree also remembers, per body, the node it was filed
//! under (`owner`). All of this is rebuilt every tick: body indices and owner
//! handles are only valid until the next [`Quadtree::clear`].
//!
//! ## Variants
//!
//! - [`Subdivision::Eager`] pre-builds every node down to `max_depth` once;
//!   `clear` only empties the object lists.
//! - [`Subdivision::Lazy`] creates a child the first time a body descends
//!   into it; `clear` drops everything but the root.
//!
//! - [`QueryMode::RootDown`] visits every node overlapping the query box
//!   from the root, so it sees straddling bodies in any ancestor.
//! - [`QueryMode::FromOwner`] starts at the querying body's owner and only
//!   looks down. It is an approximation: a body never sees bodies stored in
//!   an ancestor of its owner, nor bodies in a sibling branch. When one of two
//!   overlapping bodies owns an ancestor of the other's node, its own query
//!   still finds the pair. Two bodies touching exactly on a split line can
//!   each fit a different sibling (containment is closed), and then neither
//!   query sees the other and the contact is missed for that tick.

use tracing::debug;

use crate::configuration::config::{QueryMode, Subdivision};
use crate::error::SimError;
use crate::simulation::aabb::Aabb;
use crate::simulation::broad_phase::{BroadPhase, Region};
use crate::simulation::states::{Body, NVec2};

/// Handle of a node inside [`Quadtree::nodes`]
pub type NodeId = usize;

/// One of the four sub-squares of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Quadrant {
    /// Fixed order in which children are tried on insertion
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Unit offset of the child centre from the parent centre
    fn offset(self) -> NVec2 {
        match self {
            Quadrant::TopLeft => NVec2::new(-1.0, -1.0),
            Quadrant::TopRight => NVec2::new(1.0, -1.0),
            Quadrant::BottomLeft => NVec2::new(-1.0, 1.0),
            Quadrant::BottomRight => NVec2::new(1.0, 1.0),
        }
    }
}

/// A single square region of the tree
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub center: NVec2,
    pub half_width: f64,
    pub depth: u32,                      // root is 1
    pub children: [Option<NodeId>; 4],   // indexed by `Quadrant as usize`
    pub objects: Vec<usize>,             // bodies filed directly here
}

impl QuadNode {
    fn new(center: NVec2, half_width: f64, depth: u32) -> Self {
        Self {
            center,
            half_width,
            depth,
            children: [None; 4],
            objects: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::around(self.center, self.half_width)
    }

    /// Centre and half-width of the child in `q`, whether it exists or not
    pub fn child_geometry(&self, q: Quadrant) -> (NVec2, f64) {
        let half = self.half_width * 0.5;
        (self.center + q.offset() * half, half)
    }

    pub fn child_bounds(&self, q: Quadrant) -> Aabb {
        let (c, h) = self.child_geometry(q);
        Aabb::around(c, h)
    }
}

/// A complete quadtree over a square region.
///
/// This structure owns:
/// - a vector of all nodes (`nodes`), the root at index `root`
/// - the owning node of every body inserted since the last `clear`
#[derive(Debug, Clone)]
pub struct Quadtree {
    nodes: Vec<QuadNode>,
    root: NodeId,
    max_depth: u32,
    subdivision: Subdivision,
    query: QueryMode,
    owner: Vec<Option<NodeId>>, // indexed by body, reset every tick
}

impl Quadtree {
    /// Build an empty tree over the square `center ± half_width`.
    ///
    /// With eager subdivision every node down to `max_depth` is created here.
    pub fn new(
        center: NVec2,
        half_width: f64,
        max_depth: u32,
        subdivision: Subdivision,
        query: QueryMode,
    ) -> Result<Self, SimError> {
        if max_depth < 1 {
            return Err(SimError::config("quadtree max_depth must be at least 1"));
        }
        if !(half_width.is_finite() && half_width > 0.0) {
            return Err(SimError::config(format!("quadtree half width must be positive, got {half_width}")));
        }
        if !(center.x.is_finite() && center.y.is_finite()) {
            return Err(SimError::config("quadtree centre must be finite"));
        }

        let mut tree = Quadtree {
            nodes: vec![QuadNode::new(center, half_width, 1)],
            root: 0,
            max_depth,
            subdivision,
            query,
            owner: Vec::new(),
        };

        if subdivision == Subdivision::Eager {
            tree.subdivide_all(tree.root);
        }

        debug!(nodes = tree.nodes.len(), max_depth, ?subdivision, ?query, "built quadtree");
        Ok(tree)
    }

    /// Tree whose root square covers a `width x height` arena anchored at the origin
    pub fn covering(
        width: f64,
        height: f64,
        max_depth: u32,
        subdivision: Subdivision,
        query: QueryMode,
    ) -> Result<Self, SimError> {
        let center = NVec2::new(width * 0.5, height * 0.5);
        Self::new(center, width.max(height) * 0.5, max_depth, subdivision, query)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[QuadNode] {
        &self.nodes
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn query_mode(&self) -> QueryMode {
        self.query
    }

    /// Node `body` was filed under since the last `clear`
    pub fn owner_of(&self, body: usize) -> Option<NodeId> {
        self.owner.get(body).copied().flatten()
    }

    /// Empty the tree for the next tick.
    ///
    /// Eager trees keep their geometry; lazy trees fall back to a bare root.
    pub fn clear(&mut self) {
        match self.subdivision {
            Subdivision::Eager => {
                for node in self.nodes.iter_mut() {
                    node.objects.clear();
                }
            }
            Subdivision::Lazy => {
                self.nodes.truncate(1);
                let root = &mut self.nodes[self.root];
                root.objects.clear();
                root.children = [None; 4];
            }
        }
        self.owner.clear();
    }

    /// File `body` with bounding box `aabb`, starting from the root
    ///
    /// Returns the node it ended up in.
    pub fn insert(&mut self, body: usize, aabb: &Aabb) -> NodeId {
        let node = self.insert_at(self.root, body, aabb);
        if self.owner.len() <= body {
            self.owner.resize(body + 1, None);
        }
        self.owner[body] = Some(node);
        node
    }

    /// Collect every body filed in `start` or below whose node overlaps `aabb`
    pub fn query_from(&self, start: NodeId, aabb: &Aabb, out: &mut Vec<usize>) {
        let node = &self.nodes[start];
        if !node.bounds().overlaps(aabb) {
            return;
        }

        out.extend_from_slice(&node.objects);

        for child in node.children.iter().flatten() {
            self.query_from(*child, aabb, out);
        }
    }

    /// True if `id` or anything below it holds at least one body
    pub fn branch_contains_objects(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        !node.objects.is_empty()
            || node
                .children
                .iter()
                .flatten()
                .any(|c| self.branch_contains_objects(*c))
    }

    // helpers ==============================================================================

    /// Walk down from `node_idx` and store the body at the first node none of
    /// whose quadrants fully contains it (or at `max_depth`).
    fn insert_at(&mut self, node_idx: NodeId, body: usize, aabb: &Aabb) -> NodeId {
        if self.nodes[node_idx].depth >= self.max_depth {
            self.nodes[node_idx].objects.push(body);
            return node_idx;
        }

        // first quadrant in TL, TR, BL, BR order whose square holds the whole box
        let fit = Quadrant::ALL
            .into_iter()
            .find(|q| self.nodes[node_idx].child_bounds(*q).contains(aabb));

        match fit {
            None => {
                self.nodes[node_idx].objects.push(body);
                node_idx
            }
            Some(q) => {
                let child = self.child_or_create(node_idx, q);
                self.insert_at(child, body, aabb)
            }
        }
    }

    fn child_or_create(&mut self, node_idx: NodeId, q: Quadrant) -> NodeId {
        if let Some(existing) = self.nodes[node_idx].children[q as usize] {
            return existing;
        }

        let parent = &self.nodes[node_idx];
        let (center, half) = parent.child_geometry(q);
        let depth = parent.depth + 1;

        let new_idx = self.nodes.len();
        self.nodes.push(QuadNode::new(center, half, depth));
        self.nodes[node_idx].children[q as usize] = Some(new_idx);
        new_idx
    }

    /// Create all four children of every node down to `max_depth`
    fn subdivide_all(&mut self, node_idx: NodeId) {
        if self.nodes[node_idx].depth >= self.max_depth {
            return;
        }
        for q in Quadrant::ALL {
            let child = self.child_or_create(node_idx, q);
            self.subdivide_all(child);
        }
    }
}

impl BroadPhase for Quadtree {
    fn rebuild(&mut self, bodies: &[Body]) {
        self.clear();
        for (i, b) in bodies.iter().enumerate() {
            self.insert(i, &b.aabb());
        }
    }

    fn candidates_for(&self, body: usize, bodies: &[Body], out: &mut Vec<usize>) {
        out.clear();
        let aabb = bodies[body].aabb();
        let start = match self.query {
            QueryMode::RootDown => self.root,
            QueryMode::FromOwner => self.owner_of(body).unwrap_or(self.root),
        };
        self.query_from(start, &aabb, out);
    }

    /// Nodes whose branch holds any body, with their direct occupant count
    fn regions(&self) -> Vec<Region> {
        (0..self.nodes.len())
            .filter(|&id| self.branch_contains_objects(id))
            .map(|id| Region {
                bounds: self.nodes[id].bounds(),
                occupants: self.nodes[id].objects.len(),
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        match self.query {
            QueryMode::RootDown => "quadtree (root down)",
            QueryMode::FromOwner => "quadtree (from owner)",
        }
    }
}

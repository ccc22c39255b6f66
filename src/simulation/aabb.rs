// Axis-aligned bounding boxes in arena coordinates

use crate::simulation::states::NVec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: NVec2,
    pub max: NVec2,
}

impl Aabb {
    pub fn new(min: NVec2, max: NVec2) -> Self {
        Self {
            min: NVec2::new(min.x.min(max.x), min.y.min(max.y)),
            max: NVec2::new(min.x.max(max.x), min.y.max(max.y)),
        }
    }

    /// Square of side `2 * half` centred on `center`
    pub fn around(center: NVec2, half: f64) -> Self {
        let h = NVec2::new(half, half);
        Self {
            min: center - h,
            max: center + h,
        }
    }

    pub fn center(&self) -> NVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> NVec2 {
        self.max - self.min
    }

    /// Closed containment: `other` lies entirely inside `self`, touching the
    /// edge counts as inside.
    pub fn contains(&self, other: &Aabb) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Closed overlap: boxes that only share an edge still overlap, matching
    /// the narrow phase which treats touching circles as colliding.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

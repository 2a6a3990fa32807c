use geo::{coord, Coord, CoordsIter, Geometry, Rect};

/// A running 2-D bounding box.
///
/// Starts out inverted (min at `+inf`, max at `-inf`) so that the first coordinate added defines
/// the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRect {
    minx: f64,
    miny: f64,
    maxx: f64,
    maxy: f64,
}

impl BoundingRect {
    /// New
    pub fn new() -> Self {
        BoundingRect {
            minx: f64::INFINITY,
            miny: f64::INFINITY,
            maxx: -f64::INFINITY,
            maxy: -f64::INFINITY,
        }
    }

    pub fn minx(&self) -> f64 {
        self.minx
    }

    pub fn miny(&self) -> f64 {
        self.miny
    }

    pub fn maxx(&self) -> f64 {
        self.maxx
    }

    pub fn maxy(&self) -> f64 {
        self.maxy
    }

    /// True until at least one coordinate has been added.
    pub fn is_empty(&self) -> bool {
        self.minx > self.maxx || self.miny > self.maxy
    }

    /// NaN ordinates (an empty point) never compare, so they leave the box unchanged.
    pub fn add_coord(&mut self, coord: Coord) {
        if coord.x < self.minx {
            self.minx = coord.x;
        }
        if coord.y < self.miny {
            self.miny = coord.y;
        }
        if coord.x > self.maxx {
            self.maxx = coord.x;
        }
        if coord.y > self.maxy {
            self.maxy = coord.y;
        }
    }

    pub fn add_geometry(&mut self, geometry: &Geometry) {
        for coord in geometry.coords_iter() {
            self.add_coord(coord);
        }
    }

    /// Widen this box to also cover `other`.
    pub fn update(&mut self, other: &BoundingRect) {
        if other.is_empty() {
            return;
        }
        self.add_coord(coord! { x: other.minx, y: other.miny });
        self.add_coord(coord! { x: other.maxx, y: other.maxy });
    }

    /// `[minx, miny, maxx, maxy]`, or `None` when nothing was added.
    pub fn to_bbox(&self) -> Option<Vec<f64>> {
        if self.is_empty() {
            None
        } else {
            Some(vec![self.minx, self.miny, self.maxx, self.maxy])
        }
    }
}

impl Default for BoundingRect {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BoundingRect> for Rect {
    fn from(value: BoundingRect) -> Self {
        let min_coord = coord! { x: value.minx, y: value.miny };
        let max_coord = coord! { x: value.maxx, y: value.maxy };
        Rect::new(min_coord, max_coord)
    }
}

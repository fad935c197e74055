use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in map pixels, y pointing down.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.width * 0.5,
            y: self.y + self.height * 0.5,
        }
    }

    pub fn half_extent(&self) -> Vec2 {
        Vec2 {
            x: self.width * 0.5,
            y: self.height * 0.5,
        }
    }

    pub fn mid_bottom(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.width * 0.5,
            y: self.bottom(),
        }
    }

    pub fn with_mid_bottom(self, anchor: Vec2) -> Self {
        Self {
            x: anchor.x - self.width * 0.5,
            y: anchor.y - self.height,
            ..self
        }
    }

    pub fn with_center(self, center: Vec2) -> Self {
        Self {
            x: center.x - self.width * 0.5,
            y: center.y - self.height * 0.5,
            ..self
        }
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

/// Which static set a hit came from when querying walls and exits together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryHit {
    Wall(usize),
    Exit(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exit {
    pub name: String,
    pub destination: MapId,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapId(pub String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MapId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Static geometry of one map. Sets hold tens of rectangles, so every query
/// is a linear scan returning the first hit in declaration order.
#[derive(Debug, Clone, Default)]
pub struct CollisionIndex {
    walls: Vec<Rect>,
    exits: Vec<Exit>,
    zones: Vec<Rect>,
}

impl CollisionIndex {
    pub fn new(walls: Vec<Rect>, exits: Vec<Exit>, zones: Vec<Rect>) -> Self {
        Self {
            walls,
            exits,
            zones,
        }
    }

    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    pub fn exits(&self) -> &[Exit] {
        &self.exits
    }

    pub fn zones(&self) -> &[Rect] {
        &self.zones
    }

    pub fn first_wall_hit(&self, query: &Rect) -> Option<usize> {
        first_hit(query, self.walls.iter())
    }

    pub fn first_exit_hit(&self, query: &Rect) -> Option<usize> {
        first_hit(query, self.exits.iter().map(|exit| &exit.rect))
    }

    pub fn first_zone_hit(&self, query: &Rect) -> Option<usize> {
        first_hit(query, self.zones.iter())
    }

    /// Walls are scanned before exits.
    pub fn first_blocking_hit(&self, query: &Rect) -> Option<GeometryHit> {
        self.first_wall_hit(query)
            .map(GeometryHit::Wall)
            .or_else(|| self.first_exit_hit(query).map(GeometryHit::Exit))
    }

    pub fn blocking_rect(&self, hit: GeometryHit) -> Option<Rect> {
        match hit {
            GeometryHit::Wall(index) => self.walls.get(index).copied(),
            GeometryHit::Exit(index) => self.exits.get(index).map(|exit| exit.rect),
        }
    }

    pub fn exit(&self, index: usize) -> Option<&Exit> {
        self.exits.get(index)
    }
}

fn first_hit<'a>(query: &Rect, rects: impl Iterator<Item = &'a Rect>) -> Option<usize> {
    rects.enumerate().find_map(|(index, rect)| query.overlaps(rect).then_some(index))
}

use super::geometry::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRole {
    Hero,
    Npc,
}

/// A moving character. `position` is the top-left of the render box and is
/// kept in floating point; rounding it to whole pixels makes motion toward
/// negative axes faster than motion toward positive ones.
///
/// The feet box is half as wide as the render box, `feet_height` tall, and
/// shares its bottom-center with the render box. Only the feet collide, so
/// sprite art may overlap walls above the feet line.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    name: String,
    role: EntityRole,
    position: Vec2,
    previous_position: Vec2,
    pub velocity: Vec2,
    rect: Rect,
    feet: Rect,
}

impl Entity {
    pub fn new(
        name: impl Into<String>,
        role: EntityRole,
        position: Vec2,
        size: Vec2,
        feet_height: f32,
    ) -> Self {
        let rect = Rect::new(position.x, position.y, size.x, size.y);
        let feet = Rect::new(0.0, 0.0, size.x * 0.5, feet_height.min(size.y))
            .with_mid_bottom(rect.mid_bottom());
        Self {
            name: name.into(),
            role,
            position,
            previous_position: position,
            velocity: Vec2::ZERO,
            rect,
            feet,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> EntityRole {
        self.role
    }

    pub fn is_hero(&self) -> bool {
        self.role == EntityRole::Hero
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn previous_position(&self) -> Vec2 {
        self.previous_position
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn feet(&self) -> Rect {
        self.feet
    }

    /// Records the current position as previous, then advances by velocity.
    pub fn integrate(&mut self, dt_seconds: f32) {
        self.previous_position = self.position;
        self.position.x += self.velocity.x * dt_seconds;
        self.position.y += self.velocity.y * dt_seconds;
        self.sync_boxes();
    }

    /// Full revert to the previous-tick position; no sliding along walls.
    pub fn rollback(&mut self) {
        self.position = self.previous_position;
        self.sync_boxes();
    }

    /// Teleport. The previous position follows so a later rollback cannot
    /// drag the entity back across a map switch.
    pub fn place_at(&mut self, position: Vec2) {
        self.position = position;
        self.previous_position = position;
        self.sync_boxes();
    }

    pub fn place_feet_center(&mut self, center: Vec2) {
        let mid_bottom = self.feet.with_center(center).mid_bottom();
        self.place_mid_bottom(mid_bottom);
    }

    /// Positions the entity so its render box bottom-center sits on `anchor`.
    pub fn place_mid_bottom(&mut self, anchor: Vec2) {
        self.place_at(Vec2 {
            x: anchor.x - self.rect.width * 0.5,
            y: anchor.y - self.rect.height,
        });
    }

    fn sync_boxes(&mut self) {
        self.rect.x = self.position.x;
        self.rect.y = self.position.y;
        self.feet = self.feet.with_mid_bottom(self.rect.mid_bottom());
    }
}

use rand::Rng;

use super::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn velocity(self, speed: f32) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -speed),
            Self::Down => Vec2::new(0.0, speed),
            Self::Left => Vec2::new(-speed, 0.0),
            Self::Right => Vec2::new(speed, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WanderTuning {
    pub idle_probability: f64,
    pub commit_probability: f64,
    pub speed: f32,
}

/// Per-NPC drift state. A fresh intent is rolled every tick, but velocity
/// only picks it up on the rare commit roll, so NPCs hold a heading (or
/// stand still) for long stretches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wander {
    intent: Option<Direction>,
}

impl Wander {
    pub fn intent(&self) -> Option<Direction> {
        self.intent
    }

    /// Returns true when this tick committed the intent to `velocity`.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        tuning: &WanderTuning,
        touching_hero: bool,
        velocity: &mut Vec2,
    ) -> bool {
        if touching_hero {
            return false;
        }

        self.intent = if rng.gen_bool(tuning.idle_probability) {
            None
        } else {
            Some(Direction::ALL[rng.gen_range(0..Direction::ALL.len())])
        };

        if !rng.gen_bool(tuning.commit_probability) {
            return false;
        }
        *velocity = self
            .intent
            .map(|direction| direction.velocity(tuning.speed))
            .unwrap_or(Vec2::ZERO);
        true
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    fn tuning() -> WanderTuning {
        WanderTuning {
            idle_probability: 0.65,
            commit_probability: 1.0 / 150.0,
            speed: 60.0,
        }
    }

    #[test]
    fn commits_roughly_once_per_150_ticks() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut wander = Wander::default();
        let mut velocity = Vec2::ZERO;
        let ticks = 10_000;

        let commits = (0..ticks)
            .filter(|_| wander.step(&mut rng, &tuning(), false, &mut velocity))
            .count();

        // Expected ~66.7; a binomial 4-sigma window.
        assert!((35..=100).contains(&commits), "commits = {commits}");
    }

    #[test]
    fn touching_hero_never_changes_velocity() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut wander = Wander::default();
        let mut velocity = Vec2::new(60.0, 0.0);

        for _ in 0..10_000 {
            assert!(!wander.step(&mut rng, &tuning(), true, &mut velocity));
        }
        assert_eq!(velocity, Vec2::new(60.0, 0.0));
        assert_eq!(wander.intent(), None);
    }

    #[test]
    fn idle_share_tracks_probability() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut wander = Wander::default();
        let mut velocity = Vec2::ZERO;
        let ticks = 10_000;
        let mut idle = 0;
        for _ in 0..ticks {
            wander.step(&mut rng, &tuning(), false, &mut velocity);
            if wander.intent().is_none() {
                idle += 1;
            }
        }
        let share = idle as f64 / ticks as f64;
        assert!((share - 0.65).abs() < 0.03, "idle share = {share}");
    }

    #[test]
    fn certain_commit_applies_intent_velocity() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut wander = Wander::default();
        let mut velocity = Vec2::new(1.0, 1.0);
        let always = WanderTuning {
            idle_probability: 0.0,
            commit_probability: 1.0,
            speed: 60.0,
        };

        assert!(wander.step(&mut rng, &always, false, &mut velocity));
        let direction = wander.intent().expect("moving intent");
        assert_eq!(velocity, direction.velocity(60.0));
    }
}

use crate::sim::TickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Input for one fixed tick. Press edges are true for exactly one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    talk_pressed: bool,
    actions: ActionStates,
    zoom_delta_steps: i32,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub(crate) fn new(
        quit_requested: bool,
        talk_pressed: bool,
        actions: ActionStates,
        zoom_delta_steps: i32,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            talk_pressed,
            actions,
            zoom_delta_steps,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn talk_pressed(&self) -> bool {
        self.talk_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn zoom_delta_steps(&self) -> i32 {
        self.zoom_delta_steps
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn tick_input(&self) -> TickInput {
        TickInput {
            up: self.is_down(InputAction::MoveUp),
            down: self.is_down(InputAction::MoveDown),
            left: self.is_down(InputAction::MoveLeft),
            right: self.is_down(InputAction::MoveRight),
            toggle_talk: self.talk_pressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_input_mirrors_held_directions_and_talk_edge() {
        let mut actions = ActionStates::default();
        actions.set(InputAction::MoveUp, true);
        actions.set(InputAction::MoveRight, true);
        let snapshot = InputSnapshot::new(false, true, actions, 0, 800, 600);

        assert_eq!(
            snapshot.tick_input(),
            TickInput {
                up: true,
                down: false,
                left: false,
                right: true,
                toggle_talk: true,
            }
        );
    }
}

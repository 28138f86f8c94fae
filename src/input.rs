//! Movement input
//!
//! The host maps its raw key/focus events onto [`InputMap`]; the player
//! update only reads the normalized `direction`.

use glam::Vec2;

/// Movement keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputMap {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Unit length, or zero when no direction is held
    pub direction: Vec2,
}

impl InputMap {
    /// Key down (`pressed = true`) or up.
    pub fn set_key(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
            Key::Up => self.up = pressed,
            Key::Down => self.down = pressed,
        }
        self.refresh_direction();
    }

    /// Window lost focus: key-up events will never arrive, release everything.
    pub fn focus_lost(&mut self) {
        self.left = false;
        self.right = false;
        self.up = false;
        self.down = false;
        self.refresh_direction();
    }

    /// Set the direction directly (gamepad, scripted input).
    pub fn set_direction(&mut self, direction: Vec2) {
        self.direction = direction.normalize_or_zero();
    }

    fn refresh_direction(&mut self) {
        let axis = |pos: bool, neg: bool| pos as i8 as f32 - neg as i8 as f32;
        self.direction =
            Vec2::new(axis(self.right, self.left), axis(self.up, self.down)).normalize_or_zero();
    }
}

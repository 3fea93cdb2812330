//! Light/dark display mode
//!
//! The mode is owned by the controller and published on a watch channel so
//! the view can subscribe to it rather than read a global.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Light,
    Dark,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Light => DisplayMode::Dark,
            DisplayMode::Dark => DisplayMode::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Light => "light",
            DisplayMode::Dark => "dark",
        }
    }

    /// Label for the control that switches away from this mode
    pub fn toggle_label(&self) -> &'static str {
        match self {
            DisplayMode::Light => "Toggle Dark Mode",
            DisplayMode::Dark => "Toggle Light Mode",
        }
    }
}

#[derive(Debug)]
pub struct ThemeState {
    tx: watch::Sender<DisplayMode>,
}

impl ThemeState {
    pub fn new(initial: DisplayMode) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> DisplayMode {
        *self.tx.borrow()
    }

    /// Flip the mode and return the new value
    pub fn toggle(&self) -> DisplayMode {
        let next = self.current().toggled();
        self.tx.send_replace(next);
        next
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayMode> {
        self.tx.subscribe()
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::new(DisplayMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_mode() {
        let theme = ThemeState::new(DisplayMode::Light);
        theme.toggle();
        theme.toggle();
        assert_eq!(theme.current(), DisplayMode::Light);
    }

    #[test]
    fn odd_toggles_flip_mode() {
        for initial in [DisplayMode::Light, DisplayMode::Dark] {
            let theme = ThemeState::new(initial);
            for _ in 0..3 {
                theme.toggle();
            }
            assert_eq!(theme.current(), initial.toggled());
        }
    }

    #[test]
    fn subscribers_see_changes() {
        let theme = ThemeState::default();
        let mut rx = theme.subscribe();
        assert_eq!(*rx.borrow_and_update(), DisplayMode::Light);

        theme.toggle();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), DisplayMode::Dark);
    }

    #[test]
    fn toggle_label_names_the_other_mode() {
        assert_eq!(DisplayMode::Light.toggle_label(), "Toggle Dark Mode");
        assert_eq!(DisplayMode::Dark.toggle_label(), "Toggle Light Mode");
    }
}

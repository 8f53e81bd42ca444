//! Persistent open/closed state with hysteresis.
//!
//! The state machine is the only piece of cross-invocation memory in
//! the pipeline. Opening requires the convergence test to fire while
//! closed; closing requires the separate, stricter divergence test
//! while open. The asymmetry keeps the state from flapping on noise.

use serde::{Deserialize, Serialize};

/// Alert decision produced by one state-machine update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Closed -> open transition
    NewOpening,
    /// Still open with no closing evidence; re-alerted every tick
    OpenPlateau,
    /// Open -> closed transition
    WindowClosed,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::NewOpening => write!(f, "new opening detected"),
            AlertKind::OpenPlateau => write!(f, "window is open (plateau check)"),
            AlertKind::WindowClosed => write!(f, "window closed"),
        }
    }
}

/// Current belief about the window, owned by the host and passed into
/// every update. Only [`WindowState::update`] mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowState {
    pub is_open: bool,
}

impl WindowState {
    /// The initial state at process start.
    pub fn closed() -> Self {
        Self { is_open: false }
    }

    /// Apply one tick of evidence and decide whether to alert.
    ///
    /// Transition table:
    /// - open + diverging -> closed, "window closed" alert
    /// - closed + converging -> open, "new opening" alert
    /// - open + not diverging -> open, plateau alert (every tick)
    /// - closed + not converging -> closed, silent
    pub fn update(&mut self, converging: bool, diverging: bool) -> Option<AlertKind> {
        let was_open = self.is_open;

        if was_open && diverging {
            self.is_open = false;
            return Some(AlertKind::WindowClosed);
        }

        if !was_open && converging {
            self.is_open = true;
            return Some(AlertKind::NewOpening);
        }

        if self.is_open {
            Some(AlertKind::OpenPlateau)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed_and_stays_silent() {
        let mut state = WindowState::closed();
        assert_eq!(state.update(false, false), None);
        assert!(!state.is_open);
    }

    #[test]
    fn test_open_close_cycle() {
        let mut state = WindowState::closed();

        assert_eq!(state.update(true, false), Some(AlertKind::NewOpening));
        assert!(state.is_open);

        // No more convergence, no divergence: plateau re-alert each tick.
        assert_eq!(state.update(false, false), Some(AlertKind::OpenPlateau));
        assert_eq!(state.update(false, false), Some(AlertKind::OpenPlateau));
        assert!(state.is_open);

        assert_eq!(state.update(false, true), Some(AlertKind::WindowClosed));
        assert!(!state.is_open);

        // Closed again: silent until new convergence.
        assert_eq!(state.update(false, false), None);
    }

    #[test]
    fn test_divergence_wins_while_open() {
        let mut state = WindowState { is_open: true };
        assert_eq!(state.update(true, true), Some(AlertKind::WindowClosed));
        assert!(!state.is_open);
    }

    #[test]
    fn test_divergence_ignored_while_closed() {
        let mut state = WindowState::closed();
        assert_eq!(state.update(false, true), None);
        assert!(!state.is_open);
    }
}

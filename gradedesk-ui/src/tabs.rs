//! Tab controller
//!
//! Owns which top-level view is active and whether a grading request is in
//! flight. Every view switch goes through [`TabController::switch_to`], so
//! the "stay on the grader while grading" rule lives in exactly one place.
//!
//! # State Machine
//!
//! ```text
//!   Workbench <──switch_to──> Grader
//!                               │ begin_grading (forces Grader)
//!                               ▼
//!                         Grader + in flight ── switch_to(Workbench) rejected
//!                               │ finish_grading
//!                               ▼
//!                             Grader
//! ```

use tracing::{debug, info};

/// Top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Workbench,
    Grader,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Workbench => write!(f, "workbench"),
            View::Grader => write!(f, "grader"),
        }
    }
}

/// Outcome of a switch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabTransition {
    /// The target view is now active
    Applied {
        view: View,
        /// Assignment and class lists must be refetched
        refresh_grader_lists: bool,
    },
    /// Grading in flight; nothing changed
    Rejected,
}

/// Active view plus the grading-in-flight flag
#[derive(Debug, Clone, Default)]
pub struct TabController {
    active: View,
    grading_in_flight: bool,
}

impl TabController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> View {
        self.active
    }

    pub fn grading_in_flight(&self) -> bool {
        self.grading_in_flight
    }

    /// Request a view switch
    ///
    /// While grading is in flight only `Grader` is accepted (re-entrant);
    /// anything else is a silent no-op. Otherwise the switch always applies,
    /// and entering the grader asks for fresh assignment and class lists.
    pub fn switch_to(&mut self, target: View) -> TabTransition {
        if self.grading_in_flight {
            if target != View::Grader {
                debug!("Ignoring switch to {} while grading is in flight", target);
                return TabTransition::Rejected;
            }
            return TabTransition::Applied {
                view: View::Grader,
                refresh_grader_lists: false,
            };
        }

        if self.active != target {
            info!("Switching view: {} -> {}", self.active, target);
        }
        self.active = target;

        TabTransition::Applied {
            view: target,
            refresh_grader_lists: target == View::Grader,
        }
    }

    /// Pin the grader and raise the in-flight flag
    ///
    /// Unlike `switch_to`, this never asks for a list refresh: the
    /// submission was built from the selectors already on screen.
    /// Returns false (and changes nothing) if a grading request is already
    /// in flight.
    pub fn begin_grading(&mut self) -> bool {
        if self.grading_in_flight {
            return false;
        }
        self.active = View::Grader;
        self.grading_in_flight = true;
        debug!("Grading started, view pinned to grader");
        true
    }

    /// Lower the in-flight flag
    pub fn finish_grading(&mut self) {
        self.grading_in_flight = false;
        debug!("Grading finished, view unpinned");
    }

    /// Whether the activation control for `view` accepts input
    pub fn tab_enabled(&self, view: View) -> bool {
        !(self.grading_in_flight && view != View::Grader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_workbench() {
        let tabs = TabController::new();
        assert_eq!(tabs.active(), View::Workbench);
        assert!(!tabs.grading_in_flight());
    }

    #[test]
    fn test_entering_grader_requests_refresh() {
        let mut tabs = TabController::new();
        assert_eq!(
            tabs.switch_to(View::Grader),
            TabTransition::Applied {
                view: View::Grader,
                refresh_grader_lists: true
            }
        );
        assert_eq!(
            tabs.switch_to(View::Workbench),
            TabTransition::Applied {
                view: View::Workbench,
                refresh_grader_lists: false
            }
        );
        assert_eq!(tabs.active(), View::Workbench);
    }

    #[test]
    fn test_every_switch_sequence_stays_on_grader_while_in_flight() {
        // All sequences of length 4 over both targets
        for mask in 0u8..16 {
            let mut tabs = TabController::new();
            assert!(tabs.begin_grading());

            for bit in 0..4 {
                let target = if mask & (1 << bit) == 0 {
                    View::Workbench
                } else {
                    View::Grader
                };
                let transition = tabs.switch_to(target);
                if target == View::Workbench {
                    assert_eq!(transition, TabTransition::Rejected);
                }
                assert_eq!(tabs.active(), View::Grader, "sequence mask {mask:#06b}");
            }
        }
    }

    #[test]
    fn test_begin_grading_is_exclusive() {
        let mut tabs = TabController::new();
        assert!(tabs.begin_grading());
        assert!(!tabs.begin_grading());
        tabs.finish_grading();
        assert!(tabs.begin_grading());
    }

    #[test]
    fn test_workbench_tab_disabled_only_while_grading() {
        let mut tabs = TabController::new();
        assert!(tabs.tab_enabled(View::Workbench));

        tabs.begin_grading();
        assert!(!tabs.tab_enabled(View::Workbench));
        assert!(tabs.tab_enabled(View::Grader));

        tabs.finish_grading();
        assert!(tabs.tab_enabled(View::Workbench));
        assert_eq!(
            tabs.switch_to(View::Workbench),
            TabTransition::Applied {
                view: View::Workbench,
                refresh_grader_lists: false
            }
        );
    }
}

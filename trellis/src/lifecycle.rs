//! Explicit render lifecycle for adapters.
//!
//! Hosts drive adapters through named stages instead of relying on callback
//! ordering. The [`Driver`] owns the current [`Stage`] and fans each
//! transition out to every attached subject's [`Hooks`], so an adapter never
//! sees `after_view_checked` before `on_init`, and a host cannot skip a
//! content check by accident.

use crate::ChangeSet;
use std::{cell::RefCell, rc::Rc};
use tracing::warn;

/// Stages of the render lifecycle, in the order a full pass visits them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Stage {
    /// Constructed, nothing ran yet.
    Created,
    /// `on_init` ran.
    Initialized,
    /// Projected content is attached.
    ContentReady,
    /// Content was checked at least once.
    ContentChecked,
    /// The view finished building.
    ViewReady,
    /// The view was checked at least once.
    ViewChecked,
}

/// Raised when a host drives stages out of order.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("lifecycle cannot advance from {from:?} to {to:?}")]
    OutOfOrder { from: Stage, to: Stage },
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Tracks the current stage and validates transitions.
#[derive(Clone, Debug)]
pub struct Lifecycle {
    stage: Stage,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle::new()
    }
}

impl Lifecycle {
    pub fn new() -> Lifecycle {
        Lifecycle { stage: Stage::Created }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Moves to `to`, returning the stage actually entered.
    ///
    /// After the first full pass the cycle loops between the checked stages,
    /// so `ViewChecked -> ContentChecked` is a legal re-entry.
    pub fn advance(&mut self, to: Stage) -> Result<Stage> {
        use Stage::*;
        let allowed = matches!(
            (self.stage, to),
            (Created, Initialized)
                | (Initialized, ContentReady)
                | (ContentReady, ContentChecked)
                | (ContentChecked, ViewReady)
                | (ContentChecked, ViewChecked)
                | (ViewReady, ViewChecked)
                | (ViewChecked, ContentChecked)
        );
        if !allowed {
            warn!("rejected lifecycle transition {:?} -> {:?}", self.stage, to);
            return Err(LifecycleError::OutOfOrder { from: self.stage, to });
        }
        self.stage = to;
        Ok(self.stage)
    }
}

/// Stage callbacks an adapter can participate in.
///
/// Every method has an empty default, so subjects implement only the stages
/// they care about.
pub trait Hooks {
    /// Runs once when the subject enters the lifecycle.
    fn on_init(&mut self) {}

    /// Delivers a batch of property edits from the declarative element.
    fn on_changes(&mut self, _changes: &ChangeSet) {}

    /// Runs once after projected content is attached.
    fn after_content_init(&mut self) {}

    /// Runs on every content check.
    fn after_content_checked(&mut self) {}

    /// Runs once after the view finished building.
    fn after_view_init(&mut self) {}

    /// Runs on every view check.
    fn after_view_checked(&mut self) {}
}

/// Advances a set of subjects through the lifecycle together.
pub struct Driver {
    lifecycle: Lifecycle,
    subjects: Vec<Rc<RefCell<dyn Hooks>>>,
}

impl Default for Driver {
    fn default() -> Self {
        Driver::new()
    }
}

impl Driver {
    pub fn new() -> Driver {
        Driver { lifecycle: Lifecycle::new(), subjects: Vec::new() }
    }

    pub fn attach(&mut self, subject: Rc<RefCell<dyn Hooks>>) {
        self.subjects.push(subject);
    }

    pub fn stage(&self) -> Stage {
        self.lifecycle.stage()
    }

    /// Runs the full first pass: init, content attach, content check, view
    /// build, view check.
    pub fn run_initial(&mut self) -> Result<()> {
        self.advance_all(Stage::Initialized, |s| s.on_init())?;
        self.advance_all(Stage::ContentReady, |s| s.after_content_init())?;
        self.advance_all(Stage::ContentChecked, |s| s.after_content_checked())?;
        self.advance_all(Stage::ViewReady, |s| s.after_view_init())?;
        self.advance_all(Stage::ViewChecked, |s| s.after_view_checked())?;
        Ok(())
    }

    /// Runs one steady-state check cycle: content check then view check.
    pub fn run_check(&mut self) -> Result<()> {
        self.advance_all(Stage::ContentChecked, |s| s.after_content_checked())?;
        self.advance_all(Stage::ViewChecked, |s| s.after_view_checked())?;
        Ok(())
    }

    fn advance_all(&mut self, to: Stage, f: impl Fn(&mut dyn Hooks)) -> Result<()> {
        self.lifecycle.advance(to)?;
        for subject in &self.subjects {
            f(&mut *subject.borrow_mut());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Driver, Hooks, Lifecycle, LifecycleError, Stage};
    use std::{cell::RefCell, rc::Rc};

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl Hooks for Recorder {
        fn on_init(&mut self) {
            self.calls.push("init");
        }
        fn after_content_init(&mut self) {
            self.calls.push("content_init");
        }
        fn after_content_checked(&mut self) {
            self.calls.push("content_checked");
        }
        fn after_view_init(&mut self) {
            self.calls.push("view_init");
        }
        fn after_view_checked(&mut self) {
            self.calls.push("view_checked");
        }
    }

    #[test]
    fn advance_rejects_skipped_stages() {
        let mut lifecycle = Lifecycle::new();
        let err = lifecycle.advance(Stage::ViewChecked).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::OutOfOrder { from: Stage::Created, to: Stage::ViewChecked }
        ));
        assert_eq!(lifecycle.stage(), Stage::Created);
    }

    #[test]
    fn checked_stages_loop() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(Stage::Initialized).unwrap();
        lifecycle.advance(Stage::ContentReady).unwrap();
        lifecycle.advance(Stage::ContentChecked).unwrap();
        lifecycle.advance(Stage::ViewReady).unwrap();
        lifecycle.advance(Stage::ViewChecked).unwrap();
        lifecycle.advance(Stage::ContentChecked).unwrap();
        lifecycle.advance(Stage::ViewChecked).unwrap();
        assert_eq!(lifecycle.stage(), Stage::ViewChecked);
    }

    #[test]
    fn driver_runs_hooks_in_stage_order() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut driver = Driver::new();
        driver.attach(recorder.clone());
        driver.run_initial().unwrap();
        assert_eq!(
            recorder.borrow().calls,
            vec!["init", "content_init", "content_checked", "view_init", "view_checked"]
        );
        driver.run_check().unwrap();
        assert_eq!(driver.stage(), Stage::ViewChecked);
        assert_eq!(recorder.borrow().calls.len(), 7);
    }

    #[test]
    fn run_check_before_initial_fails() {
        let mut driver = Driver::new();
        assert!(driver.run_check().is_err());
    }
}

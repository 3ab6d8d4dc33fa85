//! Edit-session tracking: has anything changed since the last reset?
//!
//! The crop view reports after every mutation whether its layout differs
//! from the reset snapshot. The tracker remembers the last answer and tells
//! the delegate only about transitions.

use std::fmt;
use std::rc::Weak;

use tracing::debug;

/// Receives "resettable" transitions from a crop view.
///
/// The crop view holds its delegate weakly; dropping the delegate is enough
/// to stop notifications.
pub trait CropViewDelegate {
    /// The layout now differs from the reset snapshot.
    fn crop_view_did_become_resettable(&self);
    /// The layout matches the reset snapshot again.
    fn crop_view_did_become_non_resettable(&self);
}

#[derive(Default)]
pub struct EditSession {
    resettable: bool,
    delegate: Option<Weak<dyn CropViewDelegate>>,
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("resettable", &self.resettable)
            .field("has_delegate", &self.delegate.is_some())
            .finish()
    }
}

impl EditSession {
    pub fn is_resettable(&self) -> bool {
        self.resettable
    }

    /// Replace or clear the delegate.
    pub fn set_delegate(&mut self, delegate: Option<Weak<dyn CropViewDelegate>>) {
        self.delegate = delegate;
    }

    /// Record the latest state. Returns true when it changed, in which case
    /// the delegate (if still alive) has been notified.
    pub fn observe(&mut self, resettable: bool) -> bool {
        if resettable == self.resettable {
            return false;
        }
        self.resettable = resettable;
        debug!(resettable, "edit session changed");

        if let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) {
            if resettable {
                delegate.crop_view_did_become_resettable();
            } else {
                delegate.crop_view_did_become_non_resettable();
            }
        }
        true
    }
}

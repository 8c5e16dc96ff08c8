//! Choosing what to publish: which release, and which file of that release.
//!
//! Both resolvers are pure functions over upstream data and a [`TrackedApp`]'s
//! preferences. A user-supplied pattern that does not compile is logged and the
//! step that would have used it is skipped; resolution itself never fails, it
//! only returns `None` when nothing qualifies.
//!
//! [`TrackedApp`]: crate::curated::TrackedApp

pub mod asset;
pub mod release;

pub use asset::resolve_asset;
pub use release::resolve_release;

use regex::{Regex, RegexBuilder};
use tracing::error;

/// Compiles a case-insensitive user pattern, logging (and discarding) invalid ones.
pub(crate) fn user_pattern(kind: &str, pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            error!("Invalid {kind} '{pattern}': {e}");
            None
        }
    }
}

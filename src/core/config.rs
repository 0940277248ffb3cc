//! # Tree configuration.
//!
//! Provides [`Config`], the settings a [`Root`](crate::Root) is built with.
//! A config is consumed by [`Root::builder`](crate::Root::builder) and shared
//! read-only by every node of that tree.

use std::borrow::Cow;

/// What to do when a task returns while it still owns live children.
///
/// Returning with children attached breaks the rule that parents outlive their
/// children; the tree cannot recover the ordering guarantee for that subtree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Trace the violation, log it at `ERROR` and abort the process.
    #[default]
    Abort,
    /// Trace the violation and log it, then keep running.
    ///
    /// The orphaned children stay attached and are torn down by the next
    /// cancellation sweep that reaches them. Meant for test harnesses that
    /// assert the violation path is reached.
    Report,
}

/// Configuration for one supervision tree.
///
/// ## Field semantics
/// - `root_name` / `root_type`: labels of the root entry in every debug path
/// - `orphan_policy`: reaction to a task returning with live children
#[derive(Clone, Debug)]
pub struct Config {
    /// Component name of the root node.
    pub root_name: Cow<'static, str>,
    /// Component type of the root node.
    pub root_type: Cow<'static, str>,
    /// Reaction to lifecycle violations.
    pub orphan_policy: OrphanPolicy,
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `root_name = "root"`, `root_type = "root"`
    /// - `orphan_policy = OrphanPolicy::Abort`
    fn default() -> Self {
        Self {
            root_name: Cow::Borrowed("root"),
            root_type: Cow::Borrowed("root"),
            orphan_policy: OrphanPolicy::default(),
        }
    }
}

//! Per-render composition state.
//!
//! This module defines [`RenderState`], the explicit record of everything a
//! layout composition accumulates during one top-level render: the queue of
//! pending override callbacks and the per-block registry of content actions.
//!
//! The state is shared by reference across the render call tree via
//! [`SharedState`] (`Rc<RefCell<...>>`). Rendering is single-threaded and
//! synchronous, so callbacks and state carry no `Send`/`Sync` bounds.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::compose::{BlockFn, Composer};
use crate::context::Context;

/// Shared handle to the state of one render call tree.
///
/// Created fresh at each top-level render and propagated to child contexts
/// by [`Context::overlay`](crate::Context::overlay). Dropped with the last
/// context that refers to it; there is no explicit teardown.
pub type SharedState = Rc<RefCell<RenderState>>;

/// How an action combines its content with a block's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
    /// Block value, then action content.
    Append,
    /// Action content, then block value.
    Prepend,
    /// Action content only, discarding the block value.
    Replace,
}

impl ActionMode {
    /// Parses a mode name, case-insensitively.
    ///
    /// Returns `None` for unrecognized names; an action built from an
    /// unrecognized mode stays registered but folds as a no-op.
    pub fn parse(mode: &str) -> Option<Self> {
        match mode.to_ascii_lowercase().as_str() {
            "append" => Some(ActionMode::Append),
            "prepend" => Some(ActionMode::Prepend),
            "replace" => Some(ActionMode::Replace),
            _ => None,
        }
    }
}

/// A registered content contribution targeting a named block.
///
/// Actions accumulate per block name in registration order and are folded
/// over the block's default content each time the block renders. They are
/// never consumed: a second `block` call for the same name applies the same
/// accumulated actions again.
#[derive(Clone)]
pub struct Action {
    mode: Option<ActionMode>,
    body: BlockFn,
    options: serde_json::Value,
}

impl Action {
    /// Creates an action with an explicit mode name.
    ///
    /// The name is matched case-insensitively; unrecognized names produce an
    /// inert action that leaves the block value unchanged.
    pub fn with_mode(mode: &str, body: BlockFn) -> Self {
        Self {
            mode: ActionMode::parse(mode),
            body,
            options: serde_json::Value::Null,
        }
    }

    /// Creates an appending action.
    pub fn append(body: BlockFn) -> Self {
        Self {
            mode: Some(ActionMode::Append),
            body,
            options: serde_json::Value::Null,
        }
    }

    /// Creates a prepending action.
    pub fn prepend(body: BlockFn) -> Self {
        Self {
            mode: Some(ActionMode::Prepend),
            body,
            options: serde_json::Value::Null,
        }
    }

    /// Creates a replacing action. This is the default mode for content
    /// registered without an explicit mode.
    pub fn replace(body: BlockFn) -> Self {
        Self {
            mode: Some(ActionMode::Replace),
            body,
            options: serde_json::Value::Null,
        }
    }

    /// Attaches opaque pass-through data to the action.
    ///
    /// The composer never interprets this value; it is carried for hosts
    /// that need per-action render options.
    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }

    /// The parsed mode, or `None` for an unrecognized mode name.
    pub fn mode(&self) -> Option<ActionMode> {
        self.mode
    }

    /// The opaque options attached to this action.
    pub fn options(&self) -> &serde_json::Value {
        &self.options
    }

    /// Folds this action over the block's current value.
    pub(crate) fn apply(&self, composer: &Composer, ctx: &Context, value: String) -> String {
        match self.mode {
            Some(ActionMode::Append) => {
                let increment = (self.body)(composer, ctx);
                value + &increment
            }
            Some(ActionMode::Prepend) => {
                let mut increment = (self.body)(composer, ctx);
                increment.push_str(&value);
                increment
            }
            Some(ActionMode::Replace) => (self.body)(composer, ctx),
            None => value,
        }
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("mode", &self.mode)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// The state accumulated by one layout composition.
///
/// Mutated only through the single logical call chain of one render, so all
/// access goes through a [`SharedState`] handle with interior mutability.
#[derive(Default)]
pub struct RenderState {
    /// Override callbacks queued by `extend`/`embed`, not yet applied.
    /// Drained FIFO by the first `block` (or content getter) call.
    overrides: VecDeque<BlockFn>,

    /// Content actions per block name, in registration order.
    actions: HashMap<String, Vec<Action>>,

    /// Reserved extension point for component tracking. No composer
    /// operation touches it yet.
    components: Vec<serde_json::Value>,
}

impl RenderState {
    /// Creates an empty state, ready for a fresh render tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh state in a shared handle.
    pub fn shared() -> SharedState {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Enqueues an override callback.
    pub(crate) fn push_override(&mut self, body: BlockFn) {
        self.overrides.push_back(body);
    }

    /// Dequeues the oldest pending override callback, if any.
    pub(crate) fn pop_override(&mut self) -> Option<BlockFn> {
        self.overrides.pop_front()
    }

    /// Number of override callbacks still queued.
    pub fn pending_overrides(&self) -> usize {
        self.overrides.len()
    }

    /// Registers an action under the given block name.
    pub(crate) fn add_action(&mut self, name: &str, action: Action) {
        self.actions.entry(name.to_string()).or_default().push(action);
    }

    /// True if at least one action has been registered under the name.
    pub(crate) fn has_actions(&self, name: &str) -> bool {
        self.actions.get(name).is_some_and(|actions| !actions.is_empty())
    }

    /// The actions registered under the name, in registration order.
    ///
    /// Cloned out so the fold can run action bodies without holding a
    /// borrow of the state (bodies may register further content).
    pub(crate) fn actions_for(&self, name: &str) -> Vec<Action> {
        self.actions.get(name).cloned().unwrap_or_default()
    }

    /// The reserved component list.
    pub fn components(&self) -> &[serde_json::Value] {
        &self.components
    }
}

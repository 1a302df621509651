//! The layout composer.
//!
//! [`Composer`] implements the layout composition protocol on top of a
//! [`TemplateHost`]: a child template calls [`extend`](Composer::extend) to
//! render a named parent while queueing an override callback; the parent's
//! [`block`](Composer::block) placeholders drain that queue (letting the
//! callbacks register content actions) and fold the accumulated actions
//! over their default content.
//!
//! ## Ordering
//!
//! Visibility is call order within the render, not template syntactic
//! order: a block folds exactly the actions registered before it was
//! invoked. Actions are never consumed, so rendering the same block twice
//! applies the same accumulated actions twice, each time over that call's
//! own default content.
//!
//! ## Example
//!
//! ```rust,ignore
//! let out = composer.extend(&ctx, "layout", None, Some(Rc::new(|composer, ctx| {
//!     composer.add_content(ctx, "title", Action::replace(Rc::new(|_, _| "Home".into())));
//!     String::new()
//! })))?;
//! ```

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::{ComposeError, Result};
use crate::host::TemplateHost;
use crate::resolve;
use crate::state::Action;

/// A block body, override callback, or action body.
///
/// Receives the composer (for nested `block`/`extend`/content calls) and
/// the current context, and produces a string. Override callbacks are run
/// for their side effects; their output is discarded.
pub type BlockFn = Rc<dyn Fn(&Composer, &Context) -> String>;

/// A compiled template, as produced by a [`TemplateHost`].
pub type PartialFn = Rc<dyn Fn(&Composer, &Context) -> Result<String>>;

/// Configuration surface for partial resolution.
///
/// With no `extend_dirs`, filesystem fallback is disabled and only partials
/// registered with the host resolve.
#[derive(Debug, Clone)]
pub struct ComposerOptions {
    /// File suffix for filesystem-resolved partials.
    pub suffix: String,

    /// Directories probed, in order, for partials the host does not know.
    pub extend_dirs: Vec<PathBuf>,

    /// Whether a file-resolved partial is cached back into the host's
    /// registry for subsequent lookups.
    pub cache: bool,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            suffix: "html".to_string(),
            extend_dirs: Vec::new(),
            cache: false,
        }
    }
}

/// The layout composer.
///
/// Owns the host boundary and the resolution options; all per-render state
/// lives on the [`Context`] passed into each operation, so one composer can
/// serve any number of independent renders.
pub struct Composer {
    // RefCell so cache-back can go through &self while a render is on the
    // stack; rendering is single-threaded and no borrow is held across a
    // template invocation.
    host: RefCell<Box<dyn TemplateHost>>,
    options: ComposerOptions,
}

impl Composer {
    /// Creates a composer with default options (suffix `"html"`, no
    /// filesystem fallback, no cache-back).
    pub fn new(host: Box<dyn TemplateHost>) -> Self {
        Self::with_options(host, ComposerOptions::default())
    }

    /// Creates a composer with explicit options.
    pub fn with_options(host: Box<dyn TemplateHost>, options: ComposerOptions) -> Self {
        Self {
            host: RefCell::new(host),
            options,
        }
    }

    /// The active resolution options.
    pub fn options(&self) -> &ComposerOptions {
        &self.options
    }

    /// Renders the named partial as a fresh top-level render.
    ///
    /// `data` is serialized into the context's data map. Each call starts a
    /// new render tree with empty composition state.
    ///
    /// # Errors
    ///
    /// Fails if `name` cannot be resolved, if `data` cannot be serialized,
    /// or if the template itself fails.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        let ctx = Context::from_serialize(data)?;
        let template = self.resolve(name)?;
        template(self, &ctx)
    }

    /// Renders the named parent partial, queueing `body` as an override.
    ///
    /// The parent renders against a child context: `overrides` shallow-
    /// merged over the current data (later wins, `null` entries skipped),
    /// sharing the current composition state so the queued `body` is
    /// visible to the parent's blocks. `body` defaults to a no-op producing
    /// an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::MissingPartial`] when `name` resolves to
    /// nothing; in that case no state has been mutated.
    pub fn extend(
        &self,
        ctx: &Context,
        name: &str,
        overrides: Option<&Map<String, Value>>,
        body: Option<BlockFn>,
    ) -> Result<String> {
        // Resolve before touching the queue so a missing partial leaves the
        // composition state unchanged.
        let template = self.resolve(name)?;

        let child = match overrides {
            Some(map) => ctx.overlay(map),
            None => ctx.clone(),
        };
        child
            .state()
            .borrow_mut()
            .push_override(body.unwrap_or_else(noop));

        template(self, &child)
    }

    /// Like [`extend`](Composer::extend), but starts a self-contained
    /// composition: the override queue and action registry are reset before
    /// delegating, so the embedded layout never observes (or disturbs) an
    /// enclosing composition's pending state.
    pub fn embed(
        &self,
        ctx: &Context,
        name: &str,
        overrides: Option<&Map<String, Value>>,
        body: Option<BlockFn>,
    ) -> Result<String> {
        let isolated = ctx.detached();
        self.extend(&isolated, name, overrides, body)
    }

    /// Renders the named block placeholder.
    ///
    /// Drains the override queue first (every time, even if a previous
    /// block already drained it; draining an empty queue is a no-op), then
    /// folds the actions registered under `name`, in registration order,
    /// over the default content produced by `body` (empty string if
    /// absent). With no actions registered the default is returned
    /// unchanged.
    pub fn block(&self, ctx: &Context, name: &str, body: Option<BlockFn>) -> String {
        self.drain_overrides(ctx);

        let base = match body {
            Some(body) => body(self, ctx),
            None => String::new(),
        };

        // Cloned out so action bodies run without a live state borrow.
        let actions = ctx.state().borrow().actions_for(name);
        actions
            .into_iter()
            .fold(base, |value, action| action.apply(self, ctx, value))
    }

    /// Reports whether any content has been registered under `name`.
    ///
    /// Drains the override queue first, the same as [`block`], so queued
    /// callbacks get the chance to register their content before the
    /// question is answered. Neither consumes nor alters the registry.
    ///
    /// [`block`]: Composer::block
    pub fn has_content(&self, ctx: &Context, name: &str) -> bool {
        self.drain_overrides(ctx);
        ctx.state().borrow().has_actions(name)
    }

    /// Registers a content action under `name`.
    ///
    /// Does not drain the override queue. The action applies to every
    /// `block(name, ...)` call that occurs after this registration.
    pub fn add_content(&self, ctx: &Context, name: &str, action: Action) {
        ctx.state().borrow_mut().add_action(name, action);
    }

    /// Runs queued override callbacks, oldest first, until the queue is
    /// empty. Callbacks may queue content (or further overrides), so each
    /// dequeue releases the state borrow before invoking.
    fn drain_overrides(&self, ctx: &Context) {
        loop {
            let next = ctx.state().borrow_mut().pop_override();
            match next {
                Some(body) => {
                    body(self, ctx);
                }
                None => break,
            }
        }
    }

    /// Resolves a partial name to a compiled template: host registry first,
    /// then the configured directories.
    fn resolve(&self, name: &str) -> Result<PartialFn> {
        if let Some(template) = self.host.borrow().partial(name) {
            return Ok(template);
        }

        if let Some((_, source)) =
            resolve::probe_dirs(&self.options.extend_dirs, name, &self.options.suffix)?
        {
            if self.options.cache {
                self.host.borrow_mut().cache_partial(name, &source)?;
            }
            return self.host.borrow().compile(name, &source);
        }

        Err(ComposeError::MissingPartial {
            name: name.to_string(),
        })
    }
}

/// The default block body: renders nothing.
fn noop() -> BlockFn {
    Rc::new(|_, _| String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimpleHost;
    use proptest::prelude::*;

    fn composer() -> Composer {
        Composer::new(Box::new(SimpleHost::new()))
    }

    fn text(s: &str) -> BlockFn {
        let s = s.to_string();
        Rc::new(move |_, _| s.clone())
    }

    #[test]
    fn block_without_actions_returns_default() {
        let composer = composer();
        let ctx = Context::new();
        assert_eq!(composer.block(&ctx, "title", Some(text("Hi"))), "Hi");
    }

    #[test]
    fn block_without_body_or_actions_is_empty() {
        let composer = composer();
        let ctx = Context::new();
        assert_eq!(composer.block(&ctx, "title", None), "");
    }

    #[test]
    fn append_actions_fold_in_registration_order() {
        let composer = composer();
        let ctx = Context::new();
        composer.add_content(&ctx, "title", Action::append(text("!")));
        composer.add_content(&ctx, "title", Action::append(text("?")));

        assert_eq!(composer.block(&ctx, "title", Some(text("Hi"))), "Hi!?");
    }

    #[test]
    fn replace_action_discards_default() {
        let composer = composer();
        let ctx = Context::new();
        composer.add_content(&ctx, "title", Action::replace(text("New")));

        assert_eq!(composer.block(&ctx, "title", Some(text("Hi"))), "New");
    }

    #[test]
    fn prepend_action_leads_default() {
        let composer = composer();
        let ctx = Context::new();
        composer.add_content(&ctx, "title", Action::prepend(text(">> ")));

        assert_eq!(composer.block(&ctx, "title", Some(text("Hi"))), ">> Hi");
    }

    #[test]
    fn unrecognized_mode_leaves_value_unchanged() {
        let composer = composer();
        let ctx = Context::new();
        composer.add_content(&ctx, "title", Action::with_mode("inject", text("X")));
        composer.add_content(&ctx, "title", Action::append(text("!")));

        assert_eq!(composer.block(&ctx, "title", Some(text("Hi"))), "Hi!");
    }

    #[test]
    fn mode_names_are_case_insensitive() {
        let composer = composer();
        let ctx = Context::new();
        composer.add_content(&ctx, "title", Action::with_mode("APPEND", text("!")));

        assert_eq!(composer.block(&ctx, "title", Some(text("Hi"))), "Hi!");
    }

    #[test]
    fn actions_are_not_consumed() {
        let composer = composer();
        let ctx = Context::new();
        composer.add_content(&ctx, "title", Action::append(text("!")));

        assert_eq!(composer.block(&ctx, "title", Some(text("Hi"))), "Hi!");
        assert_eq!(composer.block(&ctx, "title", Some(text("Yo"))), "Yo!");
    }

    #[test]
    fn block_before_registration_sees_no_actions() {
        let composer = composer();
        let ctx = Context::new();

        assert_eq!(composer.block(&ctx, "title", Some(text("Hi"))), "Hi");
        composer.add_content(&ctx, "title", Action::append(text("!")));
        assert_eq!(composer.block(&ctx, "title", Some(text("Hi"))), "Hi!");
    }

    #[test]
    fn has_content_reflects_registration() {
        let composer = composer();
        let ctx = Context::new();

        assert!(!composer.has_content(&ctx, "title"));
        composer.add_content(&ctx, "title", Action::replace(text("New")));
        assert!(composer.has_content(&ctx, "title"));
        // Getter does not consume.
        assert!(composer.has_content(&ctx, "title"));
        assert_eq!(composer.block(&ctx, "title", None), "New");
    }

    #[test]
    fn missing_partial_error_carries_name() {
        let composer = composer();
        let ctx = Context::new();

        let err = composer.extend(&ctx, "ghost", None, None).unwrap_err();
        assert!(matches!(err, ComposeError::MissingPartial { ref name } if name == "ghost"));
        // Failed resolution leaves the queue untouched.
        assert_eq!(ctx.state().borrow().pending_overrides(), 0);
    }

    fn reference_fold(base: &str, actions: &[(String, String)]) -> String {
        let mut value = base.to_string();
        for (mode, content) in actions {
            match mode.as_str() {
                "append" => value.push_str(content),
                "prepend" => value = format!("{content}{value}"),
                "replace" => value = content.clone(),
                _ => {}
            }
        }
        value
    }

    fn mode_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("append".to_string()),
            Just("prepend".to_string()),
            Just("replace".to_string()),
            Just("bogus".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn fold_matches_reference_model(
            base in "[a-z]{0,4}",
            actions in proptest::collection::vec((mode_strategy(), "[A-Z]{0,3}"), 0..8),
        ) {
            let composer = composer();
            let ctx = Context::new();

            for (mode, content) in &actions {
                composer.add_content(&ctx, "b", Action::with_mode(mode, text(content)));
            }

            let rendered = composer.block(&ctx, "b", Some(text(&base)));
            prop_assert_eq!(rendered, reference_fold(&base, &actions));
        }
    }
}

//! # Underlay - Layout Composition for Template Hosts
//!
//! `underlay` implements the extend/embed/block/content layout protocol on
//! top of any templating host that supports named partials and block-style
//! helpers: a child template renders a named parent while contributing
//! override content to the parent's named insertion points.
//!
//! ## Core Concepts
//!
//! - [`Composer`]: the four layout operations, plus a top-level `render`
//!   entry point
//! - [`Context`]: per-render data and shared composition state
//! - [`Action`]: a content contribution (append/prepend/replace) targeting
//!   a named block
//! - [`TemplateHost`]: the boundary to the host templating library
//! - [`SimpleHost`]: a closure-based reference host
//!
//! ## How It Works
//!
//! `extend("layout", ...)` queues the child's override callback and renders
//! the named parent. When the parent hits a `block("name")` placeholder,
//! the queued callbacks run first (registering content actions via
//! `add_content`), then the actions for that name are folded over the
//! block's default content in registration order. `embed` does the same
//! but starts from clean state, isolating the nested composition.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use underlay::{Action, Composer, Context, SimpleHost};
//!
//! let mut host = SimpleHost::new();
//! host.add_template(
//!     "layout",
//!     Rc::new(|composer, ctx| {
//!         let title = composer.block(ctx, "title", Some(Rc::new(|_, _| "Untitled".into())));
//!         let body = composer.block(ctx, "body", None);
//!         Ok(format!("<h1>{title}</h1><main>{body}</main>"))
//!     }),
//! );
//!
//! let composer = Composer::new(Box::new(host));
//! let ctx = Context::new();
//!
//! let page = composer
//!     .extend(
//!         &ctx,
//!         "layout",
//!         None,
//!         Some(Rc::new(|composer, ctx| {
//!             composer.add_content(ctx, "title", Action::replace(Rc::new(|_, _| "Home".into())));
//!             composer.add_content(ctx, "body", Action::append(Rc::new(|_, _| "Welcome!".into())));
//!             String::new()
//!         })),
//!     )
//!     .unwrap();
//!
//! assert_eq!(page, "<h1>Home</h1><main>Welcome!</main>");
//! ```
//!
//! ## Filesystem Partials
//!
//! Partials the host does not know can be resolved from configured
//! directories (`<dir>/<name>.<suffix>`, or `<dir>/<name>/index.<suffix>`
//! for names ending in `/`), optionally cached back into the host:
//!
//! ```rust,ignore
//! let options = ComposerOptions {
//!     suffix: "html".into(),
//!     extend_dirs: vec!["./layouts".into()],
//!     cache: true,
//! };
//! let composer = Composer::with_options(Box::new(host), options);
//! ```
//!
//! Rendering is single-threaded and synchronous; composition state is
//! scoped to one top-level render and never shared across renders.

pub mod compose;
pub mod context;
mod error;
pub mod host;
pub mod resolve;
pub mod state;

pub use compose::{BlockFn, Composer, ComposerOptions, PartialFn};
pub use context::Context;
pub use error::{ComposeError, Result};
pub use host::{SimpleHost, TemplateHost};
pub use resolve::{partial_path, probe_dirs};
pub use state::{Action, ActionMode, RenderState, SharedState};

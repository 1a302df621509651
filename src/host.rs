//! Host templating library boundary.
//!
//! The composer does not compile or parse templates itself; it delegates to
//! a host through the [`TemplateHost`] trait. The host owns the partial
//! registry and the compilation pipeline; the composer only asks it to look
//! up, compile, and (optionally) cache partials.
//!
//! [`SimpleHost`] is a minimal reference implementation for hosts without a
//! template language of their own: partials are plain Rust closures, and raw
//! sources compile to literal text. It is also the natural host for tests.
//!
//! # Single-Threaded Design
//!
//! Rendering is a synchronous, single-threaded call tree, so hosts and
//! compiled templates carry no `Send`/`Sync` bounds.

use std::collections::HashMap;
use std::rc::Rc;

use crate::compose::PartialFn;
use crate::error::Result;

/// A host templating library, as seen by the composer.
///
/// Implementations adapt a real template engine: `partial` consults its
/// named-partial registry, `compile` runs its compilation pipeline, and
/// `cache_partial` stores a file-resolved source back into the registry so
/// later lookups skip the filesystem.
pub trait TemplateHost {
    /// Looks up an already-registered partial by name.
    fn partial(&self, name: &str) -> Option<PartialFn>;

    /// Compiles raw template source into a callable template.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Template`](crate::ComposeError::Template) if
    /// the source does not compile.
    fn compile(&self, name: &str, source: &str) -> Result<PartialFn>;

    /// Caches a file-resolved source under `name` for later [`partial`]
    /// lookups.
    ///
    /// Called by the composer when its `cache` option is set.
    ///
    /// [`partial`]: TemplateHost::partial
    fn cache_partial(&mut self, name: &str, source: &str) -> Result<()>;
}

/// A minimal host whose partials are Rust closures.
///
/// `SimpleHost` has no template language: registered templates are closures
/// that call back into the composer (`block`, `extend`, `add_content`, ...),
/// and raw sources compile to templates that render the source text
/// literally. Use it for tests, or for applications that build layouts in
/// code rather than in a template syntax.
///
/// # Example
///
/// ```rust,ignore
/// let mut host = SimpleHost::new();
/// host.add_template("layout", Rc::new(|composer, ctx| {
///     let body = composer.block(ctx, "body", None);
///     Ok(format!("<main>{}</main>", body))
/// }));
/// ```
#[derive(Default)]
pub struct SimpleHost {
    templates: HashMap<String, PartialFn>,
}

impl SimpleHost {
    /// Creates a host with no registered partials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a compiled partial under `name`.
    pub fn add_template(&mut self, name: impl Into<String>, template: PartialFn) {
        self.templates.insert(name.into(), template);
    }

    /// Registers a partial that renders fixed text.
    pub fn add_literal(&mut self, name: impl Into<String>, text: impl Into<String>) {
        let text = text.into();
        self.templates
            .insert(name.into(), Rc::new(move |_, _| Ok(text.clone())));
    }

    /// True if a partial is registered under `name`.
    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

impl TemplateHost for SimpleHost {
    fn partial(&self, name: &str) -> Option<PartialFn> {
        self.templates.get(name).cloned()
    }

    fn compile(&self, _name: &str, source: &str) -> Result<PartialFn> {
        let text = source.to_string();
        Ok(Rc::new(move |_, _| Ok(text.clone())))
    }

    fn cache_partial(&mut self, name: &str, source: &str) -> Result<()> {
        let compiled = self.compile(name, source)?;
        self.templates.insert(name.to_string(), compiled);
        Ok(())
    }
}

//! Render-scoped context.
//!
//! A [`Context`] carries the data visible to templates during one render,
//! together with a shared handle to the composition state (override queue
//! and action registry). The state lives outside the data map, so reserved
//! composition state can never collide with user-supplied template data.
//!
//! Contexts are created fresh per top-level render and propagated downward:
//! [`Context::overlay`] produces a child with independently overridden data
//! but the *same* state handle, so override callbacks pushed by the child
//! are visible when the parent's blocks resolve; `embed` instead detaches
//! onto a new, isolated state.

use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::state::{RenderState, SharedState};

/// The per-render context: template data plus shared composition state.
#[derive(Clone)]
pub struct Context {
    data: Map<String, Value>,
    state: SharedState,
}

impl Context {
    /// Creates an empty context with fresh composition state.
    pub fn new() -> Self {
        Self {
            data: Map::new(),
            state: RenderState::shared(),
        }
    }

    /// Creates a context from a JSON value, with fresh composition state.
    ///
    /// Object values become the data map; any other value yields an empty
    /// map (templates with non-object data have nothing to look up by key).
    pub fn from_value(value: Value) -> Self {
        let data = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            data,
            state: RenderState::shared(),
        }
    }

    /// Serializes `data` and builds a context from it.
    pub fn from_serialize<T: Serialize>(data: &T) -> Result<Self> {
        Ok(Self::from_value(serde_json::to_value(data)?))
    }

    /// Looks up a data value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// The full data map.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The shared composition state handle.
    pub(crate) fn state(&self) -> &SharedState {
        &self.state
    }

    /// Produces a child context with `overrides` shallow-merged over this
    /// context's data, sharing this context's composition state.
    ///
    /// Later sources win on key conflicts; entries with a `null` value are
    /// skipped rather than erasing existing keys. Pushes into the child's
    /// override queue are visible through the parent, and vice versa.
    pub fn overlay(&self, overrides: &Map<String, Value>) -> Self {
        let mut data = self.data.clone();
        for (key, value) in overrides {
            if value.is_null() {
                continue;
            }
            data.insert(key.clone(), value.clone());
        }
        Self {
            data,
            state: Rc::clone(&self.state),
        }
    }

    /// Produces a context with the same data but fresh, empty composition
    /// state. Used by `embed` to isolate a nested layout composition from
    /// any enclosing one.
    pub(crate) fn detached(&self) -> Self {
        Self {
            data: self.data.clone(),
            state: RenderState::shared(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("data", &self.data.keys().collect::<Vec<_>>())
            .field("pending_overrides", &self.state.borrow().pending_overrides())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_object() {
        let ctx = Context::from_value(json!({"title": "Home", "count": 3}));
        assert_eq!(ctx.get("title"), Some(&json!("Home")));
        assert_eq!(ctx.get("count"), Some(&json!(3)));
    }

    #[test]
    fn from_value_non_object_is_empty() {
        let ctx = Context::from_value(json!("just a string"));
        assert!(ctx.data().is_empty());
    }

    #[test]
    fn from_serialize_struct() {
        #[derive(Serialize)]
        struct Page {
            title: String,
        }
        let ctx = Context::from_serialize(&Page {
            title: "About".into(),
        })
        .unwrap();
        assert_eq!(ctx.get("title"), Some(&json!("About")));
    }

    #[test]
    fn overlay_later_wins() {
        let ctx = Context::from_value(json!({"title": "Home", "lang": "en"}));
        let overrides = match json!({"title": "Admin"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let child = ctx.overlay(&overrides);

        assert_eq!(child.get("title"), Some(&json!("Admin")));
        assert_eq!(child.get("lang"), Some(&json!("en")));
        // Parent data is untouched.
        assert_eq!(ctx.get("title"), Some(&json!("Home")));
    }

    #[test]
    fn overlay_skips_null_values() {
        let ctx = Context::from_value(json!({"title": "Home"}));
        let overrides = match json!({"title": null}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let child = ctx.overlay(&overrides);
        assert_eq!(child.get("title"), Some(&json!("Home")));
    }

    #[test]
    fn overlay_shares_state() {
        let ctx = Context::new();
        let child = ctx.overlay(&Map::new());

        child
            .state()
            .borrow_mut()
            .push_override(Rc::new(|_, _| String::new()));
        assert_eq!(ctx.state().borrow().pending_overrides(), 1);
    }

    #[test]
    fn detached_has_fresh_state() {
        let ctx = Context::new();
        ctx.state()
            .borrow_mut()
            .push_override(Rc::new(|_, _| String::new()));

        let isolated = ctx.detached();
        assert_eq!(isolated.state().borrow().pending_overrides(), 0);
        assert_eq!(ctx.state().borrow().pending_overrides(), 1);
    }
}

//! Foreign classes and presentation
//!
//! A foreign class stands in for a class owned by another object system:
//! it has no slots and no parents, but can appear in method signatures and
//! is reported by [`Value::Foreign`](crate::value::Value::Foreign) values.
//!
//! Renderers turn objects into text for display. The dispatch core never
//! calls them.

use crate::class::ClassDef;
use crate::error::{ObjectError, Result};
use crate::instance::Instance;
use crate::system::ObjectSystem;
use std::sync::Arc;
use tracing::debug;

/// Turns an object into display text
pub type RenderFn = Arc<dyn Fn(&Instance) -> String + Send + Sync>;

impl ObjectSystem {
    /// Register a foreign class name; registering it again is a no-op
    pub fn register_foreign_class(&self, name: &str) -> Result<ClassDef> {
        self.write().classes.register_foreign(name)
    }

    /// Use `renderer` for objects of `class` and its subclasses
    pub fn register_renderer<F>(&self, class: &str, renderer: F) -> Result<()>
    where
        F: Fn(&Instance) -> String + Send + Sync + 'static,
    {
        let mut state = self.write();
        if !state.classes.contains(class) {
            return Err(ObjectError::unknown_class(class));
        }
        debug!(class = %class, "registering renderer");
        state.renderers.insert(class.to_string(), Arc::new(renderer));
        Ok(())
    }

    /// Render with the renderer of the nearest class that has one
    pub fn render(&self, object: &Instance) -> String {
        let renderer = {
            let state = self.read();
            state
                .classes
                .graph()
                .ancestors(object.class_name())
                .unwrap_or_default()
                .iter()
                .find_map(|(class, _)| state.renderers.get(class).cloned())
        };

        match renderer {
            Some(renderer) => renderer(object),
            None => default_render(object),
        }
    }
}

/// `An object of class "X"` followed by every stored slot
pub fn default_render(object: &Instance) -> String {
    let mut lines = vec![format!("An object of class \"{}\"", object.class_name())];
    for (slot, value) in object.stored_slots() {
        lines.push(format!("Slot \"{slot}\":"));
        lines.push(value.to_string());
    }
    lines.join("\n")
}

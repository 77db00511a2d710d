//! The object system handle
//!
//! [`ObjectSystem`] owns the class registry, the generic registry and the
//! renderers behind one reader/writer lock. Handles are cheap to clone and
//! share the same registries; separate `ObjectSystem::new()` calls give
//! fully independent systems.
//!
//! Declarations take the write lock. Resolution takes the read lock and
//! releases it before any method runs, so implementations are free to call
//! back into the system.

use crate::class::{ClassDef, ClassSpec};
use crate::config::SystemConfig;
use crate::construct::default_initialize;
use crate::dispatch::{self, Arguments, BoundArguments, DepthGuard, MethodCall, Resolution};
use crate::error::{AmbiguousDispatchWarning, ObjectError, Result};
use crate::generic::{Generic, GenericRegistry, DOTS, INITIALIZE};
use crate::graph::Distance;
use crate::interop::RenderFn;
use crate::method::{MethodEntry, Signature, Specializer};
use crate::registry::ClassRegistry;
use crate::value::Value;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::warn;

/// Everything guarded by the system lock
pub(crate) struct SystemState {
    pub(crate) classes: ClassRegistry,
    pub(crate) generics: GenericRegistry,
    pub(crate) renderers: HashMap<String, RenderFn>,
}

impl SystemState {
    fn new(config: &SystemConfig) -> Self {
        let classes = ClassRegistry::new(&config.classes.extra_base_types);
        let mut generics = GenericRegistry::new();

        let initialize = generics
            .declare(INITIALIZE, vec![".Object".to_string(), DOTS.to_string()], 1)
            .and_then(|_| {
                generics.add_method(
                    &classes.graph(),
                    INITIALIZE,
                    Signature::new([Specializer::Any]),
                    Arc::new(default_initialize),
                )
            });
        // The built-in shape is always valid
        debug_assert!(initialize.is_ok());

        Self {
            classes,
            generics,
            renderers: HashMap::new(),
        }
    }
}

/// Handle to a set of class, generic and method registries
#[derive(Clone)]
pub struct ObjectSystem {
    state: Arc<RwLock<SystemState>>,
    warnings: Arc<Mutex<VecDeque<AmbiguousDispatchWarning>>>,
    config: Arc<SystemConfig>,
}

impl ObjectSystem {
    /// Create a system with the default configuration
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(SystemState::new(&config))),
            warnings: Arc::new(Mutex::new(VecDeque::new())),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Drop every declaration and recorded warning, keeping the configuration
    pub fn reset(&self) {
        *self.state.write() = SystemState::new(&self.config);
        self.warnings.lock().clear();
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, SystemState> {
        self.state.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, SystemState> {
        self.state.write()
    }

    /// Identity shared by every clone of this handle
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.state) as usize
    }

    pub(crate) fn max_dispatch_depth(&self) -> usize {
        self.config.dispatch.max_dispatch_depth
    }

    // Classes

    /// Declare a class, replacing any previous definition of the same name
    pub fn declare_class(&self, spec: ClassSpec) -> Result<ClassDef> {
        self.write().classes.declare(spec.into_def())
    }

    /// Declare a virtual class that every member inherits from
    pub fn declare_class_union<I, S>(&self, name: &str, members: I) -> Result<ClassDef>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        self.write().classes.declare_union(name, &members)
    }

    pub fn class_def(&self, name: &str) -> Option<ClassDef> {
        self.read().classes.get(name).cloned()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.read().classes.contains(name)
    }

    pub fn is_virtual_class(&self, name: &str) -> bool {
        self.read()
            .classes
            .get(name)
            .is_some_and(|def| def.is_virtual)
    }

    /// `name` and every class it inherits from, nearest first
    pub fn ancestors_of(&self, name: &str) -> Result<Vec<String>> {
        let state = self.read();
        let ancestors = state
            .classes
            .graph()
            .ancestors(name)
            .ok_or_else(|| ObjectError::unknown_class(name))?;
        Ok(ancestors.into_iter().map(|(class, _)| class).collect())
    }

    pub fn distance(&self, from: &str, to: &str) -> Distance {
        self.read().classes.graph().distance(from, to)
    }

    pub fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        self.read().classes.graph().is_subclass_of(class, ancestor)
    }

    // Generics and methods

    /// Declare a generic dispatching on its first `dispatch_arity` parameters
    pub fn declare_generic<I, S>(
        &self,
        name: &str,
        formal_params: I,
        dispatch_arity: usize,
    ) -> Result<Generic>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let params = formal_params.into_iter().map(Into::into).collect();
        self.write().generics.declare(name, params, dispatch_arity)
    }

    pub fn generic(&self, name: &str) -> Option<Generic> {
        self.read().generics.get(name).cloned()
    }

    /// Register `implementation` for `signature`, replacing an existing
    /// method with the same signature
    pub fn declare_method<I, S, F>(
        &self,
        generic: &str,
        signature: I,
        implementation: F,
    ) -> Result<MethodEntry>
    where
        I: IntoIterator<Item = S>,
        S: Into<Specializer>,
        F: Fn(&mut MethodCall<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        let signature = Signature::new(signature);
        let mut guard = self.write();
        let state = &mut *guard;
        let graph = state.classes.graph();
        state
            .generics
            .add_method(&graph, generic, signature, Arc::new(implementation))
    }

    pub fn remove_method<I, S>(&self, generic: &str, signature: I) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: Into<Specializer>,
    {
        self.write()
            .generics
            .remove_method(generic, &Signature::new(signature))
    }

    /// Whether a method with exactly this signature exists
    pub fn has_method<I, S>(&self, generic: &str, signature: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<Specializer>,
    {
        let signature = Signature::new(signature);
        self.read()
            .generics
            .methods(generic)
            .is_some_and(|methods| methods.get(&signature).is_some())
    }

    /// Signature of the method `invoke` would run for these arguments
    pub fn select_method(&self, generic: &str, args: impl Into<Arguments>) -> Result<Signature> {
        let (_, _, resolution) = self.resolve(generic, args.into())?;
        if let Some(warning) = resolution.warning {
            self.report(warning);
        }
        Ok(resolution.chain[0].signature.clone())
    }

    /// Call a generic: resolve the most specific method for the arguments'
    /// classes and run it
    pub fn invoke(&self, generic: &str, args: impl Into<Arguments>) -> Result<Value> {
        let _depth = DepthGuard::enter(self.id(), generic, self.max_dispatch_depth())?;

        let (definition, bound, resolution) = self.resolve(generic, args.into())?;
        let Resolution { chain, warning } = resolution;
        if let Some(warning) = warning {
            self.report(warning);
        }

        MethodCall::new(self, &definition, &chain, bound).run()
    }

    fn resolve(&self, generic: &str, args: Arguments) -> Result<(Generic, BoundArguments, Resolution)> {
        let state = self.read();
        let (definition, methods) = state.generics.require(generic)?;
        let bound = BoundArguments::bind(definition, args)?;
        let arg_classes = bound.dispatch_classes(definition.dispatch_arity);
        let resolution = dispatch::resolve(
            &state.classes.graph(),
            state.classes.len(),
            definition,
            methods,
            &arg_classes,
        )?;
        Ok((definition.clone(), bound, resolution))
    }

    // Diagnostics

    fn report(&self, warning: AmbiguousDispatchWarning) {
        warn!(generic = %warning.generic, "{warning}");
        let limit = self.config.dispatch.max_recorded_warnings;
        if !self.config.dispatch.record_warnings || limit == 0 {
            return;
        }
        let mut warnings = self.warnings.lock();
        while warnings.len() >= limit {
            warnings.pop_front();
        }
        warnings.push_back(warning);
    }

    /// Drain the ambiguity warnings recorded since the last call, oldest
    /// first. At most `max_recorded_warnings` are kept.
    pub fn take_warnings(&self) -> Vec<AmbiguousDispatchWarning> {
        self.warnings.lock().drain(..).collect()
    }
}

impl Default for ObjectSystem {
    fn default() -> Self {
        Self::new()
    }
}

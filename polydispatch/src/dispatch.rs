//! Multiple dispatch resolution and invocation
//!
//! # Algorithm Overview
//!
//! 1. **Bind arguments**: named arguments go to the formal with that name,
//!    positional arguments fill the remaining formals left to right. The
//!    first `dispatch_arity` formals give the dispatch classes; an unfilled
//!    one is `missing`.
//! 2. **Score**: every method of the generic is scored position by position.
//!    A class specializer scores its inheritance distance, `ANY` scores a
//!    sentinel larger than any distance, `missing` scores zero against an
//!    omitted argument. Any other combination excludes the method.
//! 3. **Select**: the lowest total wins. Ties are broken by comparing the
//!    signatures' class names lexicographically and reported as an
//!    [`AmbiguousDispatchWarning`].
//! 4. **Chain**: from the selected method, the next method is the best of
//!    the candidates that are no more specific at any position and less
//!    specific at one. The whole chain is computed once, before any
//!    implementation runs.

use crate::error::{AmbiguousDispatchWarning, ObjectError, Result};
use crate::generic::{Generic, DOTS};
use crate::graph::ClassGraph;
use crate::method::{MethodEntry, MethodTable, Signature, Specializer};
use crate::system::ObjectSystem;
use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Arguments supplied to a generic call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Option<Value>>,
    named: IndexMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(Some(value.into()));
        self
    }

    /// Append an explicitly omitted positional argument
    pub fn missing(mut self) -> Self {
        self.positional.push(None);
        self
    }

    /// Add a named argument
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn positional(&self) -> &[Option<Value>] {
        &self.positional
    }

    pub fn named_values(&self) -> &IndexMap<String, Value> {
        &self.named
    }

    pub(crate) fn prepend(mut self, value: Value) -> Self {
        self.positional.insert(0, Some(value));
        self
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self {
            positional: values.into_iter().map(Some).collect(),
            named: IndexMap::new(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Arguments
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs
            .into_iter()
            .fold(Arguments::new(), |args, (name, value)| args.named(name, value))
    }
}

/// Arguments matched to a generic's formal parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArguments {
    /// One entry per formal parameter; `...` is always `None`
    formals: Vec<Option<Value>>,
    rest: Vec<Value>,
    rest_named: IndexMap<String, Value>,
}

impl BoundArguments {
    pub fn bind(generic: &Generic, args: Arguments) -> Result<Self> {
        let mut formals: Vec<Option<Value>> = vec![None; generic.formal_params.len()];
        let mut rest_named = IndexMap::new();

        for (name, value) in args.named {
            match generic.param_index(&name) {
                Some(index) => formals[index] = Some(value),
                None if generic.has_dots() => {
                    rest_named.insert(name, value);
                }
                None => {
                    return Err(ObjectError::UnknownArgument {
                        generic: generic.name.clone(),
                        name,
                    })
                }
            }
        }

        // Formals after `...` can only be matched by name
        let open: Vec<usize> = generic
            .formal_params
            .iter()
            .take_while(|param| *param != DOTS)
            .enumerate()
            .filter(|(index, _)| formals[*index].is_none())
            .map(|(index, _)| index)
            .collect();

        let mut open = open.into_iter();
        let mut rest = Vec::new();
        for (position, value) in args.positional.into_iter().enumerate() {
            match open.next() {
                Some(index) => formals[index] = value,
                None if generic.has_dots() => rest.extend(value),
                None => {
                    return Err(ObjectError::UnknownArgument {
                        generic: generic.name.clone(),
                        name: format!("#{}", position + 1),
                    })
                }
            }
        }

        Ok(Self {
            formals,
            rest,
            rest_named,
        })
    }

    /// Runtime class of each dispatched formal; `None` when omitted
    pub fn dispatch_classes(&self, arity: usize) -> Vec<Option<&str>> {
        self.formals
            .iter()
            .take(arity)
            .map(|value| value.as_ref().map(Value::class_name))
            .collect()
    }

    pub fn formal(&self, index: usize) -> Option<&Value> {
        self.formals.get(index).and_then(Option::as_ref)
    }

    pub fn rest(&self) -> &[Value] {
        &self.rest
    }

    pub fn rest_named(&self) -> &IndexMap<String, Value> {
        &self.rest_named
    }
}

thread_local! {
    /// Nesting depth per system on this thread, keyed by `ObjectSystem::id`
    static DISPATCH_DEPTH: RefCell<HashMap<usize, usize>> = RefCell::new(HashMap::new());
}

/// Counts nested dispatches into one system on this thread for as long as
/// it lives
pub(crate) struct DepthGuard {
    system: usize,
}

impl DepthGuard {
    pub(crate) fn enter(system: usize, generic: &str, max_depth: usize) -> Result<Self> {
        DISPATCH_DEPTH.with(|depths| {
            let mut depths = depths.borrow_mut();
            let depth = depths.entry(system).or_insert(0);
            if *depth >= max_depth {
                return Err(ObjectError::DispatchLoop {
                    generic: generic.to_string(),
                    max_depth,
                });
            }
            *depth += 1;
            Ok(DepthGuard { system })
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DISPATCH_DEPTH.with(|depths| {
            let mut depths = depths.borrow_mut();
            if let Some(depth) = depths.get_mut(&self.system) {
                *depth = depth.saturating_sub(1);
                if *depth == 0 {
                    depths.remove(&self.system);
                }
            }
        });
    }
}

/// An applicable method with its per-position scores
#[derive(Debug, Clone)]
struct Candidate<'t> {
    entry: &'t MethodEntry,
    scores: Vec<u64>,
    total: u64,
}

impl Candidate<'_> {
    /// No more specific anywhere and less specific somewhere
    fn is_less_specific_than(&self, other: &Candidate<'_>) -> bool {
        let pairs = || self.scores.iter().zip(&other.scores);
        pairs().all(|(mine, theirs)| mine >= theirs) && pairs().any(|(mine, theirs)| mine > theirs)
    }

    fn precedence(&self, other: &Candidate<'_>) -> Ordering {
        self.total
            .cmp(&other.total)
            .then_with(|| self.entry.signature.labels().cmp(&other.entry.signature.labels()))
    }
}

/// Outcome of method resolution for one call
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Selected method first, then its next methods in order
    pub chain: Vec<MethodEntry>,
    pub warning: Option<AmbiguousDispatchWarning>,
}

/// Score one signature position against one argument class
fn score_position(
    graph: &ClassGraph<'_>,
    specializer: &Specializer,
    arg_class: Option<&str>,
    any_score: u64,
) -> Option<u64> {
    match (specializer, arg_class) {
        (Specializer::Missing, None) => Some(0),
        (Specializer::Missing, Some(_)) => None,
        (Specializer::Any, _) => Some(any_score),
        (Specializer::Class(_), None) => None,
        (Specializer::Class(class), Some(arg_class)) => {
            graph.distance(arg_class, class).value().map(u64::from)
        }
    }
}

pub(crate) fn describe_classes(arg_classes: &[Option<&str>]) -> String {
    arg_classes
        .iter()
        .map(|class| format!("\"{}\"", class.unwrap_or(crate::class::MISSING)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve the method chain of `generic` for the given dispatch classes.
///
/// `class_count` bounds every finite distance, so `class_count + 1` is the
/// score of an `ANY` position.
pub fn resolve(
    graph: &ClassGraph<'_>,
    class_count: usize,
    generic: &Generic,
    methods: &MethodTable,
    arg_classes: &[Option<&str>],
) -> Result<Resolution> {
    let any_score = class_count as u64 + 1;

    let mut pool: Vec<Candidate<'_>> = methods
        .iter()
        .filter_map(|entry| {
            let scores = entry
                .signature
                .iter()
                .zip(arg_classes)
                .map(|(specializer, arg_class)| {
                    score_position(graph, specializer, *arg_class, any_score)
                })
                .collect::<Option<Vec<u64>>>()?;
            let total = scores.iter().sum();
            trace!(generic = %generic.name, signature = %entry.signature, total, "applicable method");
            Some(Candidate {
                entry,
                scores,
                total,
            })
        })
        .collect();

    if pool.is_empty() {
        return Err(ObjectError::NoApplicableMethod {
            generic: generic.name.clone(),
            arg_classes: describe_classes(arg_classes),
        });
    }

    pool.sort_by(|a, b| a.precedence(b));
    let warning = ambiguity(generic, arg_classes, &pool);

    let mut chain = Vec::new();
    while !pool.is_empty() {
        let current = pool.remove(0);
        pool.retain(|candidate| candidate.is_less_specific_than(&current));
        chain.push(current.entry.clone());
    }

    debug!(
        generic = %generic.name,
        selected = %chain[0].signature,
        next_methods = chain.len() - 1,
        "resolved method"
    );

    Ok(Resolution { chain, warning })
}

/// Warning for a tie at the best score; `sorted` is in precedence order
fn ambiguity(
    generic: &Generic,
    arg_classes: &[Option<&str>],
    sorted: &[Candidate<'_>],
) -> Option<AmbiguousDispatchWarning> {
    let best = sorted.first()?;
    let tied: Vec<Signature> = sorted
        .iter()
        .skip(1)
        .take_while(|candidate| candidate.total == best.total)
        .map(|candidate| candidate.entry.signature.clone())
        .collect();

    if tied.is_empty() {
        return None;
    }

    Some(AmbiguousDispatchWarning {
        generic: generic.name.clone(),
        arg_classes: describe_classes(arg_classes),
        selected: best.entry.signature.clone(),
        tied,
    })
}

/// The call handed to a method implementation
///
/// Gives access to the bound arguments, the object system for re-entrant
/// calls, and the next method in the chain.
pub struct MethodCall<'a> {
    system: &'a ObjectSystem,
    generic: &'a Generic,
    chain: &'a [MethodEntry],
    position: usize,
    args: BoundArguments,
}

impl<'a> MethodCall<'a> {
    pub(crate) fn new(
        system: &'a ObjectSystem,
        generic: &'a Generic,
        chain: &'a [MethodEntry],
        args: BoundArguments,
    ) -> Self {
        Self {
            system,
            generic,
            chain,
            position: 0,
            args,
        }
    }

    pub(crate) fn run(&mut self) -> Result<Value> {
        let implementation = Arc::clone(&self.chain[self.position].implementation);
        trace!(generic = %self.generic.name, signature = %self.signature(), "invoking method");
        implementation(self)
    }

    pub fn system(&self) -> &'a ObjectSystem {
        self.system
    }

    pub fn generic(&self) -> &Generic {
        self.generic
    }

    /// Signature of the method currently running
    pub fn signature(&self) -> &Signature {
        &self.chain[self.position].signature
    }

    pub fn args(&self) -> &BoundArguments {
        &self.args
    }

    /// Argument bound to the formal at `index`
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.formal(index)
    }

    /// Argument bound to a formal, or collected by `...`, under `name`
    pub fn arg_named(&self, name: &str) -> Option<&Value> {
        match self.generic.param_index(name) {
            Some(index) => self.args.formal(index),
            None => self.args.rest_named.get(name),
        }
    }

    /// Like [`arg_named`](Self::arg_named) but fails when absent
    pub fn required(&self, name: &str) -> Result<&Value> {
        self.arg_named(name)
            .ok_or_else(|| self.fail(format!("argument \"{name}\" is missing, with no default")))
    }

    pub fn rest(&self) -> &[Value] {
        &self.args.rest
    }

    pub fn rest_named(&self) -> &IndexMap<String, Value> {
        &self.args.rest_named
    }

    /// Replace the argument bound to the formal at `index`
    pub fn set_arg(&mut self, index: usize, value: impl Into<Value>) {
        if let Some(slot) = self.args.formals.get_mut(index) {
            *slot = Some(value.into());
        }
    }

    /// Replace a named argument; unknown names join `...`
    pub fn set_named(&mut self, name: &str, value: impl Into<Value>) {
        match self.generic.param_index(name) {
            Some(index) => self.args.formals[index] = Some(value.into()),
            None => {
                self.args.rest_named.insert(name.to_string(), value.into());
            }
        }
    }

    /// Remove and return a named argument so later methods don't see it
    pub fn take_named(&mut self, name: &str) -> Option<Value> {
        match self.generic.param_index(name) {
            Some(index) => self.args.formals[index].take(),
            None => self.args.rest_named.shift_remove(name),
        }
    }

    pub fn has_next_method(&self) -> bool {
        self.position + 1 < self.chain.len()
    }

    /// Number of methods left after the current one
    pub fn remaining_methods(&self) -> usize {
        self.chain.len() - self.position - 1
    }

    /// Call the next method with the current arguments
    pub fn call_next(&mut self) -> Result<Value> {
        let args = self.args.clone();
        self.call_next_bound(args)
    }

    /// Call the next method with replacement arguments
    pub fn call_next_with(&mut self, args: impl Into<Arguments>) -> Result<Value> {
        let bound = BoundArguments::bind(self.generic, args.into())?;
        self.call_next_bound(bound)
    }

    fn call_next_bound(&mut self, args: BoundArguments) -> Result<Value> {
        if !self.has_next_method() {
            return Err(ObjectError::NoNextMethod {
                generic: self.generic.name.clone(),
                signature: self.signature().clone(),
            });
        }

        let _depth = DepthGuard::enter(
            self.system.id(),
            &self.generic.name,
            self.system.max_dispatch_depth(),
        )?;
        let mut next = MethodCall {
            system: self.system,
            generic: self.generic,
            chain: self.chain,
            position: self.position + 1,
            args,
        };
        next.run()
    }

    /// Build a failure attributed to the running method
    pub fn fail(&self, message: impl Into<String>) -> ObjectError {
        ObjectError::MethodFailed {
            generic: self.generic.name.clone(),
            signature: self.signature().clone(),
            message: message.into(),
        }
    }
}

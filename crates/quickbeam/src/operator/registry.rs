//! Operator name to handler-pair registry

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use super::handler::HandlerPair;

/// Maps operator names to their current handler pairs.
///
/// A dedicated structure, deliberately not exposed through any
/// general-purpose attribute API: ordinary user code cannot reach in and
/// tamper with an operator's handlers.
///
/// Registration fully replaces the previous pair for a name; the pair is
/// stored behind an `Arc`, so replacement is atomic from a reader's
/// perspective and a lookup never observes a half-written pair. The
/// expected access pattern is read-mostly: concurrent readers, an
/// occasional writer.
#[derive(Debug, Default)]
pub struct OperatorRegistry {
    handlers: DashMap<Arc<str>, Arc<HandlerPair>>,
}

impl OperatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or fully replace the handler pair for `name`.
    pub fn register(&self, name: impl Into<Arc<str>>, pair: HandlerPair) {
        let name = name.into();
        tracing::debug!(operator = %name, "registering special operator");
        self.handlers.insert(name, Arc::new(pair));
    }

    /// Look up the current handler pair for `name`. O(1).
    pub fn lookup(&self, name: &str) -> Option<Arc<HandlerPair>> {
        self.handlers.get(name).map(|entry| entry.value().clone())
    }

    /// Whether `name` names a registered operator.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered operators.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

static GLOBAL: OnceLock<OperatorRegistry> = OnceLock::new();

/// The process-wide operator registry used by the generic dispatcher.
pub fn global_registry() -> &'static OperatorRegistry {
    GLOBAL.get_or_init(OperatorRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{compile_handler, FormPattern, HandlerSpec, ImmediateBody};
    use crate::value::Value;

    fn dummy_pair(result: i64) -> HandlerPair {
        compile_handler(HandlerSpec {
            name: "dummy",
            pattern: FormPattern::new("dummy"),
            immediate: ImmediateBody::Fallback,
            deferred: Arc::new(move |_| {
                Ok(Arc::new(move |_env, _ctx| Ok(Value::Int(result))))
            }),
        })
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = OperatorRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup("dummy").is_none());

        registry.register("dummy", dummy_pair(1));
        assert!(registry.contains("dummy"));
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("dummy").is_some());
    }

    #[test]
    fn test_register_replaces_whole_pair() {
        let registry = OperatorRegistry::new();
        registry.register("dummy", dummy_pair(1));
        let first = registry.lookup("dummy").unwrap();

        registry.register("dummy", dummy_pair(2));
        let second = registry.lookup("dummy").unwrap();

        // The new pair replaced the old wholesale, never a merge
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);

        let env = crate::Environment::new();
        let ctx = crate::EvalContext::new();
        let form = Value::list(vec![Value::symbol("dummy")]);
        let exec = (second.deferred)(&form).unwrap();
        assert_eq!(exec(&env, &ctx).unwrap(), Value::Int(2));
    }
}

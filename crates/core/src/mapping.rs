//! Input → model → view mapping.
//!
//! Rules are registered once per `(source, destination)` type pair; a
//! second registration for the same pair is ignored. Pairs without a rule
//! fall back to field-name pass-through through serde, so a view type that
//! shares field names with its model needs no rule at all.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Failed to read source for mapping: {0}")]
    Source(String),

    #[error("Failed to build {destination} from source: {message}")]
    Destination {
        destination: &'static str,
        message: String,
    },
}

type Rule = Arc<dyn Fn(&dyn Any) -> Option<Box<dyn Any + Send>> + Send + Sync>;

/// Registry of mapping rules. Cheap to share behind an `Arc`.
#[derive(Default)]
pub struct Mapper {
    rules: RwLock<HashMap<(TypeId, TypeId), Rule>>,
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom rule for `S → D`. Returns `false` (and keeps the
    /// existing rule) if the pair is already registered.
    pub fn register<S, D, F>(&self, rule: F) -> bool
    where
        S: 'static,
        D: Send + 'static,
        F: Fn(&S) -> D + Send + Sync + 'static,
    {
        let key = (TypeId::of::<S>(), TypeId::of::<D>());
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        if rules.contains_key(&key) {
            return false;
        }
        let erased: Rule = Arc::new(move |source: &dyn Any| {
            source
                .downcast_ref::<S>()
                .map(|s| Box::new(rule(s)) as Box<dyn Any + Send>)
        });
        rules.insert(key, erased);
        true
    }

    pub fn has_rule<S: 'static, D: 'static>(&self) -> bool {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(TypeId::of::<S>(), TypeId::of::<D>()))
    }

    /// Map `source` to `D` using the registered rule, or by field names.
    pub fn map<S, D>(&self, source: &S) -> Result<D, MapError>
    where
        S: Serialize + 'static,
        D: DeserializeOwned + Send + 'static,
    {
        let rule = self
            .rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(TypeId::of::<S>(), TypeId::of::<D>()))
            .cloned();

        if let Some(rule) = rule {
            let mapped = rule(source as &dyn Any).and_then(|boxed| boxed.downcast::<D>().ok());
            if let Some(mapped) = mapped {
                return Ok(*mapped);
            }
        }

        pass_through(source)
    }
}

fn pass_through<S, D>(source: &S) -> Result<D, MapError>
where
    S: Serialize,
    D: DeserializeOwned,
{
    let value = serde_json::to_value(source).map_err(|e| MapError::Source(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| MapError::Destination {
        destination: std::any::type_name::<D>(),
        message: e.to_string(),
    })
}

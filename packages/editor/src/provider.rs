//! # Providers
//!
//! A provider is one typed, parameterized unit of an experiment definition:
//! a precondition, an action, or a filter nested inside an action's
//! environment query.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider type that repeats its logic `loopCount` times
pub const LOOP_PROVIDER_TYPE: &str = "Probation.Providers.LoopAction";

/// Ordered parameter name → value map
pub type ParameterMap = IndexMap<String, String>;

/// Loop parameter name → one value per iteration
pub type LoopParameters = IndexMap<String, Vec<String>>;

/// Session-stable provider identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Where a provider sits inside a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderRole {
    Precondition,
    Action,
    Filter,
}

/// Which goal list a provider was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalKind {
    #[default]
    Target,
    Control,
}

/// One editable precondition, action or filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: ProviderId,

    /// Fully-qualified provider type name
    #[serde(rename = "type")]
    pub provider_type: String,

    pub role: ProviderRole,

    #[serde(default)]
    pub goal: GoalKind,

    #[serde(default)]
    pub parameters: ParameterMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_parameters: Option<LoopParameters>,

    /// Position among the template slots of its role; `None` for added providers
    #[serde(skip)]
    pub slot: Option<usize>,

    /// Action whose environment query holds this filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ProviderId>,
}

impl Provider {
    pub fn new(id: ProviderId, provider_type: impl Into<String>, role: ProviderRole) -> Self {
        Self {
            id,
            provider_type: provider_type.into(),
            role,
            goal: GoalKind::Target,
            parameters: ParameterMap::new(),
            loop_count: None,
            loop_parameters: None,
            slot: None,
            owner: None,
        }
    }

    pub fn with_goal(mut self, goal: GoalKind) -> Self {
        self.goal = goal;
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn has_loop(&self) -> bool {
        self.loop_count.is_some() || self.loop_parameters.is_some()
    }
}

/// Hands out `provider-N` identifiers, unique for one session
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> ProviderId {
        let id = ProviderId(format!("provider-{}", self.next));
        self.next += 1;
        id
    }
}

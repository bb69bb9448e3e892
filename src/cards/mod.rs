//! Cards: static definitions, the catalog, keywords, and live instances.

mod definition;
mod instance;
mod keywords;
mod registry;

pub use definition::{
    ActSpec, Archetype, CardDefinition, CardHook, CardKind, LifecycleHooks, SpellEffect,
    TargetHook, TextFragment,
};
pub use instance::{AttackKind, Card, CombatState};
pub use keywords::{Keyword, KeywordSet};
pub use registry::CardRegistry;

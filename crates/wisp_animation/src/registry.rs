//! Effect registry and extensions
//!
//! Effects are registered in groups by an [`Extension`]. The built-in effects
//! form the `wisp` extension, registered when the registry is created; other
//! crates add their own at runtime and get an [`ExtensionId`] back, which is
//! the only way to remove them again.
//!
//! Each event kind keeps an ordered list of the effects allowed for it. Names
//! are resolved case-insensitively, either plain (`"Zoom"`) or qualified by
//! the owning extension (`"wisp:Zoom"`).

use crate::effect::Effect;
use crate::event::EventKind;
use crate::options::ParamTable;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;
use tracing::debug;
use wisp_core::{Result, WispError};

new_key_type! {
    /// Handle to a registered effect
    pub struct EffectId;
    /// Handle returned when an extension is registered
    pub struct ExtensionId;
}

/// Name of the extension holding the built-in effects
pub const BUILTIN_EXTENSION: &str = "wisp";

/// A group of effects contributed by one module
pub trait Extension {
    /// Prefix used in qualified effect names
    fn name(&self) -> &str;

    /// Effects in registration order
    fn effects(&self) -> Vec<Arc<dyn Effect>>;
}

/// An effect and where it came from
#[derive(Clone)]
pub struct RegisteredEffect {
    pub effect: Arc<dyn Effect>,
    pub extension: ExtensionId,
    /// `extension:Name`
    pub qualified_name: String,
}

struct ExtensionRecord {
    name: String,
    effects: Vec<EffectId>,
    params: Vec<String>,
}

/// Every registered effect, its parameters and the per-event allowed lists
pub struct EffectRegistry {
    effects: SlotMap<EffectId, RegisteredEffect>,
    extensions: SlotMap<ExtensionId, ExtensionRecord>,
    allowed: [Vec<EffectId>; EventKind::COUNT],
    params: ParamTable,
    none: EffectId,
    random: EffectId,
}

impl EffectRegistry {
    /// Registry holding the built-in effects
    pub fn new() -> Self {
        let mut registry = Self {
            effects: SlotMap::with_key(),
            extensions: SlotMap::with_key(),
            allowed: Default::default(),
            params: ParamTable::new(),
            none: EffectId::default(),
            random: EffectId::default(),
        };

        // Built-in parameter names are unique, so this cannot fail
        let builtins = crate::effects::Builtins;
        if let Err(e) = registry.register_extension(&builtins) {
            tracing::error!(error = %e, "failed to register built-in effects");
        }
        registry.none = registry.lookup("None").unwrap_or_default();
        registry.random = registry.lookup("Random").unwrap_or_default();
        registry
    }

    /// Add an extension's effects and parameters
    ///
    /// Fails when the extension name is taken or one of its parameters is
    /// already declared by another extension.
    pub fn register_extension(&mut self, extension: &dyn Extension) -> Result<ExtensionId> {
        let ext_name = extension.name().to_string();
        if self.extension_by_name(&ext_name).is_some() {
            return Err(WispError::Extension(format!(
                "extension \"{ext_name}\" is already registered"
            )));
        }

        let effects = extension.effects();
        let mut new_params = Vec::new();
        for effect in &effects {
            for spec in effect.params() {
                let key = spec.name.to_ascii_lowercase();
                if self.params.contains_key(&key) || new_params.iter().any(|(k, _)| *k == key) {
                    return Err(WispError::Extension(format!(
                        "parameter \"{}\" of {}:{} is already declared",
                        spec.name,
                        ext_name,
                        effect.name()
                    )));
                }
                new_params.push((key, spec));
            }
        }

        let ext_id = self.extensions.insert(ExtensionRecord {
            name: ext_name.clone(),
            effects: Vec::with_capacity(effects.len()),
            params: new_params.iter().map(|(k, _)| k.clone()).collect(),
        });
        for (key, spec) in new_params {
            self.params.insert(key, spec);
        }

        for effect in effects {
            let qualified_name = format!("{}:{}", ext_name, effect.name());
            let events = effect.events();
            let id = self.effects.insert(RegisteredEffect {
                effect,
                extension: ext_id,
                qualified_name,
            });
            for kind in events.iter() {
                self.allowed[kind.index()].push(id);
            }
            if let Some(record) = self.extensions.get_mut(ext_id) {
                record.effects.push(id);
            }
        }

        debug!(extension = %ext_name, "registered extension");
        Ok(ext_id)
    }

    /// Remove an extension's effects and parameters
    ///
    /// Windows animating with those effects must be cleaned up first. Returns
    /// the removed effect ids; an unknown handle removes nothing.
    pub fn unregister_extension(&mut self, id: ExtensionId) -> Vec<EffectId> {
        let Some(record) = self.extensions.remove(id) else {
            return Vec::new();
        };
        for list in &mut self.allowed {
            list.retain(|e| !record.effects.contains(e));
        }
        for effect in &record.effects {
            self.effects.remove(*effect);
        }
        for key in &record.params {
            self.params.shift_remove(key);
        }
        debug!(extension = %record.name, "unregistered extension");
        record.effects
    }

    pub fn extension_by_name(&self, name: &str) -> Option<ExtensionId> {
        self.extensions
            .iter()
            .find(|(_, r)| r.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| id)
    }

    /// Effects contributed by an extension
    pub fn extension_effects(&self, id: ExtensionId) -> &[EffectId] {
        self.extensions
            .get(id)
            .map(|r| r.effects.as_slice())
            .unwrap_or(&[])
    }

    pub fn get(&self, id: EffectId) -> Option<&RegisteredEffect> {
        self.effects.get(id)
    }

    pub fn effect(&self, id: EffectId) -> Option<Arc<dyn Effect>> {
        self.effects.get(id).map(|r| Arc::clone(&r.effect))
    }

    pub fn name(&self, id: EffectId) -> &str {
        self.effects
            .get(id)
            .map(|r| r.effect.name())
            .unwrap_or("<removed>")
    }

    /// Resolve a configured effect name
    pub fn lookup(&self, name: &str) -> Option<EffectId> {
        let name = name.trim();
        if let Some((ext, effect)) = name.split_once(':') {
            let ext_id = self.extension_by_name(ext.trim())?;
            return self
                .extension_effects(ext_id)
                .iter()
                .copied()
                .find(|id| self.name(*id).eq_ignore_ascii_case(effect.trim()));
        }
        self.extensions.values().find_map(|record| {
            record
                .effects
                .iter()
                .copied()
                .find(|id| self.name(*id).eq_ignore_ascii_case(name))
        })
    }

    /// Effects allowed for an event kind, in registration order
    pub fn allowed(&self, kind: EventKind) -> &[EffectId] {
        &self.allowed[kind.index()]
    }

    pub fn is_allowed(&self, kind: EventKind, id: EffectId) -> bool {
        self.allowed[kind.index()].contains(&id)
    }

    pub fn none_id(&self) -> EffectId {
        self.none
    }

    pub fn random_id(&self) -> EffectId {
        self.random
    }

    /// Every declared parameter
    pub fn params(&self) -> &ParamTable {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventSet;
    use crate::options::ParamSpec;

    struct Sparkle;

    impl Effect for Sparkle {
        fn name(&self) -> &'static str {
            "Sparkle"
        }

        fn events(&self) -> EventSet {
            EventSet::EMPTY.with(EventKind::Open).with(EventKind::Close)
        }

        fn params(&self) -> Vec<ParamSpec> {
            vec![ParamSpec::int("sparkle_count", 10, 1, 100)]
        }
    }

    struct Extra(&'static str);

    impl Extension for Extra {
        fn name(&self) -> &str {
            self.0
        }

        fn effects(&self) -> Vec<Arc<dyn Effect>> {
            vec![Arc::new(Sparkle)]
        }
    }

    #[test]
    fn test_builtins_are_registered() {
        let reg = EffectRegistry::new();
        let zoom = reg.lookup("zoom").unwrap();
        assert_eq!(reg.lookup("wisp:Zoom"), Some(zoom));
        assert!(reg.is_allowed(EventKind::Minimize, zoom));
        assert_eq!(reg.allowed(EventKind::Open)[0], reg.none_id());
        assert!(reg.lookup("Bogus").is_none());
        assert!(reg.params().contains_key("zoom_springiness"));
    }

    #[test]
    fn test_register_appends_to_event_lists() {
        let mut reg = EffectRegistry::new();
        let before = reg.allowed(EventKind::Open).len();
        let ext = reg.register_extension(&Extra("fx")).unwrap();
        let sparkle = reg.lookup("fx:sparkle").unwrap();

        assert_eq!(reg.allowed(EventKind::Open).len(), before + 1);
        assert_eq!(*reg.allowed(EventKind::Open).last().unwrap(), sparkle);
        assert!(!reg.is_allowed(EventKind::Minimize, sparkle));
        assert_eq!(reg.extension_effects(ext), &[sparkle]);
    }

    #[test]
    fn test_unregister_removes_effects_and_params() {
        let mut reg = EffectRegistry::new();
        let count = reg.len();
        let ext = reg.register_extension(&Extra("fx")).unwrap();
        let removed = reg.unregister_extension(ext);

        assert_eq!(removed.len(), 1);
        assert_eq!(reg.len(), count);
        assert!(reg.lookup("Sparkle").is_none());
        assert!(!reg.params().contains_key("sparkle_count"));
        // Unknown handle is a no-op
        assert!(reg.unregister_extension(ext).is_empty());
    }

    #[test]
    fn test_duplicate_names_are_refused() {
        let mut reg = EffectRegistry::new();
        reg.register_extension(&Extra("fx")).unwrap();
        assert!(matches!(
            reg.register_extension(&Extra("FX")),
            Err(WispError::Extension(_))
        ));
        // Same parameter from a differently named extension
        assert!(reg.register_extension(&Extra("more")).is_err());
    }
}

//! Builds keybindings from configuration and registers them

use tracing::{info, warn};

use crate::config::{Config, LayerConfig};
use crate::hotkey::{
    describe, HotkeyBackend, HotkeyError, Key, KeyDownReceiver, KeyParseError, ModifierSet,
};
use crate::icons::IconResolver;

use super::keybinding::{BindingKind, Keybinding, LayerIcons};

/// Why a single binding was not registered
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("no modifiers in {0:?}")]
    NoModifiers(String),

    #[error(transparent)]
    Key(#[from] KeyParseError),

    #[error(transparent)]
    Register(#[from] HotkeyError),
}

/// A layer entry that was skipped
#[derive(Debug)]
pub struct SkippedLayer {
    pub index: usize,
    pub name: String,
    pub error: BindingError,
}

/// A global binding that could not be set up; the feature is disabled
#[derive(Debug, thiserror::Error)]
#[error("{kind} binding disabled: {source}")]
pub struct GlobalBindingError {
    pub kind: BindingKind,
    #[source]
    pub source: BindingError,
}

/// Key-down source paired with the action it triggers
#[derive(Debug)]
pub struct Listener {
    pub kind: BindingKind,
    pub keydown: KeyDownReceiver,
}

/// Result of building the registry
#[derive(Debug, Default)]
pub struct Registry {
    /// Registered bindings, layers first in configuration order
    pub bindings: Vec<Keybinding>,
    /// One key-down source per registered binding
    pub listeners: Vec<Listener>,
    /// Layer entries that failed to parse or register
    pub skipped: Vec<SkippedLayer>,
    /// Info/connect bindings that failed to parse or register
    pub global_failures: Vec<GlobalBindingError>,
}

impl Registry {
    /// Number of registered layer bindings
    pub fn layer_count(&self) -> usize {
        self.bindings
            .iter()
            .filter(|b| b.layer_id().is_some())
            .count()
    }
}

/// Turns configuration into registered keybindings
pub struct LayerRegistry<'a, B: HotkeyBackend> {
    backend: &'a B,
    icons: &'a IconResolver,
}

impl<'a, B: HotkeyBackend> LayerRegistry<'a, B> {
    pub fn new(backend: &'a B, icons: &'a IconResolver) -> Self {
        Self { backend, icons }
    }

    /// Build and register every binding the configuration names.
    ///
    /// Failures are collected per binding; the batch always completes.
    pub fn build(&self, config: &Config) -> Registry {
        let mut registry = Registry::default();

        for (index, layer) in config.layers.iter().enumerate() {
            match self.register_layer(index, layer) {
                Ok((binding, listener)) => {
                    registry.bindings.push(binding);
                    registry.listeners.push(listener);
                }
                Err(error) => {
                    warn!(index, name = %layer.name, %error, "skipping layer binding");
                    registry.skipped.push(SkippedLayer {
                        index,
                        name: layer.name.clone(),
                        error,
                    });
                }
            }
        }

        let globals = [
            (BindingKind::Info, "Info", &config.info_mods, &config.info_key),
            (
                BindingKind::ConnectToggle,
                "Connect Toggle",
                &config.connect_mods,
                &config.connect_key,
            ),
        ];

        for (kind, name, mods, key) in globals {
            match self.register(kind, name, mods, key, None) {
                Ok((binding, listener)) => {
                    registry.bindings.push(binding);
                    registry.listeners.push(listener);
                }
                Err(source) => {
                    let failure = GlobalBindingError { kind, source };
                    warn!(error = %failure, "global binding unavailable");
                    registry.global_failures.push(failure);
                }
            }
        }

        info!(
            layers = registry.layer_count(),
            skipped = registry.skipped.len(),
            global_failures = registry.global_failures.len(),
            "keybindings registered"
        );

        registry
    }

    fn register_layer(
        &self,
        index: usize,
        layer: &LayerConfig,
    ) -> Result<(Keybinding, Listener), BindingError> {
        let light = self.icons.resolve(&layer.icon);
        let dark = match &layer.dark_icon {
            Some(token) => self.icons.resolve(token),
            None => light.clone(),
        };

        self.register(
            BindingKind::Layer(index),
            &layer.name,
            &layer.mods,
            &layer.key,
            Some(LayerIcons { light, dark }),
        )
    }

    fn register(
        &self,
        kind: BindingKind,
        name: &str,
        mods: &str,
        key: &str,
        icons: Option<LayerIcons>,
    ) -> Result<(Keybinding, Listener), BindingError> {
        let modifiers = ModifierSet::parse(mods);
        if modifiers.is_empty() {
            return Err(BindingError::NoModifiers(mods.to_string()));
        }
        let key = Key::parse(key)?;

        let registration = self.backend.register(modifiers, key)?;
        info!(%kind, name, combo = %describe(modifiers, key), "binding registered");

        let binding = Keybinding::new(kind, name, modifiers, key, icons, registration.handle);
        let listener = Listener {
            kind,
            keydown: registration.keydown,
        };
        Ok((binding, listener))
    }
}

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::{Result, WireError};
use crate::message::{Message, MessageType, Tag};

/// Builds a blank message for a registered tag.
pub type Factory = Box<dyn Fn() -> Box<dyn Message> + Send + Sync>;

/// One registered message type.
pub struct RegistryEntry {
    tag: Tag,
    name: String,
    version: u32,
    factory: Factory,
}

impl RegistryEntry {
    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Build a blank instance of this type.
    pub fn instantiate(&self) -> Box<dyn Message> {
        (self.factory)()
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("tag", &self.tag)
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Tag-keyed table of message factories.
///
/// Types are registered once while the endpoint is being set up, after which
/// the registry is shared (usually as `Arc<TypeRegistry>`) by every transport
/// of the endpoint. The set of accepted tags can still be narrowed or widened
/// at runtime through [`enable`](Self::enable) and [`disable`](Self::disable).
pub struct TypeRegistry {
    entries: HashMap<Tag, RegistryEntry>,
    enabled: [AtomicU64; 4],
    config: RegistryConfig,
}

impl TypeRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entries: HashMap::new(),
            enabled: Default::default(),
            config,
        }
    }

    /// Register a factory under `tag`.
    ///
    /// Fails if the tag is taken, or if the factory builds a message that
    /// reports a different tag than the one it is registered under.
    pub fn register<F>(
        &mut self,
        tag: Tag,
        name: impl Into<String>,
        version: u32,
        factory: F,
    ) -> Result<()>
    where
        F: Fn() -> Box<dyn Message> + Send + Sync + 'static,
    {
        if let Some(existing) = self.entries.get(&tag) {
            return Err(WireError::DuplicateTag {
                tag,
                existing: existing.name.clone(),
            });
        }

        let reported = factory().tag();
        if reported != tag {
            return Err(WireError::TagMismatch {
                registered: tag,
                reported,
            });
        }

        let name = name.into();
        debug!(tag, name = %name, version, "message type registered");
        self.entries.insert(
            tag,
            RegistryEntry {
                tag,
                name,
                version,
                factory: Box::new(factory),
            },
        );
        if self.config.enable_on_register {
            self.set_enabled(tag, true);
        }
        Ok(())
    }

    /// Register `T` under its own tag, built from `T::default()`.
    pub fn register_type<T: MessageType>(
        &mut self,
        name: impl Into<String>,
        version: u32,
    ) -> Result<()> {
        self.register(T::TAG, name, version, || Box::new(T::default()))
    }

    /// Whether frames carrying `tag` are accepted. Unregistered tags never are.
    pub fn is_enabled(&self, tag: Tag) -> bool {
        let (word, bit) = slot(tag);
        self.enabled[word].load(Ordering::Acquire) & bit != 0 && self.entries.contains_key(&tag)
    }

    /// Start accepting `tag`. Returns false if the tag is not registered.
    pub fn enable(&self, tag: Tag) -> bool {
        if !self.entries.contains_key(&tag) {
            return false;
        }
        self.set_enabled(tag, true);
        true
    }

    /// Stop accepting `tag`. Returns false if the tag is not registered.
    pub fn disable(&self, tag: Tag) -> bool {
        if !self.entries.contains_key(&tag) {
            return false;
        }
        self.set_enabled(tag, false);
        true
    }

    /// Build a blank message for `tag`, or `None` if the tag is unregistered
    /// or disabled.
    pub fn instantiate(&self, tag: Tag) -> Option<Box<dyn Message>> {
        if !self.is_enabled(tag) {
            return None;
        }
        self.entries.get(&tag).map(RegistryEntry::instantiate)
    }

    pub fn get(&self, tag: Tag) -> Option<&RegistryEntry> {
        self.entries.get(&tag)
    }

    pub fn name_of(&self, tag: Tag) -> Option<&str> {
        self.entries.get(&tag).map(RegistryEntry::name)
    }

    /// All entries, sorted by tag.
    pub fn entries(&self) -> Vec<&RegistryEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.tag);
        entries
    }

    /// Enabled tags in ascending order.
    pub fn enabled_tags(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .entries
            .keys()
            .copied()
            .filter(|tag| self.is_enabled(*tag))
            .collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn set_enabled(&self, tag: Tag, enabled: bool) {
        let (word, bit) = slot(tag);
        if enabled {
            self.enabled[word].fetch_or(bit, Ordering::AcqRel);
        } else {
            self.enabled[word].fetch_and(!bit, Ordering::AcqRel);
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("entries", &self.entries())
            .field("enabled", &self.enabled_tags())
            .finish()
    }
}

fn slot(tag: Tag) -> (usize, u64) {
    (usize::from(tag >> 6), 1u64 << (tag & 0x3F))
}

/// Cached channel names, in the controller's enumeration order.
///
/// Empty until first populated. Never invalidated implicitly; the driver
/// replaces the contents only on an explicit refresh.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    names: Option<Vec<String>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether names have been fetched.
    pub fn is_populated(&self) -> bool {
        self.names.is_some()
    }

    /// The cached names, or `None` before the first fetch.
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    /// Replace the cache.
    pub fn store(&mut self, names: Vec<String>) {
        self.names = Some(names);
    }

    /// Drop the cache so the next lookup fetches again.
    pub fn clear(&mut self) {
        self.names = None;
    }

    /// Exact-match membership. Always false before the first fetch.
    pub fn contains(&self, name: &str) -> bool {
        self.names
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n == name))
    }
}

/// Parse a `getOutputNames?` reply.
///
/// An empty reply means the controller has no output channels.
pub fn parse_channel_names(reply: &str) -> Vec<String> {
    if reply.trim().is_empty() {
        return Vec::new();
    }
    reply.split(',').map(|name| name.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_each_name() {
        assert_eq!(
            parse_channel_names("3A, 3B,Out1 , Out 2"),
            vec!["3A", "3B", "Out1", "Out 2"]
        );
    }

    #[test]
    fn parse_empty_reply() {
        assert!(parse_channel_names("").is_empty());
        assert!(parse_channel_names("   ").is_empty());
    }

    #[test]
    fn contains_requires_population() {
        let mut registry = ChannelRegistry::new();
        assert!(!registry.is_populated());
        assert!(!registry.contains("3A"));

        registry.store(parse_channel_names("3A, Out1"));
        assert!(registry.contains("3A"));
        assert!(registry.contains("Out1"));
        assert!(!registry.contains("out1"));
        assert!(!registry.contains(" 3A"));

        registry.clear();
        assert!(registry.names().is_none());
    }
}

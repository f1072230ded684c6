use std::{fmt, sync::Arc};

/// A key/value pair that is written into each log line that is issued with its context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    key: String,
    value: String,
}
impl KeyValue {
    /// Renders the value with its `Display` implementation.
    pub fn new<K: Into<String>, V: fmt::Display>(key: K, value: V) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }

    /// The key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The rendered value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Carries an optional tag and an ordered list of key/value pairs
/// that belong to a logical request scope.
///
/// A `LogContext` is immutable; the `with_*` methods return a new context and leave
/// the original untouched, so a context can be handed down to sub-tasks and threads
/// without any synchronization.
///
/// ```rust
/// use kvlog::LogContext;
///
/// let ctx = LogContext::new().with_tag("billing").with_kv("order", 4711);
/// kvlog::info!(&ctx, "order accepted");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogContext {
    tag: Option<Arc<str>>,
    kvs: Option<Arc<[KeyValue]>>,
}

impl LogContext {
    /// A context without tag and key/value pairs.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tag: None,
            kvs: None,
        }
    }

    /// Returns a copy of this context with the given tag, replacing a previous tag.
    #[must_use]
    pub fn with_tag<S: AsRef<str>>(&self, tag: S) -> Self {
        Self {
            tag: Some(Arc::from(tag.as_ref())),
            kvs: self.kvs.clone(),
        }
    }

    /// Returns a copy of this context with one more key/value pair.
    #[must_use]
    pub fn with_kv<K: Into<String>, V: fmt::Display>(&self, key: K, value: V) -> Self {
        self.with_kvs(std::iter::once(KeyValue::new(key, value)))
    }

    /// Returns a copy of this context with the given pairs appended after the existing ones.
    #[must_use]
    pub fn with_kvs<I: IntoIterator<Item = KeyValue>>(&self, kvs: I) -> Self {
        let mut kvs = kvs.into_iter().peekable();
        if kvs.peek().is_none() {
            return self.clone();
        }
        let merged: Vec<KeyValue> = self.kvs().iter().cloned().chain(kvs).collect();
        Self {
            tag: self.tag.clone(),
            kvs: Some(Arc::from(merged)),
        }
    }

    /// The tag, if one was set.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The key/value pairs, in the order in which they were added.
    #[must_use]
    pub fn kvs(&self) -> &[KeyValue] {
        self.kvs.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod test {
    use super::{KeyValue, LogContext};

    #[test]
    fn empty_context() {
        let ctx = LogContext::new();
        assert_eq!(ctx.tag(), None);
        assert!(ctx.kvs().is_empty());
        assert_eq!(ctx, LogContext::default());
    }

    #[test]
    fn kvs_are_appended_in_order() {
        let parent = LogContext::new().with_kv("key1", 123);
        let child = parent.with_kvs(vec![
            KeyValue::new("key2", "value2"),
            KeyValue::new("key3", 4.5),
        ]);

        assert_eq!(parent.kvs().len(), 1);
        let rendered: Vec<(&str, &str)> =
            child.kvs().iter().map(|kv| (kv.key(), kv.value())).collect();
        assert_eq!(
            rendered,
            vec![("key1", "123"), ("key2", "value2"), ("key3", "4.5")]
        );
    }

    #[test]
    fn adding_nothing_keeps_the_context() {
        let ctx = LogContext::new().with_tag("t").with_kv("a", 1);
        assert_eq!(ctx.with_kvs(Vec::new()), ctx);
    }

    #[test]
    fn tag_is_replaced_and_kvs_survive() {
        let ctx = LogContext::new()
            .with_tag("first")
            .with_kv("a", 1)
            .with_tag("second");
        assert_eq!(ctx.tag(), Some("second"));
        assert_eq!(ctx.kvs()[0].value(), "1");
    }
}

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Typed, string-keyed storage scoped to one exchange.
///
/// Interceptors use it to hand values to the handler (or to interceptors that
/// run after them) without knowing the concrete handler type. A value is found
/// only when both the key and the requested type match what was stored.
pub struct Attachments {
    attachments: HashMap<AttachmentKey, Box<dyn Any + Send + Sync>, fnv::FnvBuildHasher>,
}

impl Default for Attachments {
    fn default() -> Self {
        Self::new()
    }
}

impl Attachments {
    pub fn new() -> Self {
        Self {
            attachments: HashMap::with_hasher(fnv::FnvBuildHasher::default()),
        }
    }

    /// Stores `value` under `key`, replacing any previous value of the same type.
    pub fn add<K>(&mut self, key: impl AsRef<str>, value: K)
    where
        K: Send + Sync + 'static,
    {
        let type_id = TypeId::of::<K>();
        self.attachments
            .insert(AttachmentKey::new(key, type_id), Box::new(value));
    }

    pub fn get<K>(&self, key: impl AsRef<str>) -> Option<&K>
    where
        K: Send + 'static,
    {
        let type_id = TypeId::of::<K>();
        self.attachments
            .get(&AttachmentKey::new(key, type_id))
            .and_then(|value| value.downcast_ref::<K>())
    }

    pub fn get_mut<K>(&mut self, key: impl AsRef<str>) -> Option<&mut K>
    where
        K: Send + 'static,
    {
        let type_id = TypeId::of::<K>();
        self.attachments
            .get_mut(&AttachmentKey::new(key, type_id))
            .and_then(|value| value.downcast_mut::<K>())
    }

    pub fn remove<K>(&mut self, key: impl AsRef<str>) -> Option<K>
    where
        K: Send + 'static,
    {
        let type_id = TypeId::of::<K>();
        let boxed = self.attachments.remove(&AttachmentKey::new(key, type_id))?;
        boxed.downcast::<K>().ok().map(|value| *value)
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}

/// A value slot is addressed by the exact key text and the stored type.
#[derive(PartialEq, Eq, Hash)]
struct AttachmentKey {
    key: String,
    type_id: TypeId,
}

impl AttachmentKey {
    fn new(key: impl AsRef<str>, type_id: TypeId) -> Self {
        Self {
            key: key.as_ref().to_string(),
            type_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Attachments;

    struct TestStruct;

    #[test]
    fn test_attachments() {
        let mut attachments = Attachments::new();
        attachments.add::<u64>("test_key1", 1);
        attachments.add::<String>("test_key2", String::from("test"));
        attachments.add::<bool>("test_key3", true);
        attachments.add::<TestStruct>("test_key4", TestStruct);

        assert_eq!(attachments.get::<u64>("test_key1"), Some(&1));
        assert_eq!(
            attachments.get::<String>("test_key2").map(String::as_str),
            Some("test")
        );
        assert_eq!(attachments.get::<bool>("test_key3"), Some(&true));
        assert!(attachments.get::<TestStruct>("test_key4").is_some());
        assert_eq!(attachments.len(), 4);
    }

    #[test]
    fn test_distinct_keys_never_share_a_slot() {
        let mut attachments = Attachments::new();
        for i in 0..1000u32 {
            attachments.add::<u32>(format!("key-{i}"), i);
        }
        assert_eq!(attachments.len(), 1000);
        for i in 0..1000u32 {
            assert_eq!(attachments.get::<u32>(format!("key-{i}")), Some(&i));
        }
    }

    #[test]
    fn test_type_must_match_key() {
        let mut attachments = Attachments::new();
        attachments.add::<u32>("amount", 3);
        assert!(attachments.get::<u64>("amount").is_none());
        assert!(attachments.get::<u32>("other").is_none());
    }

    #[test]
    fn test_get_mut_and_remove() {
        let mut attachments = Attachments::new();
        attachments.add::<Vec<&'static str>>("trail", vec!["a"]);
        if let Some(trail) = attachments.get_mut::<Vec<&'static str>>("trail") {
            trail.push("b");
        }
        let trail = attachments.remove::<Vec<&'static str>>("trail");
        assert_eq!(trail, Some(vec!["a", "b"]));
        assert!(attachments.is_empty());
    }
}

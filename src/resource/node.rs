//! Resource nodes
//!
//! A [`Node`] is a shared handle to one gateway object. It knows its owner
//! through a weak back-reference, derives its endpoints from the owner's
//! detail endpoint, and keeps a cache of the child nodes it has seen.

use super::registry::Descriptor;
use crate::error::{Error, Result};
use crate::gateway::client::Context;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

/// A gateway resource record: one typed slot per persisted field
pub trait Entity:
    Serialize + DeserializeOwned + Clone + Default + PartialEq + Eq + fmt::Debug + Send + Sync + 'static
{
    const DESCRIPTOR: &'static Descriptor;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: Option<String>);

    /// Placeholder record carrying only an id
    fn with_id(id: impl Into<String>) -> Self {
        let mut record = Self::default();
        record.set_id(Some(id.into()));
        record
    }

    /// Build a record from a gateway object, ignoring unknown fields
    fn from_response(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Request body: every persisted field, nulls included
    fn to_body(&self) -> Result<Value> {
        let mut all = self.to_map()?;
        let body: Map<String, Value> = Self::DESCRIPTOR
            .fields
            .iter()
            .map(|field| {
                let value = all.remove(*field).unwrap_or(Value::Null);
                (field.to_string(), value)
            })
            .collect();
        Ok(Value::Object(body))
    }

    /// Overwrite persisted fields present in a gateway response
    ///
    /// Fields missing from the response, and extra fields, keep their value.
    fn merge(&mut self, response: &Value) -> Result<()> {
        let Value::Object(response) = response else {
            return Ok(());
        };

        let mut current = self.to_map()?;
        let mut changed = false;
        for field in Self::DESCRIPTOR.fields {
            if let Some(value) = response.get(*field) {
                current.insert(field.to_string(), value.clone());
                changed = true;
            }
        }

        if changed {
            *self = serde_json::from_value(Value::Object(current))?;
        }
        Ok(())
    }

    /// Debug representation that [`Entity::from_repr`] parses back
    fn to_repr(&self) -> Result<String> {
        Ok(format!(
            "{} {}",
            Self::DESCRIPTOR.type_name,
            serde_json::to_string(self)?
        ))
    }

    fn from_repr(repr: &str) -> Result<Self> {
        let json = repr
            .strip_prefix(Self::DESCRIPTOR.type_name)
            .and_then(|rest| rest.strip_prefix(' '))
            .ok_or_else(|| {
                <serde_json::Error as serde::de::Error>::custom(format!(
                    "expected a {} representation",
                    Self::DESCRIPTOR.type_name
                ))
            })?;
        Ok(serde_json::from_str(json)?)
    }

    /// Identity string: the id when saved, otherwise every persisted field sorted by name
    fn fingerprint(&self) -> String {
        let type_name = Self::DESCRIPTOR.type_name.to_lowercase();

        if let Some(id) = self.id().filter(|id| !id.is_empty()) {
            return format!("{}:{}", type_name, id);
        }

        let values = self.to_map().unwrap_or_default();
        let mut fields: Vec<&str> = Self::DESCRIPTOR.fields.to_vec();
        fields.sort_unstable();

        let mut parts = vec![type_name];
        for field in fields {
            parts.push(field.to_string());
            parts.push(values.get(field).unwrap_or(&Value::Null).to_string());
        }
        parts.join(":")
    }

    #[doc(hidden)]
    fn to_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "{} serialized to {}, expected an object",
                Self::DESCRIPTOR.type_name,
                other
            ))
            .into()),
        }
    }
}

/// Anything a resource can be owned by
pub(crate) trait ParentNode: Send + Sync {
    fn detail_endpoint(&self) -> Result<String>;

    fn children(&self) -> &ChildCache;
}

/// Locally known children of one owner, keyed by child endpoint
///
/// The cache is advisory: the gateway decides what actually exists.
#[derive(Default)]
pub struct ChildCache {
    entries: RwLock<HashMap<&'static str, Vec<Arc<dyn Any + Send + Sync>>>>,
}

impl ChildCache {
    /// Remember a child and return the cached handle for it
    ///
    /// A cached entry with the same id, or with equal fields, wins over the
    /// new handle; otherwise the new handle is stored.
    pub(crate) fn insert<C: Entity>(&self, node: &Node<C>) -> Node<C> {
        let mut entries = self.entries.write();
        let bucket = entries.entry(C::DESCRIPTOR.endpoint).or_default();

        let known = bucket.iter().find_map(|entry| {
            let existing = entry.clone().downcast::<NodeInner<C>>().ok()?;
            let matched = Arc::ptr_eq(&existing, &node.inner) || {
                let cached = existing.fields.read();
                let fresh = node.inner.fields.read();
                same_id(cached.id(), fresh.id()) || *cached == *fresh
            };
            matched.then_some(existing)
        });

        match known {
            Some(inner) => Node { inner },
            None => {
                bucket.push(node.inner.clone());
                node.clone()
            }
        }
    }

    /// Forget one specific handle
    pub(crate) fn evict<C: Entity>(&self, node: &Node<C>) -> bool {
        let mut entries = self.entries.write();
        let Some(bucket) = entries.get_mut(C::DESCRIPTOR.endpoint) else {
            return false;
        };

        let before = bucket.len();
        bucket.retain(|entry| {
            !entry
                .downcast_ref::<NodeInner<C>>()
                .is_some_and(|existing| std::ptr::eq(existing, Arc::as_ptr(&node.inner)))
        });
        bucket.len() != before
    }

    /// Cached nodes of one child type, in insertion order
    pub(crate) fn nodes<C: Entity>(&self) -> Vec<Node<C>> {
        self.entries
            .read()
            .get(C::DESCRIPTOR.endpoint)
            .map(|bucket| {
                bucket
                    .iter()
                    .filter_map(|entry| entry.clone().downcast::<NodeInner<C>>().ok())
                    .map(|inner| Node { inner })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of cached children under an endpoint
    pub fn len(&self, endpoint: &str) -> usize {
        self.entries.read().get(endpoint).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().values().all(Vec::is_empty)
    }
}

fn same_id(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if !a.is_empty() && a == b)
}

pub(crate) struct NodeInner<T: Entity> {
    pub(crate) context: Context,
    parent: RwLock<Weak<dyn ParentNode>>,
    fields: RwLock<T>,
    pub(crate) children: ChildCache,
}

impl<T: Entity> ParentNode for NodeInner<T> {
    fn detail_endpoint(&self) -> Result<String> {
        let id = self
            .fields
            .read()
            .id()
            .filter(|id| !id.is_empty())
            .map(|id| urlencoding::encode(id).into_owned())
            .ok_or(Error::UnsavedResource {
                type_name: T::DESCRIPTOR.type_name,
            })?;
        Ok(format!("{}/{}", self.list_endpoint()?, id))
    }

    fn children(&self) -> &ChildCache {
        &self.children
    }
}

impl<T: Entity> NodeInner<T> {
    fn list_endpoint(&self) -> Result<String> {
        let parent = self.parent.read().upgrade().ok_or(Error::ParentDropped {
            type_name: T::DESCRIPTOR.type_name,
        })?;
        Ok(format!("{}/{}", parent.detail_endpoint()?, T::DESCRIPTOR.endpoint))
    }
}

/// Shared handle to one gateway resource
///
/// Clones point at the same resource. Equality and hashing follow the field
/// values, not the handle.
pub struct Node<T: Entity> {
    pub(crate) inner: Arc<NodeInner<T>>,
}

impl<T: Entity> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Entity> Node<T> {
    pub(crate) fn attach(context: Context, parent: Weak<dyn ParentNode>, fields: T) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                context,
                parent: RwLock::new(parent),
                fields: RwLock::new(fields),
                children: ChildCache::default(),
            }),
        }
    }

    pub(crate) fn as_parent(&self) -> Weak<dyn ParentNode> {
        let inner: Arc<dyn ParentNode> = self.inner.clone();
        Arc::downgrade(&inner)
    }

    pub(crate) fn parent(&self) -> Option<Arc<dyn ParentNode>> {
        self.inner.parent.read().upgrade()
    }

    pub(crate) fn set_parent(&self, parent: Weak<dyn ParentNode>) {
        *self.inner.parent.write() = parent;
    }

    /// True when both handles point at the same resource object
    pub(crate) fn same_handle(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn descriptor(&self) -> &'static Descriptor {
        T::DESCRIPTOR
    }

    /// Snapshot of the current field values
    pub fn fields(&self) -> T {
        self.inner.fields.read().clone()
    }

    /// Read fields without cloning them
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.fields.read())
    }

    /// Change fields locally; call [`Node::save`] to persist
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.fields.write())
    }

    pub fn set_fields(&self, fields: T) {
        *self.inner.fields.write() = fields;
    }

    pub fn id(&self) -> Option<String> {
        self.read(|f| f.id().map(str::to_string))
    }

    /// True once the gateway has assigned an id
    pub fn is_saved(&self) -> bool {
        self.read(|f| f.id().is_some_and(|id| !id.is_empty()))
    }

    /// Collection URL of this resource under its owner
    pub fn list_endpoint(&self) -> Result<String> {
        self.inner.list_endpoint()
    }

    /// URL of this resource; requires an id
    pub fn detail_endpoint(&self) -> Result<String> {
        self.inner.detail_endpoint()
    }

    pub(crate) fn transport(&self) -> &crate::gateway::http::HttpTransport {
        &self.inner.context.transport
    }

    /// Create or update this resource on the gateway
    ///
    /// Unsaved resources (or `force_create`) are POSTed, saved ones are
    /// PATCHed. Both go to the list endpoint; the id travels in the body.
    pub async fn save(&self, force_create: bool) -> Result<()> {
        let (body, saved) = self.read(|f| (f.to_body(), f.id().is_some_and(|id| !id.is_empty())));
        let body = body?;
        let url = self.list_endpoint()?;

        let response = if !saved || force_create {
            self.transport().post(&url, Some(&body)).await
        } else {
            self.transport().patch(&url, &body).await
        }
        .map_err(Error::into_validation)?;

        self.update(|f| f.merge(&response))?;
        tracing::info!(
            "saved {} {}",
            T::DESCRIPTOR.type_name,
            self.id().unwrap_or_default()
        );
        Ok(())
    }

    /// Refresh local fields from the gateway
    pub async fn pull(&self) -> Result<()> {
        let url = self.detail_endpoint()?;
        let response = self.transport().get(&url).await?;
        self.update(|f| f.merge(&response))
    }

    /// Delete this resource on the gateway
    ///
    /// On success the id is cleared and the handle leaves its owner's cache;
    /// the other fields are kept so the resource can be saved again.
    pub async fn delete(&self) -> Result<()> {
        let url = self.detail_endpoint()?;
        self.transport()
            .delete(&url)
            .await
            .map_err(Error::into_deletion)?;

        let id = self.update(|f| {
            let id = f.id().map(str::to_string);
            f.set_id(None);
            id
        });
        if let Some(parent) = self.parent() {
            parent.children().evict(self);
        }

        tracing::info!(
            "deleted {} {}",
            T::DESCRIPTOR.type_name,
            id.unwrap_or_default()
        );
        Ok(())
    }
}

impl<T: Entity> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || *self.inner.fields.read() == *other.inner.fields.read()
    }
}

impl<T: Entity> Eq for Node<T> {}

impl<T: Entity> Hash for Node<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.read(|f| f.fingerprint()).hash(state);
    }
}

impl<T: Entity> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = self.read(|fields| fields.to_repr()).map_err(|_| fmt::Error)?;
        f.write_str(&repr)
    }
}

impl<T: Entity> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("fields", &*self.inner.fields.read())
            .finish()
    }
}

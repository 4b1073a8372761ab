//! Child resource accessors
//!
//! A parent/child relation is declared once, as `impl ChildOf<Parent> for
//! Child`. The generic `list_children`, `add_child`, `get_child` and
//! `cached_children` operations follow from it, and [`child_accessors!`]
//! stamps out the named per-pair methods (`list_services`, `add_route`, ...).

use super::fetcher;
use super::node::{ChildCache, Entity, Node, ParentNode};
use crate::error::Result;
use crate::gateway::client::{Context, Gateway};
use futures::stream::{BoxStream, StreamExt};
use serde_json::Value;
use std::sync::{Arc, Weak};

/// Stream of resources produced by a list endpoint
pub type NodeStream<T> = BoxStream<'static, Result<Node<T>>>;

/// Declares that `Self` resources live under `P` (a resource type, or [`Gateway`])
pub trait ChildOf<P>: Entity {}

/// Something that owns child resources
pub(crate) trait Owner: Sync {
    fn context(&self) -> &Context;

    fn as_parent(&self) -> Weak<dyn ParentNode>;

    fn owner_endpoint(&self) -> Result<String>;

    fn child_cache(&self) -> &ChildCache;
}

impl Owner for Gateway {
    fn context(&self) -> &Context {
        &self.inner.context
    }

    fn as_parent(&self) -> Weak<dyn ParentNode> {
        let inner: Arc<dyn ParentNode> = self.inner.clone();
        Arc::downgrade(&inner)
    }

    fn owner_endpoint(&self) -> Result<String> {
        Ok(self.detail_endpoint())
    }

    fn child_cache(&self) -> &ChildCache {
        &self.inner.children
    }
}

impl<P: Entity> Owner for Node<P> {
    fn context(&self) -> &Context {
        &self.inner.context
    }

    fn as_parent(&self) -> Weak<dyn ParentNode> {
        Node::as_parent(self)
    }

    fn owner_endpoint(&self) -> Result<String> {
        self.detail_endpoint()
    }

    fn child_cache(&self) -> &ChildCache {
        &self.inner.children
    }
}

/// Cache `node` and return the handle the cache keeps for it
///
/// When an entry for the same resource is already cached, that handle takes
/// over the fresh field values.
pub(crate) fn register<C: Entity>(cache: &ChildCache, node: Node<C>) -> Node<C> {
    let canonical = cache.insert(&node);
    if !canonical.same_handle(&node) {
        canonical.set_fields(node.fields());
    }
    canonical
}

/// Build a node owned by `owner` from a gateway object and cache it
pub(crate) fn adopt<O: Owner, C: Entity>(owner: &O, value: Value) -> Result<Node<C>> {
    let node = Node::attach(owner.context().clone(), owner.as_parent(), C::from_response(value)?);
    Ok(register(owner.child_cache(), node))
}

/// Turn a stream of gateway objects into owned, cached nodes
pub(crate) fn adopt_all<O: Owner, C: Entity>(
    owner: &O,
    raw: BoxStream<'static, Result<Value>>,
) -> NodeStream<C> {
    let context = owner.context().clone();
    let parent = owner.as_parent();

    raw.map(move |item| -> Result<Node<C>> {
        let node = Node::attach(context.clone(), parent.clone(), C::from_response(item?)?);
        Ok(match parent.upgrade() {
            Some(owner) => register(owner.children(), node),
            None => node,
        })
    })
    .boxed()
}

/// Paginate a path below the owner's detail endpoint into child nodes
pub(crate) fn list_under<O: Owner, C: Entity>(owner: &O, path: &str) -> Result<NodeStream<C>> {
    let url = format!("{}/{}", owner.owner_endpoint()?, path);
    let context = owner.context();
    let raw = fetcher::paginate(context.transport.clone(), context.base_url(), url);
    Ok(adopt_all(owner, raw))
}

fn list<O: Owner, C: Entity>(owner: &O) -> Result<NodeStream<C>> {
    list_under(owner, C::DESCRIPTOR.endpoint)
}

fn add<O: Owner, C: Entity>(owner: &O, fields: C) -> Node<C> {
    let node = Node::attach(owner.context().clone(), owner.as_parent(), fields);
    owner.child_cache().insert(&node)
}

async fn get<O: Owner, C: Entity>(owner: &O, id: &str) -> Result<Node<C>> {
    let node = Node::attach(owner.context().clone(), owner.as_parent(), C::with_id(id));
    node.pull().await?;
    Ok(register(owner.child_cache(), node))
}

macro_rules! generic_accessors {
    ($owner:ty, $kind:ty $(, $generic:ident)?) => {
        impl$(<$generic: Entity>)? $owner {
            /// Stream every child of type `C` from the gateway
            ///
            /// Each call starts over with fresh requests.
            pub fn list_children<C: ChildOf<$kind>>(&self) -> Result<NodeStream<C>> {
                list(self)
            }

            /// New unsaved child; nothing is sent until [`Node::save`]
            ///
            /// If the owner already caches this resource (same id or equal
            /// fields) the cached handle is returned unchanged.
            pub fn add_child<C: ChildOf<$kind>>(&self, fields: C) -> Node<C> {
                add(self, fields)
            }

            /// Fetch one child by id
            pub async fn get_child<C: ChildOf<$kind>>(&self, id: &str) -> Result<Node<C>> {
                get(self, id).await
            }

            /// Children of type `C` seen so far; not authoritative
            pub fn cached_children<C: ChildOf<$kind>>(&self) -> Vec<Node<C>> {
                Owner::child_cache(self).nodes()
            }
        }
    };
}

generic_accessors!(Gateway, Gateway);
generic_accessors!(Node<P>, P, P);

/// Declare parent/child relations and their named accessors
///
/// ```ignore
/// child_accessors!(Node<Service>, Service {
///     Route => list_routes, add_route, get_route;
/// });
/// ```
macro_rules! child_accessors {
    ($owner:ty, $kind:ty { $( $child:ty => $list:ident, $add:ident, $get:ident; )+ }) => {
        $(
            impl $crate::resource::children::ChildOf<$kind> for $child {}
        )+

        impl $owner {
            $(
                #[doc = concat!("Stream every `", stringify!($child), "` from the gateway")]
                pub fn $list(&self) -> $crate::error::Result<$crate::resource::children::NodeStream<$child>> {
                    self.list_children::<$child>()
                }

                #[doc = concat!("New unsaved `", stringify!($child), "`, cached locally")]
                pub fn $add(&self, fields: $child) -> $crate::resource::node::Node<$child> {
                    self.add_child(fields)
                }

                #[doc = concat!("Fetch one `", stringify!($child), "` by id")]
                pub async fn $get(&self, id: &str) -> $crate::error::Result<$crate::resource::node::Node<$child>> {
                    self.get_child::<$child>(id).await
                }
            )+
        }
    };
}

pub(crate) use child_accessors;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::resource::types::{Route, Service};

    #[test]
    fn test_add_returns_cached_handle_for_equal_fields() {
        let kong = Gateway::new("http", "localhost", 8001).unwrap();
        let first = kong.add_service(Service::default());
        let second = kong.add_service(Service::default());

        assert!(first.same_handle(&second));
        assert_eq!(kong.cached_children::<Service>().len(), 1);
    }

    #[test]
    fn test_child_of_repeated_add_outlives_the_handle() {
        let kong = Gateway::new("http", "localhost", 8001).unwrap();
        let _first = kong.add_service(Service::with_id("s1"));
        let route = kong
            .add_service(Service::with_id("s1"))
            .add_route(Route::default());

        assert_eq!(
            route.list_endpoint().unwrap(),
            "http://localhost:8001/services/s1/routes"
        );
    }

    #[test]
    fn test_add_matches_by_id() {
        let kong = Gateway::new("http", "localhost", 8001).unwrap();
        let cached = kong.add_service(Service {
            id: Some("s1".to_string()),
            host: Some("example.com".to_string()),
            ..Default::default()
        });
        let again = kong.add_service(Service::with_id("s1"));

        assert!(cached.same_handle(&again));
        assert_eq!(again.read(|s| s.host.clone()).as_deref(), Some("example.com"));
    }

    #[test]
    fn test_unsaved_parent_is_not_a_dropped_parent() {
        let kong = Gateway::new("http", "localhost", 8001).unwrap();
        let route = kong.add_service(Service::default()).add_route(Route::default());

        assert!(matches!(
            route.list_endpoint(),
            Err(Error::UnsavedResource { type_name: "Service" })
        ));
    }
}

//! Per-type operations beyond create/read/update/delete

use super::children::{self, NodeStream, Owner};
use super::node::{Entity, Node, ParentNode};
use super::types::{Route, Service, Target, Upstream};
use crate::error::{Error, Result};
use crate::gateway::url;
use serde_json::Value;

impl Service {
    /// Build a service from a single upstream address
    pub fn from_url(address: &str) -> Result<Self> {
        let mut service = Self::default();
        service.set_url(address)?;
        Ok(service)
    }

    /// Upstream address composed from protocol, host, port and path
    pub fn url(&self) -> Result<String> {
        let protocol = self
            .protocol
            .as_deref()
            .ok_or_else(|| Error::InvalidUrl("service has no protocol".to_string()))?;
        let host = self
            .host
            .as_deref()
            .ok_or_else(|| Error::InvalidUrl("service has no host".to_string()))?;

        url::compose(protocol, host, self.port, self.path.as_deref().unwrap_or(""))
    }

    /// Replace protocol, host, port and path with the parts of an address
    pub fn set_url(&mut self, address: &str) -> Result<()> {
        let parts = url::decompose(address)?;
        self.protocol = Some(parts.scheme);
        self.host = Some(parts.host);
        self.port = parts.port;
        self.path = Some(parts.path);
        Ok(())
    }
}

impl Node<Service> {
    pub fn url(&self) -> Result<String> {
        self.read(Service::url)
    }

    pub fn set_url(&self, address: &str) -> Result<()> {
        self.update(|service| service.set_url(address))
    }
}

impl Node<Target> {
    /// Mark this target healthy, overriding the active health checker
    pub async fn set_healthy(&self) -> Result<()> {
        self.post_health("healthy").await
    }

    /// Mark this target unhealthy, overriding the active health checker
    pub async fn set_unhealthy(&self) -> Result<()> {
        self.post_health("unhealthy").await
    }

    async fn post_health(&self, status: &str) -> Result<()> {
        let url = format!("{}/{}", self.detail_endpoint()?, status);
        self.transport().post(&url, None).await?;
        tracing::info!("target {} set {}", self.id().unwrap_or_default(), status);
        Ok(())
    }

    pub fn health(&self) -> Option<String> {
        self.read(|target| target.health.clone())
    }
}

impl Node<Upstream> {
    /// Stream targets together with their health status
    pub fn health(&self) -> Result<NodeStream<Target>> {
        children::list_under(self, "health")
    }

    /// Stream every target, including ones superseded by later entries
    pub fn list_all_targets(&self) -> Result<NodeStream<Target>> {
        children::list_under(self, &format!("{}/all", Target::DESCRIPTOR.endpoint))
    }
}

impl Node<Route> {
    /// Fetch the service this route belongs to and make it the route's parent
    ///
    /// The service is cached under the gateway. If the gateway already knows
    /// it, that handle is refreshed and returned, so the route's parent stays
    /// alive after the caller drops the result.
    pub async fn get_service(&self) -> Result<Node<Service>> {
        let id = self.id().filter(|id| !id.is_empty()).ok_or(Error::UnsavedResource {
            type_name: Route::DESCRIPTOR.type_name,
        })?;
        let gateway = self.context().gateway().ok_or(Error::ParentDropped {
            type_name: Route::DESCRIPTOR.type_name,
        })?;

        let url = format!(
            "{}/{}/{}/service",
            gateway.base_url(),
            Route::DESCRIPTOR.endpoint,
            urlencoding::encode(&id)
        );
        let response: Value = self.transport().get(&url).await?;

        let service: Node<Service> = children::adopt(&gateway, response)?;
        if let Some(previous) = self.parent() {
            previous.children().evict(self);
        }
        self.set_parent(service.as_parent());
        service.inner.children.insert(self);

        Ok(service)
    }
}


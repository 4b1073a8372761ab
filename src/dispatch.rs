//! CLI Dispatch
//!
//! Maps resource kinds given on the command line to SDK calls.

use anyhow::{Context, Result};
use futures::TryStreamExt;
use inpanzee::resource::registry::{self, Descriptor};
use inpanzee::{
    Certificate, Consumer, Entity, Gateway, Node, NodeStream, Plugin, Route, Service, Sni, Target,
    Upstream,
};
use serde_json::Value;

/// Print one JSON document per line
pub fn print(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn resolve(kind: &str) -> Result<&'static Descriptor> {
    registry::get_descriptor(kind).with_context(|| {
        format!(
            "Unknown resource kind: {} (expected one of {})",
            kind,
            registry::get_all_endpoints().join(", ")
        )
    })
}

fn require_parent<'a>(descriptor: &Descriptor, parent: Option<&'a str>) -> Result<&'a str> {
    parent.with_context(|| {
        let owner = registry::get_parent_descriptor(descriptor.endpoint)
            .map(|d| d.type_name)
            .unwrap_or("parent");
        format!("{} live under a {}: pass --parent <id>", descriptor.endpoint, owner)
    })
}

async fn print_stream<T: Entity>(mut stream: NodeStream<T>) -> Result<()> {
    let mut count = 0usize;
    while let Some(node) = stream.try_next().await? {
        print(&serde_json::to_value(node.fields())?)?;
        count += 1;
    }
    tracing::info!("listed {} items", count);
    Ok(())
}

fn fields_of<T: Entity>(node: &Node<T>) -> Result<Value> {
    Ok(serde_json::to_value(node.fields())?)
}

/// List every resource of a kind
pub async fn list(gateway: &Gateway, kind: &str, parent: Option<&str>) -> Result<()> {
    let descriptor = resolve(kind)?;
    tracing::debug!("list: kind={}, parent={:?}", descriptor.endpoint, parent);

    match descriptor.endpoint {
        "services" => print_stream(gateway.list_services()?).await,
        "upstreams" => print_stream(gateway.list_upstreams()?).await,
        "consumers" => print_stream(gateway.list_consumers()?).await,
        "plugins" => print_stream(gateway.list_plugins()?).await,
        "snis" => print_stream(gateway.list_snis()?).await,
        "certificates" => print_stream(gateway.list_certificates()?).await,
        "routes" => {
            let service = gateway.add_service(Service::with_id(require_parent(descriptor, parent)?));
            print_stream(service.list_routes()?).await
        }
        "targets" => {
            let upstream =
                gateway.add_upstream(Upstream::with_id(require_parent(descriptor, parent)?));
            print_stream(upstream.list_targets()?).await
        }
        other => Err(anyhow::anyhow!("Listing {} is not supported", other)),
    }
}

/// Fetch one resource
pub async fn get(gateway: &Gateway, kind: &str, id: &str, parent: Option<&str>) -> Result<Value> {
    let descriptor = resolve(kind)?;
    tracing::debug!("get: kind={}, id={}", descriptor.endpoint, id);

    match descriptor.endpoint {
        "services" => fields_of(&gateway.get_service(id).await?),
        "upstreams" => fields_of(&gateway.get_upstream(id).await?),
        "consumers" => fields_of(&gateway.get_consumer(id).await?),
        "plugins" => fields_of(&gateway.get_plugin(id).await?),
        "snis" => fields_of(&gateway.get_sni(id).await?),
        "certificates" => fields_of(&gateway.get_certificate(id).await?),
        "routes" => {
            let service = gateway.add_service(Service::with_id(require_parent(descriptor, parent)?));
            fields_of(&service.get_route(id).await?)
        }
        "targets" => {
            let upstream =
                gateway.add_upstream(Upstream::with_id(require_parent(descriptor, parent)?));
            fields_of(&upstream.get_target(id).await?)
        }
        other => Err(anyhow::anyhow!("Fetching {} is not supported", other)),
    }
}

/// Delete one resource
pub async fn delete(gateway: &Gateway, kind: &str, id: &str, parent: Option<&str>) -> Result<()> {
    let descriptor = resolve(kind)?;
    tracing::info!("delete: kind={}, id={}", descriptor.endpoint, id);

    match descriptor.endpoint {
        "services" => gateway.add_service(Service::with_id(id)).delete().await?,
        "upstreams" => gateway.add_upstream(Upstream::with_id(id)).delete().await?,
        "consumers" => gateway.add_consumer(Consumer::with_id(id)).delete().await?,
        "plugins" => gateway.add_plugin(Plugin::with_id(id)).delete().await?,
        "snis" => gateway.add_sni(Sni::with_id(id)).delete().await?,
        "certificates" => gateway.add_certificate(Certificate::with_id(id)).delete().await?,
        "routes" => {
            let service = gateway.add_service(Service::with_id(require_parent(descriptor, parent)?));
            service.add_route(Route::with_id(id)).delete().await?
        }
        "targets" => {
            let upstream =
                gateway.add_upstream(Upstream::with_id(require_parent(descriptor, parent)?));
            upstream.add_target(Target::with_id(id)).delete().await?
        }
        other => return Err(anyhow::anyhow!("Deleting {} is not supported", other)),
    }

    println!("deleted {} {}", descriptor.type_name, id);
    Ok(())
}

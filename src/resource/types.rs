//! Resource records
//!
//! One struct per Admin API object, one `Option` per persisted field. A
//! missing value is `None` and is sent as `null`.

use super::children::child_accessors;
use super::node::{Entity, Node};
use super::registry::{self, Descriptor};
use crate::gateway::client::Gateway;
use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! entity {
    ($record:ty, $descriptor:expr) => {
        impl Entity for $record {
            const DESCRIPTOR: &'static Descriptor = &$descriptor;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn set_id(&mut self, id: Option<String>) {
                self.id = id;
            }
        }
    };
}

/// Upstream API fronted by the gateway
///
/// The address can also be handled as one URL, see [`Service::url`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub id: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<String>,
    pub path: Option<String>,
    pub retries: Option<u32>,
    pub connect_timeout: Option<u64>,
    pub write_timeout: Option<u64>,
    pub read_timeout: Option<u64>,
}

/// Matching rules routing requests to a service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    pub id: Option<String>,
    pub protocols: Option<Vec<String>>,
    pub methods: Option<Vec<String>>,
    pub hosts: Option<Vec<String>>,
    pub paths: Option<Vec<String>>,
    pub strip_path: Option<bool>,
    pub preserve_host: Option<bool>,
}

/// Virtual hostname load-balanced over targets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upstream {
    pub id: Option<String>,
    pub name: Option<String>,
    pub hash_on: Option<String>,
    pub hash_fallback: Option<String>,
    pub healthchecks: Option<Value>,
    pub slots: Option<u32>,
}

/// One backend (`host:port`) of an upstream
///
/// `health` is reported by the upstream health endpoint and never sent back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    pub id: Option<String>,
    pub target: Option<String>,
    pub weight: Option<u32>,
    pub health: Option<String>,
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.target == other.target && self.weight == other.weight
    }
}

impl Eq for Target {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Consumer {
    pub id: Option<String>,
    pub username: Option<String>,
    pub custom_id: Option<String>,
}

/// Plugin configuration, optionally scoped to a consumer, service or route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plugin {
    pub id: Option<String>,
    pub name: Option<String>,
    pub config: Option<Value>,
    pub consumer_id: Option<String>,
    pub service_id: Option<String>,
    pub route_id: Option<String>,
    pub enabled: Option<bool>,
}

/// Server name bound to a certificate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sni {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    pub id: Option<String>,
    pub cert: Option<String>,
    pub key: Option<String>,
}

entity!(Service, registry::SERVICE);
entity!(Route, registry::ROUTE);
entity!(Upstream, registry::UPSTREAM);
entity!(Target, registry::TARGET);
entity!(Consumer, registry::CONSUMER);
entity!(Plugin, registry::PLUGIN);
entity!(Sni, registry::SNI);
entity!(Certificate, registry::CERTIFICATE);

child_accessors!(Gateway, Gateway {
    Service => list_services, add_service, get_service;
    Upstream => list_upstreams, add_upstream, get_upstream;
    Consumer => list_consumers, add_consumer, get_consumer;
    Plugin => list_plugins, add_plugin, get_plugin;
    Sni => list_snis, add_sni, get_sni;
    Certificate => list_certificates, add_certificate, get_certificate;
});

child_accessors!(Node<Service>, Service {
    Route => list_routes, add_route, get_route;
});

child_accessors!(Node<Upstream>, Upstream {
    Target => list_targets, add_target, get_target;
});

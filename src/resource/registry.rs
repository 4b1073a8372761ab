//! Resource Registry - static descriptors of every gateway resource type
//!
//! Each descriptor lists the persisted fields of a type in wire order, the
//! client-only extra fields, and the resource types it owns. The tree rooted
//! at [`GATEWAY`] mirrors the Admin API hierarchy.

/// Resource descriptor
#[derive(Debug)]
pub struct Descriptor {
    /// Type name as shown to users (`Service`, `SNI`, ...)
    pub type_name: &'static str,
    /// Collection path segment, always `pluralize(type_name)`
    pub endpoint: &'static str,
    /// Persisted fields, sent on save and merged from responses
    pub fields: &'static [&'static str],
    /// Client-side fields that are never sent to the gateway
    pub extra_fields: &'static [&'static str],
    /// Resource types owned by this one
    pub children: &'static [&'static Descriptor],
}

impl Descriptor {
    /// Find a child descriptor by type name or endpoint
    pub fn child(&self, name: &str) -> Option<&'static Descriptor> {
        self.children.iter().copied().find(|d| d.matches(name))
    }

    fn matches(&self, name: &str) -> bool {
        self.type_name.eq_ignore_ascii_case(name) || self.endpoint.eq_ignore_ascii_case(name)
    }
}

impl PartialEq for Descriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

/// Collection name of a type: the lower-cased name with a trailing `s`
///
/// The Admin API only ever pluralises this way for the types it exposes.
pub fn pluralize(type_name: &str) -> String {
    format!("{}s", type_name.to_lowercase())
}

pub const GATEWAY: Descriptor = Descriptor {
    type_name: "Gateway",
    endpoint: "",
    fields: &[],
    extra_fields: &[],
    children: &[&SERVICE, &UPSTREAM, &CONSUMER, &PLUGIN, &SNI, &CERTIFICATE],
};

pub const SERVICE: Descriptor = Descriptor {
    type_name: "Service",
    endpoint: "services",
    fields: &[
        "id",
        "host",
        "port",
        "protocol",
        "path",
        "retries",
        "connect_timeout",
        "write_timeout",
        "read_timeout",
    ],
    extra_fields: &[],
    children: &[&ROUTE],
};

pub const ROUTE: Descriptor = Descriptor {
    type_name: "Route",
    endpoint: "routes",
    fields: &[
        "id",
        "protocols",
        "methods",
        "hosts",
        "paths",
        "strip_path",
        "preserve_host",
    ],
    extra_fields: &[],
    children: &[],
};

pub const UPSTREAM: Descriptor = Descriptor {
    type_name: "Upstream",
    endpoint: "upstreams",
    fields: &[
        "id",
        "name",
        "hash_on",
        "hash_fallback",
        "healthchecks",
        "slots",
    ],
    extra_fields: &[],
    children: &[&TARGET],
};

pub const TARGET: Descriptor = Descriptor {
    type_name: "Target",
    endpoint: "targets",
    fields: &["id", "target", "weight"],
    extra_fields: &["health"],
    children: &[],
};

pub const CONSUMER: Descriptor = Descriptor {
    type_name: "Consumer",
    endpoint: "consumers",
    fields: &["id", "username", "custom_id"],
    extra_fields: &[],
    children: &[],
};

pub const PLUGIN: Descriptor = Descriptor {
    type_name: "Plugin",
    endpoint: "plugins",
    fields: &[
        "id",
        "name",
        "config",
        "consumer_id",
        "service_id",
        "route_id",
        "enabled",
    ],
    extra_fields: &[],
    children: &[],
};

pub const SNI: Descriptor = Descriptor {
    type_name: "SNI",
    endpoint: "snis",
    fields: &["id", "name"],
    extra_fields: &[],
    children: &[],
};

pub const CERTIFICATE: Descriptor = Descriptor {
    type_name: "Certificate",
    endpoint: "certificates",
    fields: &["id", "cert", "key"],
    extra_fields: &[],
    children: &[],
};

/// Every resource descriptor below the gateway root, parents before children
pub fn get_registry() -> Vec<&'static Descriptor> {
    let mut all = Vec::new();
    let mut pending: Vec<&'static Descriptor> = GATEWAY.children.to_vec();
    pending.reverse();

    while let Some(descriptor) = pending.pop() {
        all.push(descriptor);
        pending.extend(descriptor.children.iter().rev().copied());
    }

    all
}

/// Get a resource descriptor by type name or endpoint (case-insensitive)
pub fn get_descriptor(name: &str) -> Option<&'static Descriptor> {
    get_registry().into_iter().find(|d| d.matches(name))
}

/// Get the descriptor owning a type, `GATEWAY` for top-level types
pub fn get_parent_descriptor(name: &str) -> Option<&'static Descriptor> {
    if GATEWAY.child(name).is_some() {
        return Some(&GATEWAY);
    }
    get_registry()
        .into_iter()
        .find(|d| d.child(name).is_some())
}

/// Get all resource endpoints (for CLI completion and validation)
pub fn get_all_endpoints() -> Vec<&'static str> {
    get_registry().iter().map(|d| d.endpoint).collect()
}

//! Sweepable GCP resource kinds, in an order that deletes dependents before
//! the resources they reference. The sweeper's retry passes cover whatever
//! this order gets wrong.

/// The REST API a kind is listed and deleted through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Compute,
    Sql,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindScope {
    Global,
    Regional,
    Zonal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKind {
    pub label: &'static str,
    pub collection: &'static str,
    pub scope: KindScope,
    pub service: Service,
    /// Names that are never swept, even when they match the filter.
    pub protected_prefix: Option<&'static str>,
}

impl ResourceKind {
    const fn compute(label: &'static str, collection: &'static str, scope: KindScope) -> Self {
        Self {
            label,
            collection,
            scope,
            service: Service::Compute,
            protected_prefix: None,
        }
    }

    /// Cloud SQL collections live directly under the project.
    const fn sql(label: &'static str, collection: &'static str) -> Self {
        Self {
            label,
            collection,
            scope: KindScope::Global,
            service: Service::Sql,
            protected_prefix: None,
        }
    }

    const fn protecting(mut self, prefix: &'static str) -> Self {
        self.protected_prefix = Some(prefix);
        self
    }

    /// Lowercase, hyphenated label used on the command line.
    pub fn slug(&self) -> String {
        self.label.to_lowercase().replace(' ', "-")
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected_prefix
            .is_some_and(|prefix| name.starts_with(prefix))
    }
}

pub const KINDS: &[ResourceKind] = &[
    ResourceKind::sql("SQL Instance", "instances"),
    ResourceKind::compute("Compute Instance", "instances", KindScope::Zonal),
    ResourceKind::compute("Instance Group", "instanceGroups", KindScope::Zonal),
    ResourceKind::compute("Disk", "disks", KindScope::Zonal),
    ResourceKind::compute("Global Forwarding Rule", "forwardingRules", KindScope::Global),
    ResourceKind::compute("Forwarding Rule", "forwardingRules", KindScope::Regional),
    ResourceKind::compute("Target Http Proxy", "targetHttpProxies", KindScope::Global),
    ResourceKind::compute("Target Https Proxy", "targetHttpsProxies", KindScope::Global),
    ResourceKind::compute("Url Map", "urlMaps", KindScope::Global),
    ResourceKind::compute("Backend Service", "backendServices", KindScope::Global),
    ResourceKind::compute("Global Health Check", "healthChecks", KindScope::Global),
    ResourceKind::compute("Http Health Check", "httpHealthChecks", KindScope::Global),
    ResourceKind::compute("Https Health Check", "httpsHealthChecks", KindScope::Global),
    ResourceKind::compute("Target Pool", "targetPools", KindScope::Regional),
    ResourceKind::compute("Address", "addresses", KindScope::Regional),
    ResourceKind::compute("Firewall", "firewalls", KindScope::Global).protecting("default"),
    ResourceKind::compute("Subnetwork", "subnetworks", KindScope::Regional).protecting("default"),
    ResourceKind::compute("Network", "networks", KindScope::Global).protecting("default"),
];

/// Look up a kind by label or slug, case-insensitively.
pub fn find_kind(name: &str) -> Option<&'static ResourceKind> {
    let wanted = name.trim().to_lowercase();
    KINDS
        .iter()
        .find(|kind| kind.label.to_lowercase() == wanted || kind.slug() == wanted)
}

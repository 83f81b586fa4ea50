//! The concrete per-resource-type migrators: each one is a
//! composition of the [`crate::hcl`] and [`crate::json_state`] primitives,
//! branching on the resource's own discriminant attribute where the schema
//! diff needs it.

mod dispatch_namespace;
mod dns_record;
mod healthcheck;
mod load_balancer_pool;
mod zone_datasource;
mod zone_dnssec;
mod zone_settings_override;

use std::sync::Arc;

use migrate_core::registry::Registry;
use migrate_core::version::VersionId;

/// Register every shipped migrator for one `(source, target)` version pair
/// whose old resource type `enabled` accepts. Called once at process start;
/// the registry is read-only for the rest of the run.
pub fn register_all(
    registry: &mut Registry,
    source: impl Into<VersionId>,
    target: impl Into<VersionId>,
    mut enabled: impl FnMut(&str) -> bool,
) {
    let source = source.into();
    let target = target.into();

    let mut register = |resource_type: &'static str, transformer: Arc<dyn migrate_core::transformer::ResourceTransformer>| {
        if enabled(resource_type) {
            registry.register(resource_type, source.clone(), target.clone(), transformer);
        }
    };

    register("cloudflare_record", Arc::new(dns_record::DnsRecordMigrator));
    register("cloudflare_healthcheck", Arc::new(healthcheck::HealthcheckMigrator));
    register("cloudflare_load_balancer_pool", Arc::new(load_balancer_pool::LoadBalancerPoolMigrator));
    register("cloudflare_zone_dnssec", Arc::new(zone_dnssec::ZoneDnssecMigrator));
    register(
        "cloudflare_workers_for_platforms_dispatch_namespace",
        Arc::new(dispatch_namespace::DispatchNamespaceMigrator),
    );
    register("cloudflare_zone_settings_override", Arc::new(zone_settings_override::ZoneSettingsOverrideMigrator));
    register("data.cloudflare_zone", Arc::new(zone_datasource::ZoneDatasourceMigrator));
}

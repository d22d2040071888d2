// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Process-wide operator configuration.
//!
//! The configuration is read once from the environment at startup and is immutable
//! for the lifetime of the process. It carries the geo tag of the local cluster, the
//! delegated DNS zone every `Gslb` host must live in, and the nameservers of the
//! peer clusters whose published targets are merged into ours.
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `CLUSTER_GEO_TAG` | yes | |
//! | `DNS_ZONE` | yes | |
//! | `EXT_GSLB_CLUSTERS_NAMESERVERS` | no | none (`tag=ip[:port],...`) |
//! | `RECONCILE_REQUEUE_SECONDS` | no | `30` |
//! | `METRICS_ADDR` | no | `0.0.0.0:8080` |

use crate::constants::{
    DEFAULT_METRICS_ADDR, DEFAULT_RECONCILE_REQUEUE_SECS, DNS_PORT, ENV_CLUSTER_GEO_TAG,
    ENV_DNS_ZONE, ENV_EXT_GSLB_CLUSTERS_NAMESERVERS, ENV_METRICS_ADDR,
    ENV_RECONCILE_REQUEUE_SECONDS,
};
use crate::gslb_errors::ConfigError;
use crate::targets::GeoTag;
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Immutable configuration of the running operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Geo tag of the cluster this operator runs in
    pub cluster_geo_tag: GeoTag,
    /// Delegated zone all `Gslb` hosts must belong to, without trailing dot
    pub dns_zone: String,
    /// Nameserver address of every peer cluster, keyed by its geo tag
    pub ext_cluster_nameservers: BTreeMap<GeoTag, SocketAddr>,
    /// Requeue interval after a successful reconciliation
    pub reconcile_requeue: Duration,
    /// Bind address of the metrics endpoint
    pub metrics_addr: SocketAddr,
}

impl OperatorConfig {
    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or any value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or any value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cluster_geo_tag = required(&lookup, ENV_CLUSTER_GEO_TAG)?;
        validate_geo_tag(ENV_CLUSTER_GEO_TAG, &cluster_geo_tag)?;

        let dns_zone = required(&lookup, ENV_DNS_ZONE)?
            .trim_end_matches('.')
            .to_string();
        if !is_valid_hostname(&dns_zone) {
            return Err(invalid(ENV_DNS_ZONE, &dns_zone, "not a valid RFC 1123 host name"));
        }

        let ext_cluster_nameservers = match optional(&lookup, ENV_EXT_GSLB_CLUSTERS_NAMESERVERS) {
            Some(raw) => parse_nameservers(&raw, &cluster_geo_tag)?,
            None => BTreeMap::new(),
        };

        let reconcile_requeue = match optional(&lookup, ENV_RECONCILE_REQUEUE_SECONDS) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    invalid(ENV_RECONCILE_REQUEUE_SECONDS, &raw, "not an integer")
                })?;
                if secs == 0 {
                    return Err(invalid(
                        ENV_RECONCILE_REQUEUE_SECONDS,
                        &raw,
                        "must be higher than zero",
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_RECONCILE_REQUEUE_SECS),
        };

        let metrics_addr_raw = optional(&lookup, ENV_METRICS_ADDR)
            .unwrap_or_else(|| DEFAULT_METRICS_ADDR.to_string());
        let metrics_addr: SocketAddr = metrics_addr_raw
            .parse()
            .map_err(|_| invalid(ENV_METRICS_ADDR, &metrics_addr_raw, "not a socket address"))?;

        Ok(Self {
            cluster_geo_tag,
            dns_zone,
            ext_cluster_nameservers,
            reconcile_requeue,
            metrics_addr,
        })
    }

    /// True when `host` is the delegated zone itself or a name below it.
    ///
    /// Comparison is case-insensitive and ignores a trailing dot.
    #[must_use]
    pub fn is_in_zone(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        let zone = self.dns_zone.to_ascii_lowercase();
        host == zone || host.ends_with(&format!(".{zone}"))
    }
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or_else(|| ConfigError::Missing {
        name: name.to_string(),
    })
}

fn invalid(name: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Geo tags follow cloud region formats, e.g. `af-south-1`.
fn validate_geo_tag(name: &str, tag: &str) -> Result<(), ConfigError> {
    if tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        Ok(())
    } else {
        Err(invalid(name, tag, "geo tag may only contain letters, digits and '-'"))
    }
}

/// RFC 1123 host name; labels may start with a digit.
fn is_valid_hostname(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 253
        && name.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Parses `tag=ip[:port],...`. A missing port defaults to 53.
fn parse_nameservers(
    raw: &str,
    local_geo_tag: &str,
) -> Result<BTreeMap<GeoTag, SocketAddr>, ConfigError> {
    let name = ENV_EXT_GSLB_CLUSTERS_NAMESERVERS;
    let mut nameservers = BTreeMap::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (tag, address) = entry
            .split_once('=')
            .ok_or_else(|| invalid(name, entry, "expected tag=address"))?;
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(invalid(name, entry, "geo tag is empty"));
        }
        validate_geo_tag(name, tag)?;
        if tag == local_geo_tag {
            return Err(invalid(
                name,
                entry,
                "peer geo tag can't be equal to CLUSTER_GEO_TAG",
            ));
        }

        let address = address.trim();
        let socket_addr = address
            .parse::<SocketAddr>()
            .or_else(|_| {
                address
                    .parse::<IpAddr>()
                    .map(|ip| SocketAddr::new(ip, DNS_PORT))
            })
            .map_err(|_| invalid(name, entry, "address is not ip or ip:port"))?;

        if nameservers.insert(tag.to_string(), socket_addr).is_some() {
            return Err(invalid(name, raw, "contains redundant geo tags"));
        }
    }

    Ok(nameservers)
}

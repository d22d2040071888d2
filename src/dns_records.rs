// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Conversion of resolved target sets into DNS records.
//!
//! Two kinds of records are produced per host:
//!
//! - the **local targets** pair, `localtargets-<host>` `A` and `AAAA`, carrying only
//!   this cluster's own addresses. It is published whenever the local workload is
//!   healthy so peer clusters can discover our endpoints independently of the
//!   strategy outcome. Both records are emitted even when one family is empty.
//! - the **GSLB** records for `<host>` itself: one `A` record with every IPv4 final
//!   target and one `AAAA` record with every IPv6 final target. A family without
//!   targets yields no record. Both carry the `strategy` label and the weight labels
//!   of their own family.
//!
//! Labels are kept in sorted maps and targets are walked in geo tag order, so the
//! same input always yields byte-identical records.

use crate::constants::LOCAL_TARGETS_PREFIX;
use crate::crd::{Endpoint, RecordType, Strategy};
use crate::labels::{weight_label, STRATEGY_LABEL};
use crate::targets::{AddressFamily, TargetSet};
use std::collections::BTreeMap;

/// Name of the record carrying this cluster's own targets for `host`.
#[must_use]
pub fn local_targets_name(host: &str) -> String {
    format!("{LOCAL_TARGETS_PREFIX}{host}")
}

/// Builds the `localtargets-<host>` `A` and `AAAA` records.
#[must_use]
pub fn local_target_endpoints(
    host: &str,
    ttl: u32,
    a_targets: &[String],
    aaaa_targets: &[String],
) -> Vec<Endpoint> {
    let name = local_targets_name(host);
    vec![
        Endpoint {
            dns_name: name.clone(),
            targets: a_targets.to_vec(),
            record_type: RecordType::A,
            record_ttl: i64::from(ttl),
            labels: BTreeMap::new(),
        },
        Endpoint {
            dns_name: name,
            targets: aaaa_targets.to_vec(),
            record_type: RecordType::AAAA,
            record_ttl: i64::from(ttl),
            labels: BTreeMap::new(),
        },
    ]
}

/// Weight labels for every target of every geo tag that has a configured weight.
///
/// Keys are `weight-<geoTag>-<index>-<weight>`, where `index` is the position of
/// the target within its geo tag's list. Values are the IP literals.
#[must_use]
pub fn weight_labels(
    weights: &BTreeMap<String, u32>,
    targets: &TargetSet,
) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    for (geo_tag, weight) in weights {
        let Some(tag_targets) = targets.get(geo_tag) else {
            continue;
        };
        for (index, ip) in tag_targets.ips.iter().enumerate() {
            labels.insert(weight_label(geo_tag, index, *weight), ip.clone());
        }
    }
    labels
}

/// Builds the GSLB records of `host` from its final target set.
///
/// Returns nothing when the target set is empty.
#[must_use]
pub fn gslb_endpoints(host: &str, strategy: &Strategy, final_targets: &TargetSet) -> Vec<Endpoint> {
    let weights = weight_labels(&strategy.weight, final_targets);

    [(RecordType::A, AddressFamily::V4), (RecordType::AAAA, AddressFamily::V6)]
        .into_iter()
        .filter_map(|(record_type, family)| {
            let targets: Vec<String> = final_targets
                .ips()
                .into_iter()
                .filter(|ip| AddressFamily::of(ip) == family)
                .collect();
            if targets.is_empty() {
                return None;
            }

            let mut labels = BTreeMap::new();
            labels.insert(
                STRATEGY_LABEL.to_string(),
                strategy.strategy_type.as_str().to_string(),
            );
            labels.extend(
                weights
                    .iter()
                    .filter(|(_, ip)| AddressFamily::of(ip) == family)
                    .map(|(key, ip)| (key.clone(), ip.clone())),
            );

            Some(Endpoint {
                dns_name: host.to_string(),
                targets,
                record_type,
                record_ttl: i64::from(strategy.dns_ttl_seconds),
                labels,
            })
        })
        .collect()
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Geo-tagged DNS target sets and address family classification.
//!
//! A [`TargetSet`] groups the IP addresses advertised for a host by the geo tag of
//! the cluster advertising them. Geo tags are kept in a sorted map so that every
//! walk over the set (label generation, flattening, metrics) is deterministic.
//! The IP list under one geo tag keeps insertion order and never holds the same
//! address twice.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Identifier of a cluster or region, e.g. `eu-west-1`.
pub type GeoTag = String;

/// Address family of an IP literal.
///
/// Never stored alongside an address; always recomputed from the literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IPv4, published as an `A` record
    V4,
    /// IPv6, published as an `AAAA` record
    V6,
}

impl AddressFamily {
    /// Classifies an IP literal. Anything that does not parse as IPv4 is treated as IPv6.
    #[must_use]
    pub fn of(ip: &str) -> Self {
        if ip.parse::<Ipv4Addr>().is_ok() {
            Self::V4
        } else {
            Self::V6
        }
    }
}

/// Splits IP literals into `(ipv4, ipv6)` lists, preserving relative order.
#[must_use]
pub fn split_by_family(ips: &[String]) -> (Vec<String>, Vec<String>) {
    ips.iter()
        .cloned()
        .partition(|ip| AddressFamily::of(ip) == AddressFamily::V4)
}

/// Ordered IP list advertised under one geo tag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Targets {
    /// IP literals in advertisement order
    pub ips: Vec<String>,
}

impl Targets {
    fn push_unique(&mut self, ip: &str) {
        if !self.ips.iter().any(|existing| existing == ip) {
            self.ips.push(ip.to_string());
        }
    }
}

/// Mapping of geo tag to the IPs advertised under it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetSet(BTreeMap<GeoTag, Targets>);

impl TargetSet {
    /// Creates an empty target set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `ips` under `geo_tag`, skipping addresses already present for that tag.
    ///
    /// Appending an empty list still does not create the tag.
    pub fn append<I, S>(&mut self, geo_tag: &str, ips: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ips = ips.into_iter().peekable();
        if ips.peek().is_none() {
            return;
        }
        let targets = self.0.entry(geo_tag.to_string()).or_default();
        for ip in ips {
            targets.push_unique(ip.as_ref());
        }
    }

    /// Unions `other` into this set, tag by tag.
    pub fn append_targets(&mut self, other: &TargetSet) {
        for (geo_tag, targets) in &other.0 {
            self.append(geo_tag, &targets.ips);
        }
    }

    /// Sorts the IP list of every geo tag.
    pub fn sort(&mut self) {
        for targets in self.0.values_mut() {
            targets.ips.sort();
        }
    }

    /// Flattens the set into one list: geo tags in sorted order, IPs in list order.
    #[must_use]
    pub fn ips(&self) -> Vec<String> {
        self.0
            .values()
            .flat_map(|targets| targets.ips.iter().cloned())
            .collect()
    }

    /// Targets advertised under `geo_tag`, if any.
    #[must_use]
    pub fn get(&self, geo_tag: &str) -> Option<&Targets> {
        self.0.get(geo_tag)
    }

    /// Iterates geo tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&GeoTag, &Targets)> {
        self.0.iter()
    }

    /// Number of geo tags in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no geo tag carries any target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|targets| targets.ips.is_empty())
    }
}

impl<S: AsRef<str>> FromIterator<(S, Vec<String>)> for TargetSet {
    fn from_iter<T: IntoIterator<Item = (S, Vec<String>)>>(iter: T) -> Self {
        let mut set = TargetSet::new();
        for (geo_tag, ips) in iter {
            set.append(geo_tag.as_ref(), ips);
        }
        set
    }
}

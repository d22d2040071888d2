// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for the `Gslb` resource.
//!
//! - [`dnsupdate`] - Computes the `DNSEndpoint` of a `Gslb` from its collaborators
//! - [`gslb`] - Persists the records and the `Gslb` status
//! - [`status`] - Status condition helpers

pub mod dnsupdate;
pub mod gslb;
pub mod status;


pub use dnsupdate::{gslb_dns_endpoint, DnsUpdate};
pub use gslb::reconcile_gslb;

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for GSLB record computation and operator configuration.
//!
//! This module provides specialized error types for:
//! - Hosts that fall outside the delegated DNS zone
//! - Health lookups against the local cluster's workloads
//! - Target lookups against the local ingress and peer cluster nameservers
//! - Writing the computed `DNSEndpoint` back to the cluster
//! - Invalid process configuration
//!
//! A failure of any kind aborts the reconciliation of the whole `Gslb`: there is
//! no partial record output. Recovery is the controller's requeue.

use thiserror::Error;

/// Errors that can occur while computing or persisting the records of one `Gslb`.
#[derive(Error, Debug, Clone)]
pub enum GslbError {
    /// A host of the `Gslb` is not inside the delegated zone.
    ///
    /// This is fatal for the whole reconciliation; no records are produced.
    #[error("ingress host {host} does not match delegated zone {zone}")]
    ZoneMismatch {
        /// The offending host name
        host: String,
        /// The delegated zone configured for this operator
        zone: String,
    },

    /// The workload health of the local cluster could not be determined.
    #[error("Failed to read service health for Gslb '{gslb}': {reason}")]
    HealthLookup {
        /// Name of the `Gslb` being reconciled
        gslb: String,
        /// Underlying cause
        reason: String,
    },

    /// Local exposed addresses or peer cluster targets could not be read.
    #[error("Failed to look up targets for '{name}': {reason}")]
    RemoteLookup {
        /// The `Gslb` or host whose targets were requested
        name: String,
        /// Underlying cause
        reason: String,
    },

    /// The computed `DNSEndpoint` could not be written back.
    #[error("Failed to persist DNSEndpoint '{namespace}/{name}': {reason}")]
    Persistence {
        /// Name of the `DNSEndpoint`
        name: String,
        /// Namespace of the `DNSEndpoint`
        namespace: String,
        /// Underlying cause
        reason: String,
    },
}

impl GslbError {
    /// Returns true if this error is transient and the operation should be retried.
    ///
    /// A zone mismatch only goes away when the `Gslb` is edited; everything else
    /// depends on the API server or peer clusters and may recover on its own.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ZoneMismatch { .. } => false,
            Self::HealthLookup { .. } | Self::RemoteLookup { .. } | Self::Persistence { .. } => {
                true
            }
        }
    }

    /// Returns the Kubernetes status reason code for this error.
    ///
    /// This is used when updating the `Gslb` status conditions to provide
    /// structured error information.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::ZoneMismatch { .. } => "ZoneMismatch",
            Self::HealthLookup { .. } => "HealthLookupFailed",
            Self::RemoteLookup { .. } => "RemoteLookupFailed",
            Self::Persistence { .. } => "PersistenceFailed",
        }
    }
}

/// Errors raised while loading the process-wide operator configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is missing or blank.
    #[error("{name} is empty")]
    Missing {
        /// Environment variable name
        name: String,
    },

    /// A variable is present but its value is malformed.
    #[error("{name} has invalid value \"{value}\": {reason}")]
    Invalid {
        /// Environment variable name
        name: String,
        /// The rejected value
        value: String,
        /// What is wrong with it
        reason: String,
    },
}

// Common test utilities for integration tests

#![allow(dead_code)]

use gslb::crd::{DNSEndpoint, Gslb, GslbHost, GslbSpec, Strategy, StrategyType};
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{
    api::{Api, DeleteParams, PostParams},
    client::Client,
};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::sleep;

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let mut labels = BTreeMap::new();
    labels.insert("test".to_string(), "integration".to_string());
    labels.insert("managed-by".to_string(), "gslb-test".to_string());

    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            println!("Deleted test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// A `Gslb` with one host per `(host, service)` pair
pub fn new_gslb(
    namespace: &str,
    name: &str,
    hosts: &[(&str, &str)],
    strategy_type: StrategyType,
    primary_geo_tag: Option<&str>,
) -> Gslb {
    let mut gslb = Gslb::new(
        name,
        GslbSpec {
            ingress_ref: None,
            hosts: hosts
                .iter()
                .map(|(host, service)| GslbHost {
                    host: (*host).to_string(),
                    service: (*service).to_string(),
                })
                .collect(),
            strategy: Strategy {
                strategy_type,
                primary_geo_tag: primary_geo_tag.map(ToString::to_string),
                weight: BTreeMap::new(),
                dns_ttl_seconds: 30,
            },
        },
    );
    gslb.metadata.namespace = Some(namespace.to_string());
    gslb
}

/// Create a `Gslb` in the cluster
pub async fn create_gslb(client: &Client, gslb: &Gslb) -> Result<(), Box<dyn std::error::Error>> {
    let namespace = gslb.metadata.namespace.clone().unwrap_or_default();
    let api: Api<Gslb> = Api::namespaced(client.clone(), &namespace);
    api.create(&PostParams::default(), gslb).await?;
    Ok(())
}

/// Wait for the controller to write the `DNSEndpoint` of a `Gslb`
pub async fn wait_for_dns_endpoint(
    client: &Client,
    namespace: &str,
    name: &str,
    timeout_secs: u64,
) -> Option<DNSEndpoint> {
    let api: Api<DNSEndpoint> = Api::namespaced(client.clone(), namespace);

    for _ in 0..timeout_secs {
        if let Ok(Some(endpoint)) = api.get_opt(name).await {
            return Some(endpoint);
        }
        sleep(Duration::from_secs(1)).await;
    }
    None
}

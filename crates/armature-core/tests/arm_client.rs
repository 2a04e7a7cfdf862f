//! Tests for the ARM REST client against a local HTTP double.

use std::time::Duration;

use armature_core::manifest::{Deployment, DeploymentErrorDetail, Manifest, Parameter, ParameterSet};
use armature_core::provider::arm::API_VERSION;
use armature_core::provider::{
    ArmClient, DeploymentProvider, DeploymentRequest, ManifestStore, ProviderError,
};
use mockito::{Matcher, Server};
use serde_json::json;

const DEPLOYMENT_PATH: &str =
    "/subscriptions/sub/resourcegroups/orders-rg/providers/Microsoft.Resources/deployments/orders-deployment";

fn client(server: &Server) -> ArmClient {
    ArmClient::new("sub", "orders-rg", "token")
        .unwrap()
        .with_endpoint(&server.url())
        .unwrap()
        .with_poll_interval(Duration::from_millis(1))
}

fn api_version() -> Matcher {
    Matcher::UrlEncoded("api-version".into(), API_VERSION.into())
}

fn deployment_path() -> Matcher {
    Matcher::Regex(format!("^{}", regex_escape(DEPLOYMENT_PATH)))
}

fn export_path() -> Matcher {
    Matcher::Regex(format!("^{}/exportTemplate", regex_escape(DEPLOYMENT_PATH)))
}

fn regex_escape(path: &str) -> String {
    path.replace('.', r"\.")
}

fn request() -> DeploymentRequest {
    DeploymentRequest::incremental(Deployment::new(
        Manifest::default(),
        ParameterSet::from([("location".to_string(), Parameter::value("westus"))]),
    ))
}

#[tokio::test]
async fn missing_deployment_has_no_previous_manifest() {
    let mut server = Server::new_async().await;
    let get = server
        .mock("GET", deployment_path())
        .match_query(api_version())
        .match_header("authorization", "Bearer token")
        .with_status(404)
        .create_async()
        .await;

    let previous = client(&server)
        .previous_manifest_and_parameters("orders-deployment")
        .await
        .unwrap();

    assert!(previous.is_none());
    get.assert_async().await;
}

#[tokio::test]
async fn previous_manifest_combines_parameters_and_exported_template() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", deployment_path())
        .match_query(api_version())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "name": "orders-deployment",
                "properties": {
                    "provisioningState": "Succeeded",
                    "parameters": {"location": {"type": "String", "value": "westus"}}
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("POST", export_path())
        .match_query(api_version())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "template": {
                    "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#",
                    "contentVersion": "1.0.0.0",
                    "parameters": {"location": {"type": "String"}},
                    "resources": [{"type": "Microsoft.Web/sites", "name": "orders"}]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let previous = client(&server)
        .previous_manifest_and_parameters("orders-deployment")
        .await
        .unwrap()
        .expect("previous deployment");

    assert_eq!(previous.manifest.resources.len(), 1);
    assert_eq!(
        previous.parameters["location"],
        Parameter::typed("String", "westus")
    );
}

#[tokio::test]
async fn previous_deployment_reports_error_detail() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", deployment_path())
        .match_query(api_version())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "properties": {
                    "provisioningState": "Failed",
                    "error": {"code": "Conflict", "message": "resource locked"}
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let record = client(&server)
        .previous_deployment("orders-deployment")
        .await
        .unwrap()
        .expect("deployment record");

    assert_eq!(record.provisioning_state.as_deref(), Some("Failed"));
    assert_eq!(
        record.error,
        Some(DeploymentErrorDetail::new("Conflict", "resource locked"))
    );
}

#[tokio::test]
async fn submission_puts_incremental_request() {
    let mut server = Server::new_async().await;
    let put = server
        .mock("PUT", deployment_path())
        .match_query(api_version())
        .match_header("authorization", "Bearer token")
        .match_body(Matcher::PartialJson(json!({
            "properties": {
                "mode": "Incremental",
                "parameters": {"location": {"value": "westus"}}
            }
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({"properties": {"provisioningState": "Succeeded"}}).to_string())
        .create_async()
        .await;

    let extended = client(&server)
        .create_or_update("orders-rg", "orders-deployment", &request())
        .await
        .unwrap();

    assert_eq!(extended.provisioning_state(), Some("Succeeded"));
    put.assert_async().await;
}

#[tokio::test]
async fn running_submission_is_polled_until_terminal() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", deployment_path())
        .match_query(api_version())
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({"properties": {"provisioningState": "Running"}}).to_string())
        .create_async()
        .await;
    let poll = server
        .mock("GET", deployment_path())
        .match_query(api_version())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "properties": {
                    "provisioningState": "Failed",
                    "error": {"code": "DeploymentFailed", "message": "At least one resource failed"}
                }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let err = client(&server)
        .create_or_update("orders-rg", "orders-deployment", &request())
        .await
        .unwrap_err();

    match err {
        ProviderError::DeploymentFailed { state, error } => {
            assert_eq!(state, "Failed");
            assert_eq!(error.and_then(|e| e.code).as_deref(), Some("DeploymentFailed"));
        }
        other => panic!("unexpected error: {other}"),
    }
    poll.assert_async().await;
}

#[tokio::test]
async fn rejected_submission_decodes_error_envelope() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", deployment_path())
        .match_query(api_version())
        .with_status(409)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"error": {"code": "Conflict", "message": "resource locked"}}).to_string(),
        )
        .create_async()
        .await;

    let err = client(&server)
        .create_or_update("orders-rg", "orders-deployment", &request())
        .await
        .unwrap_err();

    match err {
        ProviderError::Rejected { status, error, .. } => {
            assert_eq!(status, 409);
            assert_eq!(error, Some(DeploymentErrorDetail::new("Conflict", "resource locked")));
        }
        other => panic!("unexpected error: {other}"),
    }
}

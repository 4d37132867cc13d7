mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn test_api_networks_create_assigns_gateways_and_ranges() -> anyhow::Result<()> {
    let app = TestApp::new();

    let (status, network) = app
        .post(
            "/networks/create",
            json!({
                "name": "backend",
                "driver": "overlay",
                "opts": { "encrypted": "true" },
                "ipam_driver": "default",
                "subnet": ["10.0.1.0/24", "10.0.2.0/24", "fd00::/64"],
                "gateway": ["10.0.2.1", "10.0.1.1", "192.168.0.1"],
                "ip_range": ["10.0.2.128/25"],
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let spec = &network["spec"];
    assert_eq!(spec["annotations"]["name"], "backend");
    assert_eq!(spec["driver_config"]["name"], "overlay");
    assert_eq!(spec["driver_config"]["options"]["encrypted"], "true");
    assert_eq!(spec["ipam"]["driver"]["name"], "default");

    let configs = &spec["ipam"]["configs"];
    assert_eq!(configs.as_array().map(Vec::len), Some(3));
    assert_eq!(configs[0]["gateway"], "10.0.1.1");
    assert!(configs[0]["range"].is_null());
    assert_eq!(configs[1]["gateway"], "10.0.2.1");
    assert_eq!(configs[1]["range"], "10.0.2.128/25");
    assert_eq!(configs[2]["family"], "ipv6");
    assert!(configs[2]["gateway"].is_null());

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_api_networks_invalid_subnet_is_rejected() -> anyhow::Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/networks/create",
            json!({ "name": "backend", "subnet": ["10.0.1.0"] }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");

    let (status, _) = app
        .post("/networks/create", json!({ "driver": "overlay" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = app.get("/networks").await?;
    assert_eq!(list, json!([]));

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_api_networks_inspect_and_remove() -> anyhow::Result<()> {
    let app = TestApp::new();

    let (_, created) = app
        .post("/networks/create", json!({ "name": "backend" }))
        .await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let (status, network) = app.get("/networks/backend").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(network["id"], id.as_str());
    assert!(network["spec"]["driver_config"].is_null());

    let (status, _) = app
        .post(
            "/services/create",
            json!({ "name": "api", "image": "api:1", "network": id }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.delete(&format!("/networks/{}", id)).await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error_type"], "remote_error");

    app.delete("/services/api").await?;
    let (status, removed) = app.delete("/networks/backend").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["id"], id.as_str());

    let (status, _) = app.get("/networks/backend").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

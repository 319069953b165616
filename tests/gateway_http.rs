use anyhow::Result;
use entity::{Estado, User, UserPatch};
use platform_gateway::{GatewayConfig, GatewayError, HttpUserGateway, UserGateway};
use platform_mock_api::{MockServer, seed_users};

async fn start(users: Vec<User>) -> Result<(MockServer, HttpUserGateway)> {
    let server = MockServer::start(users).await?;
    let gateway = HttpUserGateway::new(GatewayConfig::new(server.collection_url()))?;
    Ok((server, gateway))
}

fn mixed_sectors() -> Vec<User> {
    let mut users = seed_users(7000, 3);
    users.push(User::new("4", "externo", Estado::Activo, 8000));
    users
}

#[tokio::test]
async fn list_by_sector_only_returns_that_sector() -> Result<()> {
    let (_server, gateway) = start(mixed_sectors()).await?;
    let users = gateway.list_by_sector(7000).await?;
    assert_eq!(users.len(), 3);
    assert!(users.iter().all(|u| u.sector == Some(7000)));
    Ok(())
}

#[tokio::test]
async fn list_all_ignores_sector() -> Result<()> {
    let (_server, gateway) = start(mixed_sectors()).await?;
    assert_eq!(gateway.list_all().await?.len(), 4);
    Ok(())
}

#[tokio::test]
async fn second_page_of_twenty_five() -> Result<()> {
    let (_server, gateway) = start(seed_users(7000, 25)).await?;
    let page = gateway.list_by_page(7000, 10, 2).await?;
    assert_eq!(page.users.len(), 10);
    assert_eq!(page.total_records, 25);
    assert_eq!(page.users.first().map(|u| u.id.as_str()), Some("11"));
    Ok(())
}

#[tokio::test]
async fn missing_total_count_header_reads_as_zero() -> Result<()> {
    let (server, gateway) = start(seed_users(7000, 25)).await?;
    server.collection().omit_total_count(true);
    let page = gateway.list_by_page(7000, 10, 1).await?;
    assert_eq!(page.users.len(), 10);
    assert_eq!(page.total_records, 0);
    Ok(())
}

#[tokio::test]
async fn create_round_trips_and_conflicts_surface_as_status() -> Result<()> {
    let (server, gateway) = start(Vec::new()).await?;
    let bob = User::new("2", "bob", Estado::Activo, 7000);
    assert_eq!(gateway.create(&bob).await?, bob);
    assert_eq!(server.collection().get("2").await, Some(bob.clone()));

    let err = gateway.create(&bob).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    Ok(())
}

#[tokio::test]
async fn update_is_partial_and_unknown_ids_are_not_found() -> Result<()> {
    let (_server, gateway) = start(seed_users(7000, 2)).await?;
    let updated = gateway
        .update("1", &UserPatch::estado(Estado::Inactivo))
        .await?;
    assert_eq!(updated, User::new("1", "ana1", Estado::Inactivo, 7000));

    let err = gateway
        .update("404", &UserPatch::estado(Estado::Inactivo))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, GatewayError::Status { operation: "update", .. }));
    Ok(())
}

#[tokio::test]
async fn latest_picks_the_highest_id() -> Result<()> {
    let (_server, gateway) = start(seed_users(7000, 12)).await?;
    let latest = gateway.latest().await?;
    assert_eq!(latest.map(|u| u.id), Some("12".to_string()));

    let (_empty, gateway) = start(Vec::new()).await?;
    assert_eq!(gateway.latest().await?, None);
    Ok(())
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() -> Result<()> {
    let server = MockServer::start(Vec::new()).await?;
    let health = format!("http://{}/health", server.addr());
    let gateway = HttpUserGateway::new(GatewayConfig::new(health))?;
    let err = gateway.list_all().await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode { operation: "list_all", .. }));
    Ok(())
}

#[tokio::test]
async fn mock_collection_exposes_total_count_to_browsers() -> Result<()> {
    let server = MockServer::start(seed_users(7000, 3)).await?;
    let response = reqwest::Client::new()
        .get(format!("{}?_page=1", server.collection_url()))
        .header("Origin", "http://localhost:5173")
        .send()
        .await?;
    let exposed = response
        .headers()
        .get("access-control-expose-headers")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    assert!(exposed.contains("x-total-count"));
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body.as_array().map(Vec::len), Some(3));
    Ok(())
}

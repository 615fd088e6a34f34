//!  Dhub Hotel Client
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Session tests over real streamable HTTP against an in-process stub server.


use anyhow::Result;
use chrono::NaiveDate;
use dhub_hotel_client::{
    ClientConfig, Credentials, GeoPoint, HotelApiClient, HotelApiError, HotelId, Language,
    Occupancy, SearchFilters, StayWindow,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use stub_server::{KNOWN_HOTEL, SOLD_OUT_HOTEL, StubHandle, spawn_stub};

fn creds() -> Credentials {
    Credentials::new(stub_server::API_KEY, stub_server::SECRET_KEY).unwrap()
}

fn stay() -> StayWindow {
    StayWindow::parse("2025-12-01", "2025-12-03").unwrap()
}

fn hotel_ids(payload: &str) -> Result<Vec<u64>> {
    let value: Value = serde_json::from_str(payload)?;
    Ok(value["hotels"]
        .as_array()
        .map(|hotels| hotels.iter().filter_map(|h| h["hotel_id"].as_u64()).collect())
        .unwrap_or_default())
}

async fn stub_client() -> Result<(StubHandle, HotelApiClient)> {
    let stub = spawn_stub().await?;
    let client = HotelApiClient::with_base_url(stub.url.clone());
    Ok((stub, client))
}

#[tokio::test]
async fn connect_discovers_remote_tools() -> Result<()> {
    let (_stub, client) = stub_client().await?;
    let session = client.connect().await?;

    assert_eq!(session.server_name(), stub_server::STUB_NAME);
    for name in [
        "search_hotels_by_address",
        "search_hotels_by_hotel_name",
        "get_hotel_details",
        "check_hotel_price",
    ] {
        assert!(session.has_tool(name), "missing tool {name}");
    }
    session.close().await?;
    Ok(())
}

#[tokio::test]
async fn name_search_sends_filters_and_returns_raw_payload() -> Result<()> {
    let (stub, client) = stub_client().await?;
    let session = client.connect().await?;

    let filters = SearchFilters::default()
        .language(Language::ZhCn)
        .page_size(10);
    let payload = session
        .search_hotels_by_hotel_name(&creds(), "Tokyo", stay(), filters)
        .await?;

    let ids = hotel_ids(&payload)?;
    assert!(!ids.is_empty() && ids.len() <= 10, "got {} hotels", ids.len());

    let (tool, args) = stub.server.last_call().expect("call recorded");
    assert_eq!(tool, "search_hotels_by_hotel_name");
    assert_eq!(args["keyword"], "Tokyo");
    assert_eq!(args["language"], "zh-CN");
    assert_eq!(args["page_size"], 10);
    assert_eq!(args["distance"], 5);
    assert_eq!(args["check_in_date"], "2025-12-01");
    assert_eq!(args["x_api_key"], stub_server::API_KEY);
    assert!(args.get("price_min").is_none());
    session.close().await?;
    Ok(())
}

#[tokio::test]
async fn oversized_page_is_clamped_before_sending() -> Result<()> {
    let (stub, client) = stub_client().await?;
    let session = client.connect().await?;

    let payload = session
        .search_hotels_by_hotel_name(
            &creds(),
            "Paris",
            stay(),
            SearchFilters::default().page_size(120),
        )
        .await?;

    assert_eq!(hotel_ids(&payload)?.len(), 50);
    let (_, args) = stub.server.last_call().expect("call recorded");
    assert_eq!(args["page_size"], 50);
    Ok(())
}

#[tokio::test]
async fn address_search_rounds_coordinates() -> Result<()> {
    let (stub, client) = stub_client().await?;
    let session = client.connect().await?;

    let geo = GeoPoint::new(43.885_970_44, 125.276_516_2)?;
    let filters = SearchFilters::default()
        .distance(3)
        .price_min(Some(100.0))
        .price_max(Some(800.0))
        .star_ratings(Some(vec!["4".into(), "5".into()]));
    let payload = session
        .search_hotels_by_address(&creds(), geo, stay(), filters)
        .await?;
    assert!(!hotel_ids(&payload)?.is_empty());

    let (tool, args) = stub.server.last_call().expect("call recorded");
    assert_eq!(tool, "search_hotels_by_address");
    assert_eq!(args["lat_google"], 43.88597);
    assert_eq!(args["lng_google"], 125.276516);
    assert_eq!(args["distance"], 3);
    assert_eq!(args["star_ratings"], json!(["4", "5"]));
    assert_eq!(args["price_max"], 800.0);
    Ok(())
}

#[tokio::test]
async fn details_include_facilities_or_report_not_found() -> Result<()> {
    let (_stub, client) = stub_client().await?;
    let session = client.connect().await?;

    let payload = session
        .get_hotel_details(&creds(), HotelId(KNOWN_HOTEL), Language::EnUs, true)
        .await?;
    let details: Value = serde_json::from_str(&payload)?;
    assert!(details["facilities"].is_array());

    let payload = session
        .get_hotel_details(&creds(), HotelId(KNOWN_HOTEL), Language::EnUs, false)
        .await?;
    let details: Value = serde_json::from_str(&payload)?;
    assert!(details.get("facilities").is_none());

    let err = session
        .get_hotel_details(&creds(), HotelId(1), Language::EnUs, true)
        .await
        .unwrap_err();
    assert!(matches!(err, HotelApiError::NotFound(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn price_check_returns_rates_or_upstream_error() -> Result<()> {
    let (stub, client) = stub_client().await?;
    let session = client.connect().await?;

    let occupancy = Occupancy::new(2, 1, "CN")?;
    let payload = session
        .check_hotel_price(
            &creds(),
            HotelId(KNOWN_HOTEL),
            stay(),
            occupancy.clone(),
            Language::EnUs,
        )
        .await?;
    let rates: Value = serde_json::from_str(&payload)?;
    assert!(!rates["rooms"].as_array().unwrap().is_empty());

    let (_, args) = stub.server.last_call().expect("call recorded");
    assert_eq!(args["num_of_children"], 1);
    assert_eq!(args["nationality"], "CN");

    let err = session
        .check_hotel_price(
            &creds(),
            HotelId(SOLD_OUT_HOTEL),
            stay(),
            occupancy,
            Language::EnUs,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HotelApiError::Upstream(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn wrong_credentials_are_authentication_errors() -> Result<()> {
    let (_stub, client) = stub_client().await?;
    let session = client.connect().await?;

    let bad = Credentials::new("someone", "else")?;
    let err = session
        .search_hotels_by_hotel_name(&bad, "Tokyo", stay(), SearchFilters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HotelApiError::Authentication(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn invalid_requests_never_reach_the_server() -> Result<()> {
    let (stub, client) = stub_client().await?;
    let session = client.connect().await?;

    let inverted = StayWindow {
        check_in: NaiveDate::from_ymd_opt(2025, 12, 3).unwrap(),
        check_out: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
    };
    let err = session
        .search_hotels_by_hotel_name(&creds(), "Tokyo", inverted, SearchFilters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HotelApiError::Validation(_)));

    let err = session
        .search_hotels_by_hotel_name(&creds(), "", stay(), SearchFilters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HotelApiError::Validation(_)));

    let no_adults = Occupancy {
        adults: 0,
        ..Occupancy::default()
    };
    let err = session
        .check_hotel_price(&creds(), HotelId(KNOWN_HOTEL), stay(), no_adults, Language::EnUs)
        .await
        .unwrap_err();
    assert!(matches!(err, HotelApiError::Validation(_)));

    assert!(stub.server.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn unsupported_language_is_forwarded() -> Result<()> {
    let (stub, client) = stub_client().await?;
    let session = client.connect().await?;

    session
        .get_hotel_details(&creds(), HotelId(KNOWN_HOTEL), "ja-JP".parse()?, true)
        .await?;
    let (_, args) = stub.server.last_call().expect("call recorded");
    assert_eq!(args["language"], "ja-JP");
    Ok(())
}

#[tokio::test]
async fn repeated_search_returns_same_hotels() -> Result<()> {
    let (_stub, client) = stub_client().await?;
    let session = client.connect().await?;

    let first = session
        .search_hotels_by_hotel_name(&creds(), "Tokyo", stay(), SearchFilters::default())
        .await?;
    let second = session
        .search_hotels_by_hotel_name(&creds(), "Tokyo", stay(), SearchFilters::default())
        .await?;
    assert_eq!(hotel_ids(&first)?, hotel_ids(&second)?);
    Ok(())
}

#[tokio::test]
async fn one_session_serves_concurrent_calls() -> Result<()> {
    let (stub, client) = stub_client().await?;
    let session = client.connect().await?;
    let creds = creds();

    let (names, details, price) = tokio::join!(
        session.search_hotels_by_hotel_name(&creds, "Osaka", stay(), SearchFilters::default()),
        session.get_hotel_details(&creds, HotelId(KNOWN_HOTEL), Language::ZhCn, true),
        session.check_hotel_price(
            &creds,
            HotelId(KNOWN_HOTEL),
            stay(),
            Occupancy::default(),
            Language::EnUs
        ),
    );
    names?;
    details?;
    price?;
    assert_eq!(stub.server.calls().len(), 3);
    session.close().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_session_serves_spawned_tasks() -> Result<()> {
    let (stub, client) = stub_client().await?;
    let session = Arc::new(client.connect().await?);

    let tasks: Vec<_> = ["Osaka", "Kyoto", "Nara", "Kobe"]
        .into_iter()
        .map(|keyword| {
            let session = Arc::clone(&session);
            let creds = creds();
            tokio::spawn(async move {
                session
                    .search_hotels_by_hotel_name(&creds, keyword, stay(), SearchFilters::default())
                    .await
            })
        })
        .collect();
    for task in tasks {
        let payload = task.await??;
        assert!(!hotel_ids(&payload)?.is_empty(), "payload: {payload}");
    }

    let mut keywords: Vec<String> = stub
        .server
        .calls()
        .into_iter()
        .map(|(_, args)| args["keyword"].as_str().unwrap_or_default().to_string())
        .collect();
    keywords.sort();
    assert_eq!(keywords, ["Kobe", "Kyoto", "Nara", "Osaka"]);

    let session = Arc::into_inner(session).expect("all tasks joined");
    session.close().await?;
    Ok(())
}

#[tokio::test]
async fn slow_tool_hits_request_deadline() -> Result<()> {
    let stub = spawn_stub().await?;
    let config = ClientConfig {
        request_timeout: Duration::from_millis(200),
        ..ClientConfig::with_base_url(stub.url.clone())
    };
    let session = HotelApiClient::new(config).connect().await?;

    let mut args = serde_json::Map::new();
    args.insert("millis".into(), json!(2_000));
    let err = session.call_tool("slow_tool", args).await.unwrap_err();
    assert!(matches!(err, HotelApiError::Timeout(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_fails_to_connect() -> Result<()> {
    let config = ClientConfig {
        connect_timeout: Duration::from_secs(5),
        ..ClientConfig::with_base_url(stub_server::dead_endpoint())
    };
    let err = match HotelApiClient::new(config).connect().await {
        Ok(_) => anyhow::bail!("connect to a closed port should fail"),
        Err(e) => e,
    };
    assert!(
        matches!(err, HotelApiError::Connection(_) | HotelApiError::Timeout(_)),
        "{err:?}"
    );
    Ok(())
}

// Shared test helpers for mock urlscan.io servers and entities.
//
// Each test file includes this with `mod helpers;`, so not every helper is
// used by every file.

#![allow(dead_code)]

use httptest::Server;
use serde_json::{json, Value};

use urlscan_lookup::{Config, Entity, EntityType, Integration, Options};

pub const API_KEY: &str = "test-api-key";

/// Starts an integration against the mock server with no start spacing.
pub fn integration_for(server: &Server) -> Integration {
    integration_with(server, |_| {})
}

/// Starts an integration against the mock server after adjusting the config.
pub fn integration_with(server: &Server, adjust: impl FnOnce(&mut Config)) -> Integration {
    let mut config = Config {
        base_url: format!("http://{}", server.addr()),
        min_time_ms: 0,
        ..Default::default()
    };
    adjust(&mut config);
    Integration::startup(&config).expect("Integration should start")
}

pub fn options() -> Options {
    Options {
        api_key: API_KEY.to_string(),
        ..Default::default()
    }
}

pub fn domain(value: &str) -> Entity {
    Entity::new(EntityType::Domain, value).on_demand()
}

pub fn ipv4(value: &str) -> Entity {
    Entity::new(EntityType::Ipv4, value)
}

/// Absolute URL on the mock server.
pub fn server_url(server: &Server, path: &str) -> String {
    format!("http://{}{}", server.addr(), path)
}

/// Search body with a single hit linking to a result and a screenshot on the
/// mock server.
pub fn search_hit(server: &Server, id: &str) -> Value {
    json!({
        "results": [{
            "_id": id,
            "page": {"domain": "example.com", "ip": "93.184.216.34"},
            "task": {"visibility": "public"},
            "result": server_url(server, &format!("/api/v1/result/{id}/")),
            "screenshot": server_url(server, &format!("/screenshots/{id}.png")),
        }],
        "total": 1,
        "took": 3,
        "has_more": false
    })
}

/// Scan result body with an overall verdict and three requests, two of which
/// share a referrer.
pub fn scan_result(malicious: bool) -> Value {
    json!({
        "verdicts": {"overall": {"score": if malicious { 100 } else { 0 }, "malicious": malicious}},
        "data": {
            "requests": [
                {"request": {"request": {"headers": {"Referer": "https://example.com/"}}}},
                {"request": {"request": {"headers": {"Referer": "https://example.com/"}}}},
                {"request": {"request": {"headers": {"Referer": "https://cdn.example.net/app.js"}}}},
                {"request": {"request": {"headers": {}}}}
            ]
        }
    })
}

pub fn empty_search() -> Value {
    json!({"results": [], "total": 0, "took": 1, "has_more": false})
}

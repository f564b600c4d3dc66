//! Command tests against a ledger file on disk

use std::io::Write;
use tally_limits_cli::{
    execute_check, execute_limits, execute_payments, execute_workspaces, open_facade,
    LedgerFacade, LimitsCliConfig, OutputFormat,
};
use tempfile::NamedTempFile;

const LEDGER: &str = r#"{
    "organizations": {
        "org-chained": [
            {
                "id": "p-april",
                "createdAt": "2007-03-25T09:00:00.000-0500",
                "amount": 1770,
                "validFrom": "2007-04-01T00:00:00.000-0500",
                "validUntil": "2007-04-30T23:59:59.999-0500",
                "state": "PAID",
                "serviceLevel": "BASIC",
                "users": 10,
                "currency": "CZK",
                "params": { "MAX_CREATED_RECORDS": 300, "AUDIT_DAYS": 45 }
            },
            {
                "id": "p-may",
                "createdAt": "2007-04-25T09:00:00.000-0500",
                "amount": 1770,
                "validFrom": "2007-05-01T00:00:00.000-0500",
                "validUntil": "2007-05-31T23:59:59.999-0500",
                "state": "PAID",
                "serviceLevel": "BASIC",
                "users": 10,
                "currency": "CZK"
            },
            {
                "id": "p-june",
                "createdAt": "2007-05-25T09:00:00.000-0500",
                "amount": 1770,
                "validFrom": "2007-06-01T00:00:00.000-0500",
                "validUntil": "2007-06-30T23:59:59.999-0500",
                "state": "CREATED",
                "serviceLevel": "BASIC",
                "users": 10,
                "currency": "CZK"
            }
        ],
        "org-broken": [
            {
                "id": "p-inverted",
                "createdAt": "2009-03-25T09:00:00.000+0100",
                "amount": 500,
                "validFrom": "2009-05-01T00:00:00.000+0100",
                "validUntil": "2009-04-01T00:00:00.000+0100",
                "state": "PAID",
                "serviceLevel": "BASIC",
                "currency": "EUR"
            }
        ]
    }
}"#;

struct LedgerFixture {
    // Keeps the ledger file alive for the duration of the test
    _file: NamedTempFile,
    facade: LedgerFacade,
    config: LimitsCliConfig,
}

async fn fixture() -> LedgerFixture {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(LEDGER.as_bytes()).unwrap();
    let facade = open_facade(file.path()).await.unwrap();
    LedgerFixture {
        _file: file,
        facade,
        config: LimitsCliConfig::from_lookup(|_| None),
    }
}

fn json(output: &str) -> serde_json::Value {
    serde_json::from_str(output).unwrap()
}

#[tokio::test]
async fn test_limits_follow_renewals() {
    let fixture = fixture().await;
    let output = execute_limits(
        &fixture.facade,
        "org-chained",
        Some("2007-04-15T12:00:00.000+0100"),
        OutputFormat::Json,
        &fixture.config,
    )
    .unwrap();

    let value = json(&output);
    assert_eq!(value["serviceLevel"], "BASIC");
    assert_eq!(value["validUntil"], "2007-06-01T04:59:59.999Z");
    assert_eq!(value["params"]["MAX_CREATED_RECORDS"], 300);
    assert_eq!(value["params"]["AUDIT_DAYS"], 45);
}

#[tokio::test]
async fn test_limits_outside_coverage_are_free() {
    let fixture = fixture().await;
    let output = execute_limits(
        &fixture.facade,
        "org-chained",
        Some("2007-06-15T12:00:00.000-0500"),
        OutputFormat::Human,
        &fixture.config,
    )
    .unwrap();

    assert!(output.contains("Service level: FREE"));
    assert!(output.contains("Valid until:   never"));
}

#[tokio::test]
async fn test_limits_reject_bad_instant() {
    let fixture = fixture().await;
    let error = execute_limits(
        &fixture.facade,
        "org-chained",
        Some("yesterday"),
        OutputFormat::Human,
        &fixture.config,
    )
    .unwrap_err();

    assert!(error.to_string().contains("Invalid --at instant"));
}

#[tokio::test]
async fn test_payments_newest_first() {
    let fixture = fixture().await;
    let output =
        execute_payments(&fixture.facade, "org-chained", OutputFormat::Json, &fixture.config)
            .unwrap();

    let value = json(&output);
    let ids: Vec<&str> = value["payments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|payment| payment["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["p-june", "p-may", "p-april"]);
}

#[tokio::test]
async fn test_workspaces_lists_every_organization() {
    let fixture = fixture().await;
    let output =
        execute_workspaces(&fixture.facade, OutputFormat::Json, &fixture.config).unwrap();

    let value = json(&output);
    let organizations = value.as_object().unwrap();
    assert_eq!(organizations.len(), 2);
    // All fixture payments lie in the past
    assert_eq!(value["org-chained"]["serviceLevel"], "FREE");
    assert_eq!(value["org-broken"]["serviceLevel"], "FREE");
}

#[tokio::test]
async fn test_check_reports_inverted_windows() {
    let fixture = fixture().await;
    let output = execute_check(&fixture.facade, OutputFormat::Json, &fixture.config).unwrap();

    let value = json(&output);
    let findings = value.as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["organizationId"], "org-broken");
    assert_eq!(findings[0]["payments"][0]["id"], "p-inverted");

    let human = execute_check(&fixture.facade, OutputFormat::Human, &fixture.config).unwrap();
    assert!(human.contains("p-inverted"));
    assert!(human.ends_with("Malformed payments ignored by entitlement checks: 1"));
}

#[tokio::test]
async fn test_inverted_window_never_grants() {
    let fixture = fixture().await;
    let output = execute_limits(
        &fixture.facade,
        "org-broken",
        Some("2009-04-15T12:00:00.000+0100"),
        OutputFormat::Json,
        &fixture.config,
    )
    .unwrap();

    assert_eq!(json(&output)["serviceLevel"], "FREE");
}

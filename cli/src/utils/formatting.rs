//! Output formatting utilities for the limits CLI

use crate::config::LimitsCliConfig;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use tally_entitlements::{time, ParamMap, PaymentRecord, ServiceLimits};

/// Service limits of one organization at one instant
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsReport<'a> {
    pub organization_id: &'a str,
    #[serde(with = "time::instant")]
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub limits: &'a ServiceLimits,
}

/// Malformed payments found in one organization
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MalformedPayments<'a> {
    pub organization_id: &'a str,
    pub payments: Vec<&'a PaymentRecord>,
}

fn format_params(output: &mut String, params: &ParamMap) -> Result<()> {
    if params.is_empty() {
        writeln!(output, "Parameters:    (defaults)")?;
        return Ok(());
    }
    writeln!(output, "Parameters:")?;
    for (key, value) in params {
        writeln!(output, "  {key:<30} {}", tally_entitlements::params::coerce_string(value))?;
    }
    Ok(())
}

fn format_valid_until(limits: &ServiceLimits, config: &LimitsCliConfig) -> String {
    limits
        .valid_until
        .map_or_else(|| "never".to_string(), |until| config.format_instant(&until))
}

/// Format service limits for human-readable output
pub fn format_limits_human(report: &LimitsReport<'_>, config: &LimitsCliConfig) -> Result<String> {
    let mut output = String::new();
    writeln!(output, "Organization:  {}", report.organization_id)?;
    writeln!(output, "At:            {}", config.format_instant(&report.at))?;
    writeln!(output, "Service level: {}", report.limits.service_level)?;
    writeln!(output, "Valid until:   {}", format_valid_until(report.limits, config))?;
    format_params(&mut output, &report.limits.params)?;
    Ok(output.trim_end().to_string())
}

/// Format service limits for JSON output
///
/// # Errors
///
/// Returns an error if JSON serialization fails
pub fn format_limits_json(report: &LimitsReport<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Format payments for human-readable output
pub fn format_payments_human(
    organization_id: &str,
    payments: &[PaymentRecord],
    config: &LimitsCliConfig,
) -> Result<String> {
    if payments.is_empty() {
        return Ok(format!("No payments found for organization: {organization_id}"));
    }

    let mut output = format!("Payments for organization: {organization_id}\n\n");
    writeln!(
        output,
        "{:<20} {:<22} {:<8} {:<29} {:<29} {:>10} {:<8}",
        "Payment ID", "State", "Level", "Valid from", "Valid until", "Amount", "Currency"
    )?;
    output.push_str(&"-".repeat(132));
    output.push('\n');

    for payment in payments {
        writeln!(
            output,
            "{:<20} {:<22} {:<8} {:<29} {:<29} {:>10} {:<8}",
            payment.id,
            payment.state,
            payment.service_level,
            config.format_instant(&payment.valid_from),
            config.format_instant(&payment.valid_until),
            payment.amount,
            payment.currency
        )?;
    }

    write!(output, "\nTotal payments: {}", payments.len())?;
    Ok(output)
}

/// Format payments for JSON output
///
/// # Errors
///
/// Returns an error if JSON serialization fails
pub fn format_payments_json(organization_id: &str, payments: &[PaymentRecord]) -> Result<String> {
    let json_output = serde_json::json!({
        "organizationId": organization_id,
        "payments": payments,
    });
    Ok(serde_json::to_string_pretty(&json_output)?)
}

/// Format current limits of several organizations for human-readable output
pub fn format_workspaces_human(
    limits: &BTreeMap<String, ServiceLimits>,
    config: &LimitsCliConfig,
) -> Result<String> {
    if limits.is_empty() {
        return Ok("No organizations found in ledger".to_string());
    }

    let mut output = String::new();
    writeln!(
        output,
        "{:<30} {:<8} {:<29} {}",
        "Organization", "Level", "Valid until", "Overrides"
    )?;
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for (organization_id, organization_limits) in limits {
        writeln!(
            output,
            "{:<30} {:<8} {:<29} {}",
            organization_id,
            organization_limits.service_level,
            format_valid_until(organization_limits, config),
            organization_limits.params.len()
        )?;
    }

    let paid = limits.values().filter(|limits| !limits.is_free()).count();
    write!(
        output,
        "\nTotal organizations: {} ({paid} on a paid tier)",
        limits.len()
    )?;
    Ok(output)
}

/// Format current limits of several organizations for JSON output
///
/// # Errors
///
/// Returns an error if JSON serialization fails
pub fn format_workspaces_json(limits: &BTreeMap<String, ServiceLimits>) -> Result<String> {
    Ok(serde_json::to_string_pretty(limits)?)
}

/// Format ledger check findings for human-readable output
pub fn format_check_human(
    findings: &[MalformedPayments<'_>],
    config: &LimitsCliConfig,
) -> Result<String> {
    if findings.is_empty() {
        return Ok("No malformed payment records found".to_string());
    }

    let mut output = String::new();
    let mut total = 0usize;
    for finding in findings {
        writeln!(output, "Organization: {}", finding.organization_id)?;
        for payment in &finding.payments {
            writeln!(
                output,
                "  {:<20} valid from {} is after valid until {}",
                payment.id,
                config.format_instant(&payment.valid_from),
                config.format_instant(&payment.valid_until)
            )?;
        }
        total = total.saturating_add(finding.payments.len());
    }

    write!(output, "\nMalformed payments ignored by entitlement checks: {total}")?;
    Ok(output)
}

/// Format ledger check findings for JSON output
///
/// # Errors
///
/// Returns an error if JSON serialization fails
pub fn format_check_json(findings: &[MalformedPayments<'_>]) -> Result<String> {
    Ok(serde_json::to_string_pretty(findings)?)
}

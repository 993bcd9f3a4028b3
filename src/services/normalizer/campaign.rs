//! Ads campaign payloads → `Campaign`

use serde_json::Value;

use super::{float, int, text};
use crate::types::Campaign;

const LEAD_ACTIONS: &[&str] = &["lead", "onsite_conversion.lead_grouped"];
const CONVERSION_ACTIONS: &[&str] = &[
    "offsite_conversion.fb_pixel_purchase",
    "onsite_conversion.purchase",
];

/// Insights object of a campaign. Accepts both the flattened shape
/// (`insights: {...}`) and the raw Graph API edge (`insights: {data: [{...}]}`).
fn insights_of(campaign: &Value) -> Option<&Value> {
    let insights = campaign.get("insights")?;
    match insights.get("data") {
        Some(Value::Array(rows)) => rows.first(),
        _ => insights.is_object().then_some(insights),
    }
}

/// Value of the first action whose type is in `types`; 0 when absent.
pub fn action_value(insights: Option<&Value>, types: &[&str]) -> i64 {
    insights
        .and_then(|i| i.get("actions"))
        .and_then(Value::as_array)
        .and_then(|actions| {
            actions.iter().find(|a| {
                a.get("action_type")
                    .and_then(Value::as_str)
                    .is_some_and(|t| types.contains(&t))
            })
        })
        .and_then(|a| int(a, &["value"]))
        .unwrap_or(0)
}

pub fn campaign_from_payload(campaign: &Value) -> Campaign {
    let insights = insights_of(campaign);
    let num = |key: &str| insights.and_then(|i| float(i, &[key])).unwrap_or(0.0);
    let count = |key: &str| insights.and_then(|i| int(i, &[key])).unwrap_or(0);

    Campaign {
        id: text(campaign, &["id"]).unwrap_or_default().to_string(),
        name: text(campaign, &["name"]).unwrap_or("Untitled campaign").to_string(),
        status: text(campaign, &["effective_status"])
            .map(str::to_lowercase)
            .unwrap_or_else(|| "unknown".to_string()),
        spend: num("spend"),
        impressions: count("impressions"),
        clicks: count("clicks"),
        ctr: num("ctr"),
        cpc: num("cpc"),
        cpm: num("cpm"),
        reach: count("reach"),
        leads: action_value(insights, LEAD_ACTIONS),
        conversions: action_value(insights, CONVERSION_ACTIONS),
    }
}

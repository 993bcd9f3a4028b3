//! Aggregations over normalized records
//!
//! Pure functions. Every aggregate is well-defined for an empty input:
//! counts are 0 and formatted rates are `"0.00"`.

use chrono::{DateTime, Duration, Months, Utc};

use crate::services::normalizer::{format_minutes_seconds, NormalizeContext, NOT_AVAILABLE};
use crate::types::{
    Appointment, Call, CallOutcome, CallStats, Campaign, CampaignReportResponse, CampaignStats,
    CreatePatientRequest, DashboardResponse, DashboardStats, FollowUp, FollowUpStats,
    FollowUpStatus, Lead, LeadStats, LeadStatus, Patient, PatientStats, RecentCall,
};
use crate::defaults::DASHBOARD_RECENT_ITEMS;

/// `part / whole × 100`, rounded; 0 when `whole` is 0
fn rounded_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

// ============================================================================
// Leads & follow-ups
// ============================================================================

pub fn lead_stats(leads: &[Lead]) -> LeadStats {
    let count = |status: LeadStatus| leads.iter().filter(|l| l.status == status).count();
    LeadStats {
        total: leads.len(),
        new: count(LeadStatus::New),
        contacted: count(LeadStatus::Contacted),
        qualified: count(LeadStatus::Qualified),
        converted: count(LeadStatus::Converted),
    }
}

pub fn followup_stats(followups: &[FollowUp]) -> FollowUpStats {
    let count = |status: FollowUpStatus| followups.iter().filter(|f| f.status == status).count();
    FollowUpStats {
        total: followups.len(),
        pending: count(FollowUpStatus::Pending),
        scheduled: count(FollowUpStatus::Scheduled),
        completed: count(FollowUpStatus::Completed),
        overdue: count(FollowUpStatus::Overdue),
    }
}

// ============================================================================
// Campaigns
// ============================================================================

pub fn campaign_stats(campaigns: &[Campaign]) -> CampaignStats {
    let total_spend: f64 = campaigns.iter().map(|c| c.spend).sum();
    let total_impressions: i64 = campaigns.iter().map(|c| c.impressions).sum();
    let total_clicks: i64 = campaigns.iter().map(|c| c.clicks).sum();

    let avg_ctr = if total_impressions > 0 {
        total_clicks as f64 / total_impressions as f64 * 100.0
    } else {
        0.0
    };
    let avg_cpc = if total_clicks > 0 {
        total_spend / total_clicks as f64
    } else {
        0.0
    };

    CampaignStats {
        total_spend,
        total_impressions,
        total_clicks,
        total_leads: campaigns.iter().map(|c| c.leads).sum(),
        total_reach: campaigns.iter().map(|c| c.reach).sum(),
        avg_ctr: format!("{:.2}", avg_ctr),
        avg_cpc: format!("{:.2}", avg_cpc),
    }
}

/// First campaign with the strictly highest CTR
pub fn best_ctr(campaigns: &[Campaign]) -> Option<&Campaign> {
    campaigns
        .iter()
        .fold(None, |best: Option<&Campaign>, c| match best {
            Some(b) if c.ctr <= b.ctr => Some(b),
            _ => Some(c),
        })
}

/// First campaign with the strictly highest lead count
pub fn most_leads(campaigns: &[Campaign]) -> Option<&Campaign> {
    campaigns
        .iter()
        .fold(None, |best: Option<&Campaign>, c| match best {
            Some(b) if c.leads <= b.leads => Some(b),
            _ => Some(c),
        })
}

/// Starts from the first campaign; a later one replaces it only with a
/// positive, strictly lower CPC. A zero-CPC first element therefore sticks.
pub fn lowest_cpc(campaigns: &[Campaign]) -> Option<&Campaign> {
    let (first, rest) = campaigns.split_first()?;
    Some(rest.iter().fold(first, |best, c| {
        if c.cpc > 0.0 && c.cpc < best.cpc {
            c
        } else {
            best
        }
    }))
}

pub fn campaign_report(campaigns: Vec<Campaign>) -> CampaignReportResponse {
    CampaignReportResponse {
        stats: campaign_stats(&campaigns),
        best_ctr: best_ctr(&campaigns).cloned(),
        most_leads: most_leads(&campaigns).cloned(),
        lowest_cpc: lowest_cpc(&campaigns).cloned(),
        campaigns,
    }
}

// ============================================================================
// Calls
// ============================================================================

pub fn call_stats(calls: &[Call]) -> CallStats {
    let with_status = |s: &str| calls.iter().filter(|c| c.status.as_deref() == Some(s)).count();
    let completed_calls = with_status("ended");

    let avg_duration = if calls.is_empty() {
        format_minutes_seconds(0)
    } else {
        let total_ms: i64 = calls.iter().filter_map(|c| c.duration_ms).sum();
        format_minutes_seconds(total_ms / calls.len() as i64)
    };

    CallStats {
        total_calls: calls.len(),
        completed_calls,
        active_calls: with_status("in-progress"),
        success_rate: rounded_percent(completed_calls, calls.len()),
        avg_duration,
    }
}

// ============================================================================
// Patients
// ============================================================================

/// One patient per phone number. The first call seen supplies name, email
/// and status; `lastCall` is the latest `createdAt` across the group.
pub fn group_patients(calls: &[Call], ctx: &NormalizeContext) -> Vec<Patient> {
    let mut patients: Vec<Patient> = Vec::new();

    for call in calls {
        let phone = if call.phone == NOT_AVAILABLE {
            "Unknown"
        } else {
            call.phone.as_str()
        };

        match patients.iter_mut().find(|p| p.phone == phone) {
            Some(patient) => {
                patient.total_calls += 1;
                if call.created_at > patient.last_call {
                    patient.last_call = call.created_at;
                }
            }
            None => patients.push(Patient {
                name: if call.name == "Unknown" {
                    ctx.vertical.unknown_person().to_string()
                } else {
                    call.name.clone()
                },
                phone: phone.to_string(),
                email: call.email.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                total_calls: 1,
                last_call: call.created_at,
                status: call.status.clone().unwrap_or_else(|| "unknown".to_string()),
                manual_entry: false,
                last_visit: None,
                insurance: None,
                notes: None,
            }),
        }
    }

    // Stable: equal timestamps keep first-seen order; `None` sorts last
    patients.sort_by(|a, b| b.last_call.cmp(&a.last_call));
    patients
}

pub fn patient_stats(patients: &[Patient], now: DateTime<Utc>) -> PatientStats {
    let week_ago = now - Duration::days(7);
    let month_ago = now.checked_sub_months(Months::new(1)).unwrap_or(week_ago);
    let since = |cutoff: DateTime<Utc>| {
        patients
            .iter()
            .filter(|p| p.last_call.is_some_and(|at| at > cutoff))
            .count()
    };

    PatientStats {
        total: patients.len(),
        active_this_week: since(week_ago),
        new_this_month: since(month_ago),
    }
}

/// Case-insensitive name match or plain phone substring
pub fn filter_patients(patients: Vec<Patient>, search: &str) -> Vec<Patient> {
    let needle = search.trim();
    if needle.is_empty() {
        return patients;
    }
    let lowered = needle.to_lowercase();
    patients
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&lowered) || p.phone.contains(needle))
        .collect()
}

pub fn patient_from_form(form: &CreatePatientRequest, now: DateTime<Utc>) -> Patient {
    let non_blank = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Patient {
        name: form.name.trim().to_string(),
        phone: form.phone.trim().to_string(),
        email: non_blank(&form.email).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        total_calls: 0,
        last_call: Some(now),
        status: "Active".to_string(),
        manual_entry: true,
        last_visit: non_blank(&form.last_visit),
        insurance: non_blank(&form.insurance),
        notes: non_blank(&form.notes),
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// `42s ago`, `5m ago`, `3h ago`, `2d ago`
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds().max(0);
    if seconds < 60 {
        return format!("{}s ago", seconds);
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    format!("{}d ago", hours / 24)
}

fn dashboard_outcome(call: &Call) -> &'static str {
    if call.outcome == CallOutcome::Completed {
        call.outcome.as_str()
    } else if call.status.as_deref() == Some("ended") {
        "Ended"
    } else {
        "In Progress"
    }
}

pub fn recent_call(call: &Call, now: DateTime<Utc>) -> RecentCall {
    RecentCall {
        name: call.name.clone(),
        time: call
            .created_at
            .map(|at| time_ago(at, now))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        duration: call.duration.clone(),
        outcome: dashboard_outcome(call).to_string(),
        language: call.language.clone(),
    }
}

/// Overview card data. `calls` is the most-recent-first listing.
pub fn dashboard_summary(
    calls: &[Call],
    lead_count: usize,
    appointments: &[Appointment],
    now: DateTime<Utc>,
) -> DashboardResponse {
    let stats = call_stats(calls);

    DashboardResponse {
        stats: DashboardStats {
            appointments: appointments.len(),
            leads: lead_count,
            calls: stats.total_calls,
            conversion_rate: stats.success_rate,
        },
        recent_calls: calls
            .iter()
            .take(DASHBOARD_RECENT_ITEMS)
            .map(|c| recent_call(c, now))
            .collect(),
        recent_appointments: appointments.iter().take(DASHBOARD_RECENT_ITEMS).cloned().collect(),
    }
}

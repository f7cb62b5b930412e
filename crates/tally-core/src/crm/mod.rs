//! CRM lead workflow: status changes, archiving, follow-up and conversion.

mod installments;

pub use installments::{
    remove_installment, renumber, replace_all, LeadFinancials, MonthPaymentSummary,
};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::error::WorkflowError;
use crate::models::{JobEvent, JobStatus, Lead, LeadActivity, LeadStatus, StatusChange};
use crate::session::Session;

const ARCHIVED_NOTE: &str = "ย้ายไปที่ Archive";
const UNARCHIVED_NOTE: &str = "นำออกจาก Archive แล้ว";
const NO_PACKAGE: &str = "N/A";

/// Move a lead to `new_status`.
///
/// Returns the activity record, or `None` when the lead already had that status.
pub fn change_status(
    lead: &mut Lead,
    new_status: LeadStatus,
    session: &Session,
    at: DateTime<Utc>,
) -> Result<Option<StatusChange>, WorkflowError> {
    let user_id = session.require_user()?;

    if lead.status == new_status {
        return Ok(None);
    }

    let change = StatusChange {
        lead_id: lead.id.clone(),
        old_status: lead.status,
        new_status,
        created_by: user_id.to_string(),
        created_at: at,
    };
    lead.status = new_status;

    info!("Lead {} status {} -> {}", lead.id, change.old_status, new_status);
    Ok(Some(change))
}

/// Hide a lead from the board.
pub fn archive(lead: &mut Lead, session: &Session, at: DateTime<Utc>) -> Result<LeadActivity, WorkflowError> {
    let user_id = session.require_user()?;
    lead.archived_at = Some(at);

    info!("Archived lead {}", lead.id);
    Ok(LeadActivity::new(lead.id.clone(), ARCHIVED_NOTE, user_id, at))
}

/// Put an archived lead back on the board.
pub fn unarchive(lead: &mut Lead, session: &Session, at: DateTime<Utc>) -> Result<LeadActivity, WorkflowError> {
    let user_id = session.require_user()?;
    lead.archived_at = None;

    info!("Unarchived lead {}", lead.id);
    Ok(LeadActivity::new(lead.id.clone(), UNARCHIVED_NOTE, user_id, at))
}

/// Event date has passed and the lead is still open.
pub fn needs_follow_up(lead: &Lead, today: NaiveDate) -> bool {
    match lead.event_date {
        Some(date) => date < today && !lead.status.is_closed(),
        None => false,
    }
}

/// Draft job event for a lead that has not been converted yet.
///
/// Revenue tax settings are left at their defaults; the lead's VAT mode and
/// withholding rate describe the quote, not the job.
pub fn to_job_event(lead: &Lead) -> Result<JobEvent, WorkflowError> {
    if lead.event_id.is_some() {
        return Err(WorkflowError::AlreadyConverted(lead.id.clone()));
    }

    let package = lead
        .package_name
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(NO_PACKAGE);
    let name = format!("{} — {}", lead.customer_name, package);

    let mut event = JobEvent::new(name, lead.base_price());
    event.event_date = lead.event_date;
    event.event_location = lead.event_location.clone();
    event.status = JobStatus::Draft;
    event.notes = lead.notes.clone();
    Ok(event)
}

/// Convert a lead into a job event and link it.
pub fn convert_to_event(
    lead: &mut Lead,
    event_id: impl Into<String>,
    session: &Session,
) -> Result<JobEvent, WorkflowError> {
    session.require_user()?;

    let event_id = event_id.into();
    let mut event = to_job_event(lead)?;
    event.id = Some(event_id.clone());
    lead.event_id = Some(event_id);

    info!("Converted lead {} to event {:?}", lead.id, event.id);
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn lead() -> Lead {
        let mut lead = Lead::new("lead-1", "Khun Ploy");
        lead.quoted_price = Decimal::from(30000);
        lead.package_name = Some("Photo booth".to_string());
        lead.event_date = NaiveDate::from_ymd_opt(2025, 2, 20);
        lead
    }

    #[test]
    fn test_change_status_records_activity() {
        let mut lead = lead();
        let change = change_status(&mut lead, LeadStatus::Booking, &Session::member("u1"), now())
            .unwrap()
            .unwrap();

        assert_eq!(lead.status, LeadStatus::Booking);
        assert_eq!(change.old_status, LeadStatus::Lead);
        assert_eq!(change.new_status, LeadStatus::Booking);
        assert_eq!(change.created_by, "u1");
        assert_eq!(change.description(), "สถานะเปลี่ยน: lead → booking");
    }

    #[test]
    fn test_same_status_is_noop() {
        let mut lead = lead();
        let change = change_status(&mut lead, LeadStatus::Lead, &Session::member("u1"), now()).unwrap();
        assert!(change.is_none());
    }

    #[test]
    fn test_any_status_may_follow_any_other() {
        let mut lead = lead();
        let session = Session::member("u1");
        for status in LeadStatus::ALL.into_iter().rev() {
            change_status(&mut lead, status, &session, now()).unwrap();
            assert_eq!(lead.status, status);
        }
    }

    #[test]
    fn test_change_status_requires_user() {
        let mut lead = lead();
        let err = change_status(&mut lead, LeadStatus::Booking, &Session::member(""), now()).unwrap_err();
        assert_eq!(err, WorkflowError::Unauthorized);
        assert_eq!(lead.status, LeadStatus::Lead);
    }

    #[test]
    fn test_archive_roundtrip() {
        let mut lead = lead();
        let session = Session::member("u1");
        let archived = archive(&mut lead, &session, now()).unwrap();
        assert!(lead.is_archived());
        assert_eq!(archived.lead_id, "lead-1");
        assert_eq!(archived.description, "ย้ายไปที่ Archive");
        assert_eq!(archived.created_by, "u1");

        let restored = unarchive(&mut lead, &session, now()).unwrap();
        assert!(!lead.is_archived());
        assert_eq!(restored.description, "นำออกจาก Archive แล้ว");
        assert_eq!(restored.created_at, now());
    }

    #[test]
    fn test_archive_requires_user() {
        let mut lead = lead();
        let err = archive(&mut lead, &Session::member(""), now()).unwrap_err();
        assert_eq!(err, WorkflowError::Unauthorized);
        assert!(!lead.is_archived());
    }

    #[test]
    fn test_status_change_as_activity() {
        let mut lead = lead();
        let change = change_status(&mut lead, LeadStatus::Accepted, &Session::member("u1"), now())
            .unwrap()
            .unwrap();
        let activity = LeadActivity::from(&change);
        assert_eq!(activity.description, "สถานะเปลี่ยน: lead → accepted");
        assert_eq!(activity.created_by, "u1");
    }

    #[test]
    fn test_follow_up_flag() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut lead = lead();
        assert!(needs_follow_up(&lead, today));

        lead.status = LeadStatus::Accepted;
        assert!(!needs_follow_up(&lead, today));

        lead.status = LeadStatus::Rejected;
        lead.event_date = NaiveDate::from_ymd_opt(2025, 3, 1);
        assert!(!needs_follow_up(&lead, today));

        lead.event_date = None;
        assert!(!needs_follow_up(&lead, today));
    }

    #[test]
    fn test_convert_once() {
        let mut lead = lead();
        lead.confirmed_price = Decimal::from(28000);
        let session = Session::member("u1");

        let event = convert_to_event(&mut lead, "evt-9", &session).unwrap();
        assert_eq!(event.event_name, "Khun Ploy — Photo booth");
        assert_eq!(event.revenue, Decimal::from(28000));
        assert_eq!(event.status, JobStatus::Draft);
        assert_eq!(lead.event_id.as_deref(), Some("evt-9"));

        let err = convert_to_event(&mut lead, "evt-10", &session).unwrap_err();
        assert_eq!(err, WorkflowError::AlreadyConverted("lead-1".to_string()));
    }

    #[test]
    fn test_convert_falls_back_to_quote() {
        let event = to_job_event(&lead()).unwrap();
        assert_eq!(event.revenue, Decimal::from(30000));
    }

    #[test]
    fn test_convert_without_package_keeps_default_tax() {
        let mut lead = lead();
        lead.package_name = None;
        lead.vat_mode = Some("excluded".to_string());
        lead.wht_rate = Decimal::from(3);

        let event = to_job_event(&lead).unwrap();
        assert_eq!(event.event_name, "Khun Ploy — N/A");
        assert_eq!(event.revenue_vat_mode, None);
        assert_eq!(event.revenue_wht_rate, Decimal::ZERO);
    }
}

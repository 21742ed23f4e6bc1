use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{MembershipHistoryItem, MembershipResponse, MembershipStatusResponse};
use super::repo::{Membership, MembershipStore, NewMembership, STATUS_ACTIVE, STATUS_EXPIRED};

/// Canonical active/expired predicate. The stored status field can be stale:
/// a row past its end time is expired no matter what the column says.
pub fn effective_status(m: &Membership, now: OffsetDateTime) -> &'static str {
    if m.status == STATUS_ACTIVE && now < m.ends_at {
        STATUS_ACTIVE
    } else {
        STATUS_EXPIRED
    }
}

/// Calendar-month addition with day-of-month clamping, so Jan 31 + 1 month
/// lands on the last day of February.
pub fn add_months(ts: OffsetDateTime, months: i32) -> OffsetDateTime {
    let date = ts.date();
    let total = date.year() * 12 + (date.month() as i32 - 1) + months;
    let year = total.div_euclid(12);
    let month = time::Month::try_from((total.rem_euclid(12) + 1) as u8).expect("month in 1..=12");
    let day = date.day().min(time::util::days_in_year_month(year, month));
    let new_date =
        time::Date::from_calendar_date(year, month, day).expect("clamped day is always valid");
    ts.replace_date(new_date)
}

pub async fn my_membership(
    store: &dyn MembershipStore,
    user_id: Uuid,
) -> anyhow::Result<MembershipResponse> {
    let now = OffsetDateTime::now_utc();
    let rows = store.list_by_user(user_id).await?;

    let mut current = None;
    let mut history = Vec::with_capacity(rows.len());
    for (i, m) in rows.iter().enumerate() {
        let status = effective_status(m, now).to_string();
        if i == 0 {
            current = Some(MembershipStatusResponse {
                status: status.clone(),
                plan: Some(m.plan.clone()),
                starts_at: Some(m.starts_at),
                ends_at: Some(m.ends_at),
            });
        }
        history.push(MembershipHistoryItem {
            status,
            plan: m.plan.clone(),
            starts_at: m.starts_at,
            ends_at: m.ends_at,
        });
    }

    Ok(MembershipResponse {
        current: current.unwrap_or_else(MembershipStatusResponse::expired),
        history,
    })
}

pub async fn renew(
    store: &dyn MembershipStore,
    user_id: Uuid,
    months: i32,
    plan: &str,
) -> anyhow::Result<MembershipResponse> {
    let months = if months <= 0 { 1 } else { months };
    let plan = if plan.is_empty() { "standard" } else { plan };

    let now = OffsetDateTime::now_utc();
    let ends = add_months(now, months);

    // Best-effort: a failure here leaves stale active rows behind, which the
    // effective-status predicate masks at read time.
    if let Err(e) = store.expire_active_for_user(user_id, now).await {
        warn!(error = %e, user_id = %user_id, "failed to expire previous memberships");
    }

    store
        .create(NewMembership {
            user_id,
            status: STATUS_ACTIVE.into(),
            plan: plan.into(),
            starts_at: now,
            ends_at: ends,
        })
        .await?;

    info!(user_id = %user_id, months, plan, "membership renewed");
    my_membership(store, user_id).await
}

pub async fn is_active(
    store: &dyn MembershipStore,
    user_id: Uuid,
) -> anyhow::Result<(bool, Option<Membership>)> {
    let now = OffsetDateTime::now_utc();
    match store.find_latest_by_user(user_id).await? {
        Some(m) => {
            let active = effective_status(&m, now) == STATUS_ACTIVE;
            Ok((active, Some(m)))
        }
        None => Ok((false, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::repo::testing::MemMembershipStore;
    use time::macros::datetime;
    use time::Duration;

    fn row(user_id: Uuid, status: &str, ends_in: Duration) -> Membership {
        let now = OffsetDateTime::now_utc();
        Membership {
            id: Uuid::new_v4(),
            user_id,
            status: status.into(),
            plan: "standard".into(),
            starts_at: now - Duration::days(30),
            ends_at: now + ends_in,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn effective_status_honors_stored_flag_and_end_time() {
        let user_id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let live = row(user_id, STATUS_ACTIVE, Duration::days(10));
        assert_eq!(effective_status(&live, now), STATUS_ACTIVE);

        // stored status says active but the row ran out: derived rule wins
        let stale = row(user_id, STATUS_ACTIVE, -Duration::days(1));
        assert_eq!(effective_status(&stale, now), STATUS_EXPIRED);

        let flagged = row(user_id, STATUS_EXPIRED, Duration::days(10));
        assert_eq!(effective_status(&flagged, now), STATUS_EXPIRED);
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        let jan31 = datetime!(2025-01-31 12:00 UTC);
        assert_eq!(add_months(jan31, 1).date(), time::macros::date!(2025-02-28));

        let leap = datetime!(2024-01-31 12:00 UTC);
        assert_eq!(add_months(leap, 1).date(), time::macros::date!(2024-02-29));

        let dec = datetime!(2025-12-15 08:30 UTC);
        assert_eq!(add_months(dec, 1).date(), time::macros::date!(2026-01-15));

        let year = datetime!(2025-03-10 00:00 UTC);
        assert_eq!(add_months(year, 12).date(), time::macros::date!(2026-03-10));
    }

    #[tokio::test]
    async fn my_membership_without_rows_reports_expired() {
        let store = MemMembershipStore::default();
        let resp = my_membership(&store, Uuid::new_v4()).await.unwrap();
        assert_eq!(resp.current.status, STATUS_EXPIRED);
        assert!(resp.current.plan.is_none());
        assert!(resp.history.is_empty());
    }

    #[tokio::test]
    async fn my_membership_normalizes_stale_active_rows() {
        let user_id = Uuid::new_v4();
        let store =
            MemMembershipStore::with_rows(vec![row(user_id, STATUS_ACTIVE, -Duration::days(3))]);
        let resp = my_membership(&store, user_id).await.unwrap();
        assert_eq!(resp.current.status, STATUS_EXPIRED);
        assert_eq!(resp.history.len(), 1);
        assert_eq!(resp.history[0].status, STATUS_EXPIRED);
    }

    #[tokio::test]
    async fn my_membership_picks_latest_row_as_current() {
        let user_id = Uuid::new_v4();
        let store = MemMembershipStore::with_rows(vec![
            row(user_id, STATUS_EXPIRED, -Duration::days(40)),
            row(user_id, STATUS_ACTIVE, Duration::days(20)),
        ]);
        let resp = my_membership(&store, user_id).await.unwrap();
        assert_eq!(resp.current.status, STATUS_ACTIVE);
        assert_eq!(resp.history.len(), 2);
    }

    #[tokio::test]
    async fn renew_defaults_and_expires_previous_active_rows() {
        let user_id = Uuid::new_v4();
        let store =
            MemMembershipStore::with_rows(vec![row(user_id, STATUS_ACTIVE, Duration::days(5))]);

        let resp = renew(&store, user_id, 0, "").await.unwrap();

        assert_eq!(resp.current.status, STATUS_ACTIVE);
        assert_eq!(resp.current.plan.as_deref(), Some("standard"));
        assert_eq!(resp.history.len(), 2);

        let rows = store.rows();
        let active: Vec<_> = rows.iter().filter(|r| r.status == STATUS_ACTIVE).collect();
        assert_eq!(active.len(), 1, "exactly one active row after renewal");

        // months defaulted to 1
        let now = OffsetDateTime::now_utc();
        let ends = active[0].ends_at;
        assert!(ends > now + Duration::days(27) && ends < now + Duration::days(32));
    }

    #[tokio::test]
    async fn is_active_reflects_the_derived_rule() {
        let user_id = Uuid::new_v4();

        let store = MemMembershipStore::default();
        let (active, row_opt) = is_active(&store, user_id).await.unwrap();
        assert!(!active);
        assert!(row_opt.is_none());

        let store =
            MemMembershipStore::with_rows(vec![row(user_id, STATUS_ACTIVE, -Duration::days(1))]);
        let (active, row_opt) = is_active(&store, user_id).await.unwrap();
        assert!(!active);
        assert!(row_opt.is_some());

        let store =
            MemMembershipStore::with_rows(vec![row(user_id, STATUS_ACTIVE, Duration::days(1))]);
        let (active, _) = is_active(&store, user_id).await.unwrap();
        assert!(active);
    }
}

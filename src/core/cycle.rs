//! Investment cycle business logic - the daily-contribution state machine.
//!
//! A cycle owns exactly one schedule of `duration_days` slots and the wallet
//! ledger derived from it. All schedule mutations go through
//! [`record_contribution`] or [`set_day_status`]; both run inside a database
//! transaction that also appends the ledger entry and recomputes every rollup
//! field, so the caches can never drift from the schedule. No other code path
//! may write the wallet or the rollups.

use std::collections::HashSet;

use crate::{
    entities::{
        Cycle, CycleDay, CycleDayModel, CycleModel, CycleStatus, DayStatus, EntryKind,
        WalletEntry, WalletEntryModel, cycle, cycle_day, wallet_entry,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;

/// Schedule length in days (five years including one leap day).
pub const CYCLE_DURATION_DAYS: i32 = 1826;
/// Fixed daily contribution amount in XOF.
pub const DAILY_AMOUNT: i64 = 6000;
/// Placeholder yield rate applied to the contributed total.
pub const RETURNS_RATE_PERCENT: i64 = 7;

/// Number of schedule rows inserted per batch at cycle creation.
const INSERT_CHUNK: usize = 400;

/// One generated schedule slot, before insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub day_index: i32,
    pub date: NaiveDate,
    pub amount: i64,
}

/// Result of recording a contribution.
#[derive(Debug, Clone, Serialize)]
pub struct ContributionReceipt {
    pub cycle: CycleModel,
    pub day: CycleDayModel,
    pub entry: WalletEntryModel,
}

/// Result of an administrative day-status override.
#[derive(Debug, Clone, Serialize)]
pub struct OverrideReceipt {
    pub cycle: CycleModel,
    pub day: CycleDayModel,
    /// The wallet movement the override caused, if any
    pub entry: Option<WalletEntryModel>,
}

/// Aggregated cycle view for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CycleStats {
    pub group_id: i64,
    pub status: CycleStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i32,
    pub daily_amount: i64,
    pub current_day_index: i64,
    pub next_pending_date: Option<NaiveDate>,
    pub contributed_days: i32,
    pub remaining_days: i32,
    pub missed_days: i32,
    pub total_planned: i64,
    pub total_contributed: i64,
    pub completion_percent: f64,
    pub wallet_balance: i64,
    pub current_streak: i32,
    pub best_streak: i32,
    pub last_contribution_at: Option<DateTime<Utc>>,
    pub simulated_returns: i64,
}

/// Generates the full schedule: exactly `duration` slots, one per calendar
/// day starting at `start`, day indices 1..=duration. Pure and
/// deterministic; called exactly once per cycle, at creation. There is
/// deliberately no regenerate operation: re-running this over an existing
/// schedule would silently reset recorded progress.
#[must_use]
pub fn generate_schedule(start: NaiveDate, duration: i32, daily_amount: i64) -> Vec<ScheduleSlot> {
    (1..=duration)
        .map(|day_index| ScheduleSlot {
            day_index,
            date: start + Duration::days(i64::from(day_index - 1)),
            amount: daily_amount,
        })
        .collect()
}

/// Creates the cycle and its full schedule in one transaction.
pub async fn create_cycle(
    db: &DatabaseConnection,
    group_id: i64,
    start: NaiveDate,
    daily_amount: i64,
) -> Result<CycleModel> {
    let txn = db.begin().await?;
    let created = create_cycle_with_conn(&txn, group_id, start, daily_amount).await?;
    txn.commit().await?;
    Ok(created)
}

/// Transaction-aware variant of [`create_cycle`], used by workflows that
/// create the cycle as part of a larger atomic action (admin validation,
/// payment activation).
pub async fn create_cycle_with_conn<C>(
    conn: &C,
    group_id: i64,
    start: NaiveDate,
    daily_amount: i64,
) -> Result<CycleModel>
where
    C: ConnectionTrait,
{
    if get_cycle_by_group(conn, group_id).await?.is_some() {
        return Err(Error::CycleExists { group_id });
    }

    let duration = CYCLE_DURATION_DAYS;
    let now = Utc::now();
    let cycle_model = cycle::ActiveModel {
        group_id: Set(group_id),
        start_date: Set(start),
        end_date: Set(start + Duration::days(i64::from(duration - 1))),
        duration_days: Set(duration),
        daily_amount: Set(daily_amount),
        status: Set(CycleStatus::Active),
        contributed_days: Set(0),
        remaining_days: Set(duration),
        total_contributed: Set(0),
        completion_percent: Set(0.0),
        wallet_balance: Set(0),
        current_streak: Set(0),
        best_streak: Set(0),
        missed_days: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = cycle_model.insert(conn).await?;

    let slots = generate_schedule(start, duration, daily_amount);
    for chunk in slots.chunks(INSERT_CHUNK) {
        let models: Vec<cycle_day::ActiveModel> = chunk
            .iter()
            .map(|slot| cycle_day::ActiveModel {
                cycle_id: Set(created.id),
                day_index: Set(slot.day_index),
                date: Set(slot.date),
                amount: Set(slot.amount),
                status: Set(DayStatus::Scheduled),
                ..Default::default()
            })
            .collect();
        CycleDay::insert_many(models).exec(conn).await?;
    }

    Ok(created)
}

/// Retrieves the cycle of a group.
pub async fn get_cycle_by_group<C>(conn: &C, group_id: i64) -> Result<Option<CycleModel>>
where
    C: ConnectionTrait,
{
    Cycle::find()
        .filter(cycle::Column::GroupId.eq(group_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Like [`get_cycle_by_group`] but errors when no cycle exists.
pub async fn require_cycle<C>(conn: &C, group_id: i64) -> Result<CycleModel>
where
    C: ConnectionTrait,
{
    get_cycle_by_group(conn, group_id)
        .await?
        .ok_or(Error::CycleNotFound { group_id })
}

/// Records the daily contribution for `date`.
///
/// Preconditions, checked in order: the cycle is active; a slot exists for
/// `date` (date-only comparison); that slot is not already contributed; the
/// amount equals the cycle's fixed daily amount exactly. On success the
/// slot, the ledger and every rollup field are updated in one transaction.
pub async fn record_contribution(
    db: &DatabaseConnection,
    group_id: i64,
    date: NaiveDate,
    amount: i64,
    note: Option<String>,
) -> Result<ContributionReceipt> {
    let txn = db.begin().await?;
    let receipt = record_contribution_with_conn(&txn, group_id, date, amount, note).await?;
    txn.commit().await?;
    Ok(receipt)
}

/// Transaction-aware variant of [`record_contribution`], used by payment
/// reconciliation to fund a day atomically with the payment state change.
pub async fn record_contribution_with_conn<C>(
    conn: &C,
    group_id: i64,
    date: NaiveDate,
    amount: i64,
    note: Option<String>,
) -> Result<ContributionReceipt>
where
    C: ConnectionTrait,
{
    let cycle_row = require_cycle(conn, group_id).await?;
    if cycle_row.status != CycleStatus::Active {
        return Err(Error::CycleNotActive {
            status: cycle_row.status,
        });
    }

    let day = CycleDay::find()
        .filter(cycle_day::Column::CycleId.eq(cycle_row.id))
        .filter(cycle_day::Column::Date.eq(date))
        .one(conn)
        .await?
        .ok_or(Error::InvalidInvestmentDate { date })?;

    if day.status == DayStatus::Contributed {
        return Err(Error::DuplicateContribution { date });
    }
    if amount != cycle_row.daily_amount {
        return Err(Error::WrongAmount {
            expected: cycle_row.daily_amount,
            got: amount,
        });
    }

    let mut day_active: cycle_day::ActiveModel = day.into();
    day_active.status = Set(DayStatus::Contributed);
    day_active.amount = Set(amount);
    if note.is_some() {
        day_active.note = Set(note);
    }
    let day = day_active.update(conn).await?;

    let (entry, new_balance) = append_entry(
        conn,
        cycle_row.id,
        EntryKind::Contribution,
        amount,
        format!("Daily contribution for {date}"),
        cycle_row.wallet_balance,
    )
    .await?;

    let cycle_row = refresh_rollups(conn, cycle_row, new_balance, Some(Utc::now())).await?;

    Ok(ContributionReceipt {
        cycle: cycle_row,
        day,
        entry,
    })
}

/// Administrative override of one slot's status, bypassing the amount check.
///
/// Moving a slot into contributed credits the wallet by the slot's amount;
/// moving it out of contributed debits the wallet by the recorded amount via
/// a withdrawal entry describing the reversal. A debit the balance cannot
/// cover is rejected rather than clamped.
pub async fn set_day_status(
    db: &DatabaseConnection,
    group_id: i64,
    day_index: i32,
    new_status: DayStatus,
    note: Option<String>,
) -> Result<OverrideReceipt> {
    let txn = db.begin().await?;

    let cycle_row = require_cycle(&txn, group_id).await?;
    let day = CycleDay::find()
        .filter(cycle_day::Column::CycleId.eq(cycle_row.id))
        .filter(cycle_day::Column::DayIndex.eq(day_index))
        .one(&txn)
        .await?
        .ok_or(Error::DayNotFound { day_index })?;

    let previous = day.status;
    let slot_amount = day.amount;

    let mut entry = None;
    let mut balance = cycle_row.wallet_balance;

    if new_status == DayStatus::Contributed && previous != DayStatus::Contributed {
        let (created, new_balance) = append_entry(
            &txn,
            cycle_row.id,
            EntryKind::Contribution,
            slot_amount,
            format!("Manual credit for day {day_index} ({})", day.date),
            balance,
        )
        .await?;
        entry = Some(created);
        balance = new_balance;
    } else if previous == DayStatus::Contributed && new_status != DayStatus::Contributed {
        if balance < slot_amount {
            return Err(Error::WalletUnderflow {
                balance,
                debit: slot_amount,
            });
        }
        let (created, new_balance) = append_entry(
            &txn,
            cycle_row.id,
            EntryKind::Withdrawal,
            slot_amount,
            format!("Reversal of contribution for day {day_index} ({})", day.date),
            balance,
        )
        .await?;
        entry = Some(created);
        balance = new_balance;
    }

    let mut day_active: cycle_day::ActiveModel = day.into();
    day_active.status = Set(new_status);
    if note.is_some() {
        day_active.note = Set(note);
    }
    let day = day_active.update(&txn).await?;

    let cycle_row = refresh_rollups(&txn, cycle_row, balance, None).await?;

    txn.commit().await?;
    Ok(OverrideReceipt {
        cycle: cycle_row,
        day,
        entry,
    })
}

/// Admin action on the cycle itself (suspend, cancel, reactivate).
pub async fn set_cycle_status(
    db: &DatabaseConnection,
    group_id: i64,
    status: CycleStatus,
) -> Result<CycleModel> {
    let existing = require_cycle(db, group_id).await?;
    let mut active: cycle::ActiveModel = existing.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Appends one ledger entry and returns it with the resulting balance.
/// Only [`record_contribution_with_conn`] and [`set_day_status`] call this.
async fn append_entry<C>(
    conn: &C,
    cycle_id: i64,
    kind: EntryKind,
    amount: i64,
    description: String,
    balance_before: i64,
) -> Result<(WalletEntryModel, i64)>
where
    C: ConnectionTrait,
{
    let balance_after = balance_before + kind.sign() * amount;
    let entry = wallet_entry::ActiveModel {
        cycle_id: Set(cycle_id),
        timestamp: Set(Utc::now()),
        kind: Set(kind),
        amount: Set(amount),
        description: Set(description),
        balance_after: Set(balance_after),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok((entry, balance_after))
}

/// Recomputes every derived field from the schedule and persists the cycle.
///
/// Also applies lazy completion: an active cycle whose contributed count has
/// reached the full duration is marked complete here, since no background
/// job exists to do it.
async fn refresh_rollups<C>(
    conn: &C,
    cycle_row: CycleModel,
    wallet_balance: i64,
    contribution_at: Option<DateTime<Utc>>,
) -> Result<CycleModel>
where
    C: ConnectionTrait,
{
    let contributed_dates: Vec<NaiveDate> = CycleDay::find()
        .filter(cycle_day::Column::CycleId.eq(cycle_row.id))
        .filter(cycle_day::Column::Status.eq(DayStatus::Contributed))
        .all(conn)
        .await?
        .into_iter()
        .map(|d| d.date)
        .collect();

    let missed = CycleDay::find()
        .filter(cycle_day::Column::CycleId.eq(cycle_row.id))
        .filter(cycle_day::Column::Status.eq(DayStatus::Missed))
        .count(conn)
        .await?;

    let contributed = i32::try_from(contributed_dates.len()).unwrap_or(i32::MAX);
    let duration = cycle_row.duration_days;
    let daily_amount = cycle_row.daily_amount;
    let best_streak = cycle_row.best_streak;
    let status = cycle_row.status;
    let today = Utc::now().date_naive();

    let date_set: HashSet<NaiveDate> = contributed_dates.into_iter().collect();
    let current_streak = compute_streak(&date_set, today);

    let mut active: cycle::ActiveModel = cycle_row.into();
    active.contributed_days = Set(contributed);
    active.remaining_days = Set(duration - contributed);
    active.total_contributed = Set(i64::from(contributed) * daily_amount);
    active.completion_percent = Set(f64::from(contributed) / f64::from(duration) * 100.0);
    active.wallet_balance = Set(wallet_balance);
    active.missed_days = Set(i32::try_from(missed).unwrap_or(i32::MAX));
    active.current_streak = Set(current_streak);
    if current_streak > best_streak {
        active.best_streak = Set(current_streak);
    }
    if contribution_at.is_some() {
        active.last_contribution_at = Set(contribution_at);
    }
    if contributed == duration && status == CycleStatus::Active {
        active.status = Set(CycleStatus::Complete);
    }
    active.updated_at = Set(Utc::now());

    active.update(conn).await.map_err(Into::into)
}

/// Consecutive contributed days ending today (or yesterday, so a live streak
/// survives until today's contribution lands). A contribution recorded for
/// an older date does not revive a streak separated from today by a gap.
#[must_use]
pub fn compute_streak(contributed: &HashSet<NaiveDate>, today: NaiveDate) -> i32 {
    let mut cursor = if contributed.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if contributed.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while contributed.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

/// Days elapsed since the cycle start, clamped to the schedule bounds.
#[must_use]
pub fn current_day_index(cycle_row: &CycleModel, today: NaiveDate) -> i64 {
    (today - cycle_row.start_date)
        .num_days()
        .clamp(0, i64::from(cycle_row.duration_days))
}

/// The next date a contribution is expected for, or None once the schedule
/// is exhausted.
#[must_use]
pub fn next_pending_date(cycle_row: &CycleModel, today: NaiveDate) -> Option<NaiveDate> {
    let index = current_day_index(cycle_row, today);
    if index >= i64::from(cycle_row.duration_days) {
        None
    } else {
        Some(cycle_row.start_date + Duration::days(index))
    }
}

/// Placeholder yield projection over the contributed total.
#[must_use]
pub const fn simulated_returns(total_contributed: i64) -> i64 {
    total_contributed * RETURNS_RATE_PERCENT / 100
}

/// Builds the aggregated stats view of a group's cycle.
pub async fn stats(db: &DatabaseConnection, group_id: i64) -> Result<CycleStats> {
    let cycle_row = require_cycle(db, group_id).await?;
    let today = Utc::now().date_naive();

    Ok(CycleStats {
        group_id,
        status: cycle_row.status,
        start_date: cycle_row.start_date,
        end_date: cycle_row.end_date,
        duration_days: cycle_row.duration_days,
        daily_amount: cycle_row.daily_amount,
        current_day_index: current_day_index(&cycle_row, today),
        next_pending_date: next_pending_date(&cycle_row, today),
        contributed_days: cycle_row.contributed_days,
        remaining_days: cycle_row.remaining_days,
        missed_days: cycle_row.missed_days,
        total_planned: i64::from(cycle_row.duration_days) * cycle_row.daily_amount,
        total_contributed: cycle_row.total_contributed,
        completion_percent: cycle_row.completion_percent,
        wallet_balance: cycle_row.wallet_balance,
        current_streak: cycle_row.current_streak,
        best_streak: cycle_row.best_streak,
        last_contribution_at: cycle_row.last_contribution_at,
        simulated_returns: simulated_returns(cycle_row.total_contributed),
    })
}

/// One page of the schedule, ordered by day index.
pub async fn calendar(
    db: &DatabaseConnection,
    group_id: i64,
    page: u64,
    per_page: u64,
) -> Result<(Vec<CycleDayModel>, u64)> {
    let cycle_row = require_cycle(db, group_id).await?;

    let paginator = CycleDay::find()
        .filter(cycle_day::Column::CycleId.eq(cycle_row.id))
        .order_by_asc(cycle_day::Column::DayIndex)
        .paginate(db, per_page.max(1));

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.saturating_sub(1)).await?;
    Ok((items, total))
}

/// One page of the wallet ledger, newest first.
pub async fn wallet_history(
    db: &DatabaseConnection,
    group_id: i64,
    page: u64,
    per_page: u64,
) -> Result<(Vec<WalletEntryModel>, u64)> {
    let cycle_row = require_cycle(db, group_id).await?;

    let paginator = WalletEntry::find()
        .filter(wallet_entry::Column::CycleId.eq(cycle_row.id))
        .order_by_desc(wallet_entry::Column::Id)
        .paginate(db, per_page.max(1));

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.saturating_sub(1)).await?;
    Ok((items, total))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_generate_schedule_shape() {
        let start = d(2025, 4, 1);
        let slots = generate_schedule(start, CYCLE_DURATION_DAYS, DAILY_AMOUNT);

        assert_eq!(slots.len(), 1826);
        assert_eq!(slots[0].day_index, 1);
        assert_eq!(slots[0].date, start);
        assert_eq!(slots[1825].day_index, 1826);
        assert_eq!(slots[1825].date, start + Duration::days(1825));
        assert_eq!(slots[1825].date, d(2030, 3, 31));

        // Dates strictly increase by exactly one day.
        for window in slots.windows(2) {
            assert_eq!(window[1].date - window[0].date, Duration::days(1));
        }

        let planned: i64 = slots.iter().map(|s| s.amount).sum();
        assert_eq!(planned, 10_956_000);
    }

    #[test]
    fn test_generate_schedule_deterministic() {
        let start = d(2025, 4, 1);
        assert_eq!(
            generate_schedule(start, 10, DAILY_AMOUNT),
            generate_schedule(start, 10, DAILY_AMOUNT)
        );
    }

    #[test]
    fn test_compute_streak_vs_today() {
        let today = d(2025, 6, 10);
        let mut set = HashSet::new();

        assert_eq!(compute_streak(&set, today), 0);

        // Today plus the two preceding days: streak of 3.
        set.insert(d(2025, 6, 10));
        set.insert(d(2025, 6, 9));
        set.insert(d(2025, 6, 8));
        assert_eq!(compute_streak(&set, today), 3);

        // Streak ending yesterday still counts.
        set.remove(&d(2025, 6, 10));
        assert_eq!(compute_streak(&set, today), 2);

        // A run separated from today by a gap does not.
        let mut old = HashSet::new();
        old.insert(d(2025, 6, 1));
        old.insert(d(2025, 6, 2));
        old.insert(d(2025, 6, 3));
        assert_eq!(compute_streak(&old, today), 0);
    }

    #[test]
    fn test_current_day_index_clamps() {
        let cycle_row = fake_cycle_model(d(2025, 4, 1));

        assert_eq!(current_day_index(&cycle_row, d(2025, 3, 1)), 0);
        assert_eq!(current_day_index(&cycle_row, d(2025, 4, 1)), 0);
        assert_eq!(current_day_index(&cycle_row, d(2025, 4, 11)), 10);
        assert_eq!(current_day_index(&cycle_row, d(2040, 1, 1)), 1826);
    }

    #[test]
    fn test_next_pending_date() {
        let cycle_row = fake_cycle_model(d(2025, 4, 1));

        assert_eq!(next_pending_date(&cycle_row, d(2025, 3, 1)), Some(d(2025, 4, 1)));
        assert_eq!(next_pending_date(&cycle_row, d(2025, 4, 5)), Some(d(2025, 4, 5)));
        assert_eq!(next_pending_date(&cycle_row, d(2040, 1, 1)), None);
    }

    #[test]
    fn test_simulated_returns() {
        assert_eq!(simulated_returns(0), 0);
        assert_eq!(simulated_returns(100_000), 7000);
    }

    #[tokio::test]
    async fn test_create_cycle_once_per_group() -> Result<()> {
        let (db, group) = setup_with_group().await?;
        let start = Utc::now().date_naive();

        let created = create_cycle(&db, group.id, start, DAILY_AMOUNT).await?;
        assert_eq!(created.duration_days, 1826);
        assert_eq!(created.remaining_days, 1826);
        assert_eq!(created.end_date, start + Duration::days(1825));

        let day_count = CycleDay::find()
            .filter(cycle_day::Column::CycleId.eq(created.id))
            .count(&db)
            .await?;
        assert_eq!(day_count, 1826);

        let err = create_cycle(&db, group.id, start, DAILY_AMOUNT).await.unwrap_err();
        assert!(matches!(err, Error::CycleExists { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_contribution_happy_path() -> Result<()> {
        let (db, group, cycle_row) = setup_with_cycle().await?;

        let receipt =
            record_contribution(&db, group.id, cycle_row.start_date, DAILY_AMOUNT, None).await?;

        assert_eq!(receipt.day.status, DayStatus::Contributed);
        assert_eq!(receipt.cycle.contributed_days, 1);
        assert_eq!(receipt.cycle.remaining_days, 1825);
        assert_eq!(receipt.cycle.wallet_balance, 6000);
        assert_eq!(receipt.cycle.total_contributed, 6000);
        assert!((receipt.cycle.completion_percent - 0.0548).abs() < 0.001);
        assert!(receipt.cycle.last_contribution_at.is_some());

        // Exactly one ledger entry, whose resulting balance matches.
        let entries = WalletEntry::find()
            .filter(wallet_entry::Column::CycleId.eq(cycle_row.id))
            .all(&db)
            .await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::Contribution);
        assert_eq!(entries[0].amount, 6000);
        assert_eq!(entries[0].balance_after, 6000);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_contribution_duplicate_rejected() -> Result<()> {
        let (db, group, cycle_row) = setup_with_cycle().await?;

        record_contribution(&db, group.id, cycle_row.start_date, DAILY_AMOUNT, None).await?;
        let err = record_contribution(&db, group.id, cycle_row.start_date, DAILY_AMOUNT, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateContribution { .. }));

        // Wallet unchanged by the rejected call.
        let cycle_row = require_cycle(&db, group.id).await?;
        assert_eq!(cycle_row.wallet_balance, 6000);
        assert_eq!(cycle_row.contributed_days, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_contribution_wrong_amount_rejected() -> Result<()> {
        let (db, group, cycle_row) = setup_with_cycle().await?;

        let err = record_contribution(&db, group.id, cycle_row.start_date, 500, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::WrongAmount {
                expected: 6000,
                got: 500
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_contribution_unknown_date_rejected() -> Result<()> {
        let (db, group, cycle_row) = setup_with_cycle().await?;

        let outside = cycle_row.start_date - Duration::days(30);
        let err = record_contribution(&db, group.id, outside, DAILY_AMOUNT, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInvestmentDate { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_contribution_inactive_cycle_rejected() -> Result<()> {
        let (db, group, cycle_row) = setup_with_cycle().await?;

        set_cycle_status(&db, group.id, CycleStatus::Suspended).await?;
        let err = record_contribution(&db, group.id, cycle_row.start_date, DAILY_AMOUNT, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CycleNotActive {
                status: CycleStatus::Suspended
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_contribution_note_is_attached() -> Result<()> {
        let (db, group, cycle_row) = setup_with_cycle().await?;

        let receipt = record_contribution(
            &db,
            group.id,
            cycle_row.start_date,
            DAILY_AMOUNT,
            Some("collected at the weekly meeting".to_string()),
        )
        .await?;
        assert_eq!(
            receipt.day.note.as_deref(),
            Some("collected at the weekly meeting")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_override_into_contributed_credits_wallet() -> Result<()> {
        let (db, group, _cycle_row) = setup_with_cycle().await?;

        let receipt = set_day_status(&db, group.id, 3, DayStatus::Contributed, None).await?;
        assert_eq!(receipt.cycle.wallet_balance, 6000);
        assert_eq!(receipt.cycle.contributed_days, 1);
        let entry = receipt.entry.unwrap();
        assert_eq!(entry.kind, EntryKind::Contribution);

        Ok(())
    }

    #[tokio::test]
    async fn test_override_out_of_contributed_debits_wallet() -> Result<()> {
        let (db, group, cycle_row) = setup_with_cycle().await?;

        record_contribution(&db, group.id, cycle_row.start_date, DAILY_AMOUNT, None).await?;
        let receipt = set_day_status(&db, group.id, 1, DayStatus::Missed, None).await?;

        assert_eq!(receipt.cycle.wallet_balance, 0);
        assert_eq!(receipt.cycle.contributed_days, 0);
        assert_eq!(receipt.cycle.missed_days, 1);
        let entry = receipt.entry.unwrap();
        assert_eq!(entry.kind, EntryKind::Withdrawal);
        assert_eq!(entry.balance_after, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_override_same_status_moves_no_money() -> Result<()> {
        let (db, group, _cycle_row) = setup_with_cycle().await?;

        let receipt = set_day_status(
            &db,
            group.id,
            5,
            DayStatus::Deferred,
            Some("president traveling".to_string()),
        )
        .await?;
        assert!(receipt.entry.is_none());
        assert_eq!(receipt.cycle.wallet_balance, 0);
        assert_eq!(receipt.day.note.as_deref(), Some("president traveling"));

        Ok(())
    }

    #[tokio::test]
    async fn test_override_underflow_rejected() -> Result<()> {
        let (db, group, cycle_row) = setup_with_cycle().await?;

        // Simulate imported legacy data: a day marked contributed without a
        // matching ledger credit. Reversing it must not drive the wallet
        // negative.
        let day = CycleDay::find()
            .filter(cycle_day::Column::CycleId.eq(cycle_row.id))
            .filter(cycle_day::Column::DayIndex.eq(2))
            .one(&db)
            .await?
            .unwrap();
        let mut active: cycle_day::ActiveModel = day.into();
        active.status = Set(DayStatus::Contributed);
        active.update(&db).await?;

        let err = set_day_status(&db, group.id, 2, DayStatus::Scheduled, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::WalletUnderflow {
                balance: 0,
                debit: 6000
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_wallet_history_and_calendar_paginate() -> Result<()> {
        let (db, group, cycle_row) = setup_with_cycle().await?;

        record_contribution(&db, group.id, cycle_row.start_date, DAILY_AMOUNT, None).await?;
        record_contribution(
            &db,
            group.id,
            cycle_row.start_date + Duration::days(1),
            DAILY_AMOUNT,
            None,
        )
        .await?;

        let (entries, total) = wallet_history(&db, group.id, 1, 10).await?;
        assert_eq!(total, 2);
        // Newest first.
        assert!(entries[0].id > entries[1].id);
        assert_eq!(entries[0].balance_after, 12_000);

        let (days, day_total) = calendar(&db, group.id, 1, 50).await?;
        assert_eq!(day_total, 1826);
        assert_eq!(days.len(), 50);
        assert_eq!(days[0].day_index, 1);
        assert_eq!(days[0].status, DayStatus::Contributed);

        Ok(())
    }

    #[tokio::test]
    async fn test_stats_view() -> Result<()> {
        let (db, group, cycle_row) = setup_with_cycle().await?;

        record_contribution(&db, group.id, cycle_row.start_date, DAILY_AMOUNT, None).await?;
        let view = stats(&db, group.id).await?;

        assert_eq!(view.total_planned, 10_956_000);
        assert_eq!(view.total_contributed, 6000);
        assert_eq!(view.wallet_balance, 6000);
        assert_eq!(view.daily_amount, 6000);
        assert_eq!(view.simulated_returns, 420);
        assert_eq!(view.contributed_days, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_streak_tracks_consecutive_days() -> Result<()> {
        let (db, group, cycle_row) = setup_with_cycle().await?;
        let today = Utc::now().date_naive();

        // The test cycle starts 10 days ago; contribute yesterday and today.
        let yesterday = today - Duration::days(1);
        record_contribution(&db, group.id, yesterday, DAILY_AMOUNT, None).await?;
        let receipt = record_contribution(&db, group.id, today, DAILY_AMOUNT, None).await?;
        assert_eq!(receipt.cycle.current_streak, 2);
        assert_eq!(receipt.cycle.best_streak, 2);

        // A backfilled old date with a gap to today leaves the streak alone.
        let receipt = record_contribution(
            &db,
            group.id,
            cycle_row.start_date,
            DAILY_AMOUNT,
            None,
        )
        .await?;
        assert_eq!(receipt.cycle.current_streak, 2);
        assert_eq!(receipt.cycle.contributed_days, 3);

        Ok(())
    }
}

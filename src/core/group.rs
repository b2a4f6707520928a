//! Group business logic - registration, lookup, admin status actions.
//!
//! Registration enforces the demographic-composition invariant once, at
//! creation time, and creates the group, its roster and its membership record
//! atomically. The president's identity fields are frozen afterwards;
//! [`update_group`] rejects any attempt to touch them.

use crate::{
    entities::{
        Group, GroupMember, GroupModel, GroupStatus, MemberCategory, MemberRole,
        MembershipModel, MembershipType, RegistrationStatus, group, group_member,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;

/// Minimum number of participants (roster + president).
pub const MIN_PARTICIPANTS: usize = 3;

/// President identity fields submitted at registration.
#[derive(Debug, Clone, Deserialize)]
pub struct PresidentInput {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub national_id: String,
    pub category: MemberCategory,
}

/// One roster member submitted at registration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberInput {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub role: MemberRole,
    pub category: MemberCategory,
}

/// Full registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
    pub code: String,
    pub protocol_number: String,
    pub president: PresidentInput,
    pub members: Vec<MemberInput>,
    #[serde(default = "default_membership_type")]
    pub membership_type: MembershipType,
}

const fn default_membership_type() -> MembershipType {
    MembershipType::Standard
}

/// Patch applied by [`update_group`]. President fields are present only so
/// the boundary can reject them explicitly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGroup {
    pub protocol_number: Option<String>,
    pub president_first_name: Option<String>,
    pub president_last_name: Option<String>,
    pub president_phone: Option<String>,
    pub president_address: Option<String>,
    pub president_national_id: Option<String>,
}

/// Checks the demographic-composition invariant over the full participant
/// set (roster + president).
///
/// Rules: at least [`MIN_PARTICIPANTS`] participants, and the roster must
/// include a Secretary and a Treasurer. With more than the minimum, the
/// composition must be 100% women, or women >= 62.5%, youth >= 30% and
/// men <= 7.5% of the total (women/youth rounded up, men rounded down).
pub fn validate_composition(
    president_category: MemberCategory,
    members: &[MemberInput],
) -> Result<()> {
    let total = members.len() + 1;
    if total < MIN_PARTICIPANTS {
        return Err(Error::InvalidComposition {
            reason: format!("at least {MIN_PARTICIPANTS} participants required, got {total}"),
        });
    }

    if !members.iter().any(|m| m.role == MemberRole::Secretary) {
        return Err(Error::InvalidComposition {
            reason: "a Secretary is required".to_string(),
        });
    }
    if !members.iter().any(|m| m.role == MemberRole::Treasurer) {
        return Err(Error::InvalidComposition {
            reason: "a Treasurer is required".to_string(),
        });
    }

    // Minimum-size groups are accepted regardless of demographic mix.
    if total == MIN_PARTICIPANTS {
        return Ok(());
    }

    let mut women = 0usize;
    let mut youth = 0usize;
    let mut men = 0usize;
    for category in members
        .iter()
        .map(|m| m.category)
        .chain(std::iter::once(president_category))
    {
        match category {
            MemberCategory::Woman => women += 1,
            MemberCategory::Youth => youth += 1,
            MemberCategory::Man => men += 1,
        }
    }

    if women == total {
        return Ok(());
    }

    // Thresholds in per-mille: women >= 62.5% (ceil), youth >= 30% (ceil),
    // men <= 7.5% (floor).
    let women_min = (total * 625).div_ceil(1000);
    let youth_min = (total * 300).div_ceil(1000);
    let men_max = total * 75 / 1000;

    if women < women_min {
        return Err(Error::InvalidComposition {
            reason: format!("women quota not met: {women}/{total}, need at least {women_min}"),
        });
    }
    if youth < youth_min {
        return Err(Error::InvalidComposition {
            reason: format!("youth quota not met: {youth}/{total}, need at least {youth_min}"),
        });
    }
    if men > men_max {
        return Err(Error::InvalidComposition {
            reason: format!("too many men: {men}/{total}, at most {men_max} allowed"),
        });
    }

    Ok(())
}

/// Registers a new group: composition check, then group + roster + membership
/// record inserted in one transaction.
pub async fn create_group(
    db: &DatabaseConnection,
    input: NewGroup,
) -> Result<(GroupModel, MembershipModel)> {
    validate_composition(input.president.category, &input.members)?;

    let txn = db.begin().await?;

    if Group::find()
        .filter(group::Column::Code.eq(input.code.as_str()))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(Error::GroupExists { code: input.code });
    }
    if Group::find()
        .filter(group::Column::ProtocolNumber.eq(input.protocol_number.as_str()))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(Error::GroupExists {
            code: input.protocol_number,
        });
    }

    let now = Utc::now();
    let group_model = group::ActiveModel {
        code: Set(input.code.trim().to_string()),
        protocol_number: Set(input.protocol_number.trim().to_string()),
        president_first_name: Set(input.president.first_name),
        president_last_name: Set(input.president.last_name),
        president_phone: Set(input.president.phone),
        president_address: Set(input.president.address),
        president_national_id: Set(input.president.national_id),
        president_category: Set(input.president.category),
        status: Set(GroupStatus::Pending),
        registration_status: Set(RegistrationStatus::PendingPayment),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = group_model.insert(&txn).await?;

    let members: Vec<group_member::ActiveModel> = input
        .members
        .into_iter()
        .map(|m| group_member::ActiveModel {
            group_id: Set(created.id),
            first_name: Set(m.first_name),
            last_name: Set(m.last_name),
            phone: Set(m.phone),
            role: Set(m.role),
            category: Set(m.category),
            ..Default::default()
        })
        .collect();
    GroupMember::insert_many(members).exec(&txn).await?;

    let membership = crate::core::membership::new_record(created.id, input.membership_type)
        .insert(&txn)
        .await?;

    txn.commit().await?;
    Ok((created, membership))
}

/// Retrieves one group by id.
pub async fn get_group<C>(conn: &C, id: i64) -> Result<Option<GroupModel>>
where
    C: ConnectionTrait,
{
    Group::find_by_id(id).one(conn).await.map_err(Into::into)
}

/// Like [`get_group`] but errors when the group is absent.
pub async fn require_group<C>(conn: &C, id: i64) -> Result<GroupModel>
where
    C: ConnectionTrait,
{
    get_group(conn, id)
        .await?
        .ok_or_else(|| Error::GroupNotFound { id: id.to_string() })
}

/// Retrieves one group by its registration code.
pub async fn get_group_by_code<C>(conn: &C, code: &str) -> Result<Option<GroupModel>>
where
    C: ConnectionTrait,
{
    Group::find()
        .filter(group::Column::Code.eq(code))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Retrieves the roster of a group, ordered by role then name.
pub async fn get_members<C>(conn: &C, group_id: i64) -> Result<Vec<group_member::Model>>
where
    C: ConnectionTrait,
{
    GroupMember::find()
        .filter(group_member::Column::GroupId.eq(group_id))
        .order_by_asc(group_member::Column::Role)
        .order_by_asc(group_member::Column::LastName)
        .all(conn)
        .await
        .map_err(Into::into)
}

/// Lists groups, newest first, with a total count for pagination.
pub async fn list_groups(
    db: &DatabaseConnection,
    page: u64,
    per_page: u64,
) -> Result<(Vec<GroupModel>, u64)> {
    let paginator = Group::find()
        .order_by_desc(group::Column::CreatedAt)
        .paginate(db, per_page.max(1));

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.saturating_sub(1)).await?;
    Ok((items, total))
}

/// Admin validation action: sets the authoritative group status and drives
/// the dependent membership/cycle state in one transaction.
///
/// Validation completes the verification and validation steps and creates
/// the investment cycle when none exists yet (internal/admin flow). The
/// registration status stays pending-payment until the fee is reconciled.
pub async fn set_group_status(
    db: &DatabaseConnection,
    id: i64,
    status: GroupStatus,
    actor: Option<String>,
    remarks: Option<String>,
) -> Result<GroupModel> {
    let txn = db.begin().await?;

    let existing = require_group(&txn, id).await?;
    let mut active: group::ActiveModel = existing.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    match status {
        GroupStatus::Validated => {
            crate::core::membership::set_validation(
                &txn,
                id,
                crate::entities::ValidationStatus::Validated,
                actor,
                remarks,
                None,
            )
            .await?;
            crate::core::membership::complete_step(
                &txn,
                id,
                crate::core::membership::ProcessStep::Verification,
            )
            .await?;
            crate::core::membership::complete_step(
                &txn,
                id,
                crate::core::membership::ProcessStep::Validation,
            )
            .await?;

            if crate::core::cycle::get_cycle_by_group(&txn, id).await?.is_none() {
                crate::core::cycle::create_cycle_with_conn(
                    &txn,
                    id,
                    Utc::now().date_naive(),
                    crate::core::cycle::DAILY_AMOUNT,
                )
                .await?;
            }
        }
        GroupStatus::Rejected => {
            crate::core::membership::set_validation(
                &txn,
                id,
                crate::entities::ValidationStatus::Rejected,
                actor,
                remarks,
                None,
            )
            .await?;
        }
        GroupStatus::Pending | GroupStatus::Suspended => {}
    }

    txn.commit().await?;
    Ok(updated)
}

/// Applies an update patch to a group. President identity fields are
/// immutable after creation; any attempt to change one is rejected here.
pub async fn update_group(
    db: &DatabaseConnection,
    id: i64,
    patch: UpdateGroup,
) -> Result<GroupModel> {
    if patch.president_first_name.is_some()
        || patch.president_last_name.is_some()
        || patch.president_phone.is_some()
        || patch.president_address.is_some()
        || patch.president_national_id.is_some()
    {
        return Err(Error::PresidentImmutable);
    }

    let existing = require_group(db, id).await?;
    let mut active: group::ActiveModel = existing.into();
    if let Some(protocol_number) = patch.protocol_number {
        active.protocol_number = Set(protocol_number);
    }
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Explicit admin delete: removes the group and everything hanging off it
/// (roster, membership record, cycle, schedule, ledger) in one transaction.
/// Payment transactions are kept as an audit trail.
pub async fn delete_group(db: &DatabaseConnection, id: i64) -> Result<()> {
    use crate::entities::{CycleDay, Membership, WalletEntry, cycle_day, membership, wallet_entry};

    let txn = db.begin().await?;

    let existing = require_group(&txn, id).await?;

    if let Some(cycle) = crate::core::cycle::get_cycle_by_group(&txn, id).await? {
        WalletEntry::delete_many()
            .filter(wallet_entry::Column::CycleId.eq(cycle.id))
            .exec(&txn)
            .await?;
        CycleDay::delete_many()
            .filter(cycle_day::Column::CycleId.eq(cycle.id))
            .exec(&txn)
            .await?;
        crate::entities::Cycle::delete_by_id(cycle.id).exec(&txn).await?;
    }

    Membership::delete_many()
        .filter(membership::Column::GroupId.eq(id))
        .exec(&txn)
        .await?;
    GroupMember::delete_many()
        .filter(group_member::Column::GroupId.eq(id))
        .exec(&txn)
        .await?;
    Group::delete_by_id(existing.id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

//! Alert business logic - Derives alerts from inventory state and keeps them current.
//!
//! Alerts are derived data: an item close to (or past) its expiry date, an item
//! below its product's minimum quantity, or an item the camera has not seen for a
//! while. [`scan_fridge_alerts`] raises them in one pass; [`refresh_alerts_for_item`]
//! keeps pending alerts consistent after a single quantity change without a full
//! rescan.

use crate::{
    core::product::{get_product_by_id, get_products_by_ids},
    entities::{
        Alert, InventoryItem, alert,
        alert::{AlertStatus, AlertType},
        inventory_item, product,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, instrument};

/// Items expiring within this many days raise an "expiring soon" alert.
pub const DEFAULT_EXPIRY_WARNING_DAYS: i64 = 3;

/// Items not seen for more than this many days raise a "lost item" alert.
pub const LOST_ITEM_DAYS: i64 = 14;

/// Classification of an item from its expiry date relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessStatus {
    /// Expiry date is in the past
    Expired,
    /// Expiry date is today
    ExpiresToday,
    /// Expires within the warning window
    ExpiringSoon,
    /// Expires later than the warning window
    Fresh,
    /// No expiry date set
    Unknown,
}

impl FreshnessStatus {
    /// Classifies `expiry_date` against `today`.
    #[must_use]
    pub fn from_expiry(expiry_date: Option<NaiveDate>, today: NaiveDate, warning_days: i64) -> Self {
        let Some(expiry_date) = expiry_date else {
            return Self::Unknown;
        };
        match (expiry_date - today).num_days() {
            days if days < 0 => Self::Expired,
            0 => Self::ExpiresToday,
            days if days <= warning_days => Self::ExpiringSoon,
            _ => Self::Fresh,
        }
    }

    /// The alert this status calls for, if any.
    #[must_use]
    pub const fn alert_type(self) -> Option<AlertType> {
        match self {
            Self::Expired => Some(AlertType::Expired),
            Self::ExpiresToday | Self::ExpiringSoon => Some(AlertType::ExpiringSoon),
            Self::Fresh | Self::Unknown => None,
        }
    }
}

impl fmt::Display for FreshnessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Expired => "expired",
            Self::ExpiresToday => "expires_today",
            Self::ExpiringSoon => "expiring_soon",
            Self::Fresh => "fresh",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Formats a quantity without a trailing ".0" for whole numbers.
#[must_use]
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        format!("{quantity}")
    }
}

fn plural_days(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

/// Builds the full message of an expiry-related alert.
#[must_use]
pub fn expiry_message(
    product_name: &str,
    quantity: f64,
    unit: &str,
    expiry_date: Option<NaiveDate>,
    today: NaiveDate,
    warning_days: i64,
) -> String {
    let subject = format!("{product_name} ({} {unit})", format_quantity(quantity));
    let Some(expiry) = expiry_date else {
        return format!("{subject} has no expiry date");
    };
    let days = (expiry - today).num_days();

    match FreshnessStatus::from_expiry(Some(expiry), today, warning_days) {
        FreshnessStatus::Expired => format!("{subject} expired {} ago", plural_days(-days)),
        FreshnessStatus::ExpiresToday => format!("{subject} expires today"),
        FreshnessStatus::ExpiringSoon => format!("{subject} expires in {}", plural_days(days)),
        FreshnessStatus::Fresh | FreshnessStatus::Unknown => {
            format!("{subject} keeps until {expiry}")
        }
    }
}

/// Builds the full message of a low-stock alert.
#[must_use]
pub fn low_stock_message(
    product_name: &str,
    quantity: f64,
    unit: &str,
    min_quantity: Option<f64>,
) -> String {
    let left = format!("{product_name} is running low: {} {unit} left", format_quantity(quantity));
    match min_quantity {
        Some(min) => format!("{left} (minimum {})", format_quantity(min)),
        None => left,
    }
}

/// Builds the message of a lost-item alert.
#[must_use]
pub fn lost_item_message(product_name: &str, days_unseen: i64) -> String {
    format!("{product_name} has not been seen for {}", plural_days(days_unseen))
}

/// What to do with one pending alert after a quantity change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertAction {
    /// Mark the alert resolved
    Resolve,
    /// Replace the alert message
    Rewrite(String),
    /// Leave the alert alone
    Keep,
}

/// Decides how a pending alert of `alert_type` reacts to `new_quantity`.
///
/// `product` is `None` when the item's product no longer exists; the low-stock
/// threshold is then unknown and the alert is only rewritten.
#[must_use]
pub fn reconcile(
    alert_type: AlertType,
    item: &inventory_item::Model,
    product: Option<&product::Model>,
    new_quantity: f64,
    today: NaiveDate,
    warning_days: i64,
) -> AlertAction {
    if new_quantity <= 0.0 {
        return AlertAction::Resolve;
    }

    let name = product.map_or_else(
        || format!("Unknown product #{}", item.product_id),
        |p| p.name.clone(),
    );
    let min_quantity = product.and_then(|p| p.extra.min_quantity);

    match alert_type {
        AlertType::ExpiringSoon | AlertType::Expired => AlertAction::Rewrite(expiry_message(
            &name,
            new_quantity,
            &item.unit,
            item.expiry_date,
            today,
            warning_days,
        )),
        AlertType::LowStock => match min_quantity {
            Some(min) if new_quantity > min => AlertAction::Resolve,
            _ => AlertAction::Rewrite(low_stock_message(
                &name,
                new_quantity,
                &item.unit,
                min_quantity,
            )),
        },
        AlertType::LostItem => AlertAction::Keep,
    }
}

/// Retrieves the pending alerts of a fridge, oldest first.
pub async fn get_pending_alerts<C>(db: &C, fridge_id: i64) -> Result<Vec<alert::Model>>
where
    C: ConnectionTrait,
{
    Alert::find()
        .filter(alert::Column::FridgeId.eq(fridge_id))
        .filter(alert::Column::Status.eq(AlertStatus::Pending))
        .order_by_asc(alert::Column::CreatedAt)
        .order_by_asc(alert::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the pending alerts referencing one inventory item.
pub async fn get_pending_alerts_for_item<C>(db: &C, item_id: i64) -> Result<Vec<alert::Model>>
where
    C: ConnectionTrait,
{
    Alert::find()
        .filter(alert::Column::InventoryItemId.eq(item_id))
        .filter(alert::Column::Status.eq(AlertStatus::Pending))
        .order_by_asc(alert::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Raises an alert unless an identical pending one already exists.
///
/// Returns the alert and whether it was newly inserted. At most one pending
/// alert exists per (fridge, item, type).
pub async fn raise_alert<C>(
    db: &C,
    fridge_id: i64,
    item_id: i64,
    alert_type: AlertType,
    message: String,
) -> Result<(alert::Model, bool)>
where
    C: ConnectionTrait,
{
    let existing = Alert::find()
        .filter(alert::Column::FridgeId.eq(fridge_id))
        .filter(alert::Column::InventoryItemId.eq(item_id))
        .filter(alert::Column::AlertType.eq(alert_type))
        .filter(alert::Column::Status.eq(AlertStatus::Pending))
        .one(db)
        .await?;
    if let Some(existing) = existing {
        return Ok((existing, false));
    }

    let alert = alert::ActiveModel {
        fridge_id: Set(fridge_id),
        inventory_item_id: Set(item_id),
        alert_type: Set(alert_type),
        message: Set(message),
        status: Set(AlertStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        resolved_at: Set(None),
        ..Default::default()
    };
    let alert = alert.insert(db).await?;
    debug!(alert_id = alert.id, item_id, ?alert_type, "Raised alert");
    Ok((alert, true))
}

async fn mark_resolved<C>(db: &C, alert: alert::Model) -> Result<alert::Model>
where
    C: ConnectionTrait,
{
    let mut alert: alert::ActiveModel = alert.into();
    alert.status = Set(AlertStatus::Resolved);
    alert.resolved_at = Set(Some(chrono::Utc::now()));
    alert.update(db).await.map_err(Into::into)
}

/// Marks an alert resolved. Resolving an already resolved alert is a no-op.
///
/// # Errors
/// Returns [`Error::AlertNotFound`] when the alert does not exist.
pub async fn resolve_alert(db: &DatabaseConnection, alert_id: i64) -> Result<alert::Model> {
    let alert = Alert::find_by_id(alert_id)
        .one(db)
        .await?
        .ok_or(Error::AlertNotFound { id: alert_id })?;
    if alert.status == AlertStatus::Resolved {
        return Ok(alert);
    }
    mark_resolved(db, alert).await
}

/// Brings the pending alerts of `item` in line with its new quantity.
///
/// Called after every inventory quantity change. At zero quantity every pending
/// alert of the item is resolved; otherwise expiry wording is regenerated and
/// low-stock alerts resolve once the product's minimum is exceeded. Returns the
/// number of alerts changed.
#[instrument(skip(db, item), fields(item_id = item.id))]
pub async fn refresh_alerts_for_item<C>(
    db: &C,
    item: &inventory_item::Model,
    old_quantity: f64,
    new_quantity: f64,
    today: NaiveDate,
    warning_days: i64,
) -> Result<usize>
where
    C: ConnectionTrait,
{
    let pending = get_pending_alerts_for_item(db, item.id).await?;
    if pending.is_empty() {
        return Ok(0);
    }
    let product = get_product_by_id(db, item.product_id).await?;

    let mut changed = 0;
    for alert in pending {
        match reconcile(
            alert.alert_type,
            item,
            product.as_ref(),
            new_quantity,
            today,
            warning_days,
        ) {
            AlertAction::Resolve => {
                mark_resolved(db, alert).await?;
                changed += 1;
            }
            AlertAction::Rewrite(message) if message != alert.message => {
                let mut alert: alert::ActiveModel = alert.into();
                alert.message = Set(message);
                alert.update(db).await?;
                changed += 1;
            }
            AlertAction::Rewrite(_) | AlertAction::Keep => {}
        }
    }

    debug!(old_quantity, new_quantity, changed, "Refreshed item alerts");
    Ok(changed)
}

/// Raises every alert the active items of a fridge currently call for.
///
/// Expired items supersede their pending "expiring soon" alert, which is resolved.
/// Returns the alerts newly inserted by this pass.
#[instrument(skip(db))]
pub async fn scan_fridge_alerts(
    db: &DatabaseConnection,
    fridge_id: i64,
    today: NaiveDate,
    warning_days: i64,
) -> Result<Vec<alert::Model>> {
    let items = InventoryItem::find()
        .filter(inventory_item::Column::FridgeId.eq(fridge_id))
        .filter(inventory_item::Column::Quantity.gt(0.0))
        .order_by_asc(inventory_item::Column::Id)
        .all(db)
        .await?;
    let product_ids: Vec<i64> = items.iter().map(|item| item.product_id).collect();
    let products = get_products_by_ids(db, &product_ids).await?;

    let mut raised = Vec::new();
    for item in &items {
        let product = products.get(&item.product_id);
        let name = product.map_or_else(
            || format!("Unknown product #{}", item.product_id),
            |p| p.name.clone(),
        );

        let freshness = FreshnessStatus::from_expiry(item.expiry_date, today, warning_days);
        if let Some(alert_type) = freshness.alert_type() {
            if alert_type == AlertType::Expired {
                for stale in get_pending_alerts_for_item(db, item.id).await? {
                    if stale.alert_type == AlertType::ExpiringSoon {
                        mark_resolved(db, stale).await?;
                    }
                }
            }
            let message = expiry_message(
                &name,
                item.quantity,
                &item.unit,
                item.expiry_date,
                today,
                warning_days,
            );
            let (alert, created) = raise_alert(db, fridge_id, item.id, alert_type, message).await?;
            if created {
                raised.push(alert);
            }
        }

        let min_quantity = product.and_then(|p| p.extra.min_quantity);
        if let Some(min) = min_quantity {
            if item.quantity <= min {
                let message = low_stock_message(&name, item.quantity, &item.unit, Some(min));
                let (alert, created) =
                    raise_alert(db, fridge_id, item.id, AlertType::LowStock, message).await?;
                if created {
                    raised.push(alert);
                }
            }
        }

        let days_unseen = (today - item.last_seen_at.date_naive()).num_days();
        if days_unseen > LOST_ITEM_DAYS {
            let message = lost_item_message(&name, days_unseen);
            let (alert, created) =
                raise_alert(db, fridge_id, item.id, AlertType::LostItem, message).await?;
            if created {
                raised.push(alert);
            }
        }
    }

    info!(fridge_id, items = items.len(), raised = raised.len(), "Scanned fridge alerts");
    Ok(raised)
}

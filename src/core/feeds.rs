//! Typed reads behind each portal screen. Every function builds its query,
//! awaits the data source and decodes rows into domain records.

use crate::core::query::{Direction, Query};
use crate::domain::model::{
    Appointment, Category, ChampionEntry, Commission, CommissionTotals, Meta, NewsItem,
    PeriodFilter, Profile, Sale, StatusFilter, UsefulLink,
};
use crate::domain::ports::DataSource;
use crate::utils::error::{PortalError, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

pub const NEWS_TABLE: &str = "news";
pub const CATEGORIES_TABLE: &str = "categories";
pub const COMMISSIONS_TABLE: &str = "commissions";
pub const METAS_TABLE: &str = "metas";
pub const USEFUL_LINKS_TABLE: &str = "useful_links";
pub const APPOINTMENTS_TABLE: &str = "appointments";
pub const SALES_TABLE: &str = "sales";
pub const PROFILES_TABLE: &str = "profiles";
pub const AVATARS_BUCKET: &str = "avatars";

pub const PROFILE_COLUMNS: [&str; 6] = ["id", "full_name", "email", "cpf", "role", "avatar_path"];

pub(crate) fn decode<T: DeserializeOwned>(
    table: &str,
    rows: Vec<serde_json::Value>,
) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| {
                tracing::warn!("Row from '{}' does not match the expected shape: {}", table, e);
                PortalError::SerializationError(e)
            })
        })
        .collect()
}

async fn fetch<T, D>(source: &D, query: Query) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    D: DataSource + ?Sized,
{
    let rows = source.select(&query).await?;
    decode(query.table_name(), rows)
}

fn within_period(query: Query, column: &str, period: PeriodFilter, today: NaiveDate) -> Query {
    match period.range(today) {
        Some((start, end)) => query.gte(column, start).lte(column, end),
        None => query,
    }
}

pub async fn news<D: DataSource + ?Sized>(
    source: &D,
    category_id: Option<i64>,
) -> Result<Vec<NewsItem>> {
    let mut query = Query::table(NEWS_TABLE).select(&[
        "id",
        "title",
        "summary",
        "content",
        "image_url",
        "category_id",
        "published_at",
    ]);
    if let Some(id) = category_id {
        query = query.eq("category_id", id);
    }
    fetch(source, query.order("published_at", Direction::Desc)).await
}

pub async fn categories<D: DataSource + ?Sized>(source: &D) -> Result<Vec<Category>> {
    let query = Query::table(CATEGORIES_TABLE)
        .select(&["id", "name"])
        .order("name", Direction::Asc);
    fetch(source, query).await
}

pub async fn commissions<D: DataSource + ?Sized>(
    source: &D,
    user_id: &str,
    period: PeriodFilter,
    today: NaiveDate,
) -> Result<Vec<Commission>> {
    let query = Query::table(COMMISSIONS_TABLE)
        .select(&["id", "user_id", "description", "amount", "status", "payment_date"])
        .eq("user_id", user_id);
    let query = within_period(query, "payment_date", period, today)
        .order("payment_date", Direction::Desc);
    fetch(source, query).await
}

/// Commissions for the period together with their paid and pending sums.
pub async fn commission_summary<D: DataSource + ?Sized>(
    source: &D,
    user_id: &str,
    period: PeriodFilter,
    today: NaiveDate,
) -> Result<(Vec<Commission>, CommissionTotals)> {
    let rows = commissions(source, user_id, period, today).await?;
    let totals = CommissionTotals::from_commissions(&rows);
    Ok((rows, totals))
}

pub async fn metas<D: DataSource + ?Sized>(
    source: &D,
    user_id: Option<&str>,
) -> Result<Vec<Meta>> {
    let mut query = Query::table(METAS_TABLE)
        .select(&["id", "user_id", "reference_month", "target", "achieved"]);
    if let Some(user_id) = user_id {
        query = query.eq("user_id", user_id);
    }
    fetch(source, query.order("reference_month", Direction::Desc)).await
}

pub async fn useful_links<D: DataSource + ?Sized>(source: &D) -> Result<Vec<UsefulLink>> {
    let query = Query::table(USEFUL_LINKS_TABLE)
        .select(&["id", "title", "url", "icon", "position"])
        .order("position", Direction::Asc);
    fetch(source, query).await
}

pub async fn appointments<D: DataSource + ?Sized>(
    source: &D,
    user_id: &str,
    filter: StatusFilter,
) -> Result<Vec<Appointment>> {
    let mut query = Query::table(APPOINTMENTS_TABLE)
        .select(&["id", "user_id", "client_name", "scheduled_at", "status", "notes"])
        .eq("user_id", user_id);
    if let Some(status) = filter.status() {
        query = query.eq("status", status);
    }
    fetch(source, query.order("scheduled_at", Direction::Asc)).await
}

/// Top sellers for the period, ranked by summed sale value.
pub async fn champions<D: DataSource + ?Sized>(
    source: &D,
    period: PeriodFilter,
    today: NaiveDate,
    limit: usize,
) -> Result<Vec<ChampionEntry>> {
    let query = Query::table(SALES_TABLE).select(&["seller_id", "seller_name", "value", "sold_at"]);
    let sales: Vec<Sale> = fetch(source, within_period(query, "sold_at", period, today)).await?;
    Ok(rank_champions(sales, limit))
}

pub fn rank_champions(sales: Vec<Sale>, limit: usize) -> Vec<ChampionEntry> {
    let mut by_seller: HashMap<String, ChampionEntry> = HashMap::new();
    for sale in sales {
        let entry = by_seller
            .entry(sale.seller_id.clone())
            .or_insert_with(|| ChampionEntry {
                rank: 0,
                seller_id: sale.seller_id,
                seller_name: sale.seller_name,
                total: 0.0,
                sales: 0,
            });
        entry.total += sale.value;
        entry.sales += 1;
    }

    let mut ranked: Vec<ChampionEntry> = by_seller.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.seller_name.cmp(&b.seller_name))
    });
    ranked.truncate(limit);
    for (i, entry) in ranked.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    ranked
}

pub async fn profile<D: DataSource + ?Sized>(source: &D, user_id: &str) -> Result<Profile> {
    let query = Query::table(PROFILES_TABLE)
        .select(&PROFILE_COLUMNS)
        .eq("id", user_id)
        .limit(1);
    fetch::<Profile, D>(source, query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| PortalError::NotFound {
            what: format!("Profile '{}'", user_id),
        })
}

pub fn avatar_url<D: DataSource + ?Sized>(
    source: &D,
    profile: &Profile,
) -> Result<Option<String>> {
    match profile.avatar_path.as_deref() {
        Some(path) if !path.trim().is_empty() => {
            source.public_object_url(AVATARS_BUCKET, path).map(Some)
        }
        _ => Ok(None),
    }
}

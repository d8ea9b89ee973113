use crate::core::identifier::Cpf;
use crate::utils::error::PortalError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commission {
    pub id: i64,
    pub user_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    pub status: CommissionStatus,
    pub payment_date: NaiveDate,
}

/// Paid and pending sums over a list of commissions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CommissionTotals {
    pub paid: f64,
    pub pending: f64,
}

impl CommissionTotals {
    pub fn from_commissions(commissions: &[Commission]) -> Self {
        commissions
            .iter()
            .fold(Self::default(), |mut totals, c| {
                match c.status {
                    CommissionStatus::Paid => totals.paid += c.amount,
                    CommissionStatus::Pending => totals.pending += c.amount,
                }
                totals
            })
    }

    pub fn total(&self) -> f64 {
        self.paid + self.pending
    }
}

/// Monthly sales target for a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub id: i64,
    pub user_id: String,
    pub reference_month: NaiveDate,
    pub target: f64,
    #[serde(default)]
    pub achieved: f64,
}

impl Meta {
    /// Achievement as a percentage of the target. A zero target counts as 0%.
    pub fn progress(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.achieved / self.target * 100.0).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsefulLink {
    pub id: i64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub cpf: Option<Cpf>,
    pub role: Role,
    #[serde(default)]
    pub avatar_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub user_id: String,
    pub client_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A sale row as stored remotely; only the leaderboard reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub seller_id: String,
    pub seller_name: String,
    pub value: f64,
    pub sold_at: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChampionEntry {
    pub rank: usize,
    pub seller_id: String,
    pub seller_name: String,
    pub total: f64,
    pub sales: usize,
}

macro_rules! string_enum {
    ($name:ident, $what:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = PortalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(PortalError::validation(format!(
                        "Unknown {} '{}'", $what, other
                    ))),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Canceled,
}

string_enum!(AppointmentStatus, "appointment status", {
    Pending => "pending",
    Confirmed => "confirmed",
    CheckedIn => "checked_in",
    Canceled => "canceled",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Broker,
}

string_enum!(Role, "role", {
    Admin => "admin",
    Manager => "manager",
    Broker => "broker",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AppointmentStatus),
}

impl StatusFilter {
    pub fn status(&self) -> Option<AppointmentStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(*status),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodFilter {
    Today,
    Week,
    #[default]
    Month,
    Year,
    All,
}

string_enum!(PeriodFilter, "period", {
    Today => "today",
    Week => "week",
    Month => "month",
    Year => "year",
    All => "all",
});

impl PeriodFilter {
    /// Inclusive date range containing `today`, or `None` for [`PeriodFilter::All`].
    /// Weeks start on Monday.
    pub fn range(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            PeriodFilter::Today => Some((today, today)),
            PeriodFilter::Week => {
                let start =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                Some((start, start + Duration::days(6)))
            }
            PeriodFilter::Month => {
                let start = today.with_day(1)?;
                let next = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
                };
                Some((start, next.pred_opt()?))
            }
            PeriodFilter::Year => Some((
                NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(today.year(), 12, 31)?,
            )),
            PeriodFilter::All => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_profile_cpf_is_validated() {
        let row = serde_json::json!({
            "id": "u1",
            "full_name": "Ana Souza",
            "email": "ana@metrocasa.com.br",
            "cpf": "11144477735",
            "role": "broker"
        });
        let profile: Profile = serde_json::from_value(row.clone()).unwrap();
        assert_eq!(profile.cpf.as_ref().unwrap().formatted(), "111.444.777-35");
        assert_eq!(serde_json::to_value(&profile).unwrap()["cpf"], "111.444.777-35");

        let mut bad = row;
        bad["cpf"] = serde_json::json!("111.444.777-36");
        assert!(serde_json::from_value::<Profile>(bad).is_err());
    }

    #[test]
    fn test_appointment_status_wire_form() {
        let status: AppointmentStatus = serde_json::from_str("\"checked_in\"").unwrap();
        assert_eq!(status, AppointmentStatus::CheckedIn);
        assert_eq!(status.to_string(), "checked_in");
        assert_eq!("canceled".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Canceled);
        assert!("cancelled".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "confirmed".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(AppointmentStatus::Confirmed)
        );
        assert_eq!(StatusFilter::All.status(), None);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_period_ranges() {
        // 2024-02-14 is a Wednesday in a leap year.
        let today = date(2024, 2, 14);
        assert_eq!(PeriodFilter::Today.range(today), Some((today, today)));
        assert_eq!(
            PeriodFilter::Week.range(today),
            Some((date(2024, 2, 12), date(2024, 2, 18)))
        );
        assert_eq!(
            PeriodFilter::Month.range(today),
            Some((date(2024, 2, 1), date(2024, 2, 29)))
        );
        assert_eq!(
            PeriodFilter::Year.range(today),
            Some((date(2024, 1, 1), date(2024, 12, 31)))
        );
        assert_eq!(PeriodFilter::All.range(today), None);
    }

    #[test]
    fn test_month_range_in_december() {
        assert_eq!(
            PeriodFilter::Month.range(date(2023, 12, 5)),
            Some((date(2023, 12, 1), date(2023, 12, 31)))
        );
    }

    #[test]
    fn test_commission_totals() {
        let rows = vec![
            Commission {
                id: 1,
                user_id: "u1".to_string(),
                description: None,
                amount: 100.0,
                status: CommissionStatus::Paid,
                payment_date: date(2024, 1, 10),
            },
            Commission {
                id: 2,
                user_id: "u1".to_string(),
                description: None,
                amount: 50.5,
                status: CommissionStatus::Pending,
                payment_date: date(2024, 1, 20),
            },
        ];
        let totals = CommissionTotals::from_commissions(&rows);
        assert_eq!(totals.paid, 100.0);
        assert_eq!(totals.pending, 50.5);
        assert_eq!(totals.total(), 150.5);
    }

    #[test]
    fn test_meta_progress() {
        let mut meta = Meta {
            id: 1,
            user_id: "u1".to_string(),
            reference_month: date(2024, 3, 1),
            target: 200.0,
            achieved: 50.0,
        };
        assert_eq!(meta.progress(), 25.0);
        meta.target = 0.0;
        assert_eq!(meta.progress(), 0.0);
    }
}

use crate::config::toml_config::PortalConfig;
use crate::core::feeds;
use crate::core::search::{SearchOutcome, UserSearch};
use crate::domain::model::{
    Appointment, Category, ChampionEntry, Commission, CommissionTotals, Meta, NewsItem,
    PeriodFilter, Profile, StatusFilter, UsefulLink,
};
use crate::domain::ports::DataSource;
use crate::domain::session::Session;
use crate::utils::error::{PortalError, Result};
use chrono::NaiveDate;

/// Entry point tying a data source to the signed-in session.
///
/// Reads that belong to "the current user" take the id from the session;
/// reading someone else's data is checked against the session role first.
pub struct Portal<D: DataSource + Clone> {
    source: D,
    session: Option<Session>,
    search: UserSearch<D>,
    champions_limit: usize,
}

impl<D: DataSource + Clone> Portal<D> {
    pub fn new(source: D, session: Option<Session>, config: &PortalConfig) -> Self {
        Self {
            search: UserSearch::new(source.clone(), &config.search),
            source,
            session,
            champions_limit: config.champions.limit,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or_else(|| PortalError::PermissionDenied {
            action: "read personal data without signing in".to_string(),
        })
    }

    /// The user whose data is read: `other` when given and allowed, else the session user.
    fn target_user<'a>(&'a self, other: Option<&'a str>) -> Result<&'a str> {
        let session = self.require_session()?;
        match other {
            Some(user_id) if user_id != session.user_id => {
                if session.can_view_team() {
                    Ok(user_id)
                } else {
                    Err(PortalError::PermissionDenied {
                        action: format!("view data of user '{}'", user_id),
                    })
                }
            }
            _ => Ok(&session.user_id),
        }
    }

    pub async fn news(&self, category_id: Option<i64>) -> Result<Vec<NewsItem>> {
        feeds::news(&self.source, category_id).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        feeds::categories(&self.source).await
    }

    pub async fn useful_links(&self) -> Result<Vec<UsefulLink>> {
        feeds::useful_links(&self.source).await
    }

    pub async fn commissions(
        &self,
        of: Option<&str>,
        period: PeriodFilter,
        today: NaiveDate,
    ) -> Result<(Vec<Commission>, CommissionTotals)> {
        let user_id = self.target_user(of)?;
        feeds::commission_summary(&self.source, user_id, period, today).await
    }

    /// Own targets, or everyone's when `all` is set and the role allows it.
    pub async fn metas(&self, all: bool) -> Result<Vec<Meta>> {
        let session = self.require_session()?;
        if all {
            if !session.can_view_team() {
                return Err(PortalError::PermissionDenied {
                    action: "view the team's targets".to_string(),
                });
            }
            return feeds::metas(&self.source, None).await;
        }
        feeds::metas(&self.source, Some(&session.user_id)).await
    }

    pub async fn appointments(&self, filter: StatusFilter) -> Result<Vec<Appointment>> {
        let user_id = self.target_user(None)?;
        feeds::appointments(&self.source, user_id, filter).await
    }

    pub async fn champions(
        &self,
        period: PeriodFilter,
        today: NaiveDate,
        limit: Option<usize>,
    ) -> Result<Vec<ChampionEntry>> {
        let limit = limit.unwrap_or(self.champions_limit);
        feeds::champions(&self.source, period, today, limit).await
    }

    /// Another user's CPF is only shown to admins.
    fn redact_cpf(&self, profile: &mut Profile) {
        let own = self.session.as_ref().is_some_and(|s| s.user_id == profile.id);
        let admin = self.session.as_ref().is_some_and(Session::is_admin);
        if !own && !admin {
            profile.cpf = None;
        }
    }

    /// Profile plus its public avatar URL, if any.
    pub async fn profile(&self, id: Option<&str>) -> Result<(Profile, Option<String>)> {
        let user_id = match id {
            Some(id) => id,
            None => self.require_session()?.user_id.as_str(),
        };
        let mut profile = feeds::profile(&self.source, user_id).await?;
        self.redact_cpf(&mut profile);
        let avatar = feeds::avatar_url(&self.source, &profile)?;
        Ok((profile, avatar))
    }

    pub async fn search_users(&self, term: &str) -> Result<SearchOutcome> {
        let mut outcome = self.search.search(term).await?;
        if let SearchOutcome::Results(profiles) = &mut outcome {
            profiles.iter_mut().for_each(|p| self.redact_cpf(p));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::Query;
    use crate::domain::model::Role;
    use async_trait::async_trait;

    #[derive(Clone)]
    struct EmptySource;

    #[async_trait]
    impl DataSource for EmptySource {
        async fn select(&self, _query: &Query) -> Result<Vec<serde_json::Value>> {
            Ok(Vec::new())
        }

        fn public_object_url(&self, bucket: &str, path: &str) -> Result<String> {
            Ok(format!("{}/{}", bucket, path))
        }
    }

    #[derive(Clone)]
    struct ProfileSource;

    #[async_trait]
    impl DataSource for ProfileSource {
        async fn select(&self, _query: &Query) -> Result<Vec<serde_json::Value>> {
            Ok(vec![serde_json::json!({
                "id": "u2",
                "full_name": "Bruno Lima",
                "email": "bruno@metrocasa.com.br",
                "cpf": "529.982.247-25",
                "role": "broker"
            })])
        }

        fn public_object_url(&self, bucket: &str, path: &str) -> Result<String> {
            Ok(format!("{}/{}", bucket, path))
        }
    }

    fn config() -> PortalConfig {
        PortalConfig::from_toml_str("[api]\nurl = \"http://localhost\"\nanon_key = \"anon\"\n")
            .unwrap()
    }

    fn portal(role: Option<Role>) -> Portal<EmptySource> {
        let session = role.map(|role| Session::new("u1", "jwt", role));
        Portal::new(EmptySource, session, &config())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[tokio::test]
    async fn test_broker_cannot_read_other_commissions() {
        let portal = portal(Some(Role::Broker));
        let err = portal
            .commissions(Some("u2"), PeriodFilter::Month, today())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::PermissionDenied { .. }));

        // Asking for one's own id is always allowed.
        assert!(portal
            .commissions(Some("u1"), PeriodFilter::Month, today())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_manager_reads_team_data() {
        let portal = portal(Some(Role::Manager));
        let (rows, totals) = portal
            .commissions(Some("u2"), PeriodFilter::Year, today())
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(totals.total(), 0.0);
        assert!(portal.metas(true).await.is_ok());
    }

    #[tokio::test]
    async fn test_personal_reads_need_a_session() {
        let portal = portal(None);
        assert!(portal.session().is_none());
        assert!(matches!(
            portal.appointments(StatusFilter::All).await,
            Err(PortalError::PermissionDenied { .. })
        ));
        assert!(matches!(
            portal.profile(None).await,
            Err(PortalError::PermissionDenied { .. })
        ));
        // Public feeds work without one.
        assert!(portal.news(None).await.unwrap().is_empty());
        assert!(portal.champions(PeriodFilter::All, today(), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_other_users_cpf_is_admin_only() {
        let as_role = |role| {
            Portal::new(
                ProfileSource,
                Some(Session::new("u1", "jwt", role)),
                &config(),
            )
        };

        let (profile, _) = as_role(Role::Admin).profile(Some("u2")).await.unwrap();
        assert_eq!(profile.cpf.unwrap().digits(), "52998224725");

        let (profile, _) = as_role(Role::Manager).profile(Some("u2")).await.unwrap();
        assert!(profile.cpf.is_none());

        let own = Portal::new(
            ProfileSource,
            Some(Session::new("u2", "jwt", Role::Broker)),
            &config(),
        );
        let (profile, _) = own.profile(None).await.unwrap();
        assert!(profile.cpf.is_some());

        let found = as_role(Role::Broker).search_users("bruno").await.unwrap();
        assert!(found.results().unwrap()[0].cpf.is_none());
    }
}

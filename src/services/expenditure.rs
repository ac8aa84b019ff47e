//! Expenditure service
//!
//! Manual entry and paged listing of expenditures.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{YabaError, YabaResult};
use crate::models::{Expenditure, Money, OwnerId};
use crate::storage::{ExpenditureQuery, PersistenceGateway};

use super::classification::ClassificationService;

/// A manually entered expenditure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenditureInput {
    /// `YYYY-MM-DD`
    pub date: String,
    pub amount: Money,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub budget_category: Option<String>,
    #[serde(default)]
    pub reward_category: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl ExpenditureInput {
    fn into_expenditure(self, owner: OwnerId) -> YabaResult<Expenditure> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            YabaError::Validation(format!(
                "date '{}' must have format YYYY-MM-DD",
                self.date
            ))
        })?;

        let text = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
        let mut expenditure = Expenditure::with_details(
            owner,
            date,
            self.amount,
            text(self.name),
            text(self.budget_category),
            text(self.source),
        );
        expenditure.method = self.method.filter(|m| !m.trim().is_empty());
        expenditure.reward_category = self
            .reward_category
            .map(|r| r.trim().to_uppercase())
            .filter(|r| !r.is_empty());
        expenditure.comment = text(self.comment);
        Ok(expenditure)
    }
}

/// Filters for listing expenditures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Defaults to the beginning of time
    pub since: Option<NaiveDate>,
    /// Defaults to today
    pub until: Option<NaiveDate>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Service for expenditure management
pub struct ExpenditureService<'a> {
    gateway: &'a dyn PersistenceGateway,
    default_limit: usize,
}

impl<'a> ExpenditureService<'a> {
    /// Create a new expenditure service
    pub fn new(gateway: &'a dyn PersistenceGateway, default_limit: usize) -> Self {
        Self {
            gateway,
            default_limit,
        }
    }

    /// Store manually entered expenditures, classified like uploads
    ///
    /// Nothing is stored if any entry is invalid.
    pub fn create(&self, owner: OwnerId, inputs: Vec<ExpenditureInput>) -> YabaResult<usize> {
        let expenditures = inputs
            .into_iter()
            .map(|input| input.into_expenditure(owner))
            .collect::<YabaResult<Vec<_>>>()?;

        ClassificationService::new(self.gateway).persist(owner, expenditures)
    }

    /// List expenditures, newest first
    pub fn list(&self, owner: OwnerId, options: &ListOptions) -> YabaResult<Vec<Expenditure>> {
        let until = options.until.unwrap_or_else(|| Local::now().date_naive());
        if let Some(since) = options.since {
            if since > until {
                return Err(YabaError::Validation(format!(
                    "start date {} is after end date {}",
                    since, until
                )));
            }
        }

        let mut query = ExpenditureQuery::for_owner(owner)
            .between(options.since, Some(until))
            .page(
                options.offset.unwrap_or(0),
                options.limit.unwrap_or(self.default_limit),
            );
        if let Some(source) = &options.source {
            query = query.source(source.clone());
        }
        if let Some(category) = &options.category {
            query = query.category(category);
        }

        self.gateway.query_expenditures(&query)
    }
}

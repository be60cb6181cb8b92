//! Cloud Billing Budget API (v1) resources, in their REST JSON form.
//!
//! `Money::units` is an int64 and the JSON mapping renders 64-bit integers as strings.

use crate::description::DescriptionInfo;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Budget {
    /// Resource name assigned by the API, `billingAccounts/{id}/budgets/{budget}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub display_name: String,
    pub budget_filter: Filter,
    pub amount: BudgetAmount,
    pub notifications_rule: NotificationsRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl Budget {
    /// A budget that resets every calendar month and counts all credits.
    pub fn monthly(display_name: &str, currency_code: &str, units: i64) -> Self {
        Self {
            name: None,
            display_name: display_name.to_owned(),
            budget_filter: Filter {
                credit_types_treatment: CreditTypesTreatment::IncludeAllCredits,
                calendar_period: Some(CalendarPeriod::Month),
            },
            amount: BudgetAmount {
                specified_amount: Some(Money {
                    currency_code: currency_code.to_owned(),
                    units,
                    nanos: 0,
                }),
            },
            notifications_rule: NotificationsRule {
                disable_default_iam_recipients: true,
            },
            etag: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filter {
    pub credit_types_treatment: CreditTypesTreatment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_period: Option<CalendarPeriod>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditTypesTreatment {
    #[default]
    CreditTypesTreatmentUnspecified,
    IncludeAllCredits,
    ExcludeAllCredits,
    IncludeSpecifiedCredits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalendarPeriod {
    CalendarPeriodUnspecified,
    Month,
    Quarter,
    Year,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetAmount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specified_amount: Option<Money>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Money {
    pub currency_code: String,
    #[serde_as(as = "DisplayFromStr")]
    pub units: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub nanos: i32,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationsRule {
    pub disable_default_iam_recipients: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateBudgetRequest {
    /// `billingAccounts/{billing_account_id}`
    pub parent: String,
    pub budget: Budget,
}

impl CreateBudgetRequest {
    pub fn new(info: &DescriptionInfo, currency_code: &str) -> Self {
        Self {
            parent: format!("billingAccounts/{}", info.billing_account_id),
            budget: Budget::monthly(&info.project_id, currency_code, info.budget),
        }
    }

    pub fn currency_code(&self) -> Option<&str> {
        self.budget
            .amount
            .specified_amount
            .as_ref()
            .map(|money| money.currency_code.as_str())
    }

    pub fn units(&self) -> Option<i64> {
        self.budget
            .amount
            .specified_amount
            .as_ref()
            .map(|money| money.units)
    }
}

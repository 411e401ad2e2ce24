//! Customer records as maintained by upstream systems.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::CompareField;

/// One row of `CUSTOMERS`. Read-only from this application's perspective.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
  pub customer_id:        String,
  pub first_name:         Option<String>,
  pub last_name:          Option<String>,
  pub email:              Option<String>,
  pub phone:              Option<String>,
  pub date_of_birth:      Option<NaiveDate>,
  pub address_line1:      Option<String>,
  pub address_line2:      Option<String>,
  pub city:               Option<String>,
  pub postal_code:        Option<String>,
  pub country:            Option<String>,
  pub account_status:     Option<String>,
  pub account_type:       Option<String>,
  pub source_system:      Option<String>,
  pub created_date:       Option<DateTime<Utc>>,
  pub total_transactions: Option<i64>,
  pub account_balance:    Option<f64>,
}

impl Customer {
  pub fn new(customer_id: impl Into<String>) -> Self {
    Self { customer_id: customer_id.into(), ..Self::default() }
  }

  /// `FIRST_NAME || ' ' || LAST_NAME`, skipping missing parts.
  pub fn full_name(&self) -> String {
    [self.first_name.as_deref(), self.last_name.as_deref()]
      .into_iter()
      .flatten()
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// Full-precision value of a comparable field, used for comparison.
  /// Differs from [`Customer::field_text`] only where the display shortens.
  pub fn field_value(&self, field: CompareField) -> Option<String> {
    match field {
      CompareField::CreatedDate => self
        .created_date
        .map(|d| d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
      CompareField::AccountBalance => self.account_balance.map(|b| b.to_string()),
      _ => self.field_text(field),
    }
  }

  /// Display text of a comparable field; `None` when the column is null.
  pub fn field_text(&self, field: CompareField) -> Option<String> {
    match field {
      CompareField::CustomerId => Some(self.customer_id.clone()),
      CompareField::FirstName => self.first_name.clone(),
      CompareField::LastName => self.last_name.clone(),
      CompareField::Email => self.email.clone(),
      CompareField::Phone => self.phone.clone(),
      CompareField::DateOfBirth => {
        self.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string())
      }
      CompareField::AddressLine1 => self.address_line1.clone(),
      CompareField::AddressLine2 => self.address_line2.clone(),
      CompareField::City => self.city.clone(),
      CompareField::PostalCode => self.postal_code.clone(),
      CompareField::AccountStatus => self.account_status.clone(),
      CompareField::AccountType => self.account_type.clone(),
      CompareField::SourceSystem => self.source_system.clone(),
      CompareField::CreatedDate => {
        self.created_date.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
      }
      CompareField::TotalTransactions => {
        self.total_transactions.map(|n| n.to_string())
      }
      CompareField::AccountBalance => {
        self.account_balance.map(|b| format!("{b:.2}"))
      }
    }
  }
}

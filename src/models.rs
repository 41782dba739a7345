use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FundError;

#[derive(Debug, Clone, PartialEq)]
pub struct Donor {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    /// Default monthly pledge. `None` keeps the donor out of monthly reconciliation.
    pub pledge: Option<f64>,
    pub notes: String,
    pub created_at: String,
}

impl Donor {
    pub fn has_pledge(&self) -> bool {
        self.pledge.is_some_and(|p| p > 0.0)
    }
}

/// A donation's link to its donor, resolved once when records are loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum DonorRef {
    Anonymous,
    /// The stored id no longer matches a donor (donor was deleted).
    Unresolved(String),
    Resolved(Donor),
}

impl DonorRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Unresolved(id) => Some(id),
            Self::Resolved(d) => Some(&d.id),
        }
    }

    pub fn donor(&self) -> Option<&Donor> {
        match self {
            Self::Resolved(d) => Some(d),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Anonymous => "Anonymous",
            Self::Unresolved(_) => "Unknown Donor",
            Self::Resolved(d) => &d.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Bank,
    Wallet,
    Monthly,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [Self::Cash, Self::Bank, Self::Wallet, Self::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Wallet => "wallet",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = FundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| FundError::validation(format!("Unknown payment method: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Donation {
    pub id: String,
    pub donor: DonorRef,
    pub amount: f64,
    pub date: NaiveDate,
    pub month: u32,
    pub year: i32,
    pub payment_method: PaymentMethod,
    pub is_monthly: bool,
    pub notes: String,
    pub created_at: String,
}

impl Donation {
    /// Whether this donation satisfies the monthly pledge for `(month, year)`.
    pub fn is_monthly_payment_for(&self, month: u32, year: i32) -> bool {
        self.is_monthly && self.month == month && self.year == year
    }
}

/// Donation fields supplied by the operator (or the reconciler) before insert.
#[derive(Debug, Clone, Default)]
pub struct NewDonation {
    pub donor_id: Option<String>,
    pub amount: f64,
    pub date: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub payment_method: Option<PaymentMethod>,
    pub is_monthly: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseCategory {
    Bills,
    Salary,
    Repair,
    Maintenance,
    Food,
    Supplies,
    Utilities,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        Self::Bills,
        Self::Salary,
        Self::Repair,
        Self::Maintenance,
        Self::Food,
        Self::Supplies,
        Self::Utilities,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bills => "bills",
            Self::Salary => "salary",
            Self::Repair => "repair",
            Self::Maintenance => "maintenance",
            Self::Food => "food",
            Self::Supplies => "supplies",
            Self::Utilities => "utilities",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = FundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| FundError::validation(format!("Unknown expense category: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub description: String,
    pub date: NaiveDate,
    pub month: u32,
    pub year: i32,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceKind {
    Opening,
    Adjustment,
}

impl BalanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for BalanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BalanceKind {
    type Err = FundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "opening" => Ok(Self::Opening),
            "adjustment" => Ok(Self::Adjustment),
            _ => Err(FundError::validation(format!("Unknown balance type: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub id: String,
    pub kind: BalanceKind,
    pub amount: f64,
    pub date: NaiveDate,
    pub notes: String,
    pub created_at: String,
}

/// The minimal profile returned by a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donor(pledge: Option<f64>) -> Donor {
        Donor {
            id: "d1".into(),
            name: "Aisha".into(),
            phone: String::new(),
            address: String::new(),
            pledge,
            notes: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_has_pledge() {
        assert!(donor(Some(500.0)).has_pledge());
        assert!(!donor(Some(0.0)).has_pledge());
        assert!(!donor(None).has_pledge());
    }

    #[test]
    fn test_donor_ref_names() {
        assert_eq!(DonorRef::Anonymous.display_name(), "Anonymous");
        assert_eq!(DonorRef::Unresolved("x".into()).display_name(), "Unknown Donor");
        assert_eq!(DonorRef::Resolved(donor(None)).display_name(), "Aisha");
        assert_eq!(DonorRef::Unresolved("x".into()).id(), Some("x"));
        assert_eq!(DonorRef::Anonymous.id(), None);
    }

    #[test]
    fn test_parse_payment_method() {
        assert_eq!("Monthly".parse::<PaymentMethod>().unwrap(), PaymentMethod::Monthly);
        assert_eq!(" bank ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Bank);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_parse_expense_category() {
        assert_eq!("FOOD".parse::<ExpenseCategory>().unwrap(), ExpenseCategory::Food);
        assert!("travel".parse::<ExpenseCategory>().is_err());
    }

    #[test]
    fn test_parse_balance_kind() {
        assert_eq!("opening".parse::<BalanceKind>().unwrap(), BalanceKind::Opening);
        assert!("closing".parse::<BalanceKind>().is_err());
    }
}

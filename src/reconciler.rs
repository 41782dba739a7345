use chrono::Local;
use rusqlite::Connection;

use crate::error::{FundError, Result};
use crate::models::{Donation, Donor, DonorRef, NewDonation, PaymentMethod};
use crate::store::{donations, donors, validate_period};

/// A roster donor together with the donation that satisfied their pledge.
#[derive(Debug, Clone, PartialEq)]
pub struct PaidDonor {
    pub donor: Donor,
    pub donation: Donation,
}

pub struct Reconciliation {
    pub month: u32,
    pub year: i32,
    pub paid: Vec<PaidDonor>,
    pub unpaid: Vec<Donor>,
    /// Sum of every monthly payment recorded for the period.
    pub total_collected: f64,
}

/// Donors with a positive monthly pledge, in their original order.
pub fn monthly_roster(all: Vec<Donor>) -> Vec<Donor> {
    all.into_iter().filter(Donor::has_pledge).collect()
}

// First match wins if an operator entered more than one payment for a period.
fn find_payment<'a>(
    donor: &Donor,
    donations: &'a [Donation],
    month: u32,
    year: i32,
) -> Option<&'a Donation> {
    donations
        .iter()
        .find(|d| d.is_monthly_payment_for(month, year) && d.donor.id() == Some(donor.id.as_str()))
}

pub fn compute_paid_donors(
    roster: &[Donor],
    donations: &[Donation],
    month: u32,
    year: i32,
) -> Vec<PaidDonor> {
    roster
        .iter()
        .filter_map(|donor| {
            find_payment(donor, donations, month, year).map(|donation| PaidDonor {
                donor: donor.clone(),
                donation: Donation {
                    donor: DonorRef::Resolved(donor.clone()),
                    ..donation.clone()
                },
            })
        })
        .collect()
}

pub fn compute_unpaid_donors(
    roster: &[Donor],
    donations: &[Donation],
    month: u32,
    year: i32,
) -> Vec<Donor> {
    roster
        .iter()
        .filter(|donor| find_payment(donor, donations, month, year).is_none())
        .cloned()
        .collect()
}

pub fn reconcile(roster: &[Donor], donations: &[Donation], month: u32, year: i32) -> Reconciliation {
    let paid = compute_paid_donors(roster, donations, month, year);
    let unpaid = compute_unpaid_donors(roster, donations, month, year);
    let total_collected = donations
        .iter()
        .filter(|d| d.is_monthly_payment_for(month, year))
        .map(|d| d.amount)
        .sum();
    tracing::debug!(
        month,
        year,
        roster = roster.len(),
        paid = paid.len(),
        unpaid = unpaid.len(),
        "reconciled monthly pledges"
    );
    Reconciliation {
        month,
        year,
        paid,
        unpaid,
        total_collected,
    }
}

/// Load the roster and the period's monthly payments, then reconcile them.
pub fn load_reconciliation(conn: &Connection, month: u32, year: i32) -> Result<Reconciliation> {
    validate_period(month, year)?;
    let roster = monthly_roster(donors::list_donors(conn)?);
    let payments = donations::monthly_payments(conn, month, year)?;
    Ok(reconcile(&roster, &payments, month, year))
}

/// Record `donor`'s pledge payment for `(month, year)`.
///
/// `amount` is used as given; picking the donor's default pledge or an
/// override is the caller's job. The amount, the donor's pledge and the period
/// are validated before the store is touched. Only roster donors (a positive
/// pledge) can be paid. A donor already holding a monthly payment for the
/// period is rejected rather than credited twice.
pub fn record_monthly_payment(
    conn: &Connection,
    donor: &Donor,
    amount: f64,
    month: u32,
    year: i32,
) -> Result<Donation> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(FundError::validation("invalid amount"));
    }
    if !donor.has_pledge() {
        return Err(FundError::validation(format!(
            "{} has no monthly pledge",
            donor.name
        )));
    }
    validate_period(month, year)?;

    let existing = donations::monthly_payments(conn, month, year)?;
    if find_payment(donor, &existing, month, year).is_some() {
        return Err(FundError::validation(format!(
            "Monthly payment for {} for {month}/{year} is already recorded",
            donor.name
        )));
    }

    let new = NewDonation {
        donor_id: Some(donor.id.clone()),
        amount,
        date: Some(Local::now().date_naive()),
        month: Some(month),
        year: Some(year),
        payment_method: Some(PaymentMethod::Monthly),
        is_monthly: true,
        notes: Some(format!("Monthly donation for {month}/{year}")),
    };
    let stored = donations::create_donation(conn, &new)?;
    Ok(Donation {
        donor: DonorRef::Resolved(donor.clone()),
        ..stored
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::db::test_db;
    use crate::store::donors::{create_donor, DonorInput};

    fn donor(id: &str, pledge: Option<f64>) -> Donor {
        Donor {
            id: id.to_string(),
            name: format!("Donor {id}"),
            phone: String::new(),
            address: String::new(),
            pledge,
            notes: String::new(),
            created_at: String::new(),
        }
    }

    fn donation(id: &str, donor_id: Option<&str>, is_monthly: bool, month: u32, year: i32) -> Donation {
        Donation {
            id: id.to_string(),
            donor: donor_id.map_or(DonorRef::Anonymous, |d| DonorRef::Unresolved(d.to_string())),
            amount: 500.0,
            date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            month,
            year,
            payment_method: if is_monthly { PaymentMethod::Monthly } else { PaymentMethod::Cash },
            is_monthly,
            notes: String::new(),
            created_at: String::new(),
        }
    }

    fn assert_partition(roster: &[Donor], donations: &[Donation], month: u32, year: i32) {
        let paid: HashSet<String> = compute_paid_donors(roster, donations, month, year)
            .into_iter()
            .map(|p| p.donor.id)
            .collect();
        let unpaid: HashSet<String> = compute_unpaid_donors(roster, donations, month, year)
            .into_iter()
            .map(|d| d.id)
            .collect();
        let all: HashSet<String> = roster.iter().map(|d| d.id.clone()).collect();
        assert!(paid.is_disjoint(&unpaid));
        assert_eq!(paid.union(&unpaid).cloned().collect::<HashSet<_>>(), all);
    }

    #[test]
    fn test_roster_keeps_only_pledged_donors() {
        let all = vec![donor("a", Some(500.0)), donor("b", None), donor("c", Some(0.0)), donor("d", Some(1.0))];
        let ids: Vec<String> = monthly_roster(all).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "d"]);
    }

    #[test]
    fn test_paid_and_unpaid_partition_roster() {
        let roster = vec![donor("a", Some(1.0)), donor("b", Some(1.0)), donor("c", Some(1.0))];
        let donations = vec![
            donation("x1", Some("b"), true, 3, 2025),
            donation("x2", Some("a"), true, 2, 2025),
            donation("x3", None, true, 3, 2025),
            donation("x4", Some("zz"), true, 3, 2025),
        ];
        assert_partition(&roster, &donations, 3, 2025);
        assert_partition(&roster, &donations, 2, 2025);
        assert_partition(&roster, &[], 3, 2025);
        assert_partition(&[], &donations, 3, 2025);

        let paid = compute_paid_donors(&roster, &donations, 3, 2025);
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].donor.id, "b");
        assert_eq!(paid[0].donation.id, "x1");
        assert_eq!(paid[0].donation.donor, DonorRef::Resolved(roster[1].clone()));
    }

    #[test]
    fn test_results_follow_roster_order() {
        let roster = vec![donor("c", Some(1.0)), donor("a", Some(1.0)), donor("b", Some(1.0)), donor("d", Some(1.0))];
        let donations = vec![
            donation("1", Some("a"), true, 5, 2025),
            donation("2", Some("c"), true, 5, 2025),
        ];
        let paid: Vec<String> = compute_paid_donors(&roster, &donations, 5, 2025)
            .into_iter()
            .map(|p| p.donor.id)
            .collect();
        let unpaid: Vec<String> = compute_unpaid_donors(&roster, &donations, 5, 2025)
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(paid, vec!["c", "a"]);
        assert_eq!(unpaid, vec!["b", "d"]);
    }

    #[test]
    fn test_non_monthly_donation_never_counts() {
        let roster = vec![donor("a", Some(1.0))];
        let donations = vec![donation("1", Some("a"), false, 3, 2025)];
        assert!(compute_paid_donors(&roster, &donations, 3, 2025).is_empty());
        assert_eq!(compute_unpaid_donors(&roster, &donations, 3, 2025).len(), 1);
    }

    #[test]
    fn test_duplicate_payments_match_first_found() {
        let roster = vec![donor("a", Some(1.0))];
        let donations = vec![
            donation("first", Some("a"), true, 3, 2025),
            donation("second", Some("a"), true, 3, 2025),
        ];
        let paid = compute_paid_donors(&roster, &donations, 3, 2025);
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].donation.id, "first");
    }

    #[test]
    fn test_total_collected_counts_all_monthly_payments() {
        let roster = vec![donor("a", Some(1.0))];
        let mut donations = vec![
            donation("1", Some("a"), true, 3, 2025),
            donation("2", None, true, 3, 2025),
            donation("3", Some("a"), false, 3, 2025),
        ];
        donations[1].amount = 250.5;
        let r = reconcile(&roster, &donations, 3, 2025);
        assert_eq!(r.total_collected, 750.5);
        assert_eq!(r.paid.len(), 1);
        assert!(r.unpaid.is_empty());
    }

    fn stored_donor(conn: &Connection, name: &str, pledge: f64) -> Donor {
        create_donor(
            conn,
            &DonorInput {
                name: name.to_string(),
                pledge: Some(pledge),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn donation_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT count(*) FROM donations", [], |r| r.get(0)).unwrap()
    }

    #[test]
    fn test_record_then_paid_exactly_once() {
        let (_dir, conn) = test_db();
        let d = stored_donor(&conn, "Fatima", 500.0);
        let other = stored_donor(&conn, "Ali", 300.0);

        let donation = record_monthly_payment(&conn, &d, 500.0, 3, 2025).unwrap();
        assert_eq!(donation.payment_method, PaymentMethod::Monthly);
        assert!(donation.is_monthly);
        assert_eq!((donation.month, donation.year), (3, 2025));
        assert_eq!(donation.notes, "Monthly donation for 3/2025");
        assert_eq!(donation.donor, DonorRef::Resolved(d.clone()));

        let r = load_reconciliation(&conn, 3, 2025).unwrap();
        let paid_ids: Vec<&str> = r.paid.iter().map(|p| p.donor.id.as_str()).collect();
        assert_eq!(paid_ids, vec![d.id.as_str()]);
        assert_eq!(r.unpaid, vec![other]);
        assert_eq!(r.total_collected, 500.0);
    }

    #[test]
    fn test_invalid_amount_never_writes() {
        let (_dir, conn) = test_db();
        let d = stored_donor(&conn, "Fatima", 500.0);
        for amount in [0.0, -10.0, f64::NAN] {
            let err = record_monthly_payment(&conn, &d, amount, 3, 2025).unwrap_err();
            assert!(matches!(err, FundError::Validation(ref m) if m == "invalid amount"));
        }
        assert_eq!(donation_count(&conn), 0);
    }

    #[test]
    fn test_invalid_amount_checked_before_store() {
        // No schema: any store access would fail with a Store error.
        let conn = Connection::open_in_memory().unwrap();
        let err = record_monthly_payment(&conn, &donor("a", Some(1.0)), 0.0, 3, 2025).unwrap_err();
        assert!(matches!(err, FundError::Validation(_)));
    }

    #[test]
    fn test_donor_without_pledge_cannot_be_paid() {
        let (_dir, conn) = test_db();
        let walk_in = create_donor(
            &conn,
            &DonorInput {
                name: "Walk-in".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        let err = record_monthly_payment(&conn, &walk_in, 100.0, 3, 2025).unwrap_err();
        assert!(matches!(err, FundError::Validation(ref m) if m == "Walk-in has no monthly pledge"));
        assert_eq!(donation_count(&conn), 0);
        assert_eq!(load_reconciliation(&conn, 3, 2025).unwrap().total_collected, 0.0);
    }

    #[test]
    fn test_second_payment_for_period_rejected() {
        let (_dir, conn) = test_db();
        let d = stored_donor(&conn, "Fatima", 500.0);
        record_monthly_payment(&conn, &d, 500.0, 3, 2025).unwrap();
        let err = record_monthly_payment(&conn, &d, 500.0, 3, 2025).unwrap_err();
        assert!(matches!(err, FundError::Validation(_)));
        assert_eq!(donation_count(&conn), 1);

        // A different period is fine
        record_monthly_payment(&conn, &d, 500.0, 4, 2025).unwrap();
        assert_eq!(donation_count(&conn), 2);
    }

    #[test]
    fn test_override_amount_is_used_verbatim() {
        let (_dir, conn) = test_db();
        let d = stored_donor(&conn, "Fatima", 500.0);
        let donation = record_monthly_payment(&conn, &d, 750.0, 1, 2026).unwrap();
        assert_eq!(donation.amount, 750.0);
    }

    #[test]
    fn test_store_failure_surfaces_as_store_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err = record_monthly_payment(&conn, &donor("a", Some(1.0)), 10.0, 3, 2025).unwrap_err();
        assert!(matches!(err, FundError::Store(_)));
    }
}

//! Top-N recipients by summed award amount.

use crate::models::{AwardRecord, RecipientTotal};
use std::collections::HashMap;

/// Number of recipients kept in [`crate::models::Statistics`].
pub const SUMMARY_TOP_N: usize = 5;

/// Group by recipient, sum award amounts and keep the `n` largest.
///
/// Exact ties keep the order in which the recipients first appear in
/// `records`, so repeated calls on the same input give the same order.
pub fn top_recipients(records: &[AwardRecord], n: usize) -> Vec<RecipientTotal> {
    let mut totals: Vec<RecipientTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match index.get(record.recipient_name.as_str()) {
            Some(&i) => totals[i].total += record.award_amount,
            None => {
                index.insert(record.recipient_name.as_str(), totals.len());
                totals.push(RecipientTotal {
                    name: record.recipient_name.clone(),
                    total: record.award_amount,
                });
            }
        }
    }

    // `sort_by` is stable: first-appearance order survives for equal sums.
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals.truncate(n);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn award(recipient: &str, amount: f64) -> AwardRecord {
        AwardRecord {
            recipient_name: recipient.to_string(),
            award_amount: amount,
            ..AwardRecord::default()
        }
    }

    #[test]
    fn test_sums_per_recipient() {
        let records = vec![award("X", 100.0), award("Y", 300.0), award("X", 250.0)];
        let top = top_recipients(&records, 5);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "X");
        assert_eq!(top[0].total, 350.0);
        assert_eq!(top[1].name, "Y");
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let records = vec![award("A", 100.0), award("B", 100.0)];
        let top = top_recipients(&records, 5);
        assert_eq!(top[0].name, "A");
        assert_eq!(top[1].name, "B");

        let reversed = vec![award("B", 100.0), award("A", 100.0)];
        let top = top_recipients(&reversed, 5);
        assert_eq!(top[0].name, "B");
    }

    #[test]
    fn test_truncates_to_n() {
        let records: Vec<AwardRecord> = (0..12)
            .map(|i| award(&format!("R{}", i), i as f64))
            .collect();

        let top = top_recipients(&records, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].name, "R11");
        assert_eq!(top[9].name, "R2");
    }

    #[test]
    fn test_empty_input() {
        assert!(top_recipients(&[], SUMMARY_TOP_N).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let records = vec![
            award("C", 5.0),
            award("A", 5.0),
            award("B", 9.0),
            award("A", 0.0),
        ];
        assert_eq!(top_recipients(&records, 3), top_recipients(&records, 3));
    }
}

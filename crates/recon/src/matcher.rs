use std::collections::HashSet;

use crate::model::{DeviceRecord, MergeOutput};

/// Remove every key present in both lists and merge the survivors.
///
/// All records carrying a shared key are dropped on both sides, however many
/// there are. Survivors keep their row order: reiterated first, then
/// inspection. Each survivor is annotated with its difference note.
pub fn reconcile(inspection: &[DeviceRecord], reiterated: &[DeviceRecord]) -> MergeOutput {
    let inspection_keys: HashSet<&str> = inspection.iter().map(|r| r.key.as_str()).collect();
    let reiterated_keys: HashSet<&str> = reiterated.iter().map(|r| r.key.as_str()).collect();

    let shared: HashSet<&str> = inspection_keys.intersection(&reiterated_keys).copied().collect();

    let records: Vec<DeviceRecord> = reiterated
        .iter()
        .chain(inspection.iter())
        .filter(|r| !shared.contains(r.key.as_str()))
        .map(|r| {
            let mut survivor = r.clone();
            survivor.difference = r.origin.difference_note().to_string();
            survivor
        })
        .collect();

    log::debug!(
        "reconcile: {} shared keys removed, {} records survive",
        shared.len(),
        records.len()
    );

    MergeOutput {
        records,
        removed_keys: shared.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::normalize_key;
    use crate::model::Origin;
    use proptest::prelude::*;

    fn ins(label: &str) -> DeviceRecord {
        DeviceRecord::inspection(normalize_key(label), label, "", "")
    }

    fn rei(label: &str) -> DeviceRecord {
        DeviceRecord::reiterated(normalize_key(label), label, "")
    }

    fn keys(out: &MergeOutput) -> Vec<(&str, Origin)> {
        out.records.iter().map(|r| (r.key.as_str(), r.origin)).collect()
    }

    #[test]
    fn shared_key_removed_from_both_sides() {
        let out = reconcile(&[ins("X1")], &[rei("x-1")]);
        assert!(out.records.is_empty());
        assert_eq!(out.removed_keys, 1);
    }

    #[test]
    fn reiterated_survivors_come_first() {
        let out = reconcile(&[ins("I1"), ins("S"), ins("I2")], &[rei("R1"), rei("S"), rei("R2")]);
        assert_eq!(
            keys(&out),
            vec![
                ("R1", Origin::Reiterated),
                ("R2", Origin::Reiterated),
                ("I1", Origin::Inspection),
                ("I2", Origin::Inspection),
            ]
        );
        assert_eq!(out.removed_keys, 1);
    }

    #[test]
    fn every_duplicate_of_a_shared_key_is_dropped() {
        let out = reconcile(&[ins("D"), ins("D"), ins("A")], &[rei("D"), rei("D"), rei("D")]);
        assert_eq!(keys(&out), vec![("A", Origin::Inspection)]);
        assert_eq!(out.removed_keys, 1);
    }

    #[test]
    fn duplicates_of_unshared_keys_survive() {
        let out = reconcile(&[ins("A"), ins("A")], &[]);
        assert_eq!(out.records.len(), 2);
    }

    #[test]
    fn survivors_are_annotated() {
        let out = reconcile(&[ins("I")], &[rei("R")]);
        assert_eq!(out.records[0].difference, Origin::Reiterated.difference_note());
        assert_eq!(out.records[1].difference, Origin::Inspection.difference_note());
    }

    #[test]
    fn empty_inputs() {
        let out = reconcile(&[], &[]);
        assert!(out.records.is_empty());
        assert_eq!(out.removed_keys, 0);
    }

    proptest! {
        #[test]
        fn disjoint_lists_concatenate(
            ins_keys in prop::collection::vec("[A-M][0-9]{1,3}", 0..20),
            rei_keys in prop::collection::vec("[N-Z][0-9]{1,3}", 0..20),
        ) {
            let i: Vec<_> = ins_keys.iter().map(|k| ins(k)).collect();
            let r: Vec<_> = rei_keys.iter().map(|k| rei(k)).collect();
            let out = reconcile(&i, &r);
            let expected: Vec<&str> = rei_keys.iter().chain(ins_keys.iter()).map(String::as_str).collect();
            let got: Vec<&str> = out.records.iter().map(|r| r.key.as_str()).collect();
            prop_assert_eq!(got, expected);
            prop_assert_eq!(out.removed_keys, 0);
        }

        #[test]
        fn shared_keys_never_survive(
            ins_keys in prop::collection::vec("[A-F]", 0..15),
            rei_keys in prop::collection::vec("[D-J]", 0..15),
        ) {
            let i: Vec<_> = ins_keys.iter().map(|k| ins(k)).collect();
            let r: Vec<_> = rei_keys.iter().map(|k| rei(k)).collect();
            let out = reconcile(&i, &r);
            for rec in &out.records {
                let in_both = ins_keys.contains(&rec.key) && rei_keys.contains(&rec.key);
                prop_assert!(!in_both);
            }
        }
    }
}

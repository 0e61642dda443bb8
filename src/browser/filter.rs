//! Text search over the patient collection.

use crate::models::{Patient, SearchField};

/// Returns true if `needle` (already lowercased) occurs in any searchable
/// field of `patient`. Missing fields read as the empty string.
pub fn matches(patient: &Patient, needle: &str) -> bool {
    SearchField::ALL
        .iter()
        .any(|&field| patient.search_text(field).to_lowercase().contains(needle))
}

/// Keeps the patients whose name, doctor or caretaker contains `query`,
/// ignoring case. The query is not trimmed. Returns positions into
/// `collection`, in collection order.
pub fn filter(collection: &[Patient], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return (0..collection.len()).collect();
    }

    let needle = query.to_lowercase();
    collection
        .iter()
        .enumerate()
        .filter(|(_, patient)| matches(patient, &needle))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::test_support::{demo, names, patient};
    use proptest::prelude::*;

    #[test]
    fn empty_query_keeps_everything() {
        let patients = demo();
        assert_eq!(filter(&patients, ""), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn matches_any_searchable_field_ignoring_case() {
        let patients = demo();
        assert_eq!(names(&patients, &filter(&patients, "doe")), ["John Doe"]);
        assert_eq!(names(&patients, &filter(&patients, "DOE")), ["John Doe"]);
        // Caretaker of Maria Lopez.
        assert_eq!(names(&patients, &filter(&patients, "sharma")), ["Maria Lopez"]);
    }

    #[test]
    fn whitespace_is_part_of_the_query() {
        let patients = demo();
        assert_eq!(names(&patients, &filter(&patients, "doe ")), Vec::<&str>::new());
        assert_eq!(names(&patients, &filter(&patients, " doe")), ["John Doe"]);
    }

    #[test]
    fn missing_fields_never_match_and_never_panic() {
        let mut bare = patient("x", "Someone");
        bare.name = None;
        let patients = vec![bare, patient("y", "Yara")];
        assert_eq!(filter(&patients, "y"), vec![1]);
        assert_eq!(filter(&patients, ""), vec![0, 1]);
    }

    proptest! {
        #[test]
        fn result_is_an_ordered_subsequence_of_matches(
            raw in proptest::collection::vec("[a-cA-C ]{0,6}", 0..20),
            query in "[a-cA-C ]{0,3}",
        ) {
            let patients: Vec<Patient> = raw
                .iter()
                .enumerate()
                .map(|(i, name)| patient(&i.to_string(), name))
                .collect();

            let kept = filter(&patients, &query);
            prop_assert!(kept.windows(2).all(|w| w[0] < w[1]));

            let needle = query.to_lowercase();
            for (i, p) in patients.iter().enumerate() {
                prop_assert_eq!(kept.contains(&i), matches(p, &needle));
            }
        }
    }
}

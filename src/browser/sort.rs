//! Stable ordering of patients by a column.

use crate::models::{FieldValue, Patient, SortField};
use std::cmp::Ordering;

/// Direction of the active sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Arrow shown next to the active column header.
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// The column and direction a collection is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Header click: the active column flips direction, any other column
    /// becomes active in ascending order.
    pub fn toggled(self, field: SortField) -> Self {
        if field == self.field {
            Self::new(field, self.direction.flipped())
        } else {
            Self::new(field, SortDirection::Ascending)
        }
    }
}

/// Comparison key for one patient. Text is compared lowercased, missing
/// text as `""` and missing ages as `0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Number(u32),
    Text(String),
}

impl SortKey {
    fn of(patient: &Patient, field: SortField) -> Self {
        match patient.sort_value(field) {
            FieldValue::Number(n) => SortKey::Number(n),
            FieldValue::Text(t) => SortKey::Text(t.to_lowercase()),
        }
    }
}

/// Orders `rows` (positions into `collection`) by `spec`.
///
/// Each key is computed once and the sort is stable, so rows with equal
/// keys keep their incoming relative order in both directions.
pub fn sort(collection: &[Patient], rows: &mut Vec<usize>, spec: SortSpec) {
    let mut keyed: Vec<(SortKey, usize)> = rows
        .iter()
        .map(|&i| (SortKey::of(&collection[i], spec.field), i))
        .collect();

    keyed.sort_by(|a, b| spec.direction.apply(a.0.cmp(&b.0)));

    rows.clear();
    rows.extend(keyed.into_iter().map(|(_, i)| i));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::test_support::{demo, names, patient};
    use proptest::prelude::*;

    fn sorted(collection: &[Patient], spec: SortSpec) -> Vec<usize> {
        let mut rows: Vec<usize> = (0..collection.len()).collect();
        sort(collection, &mut rows, spec);
        rows
    }

    #[test]
    fn default_order_is_name_ascending() {
        let patients = demo();
        let rows = sorted(&patients, SortSpec::default());
        assert_eq!(
            names(&patients, &rows),
            ["Alex Johnson", "Jane Smith", "John Doe", "Maria Lopez", "Sathiya A"]
        );
    }

    #[test]
    fn age_sorts_numerically() {
        let patients = demo();
        let asc = sorted(&patients, SortSpec::new(SortField::Age, SortDirection::Ascending));
        let ages: Vec<_> = asc.iter().map(|&i| patients[i].age.unwrap()).collect();
        assert_eq!(ages, [29, 34, 40, 47, 55]);

        let desc = sorted(&patients, SortSpec::new(SortField::Age, SortDirection::Descending));
        let ages: Vec<_> = desc.iter().map(|&i| patients[i].age.unwrap()).collect();
        assert_eq!(ages, [55, 47, 40, 34, 29]);
    }

    #[test]
    fn text_comparison_ignores_case() {
        let patients = vec![patient("1", "bob"), patient("2", "Alice"), patient("3", "carl")];
        let rows = sorted(&patients, SortSpec::default());
        assert_eq!(names(&patients, &rows), ["Alice", "bob", "carl"]);
    }

    #[test]
    fn ties_keep_original_order_in_both_directions() {
        let patients = vec![
            patient("a", "Same"),
            patient("b", "Other"),
            patient("c", "same"),
        ];
        let asc = sorted(&patients, SortSpec::new(SortField::Name, SortDirection::Ascending));
        let desc = sorted(&patients, SortSpec::new(SortField::Name, SortDirection::Descending));

        assert_eq!(asc, [1, 0, 2]);
        assert_eq!(desc, [0, 2, 1]);
    }

    #[test]
    fn missing_values_sort_as_defaults() {
        let mut nameless = patient("x", "");
        nameless.name = None;
        nameless.age = None;
        let patients = vec![patient("1", "Zed"), nameless];

        assert_eq!(sorted(&patients, SortSpec::default()), [1, 0]);
        assert_eq!(
            sorted(&patients, SortSpec::new(SortField::Age, SortDirection::Ascending)),
            [1, 0]
        );
    }

    #[test]
    fn toggling_flips_then_resets() {
        let spec = SortSpec::default();
        let flipped = spec.toggled(SortField::Name);
        assert_eq!(flipped, SortSpec::new(SortField::Name, SortDirection::Descending));
        assert_eq!(flipped.toggled(SortField::Name), spec);

        let age = flipped.toggled(SortField::Age);
        assert_eq!(age, SortSpec::new(SortField::Age, SortDirection::Ascending));
    }

    fn any_spec() -> impl Strategy<Value = SortSpec> {
        (
            prop::sample::select(SortField::ALL.to_vec()),
            prop::bool::ANY.prop_map(|desc| {
                if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                }
            }),
        )
            .prop_map(|(field, direction)| SortSpec::new(field, direction))
    }

    proptest! {
        #[test]
        fn sorting_is_idempotent(
            raw in proptest::collection::vec(("[a-cA-C]{0,3}", 0u32..5), 0..20),
            spec in any_spec(),
        ) {
            let patients: Vec<Patient> = raw
                .iter()
                .enumerate()
                .map(|(i, (name, age))| {
                    let mut p = patient(&i.to_string(), name);
                    p.age = Some(*age);
                    p
                })
                .collect();

            let once = sorted(&patients, spec);
            let mut twice = once.clone();
            sort(&patients, &mut twice, spec);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn equal_keys_keep_relative_order(
            ages in proptest::collection::vec(0u32..3, 0..20),
            descending in prop::bool::ANY,
        ) {
            let patients: Vec<Patient> = ages
                .iter()
                .enumerate()
                .map(|(i, age)| {
                    let mut p = patient(&i.to_string(), "n");
                    p.age = Some(*age);
                    p
                })
                .collect();
            let direction = if descending { SortDirection::Descending } else { SortDirection::Ascending };
            let rows = sorted(&patients, SortSpec::new(SortField::Age, direction));

            for w in rows.windows(2) {
                if patients[w[0]].age == patients[w[1]].age {
                    prop_assert!(w[0] < w[1]);
                }
            }
        }
    }
}

//! Comparison table ordering and filtering

use std::cmp::Ordering;

use crate::types::{CoveragePlan, Insurer, SortOrder};

/// Order insurers by the price of `plan`.
///
/// Errored and loading insurers always go last, whatever the order. Quoted
/// insurers without a price for the plan follow the priced ones. `Default`
/// keeps the input order. The sort is stable.
pub fn sort_insurers(insurers: &[Insurer], plan: CoveragePlan, order: SortOrder) -> Vec<Insurer> {
    let mut sorted = insurers.to_vec();
    sorted.sort_by(|a, b| compare(a, b, plan, order));
    sorted
}

/// Sort, optionally dropping insurers that have no quote to show
pub fn table_view(
    insurers: &[Insurer],
    plan: CoveragePlan,
    order: SortOrder,
    hide_unavailable: bool,
) -> Vec<Insurer> {
    let mut view = sort_insurers(insurers, plan, order);
    if hide_unavailable {
        view.retain(Insurer::is_available);
    }
    view
}

fn compare(a: &Insurer, b: &Insurer, plan: CoveragePlan, order: SortOrder) -> Ordering {
    match (a.is_available(), b.is_available()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
        (true, true) => {
            if order == SortOrder::Default {
                return Ordering::Equal;
            }
            match (a.plan_price(plan), b.plan_price(plan)) {
                (Some(pa), Some(pb)) => {
                    let ord = pa.partial_cmp(&pb).unwrap_or(Ordering::Equal);
                    if order == SortOrder::Desc {
                        ord.reverse()
                    } else {
                        ord
                    }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InsurerStatus, PlanValues, QuotedCoverage};

    fn quoted(name: &str, amplia: &str) -> Insurer {
        Insurer {
            id: name.to_lowercase(),
            name: name.to_string(),
            logo: String::new(),
            status: InsurerStatus::Quoted(QuotedCoverage {
                prices: PlanValues {
                    amplia: amplia.to_string(),
                    limitada: "-".to_string(),
                    rc: "-".to_string(),
                },
                deductible: "-".to_string(),
                medical_expenses: "-".to_string(),
                coverages_raw: PlanValues::default(),
            }),
            is_highlighted: false,
        }
    }

    fn with_status(name: &str, status: InsurerStatus) -> Insurer {
        Insurer {
            status,
            ..quoted(name, "-")
        }
    }

    fn names(insurers: &[Insurer]) -> Vec<&str> {
        insurers.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_sort_ascending() {
        let insurers = vec![
            quoted("A", "$9,123"),
            quoted("B", "$8,320"),
            quoted("C", "$8,890"),
        ];
        let sorted = sort_insurers(&insurers, CoveragePlan::Amplia, SortOrder::Asc);
        let prices: Vec<f64> = sorted
            .iter()
            .filter_map(|i| i.plan_price(CoveragePlan::Amplia))
            .collect();
        assert_eq!(prices, vec![8320.0, 8890.0, 9123.0]);
    }

    #[test]
    fn test_sort_descending() {
        let insurers = vec![
            quoted("A", "$9,123"),
            quoted("B", "$8,320"),
            quoted("C", "$8,890"),
        ];
        let sorted = sort_insurers(&insurers, CoveragePlan::Amplia, SortOrder::Desc);
        assert_eq!(names(&sorted), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_default_keeps_input_order() {
        let insurers = vec![quoted("A", "$9,123"), quoted("B", "$8,320")];
        let sorted = sort_insurers(&insurers, CoveragePlan::Amplia, SortOrder::Default);
        assert_eq!(names(&sorted), vec!["A", "B"]);
    }

    #[test]
    fn test_unavailable_last_for_every_order() {
        let insurers = vec![
            with_status(
                "Err",
                InsurerStatus::Error {
                    message: "x".into(),
                    image_url: None,
                },
            ),
            with_status("Load", InsurerStatus::Loading),
            quoted("A", "$9,123"),
            quoted("B", "$8,320"),
        ];
        for order in [SortOrder::Default, SortOrder::Asc, SortOrder::Desc] {
            let sorted = sort_insurers(&insurers, CoveragePlan::Amplia, order);
            assert!(sorted[0].is_available() && sorted[1].is_available());
            assert!(!sorted[2].is_available() && !sorted[3].is_available());
        }
    }

    #[test]
    fn test_missing_price_sorts_last_among_quoted() {
        let insurers = vec![quoted("NoPrice", "-"), quoted("A", "$100"), quoted("B", "$200")];
        let asc = sort_insurers(&insurers, CoveragePlan::Amplia, SortOrder::Asc);
        assert_eq!(names(&asc), vec!["A", "B", "NoPrice"]);
        let desc = sort_insurers(&insurers, CoveragePlan::Amplia, SortOrder::Desc);
        assert_eq!(names(&desc), vec!["B", "A", "NoPrice"]);
    }

    #[test]
    fn test_table_view_hides_unavailable() {
        let insurers = vec![
            with_status("Load", InsurerStatus::Loading),
            quoted("A", "$100"),
        ];
        let view = table_view(&insurers, CoveragePlan::Amplia, SortOrder::Asc, true);
        assert_eq!(names(&view), vec!["A"]);
        let view = table_view(&insurers, CoveragePlan::Amplia, SortOrder::Asc, false);
        assert_eq!(view.len(), 2);
    }
}

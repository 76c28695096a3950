//! Per-category and whole-collection statistics.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};

use case_catalog_case_models::{Case, CatalogSummary, CategoryStats};

/// Running totals for one group of cases.
#[derive(Default)]
struct Totals<'a> {
    count: u64,
    impacted: u64,
    budget: f64,
    active: u64,
    cities: BTreeSet<&'a str>,
}

impl<'a> Totals<'a> {
    fn add(&mut self, case: &'a Case) {
        self.count += 1;
        self.impacted = self.impacted.saturating_add(case.impacted_or_zero());
        self.budget += case.budget_or_zero();
        if case.is_active() {
            self.active += 1;
        }
        if let Some(city) = case.city_label() {
            self.cities.insert(city);
        }
    }

    fn to_stats(&self, category: &str) -> CategoryStats {
        CategoryStats {
            category: category.to_string(),
            count: self.count,
            total_impacted: self.impacted,
            total_budget: self.budget,
            distinct_cities: self.cities.len() as u64,
            active_count: self.active,
        }
    }
}

/// Computes one [`CategoryStats`] per entry of `categories`, in list order.
///
/// Categories with no matching cases get zero-valued stats. Cases whose
/// category is not listed are left out of every figure; use
/// [`unlisted_categories`] to find them. A category listed twice gets
/// the same stats twice.
#[must_use]
pub fn aggregate_by_category<C, S>(cases: &[C], categories: &[S]) -> Vec<CategoryStats>
where
    C: Borrow<Case>,
    S: AsRef<str>,
{
    let wanted: BTreeSet<&str> = categories.iter().map(AsRef::as_ref).collect();
    let mut groups: BTreeMap<&str, Totals<'_>> = BTreeMap::new();
    let mut excluded = 0_usize;

    for case in cases.iter().map(Borrow::<Case>::borrow) {
        if wanted.contains(case.category.as_str()) {
            groups.entry(case.category.as_str()).or_default().add(case);
        } else {
            excluded += 1;
        }
    }

    if excluded > 0 {
        log::debug!("aggregate_by_category: {excluded} case(s) with unlisted categories skipped");
    }

    categories
        .iter()
        .map(|category| {
            let category = category.as_ref();
            groups.get(category).map_or_else(
                || CategoryStats::empty(category),
                |totals| totals.to_stats(category),
            )
        })
        .collect()
}

/// Re-orders stats by case count, busiest first. Ties keep their
/// relative order.
pub fn sort_by_count_desc(stats: &mut [CategoryStats]) {
    stats.sort_by(|a, b| b.count.cmp(&a.count));
}

/// Headline figures over an entire collection.
#[must_use]
pub fn summarize<C: Borrow<Case>>(cases: &[C]) -> CatalogSummary {
    let mut totals = Totals::default();
    let mut categories = BTreeSet::new();

    for case in cases.iter().map(Borrow::<Case>::borrow) {
        totals.add(case);
        categories.insert(case.category.as_str());
    }

    CatalogSummary {
        total_cases: totals.count,
        total_impacted: totals.impacted,
        total_budget: totals.budget,
        distinct_cities: totals.cities.len() as u64,
        distinct_categories: categories.len() as u64,
        active_count: totals.active,
    }
}

/// Category labels present in `cases` but missing from `categories`, in
/// first-seen order.
#[must_use]
pub fn unlisted_categories<C, S>(cases: &[C], categories: &[S]) -> Vec<String>
where
    C: Borrow<Case>,
    S: AsRef<str>,
{
    let wanted: BTreeSet<&str> = categories.iter().map(AsRef::as_ref).collect();
    let mut seen = BTreeSet::new();

    cases
        .iter()
        .map(|case| Borrow::<Case>::borrow(case).category.as_str())
        .filter(|category| !wanted.contains(category) && seen.insert(*category))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(category: &str, impacted: Option<u64>, status: Option<&str>) -> Case {
        Case {
            id: format!("{category}-{impacted:?}-{status:?}"),
            category: category.to_string(),
            impacted_people: impacted,
            status: status.map(String::from),
            ..Case::default()
        }
    }

    #[test]
    fn educacao_saude_scenario() {
        let cases = vec![
            case("Educação", Some(50), Some("ativo")),
            case("Educação", None, None),
            case("Saúde", Some(200), Some("pausado")),
        ];

        let stats = aggregate_by_category(&cases, &["Educação", "Saúde"]);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, "Educação");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].total_impacted, 50);
        assert_eq!(stats[0].active_count, 2);
        assert_eq!(stats[1].category, "Saúde");
        assert_eq!(stats[1].count, 1);
        assert_eq!(stats[1].total_impacted, 200);
        assert_eq!(stats[1].active_count, 0);
    }

    #[test]
    fn empty_input_yields_zeroed_stats_for_every_category() {
        let cases: Vec<Case> = Vec::new();
        let stats = aggregate_by_category(&cases, &["Cultura", "Esporte"]);
        assert_eq!(
            stats,
            vec![CategoryStats::empty("Cultura"), CategoryStats::empty("Esporte")]
        );
    }

    #[test]
    fn counts_sum_to_listed_cases() {
        let cases = vec![
            case("A", Some(1), None),
            case("B", Some(2), None),
            case("C", Some(3), None),
            case("A", None, Some("pausado")),
        ];
        let stats = aggregate_by_category(&cases, &["A", "B"]);
        let total: u64 = stats.iter().map(|s| s.count).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn sums_budgets_and_distinct_cities() {
        let mut a = case("Moradia", Some(10), None);
        a.budget = Some(1000.0);
        a.city = Some("Recife".to_string());
        let mut b = case("Moradia", Some(5), None);
        b.budget = Some(250.5);
        b.city = Some(" Recife ".to_string());
        let mut c = case("Moradia", None, None);
        c.city = Some(String::new());
        let mut d = case("Moradia", None, None);
        d.city = Some("Olinda".to_string());

        let stats = aggregate_by_category(&[a, b, c, d], &["Moradia"]);
        assert_eq!(stats[0].count, 4);
        assert_eq!(stats[0].total_impacted, 15);
        assert!((stats[0].total_budget - 1250.5).abs() < 1e-9);
        assert_eq!(stats[0].distinct_cities, 2);
    }

    #[test]
    fn malformed_numbers_contribute_zero() {
        let cases: Vec<Case> = serde_json::from_value(serde_json::json!([
            { "id": "1", "title": "t", "category": "X", "impacted_people": "??", "budget": "n/d" },
            { "id": "2", "title": "t", "category": "X", "impacted_people": 7, "budget": 3 }
        ]))
        .unwrap();
        let stats = aggregate_by_category(&cases, &["X"]);
        assert_eq!(stats[0].total_impacted, 7);
        assert!((stats[0].total_budget - 3.0).abs() < 1e-9);
    }

    #[test]
    fn accepts_filtered_references() {
        let cases = vec![case("A", Some(1), None), case("B", Some(2), None)];
        let refs: Vec<&Case> = cases.iter().collect();
        let stats = aggregate_by_category(&refs, &["B"]);
        assert_eq!(stats[0].total_impacted, 2);
    }

    #[test]
    fn sort_by_count_is_stable() {
        let mut stats = vec![
            CategoryStats { count: 1, ..CategoryStats::empty("a") },
            CategoryStats { count: 3, ..CategoryStats::empty("b") },
            CategoryStats { count: 1, ..CategoryStats::empty("c") },
        ];
        sort_by_count_desc(&mut stats);
        let order: Vec<&str> = stats.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn summarize_collection() {
        let mut a = case("A", Some(10), Some("ativo"));
        a.city = Some("Natal".to_string());
        let b = case("B", Some(5), Some("concluido"));
        let summary = summarize(&[a, b]);
        assert_eq!(summary.total_cases, 2);
        assert_eq!(summary.total_impacted, 15);
        assert_eq!(summary.active_count, 1);
        assert_eq!(summary.distinct_cities, 1);
        assert_eq!(summary.distinct_categories, 2);
    }

    #[test]
    fn unlisted_categories_in_first_seen_order() {
        let cases = vec![
            case("Z", None, None),
            case("A", None, None),
            case("Y", None, None),
            case("Z", None, None),
        ];
        assert_eq!(unlisted_categories(&cases, &["A"]), vec!["Z", "Y"]);
    }
}

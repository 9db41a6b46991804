//! Deterministic synthetic records used when the raw source is unavailable.

use crate::models::Record;

/// Number of synthetic records.
pub const DEMO_RECORD_COUNT: usize = 100;

/// Category codes and how many consecutive records carry each.
const DEMO_CATEGORIES: &[(&str, usize)] = &[
    ("cs.AI", 30),
    ("cs.LG", 25),
    ("cs.CV", 20),
    ("stat.ML", 15),
    ("math.OC", 10),
];

/// Generate the 100-record demo data set.
///
/// Dates cycle through three years, twelve months and 28 days, so they
/// are always valid calendar dates but may repeat.
pub fn generate_records() -> Vec<Record> {
    let categories = DEMO_CATEGORIES
        .iter()
        .flat_map(|(code, count)| std::iter::repeat(*code).take(*count));

    (1..=DEMO_RECORD_COUNT)
        .zip(categories)
        .map(|(i, category)| Record {
            id: format!("2001.0000{}", i),
            title: format!("Research Paper on AI Topic {}", i),
            authors: format!("Author {}, Co-author {}", i, i),
            categories: category.to_string(),
            abstract_text: format!(
                "This is abstract for paper {} discussing machine learning topics.",
                i
            ),
            update_date: format!("202{}-{:02}-{:02}", i % 3, (i % 12) + 1, (i % 28) + 1),
            versions: 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_update_date;

    #[test]
    fn test_demo_record_count() {
        let records = generate_records();
        assert_eq!(records.len(), DEMO_RECORD_COUNT);
        assert!(records.iter().all(|r| r.versions == 1));
    }

    #[test]
    fn test_demo_category_split() {
        let records = generate_records();
        let count = |code: &str| records.iter().filter(|r| r.categories == code).count();

        assert_eq!(count("cs.AI"), 30);
        assert_eq!(count("cs.LG"), 25);
        assert_eq!(count("cs.CV"), 20);
        assert_eq!(count("stat.ML"), 15);
        assert_eq!(count("math.OC"), 10);
        assert_eq!(records[29].categories, "cs.AI");
        assert_eq!(records[30].categories, "cs.LG");
    }

    #[test]
    fn test_demo_fields() {
        let records = generate_records();
        let first = &records[0];
        assert_eq!(first.id, "2001.00001");
        assert_eq!(first.title, "Research Paper on AI Topic 1");
        assert_eq!(first.authors, "Author 1, Co-author 1");
        assert_eq!(first.update_date, "2021-02-02");
        assert_eq!(records[99].id, "2001.0000100");
        assert_eq!(records[99].update_date, "2021-05-17");
    }

    #[test]
    fn test_demo_dates_parse() {
        assert!(generate_records()
            .iter()
            .all(|r| parse_update_date(&r.update_date).is_some()));
    }

    #[test]
    fn test_demo_is_deterministic() {
        assert_eq!(generate_records(), generate_records());
    }
}

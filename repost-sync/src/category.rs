//! Category → audience group mapping.

/// Feed category name → audience group name. Categories not listed here
/// carry no targeting.
pub const AUDIENCE_RULES: &[(&str, &str)] = &[
    ("Engineering", "news-engineering"),
    ("Our News", "news-company"),
    ("Firm in the News", "news-company"),
    ("Firm & Industry News", "news-company"),
    ("Health & Wellness", "news-health"),
    ("Careers", "news-careers"),
];

/// Audience group for a single category, if any.
pub fn audience_group_for(category: &str) -> Option<&'static str> {
    AUDIENCE_RULES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, group)| *group)
}

/// Distinct audience groups for `categories`, in order of first appearance.
pub fn map_categories_to_groups<'a, I>(categories: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: Vec<&'static str> = Vec::new();
    for group in categories.into_iter().filter_map(audience_group_for) {
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["Engineering"], &["news-engineering"])]
    #[case(&["Unknown Category"], &[])]
    #[case(&["Our News", "Firm in the News"], &["news-company"])]
    #[case(&["Firm & Industry News", "Careers", "Our News"], &["news-company", "news-careers"])]
    #[case(&["Health & Wellness", "Unknown", "Engineering"], &["news-health", "news-engineering"])]
    #[case(&[], &[])]
    fn maps_categories(#[case] categories: &[&str], #[case] expected: &[&str]) {
        assert_eq!(map_categories_to_groups(categories.iter().copied()), expected);
    }

    #[test]
    fn matching_is_exact() {
        assert_eq!(audience_group_for("engineering"), None);
        assert_eq!(audience_group_for("Engineering "), None);
    }
}

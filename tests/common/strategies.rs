use callsheet_core::models::RawRow;
use callsheet_core::schema::{AliasTable, CanonicalField};
use proptest::prelude::*;

/// Strategy for one accepted label of `field`, with random casing and padding
pub fn label_variant_strategy(field: CanonicalField) -> impl Strategy<Value = String> {
    let labels: Vec<String> = AliasTable::standard()
        .labels_for(field)
        .into_iter()
        .map(str::to_string)
        .collect();
    (
        prop::sample::select(labels),
        any::<bool>(),
        "[ \t]{0,2}",
        "[ \t]{0,2}",
    )
        .prop_map(|(label, upper, lead, trail)| {
            let cased = if upper { label.to_uppercase() } else { label };
            format!("{lead}{cased}{trail}")
        })
}

/// Strategy for contact identifiers, sometimes blank
pub fn identifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "\\+91[0-9]{5}",
        1 => Just(String::new()),
        1 => Just("   ".to_string()),
    ]
}

/// Strategy for status cells in the forms seen in real sheets
pub fn status_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("Completed".to_string()),
        Just("done".to_string()),
        Just("Pending".to_string()),
        Just("no answer".to_string()),
    ]
}

/// Strategy for completed-by cells, mostly blank
pub fn completed_by_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => Just(String::new()),
        1 => "[A-Z][a-z]{2,6}",
    ]
}

/// Strategy for a header row `Contact, Status, Completed By` followed by
/// up to 30 data rows
pub fn sheet_strategy() -> impl Strategy<Value = Vec<RawRow>> {
    prop::collection::vec(
        (identifier_strategy(), status_strategy(), completed_by_strategy()),
        0..30,
    )
    .prop_map(|rows| {
        let mut sheet = vec![vec![
            "Contact".to_string(),
            "Status".to_string(),
            "Completed By".to_string(),
        ]];
        sheet.extend(rows.into_iter().map(|(id, status, by)| vec![id, status, by]));
        sheet
    })
}

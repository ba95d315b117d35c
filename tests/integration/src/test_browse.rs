//! Browse-path tests: describe, scan, query, and client-side filtering.

use std::sync::Arc;

use tablescope_core::TableProvider;
use tablescope_core::expression::{Literal, Operator, compile, parse};
use tablescope_core::path::AttrPath;
use tablescope_core::resultset::NewValue;
use tablescope_model::AttributeValue;

use crate::{TEST_TABLE, make_item, seeded_services};

#[tokio::test]
async fn test_should_describe_then_scan_with_canonical_columns() {
    let (read, _, _) = seeded_services().await;

    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());
    assert_eq!(info.keys.partition_key, "pk");
    assert_eq!(info.keys.sort_key.as_deref(), Some("sk"));

    let rs = read.scan(info.clone()).await.unwrap();
    assert_eq!(rs.len(), 2);
    assert_eq!(rs.columns(), ["pk", "sk", "alpha", "beta"]);
    assert!(rs.query().is_none());
}

#[tokio::test]
async fn test_should_fail_describe_of_unknown_table() {
    let (read, _, _) = seeded_services().await;
    assert!(read.describe("no-such-table").await.is_err());
}

#[tokio::test]
async fn test_should_parse_equality_and_reject_typed_begins_with_at_compile() {
    let (read, _, _) = seeded_services().await;
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());

    // Parsing an equality yields an Equals condition on pk with the string
    // literal intact.
    let expr = parse("pk = 'abc'").unwrap();
    assert!(matches!(
        &expr,
        tablescope_core::expression::Expr::BinOp { name, op, value }
            if name == "pk" && *op == Operator::Equals && *value == Literal::Str("abc".to_owned())
    ));

    // `^=` with a non-string literal parses fine but fails to compile.
    let expr = parse("name ^= 123").unwrap();
    assert!(compile(&expr, &info).is_err());
}

#[tokio::test]
async fn test_should_scan_or_query_and_rerun_recorded_query() {
    let (read, _, provider) = seeded_services().await;
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());

    let rs = read
        .scan_or_query(info.clone(), parse("sk = '222'").unwrap())
        .await
        .unwrap();
    assert_eq!(rs.len(), 1);

    // A new row appears; re-running the recorded query refreshes the view.
    provider
        .put_item(
            TEST_TABLE,
            make_item(&[
                ("pk", AttributeValue::S("xyz".to_owned())),
                ("sk", AttributeValue::S("222".to_owned())),
            ]),
        )
        .await
        .unwrap();

    let query = rs.query().cloned().unwrap();
    let refreshed = read.scan_or_query(info, query).await.unwrap();
    assert_eq!(refreshed.len(), 2);
}

#[tokio::test]
async fn test_should_filter_in_memory_without_store_access() {
    let (read, _, provider) = seeded_services().await;
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());
    let mut rs = read.scan(info).await.unwrap();

    let path = AttrPath::parse("alpha").unwrap();
    rs.set_attribute(1, &path, NewValue::Str("edited".to_owned()))
        .unwrap();

    // Remove everything from the store; the client-side filter still works
    // against the in-memory items and preserves their state.
    for item in rs.items().cloned().collect::<Vec<_>>() {
        provider
            .delete_item(TEST_TABLE, item.key_value(rs.table_info()))
            .await
            .unwrap();
    }

    let narrowed = read.filter(&rs, "beta = 1231").unwrap();
    assert_eq!(narrowed.len(), 1);
    assert!(narrowed.is_dirty(0));
    assert_eq!(
        narrowed.item(0).unwrap().get("alpha"),
        Some(&AttributeValue::S("edited".to_owned()))
    );
}

#[tokio::test]
async fn test_should_match_begins_with_filter_on_strings_only() {
    let (read, _, _) = seeded_services().await;
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());
    let rs = read.scan(info).await.unwrap();

    // 'x' and 'y' both fail the prefix; only items whose alpha starts with
    // 'x' survive.
    let narrowed = read.filter(&rs, "alpha ^= 'x'").unwrap();
    assert_eq!(narrowed.len(), 1);

    // Prefix tests never match the numeric beta attribute.
    let none = read.filter(&rs, "beta ^= '12'").unwrap();
    assert!(none.is_empty());
}

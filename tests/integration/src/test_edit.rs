//! Edit-path tests: marking, bulk edits, create/commit/touch/delete flows.

use std::sync::Arc;

use tablescope_core::TableProvider;
use tablescope_core::events::KeyPromptSequence;
use tablescope_core::path::AttrPath;
use tablescope_core::resultset::{EditError, ItemState, NewValue};
use tablescope_model::AttributeValue;

use crate::{TEST_TABLE, seeded_services};

#[tokio::test]
async fn test_should_keep_inferred_assignment_string_typed() {
    let (read, _, _) = seeded_services().await;
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());
    let mut rs = read.scan(info).await.unwrap();

    // alpha currently holds a string, so numeric-looking input stays a
    // string-typed assignment.
    let path = AttrPath::parse("alpha").unwrap();
    rs.set_attribute(0, &path, NewValue::Inferred("1231".to_owned()))
        .unwrap();

    assert_eq!(
        rs.item(0).unwrap().get("alpha"),
        Some(&AttributeValue::S("1231".to_owned()))
    );
}

#[tokio::test]
async fn test_should_bulk_edit_marked_items_then_commit_them() {
    let (read, write, provider) = seeded_services().await;
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());
    let mut rs = read.scan(info).await.unwrap();

    rs.set_mark(0, true);
    rs.set_mark(1, true);

    let path = AttrPath::parse("alpha").unwrap();
    rs.set_attribute(0, &path, NewValue::Str("bulk".to_owned()))
        .unwrap();

    let dirty_indices: Vec<usize> = rs
        .marked_items()
        .into_iter()
        .map(|mi| mi.index)
        .filter(|&i| rs.is_dirty(i))
        .collect();
    let outcome = write.commit_selection(&mut rs, &dirty_indices).await;

    assert_eq!(outcome.succeeded, vec![0, 1]);
    assert!(outcome.failed.is_empty());
    assert!(!rs.is_dirty(0) && !rs.is_dirty(1));
    // Marks survive a commit.
    assert!(rs.is_marked(0) && rs.is_marked(1));

    for item in provider.scan_items(TEST_TABLE, None, None).await.unwrap() {
        assert_eq!(item.get("alpha"), Some(&AttributeValue::S("bulk".to_owned())));
    }
}

#[tokio::test]
async fn test_should_fail_first_bad_edit_before_later_marked_items() {
    let (read, _, _) = seeded_services().await;
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());
    let mut rs = read.scan(info).await.unwrap();

    rs.set_mark(0, true);
    rs.set_mark(1, true);

    // The nested path resolves on neither item; the first failure aborts
    // the batch and the later marked item stays untouched and clean.
    let path = AttrPath::parse("alpha.inner").unwrap();
    let err = rs
        .set_attribute(0, &path, NewValue::Str("x".to_owned()))
        .unwrap_err();
    assert!(matches!(err, EditError::TypeRequired { .. } | EditError::Path(_)));
    assert!(!rs.is_dirty(1));
}

#[tokio::test]
async fn test_should_create_item_through_key_prompts_and_commit() {
    let (read, write, provider) = seeded_services().await;
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());
    let mut rs = read.scan(info.clone()).await.unwrap();

    let mut prompts = KeyPromptSequence::for_table(&info);
    prompts.answer("zzz".to_owned());
    prompts.answer("001".to_owned());
    assert!(prompts.is_complete());

    rs.add_new_item(prompts.build_item(&info), ItemState::new_item());
    let idx = rs.len() - 1;
    assert!(rs.is_new(idx) && rs.is_dirty(idx));

    write.commit(&mut rs, idx).await.unwrap();
    assert!(!rs.is_new(idx) && !rs.is_dirty(idx));

    let items = provider.scan_items(TEST_TABLE, None, None).await.unwrap();
    assert_eq!(items.len(), 3);
}

#[tokio::test]
async fn test_should_delete_marked_items_then_rescan() {
    let (read, write, _) = seeded_services().await;
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());
    let mut rs = read.scan(info.clone()).await.unwrap();

    rs.set_mark(0, true);
    let marked: Vec<_> = rs.marked_items().into_iter().map(|mi| mi.item).collect();
    write.delete(&info, &marked).await.unwrap();

    // The in-memory set is stale by design until the caller re-scans.
    assert_eq!(rs.len(), 2);
    let refreshed = read.scan(info).await.unwrap();
    assert_eq!(refreshed.len(), 1);
}

#[tokio::test]
async fn test_should_touch_clean_item_without_changing_contents() {
    let (read, write, provider) = seeded_services().await;
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());
    let mut rs = read.scan(info).await.unwrap();

    let before = rs.item(0).unwrap().clone();
    write.touch(&mut rs, 0).await.unwrap();

    let items = provider.scan_items(TEST_TABLE, None, None).await.unwrap();
    assert_eq!(items[0], before);
    assert!(!rs.is_dirty(0));
}

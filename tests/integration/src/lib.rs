//! End-to-end tests driving the Tablescope core against the in-memory
//! provider: describe/scan/filter round trips, edit/commit flows, and
//! background job behavior.

use std::sync::Arc;

use tablescope_core::TableProvider;
use tablescope_core::config::Config;
use tablescope_core::memory::MemoryProvider;
use tablescope_core::services::{TableReadService, TableWriteService};
use tablescope_model::{AttributeValue, Item, KeySchema};

#[cfg(test)]
mod test_browse;
#[cfg(test)]
mod test_edit;
#[cfg(test)]
mod test_jobs;

/// The table name used by the shared fixture.
pub const TEST_TABLE: &str = "service-test-data";

/// Install a test subscriber once; `RUST_LOG` controls verbosity.
fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Build an item from name/value pairs.
#[must_use]
pub fn make_item(pairs: &[(&str, AttributeValue)]) -> Item {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

/// A provider seeded with the shared composite-key fixture table.
pub async fn seeded_provider() -> Arc<MemoryProvider> {
    init_tracing();
    let provider = Arc::new(MemoryProvider::new());
    provider.create_table(
        TEST_TABLE,
        KeySchema {
            partition_key: "pk".to_owned(),
            sort_key: Some("sk".to_owned()),
        },
    );
    provider
        .put_items(
            TEST_TABLE,
            vec![
                make_item(&[
                    ("pk", AttributeValue::S("abc".to_owned())),
                    ("sk", AttributeValue::S("111".to_owned())),
                    ("alpha", AttributeValue::S("x".to_owned())),
                ]),
                make_item(&[
                    ("pk", AttributeValue::S("abc".to_owned())),
                    ("sk", AttributeValue::S("222".to_owned())),
                    ("alpha", AttributeValue::S("y".to_owned())),
                    ("beta", AttributeValue::N("1231".to_owned())),
                ]),
            ],
        )
        .await
        .expect("seeding the fixture table should not fail");
    provider
}

/// Read/write services over a freshly seeded provider.
pub async fn seeded_services() -> (
    TableReadService<MemoryProvider>,
    TableWriteService<MemoryProvider>,
    Arc<MemoryProvider>,
) {
    let provider = seeded_provider().await;
    (
        TableReadService::new(provider.clone(), Config::default()),
        TableWriteService::new(provider.clone()),
        provider,
    )
}

//! Macro-generated test suite for `DataSource<Operator>` contract validation.
//!
//! The `data_source_tests!` macro generates a test module that validates any
//! `DataSource<Operator>` seeded with `Operator::fixtures()` against the full
//! contract: listing with search, filters, sorting and pagination, CRUD and
//! bulk delete.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//!
//! data_source_tests!(operator_source());
//! ```

/// Generate a `DataSource<Operator>` conformance test suite.
///
/// `$factory` is evaluated inside each async test (so it may `.await`) and
/// must yield a fresh source holding exactly the operator fixtures.
#[macro_export]
macro_rules! data_source_tests {
    ($factory:expr) => {
        mod data_source_contract_tests {
            use super::*;
            use console::core::service::DataSource;

            // ==================================================================
            // List
            // ==================================================================

            #[tokio::test]
            async fn test_list_paginates() {
                let source = $factory;
                let page = source.list(&ListParams::new(1, 5)).await.unwrap();

                assert_eq!(ids(&page.items), vec!["op-1", "op-2", "op-3", "op-4", "op-5"]);
                assert_eq!(page.pagination.total, 12);
                assert_eq!(page.pagination.total_pages, 3);
                assert!(page.pagination.has_next);
                assert!(!page.pagination.has_prev);

                let last = source.list(&ListParams::new(3, 5)).await.unwrap();
                assert_eq!(ids(&last.items), vec!["op-11", "op-12"]);
                assert!(!last.pagination.has_next);
            }

            #[tokio::test]
            async fn test_list_page_past_the_end_is_empty() {
                let source = $factory;
                let page = source.list(&ListParams::new(9, 5)).await.unwrap();
                assert!(page.items.is_empty());
                assert_eq!(page.pagination.total, 12);
            }

            #[tokio::test]
            async fn test_list_searches_case_insensitively() {
                let source = $factory;
                let page = source
                    .list(&ListParams::default().with_search("ALISHER"))
                    .await
                    .unwrap();
                assert_eq!(ids(&page.items), vec!["op-1"]);
            }

            #[tokio::test]
            async fn test_list_applies_select_filter() {
                let source = $factory;
                let params = ListParams::default().with_filters(
                    FilterValues::new().with("status", FilterValue::select("inactive")),
                );
                let page = source.list(&params).await.unwrap();
                assert_eq!(ids(&page.items), vec!["op-3", "op-6", "op-9"]);
            }

            #[tokio::test]
            async fn test_list_applies_multiselect_filter() {
                let source = $factory;
                let params = ListParams::default().with_filters(
                    FilterValues::new()
                        .with("region", FilterValue::multi(["Toshkent", "Samarqand"])),
                );
                let page = source.list(&params).await.unwrap();
                assert_eq!(ids(&page.items), vec!["op-1", "op-2"]);
            }

            #[tokio::test]
            async fn test_list_applies_date_range_filter() {
                let source = $factory;
                let params = ListParams::default().with_filters(FilterValues::new().with(
                    "createdAt",
                    FilterValue::date_range(Some("2024-07-01"), Some("2024-07-31")),
                ));
                let page = source.list(&params).await.unwrap();
                assert_eq!(ids(&page.items), vec!["op-9", "op-10"]);
            }

            #[tokio::test]
            async fn test_list_combines_search_and_filters() {
                let source = $factory;
                let params = ListParams::default()
                    .with_search("ov")
                    .with_filters(FilterValues::new().with("status", FilterValue::select("active")));
                let page = source.list(&params).await.unwrap();
                assert!(!page.items.is_empty());
                assert!(page.items.iter().all(|op| op.status == "active"));
                assert!(page.items.iter().all(|op| op.name.to_lowercase().contains("ov")
                    || op.phone.contains("ov")
                    || op.region.to_lowercase().contains("ov")));
            }

            #[tokio::test]
            async fn test_list_sorts() {
                let source = $factory;
                let asc = source
                    .list(&ListParams::new(1, 3).with_sort("name", SortOrder::Asc))
                    .await
                    .unwrap();
                assert_eq!(asc.items[0].name, "Alisher Karimov");

                let desc = source
                    .list(&ListParams::new(1, 3).with_sort("name", SortOrder::Desc))
                    .await
                    .unwrap();
                assert_eq!(desc.items[0].name, "Zarina Mirzayeva");
            }

            // ==================================================================
            // Get / Create / Update
            // ==================================================================

            #[tokio::test]
            async fn test_get_existing_and_missing() {
                let source = $factory;
                let op = source.get("op-2").await.unwrap();
                assert_eq!(op.name, "Malika Yusupova");

                let err = source.get("op-404").await.unwrap_err();
                assert!(err.is_not_found(), "{err:?}");
            }

            #[tokio::test]
            async fn test_create_assigns_fresh_id() {
                let source = $factory;
                let created = source
                    .create(operator_form("Bobur", "Buxoro", "active"))
                    .await
                    .unwrap();

                assert!(!created.id.is_empty());
                assert_eq!(created.region, "Buxoro");
                assert_eq!(source.get(&created.id).await.unwrap(), created);

                let page = source.list(&ListParams::default()).await.unwrap();
                assert_eq!(page.pagination.total, 13);
                assert_eq!(page.items.last().map(|op| op.id.clone()), Some(created.id));
            }

            #[tokio::test]
            async fn test_create_invalid_form_names_fields() {
                let source = $factory;
                let mut form = operator_form("Bobur", "Buxoro", "active");
                form.phone = "call me".to_string();
                form.status = "archived".to_string();

                let err = source.create(form).await.unwrap_err();
                let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"phone"), "{err:?}");
                assert!(fields.contains(&"status"), "{err:?}");

                let page = source.list(&ListParams::default()).await.unwrap();
                assert_eq!(page.pagination.total, 12);
            }

            #[tokio::test]
            async fn test_update_keeps_identity() {
                let source = $factory;
                let before = source.get("op-4").await.unwrap();
                let updated = source
                    .update("op-4", operator_form("Dilnoza T.", "Navoiy", "inactive"))
                    .await
                    .unwrap();

                assert_eq!(updated.id, "op-4");
                assert_eq!(updated.created_at, before.created_at);
                assert_eq!(updated.name, "Dilnoza T.");
                assert_eq!(updated.region, "Navoiy");
                assert_eq!(updated.status, "inactive");
                assert_eq!(source.get("op-4").await.unwrap(), updated);
            }

            #[tokio::test]
            async fn test_update_missing_is_not_found() {
                let source = $factory;
                let err = source
                    .update("op-404", operator_form("Nobody", "Navoiy", "active"))
                    .await
                    .unwrap_err();
                assert!(err.is_not_found(), "{err:?}");
            }

            // ==================================================================
            // Delete
            // ==================================================================

            #[tokio::test]
            async fn test_delete_removes_item() {
                let source = $factory;
                source.delete("op-5").await.unwrap();

                assert!(source.get("op-5").await.unwrap_err().is_not_found());
                let err = source.delete("op-5").await.unwrap_err();
                assert!(err.is_not_found(), "{err:?}");
            }

            #[tokio::test]
            async fn test_bulk_delete_reports_deleted_and_missing() {
                let source = $factory;
                let result = source
                    .bulk_delete(&[
                        "op-1".to_string(),
                        "op-404".to_string(),
                        "op-7".to_string(),
                        "op-1".to_string(),
                    ])
                    .await
                    .unwrap();

                assert_eq!(result.deleted, vec!["op-1", "op-7"]);
                assert_eq!(result.missing, vec!["op-404"]);

                let page = source.list(&ListParams::default()).await.unwrap();
                assert_eq!(page.pagination.total, 10);
                assert!(!ids(&page.items).contains(&"op-7".to_string()));
            }

            #[tokio::test]
            async fn test_bulk_delete_nothing() {
                let source = $factory;
                let result = source.bulk_delete(&[]).await.unwrap();
                assert!(result.deleted.is_empty());
                assert!(result.missing.is_empty());
            }
        }
    };
}

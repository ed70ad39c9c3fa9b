//! Tests for the in-memory resource controller
//!
//! These tests verify that:
//! - The filtered view is a pure, order-preserving function of the state
//! - Filters compose as an intersection
//! - CRUD keeps ids unique and identities stable
//! - Staged deletes and bulk deletes leave a consistent collection

use chrono::Utc;
use console::prelude::*;
use console::resources::{Operator, OperatorForm, Service};

fn operator(id: &str, name: &str, region: &str, status: &str) -> Operator {
    Operator::fixture(id, name, region, status, "2024-01-01T00:00:00Z")
}

fn form(name: &str, region: &str, status: &str) -> OperatorForm {
    OperatorForm {
        name: name.to_string(),
        status: status.to_string(),
        region: region.to_string(),
        phone: "+998 90 123 45 67".to_string(),
        citizenship: "UZ".to_string(),
    }
}

fn ids(items: &[Operator]) -> Vec<&str> {
    items.iter().map(|op| op.id.as_str()).collect()
}

/// The two operators of the example scenarios
fn pair() -> ResourceController<Operator> {
    ResourceController::new(Operator::filter_specs())
        .with_items(vec![
            operator("1", "Alisher", "Toshkent", "active"),
            operator("2", "Malika", "Samarqand", "inactive"),
        ])
        .unwrap()
}

fn seeded() -> ResourceController<Operator> {
    ResourceController::new(Operator::filter_specs())
        .with_items(Operator::fixtures())
        .unwrap()
}

// =============================================================================
// Example scenarios
// =============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn test_status_filter_keeps_active_operator() {
        let mut controller = pair();
        controller.set_search_term("");
        controller.set_filter("status", FilterValue::select("active"));

        assert_eq!(ids(&controller.filtered_list()), vec!["1"]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut controller = pair();
        controller.set_search_term("mal");

        assert_eq!(ids(&controller.filtered_list()), vec!["2"]);
    }

    #[test]
    fn test_create_on_empty_controller() {
        let mut controller = ResourceController::<Operator>::new(Operator::filter_specs());
        let before = Utc::now();
        let created = controller.create(form("Bobur", "Buxoro", "active")).unwrap();
        let after = Utc::now();

        assert_eq!(controller.len(), 1);
        let listed = &controller.list()[0];
        assert_eq!(listed, &created);
        assert!(!listed.id.is_empty());
        assert_eq!(listed.name, "Bobur");
        assert_eq!(listed.region, "Buxoro");
        assert!(listed.created_at >= before && listed.created_at <= after);
    }

    #[test]
    fn test_remove_unknown_id_is_not_found() {
        let mut controller = pair();
        let before = controller.list().to_vec();

        let err = controller.remove("99").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(controller.list(), before.as_slice());
    }

    #[test]
    fn test_unparsable_numeric_bound_is_ignored() {
        let mut controller = ResourceController::new(Service::filter_specs())
            .with_items(vec![Service::fixture("s-1", "Internet 50", "internet", 1500.0, "Toshkent")])
            .unwrap();
        controller.set_filter("price", FilterValue::numeric_range(Some("1000"), Some("abc")));

        assert_eq!(controller.filtered_list().len(), 1);

        controller.set_filter("price", FilterValue::numeric_range(Some("2000"), Some("abc")));
        assert!(controller.filtered_list().is_empty());
    }

    #[test]
    fn test_page_window_example() {
        let mut pager = Pager::new(10);
        pager.go_to(3);
        assert_eq!(
            pager.window(),
            vec![
                PageItem::Page(1),
                PageItem::Page(2),
                PageItem::Page(3),
                PageItem::Page(4),
                PageItem::Page(5),
                PageItem::Ellipsis,
                PageItem::Page(10),
            ]
        );
    }
}

// =============================================================================
// Properties
// =============================================================================

mod properties {
    use super::*;

    /// Filter settings exercised by the property tests
    fn filter_cases() -> Vec<(&'static str, FilterValue)> {
        vec![
            ("status", FilterValue::select("active")),
            ("status", FilterValue::select("inactive")),
            ("region", FilterValue::multi(["Toshkent", "Samarqand", "Buxoro"])),
            ("region", FilterValue::multi(["Navoiy"])),
            ("citizenship", FilterValue::select("KZ")),
            (
                "createdAt",
                FilterValue::date_range(Some("2024-03-01"), Some("2024-08-31")),
            ),
            ("createdAt", FilterValue::date_range(None, Some("2024-04-02"))),
        ]
    }

    fn apply(engine: &FilterEngine, items: &[Operator], values: &FilterValues) -> Vec<Operator> {
        engine.apply(items, "", values)
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let controller = seeded();
        let engine = controller.engine();
        for (id, value) in filter_cases() {
            let values = FilterValues::new().with(id, value);
            let first = apply(engine, controller.list(), &values);
            let second = apply(engine, controller.list(), &values);
            assert_eq!(first, second, "filter {id}");
        }
    }

    #[test]
    fn test_filters_compose_as_intersection() {
        let controller = seeded();
        let engine = controller.engine();
        let items = controller.list();

        for (a_id, a) in filter_cases() {
            for (b_id, b) in filter_cases() {
                if a_id == b_id {
                    continue;
                }
                let only_a = apply(engine, items, &FilterValues::new().with(a_id, a.clone()));
                let only_b = apply(engine, items, &FilterValues::new().with(b_id, b.clone()));
                let both = apply(
                    engine,
                    items,
                    &FilterValues::new().with(a_id, a.clone()).with(b_id, b.clone()),
                );

                let expected: Vec<&Operator> =
                    only_a.iter().filter(|op| only_b.contains(op)).collect();
                let both: Vec<&Operator> = both.iter().collect();
                assert_eq!(both, expected, "{a_id} AND {b_id}");
            }
        }
    }

    #[test]
    fn test_filtering_preserves_order() {
        let controller = seeded();
        let position = |id: &str| controller.list().iter().position(|op| op.id == id).unwrap();

        for (id, value) in filter_cases() {
            let filtered = apply(controller.engine(), controller.list(), &FilterValues::new().with(id, value));
            let positions: Vec<usize> = filtered.iter().map(|op| position(&op.id)).collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "filter {id}: {positions:?}");
        }
    }

    #[test]
    fn test_update_keeps_single_record_with_same_identity() {
        let mut controller = seeded();
        for target in ["op-1", "op-6", "op-12"] {
            let before = controller.get(target).unwrap().clone();
            controller
                .update(target, form("Yangi nom", "Xorazm", "inactive"))
                .unwrap();

            let matching: Vec<&Operator> =
                controller.list().iter().filter(|op| op.id == target).collect();
            assert_eq!(matching.len(), 1);
            let after = matching[0];
            assert_eq!(after.created_at, before.created_at);
            assert_eq!(after.name, "Yangi nom");
            assert_eq!(after.region, "Xorazm");
            assert_eq!(after.status, "inactive");
            assert_eq!(after.phone, "+998 90 123 45 67");
        }
        assert_eq!(controller.len(), 12);
    }

    #[test]
    fn test_bulk_remove_is_complete() {
        let cases: [&[&str]; 4] = [
            &["op-1"],
            &["op-2", "op-5", "op-11"],
            &["op-3", "op-404", "op-3"],
            &[],
        ];

        for doomed in cases {
            let mut controller = seeded();
            let before = controller.list().to_vec();
            controller.bulk_remove(doomed);

            let expected: Vec<&str> = before
                .iter()
                .map(|op| op.id.as_str())
                .filter(|id| !doomed.contains(id))
                .collect();
            assert_eq!(ids(controller.list()), expected, "removing {doomed:?}");
        }
    }

    #[test]
    fn test_pager_bounds() {
        let mut empty = Pager::new(0);
        assert!(empty.window().is_empty());
        assert_eq!(empty.previous(), empty.current_page());
        assert_eq!(empty.next(), empty.current_page());

        let mut pager = Pager::new(4);
        assert_eq!(pager.previous(), 1);
        pager.go_to(4);
        assert_eq!(pager.next(), 4);
    }
}

// =============================================================================
// Controller behaviour
// =============================================================================

mod behaviour {
    use super::*;

    #[test]
    fn test_duplicate_seed_id_is_rejected() {
        let err = ResourceController::<Operator>::new(vec![])
            .with_items(vec![
                operator("1", "Alisher", "Toshkent", "active"),
                operator("1", "Malika", "Samarqand", "active"),
            ])
            .unwrap_err();
        assert_eq!(err.error_code(), "RESOURCE_ALREADY_EXISTS");
    }

    #[test]
    fn test_invalid_create_leaves_collection_untouched() {
        let mut controller = pair();
        let err = controller.create(form("   ", "", "archived")).unwrap_err();

        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "region", "status"]);
        assert_eq!(controller.len(), 2);
    }

    #[test]
    fn test_update_unknown_id_is_not_found_even_with_invalid_form() {
        let mut controller = pair();
        let err = controller.update("99", form("", "", "")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_staged_delete() {
        let mut controller = pair();
        assert!(matches!(
            controller.confirm_delete(),
            Err(ConsoleError::NothingPending)
        ));

        assert_eq!(controller.request_delete("2").unwrap().name, "Malika");
        assert_eq!(controller.pending_delete().map(|op| op.id.as_str()), Some("2"));

        controller.cancel_delete();
        assert!(controller.pending_delete().is_none());

        controller.request_delete("2").unwrap();
        let removed = controller.confirm_delete().unwrap();
        assert_eq!(removed.id, "2");
        assert_eq!(ids(controller.list()), vec!["1"]);
        assert!(controller.pending_delete().is_none());
    }

    #[test]
    fn test_removing_pending_target_clears_marker() {
        let mut controller = pair();
        controller.request_delete("1").unwrap();
        controller.remove("1").unwrap();
        assert!(controller.pending_delete().is_none());

        controller.request_delete("2").unwrap();
        controller.bulk_remove(&["2"]);
        assert!(controller.pending_delete().is_none());
    }

    #[test]
    fn test_request_delete_unknown_id() {
        let mut controller = pair();
        assert!(controller.request_delete("99").unwrap_err().is_not_found());
        assert!(controller.pending_delete().is_none());
    }

    #[test]
    fn test_page_combines_filters_and_pagination() {
        let mut controller = seeded();
        controller.set_filter("status", FilterValue::select("active"));

        let page = controller.page(2, 4);
        assert_eq!(page.pagination.total, 9);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(ids(&page.items), vec!["op-7", "op-8", "op-10", "op-11"]);
    }

    #[test]
    fn test_filter_panel_drives_controller() {
        let mut controller = seeded();
        let mut panel = FilterPanel::new(Operator::filter_specs());
        panel.toggle_option("region", "Toshkent").unwrap();
        panel.toggle_option("region", "Samarqand").unwrap();
        panel.set_select("status", "active").unwrap();

        controller.set_filters(panel.values().clone());
        assert_eq!(ids(&controller.filtered_list()), vec!["op-1", "op-2"]);

        panel.reset();
        controller.set_filters(panel.values().clone());
        assert_eq!(controller.filtered_list().len(), 12);
    }

    #[tokio::test]
    async fn test_mutations_are_published() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let mut controller = pair().with_event_bus(bus);

        let created = controller.create(form("Bobur", "Buxoro", "active")).unwrap();
        controller.remove("1").unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.event.action(), "created");
        assert_eq!(first.event.resource(), Some("operator"));
        match first.event {
            ConsoleEvent::Resource(ResourceEvent::Created { id, .. }) => assert_eq!(id, created.id),
            other => panic!("unexpected event: {other:?}"),
        }

        let second = rx.recv().await.unwrap();
        assert!(matches!(
            second.event,
            ConsoleEvent::Resource(ResourceEvent::Deleted { ref id, .. }) if id == "1"
        ));
    }
}

//! Data-Layer Integration Tests
//!
//! Exercises the services end to end against the in-memory remote
//! backend: validate → rate-check → remote call → local slot update.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::domain::{DomainError, PaintStatus};
    use crate::ratelimit::RateLimiter;
    use crate::repository::{MemoryTable, RemoteTable};
    use crate::service::{CollectionDraft, GoalDraft, MiniDraft, MiniPatch, WishlistDraft};
    use crate::DataLayer;

    const USER: &str = "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11";
    const OTHER_USER: &str = "b1ffcd88-8d1a-4fe7-aa5c-5aa8ac270b22";
    const MINI_A: &str = "c2aabe77-7c2b-4fd6-9a4b-4aa7ab160c33";
    const MINI_B: &str = "d3bbcf66-6b3c-4ec5-8b3a-3bb6bc050d44";
    const GHOST: &str = "e4ccd055-5a4d-4db4-7c29-2cc5cd940e55";

    fn layer() -> (Arc<MemoryTable>, DataLayer) {
        let remote = Arc::new(MemoryTable::new());
        let data = DataLayer::new(remote.clone(), Arc::new(RateLimiter::default()), USER);
        (remote, data)
    }

    async fn collection_id(data: &DataLayer) -> String {
        data.collections
            .create(CollectionDraft {
                name: "Blood Angels".to_string(),
                description: None,
            })
            .await
            .expect("create collection")
            .id
    }

    #[tokio::test]
    async fn test_create_flows_into_local_slot() {
        let (_, data) = layer();
        let collection = collection_id(&data).await;
        let mini = data
            .minis
            .create(MiniDraft {
                collection_id: collection,
                name: "  Intercessors ".to_string(),
                game_system: "warhammer_40k".to_string(),
                faction: None,
                quantity: 10,
            })
            .await
            .expect("create mini");
        assert_eq!(mini.name, "Intercessors");
        assert!(!mini.id.is_empty());
        assert_eq!(data.minis.rows().await.len(), 1);
        assert!(data.minis.last_error().is_none());
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_slot_unchanged() {
        let (remote, data) = layer();
        let collection = collection_id(&data).await;
        remote.script_failure("service unavailable");
        let result = data
            .minis
            .create(MiniDraft {
                collection_id: collection,
                name: "Terminators".to_string(),
                game_system: "warhammer_40k".to_string(),
                faction: None,
                quantity: 5,
            })
            .await;
        assert_eq!(
            result.unwrap_err(),
            DomainError::Remote("service unavailable".to_string())
        );
        assert!(data.minis.rows().await.is_empty());
        // The error slot surfaces the verbatim remote message.
        assert_eq!(
            data.minis.last_error().unwrap().to_string(),
            "service unavailable"
        );
    }

    #[tokio::test]
    async fn test_delete_of_id_absent_from_slot_succeeds() {
        let (_, data) = layer();
        let collection = collection_id(&data).await;
        data.minis
            .create(MiniDraft {
                collection_id: collection,
                name: "Rhino".to_string(),
                game_system: "warhammer_40k".to_string(),
                faction: None,
                quantity: 1,
            })
            .await
            .unwrap();
        let before = data.minis.rows().await;
        data.minis.delete(GHOST).await.expect("delete is idempotent");
        assert_eq!(data.minis.rows().await, before);
    }

    #[tokio::test]
    async fn test_count_update_recomputes_status_cache() {
        let (_, data) = layer();
        let collection = collection_id(&data).await;
        let mini = data
            .minis
            .create(MiniDraft {
                collection_id: collection,
                name: "Assault Squad".to_string(),
                game_system: "warhammer_40k".to_string(),
                faction: None,
                quantity: 5,
            })
            .await
            .unwrap();
        let updated = data
            .minis
            .update(
                &mini.id,
                MiniPatch {
                    count_painted: Some(5),
                    ..MiniPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, PaintStatus::Painted);
        let updated = data
            .minis
            .update(
                &mini.id,
                MiniPatch {
                    count_nib: Some(2),
                    ..MiniPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, PaintStatus::Wip);
        assert_eq!(data.minis.rows().await[0].status, PaintStatus::Wip);
    }

    #[tokio::test]
    async fn test_queue_append_assigns_next_rank() {
        let (_, data) = layer();
        let first = data.queue.append(MINI_A, None).await.unwrap();
        let second = data.queue.append(MINI_B, None).await.unwrap();
        assert_eq!(first.priority, 0);
        assert_eq!(second.priority, 1);
    }

    #[tokio::test]
    async fn test_queue_rejects_double_append() {
        let (_, data) = layer();
        data.queue.append(MINI_A, None).await.unwrap();
        let err = data.queue.append(MINI_A, None).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(data.queue.rows().await.len(), 1);
    }

    #[tokio::test]
    async fn test_queue_tolerates_priority_gaps() {
        let (remote, data) = layer();
        for priority in [5, 17] {
            remote
                .insert(
                    "paint_queue",
                    json!({
                        "user_id": USER,
                        "mini_id": uuid::Uuid::new_v4().to_string(),
                        "priority": priority,
                    }),
                )
                .await
                .unwrap();
        }
        data.queue.refresh().await.unwrap();
        let appended = data.queue.append(MINI_A, None).await.unwrap();
        assert_eq!(appended.priority, 18);
    }

    #[tokio::test]
    async fn test_move_up_on_first_entry_is_noop() {
        let (_, data) = layer();
        let first = data.queue.append(MINI_A, None).await.unwrap();
        data.queue.append(MINI_B, None).await.unwrap();
        data.queue.move_up(&first.id).await.expect("no-op, no error");
        let rows = data.queue.rows().await;
        assert_eq!(rows[0].id, first.id);
    }

    #[tokio::test]
    async fn test_move_up_swaps_exactly_once() {
        let (_, data) = layer();
        let first = data.queue.append(MINI_A, None).await.unwrap();
        let second = data.queue.append(MINI_B, None).await.unwrap();
        data.queue.move_up(&second.id).await.unwrap();
        let rows = data.queue.rows().await;
        assert_eq!(rows[0].id, second.id);
        assert_eq!(rows[1].id, first.id);
        // Ranks were swapped, not renumbered.
        assert_eq!(rows[0].priority, 0);
        assert_eq!(rows[1].priority, 1);
    }

    #[tokio::test]
    async fn test_move_down_is_symmetric() {
        let (_, data) = layer();
        let first = data.queue.append(MINI_A, None).await.unwrap();
        let second = data.queue.append(MINI_B, None).await.unwrap();
        data.queue.move_down(&first.id).await.unwrap();
        let rows = data.queue.rows().await;
        assert_eq!(rows[0].id, second.id);
        assert_eq!(rows[1].id, first.id);
    }

    #[tokio::test]
    async fn test_partial_swap_failure_keeps_local_order() {
        let (remote, data) = layer();
        let first = data.queue.append(MINI_A, None).await.unwrap();
        let second = data.queue.append(MINI_B, None).await.unwrap();
        remote.script_ok();
        remote.script_failure("connection reset");
        let err = data.queue.move_up(&second.id).await.unwrap_err();
        assert_eq!(err, DomainError::Remote("connection reset".to_string()));
        let rows = data.queue.rows().await;
        assert_eq!(rows[0].id, first.id);
        assert_eq!(rows[1].id, second.id);
    }

    #[tokio::test]
    async fn test_move_of_unknown_entry_is_not_found() {
        let (_, data) = layer();
        data.queue.append(MINI_A, None).await.unwrap();
        let err = data.queue.move_up(GHOST).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_queue_refresh_embeds_miniature() {
        let (remote, data) = layer();
        let collection = collection_id(&data).await;
        let mini = data
            .minis
            .create(MiniDraft {
                collection_id: collection,
                name: "Dreadnought".to_string(),
                game_system: "warhammer_40k".to_string(),
                faction: None,
                quantity: 1,
            })
            .await
            .unwrap();
        data.queue.append(&mini.id, None).await.unwrap();
        data.queue.refresh().await.unwrap();
        let rows = data.queue.rows().await;
        assert_eq!(rows[0].mini.as_ref().unwrap().name, "Dreadnought");
        assert_eq!(remote.row_count("paint_queue"), 1);
    }

    #[tokio::test]
    async fn test_goal_progress_clamps_and_completes() {
        let (_, data) = layer();
        let goal = data
            .goals
            .create(GoalDraft {
                title: "Escalation league".to_string(),
                goal_type: "paint_minis".to_string(),
                target_count: 10,
                deadline: Some("2026-12-31".to_string()),
            })
            .await
            .unwrap();
        assert!(!goal.completed);
        let halfway = data.goals.record_progress(&goal.id, 5).await.unwrap();
        assert_eq!(halfway.current_count, 5);
        assert!(!halfway.completed);
        let done = data.goals.record_progress(&goal.id, 99).await.unwrap();
        assert_eq!(done.current_count, 10);
        assert!(done.completed);
    }

    #[tokio::test]
    async fn test_wishlist_orders_unpurchased_first() {
        let (_, data) = layer();
        let cheap = data
            .wishlist
            .create(WishlistDraft {
                name: "Combat Patrol".to_string(),
                game_system: Some("warhammer_40k".to_string()),
                notes: None,
                priority: 2,
            })
            .await
            .unwrap();
        data.wishlist
            .create(WishlistDraft {
                name: "Codex".to_string(),
                game_system: None,
                notes: None,
                priority: 1,
            })
            .await
            .unwrap();
        data.wishlist.toggle_purchased(&cheap.id).await.unwrap();
        data.wishlist.refresh().await.unwrap();
        let rows = data.wishlist.rows().await;
        assert_eq!(rows[0].name, "Codex");
        assert!(rows[1].purchased);
    }

    #[tokio::test]
    async fn test_follow_rejects_self_and_duplicates() {
        let (_, data) = layer();
        let err = data.follows.follow(USER).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        data.follows.follow(OTHER_USER).await.unwrap();
        let err = data.follows.follow(OTHER_USER).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(data.follows.rows().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unfollow_removes_the_edge() {
        let (_, data) = layer();
        data.follows.follow(OTHER_USER).await.unwrap();
        data.follows.unfollow(OTHER_USER).await.unwrap();
        assert!(data.follows.rows().await.is_empty());
        let err = data.follows.unfollow(OTHER_USER).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_follow_refresh_embeds_profile() {
        let (remote, data) = layer();
        remote
            .insert(
                "profiles",
                json!({ "id": OTHER_USER, "display_name": "brushwitch" }),
            )
            .await
            .unwrap();
        data.follows.follow(OTHER_USER).await.unwrap();
        data.follows.refresh().await.unwrap();
        let rows = data.follows.rows().await;
        assert_eq!(
            rows[0].profile.as_ref().unwrap().display_name.as_deref(),
            Some("brushwitch")
        );
    }

    #[tokio::test]
    async fn test_refresh_scopes_to_the_subject() {
        let (remote, data) = layer();
        remote
            .insert(
                "collections",
                json!({ "user_id": OTHER_USER, "name": "Someone else's" }),
            )
            .await
            .unwrap();
        data.collections
            .create(CollectionDraft {
                name: "Mine".to_string(),
                description: None,
            })
            .await
            .unwrap();
        data.collections.refresh().await.unwrap();
        let rows = data.collections.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Mine");
    }

    #[tokio::test]
    async fn test_progress_rollup_over_local_rows() {
        let (_, data) = layer();
        let collection = collection_id(&data).await;
        let painted = data
            .minis
            .create(MiniDraft {
                collection_id: collection.clone(),
                name: "Painted squad".to_string(),
                game_system: "warhammer_40k".to_string(),
                faction: None,
                quantity: 2,
            })
            .await
            .unwrap();
        data.minis
            .update(
                &painted.id,
                MiniPatch {
                    count_painted: Some(2),
                    ..MiniPatch::default()
                },
            )
            .await
            .unwrap();
        let fresh = data
            .minis
            .create(MiniDraft {
                collection_id: collection,
                name: "Gray squad".to_string(),
                game_system: "warhammer_40k".to_string(),
                faction: None,
                quantity: 2,
            })
            .await
            .unwrap();
        data.minis
            .update(
                &fresh.id,
                MiniPatch {
                    count_nib: Some(2),
                    ..MiniPatch::default()
                },
            )
            .await
            .unwrap();
        let summary = data.overall_progress().await;
        assert_eq!(summary.percentage, 50);
    }
}

//! Vector store behaviour on the in-memory backend

#[cfg(test)]
mod store_tests {
    use chrono::Duration;
    use chrono::Utc;

    use crate::models::ChatRole;
    use crate::models::NewChatMessage;
    use crate::models::SourceCitation;
    use crate::models::SourceType;
    use crate::tests::axis_vector;
    use crate::tests::memory_store;
    use crate::tests::new_document;
    use crate::vector_store::SearchFilter;

    // ====== Search filtering ======

    #[tokio::test]
    async fn test_symbol_search_includes_global_and_excludes_other_symbols() {
        let (store, _) = memory_store();
        let now = Utc::now();

        let documents = vec![
            new_document(SourceType::Education, None, "What is beta?", "Beta", None),
            new_document(
                SourceType::News,
                Some("AAPL"),
                "Apple beats estimates",
                "Revenue up",
                Some(now + Duration::days(30)),
            ),
            new_document(
                SourceType::Research,
                Some("MSFT"),
                "Risk Analysis: MSFT",
                "Beta: 0.9",
                Some(now + Duration::days(7)),
            ),
        ];
        let embeddings = vec![
            axis_vector(0, None),
            axis_vector(0, Some((1, 0.5))),
            axis_vector(0, None),
        ];
        assert_eq!(store.store_documents(&documents, &embeddings).await.into_value(), 3);

        let filter = SearchFilter::new(axis_vector(0, None))
            .with_symbol(Some("AAPL"))
            .with_top_k(5);
        let hits = store.search_similar(&filter).await.into_value();

        let titles: Vec<&str> = hits.iter().map(|h| h.document.title.as_str()).collect();
        assert_eq!(titles, vec!["What is beta?", "Apple beats estimates"]);
    }

    #[tokio::test]
    async fn test_expired_documents_never_returned() {
        let (store, _) = memory_store();
        let documents = vec![
            new_document(
                SourceType::Research,
                Some("AAPL"),
                "Stale",
                "old",
                Some(Utc::now() - Duration::hours(1)),
            ),
            new_document(SourceType::Education, None, "Fresh", "new", None),
        ];
        // The stale document is the exact match
        let embeddings = vec![axis_vector(3, None), axis_vector(3, Some((4, 1.0)))];
        store.store_documents(&documents, &embeddings).await;

        let filter = SearchFilter::new(axis_vector(3, None)).with_score_threshold(0.0);
        let hits = store.search_similar(&filter).await.into_value();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.title, "Fresh");
    }

    #[tokio::test]
    async fn test_results_sorted_and_above_threshold() {
        let (store, _) = memory_store();
        let weights = [0.0f32, 0.3, 1.0, 2.0, 5.0];
        let documents: Vec<_> = weights
            .iter()
            .map(|w| new_document(SourceType::Education, None, &format!("w{w}"), "c", None))
            .collect();
        let embeddings: Vec<_> = weights
            .iter()
            .map(|w| axis_vector(0, Some((1, *w))))
            .collect();
        store.store_documents(&documents, &embeddings).await;

        let filter = SearchFilter::new(axis_vector(0, None))
            .with_top_k(10)
            .with_score_threshold(0.5);
        let hits = store.search_similar(&filter).await.into_value();

        // Scores: 1.0, 0.958, 0.707, 0.447, 0.196
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert!(hits.iter().all(|hit| hit.score >= 0.5));
        assert_eq!(hits[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_source_type_filter_and_top_k() {
        let (store, _) = memory_store();
        let documents = vec![
            new_document(SourceType::News, None, "n1", "c", None),
            new_document(SourceType::News, None, "n2", "c", None),
            new_document(SourceType::Education, None, "e1", "c", None),
        ];
        let embeddings = vec![axis_vector(0, None); 3];
        store.store_documents(&documents, &embeddings).await;

        let filter = SearchFilter::new(axis_vector(0, None))
            .with_source_types(Some(vec![SourceType::News]))
            .with_top_k(1);
        let hits = store.search_similar(&filter).await.into_value();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.source_type, SourceType::News);

        // An empty type list does not filter
        let filter = SearchFilter::new(axis_vector(0, None))
            .with_source_types(Some(Vec::new()))
            .with_top_k(10);
        assert_eq!(store.search_similar(&filter).await.into_value().len(), 3);
    }

    #[tokio::test]
    async fn test_wrong_query_dimension_degrades_to_empty() {
        let (store, _) = memory_store();
        let outcome = store.search_similar(&SearchFilter::new(vec![1.0, 0.0])).await;
        assert!(outcome.is_degraded());
        assert!(outcome.value().is_empty());
    }

    // ====== Expiry sweep ======

    #[tokio::test]
    async fn test_delete_expired_removes_past_research() {
        let (store, _) = memory_store();
        let documents = vec![new_document(
            SourceType::Research,
            Some("AAPL"),
            "Risk Analysis: AAPL",
            "Beta: 1.2",
            Some(Utc::now() - Duration::days(1)),
        )];
        store.store_documents(&documents, &[axis_vector(0, None)]).await;

        assert_eq!(store.delete_expired().await.into_value(), 1);
        let count = store
            .get_document_count(Some(SourceType::Research), None)
            .await;
        assert_eq!(count.into_value(), 0);
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_evergreen_and_future() {
        let (store, _) = memory_store();
        let documents = vec![
            new_document(SourceType::Education, None, "e", "c", None),
            new_document(
                SourceType::News,
                Some("AAPL"),
                "n",
                "c",
                Some(Utc::now() + Duration::days(30)),
            ),
        ];
        store
            .store_documents(&documents, &[axis_vector(0, None), axis_vector(1, None)])
            .await;

        assert_eq!(store.delete_expired().await.into_value(), 0);
        let counts = store.document_counts_by_type().await.into_value();
        assert_eq!(counts[&SourceType::Education], 1);
        assert_eq!(counts[&SourceType::News], 1);
        assert_eq!(counts[&SourceType::Research], 0);
    }

    // ====== Chat history ======

    #[tokio::test]
    async fn test_chat_history_is_chronological() {
        let (store, _) = memory_store();
        let citation = SourceCitation {
            title: "What is beta?".to_string(),
            source_type: SourceType::Education,
            symbol: None,
            score: 0.81,
        };

        store
            .store_chat_message(&NewChatMessage::user("u1", "s1", "What is beta?"))
            .await;
        store
            .store_chat_message(&NewChatMessage::assistant(
                "u1",
                "s1",
                "Beta measures volatility.",
                vec![citation.clone()],
            ))
            .await;
        store
            .store_chat_message(&NewChatMessage::user("u1", "s1", "And for AAPL?"))
            .await;
        store
            .store_chat_message(&NewChatMessage::user("u2", "s2", "Other session"))
            .await;

        let history = store.get_chat_history("s1", 10).await.into_value();
        let roles: Vec<ChatRole> = history.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant, ChatRole::User]);
        assert_eq!(history[0].content, "What is beta?");
        assert_eq!(history[1].sources, vec![citation]);
        assert_eq!(history[2].content, "And for AAPL?");
    }

    #[tokio::test]
    async fn test_chat_history_limit_keeps_latest() {
        let (store, _) = memory_store();
        for i in 0..5 {
            store
                .store_chat_message(&NewChatMessage::user("u1", "s1", &format!("m{i}")))
                .await;
        }

        let history = store.get_chat_history("s1", 2).await.into_value();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m3", "m4"]);
    }

    // ====== Ingestion log ======

    #[tokio::test]
    async fn test_last_ingestion_tracks_latest_run() {
        let (store, _) = memory_store();
        assert!(store
            .get_last_ingestion(SourceType::Research, Some("AAPL"))
            .await
            .into_value()
            .is_none());

        let before = Utc::now();
        store.log_ingestion(SourceType::Research, Some("AAPL"), 3).await;

        let last = store
            .get_last_ingestion(SourceType::Research, Some("aapl"))
            .await
            .into_value();
        assert!(last.is_some_and(|at| at >= before));
    }
}

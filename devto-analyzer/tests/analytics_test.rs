mod common;

use common::{article, at, init_tracing};
use devto_analyzer::metrics::{overall_stats, rank, tag_performance, time_performance};
use devto_analyzer::recommend::{posting_time_recommendations, tag_recommendations, TagRecommendation};
use devto_analyzer::{ArticleStore, InsightGenerator, Metrics, MockInsightGenerator, RankMetric, Report, SeriesSet};

fn compute(articles: Vec<devto_analyzer::Article>) -> (ArticleStore, SeriesSet, Metrics) {
    let store = ArticleStore::new(articles);
    let series = SeriesSet::extract(&store);
    let metrics = Metrics::compute(&store, &series);
    (store, series, metrics)
}

fn ids(articles: &[devto_analyzer::ArticleMetrics]) -> Vec<u64> {
    articles.iter().map(|a| a.id).collect()
}

#[test]
fn test_empty_store_yields_zeroed_aggregates() {
    init_tracing();
    let (_, series, metrics) = compute(Vec::new());

    let stats = &metrics.overall_stats;
    assert_eq!(stats.total_articles, 0);
    assert_eq!(stats.avg_views_per_article, 0.0);
    assert_eq!(stats.avg_reactions_per_article, 0.0);
    assert_eq!(stats.avg_reading_time, 0.0);
    assert!(stats.most_used_tags.is_empty());

    assert!(metrics.articles.is_empty());
    assert!(metrics.tag_performance.is_empty());
    assert!(metrics.time_performance.by_day.is_empty());
    assert!(metrics.time_performance.best_combinations.is_empty());
    assert!(series.series_performance().is_empty());
    assert!(tag_recommendations(&metrics.tag_performance, &metrics.articles).is_empty());
}

#[test]
fn test_single_tag_aggregation() {
    let (_, _, metrics) = compute(vec![
        article(1, 100, 10, 1, &["python"]),
        article(2, 100, 20, 2, &["python"]),
        article(3, 100, 30, 3, &["python"]),
    ]);

    assert_eq!(metrics.tag_performance.len(), 1);
    let python = &metrics.tag_performance[0];
    assert_eq!(python.tag, "python");
    assert_eq!(python.count, 3);
    assert_eq!(python.total_reactions, 60);
    assert_eq!(python.total_comments, 6);
    assert_eq!(python.total_views, 300);
    assert_eq!(python.avg_reactions, 20.0);
    assert!((python.engagement - 66.0 / 300.0).abs() < 1e-12);
}

#[test]
fn test_zero_views_keep_ratios_finite() {
    let (_, _, metrics) = compute(vec![article(1, 0, 3, 2, &[]).with_reading_time(0)]);
    let row = &metrics.articles[0];

    assert_eq!(row.engagement_ratio, 5.0);
    assert_eq!(row.time_efficiency, 3.0);
    assert!(row.engagement_ratio.is_finite());
}

#[test]
fn test_series_parts_follow_publish_order() {
    // Fetch order is newest first; parts must follow publish time
    let (_, series, metrics) = compute(vec![
        article(2, 100, 4, 0, &["rust"]).with_published_at(at(2024, 2, 10, 9)).with_series("S1", None),
        article(1, 500, 9, 1, &["rust"]).with_published_at(at(2024, 2, 1, 9)).with_series("S1", None),
        article(3, 50, 1, 0, &["rust"]),
    ]);

    let performance = series.series_performance();
    assert_eq!(performance.len(), 1);
    let s1 = &performance[0];
    assert_eq!(s1.title, "S1");
    assert_eq!(s1.article_ids, vec![1, 2]);
    assert_eq!(s1.article_count, 2);
    assert_eq!(s1.total_reactions, 13);
    assert!((s1.completion_rate - 0.2).abs() < 1e-12);

    assert_eq!(series.series().len(), 1);
    assert!((series.series()[0].completion_rate() - 0.2).abs() < 1e-12);
    assert_eq!(series.part_of(1), Some(1));
    assert_eq!(series.part_of(2), Some(2));
    assert_eq!(series.part_of(3), None);

    let part_of_first = metrics.articles.iter().find(|a| a.id == 1).and_then(|a| a.series_part);
    assert_eq!(part_of_first, Some(1));
}

#[test]
fn test_series_without_timestamps_sort_last_and_single_part_rate() {
    let (_, series, _) = compute(vec![
        article(1, 300, 1, 0, &[]).with_series("42", Some("Rust in Production".to_string())),
        article(2, 100, 1, 0, &[]).with_published_at(at(2024, 1, 1, 8)).with_series("42", None),
        article(3, 100, 50, 0, &[]).with_series("7", None),
    ]);

    let performance = series.series_performance();
    assert_eq!(performance.len(), 2);

    // Most reactions first
    assert_eq!(performance[0].series_id, "7");
    assert_eq!(performance[0].completion_rate, 0.0);

    // Dated member leads; the title comes from it and it has no metadata
    let s42 = &performance[1];
    assert_eq!(s42.article_ids, vec![2, 1]);
    assert_eq!(s42.title, "42");
    assert!((s42.completion_rate - 3.0).abs() < 1e-12);
}

#[test]
fn test_completion_rate_zero_when_first_part_unviewed() {
    let (_, series, _) = compute(vec![
        article(1, 0, 1, 0, &[]).with_published_at(at(2024, 1, 1, 8)).with_series("S", None),
        article(2, 80, 1, 0, &[]).with_published_at(at(2024, 1, 2, 8)).with_series("S", None),
    ]);

    assert_eq!(series.series_performance()[0].completion_rate, 0.0);
}

#[test]
fn test_rank_is_stable_in_both_directions() {
    let (_, _, metrics) = compute(vec![
        article(1, 50, 0, 0, &[]),
        article(2, 80, 0, 0, &[]),
        article(3, 50, 0, 0, &[]),
        article(4, 80, 0, 0, &[]),
    ]);

    assert_eq!(ids(&metrics.rank(RankMetric::PageViewsCount, true)), vec![2, 4, 1, 3]);
    assert_eq!(ids(&rank(&metrics.articles, RankMetric::PageViewsCount, false)), vec![1, 3, 2, 4]);
}

#[test]
fn test_rank_is_a_sorted_permutation_for_every_metric() {
    let (_, _, metrics) = compute(vec![
        article(1, 120, 7, 2, &["a"]).with_reading_time(3),
        article(2, 40, 7, 9, &["b"]).with_reading_time(12),
        article(3, 0, 1, 0, &["a"]).with_reading_time(0),
        article(4, 990, 30, 1, &["c"]).with_reading_time(8),
        article(5, 120, 0, 0, &["a", "b"]).with_reading_time(5),
    ]);

    for metric in RankMetric::ALL {
        let ranked = metrics.rank(metric, true);
        let mut ranked_ids = ids(&ranked);
        ranked_ids.sort();
        assert_eq!(ranked_ids, vec![1, 2, 3, 4, 5], "{} is not a permutation", metric);
        for pair in ranked.windows(2) {
            assert_ne!(metric.compare(&pair[0], &pair[1]), std::cmp::Ordering::Less, "{} out of order", metric);
        }
    }
}

#[test]
fn test_tag_totals_cover_every_tagged_article() {
    let articles = vec![
        article(1, 100, 5, 1, &["rust", "cli"]),
        article(2, 200, 10, 0, &["rust"]),
        article(3, 300, 2, 2, &[]),
    ];
    let (_, _, metrics) = compute(articles);
    let stats = tag_performance(&metrics.articles);

    let tagged: Vec<_> = metrics.articles.iter().filter(|a| !a.tags.is_empty()).collect();
    let count_sum: u64 = stats.iter().map(|s| s.count).sum();
    let reactions_sum: u64 = stats.iter().map(|s| s.total_reactions).sum();
    let tagged_reactions: u64 = tagged.iter().map(|a| a.public_reactions_count).sum();

    assert!(count_sum >= tagged.len() as u64);
    assert!(reactions_sum >= tagged_reactions);
    assert_eq!(stats[0].tag, "rust");
    assert_eq!(stats[0].total_views, 300);
}

#[test]
fn test_time_performance_buckets_and_combinations() {
    let (_, _, metrics) = compute(vec![
        article(1, 100, 10, 0, &[]).with_published_at(at(2024, 3, 5, 14)),
        article(2, 100, 30, 0, &[]).with_published_at(at(2024, 3, 12, 14)),
        article(3, 100, 5, 0, &[]).with_published_at(at(2024, 3, 4, 9)),
        article(4, 100, 5, 0, &[]).with_published_at(at(2024, 3, 11, 9)),
        article(5, 100, 50, 0, &[]),
        article(6, 100, 50, 0, &[]),
    ]);
    let time = time_performance(&metrics.articles);

    let days: Vec<_> = time.by_day.iter().map(|s| s.day.clone().unwrap()).collect();
    assert_eq!(days, vec!["Monday", "Tuesday", "Unknown"]);

    let hours: Vec<_> = time.by_hour.iter().map(|s| s.hour.unwrap()).collect();
    assert_eq!(hours, vec![0, 9, 14]);

    let tuesday = &time.by_day[1];
    assert_eq!(tuesday.article_count, 2);
    assert_eq!(tuesday.total_reactions, 40);
    assert_eq!(tuesday.avg_reactions, 20.0);

    // Undated articles never make a (day, hour) combination
    assert_eq!(time.best_combinations.len(), 2);
    assert_eq!(time.best_combinations[0].day.as_deref(), Some("Tuesday"));
    assert_eq!(time.best_combinations[0].hour, Some(14));
    assert!((time.best_combinations[0].avg_engagement - 0.2).abs() < 1e-12);
    assert_eq!(time.best_combinations[1].day.as_deref(), Some("Monday"));

    let advice = posting_time_recommendations(&time);
    assert_eq!(advice[0].label, "Tuesday 14:00 UTC");
    assert_eq!(advice[0].article_count, 2);
}

#[test]
fn test_single_article_buckets_are_not_combinations() {
    let (_, _, metrics) = compute(vec![
        article(1, 100, 10, 0, &[]).with_published_at(at(2024, 3, 5, 14)),
        article(2, 100, 10, 0, &[]).with_published_at(at(2024, 3, 6, 14)),
    ]);

    assert!(metrics.time_performance.best_combinations.is_empty());
    assert_eq!(metrics.time_performance.by_hour.len(), 1);
}

#[test]
fn test_most_used_tags_keep_first_seen_order_on_ties() {
    let stats = overall_stats(
        &compute(vec![
            article(1, 10, 0, 0, &["b", "a"]),
            article(2, 10, 0, 0, &["a"]),
            article(3, 10, 0, 0, &["c"]),
        ])
        .2
        .articles,
    );

    let tags: Vec<_> = stats.most_used_tags.iter().map(|t| (t.tag.as_str(), t.count)).collect();
    assert_eq!(tags, vec![("a", 2), ("b", 1), ("c", 1)]);
    assert_eq!(stats.total_views, 30);
    assert_eq!(stats.avg_views_per_article, 10.0);
}

#[test]
fn test_recommendation_groups_are_omitted_when_preconditions_fail() {
    let (_, _, metrics) = compute(vec![
        article(1, 100, 5, 1, &["rust", "cli"]),
        article(2, 200, 10, 0, &["rust"]),
    ]);
    let groups = tag_recommendations(&metrics.tag_performance, &metrics.articles);

    let kinds: Vec<_> = groups.iter().map(TagRecommendation::kind).collect();
    assert_eq!(kinds, vec!["underused_high_performers", "trending_matches"]);
    assert_eq!(groups[0].tags(), vec!["rust", "cli"]);
    assert_eq!(groups[1].tags(), vec!["rust"]);
}

#[test]
fn test_all_local_recommendation_groups() {
    let (_, _, metrics) = compute(vec![
        article(1, 100, 10, 0, &["alpha", "beta"]),
        article(2, 100, 20, 0, &["beta", "alpha"]),
        article(3, 100, 0, 0, &["gamma"]),
    ]);
    let groups = tag_recommendations(&metrics.tag_performance, &metrics.articles);

    let kinds: Vec<_> = groups.iter().map(TagRecommendation::kind).collect();
    assert_eq!(kinds, vec!["top_performing", "underused_high_performers", "tag_combinations"]);
    assert_eq!(groups[0].tags(), vec!["alpha", "beta", "gamma"]);
    assert_eq!(groups[1].tags(), vec!["alpha", "beta"]);

    match &groups[2] {
        TagRecommendation::TagCombinations { combinations, reason } => {
            assert_eq!(combinations.len(), 1);
            assert_eq!(combinations[0].tags, ["alpha".to_string(), "beta".to_string()]);
            assert_eq!(combinations[0].article_count, 2);
            assert!((combinations[0].avg_engagement - 0.15).abs() < 1e-12);
            assert!(!reason.is_empty());
        }
        other => panic!("expected tag combinations, got {:?}", other),
    }
}

#[test]
fn test_trending_matches_ignore_case() {
    let (_, _, metrics) = compute(vec![article(1, 100, 1, 0, &["Rust", "AI", "knitting"])]);
    let groups = tag_recommendations(&metrics.tag_performance, &metrics.articles);

    let trending = groups
        .iter()
        .find(|g| g.kind() == "trending_matches")
        .expect("trending group");
    assert_eq!(trending.tags(), vec!["Rust", "AI"]);
}

#[test]
fn test_undated_articles_never_offered_as_posting_slots() {
    let store = ArticleStore::new(vec![
        article(1, 5000, 50, 5, &["rust"]),
        article(2, 5000, 40, 4, &["rust"]),
        article(3, 100, 5, 1, &["rust"]).with_published_at(at(2024, 3, 5, 9)),
        article(4, 100, 5, 1, &["rust"]).with_published_at(at(2024, 3, 6, 14)),
    ]);
    let report = Report::build("tester", store, None);

    // The full report still accounts for the undated bucket
    let time = &report.best_publishing_times;
    assert_eq!(time.by_day.last().and_then(|slot| slot.day.as_deref()), Some("Unknown"));
    assert_eq!(time.by_hour[0].hour, Some(0));
    assert_eq!(time.by_hour[0].article_count, 2);

    let condensed = report.condense();
    let days: Vec<&str> = condensed.best_days.iter().map(|d| d.day.as_str()).collect();
    let hours: Vec<u32> = condensed.best_hours.iter().map(|h| h.hour).collect();
    assert_eq!(days, vec!["Tuesday", "Wednesday"]);
    assert_eq!(hours, vec![9, 14]);

    let insights = MockInsightGenerator
        .generate_insights(&condensed)
        .unwrap()
        .expect("insights");
    let strategy = &insights.optimal_posting_strategy;
    assert_eq!(strategy.best_days, vec!["Tuesday", "Wednesday"]);
    assert_eq!(strategy.best_hours, vec!["9:00", "14:00"]);
    assert!(insights.key_patterns.iter().all(|pattern| !pattern.contains("Unknown")));
}

use pretty_assertions::assert_eq;
use scout_core::prelude::*;
use scout_core::{Confidence, Tier};
use scout_test_utils::{
    colliding_registry, dated_seed, default_registry, gallery_locator, photo_locator, seed,
    session, session_with, titled_seed, FakeExists,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn config(min: u32, max: u32) -> ScoutConfig {
    ScoutConfig::new()
        .with_generate(GenerateOptions::new().with_range(min, max))
        .with_probe(ProbeOptions::new().with_concurrency(4))
}

#[tokio::test]
async fn single_seed_sequence_group() {
    let fake = Arc::new(FakeExists::found((1..=3).map(|i| gallery_locator("AB100", i))));
    let output = session(&config(1, 5))
        .run(vec![titled_seed("AB100", "花組 Goethe")], fake.clone())
        .await;

    let catalog = output.catalog.seed("AB100").unwrap();
    assert_eq!(catalog.troupe, Some(Troupe::Flower));
    assert_eq!(catalog.troupe.map(Troupe::label), Some("花"));
    assert_eq!(catalog.sequences.len(), 1);

    let group = &catalog.sequences[0];
    assert_eq!(group.prefix_value, "AB100");
    assert_eq!(group.date_offset_days, 0);
    let indices: Vec<_> = group
        .hits
        .iter()
        .map(|h| h.candidate.sequence_index)
        .collect();
    assert_eq!(indices, vec![Some(1), Some(2), Some(3)]);
    assert!(catalog.direct.is_empty());
    assert!(catalog.unknown_prefix_hits.is_empty());

    assert_eq!(output.diagnostics.verified_count, 3);
    assert_eq!(output.diagnostics.total_candidates, 2 + 5);
    assert_eq!(fake.max_calls_per_locator(), 1);
    assert!(!output.catalog.truncated);
}

#[tokio::test]
async fn shared_locator_across_conventions_merged_once() {
    let shared = "https://shop.example/X1.jpg";
    let fake = Arc::new(FakeExists::found([shared]));
    let output = session_with(colliding_registry(), &config(1, 3))
        .run(vec![seed("X1"), seed("X")], fake.clone())
        .await;

    let occurrences = output
        .catalog
        .merged_order
        .iter()
        .filter(|l| *l == shared)
        .count();
    assert_eq!(occurrences, 1);
    assert_eq!(fake.call_count(shared), 1);

    let direct_seed = output.catalog.seed("X1").unwrap();
    assert_eq!(direct_seed.direct.len(), 1);
    assert_eq!(direct_seed.direct[0].locator(), shared);

    let sequence_seed = output.catalog.seed("X").unwrap();
    assert_eq!(sequence_seed.sequences.len(), 1);
    assert_eq!(sequence_seed.sequences[0].hits[0].locator(), shared);
}

#[tokio::test(start_paused = true)]
async fn deadline_truncates_slow_probing() {
    // 2 direct + 48 gallery candidates
    let cfg = ScoutConfig::new()
        .with_generate(GenerateOptions::new().with_range(1, 48))
        .with_probe(
            ProbeOptions::new()
                .with_concurrency(1)
                .with_deadline(Duration::from_millis(200)),
        );
    let session = session(&cfg);
    let candidates: Vec<String> = session
        .candidates(&seed("AB100"))
        .candidates
        .into_iter()
        .map(|c| c.locator)
        .collect();
    assert_eq!(candidates.len(), 50);

    let fake = Arc::new(
        FakeExists::found(candidates.iter().cloned()).with_latency(Duration::from_millis(10)),
    );
    let output = session.run(vec![seed("AB100")], fake).await;

    assert!(output.catalog.truncated);
    assert!(output.diagnostics.truncated);
    assert!(output.diagnostics.verified_count > 0);
    assert!(output.diagnostics.verified_count < 50);
    assert!(output.diagnostics.unprobed_count > 0);
    assert_eq!(
        output.catalog.merged_order.len(),
        output.diagnostics.verified_count
    );

    let generated: HashSet<&String> = candidates.iter().collect();
    let catalog = output.catalog.seed("AB100").unwrap();
    for hit in catalog.hits() {
        assert!(generated.contains(&hit.candidate.locator));
    }
}

#[tokio::test(start_paused = true)]
async fn hanging_checks_time_out_without_failing_session() {
    let cfg = ScoutConfig::new()
        .with_generate(GenerateOptions::new().with_range(1, 3))
        .with_probe(
            ProbeOptions::new()
                .with_concurrency(2)
                .with_request_timeout(Duration::from_millis(50)),
        );
    let fake = Arc::new(
        FakeExists::found([photo_locator("AB100"), gallery_locator("AB100", 1)])
            .with_hanging([gallery_locator("AB100", 2)])
            .with_errors([gallery_locator("AB100", 3)]),
    );
    let output = session(&cfg).run(vec![seed("AB100")], fake).await;

    assert_eq!(output.diagnostics.verified_count, 2);
    assert_eq!(output.diagnostics.timed_out_count, 1);
    assert_eq!(output.diagnostics.error_count, 1);
    assert_eq!(output.diagnostics.not_found_count, 1);
    assert!(!output.catalog.truncated);
}

#[tokio::test]
async fn operator_prefixes_land_in_unknown_hits() {
    let cfg = ScoutConfig::new().with_generate(
        GenerateOptions::new()
            .with_range(1, 2)
            .with_extra_prefixes(["SP01"]),
    );
    let fake = Arc::new(FakeExists::found([
        gallery_locator("SP01", 1),
        gallery_locator("AB100", 1),
    ]));
    let output = session(&cfg).run(vec![seed("AB100")], fake).await;

    let catalog = output.catalog.seed("AB100").unwrap();
    assert_eq!(catalog.unknown_prefix_hits.len(), 1);
    assert_eq!(catalog.unknown_prefix_hits[0].candidate.tier, Tier::Manual);
    assert_eq!(catalog.unknown_prefix_hits[0].confidence, Confidence::Hinted);
    assert_eq!(catalog.sequences.len(), 1);
    assert_eq!(
        output.catalog.merged_order,
        vec![gallery_locator("AB100", 1), gallery_locator("SP01", 1)]
    );
}

#[tokio::test]
async fn date_shifted_runs_follow_primary_runs() {
    let registry = default_registry();
    let programme = |prefix: &str, index| registry.sequence("programme", prefix, index).unwrap();
    let fake = Arc::new(FakeExists::found([
        programme("20240322", 1),
        programme("20240314", 1),
        programme("20240315", 1),
    ]));
    let output = session(&config(1, 2))
        .run(vec![dated_seed("AB100", 2024, 3, 15)], fake)
        .await;

    let catalog = output.catalog.seed("AB100").unwrap();
    let groups: Vec<(&str, i32)> = catalog
        .sequences
        .iter()
        .map(|g| (g.prefix_value.as_str(), g.date_offset_days))
        .collect();
    assert_eq!(groups, vec![("20240315", 0), ("20240314", -1), ("20240322", 7)]);
    assert_eq!(catalog.sequences[1].hits[0].confidence, Confidence::Plausible);
}

#[tokio::test]
async fn batch_orders_seeds_most_recent_first() {
    let fake = Arc::new(FakeExists::new());
    let output = session(&config(1, 1))
        .run(
            vec![
                seed("special"),
                dated_seed("PG1", 2023, 5, 1),
                seed("AB100"),
                dated_seed("PG2", 2024, 5, 1),
            ],
            fake,
        )
        .await;

    let ids: Vec<&str> = output.catalog.per_seed.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["PG2", "PG1", "AB100", "special"]);
}

#[tokio::test]
async fn output_serializes_to_json() {
    let fake = Arc::new(FakeExists::found([photo_locator("AB100")]));
    let output = session(&config(1, 2))
        .run(vec![titled_seed("AB100", "雪組")], fake)
        .await;

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["diagnostics"]["verified_count"], 1);
    assert_eq!(json["catalog"]["per_seed"]["AB100"]["troupe"], "snow");
    assert_eq!(
        json["catalog"]["merged_order"][0],
        "https://shop.example/goods/AB100.jpg"
    );
}

#[tokio::test]
async fn hint_matching_seed_code_stays_hinted_on_other_conventions() {
    let cfg = ScoutConfig::new().with_generate(
        GenerateOptions::new()
            .with_range(1, 2)
            .with_extra_prefixes(["AB100"]),
    );
    let programme = default_registry()
        .sequence("programme", "AB100", 1)
        .unwrap();
    let fake = Arc::new(FakeExists::found([programme.clone()]));
    let output = session(&cfg).run(vec![seed("AB100")], fake).await;

    let catalog = output.catalog.seed("AB100").unwrap();
    assert!(catalog.sequences.is_empty());
    assert_eq!(catalog.unknown_prefix_hits.len(), 1);
    let hit = &catalog.unknown_prefix_hits[0];
    assert_eq!(hit.locator(), programme);
    assert_eq!(hit.candidate.tier, Tier::Manual);
    assert_eq!(hit.confidence, Confidence::Hinted);
}

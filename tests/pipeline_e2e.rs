use corroborate::{
    Completeness, ConfidenceTier, EntityKind, RawRecord, ResolutionEngine, SourceTag,
    TargetProfile, TimelineEvent,
};

fn engine() -> ResolutionEngine {
    ResolutionEngine::new(TargetProfile::china_affiliation())
}

#[test]
fn classify_confirmed_positive_end_to_end() {
    let engine = engine();
    let record = RawRecord::new(SourceTag::patents())
        .with_country("CN")
        .with_name("Huawei Technologies Co Ltd");

    let outcome = engine.ingest(&record, EntityKind::Company).unwrap();
    assert!(outcome.admitted());
    assert!(outcome.classification.member);
    assert_eq!(outcome.classification.tier, ConfidenceTier::VeryHigh);
    assert_eq!(
        outcome.classification.completeness,
        Completeness::ConfirmedPositive
    );
}

#[test]
fn classify_confirmed_negative_end_to_end() {
    let engine = engine();
    let record = RawRecord::new(SourceTag::trade_registry())
        .with_country("US")
        .with_name("Acme Shipping");

    let outcome = engine.ingest(&record, EntityKind::Company).unwrap();
    assert!(!outcome.admitted());
    assert!(!outcome.classification.member);
    assert_eq!(
        outcome.classification.completeness,
        Completeness::ConfirmedNegative
    );
}

#[test]
fn country_overrides_lexical_overlap() {
    let engine = engine();
    // A US company whose name happens to overlap the lexicon.
    let record = RawRecord::new(SourceTag::trade_registry())
        .with_country("US")
        .with_name("China Garden Logistics")
        .with_address("Beijing Street, San Francisco");

    let outcome = engine.ingest(&record, EntityKind::Company).unwrap();
    assert!(!outcome.classification.member);
    assert_eq!(
        outcome.classification.completeness,
        Completeness::ConfirmedNegative
    );
    // The lexical hits are still in the audit trail.
    assert!(outcome
        .classification
        .signals
        .contains(&"name_keyword".to_string()));
}

#[test]
fn name_variants_fold_into_one_entity() {
    let engine = engine();
    let records = vec![
        RawRecord::new(SourceTag::trade_registry())
            .with_country("CN")
            .with_name("China Shipping Development Co., Ltd."),
        RawRecord::new(SourceTag::patents())
            .with_country("CN")
            .with_name("CHINA SHIPPING DEVELOPMENT CO."),
    ];

    let outcomes = engine.ingest_batch(&records, &EntityKind::Company).unwrap();
    let id = outcomes[0].entity_id.unwrap();
    assert_eq!(outcomes[1].entity_id, Some(id));

    let entity = engine.registry().get(id).unwrap().unwrap();
    assert_eq!(
        entity.canonical_name,
        "China Shipping Development Co., Ltd."
    );
    assert!(entity.aliases.contains("CHINA SHIPPING DEVELOPMENT CO."));
    assert!(entity.has_source(&SourceTag::trade_registry()));
    assert!(entity.has_source(&SourceTag::patents()));
}

#[test]
fn two_sources_corroborate_a_technology() {
    let engine = engine();
    let record = RawRecord::new(SourceTag::patents())
        .with_country("CN")
        .with_name("Zhongke Quantum Research Institute");
    let id = engine
        .ingest(&record, EntityKind::Institution)
        .unwrap()
        .entity_id
        .unwrap();

    engine
        .registry()
        .record_event(
            id,
            TimelineEvent::technology(SourceTag::patents(), "quantum computing"),
        )
        .unwrap();
    engine
        .registry()
        .record_event(
            id,
            TimelineEvent::technology(SourceTag::research_graph(), "quantum computing"),
        )
        .unwrap();
    engine
        .registry()
        .record_event(
            id,
            TimelineEvent::technology(SourceTag::patents(), "photonics"),
        )
        .unwrap();

    let graph = engine.build_graph().unwrap();
    assert_eq!(graph.corroboration_count("quantum computing"), 2);
    assert_eq!(graph.corroboration_count("photonics"), 1);
    assert_eq!(graph.single_source_attributes(), vec!["photonics"]);
}

#[test]
fn graph_rebuild_tracks_registry_growth() {
    let engine = engine();
    let first = RawRecord::new(SourceTag::patents())
        .with_country("CN")
        .with_name("Beijing Hypersonics Laboratory");
    let id = engine
        .ingest(&first, EntityKind::ResearchGroup)
        .unwrap()
        .entity_id
        .unwrap();
    engine
        .registry()
        .record_event(
            id,
            TimelineEvent::technology(SourceTag::patents(), "hypersonics"),
        )
        .unwrap();

    let before = engine.build_graph().unwrap();
    assert_eq!(before.corroboration_count("hypersonics"), 1);

    engine
        .registry()
        .record_event(
            id,
            TimelineEvent::technology(SourceTag::procurement(), "hypersonics"),
        )
        .unwrap();

    // The old graph is unchanged; a rebuild sees the new assertion.
    assert_eq!(before.corroboration_count("hypersonics"), 1);
    let after = engine.build_graph().unwrap();
    assert_eq!(after.corroboration_count("hypersonics"), 2);
}

#[test]
fn no_data_and_low_data_are_distinct_outcomes() {
    let engine = engine();

    let empty = engine.classify(&RawRecord::new(SourceTag::unknown()));
    assert_eq!(empty.completeness, Completeness::NoData);

    let sparse = engine.classify(&RawRecord::new(SourceTag::unknown()).with_name("Plain Org"));
    assert_eq!(sparse.completeness, Completeness::LowData);

    assert_ne!(empty.completeness, sparse.completeness);
}

#[test]
fn custom_profile_json_drives_the_same_engine() {
    let json = r#"{
        "name": "quantum_supply_chain",
        "rules": [
            {"label": "vendor_match", "field": "name", "pattern": "qubitworks|ion trap systems", "weight": 80, "authoritative": true},
            {"label": "tech_keyword", "field": "description", "pattern": "\\b(qubit|cryostat|ion trap)\\b", "weight": 40}
        ],
        "tiers": {"medium": 40, "high": 80, "very_high": 120}
    }"#;
    let profile = TargetProfile::from_json(json).unwrap();
    let engine = ResolutionEngine::new(profile);

    let record = RawRecord::new(SourceTag::procurement())
        .with_name("QubitWorks GmbH")
        .with_description("cryostat assemblies and qubit control racks");

    let outcome = engine.ingest(&record, EntityKind::Company).unwrap();
    assert!(outcome.admitted());
    assert_eq!(outcome.classification.tier, ConfidenceTier::VeryHigh);
    assert_eq!(outcome.classification.profile, "quantum_supply_chain");
}

/// Scenario 1: Direct linkage with full and partial matching
///
/// A rule seeded by the extraction key selects bridge-domain records and
/// copies their common keys into the key's data record.
use netprint_core::{
    extract, ConversionRegistry, DeviceChunks, RuleSet, ServiceConstructPathEntry, Value,
};

fn rules(json: &str) -> RuleSet {
    let rules: Vec<ServiceConstructPathEntry> = serde_json::from_str(json).expect("rules parse");
    RuleSet::new(rules, &ConversionRegistry::with_defaults(), None).expect("rules validate")
}

fn device(json: &str) -> DeviceChunks {
    serde_json::from_str(json).expect("device parses")
}

#[test]
fn test_scenario_01_full_match_populates_common_key() {
    // GIVEN chunk "bd" with one record
    let dev = device(
        r#"{"DeviceName": "leaf-1", "Chunks": {"bd": [
            {"l2BD.id": 2012007, "l2BD.accEncap": "vxlan-2012007"}]}}"#,
    );

    // AND a direct full-match rule on l2BD.accEncap
    let rs = rules(
        r#"[{"ChunkName": "bd", "KeyDestName": "l2BD.accEncap", "Linkage": "direct",
             "MatchType": "full", "CommonKeysList": ["l2BD.id"]}]"#,
    );

    // WHEN extracting with seed "vxlan-2012007"
    let out = extract("vxlan-2012007", &dev, &rs, &ConversionRegistry::with_defaults())
        .expect("extraction succeeds");

    // THEN Data["l2BD.id"] is the integer 2012007
    assert_eq!(out.data.get("l2BD.id"), Some(&Value::Int(2012007)));
    assert!(out.issues.is_empty());
}

#[test]
fn test_scenario_01_full_match_misses_other_seed() {
    // GIVEN the same chunk
    let dev = device(
        r#"{"DeviceName": "leaf-1", "Chunks": {"bd": [
            {"l2BD.id": 2012007, "l2BD.accEncap": "vxlan-2012007"}]}}"#,
    );
    let rs = rules(
        r#"[{"ChunkName": "bd", "KeyDestName": "l2BD.accEncap", "Linkage": "direct",
             "MatchType": "full", "CommonKeysList": ["l2BD.id"]}]"#,
    );

    // WHEN the seed is only a substring of the field
    let out = extract("2012007", &dev, &rs, &ConversionRegistry::with_defaults()).unwrap();

    // THEN nothing is contributed and nothing is reported
    assert!(out.data.is_empty());
    assert!(out.issues.is_empty());
}

#[test]
fn test_scenario_01_partial_match_is_symmetric_containment() {
    // GIVEN a chunk whose field contains the key and one the key contains
    let dev = device(
        r#"{"DeviceName": "leaf-1", "Chunks": {"bd": [
            {"l2BD.id": 1, "l2BD.accEncap": "vxlan-2012007"}],
            "vrf": [{"l3Ctx.name": "tenant-a", "l3Ctx.encap": "2012"}]}}"#,
    );
    let rs = rules(
        r#"[{"ChunkName": "bd", "KeyDestName": "l2BD.accEncap", "Linkage": "direct",
             "MatchType": "partial", "CommonKeysList": ["l2BD.id"]},
            {"ChunkName": "vrf", "KeyDestName": "l3Ctx.encap", "Linkage": "direct",
             "MatchType": "partial", "CommonKeysList": ["l3Ctx.name"]}]"#,
    );

    // WHEN extracting for "2012007"
    let out = extract("2012007", &dev, &rs, &ConversionRegistry::with_defaults()).unwrap();

    // THEN both directions of containment match
    assert_eq!(out.data.get("l2BD.id"), Some(&Value::Int(1)));
    assert_eq!(out.data.get("l3Ctx.name"), Some(&Value::from("tenant-a")));
}

#[test]
fn test_scenario_01_first_candidate_supplies_common_keys() {
    // GIVEN two records that both match
    let dev = device(
        r#"{"DeviceName": "leaf-1", "Chunks": {"bd": [
            {"l2BD.id": 1, "l2BD.accEncap": "vxlan-2012007", "l2BD.name": "first"},
            {"l2BD.id": 2, "l2BD.accEncap": "vxlan-2012007-b", "l2BD.name": "second"}]}}"#,
    );
    let rs = rules(
        r#"[{"ChunkName": "bd", "KeyDestName": "l2BD.accEncap", "Linkage": "direct",
             "MatchType": "partial", "CommonKeysList": ["l2BD.id", "l2BD.name"],
             "CommonKeysListPrefix": "bd"}]"#,
    );

    // WHEN extracting
    let out = extract("2012007", &dev, &rs, &ConversionRegistry::with_defaults()).unwrap();

    // THEN the first record wins and the prefix is applied
    assert_eq!(out.data.get("bd.l2BD.id"), Some(&Value::Int(1)));
    assert_eq!(out.data.get("bd.l2BD.name"), Some(&Value::from("first")));
    assert_eq!(out.data.len(), 2);
}

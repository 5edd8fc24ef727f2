//! Integration tests running the importer against a real JSON store.

use pretty_assertions::assert_eq;
use proptax_core::service;
use proptax_core::{AssetType, PropertyTaxStore, TaxationType};
use proptax_data::{import, parse_rows};
use proptax_db_json::JsonStore;
use rust_decimal_macros::dec;
use tempfile::TempDir;

const TEST_CSV: &str = include_str!("../test-data/assets_2024.csv");

fn open_store(dir: &TempDir) -> JsonStore {
    JsonStore::open(dir.path()).expect("store should open")
}

#[test]
fn sample_file_imports_with_one_correction() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let records = parse_rows(TEST_CSV.as_bytes()).expect("sample CSV should parse");
    let summary = import(&mut store, &records).expect("import should succeed");

    // 5 rows, 4 distinct assets; the 토지/기타 row is corrected, not failed.
    assert_eq!(summary.created, 4);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("기타"));
}

#[test]
fn corrected_land_row_is_still_imported() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let records = parse_rows(TEST_CSV.as_bytes()).unwrap();

    import(&mut store, &records).unwrap();

    let land = store.get_asset("LAND-001").expect("corrected row must import");
    assert_eq!(land.asset_type, AssetType::Land);
    assert_eq!(land.taxation_type, TaxationType::AggregatedTaxed);
}

#[test]
fn repeated_ids_merge_their_year_snapshots() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let records = parse_rows(TEST_CSV.as_bytes()).unwrap();

    import(&mut store, &records).unwrap();

    let land = store.get_asset("LAND-001").unwrap();
    assert_eq!(land.yearly.len(), 2);
    assert_eq!(
        land.yearly[&2024].standard_market_value,
        dec!(150_000_000)
    );
    assert_eq!(
        land.yearly[&2025].standard_market_value,
        dec!(160_000_000)
    );
}

#[test]
fn reimporting_the_same_file_updates_instead_of_creating() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let records = parse_rows(TEST_CSV.as_bytes()).unwrap();
    import(&mut store, &records).unwrap();

    let summary = import(&mut store, &records).unwrap();

    assert_eq!(summary.created, 0);
    assert_eq!(summary.updated, 4);
}

#[test]
fn reimport_replaces_the_year_snapshot_and_keeps_history() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let records = parse_rows(TEST_CSV.as_bytes()).unwrap();
    import(&mut store, &records).unwrap();

    let revised = "\
asset_id,name,asset_type,group_id,area,year,standard_market_value
LAND-001,유휴부지,토지,HQ,2500,2024,155000000
";
    let summary = import(&mut store, &parse_rows(revised.as_bytes()).unwrap()).unwrap();

    assert_eq!((summary.created, summary.updated), (0, 1));
    let land = store.get_asset("LAND-001").unwrap();
    assert_eq!(land.yearly[&2024].standard_market_value, dec!(155_000_000));
    assert_eq!(land.yearly[&2025].standard_market_value, dec!(160_000_000));
}

#[test]
fn bad_rows_fail_alone_and_good_rows_still_land() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let csv = "\
asset_id,name,asset_type,group_id,area,year,standard_market_value
OK-001,정상 자산,주택,HQ,84.5,2024,100000000
BAD-001,알 수 없는 유형,창고,HQ,100,2024,100000000
BAD-002,면적 오류,주택,HQ,0,2024,100000000
";

    let summary = import(&mut store, &parse_rows(csv.as_bytes()).unwrap()).unwrap();

    assert_eq!(summary.created, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.failures.len(), 2);
    assert!(store.get_asset("OK-001").is_some());
    assert!(store.get_asset("BAD-001").is_none());
    assert!(store.get_asset("BAD-002").is_none());
}

#[test]
fn imported_years_show_up_as_available() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let records = parse_rows(TEST_CSV.as_bytes()).unwrap();

    import(&mut store, &records).unwrap();

    let years = store.available_years();
    assert!(years.contains(&2024));
    assert!(years.contains(&2025));
    // Newest first.
    let mut sorted = years.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(years, sorted);
}

#[test]
fn imported_assets_are_assessable_once_the_year_has_rates() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let records = parse_rows(TEST_CSV.as_bytes()).unwrap();
    import(&mut store, &records).unwrap();
    store.add_year(2024, None).unwrap();

    let result = service::calculate_for_asset(&store, "BR-001", 2024).unwrap();

    // Building value 390M × 60% = 234M, then 50% reduction → 117M.
    // property 60,000 + 57M × 0.15% = 145,500; urban 117M × 0.14% = 163,800;
    // education 145,500 × 20% = 29,100; regional 49,100 + 53M × 0.12% = 112,700.
    assert_eq!(result.taxable_base, dec!(117_000_000));
    assert_eq!(result.property_tax, dec!(145_500));
    assert_eq!(result.urban_area_tax, dec!(163_800));
    assert_eq!(result.education_tax, dec!(29_100));
    assert_eq!(result.regional_resource_tax, dec!(112_700));
    assert_eq!(result.total_tax, dec!(451_100));
}

#[test]
fn group_totals_cover_only_the_selected_group() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let records = parse_rows(TEST_CSV.as_bytes()).unwrap();
    import(&mut store, &records).unwrap();
    store.add_year(2024, None).unwrap();

    let hq = service::calculate_for_group(&store, "HQ", 2024);
    let branch = service::calculate_for_group(&store, "BRANCH", 2024);

    assert_eq!(hq.per_asset.len(), 3);
    assert_eq!(branch.per_asset.len(), 1);
    assert_eq!(branch.total_tax, dec!(451_100));
    assert!(hq.error.is_none());
}

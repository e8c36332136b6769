/// End-to-end run tests against a file-backed SQLite database
///
/// Run with: cargo test --test pipeline_tests

mod sqlite_utils;

use optbench::pipeline::{RunConfig, ScaleConfig, Step, run};
use optbench::{Backend, Value};
use sqlite_utils::{TestDb, sql_path};

fn run_config(scale: ScaleConfig) -> RunConfig {
    RunConfig::for_backend(Backend::Sqlite, &sql_path(""))
        .scale(scale)
        .chunk_size(200)
        .seed(7)
}

#[tokio::test]
async fn test_full_run_loads_exact_counts() {
    let db = TestDb::new();

    let summary = run(&db.config, &run_config(ScaleConfig::new(100, 50, 500))).await;

    assert!(summary.all_succeeded(), "steps: {:?}", summary.steps);

    let dataset = summary.dataset.expect("dataset report");
    assert_eq!(dataset.clients.rows_committed, 100);
    assert_eq!(dataset.products.rows_committed, 50);
    assert_eq!(dataset.orders.rows_committed, 500);
    assert_eq!(dataset.orders.chunks_committed, 3);

    let report = summary.verification.expect("verification report");
    assert_eq!(report.count("opt_clients"), Some(100));
    assert_eq!(report.count("opt_products"), Some(50));
    assert_eq!(report.count("opt_orders"), Some(500));

    assert_eq!(summary.timings.len(), 2);
    assert_eq!(summary.timings_optimized.len(), 2);
}

#[tokio::test]
async fn test_orders_only_reference_loaded_rows() {
    let db = TestDb::new();

    let summary = run(&db.config, &run_config(ScaleConfig::new(30, 12, 300))).await;
    assert!(summary.all_succeeded(), "steps: {:?}", summary.steps);

    let mut session = optbench::connect(&db.config, None).await.unwrap();
    let dangling = session
        .query(
            "SELECT COUNT(*) FROM opt_orders o \
             LEFT JOIN opt_clients c ON c.id = o.client_id \
             LEFT JOIN opt_products p ON p.product_id = o.product_id \
             WHERE c.id IS NULL OR p.product_id IS NULL",
        )
        .await
        .unwrap();
    session.close().await.unwrap();

    assert_eq!(dangling.rows()[0][0], Value::Integer(0));
}

#[tokio::test]
async fn test_empty_client_pool_fails_load_but_run_continues() {
    let db = TestDb::new();

    let summary = run(&db.config, &run_config(ScaleConfig::new(0, 5, 10))).await;

    let load = summary.step(Step::LoadDataset).unwrap();
    assert!(!load.succeeded());
    assert!(load.error.as_deref().unwrap().contains("client pool is empty"));

    assert!(summary.step(Step::Verify).unwrap().succeeded());
    let report = summary.verification.expect("verification still runs");
    assert_eq!(report.count("opt_orders"), Some(0));
}

#[tokio::test]
async fn test_broken_optimization_script_does_not_stop_verification() {
    let db = TestDb::new();
    let mut config = run_config(ScaleConfig::new(10, 5, 20));
    config.optimize_script = db.write_script("optimize.sql", "CREATE INDEX broken ON missing_table (x);");

    let summary = run(&db.config, &config).await;

    assert!(!summary.step(Step::Optimize).unwrap().succeeded());
    assert!(summary.step(Step::Verify).unwrap().succeeded());
    assert_eq!(summary.verification.unwrap().count("opt_orders"), Some(20));
}

#[tokio::test]
async fn test_verification_reports_schema() {
    let db = TestDb::new();

    let summary = run(&db.config, &run_config(ScaleConfig::new(2, 2, 2))).await;
    let report = summary.verification.unwrap();

    let orders = report
        .tables
        .iter()
        .find(|t| t.table == "opt_orders")
        .unwrap();
    let schema = orders.schema.as_ref().unwrap();
    let fields: Vec<&Value> = schema.rows().iter().map(|row| &row[0]).collect();
    assert_eq!(
        fields,
        vec![
            &Value::Text("order_id".into()),
            &Value::Text("order_date".into()),
            &Value::Text("client_id".into()),
            &Value::Text("product_id".into()),
        ]
    );
}

#[tokio::test]
async fn test_rerun_with_same_seed_appends_dataset() {
    let db = TestDb::new();
    let config = run_config(ScaleConfig::new(10, 5, 20));

    let first = run(&db.config, &config).await;
    assert!(first.all_succeeded(), "steps: {:?}", first.steps);

    let second = run(&db.config, &config).await;
    assert!(
        second.step(Step::LoadDataset).unwrap().succeeded(),
        "steps: {:?}",
        second.steps
    );

    let report = second.verification.expect("verification report");
    assert_eq!(report.count("opt_clients"), Some(20));
    assert_eq!(report.count("opt_products"), Some(10));
    assert_eq!(report.count("opt_orders"), Some(40));
}

#[tokio::test]
async fn test_non_positive_window_is_rejected_before_loading() {
    let db = TestDb::new();

    for days in [0, -30] {
        let summary = run(&db.config, &run_config(ScaleConfig::new(10, 5, 20)).window_days(days)).await;

        let load = summary.step(Step::LoadDataset).unwrap();
        assert!(!load.succeeded());
        assert!(load.error.as_deref().unwrap().contains("order window"));
    }

    assert_eq!(db.count("opt_clients").await, 0);
    assert_eq!(db.count("opt_orders").await, 0);
}

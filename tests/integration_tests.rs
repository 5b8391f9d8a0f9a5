use halla_bob::core::extractor::{extract, parse_menu_table};
use halla_bob::domain::ports::MenuRepository;
use halla_bob::{AppConfig, EtlEngine, HttpFetcher, MenuPipeline, SqliteMenuRepository};
use httpmock::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

fn week_page(rows: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko"><head><meta charset="utf-8"><title>식단표</title></head>
<body>
<div class="header">메뉴</div>
<div id="dietInfoArea">
  <table class="tbl">
    <caption>주간 식단</caption>
    <thead>
      <tr>
        <th scope="col">조식/중식/석식</th>
        <th scope="col">2024.03.18(월)</th>
        <th scope="col">2024.03.19(화)</th>
        <th scope="col">2024.03.20(수)</th>
        <th scope="col">2024.03.21(목)</th>
        <th scope="col">2024.03.22(금)</th>
        <th scope="col">2024.03.23(토)</th>
        <th scope="col">2024.03.24(일)</th>
      </tr>
    </thead>
    <tbody>{rows}</tbody>
  </table>
</div>
</body></html>"#
    )
}

const FULL_WEEK_ROWS: &str = r#"
      <tr><th>중식</th><td>불고기<br>밥</td><td>돈까스</td><td>카레</td><td>비빔밥</td><td>짜장면</td><td>sat</td><td>sun</td></tr>
      <tr><th>조식</th><td>토스트</td><td></td><td>죽</td><td>시리얼</td><td>김밥</td><td>sat</td><td>sun</td></tr>
      <tr><th>석식</th><td>제육</td><td>국수</td><td> </td><td>만두</td><td>라면</td><td>sat</td><td>sun</td></tr>
"#;

fn config_for(server: &MockServer, path: &str, db_path: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.source.url = server.url(path);
    config.storage.database_path = db_path.to_string();
    config
}

fn engine_for(
    config: AppConfig,
    repository: Arc<SqliteMenuRepository>,
) -> EtlEngine<MenuPipeline<HttpFetcher, AppConfig>> {
    let fetcher = HttpFetcher::from_config(&config).unwrap();
    EtlEngine::new(MenuPipeline::new(fetcher, config, repository))
}

fn open(db_path: &str) -> Arc<SqliteMenuRepository> {
    let repository = SqliteMenuRepository::open(db_path).unwrap();
    repository.initialize().unwrap();
    Arc::new(repository)
}

#[test]
fn test_weekend_columns_are_excluded_from_a_full_week() {
    let entries = parse_menu_table(&week_page(FULL_WEEK_ROWS)).unwrap();

    assert_eq!(entries.len(), 15);
    assert!(entries.iter().all(|e| !e.date.is_weekend()));
    assert!(entries.iter().all(|e| e.menu_text != "sat" && e.menu_text != "sun"));

    for pair in entries.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.date < b.date || (a.date == b.date && a.meal_type.rank() <= b.meal_type.rank()));
    }
}

#[test]
fn test_empty_cells_use_placeholder() {
    let entries = extract(&week_page(FULL_WEEK_ROWS));

    let tuesday_breakfast = entries
        .iter()
        .find(|e| e.date.day() == "2024.03.19" && e.meal_type.label() == "조식")
        .unwrap();
    assert_eq!(tuesday_breakfast.menu_text, "메뉴 없음");
    assert!(entries.iter().all(|e| !e.menu_text.is_empty()));
}

#[tokio::test]
async fn test_end_to_end_crawl_into_sqlite() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("halla_cafeteria.db");
    let db_path = db_path.to_str().unwrap();

    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/kr/211/subview.do");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(week_page(FULL_WEEK_ROWS));
    });

    let config = config_for(&server, "/kr/211/subview.do", db_path);
    let repository = open(db_path);
    let engine = engine_for(config, Arc::clone(&repository));

    let summary = engine.run().await;

    page_mock.assert();
    assert!(summary.is_success());
    assert_eq!(summary.extracted, 15);
    assert_eq!(summary.saved, 15);

    let rows = repository.read_all().unwrap();
    assert_eq!(rows.len(), 15);
    assert_eq!(rows[0].date, "2024.03.18(월)");
    assert_eq!(rows[0].meal_type, "조식");
    assert_eq!(rows[1].menu_text, "불고기\n밥");
}

#[tokio::test]
async fn test_recrawl_updates_changed_menus_in_place() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("menus.db");
    let db_path = db_path.to_str().unwrap();

    let server = MockServer::start();
    let mut first_mock = server.mock(|when, then| {
        when.method(GET).path("/menu");
        then.status(200).body(week_page(FULL_WEEK_ROWS));
    });

    let repository = open(db_path);
    let engine = engine_for(config_for(&server, "/menu", db_path), Arc::clone(&repository));
    engine.run().await;
    let before = repository.read_all().unwrap();
    first_mock.delete();

    let changed = FULL_WEEK_ROWS.replace("불고기<br>밥", "닭갈비");
    server.mock(|when, then| {
        when.method(GET).path("/menu");
        then.status(200).body(week_page(&changed));
    });
    engine.run().await;
    let after = repository.read_all().unwrap();

    assert_eq!(before.len(), after.len());
    assert_eq!(before[1].id, after[1].id);
    assert_eq!(after[1].menu_text, "닭갈비");
    assert_eq!(before[0], after[0]);
}

#[tokio::test]
async fn test_layout_change_keeps_existing_rows() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("menus.db");
    let db_path = db_path.to_str().unwrap();

    let server = MockServer::start();
    let mut good_mock = server.mock(|when, then| {
        when.method(GET).path("/menu");
        then.status(200).body(week_page(FULL_WEEK_ROWS));
    });

    let repository = open(db_path);
    let engine = engine_for(config_for(&server, "/menu", db_path), Arc::clone(&repository));
    engine.run().await;
    good_mock.delete();

    server.mock(|when, then| {
        when.method(GET).path("/menu");
        then.status(200).body("<html><body><main>리뉴얼 중</main></body></html>");
    });
    let summary = engine.run().await;

    assert!(!summary.is_success());
    assert_eq!(summary.saved, 0);
    assert_eq!(repository.read_all().unwrap().len(), 15);
}

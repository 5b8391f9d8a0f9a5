use anyhow::Context;
use clap::Parser;
use halla_bob::adapters::api::{self, ApiState, CorsPolicy};
use halla_bob::core::scheduler::run_weekly;
use halla_bob::domain::model::is_day_key;
use halla_bob::domain::ports::{MenuRepository, Pipeline};
use halla_bob::utils::error::ErrorSeverity;
use halla_bob::utils::{logger, validation::Validate};
use halla_bob::{
    AppConfig, Cli, Command, EtlEngine, EtlError, HttpFetcher, MenuPipeline, SqliteMenuRepository,
};
use std::sync::Arc;
use tokio::net::TcpListener;

type MenuEngine = EtlEngine<MenuPipeline<HttpFetcher, AppConfig>>;

const PREVIEW_ROWS: usize = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 설정 파일이 없으면 기본값으로 실행

    let mut config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file is valid TOML format");
            std::process::exit(1);
        }
    };
    // CLI 플래그가 설정 파일보다 우선
    cli.apply_overrides(&mut config);

    logger::init_logger(config.logging.format, cli.verbose);
    tracing::info!("Starting halla-bob");
    if cli.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = match cli.command.clone() {
        Command::Serve { .. } => serve(config).await,
        Command::Crawl { dry_run, .. } => crawl(config, dry_run).await.map_err(Into::into),
        Command::Show { date } => show(&config, date.as_deref()).map_err(Into::into),
    };

    // 심각도에 따라 종료 코드 결정
    if let Err(e) = result {
        match e.downcast_ref::<EtlError>() {
            Some(etl_error) => {
                tracing::error!(
                    "❌ {} (Category: {:?}, Severity: {:?})",
                    etl_error,
                    etl_error.category(),
                    etl_error.severity()
                );
                eprintln!("❌ {}", etl_error.user_friendly_message());
                eprintln!("💡 Suggestion: {}", etl_error.recovery_suggestion());

                let exit_code = match etl_error.severity() {
                    ErrorSeverity::Low => 0,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                };
                if exit_code > 0 {
                    std::process::exit(exit_code);
                }
            }
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn open_repository(config: &AppConfig) -> halla_bob::Result<Arc<SqliteMenuRepository>> {
    let repository = SqliteMenuRepository::open(&config.storage.database_path)?;
    repository.initialize()?;
    Ok(Arc::new(repository))
}

fn build_engine(
    config: AppConfig,
    repository: Arc<SqliteMenuRepository>,
) -> halla_bob::Result<MenuEngine> {
    let fetcher = HttpFetcher::from_config(&config)?;
    Ok(EtlEngine::new(MenuPipeline::new(fetcher, config, repository)))
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let repository = open_repository(&config)?;
    let schedule = if config.schedule.enabled {
        Some(config.schedule.to_schedule()?)
    } else {
        None
    };
    let addr = config.bind_address();
    let cors = CorsPolicy::new(config.server.allowed_origins.clone());
    let engine = Arc::new(build_engine(config, Arc::clone(&repository))?);

    // 주간 크롤링은 API와 같은 런타임에서 백그라운드로 실행
    match schedule {
        Some(schedule) => {
            tokio::spawn(run_weekly(Arc::clone(&engine), schedule));
        }
        None => tracing::info!("Weekly crawl disabled"),
    }

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind menu API to {addr}"))?;
    let state = ApiState::new(repository, engine);
    api::serve(listener, api::router(state, cors)).await?;
    Ok(())
}

async fn crawl(config: AppConfig, dry_run: bool) -> halla_bob::Result<()> {
    let repository = open_repository(&config)?;
    let engine = build_engine(config, Arc::clone(&repository))?;

    println!("🍱 Collecting cafeteria menus...");

    // 저장 없이 파싱 결과만 출력
    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - menus will not be saved");
        let markup = engine.pipeline().extract().await?;
        let entries = engine.pipeline().transform(markup).await?;
        println!("✅ Found {} menu entries", entries.len());
        for entry in &entries {
            println!(" - {} | {} | {}", entry.date, entry.meal_type, preview(&entry.menu_text));
        }
        return Ok(());
    }

    let summary = engine.run().await;
    // 실패해도 기존 데이터는 그대로 유지됨
    if let Some(reason) = &summary.error {
        println!("⚠️ No menus collected: {}", reason);
        return Ok(());
    }
    if summary.extracted == 0 {
        println!("⚠️ No menus found. Check the cafeteria site.");
        return Ok(());
    }

    println!("✅ Saved {} menu entries", summary.saved);
    println!("\n[Stored menu preview]");
    for row in repository.read_all()?.iter().take(PREVIEW_ROWS) {
        println!(" - {} | {} | {}", row.date, row.meal_type, preview(&row.menu_text));
    }
    Ok(())
}

fn show(config: &AppConfig, date: Option<&str>) -> halla_bob::Result<()> {
    let repository = open_repository(config)?;
    let rows = match date {
        Some(day) if !is_day_key(day) => {
            return Err(EtlError::Validation {
                message: format!("date must look like YYYY.MM.DD, got '{day}'"),
            })
        }
        Some(day) => repository.read_day(day)?,
        None => repository.read_all()?,
    };

    if rows.is_empty() {
        println!("🍽️ No stored menus");
        return Ok(());
    }

    for row in rows {
        println!("{} [{}]", row.date, row.meal_type);
        for line in row.menu_text.lines() {
            println!("    {}", line);
        }
    }
    Ok(())
}

/// First ten characters of a menu, on one line.
fn preview(menu: &str) -> String {
    let flat = menu.replace('\n', ", ");
    if flat.chars().count() > 10 {
        format!("{}...", flat.chars().take(10).collect::<String>())
    } else {
        flat
    }
}

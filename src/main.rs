use clap::Parser;
use parcel_query::adapters::http::DryRun;
use parcel_query::core::predicate::join_fields;
use parcel_query::domain::model::QueryNotice;
use parcel_query::domain::ports::ConfigProvider;
use parcel_query::utils::error::{ErrorSeverity, ParcelError};
use parcel_query::utils::{logger, table::render_table, validation::Validate};
use parcel_query::{ArcGisClient, CliConfig, FieldCatalog, LocalStorage, QueryEngine, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting parcel-query");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let catalog = FieldCatalog::wisconsin_parcels();

    if cli.list_fields {
        print_catalog(&catalog);
        return Ok(());
    }

    let settings = match cli.load_settings(&catalog) {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    let client = match ArcGisClient::from_config(&settings) {
        Ok(client) => client,
        Err(e) => fail(&e),
    };
    let engine = QueryEngine::new(client, catalog);

    if cli.dry_run {
        match engine.dry_run(&settings.query) {
            Ok(dry_run) => print_dry_run(&dry_run, &settings),
            Err(e) => fail(&e),
        }
        return Ok(());
    }

    println!(
        "Query WHERE Clause: {}",
        engine.builder().build_predicate(&settings.query)
    );
    let report = engine.run(&settings.query).await;

    if let Some(notice) = &report.notice {
        print_notice(notice);
    }

    if !report.has_results() {
        return Ok(());
    }

    println!();
    println!("Results ({} parcels)", report.results.len());
    print!("{}", render_table(&report.results.display_view()));

    if cli.no_export {
        return Ok(());
    }

    let storage = LocalStorage::new(settings.output_path().to_string());
    match engine
        .export(
            &report,
            &storage,
            settings.export_format(),
            settings.export_file_name(),
        )
        .await
    {
        Ok(Some((artifact, path))) => {
            println!();
            println!("📁 Saved {} ({})", path, artifact.mime_type);
        }
        Ok(None) => {}
        Err(e) => fail(&e),
    }

    Ok(())
}

fn print_notice(notice: &QueryNotice) {
    if notice.is_warning() {
        eprintln!("⚠️ {}", notice);
    } else {
        eprintln!("❌ {}", notice);
    }
}

fn fail(e: &ParcelError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ parcel-query failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn print_dry_run(dry_run: &DryRun, settings: &Settings) {
    println!("Query WHERE Clause: {}", dry_run.plan.predicate);
    println!();
    println!("🔍 Dry run, nothing will be sent");

    if let Some(notice) = &dry_run.plan.rejection {
        print_notice(notice);
        return;
    }

    println!(
        "  Requested fields: {}",
        join_fields(&dry_run.plan.requested_fields)
    );
    if let Some(url) = &dry_run.url {
        println!("  Request URL: {}", url);
    }
    println!(
        "  Export: {}/{}",
        settings.output_path(),
        settings
            .export_file_name()
            .unwrap_or(settings.export_format().default_file_name())
    );
    println!("  TLS verification: {}", if settings.verify_tls() { "on" } else { "off" });
}

fn print_catalog(catalog: &FieldCatalog) {
    println!("Available fields (* = searchable, + = selected by default):");
    for line in catalog.listing() {
        println!("  {}", line);
    }
}

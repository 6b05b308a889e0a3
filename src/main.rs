use clap::Parser;
use review_triage::core::ConfigProvider;
use review_triage::domain::ports::TelemetrySink;
use review_triage::utils::error::{ErrorSeverity, TriageError};
use review_triage::utils::{logger, monitor::SystemMonitor, validation::Validate};
use review_triage::{
    AnalysisOrchestrator, CliConfig, ConsolePresenter, HttpModelLoader, HttpTelemetrySink,
    LocalStorage, ModelManager, NoopTelemetry, ReviewCorpus, TsvCorpusLoader,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const TELEMETRY_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入設定檔（若有）並套用命令列覆蓋
    let settings = match cli.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.severity()));
        }
    };

    // 初始化日誌
    if settings.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting review-triage");
    if cli.verbose {
        tracing::debug!("Settings: {:?}", settings);
    }

    // 驗證配置
    if let Err(e) = cli.validate().and_then(|_| settings.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(e.severity()));
    }

    let monitor = SystemMonitor::new(settings.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    let corpus = Arc::new(ReviewCorpus::new());
    let corpus_loader = TsvCorpusLoader::new(
        LocalStorage::new(".".to_string()),
        settings.corpus_path(),
        settings.text_column(),
    );
    let models = Arc::new(ModelManager::new(Box::new(HttpModelLoader::from_config(
        &settings,
    ))));

    let http_sink = settings
        .telemetry_endpoint()
        .map(|endpoint| Arc::new(HttpTelemetrySink::new(endpoint, settings.model_name())));
    let telemetry: Arc<dyn TelemetrySink> = match &http_sink {
        Some(sink) => sink.clone(),
        None => {
            tracing::info!("Telemetry endpoint not configured, events will not be sent");
            Arc::new(NoopTelemetry)
        }
    };

    // 語料與模型同時載入，任一失敗都不中止程式
    let (corpus_result, model_result) =
        tokio::join!(corpus_loader.populate(&corpus), models.initialize());

    if let Err(e) = corpus_result {
        tracing::error!("❌ Corpus load failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
    }
    if let Err(e) = model_result {
        eprintln!("❌ {}", e.user_friendly_message());
    }
    monitor.log_stats("Startup");

    let mut orchestrator = AnalysisOrchestrator::new(
        models,
        corpus,
        telemetry,
        Arc::new(ConsolePresenter),
    );
    if let Some(seed) = settings.seed {
        orchestrator = orchestrator.with_seed(seed);
    }

    let mut last_error = None;
    if cli.interactive {
        println!("Press Enter to analyze a random review, or type q to quit.");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if matches!(line.trim(), "q" | "quit" | "exit") {
                break;
            }
            last_error = run_once(&orchestrator, &monitor).await;
        }
    } else {
        for _ in 0..cli.count {
            if let Some(e) = run_once(&orchestrator, &monitor).await {
                last_error = Some(e);
            }
        }
    }

    if let Some(sink) = &http_sink {
        sink.flush(TELEMETRY_FLUSH_TIMEOUT).await;
    }

    if let Some(e) = last_error {
        let code = exit_code(e.severity());
        if code > 0 {
            std::process::exit(code);
        }
    }

    Ok(())
}

async fn run_once(orchestrator: &AnalysisOrchestrator, monitor: &SystemMonitor) -> Option<TriageError> {
    let result = orchestrator.run_analysis().await;
    monitor.log_stats("Analysis");

    match result {
        Ok(_) => None,
        Err(e) => {
            // 使用者訊息已由 presenter 輸出
            tracing::error!(
                "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            Some(e)
        }
    }
}

// 根據錯誤嚴重程度決定退出碼
fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

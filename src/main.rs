// ==========================================
// Excel 批量上传 - 命令行入口
// ==========================================
// 用法:
//   excel-upload [--set key=value]... <parent_record_id> <file> [<file>...]
//
// 运行一次上传,逐条打印进度快照与最终通知;失败时退出码非零
// ==========================================

use anyhow::{anyhow, bail, Context};
use excel_upload::app::{get_default_db_path, AppState};
use excel_upload::config::UploadConfigReader;
use excel_upload::domain::UploadStep;
use excel_upload::engine::ChannelNotificationSink;
use excel_upload::importer::FileSelection;
use excel_upload::logging;
use std::path::PathBuf;
use std::sync::Arc;

/// 命令行参数
struct CliArgs {
    settings: Vec<(String, String)>,
    parent_record_id: String,
    files: Vec<PathBuf>,
}

fn parse_args(args: impl Iterator<Item = String>) -> anyhow::Result<CliArgs> {
    let mut args = args.peekable();
    let mut settings = Vec::new();

    while args.peek().map(|a| a == "--set").unwrap_or(false) {
        args.next();
        let pair = args.next().ok_or_else(|| anyhow!("--set requires key=value"))?;
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid --set argument: {}", pair))?;
        settings.push((key.trim().to_string(), value.trim().to_string()));
    }

    let parent_record_id = match args.next() {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => bail!("usage: excel-upload [--set key=value]... <parent_record_id> <file> [<file>...]"),
    };

    // 文件个数交给 FileAccessor 校验（0 个或多个都走错误流程）
    let files = args.map(PathBuf::from).collect();

    Ok(CliArgs {
        settings,
        parent_record_id,
        files,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args = parse_args(std::env::args().skip(1))?;

    let db_path = get_default_db_path();
    tracing::info!(version = excel_upload::VERSION, db_path = %db_path, "启动 {}", excel_upload::APP_NAME);

    let state = AppState::new(db_path).context("无法初始化AppState")?;
    for (key, value) in &args.settings {
        state
            .config
            .set_config_value(key, value)
            .with_context(|| format!("写入配置失败: {}", key))?;
    }

    let (sink, mut notifications) = ChannelNotificationSink::new();
    let orchestrator = state
        .orchestrator_for_parent(&args.parent_record_id, Arc::new(sink))
        .await?;

    // 进度打印
    let mut progress = orchestrator.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(snapshot) = progress.recv().await {
            if snapshot.step == UploadStep::Idle {
                break;
            }
            println!("[{}] {}", snapshot.step, snapshot.message);
            if snapshot.error {
                break;
            }
        }
    });

    let result = orchestrator.upload_file(FileSelection::new(args.files)).await;
    drop(orchestrator);
    let _ = printer.await;

    // 解码器加载失败的通知在初始化时已入队,与成功通知一起输出
    while let Ok(notification) = notifications.try_recv() {
        println!("{}: {}", notification.title, notification.message);
    }

    match result {
        Ok(report) => {
            let object_type = state.config.get_object_type().await?;
            let stored = state
                .submitter
                .count_records_for_parent(&object_type, &args.parent_record_id)?;
            println!(
                "batch {} ({} records, {} stored under {})",
                report.batch_id, report.record_count, stored, args.parent_record_id
            );
            Ok(())
        }
        Err(err) => {
            // 组合后的错误消息已随 Error 快照输出
            tracing::error!(kind = err.kind(), "上传失败");
            std::process::exit(1);
        }
    }
}

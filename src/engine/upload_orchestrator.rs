// ==========================================
// Excel 批量上传 - 上传编排器
// ==========================================
// 职责: 顺序执行上传各阶段,维护进度/错误状态机
// 流程: 读取文件 → 解码 + 提取 → 提交 → 完成停留 → 关闭 + 成功通知
// 红线: 任一阶段失败立即进入 Error,不重试,不部分提交
// ==========================================

use crate::config::UploadConfigReader;
use crate::domain::cell::Record;
use crate::domain::notification::Notification;
use crate::domain::session::{step_messages, UploadSnapshot, UploadStep};
use crate::engine::events::NotificationSink;
use crate::importer::error::{UploadError, UploadResult};
use crate::importer::file_accessor::{FileAccessor, FileSelection};
use crate::importer::record_extractor::RecordExtractor;
use crate::importer::sheet_decoder::{SheetDecoder, SheetDecoderProvider};
use crate::repository::record_submitter::{RecordSubmitter, SubmissionReceipt, SubmissionRequest};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 进度广播通道容量
pub const PROGRESS_CHANNEL_CAPACITY: usize = 64;

// ==========================================
// 解码能力就绪状态
// ==========================================
#[derive(Clone)]
pub enum DecoderReadiness {
    Ready(Arc<dyn SheetDecoder>),
    Unavailable { decoder: String, reason: String },
}

impl DecoderReadiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, DecoderReadiness::Ready(_))
    }

    /// 取得解码器句柄（每次运行开始时检查）
    pub fn decoder(&self) -> UploadResult<Arc<dyn SheetDecoder>> {
        match self {
            DecoderReadiness::Ready(decoder) => Ok(Arc::clone(decoder)),
            DecoderReadiness::Unavailable { decoder, reason } => Err(UploadError::LibraryLoad {
                decoder: decoder.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

impl std::fmt::Debug for DecoderReadiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecoderReadiness::Ready(decoder) => write!(f, "Ready({})", decoder.name()),
            DecoderReadiness::Unavailable { decoder, reason } => {
                write!(f, "Unavailable({}: {})", decoder, reason)
            }
        }
    }
}

/// 一次成功上传的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    pub run_id: String,
    pub batch_id: String,
    pub record_count: usize,
}

// ==========================================
// RunContext - 单次运行独占的状态
// ==========================================
#[derive(Debug)]
struct RunContext {
    run_id: String,
    step: UploadStep,
    message: String,
    error: bool,
    records: Vec<Record>,
}

impl RunContext {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            step: UploadStep::Idle,
            message: String::new(),
            error: false,
            records: Vec::new(),
        }
    }

    /// 按状态机前进一步
    fn advance(&mut self, next: UploadStep, message: &str) -> UploadResult<()> {
        if !self.step.can_advance_to(next) {
            return Err(UploadError::Internal(format!(
                "invalid step transition: {} → {}",
                self.step, next
            )));
        }
        self.step = next;
        self.message = message.to_string();
        Ok(())
    }

    /// 进入 Error（本次运行终止）
    fn fail(&mut self, err: &UploadError) {
        if !self.step.can_advance_to(UploadStep::Error) {
            warn!(step = %self.step, "终态下收到错误,忽略状态转换");
            return;
        }
        self.step = UploadStep::Error;
        self.error = true;
        self.message = err.display_message();
    }

    /// 关闭模态框: 字段复位为 Idle 默认值
    fn close(&mut self) -> UploadResult<()> {
        self.advance(UploadStep::Idle, "")?;
        self.error = false;
        self.records.clear();
        Ok(())
    }

    fn snapshot(&self) -> UploadSnapshot {
        UploadSnapshot::new(
            &self.run_id,
            self.step,
            &self.message,
            self.error,
            self.records.len(),
        )
    }
}

// ==========================================
// UploadOrchestrator
// ==========================================
pub struct UploadOrchestrator<S, C>
where
    S: RecordSubmitter,
    C: UploadConfigReader,
{
    // 后端提交
    submitter: S,

    // 配置读取器
    config: C,

    // 解码能力
    readiness: DecoderReadiness,

    // 通知接收者
    sink: Arc<dyn NotificationSink>,

    // 阶段组件
    file_accessor: FileAccessor,

    // 进度快照广播
    progress: broadcast::Sender<UploadSnapshot>,
}

impl<S, C> UploadOrchestrator<S, C>
where
    S: RecordSubmitter,
    C: UploadConfigReader,
{
    /// 初始化编排器（显式加载解码能力）
    ///
    /// 加载失败时发出错误通知,编排器仍可构造,但每次运行都会以 Error 结束
    pub async fn initialize(
        provider: Arc<dyn SheetDecoderProvider>,
        submitter: S,
        config: C,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let readiness = match provider.load().await {
            Ok(decoder) => {
                info!(decoder = decoder.name(), "解码器就绪");
                DecoderReadiness::Ready(decoder)
            }
            Err(err) => {
                let reason = match err {
                    UploadError::LibraryLoad { reason, .. } => reason,
                    other => other.to_string(),
                };
                let load_error = UploadError::LibraryLoad {
                    decoder: provider.name().to_string(),
                    reason: reason.clone(),
                };
                error!(decoder = provider.name(), error = %load_error, "解码器加载失败");
                Self::dispatch(
                    sink.as_ref(),
                    Notification::decoder_load_failed(provider.name(), &load_error.to_string()),
                );
                DecoderReadiness::Unavailable {
                    decoder: provider.name().to_string(),
                    reason,
                }
            }
        };

        Self::with_readiness(readiness, submitter, config, sink)
    }

    /// 使用已就绪的解码器创建编排器
    pub fn with_decoder(
        decoder: Arc<dyn SheetDecoder>,
        submitter: S,
        config: C,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::with_readiness(DecoderReadiness::Ready(decoder), submitter, config, sink)
    }

    fn with_readiness(
        readiness: DecoderReadiness,
        submitter: S,
        config: C,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (progress, _) = broadcast::channel(PROGRESS_CHANNEL_CAPACITY);
        Self {
            submitter,
            config,
            readiness,
            sink,
            file_accessor: FileAccessor,
            progress,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    pub fn readiness(&self) -> &DecoderReadiness {
        &self.readiness
    }

    /// 订阅进度快照（只收到订阅之后发布的快照）
    pub fn subscribe(&self) -> broadcast::Receiver<UploadSnapshot> {
        self.progress.subscribe()
    }

    /// 进度快照流（消费过慢时跳过积压的快照）
    pub fn progress_stream(&self) -> impl Stream<Item = UploadSnapshot> + Send + 'static {
        stream::unfold(self.progress.subscribe(), |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(snapshot) => return Some((snapshot, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped = skipped, "进度订阅者落后,跳过旧快照");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
    }

    /// 上传所选文件
    ///
    /// 每次调用创建独立的运行上下文;并发调用互不共享状态
    ///
    /// # 返回
    /// - Ok(UploadReport): 已提交并完成关闭
    /// - Err(UploadError): 某阶段失败,最后一个快照为 Error
    pub async fn upload_file(&self, selection: FileSelection) -> UploadResult<UploadReport> {
        self.execute(RunContext::new(), selection).await
    }

    #[instrument(skip_all, fields(run_id = %ctx.run_id, files = selection.len()))]
    async fn execute(
        &self,
        mut ctx: RunContext,
        selection: FileSelection,
    ) -> UploadResult<UploadReport> {
        info!("开始上传");

        let (receipt, success_delay) = match self.run_stages(&mut ctx, &selection).await {
            Ok(result) => result,
            Err(err) => {
                ctx.fail(&err);
                self.publish(&ctx);
                error!(kind = err.kind(), error = %err, step = %UploadStep::Error, "上传失败");
                return Err(err);
            }
        };

        // === Done: 停留后关闭并通知 ===
        let record_count = ctx.records.len();
        debug!(delay_ms = success_delay.as_millis() as u64, "完成停留");
        tokio::time::sleep(success_delay).await;

        ctx.close()?;
        self.publish(&ctx);
        Self::dispatch(self.sink.as_ref(), Notification::upload_success(record_count));

        info!(
            batch_id = %receipt.batch_id,
            record_count = record_count,
            "上传完成"
        );

        Ok(UploadReport {
            run_id: ctx.run_id,
            batch_id: receipt.batch_id,
            record_count,
        })
    }

    /// 顺序执行各阶段,遇错即返回
    async fn run_stages(
        &self,
        ctx: &mut RunContext,
        selection: &FileSelection,
    ) -> UploadResult<(SubmissionReceipt, Duration)> {
        // === 阶段 1: Idle → Reading ===
        ctx.records.clear();
        ctx.error = false;
        self.transition(ctx, UploadStep::Reading, step_messages::READING)?;

        let decoder = self.readiness.decoder()?;
        let bytes = self.file_accessor.read_binary(selection).await?;
        let settings = self.config.load_upload_settings().await?;

        // === 阶段 2: Reading → Extracting ===
        self.transition(ctx, UploadStep::Extracting, step_messages::EXTRACTING)?;

        let workbook = tokio::task::spawn_blocking(move || decoder.decode(&bytes)).await??;
        let records = RecordExtractor::new()
            .with_require_rows(settings.require_rows)
            .extract(&workbook)?;

        // === 阶段 3: Extracting → Inserting ===
        ctx.records = records;
        self.transition(ctx, UploadStep::Inserting, step_messages::INSERTING)?;

        let request = SubmissionRequest {
            target_type: settings.object_type.clone(),
            parent_field_name: settings.parent_field_name.clone(),
            parent_id: settings.parent_record_id.clone(),
            field_names: settings.field_name_list(),
            records: ctx.records.clone(),
        };
        let receipt = self.submitter.submit(request).await?;

        // === 阶段 4: Inserting → Done ===
        // 最后一步不打勾（见 UploadSnapshot::completed_steps）
        self.transition(ctx, UploadStep::Done, step_messages::DONE)?;

        Ok((receipt, settings.success_delay))
    }

    fn transition(&self, ctx: &mut RunContext, next: UploadStep, message: &str) -> UploadResult<()> {
        ctx.advance(next, message)?;
        debug!(step = %next, record_count = ctx.records.len(), "步骤切换");
        self.publish(ctx);
        Ok(())
    }

    fn publish(&self, ctx: &RunContext) {
        // 无订阅者时发送失败,属正常情况
        let _ = self.progress.send(ctx.snapshot());
    }

    fn dispatch(sink: &dyn NotificationSink, notification: Notification) {
        if let Err(e) = sink.notify(notification) {
            warn!(error = %e, "通知投递失败");
        }
    }
}

// ==========================================
// TPM/MTO PRO - 性能统计
// ==========================================
// 职责: API 调用耗时 + 文档库 SQL 语句计数 + 慢 SQL 告警
// 计数按线程累加, 只统计处于 PerfGuard 作用域内的语句
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 强制开关 SQL 统计的环境变量
pub const ENV_PERF_SQL: &str = "TPM_MTO_PERF_SQL";
/// 慢 SQL 阈值 (毫秒) 的环境变量
pub const ENV_SLOW_SQL_MS: &str = "TPM_MTO_SLOW_SQL_MS";

/// 慢 SQL 日志中语句的最大字符数
const SLOW_SQL_LOG_CHARS: usize = 420;

// rusqlite 回调只接受 fn 指针, 开关只能放在全局
static SQL_PERF_ON: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_MS: AtomicU64 = AtomicU64::new(0);

// ==========================================
// SqlPerfSettings - SQL 统计开关
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlPerfSettings {
    pub enabled: bool,
    /// 0 表示不报告慢 SQL
    pub slow_threshold_ms: u64,
}

impl SqlPerfSettings {
    /// Debug 构建默认开启 (阈值 50ms); Release 默认关闭 (阈值 200ms)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup(ENV_PERF_SQL).map_or(cfg!(debug_assertions), |v| parse_switch(&v));
        let slow_threshold_ms = lookup(ENV_SLOW_SQL_MS)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
        Self {
            enabled,
            slow_threshold_ms,
        }
    }
}

fn parse_switch(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on")
}

/// 按环境变量为文档库连接挂载 trace/profile 回调
pub fn install_sqlite_tracing(conn: &mut Connection) {
    apply_sqlite_tracing(conn, SqlPerfSettings::from_env());
}

fn apply_sqlite_tracing(conn: &mut Connection, settings: SqlPerfSettings) {
    SQL_PERF_ON.store(settings.enabled, Ordering::Relaxed);
    SLOW_SQL_MS.store(settings.slow_threshold_ms, Ordering::Relaxed);

    if settings.enabled {
        conn.trace(Some(on_sql_statement));
        conn.profile(Some(on_sql_finished));
    } else {
        // 连接可能被复用, 清掉旧回调
        conn.trace(None);
        conn.profile(None);
    }
    tracing::debug!(
        enabled = settings.enabled,
        slow_threshold_ms = settings.slow_threshold_ms,
        "SQL 统计已配置"
    );
}

// ==========================================
// SqlTally - 线程内 SQL 计数
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SqlTally {
    statements: u64,
    slow: u64,
}

impl SqlTally {
    fn since(self, baseline: SqlTally) -> SqlTally {
        SqlTally {
            statements: self.statements.saturating_sub(baseline.statements),
            slow: self.slow.saturating_sub(baseline.slow),
        }
    }
}

thread_local! {
    /// 嵌套的 PerfGuard 层数
    static GUARD_DEPTH: Cell<u32> = const { Cell::new(0) };
    static TALLY: Cell<SqlTally> = const { Cell::new(SqlTally { statements: 0, slow: 0 }) };
}

fn in_guard() -> bool {
    GUARD_DEPTH.with(|d| d.get() > 0)
}

fn bump(update: impl FnOnce(&mut SqlTally)) {
    TALLY.with(|t| {
        let mut tally = t.get();
        update(&mut tally);
        t.set(tally);
    });
}

fn on_sql_statement(_sql: &str) {
    if SQL_PERF_ON.load(Ordering::Relaxed) && in_guard() {
        bump(|t| t.statements = t.statements.saturating_add(1));
    }
}

fn on_sql_finished(sql: &str, duration: Duration) {
    if !SQL_PERF_ON.load(Ordering::Relaxed) {
        return;
    }
    let threshold_ms = SLOW_SQL_MS.load(Ordering::Relaxed);
    let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    if threshold_ms == 0 || duration_ms < threshold_ms {
        return;
    }

    tracing::warn!(
        target: "slow_sql",
        duration_ms,
        sql = %shorten_sql(sql, SLOW_SQL_LOG_CHARS),
        "slow sql"
    );
    if in_guard() {
        bump(|t| t.slow = t.slow.saturating_add(1));
    }
}

/// 折叠空白并按字符数截断
fn shorten_sql(sql: &str, max_chars: usize) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &flat[..cut]),
        None => flat,
    }
}

// ==========================================
// PerfGuard - API 调用计时
// ==========================================

/// 作用域结束时输出 elapsed_ms / sql_count / slow_sql_count (target "perf")
///
/// ```ignore
/// let _perf = tpm_mto_pro::perf::PerfGuard::new("complete_task");
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    baseline: SqlTally,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        GUARD_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        Self {
            op,
            start: Instant::now(),
            baseline: TALLY.with(Cell::get),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let used = TALLY.with(Cell::get).since(self.baseline);

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            sql_count = used.statements,
            slow_sql_count = used.slow,
            "done"
        );

        GUARD_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

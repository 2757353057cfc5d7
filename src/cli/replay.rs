use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pagemirror_cli::report::render_human;
use pagemirror_cli::{ReplayScript, Replayer};
use tracing::info;

use super::context::CliContext;
use super::output::emit;

#[derive(Args, Clone, Debug)]
pub struct ReplayArgs {
    /// Mutation script (YAML or JSON)
    pub script: PathBuf,

    /// Omit the changelist produced by the initial discovery pass
    #[arg(long)]
    pub skip_discovery: bool,

    /// Omit session metrics from the output
    #[arg(long)]
    pub no_metrics: bool,
}

pub async fn cmd_replay(args: ReplayArgs, ctx: &CliContext) -> Result<()> {
    let script = ReplayScript::load(&args.script).await?;
    let settings = &ctx.config().replay;

    let mut report = Replayer::new(ctx.config().layout.clone())
        .run(&script)
        .with_context(|| format!("replaying {}", args.script.display()))?;
    if args.skip_discovery || settings.skip_discovery {
        report.changelists.retain(|changelist| changelist.op != "discover");
    }
    info!(
        changelists = report.changelists.len(),
        drained = ?report.metrics.map(|metrics| metrics.drained),
        "replay finished"
    );

    if !settings.metrics || args.no_metrics {
        report.metrics = None;
    }
    emit(ctx.output(), &report, || render_human(&report))
}

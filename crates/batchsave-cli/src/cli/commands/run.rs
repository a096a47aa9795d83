//! `batchsave run`: transfer the units of a manifest into a directory.

use anyhow::{bail, Result};
use batchsave_core::config::BatchsaveConfig;
use batchsave_core::manifest::Manifest;
use batchsave_core::messages::{user_message, MessageKind};
use batchsave_core::network::{NetworkQuality, StaticNetworkQuality};
use batchsave_core::resolver::{BaseUrlResolver, DirectUrlResolver, UrlResolver};
use batchsave_core::scheduler::Progress;
use batchsave_core::strategy::select_strategy;
use batchsave_core::transport::DirectorySink;
use batchsave_core::{
    CancelToken, ClientHints, JobReport, Outcome, Strategy, TransferEngine, TransferJob,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Options of `batchsave run` after defaults are filled in.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub manifest: PathBuf,
    pub out_dir: PathBuf,
    pub name: Option<String>,
    pub base_url: Option<String>,
    pub network: Option<NetworkQuality>,
    pub user_agent: Option<String>,
    pub viewport_width: Option<u32>,
    pub strategy: Option<Strategy>,
    pub fail_fast: bool,
    pub overwrite: bool,
}

impl RunArgs {
    fn hints(&self) -> ClientHints {
        ClientHints::new(self.user_agent.clone(), self.viewport_width)
    }

    fn strategy(&self) -> Strategy {
        self.strategy
            .unwrap_or_else(|| select_strategy(&self.hints()))
    }
}

/// Job from the manifest with CLI overrides applied; concurrency follows the network hint.
fn build_job(manifest: Manifest, args: &RunArgs, cfg: &BatchsaveConfig) -> TransferJob {
    let network = StaticNetworkQuality(args.network.unwrap_or(cfg.network_quality));
    let mut manifest = manifest;
    if let Some(name) = &args.name {
        manifest.job_name = name.clone();
    }
    manifest.into_job(Some(&network))
}

fn resolver_for(base_url: Option<&str>) -> Result<Arc<dyn UrlResolver>> {
    Ok(match base_url {
        Some(base) => Arc::new(BaseUrlResolver::new(base)?),
        None => Arc::new(DirectUrlResolver),
    })
}

/// Message for a job where nothing was saved, taken from the last unit error.
fn failure_message(report: &JobReport) -> &'static str {
    report
        .last_error()
        .map(|e| user_message(e))
        .unwrap_or_else(|| MessageKind::Generic.message())
}

fn progress_line(p: &Progress) -> String {
    format!(
        "  {}/{} file(s) ({:.0}%)",
        p.current,
        p.total,
        p.fraction() * 100.0
    )
}

pub async fn run_manifest(cfg: &BatchsaveConfig, args: RunArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let base_url = args.base_url.clone().or_else(|| manifest.base_url.clone());
    let resolver = resolver_for(base_url.as_deref())?;
    let job = build_job(manifest, &args, cfg);
    let strategy = args.strategy();

    let client = cfg.http_client();
    let sink = DirectorySink::new(&args.out_dir)
        .with_overwrite(args.overwrite || cfg.overwrite)
        .with_client(client.clone());
    let mut options = cfg.engine_options();
    options.fail_fast |= args.fail_fast;
    let engine = TransferEngine::new(Arc::new(client), Arc::new(sink), resolver).with_options(options);

    println!(
        "job '{}': {} unit(s), {} strategy, {} concurrent fetch(es)",
        job.job_name,
        job.len(),
        strategy,
        job.concurrency_limit
    );

    let cancel = CancelToken::new();
    let ctrl_c_cancel = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("cancelling after the current step...");
            ctrl_c_cancel.cancel();
        }
    });

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<Progress>(16);
    let printer = tokio::spawn(async move {
        while let Some(p) = progress_rx.recv().await {
            println!("{}", progress_line(&p));
        }
    });

    let result = engine
        .run_with_report(&job, strategy, Some(&progress_tx), &cancel)
        .await;
    drop(progress_tx);
    let _ = printer.await;
    ctrl_c.abort();

    match result {
        Ok(report) => {
            println!("{}", report.outcome);
            match report.outcome {
                Outcome::Completed(_) => Ok(()),
                Outcome::PartiallyCompleted { skipped, .. } => {
                    println!("{} file(s) could not be downloaded; see the log for details", skipped);
                    Ok(())
                }
                Outcome::FailedNoUnits => bail!("{}", failure_message(&report)),
                Outcome::Cancelled => bail!("transfer cancelled"),
            }
        }
        Err(e) => bail!("{} ({})", user_message(&e), e),
    }
}

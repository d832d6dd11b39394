//! `zimsync update` - bring the installation in line with the subscriptions.

use dialoguer::{theme::ColorfulTheme, Confirm};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::warn;

use zimsync::{
    ArchiveManager, Config, Downloader, HttpCatalog, HttpTransport, KiwixManage, ProgressCallback,
    StateStore, SyncPlan, UpdateOptions, UpdateReport,
};

use crate::error::CliError;

pub struct UpdateArgs {
    pub prompt: bool,
    pub verify: bool,
    pub check_size: bool,
    pub jobs: usize,
    pub quiet: bool,
}

pub fn run(config: &Config, args: UpdateArgs) -> Result<bool, CliError> {
    let store = StateStore::open(&config.db_path())
        .map_err(zimsync::ManagerError::from)?;

    let manager = ArchiveManager::new(
        HttpCatalog::new(config.feed_url.as_str()),
        Downloader::new(HttpTransport::new()),
        store,
        KiwixManage::new(&config.kiwix_manage_exec, config.library_path()),
        config.archive_dir(),
    )?;

    let confirm = |plan: &SyncPlan| confirm_plan(plan);
    let bars = MultiProgress::new();
    let progress = progress_factory(&bars);

    let report = manager.update(
        &config.subscriptions,
        &UpdateOptions {
            verify: args.verify,
            check_size: args.check_size,
            pool_size: args.jobs,
            confirm: args.prompt.then_some(&confirm as &dyn Fn(&SyncPlan) -> bool),
            progress: (!args.quiet).then_some(&progress as &zimsync::ProgressFactory),
        },
    )?;

    print_report(&report);
    Ok(report.is_success())
}

/// Show the plan and ask before any file is touched.
fn confirm_plan(plan: &SyncPlan) -> bool {
    for entry in &plan.to_download {
        println!("download  {}", entry.to_reference());
    }
    for details in &plan.to_delete {
        println!("remove    {}", details.file_name);
    }

    match Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "Proceed with {} download(s) and {} removal(s)?",
            plan.to_download.len(),
            plan.to_delete.len()
        ))
        .default(true)
        .interact()
    {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "Confirmation prompt failed, treating as declined");
            false
        }
    }
}

/// One progress bar per in-flight archive.
fn progress_factory(bars: &MultiProgress) -> impl Fn(&str, u64) -> ProgressCallback + '_ {
    move |file_name: &str, total: u64| -> ProgressCallback {
        let bar = bars.add(ProgressBar::new(total));
        bar.set_style(
            ProgressStyle::with_template("{msg:24} [{bar:40}] {bytes}/{total_bytes}")
                .expect("static progress template is valid")
                .progress_chars("=> "),
        );
        bar.set_message(file_name.to_string());

        Box::new(move |done, total| {
            bar.set_length(total);
            bar.set_position(done);
            if done >= total {
                bar.finish();
            }
        })
    }
}

fn print_report(report: &UpdateReport) {
    if report.aborted {
        println!("aborted, nothing changed");
        return;
    }

    for details in &report.downloaded {
        println!("installed  {}  ({})", details.reference, details.file_name);
    }
    for details in &report.deleted {
        println!("removed    {}", details.file_name);
    }
    for failed in &report.failed {
        println!("failed     {}: {}", failed.name, failed.reason);
    }

    if report.downloaded.is_empty() && report.deleted.is_empty() && report.failed.is_empty() {
        println!("already up to date");
    }
}

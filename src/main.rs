use anyhow::{Context, Result};
use keywarden::{
    cli::{global::Command, CommandLineArgs, GlobalArgs},
    runner::{run_audit_command, run_report_command},
};
use tokio::runtime::Builder;
use tracing_core::metadata::LevelFilter;
use tracing_subscriber::{
    self, fmt, prelude::__tracing_subscriber_SubscriberExt, registry, util::SubscriberInitExt,
};

fn main() -> Result<()> {
    color_backtrace::install();
    let args = CommandLineArgs::parse_args();

    // The audit is strictly sequential; one thread is all it needs.
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;
    let exit_code = runtime.block_on(async_main(args))?;
    std::process::exit(exit_code);
}

fn setup_logging(global_args: &GlobalArgs) {
    let level = LevelFilter::from_level(global_args.log_level());
    let filter = if global_args.all_targets() {
        // `-vvv` also shows the AWS SDK's own logging
        tracing_subscriber::filter::Targets::new().with_default(LevelFilter::TRACE)
    } else {
        tracing_subscriber::filter::Targets::new()
            .with_default(LevelFilter::ERROR)
            .with_target("keywarden", level)
    };
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .without_time();
    registry().with(fmt_layer).with(filter).init();
}

async fn async_main(args: CommandLineArgs) -> Result<i32> {
    setup_logging(&args.global_args);
    match args.command {
        Command::Audit(ref audit_args) => run_audit_command(audit_args).await,
        Command::Report(ref report_args) => {
            run_report_command(report_args).await?;
            Ok(0)
        }
    }
}

use clap::{Arg, ArgMatches, Command};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use withdrawal_desk::auth::DeferredVerifier;
use withdrawal_desk::config::{load_config, DeskConfig};
use withdrawal_desk::desk::{
    ModerationDesk, Notice, Notifier, RefreshOutcome, StatusSummary, SubmissionDesk,
    UserProfile, WithdrawalDraft,
};
use withdrawal_desk::http::HttpProcessingClient;
use withdrawal_desk::init_tracing;
use withdrawal_desk::withdrawal::{StatusFilter, WithdrawalRequest, WithdrawalStatus};

/// Prints notices the way the web UI would toast them.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_error() {
            eprintln!("✗ {}", notice);
        } else {
            println!("• {}", notice);
        }
    }
}

fn cli() -> Command {
    let key = Arg::new("key")
        .long("key")
        .value_name("KEY")
        .env("WITHDRAWAL_DESK_OPERATOR_KEY")
        .help("Operator key sent as X-Admin-Key")
        .required(true);

    let status = Arg::new("status")
        .long("status")
        .value_name("STATUS")
        .help("all | pending | approved | rejected")
        .default_value("all")
        .value_parser(clap::value_parser!(String));

    let id = Arg::new("id")
        .value_name("ID")
        .help("Withdrawal id")
        .required(true)
        .value_parser(clap::value_parser!(i64));

    Command::new("Withdrawal Desk")
        .version("1.0")
        .about("Submit and moderate withdrawal requests")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Config file with a [desk] section")
                .global(true),
        )
        .arg(
            Arg::new("service_url")
                .long("service-url")
                .value_name("URL")
                .help("Processing service base URL")
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("submit")
                .about("Request a payout")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("destination").long("destination"))
                .arg(
                    Arg::new("bank")
                        .long("bank")
                        .help("sber | tinkoff | alpha | vtb | raiff, or a bank name"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("Show the moderation queue")
                .arg(key.clone())
                .arg(status),
        )
        .subcommand(
            Command::new("approve")
                .about("Approve a pending request")
                .arg(key.clone())
                .arg(id.clone()),
        )
        .subcommand(
            Command::new("reject")
                .about("Reject a pending request")
                .arg(key)
                .arg(id),
        )
}

fn desk_config(matches: &ArgMatches) -> anyhow::Result<DeskConfig> {
    let mut desk = match matches.get_one::<String>("config") {
        Some(path) => load_config(Some(Path::new(path)))?.desk,
        None => DeskConfig::default(),
    };
    if let Some(url) = matches.get_one::<String>("service_url") {
        desk.service_url = url.clone();
    }
    Ok(desk)
}

fn print_rows(rows: &[WithdrawalRequest]) {
    for row in rows {
        println!(
            "#{:<5} {:<9} {:>12}₽  {:<20} {:<12} {}",
            row.id,
            row.status,
            row.amount,
            row.user_name,
            row.bank_name,
            row.masked_destination()
        );
    }
}

fn print_summary(summary: &StatusSummary) {
    for status in WithdrawalStatus::ALL {
        let bucket = summary.bucket(status);
        println!("{:<9} {:>4}  {:>12}₽", status, bucket.count, bucket.amount);
    }
    println!("{:<9} {:>4}  {:>12}₽", "total", summary.total.count, summary.total.amount);
}

fn report_refresh(outcome: &RefreshOutcome) {
    if let RefreshOutcome::Stale { reason } = outcome {
        eprintln!("warning: list not refreshed ({})", reason);
    }
}

async fn signed_in_desk(
    service: Arc<HttpProcessingClient>,
    sub: &ArgMatches,
    filter: StatusFilter,
) -> anyhow::Result<ModerationDesk> {
    let desk = ModerationDesk::new(service, Arc::new(DeferredVerifier), Arc::new(ConsoleNotifier));
    let key = sub
        .get_one::<String>("key")
        .ok_or_else(|| anyhow::anyhow!("operator key is required"))?;
    report_refresh(&desk.sign_in_with(key, filter).await?);
    Ok(desk)
}

async fn run(matches: ArgMatches) -> anyhow::Result<()> {
    let config = desk_config(&matches)?;
    let service = Arc::new(HttpProcessingClient::new(&config.service_url)?);

    match matches.subcommand() {
        Some(("submit", sub)) => {
            let arg = |name: &str| sub.get_one::<String>(name).cloned().unwrap_or_default();
            let desk = SubmissionDesk::new(
                service,
                Arc::new(ConsoleNotifier),
                UserProfile {
                    name: arg("name"),
                    email: arg("email"),
                },
            )
            .with_review_delay(Duration::from_millis(config.review_notice_delay_ms));

            println!("Payout via {}", config.payout_method.destination_label());
            let mut draft = WithdrawalDraft::new(arg("amount"), arg("destination"), arg("bank"));
            let accepted = desk.submit(&mut draft).await?;
            accepted.review_notice.await?;
        }
        Some(("list", sub)) => {
            let filter = sub
                .get_one::<String>("status")
                .map(|raw| raw.parse::<StatusFilter>())
                .transpose()?
                .unwrap_or_default();
            let desk = signed_in_desk(service, sub, filter).await?;
            print_rows(&desk.requests().await);
            println!();
            print_summary(&desk.summary().await);
        }
        Some((action @ ("approve" | "reject"), sub)) => {
            let status = if action == "approve" {
                WithdrawalStatus::Approved
            } else {
                WithdrawalStatus::Rejected
            };
            let id = *sub
                .get_one::<i64>("id")
                .ok_or_else(|| anyhow::anyhow!("withdrawal id is required"))?;

            let desk = signed_in_desk(service, sub, StatusFilter::Pending).await?;
            let updated = desk.update_status(id, status).await?;
            report_refresh(&updated.refresh);
            print_rows(&desk.requests().await);
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing("warn");

    if let Err(e) = run(cli().get_matches()).await {
        error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

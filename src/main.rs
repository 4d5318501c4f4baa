use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::process;
use std::time::Duration;
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use fleet::api::{self, InventoryClient};
use fleet::config;
use fleet::models::{HostRecord, HostView, MetadataPair};
use fleet::services::{
    register_only, HostFilter, HostOutcome, LifeCycleFilter, ProvisionPhase, ProvisionRun,
    RunNotice, StatusBucket, WorkloadMembership,
};
use fleet::wizard::{WizardSession, WizardView};

#[derive(Parser)]
#[command(
    name = "fleet",
    author,
    version,
    about = "Fleet command-line console",
    long_about = r#"Fleet — manage edge hosts in the orchestrator inventory right from a terminal.

This tool surfaces a small set of commands to validate configuration, browse
the host inventory with the same filters the web console offers, register new
hosts and drive the full provisioning workflow. Use the `--env-file` option or
environment variables to provide API credentials.

Examples:
  1) Browse hosts:
      fleet hosts list --state provisioned --search lab42
  2) Register hosts for later onboarding:
      fleet hosts register edge-a edge-b --auto-onboard
  3) Register and fully provision in one pass:
      fleet hosts provision edge-a:SN1234 --site site-7 --os os-ubuntu-22 --secure
"#,
    after_help = "Use `fleet <subcommand> --help` to get subcommand specific options and usage examples."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Disable request/response logging
    #[arg(long, global = true)]
    silent: bool,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration (env vars / API credentials)
    #[command(
        about = "Validate configuration and ensure API connectivity.",
        long_about = "Validate environment variables required by the fleet CLI, and validate the configured token by attempting to fetch one page of hosts from the inventory."
    )]
    CheckConfig,
    /// Manage hosts via the configured inventory API
    Hosts {
        #[command(subcommand)]
        sub: HostCommands,
    },
}

#[derive(Subcommand)]
enum HostCommands {
    /// List hosts matching the console filters
    #[command(
        about = "List hosts",
        long_about = "List inventory hosts. Every option corresponds to one console filter facet; the combined filter query is built locally and sent with the request. Use `--page` and `--per-page` for pagination."
    )]
    List {
        /// Lifecycle filter: all | provisioned | onboarded | registered
        #[arg(long, default_value = "all")]
        state: String,
        /// Free-text search across name, serial number, UUID, note and site
        #[arg(long)]
        search: Option<String>,
        /// Status bucket: ready | in-progress | error | unknown | deauthorized (repeatable)
        #[arg(long)]
        status: Vec<String>,
        /// OS profile name (repeatable)
        #[arg(long)]
        os_profile: Vec<String>,
        /// Only hosts with (true) or without (false) workload members
        #[arg(long)]
        has_workload: Option<bool>,
        /// Only hosts belonging to this workload member
        #[arg(long)]
        workload_member: Option<String>,
        /// Only hosts assigned to this site
        #[arg(long)]
        site: Option<String>,
        /// Page number to display (1-indexed)
        #[arg(long, short = 'p', default_value = "1")]
        page: usize,
        /// Number of hosts per page
        #[arg(long, default_value_t = config::DEFAULT_PAGE_SIZE)]
        per_page: usize,
    },
    /// Register hosts without provisioning them
    #[command(
        about = "Register hosts",
        long_about = "Create inventory entries for one or more hosts. Registered hosts stop at the manual onboarding gate unless `--auto-onboard` is given; configuration happens later from the host list."
    )]
    Register {
        /// Host specs: name, name:serial or name:serial:uuid
        #[arg(required = true)]
        hosts: Vec<String>,
        /// Connected hosts onboard automatically instead of waiting for approval
        #[arg(long)]
        auto_onboard: bool,
    },
    /// Register, configure and activate hosts in one batch
    #[command(
        about = "Provision hosts",
        long_about = "Run the full provisioning workflow: register every host, patch site assignment and labels, then create the runtime instance. Hosts that fail are reported individually; re-running the same command retries only the failed ones."
    )]
    Provision {
        /// Host specs: name, name:serial or name:serial:uuid
        #[arg(required = true)]
        hosts: Vec<String>,
        /// Site (resource id or name) to assign every host to
        #[arg(long)]
        site: String,
        /// OS profile id installed on every host
        #[arg(long)]
        os: String,
        /// Enable secure boot and full disk encryption
        #[arg(long)]
        secure: bool,
        /// Local account id granted SSH access on the created instances
        #[arg(long)]
        local_account: Option<String>,
        /// Host label as key=value (repeatable)
        #[arg(long)]
        label: Vec<String>,
        /// Connected hosts onboard automatically instead of waiting for approval
        #[arg(long)]
        auto_onboard: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    if cli.silent {
        api::client::set_silent(true);
    }

    config::load_env_file(cli.env_file.as_deref());

    match cli.command {
        Commands::CheckConfig => {
            let mut ok = true;
            if std::env::var("INVENTORY_API_URL").unwrap_or_default().trim().is_empty() {
                eprintln!("{}", yansi::Paint::new("INVENTORY_API_URL is not configured").red());
                ok = false;
            }
            if config::get_inventory_api_token().trim().is_empty() {
                eprintln!("{}", yansi::Paint::new("INVENTORY_API_TOKEN is not configured").red());
                ok = false;
            }
            if !ok {
                process::exit(1);
            }
            let inventory = build_client();
            match api::list_hosts(&inventory, None, 0, 1).await {
                Ok(_) => {
                    println!(
                        "{}",
                        yansi::Paint::new("Configuration looks valid (hosts returned)").green()
                    );
                }
                Err(e) => {
                    eprintln!(
                        "{}: {}",
                        yansi::Paint::new("Configuration appears invalid").red(),
                        e
                    );
                    process::exit(1);
                }
            }
        }
        Commands::Hosts { sub } => match sub {
            HostCommands::List {
                state,
                search,
                status,
                os_profile,
                has_workload,
                workload_member,
                site,
                page,
                per_page,
            } => {
                let mut filter = HostFilter::new();
                filter.set_life_cycle(parse_life_cycle(&state));
                filter.set_search_term(search);
                filter.set_statuses(status.iter().map(|s| parse_status_bucket(s)));
                filter.set_os_profiles(os_profile);
                filter.set_workload(match has_workload {
                    None => WorkloadMembership::Any,
                    Some(true) => WorkloadMembership::Present,
                    Some(false) => WorkloadMembership::Absent,
                });
                filter.set_workload_member_id(workload_member);
                filter.set_site_id(site);

                let inventory = build_client();
                let page = page.max(1);
                let per_page = per_page.max(1);
                let offset = (page - 1) * per_page;
                let paginated =
                    match api::list_hosts(&inventory, filter.combined_query(), offset, per_page)
                        .await
                    {
                        Ok(p) => p,
                        Err(e) => {
                            eprintln!("{}: {}", yansi::Paint::new("Failed to list hosts").red(), e);
                            process::exit(1);
                        }
                    };

                print_hosts_table(&paginated.hosts);

                let total_pages = paginated.total_count.div_ceil(per_page).max(1);
                if total_pages > 1 {
                    println!(
                        "\n{}",
                        yansi::Paint::new(format!(
                            "Page {} of {} | Showing {} of {} total hosts",
                            page,
                            total_pages,
                            paginated.hosts.len(),
                            paginated.total_count
                        ))
                        .cyan()
                    );
                    if page > 1 {
                        println!(
                            "{} {}",
                            yansi::Paint::new("←").bold(),
                            yansi::Paint::new(format!(
                                "Previous page: fleet hosts list --page {} --per-page {}",
                                page - 1,
                                per_page
                            ))
                            .dim()
                        );
                    }
                    if page < total_pages {
                        println!(
                            "{} {}",
                            yansi::Paint::new("→").bold(),
                            yansi::Paint::new(format!(
                                "Next page: fleet hosts list --page {} --per-page {}",
                                page + 1,
                                per_page
                            ))
                            .dim()
                        );
                    }
                }
                println!();
            }
            HostCommands::Register { hosts, auto_onboard } => {
                let mut session = WizardSession::new(auto_onboard, false);
                for spec in &hosts {
                    session.add_host(parse_host_spec(spec));
                }
                let inventory = build_client();
                let results = match register_only(&inventory, &mut session).await {
                    Ok(r) => r,
                    Err(e) => {
                        eprintln!("{}", yansi::Paint::new(e.to_string()).red());
                        process::exit(1);
                    }
                };
                let mut failed = 0usize;
                for (name, outcome) in &results {
                    match outcome {
                        HostOutcome::Succeeded => {
                            let durable_id = session
                                .hosts()
                                .iter()
                                .find(|h| &h.name == name)
                                .and_then(|h| h.durable_id.clone())
                                .unwrap_or_default();
                            println!(
                                "{} {} ({})",
                                yansi::Paint::new("Registered").green(),
                                name,
                                yansi::Paint::new(durable_id).cyan()
                            );
                        }
                        HostOutcome::Failed(msg) => {
                            failed += 1;
                            eprintln!("{} {}: {}", yansi::Paint::new("Failed").red(), name, msg);
                        }
                    }
                }
                if failed > 0 {
                    process::exit(1);
                }
            }
            HostCommands::Provision {
                hosts,
                site,
                os,
                secure,
                local_account,
                label,
                auto_onboard,
            } => {
                let metadata = parse_labels(&label);
                let inventory = build_client();
                let (site_id, site_name) = resolve_site(&inventory, &site).await;

                let mut session = WizardSession::new(auto_onboard, true);
                for spec in &hosts {
                    session.add_host(parse_host_spec(spec));
                }
                for key in session.hosts().keys() {
                    session.set_host_site(&key, &site_id, &site_name);
                    if let Some(account) = &local_account {
                        session.set_host_local_account(&key, Some(account.clone()));
                    }
                }
                session.set_global_os(&os);
                session.set_global_security(secure);
                session.set_metadata_for_all(metadata);

                walk_wizard(&mut session);
                run_provisioning(&inventory, &mut session).await;
            }
        },
    }
}

fn build_client() -> InventoryClient {
    match InventoryClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", yansi::Paint::new("Failed to create HTTP client").red(), e);
            process::exit(1);
        }
    }
}

fn parse_life_cycle(raw: &str) -> LifeCycleFilter {
    match raw.trim().to_lowercase().as_str() {
        "provisioned" => LifeCycleFilter::Provisioned,
        "onboarded" => LifeCycleFilter::Onboarded,
        "registered" => LifeCycleFilter::Registered,
        "all" | "" => LifeCycleFilter::All,
        other => {
            eprintln!(
                "{} '{}'; expected all | provisioned | onboarded | registered",
                yansi::Paint::new("Unknown lifecycle state").red(),
                other
            );
            process::exit(2);
        }
    }
}

fn parse_status_bucket(raw: &str) -> StatusBucket {
    match raw.trim().to_lowercase().as_str() {
        "ready" => StatusBucket::Ready,
        "in-progress" | "in_progress" => StatusBucket::InProgress,
        "error" => StatusBucket::Error,
        "unknown" => StatusBucket::Unknown,
        "deauthorized" => StatusBucket::Deauthorized,
        other => {
            eprintln!(
                "{} '{}'; expected ready | in-progress | error | unknown | deauthorized",
                yansi::Paint::new("Unknown status").red(),
                other
            );
            process::exit(2);
        }
    }
}

/// Host specs come in as `name`, `name:serial` or `name:serial:uuid`.
fn parse_host_spec(spec: &str) -> HostRecord {
    let mut parts = spec.splitn(3, ':');
    let name = parts.next().unwrap_or("").trim();
    let serial = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());
    let uuid = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());
    if name.is_empty() {
        eprintln!("{} '{}'", yansi::Paint::new("Invalid host spec").red(), spec);
        process::exit(2);
    }
    let mut host = HostRecord::new(name);
    host.serial_number = serial.map(|s| s.to_string());
    host.uuid = uuid.map(|s| s.to_string());
    host
}

fn parse_labels(raw: &[String]) -> Vec<MetadataPair> {
    let mut out = Vec::new();
    for entry in raw {
        match entry.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => {
                out.push(MetadataPair::new(k.trim(), v.trim()));
            }
            _ => {
                eprintln!(
                    "{} '{}'; expected key=value",
                    yansi::Paint::new("Invalid label").red(),
                    entry
                );
                process::exit(2);
            }
        }
    }
    out
}

/// Accept a site resource id or a site name; fall back to the raw value when
/// the catalog is unavailable.
async fn resolve_site(inventory: &InventoryClient, site: &str) -> (String, String) {
    match api::load_sites(inventory).await {
        Ok((sites, by_id)) => {
            if let Some(s) = by_id.get(site) {
                return (s.resource_id.clone(), s.name.clone());
            }
            if let Some(s) = sites.iter().find(|s| s.name == site) {
                return (s.resource_id.clone(), s.name.clone());
            }
            (site.to_string(), site.to_string())
        }
        Err(e) => {
            tracing::warn!(%e, "Failed to load site catalog; using the given value as-is");
            (site.to_string(), site.to_string())
        }
    }
}

/// Advance through every wizard step, stopping with a useful message on the
/// step that blocks.
fn walk_wizard(session: &mut WizardSession) {
    loop {
        match session.view() {
            WizardView::NoHostSelected => {
                eprintln!("{}", yansi::Paint::new("No host selected").red());
                process::exit(1);
            }
            WizardView::Active { step, can_advance, .. } => {
                if !can_advance {
                    eprintln!(
                        "{} '{}'",
                        yansi::Paint::new("Provisioning input is incomplete at step").red(),
                        step.label()
                    );
                    for host in session.hosts().iter() {
                        if host.site_id.is_none() || host.instance.is_none() {
                            eprintln!("  {}: missing site or OS configuration", host.name);
                        }
                    }
                    process::exit(1);
                }
                if step.next().is_none() {
                    return;
                }
                session.advance();
            }
        }
    }
}

async fn run_provisioning(inventory: &InventoryClient, session: &mut WizardSession) {
    let host_count = session.hosts().len();
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));

    let mut run = ProvisionRun::new();
    loop {
        let prev = run.phase();
        let next = run.step(inventory, session).await;
        match next {
            ProvisionPhase::Registering => pb.set_message(format!("Registering {} host(s)…", host_count)),
            ProvisionPhase::Updating => pb.set_message("Updating host details…"),
            ProvisionPhase::Instantiating => pb.set_message("Creating instances…"),
            _ => {}
        }
        if next == ProvisionPhase::Idle
            && matches!(prev, ProvisionPhase::Results | ProvisionPhase::BackToHosts)
        {
            break;
        }
    }
    pb.finish_and_clear();

    print_outcome_table(run.results());
    match run.notice() {
        Some(RunNotice::AllSucceeded { count }) => {
            println!(
                "{}",
                yansi::Paint::new(format!("Provisioned {} host(s)", count)).green()
            );
        }
        Some(RunNotice::PartialFailure { failed }) => {
            eprintln!(
                "{}: {}",
                yansi::Paint::new("Some hosts failed").red(),
                failed.join(", ")
            );
            eprintln!(
                "{}",
                yansi::Paint::new(
                    "Re-run the same command to retry; hosts that already succeeded are skipped."
                )
                .yellow()
            );
            process::exit(1);
        }
        None => {}
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w - 4);
    }
    table
}

fn print_hosts_table(hosts: &[HostView]) {
    if hosts.is_empty() {
        println!("(no hosts)");
        return;
    }
    let mut table = new_table();
    table.set_header(vec!["ID", "Name", "State", "Status", "Site", "OS", "Serial"]);
    for h in hosts {
        table.add_row(vec![
            h.resource_id.as_str(),
            h.name.as_str(),
            h.state_display.as_str(),
            h.status_display.as_str(),
            h.site_name.as_str(),
            h.os_name.as_str(),
            h.serial_number.as_deref().unwrap_or("—"),
        ]);
    }
    println!("\n{table}");
}

fn print_outcome_table(results: &std::collections::BTreeMap<String, HostOutcome>) {
    let mut table = new_table();
    table.set_header(vec!["Host", "Result"]);
    for (name, outcome) in results {
        let result = match outcome {
            HostOutcome::Succeeded => yansi::Paint::new("Succeeded").green().to_string(),
            HostOutcome::Failed(msg) => yansi::Paint::new(msg).red().to_string(),
        };
        table.add_row(vec![name.clone(), result]);
    }
    println!("\n{table}\n");
}

//! Command-line front end. Each command is a navigation: it goes through
//! the route guard first and only then talks to the backends.

use crate::models::{
    LogLevel, LogQuery, LoginCredentials, RegisterData, ResourceUsage, Theme, TimeRange,
    VirtualMachine,
};
use crate::routes::{GuardDecision, Route};
use crate::services::ApiError;
use crate::Console;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::io::BufRead;

#[derive(Parser, Debug)]
#[command(name = "admin-console")]
#[command(author, version, about = "Operator console for the auth server and API gateway", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Flavors,
    Images,
    Networks,
    Usage,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in to the auth server
    Login {
        #[arg(long)]
        username: String,
        /// Password; read from stdin when omitted
        #[arg(long, env = "CONSOLE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and log in with it
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Password; read from stdin when omitted
        #[arg(long, env = "CONSOLE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out and forget stored credentials
    Logout,

    /// Show the signed-in user, re-fetched from the auth server
    Whoami,

    /// Check whether a route is reachable with the current session
    Open {
        /// Route path, e.g. /admin/monitoring
        path: String,
    },

    /// List services registered with the gateway
    Services,

    /// Gateway health, or one service's health
    Health {
        /// Service name
        service: Option<String>,
    },

    /// System, per-service or per-VM metrics
    Metrics {
        /// Limit to one service
        #[arg(long)]
        service: Option<String>,
        /// Limit to one virtual machine
        #[arg(long, conflicts_with = "service")]
        vm: Option<String>,
        /// 15m, 1h, 6h, 24h, 7d or 30d
        #[arg(long, default_value = "1h")]
        range: TimeRange,
        /// Print the gateway's raw Prometheus exposition instead
        #[arg(long, conflicts_with_all = ["service", "vm"])]
        raw: bool,
    },

    /// Search aggregated logs
    Logs {
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        level: Option<LogLevel>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long)]
        offset: Option<u32>,
        #[arg(long)]
        since: Option<String>,
        #[arg(long)]
        until: Option<String>,
    },

    /// Active alerts, or the configured alert rules
    Alerts {
        #[arg(long)]
        rules: bool,
    },

    /// Link to a Grafana dashboard
    Grafana {
        #[arg(long)]
        dashboard: Option<String>,
    },

    /// Run a PromQL query through the gateway
    Query {
        /// e.g. rate(http_requests_total[5m])
        promql: String,
    },

    /// List virtual machines
    Vms {
        /// Only machines owned by this user id
        #[arg(long)]
        user: Option<String>,
    },

    /// Show one virtual machine
    Vm {
        id: String,
        /// Print the console URL instead
        #[arg(long)]
        console: bool,
    },

    /// Flavors, images, networks or overall usage
    Resources {
        #[arg(value_enum)]
        kind: ResourceKind,
    },

    /// List invited users, or show one
    Users {
        id: Option<String>,
    },

    /// Show or set the theme preference
    Theme {
        /// light, dark or system
        value: Option<Theme>,
    },
}

impl Command {
    /// The route this command stands in for.
    pub fn route(&self) -> Route {
        match self {
            Command::Login { .. } => Route::Login,
            Command::Register { .. } => Route::Register,
            Command::Logout | Command::Theme { .. } => Route::Home,
            Command::Whoami => Route::Home,
            Command::Open { path } => Route::from_path(path),
            Command::Services | Command::Health { .. } => Route::Admin,
            Command::Metrics { .. }
            | Command::Logs { .. }
            | Command::Alerts { .. }
            | Command::Grafana { .. }
            | Command::Query { .. } => Route::Monitoring,
            Command::Vms { .. } | Command::Vm { .. } | Command::Resources { .. } => {
                Route::VmManagement
            }
            Command::Users { .. } => Route::UserManagement,
        }
    }
}

pub async fn run(console: &Console, cli: Cli) -> Result<()> {
    let format = cli.format;
    let route = cli.command.route();

    match console.navigate(route) {
        GuardDecision::Render => {}
        GuardDecision::Redirect(Route::Login) => {
            return Err(anyhow!("Not logged in. Use 'admin-console login' first."));
        }
        GuardDecision::Redirect(Route::Home) if matches!(route, Route::Login | Route::Register) => {
            let name = console
                .session
                .session()
                .user
                .map(|u| u.username)
                .unwrap_or_default();
            println!("Already logged in as {}", name);
            return Ok(());
        }
        GuardDecision::Redirect(Route::Home) => {
            return Err(anyhow!("{} requires admin privileges", route));
        }
        GuardDecision::Redirect(other) => {
            return Err(anyhow!("Redirected to {}", other));
        }
        GuardDecision::Pending => {
            return Err(anyhow!("Session is still loading, try again"));
        }
    }

    let result = execute(console, cli.command, format).await;
    if let Err(e) = &result {
        if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::SessionExpired)) {
            tracing::info!(route = %console.navigator.current(), "Session ended during command");
        }
    }
    result
}

async fn execute(console: &Console, command: Command, format: OutputFormat) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let password = read_password(password)?;
            let credentials = LoginCredentials {
                username,
                password: password.expose_secret().clone(),
            };
            let profile = console.session.login(&credentials).await?;
            println!("Logged in as {}", profile.username);
        }

        Command::Register {
            username,
            email,
            password,
        } => {
            let password = read_password(password)?;
            let data = RegisterData {
                username,
                email,
                password: password.expose_secret().clone(),
            };
            let profile = console.session.register(&data).await?;
            println!("Registered and logged in as {}", profile.username);
        }

        Command::Logout => {
            console.session.logout().await;
            println!("Logged out");
        }

        Command::Whoami => {
            console.session.refresh_user().await?;
            match console.session.session().user {
                Some(user) => emit(format, &user, |u| {
                    let role = if u.is_admin() { "admin" } else { "user" };
                    format!("{} <{}> ({})", u.username, u.email, role)
                })?,
                None => println!("Not logged in"),
            }
        }

        Command::Open { path } => {
            let route = Route::from_path(&path);
            println!("{} is reachable", route);
        }

        Command::Services => {
            let services = console.gateway.services().await?;
            emit(format, &services, |services| {
                if services.is_empty() {
                    return "No services registered".to_string();
                }
                services
                    .iter()
                    .map(|s| {
                        format!(
                            "{:<24} {:<10} {} (timeout {}s, {} req/min)",
                            s.name, s.status, s.url, s.timeout, s.rate_limit
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }

        Command::Health { service } => {
            let report = match &service {
                Some(name) => console.gateway.service_health(name).await?,
                None => console.gateway.gateway_health().await?,
            };
            let subject = service.unwrap_or_else(|| "gateway".to_string());
            emit(format, &report, |r| format!("{}: {}", subject, r.status))?;
        }

        Command::Metrics {
            service,
            vm,
            range,
            raw,
        } => {
            if raw {
                print!("{}", console.gateway.metrics().await?);
                return Ok(());
            }
            let metrics = match (&service, &vm) {
                (Some(name), _) => console.monitoring.service_metrics(name, range).await?,
                (None, Some(id)) => console.monitoring.vm_metrics(id, range).await?,
                (None, None) => console.monitoring.system_metrics(range).await?,
            };
            emit(format, &metrics, |m| {
                let (cpu, mem, disk) = m.latest();
                let pct = |v: Option<f64>| v.map_or("-".to_string(), |v| format!("{:.1}%", v));
                format!(
                    "range {}  cpu {}  memory {}  disk {}",
                    range,
                    pct(cpu),
                    pct(mem),
                    pct(disk)
                )
            })?;
        }

        Command::Logs {
            service,
            level,
            limit,
            offset,
            since,
            until,
        } => {
            let query = LogQuery {
                service,
                level,
                limit: Some(limit),
                offset,
                start_time: since,
                end_time: until,
            };
            let page = console.monitoring.logs(&query).await?;
            emit(format, &page, |page| {
                let mut lines: Vec<String> = page
                    .logs
                    .iter()
                    .map(|l| {
                        format!(
                            "{} {:<5} [{}] {}",
                            l.timestamp,
                            format!("{:?}", l.level).to_uppercase(),
                            l.service,
                            l.message
                        )
                    })
                    .collect();
                if page.has_more {
                    lines.push(format!("… {} total", page.total));
                }
                lines.join("\n")
            })?;
        }

        Command::Alerts { rules } => {
            if rules {
                let rules = console.monitoring.alert_rules().await?;
                emit(format, &rules, |rules| {
                    rules
                        .iter()
                        .map(|r| {
                            let state = if r.enabled { "on" } else { "off" };
                            format!("{:<3} {} when {} > {}", state, r.name, r.condition, r.threshold)
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            } else {
                let alerts = console.monitoring.active_alerts().await?;
                emit(format, &alerts, |alerts| {
                    if alerts.is_empty() {
                        return "No active alerts".to_string();
                    }
                    alerts
                        .iter()
                        .map(|a| {
                            format!("{:?} {} since {}: {}", a.severity, a.rule_name, a.started_at, a.message)
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            }
        }

        Command::Grafana { dashboard } => {
            let link = console.monitoring.grafana_url(dashboard.as_deref()).await?;
            emit(format, &link, |l| l.url.clone())?;
        }

        Command::Query { promql } => {
            let result = console.monitoring.prometheus_query(&promql).await?;
            emit(format, &result, |r| {
                let mut lines = vec![format!(
                    "{} ({}, {} series)",
                    r.status,
                    r.data.result_type,
                    r.data.result.len()
                )];
                lines.extend(r.data.result.iter().map(|series| series.to_string()));
                lines.join("\n")
            })?;
        }

        Command::Vms { user } => {
            let vms = match &user {
                Some(id) => console.vms.user_vms(id).await?,
                None => console.vms.vms().await?,
            };
            emit(format, &vms, |vms| {
                if vms.is_empty() {
                    return "No virtual machines".to_string();
                }
                vms.iter().map(vm_line).collect::<Vec<_>>().join("\n")
            })?;
        }

        Command::Vm { id, console: url } => {
            if url {
                let console_url = console.vms.vm_console(&id).await?;
                emit(format, &console_url, |c| c.console_url.clone())?;
            } else {
                let vm = console.vms.vm(&id).await?;
                emit(format, &vm, |vm| {
                    let address = vm
                        .ip_addresses
                        .public
                        .as_deref()
                        .or(vm.ip_addresses.private.as_deref())
                        .unwrap_or("-");
                    format!(
                        "{}\n  image {}  networks {}  address {}\n  created {}",
                        vm_line(vm),
                        vm.image,
                        vm.networks.join(","),
                        address,
                        vm.created_at
                    )
                })?;
            }
        }

        Command::Resources { kind } => match kind {
            ResourceKind::Flavors => {
                let flavors = console.vms.flavors().await?;
                emit(format, &flavors, |flavors| {
                    flavors
                        .iter()
                        .map(|f| {
                            format!(
                                "{:<16} {} vCPU  {} MB  {} GB",
                                f.name, f.vcpus, f.ram, f.disk
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            }
            ResourceKind::Images => {
                let images = console.vms.images().await?;
                emit(format, &images, |images| {
                    images
                        .iter()
                        .map(|i| {
                            format!(
                                "{:<24} {:?}  {} bytes  min {} GB / {} MB",
                                i.name, i.status, i.size, i.min_disk, i.min_ram
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            }
            ResourceKind::Networks => {
                let networks = console.vms.networks().await?;
                emit(format, &networks, |networks| {
                    networks
                        .iter()
                        .map(|n| format!("{:<16} {} via {}", n.name, n.cidr, n.gateway_ip))
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            }
            ResourceKind::Usage => {
                let usage = console.vms.resource_usage().await?;
                emit(format, &usage, |u| {
                    let row = |label: &str, used: u64, total: u64| {
                        format!(
                            "{:<10} {}/{} ({:.0}%)",
                            label,
                            used,
                            total,
                            ResourceUsage::percent(used, total)
                        )
                    };
                    [
                        row("vcpus", u.used_vcpus, u.total_vcpus),
                        row("ram", u.used_ram, u.total_ram),
                        row("storage", u.used_storage, u.total_storage),
                        row("instances", u.used_instances, u.total_instances),
                    ]
                    .join("\n")
                })?;
            }
        },

        Command::Users { id } => {
            let users = match &id {
                Some(id) => vec![console.users.friend(id).await?],
                None => console.users.friends().await?,
            };
            emit(format, &users, |users| {
                if users.is_empty() {
                    return "No invited users".to_string();
                }
                users
                    .iter()
                    .map(|u| {
                        format!(
                            "{:<16} {:<10} {} VMs of {}  <{}>",
                            u.username,
                            u.status,
                            u.vm_usage.instances,
                            u.vm_quota.max_instances,
                            u.email
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }

        Command::Theme { value } => {
            if let Some(theme) = value {
                console
                    .tokens
                    .set_theme(theme)
                    .context("Failed to save theme preference")?;
            }
            println!("{}", console.tokens.theme());
        }
    }

    Ok(())
}

fn vm_line(vm: &VirtualMachine) -> String {
    format!(
        "{:<12} {:<20} {:<9} {} ({} vCPU, {} MB) owner {}",
        vm.id, vm.name, vm.status, vm.flavor, vm.specs.vcpus, vm.specs.ram, vm.user_name
    )
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", text(value)),
    }
    Ok(())
}

fn read_password(flag: Option<String>) -> Result<Secret<String>> {
    if let Some(password) = flag {
        return Ok(Secret::new(password));
    }

    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(Secret::new(line.trim_end_matches(['\r', '\n']).to_string()))
}

//! Account Admin CLI — sign in to the StreamPass backend, inspect the user
//! directory, and run staff operations: licenses, roles, bans, notifications.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use streampass_admin_console::{
    Activity, Audience, LicenseAdmin, LicenseState, NotificationDraft, NotificationSender,
    NotificationType, PlanSelection, Platform, Severity, SortDir, SortKey, TopDonorsWindow,
    UserDirectory, UserOps, UserQuery,
};
use streampass_client::{AccountClient, ApiGateway, PlanCatalog, SessionStore};
use streampass_core::types::AdminUserRecord;
use streampass_core::{ClientConfig, Role};

#[derive(Parser)]
#[command(name = "account-admin")]
#[command(about = "StreamPass Account Administration Tool")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides STREAMPASS__BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account and store the session token
    Register {
        username: String,
        password: String,
    },

    /// Log in and store the session token
    Login {
        username: String,
        password: String,
    },

    /// Drop the stored session token
    Logout,

    /// Show the signed-in user's profile
    Me,

    /// List the paid plan catalog
    Plans,

    /// Redeem a license key for the signed-in account
    ActivateKey {
        key: String,
    },

    /// List users (staff only)
    Users {
        /// Free-text search over username/email
        #[arg(short, long)]
        q: Option<String>,

        /// Only users online right now
        #[arg(long)]
        online: bool,

        /// Only users with no login within N days
        #[arg(long)]
        inactive_days: Option<u32>,

        /// Client platform: android, ios, desktop
        #[arg(long)]
        platform: Option<String>,

        #[arg(long)]
        region: Option<String>,

        /// Tariff id filter (superadmin only; "free" matches unlicensed)
        #[arg(long)]
        tariff: Option<String>,

        /// Only users with at least one donation
        #[arg(long)]
        has_donations: bool,

        /// Top-donors preset: today, 7d, 30d, all
        #[arg(long)]
        top_donors: Option<String>,

        /// Sort key: created_at, last_login_at, total_coins, today_coins,
        /// last_7d_coins, last_30d_coins
        #[arg(long, default_value = "created_at")]
        sort_by: String,

        /// Sort direction: asc, desc
        #[arg(long, default_value = "desc")]
        sort_dir: String,

        /// Zero-based page number
        #[arg(long, default_value = "0")]
        page: u32,
    },

    /// List assignable role ids (superadmin only)
    Roles,

    /// Assign a role to a user (superadmin only)
    SetRole {
        username: String,
        role: String,
    },

    /// Grant a plan, or "free" to clear the license (superadmin only)
    GrantLicense {
        username: String,
        plan: String,

        /// Validity period in days
        #[arg(long, default_value = "30")]
        days: u32,
    },

    /// Extend an existing license from its stored expiry (superadmin only)
    ExtendLicense {
        username: String,

        #[arg(long, default_value = "30")]
        days: u32,
    },

    /// Revoke a license, clearing plan and expiry (superadmin only)
    RevokeLicense {
        username: String,
    },

    /// Ban or unban a user (superadmin only)
    Ban {
        username: String,

        /// Lift the ban instead of imposing it
        #[arg(long)]
        lift: bool,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Permanently delete a user account (superadmin only)
    DeleteUser {
        username: String,

        /// Required confirmation flag
        #[arg(long)]
        yes: bool,
    },

    /// Send a targeted notification (staff only)
    Notify {
        title: String,
        body: String,

        /// Audience: all, missing-email, plan, users
        #[arg(long, default_value = "all")]
        audience: String,

        /// Comma/newline-separated tariff ids or usernames, depending on
        /// the audience
        #[arg(long, default_value = "")]
        select: String,

        /// Severity: info, warning, promo
        #[arg(long, default_value = "promo")]
        severity: String,

        /// Classification: product, marketing
        #[arg(long = "type", default_value = "marketing")]
        notification_type: String,

        #[arg(long)]
        link: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::load().context("invalid STREAMPASS__* environment")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let console = Console::connect(&config)?;

    match cli.command {
        Commands::Register { username, password } => console.cmd_register(&username, &password).await,
        Commands::Login { username, password } => console.cmd_login(&username, &password).await,
        Commands::Logout => console.cmd_logout(),
        Commands::Me => console.cmd_me().await,
        Commands::Plans => console.cmd_plans().await,
        Commands::ActivateKey { key } => console.cmd_activate_key(&key).await,
        Commands::Users {
            q,
            online,
            inactive_days,
            platform,
            region,
            tariff,
            has_donations,
            top_donors,
            sort_by,
            sort_dir,
            page,
        } => {
            let mut query = UserQuery::new(config.page_size);
            if let Some(q) = q {
                query.set_search(q);
            }
            if online {
                query.set_activity(Some(Activity::Online));
            } else if let Some(within_days) = inactive_days {
                query.set_activity(Some(Activity::Inactive { within_days }));
            }
            query.set_platform(platform.as_deref().map(parse_platform).transpose()?);
            query.set_region(region);
            query.set_tariff_id(tariff);
            query.set_has_donations(has_donations);
            query.set_sort(parse_sort_key(&sort_by)?, parse_sort_dir(&sort_dir)?);
            if let Some(window) = top_donors.as_deref().map(parse_top_donors).transpose()? {
                query.apply_top_donors(window);
            }
            for _ in 0..page {
                query.next_page();
            }
            console.cmd_users(&query).await
        }
        Commands::Roles => console.cmd_roles().await,
        Commands::SetRole { username, role } => console.cmd_set_role(&username, &role).await,
        Commands::GrantLicense { username, plan, days } => {
            console.cmd_grant_license(&username, &plan, days).await
        }
        Commands::ExtendLicense { username, days } => {
            console.cmd_extend_license(&username, days).await
        }
        Commands::RevokeLicense { username } => console.cmd_revoke_license(&username).await,
        Commands::Ban { username, lift, reason } => {
            console.cmd_ban(&username, !lift, reason.as_deref()).await
        }
        Commands::DeleteUser { username, yes } => console.cmd_delete_user(&username, yes).await,
        Commands::Notify {
            title,
            body,
            audience,
            select,
            severity,
            notification_type,
            link,
        } => {
            let mut draft = NotificationDraft::new(title, body);
            draft.severity = parse_severity(&severity)?;
            draft.notification_type = parse_notification_type(&notification_type)?;
            draft.link = link;
            console.cmd_notify(&draft, parse_audience(&audience)?, &select).await
        }
    }
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

fn parse_platform(s: &str) -> Result<Platform> {
    match s.to_lowercase().as_str() {
        "android" => Ok(Platform::Android),
        "ios" => Ok(Platform::Ios),
        "desktop" => Ok(Platform::Desktop),
        _ => bail!("unknown platform '{s}' (expected android, ios, desktop)"),
    }
}

fn parse_sort_key(s: &str) -> Result<SortKey> {
    match s.to_lowercase().as_str() {
        "created_at" => Ok(SortKey::CreatedAt),
        "last_login_at" => Ok(SortKey::LastLoginAt),
        "total_coins" => Ok(SortKey::TotalCoins),
        "today_coins" => Ok(SortKey::TodayCoins),
        "last_7d_coins" => Ok(SortKey::Last7dCoins),
        "last_30d_coins" => Ok(SortKey::Last30dCoins),
        _ => bail!("unknown sort key '{s}'"),
    }
}

fn parse_sort_dir(s: &str) -> Result<SortDir> {
    match s.to_lowercase().as_str() {
        "asc" => Ok(SortDir::Asc),
        "desc" => Ok(SortDir::Desc),
        _ => bail!("unknown sort direction '{s}' (expected asc, desc)"),
    }
}

fn parse_top_donors(s: &str) -> Result<TopDonorsWindow> {
    match s.to_lowercase().as_str() {
        "today" => Ok(TopDonorsWindow::Today),
        "7d" => Ok(TopDonorsWindow::Last7d),
        "30d" => Ok(TopDonorsWindow::Last30d),
        "all" => Ok(TopDonorsWindow::AllTime),
        _ => bail!("unknown window '{s}' (expected today, 7d, 30d, all)"),
    }
}

fn parse_audience(s: &str) -> Result<Audience> {
    match s.to_lowercase().as_str() {
        "all" => Ok(Audience::All),
        "missing-email" | "missing_email" => Ok(Audience::MissingEmail),
        "plan" => Ok(Audience::Plan),
        "users" => Ok(Audience::Users),
        _ => bail!("unknown audience '{s}' (expected all, missing-email, plan, users)"),
    }
}

fn parse_severity(s: &str) -> Result<Severity> {
    match s.to_lowercase().as_str() {
        "info" => Ok(Severity::Info),
        "warning" => Ok(Severity::Warning),
        "promo" => Ok(Severity::Promo),
        _ => bail!("unknown severity '{s}' (expected info, warning, promo)"),
    }
}

fn parse_notification_type(s: &str) -> Result<NotificationType> {
    match s.to_lowercase().as_str() {
        "product" => Ok(NotificationType::Product),
        "marketing" => Ok(NotificationType::Marketing),
        _ => bail!("unknown type '{s}' (expected product, marketing)"),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

struct Console {
    gateway: Arc<ApiGateway>,
    account: AccountClient,
    directory: UserDirectory,
}

impl Console {
    fn connect(config: &ClientConfig) -> Result<Self> {
        let base = config
            .base_url
            .parse()
            .with_context(|| format!("invalid base URL: {}", config.base_url))?;

        // Token file lives under $HOME unless an absolute path is configured.
        let token_path = match std::env::var_os("HOME") {
            Some(home) if !config.token_path.starts_with('/') => {
                std::path::PathBuf::from(home).join(&config.token_path)
            }
            _ => std::path::PathBuf::from(&config.token_path),
        };
        let session = Arc::new(SessionStore::persistent(token_path));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        let gateway = Arc::new(ApiGateway::new(base, session).with_http_client(http));

        Ok(Self {
            gateway: Arc::clone(&gateway),
            account: AccountClient::new(Arc::clone(&gateway)),
            directory: UserDirectory::new(gateway),
        })
    }

    /// Fetch the signed-in operator's parsed role. Every staff command calls
    /// this once up front.
    async fn operator(&self) -> Result<Role> {
        let profile = self
            .account
            .me()
            .await
            .context("not signed in (run `account-admin login` first)")?;
        Ok(Role::parse(profile.role.as_deref()))
    }

    /// Resolve a username to its directory record or fail.
    async fn resolve(&self, username: &str, operator: &Role) -> Result<AdminUserRecord> {
        self.directory
            .refetch(username, operator)
            .await?
            .with_context(|| format!("no such user: {username}"))
    }

    async fn cmd_register(&self, username: &str, password: &str) -> Result<()> {
        let profile = self.account.register(username, password).await?;
        println!("Registered and signed in as {}", profile.username);
        Ok(())
    }

    async fn cmd_login(&self, username: &str, password: &str) -> Result<()> {
        let profile = self.account.login(username, password).await?;
        println!("Signed in as {}", profile.username);
        Ok(())
    }

    fn cmd_logout(&self) -> Result<()> {
        self.account.logout();
        println!("Signed out");
        Ok(())
    }

    async fn cmd_me(&self) -> Result<()> {
        let profile = self.account.me().await?;
        println!("Username:   {}", profile.username);
        println!("User ID:    {}", profile.id);
        println!("Email:      {}", profile.email.as_deref().unwrap_or("-"));
        println!(
            "Role:       {}",
            Role::parse(profile.role.as_deref()).as_str()
        );
        println!("Plan:       {}", profile.plan.as_deref().unwrap_or("free"));
        if let Some(expires_at) = profile.license_expires_at {
            println!("Expires:    {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
        }
        if !profile.allowed_platforms.is_empty() {
            println!("Platforms:  {}", profile.allowed_platforms.join(", "));
        }
        Ok(())
    }

    async fn cmd_plans(&self) -> Result<()> {
        let plans = PlanCatalog::new(Arc::clone(&self.gateway)).list().await?;
        if plans.is_empty() {
            println!("No plans available");
            return Ok(());
        }
        for plan in plans {
            println!("{:<32} {:<28} [{}]", plan.id, plan.name, plan.allowed_platforms.join(", "));
        }
        Ok(())
    }

    async fn cmd_activate_key(&self, key: &str) -> Result<()> {
        let profile = self.account.activate_license_key(key).await?;
        println!("License activated");
        println!("  Plan:     {}", profile.plan.as_deref().unwrap_or("-"));
        if let Some(expires_at) = profile.license_expires_at {
            println!("  Expires:  {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
        }
        Ok(())
    }

    async fn cmd_users(&self, query: &UserQuery) -> Result<()> {
        let operator = self.operator().await?;
        let page = self.directory.list(query, &operator).await?;

        println!(
            "{:<24} {:<12} {:<24} {:<10} {:>12}",
            "USERNAME", "ROLE", "PLAN", "STATUS", "TOTAL COINS"
        );
        for user in &page.items {
            let state = match LicenseState::of_record(user) {
                LicenseState::None => "free".to_string(),
                LicenseState::Active => user.tariff_id.clone().unwrap_or_default(),
                LicenseState::Expired => {
                    format!("{} (expired)", user.tariff_id.as_deref().unwrap_or(""))
                }
            };
            let status = if user.is_banned {
                "banned"
            } else if user.online_now {
                "online"
            } else {
                "offline"
            };
            println!(
                "{:<24} {:<12} {:<24} {:<10} {:>12}",
                user.username,
                user.role.as_deref().unwrap_or("user"),
                state,
                status,
                user.total_coins
            );
        }
        println!();
        println!(
            "Showing {} of {} (offset {})",
            page.items.len(),
            page.total,
            query.offset()
        );
        if query.has_next(page.total) {
            println!("More results: --page {}", query.offset() / query.page_size() + 1);
        }
        Ok(())
    }

    async fn cmd_roles(&self) -> Result<()> {
        let operator = self.operator().await?;
        let ops = UserOps::new(Arc::clone(&self.gateway));
        for role in ops.list_roles(&operator).await? {
            println!("{role}");
        }
        Ok(())
    }

    async fn cmd_set_role(&self, username: &str, role: &str) -> Result<()> {
        let operator = self.operator().await?;
        let record = self.resolve(username, &operator).await?;
        UserOps::new(Arc::clone(&self.gateway))
            .set_role(&operator, record.id, role)
            .await?;
        println!("Role of {username} set to {role}");
        Ok(())
    }

    async fn license_admin(&self) -> Result<LicenseAdmin> {
        let catalog = PlanCatalog::new(Arc::clone(&self.gateway)).list().await?;
        Ok(LicenseAdmin::new(Arc::clone(&self.gateway), catalog))
    }

    async fn cmd_grant_license(&self, username: &str, plan: &str, days: u32) -> Result<()> {
        let operator = self.operator().await?;
        let record = self.resolve(username, &operator).await?;
        let selection = if plan.eq_ignore_ascii_case("free") {
            PlanSelection::Free
        } else {
            PlanSelection::Paid(plan.to_string())
        };
        self.license_admin()
            .await?
            .grant(&operator, record.id, &selection, Some(days))
            .await?;
        match selection {
            PlanSelection::Free => println!("License of {username} cleared"),
            PlanSelection::Paid(plan) => println!("Granted {plan} to {username} for {days} days"),
        }
        Ok(())
    }

    async fn cmd_extend_license(&self, username: &str, days: u32) -> Result<()> {
        let operator = self.operator().await?;
        let record = self.resolve(username, &operator).await?;
        self.license_admin()
            .await?
            .extend(&operator, &record, days)
            .await?;

        let record = self.resolve(username, &operator).await?;
        match record.license_expires_at {
            Some(expires_at) => println!(
                "License of {username} extended by {days} days (expires {})",
                expires_at.format("%Y-%m-%d")
            ),
            None => println!("License of {username} extended by {days} days"),
        }
        Ok(())
    }

    async fn cmd_revoke_license(&self, username: &str) -> Result<()> {
        let operator = self.operator().await?;
        let record = self.resolve(username, &operator).await?;
        self.license_admin()
            .await?
            .revoke(&operator, &record)
            .await?;
        println!("License of {username} revoked");
        Ok(())
    }

    async fn cmd_ban(&self, username: &str, banned: bool, reason: Option<&str>) -> Result<()> {
        let operator = self.operator().await?;
        let record = self.resolve(username, &operator).await?;
        UserOps::new(Arc::clone(&self.gateway))
            .set_ban(&operator, record.id, banned, reason)
            .await?;
        println!(
            "{username} {}",
            if banned { "banned" } else { "unbanned" }
        );
        Ok(())
    }

    async fn cmd_delete_user(&self, username: &str, yes: bool) -> Result<()> {
        if !yes {
            bail!("deletion is irreversible; re-run with --yes to confirm");
        }
        let operator = self.operator().await?;
        let record = self.resolve(username, &operator).await?;
        UserOps::new(Arc::clone(&self.gateway))
            .delete(&operator, record.id)
            .await?;
        println!("User {username} deleted");
        Ok(())
    }

    async fn cmd_notify(
        &self,
        draft: &NotificationDraft,
        audience: Audience,
        selector: &str,
    ) -> Result<()> {
        let operator = self.operator().await?;
        let receipt = NotificationSender::new(Arc::clone(&self.gateway))
            .send(&operator, draft, audience, selector)
            .await?;
        println!("Notification sent: {}", receipt.id);
        Ok(())
    }
}

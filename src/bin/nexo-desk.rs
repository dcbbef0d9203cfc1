//! Headless desk runtime: boots the notification session, loads the
//! follow-up board and keeps polling until interrupted.

use std::collections::HashSet;
use std::env;
use std::process;
use std::sync::Arc;

use log::{debug, info, warn};
use nexo_api::{CrmClient, CrmConfig};
use nexo_desk::{
    ActionTarget, ConfigManager, FollowUpDesk, LoadPhase, NotificationCenter, NotificationKind,
    Poller, SweepOutcome,
};
use tokio::sync::watch;
use tokio::time::interval;

#[tokio::main]
async fn main() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .try_init();

    info!("Starting Nexo desk runtime");

    let token = match env::var("NEXO_TOKEN") {
        Ok(token) if !token.trim().is_empty() => token,
        _ => {
            eprintln!("NEXO_TOKEN must be set to a CRM API token");
            process::exit(2);
        }
    };

    let mut api_config = CrmConfig::new(token);
    if let Ok(base_url) = env::var("NEXO_BASE_URL") {
        api_config = api_config.with_base_url(base_url);
    }
    let advisor = env::var("NEXO_ADVISOR").ok();

    let config = ConfigManager::new().load().sanitized();

    let client = match CrmClient::new(api_config) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            eprintln!("Could not build the CRM client: {err}");
            process::exit(1);
        }
    };

    let center = NotificationCenter::new(Arc::clone(&client), &config);
    center.bootstrap().await;
    let inbox = center.snapshot();
    match inbox.phase {
        LoadPhase::Loaded => info!(
            "Inbox ready: {} notifications, {} unread",
            inbox.notifications.len(),
            inbox.unread_count
        ),
        LoadPhase::Failed(kind) => warn!("Inbox unavailable: {:?}", kind),
        _ => {}
    }

    let desk = FollowUpDesk::new(Arc::clone(&client), advisor);
    match desk.load().await {
        Ok(()) => {
            let state = desk.snapshot();
            info!(
                "Follow-up board: {} overdue, {} critical, {} medium, {} low, {} done today",
                state.board.overdue.len(),
                state.board.critical.len(),
                state.board.medium.len(),
                state.board.low.len(),
                state.board.completed_today.len()
            );
        }
        Err(err) => warn!("Could not load the follow-up board: {}", err),
    }
    match desk.process_due().await {
        Ok(SweepOutcome::Processed(count)) => info!("Processed {} due follow-ups", count),
        Ok(SweepOutcome::NothingDue(message)) => debug!("Follow-up sweep: {}", message),
        Err(err) => warn!("Follow-up sweep failed: {}", err),
    }

    let (_visibility_tx, visibility_rx) = watch::channel(true);
    let poller = Poller::spawn(center.clone(), visibility_rx, config.poll_interval());

    let mut announced: HashSet<u64> = HashSet::new();
    let mut last_unread = center.snapshot().unread_count;
    let mut ticker = interval(std::time::Duration::from_secs(2));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                announce_toasts(&center, &mut announced);
                let unread = center.snapshot().unread_count;
                if unread != last_unread {
                    info!("Unread notifications: {} -> {}", last_unread, unread);
                    last_unread = unread;
                }
            }
        }
    }

    info!("Shutting down");
    poller.shutdown().await;
    center.close();
}

/// Prints every toast not yet seen on stdout, with its kind icon and, when
/// present, the action link.
fn announce_toasts(center: &NotificationCenter<CrmClient>, announced: &mut HashSet<u64>) {
    let inbox = center.snapshot();
    for entry in center.toasts().active() {
        if !announced.insert(entry.id) {
            continue;
        }
        let source = inbox.notifications.iter().find(|n| n.id == entry.id);
        let descriptor = source
            .map(|n| NotificationKind::from_tag(&n.kind).descriptor())
            .unwrap_or_else(|| NotificationKind::Unknown.descriptor());
        println!("[{}] {}: {}", descriptor.icon, entry.title, entry.message);
        if let Some(url) = source.and_then(|n| n.action_url.as_deref()) {
            match ActionTarget::parse(url) {
                ActionTarget::External(link) => println!("    abrir: {link}"),
                ActionTarget::Internal(route) => println!("    ver: {route}"),
            }
        }
    }
}
